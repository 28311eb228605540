// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # OpenTelemetry Integration
//!
//! This module propagates trace context into outgoing messages. The current
//! context is injected into the AMQP message headers through the globally
//! configured text-map propagator, so consumers on the other side of the
//! queue can continue the trace.

use lapin::types::{AMQPValue, ShortString};
use opentelemetry::propagation::Injector;
use std::collections::BTreeMap;

/// An adapter for injecting OpenTelemetry context into RabbitMQ headers.
///
/// Implements the OpenTelemetry `Injector` trait over the header map handed
/// to `basic_publish`.
pub(crate) struct TraceInjector<'a> {
    headers: &'a mut BTreeMap<ShortString, AMQPValue>,
}

impl<'a> TraceInjector<'a> {
    /// Creates a new injector over the given header map.
    pub(crate) fn new(headers: &'a mut BTreeMap<ShortString, AMQPValue>) -> Self {
        Self { headers }
    }
}

impl Injector for TraceInjector<'_> {
    /// Sets a trace context key-value pair in the message headers.
    fn set(&mut self, key: &str, value: String) {
        self.headers.insert(
            key.to_lowercase().into(),
            AMQPValue::LongString(value.into()),
        );
    }
}
