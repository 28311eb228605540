// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Delegated Operation Adapter
//!
//! This module defines the adapter the client forwards its convenience
//! operations to. The adapter turns the verb-shaped calls (GET/POST/PUT/
//! DELETE with an empty, JSON, or form body) into [`QueueMessage`] values
//! and hands out the message and content builders.
//!
//! Dispatch is static: the trait lists every delegated operation, so a call
//! that reaches an adapter is checked at compile time. Only the by-name
//! dispatch surface on the client resolves operations at runtime.

use crate::message::{ContentBuilder, HttpMethod, MessageBuilder, MessageContent, QueueMessage};
use serde_json::Value;
use std::collections::BTreeMap;

/// The delegated operations of the publishing client.
///
/// Implementations build messages; sending them stays with the client, which
/// owns the connection lifecycle.
pub trait Adapter: Send + Sync {
    /// Hands out a message builder.
    fn message_builder(&self) -> MessageBuilder;

    /// Hands out a content builder.
    fn content_builder(&self) -> ContentBuilder;

    /// Builds a GET message with an empty body.
    fn http_get_empty(&self, uri: &str, id: Option<&str>) -> QueueMessage;

    /// Builds a POST message with an empty body.
    fn http_post_empty(&self, uri: &str, id: Option<&str>) -> QueueMessage;

    /// Builds a PUT message with an empty body.
    fn http_put_empty(&self, uri: &str, id: Option<&str>) -> QueueMessage;

    /// Builds a DELETE message with an empty body.
    fn http_delete_empty(&self, uri: &str, id: Option<&str>) -> QueueMessage;

    /// Builds a GET message with a JSON body.
    fn http_get_json(&self, uri: &str, data: Value, id: Option<&str>) -> QueueMessage;

    /// Builds a POST message with a JSON body.
    fn http_post_json(&self, uri: &str, data: Value, id: Option<&str>) -> QueueMessage;

    /// Builds a PUT message with a JSON body.
    fn http_put_json(&self, uri: &str, data: Value, id: Option<&str>) -> QueueMessage;

    /// Builds a DELETE message with a JSON body.
    fn http_delete_json(&self, uri: &str, data: Value, id: Option<&str>) -> QueueMessage;

    /// Builds a GET message with a form body.
    fn http_get_form(&self, uri: &str, data: BTreeMap<String, String>, id: Option<&str>)
        -> QueueMessage;

    /// Builds a POST message with a form body.
    fn http_post_form(
        &self,
        uri: &str,
        data: BTreeMap<String, String>,
        id: Option<&str>,
    ) -> QueueMessage;

    /// Builds a PUT message with a form body.
    fn http_put_form(&self, uri: &str, data: BTreeMap<String, String>, id: Option<&str>)
        -> QueueMessage;

    /// Builds a DELETE message with a form body.
    fn http_delete_form(
        &self,
        uri: &str,
        data: BTreeMap<String, String>,
        id: Option<&str>,
    ) -> QueueMessage;
}

/// Default [`Adapter`] implementation backed by the message builders.
#[derive(Debug, Clone, Copy, Default)]
pub struct HookAdapter;

impl HookAdapter {
    pub fn new() -> HookAdapter {
        HookAdapter
    }

    fn hook(
        &self,
        method: HttpMethod,
        uri: &str,
        content: MessageContent,
        id: Option<&str>,
    ) -> QueueMessage {
        let mut builder = MessageBuilder::new().uri(uri).method(method).content(content);
        if let Some(id) = id {
            builder = builder.id(id);
        }
        builder.build()
    }
}

impl Adapter for HookAdapter {
    fn message_builder(&self) -> MessageBuilder {
        MessageBuilder::new()
    }

    fn content_builder(&self) -> ContentBuilder {
        ContentBuilder::new()
    }

    fn http_get_empty(&self, uri: &str, id: Option<&str>) -> QueueMessage {
        self.hook(HttpMethod::Get, uri, MessageContent::Empty, id)
    }

    fn http_post_empty(&self, uri: &str, id: Option<&str>) -> QueueMessage {
        self.hook(HttpMethod::Post, uri, MessageContent::Empty, id)
    }

    fn http_put_empty(&self, uri: &str, id: Option<&str>) -> QueueMessage {
        self.hook(HttpMethod::Put, uri, MessageContent::Empty, id)
    }

    fn http_delete_empty(&self, uri: &str, id: Option<&str>) -> QueueMessage {
        self.hook(HttpMethod::Delete, uri, MessageContent::Empty, id)
    }

    fn http_get_json(&self, uri: &str, data: Value, id: Option<&str>) -> QueueMessage {
        self.hook(HttpMethod::Get, uri, MessageContent::Json(data), id)
    }

    fn http_post_json(&self, uri: &str, data: Value, id: Option<&str>) -> QueueMessage {
        self.hook(HttpMethod::Post, uri, MessageContent::Json(data), id)
    }

    fn http_put_json(&self, uri: &str, data: Value, id: Option<&str>) -> QueueMessage {
        self.hook(HttpMethod::Put, uri, MessageContent::Json(data), id)
    }

    fn http_delete_json(&self, uri: &str, data: Value, id: Option<&str>) -> QueueMessage {
        self.hook(HttpMethod::Delete, uri, MessageContent::Json(data), id)
    }

    fn http_get_form(
        &self,
        uri: &str,
        data: BTreeMap<String, String>,
        id: Option<&str>,
    ) -> QueueMessage {
        self.hook(HttpMethod::Get, uri, MessageContent::Form(data), id)
    }

    fn http_post_form(
        &self,
        uri: &str,
        data: BTreeMap<String, String>,
        id: Option<&str>,
    ) -> QueueMessage {
        self.hook(HttpMethod::Post, uri, MessageContent::Form(data), id)
    }

    fn http_put_form(
        &self,
        uri: &str,
        data: BTreeMap<String, String>,
        id: Option<&str>,
    ) -> QueueMessage {
        self.hook(HttpMethod::Put, uri, MessageContent::Form(data), id)
    }

    fn http_delete_form(
        &self,
        uri: &str,
        data: BTreeMap<String, String>,
        id: Option<&str>,
    ) -> QueueMessage {
        self.hook(HttpMethod::Delete, uri, MessageContent::Form(data), id)
    }
}
