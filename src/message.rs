// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Hook Message Model
//!
//! This module defines the message published to the queue: an HTTP-shaped
//! intent carrying a target URI, a verb, and an optional body. Messages are
//! serialized to JSON before publishing. Builders are provided for both the
//! message itself and its content.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use uuid::Uuid;

/// The HTTP verb carried by a hook message.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum HttpMethod {
    #[default]
    Get,
    Post,
    Put,
    Delete,
}

/// The body of a hook message.
///
/// Serialized adjacently tagged, e.g. `{"type":"json","data":{...}}`; an
/// empty body serializes as `{"type":"empty"}`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data", rename_all = "snake_case")]
pub enum MessageContent {
    #[default]
    Empty,
    Json(Value),
    Form(BTreeMap<String, String>),
}

/// A message published to the queue.
///
/// The client treats a message as an immutable value: it is encoded with
/// `serde_json` and handed to the transport unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueueMessage {
    pub id: String,
    pub uri: String,
    pub method: HttpMethod,
    pub content: MessageContent,
}

/// Builder for [`QueueMessage`].
///
/// # Example
/// ```
/// use rabbitmq_hooks::message::{HttpMethod, MessageBuilder};
///
/// let message = MessageBuilder::new()
///     .uri("https://example.test/hook")
///     .method(HttpMethod::Post)
///     .build();
/// ```
#[derive(Debug, Clone, Default)]
pub struct MessageBuilder {
    uri: String,
    method: HttpMethod,
    content: MessageContent,
    id: Option<String>,
}

impl MessageBuilder {
    /// Creates a builder for a GET message with an empty body.
    pub fn new() -> MessageBuilder {
        MessageBuilder::default()
    }

    /// Sets the target URI.
    pub fn uri(mut self, uri: impl Into<String>) -> Self {
        self.uri = uri.into();
        self
    }

    /// Sets the HTTP verb.
    pub fn method(mut self, method: HttpMethod) -> Self {
        self.method = method;
        self
    }

    /// Sets the message body.
    pub fn content(mut self, content: MessageContent) -> Self {
        self.content = content;
        self
    }

    /// Sets an explicit message id. A UUID v4 is generated when unset.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// Builds the message.
    pub fn build(self) -> QueueMessage {
        QueueMessage {
            id: self.id.unwrap_or_else(|| Uuid::new_v4().to_string()),
            uri: self.uri,
            method: self.method,
            content: self.content,
        }
    }
}

/// Builder for [`MessageContent`].
///
/// `json` switches the body to a JSON document; `field` switches it to form
/// fields, discarding any body of a different kind set before.
#[derive(Debug, Clone, Default)]
pub struct ContentBuilder {
    content: MessageContent,
}

impl ContentBuilder {
    /// Creates a builder for an empty body.
    pub fn new() -> ContentBuilder {
        ContentBuilder::default()
    }

    /// Sets a JSON body.
    pub fn json(mut self, data: Value) -> Self {
        self.content = MessageContent::Json(data);
        self
    }

    /// Adds a form field, making the body a form.
    pub fn field(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        if let MessageContent::Form(fields) = &mut self.content {
            fields.insert(key.into(), value.into());
        } else {
            let mut fields = BTreeMap::new();
            fields.insert(key.into(), value.into());
            self.content = MessageContent::Form(fields);
        }
        self
    }

    /// Builds the content.
    pub fn build(self) -> MessageContent {
        self.content
    }
}
