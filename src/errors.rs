// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Error Types for the Publishing Client
//!
//! This module provides the error type for all client operations. The
//! `ClientError` enum covers configuration resolution, connection and channel
//! management, message encoding, publishing, and the dynamic dispatch surface.

use thiserror::Error;

/// Represents errors that can occur while configuring or using the client.
///
/// Transport failures carry the underlying failure message as a string so the
/// original cause survives the transport seam and reaches the caller intact.
#[derive(Error, Debug, PartialEq, Eq)]
pub enum ClientError {
    /// A required configuration value is neither set explicitly nor present
    /// in the environment source
    #[error("config parameter `{0}` is required")]
    MissingConfig(&'static str),

    /// A configuration value was found but cannot be parsed
    #[error("config parameter `{0}` has an invalid value")]
    InvalidConfig(&'static str),

    /// Error establishing or re-establishing a connection to the broker
    #[error("failure to connect: {0}")]
    Connection(String),

    /// Error creating a channel from an established connection
    #[error("failure to create a channel: {0}")]
    Channel(String),

    /// Error serializing a message into its wire payload
    #[error("failure to encode message: {0}")]
    Encode(String),

    /// Error publishing a message
    #[error("failure to publish: {0}")]
    Publish(String),

    /// A dynamically dispatched operation name is not part of the adapter
    /// surface
    #[error("unknown operation `{0}`")]
    UnknownOperation(String),

    /// A dynamically dispatched operation received a body that does not fit
    /// its body kind
    #[error("invalid arguments for operation `{0}`")]
    InvalidArguments(String),
}
