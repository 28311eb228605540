// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Client Configuration
//!
//! This module provides the configuration options for the publishing client
//! and the resolution logic that combines explicitly provided values with an
//! environment fallback source. Resolution runs once per client instance;
//! the resolved values are cached for every later operation.

use crate::errors::ClientError;
use std::collections::HashMap;
use std::fmt;

/// Environment variable consulted when `host` is not set explicitly
pub const ENV_HOST: &str = "RABBITMQ_HOST";
/// Environment variable consulted when `port` is not set explicitly
pub const ENV_PORT: &str = "RABBITMQ_PORT";
/// Environment variable consulted when `login` is not set explicitly
pub const ENV_LOGIN: &str = "RABBITMQ_LOGIN";
/// Environment variable consulted when `password` is not set explicitly
pub const ENV_PASSWORD: &str = "RABBITMQ_PASSWORD";
/// Environment variable consulted when `queue` is not set explicitly
pub const ENV_QUEUE: &str = "RABBITMQ_QUEUE";
/// Environment variable consulted when `vhost` is not set explicitly
pub const ENV_VHOST: &str = "RABBITMQ_VHOST";

/// Construction options for the publishing client.
///
/// Every field is optional. A field left unset falls back to its
/// environment variable; a field that is missing from both places surfaces
/// as [`ClientError::MissingConfig`] on first use of the client.
///
/// When `environment` is set, that mapping replaces the process environment
/// as the fallback source verbatim, which keeps resolution fully
/// deterministic in tests.
///
/// # Example
/// ```
/// use rabbitmq_hooks::config::ClientOptions;
///
/// let options = ClientOptions::new()
///     .host("localhost")
///     .port(5672)
///     .login("guest")
///     .password("guest")
///     .queue("hooks")
///     .vhost("/");
/// ```
#[derive(Debug, Clone, Default)]
pub struct ClientOptions {
    pub(crate) host: Option<String>,
    pub(crate) port: Option<u16>,
    pub(crate) login: Option<String>,
    pub(crate) password: Option<String>,
    pub(crate) queue: Option<String>,
    pub(crate) vhost: Option<String>,
    pub(crate) environment: Option<HashMap<String, String>>,
}

impl ClientOptions {
    /// Creates an empty set of options.
    ///
    /// With nothing set explicitly, every value resolves from the
    /// environment.
    pub fn new() -> ClientOptions {
        ClientOptions::default()
    }

    /// Sets the broker host name.
    pub fn host(mut self, host: impl Into<String>) -> Self {
        self.host = Some(host.into());
        self
    }

    /// Sets the broker port.
    pub fn port(mut self, port: u16) -> Self {
        self.port = Some(port);
        self
    }

    /// Sets the login user name.
    pub fn login(mut self, login: impl Into<String>) -> Self {
        self.login = Some(login.into());
        self
    }

    /// Sets the login password.
    pub fn password(mut self, password: impl Into<String>) -> Self {
        self.password = Some(password.into());
        self
    }

    /// Sets the queue messages are published to.
    pub fn queue(mut self, queue: impl Into<String>) -> Self {
        self.queue = Some(queue.into());
        self
    }

    /// Sets the broker virtual host.
    pub fn vhost(mut self, vhost: impl Into<String>) -> Self {
        self.vhost = Some(vhost.into());
        self
    }

    /// Replaces the process environment with the given mapping as the
    /// fallback source.
    pub fn environment(mut self, environment: HashMap<String, String>) -> Self {
        self.environment = Some(environment);
        self
    }
}

/// The six connection values after resolution, cached on the client.
#[derive(Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub host: String,
    pub port: u16,
    pub login: String,
    pub password: String,
    pub queue: String,
    pub vhost: String,
}

impl fmt::Debug for ResolvedConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolvedConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("login", &self.login)
            .field("password", &"<redacted>")
            .field("queue", &self.queue)
            .field("vhost", &self.vhost)
            .finish()
    }
}

/// Resolves the client configuration against an environment source.
///
/// For each value the explicit option wins; otherwise the environment
/// variable is consulted through `env`. Values are checked in the order
/// host, port, login, password, queue, vhost and resolution stops at the
/// first value that is missing from both sources.
///
/// Empty strings count as unset on both sides. An explicit `port` is typed
/// and always counts as set; a `port` taken from the environment must parse
/// as `u16`.
///
/// # Parameters
/// * `options` - Explicitly provided options
/// * `env` - Lookup into the environment fallback source
///
/// # Returns
/// The resolved configuration, or the first resolution failure
pub(crate) fn resolve<F>(options: &ClientOptions, env: F) -> Result<ResolvedConfig, ClientError>
where
    F: Fn(&str) -> Option<String>,
{
    let host = resolve_value(options.host.as_deref(), ENV_HOST, &env)
        .ok_or(ClientError::MissingConfig("host"))?;

    let port = match options.port {
        Some(port) => port,
        None => match env(ENV_PORT).filter(|value| !value.is_empty()) {
            Some(raw) => raw
                .parse::<u16>()
                .map_err(|_| ClientError::InvalidConfig("port"))?,
            None => return Err(ClientError::MissingConfig("port")),
        },
    };

    let login = resolve_value(options.login.as_deref(), ENV_LOGIN, &env)
        .ok_or(ClientError::MissingConfig("login"))?;

    let password = resolve_value(options.password.as_deref(), ENV_PASSWORD, &env)
        .ok_or(ClientError::MissingConfig("password"))?;

    let queue = resolve_value(options.queue.as_deref(), ENV_QUEUE, &env)
        .ok_or(ClientError::MissingConfig("queue"))?;

    let vhost = resolve_value(options.vhost.as_deref(), ENV_VHOST, &env)
        .ok_or(ClientError::MissingConfig("vhost"))?;

    Ok(ResolvedConfig {
        host,
        port,
        login,
        password,
        queue,
        vhost,
    })
}

/// Resolves a single string value: explicit first, environment second,
/// empty strings treated as unset.
fn resolve_value<F>(explicit: Option<&str>, env_name: &str, env: &F) -> Option<String>
where
    F: Fn(&str) -> Option<String>,
{
    match explicit {
        Some(value) if !value.is_empty() => Some(value.to_owned()),
        _ => env(env_name).filter(|value| !value.is_empty()),
    }
}
