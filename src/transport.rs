// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Broker Transport
//!
//! This module separates the client's lifecycle logic from the AMQP protocol
//! library. The `BrokerTransport`, `BrokerConnection`, and `BrokerChannel`
//! traits model the primitives the client needs (connect, liveness check,
//! reconnect, channel open, publish, close); the `Lapin*` types implement
//! them on top of lapin.
//!
//! The lapin connection wrapper retains the dial target, so a reconnect
//! re-dials with the same resolved credentials without touching the
//! configuration again.

use crate::{config::ResolvedConfig, errors::ClientError, otel::TraceInjector};
use async_trait::async_trait;
use lapin::{
    options::BasicPublishOptions,
    types::{AMQPValue, FieldTable, LongString, ShortString},
    uri::{AMQPAuthority, AMQPScheme, AMQPUri, AMQPUserInfo},
    BasicProperties, Channel, Connection, ConnectionProperties,
};
use opentelemetry::{global, Context};
use std::collections::BTreeMap;
use tracing::{debug, error};
use uuid::Uuid;

/// Default content type for JSON messages
pub const JSON_CONTENT_TYPE: &str = "application/json";

/// Reply code sent with graceful channel and connection closes
const REPLY_SUCCESS: u16 = 200;

/// Opens connections to a broker.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrokerTransport: Send + Sync {
    /// Dials the broker described by the resolved configuration.
    async fn connect(&self, config: &ResolvedConfig)
        -> Result<Box<dyn BrokerConnection>, ClientError>;
}

/// A live broker connection owned by the client.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrokerConnection: Send + Sync {
    /// Reports whether the underlying connection is still usable.
    fn is_connected(&self) -> bool;

    /// Re-dials the broker with the credentials the connection was created
    /// with.
    async fn reconnect(&mut self) -> Result<(), ClientError>;

    /// Opens a channel on this connection.
    async fn open_channel(&self) -> Result<Box<dyn BrokerChannel>, ClientError>;

    /// Closes the connection.
    async fn close(&self) -> Result<(), ClientError>;
}

/// A channel used to issue publish commands.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait BrokerChannel: Send + Sync {
    /// Publishes a payload to the given exchange and routing key.
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: &[u8],
    ) -> Result<(), ClientError>;

    /// Closes the channel.
    async fn close(&self) -> Result<(), ClientError>;
}

/// Lapin-backed [`BrokerTransport`].
pub struct LapinTransport {
    connection_name: String,
}

impl LapinTransport {
    /// Creates a transport whose connections identify themselves to the
    /// broker with the given name.
    pub fn new(connection_name: &str) -> LapinTransport {
        LapinTransport {
            connection_name: connection_name.to_owned(),
        }
    }
}

impl Default for LapinTransport {
    fn default() -> Self {
        LapinTransport::new(env!("CARGO_PKG_NAME"))
    }
}

#[async_trait]
impl BrokerTransport for LapinTransport {
    async fn connect(
        &self,
        config: &ResolvedConfig,
    ) -> Result<Box<dyn BrokerConnection>, ClientError> {
        let uri = amqp_uri(config);
        let properties = ConnectionProperties::default()
            .with_connection_name(LongString::from(self.connection_name.clone()));

        let connection = dial(&uri, &properties).await?;

        Ok(Box::new(LapinConnection {
            inner: connection,
            uri,
            properties,
        }))
    }
}

/// Lapin-backed [`BrokerConnection`].
///
/// Keeps the dial target next to the live connection so `reconnect` can
/// replace a dropped connection in place.
pub struct LapinConnection {
    inner: Connection,
    uri: AMQPUri,
    properties: ConnectionProperties,
}

#[async_trait]
impl BrokerConnection for LapinConnection {
    fn is_connected(&self) -> bool {
        self.inner.status().connected()
    }

    async fn reconnect(&mut self) -> Result<(), ClientError> {
        self.inner = dial(&self.uri, &self.properties).await?;
        Ok(())
    }

    async fn open_channel(&self) -> Result<Box<dyn BrokerChannel>, ClientError> {
        debug!("creating amqp channel...");
        match self.inner.create_channel().await {
            Ok(channel) => {
                debug!("channel created");
                Ok(Box::new(LapinChannel { inner: channel }))
            }
            Err(err) => {
                error!(error = err.to_string(), "error to create the channel");
                Err(ClientError::Channel(err.to_string()))
            }
        }
    }

    async fn close(&self) -> Result<(), ClientError> {
        self.inner
            .close(REPLY_SUCCESS, "client shutdown")
            .await
            .map_err(|err| ClientError::Connection(err.to_string()))
    }
}

/// Lapin-backed [`BrokerChannel`].
pub struct LapinChannel {
    inner: Channel,
}

#[async_trait]
impl BrokerChannel for LapinChannel {
    async fn publish(
        &self,
        exchange: &str,
        routing_key: &str,
        payload: &[u8],
    ) -> Result<(), ClientError> {
        let mut headers = BTreeMap::<ShortString, AMQPValue>::default();

        global::get_text_map_propagator(|propagator| {
            propagator.inject_context(&Context::current(), &mut TraceInjector::new(&mut headers))
        });

        match self
            .inner
            .basic_publish(
                exchange,
                routing_key,
                BasicPublishOptions {
                    immediate: false,
                    mandatory: false,
                },
                payload,
                BasicProperties::default()
                    .with_content_type(ShortString::from(JSON_CONTENT_TYPE))
                    .with_message_id(ShortString::from(Uuid::new_v4().to_string()))
                    .with_headers(FieldTable::from(headers)),
            )
            .await
        {
            Err(err) => {
                error!(error = err.to_string(), "error publishing message");
                Err(ClientError::Publish(err.to_string()))
            }
            _ => Ok(()),
        }
    }

    async fn close(&self) -> Result<(), ClientError> {
        self.inner
            .close(REPLY_SUCCESS, "client shutdown")
            .await
            .map_err(|err| ClientError::Channel(err.to_string()))
    }
}

/// Dials the broker, mapping the failure into the client error type.
async fn dial(uri: &AMQPUri, properties: &ConnectionProperties) -> Result<Connection, ClientError> {
    debug!("creating amqp connection...");
    let connection = match Connection::connect_uri(uri.clone(), properties.clone()).await {
        Ok(connection) => Ok(connection),
        Err(err) => {
            error!(error = err.to_string(), "failure to connect");
            Err(ClientError::Connection(err.to_string()))
        }
    }?;
    debug!("amqp connected");

    Ok(connection)
}

/// Builds the dial target from the resolved configuration.
///
/// The URI is assembled field by field rather than formatted and re-parsed,
/// so virtual hosts that need percent-encoding in their textual form (such
/// as the default `/`) are passed through unmangled.
fn amqp_uri(config: &ResolvedConfig) -> AMQPUri {
    AMQPUri {
        scheme: AMQPScheme::AMQP,
        authority: AMQPAuthority {
            userinfo: AMQPUserInfo {
                username: config.login.clone(),
                password: config.password.clone(),
            },
            host: config.host.clone(),
            port: config.port,
        },
        vhost: config.vhost.clone(),
        query: Default::default(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved() -> ResolvedConfig {
        ResolvedConfig {
            host: "broker.internal".to_owned(),
            port: 5672,
            login: "svc".to_owned(),
            password: "secret".to_owned(),
            queue: "hooks".to_owned(),
            vhost: "/".to_owned(),
        }
    }

    #[test]
    fn amqp_uri_carries_all_resolved_values() {
        let uri = amqp_uri(&resolved());

        assert_eq!(uri.scheme, AMQPScheme::AMQP);
        assert_eq!(uri.authority.host, "broker.internal");
        assert_eq!(uri.authority.port, 5672);
        assert_eq!(uri.authority.userinfo.username, "svc");
        assert_eq!(uri.authority.userinfo.password, "secret");
        assert_eq!(uri.vhost, "/");
    }

    #[test]
    fn default_vhost_is_not_percent_encoded() {
        let uri = amqp_uri(&resolved());

        assert_eq!(uri.vhost, "/");
    }
}
