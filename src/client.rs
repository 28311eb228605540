// Copyright (c) 2025, The Ruskit Authors
// MIT License
// All rights reserved.

//! # Queue Publishing Client
//!
//! This module provides the client that publishes hook messages to a
//! RabbitMQ queue. The client resolves its configuration once, lazily opens
//! a connection and a channel on first use, heals dropped connections before
//! every publish, and releases both resources on [`QueueClient::close`].
//!
//! Publishing uses the default exchange with the configured queue name as
//! the routing key. The convenience operations (verb-shaped senders and the
//! builders) are forwarded to an [`Adapter`] that is constructed lazily on
//! the first delegated call.

use crate::{
    adapter::{Adapter, HookAdapter},
    config::{resolve, ClientOptions, ResolvedConfig},
    errors::ClientError,
    message::{ContentBuilder, MessageBuilder, QueueMessage},
    transport::{BrokerChannel, BrokerConnection, BrokerTransport, LapinTransport},
};
use serde_json::Value;
use std::collections::BTreeMap;
use tracing::{debug, warn};

/// Configuration resolution progress for a client instance.
enum ConfigState {
    /// Resolution has not run, or its last run failed
    Pending,
    /// Resolution succeeded; the values are reused by every later operation
    Resolved(ResolvedConfig),
}

/// Arguments for an operation resolved by name through [`QueueClient::dispatch`].
///
/// # Example
/// ```
/// use rabbitmq_hooks::client::DynamicCall;
/// use serde_json::json;
///
/// let call = DynamicCall::new("https://example.test/hook")
///     .data(json!({"event": "created"}))
///     .id("hook-7");
/// ```
#[derive(Debug, Clone, Default)]
pub struct DynamicCall {
    pub uri: String,
    pub data: Option<Value>,
    pub id: Option<String>,
}

impl DynamicCall {
    /// Creates a call targeting the given URI, without a body or explicit id.
    pub fn new(uri: impl Into<String>) -> DynamicCall {
        DynamicCall {
            uri: uri.into(),
            data: None,
            id: None,
        }
    }

    /// Attaches a body document.
    pub fn data(mut self, data: Value) -> Self {
        self.data = Some(data);
        self
    }

    /// Sets an explicit message id.
    pub fn id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }
}

/// A publishing client bound to one queue on one broker connection.
///
/// The client owns its connection and channel exclusively and is not
/// internally synchronized; every operation takes `&mut self`, so concurrent
/// use of one instance requires external serialization. One client per task
/// is the intended embedding.
///
/// # Example
/// ```no_run
/// use rabbitmq_hooks::client::QueueClient;
/// use rabbitmq_hooks::config::ClientOptions;
///
/// #[tokio::main]
/// async fn main() -> Result<(), rabbitmq_hooks::errors::ClientError> {
///     let options = ClientOptions::new()
///         .host("localhost")
///         .port(5672)
///         .login("guest")
///         .password("guest")
///         .queue("hooks")
///         .vhost("/");
///
///     let mut client = QueueClient::new(options);
///     client.send_http_post_empty("https://example.test/hook", None).await?;
///     client.close().await;
///
///     Ok(())
/// }
/// ```
pub struct QueueClient {
    options: ClientOptions,
    state: ConfigState,
    transport: Box<dyn BrokerTransport>,
    connection: Option<Box<dyn BrokerConnection>>,
    channel: Option<Box<dyn BrokerChannel>>,
    adapter: Option<Box<dyn Adapter>>,
}

impl QueueClient {
    /// Creates a client that connects through lapin.
    ///
    /// Nothing is validated or dialed here; configuration resolution and the
    /// connection happen on the first send.
    pub fn new(options: ClientOptions) -> QueueClient {
        QueueClient::with_transport(options, Box::new(LapinTransport::default()))
    }

    /// Creates a client over a custom transport.
    ///
    /// # Parameters
    /// * `options` - Construction options
    /// * `transport` - The transport used to dial the broker
    pub fn with_transport(
        options: ClientOptions,
        transport: Box<dyn BrokerTransport>,
    ) -> QueueClient {
        QueueClient {
            options,
            state: ConfigState::Pending,
            transport,
            connection: None,
            channel: None,
            adapter: None,
        }
    }

    /// Creates a client with a custom adapter for the delegated operations.
    pub fn with_adapter(options: ClientOptions, adapter: Box<dyn Adapter>) -> QueueClient {
        let mut client = QueueClient::new(options);
        client.adapter = Some(adapter);
        client
    }

    /// Publishes a message to the configured queue.
    ///
    /// Resolves the configuration and establishes the connection and channel
    /// if needed; both are cheap no-ops after the first successful call. The
    /// message is serialized to JSON and published on the default exchange
    /// with the queue name as routing key.
    ///
    /// Encoding and publish failures are logged once at warning level and
    /// then returned unchanged. Connection failures are returned without the
    /// warning.
    pub async fn send(&mut self, message: &QueueMessage) -> Result<(), ClientError> {
        let config = self.ensure_ready().await?;

        let result = self.publish(&config.queue, message).await;

        if let Err(err) = &result {
            warn!(error = err.to_string(), "failure to publish hook message");
        }

        result
    }

    /// Releases the channel and the connection, in that order.
    ///
    /// Safe to call at any time: a client that never connected has nothing
    /// to release, and a second call is a no-op. Close failures are logged
    /// and swallowed.
    pub async fn close(&mut self) {
        if let Some(channel) = self.channel.take() {
            if let Err(err) = channel.close().await {
                debug!(error = err.to_string(), "error closing channel");
            }
        }

        if let Some(connection) = self.connection.take() {
            if let Err(err) = connection.close().await {
                debug!(error = err.to_string(), "error closing connection");
            }
        }
    }

    /// Resolves the configuration on first use and caches it.
    ///
    /// A failed resolution leaves the state untouched, so the error recurs
    /// on the next call instead of being cached.
    fn ensure_resolved(&mut self) -> Result<ResolvedConfig, ClientError> {
        if let ConfigState::Resolved(config) = &self.state {
            return Ok(config.clone());
        }

        let resolved = match &self.options.environment {
            Some(environment) => {
                resolve(&self.options, |name| environment.get(name).cloned())?
            }
            None => resolve(&self.options, |name| std::env::var(name).ok())?,
        };

        self.state = ConfigState::Resolved(resolved.clone());

        Ok(resolved)
    }

    /// Brings the client into a publishable state.
    ///
    /// Creates the connection if absent, re-dials it if it reports
    /// disconnected, and opens a channel if absent. A reconnect alone does
    /// not replace an existing channel.
    async fn ensure_ready(&mut self) -> Result<ResolvedConfig, ClientError> {
        let config = self.ensure_resolved()?;

        if self.connection.is_none() {
            let connection = self.transport.connect(&config).await?;
            self.connection = Some(connection);
        }

        if let Some(connection) = self.connection.as_mut() {
            if !connection.is_connected() {
                connection.reconnect().await?;
            }

            if self.channel.is_none() {
                self.channel = Some(connection.open_channel().await?);
            }
        }

        Ok(config)
    }

    /// Encodes and publishes a message on the open channel.
    async fn publish(&self, queue: &str, message: &QueueMessage) -> Result<(), ClientError> {
        let channel = self
            .channel
            .as_ref()
            .ok_or_else(|| ClientError::Channel("channel is not open".to_owned()))?;

        let payload =
            serde_json::to_vec(message).map_err(|err| ClientError::Encode(err.to_string()))?;

        channel.publish("", queue, &payload).await
    }

    /// Returns the adapter, constructing the default one on first use.
    fn delegate(&mut self) -> &dyn Adapter {
        self.adapter
            .get_or_insert_with(|| Box::new(HookAdapter::new()))
            .as_ref()
    }

    /// Hands out a message builder from the adapter.
    pub fn message_builder(&mut self) -> MessageBuilder {
        self.delegate().message_builder()
    }

    /// Hands out a content builder from the adapter.
    pub fn content_builder(&mut self) -> ContentBuilder {
        self.delegate().content_builder()
    }

    /// Sends a GET hook with an empty body.
    pub async fn send_http_get_empty(
        &mut self,
        uri: &str,
        id: Option<&str>,
    ) -> Result<(), ClientError> {
        let message = self.delegate().http_get_empty(uri, id);
        self.send(&message).await
    }

    /// Sends a POST hook with an empty body.
    pub async fn send_http_post_empty(
        &mut self,
        uri: &str,
        id: Option<&str>,
    ) -> Result<(), ClientError> {
        let message = self.delegate().http_post_empty(uri, id);
        self.send(&message).await
    }

    /// Sends a PUT hook with an empty body.
    pub async fn send_http_put_empty(
        &mut self,
        uri: &str,
        id: Option<&str>,
    ) -> Result<(), ClientError> {
        let message = self.delegate().http_put_empty(uri, id);
        self.send(&message).await
    }

    /// Sends a DELETE hook with an empty body.
    pub async fn send_http_delete_empty(
        &mut self,
        uri: &str,
        id: Option<&str>,
    ) -> Result<(), ClientError> {
        let message = self.delegate().http_delete_empty(uri, id);
        self.send(&message).await
    }

    /// Sends a GET hook with a JSON body.
    pub async fn send_http_get_json(
        &mut self,
        uri: &str,
        data: Value,
        id: Option<&str>,
    ) -> Result<(), ClientError> {
        let message = self.delegate().http_get_json(uri, data, id);
        self.send(&message).await
    }

    /// Sends a POST hook with a JSON body.
    pub async fn send_http_post_json(
        &mut self,
        uri: &str,
        data: Value,
        id: Option<&str>,
    ) -> Result<(), ClientError> {
        let message = self.delegate().http_post_json(uri, data, id);
        self.send(&message).await
    }

    /// Sends a PUT hook with a JSON body.
    pub async fn send_http_put_json(
        &mut self,
        uri: &str,
        data: Value,
        id: Option<&str>,
    ) -> Result<(), ClientError> {
        let message = self.delegate().http_put_json(uri, data, id);
        self.send(&message).await
    }

    /// Sends a DELETE hook with a JSON body.
    pub async fn send_http_delete_json(
        &mut self,
        uri: &str,
        data: Value,
        id: Option<&str>,
    ) -> Result<(), ClientError> {
        let message = self.delegate().http_delete_json(uri, data, id);
        self.send(&message).await
    }

    /// Sends a GET hook with a form body.
    pub async fn send_http_get_form(
        &mut self,
        uri: &str,
        data: BTreeMap<String, String>,
        id: Option<&str>,
    ) -> Result<(), ClientError> {
        let message = self.delegate().http_get_form(uri, data, id);
        self.send(&message).await
    }

    /// Sends a POST hook with a form body.
    pub async fn send_http_post_form(
        &mut self,
        uri: &str,
        data: BTreeMap<String, String>,
        id: Option<&str>,
    ) -> Result<(), ClientError> {
        let message = self.delegate().http_post_form(uri, data, id);
        self.send(&message).await
    }

    /// Sends a PUT hook with a form body.
    pub async fn send_http_put_form(
        &mut self,
        uri: &str,
        data: BTreeMap<String, String>,
        id: Option<&str>,
    ) -> Result<(), ClientError> {
        let message = self.delegate().http_put_form(uri, data, id);
        self.send(&message).await
    }

    /// Sends a DELETE hook with a form body.
    pub async fn send_http_delete_form(
        &mut self,
        uri: &str,
        data: BTreeMap<String, String>,
        id: Option<&str>,
    ) -> Result<(), ClientError> {
        let message = self.delegate().http_delete_form(uri, data, id);
        self.send(&message).await
    }

    /// Invokes a delegated send operation by name.
    ///
    /// Recognized names are the twelve verb-shaped senders
    /// (`send_http_<get|post|put|delete>_<empty|json|form>`). Anything else
    /// fails with [`ClientError::UnknownOperation`]. The builder-returning
    /// operations are resolved at compile time and are deliberately not part
    /// of this table.
    ///
    /// For JSON operations a missing body is sent as JSON `null`. For form
    /// operations the body must be absent or a JSON object with string
    /// values; anything else fails with [`ClientError::InvalidArguments`].
    pub async fn dispatch(
        &mut self,
        operation: &str,
        call: DynamicCall,
    ) -> Result<(), ClientError> {
        let DynamicCall { uri, data, id } = call;
        let id = id.as_deref();

        let message = match operation {
            "send_http_get_empty" => self.delegate().http_get_empty(&uri, id),
            "send_http_post_empty" => self.delegate().http_post_empty(&uri, id),
            "send_http_put_empty" => self.delegate().http_put_empty(&uri, id),
            "send_http_delete_empty" => self.delegate().http_delete_empty(&uri, id),
            "send_http_get_json" => {
                self.delegate()
                    .http_get_json(&uri, data.unwrap_or(Value::Null), id)
            }
            "send_http_post_json" => {
                self.delegate()
                    .http_post_json(&uri, data.unwrap_or(Value::Null), id)
            }
            "send_http_put_json" => {
                self.delegate()
                    .http_put_json(&uri, data.unwrap_or(Value::Null), id)
            }
            "send_http_delete_json" => {
                self.delegate()
                    .http_delete_json(&uri, data.unwrap_or(Value::Null), id)
            }
            "send_http_get_form" => {
                let fields = form_fields(operation, data)?;
                self.delegate().http_get_form(&uri, fields, id)
            }
            "send_http_post_form" => {
                let fields = form_fields(operation, data)?;
                self.delegate().http_post_form(&uri, fields, id)
            }
            "send_http_put_form" => {
                let fields = form_fields(operation, data)?;
                self.delegate().http_put_form(&uri, fields, id)
            }
            "send_http_delete_form" => {
                let fields = form_fields(operation, data)?;
                self.delegate().http_delete_form(&uri, fields, id)
            }
            _ => return Err(ClientError::UnknownOperation(operation.to_owned())),
        };

        self.send(&message).await
    }
}

/// Converts a dispatch body into form fields.
///
/// An absent body is an empty form; a JSON object with string values maps
/// field by field; anything else does not fit a form operation.
fn form_fields(
    operation: &str,
    data: Option<Value>,
) -> Result<BTreeMap<String, String>, ClientError> {
    match data {
        None => Ok(BTreeMap::new()),
        Some(Value::Object(entries)) => {
            let mut fields = BTreeMap::new();
            for (key, value) in entries {
                match value {
                    Value::String(value) => {
                        fields.insert(key, value);
                    }
                    _ => return Err(ClientError::InvalidArguments(operation.to_owned())),
                }
            }
            Ok(fields)
        }
        Some(_) => Err(ClientError::InvalidArguments(operation.to_owned())),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::{HttpMethod, MessageContent};
    use crate::transport::{MockBrokerChannel, MockBrokerConnection, MockBrokerTransport};
    use mockall::Sequence;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Arc;
    use tracing::Level;
    use tracing_subscriber::layer::SubscriberExt;

    /// Counts warning events emitted while a test runs.
    #[derive(Clone, Default)]
    struct WarnCounter {
        warnings: Arc<AtomicUsize>,
    }

    impl<S: tracing::Subscriber> tracing_subscriber::Layer<S> for WarnCounter {
        fn on_event(
            &self,
            event: &tracing::Event<'_>,
            _ctx: tracing_subscriber::layer::Context<'_, S>,
        ) {
            if *event.metadata().level() == Level::WARN {
                self.warnings.fetch_add(1, Ordering::SeqCst);
            }
        }
    }

    fn options() -> ClientOptions {
        ClientOptions::new()
            .host("h")
            .port(5672)
            .login("u")
            .password("p")
            .queue("q")
            .vhost("/")
            .environment(HashMap::new())
    }

    fn hook() -> QueueMessage {
        MessageBuilder::new()
            .uri("https://example.test/hook")
            .id("hook-1")
            .build()
    }

    fn healthy_connection(sends: usize, channel: MockBrokerChannel) -> MockBrokerConnection {
        let mut connection = MockBrokerConnection::new();
        connection
            .expect_is_connected()
            .times(sends)
            .return_const(true);
        connection.expect_reconnect().never();
        connection
            .expect_open_channel()
            .times(1)
            .return_once(move || Ok(Box::new(channel) as Box<dyn BrokerChannel>));
        connection
    }

    fn transport_with(connection: MockBrokerConnection) -> MockBrokerTransport {
        let mut transport = MockBrokerTransport::new();
        transport
            .expect_connect()
            .times(1)
            .return_once(move |_| Ok(Box::new(connection) as Box<dyn BrokerConnection>));
        transport
    }

    #[tokio::test]
    async fn send_reuses_connection_and_channel() {
        let mut channel = MockBrokerChannel::new();
        channel.expect_publish().times(2).returning(|_, _, _| Ok(()));

        let transport = transport_with(healthy_connection(2, channel));
        let mut client = QueueClient::with_transport(options(), Box::new(transport));

        client.send(&hook()).await.unwrap();
        client.send(&hook()).await.unwrap();
    }

    #[tokio::test]
    async fn send_publishes_to_the_resolved_queue_with_default_exchange() {
        let message = hook();
        let expected = serde_json::to_vec(&message).unwrap();

        let mut channel = MockBrokerChannel::new();
        channel
            .expect_publish()
            .times(1)
            .withf(move |exchange: &str, routing_key: &str, payload: &[u8]| {
                exchange.is_empty() && routing_key == "q" && payload == expected.as_slice()
            })
            .returning(|_, _, _| Ok(()));

        let transport = transport_with(healthy_connection(1, channel));
        let mut client = QueueClient::with_transport(options(), Box::new(transport));

        client.send(&message).await.unwrap();
    }

    #[tokio::test]
    async fn reconnect_does_not_replace_the_channel() {
        let mut channel = MockBrokerChannel::new();
        channel.expect_publish().times(2).returning(|_, _, _| Ok(()));

        let mut connection = MockBrokerConnection::new();
        connection
            .expect_is_connected()
            .times(1)
            .return_const(true);
        connection
            .expect_is_connected()
            .times(1)
            .return_const(false);
        connection.expect_reconnect().times(1).returning(|| Ok(()));
        connection
            .expect_open_channel()
            .times(1)
            .return_once(move || Ok(Box::new(channel) as Box<dyn BrokerChannel>));

        let transport = transport_with(connection);
        let mut client = QueueClient::with_transport(options(), Box::new(transport));

        client.send(&hook()).await.unwrap();
        client.send(&hook()).await.unwrap();
    }

    #[tokio::test]
    async fn close_without_sends_touches_nothing() {
        let mut transport = MockBrokerTransport::new();
        transport.expect_connect().never();

        let mut client = QueueClient::with_transport(options(), Box::new(transport));

        client.close().await;
        client.close().await;
    }

    #[tokio::test]
    async fn close_releases_channel_before_connection_exactly_once() {
        let mut sequence = Sequence::new();

        let mut channel = MockBrokerChannel::new();
        channel.expect_publish().times(1).returning(|_, _, _| Ok(()));
        channel
            .expect_close()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|| Ok(()));

        let mut connection = MockBrokerConnection::new();
        connection.expect_is_connected().times(1).return_const(true);
        connection
            .expect_open_channel()
            .times(1)
            .return_once(move || Ok(Box::new(channel) as Box<dyn BrokerChannel>));
        connection
            .expect_close()
            .times(1)
            .in_sequence(&mut sequence)
            .returning(|| Ok(()));

        let transport = transport_with(connection);
        let mut client = QueueClient::with_transport(options(), Box::new(transport));

        client.send(&hook()).await.unwrap();
        client.close().await;
        client.close().await;
    }

    #[tokio::test]
    async fn close_swallows_transport_errors() {
        let mut channel = MockBrokerChannel::new();
        channel.expect_publish().times(1).returning(|_, _, _| Ok(()));
        channel
            .expect_close()
            .times(1)
            .returning(|| Err(ClientError::Channel("already closed".to_owned())));

        let mut connection = MockBrokerConnection::new();
        connection.expect_is_connected().times(1).return_const(true);
        connection
            .expect_open_channel()
            .times(1)
            .return_once(move || Ok(Box::new(channel) as Box<dyn BrokerChannel>));
        connection
            .expect_close()
            .times(1)
            .returning(|| Err(ClientError::Connection("already closed".to_owned())));

        let transport = transport_with(connection);
        let mut client = QueueClient::with_transport(options(), Box::new(transport));

        client.send(&hook()).await.unwrap();
        client.close().await;
    }

    #[tokio::test]
    async fn publish_failure_warns_once_and_propagates_unchanged() {
        let counter = WarnCounter::default();
        let warnings = counter.warnings.clone();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(counter));

        let mut channel = MockBrokerChannel::new();
        channel
            .expect_publish()
            .times(1)
            .returning(|_, _, _| Err(ClientError::Publish("boom".to_owned())));

        let transport = transport_with(healthy_connection(1, channel));
        let mut client = QueueClient::with_transport(options(), Box::new(transport));

        let err = client.send(&hook()).await.unwrap_err();

        assert_eq!(err, ClientError::Publish("boom".to_owned()));
        assert_eq!(warnings.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn connect_failure_propagates_without_a_publish_warning() {
        let counter = WarnCounter::default();
        let warnings = counter.warnings.clone();
        let _guard =
            tracing::subscriber::set_default(tracing_subscriber::registry().with(counter));

        let mut transport = MockBrokerTransport::new();
        transport
            .expect_connect()
            .times(2)
            .returning(|_| Err(ClientError::Connection("connection refused".to_owned())));

        let mut client = QueueClient::with_transport(options(), Box::new(transport));

        let err = client.send(&hook()).await.unwrap_err();
        assert_eq!(err, ClientError::Connection("connection refused".to_owned()));

        // A failed dial leaves no connection behind; the next send dials again.
        let err = client.send(&hook()).await.unwrap_err();
        assert_eq!(err, ClientError::Connection("connection refused".to_owned()));

        assert_eq!(warnings.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn missing_config_fails_before_any_connection() {
        let mut transport = MockBrokerTransport::new();
        transport.expect_connect().never();

        let options = ClientOptions::new().environment(HashMap::new());
        let mut client = QueueClient::with_transport(options, Box::new(transport));

        let err = client.send(&hook()).await.unwrap_err();
        assert_eq!(err, ClientError::MissingConfig("host"));

        // Resolution failed, so it runs (and fails) again on the next send.
        let err = client.send(&hook()).await.unwrap_err();
        assert_eq!(err, ClientError::MissingConfig("host"));
    }

    #[tokio::test]
    async fn configuration_is_resolved_once() {
        let mut channel = MockBrokerChannel::new();
        channel.expect_publish().times(2).returning(|_, _, _| Ok(()));

        let transport = transport_with(healthy_connection(2, channel));

        // All values come from the environment override; resolution caches
        // them after the first send.
        let environment: HashMap<String, String> = [
            (crate::config::ENV_HOST, "h"),
            (crate::config::ENV_PORT, "5672"),
            (crate::config::ENV_LOGIN, "u"),
            (crate::config::ENV_PASSWORD, "p"),
            (crate::config::ENV_QUEUE, "q"),
            (crate::config::ENV_VHOST, "/"),
        ]
        .into_iter()
        .map(|(key, value)| (key.to_owned(), value.to_owned()))
        .collect();
        let options = ClientOptions::new().environment(environment);

        let mut client = QueueClient::with_transport(options, Box::new(transport));
        assert!(matches!(client.state, ConfigState::Pending));

        client.send(&hook()).await.unwrap();
        assert!(matches!(client.state, ConfigState::Resolved(_)));

        client.send(&hook()).await.unwrap();
    }

    #[test]
    fn adapter_is_constructed_lazily_and_reused() {
        let mut transport = MockBrokerTransport::new();
        transport.expect_connect().never();

        let mut client = QueueClient::with_transport(options(), Box::new(transport));
        assert!(client.adapter.is_none());

        let _ = client.message_builder();
        let first = client
            .adapter
            .as_ref()
            .map(|adapter| adapter.as_ref() as *const dyn Adapter as *const ());
        assert!(first.is_some());

        let _ = client.content_builder();
        let second = client
            .adapter
            .as_ref()
            .map(|adapter| adapter.as_ref() as *const dyn Adapter as *const ());

        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn dispatch_builds_and_publishes_for_known_operations() {
        let mut channel = MockBrokerChannel::new();
        channel
            .expect_publish()
            .times(1)
            .withf(|_: &str, routing_key: &str, payload: &[u8]| {
                let message: QueueMessage = serde_json::from_slice(payload).unwrap();
                routing_key == "q"
                    && message.method == HttpMethod::Delete
                    && message.uri == "https://example.test/hook"
                    && message.id == "hook-9"
                    && message.content == MessageContent::Json(json!({"a": 1}))
            })
            .returning(|_, _, _| Ok(()));

        let transport = transport_with(healthy_connection(1, channel));
        let mut client = QueueClient::with_transport(options(), Box::new(transport));

        client
            .dispatch(
                "send_http_delete_json",
                DynamicCall::new("https://example.test/hook")
                    .data(json!({"a": 1}))
                    .id("hook-9"),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn dispatch_sends_null_for_a_json_operation_without_data() {
        let mut channel = MockBrokerChannel::new();
        channel
            .expect_publish()
            .times(1)
            .withf(|_: &str, _: &str, payload: &[u8]| {
                let message: QueueMessage = serde_json::from_slice(payload).unwrap();
                message.content == MessageContent::Json(Value::Null)
            })
            .returning(|_, _, _| Ok(()));

        let transport = transport_with(healthy_connection(1, channel));
        let mut client = QueueClient::with_transport(options(), Box::new(transport));

        client
            .dispatch(
                "send_http_get_json",
                DynamicCall::new("https://example.test/hook"),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn dispatch_rejects_unknown_operations() {
        let mut transport = MockBrokerTransport::new();
        transport.expect_connect().never();

        let mut client = QueueClient::with_transport(options(), Box::new(transport));

        let err = client
            .dispatch(
                "send_http_patch_json",
                DynamicCall::new("https://example.test/hook"),
            )
            .await
            .unwrap_err();

        assert_eq!(
            err,
            ClientError::UnknownOperation("send_http_patch_json".to_owned())
        );
    }

    #[tokio::test]
    async fn dispatch_rejects_a_body_that_does_not_fit_a_form() {
        let mut transport = MockBrokerTransport::new();
        transport.expect_connect().never();

        let mut client = QueueClient::with_transport(options(), Box::new(transport));

        let err = client
            .dispatch(
                "send_http_post_form",
                DynamicCall::new("https://example.test/hook").data(json!("not-a-form")),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::InvalidArguments("send_http_post_form".to_owned())
        );

        let err = client
            .dispatch(
                "send_http_post_form",
                DynamicCall::new("https://example.test/hook").data(json!({"count": 3})),
            )
            .await
            .unwrap_err();
        assert_eq!(
            err,
            ClientError::InvalidArguments("send_http_post_form".to_owned())
        );
    }

    #[tokio::test]
    async fn convenience_senders_publish_adapter_messages() {
        let mut channel = MockBrokerChannel::new();
        channel
            .expect_publish()
            .times(1)
            .withf(|_: &str, _: &str, payload: &[u8]| {
                let message: QueueMessage = serde_json::from_slice(payload).unwrap();
                message.method == HttpMethod::Post && message.content == MessageContent::Empty
            })
            .returning(|_, _, _| Ok(()));

        let transport = transport_with(healthy_connection(1, channel));
        let mut client = QueueClient::with_transport(options(), Box::new(transport));

        client
            .send_http_post_empty("https://example.test/hook", Some("hook-2"))
            .await
            .unwrap();
    }
}
