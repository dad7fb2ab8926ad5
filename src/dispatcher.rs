//! The event dispatcher.

use crate::channel::ChannelRegistry;
use crate::connection::{Connection, ConnectionManager};
use crate::error::{DispatchError, DispatchResult};
use crate::event::Event;
use crate::event_map::EventMap;
use serde_json::Value;
use std::sync::Arc;

/// Dispatcher configuration.
#[derive(Debug, Clone)]
pub struct DispatcherConfig {
    /// Abort remaining handlers for an event on the first failure.
    ///
    /// When `false`, every binding runs; failures are logged and the first
    /// one is returned after the rest have completed.
    pub fail_fast: bool,
}

impl Default for DispatcherConfig {
    fn default() -> Self {
        Self { fail_fast: true }
    }
}

impl DispatcherConfig {
    /// Set the handler failure policy.
    pub fn fail_fast(mut self, enabled: bool) -> Self {
        self.fail_fast = enabled;
        self
    }
}

/// Routes events to their handlers or channel and delivers results.
///
/// The dispatcher holds no per-call state; every entry point is a
/// self-contained transaction over the shared routing table, connection set,
/// and channel registry, so dispatch for different connections may run on
/// concurrent tasks.
pub struct Dispatcher {
    event_map: Arc<EventMap>,
    connections: Arc<ConnectionManager>,
    channels: Arc<ChannelRegistry>,
    config: DispatcherConfig,
}

impl Dispatcher {
    /// Create a dispatcher with the default configuration.
    pub fn new(
        event_map: Arc<EventMap>,
        connections: Arc<ConnectionManager>,
        channels: Arc<ChannelRegistry>,
    ) -> Self {
        Self::with_config(event_map, connections, channels, DispatcherConfig::default())
    }

    /// Create a dispatcher with a custom configuration.
    pub fn with_config(
        event_map: Arc<EventMap>,
        connections: Arc<ConnectionManager>,
        channels: Arc<ChannelRegistry>,
        config: DispatcherConfig,
    ) -> Self {
        Self {
            event_map,
            connections,
            channels,
            config,
        }
    }

    /// Get the routing table.
    pub fn event_map(&self) -> &Arc<EventMap> {
        &self.event_map
    }

    /// Get the connection manager.
    pub fn connections(&self) -> &Arc<ConnectionManager> {
        &self.connections
    }

    /// Get the channel registry.
    pub fn channels(&self) -> &Arc<ChannelRegistry> {
        &self.channels
    }

    /// Decode a wire message from `connection` and dispatch it.
    ///
    /// Decode failures surface as [`DispatchError::Decode`]; the connection
    /// is left open.
    pub async fn receive_encoded(&self, raw: &[u8], connection: Connection) -> DispatchResult<()> {
        let event = Event::from_json(raw, connection)?;
        self.dispatch(&event).await
    }

    /// Construct an event bound to `connection` and dispatch it.
    pub async fn receive(
        &self,
        name: &str,
        data: Value,
        connection: Connection,
    ) -> DispatchResult<()> {
        let event = Event::new(name, data)?.with_connection(connection);
        self.dispatch(&event).await
    }

    /// Resolve an event and invoke what it resolves to.
    ///
    /// Channel events are forwarded whole to the registered channel and never
    /// reach handler resolution. All other events run their bindings in
    /// registration order, each awaited before the next; an event with no
    /// bindings is a no-op.
    pub async fn dispatch(&self, event: &Event) -> DispatchResult<()> {
        tracing::debug!(event = %event.name(), id = %event.id(), "Dispatching event");

        if let Some(channel_name) = event.channel() {
            let channel = self
                .channels
                .get(channel_name)
                .ok_or_else(|| DispatchError::UnknownChannel(channel_name.to_string()))?;
            channel.trigger_event(event);
            return Ok(());
        }

        let mut first_error = None;
        for handler in self.event_map.routes_for(event.name()) {
            match handler.handle(event).await {
                Ok(()) => {}
                Err(e) => {
                    tracing::error!(event = %event.name(), error = %e, "Event handler failed");
                    let error = DispatchError::Handler {
                        event: event.name().to_string(),
                        source: e,
                    };
                    if self.config.fail_fast {
                        return Err(error);
                    }
                    first_error.get_or_insert(error);
                }
            }
        }

        match first_error {
            Some(error) => Err(error),
            None => Ok(()),
        }
    }

    /// Deliver an event back to its originating connection.
    pub fn send_message(&self, event: &Event) -> DispatchResult<()> {
        let connection = event.connection().ok_or(DispatchError::NoConnection)?;
        connection.trigger(event)
    }

    /// Deliver an event to every current connection.
    ///
    /// Enumeration is a snapshot; a connection closing mid-broadcast is
    /// logged and skipped, never an error. Returns the number of connections
    /// the event was delivered to.
    pub fn broadcast_message(&self, event: &Event) -> usize {
        let mut delivered = 0;
        for connection in self.connections.connections() {
            match connection.trigger(event) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        connection_id = %connection.id,
                        error = %e,
                        "Skipping undeliverable connection during broadcast"
                    );
                }
            }
        }
        delivered
    }
}
