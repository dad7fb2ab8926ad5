//! Named channels and the channel registry.

use crate::connection::{Connection, ConnectionId};
use crate::event::Event;
use dashmap::DashMap;
use std::sync::Arc;

/// A named channel grouping subscribed connections.
///
/// Channel events bypass handler resolution entirely; the dispatcher forwards
/// them here and [`trigger_event`](Channel::trigger_event) fans them out to
/// every subscriber.
pub struct Channel {
    /// Channel name
    pub name: String,
    /// Subscribed connections
    subscribers: DashMap<ConnectionId, Connection>,
}

impl Channel {
    /// Create a new channel.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            subscribers: DashMap::new(),
        }
    }

    /// Subscribe a connection to the channel.
    pub fn subscribe(&self, connection: Connection) {
        self.subscribers.insert(connection.id.clone(), connection);
    }

    /// Unsubscribe a connection from the channel.
    pub fn unsubscribe(&self, connection_id: &str) -> bool {
        self.subscribers.remove(connection_id).is_some()
    }

    /// Check if a connection is subscribed.
    pub fn contains(&self, connection_id: &str) -> bool {
        self.subscribers.contains_key(connection_id)
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    /// Check if the channel has no subscribers.
    pub fn is_empty(&self) -> bool {
        self.subscribers.is_empty()
    }

    /// Forward an event to every subscriber.
    ///
    /// Delivery failures are logged and skipped so one dead subscriber never
    /// blocks the rest. Returns the number of successful deliveries.
    pub fn trigger_event(&self, event: &Event) -> usize {
        let subscribers: Vec<Connection> =
            self.subscribers.iter().map(|c| c.value().clone()).collect();

        let mut delivered = 0;
        for connection in subscribers {
            match connection.trigger(event) {
                Ok(()) => delivered += 1,
                Err(e) => {
                    tracing::warn!(
                        channel = %self.name,
                        connection_id = %connection.id,
                        error = %e,
                        "Skipping undeliverable channel subscriber"
                    );
                }
            }
        }
        delivered
    }
}

impl std::fmt::Debug for Channel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Channel")
            .field("name", &self.name)
            .field("subscribers", &self.subscriber_count())
            .finish()
    }
}

/// Registry of channels, injected into the dispatcher at construction.
///
/// Populated at startup and read thereafter; lookup of an unregistered name
/// returns `None` rather than creating a channel.
pub struct ChannelRegistry {
    channels: DashMap<String, Arc<Channel>>,
}

impl ChannelRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            channels: DashMap::new(),
        }
    }

    /// Register a channel, returning the existing one if already present.
    pub fn register(&self, name: impl Into<String>) -> Arc<Channel> {
        let name = name.into();
        self.channels
            .entry(name.clone())
            .or_insert_with(|| {
                tracing::debug!(channel = %name, "Channel registered");
                Arc::new(Channel::new(name))
            })
            .clone()
    }

    /// Look up a channel by name.
    pub fn get(&self, name: &str) -> Option<Arc<Channel>> {
        self.channels.get(name).map(|c| c.clone())
    }

    /// All registered channel names.
    pub fn channel_names(&self) -> Vec<String> {
        self.channels.iter().map(|c| c.key().clone()).collect()
    }

    /// Get the total number of channels.
    pub fn channel_count(&self) -> usize {
        self.channels.len()
    }
}

impl Default for ChannelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_subscribe_and_trigger() {
        let channel = Channel::new("lobby");
        let (c1, mut rx1) = Connection::open("a".to_string());
        let (c2, mut rx2) = Connection::open("b".to_string());
        channel.subscribe(c1);
        channel.subscribe(c2);

        let event = Event::new("post", json!({"text": "hi"}))
            .unwrap()
            .with_channel("lobby");
        assert_eq!(channel.trigger_event(&event), 2);

        for rx in [&mut rx1, &mut rx2] {
            let wire: serde_json::Value = rx.try_recv().unwrap().parse_json().unwrap();
            assert_eq!(wire["name"], "post");
            assert_eq!(wire["channel"], "lobby");
        }
    }

    #[test]
    fn test_dead_subscriber_is_skipped() {
        let channel = Channel::new("lobby");
        let (c1, mut rx1) = Connection::open("a".to_string());
        let (c2, rx2) = Connection::open("b".to_string());
        channel.subscribe(c1);
        channel.subscribe(c2);
        drop(rx2);

        let event = Event::new("post", json!({})).unwrap().with_channel("lobby");
        assert_eq!(channel.trigger_event(&event), 1);
        assert!(rx1.try_recv().is_ok());
    }

    #[test]
    fn test_unsubscribe() {
        let channel = Channel::new("lobby");
        let (c1, _rx) = Connection::open("a".to_string());
        channel.subscribe(c1);
        assert!(channel.contains("a"));
        assert!(channel.unsubscribe("a"));
        assert!(!channel.unsubscribe("a"));
        assert!(channel.is_empty());
    }

    #[test]
    fn test_registry_register_is_idempotent() {
        let registry = ChannelRegistry::new();
        let first = registry.register("lobby");
        let second = registry.register("lobby");
        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(registry.channel_count(), 1);
    }

    #[test]
    fn test_registry_lookup() {
        let registry = ChannelRegistry::new();
        registry.register("lobby");
        assert!(registry.get("lobby").is_some());
        assert!(registry.get("missing").is_none());
        assert_eq!(registry.channel_names(), vec!["lobby".to_string()]);
    }
}
