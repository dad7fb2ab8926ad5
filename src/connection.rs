//! Connection handles and the live connection set.

use crate::error::{DispatchError, DispatchResult};
use crate::event::Event;
use crate::message::Message;
use dashmap::DashMap;
use parking_lot::RwLock;
use std::sync::Arc;
use tokio::sync::mpsc;

/// Unique identifier for a connection.
pub type ConnectionId = String;

/// Connection state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Connection is open and ready
    Open,
    /// Connection is closing
    Closing,
    /// Connection is closed
    Closed,
}

/// A handle to one client session.
///
/// The handle is the dispatcher's only view of a client: [`trigger`] encodes
/// an event and enqueues it on the outbound queue the transport layer drains.
///
/// [`trigger`]: Connection::trigger
pub struct Connection {
    /// Unique connection identifier
    pub id: ConnectionId,
    /// Connection state
    state: Arc<RwLock<ConnectionState>>,
    /// Sender for outgoing frames
    tx: mpsc::UnboundedSender<Message>,
}

impl Connection {
    /// Create a connection over an existing outbound queue.
    pub fn new(id: ConnectionId, tx: mpsc::UnboundedSender<Message>) -> Self {
        Self {
            id,
            state: Arc::new(RwLock::new(ConnectionState::Open)),
            tx,
        }
    }

    /// Create a connection backed by a fresh outbound queue.
    ///
    /// Returns the receiver the transport's writer task drains.
    pub fn open(id: ConnectionId) -> (Self, mpsc::UnboundedReceiver<Message>) {
        let (tx, rx) = mpsc::unbounded_channel();
        (Self::new(id, tx), rx)
    }

    /// Get the connection state.
    pub fn state(&self) -> ConnectionState {
        *self.state.read()
    }

    /// Check if the connection is open.
    pub fn is_open(&self) -> bool {
        self.state() == ConnectionState::Open
    }

    /// Deliver an event to this client.
    ///
    /// The event is encoded to its wire form and enqueued; actual socket
    /// writes happen in the transport layer.
    pub fn trigger(&self, event: &Event) -> DispatchResult<()> {
        if !self.is_open() {
            return Err(DispatchError::ConnectionClosed);
        }
        let message = event.to_message()?;
        self.tx
            .send(message)
            .map_err(|e| DispatchError::Send(e.to_string()))
    }

    /// Close the connection.
    pub fn close(&self) {
        *self.state.write() = ConnectionState::Closing;
        let _ = self.tx.send(Message::close());
    }

    /// Set the connection state (transport layer use).
    pub fn set_state(&self, state: ConnectionState) {
        *self.state.write() = state;
    }
}

impl Clone for Connection {
    fn clone(&self) -> Self {
        Self {
            id: self.id.clone(),
            state: Arc::clone(&self.state),
            tx: self.tx.clone(),
        }
    }
}

impl std::fmt::Debug for Connection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Connection")
            .field("id", &self.id)
            .field("state", &self.state())
            .finish()
    }
}

/// Tracks the live set of connections.
///
/// Registration and removal race safely with broadcast enumeration;
/// [`connections`](ConnectionManager::connections) takes a snapshot so no
/// lock is held across delivery.
pub struct ConnectionManager {
    connections: DashMap<ConnectionId, Connection>,
}

impl ConnectionManager {
    /// Create a new connection manager.
    pub fn new() -> Self {
        Self {
            connections: DashMap::new(),
        }
    }

    /// Register a connection.
    pub fn register(&self, connection: Connection) {
        tracing::debug!(connection_id = %connection.id, "Connection registered");
        self.connections.insert(connection.id.clone(), connection);
    }

    /// Unregister a connection.
    pub fn unregister(&self, connection_id: &str) -> bool {
        let removed = self.connections.remove(connection_id).is_some();
        if removed {
            tracing::debug!(connection_id = %connection_id, "Connection unregistered");
        }
        removed
    }

    /// Get a connection by ID.
    pub fn get(&self, connection_id: &str) -> Option<Connection> {
        self.connections.get(connection_id).map(|c| c.clone())
    }

    /// Snapshot of all current connections.
    pub fn connections(&self) -> Vec<Connection> {
        self.connections.iter().map(|c| c.value().clone()).collect()
    }

    /// Get all connection IDs.
    pub fn connection_ids(&self) -> Vec<ConnectionId> {
        self.connections.iter().map(|c| c.key().clone()).collect()
    }

    /// Get the total number of connections.
    pub fn connection_count(&self) -> usize {
        self.connections.len()
    }
}

impl Default for ConnectionManager {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_trigger_enqueues_encoded_event() {
        let (connection, mut rx) = Connection::open("conn-1".to_string());
        let event = Event::new("ping", serde_json::json!({"n": 1})).unwrap();

        connection.trigger(&event).unwrap();

        let message = rx.try_recv().unwrap();
        let wire: serde_json::Value = message.parse_json().unwrap();
        assert_eq!(wire["name"], "ping");
        assert_eq!(wire["data"]["n"], 1);
    }

    #[test]
    fn test_trigger_on_closed_connection() {
        let (connection, _rx) = Connection::open("conn-1".to_string());
        connection.set_state(ConnectionState::Closed);

        let event = Event::new("ping", serde_json::Value::Null).unwrap();
        let result = connection.trigger(&event);
        assert!(matches!(result, Err(DispatchError::ConnectionClosed)));
    }

    #[test]
    fn test_trigger_with_dropped_receiver() {
        let (connection, rx) = Connection::open("conn-1".to_string());
        drop(rx);

        let event = Event::new("ping", serde_json::Value::Null).unwrap();
        let result = connection.trigger(&event);
        assert!(matches!(result, Err(DispatchError::Send(_))));
    }

    #[test]
    fn test_manager_register_and_snapshot() {
        let manager = ConnectionManager::new();
        let (c1, _rx1) = Connection::open("a".to_string());
        let (c2, _rx2) = Connection::open("b".to_string());

        manager.register(c1);
        manager.register(c2);
        assert_eq!(manager.connection_count(), 2);

        let snapshot = manager.connections();
        assert_eq!(snapshot.len(), 2);

        assert!(manager.unregister("a"));
        assert!(!manager.unregister("a"));
        assert_eq!(manager.connection_count(), 1);
        assert!(manager.get("b").is_some());
        assert!(manager.get("a").is_none());
    }
}
