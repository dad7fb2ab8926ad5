//! Event value object: construction, decoding, wire encoding.

use crate::connection::Connection;
use crate::error::{DispatchError, DispatchResult};
use crate::message::Message;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use uuid::Uuid;

/// Wire form of an event.
///
/// This is the only part of an event that crosses the socket; the originating
/// connection is never serialized and never read from the payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
struct WireEvent {
    name: String,
    #[serde(default)]
    data: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    channel: Option<String>,
}

/// One named occurrence moving through the dispatcher.
///
/// Immutable once constructed: builder-style `with_*` methods consume and
/// return the event, and there are no public mutators.
#[derive(Debug, Clone)]
pub struct Event {
    id: Uuid,
    name: String,
    data: Value,
    channel: Option<String>,
    connection: Option<Connection>,
}

impl Event {
    /// Create a new event.
    ///
    /// Fails with [`DispatchError::InvalidEvent`] if the name is empty.
    pub fn new(name: impl Into<String>, data: Value) -> DispatchResult<Self> {
        let name = name.into();
        if name.is_empty() {
            return Err(DispatchError::InvalidEvent(
                "event name must not be empty".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name,
            data,
            channel: None,
            connection: None,
        })
    }

    /// Decode a wire message into an event bound to `connection`.
    ///
    /// The event's connection is always the one supplied here; nothing in the
    /// payload can redirect delivery to another client.
    pub fn from_json(raw: &[u8], connection: Connection) -> DispatchResult<Self> {
        let wire: WireEvent =
            serde_json::from_slice(raw).map_err(|e| DispatchError::Decode(e.to_string()))?;
        if wire.name.is_empty() {
            return Err(DispatchError::Decode(
                "message has no event name".to_string(),
            ));
        }
        Ok(Self {
            id: Uuid::new_v4(),
            name: wire.name,
            data: wire.data,
            channel: wire.channel.filter(|c| !c.is_empty()),
            connection: Some(connection),
        })
    }

    /// Target the event at a channel.
    ///
    /// An empty channel name leaves the event unchanged.
    pub fn with_channel(mut self, channel: impl Into<String>) -> Self {
        let channel = channel.into();
        self.channel = if channel.is_empty() {
            None
        } else {
            Some(channel)
        };
        self
    }

    /// Bind the event to its originating connection.
    pub fn with_connection(mut self, connection: Connection) -> Self {
        self.connection = Some(connection);
        self
    }

    /// Unique id of this event, for log correlation.
    pub fn id(&self) -> Uuid {
        self.id
    }

    /// Event name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Event payload.
    pub fn data(&self) -> &Value {
        &self.data
    }

    /// Target channel, if any.
    pub fn channel(&self) -> Option<&str> {
        self.channel.as_deref()
    }

    /// Originating connection, if any.
    pub fn connection(&self) -> Option<&Connection> {
        self.connection.as_ref()
    }

    /// Check if this is a channel event.
    pub fn is_channel(&self) -> bool {
        self.channel.is_some()
    }

    /// Encode the event to its outbound wire frame.
    pub fn to_message(&self) -> DispatchResult<Message> {
        let wire = WireEvent {
            name: self.name.clone(),
            data: self.data.clone(),
            channel: self.channel.clone(),
        };
        Ok(Message::json(&wire)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn connection() -> Connection {
        Connection::open("test-conn".to_string()).0
    }

    #[test]
    fn test_new_event() {
        let event = Event::new("user_joined", json!({"user": "alice"})).unwrap();
        assert_eq!(event.name(), "user_joined");
        assert_eq!(event.data()["user"], "alice");
        assert!(event.connection().is_none());
        assert!(!event.is_channel());
    }

    #[test]
    fn test_new_rejects_empty_name() {
        let result = Event::new("", Value::Null);
        assert!(matches!(result, Err(DispatchError::InvalidEvent(_))));
    }

    #[test]
    fn test_from_json() {
        let raw = br#"{"name": "chat_message", "data": {"text": "hi"}}"#;
        let event = Event::from_json(raw, connection()).unwrap();
        assert_eq!(event.name(), "chat_message");
        assert_eq!(event.data()["text"], "hi");
        assert_eq!(event.connection().unwrap().id, "test-conn");
        assert!(!event.is_channel());
    }

    #[test]
    fn test_from_json_with_channel() {
        let raw = br#"{"name": "post", "data": {}, "channel": "lobby"}"#;
        let event = Event::from_json(raw, connection()).unwrap();
        assert!(event.is_channel());
        assert_eq!(event.channel(), Some("lobby"));
    }

    #[test]
    fn test_from_json_malformed() {
        let result = Event::from_json(b"not json", connection());
        assert!(matches!(result, Err(DispatchError::Decode(_))));
    }

    #[test]
    fn test_from_json_missing_name() {
        let result = Event::from_json(br#"{"data": {}}"#, connection());
        assert!(matches!(result, Err(DispatchError::Decode(_))));

        let result = Event::from_json(br#"{"name": "", "data": {}}"#, connection());
        assert!(matches!(result, Err(DispatchError::Decode(_))));
    }

    #[test]
    fn test_payload_cannot_spoof_connection() {
        // A "connection" field in the payload is ignored; the event is bound
        // to the connection it arrived on.
        let raw = br#"{"name": "post", "data": {}, "connection": "someone-else"}"#;
        let event = Event::from_json(raw, connection()).unwrap();
        assert_eq!(event.connection().unwrap().id, "test-conn");
    }

    #[test]
    fn test_empty_channel_is_not_a_channel_event() {
        let event = Event::new("post", Value::Null).unwrap().with_channel("");
        assert!(!event.is_channel());

        let raw = br#"{"name": "post", "channel": ""}"#;
        let event = Event::from_json(raw, connection()).unwrap();
        assert!(!event.is_channel());
    }

    #[test]
    fn test_to_message_omits_connection() {
        let event = Event::new("tick", json!(42))
            .unwrap()
            .with_connection(connection());
        let message = event.to_message().unwrap();
        let wire: Value = message.parse_json().unwrap();
        assert_eq!(wire["name"], "tick");
        assert_eq!(wire["data"], 42);
        assert!(wire.get("connection").is_none());
        assert!(wire.get("channel").is_none());
    }
}
