//! Outbound wire frame types.
//!
//! The dispatcher never touches the socket itself; delivery enqueues a
//! [`Message`] that the transport layer drains and writes to the wire.

use bytes::Bytes;
use serde::{Deserialize, Serialize};

/// Frame type enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageType {
    /// Text frame
    Text,
    /// Binary frame
    Binary,
    /// Close frame
    Close,
}

/// A wire frame queued for delivery to one client.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Message {
    /// The frame type
    pub message_type: MessageType,
    /// The frame payload
    pub payload: Bytes,
}

impl Message {
    /// Create a new text frame.
    pub fn text<S: Into<String>>(text: S) -> Self {
        Self {
            message_type: MessageType::Text,
            payload: Bytes::from(text.into()),
        }
    }

    /// Create a new binary frame.
    pub fn binary<B: Into<Bytes>>(data: B) -> Self {
        Self {
            message_type: MessageType::Binary,
            payload: data.into(),
        }
    }

    /// Create a close frame.
    pub fn close() -> Self {
        Self {
            message_type: MessageType::Close,
            payload: Bytes::new(),
        }
    }

    /// Create a text frame from a serializable value.
    pub fn json<T: Serialize>(value: &T) -> Result<Self, serde_json::Error> {
        let json = serde_json::to_string(value)?;
        Ok(Self::text(json))
    }

    /// Parse the frame payload as JSON.
    pub fn parse_json<'a, T: Deserialize<'a>>(&'a self) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&self.payload)
    }

    /// Get the frame payload as a string.
    pub fn as_text(&self) -> Option<&str> {
        if self.message_type == MessageType::Text {
            std::str::from_utf8(&self.payload).ok()
        } else {
            None
        }
    }

    /// Get the frame payload as bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.payload
    }

    /// Check if this is a text frame.
    pub fn is_text(&self) -> bool {
        self.message_type == MessageType::Text
    }

    /// Check if this is a close frame.
    pub fn is_close(&self) -> bool {
        self.message_type == MessageType::Close
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_frame() {
        let msg = Message::text("hello");
        assert!(msg.is_text());
        assert_eq!(msg.as_text(), Some("hello"));
    }

    #[test]
    fn test_json_frame() {
        let msg = Message::json(&serde_json::json!({"name": "ping"})).unwrap();
        assert!(msg.is_text());
        let value: serde_json::Value = msg.parse_json().unwrap();
        assert_eq!(value["name"], "ping");
    }

    #[test]
    fn test_close_frame() {
        let msg = Message::close();
        assert!(msg.is_close());
        assert_eq!(msg.as_text(), None);
    }
}
