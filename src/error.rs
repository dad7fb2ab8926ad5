//! Error types for event dispatch.

use crate::handler::HandlerError;
use thiserror::Error;

/// Dispatch error type.
#[derive(Error, Debug)]
pub enum DispatchError {
    /// Event constructed with an invalid shape (e.g. empty name)
    #[error("Invalid event: {0}")]
    InvalidEvent(String),

    /// Inbound wire message could not be decoded into an event
    #[error("Failed to decode message: {0}")]
    Decode(String),

    /// Channel event names a channel missing from the registry
    #[error("Unknown channel: {0}")]
    UnknownChannel(String),

    /// `send_message` called on an event with no originating connection
    #[error("Event has no originating connection")]
    NoConnection,

    /// Connection closed
    #[error("Connection closed")]
    ConnectionClosed,

    /// Failed to enqueue a message for delivery
    #[error("Failed to send message: {0}")]
    Send(String),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// A handler bound to the event failed
    #[error("Handler failed for event '{event}': {source}")]
    Handler {
        /// Name of the event being dispatched
        event: String,
        /// The underlying handler error
        #[source]
        source: HandlerError,
    },
}

/// Result type for dispatch operations.
pub type DispatchResult<T> = Result<T, DispatchError>;
