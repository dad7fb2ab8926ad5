//! # Wirecast
//!
//! Event dispatch and broadcasting for WebSocket connections.
//!
//! Wirecast sits between a WebSocket transport and application-defined event
//! handlers: it decodes inbound messages into events, resolves them through a
//! routing table, invokes the bound handlers, and delivers results back to
//! the originating connection or to every connected client. The socket layer
//! itself (handshake, frame I/O) is the transport's concern; connections hand
//! raw payloads in and drain encoded frames out.
//!
//! ## Features
//!
//! - Name-keyed event routing with ordered multi-handler bindings
//! - Channel events forwarded whole to named channels
//! - Per-connection delivery and snapshot-based broadcast
//! - Configurable handler failure policy (fail-fast or continue-on-error)
//! - JSON wire format with connection anti-spoofing
//!
//! ## Example
//!
//! ```rust
//! use wirecast::{
//!     ChannelRegistry, Connection, ConnectionManager, Dispatcher, Event, EventMap, FnHandler,
//! };
//! use std::sync::Arc;
//!
//! # #[tokio::main(flavor = "current_thread")]
//! # async fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let event_map = Arc::new(EventMap::new());
//! event_map.register(
//!     "chat_message",
//!     Arc::new(FnHandler::new(|event: &Event| {
//!         println!("got: {}", event.data());
//!         Ok(())
//!     })),
//! );
//!
//! let dispatcher = Dispatcher::new(
//!     event_map,
//!     Arc::new(ConnectionManager::new()),
//!     Arc::new(ChannelRegistry::new()),
//! );
//!
//! let (connection, _outbound) = Connection::open("client-1".to_string());
//! dispatcher
//!     .receive_encoded(br#"{"name": "chat_message", "data": {"text": "hi"}}"#, connection)
//!     .await?;
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]
#![warn(rustdoc::missing_crate_level_docs)]

mod channel;
mod connection;
mod dispatcher;
mod error;
mod event;
mod event_map;
mod handler;
mod message;

pub use channel::{Channel, ChannelRegistry};
pub use connection::{Connection, ConnectionId, ConnectionManager, ConnectionState};
pub use dispatcher::{Dispatcher, DispatcherConfig};
pub use error::{DispatchError, DispatchResult};
pub use event::Event;
pub use event_map::{EventMap, Routes};
pub use handler::{EventHandler, FnHandler, HandlerError};
pub use message::{Message, MessageType};
