//! Event handler trait.

use crate::event::Event;
use async_trait::async_trait;

/// Handler error.
#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Handler failed
    #[error("Handler failed: {0}")]
    Failed(String),

    /// Event processing error
    #[error("Event processing error: {0}")]
    Processing(String),
}

/// Trait for handling dispatched events.
///
/// The triggering event is passed explicitly; handlers hold no dispatcher
/// state between invocations.
#[async_trait]
pub trait EventHandler: Send + Sync {
    /// Handle the event.
    async fn handle(&self, event: &Event) -> Result<(), HandlerError>;
}

/// Adapter turning a plain closure into an [`EventHandler`].
pub struct FnHandler<F> {
    f: F,
}

impl<F> FnHandler<F>
where
    F: Fn(&Event) -> Result<(), HandlerError> + Send + Sync,
{
    /// Wrap a closure as a handler.
    pub fn new(f: F) -> Self {
        Self { f }
    }
}

#[async_trait]
impl<F> EventHandler for FnHandler<F>
where
    F: Fn(&Event) -> Result<(), HandlerError> + Send + Sync,
{
    async fn handle(&self, event: &Event) -> Result<(), HandlerError> {
        (self.f)(event)
    }
}
