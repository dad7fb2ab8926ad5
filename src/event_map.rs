//! Event routing table.

use crate::handler::EventHandler;
use dashmap::DashMap;
use std::sync::Arc;

/// Factory producing a fresh handler instance per dispatch.
type HandlerFactory = Arc<dyn Fn() -> Arc<dyn EventHandler> + Send + Sync>;

/// One registered handler binding.
#[derive(Clone)]
enum Binding {
    /// A single instance shared across dispatches
    Shared(Arc<dyn EventHandler>),
    /// A factory invoked lazily for each dispatch
    Factory(HandlerFactory),
}

impl Binding {
    fn instantiate(&self) -> Arc<dyn EventHandler> {
        match self {
            Binding::Shared(handler) => Arc::clone(handler),
            Binding::Factory(factory) => factory(),
        }
    }
}

/// Routing table mapping event names to handler bindings.
///
/// Built once at startup and read-only at dispatch time; lookups are safe
/// from concurrent dispatch tasks without external locking. Registration
/// order is preserved and duplicate registrations under one name all fire.
pub struct EventMap {
    routes: DashMap<String, Vec<Binding>>,
}

impl EventMap {
    /// Create an empty routing table.
    pub fn new() -> Self {
        Self {
            routes: DashMap::new(),
        }
    }

    /// Register a shared handler instance for an event name.
    pub fn register(&self, event_name: impl Into<String>, handler: Arc<dyn EventHandler>) {
        let event_name = event_name.into();
        tracing::debug!(event = %event_name, "Registered handler");
        self.routes
            .entry(event_name)
            .or_default()
            .push(Binding::Shared(handler));
    }

    /// Register a handler factory for an event name.
    ///
    /// The factory runs once per routed dispatch, so each dispatch sees a
    /// fresh handler instance.
    pub fn register_factory<F>(&self, event_name: impl Into<String>, factory: F)
    where
        F: Fn() -> Arc<dyn EventHandler> + Send + Sync + 'static,
    {
        let event_name = event_name.into();
        tracing::debug!(event = %event_name, "Registered handler factory");
        self.routes
            .entry(event_name)
            .or_default()
            .push(Binding::Factory(Arc::new(factory)));
    }

    /// Resolve the handlers bound to an event name.
    ///
    /// Returns a finite iterator yielding handler instances in registration
    /// order; each call re-derives from the table, and factory bindings are
    /// instantiated lazily as the iterator advances. An unregistered name
    /// yields an empty iterator, never an error.
    pub fn routes_for(&self, event_name: &str) -> Routes {
        let bindings = self
            .routes
            .get(event_name)
            .map(|b| b.clone())
            .unwrap_or_default();
        Routes {
            bindings: bindings.into_iter(),
        }
    }

    /// Number of bindings registered for an event name.
    pub fn handler_count(&self, event_name: &str) -> usize {
        self.routes.get(event_name).map(|b| b.len()).unwrap_or(0)
    }

    /// All registered event names.
    pub fn event_names(&self) -> Vec<String> {
        self.routes.iter().map(|r| r.key().clone()).collect()
    }

    /// Remove all bindings.
    pub fn clear(&self) {
        self.routes.clear();
    }
}

impl Default for EventMap {
    fn default() -> Self {
        Self::new()
    }
}

/// Iterator over the handlers resolved for one event name.
pub struct Routes {
    bindings: std::vec::IntoIter<Binding>,
}

impl Iterator for Routes {
    type Item = Arc<dyn EventHandler>;

    fn next(&mut self) -> Option<Self::Item> {
        self.bindings.next().map(|b| b.instantiate())
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.bindings.size_hint()
    }
}

impl ExactSizeIterator for Routes {
    fn len(&self) -> usize {
        self.bindings.len()
    }
}
