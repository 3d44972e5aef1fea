//! Change notifications
//!
//! The store manager publishes a [`ChangeEvent`] after every committed operation that
//! alters graph membership or shape content of a warehouse. Subscribers register once
//! at startup and receive events synchronously on the publishing thread.

use chrono::{DateTime, Utc};
use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};
use tracing::debug;

/// What changed in the warehouse
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    WarehouseCreated,
    WarehouseRemoved,
    ShapesReplaced,
    GraphCreated,
    GraphRemoved,
    ResourceRemoved,
    CatalogUpdated,
}

impl fmt::Display for ChangeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ChangeKind::WarehouseCreated => "warehouse-created",
            ChangeKind::WarehouseRemoved => "warehouse-removed",
            ChangeKind::ShapesReplaced => "shapes-replaced",
            ChangeKind::GraphCreated => "graph-created",
            ChangeKind::GraphRemoved => "graph-removed",
            ChangeKind::ResourceRemoved => "resource-removed",
            ChangeKind::CatalogUpdated => "catalog-updated",
        };
        f.write_str(name)
    }
}

/// A committed structural change, scoped to one warehouse
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChangeEvent {
    pub warehouse: String,
    /// Logical store name, when the change concerns one graph
    pub store: Option<String>,
    pub kind: ChangeKind,
    pub at: DateTime<Utc>,
}

impl ChangeEvent {
    pub fn new(warehouse: impl Into<String>, store: Option<&str>, kind: ChangeKind) -> Self {
        Self {
            warehouse: warehouse.into(),
            store: store.map(str::to_string),
            kind,
            at: Utc::now(),
        }
    }
}

/// Receiver of change notifications
pub trait ChangeListener: Send + Sync {
    fn on_change(&self, event: &ChangeEvent);
}

impl<F> ChangeListener for F
where
    F: Fn(&ChangeEvent) + Send + Sync,
{
    fn on_change(&self, event: &ChangeEvent) {
        self(event)
    }
}

/// Fan-out of change events to every subscriber
#[derive(Default)]
pub struct ChangeBus {
    listeners: RwLock<Vec<Arc<dyn ChangeListener>>>,
}

impl ChangeBus {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, listener: Arc<dyn ChangeListener>) {
        self.listeners
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(listener);
    }

    pub fn publish(&self, event: ChangeEvent) {
        let listeners = self.listeners.read().unwrap_or_else(PoisonError::into_inner);
        debug!(
            "Change on '{}' ({}) delivered to {} listener(s)",
            event.warehouse,
            event.kind,
            listeners.len()
        );
        for listener in listeners.iter() {
            listener.on_change(&event);
        }
    }

    pub fn len(&self) -> usize {
        self.listeners.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl fmt::Debug for ChangeBus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ChangeBus").field("listeners", &self.len()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;

    #[test]
    fn test_publish_reaches_every_listener() {
        let bus = ChangeBus::new();
        let seen = Arc::new(Mutex::new(Vec::new()));
        for id in 0..2 {
            let seen = Arc::clone(&seen);
            bus.subscribe(Arc::new(move |e: &ChangeEvent| {
                seen.lock().unwrap().push((id, e.warehouse.clone(), e.kind));
            }));
        }
        assert_eq!(bus.len(), 2);

        bus.publish(ChangeEvent::new("wh", Some("people"), ChangeKind::ShapesReplaced));
        let seen = seen.lock().unwrap();
        assert_eq!(seen.len(), 2);
        assert!(seen.iter().all(|(_, wh, kind)| wh == "wh" && *kind == ChangeKind::ShapesReplaced));
    }
}
