//! View boundary events
//!
//! The core never renders. It reports to the view layer through [`ViewEvent`]s
//! delivered synchronously to every registered observer, in registration order,
//! without buffering.

use crate::types::NodeId;
use parking_lot::RwLock;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

/// Events the core emits toward the view layer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewEvent {
    /// Children of `node` changed; re-render that subtree only.
    SubtreeChanged { node: NodeId, path: String },
    /// The view should expand the node at `path` once it can.
    NodeExpansionRequested { path: String },
}

impl ViewEvent {
    pub fn path(&self) -> &str {
        match self {
            ViewEvent::SubtreeChanged { path, .. } | ViewEvent::NodeExpansionRequested { path } => {
                path
            }
        }
    }
}

/// Receiver of view events.
pub trait ViewObserver: Send + Sync {
    fn on_event(&self, event: &ViewEvent);
}

impl<F> ViewObserver for F
where
    F: Fn(&ViewEvent) + Send + Sync,
{
    fn on_event(&self, event: &ViewEvent) {
        self(event)
    }
}

/// Identifies a registration so it can be removed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SubscriptionId(u64);

/// Registered observers with synchronous fan-out.
#[derive(Default)]
pub struct ObserverList {
    observers: RwLock<Vec<(SubscriptionId, Arc<dyn ViewObserver>)>>,
    next_id: AtomicU64,
}

impl ObserverList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn subscribe(&self, observer: Arc<dyn ViewObserver>) -> SubscriptionId {
        let id = SubscriptionId(self.next_id.fetch_add(1, Ordering::Relaxed) + 1);
        self.observers.write().push((id, observer));
        id
    }

    /// Remove a registration. Returns false if it was already gone.
    pub fn unsubscribe(&self, id: SubscriptionId) -> bool {
        let mut observers = self.observers.write();
        let before = observers.len();
        observers.retain(|(sid, _)| *sid != id);
        observers.len() != before
    }

    pub fn len(&self) -> usize {
        self.observers.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.observers.read().is_empty()
    }

    /// Deliver `event` to every observer.
    ///
    /// The registry lock is released before observers run, so an observer may
    /// subscribe or unsubscribe from inside its callback.
    pub fn emit(&self, event: &ViewEvent) {
        let observers: Vec<Arc<dyn ViewObserver>> = self
            .observers
            .read()
            .iter()
            .map(|(_, observer)| Arc::clone(observer))
            .collect();
        for observer in observers {
            observer.on_event(event);
        }
    }
}
