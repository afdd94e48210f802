// Observer registry for page and error events, delivered from one dispatcher task.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tracing::debug;

use crate::endpoint::model::ItemId;
use crate::error::FetchError;

pub type PageCallback = Arc<dyn Fn(&[ItemId]) + Send + Sync>;
pub type ErrorCallback = Arc<dyn Fn(&FetchError) + Send + Sync>;

/// Returned on registration; pass to `cancel` to stop further deliveries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ObservationToken(u64);

#[derive(Debug, Clone)]
pub enum Event {
    PageLoaded(Vec<ItemId>),
    Failed(FetchError),
}

#[derive(Default)]
pub struct ObserverRegistry {
    next_id: AtomicU64,
    pages: Mutex<BTreeMap<u64, PageCallback>>,
    errors: Mutex<BTreeMap<u64, ErrorCallback>>,
}

impl ObserverRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn on_page(&self, callback: PageCallback) -> ObservationToken {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.pages.lock().insert(id, callback);
        ObservationToken(id)
    }

    pub fn on_error(&self, callback: ErrorCallback) -> ObservationToken {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        self.errors.lock().insert(id, callback);
        ObservationToken(id)
    }

    /// Remove one registration. Returns false if the token was unknown.
    pub fn cancel(&self, token: ObservationToken) -> bool {
        let page = self.pages.lock().remove(&token.0).is_some();
        let error = self.errors.lock().remove(&token.0).is_some();
        page || error
    }

    pub fn observer_count(&self) -> usize {
        self.pages.lock().len() + self.errors.lock().len()
    }

    /// Invoke every observer of the event's channel. Each observer is looked up
    /// again right before its call, so a cancellation made by an earlier
    /// callback takes effect immediately. Callbacks run with no lock held.
    pub fn deliver(&self, event: &Event) {
        match event {
            Event::PageLoaded(ids) => {
                let keys: Vec<u64> = self.pages.lock().keys().copied().collect();
                for key in keys {
                    let callback = self.pages.lock().get(&key).cloned();
                    if let Some(callback) = callback {
                        callback(ids);
                    }
                }
            }
            Event::Failed(error) => {
                let keys: Vec<u64> = self.errors.lock().keys().copied().collect();
                for key in keys {
                    let callback = self.errors.lock().get(&key).cloned();
                    if let Some(callback) = callback {
                        callback(error);
                    }
                }
            }
        }
    }
}

/// Start the delivery task. It stops once every sender has been dropped.
pub fn spawn_dispatcher(registry: Arc<ObserverRegistry>) -> mpsc::UnboundedSender<Event> {
    let (tx, mut rx) = mpsc::unbounded_channel::<Event>();
    tokio::spawn(async move {
        while let Some(event) = rx.recv().await {
            registry.deliver(&event);
        }
        debug!("observer dispatcher stopped");
    });
    tx
}
