// Paginated list engine: request next page, fan out size lookups, join, merge, notify.

use std::collections::HashMap;
use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

use super::fanout::{resolve_sizes, JoinOutcome};
use super::observers::{spawn_dispatcher, Event, ObservationToken, ObserverRegistry};
use super::state::ListState;
use super::stats::{PagerStats, StatsSnapshot};
use crate::endpoint::catalog::Catalog;
use crate::endpoint::model::{ItemId, PageBody, PhotoPage};
use crate::endpoint::request::Endpoint;
use crate::error::FetchError;
use crate::session::traits::Session;

pub use super::state::ResolvedItem;

/// Produces the page endpoint for a 1-based page number.
pub type PageSource = Arc<dyn Fn(u32) -> Endpoint<PhotoPage> + Send + Sync>;

/// Everything guarded by the engine lock.
struct Shared {
    list: ListState,
    source: Option<PageSource>,
    /// Bumped on every reset; late results from older generations are discarded.
    generation: u64,
    cancel: CancellationToken,
    page_task: Option<JoinHandle<()>>,
}

impl Shared {
    /// Cancel in-flight work and return to the empty state.
    fn reset(&mut self) {
        self.cancel.cancel();
        if let Some(task) = self.page_task.take() {
            task.abort();
        }
        self.cancel = CancellationToken::new();
        self.generation += 1;
        self.list = ListState::default();
    }
}

struct Inner {
    session: Arc<dyn Session>,
    catalog: Catalog,
    shared: Mutex<Shared>,
    observers: Arc<ObserverRegistry>,
    events: mpsc::UnboundedSender<Event>,
    stats: Arc<PagerStats>,
}

impl Inner {
    fn is_current(shared: &Shared, generation: u64) -> bool {
        shared.generation == generation && !shared.cancel.is_cancelled()
    }

    fn fail_page(&self, generation: u64, err: FetchError) {
        {
            let mut shared = self.shared.lock();
            if !Self::is_current(&shared, generation) {
                debug!("discarding failure from reset generation {}: {}", generation, err);
                return;
            }
            shared.list.finish_loading();
            shared.page_task = None;
        }
        self.stats.record_page_failure();
        error!("page load failed: {}", err);
        let _ = self.events.send(Event::Failed(err));
    }

    fn merge_page(
        &self,
        generation: u64,
        meta: &PageBody,
        order: &[ItemId],
        resolved: HashMap<ItemId, ResolvedItem>,
    ) {
        let (added, len, page) = {
            let mut shared = self.shared.lock();
            if !Self::is_current(&shared, generation) {
                debug!("discarding page {} from reset generation {}", meta.number, generation);
                return;
            }
            let added = shared.list.merge(meta, order, resolved);
            shared.page_task = None;
            (added, shared.list.len(), shared.list.current_page())
        };
        self.stats.record_page_merged();
        info!(
            "page {} merged: {} new items, {} total",
            page,
            added.len(),
            len
        );
        let _ = self.events.send(Event::PageLoaded(added));
    }
}

/// Paginated photo list. Owns its state, its observers and its in-flight work.
///
/// Must be created inside a tokio runtime. Dropping the pager cancels all
/// outstanding requests.
pub struct Pager {
    inner: Arc<Inner>,
}

impl Pager {
    pub fn new(session: Arc<dyn Session>, catalog: Catalog) -> Self {
        let observers = Arc::new(ObserverRegistry::new());
        let events = spawn_dispatcher(Arc::clone(&observers));
        Self {
            inner: Arc::new(Inner {
                session,
                catalog,
                shared: Mutex::new(Shared {
                    list: ListState::default(),
                    source: None,
                    generation: 0,
                    cancel: CancellationToken::new(),
                    page_task: None,
                }),
                observers,
                events,
                stats: Arc::new(PagerStats::new()),
            }),
        }
    }

    /// Pager with its page source already set.
    pub fn with_source(session: Arc<dyn Session>, catalog: Catalog, source: PageSource) -> Self {
        let pager = Self::new(session, catalog);
        pager.set_page_source(Some(source));
        pager
    }

    pub fn catalog(&self) -> &Catalog {
        &self.inner.catalog
    }

    /// Replace the page source. Always resets the list.
    pub fn set_page_source(&self, source: Option<PageSource>) {
        let mut shared = self.inner.shared.lock();
        shared.reset();
        shared.source = source;
        debug!("page source replaced, list reset");
    }

    /// Cancel every in-flight request and empty the list.
    pub fn reset(&self) {
        self.inner.shared.lock().reset();
        debug!("pager reset");
    }

    /// Start loading the page after the cursor.
    ///
    /// Returns false without side effects when there is no page source, a load
    /// is already running, or the last page has been merged. Otherwise returns
    /// true; the outcome arrives through the page or error observers.
    pub fn append_new_page(&self) -> bool {
        let mut shared = self.inner.shared.lock();
        let Some(source) = shared.source.clone() else {
            debug!("append skipped: no page source");
            return false;
        };
        if shared.list.is_loading() {
            debug!("append skipped: page load in flight");
            return false;
        }
        if shared.list.is_last_page() {
            debug!("append skipped: last page {} reached", shared.list.current_page());
            return false;
        }

        let page = shared.list.current_page() + 1;
        let endpoint = source(page);
        shared.list.begin_loading();
        self.inner.stats.record_page_requested();
        debug!("requesting page {}: {}", page, endpoint.request());

        let job = PageJob {
            inner: Arc::downgrade(&self.inner),
            session: Arc::clone(&self.inner.session),
            catalog: self.inner.catalog.clone(),
            stats: Arc::clone(&self.inner.stats),
            token: shared.cancel.clone(),
            generation: shared.generation,
        };
        shared.page_task = Some(tokio::spawn(job.run(endpoint)));
        true
    }

    pub fn on_new_page<F>(&self, callback: F) -> ObservationToken
    where
        F: Fn(&[ItemId]) + Send + Sync + 'static,
    {
        self.inner.observers.on_page(Arc::new(callback))
    }

    pub fn on_error<F>(&self, callback: F) -> ObservationToken
    where
        F: Fn(&FetchError) + Send + Sync + 'static,
    {
        self.inner.observers.on_error(Arc::new(callback))
    }

    /// Stop future deliveries to one observer. Returns false for unknown tokens.
    pub fn cancel_observation(&self, token: ObservationToken) -> bool {
        self.inner.observers.cancel(token)
    }

    pub fn len(&self) -> usize {
        self.inner.shared.lock().list.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn item(&self, index: usize) -> Option<ResolvedItem> {
        self.inner.shared.lock().list.item_at(index).cloned()
    }

    pub fn get(&self, id: &ItemId) -> Option<ResolvedItem> {
        self.inner.shared.lock().list.get(id).cloned()
    }

    /// Identifiers in arrival order.
    pub fn identifiers(&self) -> Vec<ItemId> {
        self.inner.shared.lock().list.identifiers().to_vec()
    }

    /// Resolved items in arrival order.
    pub fn items(&self) -> Vec<ResolvedItem> {
        let shared = self.inner.shared.lock();
        shared
            .list
            .identifiers()
            .iter()
            .filter_map(|id| shared.list.get(id).cloned())
            .collect()
    }

    /// Last merged page number; 0 before the first page.
    pub fn current_page(&self) -> u32 {
        self.inner.shared.lock().list.current_page()
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.inner.shared.lock().list.total_pages()
    }

    pub fn total_items(&self) -> Option<u64> {
        self.inner.shared.lock().list.total_items()
    }

    pub fn is_loading(&self) -> bool {
        self.inner.shared.lock().list.is_loading()
    }

    pub fn is_last_page(&self) -> bool {
        self.inner.shared.lock().list.is_last_page()
    }

    pub fn stats(&self) -> StatsSnapshot {
        self.inner.stats.snapshot()
    }
}

impl Drop for Pager {
    fn drop(&mut self) {
        debug!("pager dropped, cancelling in-flight requests");
        self.inner.shared.lock().reset();
    }
}

/// One page load, detached from the pager so it never keeps it alive.
struct PageJob {
    inner: Weak<Inner>,
    session: Arc<dyn Session>,
    catalog: Catalog,
    stats: Arc<PagerStats>,
    token: CancellationToken,
    generation: u64,
}

impl PageJob {
    async fn run(self, endpoint: Endpoint<PhotoPage>) {
        let result = tokio::select! {
            biased;
            _ = self.token.cancelled() => {
                debug!("page request cancelled");
                return;
            }
            result = self.session.execute(&endpoint) => result,
        };

        let page = match result {
            Ok(page) => page.page,
            Err(e) => {
                if let Some(inner) = self.inner.upgrade() {
                    inner.fail_page(self.generation, e);
                }
                return;
            }
        };

        let (fresh, dropped) = {
            let Some(inner) = self.inner.upgrade() else {
                return;
            };
            let shared = inner.shared.lock();
            if !Inner::is_current(&shared, self.generation) {
                return;
            }
            shared.list.fresh(&page.photos)
        };
        if dropped > 0 {
            debug!("page {}: {} duplicate items dropped", page.number, dropped);
            self.stats.record_duplicates(dropped);
        }
        let order: Vec<ItemId> = fresh.iter().map(|p| p.id.clone()).collect();

        let outcome = resolve_sizes(
            Arc::clone(&self.session),
            &self.catalog,
            fresh,
            self.token.clone(),
            Arc::clone(&self.stats),
        )
        .await;

        let Some(inner) = self.inner.upgrade() else {
            debug!("pager gone before page {} merged", page.number);
            return;
        };
        match outcome {
            JoinOutcome::Joined(resolved) => {
                inner.merge_page(self.generation, &page, &order, resolved)
            }
            JoinOutcome::Aborted(e) => inner.fail_page(self.generation, e),
            JoinOutcome::Cancelled => debug!("page {} cancelled during fan-out", page.number),
        }
    }
}
