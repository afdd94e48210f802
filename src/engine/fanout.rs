// Per-page fan-out of size lookups, joined behind a single barrier.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, warn};

use super::state::ResolvedItem;
use super::stats::PagerStats;
use crate::endpoint::catalog::Catalog;
use crate::endpoint::model::{ItemId, PhotoRecord, SizeLookup};
use crate::error::FetchError;
use crate::session::traits::Session;

pub(crate) enum JoinOutcome {
    /// Every lookup finished. Items whose lookup failed are absent.
    Joined(HashMap<ItemId, ResolvedItem>),
    /// The token fired before the barrier was reached.
    Cancelled,
    /// A lookup hit a configuration defect; the page must not merge.
    Aborted(FetchError),
}

/// Issue one size lookup per photo, all at once, and wait for all of them.
///
/// Individual failures are logged and the item is dropped. Dropping the
/// returned future aborts every outstanding lookup.
pub(crate) async fn resolve_sizes(
    session: Arc<dyn Session>,
    catalog: &Catalog,
    photos: Vec<PhotoRecord>,
    token: CancellationToken,
    stats: Arc<PagerStats>,
) -> JoinOutcome {
    let mut tasks: JoinSet<(PhotoRecord, Option<Result<SizeLookup, FetchError>>)> = JoinSet::new();

    for photo in photos {
        let endpoint = catalog.sizes(&photo.id);
        let session = Arc::clone(&session);
        let token = token.clone();
        stats.record_size_request();
        tasks.spawn(async move {
            let result = tokio::select! {
                biased;
                _ = token.cancelled() => None,
                result = session.execute(&endpoint) => Some(result),
            };
            (photo, result)
        });
    }
    debug!("size fan-out dispatched {} lookups", tasks.len());

    let mut resolved = HashMap::new();
    while let Some(joined) = tasks.join_next().await {
        let (photo, result) = match joined {
            Ok(done) => done,
            Err(e) => {
                warn!("size lookup task did not complete: {}", e);
                stats.record_size_failure();
                continue;
            }
        };

        let lookup = match result {
            None => return JoinOutcome::Cancelled,
            Some(Ok(lookup)) => lookup,
            Some(Err(e)) if e.is_configuration() => {
                error!("size lookup for {} aborted page: {}", photo.id, e);
                tasks.abort_all();
                return JoinOutcome::Aborted(e);
            }
            Some(Err(e)) => {
                warn!(
                    "size lookup for {} failed, dropping item (code={:?}): {}",
                    photo.id,
                    e.code(),
                    e
                );
                stats.record_size_failure();
                continue;
            }
        };

        match ResolvedItem::resolve(&photo, &lookup.sizes) {
            Ok(item) => {
                resolved.insert(photo.id.clone(), item);
            }
            Err(e) => {
                warn!("photo {} unusable, dropping item: {}", photo.id, e);
                stats.record_size_failure();
            }
        }
    }

    if token.is_cancelled() {
        return JoinOutcome::Cancelled;
    }
    JoinOutcome::Joined(resolved)
}
