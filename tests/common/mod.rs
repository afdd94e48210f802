#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use reqwest::Url;
use serde_json::{json, Value};
use tokio::sync::mpsc;

use photo_pager::config::ApiKey;
use photo_pager::endpoint::model::{ItemId, PhotoPage, SizeLookup};
use photo_pager::engine::feeds::search_source;
use photo_pager::session::mock_session::{MockResult, MockSession};
use photo_pager::{Catalog, FetchError, PageSource, Pager};

pub const QUERY: &str = "Goose";
pub const WAIT: Duration = Duration::from_secs(2);
pub const QUIET: Duration = Duration::from_millis(200);

pub fn catalog() -> Catalog {
    photo_pager::logging::init_tracing();
    Catalog::new(
        Url::parse("https://api.example.com/services/rest/").unwrap(),
        ApiKey::new("test-key").unwrap(),
    )
    .unwrap()
}

pub fn source(catalog: &Catalog, per_page: u32) -> PageSource {
    search_source(catalog.clone(), QUERY.to_string(), per_page)
}

pub fn photo_json(id: &str) -> Value {
    json!({
        "id": id,
        "owner": "48600090482@N01",
        "secret": format!("{}cafe", id),
        "server": 65535,
        "farm": "66",
        "title": format!("goose {}", id),
        "ispublic": 1,
        "isfriend": 0,
        "isfamily": 2
    })
}

/// A page response; numeric metadata is sent as strings, as the live service does.
pub fn page(number: u32, pages: u32, per_page: u32, total: u32, ids: &[&str]) -> PhotoPage {
    let photos: Vec<Value> = ids.iter().map(|id| photo_json(id)).collect();
    serde_json::from_value(json!({
        "photos": {
            "page": number,
            "pages": pages.to_string(),
            "perpage": per_page,
            "total": total.to_string(),
            "photo": photos
        },
        "stat": "ok"
    }))
    .unwrap()
}

pub fn sizes(id: &str) -> SizeLookup {
    let base = format!("https://live.staticflickr.com/65535/{}", id);
    serde_json::from_value(json!({
        "sizes": {
            "canblog": 0,
            "canprint": 0,
            "candownload": 1,
            "size": [
                {"label": "Square", "width": 75, "height": 75,
                 "source": format!("{}_s.jpg", base), "url": base, "media": "photo"},
                {"label": "Small", "width": "240", "height": "160",
                 "source": format!("{}_m.jpg", base), "url": base, "media": "photo"},
                {"label": "Original", "width": "4000", "height": "2667",
                 "source": format!("{}_o.jpg", base), "url": base, "media": "photo"}
            ]
        }
    }))
    .unwrap()
}

/// Identifiers of page `n` (1-based) in the goose corpus.
pub fn page_ids(n: u32, per_page: u32) -> Vec<String> {
    (0..per_page)
        .map(|i| format!("{}", 49_000_000 + (n - 1) * per_page + i))
        .collect()
}

/// Canned page plus one size lookup per item.
pub fn page_results(catalog: &Catalog, n: u32, pages: u32, per_page: u32) -> Vec<MockResult> {
    let ids = page_ids(n, per_page);
    let refs: Vec<&str> = ids.iter().map(String::as_str).collect();
    let mut results = vec![MockResult::new(
        &catalog.search(QUERY, n, per_page),
        Ok(page(n, pages, per_page, pages * per_page, &refs)),
    )];
    for id in &ids {
        results.push(MockResult::new(
            &catalog.sizes(&ItemId::new(id.as_str())),
            Ok(sizes(id)),
        ));
    }
    results
}

/// Session pre-loaded with a `pages` x `per_page` corpus.
pub fn goose_session(catalog: &Catalog, pages: u32, per_page: u32) -> Arc<MockSession> {
    let results = (1..=pages)
        .flat_map(|n| page_results(catalog, n, pages, per_page))
        .collect();
    Arc::new(MockSession::new(results))
}

pub fn page_channel(pager: &Pager) -> mpsc::UnboundedReceiver<Vec<ItemId>> {
    let (tx, rx) = mpsc::unbounded_channel();
    pager.on_new_page(move |ids| {
        let _ = tx.send(ids.to_vec());
    });
    rx
}

pub fn error_channel(pager: &Pager) -> mpsc::UnboundedReceiver<FetchError> {
    let (tx, rx) = mpsc::unbounded_channel();
    pager.on_error(move |e| {
        let _ = tx.send(e.clone());
    });
    rx
}

pub async fn next<T>(rx: &mut mpsc::UnboundedReceiver<T>) -> T {
    tokio::time::timeout(WAIT, rx.recv())
        .await
        .expect("timed out waiting for event")
        .expect("channel closed")
}

/// Passes if nothing arrives within `QUIET`.
pub async fn assert_quiet<T: std::fmt::Debug>(rx: &mut mpsc::UnboundedReceiver<T>) {
    if let Ok(Some(event)) = tokio::time::timeout(QUIET, rx.recv()).await {
        panic!("unexpected event: {:?}", event);
    }
}

/// Poll until `check` holds or the wait limit passes.
pub async fn wait_until(mut check: impl FnMut() -> bool) {
    tokio::time::timeout(WAIT, async {
        while !check() {
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
    })
    .await
    .expect("condition not reached in time");
}

pub fn ids(raw: &[&str]) -> Vec<ItemId> {
    raw.iter().map(|s| ItemId::new(*s)).collect()
}
