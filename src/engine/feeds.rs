// Ready-made page sources: free-text search and the trending feed.

use std::sync::Arc;

use parking_lot::RwLock;
use tracing::debug;

use super::pager::{PageSource, Pager};
use crate::endpoint::catalog::Catalog;
use crate::session::traits::Session;

/// Page source for the trending feed.
pub fn trending_source(catalog: Catalog, per_page: u32) -> PageSource {
    Arc::new(move |page| catalog.trending(page, per_page))
}

/// Page source for a fixed search query.
pub fn search_source(catalog: Catalog, text: String, per_page: u32) -> PageSource {
    Arc::new(move |page| catalog.search(&text, page, per_page))
}

/// Trim surrounding whitespace and newlines from user-entered query text.
pub fn normalize_query(raw: &str) -> String {
    raw.trim().to_string()
}

/// A pager whose pages come from a text search that can be changed in place.
pub struct TextSearch {
    pager: Pager,
    query: Arc<RwLock<String>>,
}

impl TextSearch {
    pub fn new(session: Arc<dyn Session>, catalog: Catalog, per_page: u32) -> Self {
        let query = Arc::new(RwLock::new(String::new()));
        let source_query = Arc::clone(&query);
        let source_catalog = catalog.clone();
        let source: PageSource = Arc::new(move |page| {
            let text = source_query.read().clone();
            source_catalog.search(&text, page, per_page)
        });
        Self {
            pager: Pager::with_source(session, catalog, source),
            query,
        }
    }

    /// Replace the query, clear earlier results and request the first page.
    pub fn search(&self, raw: &str) -> bool {
        let text = normalize_query(raw);
        debug!("search query set to {:?}", text);
        *self.query.write() = text;
        self.pager.reset();
        self.pager.append_new_page()
    }

    pub fn query(&self) -> String {
        self.query.read().clone()
    }

    pub fn pager(&self) -> &Pager {
        &self.pager
    }
}
