// Accumulated list state: ordered identifiers, resolved items and page cursor.

use std::collections::{HashMap, HashSet};

use reqwest::Url;
use tracing::warn;

use crate::endpoint::model::{Dimensions, ItemId, PageBody, PhotoRecord, SizeSet};
use crate::error::FetchError;

/// A catalog item whose size lookup has completed. The unit handed to consumers.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedItem {
    pub id: ItemId,
    pub url: Url,
    pub preferred_size: Option<Dimensions>,
}

impl ResolvedItem {
    pub fn resolve(photo: &PhotoRecord, sizes: &SizeSet) -> Result<Self, FetchError> {
        Ok(Self {
            id: photo.id.clone(),
            url: photo.resource_url()?,
            preferred_size: sizes.preferred().map(|r| r.dimensions()),
        })
    }
}

/// Clamp a wire count to a non-negative page-sized integer.
pub(crate) fn clamp_count(value: i64) -> u32 {
    u32::try_from(value.max(0)).unwrap_or(u32::MAX)
}

#[derive(Debug, Default)]
pub(crate) struct ListState {
    order: Vec<ItemId>,
    items: HashMap<ItemId, ResolvedItem>,
    /// Every identifier a lookup was issued for, resolved or not.
    seen: HashSet<ItemId>,
    current_page: u32,
    total_pages: Option<u32>,
    total_items: Option<u64>,
    loading: bool,
}

impl ListState {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn current_page(&self) -> u32 {
        self.current_page
    }

    pub fn total_pages(&self) -> Option<u32> {
        self.total_pages
    }

    pub fn total_items(&self) -> Option<u64> {
        self.total_items
    }

    pub fn is_loading(&self) -> bool {
        self.loading
    }

    /// Once a page has been merged whose number reached the known total.
    pub fn is_last_page(&self) -> bool {
        self.total_pages
            .is_some_and(|total| self.current_page >= total)
    }

    pub fn begin_loading(&mut self) {
        self.loading = true;
    }

    pub fn finish_loading(&mut self) {
        self.loading = false;
    }

    /// True once `id` has been part of a merged page, even if its lookup failed.
    pub fn contains(&self, id: &ItemId) -> bool {
        self.seen.contains(id)
    }

    pub fn identifiers(&self) -> &[ItemId] {
        &self.order
    }

    pub fn item_at(&self, index: usize) -> Option<&ResolvedItem> {
        self.order.get(index).and_then(|id| self.items.get(id))
    }

    pub fn get(&self, id: &ItemId) -> Option<&ResolvedItem> {
        self.items.get(id)
    }

    /// Photos of `photos` not seen before, in page order. Repeats inside the
    /// page collapse onto their first occurrence. Also returns how many were dropped.
    pub fn fresh(&self, photos: &[PhotoRecord]) -> (Vec<PhotoRecord>, usize) {
        let mut seen = HashSet::new();
        let fresh: Vec<PhotoRecord> = photos
            .iter()
            .filter(|p| !self.contains(&p.id) && seen.insert(p.id.clone()))
            .cloned()
            .collect();
        let dropped = photos.len() - fresh.len();
        (fresh, dropped)
    }

    /// Append resolved items in `order`, adopt the page metadata and clear the
    /// loading flag. Returns the identifiers actually added.
    pub fn merge(
        &mut self,
        meta: &PageBody,
        order: &[ItemId],
        mut resolved: HashMap<ItemId, ResolvedItem>,
    ) -> Vec<ItemId> {
        let mut added = Vec::with_capacity(resolved.len());
        for id in order {
            if !self.seen.insert(id.clone()) {
                continue;
            }
            if let Some(item) = resolved.remove(id) {
                self.items.insert(id.clone(), item);
                self.order.push(id.clone());
                added.push(id.clone());
            }
        }

        let page = clamp_count(meta.number);
        if page < self.current_page {
            warn!(
                "page number regressed from {} to {}, keeping cursor",
                self.current_page, page
            );
        } else {
            self.current_page = page;
        }
        let pages = clamp_count(meta.pages);
        if pages > 0 && self.current_page > pages {
            warn!("page {} beyond reported total {}", self.current_page, pages);
        }
        self.total_pages = Some(pages);
        self.total_items = Some(u64::from(clamp_count(meta.total)));
        self.loading = false;
        added
    }
}
