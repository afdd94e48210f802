// Wire models for catalog page, size lookup and API failure payloads.

use std::fmt;

use reqwest::Url;
use serde::{Deserialize, Deserializer};

use super::lenient::{bool_from_parity, float_or_string, int_or_string, string_or_int};
use crate::config::{RESOURCE_HOST_SUFFIX, SIZE_PREFERENCE};
use crate::error::FetchError;

/// Stable, opaque key of one catalog item.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ItemId(String);

impl ItemId {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ItemId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl<'de> Deserialize<'de> for ItemId {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        string_or_int(deserializer).map(ItemId)
    }
}

/// One page of search or trending results.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoPage {
    #[serde(rename = "photos", alias = "page")]
    pub page: PageBody,
    #[serde(deserialize_with = "string_or_int")]
    pub stat: String,
}

/// Pagination metadata plus the page's photos.
#[derive(Debug, Clone, Deserialize)]
pub struct PageBody {
    #[serde(rename = "page", deserialize_with = "int_or_string")]
    pub number: i64,
    #[serde(deserialize_with = "int_or_string")]
    pub pages: i64,
    #[serde(rename = "perpage", deserialize_with = "int_or_string")]
    pub per_page: i64,
    #[serde(deserialize_with = "int_or_string")]
    pub total: i64,
    #[serde(rename = "photo")]
    pub photos: Vec<PhotoRecord>,
}

/// A raw item from a page response. Carries no size information.
#[derive(Debug, Clone, Deserialize)]
pub struct PhotoRecord {
    pub id: ItemId,
    #[serde(deserialize_with = "string_or_int")]
    pub owner: String,
    #[serde(deserialize_with = "string_or_int")]
    pub secret: String,
    #[serde(deserialize_with = "string_or_int")]
    pub server: String,
    #[serde(deserialize_with = "int_or_string")]
    pub farm: i64,
    #[serde(deserialize_with = "string_or_int")]
    pub title: String,
    #[serde(rename = "ispublic", deserialize_with = "bool_from_parity")]
    pub is_public: bool,
    #[serde(rename = "isfriend", deserialize_with = "bool_from_parity")]
    pub is_friend: bool,
    #[serde(rename = "isfamily", deserialize_with = "bool_from_parity")]
    pub is_family: bool,
}

impl PhotoRecord {
    /// URL of the photo's image resource. Pure; performs no I/O.
    pub fn resource_url(&self) -> Result<Url, FetchError> {
        let raw = format!(
            "https://farm{}.{}/{}/{}_{}.jpg",
            self.farm, RESOURCE_HOST_SUFFIX, self.server, self.id, self.secret
        );
        Url::parse(&raw).map_err(|e| FetchError::Decode(format!("bad resource url {}: {}", raw, e)))
    }
}

/// Response of a size lookup for one photo.
#[derive(Debug, Clone, Deserialize)]
pub struct SizeLookup {
    pub sizes: SizeSet,
}

/// Available renditions of one photo.
#[derive(Debug, Clone, Deserialize)]
pub struct SizeSet {
    #[serde(rename = "canblog", deserialize_with = "bool_from_parity")]
    pub can_blog: bool,
    #[serde(rename = "canprint", deserialize_with = "bool_from_parity")]
    pub can_print: bool,
    #[serde(rename = "candownload", deserialize_with = "bool_from_parity")]
    pub can_download: bool,
    #[serde(rename = "size")]
    pub renditions: Vec<Rendition>,
}

impl SizeSet {
    /// Preferred rendition: first match in `SIZE_PREFERENCE` order, otherwise
    /// the last rendition listed. `None` only when the list is empty.
    pub fn preferred(&self) -> Option<&Rendition> {
        SIZE_PREFERENCE
            .iter()
            .find_map(|label| self.renditions.iter().find(|r| r.label == *label))
            .or_else(|| self.renditions.last())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Rendition {
    #[serde(deserialize_with = "string_or_int")]
    pub label: String,
    #[serde(deserialize_with = "float_or_string")]
    pub width: f64,
    #[serde(deserialize_with = "float_or_string")]
    pub height: f64,
    #[serde(deserialize_with = "string_or_int")]
    pub source: String,
    #[serde(deserialize_with = "string_or_int")]
    pub url: String,
    #[serde(deserialize_with = "string_or_int")]
    pub media: String,
}

impl Rendition {
    pub fn dimensions(&self) -> Dimensions {
        Dimensions {
            width: self.width,
            height: self.height,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions {
    pub width: f64,
    pub height: f64,
}

/// Application-level failure payload (`{"stat":"fail","code":..,"message":..}`).
#[derive(Debug, Clone, Deserialize)]
pub struct ApiFailure {
    #[serde(deserialize_with = "string_or_int")]
    pub stat: String,
    #[serde(deserialize_with = "int_or_string")]
    pub code: i64,
    #[serde(deserialize_with = "string_or_int")]
    pub message: String,
}

impl From<ApiFailure> for FetchError {
    fn from(f: ApiFailure) -> Self {
        FetchError::Api {
            stat: f.stat,
            code: f.code,
            message: f.message,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn rendition(label: &str, width: u32) -> serde_json::Value {
        json!({
            "label": label, "width": width, "height": width / 2,
            "source": "s", "url": "u", "media": "photo"
        })
    }

    fn size_set(labels: &[&str]) -> SizeSet {
        let renditions: Vec<_> = labels
            .iter()
            .enumerate()
            .map(|(i, l)| rendition(l, 100 * (i as u32 + 1)))
            .collect();
        serde_json::from_value(json!({
            "canblog": 0, "canprint": 1, "candownload": 2, "size": renditions
        }))
        .unwrap()
    }

    #[test]
    fn test_preferred_follows_label_order() {
        let set = size_set(&["Square", "Large", "Medium", "Original"]);
        assert_eq!(set.preferred().unwrap().label, "Medium");

        let set = size_set(&["Original", "Small", "Large"]);
        assert_eq!(set.preferred().unwrap().label, "Small");
    }

    #[test]
    fn test_preferred_falls_back_to_last() {
        let set = size_set(&["Square", "Thumbnail", "Large Square"]);
        assert_eq!(set.preferred().unwrap().label, "Large Square");
        assert!(size_set(&[]).preferred().is_none());
    }

    #[test]
    fn test_permission_flags_use_their_own_keys() {
        let set = size_set(&["Small"]);
        assert!(!set.can_blog);
        assert!(set.can_print);
        assert!(!set.can_download);
    }

    #[test]
    fn test_page_decodes_with_mixed_types() {
        let page: PhotoPage = serde_json::from_value(json!({
            "photos": {
                "page": "2", "pages": 7, "perpage": "5", "total": "33",
                "photo": [{
                    "id": 4951, "owner": "12@N00", "secret": "ab12", "server": 65535,
                    "farm": "66", "title": 1999, "ispublic": 1, "isfriend": 4, "isfamily": 9
                }]
            },
            "stat": "ok"
        }))
        .unwrap();
        assert_eq!(page.page.number, 2);
        assert_eq!(page.page.per_page, 5);
        assert_eq!(page.page.total, 33);
        let photo = &page.page.photos[0];
        assert_eq!(photo.id.as_str(), "4951");
        assert_eq!(photo.server, "65535");
        assert_eq!(photo.title, "1999");
        assert!(photo.is_public && !photo.is_friend && photo.is_family);
        assert_eq!(
            photo.resource_url().unwrap().as_str(),
            "https://farm66.staticflickr.com/65535/4951_ab12.jpg"
        );
    }

    #[test]
    fn test_page_body_accepts_page_key() {
        let page: PhotoPage = serde_json::from_value(json!({
            "page": {"page": 1, "pages": 1, "perpage": 0, "total": 0, "photo": []},
            "stat": "ok"
        }))
        .unwrap();
        assert!(page.page.photos.is_empty());
    }
}
