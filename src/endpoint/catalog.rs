use anyhow::{Context, Result};
use reqwest::Url;

use super::model::{ItemId, PhotoPage, SizeLookup};
use super::request::{Endpoint, RequestDescriptor};
use crate::config::{ApiKey, CredentialProvider, PagerConfig};

const METHOD_SEARCH: &str = "flickr.photos.search";
const METHOD_TRENDING: &str = "flickr.interestingness.getList";
const METHOD_SIZES: &str = "flickr.photos.getSizes";

/// Builds request descriptors for the catalog's page and size operations.
#[derive(Debug, Clone)]
pub struct Catalog {
    base: RequestDescriptor,
    api_key: ApiKey,
}

impl Catalog {
    pub fn new(base_url: Url, api_key: ApiKey) -> Result<Self> {
        let base = RequestDescriptor::get(base_url).context("invalid catalog base url")?;
        Ok(Self { base, api_key })
    }

    /// Build a catalog from configuration, looking up the credential once.
    ///
    /// Fails if the base URL is invalid or no credential is available; both
    /// are startup errors.
    pub fn from_config(config: &PagerConfig, credentials: &dyn CredentialProvider) -> Result<Self> {
        let base_url = Url::parse(&config.base_url)
            .with_context(|| format!("invalid catalog base url {:?}", config.base_url))?;
        let api_key = credentials
            .api_key()
            .context("catalog credential lookup failed")?;
        Self::new(base_url, api_key)
    }

    /// Free-text photo search, one page.
    pub fn search(&self, text: &str, page: u32, per_page: u32) -> Endpoint<PhotoPage> {
        Endpoint::new(
            self.call(METHOD_SEARCH)
                .with_param("text", text)
                .with_param("media", "photos")
                .with_param("page", page)
                .with_param("per_page", per_page),
        )
    }

    /// One page of the trending (interestingness) feed.
    pub fn trending(&self, page: u32, per_page: u32) -> Endpoint<PhotoPage> {
        Endpoint::new(
            self.call(METHOD_TRENDING)
                .with_param("page", page)
                .with_param("per_page", per_page),
        )
    }

    /// Available renditions of one photo.
    pub fn sizes(&self, photo_id: &ItemId) -> Endpoint<SizeLookup> {
        Endpoint::new(self.call(METHOD_SIZES).with_param("photo_id", photo_id))
    }

    fn call(&self, method: &str) -> RequestDescriptor {
        self.base
            .clone()
            .with_param("method", method)
            .with_param("api_key", self.api_key.as_str())
            .with_param("format", "json")
            .with_param("nojsoncallback", 1)
    }
}
