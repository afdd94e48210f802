// Immutable description of one catalog request and its identity rules.

use std::collections::BTreeSet;
use std::fmt;
use std::marker::PhantomData;
use std::ops::RangeInclusive;

use anyhow::{anyhow, Result};
use reqwest::{Method, Url};

use super::resource::{Resource, ResourceKind};

/// Status codes accepted by default (any 2xx).
pub const EXPECTED_2XX: RangeInclusive<u16> = 200..=299;

/// Method, base URL, query parameters and acceptable status range of a call.
///
/// Two descriptors denote the same request when method, scheme, host and path
/// match and their query parameters are equal as sets.
#[derive(Debug, Clone)]
pub struct RequestDescriptor {
    method: Method,
    url: Url,
    query: Vec<(String, String)>,
    expected_status: RangeInclusive<u16>,
}

/// Hashable identity of a `RequestDescriptor`.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct RequestKey {
    method: Method,
    scheme: String,
    host: Option<String>,
    path: String,
    query: BTreeSet<(String, String)>,
}

impl RequestDescriptor {
    /// Build a GET descriptor. Any query already present on `url` is folded
    /// into the parameter list.
    pub fn get(url: Url) -> Result<Self> {
        Self::new(Method::GET, url)
    }

    pub fn new(method: Method, mut url: Url) -> Result<Self> {
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(anyhow!("unsupported url scheme: {}", url.scheme()));
        }
        let query = url
            .query_pairs()
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        url.set_query(None);
        url.set_fragment(None);
        Ok(Self {
            method,
            url,
            query,
            expected_status: EXPECTED_2XX,
        })
    }

    /// Append a query parameter.
    pub fn with_param(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    pub fn with_expected_status(mut self, range: RangeInclusive<u16>) -> Self {
        self.expected_status = range;
        self
    }

    pub fn method(&self) -> &Method {
        &self.method
    }

    /// Base URL without query string.
    pub fn base_url(&self) -> &Url {
        &self.url
    }

    pub fn query(&self) -> &[(String, String)] {
        &self.query
    }

    /// Value of the first query parameter named `key`.
    pub fn param(&self, key: &str) -> Option<&str> {
        self.query
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn accepts_status(&self, status: u16) -> bool {
        self.expected_status.contains(&status)
    }

    /// Full URL including the encoded query string.
    pub fn full_url(&self) -> Url {
        let mut url = self.url.clone();
        if !self.query.is_empty() {
            url.query_pairs_mut().extend_pairs(self.query.iter());
        }
        url
    }

    pub fn key(&self) -> RequestKey {
        RequestKey {
            method: self.method.clone(),
            scheme: self.url.scheme().to_string(),
            host: self.url.host_str().map(str::to_string),
            path: self.url.path().to_string(),
            query: self.query.iter().cloned().collect(),
        }
    }

    /// Whole-request match: exact method/scheme/host/path, query as a set.
    pub fn matches(&self, other: &RequestDescriptor) -> bool {
        self.key() == other.key()
    }
}

impl PartialEq for RequestDescriptor {
    fn eq(&self, other: &Self) -> bool {
        self.matches(other)
    }
}

impl Eq for RequestDescriptor {}

impl fmt::Display for RequestDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.method, self.full_url())
    }
}

/// A request descriptor tagged with the type its response decodes into.
pub struct Endpoint<A> {
    request: RequestDescriptor,
    _decodes: PhantomData<fn() -> A>,
}

impl<A: Resource> Endpoint<A> {
    pub fn new(request: RequestDescriptor) -> Self {
        Self {
            request,
            _decodes: PhantomData,
        }
    }

    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }

    pub fn kind(&self) -> ResourceKind {
        A::KIND
    }
}

impl<A> Clone for Endpoint<A> {
    fn clone(&self) -> Self {
        Self {
            request: self.request.clone(),
            _decodes: PhantomData,
        }
    }
}

impl<A> fmt::Debug for Endpoint<A> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Endpoint").field(&self.request).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn descriptor(raw: &str) -> RequestDescriptor {
        RequestDescriptor::get(Url::parse(raw).unwrap()).unwrap()
    }

    #[test]
    fn test_query_order_does_not_matter() {
        let a = descriptor("https://api.example.com/rest/?a=1&b=2&c=3");
        let b = descriptor("https://api.example.com/rest/?c=3&a=1&b=2");
        assert!(a.matches(&b));
        assert_eq!(a.key(), b.key());
    }

    #[test]
    fn test_partial_query_does_not_match() {
        let a = descriptor("https://api.example.com/rest/?a=1&b=2");
        let b = descriptor("https://api.example.com/rest/?a=1");
        assert!(!a.matches(&b));
        let c = descriptor("https://api.example.com/rest/?a=1&b=3");
        assert!(!a.matches(&c));
    }

    #[test]
    fn test_scheme_host_path_and_method_must_match() {
        let base = descriptor("https://api.example.com/rest/?a=1");
        assert!(!base.matches(&descriptor("http://api.example.com/rest/?a=1")));
        assert!(!base.matches(&descriptor("https://other.example.com/rest/?a=1")));
        assert!(!base.matches(&descriptor("https://api.example.com/rest?a=1")));
        let post = RequestDescriptor::new(
            Method::POST,
            Url::parse("https://api.example.com/rest/?a=1").unwrap(),
        )
        .unwrap();
        assert!(!base.matches(&post));
    }

    #[test]
    fn test_builder_params_match_parsed_query() {
        let built = descriptor("https://api.example.com/rest/")
            .with_param("page", 2)
            .with_param("text", "goose");
        let parsed = descriptor("https://api.example.com/rest/?text=goose&page=2");
        assert_eq!(built, parsed);
        assert_eq!(built.param("page"), Some("2"));
        assert!(built.full_url().as_str().contains("text=goose"));
    }

    #[test]
    fn test_non_http_scheme_rejected() {
        assert!(RequestDescriptor::get(Url::parse("ftp://example.com/x").unwrap()).is_err());
    }

    #[test]
    fn test_expected_status_range() {
        let d = descriptor("https://api.example.com/").with_expected_status(200..=204);
        assert!(d.accepts_status(200));
        assert!(d.accepts_status(204));
        assert!(!d.accepts_status(206));
        assert!(!d.accepts_status(404));
    }
}
