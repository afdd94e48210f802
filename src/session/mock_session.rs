// Scripted session for deterministic tests: canned results matched by request identity.

use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use tracing::{debug, error};

use super::traits::Session;
use crate::endpoint::request::{Endpoint, RequestDescriptor};
use crate::endpoint::resource::{Payload, Resource, ResourceKind};
use crate::error::FetchError;

/// A registered request together with the result it should produce.
pub struct MockResult {
    request: RequestDescriptor,
    kind: ResourceKind,
    result: Result<Payload, FetchError>,
    delay: Option<Duration>,
}

impl MockResult {
    pub fn new<A: Resource>(endpoint: &Endpoint<A>, result: Result<A, FetchError>) -> Self {
        Self {
            request: endpoint.request().clone(),
            kind: A::KIND,
            result: result.map(Resource::into_payload),
            delay: None,
        }
    }

    /// Register a raw payload under `endpoint`, even if its kind differs.
    pub fn with_payload<A: Resource>(endpoint: &Endpoint<A>, payload: Payload) -> Self {
        Self {
            request: endpoint.request().clone(),
            kind: payload.kind(),
            result: Ok(payload),
            delay: None,
        }
    }

    /// Complete only after `delay` has elapsed.
    pub fn delayed(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    pub fn request(&self) -> &RequestDescriptor {
        &self.request
    }
}

/// Each canned result is consumed at most once, first registered match first.
pub struct MockSession {
    results: Mutex<Vec<MockResult>>,
    unmatched: Mutex<Vec<String>>,
}

impl MockSession {
    pub fn new(results: Vec<MockResult>) -> Self {
        Self {
            results: Mutex::new(results),
            unmatched: Mutex::new(Vec::new()),
        }
    }

    /// Add another canned result after construction.
    pub fn push(&self, result: MockResult) {
        self.results.lock().push(result);
    }

    /// True only if every canned result was consumed and no request went unmatched.
    pub fn verify(&self) -> bool {
        self.results.lock().is_empty() && self.unmatched.lock().is_empty()
    }

    /// Requests still waiting to be made.
    pub fn remaining(&self) -> Vec<String> {
        self.results
            .lock()
            .iter()
            .map(|r| r.request.to_string())
            .collect()
    }

    /// Requests that were made but had no registered result.
    pub fn unmatched(&self) -> Vec<String> {
        self.unmatched.lock().clone()
    }

    fn take(
        &self,
        request: &RequestDescriptor,
        kind: ResourceKind,
    ) -> Result<(Result<Payload, FetchError>, Option<Duration>), FetchError> {
        let mut results = self.results.lock();
        let Some(index) = results.iter().position(|r| r.request.matches(request)) else {
            drop(results);
            error!("mock session: no canned result for {}", request);
            self.unmatched.lock().push(request.to_string());
            return Err(FetchError::Configuration(format!(
                "no canned result for {}",
                request
            )));
        };

        if results[index].result.is_ok() && results[index].kind != kind {
            let registered = results[index].kind;
            drop(results);
            error!(
                "mock session: canned {:?} does not match requested {:?} for {}",
                registered, kind, request
            );
            self.unmatched.lock().push(request.to_string());
            return Err(FetchError::Configuration(format!(
                "canned {:?} result does not match requested {:?} for {}",
                registered, kind, request
            )));
        }

        let entry = results.remove(index);
        debug!("mock session: consumed {} ({} left)", request, results.len());
        Ok((entry.result, entry.delay))
    }
}

#[async_trait]
impl Session for MockSession {
    async fn load(
        &self,
        request: &RequestDescriptor,
        kind: ResourceKind,
    ) -> Result<Payload, FetchError> {
        let (result, delay) = self.take(request, kind)?;
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }
        result
    }
}
