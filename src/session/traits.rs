use async_trait::async_trait;

use crate::endpoint::request::{Endpoint, RequestDescriptor};
use crate::endpoint::resource::{Payload, Resource, ResourceKind};
use crate::error::FetchError;

/// Executes request descriptors. Dropping the returned future cancels the call.
#[async_trait]
pub trait Session: Send + Sync {
    /// Perform `request` and decode its response as `kind`.
    async fn load(
        &self,
        request: &RequestDescriptor,
        kind: ResourceKind,
    ) -> Result<Payload, FetchError>;
}

impl dyn Session {
    /// Typed execution of an endpoint.
    pub async fn execute<A: Resource>(&self, endpoint: &Endpoint<A>) -> Result<A, FetchError> {
        let payload = self.load(endpoint.request(), A::KIND).await?;
        A::from_payload(payload).map_err(|other| {
            FetchError::Configuration(format!(
                "session returned {:?} for a {:?} request: {}",
                other.kind(),
                A::KIND,
                endpoint.request()
            ))
        })
    }
}
