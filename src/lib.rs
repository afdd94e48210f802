// Paginated photo catalog engine: page loads, per-item size fan-out, merge and notify.

pub mod config;
pub mod endpoint;
pub mod engine;
pub mod error;
pub mod logging;
pub mod session;

pub use endpoint::catalog::Catalog;
pub use endpoint::request::{Endpoint, RequestDescriptor};
pub use engine::observers::ObservationToken;
pub use engine::pager::{PageSource, Pager, ResolvedItem};
pub use error::FetchError;
pub use session::traits::Session;
