// Session abstraction: pluggable transports for catalog requests.

pub mod http_session;
pub mod mock_session;
pub mod traits;
