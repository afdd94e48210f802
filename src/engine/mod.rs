// Engine orchestration: list state, size fan-out, observers and feeds.

mod fanout;
pub mod feeds;
pub mod observers;
pub mod pager;
pub mod state;
pub mod stats;
