//! Request handler module
//!
//! Dispatch of requests onto the route table, and the hyper-facing entry
//! point that feeds it.

mod dispatch;
pub mod router;

pub use dispatch::{dispatch, Reply, RequestParts};
pub use router::handle_request;
