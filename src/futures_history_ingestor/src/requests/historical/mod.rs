mod batch_request;
pub use batch_request::{build_requests, fetch_chunks};
