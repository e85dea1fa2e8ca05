//! Remote call plumbing: bounded retry and lazy pagination

pub mod paginate;
pub mod retry;

pub use paginate::{Paginator, DEFAULT_MAX_PAGES};
pub use retry::{Backoff, FetchOutcome, RetryPolicy, RetryingFetcher};
