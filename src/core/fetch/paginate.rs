//! Lazy cursor-based pagination
//!
//! Each page request goes through the [`RetryingFetcher`]. A page that still
//! fails ends the whole listing: the cursor for the next page comes from the
//! failed one, so nothing after it can be reached.

use super::retry::{FetchOutcome, RetryingFetcher};
use crate::domain::errors::{ApiError, FetchError, PaginationError};
use crate::domain::records::{Page, PageCursor};
use futures::stream::{self, Stream, TryStreamExt};
use std::future::Future;

/// Default upper bound on pages per listing
pub const DEFAULT_MAX_PAGES: usize = 10_000;

/// Turns a page-fetching function into a stream of items
#[derive(Debug, Clone)]
pub struct Paginator {
    fetcher: RetryingFetcher,
    max_pages: usize,
}

struct PageState<F> {
    fetch_page: F,
    cursor: PageCursor,
    page: usize,
    done: bool,
}

impl Paginator {
    /// Creates a paginator
    pub fn new(fetcher: RetryingFetcher, max_pages: usize) -> Self {
        Self {
            fetcher,
            max_pages: max_pages.max(1),
        }
    }

    /// Streams every item of a listing, in server order
    ///
    /// Nothing is requested until the stream is polled. Calling again starts
    /// over from the first page. Items are passed through as returned; no
    /// deduplication happens here.
    pub fn stream<'a, T, F, Fut>(
        &'a self,
        label: &'a str,
        fetch_page: F,
    ) -> impl Stream<Item = Result<T, PaginationError>> + 'a
    where
        T: 'a,
        F: FnMut(PageCursor) -> Fut + 'a,
        Fut: Future<Output = Result<Page<T>, ApiError>> + 'a,
    {
        let initial = PageState {
            fetch_page,
            cursor: PageCursor::start(),
            page: 0,
            done: false,
        };

        stream::try_unfold(initial, move |mut state| async move {
            if state.done {
                return Ok(None);
            }
            if state.page >= self.max_pages {
                return Err(PaginationError::TooManyPages {
                    limit: self.max_pages,
                });
            }

            let page_no = state.page;
            let cursor = state.cursor.clone();
            let outcome = self
                .fetcher
                .call(label, || (state.fetch_page)(cursor.clone()))
                .await;

            let page = match outcome {
                FetchOutcome::Ok(page) => page,
                FetchOutcome::Missing => return Err(PaginationError::Missing { page: page_no }),
                FetchOutcome::Retryable { attempts, cause } => {
                    return Err(PaginationError::Fetch {
                        page: page_no,
                        source: FetchError::RetriesExhausted {
                            attempts,
                            last: cause,
                        },
                    })
                }
                FetchOutcome::Fatal(cause) => {
                    return Err(PaginationError::Fetch {
                        page: page_no,
                        source: FetchError::Fatal(cause),
                    })
                }
            };

            if !page.next.is_exhausted() && page.next == cursor {
                return Err(PaginationError::StalledCursor { page: page_no });
            }

            tracing::debug!(
                call = label,
                page = page_no,
                items = page.items.len(),
                last = page.next.is_exhausted(),
                "Fetched page"
            );

            state.done = page.next.is_exhausted();
            state.cursor = page.next;
            state.page += 1;
            Ok(Some((page.items, state)))
        })
        .map_ok(|items| stream::iter(items.into_iter().map(Ok)))
        .try_flatten()
    }

    /// Collects a whole listing into memory
    pub async fn collect_all<T, F, Fut>(
        &self,
        label: &str,
        fetch_page: F,
    ) -> Result<Vec<T>, PaginationError>
    where
        F: FnMut(PageCursor) -> Fut,
        Fut: Future<Output = Result<Page<T>, ApiError>>,
    {
        self.stream(label, fetch_page).try_collect().await
    }

    /// Counts items without keeping them
    pub async fn count<T, F, Fut>(&self, label: &str, fetch_page: F) -> Result<usize, PaginationError>
    where
        F: FnMut(PageCursor) -> Fut,
        Fut: Future<Output = Result<Page<T>, ApiError>>,
    {
        self.stream(label, fetch_page)
            .try_fold(0usize, |n, _| async move { Ok(n + 1) })
            .await
    }
}
