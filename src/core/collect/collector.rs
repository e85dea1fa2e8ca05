//! Per-resource detail collection
//!
//! The collector drives one detail fetch per listed resource and hands each
//! result to a sink as soon as it is available. Per-resource failures stop at
//! this boundary: the resource is skipped, counted and logged, and
//! collection moves on.

use super::stats::CollectionStats;
use crate::core::fetch::FetchOutcome;
use crate::domain::records::ResourceRef;
use crate::domain::result::Result;
use futures::stream::{self, StreamExt};
use std::collections::HashSet;
use std::future::Future;

/// One resource together with its detail
///
/// `detail` is `None` when the remote side reported no data for the
/// resource.
#[derive(Debug, Clone, PartialEq)]
pub struct CollectedRecord<D> {
    /// The listed resource
    pub resource: ResourceRef,

    /// Its detail payload, if any
    pub detail: Option<D>,
}

/// Drives detail fetches over a listing
#[derive(Debug, Clone)]
pub struct RecordCollector {
    concurrency: usize,
}

impl RecordCollector {
    /// Creates a collector running up to `concurrency` fetches at once
    pub fn new(concurrency: usize) -> Self {
        Self {
            concurrency: concurrency.max(1),
        }
    }

    /// Fetches the detail of every resource and feeds the sink in listing order
    ///
    /// Each resource id is visited at most once; repeats in the listing are
    /// counted as `duplicates_skipped`. Results reach the sink in the order
    /// of `refs`, whatever order the fetches complete in. A sink error ends
    /// collection and is returned.
    pub async fn collect<D, F, Fut, S>(
        &self,
        refs: Vec<ResourceRef>,
        fetch: F,
        mut sink: S,
    ) -> Result<CollectionStats>
    where
        F: Fn(ResourceRef) -> Fut,
        Fut: Future<Output = FetchOutcome<D>>,
        S: FnMut(CollectedRecord<D>) -> Result<()>,
    {
        let mut stats = CollectionStats {
            listed: refs.len(),
            ..CollectionStats::default()
        };

        let mut seen = HashSet::with_capacity(refs.len());
        let unique: Vec<ResourceRef> = refs
            .into_iter()
            .filter(|resource| {
                if seen.insert(resource.id.clone()) {
                    true
                } else {
                    tracing::warn!(resource = %resource.id, "Resource listed twice, visiting once");
                    stats.duplicates_skipped += 1;
                    false
                }
            })
            .collect();

        let results = stream::iter(unique)
            .map(|resource| {
                let pending = fetch(resource.clone());
                async move { (resource, pending.await) }
            })
            .buffered(self.concurrency);
        futures::pin_mut!(results);

        while let Some((resource, outcome)) = results.next().await {
            match outcome {
                FetchOutcome::Ok(detail) => {
                    stats.with_data += 1;
                    sink(CollectedRecord {
                        resource,
                        detail: Some(detail),
                    })?;
                }
                FetchOutcome::Missing => {
                    tracing::debug!(resource = %resource.id, "No detail data for resource");
                    stats.missing += 1;
                    sink(CollectedRecord {
                        resource,
                        detail: None,
                    })?;
                }
                FetchOutcome::Retryable { attempts, cause } => {
                    tracing::warn!(
                        resource = %resource.id,
                        name = resource.name(),
                        attempts,
                        cause = %cause.class,
                        error = %cause,
                        "Skipping resource, retries exhausted"
                    );
                    stats.skipped += 1;
                }
                FetchOutcome::Fatal(cause) => {
                    tracing::warn!(
                        resource = %resource.id,
                        name = resource.name(),
                        cause = %cause.class,
                        error = %cause,
                        "Skipping resource after non-retryable error"
                    );
                    stats.skipped += 1;
                }
            }
        }

        tracing::info!(
            listed = stats.listed,
            with_data = stats.with_data,
            missing = stats.missing,
            skipped = stats.skipped,
            duplicates_skipped = stats.duplicates_skipped,
            "Collection finished"
        );

        Ok(stats)
    }

    /// Collects every record into memory
    pub async fn collect_vec<D, F, Fut>(
        &self,
        refs: Vec<ResourceRef>,
        fetch: F,
    ) -> Result<(Vec<CollectedRecord<D>>, CollectionStats)>
    where
        F: Fn(ResourceRef) -> Fut,
        Fut: Future<Output = FetchOutcome<D>>,
    {
        let mut records = Vec::new();
        let stats = self
            .collect(refs, fetch, |record| {
                records.push(record);
                Ok(())
            })
            .await?;
        Ok((records, stats))
    }
}

impl Default for RecordCollector {
    fn default() -> Self {
        Self::new(1)
    }
}
