//! Skip-and-continue behavior of the record collector

mod common;

use common::resource;
use gwarchive::core::collect::{CollectionStats, RecordCollector};
use gwarchive::core::fetch::{FetchOutcome, RetryPolicy, RetryingFetcher};
use gwarchive::domain::{ApiError, ArchiveError, ResourceRef};
use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

fn refs(count: usize) -> Vec<ResourceRef> {
    (1..=count)
        .map(|n| resource(&format!("group{n}@example.com"), &format!("Group {n}")))
        .collect()
}

#[tokio::test]
async fn test_failed_resource_is_skipped_and_collection_continues() {
    let attempted = Mutex::new(Vec::new());
    let fetcher = RetryingFetcher::new(RetryPolicy::immediate(3));

    let (records, stats) = RecordCollector::new(1)
        .collect_vec(refs(10), |resource| {
            let fetcher = &fetcher;
            let attempted = &attempted;
            async move {
                fetcher
                    .call("members.list", || {
                        attempted.lock().unwrap().push(resource.id.to_string());
                        let result = if resource.id.as_str() == "group4@example.com" {
                            Err(ApiError::transport("connection reset"))
                        } else {
                            Ok(resource.name().unwrap_or_default().to_string())
                        };
                        async move { result }
                    })
                    .await
            }
        })
        .await
        .unwrap();

    assert_eq!(records.len(), 9);
    assert!(records
        .iter()
        .all(|r| r.resource.id.as_str() != "group4@example.com"));
    assert_eq!(
        stats,
        CollectionStats {
            listed: 10,
            with_data: 9,
            skipped: 1,
            ..CollectionStats::default()
        }
    );

    let attempted = attempted.into_inner().unwrap();
    assert_eq!(
        attempted.iter().filter(|id| *id == "group4@example.com").count(),
        3
    );
    for n in 5..=10 {
        let id = format!("group{n}@example.com");
        assert!(attempted.contains(&id), "{id} was not attempted");
    }
}

#[tokio::test]
async fn test_concurrent_fetches_keep_listing_order() {
    // Later resources finish first
    let delays: HashMap<String, u64> = (1..=6)
        .map(|n| (format!("group{n}@example.com"), (7 - n) * 5))
        .collect();

    let (records, stats) = RecordCollector::new(4)
        .collect_vec(refs(6), |resource| {
            let delay = delays[resource.id.as_str()];
            async move {
                tokio::time::sleep(Duration::from_millis(delay)).await;
                FetchOutcome::Ok(resource.name().unwrap_or_default().to_string())
            }
        })
        .await
        .unwrap();

    let names: Vec<_> = records
        .iter()
        .map(|r| r.detail.clone().unwrap())
        .collect();
    assert_eq!(
        names,
        vec!["Group 1", "Group 2", "Group 3", "Group 4", "Group 5", "Group 6"]
    );
    assert_eq!(stats.with_data, 6);
}

#[tokio::test]
async fn test_duplicates_visited_once() {
    let mut listing = refs(3);
    listing.push(resource("group2@example.com", "Group 2 again"));
    let fetched = Mutex::new(0);

    let (records, stats) = RecordCollector::new(2)
        .collect_vec(listing, |resource| {
            *fetched.lock().unwrap() += 1;
            async move { FetchOutcome::Ok(resource.id.to_string()) }
        })
        .await
        .unwrap();

    assert_eq!(records.len(), 3);
    assert_eq!(*fetched.lock().unwrap(), 3);
    assert_eq!(stats.duplicates_skipped, 1);
    assert_eq!(stats.listed, 4);
}

#[tokio::test]
async fn test_missing_detail_reaches_sink_without_data() {
    let (records, stats) = RecordCollector::new(1)
        .collect_vec(refs(2), |resource| async move {
            if resource.id.as_str() == "group1@example.com" {
                FetchOutcome::Missing
            } else {
                FetchOutcome::Ok(())
            }
        })
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert!(records[0].detail.is_none());
    assert_eq!(stats.missing, 1);
    assert_eq!(stats.with_data, 1);
}

#[tokio::test]
async fn test_sink_error_stops_collection() {
    let mut seen = 0;
    let result = RecordCollector::new(1)
        .collect(
            refs(5),
            |_resource| async { FetchOutcome::Ok(()) },
            |_record| {
                seen += 1;
                if seen == 2 {
                    Err(ArchiveError::Io("disk full".to_string()))
                } else {
                    Ok(())
                }
            },
        )
        .await;

    assert!(matches!(result, Err(ArchiveError::Io(_))));
    assert_eq!(seen, 2);
}

#[tokio::test]
async fn test_all_skipped() {
    let (records, stats) = RecordCollector::new(3)
        .collect_vec(refs(4), |_resource| async {
            FetchOutcome::<()>::Fatal(ApiError::fatal("forbidden"))
        })
        .await
        .unwrap();

    assert!(records.is_empty());
    assert!(stats.all_skipped());
    assert_eq!(stats.visited(), 4);
}
