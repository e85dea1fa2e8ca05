//! Attempt counting of the retrying fetcher

use gwarchive::core::fetch::{FetchOutcome, RetryPolicy, RetryingFetcher};
use gwarchive::domain::{ApiError, ErrorClass};
use std::sync::atomic::{AtomicU32, Ordering};
use test_case::test_case;

async fn run_failing(max_attempts: u32, failures: u32, error: ApiError) -> (FetchOutcome<u32>, u32) {
    let calls = AtomicU32::new(0);
    let fetcher = RetryingFetcher::new(RetryPolicy::immediate(max_attempts));

    let outcome = fetcher
        .call("test.call", || {
            let n = calls.fetch_add(1, Ordering::SeqCst) + 1;
            let result = if n > failures {
                Ok(n)
            } else {
                Err(error.clone())
            };
            async move { result }
        })
        .await;

    (outcome, calls.load(Ordering::SeqCst))
}

#[test_case(3, 0 ; "first attempt succeeds")]
#[test_case(3, 1 ; "one transient failure")]
#[test_case(3, 2 ; "succeeds on last attempt")]
#[test_case(5, 4 ; "mail budget")]
#[tokio::test]
async fn test_success_within_budget(max_attempts: u32, failures: u32) {
    let (outcome, calls) = run_failing(max_attempts, failures, ApiError::transport("reset")).await;

    assert_eq!(outcome, FetchOutcome::Ok(failures + 1));
    assert_eq!(calls, failures + 1);
}

#[test_case(ErrorClass::RateLimited ; "rate limited")]
#[test_case(ErrorClass::TransientService ; "transient")]
#[tokio::test]
async fn test_never_succeeding_stops_at_max_attempts(class: ErrorClass) {
    let (outcome, calls) = run_failing(3, u32::MAX, ApiError::new(class, "still failing")).await;

    assert_eq!(calls, 3);
    match outcome {
        FetchOutcome::Retryable { attempts, cause } => {
            assert_eq!(attempts, 3);
            assert_eq!(cause.class, class);
        }
        other => panic!("expected retryable outcome, got {other:?}"),
    }
}

#[tokio::test]
async fn test_fatal_error_is_not_retried() {
    let (outcome, calls) = run_failing(5, u32::MAX, ApiError::from_status(403, "forbidden")).await;

    assert_eq!(calls, 1);
    assert!(matches!(outcome, FetchOutcome::Fatal(ref e) if e.status == Some(403)));
}

#[tokio::test]
async fn test_not_found_is_missing_without_retry() {
    let (outcome, calls) = run_failing(5, u32::MAX, ApiError::from_status(404, "no such group")).await;

    assert_eq!(calls, 1);
    assert_eq!(outcome, FetchOutcome::Missing);
}

#[tokio::test]
async fn test_single_attempt_policy() {
    let (outcome, calls) = run_failing(1, u32::MAX, ApiError::rate_limited("quota")).await;

    assert_eq!(calls, 1);
    assert!(matches!(outcome, FetchOutcome::Retryable { attempts: 1, .. }));
}
