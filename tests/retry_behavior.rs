//! Behavior-driven tests for the retry executor
//!
//! These tests verify HOW the executor schedules attempts: exact backoff
//! arithmetic under virtual time, exhaustion reporting, and cancellation
//! precedence over retry scheduling.

use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;
use std::time::Duration;

use ixion_core::{execute_with_retry, FetchError, FetchErrorKind, RetryPolicy};
use tokio::time::Instant;
use tokio_util::sync::CancellationToken;

fn short_policy(max_attempts: u32) -> RetryPolicy {
    RetryPolicy::new(max_attempts)
        .with_initial_delay(Duration::from_millis(100))
        .with_backoff_multiplier(2.0)
}

// =============================================================================
// Retry Executor: Backoff Arithmetic
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_failures_precede_success_the_final_attempt_succeeds_after_exact_delays() {
    // Given: An operation that fails twice and then succeeds
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();
    let started = Instant::now();

    // When: It runs under a three-attempt policy with 100ms initial delay
    let outcome = execute_with_retry(&short_policy(3), &CancellationToken::new(), move |_| {
        let attempt = counter.fetch_add(1, Ordering::SeqCst);
        async move {
            if attempt < 2 {
                Err(FetchError::transport("synthetic reset"))
            } else {
                Ok(attempt)
            }
        }
    })
    .await;

    // Then: Success on the third call, after exactly 100ms + 200ms of delay
    assert_eq!(outcome.expect("third attempt succeeds"), 2);
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(started.elapsed(), Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn when_the_first_attempt_succeeds_no_delay_elapses() {
    // Given: An operation that succeeds immediately
    let started = Instant::now();

    // When: It runs under a policy with a long initial delay
    let outcome = execute_with_retry(
        &RetryPolicy::default().with_initial_delay(Duration::from_secs(60)),
        &CancellationToken::new(),
        |_| async { Ok(41) },
    )
    .await;

    // Then: The value comes back with zero virtual time spent
    assert_eq!(outcome.expect("first attempt succeeds"), 41);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

// =============================================================================
// Retry Executor: Exhaustion
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_every_attempt_fails_exhaustion_embeds_count_and_last_error() {
    // Given: An operation that always fails with a distinct final message
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();
    let started = Instant::now();

    // When: The three-attempt budget is spent
    let error = execute_with_retry::<u32, _, _>(
        &short_policy(3),
        &CancellationToken::new(),
        move |_| {
            let attempt = counter.fetch_add(1, Ordering::SeqCst);
            async move { Err(FetchError::transport(format!("reset on attempt {attempt}"))) }
        },
    )
    .await
    .expect_err("budget must be exhausted");

    // Then: The terminal error names the budget and the last failure, and
    // no delay follows the final attempt (100ms + 200ms only)
    assert_eq!(error.kind(), FetchErrorKind::Exhausted);
    assert!(error.message().contains("after 3 attempts"));
    assert!(error.message().contains("reset on attempt 2"));
    assert_eq!(attempts.load(Ordering::SeqCst), 3);
    assert_eq!(started.elapsed(), Duration::from_millis(300));
}

#[tokio::test(start_paused = true)]
async fn when_the_budget_is_one_attempt_there_are_no_retries_and_no_delay() {
    // Given: A single-attempt policy
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();
    let started = Instant::now();

    // When: The only attempt fails
    let error = execute_with_retry::<u32, _, _>(
        &RetryPolicy::no_retry().with_initial_delay(Duration::from_secs(60)),
        &CancellationToken::new(),
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Err(FetchError::transport("reset")) }
        },
    )
    .await
    .expect_err("single attempt fails");

    // Then: Exhaustion after one call with zero virtual time spent
    assert_eq!(error.kind(), FetchErrorKind::Exhausted);
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(started.elapsed(), Duration::ZERO);
}

#[tokio::test(start_paused = true)]
async fn when_a_failure_is_not_retryable_the_schedule_short_circuits() {
    // Given: An operation that fails with a defect-class error
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();

    // When: It runs under a generous budget
    let error = execute_with_retry::<u32, _, _>(
        &short_policy(5),
        &CancellationToken::new(),
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Err(FetchError::internal("misconfigured collaborator")) }
        },
    )
    .await
    .expect_err("must fail");

    // Then: The error passes through unchanged after a single call
    assert_eq!(error.kind(), FetchErrorKind::Internal);
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
}

// =============================================================================
// Retry Executor: Cancellation Precedence
// =============================================================================

#[tokio::test(start_paused = true)]
async fn when_cancelled_during_a_delay_the_outcome_is_cancellation_not_exhaustion() {
    // Given: An always-failing operation under a long inter-attempt delay
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();
    let cancel = CancellationToken::new();

    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_secs(1)).await;
        trigger.cancel();
    });

    let started = Instant::now();

    // When: Cancellation fires one second into the ten-second delay
    let error = execute_with_retry::<u32, _, _>(
        &RetryPolicy::new(5).with_initial_delay(Duration::from_secs(10)),
        &cancel,
        move |_| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Err(FetchError::transport("reset")) }
        },
    )
    .await
    .expect_err("must be cancelled");

    // Then: The outcome is cancellation, after only the first attempt
    assert_eq!(error.kind(), FetchErrorKind::Cancelled);
    assert_eq!(attempts.load(Ordering::SeqCst), 1);
    assert_eq!(started.elapsed(), Duration::from_secs(1));
}

#[tokio::test(start_paused = true)]
async fn when_the_token_is_already_cancelled_the_operation_never_runs() {
    // Given: A pre-cancelled token
    let cancel = CancellationToken::new();
    cancel.cancel();
    let attempts = Arc::new(AtomicU32::new(0));
    let counter = attempts.clone();

    // When: The executor is invoked
    let error = execute_with_retry::<u32, _, _>(&short_policy(5), &cancel, move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        async move { Ok(0) }
    })
    .await
    .expect_err("must be cancelled");

    // Then: Cancellation with zero invocations
    assert_eq!(error.kind(), FetchErrorKind::Cancelled);
    assert_eq!(attempts.load(Ordering::SeqCst), 0);
}

#[tokio::test(start_paused = true)]
async fn when_cancelled_mid_attempt_the_in_flight_call_is_abandoned() {
    // Given: An operation that never completes on its own
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    // When: Cancellation fires while the attempt is pending
    let error = execute_with_retry::<u32, _, _>(&short_policy(3), &cancel, |_| async {
        tokio::time::sleep(Duration::from_secs(3600)).await;
        Ok(0)
    })
    .await
    .expect_err("must be cancelled");

    // Then: The cancellation outcome comes back promptly
    assert_eq!(error.kind(), FetchErrorKind::Cancelled);
}
