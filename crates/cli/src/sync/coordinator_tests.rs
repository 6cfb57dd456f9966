// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]

use tm_core::Clock;

use super::*;
use crate::store::LAST_SYNC_ATTEMPT_KEY;
use crate::sync::test_helpers::{base_time, make_report_payload, TestEngine};

fn completed(delivered: usize, retained: usize, dropped: usize) -> PassReport {
    PassReport::Completed(PassSummary {
        delivered,
        retained,
        dropped,
    })
}

#[tokio::test]
async fn test_skip_when_offline() {
    let engine = TestEngine::new(false).await;
    engine.enqueue_reports(&["a"]).await;

    let report = engine.coordinator.attempt_sync(Trigger::Connectivity).await;

    assert_eq!(report.skipped(), Some(SkipReason::Offline));
    assert_eq!(engine.submitter.call_count(), 0);
    assert_eq!(engine.kv.peek(LAST_SYNC_ATTEMPT_KEY), None);
}

#[tokio::test]
async fn test_skip_when_queue_empty_does_not_stamp_attempt() {
    let engine = TestEngine::new(true).await;

    let report = engine.coordinator.attempt_sync(Trigger::Startup).await;

    assert_eq!(report.skipped(), Some(SkipReason::EmptyQueue));
    assert_eq!(engine.kv.peek(LAST_SYNC_ATTEMPT_KEY), None);
}

#[tokio::test]
async fn test_successful_pass_drains_queue() {
    let engine = TestEngine::new(true).await;
    let ids = engine.enqueue_reports(&["a", "b", "c"]).await;

    let report = engine.coordinator.attempt_sync(Trigger::Startup).await;

    assert_eq!(report, completed(3, 0, 0));
    assert_eq!(report.delivered(), 3);
    assert!(engine.queue.is_empty().await);
    assert!(engine.queue.store().load().await.is_empty());
    assert_eq!(engine.submitter.call_names(), vec!["a", "b", "c"]);

    let delivered: Vec<_> = engine
        .notifier
        .all()
        .into_iter()
        .filter_map(|n| match n {
            Notification::Delivered { id } => Some(id),
            _ => None,
        })
        .collect();
    assert_eq!(delivered, ids);
    assert_eq!(
        engine
            .notifier
            .count_where(|n| matches!(n, Notification::Pending { .. })),
        0
    );
    assert!(!engine.coordinator.is_syncing());
}

#[tokio::test]
async fn test_pass_stamps_attempt_time() {
    let engine = TestEngine::new(true).await;
    engine.enqueue_reports(&["a"]).await;
    let started = engine.clock.now();

    engine.coordinator.attempt_sync(Trigger::Startup).await;

    assert_eq!(engine.queue.store().last_attempt().await, Some(started));
}

#[tokio::test]
async fn test_failure_increments_attempts_and_keeps_record() {
    let engine = TestEngine::new(true).await;
    let ids = engine.enqueue_reports(&["a", "b"]).await;
    engine.submitter.push([Err(SubmitFailure::retry("503")), Ok(())]);

    let report = engine.coordinator.attempt_sync(Trigger::Startup).await;

    assert_eq!(report, completed(1, 1, 0));
    let remaining = engine.queue.snapshot().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, ids[0]);
    assert_eq!(remaining[0].attempts, 1);
    assert_eq!(engine.queue.store().load().await, remaining);
    assert!(engine
        .notifier
        .all()
        .contains(&Notification::Pending { count: 1 }));
}

#[tokio::test]
async fn test_failing_record_does_not_abort_pass() {
    let engine = TestEngine::new(true).await;
    engine.enqueue_reports(&["a", "b", "c"]).await;
    engine.submitter.push([
        Ok(()),
        Err(SubmitFailure::retry("connection reset")),
        Ok(()),
    ]);

    let report = engine.coordinator.attempt_sync(Trigger::Startup).await;

    assert_eq!(report, completed(2, 1, 0));
    assert_eq!(engine.submitter.call_count(), 3);
}

#[tokio::test]
async fn test_rate_limit_between_passes() {
    let engine = TestEngine::new(true).await;
    engine.enqueue_reports(&["a"]).await;
    engine
        .submitter
        .set_fallback(Some(SubmitFailure::retry("down")));

    assert_eq!(
        engine.coordinator.attempt_sync(Trigger::Startup).await,
        completed(0, 1, 0)
    );

    engine.clock.advance(chrono::Duration::minutes(4));
    let report = engine.coordinator.attempt_sync(Trigger::Foreground).await;
    assert_eq!(report.skipped(), Some(SkipReason::RateLimited));
    assert_eq!(engine.submitter.call_count(), 1);

    engine.clock.advance(chrono::Duration::minutes(1));
    let report = engine.coordinator.attempt_sync(Trigger::Foreground).await;
    assert!(report.skipped().is_none());
    assert_eq!(engine.submitter.call_count(), 2);
}

#[tokio::test]
async fn test_rate_limit_counts_unsuccessful_passes() {
    let engine = TestEngine::new(true).await;
    engine.enqueue_reports(&["a", "b"]).await;
    engine
        .submitter
        .set_fallback(Some(SubmitFailure::retry("down")));

    engine.coordinator.attempt_sync(Trigger::Startup).await;
    engine.clock.advance(chrono::Duration::seconds(10));

    for trigger in [Trigger::Connectivity, Trigger::Enqueue, Trigger::Foreground] {
        assert_eq!(
            engine.coordinator.attempt_sync(trigger).await.skipped(),
            Some(SkipReason::RateLimited)
        );
    }
}

#[tokio::test]
async fn test_manual_trigger_bypasses_rate_limit_only() {
    let engine = TestEngine::new(true).await;
    engine.enqueue_reports(&["a", "b"]).await;
    engine.submitter.push([Ok(()), Err(SubmitFailure::retry("busy"))]);

    engine.coordinator.attempt_sync(Trigger::Startup).await;
    engine.clock.advance(chrono::Duration::seconds(5));

    let report = engine.coordinator.attempt_sync(Trigger::Manual).await;
    assert_eq!(report, completed(1, 0, 0));

    engine.monitor.set_connected(false);
    assert_eq!(
        engine.coordinator.attempt_sync(Trigger::Manual).await.skipped(),
        Some(SkipReason::Offline)
    );
}

#[tokio::test]
async fn test_future_attempt_timestamp_does_not_block() {
    let engine = TestEngine::new(true).await;
    engine.enqueue_reports(&["a"]).await;
    engine
        .queue
        .store()
        .set_last_attempt(base_time() + chrono::Duration::days(1))
        .await
        .unwrap();

    let report = engine.coordinator.attempt_sync(Trigger::Startup).await;
    assert_eq!(report, completed(1, 0, 0));
}

#[tokio::test]
async fn test_ceiling_drops_record_after_max_attempts() {
    let engine = TestEngine::new(true).await;
    let ids = engine.enqueue_reports(&["a"]).await;
    engine
        .submitter
        .set_fallback(Some(SubmitFailure::retry("server responded 500")));

    let mut seen_attempts = Vec::new();
    for _ in 0..4 {
        engine.coordinator.attempt_sync(Trigger::Connectivity).await;
        seen_attempts.push(engine.queue.snapshot().await[0].attempts);
        engine.pass_interval();
    }
    assert_eq!(seen_attempts, vec![1, 2, 3, 4]);

    let report = engine.coordinator.attempt_sync(Trigger::Connectivity).await;

    assert_eq!(report, completed(0, 0, 1));
    assert!(engine.queue.is_empty().await);
    assert!(engine.queue.store().load().await.is_empty());
    assert!(engine.notifier.all().contains(&Notification::Dropped {
        id: ids[0].clone(),
        attempts: 5,
        reason: "server responded 500".to_string(),
    }));
    assert_eq!(engine.submitter.call_count(), 5);
}

#[tokio::test]
async fn test_permanent_failure_drops_immediately() {
    let engine = TestEngine::new(true).await;
    let ids = engine.enqueue_reports(&["bad", "good"]).await;
    engine
        .submitter
        .push([Err(SubmitFailure::permanent("server responded 422")), Ok(())]);

    let report = engine.coordinator.attempt_sync(Trigger::Startup).await;

    assert_eq!(report, completed(1, 0, 1));
    assert!(engine.queue.is_empty().await);
    assert!(engine.notifier.all().contains(&Notification::Dropped {
        id: ids[0].clone(),
        attempts: 1,
        reason: "server responded 422".to_string(),
    }));
}

#[tokio::test(start_paused = true)]
async fn test_submit_timeout_counts_as_failure() {
    let engine = TestEngine::new(true).await;
    engine.enqueue_reports(&["slow"]).await;
    engine.submitter.set_delay(std::time::Duration::from_secs(120));

    let report = engine.coordinator.attempt_sync(Trigger::Startup).await;

    assert_eq!(report, completed(0, 1, 0));
    assert_eq!(engine.queue.snapshot().await[0].attempts, 1);
}

#[tokio::test]
async fn test_second_trigger_while_syncing_is_noop() {
    let engine = TestEngine::new(true).await;
    engine.enqueue_reports(&["a"]).await;
    let gate = engine.submitter.hold();

    let coordinator = engine.coordinator.clone();
    let first = tokio::spawn(async move { coordinator.attempt_sync(Trigger::Startup).await });
    engine.submitter.wait_entered().await;
    assert!(engine.coordinator.is_syncing());

    let second = engine.coordinator.attempt_sync(Trigger::Manual).await;
    assert_eq!(second.skipped(), Some(SkipReason::AlreadySyncing));

    gate.add_permits(1);
    assert_eq!(first.await.unwrap(), completed(1, 0, 0));
    assert_eq!(engine.submitter.call_count(), 1);
    assert!(!engine.coordinator.is_syncing());
}

#[tokio::test]
async fn test_enqueue_during_pass_is_kept_for_next_pass() {
    let engine = TestEngine::new(true).await;
    engine.enqueue_reports(&["early"]).await;
    let gate = engine.submitter.hold();

    let coordinator = engine.coordinator.clone();
    let pass = tokio::spawn(async move { coordinator.attempt_sync(Trigger::Startup).await });
    engine.submitter.wait_entered().await;

    let late = engine
        .queue
        .enqueue(make_report_payload("late"), engine.clock.now())
        .await;
    gate.add_permits(1);

    assert_eq!(pass.await.unwrap(), completed(1, 0, 0));
    let remaining = engine.queue.snapshot().await;
    assert_eq!(remaining.len(), 1);
    assert_eq!(remaining[0].id, late);
    assert_eq!(remaining[0].attempts, 0);
    assert_eq!(engine.queue.store().load().await, remaining);
    assert_eq!(engine.submitter.call_names(), vec!["early"]);

    gate.add_permits(1);
    let report = engine.coordinator.attempt_sync(Trigger::Manual).await;
    assert_eq!(report, completed(1, 0, 0));
}

#[tokio::test]
async fn test_settle_write_failure_keeps_in_memory_result() {
    let engine = TestEngine::new(true).await;
    engine.enqueue_reports(&["a"]).await;
    engine.kv.set_fail_writes(true);

    let report = engine.coordinator.attempt_sync(Trigger::Startup).await;

    assert_eq!(report, completed(1, 0, 0));
    assert!(engine.queue.is_empty().await);
    engine.kv.set_fail_writes(false);
    // The stale persisted copy is re-sent after a restart.
    assert_eq!(engine.queue.store().load().await.len(), 1);
}

#[test]
fn test_trigger_and_reason_display() {
    assert_eq!(Trigger::Manual.to_string(), "manual");
    assert_eq!(SkipReason::RateLimited.to_string(), "last attempt was too recent");
}

#[test]
fn test_pass_report_serializes_with_status() {
    let value = serde_json::to_value(completed(2, 1, 0)).unwrap();
    assert_eq!(value["status"], "completed");
    assert_eq!(value["delivered"], 2);

    let value = serde_json::to_value(PassReport::Skipped {
        reason: SkipReason::Offline,
    })
    .unwrap();
    assert_eq!(value["status"], "skipped");
    assert_eq!(value["reason"], "offline");
}

#[test]
fn test_default_settings() {
    let settings = SyncSettings::default();
    assert_eq!(settings.min_interval, std::time::Duration::from_secs(300));
    assert_eq!(settings.max_attempts, 5);
    assert_eq!(settings.submit_timeout, std::time::Duration::from_secs(30));
}
