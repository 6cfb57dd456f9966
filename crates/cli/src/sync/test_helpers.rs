// SPDX-License-Identifier: MIT
// Copyright (c) 2026 Alfred Jean LLC

//! Shared test helpers for sync and store tests.

#![allow(clippy::unwrap_used)]

use std::collections::{BTreeMap, VecDeque};
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use chrono::{DateTime, NaiveDate, TimeZone, Utc};
use serde_json::json;
use tm_core::{
    Clock, IssueReport, ManualClock, Payload, PendingRecord, RecordId, SurveyResponse, Urgency,
};
use tokio::sync::{Notify, Semaphore};

use super::connectivity::SharedMonitor;
use super::coordinator::{SyncCoordinator, SyncParts, SyncSettings};
use super::facade::SubmissionFacade;
use super::notify::{Notification, Notifier};
use super::queue::PendingQueue;
use super::submitter::{RemoteSubmitter, SubmitFailure, SubmitResult};
use crate::store::{DraftStore, MemoryStore, QueueStore};

/// Fixed "now" for tests: 2025-04-13 09:00:00 UTC.
pub fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 4, 13, 9, 0, 0).unwrap()
}

/// A valid issue report captured `offset_secs` after [`base_time`].
pub fn make_report(name: &str, offset_secs: i64) -> IssueReport {
    IssueReport {
        name: name.to_string(),
        email: "hiker@example.com".to_string(),
        telephone: None,
        date_observed: NaiveDate::from_ymd_opt(2025, 4, 12),
        issue_type: "fallen_tree".to_string(),
        urgency: Urgency::Medium,
        location: Some("Mile 12".to_string()),
        coordinates: None,
        comments: format!("reported by {}", name),
        photo: None,
        submitted_at: base_time() + chrono::Duration::seconds(offset_secs),
    }
}

pub fn make_report_payload(name: &str) -> Payload {
    Payload::IssueReport(make_report(name, 0))
}

pub fn make_survey_payload() -> Payload {
    let mut answers = BTreeMap::new();
    answers.insert("rating".to_string(), json!(4));
    Payload::Survey(SurveyResponse {
        last_visit_date: NaiveDate::from_ymd_opt(2025, 4, 10),
        answers,
        submitted_at: base_time(),
    })
}

/// A queued record enqueued `offset_secs` after [`base_time`].
pub fn make_record(offset_secs: i64) -> PendingRecord {
    let payload = Payload::IssueReport(make_report(&format!("hiker-{}", offset_secs), offset_secs));
    let at = base_time() + chrono::Duration::seconds(offset_secs);
    let id = RecordId::generate(&payload.to_json().unwrap(), &at);
    PendingRecord::new(id, payload, at)
}

/// Name of the reporter behind a payload, or "survey".
pub fn payload_name(payload: &Payload) -> String {
    match payload {
        Payload::IssueReport(r) => r.name.clone(),
        Payload::Survey(_) => "survey".to_string(),
    }
}

/// Scripted [`RemoteSubmitter`].
///
/// Responses are consumed in call order; once the script runs out every
/// call gets the fallback (success unless changed).
#[derive(Default)]
pub struct MockSubmitter {
    script: Mutex<VecDeque<SubmitResult>>,
    fallback: Mutex<Option<SubmitFailure>>,
    calls: Mutex<Vec<Payload>>,
    delay: Mutex<Option<Duration>>,
    gate: Mutex<Option<Arc<Semaphore>>>,
    entered: Notify,
}

impl MockSubmitter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue responses for the next calls.
    pub fn push(&self, results: impl IntoIterator<Item = SubmitResult>) {
        self.script.lock().unwrap().extend(results);
    }

    /// Fail every unscripted call with `failure` (`None` = succeed).
    pub fn set_fallback(&self, failure: Option<SubmitFailure>) {
        *self.fallback.lock().unwrap() = failure;
    }

    /// Sleep this long before answering.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Block every call until a permit is added to the returned semaphore.
    pub fn hold(&self) -> Arc<Semaphore> {
        let gate = Arc::new(Semaphore::new(0));
        *self.gate.lock().unwrap() = Some(gate.clone());
        gate
    }

    /// Wait until some call has started.
    pub async fn wait_entered(&self) {
        self.entered.notified().await;
    }

    pub fn calls(&self) -> Vec<Payload> {
        self.calls.lock().unwrap().clone()
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Reporter names of submitted payloads, in call order.
    pub fn call_names(&self) -> Vec<String> {
        self.calls().iter().map(payload_name).collect()
    }

    async fn answer(&self, payload: &Payload) -> SubmitResult {
        self.calls.lock().unwrap().push(payload.clone());
        self.entered.notify_one();

        let gate = self.gate.lock().unwrap().clone();
        if let Some(gate) = gate {
            gate.acquire().await.unwrap().forget();
        }

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let scripted = self.script.lock().unwrap().pop_front();
        match scripted {
            Some(result) => result,
            None => match self.fallback.lock().unwrap().clone() {
                Some(failure) => Err(failure),
                None => Ok(()),
            },
        }
    }
}

impl RemoteSubmitter for MockSubmitter {
    fn submit<'a>(
        &'a self,
        payload: &'a Payload,
    ) -> Pin<Box<dyn Future<Output = SubmitResult> + Send + 'a>> {
        Box::pin(self.answer(payload))
    }
}

/// Collects every notification.
#[derive(Default)]
pub struct RecordingNotifier {
    seen: Mutex<Vec<Notification>>,
}

impl RecordingNotifier {
    pub fn all(&self) -> Vec<Notification> {
        self.seen.lock().unwrap().clone()
    }

    pub fn count_where(&self, f: impl Fn(&Notification) -> bool) -> usize {
        self.seen.lock().unwrap().iter().filter(|n| f(n)).count()
    }

    pub fn clear(&self) {
        self.seen.lock().unwrap().clear();
    }
}

impl Notifier for RecordingNotifier {
    fn notify(&self, notification: Notification) {
        self.seen.lock().unwrap().push(notification);
    }
}

/// A fully wired engine over in-memory collaborators.
pub struct TestEngine {
    pub kv: Arc<MemoryStore>,
    pub queue: Arc<PendingQueue>,
    pub monitor: Arc<SharedMonitor>,
    pub submitter: Arc<MockSubmitter>,
    pub notifier: Arc<RecordingNotifier>,
    pub clock: Arc<ManualClock>,
    pub coordinator: Arc<SyncCoordinator>,
    pub drafts: DraftStore,
}

impl TestEngine {
    pub async fn new(connected: bool) -> Self {
        Self::with_store(Arc::new(MemoryStore::new()), connected).await
    }

    /// Build over an existing store, as after a restart.
    pub async fn with_store(kv: Arc<MemoryStore>, connected: bool) -> Self {
        let queue = Arc::new(PendingQueue::open(QueueStore::new(kv.clone())).await);
        let monitor = Arc::new(SharedMonitor::new(connected));
        let submitter = Arc::new(MockSubmitter::new());
        let notifier = Arc::new(RecordingNotifier::default());
        let clock = Arc::new(ManualClock::new(base_time()));
        let parts = SyncParts {
            queue: queue.clone(),
            monitor: monitor.clone(),
            submitter: submitter.clone(),
            notifier: notifier.clone(),
            clock: clock.clone(),
        };
        let coordinator = Arc::new(SyncCoordinator::new(parts, SyncSettings::default()));
        TestEngine {
            drafts: DraftStore::new(kv.clone()),
            kv,
            queue,
            monitor,
            submitter,
            notifier,
            clock,
            coordinator,
        }
    }

    pub fn facade(&self) -> SubmissionFacade {
        SubmissionFacade::new(
            self.coordinator.parts().clone(),
            self.drafts.clone(),
            self.coordinator.settings().submit_timeout,
        )
    }

    /// Move the clock past the rate limit.
    pub fn pass_interval(&self) {
        let interval = self.coordinator.settings().min_interval;
        self.clock
            .advance(chrono::Duration::from_std(interval).unwrap() + chrono::Duration::seconds(1));
    }

    /// Queue `names` as separate reports, oldest first.
    pub async fn enqueue_reports(&self, names: &[&str]) -> Vec<RecordId> {
        let mut ids = Vec::new();
        for (i, name) in names.iter().enumerate() {
            let payload = Payload::IssueReport(make_report(name, i as i64));
            ids.push(self.queue.enqueue(payload, self.clock.now()).await);
            self.clock.advance(chrono::Duration::seconds(1));
        }
        ids
    }
}

/// Poll `check` until it holds or a second of (possibly paused) time passes.
pub async fn wait_until(check: impl Fn() -> bool) {
    for _ in 0..200 {
        if check() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(5)).await;
    }
    assert!(check(), "condition not met in time");
}
