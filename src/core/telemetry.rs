//! Bounded-window telemetry aggregation.
//!
//! A poll task samples the daemon on a fixed interval and feeds a
//! fixed-capacity window of recent samples for the dashboard chart. The
//! window is a faithful buffer: no smoothing, no range rejection, strictly
//! arrival order.

use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::core::models::MetricsSample;
use crate::host::HostApi;

/// Samples kept for charting (30 ticks at the default 1 s poll interval).
pub const WINDOW_CAPACITY: usize = 30;

/// Fixed-capacity, insertion-ordered buffer of recent samples.
///
/// Appending at capacity evicts the oldest entry, so `len() <= capacity`
/// holds structurally. Samples are kept in arrival order; an out-of-order
/// `timestamp_ms` is stored as-is, never resorted.
#[derive(Debug, Clone)]
pub struct TelemetryWindow {
    samples: VecDeque<MetricsSample>,
    capacity: usize,
}

impl TelemetryWindow {
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append a sample, evicting the oldest once at capacity.
    pub fn push(&mut self, sample: MetricsSample) {
        if self.samples.len() == self.capacity {
            self.samples.pop_front();
        }
        self.samples.push_back(sample);
    }

    /// Most recent sample, if any tick has succeeded yet.
    pub fn current(&self) -> Option<&MetricsSample> {
        self.samples.back()
    }

    pub fn iter(&self) -> impl Iterator<Item = &MetricsSample> {
        self.samples.iter()
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Renderable view of the window at one instant.
#[derive(Debug, Clone, Default)]
pub struct TelemetrySnapshot {
    pub current: Option<MetricsSample>,
    pub series: Vec<MetricsSample>,
}

/// Owns the poll task and the window it feeds.
///
/// One aggregator per dashboard mount: [`start`](Self::start) on mount,
/// [`stop`](Self::stop) on unmount. Dropping the aggregator cancels the
/// task as well.
pub struct TelemetryAggregator {
    window: Arc<RwLock<TelemetryWindow>>,
    cancel: CancellationToken,
    task: Option<JoinHandle<()>>,
}

impl TelemetryAggregator {
    pub fn new() -> Self {
        Self::with_capacity(WINDOW_CAPACITY)
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            window: Arc::new(RwLock::new(TelemetryWindow::new(capacity))),
            cancel: CancellationToken::new(),
            task: None,
        }
    }

    /// Begin periodic sampling. No-op if already started.
    ///
    /// Ticks are serialized: the timer handler awaits the daemon call
    /// inline, so a slow response delays the next tick instead of
    /// overlapping it and appends stay in arrival order.
    pub fn start(&mut self, host: Arc<dyn HostApi>, interval: Duration) {
        if self.task.is_some() {
            return;
        }
        let window = Arc::clone(&self.window);
        let cancel = self.cancel.clone();
        self.task = Some(tokio::spawn(poll_loop(host, window, cancel, interval)));
    }

    /// Cancel future ticks.
    ///
    /// Safe to call repeatedly and when never started. A daemon call
    /// already in flight when the token fires has its result discarded,
    /// never applied to the window.
    pub fn stop(&mut self) {
        self.cancel.cancel();
        self.task.take();
    }

    /// Current visible state for rendering. `current` is absent until the
    /// first successful tick.
    pub async fn snapshot(&self) -> TelemetrySnapshot {
        let window = self.window.read().await;
        TelemetrySnapshot {
            current: window.current().copied(),
            series: window.iter().copied().collect(),
        }
    }
}

impl Default for TelemetryAggregator {
    fn default() -> Self {
        Self::new()
    }
}

impl Drop for TelemetryAggregator {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

async fn poll_loop(
    host: Arc<dyn HostApi>,
    window: Arc<RwLock<TelemetryWindow>>,
    cancel: CancellationToken,
    interval: Duration,
) {
    let mut ticker = tokio::time::interval(interval);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
    let mut failures = FailureGate::default();

    loop {
        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = ticker.tick() => {}
        }

        let sample = tokio::select! {
            _ = cancel.cancelled() => break,
            result = host.system_metrics() => match result {
                Ok(sample) => sample,
                Err(e) => {
                    // Failed tick: skip, leave window and current untouched.
                    if failures.should_log() {
                        warn!(error = %e, "metrics poll tick failed, skipping");
                    }
                    continue;
                }
            },
        };

        failures.reset();
        window.write().await.push(sample);
    }

    debug!("telemetry poll loop stopped");
}

/// Gates repeated tick-failure logs: a down daemon warns on the first
/// failure and every tenth consecutive one after that, not on every tick.
#[derive(Default)]
struct FailureGate {
    consecutive: u32,
}

impl FailureGate {
    const REPEAT_EVERY: u32 = 10;

    fn should_log(&mut self) -> bool {
        self.consecutive = self.consecutive.saturating_add(1);
        self.consecutive == 1 || self.consecutive % Self::REPEAT_EVERY == 0
    }

    fn reset(&mut self) {
        self.consecutive = 0;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{ConnectorDescriptor, JobDraft, JobId};
    use crate::host::ClientError;
    use async_trait::async_trait;
    use std::sync::atomic::{AtomicI64, Ordering};

    fn sample(ts: i64) -> MetricsSample {
        MetricsSample {
            cpu_usage: 10.0,
            memory_usage: 20.0,
            disk_usage: 30.0,
            timestamp_ms: ts,
        }
    }

    /// Host whose samples carry an incrementing timestamp, failing every
    /// call past `fail_after` when set.
    #[derive(Default)]
    struct TickHost {
        ticks: AtomicI64,
        fail_after: Option<i64>,
    }

    #[async_trait]
    impl HostApi for TickHost {
        async fn system_metrics(&self) -> Result<MetricsSample, ClientError> {
            let tick = self.ticks.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail_after.is_some_and(|n| tick > n) {
                return Err(ClientError::Connect(std::io::Error::other("down")));
            }
            Ok(sample(tick))
        }

        async fn available_connectors(&self) -> Result<Vec<ConnectorDescriptor>, ClientError> {
            unimplemented!("not used by telemetry tests")
        }

        async fn create_sync_job(&self, _draft: &JobDraft) -> Result<JobId, ClientError> {
            unimplemented!("not used by telemetry tests")
        }
    }

    async fn snapshot_when<F>(aggregator: &TelemetryAggregator, pred: F) -> TelemetrySnapshot
    where
        F: Fn(&TelemetrySnapshot) -> bool,
    {
        for _ in 0..500 {
            let snapshot = aggregator.snapshot().await;
            if pred(&snapshot) {
                return snapshot;
            }
            tokio::time::sleep(Duration::from_millis(2)).await;
        }
        panic!("condition not reached within timeout");
    }

    #[test]
    fn test_window_evicts_oldest_at_capacity() {
        let mut window = TelemetryWindow::new(30);
        for ts in 1..=35 {
            window.push(sample(ts));
        }

        assert_eq!(window.len(), 30);
        let timestamps: Vec<i64> = window.iter().map(|s| s.timestamp_ms).collect();
        let expected: Vec<i64> = (6..=35).collect();
        assert_eq!(timestamps, expected);
        assert_eq!(window.current().unwrap().timestamp_ms, 35);
    }

    #[test]
    fn test_window_keeps_arrival_order_not_timestamp_order() {
        let mut window = TelemetryWindow::new(30);
        window.push(sample(5));
        window.push(sample(3));
        window.push(sample(9));

        let timestamps: Vec<i64> = window.iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(timestamps, vec![5, 3, 9]);
        assert_eq!(window.current().unwrap().timestamp_ms, 9);
    }

    #[test]
    fn test_empty_window_has_no_current() {
        let window = TelemetryWindow::new(30);
        assert!(window.is_empty());
        assert!(window.current().is_none());
    }

    #[tokio::test]
    async fn test_aggregator_fills_and_bounds_the_series() {
        let mut aggregator = TelemetryAggregator::new();
        aggregator.start(Arc::new(TickHost::default()), Duration::from_millis(1));

        let snapshot =
            snapshot_when(&aggregator, |s| {
                s.current.is_some_and(|c| c.timestamp_ms >= 35)
            })
            .await;
        aggregator.stop();

        assert_eq!(snapshot.series.len(), 30);
        let timestamps: Vec<i64> = snapshot.series.iter().map(|s| s.timestamp_ms).collect();
        let last = *timestamps.last().unwrap();
        let expected: Vec<i64> = (last - 29..=last).collect();
        assert_eq!(timestamps, expected);
        assert_eq!(snapshot.current.unwrap().timestamp_ms, last);
    }

    #[tokio::test]
    async fn test_failed_ticks_leave_snapshot_unchanged() {
        let host = Arc::new(TickHost {
            fail_after: Some(3),
            ..Default::default()
        });
        let mut aggregator = TelemetryAggregator::new();
        aggregator.start(Arc::clone(&host) as Arc<dyn HostApi>, Duration::from_millis(1));

        let before = snapshot_when(&aggregator, |s| s.series.len() == 3).await;
        // Plenty of failing ticks elapse here.
        tokio::time::sleep(Duration::from_millis(30)).await;
        let after = aggregator.snapshot().await;
        aggregator.stop();

        assert_eq!(after.series.len(), 3);
        let before_ts: Vec<i64> = before.series.iter().map(|s| s.timestamp_ms).collect();
        let after_ts: Vec<i64> = after.series.iter().map(|s| s.timestamp_ms).collect();
        assert_eq!(before_ts, after_ts);
        assert_eq!(after.current.unwrap().timestamp_ms, 3);
    }

    #[tokio::test]
    async fn test_stop_halts_appends() {
        let host = Arc::new(TickHost::default());
        let mut aggregator = TelemetryAggregator::new();
        aggregator.start(Arc::clone(&host) as Arc<dyn HostApi>, Duration::from_millis(1));

        snapshot_when(&aggregator, |s| !s.series.is_empty()).await;
        aggregator.stop();
        let stopped = aggregator.snapshot().await;

        tokio::time::sleep(Duration::from_millis(30)).await;
        let later = aggregator.snapshot().await;

        assert_eq!(stopped.series.len(), later.series.len());
        assert_eq!(
            stopped.current.map(|s| s.timestamp_ms),
            later.current.map(|s| s.timestamp_ms)
        );
    }

    #[tokio::test]
    async fn test_stop_is_safe_without_start_and_repeatedly() {
        let mut aggregator = TelemetryAggregator::new();
        aggregator.stop();
        aggregator.stop();

        let mut started = TelemetryAggregator::new();
        started.start(Arc::new(TickHost::default()), Duration::from_millis(1));
        started.stop();
        started.stop();
    }

    #[tokio::test]
    async fn test_snapshot_before_first_tick_is_empty() {
        let aggregator = TelemetryAggregator::new();
        let snapshot = aggregator.snapshot().await;

        assert!(snapshot.current.is_none());
        assert!(snapshot.series.is_empty());
    }

    #[test]
    fn test_failure_gate_logs_first_then_every_tenth() {
        let mut gate = FailureGate::default();
        let logged: Vec<bool> = (0..21).map(|_| gate.should_log()).collect();

        let expected: Vec<bool> = (1..=21)
            .map(|n| n == 1 || n % FailureGate::REPEAT_EVERY == 0)
            .collect();
        assert_eq!(logged, expected);

        gate.reset();
        assert!(gate.should_log());
    }
}
