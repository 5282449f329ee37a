use std::collections::VecDeque;
use std::sync::Mutex;
use std::time::{Duration, Instant};

use serde::Serialize;

use crate::report::RunReport;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Severity {
    Info,
    Success,
    Warning,
    Error,
}

/// Point-in-time progress of one file; each sample supersedes the previous.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct ProgressSample {
    pub filename: String,
    /// 0..=100
    pub percentage: u8,
    pub throughput_mbps: f64,
}

/// Everything the engine tells its observer.
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Event {
    FileProgress(ProgressSample),
    GlobalProgress { processed: usize, total: usize },
    Log { text: String, severity: Severity },
    Completed(RunReport),
    Error { message: String },
}

/// One-way, non-blocking event consumer.
///
/// `emit` is called from worker threads and must not block them. Events from
/// one worker arrive in the order that worker emitted them.
pub trait EventSink: Send + Sync {
    fn emit(&self, event: Event);
}

/// Unbounded channel: `send` never blocks. Events sent after the receiver is
/// gone are dropped.
impl EventSink for crossbeam_channel::Sender<Event> {
    fn emit(&self, event: Event) {
        let _ = self.send(event);
    }
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullSink;

impl EventSink for NullSink {
    fn emit(&self, _event: Event) {}
}

/// Rate limiter shared by all workers of a run: at most one `true` per
/// interval, across threads.
#[derive(Debug)]
pub struct Throttle {
    interval: Duration,
    last: Mutex<Option<Instant>>,
}

impl Throttle {
    pub fn new(interval: Duration) -> Self {
        Self { interval, last: Mutex::new(None) }
    }

    pub fn ready(&self) -> bool {
        let now = Instant::now();
        let mut last = self.last.lock().unwrap_or_else(|e| e.into_inner());
        match *last {
            Some(t) if now.duration_since(t) < self.interval => false,
            _ => {
                *last = Some(now);
                true
            }
        }
    }
}

/// Sliding window of recent reads for an instantaneous throughput figure.
#[derive(Debug)]
pub struct SpeedWindow {
    samples: VecDeque<(Instant, u64)>,
    capacity: usize,
}

impl SpeedWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(2);
        Self { samples: VecDeque::with_capacity(capacity + 1), capacity }
    }

    pub fn record(&mut self, bytes: u64) {
        self.record_at(Instant::now(), bytes);
    }

    pub fn record_at(&mut self, at: Instant, bytes: u64) {
        self.samples.push_back((at, bytes));
        if self.samples.len() > self.capacity {
            self.samples.pop_front();
        }
    }

    /// MiB/s over the window. The oldest sample only marks the start time.
    pub fn mbps(&self) -> f64 {
        let (Some(first), Some(last)) = (self.samples.front(), self.samples.back()) else {
            return 0.0;
        };
        let secs = last.0.duration_since(first.0).as_secs_f64();
        if self.samples.len() < 2 || secs <= 0.0 {
            return 0.0;
        }
        let bytes: u64 = self.samples.iter().skip(1).map(|(_, b)| *b).sum();
        bytes as f64 / (1024.0 * 1024.0) / secs
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn speed_needs_two_samples() {
        let mut w = SpeedWindow::new(5);
        assert_eq!(w.mbps(), 0.0);
        w.record_at(Instant::now(), 1 << 20);
        assert_eq!(w.mbps(), 0.0);
    }

    #[test]
    fn speed_over_window() {
        let t0 = Instant::now();
        let mut w = SpeedWindow::new(3);
        w.record_at(t0, 999 << 20);
        w.record_at(t0 + Duration::from_secs(1), 2 << 20);
        w.record_at(t0 + Duration::from_secs(2), 2 << 20);
        assert!((w.mbps() - 2.0).abs() < 1e-9);
        // window slides: first sample drops out, (t0+1s) becomes the start
        w.record_at(t0 + Duration::from_secs(3), 4 << 20);
        assert!((w.mbps() - 3.0).abs() < 1e-9);
    }

    #[test]
    fn throttle_zero_interval_always_ready() {
        let t = Throttle::new(Duration::ZERO);
        assert!(t.ready());
        assert!(t.ready());
    }

    #[test]
    fn throttle_blocks_within_interval() {
        let t = Throttle::new(Duration::from_secs(3600));
        assert!(t.ready());
        assert!(!t.ready());
    }
}
