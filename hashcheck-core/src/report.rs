use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

use serde::Serialize;

/// Per-outcome tallies for one run. Independent atomics; no ordering between them.
#[derive(Debug, Default)]
pub struct RunCounters {
    ok: AtomicUsize,
    corrupted: AtomicUsize,
    missing: AtomicUsize,
}

impl RunCounters {
    pub fn inc_ok(&self) {
        self.ok.fetch_add(1, Ordering::Relaxed);
    }
    pub fn inc_corrupted(&self) {
        self.corrupted.fetch_add(1, Ordering::Relaxed);
    }
    pub fn inc_missing(&self) {
        self.missing.fetch_add(1, Ordering::Relaxed);
    }
    pub fn reset(&self) {
        self.ok.store(0, Ordering::Relaxed);
        self.corrupted.store(0, Ordering::Relaxed);
        self.missing.store(0, Ordering::Relaxed);
    }
    pub fn snapshot(&self) -> CounterSnapshot {
        CounterSnapshot {
            ok: self.ok.load(Ordering::Relaxed),
            corrupted: self.corrupted.load(Ordering::Relaxed),
            missing: self.missing.load(Ordering::Relaxed),
        }
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize)]
pub struct CounterSnapshot {
    pub ok: usize,
    pub corrupted: usize,
    pub missing: usize,
}

impl CounterSnapshot {
    pub fn total(&self) -> usize {
        self.ok + self.corrupted + self.missing
    }
}

/// Share of `total_files` per counter, in percent.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct Breakdown {
    pub ok: f64,
    pub corrupted: f64,
    pub missing: f64,
}

#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct RunReport {
    pub total_files: usize,
    pub ok_count: usize,
    pub corrupted_count: usize,
    pub missing_count: usize,
    pub duration_seconds: f64,
    pub was_canceled: bool,
    pub percentages: Breakdown,
}

fn percent(count: usize, total: usize) -> f64 {
    if total == 0 {
        0.0
    } else {
        count as f64 / total as f64 * 100.0
    }
}

/// Build the final report. Pure; `total_files == 0` yields 0% everywhere.
pub fn summarize(
    counters: CounterSnapshot,
    total_files: usize,
    duration_seconds: f64,
    was_canceled: bool,
) -> RunReport {
    RunReport {
        total_files,
        ok_count: counters.ok,
        corrupted_count: counters.corrupted,
        missing_count: counters.missing,
        duration_seconds,
        was_canceled,
        percentages: Breakdown {
            ok: percent(counters.ok, total_files),
            corrupted: percent(counters.corrupted, total_files),
            missing: percent(counters.missing, total_files),
        },
    }
}

impl RunReport {
    /// Files that reached a counted outcome.
    pub fn tallied(&self) -> usize {
        self.ok_count + self.corrupted_count + self.missing_count
    }

    /// Completed, and every file matched.
    pub fn all_ok(&self) -> bool {
        !self.was_canceled && self.ok_count == self.total_files
    }
}

impl fmt::Display for RunReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.was_canceled {
            writeln!(f, "Canceled by user.")?;
            return writeln!(
                f,
                "  {} of {} files checked before stopping ({:.2} s)",
                self.tallied(),
                self.total_files,
                self.duration_seconds
            );
        }
        writeln!(f, "--- FINAL REPORT ---")?;
        writeln!(f, "Files: {}", self.total_files)?;
        writeln!(f, "  [OK] Valid: {} ({:.2}%)", self.ok_count, self.percentages.ok)?;
        writeln!(
            f,
            "  [ERR] Corrupted: {} ({:.2}%)",
            self.corrupted_count, self.percentages.corrupted
        )?;
        writeln!(f, "  [?] Missing: {} ({:.2}%)", self.missing_count, self.percentages.missing)?;
        writeln!(f, "Completed ({:.2} s)", self.duration_seconds)
    }
}

/// Human-readable size with binary units, two decimals.
pub fn format_size(bytes: u64) -> String {
    const UNITS: [&str; 4] = ["B", "KB", "MB", "GB"];
    let mut size = bytes as f64;
    let mut i = 0;
    while size >= 1024.0 && i < UNITS.len() - 1 {
        size /= 1024.0;
        i += 1;
    }
    format!("{:.2} {}", size, UNITS[i])
}
