use std::fs::File;
use std::io::{ErrorKind, Read};
use std::path::Path;

use serde::Serialize;
use tracing::{debug, warn};

use crate::algorithm::{digests_match, Digester, DigestMode, HashAlgorithm};
use crate::config::VerifyConfig;
use crate::manifest::ManifestEntry;
use crate::progress::{Event, EventSink, ProgressSample, Severity, SpeedWindow, Throttle};
use crate::report::{format_size, RunCounters};
use crate::scheduler::CancellationFlag;

/// Terminal classification of one manifest entry.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum VerificationOutcome {
    Ok,
    Corrupted,
    Missing,
    SizeError,
    OpenError,
    Canceled,
    UnsupportedAlgorithm,
}

impl VerificationOutcome {
    /// Counted on the corrupted counter.
    pub fn is_corruption_class(self) -> bool {
        matches!(
            self,
            VerificationOutcome::Corrupted
                | VerificationOutcome::SizeError
                | VerificationOutcome::OpenError
                | VerificationOutcome::UnsupportedAlgorithm
        )
    }

    fn status(self) -> &'static str {
        match self {
            VerificationOutcome::Ok => "OK",
            VerificationOutcome::Corrupted => "CORRUPTED",
            VerificationOutcome::Missing => "MISSING",
            VerificationOutcome::Canceled => "CANCELED",
            VerificationOutcome::SizeError
            | VerificationOutcome::OpenError
            | VerificationOutcome::UnsupportedAlgorithm => "ERROR",
        }
    }

    fn prefix(self) -> &'static str {
        match self {
            VerificationOutcome::Ok => "[OK]",
            VerificationOutcome::Missing => "[?]",
            VerificationOutcome::Canceled => "[STOP]",
            _ => "[ERR]",
        }
    }

    pub fn severity(self) -> Severity {
        match self {
            VerificationOutcome::Ok => Severity::Success,
            VerificationOutcome::Missing | VerificationOutcome::Canceled => Severity::Warning,
            _ => Severity::Error,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
pub struct FileVerification {
    pub outcome: VerificationOutcome,
    pub size: u64,
}

/// `Log` line for one finished entry, e.g. `[OK] a/b.bin (1.50 MB) - OK`.
pub fn log_line(entry: &ManifestEntry, result: &FileVerification) -> String {
    format!(
        "{} {} ({}) - {}",
        result.outcome.prefix(),
        entry.path,
        format_size(result.size),
        result.outcome.status()
    )
}

fn percentage(done: u64, total: u64) -> u8 {
    if total == 0 {
        return 0;
    }
    (done.saturating_mul(100) / total).min(100) as u8
}

/// Verifies one file at a time for a single worker. Owns that worker's read
/// buffer; everything else is borrowed from the run.
pub struct FileVerifier<'a> {
    config: &'a VerifyConfig,
    counters: &'a RunCounters,
    cancel: &'a CancellationFlag,
    throttle: &'a Throttle,
    sink: &'a dyn EventSink,
    buf: Vec<u8>,
}

impl<'a> FileVerifier<'a> {
    pub fn new(
        config: &'a VerifyConfig,
        counters: &'a RunCounters,
        cancel: &'a CancellationFlag,
        throttle: &'a Throttle,
        sink: &'a dyn EventSink,
    ) -> Self {
        Self { config, counters, cancel, throttle, sink, buf: vec![0u8; config.chunk_size.max(1)] }
    }

    /// Verify `entry`, read from `path`, against its expected digest.
    ///
    /// Bumps exactly one counter unless the outcome is `Canceled`, and emits
    /// one `Log` event in every case.
    pub fn verify(
        &mut self,
        entry: &ManifestEntry,
        path: &Path,
        algorithm: HashAlgorithm,
    ) -> FileVerification {
        let filename = Path::new(&entry.path)
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| entry.path.clone());
        self.progress(&filename, 0, 0.0);

        let result = self.check(entry, path, algorithm, &filename);
        match result.outcome {
            VerificationOutcome::Ok => self.counters.inc_ok(),
            VerificationOutcome::Missing => self.counters.inc_missing(),
            outcome if outcome.is_corruption_class() => self.counters.inc_corrupted(),
            _ => {}
        }
        debug!(path = %entry.path, outcome = ?result.outcome, size = result.size, "verified");
        self.sink.emit(Event::Log {
            text: log_line(entry, &result),
            severity: result.outcome.severity(),
        });
        result
    }

    fn check(
        &mut self,
        entry: &ManifestEntry,
        path: &Path,
        algorithm: HashAlgorithm,
        filename: &str,
    ) -> FileVerification {
        let done = |outcome, size| FileVerification { outcome, size };

        match path.try_exists() {
            Ok(true) => {}
            Ok(false) => return done(VerificationOutcome::Missing, 0),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot stat file");
                return done(VerificationOutcome::SizeError, 0);
            }
        }
        let size = match path.metadata() {
            Ok(m) if m.is_file() => m.len(),
            Ok(_) => return done(VerificationOutcome::SizeError, 0),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot read file size");
                return done(VerificationOutcome::SizeError, 0);
            }
        };
        let mut file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                warn!(path = %path.display(), error = %e, "cannot open file");
                return done(VerificationOutcome::OpenError, size);
            }
        };

        let mut digester = Digester::new(algorithm);
        if algorithm.mode() == DigestMode::FullBuffer {
            if let Some(limit) = self.config.full_buffer_limit {
                if size > limit {
                    warn!(
                        path = %path.display(),
                        size,
                        limit,
                        "{} cannot stream; file exceeds full_buffer_limit",
                        algorithm
                    );
                    return done(VerificationOutcome::UnsupportedAlgorithm, size);
                }
            }
            digester.reserve(usize::try_from(size).unwrap_or(0));
        }

        let mut read_total = 0u64;
        let mut speed = SpeedWindow::new(self.config.speed_samples);
        loop {
            let n = match file.read(&mut self.buf) {
                Ok(0) => break,
                Ok(n) => n,
                Err(e) if e.kind() == ErrorKind::Interrupted => continue,
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "read failed");
                    return done(VerificationOutcome::OpenError, size);
                }
            };
            digester.update(&self.buf[..n]);
            read_total += n as u64;
            speed.record(n as u64);
            if self.throttle.ready() {
                self.progress(filename, percentage(read_total, size), speed.mbps());
            }
            if self.cancel.is_set() {
                return done(VerificationOutcome::Canceled, size);
            }
        }

        let computed = digester.finalize();
        let outcome = if digests_match(&computed, &entry.expected_digest) {
            VerificationOutcome::Ok
        } else {
            debug!(
                path = %entry.path,
                %computed,
                expected = %entry.expected_digest,
                "digest mismatch"
            );
            VerificationOutcome::Corrupted
        };
        self.progress(filename, 100, speed.mbps());
        done(outcome, size)
    }

    fn progress(&self, filename: &str, percentage: u8, throughput_mbps: f64) {
        self.sink.emit(Event::FileProgress(ProgressSample {
            filename: filename.to_string(),
            percentage,
            throughput_mbps,
        }));
    }
}
