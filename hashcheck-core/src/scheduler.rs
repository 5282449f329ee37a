use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Instant;

use tracing::{debug, info};

use crate::config::VerifyConfig;
use crate::error::{ManifestError, RunError};
use crate::manifest::Manifest;
use crate::progress::{Event, EventSink, Severity, Throttle};
use crate::report::{summarize, RunCounters, RunReport};
use crate::verify::{FileVerifier, VerificationOutcome};

/// Shared index into the manifest. Each `claim` hands out a distinct index.
#[derive(Debug, Default)]
pub struct WorkCursor(AtomicUsize);

impl WorkCursor {
    pub fn claim(&self) -> usize {
        self.0.fetch_add(1, Ordering::Relaxed)
    }
    /// Number of claims made since the last reset, including claims past the end.
    pub fn claimed(&self) -> usize {
        self.0.load(Ordering::Relaxed)
    }
    pub fn reset(&self) {
        self.0.store(0, Ordering::Relaxed);
    }
}

/// Cooperative stop request. Set by the operator, polled by workers.
#[derive(Debug, Default)]
pub struct CancellationFlag(AtomicBool);

impl CancellationFlag {
    pub fn set(&self) {
        self.0.store(true, Ordering::Release);
    }
    pub fn is_set(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
    pub fn clear(&self) {
        self.0.store(false, Ordering::Release);
    }
}

/// Mutable state of one run, injected into every worker.
#[derive(Debug, Default)]
pub struct RunState {
    pub cursor: WorkCursor,
    pub counters: RunCounters,
    pub processed: AtomicUsize,
    pub cancel: CancellationFlag,
    running: AtomicBool,
}

impl RunState {
    pub fn reset(&self) {
        self.cursor.reset();
        self.counters.reset();
        self.processed.store(0, Ordering::Relaxed);
        self.cancel.clear();
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::Acquire)
    }

    fn request_stop(&self) {
        if self.is_running() {
            info!("stop requested");
        }
        self.cancel.set();
    }
}

/// Stops the runs of one [`Verifier`] without holding on to its event sink,
/// so a channel receiver still sees the channel close when the run ends.
#[derive(Clone, Debug)]
pub struct StopHandle(Arc<RunState>);

impl StopHandle {
    pub fn request_stop(&self) {
        self.0.request_stop();
    }

    pub fn is_running(&self) -> bool {
        self.0.is_running()
    }
}

/// Clears the running flag when the run ends, however it ends.
struct RunningGuard(Arc<RunState>);

impl Drop for RunningGuard {
    fn drop(&mut self) {
        self.0.running.store(false, Ordering::Release);
    }
}

/// Pool size: detected parallelism capped at `max_workers`, or 2 when
/// parallelism cannot be detected.
pub fn worker_count(max_workers: usize) -> usize {
    let cap = max_workers.max(1);
    match thread::available_parallelism() {
        Ok(n) => n.get().min(cap),
        Err(_) => 2usize.min(cap),
    }
}

/// Handle on a run started with [`Verifier::start`].
pub struct RunHandle {
    inner: JoinHandle<Result<RunReport, RunError>>,
}

impl RunHandle {
    pub fn join(self) -> Result<RunReport, RunError> {
        self.inner.join().unwrap_or(Err(RunError::Aborted))
    }
}

/// Verification engine and its run-control surface.
///
/// One `Verifier` runs at most one verification at a time. Clones share the
/// same state and sink, so a clone can request a stop from another thread.
#[derive(Clone)]
pub struct Verifier {
    config: VerifyConfig,
    sink: Arc<dyn EventSink>,
    state: Arc<RunState>,
}

impl Verifier {
    pub fn new(config: VerifyConfig, sink: Arc<dyn EventSink>) -> Self {
        Self { config, sink, state: Arc::new(RunState::default()) }
    }

    pub fn state(&self) -> &RunState {
        &self.state
    }

    pub fn is_running(&self) -> bool {
        self.state.is_running()
    }

    /// Ask the current run to stop. In-flight files stop after their current chunk.
    pub fn request_stop(&self) {
        self.state.request_stop();
    }

    pub fn stop_handle(&self) -> StopHandle {
        StopHandle(Arc::clone(&self.state))
    }

    /// Discover the manifest in `dir` and verify it on a background thread.
    pub fn start(&self, dir: impl Into<PathBuf>) -> Result<RunHandle, RunError> {
        let dir = dir.into();
        self.spawn_run(move |v| v.discover_and_execute(&dir))
    }

    /// Verify the manifest at `path` on a background thread.
    pub fn start_manifest(&self, path: impl Into<PathBuf>) -> Result<RunHandle, RunError> {
        let path = path.into();
        self.spawn_run(move |v| v.load_and_execute(&path))
    }

    fn spawn_run<F>(&self, body: F) -> Result<RunHandle, RunError>
    where
        F: FnOnce(&Verifier) -> Result<RunReport, RunError> + Send + 'static,
    {
        let guard = self.begin()?;
        let this = self.clone();
        let inner = thread::Builder::new()
            .name("hashcheck-run".into())
            .spawn(move || {
                let _guard = guard;
                body(&this)
            })
            .map_err(RunError::Spawn)?;
        Ok(RunHandle { inner })
    }

    /// Blocking form of [`Verifier::start`].
    pub fn run_directory(&self, dir: &Path) -> Result<RunReport, RunError> {
        let _guard = self.begin()?;
        self.discover_and_execute(dir)
    }

    pub fn run_manifest_file(&self, path: &Path) -> Result<RunReport, RunError> {
        let _guard = self.begin()?;
        self.load_and_execute(path)
    }

    /// Verify an already loaded manifest.
    pub fn run(&self, manifest: &Manifest) -> Result<RunReport, RunError> {
        let _guard = self.begin()?;
        self.execute(manifest)
    }

    /// Take the running flag and reset the run state. Resetting here, on the
    /// caller's thread, means a stop requested right after `start` is not lost.
    fn begin(&self) -> Result<RunningGuard, RunError> {
        self.state
            .running
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .map_err(|_| RunError::AlreadyRunning)?;
        self.state.reset();
        Ok(RunningGuard(Arc::clone(&self.state)))
    }

    fn discover_and_execute(&self, dir: &Path) -> Result<RunReport, RunError> {
        let manifest = Manifest::discover(dir).map_err(|e| self.fail(e))?;
        self.execute(&manifest)
    }

    fn load_and_execute(&self, path: &Path) -> Result<RunReport, RunError> {
        let manifest = Manifest::load(path).map_err(|e| self.fail(e.into()))?;
        self.execute(&manifest)
    }

    fn fail(&self, err: RunError) -> RunError {
        self.sink.emit(Event::Error { message: err.to_string() });
        err
    }

    fn execute(&self, manifest: &Manifest) -> Result<RunReport, RunError> {
        let total = manifest.len();
        if manifest.is_empty() {
            let err = ManifestError::Empty { path: manifest.source.clone() };
            return Err(self.fail(err.into()));
        }
        self.sink.emit(Event::Log {
            text: format!("Manifest: {}", manifest.name()),
            severity: Severity::Info,
        });
        self.sink.emit(Event::GlobalProgress { processed: 0, total });

        let workers = worker_count(self.config.max_workers).min(total);
        info!(
            manifest = %manifest.source.display(),
            algorithm = %manifest.algorithm,
            files = total,
            workers,
            "verification started"
        );

        let started = Instant::now();
        let throttle = Throttle::new(self.config.progress_interval());
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(workers)
            .thread_name(|i| format!("hashcheck-worker-{i}"))
            .build()
            .map_err(|e| self.fail(e.into()))?;
        pool.scope(|s| {
            for id in 0..workers {
                let throttle = &throttle;
                s.spawn(move |_| self.worker(id, manifest, throttle));
            }
        });

        // a stop that lands after the last file was tallied does not cancel the run
        let counts = self.state.counters.snapshot();
        let canceled = self.state.cancel.is_set() && counts.total() < total;
        let report = summarize(counts, total, started.elapsed().as_secs_f64(), canceled);
        info!(
            ok = report.ok_count,
            corrupted = report.corrupted_count,
            missing = report.missing_count,
            canceled = report.was_canceled,
            secs = report.duration_seconds,
            "verification finished"
        );
        self.sink.emit(Event::Completed(report.clone()));
        Ok(report)
    }

    fn worker(&self, id: usize, manifest: &Manifest, throttle: &Throttle) {
        let state = &*self.state;
        let mut verifier =
            FileVerifier::new(&self.config, &state.counters, &state.cancel, throttle, &*self.sink);
        let total = manifest.len();
        while !state.cancel.is_set() {
            let index = state.cursor.claim();
            let Some(entry) = manifest.entries.get(index) else {
                break;
            };
            debug!(worker = id, index, path = %entry.path, "claimed");
            let result = verifier.verify(entry, &manifest.resolve(entry), manifest.algorithm);
            if result.outcome == VerificationOutcome::Canceled {
                break;
            }
            let processed = state.processed.fetch_add(1, Ordering::Relaxed) + 1;
            self.sink.emit(Event::GlobalProgress { processed, total });
        }
        debug!(worker = id, "worker exiting");
    }
}
