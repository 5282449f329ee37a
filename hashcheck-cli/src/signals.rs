//! Ctrl-C / SIGTERM handling for a running verification.

use anyhow::{Context, Result};
use std::io;
use std::thread;
use tracing::warn;

use hashcheck_core::StopHandle;

/// Route the first interrupt to `stop`; a second one aborts the process.
/// The handlers are registered before this returns.
pub fn install(stop: StopHandle) -> Result<()> {
    let rt = tokio::runtime::Builder::new_current_thread()
        .enable_io()
        .build()
        .context("failed to build signal runtime")?;
    let signals = {
        let _enter = rt.enter();
        Signals::new().context("failed to install signal handler")?
    };
    thread::Builder::new()
        .name("hashcheck-signal".into())
        .spawn(move || rt.block_on(watch(signals, stop)))
        .context("failed to spawn signal thread")?;
    Ok(())
}

async fn watch(mut signals: Signals, stop: StopHandle) {
    let name = signals.recv().await;
    warn!("{name} received, stopping after the current chunks (again to abort)");
    stop.request_stop();
    signals.recv().await;
    std::process::exit(130);
}

#[cfg(unix)]
struct Signals {
    interrupt: tokio::signal::unix::Signal,
    terminate: tokio::signal::unix::Signal,
}

#[cfg(unix)]
impl Signals {
    fn new() -> io::Result<Self> {
        use tokio::signal::unix::{signal, SignalKind};
        Ok(Self {
            interrupt: signal(SignalKind::interrupt())?,
            terminate: signal(SignalKind::terminate())?,
        })
    }

    async fn recv(&mut self) -> &'static str {
        tokio::select! {
            _ = self.interrupt.recv() => "interrupt",
            _ = self.terminate.recv() => "terminate",
        }
    }
}

#[cfg(not(unix))]
struct Signals;

#[cfg(not(unix))]
impl Signals {
    fn new() -> io::Result<Self> {
        Ok(Self)
    }

    async fn recv(&mut self) -> &'static str {
        match tokio::signal::ctrl_c().await {
            Ok(()) => "ctrl-c",
            Err(_) => std::future::pending().await,
        }
    }
}
