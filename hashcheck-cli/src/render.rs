//! Terminal rendering of the engine's event stream.

use indicatif::{MultiProgress, ProgressBar, ProgressDrawTarget, ProgressStyle};
use tracing::debug;

use hashcheck_core::{Event, ProgressSample, Severity};

pub struct Renderer {
    quiet: bool,
    multi: MultiProgress,
    overall: ProgressBar,
    file: ProgressBar,
}

fn style(template: &str) -> ProgressStyle {
    ProgressStyle::with_template(template)
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("##-")
}

impl Renderer {
    /// Quiet renderers draw no bars and only print the lines of files that
    /// failed or went missing, to stderr.
    pub fn new(quiet: bool) -> Self {
        let multi = if quiet {
            MultiProgress::with_draw_target(ProgressDrawTarget::hidden())
        } else {
            MultiProgress::with_draw_target(ProgressDrawTarget::stderr())
        };
        let overall = multi.add(ProgressBar::new(0));
        overall.set_style(style("{prefix:>8} [{bar:40.cyan/blue}] {pos}/{len} files {elapsed}"));
        overall.set_prefix("total");
        let file = multi.add(ProgressBar::new(100));
        file.set_style(style("{prefix:>8} [{bar:40.green/white}] {pos:>3}% {msg}"));
        file.set_prefix("file");
        Self { quiet, multi, overall, file }
    }

    pub fn handle(&mut self, event: Event) {
        match event {
            Event::FileProgress(sample) => self.file_progress(&sample),
            Event::GlobalProgress { processed, total } => {
                self.overall.set_length(total as u64);
                self.overall.set_position(processed as u64);
            }
            Event::Log { text, severity } => self.log(&text, severity),
            Event::Completed(report) => {
                debug!(files = report.total_files, "run completed");
            }
            // printed by main from the run result
            Event::Error { message } => debug!(%message, "run failed"),
        }
    }

    fn file_progress(&self, sample: &ProgressSample) {
        self.file.set_position(u64::from(sample.percentage));
        self.file.set_message(format!("{} ({:.2} MB/s)", sample.filename, sample.throughput_mbps));
    }

    fn log(&self, text: &str, severity: Severity) {
        if self.quiet {
            if matches!(severity, Severity::Error | Severity::Warning) {
                eprintln!("{text}");
            }
            return;
        }
        // suspend so lines land above the bars instead of through them
        self.multi.suspend(|| println!("{text}"));
    }

    pub fn finish(&self) {
        self.file.finish_and_clear();
        self.overall.finish_and_clear();
    }
}
