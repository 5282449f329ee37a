#![allow(dead_code)]

use std::path::{Path, PathBuf};
use std::sync::Mutex;

use hashcheck_core::algorithm::{digest_bytes, HashAlgorithm};
use hashcheck_core::progress::{Event, EventSink, ProgressSample, Severity};

/// Sink that keeps every event for later inspection.
#[derive(Default)]
pub struct Recorder {
    events: Mutex<Vec<Event>>,
}

impl EventSink for Recorder {
    fn emit(&self, event: Event) {
        self.events.lock().unwrap().push(event);
    }
}

impl Recorder {
    pub fn events(&self) -> Vec<Event> {
        self.events.lock().unwrap().clone()
    }

    pub fn logs(&self) -> Vec<(String, Severity)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Log { text, severity } => Some((text, severity)),
                _ => None,
            })
            .collect()
    }

    pub fn file_progress(&self, filename: &str) -> Vec<ProgressSample> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::FileProgress(p) if p.filename == filename => Some(p),
                _ => None,
            })
            .collect()
    }

    pub fn errors(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                Event::Error { message } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn completed(&self) -> usize {
        self.events().iter().filter(|e| matches!(e, Event::Completed(_))).count()
    }
}

pub fn random_bytes(len: usize, seed: u64) -> Vec<u8> {
    fastrand::seed(seed);
    (0..len).map(|_| fastrand::u8(..)).collect()
}

/// Write `name` under `dir` and return the digest line for it.
pub fn write_file(dir: &Path, name: &str, data: &[u8], algo: HashAlgorithm) -> String {
    std::fs::write(dir.join(name), data).unwrap();
    format!("{} *{}", digest_bytes(algo, data), name)
}

pub fn write_manifest(dir: &Path, algo: HashAlgorithm, lines: &[String]) -> PathBuf {
    let path = dir.join(format!("CRC.{}", algo.extension()));
    let mut text = String::from("; generated for tests\n");
    for l in lines {
        text.push_str(l);
        text.push('\n');
    }
    std::fs::write(&path, text).unwrap();
    path
}
