use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use serde::Serialize;
use tracing::{debug, warn};

use crate::algorithm::HashAlgorithm;
use crate::error::{ManifestError, RunError};

/// Manifest file names probed by [`Manifest::discover`], in priority order.
pub const CANDIDATES: [&str; 8] = [
    "CRC.crc32",
    "CRC.crc32c",
    "CRC.xxhash3",
    "CRC.city128",
    "CRC.sha256",
    "CRC.sha512",
    "CRC.blake2b",
    "CRC.blake2s",
];

#[derive(Serialize, Clone, Debug, PartialEq, Eq)]
pub struct ManifestEntry {
    /// As written in the manifest; resolved against the manifest's directory
    /// only when the file is verified.
    pub path: String,
    pub expected_digest: String,
}

#[derive(Clone, Debug)]
pub struct Manifest {
    pub source: PathBuf,
    pub algorithm: HashAlgorithm,
    pub entries: Vec<ManifestEntry>,
}

/// Parse one manifest line: `<digest><ws>[*]<path>`.
///
/// Returns `None` for blank lines, `;` comments and lines without a path.
pub fn parse_line(line: &str) -> Option<ManifestEntry> {
    if line.trim().is_empty() || line.starts_with(';') {
        return None;
    }
    let rest = line.trim_start();
    let split = rest.find(char::is_whitespace)?;
    let (digest, tail) = rest.split_at(split);
    let path = tail.trim_start_matches(|c: char| c.is_whitespace() || c == '*');
    if path.is_empty() {
        return None;
    }
    Some(ManifestEntry { path: path.to_string(), expected_digest: digest.to_string() })
}

/// Parse manifest text into entries, in file order.
pub fn parse(text: &str) -> Vec<ManifestEntry> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut entries = Vec::new();
    for (lineno, line) in text.lines().enumerate() {
        match parse_line(line) {
            Some(e) => entries.push(e),
            None => {
                if !line.trim().is_empty() && !line.starts_with(';') {
                    warn!(line = lineno + 1, "skipping manifest line without a path");
                }
            }
        }
    }
    entries
}

impl Manifest {
    /// Read and parse a manifest. The algorithm comes from the file extension.
    pub fn load(path: &Path) -> Result<Self, ManifestError> {
        let mut f = fs::File::open(path)
            .map_err(|source| ManifestError::NotFound { path: path.to_path_buf(), source })?;
        let algorithm = path
            .extension()
            .and_then(|e| e.to_str())
            .and_then(HashAlgorithm::from_extension)
            .ok_or_else(|| ManifestError::UnsupportedFormat { path: path.to_path_buf() })?;

        let mut raw = Vec::new();
        f.read_to_end(&mut raw)
            .map_err(|source| ManifestError::Read { path: path.to_path_buf(), source })?;
        let text = match String::from_utf8(raw) {
            Ok(s) => s,
            Err(e) => {
                warn!(manifest = %path.display(), "manifest is not valid UTF-8; decoding lossily");
                String::from_utf8_lossy(e.as_bytes()).into_owned()
            }
        };

        let entries = parse(&text);
        if entries.is_empty() {
            return Err(ManifestError::Empty { path: path.to_path_buf() });
        }
        debug!(manifest = %path.display(), %algorithm, entries = entries.len(), "manifest loaded");
        Ok(Self { source: path.to_path_buf(), algorithm, entries })
    }

    /// Load the first of [`CANDIDATES`] present in `dir`.
    ///
    /// A candidate that exists but cannot be read is skipped. A candidate that
    /// parses to no entries ends the search with [`ManifestError::Empty`].
    pub fn discover(dir: &Path) -> Result<Self, RunError> {
        for name in CANDIDATES {
            let path = dir.join(name);
            if !path.is_file() {
                continue;
            }
            match Self::load(&path) {
                Ok(m) => return Ok(m),
                Err(e @ ManifestError::Empty { .. }) => return Err(e.into()),
                Err(e) => warn!(manifest = %path.display(), error = %e, "skipping manifest"),
            }
        }
        Err(RunError::NoManifest { dir: dir.to_path_buf() })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// File name of the manifest, for display.
    pub fn name(&self) -> String {
        self.source
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.source.display().to_string())
    }

    pub fn base_dir(&self) -> &Path {
        self.source.parent().unwrap_or(Path::new(""))
    }

    /// Location of `entry` on disk. Absolute entry paths are used as-is.
    pub fn resolve(&self, entry: &ManifestEntry) -> PathBuf {
        self.base_dir().join(&entry.path)
    }
}
