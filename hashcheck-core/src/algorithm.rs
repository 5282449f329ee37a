use std::fmt;
use std::str::FromStr;

use blake2::{Blake2b512, Blake2s256, Digest};
use serde::{Deserialize, Serialize};
use sha2::{Sha256, Sha512};
use xxhash_rust::xxh3::Xxh3;

use crate::crc::{Crc32, CrcVariant};
use crate::error::UnknownAlgorithm;

/// Hash algorithms a manifest can be written in. The manifest's file
/// extension selects exactly one of these for the whole run.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum HashAlgorithm {
    #[serde(rename = "crc32")]
    Crc32,
    #[serde(rename = "crc32c")]
    Crc32c,
    #[serde(rename = "xxhash3")]
    Xxh3_64,
    #[serde(rename = "city128")]
    CityHash128,
    #[serde(rename = "sha256")]
    Sha256,
    #[serde(rename = "sha512")]
    Sha512,
    #[serde(rename = "blake2b")]
    Blake2b,
    #[serde(rename = "blake2s")]
    Blake2s,
}

/// How a [`Digester`] consumes its input.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigestMode {
    /// Constant memory; every chunk is folded into the running state.
    Streaming,
    /// The whole input is held in memory and hashed at `finalize`.
    FullBuffer,
}

impl HashAlgorithm {
    pub const ALL: [HashAlgorithm; 8] = [
        HashAlgorithm::Crc32,
        HashAlgorithm::Crc32c,
        HashAlgorithm::Xxh3_64,
        HashAlgorithm::CityHash128,
        HashAlgorithm::Sha256,
        HashAlgorithm::Sha512,
        HashAlgorithm::Blake2b,
        HashAlgorithm::Blake2s,
    ];

    /// Manifest file extension, without the leading dot.
    pub fn extension(self) -> &'static str {
        match self {
            HashAlgorithm::Crc32 => "crc32",
            HashAlgorithm::Crc32c => "crc32c",
            HashAlgorithm::Xxh3_64 => "xxhash3",
            HashAlgorithm::CityHash128 => "city128",
            HashAlgorithm::Sha256 => "sha256",
            HashAlgorithm::Sha512 => "sha512",
            HashAlgorithm::Blake2b => "blake2b",
            HashAlgorithm::Blake2s => "blake2s",
        }
    }

    /// Exact match against the extension table. A leading dot is accepted.
    pub fn from_extension(ext: &str) -> Option<Self> {
        let ext = ext.strip_prefix('.').unwrap_or(ext);
        Self::ALL.into_iter().find(|a| a.extension() == ext)
    }

    pub fn name(self) -> &'static str {
        match self {
            HashAlgorithm::Crc32 => "CRC32",
            HashAlgorithm::Crc32c => "CRC32C",
            HashAlgorithm::Xxh3_64 => "XXH3-64",
            HashAlgorithm::CityHash128 => "CityHash128",
            HashAlgorithm::Sha256 => "SHA-256",
            HashAlgorithm::Sha512 => "SHA-512",
            HashAlgorithm::Blake2b => "BLAKE2b-512",
            HashAlgorithm::Blake2s => "BLAKE2s-256",
        }
    }

    /// Width of the formatted digest in hex characters.
    pub fn digest_hex_len(self) -> usize {
        match self {
            HashAlgorithm::Crc32 | HashAlgorithm::Crc32c => 8,
            HashAlgorithm::Xxh3_64 => 16,
            HashAlgorithm::CityHash128 => 32,
            HashAlgorithm::Sha256 | HashAlgorithm::Blake2s => 64,
            HashAlgorithm::Sha512 | HashAlgorithm::Blake2b => 128,
        }
    }

    pub fn mode(self) -> DigestMode {
        match self {
            HashAlgorithm::CityHash128 => DigestMode::FullBuffer,
            _ => DigestMode::Streaming,
        }
    }
}

impl fmt::Display for HashAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for HashAlgorithm {
    type Err = UnknownAlgorithm;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.to_ascii_lowercase();
        if let Some(a) = Self::from_extension(&lower) {
            return Ok(a);
        }
        Self::ALL
            .into_iter()
            .find(|a| a.name().eq_ignore_ascii_case(s))
            .ok_or_else(|| UnknownAlgorithm(s.to_string()))
    }
}

enum State {
    Crc(Crc32),
    Xxh3(Box<Xxh3>),
    // CityHash128 has no incremental form: the full input is kept until
    // `finalize`, so memory grows with the file.
    City(Vec<u8>),
    Sha256(Sha256),
    Sha512(Sha512),
    Blake2b(Blake2b512),
    Blake2s(Blake2s256),
}

/// Running digest for one file. `new` / `update` / `finalize` is the only
/// dispatch site over [`HashAlgorithm`].
pub struct Digester {
    state: State,
}

impl Digester {
    pub fn new(algorithm: HashAlgorithm) -> Self {
        let state = match algorithm {
            HashAlgorithm::Crc32 => State::Crc(Crc32::new(CrcVariant::Ieee)),
            HashAlgorithm::Crc32c => State::Crc(Crc32::new(CrcVariant::Castagnoli)),
            HashAlgorithm::Xxh3_64 => State::Xxh3(Box::new(Xxh3::new())),
            HashAlgorithm::CityHash128 => State::City(Vec::new()),
            HashAlgorithm::Sha256 => State::Sha256(Sha256::new()),
            HashAlgorithm::Sha512 => State::Sha512(Sha512::new()),
            HashAlgorithm::Blake2b => State::Blake2b(Blake2b512::new()),
            HashAlgorithm::Blake2s => State::Blake2s(Blake2s256::new()),
        };
        Self { state }
    }

    /// Pre-size the full-input buffer. No-op for streaming algorithms.
    pub fn reserve(&mut self, additional: usize) {
        if let State::City(buf) = &mut self.state {
            buf.reserve(additional);
        }
    }

    /// Bytes held in memory awaiting `finalize` (always 0 when streaming).
    pub fn buffered_len(&self) -> usize {
        match &self.state {
            State::City(buf) => buf.len(),
            _ => 0,
        }
    }

    pub fn update(&mut self, chunk: &[u8]) {
        match &mut self.state {
            State::Crc(c) => c.update(chunk),
            State::Xxh3(h) => h.update(chunk),
            State::City(buf) => buf.extend_from_slice(chunk),
            State::Sha256(h) => h.update(chunk),
            State::Sha512(h) => h.update(chunk),
            State::Blake2b(h) => h.update(chunk),
            State::Blake2s(h) => h.update(chunk),
        }
    }

    /// Lowercase hex, zero-padded to [`HashAlgorithm::digest_hex_len`].
    pub fn finalize(self) -> String {
        match self.state {
            State::Crc(c) => format!("{:08x}", c.finalize()),
            State::Xxh3(h) => format!("{:016x}", h.digest()),
            State::City(buf) => format!("{:032x}", cityhash::city_hash_128(&buf)),
            State::Sha256(h) => hex::encode(h.finalize()),
            State::Sha512(h) => hex::encode(h.finalize()),
            State::Blake2b(h) => hex::encode(h.finalize()),
            State::Blake2s(h) => hex::encode(h.finalize()),
        }
    }
}

/// Hash a byte slice in one call.
pub fn digest_bytes(algorithm: HashAlgorithm, data: &[u8]) -> String {
    let mut d = Digester::new(algorithm);
    d.update(data);
    d.finalize()
}

/// Canonical comparison form: ASCII lowercase, one `0x` prefix removed,
/// leading zeros removed. An all-zero digest becomes `"0"`.
pub fn normalize_digest(digest: &str) -> String {
    let lower = digest.to_ascii_lowercase();
    let body = lower.strip_prefix("0x").unwrap_or(&lower);
    let trimmed = body.trim_start_matches('0');
    if trimmed.is_empty() {
        "0".to_string()
    } else {
        trimmed.to_string()
    }
}

pub fn digests_match(computed: &str, expected: &str) -> bool {
    normalize_digest(computed) == normalize_digest(expected)
}
