//! Streaming SHA-256 content fingerprints.

use std::fmt;
use std::fs::File;
use std::io::Read;
use std::path::Path;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::error::Result;

const CHUNK_SIZE: usize = 64 * 1024;

/// Hex-encoded SHA-256 digest of a file's byte content.
///
/// Used only for change detection, never for authentication.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Fingerprint(String);

impl Fingerprint {
    pub fn as_hex(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for Fingerprint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Hash a file's contents in fixed-size chunks.
///
/// The file is streamed, never loaded whole, so large datasets do not spike
/// memory. Fails when the file is missing or unreadable; callers treat a
/// failed hash as "assume changed".
pub fn hash_file(path: &Path) -> Result<Fingerprint> {
    let mut file = File::open(path)?;
    let mut hasher = Sha256::new();
    let mut buf = vec![0u8; CHUNK_SIZE];
    loop {
        let read = file.read(&mut buf)?;
        if read == 0 {
            break;
        }
        hasher.update(&buf[..read]);
    }
    Ok(Fingerprint(hex::encode(hasher.finalize())))
}

/// Hash an in-memory byte slice. Mostly useful in tests and fixtures.
pub fn hash_bytes(data: &[u8]) -> Fingerprint {
    let mut hasher = Sha256::new();
    hasher.update(data);
    Fingerprint(hex::encode(hasher.finalize()))
}
