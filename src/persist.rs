//! Idempotent artifact persistence. Values are rendered to a canonical
//! JSON form (sorted keys, fixed indentation) and content-hashed; a
//! write happens only when the canonical form changed. Comparison goes
//! through read-and-reserialize, not raw bytes, so a hand-edited or
//! differently-formatted file does not trigger a spurious write.

use std::fs;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use sha2::{Digest, Sha256};

/// Deterministic rendering used for change detection and for the bytes
/// on disk. Going through `Value` sorts object keys.
pub fn canonical_json<T: Serialize>(value: &T) -> Result<String> {
    let v = serde_json::to_value(value).context("serialize artifact")?;
    let mut out = serde_json::to_string_pretty(&v).context("render artifact")?;
    out.push('\n');
    Ok(out)
}

fn content_hash(canonical: &str) -> [u8; 32] {
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    hasher.finalize().into()
}

/// Hash of the existing artifact, canonicalized. None when the file is
/// missing or unreadable as JSON (either way: write).
fn existing_hash(path: &Path) -> Option<[u8; 32]> {
    let raw = fs::read_to_string(path).ok()?;
    let value: Value = serde_json::from_str(&raw).ok()?;
    let canonical = canonical_json(&value).ok()?;
    Some(content_hash(&canonical))
}

/// Write `value` to `path` iff its canonical serialization differs from
/// what is on disk. Returns whether a write happened. The write is
/// all-or-nothing: temp file in the same directory, then rename.
pub fn write_if_changed<T: Serialize>(path: &Path, value: &T) -> Result<bool> {
    let canonical = canonical_json(value)?;
    if existing_hash(path) == Some(content_hash(&canonical)) {
        return Ok(false);
    }

    if let Some(dir) = path.parent() {
        fs::create_dir_all(dir)
            .with_context(|| format!("create artifact dir {}", dir.display()))?;
    }
    let tmp = path.with_extension("json.tmp");
    fs::write(&tmp, canonical).with_context(|| format!("write {}", tmp.display()))?;
    fs::rename(&tmp, path).with_context(|| format!("swap {}", path.display()))?;
    Ok(true)
}

/// Previous run's artifact, for fallback. Missing or unparsable files
/// are simply absent; fallback input is best-effort by design.
pub fn load_previous<T: DeserializeOwned>(path: &Path) -> Option<T> {
    let raw = fs::read_to_string(path).ok()?;
    serde_json::from_str(&raw).ok()
}
