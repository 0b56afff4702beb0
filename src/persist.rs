//! Disk helpers: pretty encoding, backup copies, and temp-file replacement.
//!
//! The rename-over approach is close to atomic on most platforms. On NTFS
//! (Windows) it's reliable; on FAT32 or network shares there are no hard
//! guarantees. If that matters to you, keep the backups around or use a real
//! database.

use crate::error::{Error, Result};
use serde::Serialize;
use serde_json::Value;
use std::path::Path;

/// Serializes `value` as pretty-printed JSON: four-space indentation, with
/// non-ASCII text written literally instead of `\u` escaped.
pub fn encode_pretty(value: &Value) -> Result<Vec<u8>> {
    let mut buf = Vec::with_capacity(128);
    let fmt = serde_json::ser::PrettyFormatter::with_indent(b"    ");
    let mut ser = serde_json::Serializer::with_formatter(&mut buf, fmt);
    value.serialize(&mut ser)?;
    Ok(buf)
}

/// Copies the file at `path` to `backup`, byte for byte, replacing any
/// previous backup. Returns `false` without touching anything if `path` does
/// not exist yet (nothing to preserve on the very first write).
pub async fn backup_existing(path: &Path, backup: &Path) -> Result<bool> {
    match tokio::fs::copy(path, backup).await {
        Ok(_) => Ok(true),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::Backup {
            path: backup.to_path_buf(),
            source: e,
        }),
    }
}

/// Writes `bytes` to `<path>.tmp` and then renames it over `path`. This
/// avoids leaving a half-written document behind if the process dies
/// mid-write.
pub async fn replace_file(path: &Path, bytes: &[u8]) -> Result<()> {
    let ext = path.extension().and_then(|e| e.to_str()).unwrap_or("json");
    let tmp = path.with_extension(format!("{ext}.tmp"));
    tokio::fs::write(&tmp, bytes).await.map_err(|e| Error::Write {
        path: tmp.clone(),
        source: e,
    })?;
    tokio::fs::rename(&tmp, path).await.map_err(|e| Error::Write {
        path: path.to_path_buf(),
        source: e,
    })?;
    Ok(())
}
