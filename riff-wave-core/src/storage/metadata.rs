//! JSON sidecar describing a finished WAV file.
//!
//! The sidecar sits next to the audio as `{name}.metadata.json` and records
//! the header layout, the payload length and whether the header sizes were
//! patched. [`verify_metadata`] checks a sidecar against the file on disk.

use std::fs;
use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};

use crate::models::error::WavError;
use crate::models::stream_result::WavFileMetadata;

/// Sidecar location for a WAV file: `out.wav` → `out.metadata.json`.
pub fn sidecar_path(wav_path: &Path) -> PathBuf {
    wav_path.with_extension("metadata.json")
}

/// Write the sidecar and return its path.
pub fn write_metadata(metadata: &WavFileMetadata, wav_path: &Path) -> Result<PathBuf, WavError> {
    let path = sidecar_path(wav_path);
    let json = serde_json::to_string_pretty(metadata)
        .map_err(|e| WavError::StorageError(format!("failed to serialize metadata: {}", e)))?;
    fs::write(&path, json).map_err(|e| WavError::StorageError(format!("failed to write metadata: {}", e)))?;
    log::debug!("wrote WAV metadata sidecar {}", path.display());
    Ok(path)
}

pub fn read_metadata(wav_path: &Path) -> Result<WavFileMetadata, WavError> {
    let json = fs::read_to_string(sidecar_path(wav_path))
        .map_err(|e| WavError::StorageError(format!("failed to read metadata: {}", e)))?;
    serde_json::from_str(&json).map_err(|e| WavError::StorageError(format!("failed to parse metadata: {}", e)))
}

/// Check that `wav_path` still matches its sidecar: header plus payload
/// length, and SHA-256 checksum.
pub fn verify_metadata(metadata: &WavFileMetadata, wav_path: &Path) -> Result<(), WavError> {
    let actual_len = fs::metadata(wav_path)
        .map_err(|e| WavError::StorageError(format!("failed to stat WAV file: {}", e)))?
        .len();
    if actual_len != metadata.file_len() {
        return Err(WavError::StorageError(format!(
            "WAV file is {} bytes, metadata expects {} ({} header + {} audio)",
            actual_len,
            metadata.file_len(),
            metadata.header_len,
            metadata.audio_bytes
        )));
    }

    let checksum = file_checksum(wav_path)?;
    if checksum != metadata.checksum {
        return Err(WavError::StorageError(format!(
            "checksum mismatch: file {}, metadata {}",
            checksum, metadata.checksum
        )));
    }
    Ok(())
}

/// SHA-256 hex digest of a file.
pub(crate) fn file_checksum(path: &Path) -> Result<String, WavError> {
    let data =
        fs::read(path).map_err(|e| WavError::StorageError(format!("failed to read file for checksum: {}", e)))?;
    let digest = Sha256::digest(&data);
    Ok(hex_encode(&digest))
}

fn hex_encode(bytes: &[u8]) -> String {
    bytes.iter().map(|b| format!("{:02x}", b)).collect()
}
