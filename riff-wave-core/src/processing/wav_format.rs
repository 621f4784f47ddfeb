//! RIFF/WAVE header emission and finalization.
//!
//! A stream is written in two phases: [`emit_header`] writes a header whose
//! size fields hold [`PLACEHOLDER_SIZE`], the caller streams audio, then
//! [`finalize_header`] seeks back and patches the RIFF and data sizes.
//!
//! Layout (all integers little-endian):
//! ```text
//! [0-3]    "RIFF"
//! [4-7]    RIFF chunk size (placeholder, patched)
//! [8-11]   "WAVE"
//! [12-15]  "fmt "
//! [16-19]  format chunk size (16 or 40)
//! [20-21]  format code (1, 3 or 0xfffe)
//! [22-23]  channels
//! [24-27]  sample_rate
//! [28-31]  byte_rate = bytes_per_sample * channels * sample_rate
//! [32-33]  block_align = bytes_per_sample * channels
//! [34-35]  bits_per_sample
//! extensible only:
//! [36-37]  cbSize (22)
//! [38-39]  valid bits per sample
//! [40-43]  channel mask
//! [44-59]  sub-format GUID
//! then:
//! [36|60]  "data"
//! [40|64]  data size (placeholder, patched)
//! ```

use std::io::{Seek, SeekFrom, Write};

use crate::models::error::WavError;
use crate::models::format::{HeaderFormat, WavFormatDescriptor, WAVE_FORMAT_EXTENSIBLE};
use crate::models::stream_result::{FinalizeOutcome, SkipReason};

/// Size written before the real length is known. Also the exclusive upper
/// bound for payloads the finalizer will record.
pub const PLACEHOLDER_SIZE: u32 = 0x7fff_ffff;

/// Bytes of `WAVEFORMATEXTENSIBLE` that follow the basic format fields.
const EXTENSIBLE_CB_SIZE: u16 = 22;

/// Build the placeholder header for `descriptor` in memory.
///
/// Returns 44 bytes for the minimal form and 68 for the extensible form.
pub fn generate_wav_header(descriptor: &WavFormatDescriptor) -> Vec<u8> {
    let format = descriptor.header_format();
    let sample_format = descriptor.sample_format;
    let bits_per_sample = sample_format.bits_per_sample();

    let mut header = Vec::with_capacity(format.header_len());

    // RIFF chunk descriptor
    header.extend_from_slice(b"RIFF");
    header.extend_from_slice(&PLACEHOLDER_SIZE.to_le_bytes());
    header.extend_from_slice(b"WAVE");

    // fmt sub-chunk
    header.extend_from_slice(b"fmt ");
    header.extend_from_slice(&format.chunk_size().to_le_bytes());
    let format_code = match format {
        HeaderFormat::Extensible => WAVE_FORMAT_EXTENSIBLE,
        _ => sample_format.format_code(),
    };
    header.extend_from_slice(&format_code.to_le_bytes());
    header.extend_from_slice(&descriptor.channels.to_le_bytes());
    header.extend_from_slice(&descriptor.sample_rate.to_le_bytes());
    header.extend_from_slice(&descriptor.byte_rate().to_le_bytes());
    header.extend_from_slice(&descriptor.block_align().to_le_bytes());
    header.extend_from_slice(&bits_per_sample.to_le_bytes());

    if format == HeaderFormat::Extensible {
        header.extend_from_slice(&EXTENSIBLE_CB_SIZE.to_le_bytes());
        header.extend_from_slice(&bits_per_sample.to_le_bytes()); // valid bits
        header.extend_from_slice(&descriptor.channel_mask().to_le_bytes());
        header.extend_from_slice(sample_format.sub_format_guid());
    }

    // data sub-chunk
    header.extend_from_slice(b"data");
    header.extend_from_slice(&PLACEHOLDER_SIZE.to_le_bytes());

    header
}

/// Write the placeholder header to `sink`.
///
/// Returns the header format, which must be passed to [`finalize_header`]
/// once the payload length is known. A failed write may leave part of the
/// header in the sink.
pub fn emit_header<W: Write>(sink: &mut W, descriptor: &WavFormatDescriptor) -> Result<HeaderFormat, WavError> {
    let format = descriptor.header_format();
    let header = generate_wav_header(descriptor);

    sink.write_all(&header)
        .map_err(|e| WavError::WriteFailed(format!("failed to write WAV header: {}", e)))?;

    log::debug!(
        "wrote {:?} WAV header: {} Hz, {} channels, {:?}",
        format,
        descriptor.sample_rate,
        descriptor.channels,
        descriptor.sample_format
    );
    Ok(format)
}

/// Check whether a payload length can be recorded in the header.
fn finalize_skip_reason(format: HeaderFormat, audio_bytes: i64) -> Option<SkipReason> {
    if format == HeaderFormat::Raw {
        return Some(SkipReason::RawOutput);
    }
    if !(0..PLACEHOLDER_SIZE as i64).contains(&audio_bytes) {
        return Some(SkipReason::SizeOverflow { audio_bytes });
    }
    None
}

fn log_skip(reason: SkipReason) {
    match reason {
        SkipReason::RawOutput => log::debug!("raw output, no WAV header to finalize"),
        SkipReason::SizeOverflow { audio_bytes } => log::warn!(
            "audio payload of {} bytes exceeds the WAV size limit, leaving placeholder sizes",
            audio_bytes
        ),
    }
}

/// Patch the RIFF and data size fields of a header previously written by
/// [`emit_header`].
///
/// Seeks to offset 4, writes the RIFF size, then seeks forward past the
/// format chunk and `"data"` tag to write the data size. The sink position is
/// left just after the data size field. Raw output and payloads of
/// [`PLACEHOLDER_SIZE`] bytes or more are skipped without touching the sink.
pub fn finalize_header<W: Write + Seek>(
    sink: &mut W,
    format: HeaderFormat,
    audio_bytes: i64,
) -> Result<FinalizeOutcome, WavError> {
    if let Some(reason) = finalize_skip_reason(format, audio_bytes) {
        log_skip(reason);
        return Ok(FinalizeOutcome::Skipped(reason));
    }

    let chunk_size = format.chunk_size();
    let data_size = audio_bytes as u32;
    let riff_size = data_size + 20 + chunk_size;

    sink.seek(SeekFrom::Start(4))
        .map_err(|e| WavError::SeekFailed(e.to_string()))?;
    sink.write_all(&riff_size.to_le_bytes())
        .map_err(|e| WavError::WriteFailed(e.to_string()))?;

    sink.seek(SeekFrom::Current(16 + chunk_size as i64))
        .map_err(|e| WavError::SeekFailed(e.to_string()))?;
    sink.write_all(&data_size.to_le_bytes())
        .map_err(|e| WavError::WriteFailed(e.to_string()))?;

    log::debug!("finalized WAV header: riff size {}, data size {}", riff_size, data_size);
    Ok(FinalizeOutcome::Patched)
}

/// Patch the size fields of a header held in memory.
///
/// Same rules as [`finalize_header`], for callers that buffer the whole file.
pub fn patch_header_sizes(
    header: &mut [u8],
    format: HeaderFormat,
    audio_bytes: i64,
) -> Result<FinalizeOutcome, WavError> {
    if let Some(reason) = finalize_skip_reason(format, audio_bytes) {
        log_skip(reason);
        return Ok(FinalizeOutcome::Skipped(reason));
    }
    if header.len() < format.header_len() {
        return Err(WavError::StorageError(format!(
            "header buffer is {} bytes, expected at least {}",
            header.len(),
            format.header_len()
        )));
    }

    let data_size = audio_bytes as u32;
    let riff_size = data_size + 20 + format.chunk_size();
    let data_size_offset = format.header_len() - 4;

    header[4..8].copy_from_slice(&riff_size.to_le_bytes());
    header[data_size_offset..data_size_offset + 4].copy_from_slice(&data_size.to_le_bytes());
    Ok(FinalizeOutcome::Patched)
}
