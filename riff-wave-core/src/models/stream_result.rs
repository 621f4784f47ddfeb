use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::error::WavError;
use super::format::{HeaderFormat, MappingFamily, SampleFormat, WavFormatDescriptor};

/// Why the finalizer left the header untouched.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SkipReason {
    /// Headerless output, there is nothing to patch.
    RawOutput,
    /// The payload cannot be described by a 32-bit size field; the placeholder
    /// sizes stay in place and readers treat the file as streaming.
    SizeOverflow { audio_bytes: i64 },
}

/// Result of patching the header size fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FinalizeOutcome {
    Patched,
    Skipped(SkipReason),
}

impl FinalizeOutcome {
    pub fn is_patched(&self) -> bool {
        matches!(self, Self::Patched)
    }

    /// Treat an oversized payload as an error instead of a silent skip.
    pub fn into_result(self) -> Result<(), WavError> {
        match self {
            Self::Skipped(SkipReason::SizeOverflow { audio_bytes }) => Err(WavError::SizeOverflow(audio_bytes)),
            _ => Ok(()),
        }
    }
}

/// Summary of a finished stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreamSummary {
    pub header_format: HeaderFormat,
    /// Payload bytes written after the header.
    pub audio_bytes: u64,
    /// Complete sample frames in the payload.
    pub frames: u64,
    pub outcome: FinalizeOutcome,
}

/// Result returned when a WAV file is closed successfully.
#[derive(Debug, Clone, PartialEq)]
pub struct WavFileResult {
    pub file_path: PathBuf,
    pub duration_secs: f64,
    pub summary: StreamSummary,
    pub checksum: String,
}

/// Layout and finalization facts about a finished WAV file, stored as a
/// JSON sidecar next to it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WavFileMetadata {
    pub file_path: String,
    pub checksum: String,
    pub sample_rate: u32,
    pub channels: u16,
    pub mapping_family: MappingFamily,
    pub sample_format: SampleFormat,
    pub header_format: HeaderFormat,
    /// Bytes before the first audio byte (0, 44 or 68).
    pub header_len: usize,
    /// Speaker mask from the extensible header, `None` for minimal and raw output.
    pub channel_mask: Option<u32>,
    pub block_align: u16,
    pub byte_rate: u32,
    pub audio_bytes: u64,
    pub frames: u64,
    pub duration_secs: f64,
    /// Whether the size fields were patched or still hold placeholders.
    pub size_fields: FinalizeOutcome,
}

impl WavFileMetadata {
    pub fn describe(result: &WavFileResult, descriptor: &WavFormatDescriptor) -> Self {
        let header_format = result.summary.header_format;
        Self {
            file_path: result.file_path.to_string_lossy().into_owned(),
            checksum: result.checksum.clone(),
            sample_rate: descriptor.sample_rate,
            channels: descriptor.channels,
            mapping_family: descriptor.mapping_family,
            sample_format: descriptor.sample_format,
            header_format,
            header_len: header_format.header_len(),
            channel_mask: (header_format == HeaderFormat::Extensible).then(|| descriptor.channel_mask()),
            block_align: descriptor.block_align(),
            byte_rate: descriptor.byte_rate(),
            audio_bytes: result.summary.audio_bytes,
            frames: result.summary.frames,
            duration_secs: result.duration_secs,
            size_fields: result.summary.outcome,
        }
    }

    /// Whether the header carries the real payload length.
    pub fn is_finalized(&self) -> bool {
        self.size_fields.is_patched()
    }

    /// Expected length of the file on disk.
    pub fn file_len(&self) -> u64 {
        self.header_len as u64 + self.audio_bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn overflow_becomes_error_on_request() {
        let outcome = FinalizeOutcome::Skipped(SkipReason::SizeOverflow { audio_bytes: 0x8000_0000 });
        assert!(!outcome.is_patched());
        assert_eq!(outcome.into_result(), Err(WavError::SizeOverflow(0x8000_0000)));
    }

    #[test]
    fn raw_skip_is_not_an_error() {
        let outcome = FinalizeOutcome::Skipped(SkipReason::RawOutput);
        assert!(outcome.into_result().is_ok());
        assert!(FinalizeOutcome::Patched.into_result().is_ok());
    }

    fn surround_result(outcome: FinalizeOutcome) -> WavFileResult {
        WavFileResult {
            file_path: PathBuf::from("/tmp/out.wav"),
            duration_secs: 1.5,
            summary: StreamSummary {
                header_format: HeaderFormat::Extensible,
                audio_bytes: 864_000,
                frames: 72_000,
                outcome,
            },
            checksum: "abc".into(),
        }
    }

    #[test]
    fn metadata_describes_extensible_layout() {
        let descriptor = WavFormatDescriptor::new(48000, 6, MappingFamily::SEMANTIC, SampleFormat::Int16);
        let metadata = WavFileMetadata::describe(&surround_result(FinalizeOutcome::Patched), &descriptor);

        assert_eq!(metadata.file_path, "/tmp/out.wav");
        assert_eq!(metadata.header_len, 68);
        assert_eq!(metadata.channel_mask, Some(0x3f));
        assert_eq!(metadata.block_align, 12);
        assert_eq!(metadata.byte_rate, 576_000);
        assert_eq!(metadata.file_len(), 68 + 864_000);
        assert!(metadata.is_finalized());

        let json = serde_json::to_string(&metadata).unwrap();
        assert!(json.contains("\"header_format\":\"extensible\""));
        assert!(json.contains("\"mapping_family\":1"));
        assert!(json.contains("\"size_fields\":\"patched\""));
    }

    #[test]
    fn metadata_records_placeholder_sizes() {
        let descriptor = WavFormatDescriptor::new(48000, 6, MappingFamily::SEMANTIC, SampleFormat::Int16);
        let outcome = FinalizeOutcome::Skipped(SkipReason::SizeOverflow { audio_bytes: 0x8000_0000 });
        let metadata = WavFileMetadata::describe(&surround_result(outcome), &descriptor);
        assert!(!metadata.is_finalized());

        let json = serde_json::to_string(&metadata).unwrap();
        let parsed: WavFileMetadata = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed.size_fields, outcome);
    }

    #[test]
    fn minimal_header_has_no_channel_mask() {
        let descriptor = WavFormatDescriptor::new(44100, 2, MappingFamily::UNMAPPED, SampleFormat::Int16);
        let mut result = surround_result(FinalizeOutcome::Patched);
        result.summary.header_format = HeaderFormat::Minimal;
        let metadata = WavFileMetadata::describe(&result, &descriptor);
        assert_eq!(metadata.channel_mask, None);
        assert_eq!(metadata.header_len, 44);
    }
}
