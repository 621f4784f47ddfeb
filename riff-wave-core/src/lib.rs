//! # riff-wave-core
//!
//! RIFF/WAVE header codec for streaming encoders that only learn the payload
//! length at the end of the stream.
//!
//! Provides WAV channel reordering for Opus/Vorbis surround layouts,
//! placeholder header emission (minimal or `WAVEFORMATEXTENSIBLE`), and
//! seek-back finalization of the RIFF and data size fields.
//!
//! ## Architecture
//!
//! ```text
//! riff-wave-core (this crate)
//! ├── models/       ← WavError, WavOutputConfig, HeaderFormat, WavFormatDescriptor, FinalizeOutcome
//! ├── processing/   ← channel map adjustment, sample encoding, WAV header emit/finalize
//! └── storage/      ← WavStreamWriter, WavFileWriter, metadata sidecar + verification
//! ```
//!
//! ## Usage
//! ```
//! use std::io::{Cursor, Write};
//! use riff_wave_core::{emit_header, finalize_header, MappingFamily, SampleFormat, WavFormatDescriptor};
//!
//! let descriptor = WavFormatDescriptor::new(48000, 2, MappingFamily::UNMAPPED, SampleFormat::Int16);
//! let mut sink = Cursor::new(Vec::new());
//! let format = emit_header(&mut sink, &descriptor).unwrap();
//! sink.write_all(&[0u8; 1000]).unwrap();
//! assert!(finalize_header(&mut sink, format, 1000).unwrap().is_patched());
//! ```

pub mod models;
pub mod processing;
pub mod storage;

// Re-export key types at crate root for convenience.
pub use models::config::WavOutputConfig;
pub use models::error::WavError;
pub use models::format::{HeaderFormat, MappingFamily, SampleFormat, WavFormatDescriptor};
pub use models::stream_result::{FinalizeOutcome, SkipReason, StreamSummary, WavFileMetadata, WavFileResult};
pub use processing::channel_map::{adjust_wav_mapping, wav_channel_order};
pub use processing::sample_encoder::FrameEncoder;
pub use processing::wav_format::{emit_header, finalize_header, generate_wav_header, PLACEHOLDER_SIZE};
pub use storage::metadata::{read_metadata, sidecar_path, verify_metadata, write_metadata};
pub use storage::wav_writer::{WavFileWriter, WavStreamWriter};
