use std::fs::{self, File};
use std::io::{BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::models::config::WavOutputConfig;
use crate::models::error::WavError;
use crate::models::format::{HeaderFormat, WavFormatDescriptor};
use crate::models::stream_result::{FinalizeOutcome, StreamSummary, WavFileMetadata, WavFileResult};
use crate::processing::sample_encoder::FrameEncoder;
use crate::processing::wav_format;
use crate::storage::metadata;

/// Streaming WAV writer over any seekable sink.
///
/// Owns the sink for the lifetime of one stream: [`open`](Self::open) emits
/// the placeholder header, writes append payload, [`finish`](Self::finish)
/// patches the header sizes.
///
/// ## File Format
///
/// ```text
/// [44- or 68-byte WAV header, or nothing in raw mode]
/// [interleaved little-endian samples in WAV channel order...]
/// ```
pub struct WavStreamWriter<W: Write + Seek> {
    sink: W,
    config: WavOutputConfig,
    encoder: FrameEncoder,
    header_format: Option<HeaderFormat>,
    audio_bytes: u64,
    finished: bool,
    /// Set when a payload write or finalization fails. The sink contents are
    /// unknown afterwards, so no further writes or finalization are allowed.
    failed: bool,
}

impl<W: Write + Seek> WavStreamWriter<W> {
    pub fn new(sink: W, config: WavOutputConfig) -> Result<Self, WavError> {
        config.validate().map_err(WavError::InvalidConfiguration)?;
        let encoder = FrameEncoder::new(&config.descriptor());
        Ok(Self {
            sink,
            config,
            encoder,
            header_format: None,
            audio_bytes: 0,
            finished: false,
            failed: false,
        })
    }

    /// Write the placeholder header (nothing in raw mode).
    pub fn open(&mut self) -> Result<HeaderFormat, WavError> {
        if self.finished || self.failed {
            return Err(WavError::StorageError("stream is already finished".into()));
        }
        if let Some(format) = self.header_format {
            return Ok(format);
        }

        let format = if self.config.raw {
            HeaderFormat::Raw
        } else {
            wav_format::emit_header(&mut self.sink, &self.config.descriptor())?
        };
        self.header_format = Some(format);
        Ok(format)
    }

    /// Write interleaved samples in decoder channel order.
    ///
    /// `samples.len()` must be a multiple of the channel count.
    pub fn write_samples(&mut self, samples: &[f32]) -> Result<(), WavError> {
        if samples.len() % self.encoder.channels() != 0 {
            return Err(WavError::StorageError(format!(
                "{} samples do not fill whole {}-channel frames",
                samples.len(),
                self.encoder.channels()
            )));
        }
        let data = self.encoder.encode(samples);
        self.write_bytes(&data)
    }

    /// Write payload bytes that are already encoded and in WAV channel order.
    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), WavError> {
        if !self.is_open() {
            return Err(WavError::StorageError("stream is not open for writing".into()));
        }

        if let Err(e) = self.sink.write_all(data) {
            // part of `data` may already be in the sink
            self.failed = true;
            log::error!("Failed to write audio data: {}", e);
            return Err(WavError::WriteFailed(format!("write failed: {}", e)));
        }
        self.audio_bytes += data.len() as u64;
        Ok(())
    }

    /// Patch the header with the final payload length and flush.
    ///
    /// The sink is left positioned at its end. After a failed payload write
    /// the header is not touched and its placeholder sizes remain.
    ///
    /// The stream is closed whether or not finalization succeeds.
    pub fn finish(&mut self) -> Result<StreamSummary, WavError> {
        if self.failed {
            return Err(WavError::StorageError(
                "stream failed, header left with placeholder sizes".into(),
            ));
        }
        let format = match self.header_format {
            Some(format) if !self.finished => format,
            _ => return Err(WavError::StorageError("stream is not open".into())),
        };
        self.finished = true;

        let outcome = match self.finalize(format) {
            Ok(outcome) => outcome,
            Err(e) => {
                self.failed = true;
                log::error!("Failed to finalize WAV header: {}", e);
                return Err(e);
            }
        };

        Ok(StreamSummary {
            header_format: format,
            audio_bytes: self.audio_bytes,
            frames: self.frames_written(),
            outcome,
        })
    }

    pub fn is_open(&self) -> bool {
        self.header_format.is_some() && !self.finished && !self.failed
    }

    /// Whether a write or finalization error left the sink in an unknown state.
    pub fn has_failed(&self) -> bool {
        self.failed
    }

    fn finalize(&mut self, format: HeaderFormat) -> Result<FinalizeOutcome, WavError> {
        let audio_bytes = i64::try_from(self.audio_bytes).unwrap_or(i64::MAX);
        let outcome = wav_format::finalize_header(&mut self.sink, format, audio_bytes)?;
        if outcome == FinalizeOutcome::Patched {
            self.sink
                .seek(SeekFrom::End(0))
                .map_err(|e| WavError::SeekFailed(e.to_string()))?;
        }
        self.sink
            .flush()
            .map_err(|e| WavError::WriteFailed(e.to_string()))?;
        Ok(outcome)
    }

    /// Payload bytes written so far, excluding the header.
    pub fn audio_bytes(&self) -> u64 {
        self.audio_bytes
    }

    pub fn frames_written(&self) -> u64 {
        match self.config.descriptor().block_align() {
            0 => 0,
            block_align => self.audio_bytes / block_align as u64,
        }
    }

    pub fn header_format(&self) -> Option<HeaderFormat> {
        self.header_format
    }

    pub fn config(&self) -> &WavOutputConfig {
        &self.config
    }

    pub fn get_ref(&self) -> &W {
        &self.sink
    }

    pub fn into_inner(self) -> W {
        self.sink
    }
}

/// File-backed WAV writer that reports a SHA-256 checksum on close.
pub struct WavFileWriter {
    file_path: PathBuf,
    stream: Option<WavStreamWriter<BufWriter<File>>>,
}

impl WavFileWriter {
    /// Create the file (and parent directories) and write the header.
    pub fn create(file_path: PathBuf, config: WavOutputConfig) -> Result<Self, WavError> {
        config.validate().map_err(WavError::InvalidConfiguration)?;

        if let Some(parent) = file_path.parent() {
            fs::create_dir_all(parent)
                .map_err(|e| WavError::StorageError(format!("failed to create directory: {}", e)))?;
        }

        let file = File::create(&file_path)
            .map_err(|e| WavError::StorageError(format!("failed to create file: {}", e)))?;

        let mut stream = WavStreamWriter::new(BufWriter::new(file), config)?;
        stream.open()?;

        Ok(Self {
            file_path,
            stream: Some(stream),
        })
    }

    pub fn write_samples(&mut self, samples: &[f32]) -> Result<(), WavError> {
        self.stream_mut()?.write_samples(samples)
    }

    pub fn write_bytes(&mut self, data: &[u8]) -> Result<(), WavError> {
        self.stream_mut()?.write_bytes(data)
    }

    /// Finalize the header, close the file and checksum it.
    pub fn close(&mut self) -> Result<WavFileResult, WavError> {
        let mut stream = self
            .stream
            .take()
            .ok_or_else(|| WavError::StorageError("file is not open".into()))?;

        let summary = stream.finish()?;
        let sample_rate = stream.config().sample_rate;
        drop(stream);

        let checksum = metadata::file_checksum(&self.file_path)?;
        Ok(WavFileResult {
            file_path: self.file_path.clone(),
            duration_secs: summary.frames as f64 / sample_rate as f64,
            summary,
            checksum,
        })
    }

    /// Close the file and write its `.metadata.json` sidecar next to it.
    pub fn close_with_metadata(&mut self) -> Result<(WavFileResult, WavFileMetadata), WavError> {
        let descriptor = self.descriptor()?;
        let result = self.close()?;
        let file_metadata = WavFileMetadata::describe(&result, &descriptor);
        metadata::write_metadata(&file_metadata, &self.file_path)?;
        Ok((result, file_metadata))
    }

    /// Payload bytes written so far, excluding the header.
    pub fn audio_bytes(&self) -> u64 {
        self.stream.as_ref().map_or(0, |s| s.audio_bytes())
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    fn descriptor(&self) -> Result<WavFormatDescriptor, WavError> {
        self.stream
            .as_ref()
            .map(|s| s.config().descriptor())
            .ok_or_else(|| WavError::StorageError("file is not open".into()))
    }

    fn stream_mut(&mut self) -> Result<&mut WavStreamWriter<BufWriter<File>>, WavError> {
        self.stream
            .as_mut()
            .ok_or_else(|| WavError::StorageError("file is not open".into()))
    }
}
