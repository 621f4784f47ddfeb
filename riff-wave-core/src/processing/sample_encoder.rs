use crate::models::format::{SampleFormat, WavFormatDescriptor};
use crate::processing::channel_map::wav_channel_order;

/// Converts decoder-order interleaved f32 frames into WAV payload bytes.
///
/// Frames are reordered into WAV channel order first, then encoded as
/// 16-bit PCM or 32-bit float, little-endian.
#[derive(Debug, Clone)]
pub struct FrameEncoder {
    channels: usize,
    order: Vec<usize>,
    sample_format: SampleFormat,
}

impl FrameEncoder {
    pub fn new(descriptor: &WavFormatDescriptor) -> Self {
        let channels = descriptor.channels as usize;
        Self {
            channels,
            order: wav_channel_order(descriptor.mapping_family, channels),
            sample_format: descriptor.sample_format,
        }
    }

    pub fn channels(&self) -> usize {
        self.channels
    }

    /// Output slot → decoder channel.
    pub fn channel_order(&self) -> &[usize] {
        &self.order
    }

    pub fn is_identity(&self) -> bool {
        self.order.iter().enumerate().all(|(slot, &ch)| slot == ch)
    }

    /// Encode whole frames. Trailing samples that do not fill a frame are dropped.
    pub fn encode(&self, samples: &[f32]) -> Vec<u8> {
        if self.is_identity() {
            let whole = samples.len() - samples.len() % self.channels.max(1);
            return encode_samples(&samples[..whole], self.sample_format);
        }
        let reordered = reorder_interleaved(samples, self.channels, &self.order);
        encode_samples(&reordered, self.sample_format)
    }
}

/// Apply `order` (output slot → source channel) to every interleaved frame.
pub fn reorder_interleaved(samples: &[f32], channels: usize, order: &[usize]) -> Vec<f32> {
    if channels == 0 {
        return Vec::new();
    }
    let frame_count = samples.len() / channels;
    let mut output = Vec::with_capacity(frame_count * channels);
    for frame in samples.chunks_exact(channels) {
        output.extend(order.iter().map(|&ch| frame[ch]));
    }
    output
}

/// Convert f32 samples `[-1.0, 1.0]` to 16-bit PCM (little-endian bytes).
///
/// Clamps out-of-range values. Output length = `samples.len() * 2` bytes.
pub fn convert_to_int16_pcm(samples: &[f32]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 2);
    for &sample in samples {
        let clamped = sample.clamp(-1.0, 1.0);
        let int16_value = (clamped * i16::MAX as f32) as i16;
        data.extend_from_slice(&int16_value.to_le_bytes());
    }
    data
}

/// Store f32 samples as little-endian IEEE float bytes, unclamped.
pub fn convert_to_float32_le(samples: &[f32]) -> Vec<u8> {
    let mut data = Vec::with_capacity(samples.len() * 4);
    for &sample in samples {
        data.extend_from_slice(&sample.to_le_bytes());
    }
    data
}

pub fn encode_samples(samples: &[f32], sample_format: SampleFormat) -> Vec<u8> {
    match sample_format {
        SampleFormat::Int16 => convert_to_int16_pcm(samples),
        SampleFormat::Float32 => convert_to_float32_le(samples),
    }
}
