use serde::{Deserialize, Serialize};

/// `WAVE_FORMAT_PCM`
pub const WAVE_FORMAT_PCM: u16 = 1;
/// `WAVE_FORMAT_IEEE_FLOAT`
pub const WAVE_FORMAT_IEEE_FLOAT: u16 = 3;
/// `WAVE_FORMAT_EXTENSIBLE`
pub const WAVE_FORMAT_EXTENSIBLE: u16 = 0xfffe;

/// Sub-format GUID for integer PCM: `00000001-0000-0010-8000-00aa00389b71`.
///
/// The first three groups are stored little-endian, the last eight bytes as-is.
pub const KSDATAFORMAT_SUBTYPE_PCM: [u8; 16] = [
    0x01, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xaa, 0x00, 0x38, 0x9b, 0x71,
];

/// Sub-format GUID for IEEE float: `00000003-0000-0010-8000-00aa00389b71`.
pub const KSDATAFORMAT_SUBTYPE_IEEE_FLOAT: [u8; 16] = [
    0x03, 0x00, 0x00, 0x00, 0x00, 0x00, 0x10, 0x00, 0x80, 0x00, 0x00, 0xaa, 0x00, 0x38, 0x9b, 0x71,
];

pub const SPEAKER_FRONT_LEFT: u32 = 0x1;
pub const SPEAKER_FRONT_RIGHT: u32 = 0x2;
pub const SPEAKER_FRONT_CENTER: u32 = 0x4;
pub const SPEAKER_LOW_FREQUENCY: u32 = 0x8;
pub const SPEAKER_BACK_LEFT: u32 = 0x10;
pub const SPEAKER_BACK_RIGHT: u32 = 0x20;
pub const SPEAKER_BACK_CENTER: u32 = 0x100;
pub const SPEAKER_SIDE_LEFT: u32 = 0x200;
pub const SPEAKER_SIDE_RIGHT: u32 = 0x400;

/// Speaker positions for 1..=8 channel layouts.
pub const WAV_CHANNEL_MASKS: [u32; 8] = [
    // 1.0 mono
    SPEAKER_FRONT_CENTER,
    // 2.0 stereo
    SPEAKER_FRONT_LEFT | SPEAKER_FRONT_RIGHT,
    // 3.0 wide stereo
    SPEAKER_FRONT_LEFT | SPEAKER_FRONT_RIGHT | SPEAKER_FRONT_CENTER,
    // 4.0 quadraphonic
    SPEAKER_FRONT_LEFT | SPEAKER_FRONT_RIGHT | SPEAKER_BACK_LEFT | SPEAKER_BACK_RIGHT,
    // 5.0
    SPEAKER_FRONT_LEFT | SPEAKER_FRONT_RIGHT | SPEAKER_FRONT_CENTER | SPEAKER_BACK_LEFT | SPEAKER_BACK_RIGHT,
    // 5.1
    SPEAKER_FRONT_LEFT
        | SPEAKER_FRONT_RIGHT
        | SPEAKER_FRONT_CENTER
        | SPEAKER_LOW_FREQUENCY
        | SPEAKER_BACK_LEFT
        | SPEAKER_BACK_RIGHT,
    // 6.1
    SPEAKER_FRONT_LEFT
        | SPEAKER_FRONT_RIGHT
        | SPEAKER_FRONT_CENTER
        | SPEAKER_LOW_FREQUENCY
        | SPEAKER_BACK_CENTER
        | SPEAKER_SIDE_LEFT
        | SPEAKER_SIDE_RIGHT,
    // 7.1
    SPEAKER_FRONT_LEFT
        | SPEAKER_FRONT_RIGHT
        | SPEAKER_FRONT_CENTER
        | SPEAKER_LOW_FREQUENCY
        | SPEAKER_BACK_LEFT
        | SPEAKER_BACK_RIGHT
        | SPEAKER_SIDE_LEFT
        | SPEAKER_SIDE_RIGHT,
];

/// Channel mask for a layout, or 0 (no speaker assignment) outside 1..=8.
pub fn channel_mask(channels: u16) -> u32 {
    match channels {
        1..=8 => WAV_CHANNEL_MASKS[channels as usize - 1],
        _ => 0,
    }
}

/// Opus-style channel mapping family.
///
/// Only family 1 carries a defined speaker-position order (Vorbis order for
/// 1..8 channels). Every other value is treated as "no semantic order".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct MappingFamily(pub u8);

impl MappingFamily {
    /// Mono or stereo with no further channel semantics.
    pub const UNMAPPED: Self = Self(0);

    /// Standard surround layouts in Vorbis channel order.
    pub const SEMANTIC: Self = Self(1);

    pub fn is_semantic(self) -> bool {
        self == Self::SEMANTIC
    }
}

impl From<u8> for MappingFamily {
    fn from(value: u8) -> Self {
        Self(value)
    }
}

/// Sample encoding of the audio payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SampleFormat {
    /// Signed 16-bit integer PCM.
    #[default]
    Int16,
    /// 32-bit IEEE float.
    Float32,
}

impl SampleFormat {
    pub fn is_float(self) -> bool {
        matches!(self, Self::Float32)
    }

    pub fn bytes_per_sample(self) -> u16 {
        match self {
            Self::Int16 => 2,
            Self::Float32 => 4,
        }
    }

    pub fn bits_per_sample(self) -> u16 {
        self.bytes_per_sample() * 8
    }

    /// Format code used by the minimal 16-byte format chunk.
    pub fn format_code(self) -> u16 {
        match self {
            Self::Int16 => WAVE_FORMAT_PCM,
            Self::Float32 => WAVE_FORMAT_IEEE_FLOAT,
        }
    }

    pub fn sub_format_guid(self) -> &'static [u8; 16] {
        match self {
            Self::Int16 => &KSDATAFORMAT_SUBTYPE_PCM,
            Self::Float32 => &KSDATAFORMAT_SUBTYPE_IEEE_FLOAT,
        }
    }
}

/// Which header was written at the start of a stream.
///
/// Returned by the emitter and handed back to the finalizer: it decides the
/// offsets that get patched once the payload length is known.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HeaderFormat {
    /// Headerless PCM, nothing to finalize.
    Raw,
    /// 16-byte `WAVEFORMAT` chunk, 44-byte header.
    Minimal,
    /// 40-byte `WAVEFORMATEXTENSIBLE` chunk, 68-byte header.
    Extensible,
}

impl HeaderFormat {
    /// Size of the `fmt ` chunk body: 0, 16 or 40.
    pub const fn chunk_size(self) -> u32 {
        match self {
            Self::Raw => 0,
            Self::Minimal => 16,
            Self::Extensible => 40,
        }
    }

    /// Total bytes written before the first audio byte.
    pub const fn header_len(self) -> usize {
        match self {
            Self::Raw => 0,
            // RIFF tag+size, WAVE, fmt tag+size, body, data tag+size
            _ => 28 + self.chunk_size() as usize,
        }
    }

    /// Maps a numeric format-chunk size back to a header format.
    ///
    /// Zero and negative sizes mean raw output.
    pub fn from_chunk_size(size: i32) -> Option<Self> {
        match size {
            i32::MIN..=0 => Some(Self::Raw),
            16 => Some(Self::Minimal),
            40 => Some(Self::Extensible),
            _ => None,
        }
    }
}

/// Everything the header emitter needs to describe a stream.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct WavFormatDescriptor {
    pub sample_rate: u32,
    pub channels: u16,
    pub mapping_family: MappingFamily,
    pub sample_format: SampleFormat,
}

impl WavFormatDescriptor {
    pub fn new(sample_rate: u32, channels: u16, mapping_family: MappingFamily, sample_format: SampleFormat) -> Self {
        Self {
            sample_rate,
            channels,
            mapping_family,
            sample_format,
        }
    }

    /// Multichannel semantic layouts and float samples need `WAVEFORMATEXTENSIBLE`.
    pub fn is_extensible(&self) -> bool {
        (self.mapping_family.is_semantic() && (3..=8).contains(&self.channels)) || self.sample_format.is_float()
    }

    pub fn header_format(&self) -> HeaderFormat {
        if self.is_extensible() {
            HeaderFormat::Extensible
        } else {
            HeaderFormat::Minimal
        }
    }

    /// Bytes per sample frame across all channels (truncated to 16 bits).
    pub fn block_align(&self) -> u16 {
        self.sample_format.bytes_per_sample().wrapping_mul(self.channels)
    }

    /// Speaker positions written into the extensible header.
    pub fn channel_mask(&self) -> u32 {
        channel_mask(self.channels)
    }

    /// Bytes per second (truncated to 32 bits).
    pub fn byte_rate(&self) -> u32 {
        (self.sample_format.bytes_per_sample() as u32)
            .wrapping_mul(self.channels as u32)
            .wrapping_mul(self.sample_rate)
    }
}
