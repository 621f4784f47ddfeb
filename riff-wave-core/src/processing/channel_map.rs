//! Channel reordering from Vorbis/Opus decoder order to WAV speaker order.
//!
//! Under mapping family 1 a decoder emits surround channels in Vorbis order
//! (e.g. 5.1 as FL, FC, FR, RL, RR, LFE) while WAV expects the
//! `WAVEFORMATEXTENSIBLE` speaker-bit order (FL, FR, FC, LFE, BL, BR).

use crate::models::format::MappingFamily;

/// Largest channel count with a defined semantic layout.
pub const MAX_MAPPED_CHANNELS: usize = 8;

/// `WAV_PERMUTE_MATRIX[n - 1][i]` is the WAV slot for decoder channel `i` of an
/// `n`-channel stream. Entries past column `n - 1` are unused.
pub const WAV_PERMUTE_MATRIX: [[usize; MAX_MAPPED_CHANNELS]; MAX_MAPPED_CHANNELS] = [
    [0, 0, 0, 0, 0, 0, 0, 0], // 1.0 mono
    [0, 1, 0, 0, 0, 0, 0, 0], // 2.0 stereo
    [0, 2, 1, 0, 0, 0, 0, 0], // 3.0 wide stereo
    [0, 1, 2, 3, 0, 0, 0, 0], // 4.0 quadraphonic
    [0, 2, 1, 3, 4, 0, 0, 0], // 5.0
    [0, 2, 1, 4, 5, 3, 0, 0], // 5.1
    [0, 2, 1, 5, 6, 4, 3, 0], // 6.1
    [0, 2, 1, 6, 7, 4, 5, 3], // 7.1
];

/// Reorder a per-channel map in place so it follows WAV channel order.
///
/// The channel count is `stream_map.len()`. Anything other than family 1 with
/// 1..=8 channels is left untouched.
pub fn adjust_wav_mapping<T: Copy>(mapping_family: MappingFamily, stream_map: &mut [T]) {
    let channels = stream_map.len();
    if !mapping_family.is_semantic() || channels == 0 || channels > MAX_MAPPED_CHANNELS {
        return;
    }

    let permutation = &WAV_PERMUTE_MATRIX[channels - 1];
    let mut reordered = [stream_map[0]; MAX_MAPPED_CHANNELS];
    for (i, &value) in stream_map.iter().enumerate() {
        reordered[permutation[i]] = value;
    }
    stream_map.copy_from_slice(&reordered[..channels]);
}

/// For each WAV output slot, the decoder channel that belongs there.
pub fn wav_channel_order(mapping_family: MappingFamily, channels: usize) -> Vec<usize> {
    let mut order: Vec<usize> = (0..channels).collect();
    adjust_wav_mapping(mapping_family, &mut order);
    order
}
