pub mod channel_map;
pub mod sample_encoder;
pub mod wav_format;
