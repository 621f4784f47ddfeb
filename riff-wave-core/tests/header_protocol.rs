use std::fs::{self, OpenOptions};
use std::io::{Cursor, Seek, SeekFrom, Write};

use riff_wave_core::processing::channel_map::WAV_PERMUTE_MATRIX;
use riff_wave_core::{
    adjust_wav_mapping, emit_header, finalize_header, read_metadata, sidecar_path, verify_metadata, FinalizeOutcome,
    HeaderFormat, MappingFamily, SampleFormat, SkipReason, WavFileWriter, WavFormatDescriptor, WavOutputConfig,
    WavStreamWriter, PLACEHOLDER_SIZE,
};

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_le_bytes([bytes[offset], bytes[offset + 1], bytes[offset + 2], bytes[offset + 3]])
}

fn u16_at(bytes: &[u8], offset: usize) -> u16 {
    u16::from_le_bytes([bytes[offset], bytes[offset + 1]])
}

#[test]
fn adjust_is_identity_without_semantic_mapping() {
    for family in [0u8, 2, 3, 255] {
        for channels in 1..=12u8 {
            let mut map: Vec<u8> = (0..channels).rev().collect();
            let original = map.clone();
            adjust_wav_mapping(MappingFamily(family), &mut map);
            assert_eq!(map, original, "family {} channels {}", family, channels);
        }
    }
}

#[test]
fn adjust_round_trips_through_inverse_table() {
    for channels in 1..=8usize {
        let mut map: Vec<usize> = (0..channels).collect();
        adjust_wav_mapping(MappingFamily::SEMANTIC, &mut map);

        let mut sorted = map.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, (0..channels).collect::<Vec<_>>());

        let row = &WAV_PERMUTE_MATRIX[channels - 1];
        for source in 0..channels {
            assert_eq!(map[row[source]], source);
        }
    }
}

#[test]
fn stereo_pcm_stream_end_to_end() {
    let descriptor = WavFormatDescriptor::new(44100, 2, MappingFamily::UNMAPPED, SampleFormat::Int16);
    let mut sink = Cursor::new(Vec::new());

    let format = emit_header(&mut sink, &descriptor).unwrap();
    assert_eq!(format.chunk_size(), 16);
    assert_eq!(sink.get_ref().len(), 44);

    sink.write_all(&[7u8; 1000]).unwrap();
    let outcome = finalize_header(&mut sink, format, 1000).unwrap();
    assert_eq!(outcome, FinalizeOutcome::Patched);

    let bytes = sink.into_inner();
    assert_eq!(u16_at(&bytes, 20), 1);
    assert_eq!(u16_at(&bytes, 32), 4);
    assert_eq!(u16_at(&bytes, 34), 16);
    assert_eq!(u32_at(&bytes, 4), 1036);
    assert_eq!(u32_at(&bytes, 40), 1000);
    assert!(bytes[44..].iter().all(|&b| b == 7));
}

#[test]
fn surround_header_uses_extensible_form() {
    let descriptor = WavFormatDescriptor::new(48000, 6, MappingFamily::SEMANTIC, SampleFormat::Int16);
    let mut sink = Cursor::new(Vec::new());

    let format = emit_header(&mut sink, &descriptor).unwrap();
    assert_eq!(format, HeaderFormat::Extensible);

    let bytes = sink.into_inner();
    assert_eq!(bytes.len(), 68);
    assert_eq!(u32_at(&bytes, 16), 40);
    assert_eq!(u16_at(&bytes, 20), 0xfffe);
    assert_eq!(u32_at(&bytes, 40), 0x3f);
}

#[test]
fn oversized_payload_keeps_placeholders() {
    let descriptor = WavFormatDescriptor::new(48000, 2, MappingFamily::UNMAPPED, SampleFormat::Float32);
    let mut sink = Cursor::new(Vec::new());
    let format = emit_header(&mut sink, &descriptor).unwrap();
    let placeholder_state = sink.get_ref().clone();

    let outcome = finalize_header(&mut sink, format, PLACEHOLDER_SIZE as i64).unwrap();
    assert_eq!(
        outcome,
        FinalizeOutcome::Skipped(SkipReason::SizeOverflow {
            audio_bytes: PLACEHOLDER_SIZE as i64
        })
    );
    assert_eq!(sink.get_ref(), &placeholder_state);
    assert_eq!(u32_at(sink.get_ref(), 4), PLACEHOLDER_SIZE);
    assert_eq!(u32_at(sink.get_ref(), 64), PLACEHOLDER_SIZE);
}

#[test]
fn raw_mode_is_never_finalized() {
    let mut sink = Cursor::new(vec![1u8; 64]);
    let format = HeaderFormat::from_chunk_size(0).unwrap();
    let outcome = finalize_header(&mut sink, format, 64).unwrap();
    assert_eq!(outcome, FinalizeOutcome::Skipped(SkipReason::RawOutput));
    assert_eq!(sink.position(), 0);
    assert!(sink.get_ref().iter().all(|&b| b == 1));
}

#[test]
fn independent_streams_finalize_independently() {
    let stereo = WavFormatDescriptor::new(48000, 2, MappingFamily::UNMAPPED, SampleFormat::Int16);
    let surround = WavFormatDescriptor::new(48000, 8, MappingFamily::SEMANTIC, SampleFormat::Int16);

    let mut a = Cursor::new(Vec::new());
    let mut b = Cursor::new(Vec::new());
    let format_a = emit_header(&mut a, &stereo).unwrap();
    let format_b = emit_header(&mut b, &surround).unwrap();

    a.write_all(&[0u8; 40]).unwrap();
    b.write_all(&[0u8; 160]).unwrap();

    finalize_header(&mut b, format_b, 160).unwrap();
    finalize_header(&mut a, format_a, 40).unwrap();

    assert_eq!(u32_at(a.get_ref(), 40), 40);
    assert_eq!(u32_at(b.get_ref(), 64), 160);
    assert_eq!(u32_at(b.get_ref(), 4), 220);
}

#[test]
fn stream_writer_reorders_surround_samples() {
    let config = WavOutputConfig {
        channels: 3,
        mapping_family: MappingFamily::SEMANTIC,
        sample_format: SampleFormat::Int16,
        ..Default::default()
    };
    let mut writer = WavStreamWriter::new(Cursor::new(Vec::new()), config).unwrap();
    writer.open().unwrap();

    // decoder order L, C, R
    writer.write_samples(&[0.0, 0.5, 1.0]).unwrap();
    let summary = writer.finish().unwrap();
    assert_eq!(summary.frames, 1);
    assert_eq!(summary.header_format, HeaderFormat::Extensible);

    let mut cursor = writer.into_inner();
    cursor.seek(SeekFrom::Start(0)).unwrap();
    let bytes = cursor.into_inner();
    assert_eq!(bytes.len(), 68 + 6);
    // WAV order L, R, C
    let samples: Vec<i16> = bytes[68..]
        .chunks_exact(2)
        .map(|b| i16::from_le_bytes([b[0], b[1]]))
        .collect();
    assert_eq!(samples, vec![0, i16::MAX, 16383]);
    assert_eq!(u32_at(&bytes, 64), 6);
}

#[test]
fn file_sink_end_to_end() {
    let path = std::env::temp_dir().join("riff_wave_protocol_file.wav");
    let descriptor = WavFormatDescriptor::new(48000, 8, MappingFamily::SEMANTIC, SampleFormat::Float32);

    let mut file = OpenOptions::new()
        .read(true)
        .write(true)
        .create(true)
        .truncate(true)
        .open(&path)
        .unwrap();
    let format = emit_header(&mut file, &descriptor).unwrap();
    file.write_all(&[0u8; 8 * 4 * 10]).unwrap();
    assert!(finalize_header(&mut file, format, 320).unwrap().is_patched());
    drop(file);

    let bytes = fs::read(&path).unwrap();
    assert_eq!(bytes.len(), 68 + 320);
    assert_eq!(u32_at(&bytes, 4), 320 + 60);
    assert_eq!(u32_at(&bytes, 40), 0x63f);
    assert_eq!(u32_at(&bytes, 64), 320);

    fs::remove_file(&path).ok();
}

#[test]
fn file_writer_sidecar_matches_disk() {
    let path = std::env::temp_dir().join("riff_wave_protocol_writer.wav");
    let config = WavOutputConfig {
        sample_rate: 16000,
        channels: 6,
        mapping_family: MappingFamily::SEMANTIC,
        ..Default::default()
    };

    let mut writer = WavFileWriter::create(path.clone(), config).unwrap();
    writer.write_samples(&[0.0; 6 * 160]).unwrap();
    let (result, metadata) = writer.close_with_metadata().unwrap();

    assert_eq!(result.summary.frames, 160);
    assert!((result.duration_secs - 0.01).abs() < 1e-9);
    assert_eq!(read_metadata(&path).unwrap(), metadata);
    verify_metadata(&metadata, &path).unwrap();

    let bytes = fs::read(&path).unwrap();
    assert_eq!(u32_at(&bytes, 64), 6 * 160 * 2);

    fs::remove_file(&path).ok();
    fs::remove_file(sidecar_path(&path)).ok();
}
