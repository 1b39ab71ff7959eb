// Integration tests for the Chunker API
// Tests cover: mp3 reservoir carryover, wav header handling, safety limits,
// terminal-state latching, hashing, async driver

use std::io::Cursor;

use audiochunk::{
    Chunk, ChunkConfig, ChunkError, Chunker, ErrorKind, Format, FrameHeader, HashConfig, Limits,
    MAX_FRAME_LEN, MAX_RESERVOIR, MIN_FRAME_LEN, WavMode, frame_length,
};
use proptest::prelude::*;

/// MPEG-1 Layer III, 128 kbit/s, 44.1 kHz: 417-byte frames.
const HEADER_128K: [u8; 4] = [0xFF, 0xFB, 0x90, 0x00];

fn mp3_frames(count: usize) -> Vec<u8> {
    let mut out = Vec::with_capacity(count * 417);
    for i in 0..count {
        let mut frame = vec![(i % 251) as u8; 417];
        frame[..4].copy_from_slice(&HEADER_128K);
        out.extend_from_slice(&frame);
    }
    out
}

/// Canonical 44-byte PCM header followed by `audio`.
fn wav_file(audio: &[u8]) -> Vec<u8> {
    let mut out = b"RIFF".to_vec();
    out.extend_from_slice(&(36 + audio.len() as u32).to_le_bytes());
    out.extend_from_slice(b"WAVEfmt ");
    out.extend_from_slice(&16u32.to_le_bytes());
    out.extend_from_slice(&1u16.to_le_bytes());
    out.extend_from_slice(&2u16.to_le_bytes());
    out.extend_from_slice(&44100u32.to_le_bytes());
    out.extend_from_slice(&176_400u32.to_le_bytes());
    out.extend_from_slice(&4u16.to_le_bytes());
    out.extend_from_slice(&16u16.to_le_bytes());
    out.extend_from_slice(b"data");
    out.extend_from_slice(&(audio.len() as u32).to_le_bytes());
    out.extend_from_slice(audio);
    out
}

fn le32(bytes: &[u8]) -> usize {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]]) as usize
}

fn collect(config: ChunkConfig, data: Vec<u8>) -> Result<Vec<Chunk>, ChunkError> {
    Chunker::new(config).chunk(Cursor::new(data)).collect()
}

// ============================================================================
// MP3 Reservoir Carryover
// ============================================================================

#[test]
fn test_mp3_chunk_layout() {
    // 120 frames, target 8192, reservoir request clamped to 511
    let data = mp3_frames(120);
    let config = ChunkConfig::mp3(8192, 2048).unwrap();
    assert_eq!(config.format(), Format::Mp3 { reservoir: 511 });

    let chunks = collect(config, data).unwrap();
    let lens: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
    assert_eq!(
        lens,
        vec![8340, 8434, 8434, 8434, 8434, 8434, 511 + 5 * 417],
        "20 frames, then 511 carried + 19 frames, then the remainder"
    );

    for chunk in &chunks {
        assert!(chunk.len() <= 8192 + MAX_RESERVOIR + MAX_FRAME_LEN);
    }
    for pair in chunks.windows(2) {
        let prev = &pair[0].data;
        assert_eq!(
            &pair[1].data[..MAX_RESERVOIR],
            &prev[prev.len() - MAX_RESERVOIR..],
            "each chunk must start with the previous chunk's tail"
        );
    }
}

#[test]
fn test_mp3_reassembly_after_dedup() {
    let data = mp3_frames(57);
    let chunks = collect(ChunkConfig::mp3(4000, 300).unwrap(), data.clone()).unwrap();

    let mut rebuilt = chunks[0].data.to_vec();
    for chunk in &chunks[1..] {
        rebuilt.extend_from_slice(&chunk.data[300..]);
    }
    assert_eq!(rebuilt, data, "dropping the carried prefix restores the stream");
}

#[test]
fn test_mp3_first_chunk_on_frame_boundary() {
    // ID3v2 tag with a ten-byte body before the first frame
    let mut data = b"ID3\x04\x00\x00\x00\x00\x00\x0A".to_vec();
    data.extend_from_slice(&[0u8; 10]);
    let frames = mp3_frames(30);
    data.extend_from_slice(&frames);

    let chunks = collect(ChunkConfig::mp3(8192, 511).unwrap(), data).unwrap();
    assert_eq!(&chunks[0].data[..4], &HEADER_128K);
    assert_eq!(chunks[0].data, frames[..chunks[0].len()]);
}

#[test]
fn test_mp3_without_frames_is_rejected() {
    let err = collect(ChunkConfig::mp3(8192, 511).unwrap(), vec![0x42; 5000]).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_mp3_trailing_partial_frame() {
    let mut data = mp3_frames(3);
    data.extend_from_slice(&mp3_frames(1)[..200]);
    let chunks = collect(ChunkConfig::mp3(8192, 0).unwrap(), data).unwrap();
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].len(), 3 * 417, "incomplete frame is not emitted");
}

// ============================================================================
// WAV Header Handling
// ============================================================================

#[test]
fn test_wav_complete_mode_scenario() {
    let audio: Vec<u8> = (0..20_000u32).map(|i| (i % 199) as u8).collect();
    let file = wav_file(&audio);
    let chunks = collect(ChunkConfig::wav(8192, WavMode::Complete).unwrap(), file).unwrap();

    let lens: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
    assert_eq!(lens, vec![8192, 8192, 44 + 3704]);

    let mut rebuilt = Vec::new();
    for chunk in &chunks {
        assert_eq!(&chunk.data[..4], b"RIFF");
        assert_eq!(&chunk.data[8..12], b"WAVE");
        assert_eq!(le32(&chunk.data[4..8]), chunk.len() - 8);
        assert_eq!(le32(&chunk.data[40..44]), chunk.len() - 44);
        rebuilt.extend_from_slice(&chunk.data[44..]);
    }
    assert_eq!(rebuilt, audio);
}

#[test]
fn test_wav_streaming_mode_scenario() {
    let audio: Vec<u8> = (0..20_000u32).map(|i| (i % 97) as u8).collect();
    let file = wav_file(&audio);
    let chunks = collect(
        ChunkConfig::wav(8192, WavMode::Streaming).unwrap(),
        file.clone(),
    )
    .unwrap();

    let lens: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
    assert_eq!(lens, vec![8192, 8192, 20_000 - 8148 - 8192]);
    assert_eq!(&chunks[0].data[..44], &file[..44], "header sent verbatim once");

    let joined: Vec<u8> = chunks.iter().flat_map(|c| c.data.to_vec()).collect();
    assert_eq!(joined, file);
}

#[test]
fn test_wav_metadata_chunks_kept_in_header() {
    let audio = vec![7u8; 3000];
    let plain = wav_file(&audio);

    // Insert a LIST chunk with an odd payload between fmt and data
    let mut file = plain[..36].to_vec();
    file.extend_from_slice(b"LIST\x05\x00\x00\x00INFOa\x00");
    file.extend_from_slice(&plain[36..]);

    let chunks = collect(ChunkConfig::wav(2048, WavMode::Complete).unwrap(), file).unwrap();
    let header_len = 44 + 14;
    for chunk in &chunks {
        assert_eq!(&chunk.data[36..40], b"LIST");
        assert_eq!(le32(&chunk.data[4..8]), chunk.len() - 8);
        assert_eq!(le32(&chunk.data[header_len - 4..header_len]), chunk.len() - header_len);
    }
    let total_audio: usize = chunks.iter().map(|c| c.len() - header_len).sum();
    assert_eq!(total_audio, 3000);
}

#[test]
fn test_wav_odd_payload_consumes_pad() {
    let mut file = wav_file(&[1, 2, 3]);
    file.push(0);
    let mut iter = Chunker::new(ChunkConfig::wav(8192, WavMode::Complete).unwrap())
        .chunk(Cursor::new(file.clone()));

    let chunk = iter.next_chunk().unwrap().unwrap();
    assert_eq!(chunk.len(), 47);
    assert!(iter.next_chunk().unwrap().is_none());
    assert_eq!(iter.bytes_read(), file.len() as u64);
}

#[test]
fn test_wav_oversized_metadata_chunk() {
    let mut file = b"RIFF\x00\x00\x00\x00WAVE".to_vec();
    file.extend_from_slice(b"LIST");
    file.extend_from_slice(&(1024u32 * 1024).to_le_bytes());

    let err = collect(ChunkConfig::wav(8192, WavMode::Complete).unwrap(), file).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceLimit);
    assert!(matches!(
        err,
        ChunkError::ResourceLimit {
            declared: 1_048_576,
            limit: 524_288,
            ..
        }
    ));
}

#[test]
fn test_wav_custom_limits() {
    let mut file = b"RIFF\x00\x00\x00\x00WAVE".to_vec();
    file.extend_from_slice(b"junk\x00\x02\x00\x00");
    file.extend_from_slice(&[0u8; 512]);

    let limits = Limits {
        max_metadata_chunk: 256,
        ..Limits::default()
    };
    let config = ChunkConfig::wav(8192, WavMode::Streaming)
        .unwrap()
        .with_limits(limits);
    let err = collect(config, file).unwrap_err();
    assert_eq!(err.kind(), ErrorKind::ResourceLimit);
}

#[test]
fn test_wav_bad_signature() {
    let err = collect(
        ChunkConfig::wav(8192, WavMode::Complete).unwrap(),
        b"RIFF\x24\x00\x00\x00AVI LIST".to_vec(),
    )
    .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Format);
}

#[test]
fn test_wav_truncated_prologue() {
    let err = collect(
        ChunkConfig::wav(8192, WavMode::Complete).unwrap(),
        b"RIFF".to_vec(),
    )
    .unwrap_err();
    assert!(matches!(
        err,
        ChunkError::TruncatedInput {
            expected: 12,
            actual: 4,
            ..
        }
    ));
}

#[test]
fn test_unknown_mode() {
    let err = "chunked".parse::<WavMode>().unwrap_err();
    assert!(matches!(err, ChunkError::UnknownMode(ref m) if m == "chunked"));
    assert_eq!(err.kind(), ErrorKind::Format);
    assert_eq!("Complete".parse::<WavMode>().unwrap(), WavMode::Complete);
}

// ============================================================================
// Terminal State
// ============================================================================

#[test]
fn test_end_of_stream_is_idempotent() {
    let mut iter =
        Chunker::new(ChunkConfig::mp3(8192, 511).unwrap()).chunk(Cursor::new(mp3_frames(2)));
    assert!(iter.next_chunk().unwrap().is_some());
    for _ in 0..5 {
        assert!(iter.next_chunk().unwrap().is_none());
    }
}

#[test]
fn test_error_is_replayed() {
    let mut file = b"RIFF\x00\x00\x00\x00WAVE".to_vec();
    file.extend_from_slice(b"LIST\xFF\xFF\xFF\x7F");
    let mut iter =
        Chunker::new(ChunkConfig::wav(8192, WavMode::Streaming).unwrap()).chunk(Cursor::new(file));

    let first = iter.next_chunk().unwrap_err();
    for _ in 0..3 {
        let again = iter.next_chunk().unwrap_err();
        assert_eq!(again.kind(), first.kind());
        assert_eq!(again.to_string(), first.to_string());
    }
}

#[test]
fn test_mp3_truncated_after_chunk_is_latched() {
    // One emitted frame, then a frame cut short with only the reservoir before it
    let mut data = mp3_frames(1);
    data.extend_from_slice(&mp3_frames(1)[..104]);
    let mut iter = Chunker::new(ChunkConfig::mp3(1, 100).unwrap()).chunk(Cursor::new(data));

    assert_eq!(iter.next_chunk().unwrap().unwrap().len(), 417);
    for _ in 0..3 {
        assert!(matches!(
            iter.next_chunk(),
            Err(ChunkError::TruncatedInput {
                expected: 417,
                actual: 104,
                ..
            })
        ));
    }
}

#[test]
fn test_oversized_target_rejected() {
    assert!(matches!(
        ChunkConfig::mp3(usize::MAX, 511),
        Err(ChunkError::InvalidConfig { .. })
    ));

    let config = ChunkConfig::default().with_target_size(usize::MAX);
    let mut iter = Chunker::new(config).chunk(Cursor::new(mp3_frames(2)));
    let err = iter.next_chunk().unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Config);
    assert_eq!(iter.bytes_read(), 0);
}

#[test]
fn test_close_then_pull() {
    let mut iter = Chunker::new(ChunkConfig::raw(100).unwrap()).chunk(Cursor::new(vec![0u8; 1000]));
    iter.next_chunk().unwrap();
    iter.close();
    assert!(iter.next_chunk().unwrap().is_none());
    assert_eq!(iter.bytes_read(), 100);
}

// ============================================================================
// Raw Mode and Buffers
// ============================================================================

#[test]
fn test_raw_chunking() {
    let data: Vec<u8> = (0..10_000u32).map(|i| i as u8).collect();
    let chunks = Chunker::new(ChunkConfig::raw(4096).unwrap())
        .chunk_bytes(data.clone())
        .unwrap();
    let lens: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
    assert_eq!(lens, vec![4096, 4096, 1808]);
    let joined: Vec<u8> = chunks.iter().flat_map(|c| c.data.to_vec()).collect();
    assert_eq!(joined, data);
}

#[test]
fn test_many_concurrent_chunkers() {
    let handles: Vec<_> = (0..8)
        .map(|_| {
            std::thread::spawn(|| {
                for _ in 0..20 {
                    let chunks =
                        collect(ChunkConfig::mp3(2048, 511).unwrap(), mp3_frames(20)).unwrap();
                    assert!(!chunks.is_empty());
                }
            })
        })
        .collect();
    for handle in handles {
        handle.join().unwrap();
    }
}

// ============================================================================
// Hashing Tests
// ============================================================================

#[cfg(feature = "hash-blake3")]
mod hashing {
    use super::*;

    #[test]
    fn test_hash_disabled_by_default() {
        let chunks = collect(ChunkConfig::raw(64).unwrap(), vec![1u8; 200]).unwrap();
        assert!(chunks.iter().all(|c| c.hash.is_none()));
    }

    #[test]
    fn test_identical_chunks_share_digest() {
        let config = ChunkConfig::raw(64)
            .unwrap()
            .with_hash_config(HashConfig::enabled());
        let chunks = collect(config, vec![1u8; 192]).unwrap();
        let hashes: Vec<_> = chunks.iter().map(|c| c.hash.unwrap()).collect();
        assert_eq!(hashes[0], hashes[1]);
        assert_eq!(hashes[1], hashes[2]);
        assert_eq!(hashes[0].etag(), format!("\"{}\"", hashes[0].to_hex()));
    }

    #[test]
    fn test_complete_wav_chunks_hash_whole_file() {
        let config = ChunkConfig::wav(2048, WavMode::Complete)
            .unwrap()
            .with_hash_config(HashConfig::enabled());
        let chunks = collect(config, wav_file(&[3u8; 5000])).unwrap();
        for chunk in &chunks {
            let expected = blake3::hash(&chunk.data);
            assert_eq!(chunk.hash.unwrap().as_bytes(), expected.as_bytes());
        }
    }
}

// ============================================================================
// Async Driver
// ============================================================================

#[cfg(feature = "async-io")]
mod async_driver {
    use super::*;
    use audiochunk::chunk_async;
    use futures_util::StreamExt;
    use tokio_util::compat::TokioAsyncReadCompatExt;

    #[tokio::test]
    async fn test_async_matches_sync() {
        let data = mp3_frames(120);
        let config = ChunkConfig::mp3(8192, 511).unwrap();
        let expected = collect(config, data.clone()).unwrap();

        let stream = chunk_async(Cursor::new(data).compat(), config);
        let chunks: Vec<Chunk> = stream.map(|c| c.unwrap()).collect().await;
        assert_eq!(chunks, expected);
    }

    #[tokio::test]
    async fn test_async_wav_from_duplex() {
        let audio = vec![5u8; 9000];
        let file = wav_file(&audio);
        let (mut tx, rx) = tokio::io::duplex(333);
        let writer = tokio::spawn(async move {
            use tokio::io::AsyncWriteExt;
            tx.write_all(&file).await.unwrap();
        });

        let config = ChunkConfig::wav(4096, WavMode::Complete).unwrap();
        let chunks: Vec<Chunk> = chunk_async(rx.compat(), config)
            .map(|c| c.unwrap())
            .collect()
            .await;
        writer.await.unwrap();

        let total_audio: usize = chunks.iter().map(|c| c.len() - 44).sum();
        assert_eq!(total_audio, 9000);
        assert_eq!(chunks[0].len(), 4096);
    }
}

// ============================================================================
// Frame Header Properties
// ============================================================================

fn header_bytes(version: u8, bitrate: u8, sample_rate: u8, padding: bool) -> [u8; 4] {
    [
        0xFF,
        0xE0 | (version << 3) | (0b01 << 1) | 1,
        (bitrate << 4) | (sample_rate << 2) | (u8::from(padding) << 1),
        0x00,
    ]
}

fn valid_version() -> impl Strategy<Value = u8> {
    prop_oneof![Just(0b00u8), Just(0b10u8), Just(0b11u8)]
}

proptest! {
    #[test]
    fn prop_frame_length_in_range(
        version in valid_version(),
        bitrate in 1u8..15,
        sample_rate in 0u8..3,
        padding in any::<bool>(),
    ) {
        let len = frame_length(&header_bytes(version, bitrate, sample_rate, padding)).unwrap();
        prop_assert!((MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(&len));
    }

    #[test]
    fn prop_frame_length_grows_with_bitrate(
        version in valid_version(),
        bitrate in 1u8..14,
        sample_rate in 0u8..3,
        padding in any::<bool>(),
    ) {
        let lo = frame_length(&header_bytes(version, bitrate, sample_rate, padding)).unwrap();
        let hi = frame_length(&header_bytes(version, bitrate + 1, sample_rate, padding)).unwrap();
        prop_assert!(lo <= hi);
    }

    #[test]
    fn prop_reserved_fields_rejected(
        version in valid_version(),
        sample_rate in 0u8..3,
        padding in any::<bool>(),
    ) {
        prop_assert!(frame_length(&header_bytes(version, 0, sample_rate, padding)).is_none());
        prop_assert!(frame_length(&header_bytes(version, 15, sample_rate, padding)).is_none());
        prop_assert!(frame_length(&header_bytes(version, 5, 3, padding)).is_none());
        prop_assert!(frame_length(&header_bytes(0b01, 5, sample_rate, padding)).is_none());
    }

    #[test]
    fn prop_parse_agrees_with_frame_length(bytes in any::<[u8; 4]>()) {
        let parsed = FrameHeader::parse(bytes).map(|h| h.frame_len());
        prop_assert_eq!(parsed, frame_length(&bytes));
    }

    #[test]
    fn prop_mp3_chunks_reassemble(
        frames in 1usize..60,
        target in 1usize..6000,
        reservoir in 0usize..=511,
    ) {
        let data = mp3_frames(frames);
        let chunks = collect(ChunkConfig::mp3(target, reservoir).unwrap(), data.clone()).unwrap();

        let mut rebuilt = chunks[0].data.to_vec();
        for pair in chunks.windows(2) {
            let carried = pair[0].len().min(reservoir);
            prop_assert_eq!(&pair[1].data[..carried], &pair[0].data[pair[0].len() - carried..]);
            rebuilt.extend_from_slice(&pair[1].data[carried..]);
        }
        prop_assert_eq!(rebuilt, data);
    }

    #[test]
    fn prop_complete_wav_chunks_are_valid_files(
        audio_len in 0usize..20_000,
        target in 1usize..10_000,
    ) {
        let audio: Vec<u8> = (0..audio_len).map(|i| (i % 256) as u8).collect();
        let chunks = collect(
            ChunkConfig::wav(target, WavMode::Complete).unwrap(),
            wav_file(&audio),
        )
        .unwrap();

        let mut rebuilt = Vec::new();
        for chunk in &chunks {
            prop_assert_eq!(le32(&chunk.data[4..8]), chunk.len() - 8);
            prop_assert_eq!(le32(&chunk.data[40..44]), chunk.len() - 44);
            rebuilt.extend_from_slice(&chunk.data[44..]);
        }
        prop_assert_eq!(rebuilt, audio);
    }
}
