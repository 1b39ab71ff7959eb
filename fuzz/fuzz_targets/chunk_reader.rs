#![no_main]

use std::io::Cursor;

use libfuzzer_sys::fuzz_target;
use audiochunk::{ChunkConfig, Chunker, HashConfig, MAX_FRAME_LEN, MAX_RESERVOIR, WavMode};

fuzz_target!(|data: Vec<u8>| {
    let configs = [
        ChunkConfig::mp3(64, MAX_RESERVOIR).unwrap(),
        ChunkConfig::mp3(8192, 100).unwrap(),
        ChunkConfig::wav(64, WavMode::Complete).unwrap(),
        ChunkConfig::wav(4096, WavMode::Streaming).unwrap(),
        ChunkConfig::raw(1000).unwrap(),
    ];

    for config in configs {
        let config = config.with_hash_config(HashConfig::enabled());
        let chunker = Chunker::new(config);
        let mut iter = chunker.chunk(Cursor::new(&data[..]));

        let mut chunks = Vec::new();
        let outcome = loop {
            match iter.next_chunk() {
                Ok(Some(chunk)) => chunks.push(chunk),
                Ok(None) => break Ok(()),
                Err(e) => break Err(e),
            }
        };

        // Verify: the terminal state is latched
        match &outcome {
            Ok(()) => assert!(iter.next_chunk().unwrap().is_none()),
            Err(e) => assert_eq!(iter.next_chunk().unwrap_err().to_string(), e.to_string()),
        }

        // Verify: never reads past the input
        assert!(iter.bytes_read() <= data.len() as u64);

        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.sequence, i as u64);
            assert!(!chunk.is_empty());
            assert!(chunk.hash.is_some());
            if matches!(config.format(), audiochunk::Format::Mp3 { .. }) {
                assert!(chunk.len() < config.target_size() + MAX_RESERVOIR + MAX_FRAME_LEN);
            }
        }

        // Verify: determinism
        let again: Result<Vec<_>, _> = chunker.chunk(Cursor::new(&data[..])).collect();
        if let Ok(again) = again {
            assert_eq!(again, chunks);
        }
    }
});
