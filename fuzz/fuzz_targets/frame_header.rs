#![no_main]

use libfuzzer_sys::fuzz_target;
use audiochunk::{FrameHeader, MAX_FRAME_LEN, MIN_FRAME_LEN, frame_length};

fuzz_target!(|data: [u8; 4]| {
    let parsed = FrameHeader::parse(data);

    // Verify: the slice helper agrees with the parser
    assert_eq!(parsed.map(|h| h.frame_len()), frame_length(&data));

    if let Some(header) = parsed {
        // Verify: valid headers describe frames within the known bounds
        let len = header.frame_len();
        assert!((MIN_FRAME_LEN..=MAX_FRAME_LEN).contains(&len));
        assert!(audiochunk::is_frame_sync(data[0], data[1]));
    }
});
