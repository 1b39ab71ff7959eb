//! MPEG audio Layer III support.
//!
//! - [`FrameHeader`] - Validated 4-byte frame header and its frame length
//! - `Mp3Chunker` - Frame-aligned chunking with bit-reservoir carryover

mod chunker;
mod header;

pub(crate) use chunker::Mp3Chunker;
pub use header::{
    FrameHeader, MAX_FRAME_LEN, MIN_FRAME_LEN, MpegVersion, frame_length, is_frame_sync,
};
