//! RIFF/WAVE support.
//!
//! - `RiffWalker` - Collects header bytes up to the `data` chunk
//! - `WavChunker` - Streaming-prefix and self-contained-file output modes

mod chunker;
mod riff;

pub(crate) use chunker::WavChunker;
