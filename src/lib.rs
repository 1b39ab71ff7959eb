//! audiochunk
//!
//! Format-aware streaming chunker for MP3 and WAV audio.
//!
//! `audiochunk` splits an encoded audio stream into chunks of roughly a
//! target size, each of which a client can decode on its own:
//!
//! - MP3: chunks hold whole Layer III frames and start with the tail of the
//!   previous chunk, so frames that borrow bits from the reservoir still
//!   decode
//! - WAV: every chunk carries the RIFF header (complete mode, with patched
//!   size fields) or the header is sent once ahead of raw slices (streaming
//!   mode)
//! - Raw: fixed-size slices with no parsing
//!
//! The crate intentionally:
//! - does NOT decode or transcode audio
//! - does NOT manage files, sockets or HTTP
//! - does NOT persist chunks
//!
//! It only does one thing: **Read bytes → yield playable chunks**
//!
//! # Sync
//!
//! ```no_run
//! use std::fs::File;
//! use audiochunk::{ChunkConfig, ChunkError, Chunker, WavMode};
//!
//! fn main() -> Result<(), ChunkError> {
//!     let file = File::open("take.wav")?;
//!     let chunker = Chunker::new(ChunkConfig::wav(8192, WavMode::Complete)?);
//!
//!     for chunk in chunker.chunk(file) {
//!         let chunk = chunk?;
//!         println!("chunk #{} {} bytes", chunk.sequence, chunk.data.len());
//!     }
//!     Ok(())
//! }
//! ```
//!
//! # Async (feature = "async-io")
//!
//! ```ignore
//! use futures_util::StreamExt;
//! use audiochunk::{chunk_async, ChunkConfig};
//! use futures_io::AsyncRead;
//!
//! async fn demo<R: AsyncRead + Unpin>(reader: R) -> Result<(), audiochunk::ChunkError> {
//!     let mut stream = chunk_async(reader, ChunkConfig::mp3(8192, 511)?);
//!
//!     while let Some(chunk) = stream.next().await {
//!         let chunk = chunk?;
//!         println!("chunk {}", chunk.data.len());
//!     }
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod chunk;
mod chunker;
mod config;
mod error;

mod buffer; // internal (shared pools)
mod hash; // internal blake3 impl
mod mp3;
mod raw;
mod wav;

#[cfg(feature = "async-io")]
mod async_stream;

//
// Public surface
//

pub use chunk::{Chunk, ChunkHash};
pub use chunker::{ChunkIter, Chunker};
pub use config::{
    ChunkConfig, DEFAULT_TARGET_SIZE, Format, HashConfig, Limits, MAX_RESERVOIR, MAX_TARGET_SIZE,
    WavMode,
};
pub use error::{ChunkError, ErrorKind};
pub use mp3::{FrameHeader, MAX_FRAME_LEN, MIN_FRAME_LEN, MpegVersion, frame_length, is_frame_sync};

#[cfg(feature = "async-io")]
pub use async_stream::{ChunkStream, chunk_async};
