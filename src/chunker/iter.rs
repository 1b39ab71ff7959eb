//! Synchronous chunking API - Chunker and ChunkIter.
//!
//! - [`Chunker`] - Holds a configuration and starts chunking operations
//! - [`ChunkIter`] - Pull-based iterator over a [`std::io::Read`] source
//!
//! # Example
//!
//! ```no_run
//! use audiochunk::{ChunkConfig, Chunker};
//! use std::fs::File;
//!
//! let file = File::open("episode.mp3")?;
//! let chunker = Chunker::new(ChunkConfig::mp3(8192, 511)?);
//!
//! for chunk in chunker.chunk(file) {
//!     let chunk = chunk?;
//!     println!("{chunk}");
//! }
//! # Ok::<(), audiochunk::ChunkError>(())
//! ```

use std::io::{self, Read};
use std::iter::FusedIterator;

use bytes::{Buf, Bytes};

use super::Session;
use crate::chunk::Chunk;
use crate::config::ChunkConfig;
use crate::error::ChunkError;

/// Splits audio streams into self-contained chunks.
///
/// # Example
///
/// ```
/// use audiochunk::{ChunkConfig, Chunker};
/// use std::io::Cursor;
///
/// let chunker = Chunker::new(ChunkConfig::raw(4)?);
/// let chunks: Vec<_> = chunker.chunk(Cursor::new(b"abcdefghij")).collect::<Result<_, _>>()?;
/// assert_eq!(chunks.len(), 3);
/// assert_eq!(&chunks[2].data[..], b"ij");
/// # Ok::<(), audiochunk::ChunkError>(())
/// ```
#[derive(Debug, Clone)]
pub struct Chunker {
    config: ChunkConfig,
}

impl Chunker {
    /// Creates a new chunker with the given configuration.
    pub fn new(config: ChunkConfig) -> Self {
        Self { config }
    }

    /// Returns the configuration.
    pub fn config(&self) -> &ChunkConfig {
        &self.config
    }

    /// Creates a chunking iterator over a reader.
    ///
    /// Nothing is read until the first call to `next`. An invalid
    /// configuration surfaces as the first item.
    pub fn chunk<R: Read>(&self, reader: R) -> ChunkIter<R> {
        ChunkIter::new(reader, &self.config)
    }

    /// Chunks an in-memory buffer.
    ///
    /// # Errors
    ///
    /// Returns the first error the format engine reports.
    ///
    /// # Example
    ///
    /// ```
    /// use audiochunk::{ChunkConfig, Chunker};
    ///
    /// let chunker = Chunker::new(ChunkConfig::raw(1024)?);
    /// let chunks = chunker.chunk_bytes(vec![0u8; 2500])?;
    /// let lens: Vec<usize> = chunks.iter().map(|c| c.len()).collect();
    /// assert_eq!(lens, vec![1024, 1024, 452]);
    /// # Ok::<(), audiochunk::ChunkError>(())
    /// ```
    pub fn chunk_bytes(&self, data: impl Into<Bytes>) -> Result<Vec<Chunk>, ChunkError> {
        let data: Bytes = data.into();
        self.chunk(data.reader()).collect()
    }
}

impl Default for Chunker {
    fn default() -> Self {
        Self::new(ChunkConfig::default())
    }
}

/// An iterator that yields chunks from a reader.
///
/// Each item is produced by reading exactly as many bytes as the format
/// needs next. Once the source is exhausted, or after the first error, the
/// iterator returns `None` forever and its pooled buffers are released.
/// [`next_chunk`](Self::next_chunk) keeps reporting the latched error
/// instead.
pub struct ChunkIter<R> {
    reader: R,
    session: Session,
    fused: bool,
}

impl<R: Read> ChunkIter<R> {
    fn new(reader: R, config: &ChunkConfig) -> Self {
        Self {
            reader,
            session: Session::new(config),
            fused: false,
        }
    }

    /// Pulls the next chunk.
    ///
    /// Returns `Ok(None)` at end of stream, on every call after that too.
    /// After a failure every call returns the same error.
    pub fn next_chunk(&mut self) -> Result<Option<Chunk>, ChunkError> {
        loop {
            if let Some(done) = self.session.terminal() {
                return done;
            }
            let filled = match fill(&mut self.reader, self.session.input()) {
                Ok(n) => n,
                Err(e) => return Err(self.session.fail(e.into())),
            };
            if let Some(result) = self.session.advance(filled) {
                return result;
            }
        }
    }

    /// Stops chunking and releases pooled buffers. Idempotent.
    pub fn close(&mut self) {
        self.session.close();
    }

    /// Total bytes consumed from the reader so far.
    pub fn bytes_read(&self) -> u64 {
        self.session.bytes_read()
    }

    /// Returns the underlying reader.
    pub fn into_inner(self) -> R {
        self.reader
    }
}

impl<R: Read> Iterator for ChunkIter<R> {
    type Item = Result<Chunk, ChunkError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.fused {
            return None;
        }
        match self.next_chunk() {
            Ok(Some(chunk)) => Some(Ok(chunk)),
            Ok(None) => {
                self.fused = true;
                None
            }
            Err(e) => {
                self.fused = true;
                Some(Err(e))
            }
        }
    }
}

impl<R: Read> FusedIterator for ChunkIter<R> {}

impl<R> std::fmt::Debug for ChunkIter<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkIter")
            .field("session", &self.session)
            .field("fused", &self.fused)
            .finish_non_exhaustive()
    }
}

/// Reads until `buf` is full or the reader reports end of stream.
fn fill<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
