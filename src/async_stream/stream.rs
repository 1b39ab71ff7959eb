//! Async stream adapter for chunking.
//!
//! Drives the same format engines as the synchronous iterator from a
//! `futures_io::AsyncRead`, so it works on any runtime.
//!
//! # Example
//!
//! ```ignore
//! use futures_util::StreamExt;
//! use audiochunk::{chunk_async, ChunkConfig, WavMode};
//! use futures_io::AsyncRead;
//!
//! async fn demo<R: AsyncRead + Unpin>(reader: R) -> Result<(), audiochunk::ChunkError> {
//!     let mut stream = chunk_async(reader, ChunkConfig::wav(8192, WavMode::Complete)?);
//!
//!     while let Some(chunk) = stream.next().await {
//!         let chunk = chunk?;
//!         println!("Chunk: {} bytes", chunk.len());
//!     }
//!     Ok(())
//! }
//! ```

use std::io;
use std::pin::Pin;
use std::task::{Context, Poll};

use futures_core::Stream;
use futures_core::stream::FusedStream;
use futures_io::AsyncRead;
use pin_project_lite::pin_project;

use crate::chunk::Chunk;
use crate::chunker::Session;
use crate::config::ChunkConfig;
use crate::error::ChunkError;

pin_project! {
    /// A stream that yields chunks from an async reader.
    ///
    /// Yields each error once and then ends.
    pub struct ChunkStream<R> {
        #[pin]
        reader: R,
        session: Session,
        // Bytes of the current demand already read; survives `Pending`
        filled: usize,
        done: bool,
    }
}

impl<R> ChunkStream<R> {
    /// Creates a new chunk stream from an async reader.
    pub fn new(reader: R, config: ChunkConfig) -> Self {
        Self {
            reader,
            session: Session::new(&config),
            filled: 0,
            done: false,
        }
    }

    /// Total bytes consumed from the reader so far.
    pub fn bytes_read(&self) -> u64 {
        self.session.bytes_read()
    }

    /// Stops chunking and releases pooled buffers. Idempotent.
    pub fn close(self: Pin<&mut Self>) {
        let this = self.project();
        this.session.close();
        *this.done = true;
    }
}

impl<R: AsyncRead> Stream for ChunkStream<R> {
    type Item = Result<Chunk, ChunkError>;

    fn poll_next(self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        let mut this = self.project();
        if *this.done {
            return Poll::Ready(None);
        }

        loop {
            if let Some(done) = this.session.terminal() {
                *this.done = true;
                return Poll::Ready(done.transpose());
            }

            let read = {
                let buf = this.session.input();
                poll_fill(this.reader.as_mut(), cx, buf, this.filled)
            };
            match read {
                Poll::Pending => return Poll::Pending,
                Poll::Ready(Err(e)) => {
                    *this.filled = 0;
                    *this.done = true;
                    return Poll::Ready(Some(Err(this.session.fail(e.into()))));
                }
                Poll::Ready(Ok(())) => {}
            }

            let filled = std::mem::take(this.filled);
            match this.session.advance(filled) {
                None => {}
                Some(Ok(Some(chunk))) => return Poll::Ready(Some(Ok(chunk))),
                Some(Ok(None)) => {
                    *this.done = true;
                    return Poll::Ready(None);
                }
                Some(Err(e)) => {
                    *this.done = true;
                    return Poll::Ready(Some(Err(e)));
                }
            }
        }
    }
}

impl<R: AsyncRead> FusedStream for ChunkStream<R> {
    fn is_terminated(&self) -> bool {
        self.done
    }
}

impl<R> std::fmt::Debug for ChunkStream<R> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ChunkStream")
            .field("session", &self.session)
            .field("filled", &self.filled)
            .field("done", &self.done)
            .finish_non_exhaustive()
    }
}

/// Reads into `buf[*filled..]` until it is full or the reader hits end of stream.
fn poll_fill<R: AsyncRead>(
    mut reader: Pin<&mut R>,
    cx: &mut Context<'_>,
    buf: &mut [u8],
    filled: &mut usize,
) -> Poll<io::Result<()>> {
    while *filled < buf.len() {
        match reader.as_mut().poll_read(cx, &mut buf[*filled..]) {
            Poll::Pending => return Poll::Pending,
            Poll::Ready(Ok(0)) => break,
            Poll::Ready(Ok(n)) => *filled += n,
            Poll::Ready(Err(e)) if e.kind() == io::ErrorKind::Interrupted => {}
            Poll::Ready(Err(e)) => return Poll::Ready(Err(e)),
        }
    }
    Poll::Ready(Ok(()))
}

/// Creates a chunk stream from an async reader.
///
/// For tokio readers, convert with `tokio_util::compat`:
///
/// ```ignore
/// use tokio_util::compat::TokioAsyncReadCompatExt;
/// use audiochunk::{chunk_async, ChunkConfig};
///
/// let file = tokio::fs::File::open("episode.mp3").await?;
/// let stream = chunk_async(file.compat(), ChunkConfig::mp3(8192, 511)?);
/// ```
pub fn chunk_async<R: AsyncRead>(reader: R, config: ChunkConfig) -> ChunkStream<R> {
    ChunkStream::new(reader, config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::WavMode;
    use futures_util::StreamExt;

    #[tokio::test]
    async fn test_chunk_stream_empty() {
        let reader: &[u8] = &[];
        let stream = chunk_async(reader, ChunkConfig::default());
        let chunks: Vec<_> = stream.collect().await;
        assert!(chunks.is_empty());
    }

    #[tokio::test]
    async fn test_chunk_stream_raw() {
        let data: Vec<u8> = (0..100u8).collect();
        let reader: &[u8] = &data;
        let stream = chunk_async(reader, ChunkConfig::raw(16).unwrap());

        let chunks: Vec<Chunk> = stream.map(|c| c.unwrap()).collect().await;
        assert_eq!(chunks.len(), 7);
        assert_eq!(chunks[6].len(), 4);
        let seq: Vec<u64> = chunks.iter().map(|c| c.sequence).collect();
        assert_eq!(seq, (0..7).collect::<Vec<_>>());
    }

    #[tokio::test]
    async fn test_chunk_stream_error_then_end() {
        let reader: &[u8] = b"RIFF\x00\x00\x00\x00WAVX";
        let mut stream = chunk_async(reader, ChunkConfig::wav(1024, WavMode::Complete).unwrap());
        assert!(matches!(
            stream.next().await,
            Some(Err(ChunkError::InvalidFormat { .. }))
        ));
        assert!(stream.next().await.is_none());
        assert!(stream.is_terminated());
    }

    #[tokio::test]
    #[cfg(feature = "hash-blake3")]
    async fn test_chunk_stream_with_hashes() {
        let data: Vec<u8> = (0..1000).map(|i| (i % 256) as u8).collect();
        let config = ChunkConfig::raw(256)
            .unwrap()
            .with_hash_config(crate::config::HashConfig::enabled());

        let reader: &[u8] = &data;
        let chunks: Vec<_> = chunk_async(reader, config).collect().await;
        let chunks: Vec<Chunk> = chunks.into_iter().collect::<Result<_, _>>().unwrap();

        for chunk in &chunks {
            assert_eq!(chunk.hash, Some(crate::hash::Blake3Hasher::digest(&chunk.data)));
        }
    }
}
