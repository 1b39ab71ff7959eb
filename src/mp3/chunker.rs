//! MP3 frame chunker.
//!
//! Scans for frame headers, accumulates whole frames up to the target size,
//! and starts every chunk with the tail of the previous one. Layer III frames
//! may reference up to 511 bytes of main data that precede their own header
//! (the bit reservoir); repeating that tail lets a decoder start on any chunk.

use bytes::Bytes;

use super::header::{FrameHeader, HEADER_LEN, MAX_FRAME_LEN};
use crate::chunker::Step;
use crate::config::{DEFAULT_TARGET_SIZE, MAX_RESERVOIR};
use crate::error::ChunkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Looking for the next valid header.
    Sync,
    /// Reading the rest of a frame.
    Body { remaining: usize },
    /// Nothing more to read.
    Done,
}

/// Sans-IO MP3 chunking state machine.
#[derive(Debug)]
pub(crate) struct Mp3Chunker {
    target_size: usize,
    reservoir_cap: usize,
    phase: Phase,
    /// Sliding sync window; `window[..window_len]` is live.
    window: [u8; 4],
    window_len: usize,
    /// Chunk in progress: carried reservoir followed by whole frames.
    chunk: Vec<u8>,
    /// Length of the reservoir prefix of `chunk`.
    carried: usize,
    /// Start of the frame being read within `chunk`.
    frame_start: usize,
    frames: u64,
    skipped: u64,
    /// Bytes skipped since the last valid header.
    skipped_run: u64,
}

impl Mp3Chunker {
    pub(crate) fn new(target_size: usize, reservoir: usize) -> Self {
        let reservoir_cap = reservoir.min(MAX_RESERVOIR);
        Self {
            target_size,
            reservoir_cap,
            phase: Phase::Sync,
            window: [0; 4],
            window_len: 0,
            chunk: Vec::with_capacity(
                target_size
                    .min(DEFAULT_TARGET_SIZE)
                    .saturating_add(reservoir_cap + MAX_FRAME_LEN),
            ),
            carried: 0,
            frame_start: 0,
            frames: 0,
            skipped: 0,
            skipped_run: 0,
        }
    }

    /// Bytes needed before the next step.
    pub(crate) fn demand(&self) -> usize {
        match self.phase {
            Phase::Sync => HEADER_LEN - self.window_len,
            Phase::Body { remaining } => remaining,
            Phase::Done => 0,
        }
    }

    /// Consumes exactly `demand()` bytes, or fewer at end of stream.
    pub(crate) fn feed(&mut self, input: &[u8]) -> Result<Step, ChunkError> {
        let wanted = self.demand();
        match self.phase {
            Phase::Done => Ok(Step::End),
            Phase::Sync => {
                if input.len() < wanted {
                    self.skipped += (self.window_len + input.len()) as u64;
                    return self.finish(None);
                }
                self.window[self.window_len..].copy_from_slice(input);
                self.window_len = HEADER_LEN;
                if let Some(header) = self.resync() {
                    self.frame_start = self.chunk.len();
                    self.chunk.extend_from_slice(&self.window);
                    self.window_len = 0;
                    self.phase = Phase::Body {
                        remaining: header.frame_len() - HEADER_LEN,
                    };
                }
                Ok(Step::Pending)
            }
            Phase::Body { .. } => {
                self.chunk.extend_from_slice(input);
                if input.len() < wanted {
                    tracing::debug!(
                        missing = wanted - input.len(),
                        "stream ended inside an mp3 frame"
                    );
                    let got = self.chunk.len() - self.frame_start;
                    self.chunk.truncate(self.frame_start);
                    return self.finish(Some((got + wanted - input.len(), got)));
                }
                self.frames += 1;
                self.phase = Phase::Sync;
                if self.chunk.len() >= self.target_size {
                    Ok(Step::Chunk(self.emit()))
                } else {
                    Ok(Step::Pending)
                }
            }
        }
    }

    /// Slides the full window until it holds a valid header or runs short.
    fn resync(&mut self) -> Option<FrameHeader> {
        loop {
            if self.window_len < HEADER_LEN {
                return None;
            }
            if let Some(header) = FrameHeader::parse(self.window) {
                if self.skipped_run > 0 {
                    tracing::debug!(
                        skipped = self.skipped_run,
                        total_skipped = self.skipped,
                        "mp3 frame sync recovered"
                    );
                    self.skipped_run = 0;
                }
                return Some(header);
            }
            // Drop everything up to the next 0xFF candidate
            let shift = self.window[1..]
                .iter()
                .position(|&b| b == 0xFF)
                .map_or(HEADER_LEN, |i| i + 1);
            self.window.copy_within(shift.., 0);
            self.window_len -= shift;
            self.skipped += shift as u64;
            self.skipped_run += shift as u64;
        }
    }

    /// Flushes what is left at end of stream.
    ///
    /// `truncated` carries the (expected, actual) length of a frame the
    /// stream ended in.
    fn finish(&mut self, truncated: Option<(usize, usize)>) -> Result<Step, ChunkError> {
        self.phase = Phase::Done;
        if self.chunk.len() > self.carried {
            return Ok(Step::Final(self.emit()));
        }
        if let Some((expected, actual)) = truncated {
            return Err(ChunkError::truncated("mp3 frame", expected, actual));
        }
        if self.frames == 0 && self.skipped > 0 {
            return Err(ChunkError::InvalidFormat {
                message: "no MPEG audio frame found",
            });
        }
        Ok(Step::End)
    }

    /// Emits the chunk in progress and seeds the next one with its tail.
    fn emit(&mut self) -> Bytes {
        let keep = self.chunk.len().min(self.reservoir_cap);
        let mut next = Vec::with_capacity(self.chunk.capacity());
        next.extend_from_slice(&self.chunk[self.chunk.len() - keep..]);
        let data = std::mem::replace(&mut self.chunk, next);
        self.carried = keep;
        self.frame_start = keep;
        tracing::debug!(
            len = data.len(),
            reservoir = keep,
            frames = self.frames,
            "mp3 chunk ready"
        );
        Bytes::from(data)
    }
}
