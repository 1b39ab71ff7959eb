//! WAV chunker.
//!
//! Streaming mode sends the header once, ahead of the first audio slice.
//! Complete mode prefixes every slice with the header and patches the RIFF
//! and `data` size fields so each chunk is a playable file on its own.

use bytes::Bytes;

use super::riff::{DataChunk, RIFF_SIZE_OFFSET, RiffWalker, write_u32_le};
use crate::chunker::Step;
use crate::config::{Limits, WavMode};
use crate::error::ChunkError;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    /// Walking the chunk list up to `data`.
    Header,
    /// Slicing the audio payload.
    Audio,
    /// Draining the pad byte after an odd-sized payload.
    Pad,
    Done,
}

/// Sans-IO WAV chunking state machine.
#[derive(Debug)]
pub(crate) struct WavChunker {
    mode: WavMode,
    target_size: usize,
    min_slice: usize,
    walker: RiffWalker,
    data: Option<DataChunk>,
    phase: Phase,
    /// Declared audio bytes not yet consumed.
    remaining: u32,
    header_sent: bool,
}

impl WavChunker {
    pub(crate) fn new(target_size: usize, mode: WavMode, limits: Limits) -> Self {
        Self {
            mode,
            target_size,
            min_slice: limits.min_audio_slice,
            walker: RiffWalker::new(limits),
            data: None,
            phase: Phase::Header,
            remaining: 0,
            header_sent: false,
        }
    }

    /// Bytes needed before the next step.
    pub(crate) fn demand(&self) -> usize {
        match self.phase {
            Phase::Header => self.walker.demand(),
            Phase::Audio => self.slice_len(),
            Phase::Pad => 1,
            Phase::Done => 0,
        }
    }

    /// Consumes exactly `demand()` bytes, or fewer at end of stream.
    pub(crate) fn feed(&mut self, input: &[u8]) -> Result<Step, ChunkError> {
        match self.phase {
            Phase::Header => {
                if self.walker.at_start() && input.is_empty() {
                    self.phase = Phase::Done;
                    return Ok(Step::End);
                }
                if let Some(data) = self.walker.feed(input)? {
                    self.data = Some(data);
                    self.remaining = data.size;
                    self.phase = if data.size == 0 {
                        Phase::Done
                    } else {
                        Phase::Audio
                    };
                }
                Ok(Step::Pending)
            }
            Phase::Audio => {
                let wanted = self.slice_len();
                if input.is_empty() {
                    tracing::warn!(
                        missing = self.remaining,
                        "wav stream ended before declared audio length"
                    );
                    self.phase = Phase::Done;
                    return Ok(Step::End);
                }

                let chunk = self.build(input);
                self.remaining -= input.len() as u32;
                if input.len() < wanted {
                    tracing::warn!(
                        missing = self.remaining,
                        "wav stream ended before declared audio length"
                    );
                    self.phase = Phase::Done;
                    return Ok(Step::Final(chunk));
                }
                if self.remaining == 0 {
                    self.phase = if self.data.is_some_and(|d| d.size % 2 == 1) {
                        Phase::Pad
                    } else {
                        Phase::Done
                    };
                }
                Ok(Step::Chunk(chunk))
            }
            Phase::Pad | Phase::Done => {
                self.phase = Phase::Done;
                Ok(Step::End)
            }
        }
    }

    /// Returns the header buffer to its pool.
    pub(crate) fn release(&mut self) {
        self.walker.release();
    }

    /// Audio bytes the next chunk carries.
    fn slice_len(&self) -> usize {
        let header_len = self.walker.header().len();
        let budget = match (self.mode, self.header_sent) {
            (WavMode::Streaming, true) => self.target_size,
            (WavMode::Streaming, false) => match self.target_size.saturating_sub(header_len) {
                0 => self.min_slice,
                n => n,
            },
            (WavMode::Complete, _) => self
                .target_size
                .saturating_sub(header_len)
                .max(self.min_slice),
        };
        budget.min(self.remaining as usize)
    }

    fn build(&mut self, audio: &[u8]) -> Bytes {
        let header = self.walker.header();
        let out = match self.mode {
            WavMode::Streaming if self.header_sent => Bytes::copy_from_slice(audio),
            WavMode::Streaming => {
                let mut out = Vec::with_capacity(header.len() + audio.len());
                out.extend_from_slice(header);
                out.extend_from_slice(audio);
                Bytes::from(out)
            }
            WavMode::Complete => {
                let mut out = Vec::with_capacity(header.len() + audio.len());
                out.extend_from_slice(header);
                out.extend_from_slice(audio);
                if let Some(data) = self.data {
                    write_u32_le(&mut out, data.size_offset, audio.len() as u32);
                }
                let riff_size = (out.len() - 8) as u32;
                write_u32_le(&mut out, RIFF_SIZE_OFFSET, riff_size);
                Bytes::from(out)
            }
        };
        tracing::debug!(
            mode = %self.mode,
            len = out.len(),
            audio = audio.len(),
            remaining = self.remaining as usize - audio.len(),
            "wav chunk ready"
        );
        self.header_sent = true;
        out
    }
}
