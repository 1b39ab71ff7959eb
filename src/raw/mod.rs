//! Fixed-size chunking without parsing.

use bytes::Bytes;

use crate::chunker::Step;
use crate::error::ChunkError;

/// Splits the input into `target_size` pieces; the last one may be shorter.
#[derive(Debug)]
pub(crate) struct RawChunker {
    target_size: usize,
    done: bool,
}

impl RawChunker {
    pub(crate) fn new(target_size: usize) -> Self {
        Self {
            target_size,
            done: false,
        }
    }

    pub(crate) fn demand(&self) -> usize {
        if self.done { 0 } else { self.target_size }
    }

    pub(crate) fn feed(&mut self, input: &[u8]) -> Result<Step, ChunkError> {
        if self.done || input.is_empty() {
            self.done = true;
            return Ok(Step::End);
        }
        let data = Bytes::copy_from_slice(input);
        if input.len() < self.target_size {
            self.done = true;
            return Ok(Step::Final(data));
        }
        Ok(Step::Chunk(data))
    }
}
