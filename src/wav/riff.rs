//! RIFF/WAVE chunk-list walker.
//!
//! Reads the `RIFF` prologue and every chunk before `data` into a header
//! buffer, stopping right after the `data` chunk's 8-byte descriptor. The
//! collected bytes are replayed in front of audio slices by the WAV chunker.

use crate::buffer::{HEADER_POOL, PooledBuffer};
use crate::config::Limits;
use crate::error::ChunkError;

/// RIFF container tag.
pub const RIFF_TAG: &[u8; 4] = b"RIFF";

/// WAVE form type.
pub const WAVE_TAG: &[u8; 4] = b"WAVE";

/// Audio payload chunk id.
pub const DATA_TAG: &[u8; 4] = b"data";

/// `RIFF` + size + `WAVE`.
pub const PROLOGUE_LEN: usize = 12;

/// Chunk id + size.
pub const CHUNK_HEADER_LEN: usize = 8;

/// Offset of the RIFF size field.
pub const RIFF_SIZE_OFFSET: usize = 4;

/// Where the audio payload sits, as found by the walker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct DataChunk {
    /// Declared audio length.
    pub size: u32,
    /// Offset of the `data` size field within the header.
    pub size_offset: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Phase {
    Prologue,
    ChunkHeader,
    Payload { size: u32 },
    Pad,
    Found(DataChunk),
}

/// Sans-IO RIFF walker.
#[derive(Debug)]
pub(crate) struct RiffWalker {
    phase: Phase,
    header: PooledBuffer,
    limits: Limits,
}

impl RiffWalker {
    pub(crate) fn new(limits: Limits) -> Self {
        Self {
            phase: Phase::Prologue,
            header: HEADER_POOL.take(),
            limits,
        }
    }

    /// Bytes needed before the next step; 0 once the data chunk is found.
    pub(crate) fn demand(&self) -> usize {
        match self.phase {
            Phase::Prologue => PROLOGUE_LEN,
            Phase::ChunkHeader => CHUNK_HEADER_LEN,
            Phase::Payload { size } => size as usize,
            Phase::Pad => 1,
            Phase::Found(_) => 0,
        }
    }

    /// Returns `true` before any byte has been consumed.
    pub(crate) fn at_start(&self) -> bool {
        self.phase == Phase::Prologue
    }

    /// Header bytes collected so far.
    pub(crate) fn header(&self) -> &[u8] {
        &self.header
    }

    /// Consumes exactly `demand()` bytes, or fewer at end of stream.
    pub(crate) fn feed(&mut self, input: &[u8]) -> Result<Option<DataChunk>, ChunkError> {
        match self.phase {
            Phase::Prologue => {
                if input.len() < PROLOGUE_LEN {
                    return Err(ChunkError::truncated("RIFF header", PROLOGUE_LEN, input.len()));
                }
                if &input[0..4] != RIFF_TAG {
                    return Err(ChunkError::InvalidFormat {
                        message: "missing RIFF signature",
                    });
                }
                if &input[8..12] != WAVE_TAG {
                    return Err(ChunkError::InvalidFormat {
                        message: "missing WAVE signature",
                    });
                }
                self.header.clear();
                self.header.extend_from_slice(input);
                self.phase = Phase::ChunkHeader;
                Ok(None)
            }
            Phase::ChunkHeader => {
                if input.is_empty() {
                    return Err(ChunkError::InvalidFormat {
                        message: "no data chunk found",
                    });
                }
                if input.len() < CHUNK_HEADER_LEN {
                    return Err(ChunkError::truncated(
                        "RIFF chunk header",
                        CHUNK_HEADER_LEN,
                        input.len(),
                    ));
                }
                self.check_header_room(CHUNK_HEADER_LEN)?;
                self.header.extend_from_slice(input);

                let size = read_u32_le(&input[4..8]);
                if &input[0..4] == DATA_TAG {
                    let data = DataChunk {
                        size,
                        size_offset: self.header.len() - 4,
                    };
                    tracing::debug!(
                        header_len = self.header.len(),
                        data_size = size,
                        "wav data chunk located"
                    );
                    self.phase = Phase::Found(data);
                    return Ok(Some(data));
                }

                tracing::trace!(
                    id = %String::from_utf8_lossy(&input[0..4]),
                    size,
                    "skipping riff chunk into header"
                );
                if size > self.limits.max_metadata_chunk {
                    return Err(ChunkError::ResourceLimit {
                        context: "RIFF chunk",
                        declared: u64::from(size),
                        limit: u64::from(self.limits.max_metadata_chunk),
                    });
                }
                self.check_header_room(size as usize)?;
                self.phase = match size {
                    0 => Phase::ChunkHeader,
                    size => Phase::Payload { size },
                };
                Ok(None)
            }
            Phase::Payload { size } => {
                if input.len() < size as usize {
                    return Err(ChunkError::truncated(
                        "RIFF chunk payload",
                        size as usize,
                        input.len(),
                    ));
                }
                self.header.extend_from_slice(input);
                self.phase = if size % 2 == 1 {
                    Phase::Pad
                } else {
                    Phase::ChunkHeader
                };
                Ok(None)
            }
            Phase::Pad => {
                // Some encoders drop the final pad byte
                self.header.extend_from_slice(input);
                self.phase = Phase::ChunkHeader;
                Ok(None)
            }
            Phase::Found(data) => Ok(Some(data)),
        }
    }

    /// Returns the header buffer to its pool.
    pub(crate) fn release(&mut self) {
        self.header.release();
    }

    fn check_header_room(&self, extra: usize) -> Result<(), ChunkError> {
        let declared = self.header.len() + extra;
        if declared > self.limits.max_header {
            return Err(ChunkError::ResourceLimit {
                context: "WAV header",
                declared: declared as u64,
                limit: self.limits.max_header as u64,
            });
        }
        Ok(())
    }
}

/// Reads a little-endian `u32` from the first four bytes of `bytes`.
pub(crate) fn read_u32_le(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

/// Overwrites four bytes at `offset` with `value` in little-endian order.
pub(crate) fn write_u32_le(buf: &mut [u8], offset: usize, value: u32) {
    buf[offset..offset + 4].copy_from_slice(&value.to_le_bytes());
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(walker: &mut RiffWalker, mut input: &[u8]) -> Result<DataChunk, ChunkError> {
        loop {
            let want = walker.demand().min(input.len());
            let (head, tail) = input.split_at(want);
            input = tail;
            if let Some(data) = walker.feed(head)? {
                return Ok(data);
            }
        }
    }

    fn chunk(id: &[u8; 4], payload: &[u8]) -> Vec<u8> {
        let mut out = id.to_vec();
        out.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        out.extend_from_slice(payload);
        if payload.len() % 2 == 1 {
            out.push(0);
        }
        out
    }

    fn prologue() -> Vec<u8> {
        let mut out = b"RIFF".to_vec();
        out.extend_from_slice(&0u32.to_le_bytes());
        out.extend_from_slice(b"WAVE");
        out
    }

    #[test]
    fn test_finds_data_after_fmt() {
        let mut bytes = prologue();
        bytes.extend(chunk(b"fmt ", &[1u8; 16]));
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&1000u32.to_le_bytes());

        let mut walker = RiffWalker::new(Limits::default());
        let data = walk(&mut walker, &bytes).unwrap();
        assert_eq!(data.size, 1000);
        assert_eq!(data.size_offset, 40);
        assert_eq!(walker.header(), &bytes[..]);
        assert_eq!(walker.demand(), 0);
    }

    #[test]
    fn test_odd_chunk_is_padded() {
        let mut bytes = prologue();
        bytes.extend(chunk(b"LIST", b"abc"));
        bytes.extend_from_slice(b"data\x04\x00\x00\x00");

        let mut walker = RiffWalker::new(Limits::default());
        let data = walk(&mut walker, &bytes).unwrap();
        assert_eq!(data.size, 4);
        // 12 prologue + 8 + 3 + 1 pad + 8
        assert_eq!(walker.header().len(), 32);
    }

    #[test]
    fn test_rejects_bad_signatures() {
        let mut walker = RiffWalker::new(Limits::default());
        let err = walk(&mut walker, b"RIFX\x00\x00\x00\x00WAVE").unwrap_err();
        assert!(matches!(err, ChunkError::InvalidFormat { message } if message.contains("RIFF")));

        let mut walker = RiffWalker::new(Limits::default());
        let err = walk(&mut walker, b"RIFF\x00\x00\x00\x00AVI ").unwrap_err();
        assert!(matches!(err, ChunkError::InvalidFormat { message } if message.contains("WAVE")));
    }

    #[test]
    fn test_oversized_chunk_rejected() {
        let mut bytes = prologue();
        bytes.extend_from_slice(b"LIST");
        bytes.extend_from_slice(&(1024u32 * 1024).to_le_bytes());

        let mut walker = RiffWalker::new(Limits::default());
        let err = walk(&mut walker, &bytes).unwrap_err();
        assert!(matches!(
            err,
            ChunkError::ResourceLimit {
                declared: 1_048_576,
                ..
            }
        ));
    }

    #[test]
    fn test_header_cap() {
        let limits = Limits {
            max_header: 64,
            ..Limits::default()
        };
        let mut bytes = prologue();
        bytes.extend(chunk(b"junk", &[0u8; 60]));
        bytes.extend_from_slice(b"data\x00\x00\x00\x00");

        let mut walker = RiffWalker::new(limits);
        let err = walk(&mut walker, &bytes).unwrap_err();
        assert!(matches!(
            err,
            ChunkError::ResourceLimit {
                context: "WAV header",
                ..
            }
        ));
    }

    #[test]
    fn test_truncated_payload() {
        let mut bytes = prologue();
        bytes.extend_from_slice(b"fmt \x10\x00\x00\x00");
        bytes.extend_from_slice(&[0u8; 6]);

        let mut walker = RiffWalker::new(Limits::default());
        let err = walk(&mut walker, &bytes).unwrap_err();
        assert!(matches!(
            err,
            ChunkError::TruncatedInput {
                expected: 16,
                actual: 6,
                ..
            }
        ));
    }

    #[test]
    fn test_missing_data_chunk() {
        let mut bytes = prologue();
        bytes.extend(chunk(b"fmt ", &[0u8; 16]));

        let mut walker = RiffWalker::new(Limits::default());
        let err = walk(&mut walker, &bytes).unwrap_err();
        assert!(matches!(err, ChunkError::InvalidFormat { .. }));
    }

    #[test]
    fn test_missing_final_pad_tolerated() {
        let mut bytes = prologue();
        bytes.extend_from_slice(b"LIST\x03\x00\x00\x00abc");

        let mut walker = RiffWalker::new(Limits::default());
        // Pad byte absent: the walker moves on and then misses the data chunk
        let err = walk(&mut walker, &bytes).unwrap_err();
        assert!(matches!(err, ChunkError::InvalidFormat { message } if message.contains("data")));
        assert_eq!(walker.header().len(), 23);
    }

    #[test]
    fn test_le_helpers() {
        let mut buf = [0u8; 8];
        write_u32_le(&mut buf, 4, 0x0102_0304);
        assert_eq!(buf, [0, 0, 0, 0, 4, 3, 2, 1]);
        assert_eq!(read_u32_le(&buf[4..]), 0x0102_0304);
    }
}
