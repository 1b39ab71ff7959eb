//! The Chunk type - one independently transportable unit of output.

use bytes::Bytes;
use std::fmt;

use super::ChunkHash;

/// A self-contained piece of the output stream.
///
/// For MP3 sources the data starts on a frame boundary (after the carried
/// bit reservoir); for WAV sources in complete mode it is a whole WAV file.
///
/// # Example
///
/// ```
/// use audiochunk::Chunk;
/// use bytes::Bytes;
///
/// let chunk = Chunk::new(Bytes::from_static(b"RIFF"), 0);
/// assert_eq!(chunk.len(), 4);
/// assert_eq!(chunk.sequence(), 0);
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Chunk {
    /// The chunk bytes.
    pub data: Bytes,

    /// Zero-based position of this chunk in the output sequence.
    pub sequence: u64,

    /// Digest of `data` (if computed).
    pub hash: Option<ChunkHash>,
}

impl Chunk {
    /// Creates a new chunk without a digest.
    pub fn new(data: impl Into<Bytes>, sequence: u64) -> Self {
        Self {
            data: data.into(),
            sequence,
            hash: None,
        }
    }

    /// Returns the length of the chunk data.
    pub fn len(&self) -> usize {
        self.data.len()
    }

    /// Returns true if the chunk has no data.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Returns a reference to the chunk data.
    pub fn data(&self) -> &Bytes {
        &self.data
    }

    /// Returns the sequence number.
    pub fn sequence(&self) -> u64 {
        self.sequence
    }

    /// Returns the digest, if computed.
    pub fn hash(&self) -> Option<ChunkHash> {
        self.hash
    }

    /// Consumes the chunk and returns the underlying data.
    pub fn into_data(self) -> Bytes {
        self.data
    }
}

impl AsRef<[u8]> for Chunk {
    fn as_ref(&self) -> &[u8] {
        &self.data
    }
}

impl fmt::Display for Chunk {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Chunk #{} ({} bytes", self.sequence, self.len())?;
        if let Some(hash) = self.hash {
            write!(f, ", hash={}", hash)?;
        }
        write!(f, ")")
    }
}
