//! BLAKE3 chunk digests.

use crate::chunk::ChunkHash;

/// Computes BLAKE3 digests of emitted chunks.
#[derive(Debug, Clone, Copy, Default)]
pub struct Blake3Hasher;

impl Blake3Hasher {
    /// Digest of `data` in one shot.
    pub fn digest(data: &[u8]) -> ChunkHash {
        ChunkHash::new(blake3::hash(data).into())
    }
}
