//! Chunk types.
//!
//! - [`Chunk`] - Emitted unit with data, sequence number, digest
//! - [`ChunkHash`] - 32-byte BLAKE3 digest

mod data;
mod hash;

pub use data::Chunk;
pub use hash::ChunkHash;
