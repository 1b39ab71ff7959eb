//! Chunk digest implementations.
//!
//! - [`Blake3Hasher`] - BLAKE3 digests (requires `hash-blake3` feature)

#[cfg(feature = "hash-blake3")]
mod blake3;

#[cfg(feature = "hash-blake3")]
pub use self::blake3::Blake3Hasher;
