//! Chunking engine for processing audio streams.
//!
//! - [`Chunker`] - Configures and starts chunking operations
//! - [`ChunkIter`] - Iterator over a [`std::io::Read`] source
//!
//! Format engines are sans-IO; the drivers here and in the async module
//! feed them.

mod engine;
mod iter;

pub(crate) use engine::{Session, Step};
pub use iter::{ChunkIter, Chunker};
