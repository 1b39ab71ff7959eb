//! Async streaming support for chunking.
//!
//! Uses the `futures-io::AsyncRead` trait, so it runs on tokio, async-std,
//! smol or any other runtime.
//!
//! - [`chunk_async`] - Creates an async stream of chunks from an async reader
//!
//! This module requires the `async-io` feature to be enabled.

mod stream;

pub use stream::{ChunkStream, chunk_async};
