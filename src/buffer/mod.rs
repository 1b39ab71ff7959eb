//! Internal buffer management.
//!
//! This module provides shared buffer pools for header accumulation and read
//! scratch space. It is an implementation detail and not part of the public
//! API.

mod pool;

pub(crate) use pool::{HEADER_POOL, PAYLOAD_POOL, PooledBuffer};
