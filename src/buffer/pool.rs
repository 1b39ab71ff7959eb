//! Process-wide buffer pools for efficient memory reuse.
//!
//! Chunkers are created and dropped per stream, often many at a time on
//! different threads, so the pools are shared rather than thread-local.
//! Neither acquisition nor release ever waits on the lock: a contended pool
//! behaves like an empty one (acquire) or a full one (release).

use std::ops::Deref;
use std::sync::Mutex;

/// Capacity of pooled header buffers.
pub const HEADER_BUFFER_SIZE: usize = 512;

/// Capacity of pooled payload buffers (the default chunk size).
pub const PAYLOAD_BUFFER_SIZE: usize = crate::config::DEFAULT_TARGET_SIZE;

/// Maximum number of idle buffers kept per pool.
pub const MAX_POOL_SIZE: usize = 64;

/// Pool for WAV header accumulation.
pub static HEADER_POOL: BufferPool = BufferPool::new(HEADER_BUFFER_SIZE, MAX_POOL_SIZE);

/// Pool for read scratch space.
pub static PAYLOAD_POOL: BufferPool = BufferPool::new(PAYLOAD_BUFFER_SIZE, MAX_POOL_SIZE);

/// A set of idle, equally sized byte buffers.
pub struct BufferPool {
    idle: Mutex<Vec<Vec<u8>>>,
    buffer_size: usize,
    max_idle: usize,
}

impl BufferPool {
    /// Creates an empty pool handing out buffers of `buffer_size` capacity.
    pub const fn new(buffer_size: usize, max_idle: usize) -> Self {
        Self {
            idle: Mutex::new(Vec::new()),
            buffer_size,
            max_idle,
        }
    }

    /// Takes a buffer from the pool or allocates a new one.
    pub fn take(&'static self) -> PooledBuffer {
        let reused = match self.idle.try_lock() {
            Ok(mut idle) => idle.pop(),
            Err(_) => None,
        };
        let data = reused.unwrap_or_else(|| Vec::with_capacity(self.buffer_size));
        PooledBuffer {
            data: Some(data),
            pool: Some(self),
        }
    }

    /// Number of idle buffers currently held.
    #[cfg(test)]
    pub fn idle(&self) -> usize {
        self.idle.try_lock().map(|idle| idle.len()).unwrap_or(0)
    }

    fn give_back(&self, mut data: Vec<u8>) {
        if data.capacity() != self.buffer_size {
            return;
        }
        data.clear();
        if let Ok(mut idle) = self.idle.try_lock() {
            if idle.len() < self.max_idle {
                idle.push(data);
            }
        }
    }
}

/// A byte buffer borrowed from a [`BufferPool`].
///
/// The storage goes back to its pool on [`release`](Self::release) or when the
/// handle is dropped, whichever happens first. Growing past the pool's buffer
/// size detaches the handle: the grown storage is freed instead of pooled.
pub struct PooledBuffer {
    data: Option<Vec<u8>>,
    pool: Option<&'static BufferPool>,
}

impl PooledBuffer {
    /// Clears the buffer without deallocating.
    pub fn clear(&mut self) {
        if let Some(data) = self.data.as_mut() {
            data.clear();
        }
    }

    /// Appends `bytes`, detaching from the pool if the buffer has to grow.
    pub fn extend_from_slice(&mut self, bytes: &[u8]) {
        let Some(data) = self.data.as_mut() else {
            return;
        };
        if data.len() + bytes.len() > data.capacity() {
            self.pool = None;
        }
        data.extend_from_slice(bytes);
    }

    /// Resizes the buffer to exactly `len` bytes and returns it for filling.
    ///
    /// Sizes beyond the current capacity swap the pooled storage for a fresh,
    /// unpooled allocation. Existing contents are not preserved in that case.
    pub fn prepare(&mut self, len: usize) -> &mut [u8] {
        let Some(data) = self.data.as_mut() else {
            return &mut [];
        };
        if len > data.capacity() {
            let old = std::mem::replace(data, vec![0; len]);
            if let Some(pool) = self.pool.take() {
                pool.give_back(old);
            }
        } else {
            data.resize(len, 0);
        }
        data.as_mut_slice()
    }

    /// Returns the storage to its pool. Calling this more than once is a no-op.
    pub fn release(&mut self) {
        if let Some(data) = self.data.take() {
            if let Some(pool) = self.pool.take() {
                pool.give_back(data);
            }
        }
    }

    /// Returns `true` once the storage has been released.
    pub fn is_released(&self) -> bool {
        self.data.is_none()
    }

    /// Returns `true` while the storage is still owned by a pool.
    #[cfg(test)]
    pub fn is_pooled(&self) -> bool {
        self.pool.is_some()
    }
}

impl Deref for PooledBuffer {
    type Target = [u8];

    fn deref(&self) -> &[u8] {
        self.data.as_deref().unwrap_or(&[])
    }
}

impl Drop for PooledBuffer {
    fn drop(&mut self) {
        self.release();
    }
}

impl std::fmt::Debug for PooledBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PooledBuffer")
            .field("len", &self.len())
            .field("pooled", &self.pool.is_some())
            .field("released", &self.is_released())
            .finish()
    }
}
