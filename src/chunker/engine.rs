//! Format engines and the session that latches their outcome.
//!
//! Engines are sans-IO: each one states how many bytes it needs next
//! ([`Engine::demand`]) and consumes exactly that many ([`Engine::feed`]).
//! A shorter slice means the source is exhausted. Drivers own the reader
//! and fill the demanded length; the [`Session`] owns everything else.

use bytes::Bytes;

use crate::buffer::{PAYLOAD_POOL, PooledBuffer};
use crate::chunk::{Chunk, ChunkHash};
use crate::config::{ChunkConfig, Format};
use crate::error::ChunkError;
use crate::mp3::Mp3Chunker;
use crate::raw::RawChunker;
use crate::wav::WavChunker;

/// Outcome of feeding an engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum Step {
    /// More input is needed.
    Pending,
    /// A chunk is ready; more may follow.
    Chunk(Bytes),
    /// The last chunk; the source is exhausted.
    Final(Bytes),
    /// The source is exhausted and nothing is left to emit.
    End,
}

/// The chunker variant, selected once from [`Format`].
#[derive(Debug)]
pub(crate) enum Engine {
    Raw(RawChunker),
    Mp3(Mp3Chunker),
    Wav(WavChunker),
}

impl Engine {
    pub(crate) fn new(config: &ChunkConfig) -> Self {
        let target = config.target_size();
        match config.format() {
            Format::Raw => Engine::Raw(RawChunker::new(target)),
            Format::Mp3 { reservoir } => Engine::Mp3(Mp3Chunker::new(target, reservoir)),
            Format::Wav { mode } => Engine::Wav(WavChunker::new(target, mode, *config.limits())),
        }
    }

    pub(crate) fn demand(&self) -> usize {
        match self {
            Engine::Raw(c) => c.demand(),
            Engine::Mp3(c) => c.demand(),
            Engine::Wav(c) => c.demand(),
        }
    }

    pub(crate) fn feed(&mut self, input: &[u8]) -> Result<Step, ChunkError> {
        match self {
            Engine::Raw(c) => c.feed(input),
            Engine::Mp3(c) => c.feed(input),
            Engine::Wav(c) => c.feed(input),
        }
    }

    fn release(&mut self) {
        if let Engine::Wav(c) = self {
            c.release();
        }
    }

    fn name(&self) -> &'static str {
        match self {
            Engine::Raw(_) => "raw",
            Engine::Mp3(_) => "mp3",
            Engine::Wav(_) => "wav",
        }
    }
}

/// Terminal-state latch. Only the pull path moves it out of `Active`.
#[derive(Debug)]
enum State {
    Active,
    Exhausted,
    Failed(ChunkError),
}

/// An engine bound to one stream: latch, scratch buffer, counters.
#[derive(Debug)]
pub(crate) struct Session {
    engine: Engine,
    state: State,
    scratch: PooledBuffer,
    sequence: u64,
    bytes_read: u64,
    hash: bool,
}

impl Session {
    pub(crate) fn new(config: &ChunkConfig) -> Self {
        // Engines are only built from a validated config
        let (engine, state) = match config.validate() {
            Ok(()) => (Engine::new(config), State::Active),
            Err(e) => (Engine::Raw(RawChunker::new(0)), State::Failed(e)),
        };
        tracing::debug!(
            format = engine.name(),
            target = config.target_size(),
            "chunker created"
        );
        let mut session = Self {
            engine,
            state,
            scratch: PAYLOAD_POOL.take(),
            sequence: 0,
            bytes_read: 0,
            hash: config.hash_config().enabled,
        };
        if !session.is_active() {
            session.release();
        }
        session
    }

    /// The latched result, once the session is no longer active.
    pub(crate) fn terminal(&self) -> Option<Result<Option<Chunk>, ChunkError>> {
        match &self.state {
            State::Active => None,
            State::Exhausted => Some(Ok(None)),
            State::Failed(e) => Some(Err(e.clone())),
        }
    }

    pub(crate) fn is_active(&self) -> bool {
        matches!(self.state, State::Active)
    }

    /// Scratch space sized to what the engine needs next.
    ///
    /// Bytes already written stay in place across calls while the demand is
    /// unchanged, so a driver may fill it over several reads.
    pub(crate) fn input(&mut self) -> &mut [u8] {
        let want = self.engine.demand();
        self.scratch.prepare(want)
    }

    /// Runs the engine over the first `filled` bytes of the scratch space.
    ///
    /// Returns `None` when the engine wants more input.
    pub(crate) fn advance(&mut self, filled: usize) -> Option<Result<Option<Chunk>, ChunkError>> {
        self.bytes_read += filled as u64;
        match self.engine.feed(&self.scratch[..filled]) {
            Ok(Step::Pending) => None,
            Ok(Step::Chunk(data)) => Some(Ok(Some(self.emit(data)))),
            Ok(Step::Final(data)) => {
                let chunk = self.emit(data);
                self.finish();
                Some(Ok(Some(chunk)))
            }
            Ok(Step::End) => {
                self.finish();
                Some(Ok(None))
            }
            Err(e) => Some(Err(self.fail(e))),
        }
    }

    /// Latches `err` and releases buffers.
    pub(crate) fn fail(&mut self, err: ChunkError) -> ChunkError {
        tracing::debug!(
            format = self.engine.name(),
            error = %err,
            bytes_read = self.bytes_read,
            "chunker failed"
        );
        self.state = State::Failed(err.clone());
        self.release();
        err
    }

    /// Ends the session early. Idempotent.
    pub(crate) fn close(&mut self) {
        if self.is_active() {
            self.state = State::Exhausted;
        }
        self.release();
    }

    pub(crate) fn bytes_read(&self) -> u64 {
        self.bytes_read
    }

    fn finish(&mut self) {
        tracing::debug!(
            format = self.engine.name(),
            chunks = self.sequence,
            bytes_read = self.bytes_read,
            "chunker exhausted"
        );
        self.state = State::Exhausted;
        self.release();
    }

    fn release(&mut self) {
        if !self.scratch.is_released() {
            tracing::trace!(format = self.engine.name(), "releasing pooled buffers");
        }
        self.scratch.release();
        self.engine.release();
    }

    fn emit(&mut self, data: Bytes) -> Chunk {
        let hash = self.compute_hash(&data);
        let chunk = Chunk {
            data,
            sequence: self.sequence,
            hash,
        };
        self.sequence += 1;
        chunk
    }

    /// Computes the digest for the given data if hashing is enabled.
    fn compute_hash(&self, data: &[u8]) -> Option<ChunkHash> {
        if !self.hash {
            return None;
        }
        #[cfg(feature = "hash-blake3")]
        return Some(crate::hash::Blake3Hasher::digest(data));
        #[cfg(not(feature = "hash-blake3"))]
        {
            let _ = data;
            None
        }
    }
}
