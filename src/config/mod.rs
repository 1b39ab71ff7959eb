//! Configuration for chunking behavior.
//!
//! This module provides types to configure how a stream is chunked:
//!
//! - [`ChunkConfig`] - Target chunk size, source [`Format`], safety [`Limits`] and hashing
//! - [`Format`] - Which chunker variant to run (raw, MP3 frames, WAV)
//! - [`WavMode`] - Output layout for WAV sources
//! - [`Limits`] - Bounds applied to size fields read from the input
//! - [`HashConfig`] - Specifies whether to compute chunk digests
//!
//! # Example
//!
//! ```
//! use audiochunk::{ChunkConfig, HashConfig, WavMode};
//!
//! // 16 KiB MP3 chunks with the maximum bit reservoir
//! let config = ChunkConfig::mp3(16 * 1024, 511)?;
//!
//! // Self-contained WAV files with digests
//! let config = ChunkConfig::wav(8192, WavMode::Complete)?
//!     .with_hash_config(HashConfig::enabled());
//!
//! # Ok::<(), audiochunk::ChunkError>(())
//! ```

use std::fmt;
use std::str::FromStr;

use crate::error::ChunkError;

/// Default target chunk size (8 KiB).
pub const DEFAULT_TARGET_SIZE: usize = 8 * 1024;

/// Largest accepted target chunk size (64 MiB).
pub const MAX_TARGET_SIZE: usize = 64 * 1024 * 1024;

/// Largest possible MPEG Layer III bit reservoir in bytes.
pub const MAX_RESERVOIR: usize = 511;

/// Default bound on a single non-`data` RIFF chunk (512 KiB).
pub const DEFAULT_MAX_METADATA_CHUNK: u32 = 512 * 1024;

/// Default bound on the accumulated WAV header (8 MiB).
pub const DEFAULT_MAX_HEADER: usize = 8 * 1024 * 1024;

/// Default lower bound for the audio slice of a WAV chunk (1 KiB).
pub const DEFAULT_MIN_AUDIO_SLICE: usize = 1024;

/// Output layout for WAV sources.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum WavMode {
    /// Header once, at the front of the first chunk; later chunks are raw audio.
    #[default]
    Streaming,
    /// Every chunk is a complete WAV file with rewritten size fields.
    Complete,
}

impl WavMode {
    /// Returns the lowercase name used by [`FromStr`].
    pub fn as_str(&self) -> &'static str {
        match self {
            WavMode::Streaming => "streaming",
            WavMode::Complete => "complete",
        }
    }
}

impl FromStr for WavMode {
    type Err = ChunkError;

    /// Parses `"streaming"` or `"complete"` (ASCII case-insensitive).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("streaming") {
            Ok(WavMode::Streaming)
        } else if s.eq_ignore_ascii_case("complete") {
            Ok(WavMode::Complete)
        } else {
            Err(ChunkError::UnknownMode(s.to_owned()))
        }
    }
}

impl fmt::Display for WavMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The source format, which selects the chunker variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Format {
    /// Fixed-size splitting without parsing.
    Raw,
    /// MPEG Layer III frames with a bit-reservoir carryover of `reservoir` bytes.
    Mp3 {
        /// Trailing bytes of each chunk repeated at the start of the next.
        reservoir: usize,
    },
    /// RIFF/WAVE with the given output layout.
    Wav {
        /// Output layout.
        mode: WavMode,
    },
}

impl Default for Format {
    fn default() -> Self {
        Format::Mp3 {
            reservoir: MAX_RESERVOIR,
        }
    }
}

/// Bounds applied to size fields and slice sizes.
///
/// Size fields come straight from the input and are checked against these
/// bounds before anything is allocated for them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Limits {
    /// Largest accepted payload of a non-`data` RIFF chunk.
    pub max_metadata_chunk: u32,

    /// Largest accepted WAV header (everything before the audio payload).
    pub max_header: usize,

    /// Smallest audio slice a WAV chunk carries, regardless of header size.
    pub min_audio_slice: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self {
            max_metadata_chunk: DEFAULT_MAX_METADATA_CHUNK,
            max_header: DEFAULT_MAX_HEADER,
            min_audio_slice: DEFAULT_MIN_AUDIO_SLICE,
        }
    }
}

/// Configuration for format-aware chunking.
///
/// `ChunkConfig` binds a target chunk size to a [`Format`]. The target is a
/// soft size: MP3 chunks end on the first frame boundary at or past it (plus
/// the carried reservoir), WAV chunks hit it exactly except the last one.
///
/// # Example
///
/// ```
/// use audiochunk::{ChunkConfig, Format, WavMode};
///
/// let config = ChunkConfig::wav(8192, WavMode::Streaming)?;
/// assert_eq!(config.target_size(), 8192);
/// assert_eq!(config.format(), Format::Wav { mode: WavMode::Streaming });
///
/// // Reservoir requests above 511 bytes are clamped
/// let config = ChunkConfig::mp3(8192, 2048)?;
/// assert_eq!(config.format(), Format::Mp3 { reservoir: 511 });
/// # Ok::<(), audiochunk::ChunkError>(())
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ChunkConfig {
    /// Target chunk size in bytes.
    target_size: usize,

    /// Source format and its options.
    format: Format,

    /// Safety bounds.
    limits: Limits,

    /// Configuration for hashing behavior.
    hash_config: HashConfig,
}

impl ChunkConfig {
    /// Creates a new configuration.
    ///
    /// A reservoir above [`MAX_RESERVOIR`] is clamped to it.
    ///
    /// # Errors
    ///
    /// Returns [`ChunkError::InvalidConfig`] if `target_size` is zero or
    /// above [`MAX_TARGET_SIZE`].
    pub fn new(target_size: usize, format: Format) -> Result<Self, ChunkError> {
        let config = Self {
            target_size,
            format: clamp_reservoir(format),
            limits: Limits::default(),
            hash_config: HashConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Fixed-size chunks of `target_size` bytes.
    pub fn raw(target_size: usize) -> Result<Self, ChunkError> {
        Self::new(target_size, Format::Raw)
    }

    /// MP3 chunks of about `target_size` bytes carrying `reservoir` bytes forward.
    pub fn mp3(target_size: usize, reservoir: usize) -> Result<Self, ChunkError> {
        Self::new(target_size, Format::Mp3 { reservoir })
    }

    /// WAV chunks of `target_size` bytes in the given mode.
    pub fn wav(target_size: usize, mode: WavMode) -> Result<Self, ChunkError> {
        Self::new(target_size, Format::Wav { mode })
    }

    /// Sets the target chunk size.
    ///
    /// Note: This does not validate the configuration. Use [`ChunkConfig::validate`]
    /// to check if the configuration is valid.
    pub fn with_target_size(mut self, size: usize) -> Self {
        self.target_size = size;
        self
    }

    /// Sets the format. A reservoir above [`MAX_RESERVOIR`] is clamped.
    pub fn with_format(mut self, format: Format) -> Self {
        self.format = clamp_reservoir(format);
        self
    }

    /// Sets the safety bounds.
    ///
    /// # Example
    ///
    /// ```
    /// use audiochunk::{ChunkConfig, Limits, WavMode};
    ///
    /// let limits = Limits { max_metadata_chunk: 64 * 1024, ..Limits::default() };
    /// let config = ChunkConfig::wav(8192, WavMode::Complete)?.with_limits(limits);
    /// assert_eq!(config.limits().max_metadata_chunk, 64 * 1024);
    /// # Ok::<(), audiochunk::ChunkError>(())
    /// ```
    pub fn with_limits(mut self, limits: Limits) -> Self {
        self.limits = limits;
        self
    }

    /// Sets the hash configuration.
    pub fn with_hash_config(mut self, config: HashConfig) -> Self {
        self.hash_config = config;
        self
    }

    /// Returns the target chunk size.
    pub fn target_size(&self) -> usize {
        self.target_size
    }

    /// Returns the source format.
    pub fn format(&self) -> Format {
        self.format
    }

    /// Returns the safety bounds.
    pub fn limits(&self) -> &Limits {
        &self.limits
    }

    /// Returns the hash configuration.
    pub fn hash_config(&self) -> &HashConfig {
        &self.hash_config
    }

    /// Validates the current configuration.
    ///
    /// # Example
    ///
    /// ```
    /// use audiochunk::ChunkConfig;
    ///
    /// let config = ChunkConfig::default().with_target_size(0);
    /// assert!(config.validate().is_err());
    /// ```
    pub fn validate(&self) -> Result<(), ChunkError> {
        if self.target_size == 0 {
            return Err(ChunkError::InvalidConfig {
                message: "target chunk size must be non-zero",
            });
        }
        if self.target_size > MAX_TARGET_SIZE {
            return Err(ChunkError::InvalidConfig {
                message: "target chunk size exceeds MAX_TARGET_SIZE",
            });
        }
        if self.limits.min_audio_slice == 0 {
            return Err(ChunkError::InvalidConfig {
                message: "minimum audio slice must be non-zero",
            });
        }
        if self.limits.min_audio_slice > MAX_TARGET_SIZE {
            return Err(ChunkError::InvalidConfig {
                message: "minimum audio slice exceeds MAX_TARGET_SIZE",
            });
        }
        if self.limits.max_header < 12 {
            return Err(ChunkError::InvalidConfig {
                message: "maximum header size cannot hold a RIFF prologue",
            });
        }
        Ok(())
    }
}

impl Default for ChunkConfig {
    fn default() -> Self {
        Self {
            target_size: DEFAULT_TARGET_SIZE,
            format: Format::default(),
            limits: Limits::default(),
            hash_config: HashConfig::default(),
        }
    }
}

fn clamp_reservoir(format: Format) -> Format {
    match format {
        Format::Mp3 { reservoir } if reservoir > MAX_RESERVOIR => {
            tracing::warn!(
                requested = reservoir,
                max = MAX_RESERVOIR,
                "bit reservoir request clamped"
            );
            Format::Mp3 {
                reservoir: MAX_RESERVOIR,
            }
        }
        other => other,
    }
}

/// Configuration for chunk hashing behavior.
///
/// `HashConfig` controls whether BLAKE3 digests are computed for each emitted
/// chunk. Hashing is disabled by default.
///
/// # Example
///
/// ```
/// use audiochunk::HashConfig;
///
/// let config = HashConfig::enabled();
/// assert!(config.enabled);
///
/// let config = HashConfig::disabled();
/// assert!(!config.enabled);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct HashConfig {
    /// Whether to compute BLAKE3 digests for chunks.
    pub enabled: bool,
}

impl HashConfig {
    /// Creates a new hash configuration.
    pub const fn new(enabled: bool) -> Self {
        Self { enabled }
    }

    /// Enables hashing.
    pub const fn enabled() -> Self {
        Self { enabled: true }
    }

    /// Disables hashing.
    pub const fn disabled() -> Self {
        Self { enabled: false }
    }
}
