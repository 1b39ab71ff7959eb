//! MPEG audio Layer III frame header codec.
//!
//! A frame header is 32 bits:
//!
//! ```text
//! AAAAAAAA AAABBCCD EEEEFFGH IIJJKLMM
//! A sync (all ones)      E bitrate index
//! B version              F sample-rate index
//! C layer                G padding
//! D protection           M emphasis
//! ```
//!
//! Only Layer III is accepted. Reserved or free-format field values make the
//! header invalid, which the scanner treats as a false sync.

/// MPEG audio version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MpegVersion {
    /// MPEG-1 (ISO 11172-3).
    Mpeg1,
    /// MPEG-2 LSF (ISO 13818-3).
    Mpeg2,
    /// MPEG-2.5 (unofficial low sample-rate extension).
    Mpeg25,
}

/// Bitrates in kbit/s for MPEG-1 Layer III, by index. 0 and 15 are invalid.
const BITRATES_V1: [u32; 16] = [
    0, 32, 40, 48, 56, 64, 80, 96, 112, 128, 160, 192, 224, 256, 320, 0,
];

/// Bitrates in kbit/s for MPEG-2/2.5 Layer III, by index.
const BITRATES_V2: [u32; 16] = [
    0, 8, 16, 24, 32, 40, 48, 56, 64, 80, 96, 112, 128, 144, 160, 0,
];

const SAMPLE_RATES_V1: [u32; 4] = [44100, 48000, 32000, 0];
const SAMPLE_RATES_V2: [u32; 4] = [22050, 24000, 16000, 0];
const SAMPLE_RATES_V25: [u32; 4] = [11025, 12000, 8000, 0];

/// Smallest frame any valid header describes.
pub const MIN_FRAME_LEN: usize = 24;

/// Upper bound on frame length across MPEG audio layers.
pub const MAX_FRAME_LEN: usize = 1732;

/// Size of a frame header in bytes.
pub const HEADER_LEN: usize = 4;

impl MpegVersion {
    fn from_bits(bits: u8) -> Option<Self> {
        match bits {
            0b11 => Some(MpegVersion::Mpeg1),
            0b10 => Some(MpegVersion::Mpeg2),
            0b00 => Some(MpegVersion::Mpeg25),
            _ => None,
        }
    }

    fn bitrates(self) -> &'static [u32; 16] {
        match self {
            MpegVersion::Mpeg1 => &BITRATES_V1,
            MpegVersion::Mpeg2 | MpegVersion::Mpeg25 => &BITRATES_V2,
        }
    }

    fn sample_rates(self) -> &'static [u32; 4] {
        match self {
            MpegVersion::Mpeg1 => &SAMPLE_RATES_V1,
            MpegVersion::Mpeg2 => &SAMPLE_RATES_V2,
            MpegVersion::Mpeg25 => &SAMPLE_RATES_V25,
        }
    }

    /// Bytes per kbit/s per Hz, i.e. `samples_per_frame / 8`.
    fn multiplier(self) -> u32 {
        match self {
            MpegVersion::Mpeg1 => 144,
            MpegVersion::Mpeg2 | MpegVersion::Mpeg25 => 72,
        }
    }
}

/// A validated Layer III frame header.
///
/// # Example
///
/// ```
/// use audiochunk::{FrameHeader, MpegVersion};
///
/// // MPEG-1 Layer III, 128 kbit/s, 44.1 kHz, no padding
/// let header = FrameHeader::parse([0xFF, 0xFB, 0x90, 0x00]).unwrap();
/// assert_eq!(header.version(), MpegVersion::Mpeg1);
/// assert_eq!(header.bitrate_kbps(), 128);
/// assert_eq!(header.sample_rate(), 44100);
/// assert_eq!(header.frame_len(), 417);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct FrameHeader {
    version: MpegVersion,
    bitrate_kbps: u32,
    sample_rate: u32,
    padding: bool,
}

impl FrameHeader {
    /// Parses and validates four header bytes.
    ///
    /// Returns `None` for anything but a Layer III header with legal field
    /// values.
    pub fn parse(bytes: [u8; 4]) -> Option<Self> {
        if !is_frame_sync(bytes[0], bytes[1]) {
            return None;
        }

        let version = MpegVersion::from_bits((bytes[1] >> 3) & 0x03)?;
        // Layer bits are stored inverted: 01 is Layer III
        if (bytes[1] >> 1) & 0x03 != 0b01 {
            return None;
        }

        let bitrate_idx = (bytes[2] >> 4) & 0x0F;
        let sample_rate_idx = (bytes[2] >> 2) & 0x03;
        let emphasis = bytes[3] & 0x03;
        if emphasis == 0b10 {
            return None;
        }

        let bitrate_kbps = version.bitrates()[bitrate_idx as usize];
        let sample_rate = version.sample_rates()[sample_rate_idx as usize];
        if bitrate_kbps == 0 || sample_rate == 0 {
            return None;
        }

        Some(Self {
            version,
            bitrate_kbps,
            sample_rate,
            padding: (bytes[2] >> 1) & 0x01 == 1,
        })
    }

    /// Total frame length in bytes, header included.
    pub fn frame_len(&self) -> usize {
        let len = self.version.multiplier() * self.bitrate_kbps * 1000 / self.sample_rate;
        len as usize + usize::from(self.padding)
    }

    /// MPEG version.
    pub fn version(&self) -> MpegVersion {
        self.version
    }

    /// Bitrate in kbit/s.
    pub fn bitrate_kbps(&self) -> u32 {
        self.bitrate_kbps
    }

    /// Sample rate in Hz.
    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    /// Whether the frame carries one padding byte.
    pub fn padding(&self) -> bool {
        self.padding
    }

    /// PCM samples per channel encoded in one frame.
    pub fn samples_per_frame(&self) -> u32 {
        match self.version {
            MpegVersion::Mpeg1 => 1152,
            MpegVersion::Mpeg2 | MpegVersion::Mpeg25 => 576,
        }
    }
}

/// Returns `true` if two bytes start an 11-bit frame sync.
#[inline]
pub fn is_frame_sync(b0: u8, b1: u8) -> bool {
    b0 == 0xFF && b1 & 0xE0 == 0xE0
}

/// Length of the frame described by `header`, or `None` if it is not exactly
/// four bytes of a valid Layer III header.
///
/// # Example
///
/// ```
/// use audiochunk::frame_length;
///
/// assert_eq!(frame_length(&[0xFF, 0xFB, 0x92, 0x00]), Some(418)); // padded
/// assert_eq!(frame_length(&[0xFF, 0xFB, 0xF0, 0x00]), None); // bitrate index 15
/// ```
pub fn frame_length(header: &[u8]) -> Option<usize> {
    let bytes: [u8; 4] = header.try_into().ok()?;
    FrameHeader::parse(bytes).map(|h| h.frame_len())
}
