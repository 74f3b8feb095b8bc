//! CASIC aiding-message codec: packs assistance data into the receiver's
//! framed binary records.

use thiserror::Error;

pub mod encoder;
pub mod records;

pub use encoder::{encode_aiding, frame_message};
pub use records::{AidIni, GpsEphemeris, GpsIono, GpsUtc, NavMessageFlag};

pub const SYNC0: u8 = 0xBA;
pub const SYNC1: u8 = 0xCE;

/// Class/message ids; the low byte is the class.
pub const MSG_AID_INI: u16 = 0x010B;
pub const MSG_GPS_EPH: u16 = 0x0708;
pub const MSG_GPS_UTC: u16 = 0x0508;
pub const MSG_GPS_ION: u16 = 0x0608;

/// Sync, length, and id bytes before the payload plus the checksum after it.
pub const FRAME_OVERHEAD: usize = 10;

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Error, Debug, Copy, Clone, PartialEq, Eq)]
pub enum AidError {
    /// Destination buffer cannot hold the next frame.
    #[error("output buffer too small: need {needed} bytes, have {available}")]
    BufferTooSmall { needed: usize, available: usize },
}

/// Wrapping sum of a buffer taken as little-endian 32-bit words. Payloads
/// are always a whole number of words.
pub(crate) fn sum_words(bytes: &[u8]) -> u32 {
    bytes.chunks_exact(4).fold(0u32, |sum, word| {
        sum.wrapping_add(u32::from_le_bytes([word[0], word[1], word[2], word[3]]))
    })
}

/// Record-embedded checksum: the sum of every word of the record except the
/// checksum slot itself (word 0). The receiver expects exactly this
/// asymmetry; do not "fix" it to cover the whole record.
pub(crate) fn word_checksum(record: &[u8]) -> u32 {
    sum_words(&record[4..])
}
