//! Frame assembly: wraps payload records in the sync/length/id header and
//! trailing checksum, and lays a whole assist record out into one buffer.

use bytemuck::bytes_of;

use super::{
    records::{AidIni, GpsEphemeris, GpsIono, GpsUtc},
    sum_words, AidError, FRAME_OVERHEAD, MSG_AID_INI, MSG_GPS_EPH, MSG_GPS_ION, MSG_GPS_UTC,
    SYNC0, SYNC1,
};
use crate::assist::AssistData;

/// Frame one payload into `out`, returning the number of bytes written.
///
/// The frame checksum is `(id << 16) + len` plus the payload summed as
/// 32-bit words, wrapping.
pub fn frame_message(id: u16, payload: &[u8], out: &mut [u8]) -> Result<usize, AidError> {
    let total = FRAME_OVERHEAD + payload.len();
    if out.len() < total {
        return Err(AidError::BufferTooSmall {
            needed: total,
            available: out.len(),
        });
    }

    let len = payload.len() as u16;
    out[0] = SYNC0;
    out[1] = SYNC1;
    out[2..4].copy_from_slice(&len.to_le_bytes());
    out[4..6].copy_from_slice(&id.to_le_bytes());
    out[6..6 + payload.len()].copy_from_slice(payload);

    let checksum = ((id as u32) << 16)
        .wrapping_add(len as u32)
        .wrapping_add(sum_words(payload));
    out[6 + payload.len()..total].copy_from_slice(&checksum.to_le_bytes());

    Ok(total)
}

/// Encode every present assist block into `out`: the time/position seed
/// first, then each healthy ephemeris in input order, then the UTC and
/// ionosphere models. Returns the total encoded length, ready to hand to
/// the transport.
pub fn encode_aiding(assist: &AssistData, out: &mut [u8]) -> Result<usize, AidError> {
    let mut len = 0;

    let ini = AidIni::from_assist(assist);
    if ini.is_populated() {
        len += frame_message(MSG_AID_INI, bytes_of(&ini), &mut out[len..])?;
        #[cfg(feature = "defmt")]
        defmt::debug!("framed aid-ini, flags {=u8:x}", ini.flags);
    }

    // ephemeris records need the reference week for their wne field
    if let Some(time) = &assist.time {
        for eph in assist.ephemeris.iter() {
            let record = GpsEphemeris::from_assist(time.gps_week, eph);
            if !record.is_available() {
                continue;
            }
            len += frame_message(MSG_GPS_EPH, bytes_of(&record), &mut out[len..])?;
        }
    }

    if let Some(utc) = &assist.utc {
        let record = GpsUtc::from_assist(utc);
        len += frame_message(MSG_GPS_UTC, bytes_of(&record), &mut out[len..])?;
    }

    if let Some(iono) = &assist.iono {
        let record = GpsIono::from_assist(iono);
        len += frame_message(MSG_GPS_ION, bytes_of(&record), &mut out[len..])?;
    }

    #[cfg(feature = "defmt")]
    defmt::debug!("aiding message encoded, {=usize} bytes", len);

    Ok(len)
}
