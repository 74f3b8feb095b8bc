//! Fixed-layout payload records understood by the receiver.

use bytemuck::{bytes_of, Pod, Zeroable};

use super::word_checksum;
use crate::assist::{AssistData, EphemerisAssist, IonoAssist, UtcAssist};

// SAFETY: every struct below is repr(C) with naturally aligned fields and
// explicit reserved bytes where C left tail padding, so there are no
// uninitialized bytes. The receiver is little-endian, like every target
// this runs on.

/// Validity tag carried in each navigation-data record.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
#[repr(u8)]
pub enum NavMessageFlag {
    Absence = 0,
    Unhealthy = 1,
    OutOfDate = 2,
    Available = 3,
}

/// `flags` bit: the tow/wn fields hold a time reference.
pub const INI_FLAG_TIME: u8 = 0x02;
/// `flags` bits: the position fields hold an LLA reference.
pub const INI_FLAG_POS_LLA: u8 = 0x21;

/// Time and coarse-position seed (AID-INI).
#[repr(C)]
#[derive(Pod, Zeroable, Copy, Clone, Debug, PartialEq)]
pub struct AidIni {
    pub x_or_lat: f64,
    pub y_or_lon: f64,
    pub z_or_alt: f64,
    /// Time of week in seconds.
    pub tow: f64,
    pub df: f32,
    pub pos_acc: f32,
    pub t_acc: f32,
    pub f_acc: f32,
    pub res: u32,
    pub wn: u16,
    pub time_source: u8,
    pub flags: u8,
}

impl AidIni {
    /// Build the seed record; `flags` stays 0 when neither reference is
    /// present and the record must then be skipped.
    pub fn from_assist(assist: &AssistData) -> Self {
        let mut ini = Self::zeroed();
        if let Some(time) = &assist.time {
            ini.tow = time.tow_seconds();
            ini.wn = time.gps_week.wrapping_add(1024);
            ini.flags |= INI_FLAG_TIME;
        }
        if let Some(location) = &assist.location {
            ini.x_or_lat = location.latitude;
            ini.y_or_lon = location.longitude;
            ini.z_or_alt = 0.0;
            // the receiver only needs a coarse seed; the encoded uncertainty
            // shipped with the reference location is not propagated
            ini.pos_acc = 5000.0;
            ini.flags |= INI_FLAG_POS_LLA;
        }
        ini
    }

    pub fn is_populated(&self) -> bool {
        self.flags != 0
    }
}

/// Keplerian orbit block of a fixed-point ephemeris.
#[repr(C)]
#[derive(Pod, Zeroable, Copy, Clone, Debug, PartialEq, Eq)]
pub struct KeplerOrbit {
    pub sqrt_a: u32,
    pub es: u32,
    pub w: i32,
    pub m0: i32,
    pub i0: i32,
    pub omega0: i32,
    pub omega_dot: i32,
    pub delta_n: i16,
    pub i_dot: i16,
    pub cuc: i16,
    pub cus: i16,
    pub crc: i16,
    pub crs: i16,
    pub cic: i16,
    pub cis: i16,
    pub toe: u16,
    pub wne: u16,
}

/// Clock-correction block of a fixed-point ephemeris.
#[repr(C)]
#[derive(Pod, Zeroable, Copy, Clone, Debug, PartialEq, Eq)]
pub struct SvClock {
    pub toc: u32,
    pub af0: i32,
    pub af1: i16,
    pub af2: i8,
    pub tgd: i8,
}

/// One satellite's fixed-point ephemeris (RXM-GPS-EPH payload).
#[repr(C)]
#[derive(Pod, Zeroable, Copy, Clone, Debug, PartialEq, Eq)]
pub struct GpsEphemeris {
    pub word_checksum: u32,
    pub kepler: KeplerOrbit,
    pub sv_clock: SvClock,
    pub iodc: u16,
    pub ura: u8,
    pub health: u8,
    pub svid: u8,
    pub valid: u8,
    pub tow: u16,
}

impl GpsEphemeris {
    /// `week` is the raw assist reference week; unlike AID-INI it is carried
    /// without the +1024 rollover bias.
    pub fn from_assist(week: u16, eph: &EphemerisAssist) -> Self {
        let valid = if eph.health == 0 {
            NavMessageFlag::Available
        } else {
            NavMessageFlag::Unhealthy
        };
        let mut record = Self {
            word_checksum: 0,
            kepler: KeplerOrbit {
                sqrt_a: eph.a_sqrt,
                es: eph.e,
                w: eph.w,
                m0: eph.m0,
                i0: eph.i0,
                omega0: eph.omega_0,
                omega_dot: eph.omega_dot,
                delta_n: eph.delta_n,
                i_dot: eph.i_dot,
                cuc: eph.cuc,
                cus: eph.cus,
                crc: eph.crc,
                crs: eph.crs,
                cic: eph.cic,
                cis: eph.cis,
                toe: eph.toe,
                wne: week,
            },
            sv_clock: SvClock {
                toc: eph.toc,
                af0: eph.af0,
                af1: eph.af1,
                af2: eph.af2,
                tgd: eph.tgd,
            },
            iodc: eph.iodc,
            ura: eph.ura,
            health: eph.health,
            svid: eph.prn,
            valid: valid as u8,
            tow: 0,
        };
        record.word_checksum = word_checksum(bytes_of(&record));
        record
    }

    pub fn is_available(&self) -> bool {
        self.valid == NavMessageFlag::Available as u8
    }
}

/// Fixed-point UTC model (RXM-GPS-UTC payload).
#[repr(C)]
#[derive(Pod, Zeroable, Copy, Clone, Debug, PartialEq, Eq)]
pub struct GpsUtc {
    pub word_checksum: u32,
    pub a0: i32,
    pub a1: i32,
    pub dtls: i8,
    pub dtlsf: i8,
    pub tot: u8,
    pub wnt: u8,
    pub wnlsf: u8,
    pub dn: u8,
    pub valid: u8,
    pub reserved: u8,
}

impl GpsUtc {
    pub fn from_assist(utc: &UtcAssist) -> Self {
        let mut record = Self {
            word_checksum: 0,
            a0: utc.a0,
            a1: utc.a1,
            dtls: utc.delta_tls,
            dtlsf: utc.delta_tlsf,
            tot: utc.tot,
            wnt: utc.wnt,
            wnlsf: utc.wnlsf,
            dn: utc.dn,
            valid: NavMessageFlag::Available as u8,
            reserved: 0,
        };
        record.word_checksum = word_checksum(bytes_of(&record));
        record
    }
}

/// Fixed-point eight-parameter ionosphere model (RXM-GPS-ION payload).
#[repr(C)]
#[derive(Pod, Zeroable, Copy, Clone, Debug, PartialEq, Eq)]
pub struct GpsIono {
    pub word_checksum: u32,
    pub alpha0: i8,
    pub alpha1: i8,
    pub alpha2: i8,
    pub alpha3: i8,
    pub beta0: i8,
    pub beta1: i8,
    pub beta2: i8,
    pub beta3: i8,
    pub valid: u8,
    pub reserved: [u8; 3],
}

impl GpsIono {
    pub fn from_assist(iono: &IonoAssist) -> Self {
        let mut record = Self {
            word_checksum: 0,
            alpha0: iono.a0,
            alpha1: iono.a1,
            alpha2: iono.a2,
            alpha3: iono.a3,
            beta0: iono.b0,
            beta1: iono.b1,
            beta2: iono.b2,
            beta3: iono.b3,
            valid: NavMessageFlag::Available as u8,
            reserved: [0; 3],
        };
        record.word_checksum = word_checksum(bytes_of(&record));
        record
    }
}
