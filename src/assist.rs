//! Assistance data handed in by an external location service (SUPL or
//! similar). Consumed read-only by [`crate::aid::encode_aiding`]; absent
//! blocks are simply `None`. Numeric fields keep the raw scaling of the GPS
//! broadcast message they were lifted from.

use tinyvec::ArrayVec;

/// Most ephemerides a single assist exchange will carry.
pub const MAX_EPHEMERIS: usize = 32;

#[derive(Default, Debug, Clone)]
pub struct AssistData {
    pub time: Option<ReferenceTime>,
    pub location: Option<ReferenceLocation>,
    pub iono: Option<IonoAssist>,
    pub utc: Option<UtcAssist>,
    pub ephemeris: ArrayVec<[EphemerisAssist; MAX_EPHEMERIS]>,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct ReferenceTime {
    pub gps_week: u16,
    /// Time of week in 0.08 s steps (the 23-bit GPS TOW presentation).
    pub gps_tow: i64,
}

impl ReferenceTime {
    pub fn tow_seconds(&self) -> f64 {
        self.gps_tow as f64 * 0.08
    }
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Default, Debug, Copy, Clone, PartialEq)]
pub struct ReferenceLocation {
    pub latitude: f64,
    pub longitude: f64,
    /// Encoded uncertainty K, for 10 * (1.1^K - 1) metres.
    pub uncertainty: i32,
}

/// Klobuchar ionosphere coefficients, alpha scaled 2^-30/-27/-24, beta
/// scaled 2^11/14/16.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct IonoAssist {
    pub a0: i8,
    pub a1: i8,
    pub a2: i8,
    pub a3: i8,
    pub b0: i8,
    pub b1: i8,
    pub b2: i8,
    pub b3: i8,
}

#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct UtcAssist {
    pub a0: i32,
    pub a1: i32,
    pub delta_tls: i8,
    pub delta_tlsf: i8,
    pub tot: u8,
    pub wnt: u8,
    pub wnlsf: u8,
    pub dn: u8,
}

/// One satellite's broadcast ephemeris: clock correction plus Keplerian
/// orbital elements.
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[derive(Default, Debug, Copy, Clone, PartialEq, Eq)]
pub struct EphemerisAssist {
    pub prn: u8,
    pub ura: u8,
    /// Six-bit broadcast health word; zero means usable.
    pub health: u8,
    pub iodc: u16,

    pub delta_n: i16,
    pub m0: i32,
    pub e: u32,
    pub a_sqrt: u32,
    pub omega_0: i32,
    pub i0: i32,
    pub w: i32,
    pub omega_dot: i32,
    pub i_dot: i16,
    pub cuc: i16,
    pub cus: i16,
    pub crc: i16,
    pub crs: i16,
    pub cic: i16,
    pub cis: i16,
    pub toe: u16,

    pub toc: u32,
    pub af0: i32,
    pub af1: i16,
    pub af2: i8,
    pub tgd: i8,
}
