//! Fixed-layout object and name records.
//!
//! ## Object record (32 bytes)
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 4 | Right ascension (`i32`, hours × 10⁶) |
//! | 4 | 4 | Declination (`i32`, degrees × 10⁵) |
//! | 8 | 4 | Proper motion in RA (`i32`, mas/yr × 10, includes cos δ) |
//! | 12 | 4 | Proper motion in Dec (`i32`, mas/yr × 10) |
//! | 16 | 4 | Parallax (`i32`, mas × 10) |
//! | 20 | 4 | Catalog number (`u32`, 0 = none) |
//! | 24 | 2 | Magnitude (`i16`, × 100) |
//! | 26 | 2 | B−V colour index (`i16`, × 100) |
//! | 28 | 2 | Spectral type (two ASCII bytes) |
//! | 30 | 1 | Flags (bit 0: has a name record) |
//! | 31 | 1 | Padding |
//!
//! ## Name record (40 bytes)
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 32 | Long name, NUL padded |
//! | 32 | 8 | Genitive name, NUL padded |
//!
//! Records are stored in the byte order declared by the file header. Decoding
//! reads native-order integers and then swaps every multi-byte field when the
//! file order differs from the host.

use crate::error::CatalogError;

/// Size of an encoded [`StarRecord`].
pub const STAR_RECORD_SIZE: usize = 32;

/// Size of an encoded [`NameRecord`].
pub const NAME_RECORD_SIZE: usize = 40;

const LONG_NAME_LEN: usize = 32;
const GENITIVE_NAME_LEN: usize = 8;

/// Byte order of a catalog file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ByteOrder {
    /// Least significant byte first.
    Little,
    /// Most significant byte first.
    Big,
}

impl ByteOrder {
    /// Byte order of the host.
    #[must_use]
    pub const fn native() -> Self {
        if cfg!(target_endian = "big") {
            ByteOrder::Big
        } else {
            ByteOrder::Little
        }
    }

    /// Whether records in this order can be read without swapping.
    #[must_use]
    pub fn is_native(self) -> bool {
        self == Self::native()
    }

    /// The other byte order.
    #[must_use]
    pub fn opposite(self) -> Self {
        match self {
            ByteOrder::Little => ByteOrder::Big,
            ByteOrder::Big => ByteOrder::Little,
        }
    }
}

/// One raw object record, fields in their stored fixed-point units.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct StarRecord {
    /// Right ascension, hours × 10⁶.
    pub ra: i32,
    /// Declination, degrees × 10⁵.
    pub dec: i32,
    /// Proper motion in RA, mas/yr × 10.
    pub pm_ra: i32,
    /// Proper motion in Dec, mas/yr × 10.
    pub pm_dec: i32,
    /// Parallax, mas × 10.
    pub parallax: i32,
    /// External catalog number, 0 when absent.
    pub catalog_number: u32,
    /// Visual magnitude × 100.
    pub mag: i16,
    /// B−V colour index × 100.
    pub bv_index: i16,
    /// Two-character spectral type.
    pub spectral_type: [u8; 2],
    /// Bit flags, see [`StarRecord::FLAG_NAMED`].
    pub flags: u8,
    /// Unused.
    pub pad: u8,
}

fn i32_at(bytes: &[u8], offset: usize) -> i32 {
    i32::from_ne_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn u32_at(bytes: &[u8], offset: usize) -> u32 {
    u32::from_ne_bytes([
        bytes[offset],
        bytes[offset + 1],
        bytes[offset + 2],
        bytes[offset + 3],
    ])
}

fn i16_at(bytes: &[u8], offset: usize) -> i16 {
    i16::from_ne_bytes([bytes[offset], bytes[offset + 1]])
}

impl StarRecord {
    /// Set when a name record follows this object in the name file.
    pub const FLAG_NAMED: u8 = 0x01;

    /// Decode a record stored in `order`.
    ///
    /// Only the first [`STAR_RECORD_SIZE`] bytes are read.
    pub fn decode(bytes: &[u8], order: ByteOrder) -> Result<Self, CatalogError> {
        if bytes.len() < STAR_RECORD_SIZE {
            return Err(CatalogError::TruncatedRecord {
                expected: STAR_RECORD_SIZE,
                actual: bytes.len(),
            });
        }
        let mut record = StarRecord {
            ra: i32_at(bytes, 0),
            dec: i32_at(bytes, 4),
            pm_ra: i32_at(bytes, 8),
            pm_dec: i32_at(bytes, 12),
            parallax: i32_at(bytes, 16),
            catalog_number: u32_at(bytes, 20),
            mag: i16_at(bytes, 24),
            bv_index: i16_at(bytes, 26),
            spectral_type: [bytes[28], bytes[29]],
            flags: bytes[30],
            pad: bytes[31],
        };
        if !order.is_native() {
            record.byte_swap();
        }
        Ok(record)
    }

    /// Encode this record in `order`.
    #[must_use]
    pub fn encode(&self, order: ByteOrder) -> [u8; STAR_RECORD_SIZE] {
        let mut record = *self;
        if !order.is_native() {
            record.byte_swap();
        }
        let mut buf = [0u8; STAR_RECORD_SIZE];
        buf[0..4].copy_from_slice(&record.ra.to_ne_bytes());
        buf[4..8].copy_from_slice(&record.dec.to_ne_bytes());
        buf[8..12].copy_from_slice(&record.pm_ra.to_ne_bytes());
        buf[12..16].copy_from_slice(&record.pm_dec.to_ne_bytes());
        buf[16..20].copy_from_slice(&record.parallax.to_ne_bytes());
        buf[20..24].copy_from_slice(&record.catalog_number.to_ne_bytes());
        buf[24..26].copy_from_slice(&record.mag.to_ne_bytes());
        buf[26..28].copy_from_slice(&record.bv_index.to_ne_bytes());
        buf[28..30].copy_from_slice(&record.spectral_type);
        buf[30] = record.flags;
        buf[31] = record.pad;
        buf
    }

    /// Reverse the bytes of every multi-byte field, in field order.
    pub fn byte_swap(&mut self) {
        self.ra = self.ra.swap_bytes();
        self.dec = self.dec.swap_bytes();
        self.pm_ra = self.pm_ra.swap_bytes();
        self.pm_dec = self.pm_dec.swap_bytes();
        self.parallax = self.parallax.swap_bytes();
        self.catalog_number = self.catalog_number.swap_bytes();
        self.mag = self.mag.swap_bytes();
        self.bv_index = self.bv_index.swap_bytes();
    }

    /// Whether a name record is paired with this object.
    #[must_use]
    pub fn is_named(&self) -> bool {
        self.flags & Self::FLAG_NAMED != 0
    }

    /// Right ascension in degrees.
    #[must_use]
    pub fn ra_deg(&self) -> f64 {
        f64::from(self.ra) / 1.0e6 * 15.0
    }

    /// Declination in degrees.
    #[must_use]
    pub fn dec_deg(&self) -> f64 {
        f64::from(self.dec) / 1.0e5
    }

    /// Proper motion in RA (× cos δ), mas/yr.
    #[must_use]
    pub fn pm_ra_mas_yr(&self) -> f64 {
        f64::from(self.pm_ra) / 10.0
    }

    /// Proper motion in Dec, mas/yr.
    #[must_use]
    pub fn pm_dec_mas_yr(&self) -> f64 {
        f64::from(self.pm_dec) / 10.0
    }

    /// Parallax in mas.
    #[must_use]
    pub fn parallax_mas(&self) -> f64 {
        f64::from(self.parallax) / 10.0
    }

    /// Visual magnitude.
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        f32::from(self.mag) / 100.0
    }

    /// B−V colour index.
    #[must_use]
    pub fn bv(&self) -> f32 {
        f32::from(self.bv_index) / 100.0
    }

    /// Record at a position given in degrees, everything else zero.
    #[must_use]
    pub fn at_position(ra_deg: f64, dec_deg: f64) -> Self {
        Self {
            ra: (ra_deg / 15.0 * 1.0e6).round() as i32,
            dec: (dec_deg * 1.0e5).round() as i32,
            ..Self::default()
        }
    }

    /// Set the magnitude.
    #[must_use]
    pub fn with_magnitude(mut self, magnitude: f32) -> Self {
        self.mag = (magnitude * 100.0).round() as i16;
        self
    }

    /// Set the proper motion in mas/yr.
    #[must_use]
    pub fn with_proper_motion(mut self, pm_ra_mas_yr: f64, pm_dec_mas_yr: f64) -> Self {
        self.pm_ra = (pm_ra_mas_yr * 10.0).round() as i32;
        self.pm_dec = (pm_dec_mas_yr * 10.0).round() as i32;
        self
    }

    /// Set the external catalog number.
    #[must_use]
    pub fn with_catalog_number(mut self, number: u32) -> Self {
        self.catalog_number = number;
        self
    }

    /// Set the spectral type, truncated or padded to two bytes.
    #[must_use]
    pub fn with_spectral_type(mut self, spectral_type: &str) -> Self {
        let mut st = [b' '; 2];
        for (slot, byte) in st.iter_mut().zip(spectral_type.bytes()) {
            *slot = byte;
        }
        self.spectral_type = st;
        self
    }
}

/// One raw name record.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NameRecord {
    /// Long name, NUL padded.
    pub long_name: [u8; LONG_NAME_LEN],
    /// Genitive (Bayer) name, NUL padded.
    pub genitive_name: [u8; GENITIVE_NAME_LEN],
}

impl Default for NameRecord {
    fn default() -> Self {
        Self {
            long_name: [0; LONG_NAME_LEN],
            genitive_name: [0; GENITIVE_NAME_LEN],
        }
    }
}

fn fixed<const N: usize>(text: &str) -> [u8; N] {
    let mut buf = [0u8; N];
    for (slot, byte) in buf.iter_mut().zip(text.bytes()) {
        *slot = byte;
    }
    buf
}

fn trimmed(bytes: &[u8]) -> String {
    let end = bytes.iter().position(|&b| b == 0).unwrap_or(bytes.len());
    String::from_utf8_lossy(&bytes[..end]).trim().to_string()
}

impl NameRecord {
    /// Build a record from text; over-long names are cut to the field width.
    #[must_use]
    pub fn new(long_name: &str, genitive_name: &str) -> Self {
        Self {
            long_name: fixed(long_name),
            genitive_name: fixed(genitive_name),
        }
    }

    /// Decode a name record. Name records hold only bytes, so byte order does
    /// not apply.
    pub fn decode(bytes: &[u8]) -> Result<Self, CatalogError> {
        if bytes.len() < NAME_RECORD_SIZE {
            return Err(CatalogError::TruncatedRecord {
                expected: NAME_RECORD_SIZE,
                actual: bytes.len(),
            });
        }
        let mut record = NameRecord::default();
        record.long_name.copy_from_slice(&bytes[..LONG_NAME_LEN]);
        record
            .genitive_name
            .copy_from_slice(&bytes[LONG_NAME_LEN..NAME_RECORD_SIZE]);
        Ok(record)
    }

    /// Encode this record.
    #[must_use]
    pub fn encode(&self) -> [u8; NAME_RECORD_SIZE] {
        let mut buf = [0u8; NAME_RECORD_SIZE];
        buf[..LONG_NAME_LEN].copy_from_slice(&self.long_name);
        buf[LONG_NAME_LEN..].copy_from_slice(&self.genitive_name);
        buf
    }

    /// The long name, if any.
    #[must_use]
    pub fn long_name(&self) -> Option<String> {
        Some(trimmed(&self.long_name)).filter(|name| !name.is_empty())
    }

    /// The genitive name, if any. Names starting with `.` are placeholders.
    #[must_use]
    pub fn genitive_name(&self) -> Option<String> {
        Some(trimmed(&self.genitive_name)).filter(|name| !name.is_empty() && !name.starts_with('.'))
    }
}
