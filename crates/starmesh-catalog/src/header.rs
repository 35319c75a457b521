//! Catalog file header.
//!
//! ## Binary Layout
//!
//! | Offset | Size | Field |
//! |--------|------|-------|
//! | 0 | 124 | Description text, NUL padded |
//! | 124 | 2 | Endianness marker `0x4B53`, written in file byte order |
//! | 126 | 1 | Format version (`u8`, currently 1) |
//! | 127 | 2 | Faint magnitude (`i16`, hundredths) |
//! | 129 | 1 | Mesh level (`u8`) |
//! | 130 | 2 | Reserved |
//! | 132 | 4 | Partition count N (`u32`) |
//! | 136 | N×4 | Records per partition (`u32` each) |
//!
//! Records begin immediately after the partition table.

use std::io::{Read, Write};

use crate::error::HeaderError;
use crate::record::ByteOrder;

const DESCRIPTION_LEN: usize = 124;
const PREAMBLE_LEN: usize = 136;

/// Endianness marker value ("KS").
pub const BYTE_ORDER_MARKER: u16 = 0x4B53;

/// Current format version.
pub const FORMAT_VERSION: u8 = 1;

/// Decoded header of an object or name file.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogHeader {
    /// Free-form description.
    pub description: String,
    /// Byte order of every multi-byte value after the marker.
    pub byte_order: ByteOrder,
    /// Format version.
    pub version: u8,
    /// Faintest magnitude in the file.
    pub faint_magnitude: f32,
    /// Mesh level the file was partitioned with.
    pub mesh_level: u8,
    /// Record count for each partition, in ascending partition order.
    pub record_counts: Vec<u32>,
}

fn read_exact_or_truncated<R: Read>(reader: &mut R, buf: &mut [u8]) -> Result<(), HeaderError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        std::io::ErrorKind::UnexpectedEof => HeaderError::Truncated,
        _ => HeaderError::Io(e),
    })
}

impl CatalogHeader {
    /// Read and validate a header, leaving `reader` at the first record.
    pub fn read<R: Read>(reader: &mut R) -> Result<Self, HeaderError> {
        let mut preamble = [0u8; PREAMBLE_LEN];
        read_exact_or_truncated(reader, &mut preamble)?;

        let marker = [preamble[124], preamble[125]];
        let byte_order = if u16::from_le_bytes(marker) == BYTE_ORDER_MARKER {
            ByteOrder::Little
        } else if u16::from_be_bytes(marker) == BYTE_ORDER_MARKER {
            ByteOrder::Big
        } else {
            return Err(HeaderError::UnknownByteOrder(u16::from_le_bytes(marker)));
        };

        let version = preamble[126];
        if version != FORMAT_VERSION {
            return Err(HeaderError::UnsupportedVersion(version));
        }

        let u16_at = |offset: usize| {
            let bytes = [preamble[offset], preamble[offset + 1]];
            match byte_order {
                ByteOrder::Little => u16::from_le_bytes(bytes),
                ByteOrder::Big => u16::from_be_bytes(bytes),
            }
        };
        let u32_from = |bytes: [u8; 4]| match byte_order {
            ByteOrder::Little => u32::from_le_bytes(bytes),
            ByteOrder::Big => u32::from_be_bytes(bytes),
        };

        let faint_magnitude = f32::from(u16_at(127) as i16) / 100.0;
        let mesh_level = preamble[129];
        let partitions = u32_from([preamble[132], preamble[133], preamble[134], preamble[135]]);

        // The table grows with the bytes actually present, not the declared count
        let table_len = u64::from(partitions) * 4;
        let mut table = Vec::new();
        reader.by_ref().take(table_len).read_to_end(&mut table)?;
        if (table.len() as u64) < table_len {
            return Err(HeaderError::Truncated);
        }
        let record_counts = table
            .chunks_exact(4)
            .map(|c| u32_from([c[0], c[1], c[2], c[3]]))
            .collect();

        let end = preamble[..DESCRIPTION_LEN]
            .iter()
            .position(|&b| b == 0)
            .unwrap_or(DESCRIPTION_LEN);
        let description = String::from_utf8_lossy(&preamble[..end]).into_owned();

        Ok(Self {
            description,
            byte_order,
            version,
            faint_magnitude,
            mesh_level,
            record_counts,
        })
    }

    /// Write this header in its byte order.
    pub fn write<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let mut buf = Vec::with_capacity(self.data_offset());
        let mut description = [0u8; DESCRIPTION_LEN];
        for (slot, byte) in description.iter_mut().zip(self.description.bytes()) {
            *slot = byte;
        }
        buf.extend_from_slice(&description);

        let faint = (self.faint_magnitude * 100.0).round() as i16;
        let partitions = self.record_counts.len() as u32;
        match self.byte_order {
            ByteOrder::Little => {
                buf.extend_from_slice(&BYTE_ORDER_MARKER.to_le_bytes());
                buf.push(self.version);
                buf.extend_from_slice(&faint.to_le_bytes());
                buf.push(self.mesh_level);
                buf.extend_from_slice(&[0, 0]);
                buf.extend_from_slice(&partitions.to_le_bytes());
                for count in &self.record_counts {
                    buf.extend_from_slice(&count.to_le_bytes());
                }
            }
            ByteOrder::Big => {
                buf.extend_from_slice(&BYTE_ORDER_MARKER.to_be_bytes());
                buf.push(self.version);
                buf.extend_from_slice(&faint.to_be_bytes());
                buf.push(self.mesh_level);
                buf.extend_from_slice(&[0, 0]);
                buf.extend_from_slice(&partitions.to_be_bytes());
                for count in &self.record_counts {
                    buf.extend_from_slice(&count.to_be_bytes());
                }
            }
        }
        writer.write_all(&buf)
    }

    /// Byte offset of the first record.
    #[must_use]
    pub fn data_offset(&self) -> usize {
        PREAMBLE_LEN + 4 * self.record_counts.len()
    }

    /// Sum of all per-partition counts.
    #[must_use]
    pub fn total_records(&self) -> u64 {
        self.record_counts.iter().map(|&c| u64::from(c)).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn header(order: ByteOrder) -> CatalogHeader {
        CatalogHeader {
            description: "test stars".to_string(),
            byte_order: order,
            version: FORMAT_VERSION,
            faint_magnitude: 8.0,
            mesh_level: 0,
            record_counts: vec![2, 0, 1],
        }
    }

    #[test]
    fn test_header_round_trip_both_orders() {
        for order in [ByteOrder::Little, ByteOrder::Big] {
            let mut buf = Vec::new();
            header(order).write(&mut buf).unwrap();
            assert_eq!(buf.len(), 136 + 12);
            let decoded = CatalogHeader::read(&mut buf.as_slice()).unwrap();
            assert_eq!(decoded, header(order));
        }
    }

    #[test]
    fn test_marker_bytes() {
        let mut little = Vec::new();
        header(ByteOrder::Little).write(&mut little).unwrap();
        assert_eq!(&little[124..126], &[0x53, 0x4B]);
        let mut big = Vec::new();
        header(ByteOrder::Big).write(&mut big).unwrap();
        assert_eq!(&big[124..126], &[0x4B, 0x53]);
    }

    #[test]
    fn test_offsets_and_totals() {
        let h = header(ByteOrder::Little);
        assert_eq!(h.data_offset(), 148);
        assert_eq!(h.total_records(), 3);
    }

    #[test]
    fn test_reader_left_at_first_record() {
        let mut buf = Vec::new();
        header(ByteOrder::Little).write(&mut buf).unwrap();
        buf.extend_from_slice(b"record");
        let mut reader = buf.as_slice();
        CatalogHeader::read(&mut reader).unwrap();
        assert_eq!(reader, b"record");
    }

    #[test]
    fn test_unknown_marker() {
        let mut buf = Vec::new();
        header(ByteOrder::Little).write(&mut buf).unwrap();
        buf[124] = 0xFF;
        buf[125] = 0xEE;
        let err = CatalogHeader::read(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, HeaderError::UnknownByteOrder(0xEEFF)));
    }

    #[test]
    fn test_unsupported_version() {
        let mut buf = Vec::new();
        header(ByteOrder::Little).write(&mut buf).unwrap();
        buf[126] = 9;
        let err = CatalogHeader::read(&mut buf.as_slice()).unwrap_err();
        assert!(matches!(err, HeaderError::UnsupportedVersion(9)));
    }

    #[test]
    fn test_truncated_header() {
        let mut buf = Vec::new();
        header(ByteOrder::Little).write(&mut buf).unwrap();
        assert!(matches!(
            CatalogHeader::read(&mut &buf[..100]).unwrap_err(),
            HeaderError::Truncated
        ));
        // Partition table cut short
        assert!(matches!(
            CatalogHeader::read(&mut &buf[..140]).unwrap_err(),
            HeaderError::Truncated
        ));
    }

    #[test]
    fn test_huge_partition_count_is_truncated() {
        let mut buf = Vec::new();
        header(ByteOrder::Little).write(&mut buf).unwrap();
        buf[132..136].copy_from_slice(&u32::MAX.to_le_bytes());
        assert!(matches!(
            CatalogHeader::read(&mut buf.as_slice()),
            Err(HeaderError::Truncated)
        ));
    }

    #[test]
    fn test_negative_faint_magnitude() {
        let mut h = header(ByteOrder::Big);
        h.faint_magnitude = -1.5;
        let mut buf = Vec::new();
        h.write(&mut buf).unwrap();
        let decoded = CatalogHeader::read(&mut buf.as_slice()).unwrap();
        assert!((decoded.faint_magnitude + 1.5).abs() < 1e-6);
    }
}
