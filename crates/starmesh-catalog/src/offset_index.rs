//! Catalog-number → byte-offset index into a tier's object file.
//!
//! The file is a headerless array of little-endian `i32` offsets. Entry
//! `n - 1` holds the offset of catalog number `n`; zero or negative entries
//! mark numbers the file does not contain.

use std::fs::File;
use std::io::{BufWriter, Read, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use crate::deep::RecordSource;
use crate::error::CatalogError;
use crate::record::{STAR_RECORD_SIZE, StarRecord};

/// An offset index held in memory.
#[derive(Clone, Debug)]
pub struct OffsetIndex {
    path: PathBuf,
    offsets: Vec<i32>,
}

impl OffsetIndex {
    /// Read the whole index file. A trailing partial entry is ignored.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, CatalogError> {
        let path = path.into();
        let mut bytes = Vec::new();
        File::open(&path)
            .map_err(|source| CatalogError::Open {
                path: path.clone(),
                source,
            })?
            .read_to_end(&mut bytes)
            .map_err(|source| CatalogError::Io {
                path: path.clone(),
                source,
            })?;
        let offsets = bytes
            .chunks_exact(4)
            .map(|c| i32::from_le_bytes([c[0], c[1], c[2], c[3]]))
            .collect();
        Ok(Self { path, offsets })
    }

    /// The index file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.offsets.len()
    }

    /// Whether the index has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.offsets.is_empty()
    }

    /// Byte offset of catalog number `number`, if indexed.
    #[must_use]
    pub fn offset_of(&self, number: u32) -> Option<u64> {
        let slot = usize::try_from(number).ok()?.checked_sub(1)?;
        let offset = *self.offsets.get(slot)?;
        (offset > 0).then_some(offset as u64)
    }

    /// Read the record for `number` from `source`.
    ///
    /// `Ok(None)` when the number is not indexed.
    pub fn read_record(
        &self,
        source: &RecordSource,
        number: u32,
    ) -> Result<Option<StarRecord>, CatalogError> {
        let Some(offset) = self.offset_of(number) else {
            return Ok(None);
        };
        let mut file = File::open(&source.path).map_err(|e| CatalogError::Open {
            path: source.path.clone(),
            source: e,
        })?;
        let mut buf = [0u8; STAR_RECORD_SIZE];
        let read = file
            .seek(SeekFrom::Start(offset))
            .and_then(|_| read_up_to(&mut file, &mut buf))
            .map_err(|e| CatalogError::Io {
                path: source.path.clone(),
                source: e,
            })?;
        StarRecord::decode(&buf[..read], source.byte_order).map(Some)
    }

    /// Write an index for `(catalog number, offset)` pairs.
    pub fn write(path: &Path, entries: &[(u32, u64)]) -> std::io::Result<()> {
        let len = entries.iter().map(|&(n, _)| n as usize).max().unwrap_or(0);
        let mut offsets = vec![0i32; len];
        for &(number, offset) in entries {
            if number == 0 {
                continue;
            }
            let offset = i32::try_from(offset).map_err(|_| {
                std::io::Error::new(
                    std::io::ErrorKind::InvalidInput,
                    format!("offset {offset} of catalog number {number} exceeds i32"),
                )
            })?;
            offsets[number as usize - 1] = offset;
        }
        let mut writer = BufWriter::new(File::create(path)?);
        for offset in offsets {
            writer.write_all(&offset.to_le_bytes())?;
        }
        writer.flush()
    }
}

fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}
