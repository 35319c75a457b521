//! Reading a catalog file pair into memory.
//!
//! A tier is read completely into a [`LoadedTier`] before anything is handed
//! to an index, so a failed load leaves the caller's state untouched.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::{Path, PathBuf};
use std::time::Instant;

use starmesh_mesh::{MeshGeometry, Trixel};
use tracing::{debug, info, warn};

use crate::error::{CatalogError, HeaderError};
use crate::header::CatalogHeader;
use crate::object::CatalogObject;
use crate::record::{ByteOrder, NAME_RECORD_SIZE, NameRecord, STAR_RECORD_SIZE, StarRecord};

/// Where a tier's files live.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatalogSource {
    /// Object records.
    pub object_path: PathBuf,
    /// Name records paired with flagged objects. Tiers without names have none.
    pub name_path: Option<PathBuf>,
}

impl CatalogSource {
    /// An object file with a paired name file.
    #[must_use]
    pub fn named(object_path: impl Into<PathBuf>, name_path: impl Into<PathBuf>) -> Self {
        Self {
            object_path: object_path.into(),
            name_path: Some(name_path.into()),
        }
    }

    /// An object file on its own.
    #[must_use]
    pub fn unnamed(object_path: impl Into<PathBuf>) -> Self {
        Self {
            object_path: object_path.into(),
            name_path: None,
        }
    }
}

/// A fully read tier, not yet distributed into any index.
#[derive(Clone, Debug)]
pub(crate) struct LoadedTier {
    /// Objects with the partition the file filed them under, in file order.
    pub objects: Vec<(Trixel, CatalogObject)>,
    /// Faintest magnitude seen in the header or the records.
    pub faint_magnitude: f32,
    /// Byte order of the object file.
    pub byte_order: ByteOrder,
}

/// Read as many bytes as are available into `buf`, up to its length.
fn read_full<R: Read>(reader: &mut R, buf: &mut [u8]) -> std::io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == std::io::ErrorKind::Interrupted => {}
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}

fn open(path: &Path) -> Result<BufReader<File>, CatalogError> {
    File::open(path)
        .map(BufReader::new)
        .map_err(|source| CatalogError::Open {
            path: path.to_path_buf(),
            source,
        })
}

fn read_header<R: Read>(reader: &mut R, path: &Path) -> Result<CatalogHeader, CatalogError> {
    CatalogHeader::read(reader).map_err(|source| CatalogError::BadHeader {
        path: path.to_path_buf(),
        source,
    })
}

/// Read every object of `source`, validating its headers against `mesh`.
pub(crate) fn load_tier<M: MeshGeometry>(
    source: &CatalogSource,
    mesh: &M,
) -> Result<LoadedTier, CatalogError> {
    let started = Instant::now();
    let path = source.object_path.as_path();

    let mut objects = open(path)?;
    let header = read_header(&mut objects, path)?;
    debug!(
        "{}: {:?}, {} partitions, faint magnitude {:.2}",
        path.display(),
        header.byte_order,
        header.record_counts.len(),
        header.faint_magnitude
    );

    if header.mesh_level != mesh.level() {
        warn!(
            "{} was built for mesh level {} but the mesh is level {}",
            path.display(),
            header.mesh_level,
            mesh.level()
        );
    }
    let declared = header.record_counts.len();
    if declared > mesh.size() {
        return Err(CatalogError::PartitionOutOfRange {
            path: path.to_path_buf(),
            declared,
            mesh_size: mesh.size(),
        });
    }
    if declared < mesh.size() {
        warn!(
            "{} covers {} of {} partitions",
            path.display(),
            declared,
            mesh.size()
        );
    }

    // Counts come from the file; never trust them beyond what the file holds
    let file_len = objects
        .get_ref()
        .metadata()
        .map_err(|source| CatalogError::Io {
            path: path.to_path_buf(),
            source,
        })?
        .len();
    // A partial final record still counts; reading it fails as a truncated record
    let available = file_len
        .saturating_sub(header.data_offset() as u64)
        .div_ceil(STAR_RECORD_SIZE as u64);
    let declared_records = header.total_records();
    if declared_records > available {
        return Err(CatalogError::BadHeader {
            path: path.to_path_buf(),
            source: HeaderError::RecordCountExceedsFile {
                declared: declared_records,
                available,
            },
        });
    }

    let mut names = match &source.name_path {
        Some(name_path) => {
            let mut reader = open(name_path)?;
            read_header(&mut reader, name_path)?;
            Some(reader)
        }
        None => None,
    };

    let name_path = source.name_path.as_deref();
    let io_error = |source: std::io::Error| CatalogError::Io {
        path: path.to_path_buf(),
        source,
    };

    let mut loaded = Vec::with_capacity(declared_records as usize);
    let mut faint_magnitude = header.faint_magnitude;
    let mut missing_names = 0usize;
    let mut unflagged = 0usize;
    let mut record_buf = [0u8; STAR_RECORD_SIZE];
    let mut name_buf = [0u8; NAME_RECORD_SIZE];

    for (partition, &count) in header.record_counts.iter().enumerate() {
        let trixel = Trixel(partition as u32);
        for _ in 0..count {
            let read = read_full(&mut objects, &mut record_buf).map_err(io_error)?;
            let record = StarRecord::decode(&record_buf[..read], header.byte_order)?;

            let name_record = match names.as_mut() {
                Some(reader) if record.is_named() => {
                    let read =
                        read_full(reader, &mut name_buf).map_err(|source| CatalogError::Io {
                            path: name_path.unwrap_or(path).to_path_buf(),
                            source,
                        })?;
                    if read < NAME_RECORD_SIZE {
                        if missing_names == 0 {
                            warn!(
                                "name file ended early; object {} in {} has no name record",
                                loaded.len(),
                                trixel
                            );
                        }
                        missing_names += 1;
                        None
                    } else {
                        NameRecord::decode(&name_buf).ok()
                    }
                }
                Some(_) => {
                    unflagged += 1;
                    None
                }
                None => None,
            };

            let object = CatalogObject::from_record(&record, name_record.as_ref());
            faint_magnitude = faint_magnitude.max(object.magnitude());
            loaded.push((trixel, object));
        }
    }

    if missing_names > 0 {
        warn!(
            "{}: {} named objects without a name record",
            path.display(),
            missing_names
        );
    }
    if unflagged > 0 {
        warn!(
            "{}: {} objects in a named catalog carry no name flag",
            path.display(),
            unflagged
        );
    }

    info!(
        "Loaded {} objects from {} in {:.1?}",
        loaded.len(),
        path.display(),
        started.elapsed()
    );

    Ok(LoadedTier {
        objects: loaded,
        faint_magnitude,
        byte_order: header.byte_order,
    })
}
