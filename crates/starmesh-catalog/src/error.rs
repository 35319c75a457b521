//! Catalog error types.
//!
//! Only fatal conditions are errors. Data-integrity problems that the loader
//! can step over are logged with `tracing::warn!`, and query misses are `None`.

use std::path::PathBuf;

/// A catalog file header that could not be used.
#[derive(Debug, thiserror::Error)]
pub enum HeaderError {
    /// The file ended before the header did.
    #[error("header truncated")]
    Truncated,

    /// The endianness marker matched neither byte order.
    #[error("unknown endianness marker {0:#06x}")]
    UnknownByteOrder(u16),

    /// The format version is not supported by this build.
    #[error("unsupported format version {0}")]
    UnsupportedVersion(u8),

    /// The partition table declares more records than the file holds.
    #[error("header declares {declared} records but the file holds {available}")]
    RecordCountExceedsFile {
        /// Sum of the per-partition counts.
        declared: u64,
        /// Whole records between the table and the end of the file.
        available: u64,
    },

    /// An I/O error other than end-of-file.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Fatal errors that abort loading a catalog tier.
#[derive(Debug, thiserror::Error)]
pub enum CatalogError {
    /// A catalog file could not be opened.
    #[error("failed to open {}: {source}", .path.display())]
    Open {
        /// The file that failed to open.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A catalog file header could not be read.
    #[error("bad header in {}: {source}", .path.display())]
    BadHeader {
        /// The file with the bad header.
        path: PathBuf,
        /// What was wrong with it.
        #[source]
        source: HeaderError,
    },

    /// Fewer bytes than a whole record were available.
    #[error("record truncated: expected {expected} bytes, got {actual}")]
    TruncatedRecord {
        /// Size of a full record.
        expected: usize,
        /// Bytes actually available.
        actual: usize,
    },

    /// The partition table names trixels the in-memory mesh does not have.
    #[error(
        "{} declares {declared} partitions but the mesh has {mesh_size}",
        .path.display()
    )]
    PartitionOutOfRange {
        /// The offending file.
        path: PathBuf,
        /// Partition count declared by the header.
        declared: usize,
        /// Partition count of the mesh.
        mesh_size: usize,
    },

    /// An I/O error while reading records.
    #[error("I/O error reading {}: {source}", .path.display())]
    Io {
        /// The file being read.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
