//! Star catalog indexed by a hierarchical triangular sky mesh.
//!
//! Catalog files are decoded into an arena of [`CatalogObject`]s, filed per
//! mesh partition in a [`TrixelIndex`], and kept current as simulated time
//! advances: fast movers are patched through motion buckets, and a full
//! rebuild happens once the epoch drifts past the re-index interval.

mod catalog;
mod deep;
mod epoch;
mod error;
mod header;
mod index;
mod loader;
mod motion;
mod names;
mod object;
mod offset_index;
mod query;
mod record;
mod sky_point;
mod writer;

pub use catalog::{CatalogOptions, ReindexOutcome, StarCatalog};
pub use deep::{DeepCatalog, RecordSource, StaticDeepCatalog};
pub use epoch::Epoch;
pub use error::{CatalogError, HeaderError};
pub use header::{BYTE_ORDER_MARKER, CatalogHeader, FORMAT_VERSION};
pub use index::TrixelIndex;
pub use loader::CatalogSource;
pub use motion::{MotionBucket, MotionEntry, MotionTracker, NEVER_CENTURIES, reindex_interval};
pub use names::NameTables;
pub use object::{CatalogObject, Generation, ObjectArena, ObjectId, UNNAMED_LABEL};
pub use offset_index::OffsetIndex;
pub use query::Nearest;
pub use record::{ByteOrder, NAME_RECORD_SIZE, NameRecord, STAR_RECORD_SIZE, StarRecord};
pub use sky_point::{Horizontal, MAS_PER_DEGREE, Observer, ProperMotion, SkyPoint};
pub use writer::CatalogWriter;
