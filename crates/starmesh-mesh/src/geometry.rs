//! The interface the catalog uses to talk to a sky mesh.

use glam::DVec3;

use crate::Trixel;

/// A partitioning of the celestial sphere into a fixed number of leaf cells.
///
/// Implementations must be deterministic: the same direction always maps to
/// the same trixel, and [`partitions_in_cap`](MeshGeometry::partitions_in_cap)
/// must never omit a trixel that intersects the cap (it may include extras).
pub trait MeshGeometry {
    /// Subdivision level the mesh was built with.
    fn level(&self) -> u8;

    /// Number of leaf partitions. Every trixel returned is below this.
    fn size(&self) -> usize;

    /// The leaf partition containing a direction. The direction need not be
    /// normalized; a zero vector maps to a fixed, implementation-defined trixel.
    fn partition_of(&self, direction: DVec3) -> Trixel;

    /// Leaf partitions that may intersect the cap of `radius` radians around
    /// `center`, in ascending trixel order.
    fn partitions_in_cap(&self, center: DVec3, radius: f64) -> Vec<Trixel>;
}
