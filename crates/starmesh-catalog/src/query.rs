//! Radius-bounded nearest-object search over one indexed tier.

use std::borrow::Cow;

use starmesh_mesh::MeshGeometry;

use crate::index::TrixelIndex;
use crate::object::{CatalogObject, ObjectArena, ObjectId};
use crate::sky_point::SkyPoint;

/// Result of a nearest-object query.
#[derive(Clone, Debug)]
pub struct Nearest<'a> {
    /// The object found. Borrowed when it lives in an index, owned when it
    /// was read on demand.
    pub object: Cow<'a, CatalogObject>,
    /// Angular distance from the query point in degrees.
    pub distance_deg: f64,
}

impl Nearest<'_> {
    /// Detach the result from the catalog it came from.
    #[must_use]
    pub fn into_owned(self) -> Nearest<'static> {
        Nearest {
            object: Cow::Owned(self.object.into_owned()),
            distance_deg: self.distance_deg,
        }
    }
}

/// Closest object at or brighter than `magnitude_limit` strictly within
/// `max_radius_deg` of `center`. Ties keep the first object scanned.
pub(crate) fn nearest_in<M: MeshGeometry>(
    mesh: &M,
    index: &TrixelIndex,
    objects: &ObjectArena,
    center: &SkyPoint,
    max_radius_deg: f64,
    magnitude_limit: f32,
) -> Option<(ObjectId, f64)> {
    let mut radius = max_radius_deg;
    let mut best = None;
    for trixel in mesh.partitions_in_cap(center.to_unit_vector(), max_radius_deg.to_radians()) {
        for &id in index.list(trixel) {
            let Some(object) = objects.get(id) else {
                continue;
            };
            if object.magnitude() > magnitude_limit {
                continue;
            }
            let distance = object.angular_distance_deg(center);
            if distance < radius {
                radius = distance;
                best = Some((id, distance));
            }
        }
    }
    best
}
