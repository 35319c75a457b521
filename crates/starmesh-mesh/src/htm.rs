//! Hierarchical triangular mesh: recursive midpoint subdivision of the octahedron.

use glam::DVec3;

use crate::trixel::{SphericalTriangle, angle_between};
use crate::{MeshGeometry, RootTriangle, Trixel};

/// A hierarchical triangular mesh at a fixed level.
///
/// Level `l` has `8 * 4^l` leaf trixels. Level 3 (512 trixels) suits a
/// bright-star catalog; deeper catalogs use finer levels.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HtmMesh {
    level: u8,
}

impl HtmMesh {
    /// Deepest supported level. Level 13 has 536,870,912 trixels, the most a
    /// `u32` trixel id can address.
    pub const MAX_LEVEL: u8 = 13;

    /// Build a mesh at `level`.
    ///
    /// # Panics
    ///
    /// Panics if `level` exceeds [`Self::MAX_LEVEL`].
    #[must_use]
    pub fn new(level: u8) -> Self {
        assert!(
            level <= Self::MAX_LEVEL,
            "mesh level {level} exceeds MAX_LEVEL {}",
            Self::MAX_LEVEL
        );
        Self { level }
    }

    /// Number of leaf trixels at `level`.
    #[must_use]
    pub fn size_for_level(level: u8) -> usize {
        8usize << (2 * u32::from(level))
    }

    /// The spherical triangle a leaf trixel covers.
    ///
    /// Returns `None` for ids outside the mesh.
    #[must_use]
    pub fn triangle(&self, trixel: Trixel) -> Option<SphericalTriangle> {
        if trixel.index() >= self.size() {
            return None;
        }
        let shift = 2 * u32::from(self.level);
        let root = RootTriangle::from_index((trixel.0 >> shift) as u8)?;
        let mut tri = SphericalTriangle::root(root);
        for step in (0..self.level).rev() {
            let child = (trixel.0 >> (2 * u32::from(step))) & 3;
            tri = tri.children()[child as usize];
        }
        Some(tri)
    }

    fn collect_cap(
        &self,
        tri: &SphericalTriangle,
        id: u32,
        depth: u8,
        center: DVec3,
        radius: f64,
        out: &mut Vec<Trixel>,
    ) {
        let (tri_center, tri_radius) = tri.bounding_cap();
        if angle_between(tri_center, center) > tri_radius + radius {
            return;
        }
        if depth == self.level {
            out.push(Trixel(id));
            return;
        }
        for (k, child) in tri.children().iter().enumerate() {
            self.collect_cap(child, id * 4 + k as u32, depth + 1, center, radius, out);
        }
    }
}

impl MeshGeometry for HtmMesh {
    fn level(&self) -> u8 {
        self.level
    }

    fn size(&self) -> usize {
        Self::size_for_level(self.level)
    }

    fn partition_of(&self, direction: DVec3) -> Trixel {
        let p = direction.normalize_or(DVec3::Z);

        let roots = RootTriangle::ALL.map(SphericalTriangle::root);
        let root = best_containing(&roots, p);
        let mut tri = roots[root];
        let mut id = root as u32;
        for _ in 0..self.level {
            let children = tri.children();
            let k = best_containing(&children, p);
            id = id * 4 + k as u32;
            tri = children[k];
        }
        Trixel(id)
    }

    fn partitions_in_cap(&self, center: DVec3, radius: f64) -> Vec<Trixel> {
        let center = center.normalize_or(DVec3::Z);
        let mut out = Vec::new();
        for root in RootTriangle::ALL {
            let tri = SphericalTriangle::root(root);
            self.collect_cap(&tri, u32::from(root.index()), 0, center, radius, &mut out);
        }
        out
    }
}

/// Index of the candidate with the highest containment score. Ties keep the
/// earlier candidate, so points on shared edges resolve the same way every time.
fn best_containing(candidates: &[SphericalTriangle], p: DVec3) -> usize {
    let mut best = 0;
    let mut best_score = f64::NEG_INFINITY;
    for (k, tri) in candidates.iter().enumerate() {
        let score = tri.containment(p);
        if score > best_score {
            best = k;
            best_score = score;
        }
    }
    best
}

#[cfg(test)]
mod tests {
    use super::*;

    fn radec(ra_deg: f64, dec_deg: f64) -> DVec3 {
        let (ra, dec) = (ra_deg.to_radians(), dec_deg.to_radians());
        DVec3::new(dec.cos() * ra.cos(), dec.cos() * ra.sin(), dec.sin())
    }

    #[test]
    fn test_mesh_sizes() {
        assert_eq!(HtmMesh::new(0).size(), 8);
        assert_eq!(HtmMesh::new(3).size(), 512);
        assert_eq!(HtmMesh::new(6).size(), 32_768);
    }

    #[test]
    #[should_panic(expected = "exceeds MAX_LEVEL")]
    fn test_level_too_deep_panics() {
        let _ = HtmMesh::new(HtmMesh::MAX_LEVEL + 1);
    }

    #[test]
    fn test_level_zero_partitions_are_roots() {
        let mesh = HtmMesh::new(0);
        for root in RootTriangle::ALL {
            let [a, b, c] = root.corners();
            let centroid = (a + b + c).normalize();
            assert_eq!(mesh.partition_of(centroid), Trixel(u32::from(root.index())));
        }
    }

    #[test]
    fn test_partition_contains_point() {
        let mesh = HtmMesh::new(4);
        for ra in (0..360).step_by(17) {
            for dec in (-85..=85).step_by(11) {
                let p = radec(f64::from(ra), f64::from(dec));
                let trixel = mesh.partition_of(p);
                assert!(trixel.index() < mesh.size());
                let tri = mesh.triangle(trixel).expect("trixel inside mesh");
                assert!(tri.containment(p) > -1e-9, "ra={ra} dec={dec} not in {trixel}");
            }
        }
    }

    #[test]
    fn test_poles_and_zero_vector() {
        let mesh = HtmMesh::new(3);
        let north = mesh.partition_of(DVec3::Z);
        assert!(north.index() >= mesh.size() / 2, "north pole in southern trixel");
        let south = mesh.partition_of(DVec3::NEG_Z);
        assert!(south.index() < mesh.size() / 2, "south pole in northern trixel");
        assert_eq!(mesh.partition_of(DVec3::ZERO), north);
    }

    #[test]
    fn test_partition_is_deterministic() {
        let mesh = HtmMesh::new(5);
        let p = radec(123.456, -45.678);
        assert_eq!(mesh.partition_of(p), mesh.partition_of(p * 3.0));
    }

    #[test]
    fn test_triangle_out_of_range() {
        let mesh = HtmMesh::new(2);
        assert!(mesh.triangle(Trixel(mesh.size() as u32)).is_none());
    }

    #[test]
    fn test_cap_contains_own_partition() {
        let mesh = HtmMesh::new(4);
        for ra in (0..360).step_by(29) {
            for dec in (-80..=80).step_by(20) {
                let p = radec(f64::from(ra), f64::from(dec));
                let own = mesh.partition_of(p);
                let cap = mesh.partitions_in_cap(p, 0.001);
                assert!(cap.contains(&own), "ra={ra} dec={dec}");
            }
        }
    }

    #[test]
    fn test_cap_is_sorted_and_bounded() {
        let mesh = HtmMesh::new(3);
        let cap = mesh.partitions_in_cap(radec(10.0, 20.0), 5f64.to_radians());
        assert!(!cap.is_empty());
        assert!(cap.windows(2).all(|w| w[0] < w[1]));
        assert!(cap.len() < mesh.size());
    }

    #[test]
    fn test_cap_covers_sampled_neighbourhood() {
        let mesh = HtmMesh::new(4);
        let center = radec(200.0, 30.0);
        let radius = 3f64.to_radians();
        let cap = mesh.partitions_in_cap(center, radius);
        for dra in [-2.0, -1.0, 0.0, 1.0, 2.0] {
            for ddec in [-2.0, -1.0, 0.0, 1.0, 2.0] {
                let p = radec(200.0 + dra, 30.0 + ddec);
                if angle_between(p, center) <= radius {
                    assert!(cap.contains(&mesh.partition_of(p)));
                }
            }
        }
    }

    #[test]
    fn test_whole_sky_cap() {
        let mesh = HtmMesh::new(2);
        let cap = mesh.partitions_in_cap(DVec3::X, std::f64::consts::PI);
        assert_eq!(cap.len(), mesh.size());
    }
}
