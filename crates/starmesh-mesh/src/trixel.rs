//! Trixel identifiers and the spherical triangles they name.

use glam::DVec3;

use crate::RootTriangle;

/// Dense identifier of a leaf partition, in `[0, mesh size)`.
///
/// At level `l` the id is `root * 4^l + path`, where `path` holds two bits per
/// subdivision step. Adding the implicit `8 * 4^l` offset gives the classic
/// HTM id (see [`Trixel::htm_id`]).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Trixel(pub u32);

impl Trixel {
    /// Position of this trixel in a dense per-partition array.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }

    /// HTM id with the leading root bit, e.g. `8..16` at level 0.
    #[must_use]
    pub fn htm_id(self, level: u8) -> u64 {
        u64::from(self.0) + 8 * (1u64 << (2 * u32::from(level)))
    }

    /// Inverse of [`Trixel::htm_id`]. Returns `None` if `id` is not a level-`level` id.
    #[must_use]
    pub fn from_htm_id(id: u64, level: u8) -> Option<Trixel> {
        let offset = 8 * (1u64 << (2 * u32::from(level)));
        if id < offset || id >= 2 * offset {
            return None;
        }
        u32::try_from(id - offset).ok().map(Trixel)
    }
}

impl std::fmt::Display for Trixel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "trixel {}", self.0)
    }
}

/// A triangle on the unit sphere bounded by great-circle arcs.
///
/// Corners are stored counter-clockwise as seen from outside the sphere, so a
/// point is inside exactly when it lies on the positive side of all three
/// edge planes.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SphericalTriangle {
    /// Unit-length corners.
    pub corners: [DVec3; 3],
}

impl SphericalTriangle {
    /// Triangle for a root face of the octahedron.
    #[must_use]
    pub fn root(root: RootTriangle) -> Self {
        Self {
            corners: root.corners(),
        }
    }

    /// The four children produced by splitting every edge at its midpoint.
    ///
    /// Ordered `[corner 0, corner 1, corner 2, center]`, which is the order the
    /// two path bits of a child encode.
    #[must_use]
    pub fn children(&self) -> [SphericalTriangle; 4] {
        let [v0, v1, v2] = self.corners;
        let w0 = (v1 + v2).normalize();
        let w1 = (v0 + v2).normalize();
        let w2 = (v0 + v1).normalize();
        [
            SphericalTriangle {
                corners: [v0, w2, w1],
            },
            SphericalTriangle {
                corners: [v1, w0, w2],
            },
            SphericalTriangle {
                corners: [v2, w1, w0],
            },
            SphericalTriangle {
                corners: [w0, w1, w2],
            },
        ]
    }

    /// Signed containment score of a unit direction.
    ///
    /// Non-negative when the point is inside or on the boundary. Comparing
    /// scores instead of testing signs keeps edge points deterministic: the
    /// sibling with the highest score wins.
    #[must_use]
    pub fn containment(&self, p: DVec3) -> f64 {
        let [a, b, c] = self.corners;
        a.cross(b)
            .dot(p)
            .min(b.cross(c).dot(p))
            .min(c.cross(a).dot(p))
    }

    /// True if `p` lies inside or on the boundary.
    #[must_use]
    pub fn contains(&self, p: DVec3) -> bool {
        self.containment(p) >= -1e-15
    }

    /// Smallest cap around the normalized centroid that holds every corner.
    ///
    /// Returns `(center, radius)` with the radius in radians. Since a cap
    /// narrower than a hemisphere is convex, it also holds the whole triangle.
    #[must_use]
    pub fn bounding_cap(&self) -> (DVec3, f64) {
        let [a, b, c] = self.corners;
        let center = (a + b + c).normalize();
        let radius = angle_between(center, a)
            .max(angle_between(center, b))
            .max(angle_between(center, c));
        (center, radius)
    }
}

/// Angle in radians between two unit vectors.
///
/// Uses `atan2(|a × b|, a · b)`, which stays accurate for tiny and
/// near-antipodal separations where `acos` does not.
#[must_use]
pub fn angle_between(a: DVec3, b: DVec3) -> f64 {
    a.cross(b).length().atan2(a.dot(b))
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPSILON: f64 = 1e-12;

    #[test]
    fn test_htm_id_roundtrip() {
        for level in 0..6u8 {
            for raw in [0u32, 1, 7, 8 * (1 << (2 * level)) - 1] {
                let trixel = Trixel(raw);
                let id = trixel.htm_id(level);
                assert_eq!(Trixel::from_htm_id(id, level), Some(trixel));
            }
        }
    }

    #[test]
    fn test_htm_id_level_zero_range() {
        assert_eq!(Trixel(0).htm_id(0), 8);
        assert_eq!(Trixel(7).htm_id(0), 15);
        assert_eq!(Trixel::from_htm_id(16, 0), None);
        assert_eq!(Trixel::from_htm_id(7, 0), None);
    }

    #[test]
    fn test_children_corners_on_unit_sphere() {
        let tri = SphericalTriangle::root(RootTriangle::N1);
        for child in tri.children() {
            for corner in child.corners {
                assert!((corner.length() - 1.0).abs() < EPSILON);
            }
        }
    }

    #[test]
    fn test_children_keep_orientation() {
        for root in RootTriangle::ALL {
            for child in SphericalTriangle::root(root).children() {
                let (center, _) = child.bounding_cap();
                assert!(child.containment(center) > 0.0);
            }
        }
    }

    #[test]
    fn test_child_centers_belong_to_one_child() {
        let tri = SphericalTriangle::root(RootTriangle::S3);
        let children = tri.children();
        for (i, child) in children.iter().enumerate() {
            let (center, _) = child.bounding_cap();
            assert!(tri.contains(center));
            for (j, other) in children.iter().enumerate() {
                if i != j {
                    assert!(!other.contains(center), "child {i} center inside child {j}");
                }
            }
        }
    }

    #[test]
    fn test_bounding_cap_holds_corners() {
        let tri = SphericalTriangle::root(RootTriangle::N0);
        let (center, radius) = tri.bounding_cap();
        for corner in tri.corners {
            assert!(angle_between(center, corner) <= radius + EPSILON);
        }
        assert!(radius < std::f64::consts::FRAC_PI_2);
    }

    #[test]
    fn test_angle_between() {
        assert!(angle_between(DVec3::X, DVec3::X).abs() < EPSILON);
        assert!((angle_between(DVec3::X, DVec3::Y) - std::f64::consts::FRAC_PI_2).abs() < EPSILON);
        assert!((angle_between(DVec3::X, DVec3::NEG_X) - std::f64::consts::PI).abs() < EPSILON);
    }
}
