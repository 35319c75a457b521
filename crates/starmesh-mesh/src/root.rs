//! The eight root triangles of the octahedron that seeds the mesh.

use glam::DVec3;

/// Octahedron corners, indexed the way the root triangles reference them.
const CORNERS: [DVec3; 6] = [
    DVec3::Z,
    DVec3::X,
    DVec3::Y,
    DVec3::NEG_X,
    DVec3::NEG_Y,
    DVec3::NEG_Z,
];

/// One of the eight faces of the octahedron inscribed in the celestial sphere.
///
/// Southern faces come first so that the root index matches the conventional
/// HTM numbering (`S0` = 8 … `N3` = 15 once the implicit leading bit is added).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[repr(u8)]
pub enum RootTriangle {
    /// South, first quadrant.
    S0 = 0,
    /// South, second quadrant.
    S1 = 1,
    /// South, third quadrant.
    S2 = 2,
    /// South, fourth quadrant.
    S3 = 3,
    /// North, first quadrant.
    N0 = 4,
    /// North, second quadrant.
    N1 = 5,
    /// North, third quadrant.
    N2 = 6,
    /// North, fourth quadrant.
    N3 = 7,
}

impl RootTriangle {
    /// All root triangles in index order.
    pub const ALL: [RootTriangle; 8] = [
        RootTriangle::S0,
        RootTriangle::S1,
        RootTriangle::S2,
        RootTriangle::S3,
        RootTriangle::N0,
        RootTriangle::N1,
        RootTriangle::N2,
        RootTriangle::N3,
    ];

    /// Root triangle for an index in `0..8`.
    #[must_use]
    pub fn from_index(index: u8) -> Option<RootTriangle> {
        Self::ALL.get(index as usize).copied()
    }

    /// Position of this root in [`Self::ALL`].
    #[must_use]
    pub fn index(self) -> u8 {
        self as u8
    }

    /// True for the four faces above the celestial equator.
    #[must_use]
    pub fn is_north(self) -> bool {
        self.index() >= 4
    }

    /// Corners of the face, counter-clockwise when seen from outside the sphere.
    #[must_use]
    pub fn corners(self) -> [DVec3; 3] {
        let [a, b, c] = match self {
            RootTriangle::S0 => [1, 5, 2],
            RootTriangle::S1 => [2, 5, 3],
            RootTriangle::S2 => [3, 5, 4],
            RootTriangle::S3 => [4, 5, 1],
            RootTriangle::N0 => [1, 0, 4],
            RootTriangle::N1 => [4, 0, 3],
            RootTriangle::N2 => [3, 0, 2],
            RootTriangle::N3 => [2, 0, 1],
        };
        [CORNERS[a], CORNERS[b], CORNERS[c]]
    }
}

impl std::fmt::Display for RootTriangle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let hemisphere = if self.is_north() { 'N' } else { 'S' };
        write!(f, "{hemisphere}{}", self.index() % 4)
    }
}
