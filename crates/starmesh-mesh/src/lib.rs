//! Sky mesh geometry: a hierarchical triangular mesh over the celestial sphere.

mod geometry;
mod htm;
mod root;
mod trixel;

pub use geometry::MeshGeometry;
pub use htm::HtmMesh;
pub use root::RootTriangle;
pub use trixel::{SphericalTriangle, Trixel, angle_between};
