//! Deep catalog tiers: fainter sub-catalogs consulted after the main index.

use std::borrow::Cow;
use std::path::PathBuf;

use starmesh_mesh::MeshGeometry;
use tracing::info;

use crate::error::CatalogError;
use crate::index::TrixelIndex;
use crate::loader::{CatalogSource, load_tier};
use crate::names::NameTables;
use crate::object::{CatalogObject, ObjectArena};
use crate::query::{Nearest, nearest_in};
use crate::record::ByteOrder;
use crate::sky_point::SkyPoint;

/// The object file behind a tier, for direct record reads.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct RecordSource {
    /// Object file path.
    pub path: PathBuf,
    /// Byte order of its records.
    pub byte_order: ByteOrder,
}

/// A sub-catalog consulted after the main index.
pub trait DeepCatalog {
    /// Short name for logs.
    fn name(&self) -> &str;

    /// Load the tier. Loading twice is a no-op.
    fn load(&mut self) -> Result<(), CatalogError>;

    /// Whether [`load`](DeepCatalog::load) has succeeded.
    fn is_loaded(&self) -> bool;

    /// Nearest-object queries reach this tier only when the magnitude limit
    /// is fainter than this.
    fn trigger_magnitude(&self) -> f32;

    /// Faintest magnitude in the tier, once loaded.
    fn faint_magnitude(&self) -> Option<f32>;

    /// Closest object at or brighter than `magnitude_limit` strictly within
    /// `max_radius_deg` of `center`.
    fn object_nearest(
        &self,
        center: &SkyPoint,
        max_radius_deg: f64,
        magnitude_limit: f32,
    ) -> Option<Nearest<'_>>;

    /// Object with this catalog number.
    fn find_by_catalog_number(&self, number: u32) -> Option<Cow<'_, CatalogObject>>;

    /// The loaded object file, if the tier reads one.
    fn record_source(&self) -> Option<RecordSource>;
}

/// A tier loaded completely into memory, without names.
pub struct StaticDeepCatalog<M: MeshGeometry> {
    name: String,
    source: CatalogSource,
    trigger_magnitude: f32,
    mesh: M,
    objects: ObjectArena,
    index: TrixelIndex,
    numbers: NameTables,
    byte_order: Option<ByteOrder>,
    faint_magnitude: f32,
}

impl<M: MeshGeometry> StaticDeepCatalog<M> {
    /// Tier reading `object_path`, partitioned with `mesh`.
    pub fn new(
        name: impl Into<String>,
        object_path: impl Into<PathBuf>,
        trigger_magnitude: f32,
        mesh: M,
    ) -> Self {
        let partitions = mesh.size();
        Self {
            name: name.into(),
            source: CatalogSource::unnamed(object_path),
            trigger_magnitude,
            mesh,
            objects: ObjectArena::new(),
            index: TrixelIndex::new(partitions),
            numbers: NameTables::new(),
            byte_order: None,
            faint_magnitude: 0.0,
        }
    }

    /// Number of loaded objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether no objects are loaded.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }
}

impl<M: MeshGeometry> DeepCatalog for StaticDeepCatalog<M> {
    fn name(&self) -> &str {
        &self.name
    }

    fn load(&mut self) -> Result<(), CatalogError> {
        if self.byte_order.is_some() {
            return Ok(());
        }
        let tier = load_tier(&self.source, &self.mesh)?;
        for (trixel, object) in tier.objects {
            let id = self.objects.push(object);
            if let Some(object) = self.objects.get(id) {
                self.numbers.insert(id, object);
            }
            self.index.push(trixel, id);
        }
        self.faint_magnitude = tier.faint_magnitude;
        self.byte_order = Some(tier.byte_order);
        info!(
            "Deep catalog {} ready: {} objects, trigger magnitude {:.1}",
            self.name,
            self.objects.len(),
            self.trigger_magnitude
        );
        Ok(())
    }

    fn is_loaded(&self) -> bool {
        self.byte_order.is_some()
    }

    fn trigger_magnitude(&self) -> f32 {
        self.trigger_magnitude
    }

    fn faint_magnitude(&self) -> Option<f32> {
        self.is_loaded().then_some(self.faint_magnitude)
    }

    fn object_nearest(
        &self,
        center: &SkyPoint,
        max_radius_deg: f64,
        magnitude_limit: f32,
    ) -> Option<Nearest<'_>> {
        let (id, distance_deg) = nearest_in(
            &self.mesh,
            &self.index,
            &self.objects,
            center,
            max_radius_deg,
            magnitude_limit,
        )?;
        self.objects.get(id).map(|object| Nearest {
            object: Cow::Borrowed(object),
            distance_deg,
        })
    }

    fn find_by_catalog_number(&self, number: u32) -> Option<Cow<'_, CatalogObject>> {
        self.numbers
            .by_number(number)
            .and_then(|id| self.objects.get(id))
            .map(Cow::Borrowed)
    }

    fn record_source(&self) -> Option<RecordSource> {
        self.byte_order.map(|byte_order| RecordSource {
            path: self.source.object_path.clone(),
            byte_order,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::StarRecord;
    use crate::writer::CatalogWriter;
    use starmesh_mesh::HtmMesh;

    fn deep_file(dir: &std::path::Path) -> PathBuf {
        let mesh = HtmMesh::new(2);
        let mut writer = CatalogWriter::for_mesh(&mesh).byte_order(ByteOrder::Big);
        for (i, ra) in [10.0, 10.2, 200.0].into_iter().enumerate() {
            let record = StarRecord::at_position(ra, 5.0)
                .with_magnitude(9.0 + i as f32)
                .with_catalog_number(100 + i as u32);
            writer.push_located(&mesh, record, None);
        }
        let path = dir.join("deep.dat");
        writer.write_files(&path, None).unwrap();
        path
    }

    #[test]
    fn test_load_idempotent_and_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = deep_file(dir.path());
        let mut tier = StaticDeepCatalog::new("deep", &path, 8.0, HtmMesh::new(2));
        assert!(!tier.is_loaded());
        assert!(tier.faint_magnitude().is_none());
        assert!(tier.record_source().is_none());
        tier.load().unwrap();
        tier.load().unwrap();
        assert_eq!(tier.len(), 3);
        assert!((tier.faint_magnitude().unwrap() - 11.0).abs() < 1e-6);
        assert_eq!(
            tier.record_source(),
            Some(RecordSource {
                path,
                byte_order: ByteOrder::Big
            })
        );
    }

    #[test]
    fn test_nearest_and_number_lookup() {
        let dir = tempfile::tempdir().unwrap();
        let mut tier = StaticDeepCatalog::new("deep", deep_file(dir.path()), 8.0, HtmMesh::new(2));
        tier.load().unwrap();

        let hit = tier
            .object_nearest(&SkyPoint::new(10.15, 5.0), 1.0, 12.0)
            .unwrap();
        assert_eq!(hit.object.catalog_number(), Some(101));
        assert!(matches!(hit.object, Cow::Borrowed(_)));

        // Magnitude 10 is too faint for a limit of 9.5
        let hit = tier
            .object_nearest(&SkyPoint::new(10.15, 5.0), 1.0, 9.5)
            .unwrap();
        assert_eq!(hit.object.catalog_number(), Some(100));

        assert_eq!(
            tier.find_by_catalog_number(102).unwrap().catalog_number(),
            Some(102)
        );
        assert!(tier.find_by_catalog_number(7).is_none());
    }

    #[test]
    fn test_missing_file_load_fails() {
        let dir = tempfile::tempdir().unwrap();
        let mut tier = StaticDeepCatalog::new("deep", dir.path().join("none.dat"), 8.0, HtmMesh::new(2));
        assert!(tier.load().is_err());
        assert!(!tier.is_loaded());
        assert!(tier.is_empty());
    }
}
