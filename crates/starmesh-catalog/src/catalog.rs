//! The star catalog session: index, lookups and time advance.

use std::borrow::Cow;
use std::path::PathBuf;

use starmesh_config::Config;
use starmesh_mesh::{HtmMesh, MeshGeometry, Trixel};
use tracing::{debug, info, warn};

use crate::deep::{DeepCatalog, StaticDeepCatalog};
use crate::epoch::Epoch;
use crate::error::CatalogError;
use crate::index::TrixelIndex;
use crate::loader::{CatalogSource, LoadedTier, load_tier};
use crate::motion::{MotionEntry, MotionTracker};
use crate::names::NameTables;
use crate::object::{CatalogObject, Generation, ObjectArena, ObjectId};
use crate::offset_index::OffsetIndex;
use crate::query::{Nearest, nearest_in};
use crate::sky_point::{Observer, SkyPoint};

/// Tunables for a [`StarCatalog`].
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogOptions {
    /// Motion bucket thresholds in mas/yr.
    pub motion_thresholds_mas_yr: Vec<f64>,
    /// Drift allowed at the lowest threshold before a full rebuild.
    pub max_drift_arcmin: f64,
    /// Epoch the index is brought to right after loading.
    pub reference_epoch: Epoch,
    /// Faintest magnitude queries consider.
    pub magnitude_limit: f32,
    /// Observer for horizon coordinates.
    pub observer: Observer,
}

impl Default for CatalogOptions {
    fn default() -> Self {
        Self {
            motion_thresholds_mas_yr: vec![840.0, 304.0],
            max_drift_arcmin: 25.0,
            reference_epoch: Epoch::J2000,
            magnitude_limit: 8.0,
            observer: Observer::default(),
        }
    }
}

impl From<&Config> for CatalogOptions {
    fn from(config: &Config) -> Self {
        Self {
            motion_thresholds_mas_yr: config.index.motion_thresholds_mas_yr.clone(),
            max_drift_arcmin: config.index.max_drift_arcmin,
            reference_epoch: Epoch::from_julian_year(config.index.reference_epoch_year),
            magnitude_limit: config.query.magnitude_limit,
            observer: Observer {
                latitude_deg: config.observer.latitude_deg,
                local_sidereal_time_deg: config.observer.local_sidereal_time_deg,
            },
        }
    }
}

/// What [`StarCatalog::reindex`] did.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ReindexOutcome {
    /// Every object was re-filed.
    Rebuilt {
        /// Objects re-filed.
        objects: usize,
    },
    /// Only motion-bucket members were revisited.
    Patched {
        /// Bucket members whose position was recomputed.
        examined: usize,
        /// Members that changed partition.
        moved: usize,
    },
}

/// A loaded star catalog with its spatial index and lookup tables.
///
/// Objects live in one arena; the trixel index, name tables and motion
/// buckets hold [`ObjectId`]s into it.
pub struct StarCatalog<M: MeshGeometry = HtmMesh> {
    mesh: M,
    source: CatalogSource,
    options: CatalogOptions,
    objects: ObjectArena,
    index: TrixelIndex,
    names: NameTables,
    motion: MotionTracker,
    deep: Vec<Box<dyn DeepCatalog>>,
    offset_index: Option<OffsetIndex>,
    reference_epoch: Epoch,
    epoch: Epoch,
    generation: Generation,
    faint_magnitude: Option<f32>,
    magnitude_limit: f32,
    observer: Observer,
    loaded: bool,
}

impl StarCatalog<HtmMesh> {
    /// Catalog laid out as `config` describes. Deep tiers whose files exist
    /// are registered, and the offset index is opened when present.
    /// Nothing is loaded yet.
    #[must_use]
    pub fn from_config(config: &Config) -> Self {
        let level = config.mesh.level.min(HtmMesh::MAX_LEVEL);
        let source = CatalogSource::named(config.data.object_path(), config.data.name_path());
        let mut catalog = Self::new(HtmMesh::new(level), source, CatalogOptions::from(config));

        for deep in &config.data.deep_catalogs {
            let mesh_level = deep.mesh_level.unwrap_or(level).min(HtmMesh::MAX_LEVEL);
            catalog.add_deep_catalog_if_exists(
                deep.file.clone(),
                config.data.deep_catalog_path(deep),
                deep.trigger_magnitude,
                HtmMesh::new(mesh_level),
            );
        }

        if let Some(path) = config.data.offset_index_path()
            && path.exists()
        {
            match OffsetIndex::open(&path) {
                Ok(index) => catalog.set_offset_index(index),
                Err(e) => warn!("Ignoring offset index: {e}"),
            }
        }
        catalog
    }
}

impl<M: MeshGeometry> StarCatalog<M> {
    /// An empty catalog reading `source`, partitioned by `mesh`.
    pub fn new(mesh: M, source: CatalogSource, options: CatalogOptions) -> Self {
        let motion = MotionTracker::new(&options.motion_thresholds_mas_yr, options.max_drift_arcmin);
        debug!(
            "Re-index interval {:.2} centuries for {} motion buckets",
            motion.reindex_interval(),
            motion.buckets().len()
        );
        Self {
            index: TrixelIndex::new(mesh.size()),
            mesh,
            source,
            objects: ObjectArena::new(),
            names: NameTables::new(),
            motion,
            deep: Vec::new(),
            offset_index: None,
            reference_epoch: Epoch::J2000,
            epoch: options.reference_epoch,
            generation: Generation::default(),
            faint_magnitude: None,
            magnitude_limit: options.magnitude_limit,
            observer: options.observer,
            options,
            loaded: false,
        }
    }

    /// Load the catalog pair and bring the index to the current epoch.
    ///
    /// Loading twice is a no-op. On error nothing is indexed.
    pub fn load(&mut self) -> Result<(), CatalogError> {
        if self.loaded {
            debug!("{} already loaded", self.source.object_path.display());
            return Ok(());
        }
        let tier = load_tier(&self.source, &self.mesh)?;
        self.commit(tier);
        self.loaded = true;

        // Records are filed by their J2000 position
        let target = self.epoch;
        self.reference_epoch = Epoch::J2000;
        self.epoch = Epoch::J2000;
        self.motion.mark_indexed(Epoch::J2000);
        if target != Epoch::J2000 {
            self.reindex(target);
        }
        Ok(())
    }

    fn commit(&mut self, tier: LoadedTier) {
        for (trixel, mut object) in tier.objects {
            object.update_horizontal(&self.observer);
            let pm = object.proper_motion().magnitude();
            let id = self.objects.push(object);
            if let Some(object) = self.objects.get(id)
                && let Some(previous) = self.names.insert(id, object)
            {
                debug!("Catalog number shared by {previous} and {id}; keeping {id}");
            }
            self.index.push(trixel, id);
            self.motion.insert(pm, MotionEntry { trixel, object: id });
        }

        let faint = self
            .faint_magnitude
            .map_or(tier.faint_magnitude, |f| f.max(tier.faint_magnitude));
        self.faint_magnitude = Some(faint);
        self.magnitude_limit = self.options.magnitude_limit.min(faint);

        info!(
            "Indexed {} objects, {} fast movers, faint magnitude {:.2}",
            self.objects.len(),
            self.motion.len(),
            faint
        );
    }

    /// Register a deep tier. Tiers are consulted in the order added.
    pub fn add_deep_catalog(&mut self, tier: Box<dyn DeepCatalog>) {
        self.deep.push(tier);
    }

    /// Register a [`StaticDeepCatalog`] for `path` if the file exists.
    /// Returns whether it was added.
    pub fn add_deep_catalog_if_exists<D: MeshGeometry + 'static>(
        &mut self,
        name: impl Into<String>,
        path: impl Into<PathBuf>,
        trigger_magnitude: f32,
        mesh: D,
    ) -> bool {
        let path = path.into();
        if !path.exists() {
            debug!("No deep catalog at {}", path.display());
            return false;
        }
        self.add_deep_catalog(Box::new(StaticDeepCatalog::new(
            name,
            path,
            trigger_magnitude,
            mesh,
        )));
        true
    }

    /// Load every registered deep tier, in priority order. A tier that fails
    /// stays unloaded and contributes nothing; the others still load. Loaded
    /// tiers widen the range the magnitude limit may reach.
    ///
    /// Returns the failures, in priority order.
    pub fn load_deep_catalogs(&mut self) -> Vec<CatalogError> {
        let mut failures = Vec::new();
        for tier in &mut self.deep {
            if let Err(e) = tier.load() {
                warn!("Deep catalog {} not loaded: {e}", tier.name());
                failures.push(e);
                continue;
            }
            if let Some(faint) = tier.faint_magnitude() {
                self.faint_magnitude = Some(self.faint_magnitude.map_or(faint, |f| f.max(faint)));
            }
        }
        self.set_magnitude_limit(self.options.magnitude_limit);
        failures
    }

    /// Use `index` to read records of the lowest-priority tier by number.
    pub fn set_offset_index(&mut self, index: OffsetIndex) {
        self.offset_index = Some(index);
    }

    /// Bring the index to `epoch`: a full rebuild when `epoch` is further
    /// from the reference epoch than the re-index interval, otherwise a patch
    /// of the motion buckets.
    pub fn reindex(&mut self, epoch: Epoch) -> ReindexOutcome {
        let delta = epoch.centuries_between(self.reference_epoch);
        let outcome = if delta > self.motion.reindex_interval() {
            self.rebuild(epoch)
        } else {
            self.patch(epoch)
        };
        self.epoch = epoch;
        outcome
    }

    /// Re-file every object by its position at `epoch` and make `epoch` the
    /// reference epoch.
    pub fn rebuild(&mut self, epoch: Epoch) -> ReindexOutcome {
        self.index.clear();
        let mut located = Vec::with_capacity(self.objects.len());
        for (id, object) in self.objects.iter_mut() {
            object.update_position(epoch);
            let trixel = self.mesh.partition_of(object.direction());
            self.index.push(trixel, id);
            located.push(trixel);
        }
        self.motion.retarget(|id| located[id.index()]);
        self.motion.mark_indexed(epoch);
        self.reference_epoch = epoch;
        self.epoch = epoch;

        info!(
            "Rebuilt trixel index for {} objects at {}",
            located.len(),
            epoch
        );
        ReindexOutcome::Rebuilt {
            objects: located.len(),
        }
    }

    fn patch(&mut self, epoch: Epoch) -> ReindexOutcome {
        let mut examined = 0;
        let mut moved = 0;
        for bucket in self.motion.buckets_mut() {
            examined += bucket.entries().len();
            moved += bucket.reindex(epoch, &mut self.objects, &mut self.index, &self.mesh);
        }
        debug!("Patched {examined} fast movers to {epoch}, {moved} changed partition");
        ReindexOutcome::Patched { examined, moved }
    }

    /// Object with exactly this genitive name.
    #[must_use]
    pub fn find_by_genitive_name(&self, name: &str) -> Option<&CatalogObject> {
        self.names
            .by_genitive(name)
            .and_then(|id| self.objects.get(id))
    }

    /// First object loaded with a name record whose display, long or genitive
    /// name matches, ignoring case. Named objects with blank names answer to
    /// their display name.
    #[must_use]
    pub fn find_by_name(&self, name: &str) -> Option<&CatalogObject> {
        let needle = name.to_lowercase();
        let matches = |candidate: Option<&str>| {
            candidate.is_some_and(|c| c.to_lowercase() == needle)
        };
        self.objects
            .iter()
            .map(|(_, object)| object)
            .filter(|object| object.has_name())
            .find(|object| {
                matches(Some(object.display_name()))
                    || matches(object.long_name())
                    || matches(object.genitive_name())
            })
    }

    /// Handle of the main-tier object with this catalog number.
    #[must_use]
    pub fn find_id_by_catalog_number(&self, number: u32) -> Option<ObjectId> {
        self.names.by_number(number)
    }

    /// Object with this catalog number: the main tier first, then each deep
    /// tier, then a direct read through the offset index.
    #[must_use]
    pub fn find_by_catalog_number(&self, number: u32) -> Option<Cow<'_, CatalogObject>> {
        if number == 0 {
            return None;
        }
        if let Some(object) = self
            .find_id_by_catalog_number(number)
            .and_then(|id| self.objects.get(id))
        {
            return Some(Cow::Borrowed(object));
        }
        for tier in self.deep.iter().filter(|tier| tier.is_loaded()) {
            if let Some(object) = tier.find_by_catalog_number(number) {
                return Some(object);
            }
        }
        self.read_indexed(number).map(Cow::Owned)
    }

    fn read_indexed(&self, number: u32) -> Option<CatalogObject> {
        let index = self.offset_index.as_ref()?;
        let source = self.deep.last()?.record_source()?;
        match index.read_record(&source, number) {
            Ok(Some(record)) if record.catalog_number == number => {
                let mut object = CatalogObject::from_record(&record, None);
                object.update_position(self.epoch);
                object.update_horizontal(&self.observer);
                Some(object)
            }
            Ok(Some(record)) => {
                warn!(
                    "Offset index entry for {number} points at catalog number {}",
                    record.catalog_number
                );
                None
            }
            Ok(None) => None,
            Err(e) => {
                warn!("Offset index lookup of {number} failed: {e}");
                None
            }
        }
    }

    /// Closest object at or brighter than the magnitude limit within
    /// `max_radius_deg` of `center`, across the main index and every deep
    /// tier the limit triggers.
    #[must_use]
    pub fn object_nearest(&self, center: &SkyPoint, max_radius_deg: f64) -> Option<Nearest<'_>> {
        let mut radius = max_radius_deg;
        let mut best = nearest_in(
            &self.mesh,
            &self.index,
            &self.objects,
            center,
            radius,
            self.magnitude_limit,
        )
        .and_then(|(id, distance_deg)| {
            radius = distance_deg;
            self.objects.get(id).map(|object| Nearest {
                object: Cow::Borrowed(object),
                distance_deg,
            })
        });

        for tier in &self.deep {
            if !tier.is_loaded() || self.magnitude_limit <= tier.trigger_magnitude() {
                continue;
            }
            if let Some(hit) = tier.object_nearest(center, radius, self.magnitude_limit)
                && hit.distance_deg < radius
            {
                radius = hit.distance_deg;
                best = Some(hit);
            }
        }
        best
    }

    /// Start a new frame; each object's horizon coordinates refresh at most
    /// once per generation.
    pub fn begin_generation(&mut self) -> Generation {
        self.generation = self.generation.next();
        self.generation
    }

    /// Visit every object within `radius_deg` of `center` at or brighter than
    /// the magnitude limit, refreshing its horizon coordinates for the
    /// current generation first. Returns how many were visited.
    pub fn visit_region(
        &mut self,
        center: &SkyPoint,
        radius_deg: f64,
        mut visit: impl FnMut(ObjectId, &CatalogObject),
    ) -> usize {
        let generation = self.generation;
        let observer = self.observer;
        let limit = self.magnitude_limit;
        let mut visited = 0;
        for trixel in self
            .mesh
            .partitions_in_cap(center.to_unit_vector(), radius_deg.to_radians())
        {
            for &id in self.index.list(trixel) {
                let Some(object) = self.objects.get_mut(id) else {
                    continue;
                };
                if object.magnitude() > limit || object.angular_distance_deg(center) > radius_deg {
                    continue;
                }
                object.jit_update(generation, &observer);
                visit(id, object);
                visited += 1;
            }
        }
        visited
    }

    /// Set the magnitude limit, clamped to the faintest loaded magnitude.
    /// Returns the limit in effect.
    pub fn set_magnitude_limit(&mut self, limit: f32) -> f32 {
        self.options.magnitude_limit = limit;
        self.magnitude_limit = match self.faint_magnitude {
            Some(faint) => limit.min(faint),
            None => limit,
        };
        self.magnitude_limit
    }

    /// Change the observer. Horizon coordinates refresh on the next generation.
    pub fn set_observer(&mut self, observer: Observer) {
        self.observer = observer;
    }

    /// Objects filed under a partition other than the one their current
    /// position falls in.
    #[must_use]
    pub fn misplaced_objects(&self) -> Vec<ObjectId> {
        self.index
            .iter()
            .flat_map(|(trixel, ids)| ids.iter().map(move |&id| (trixel, id)))
            .filter(|&(trixel, id)| {
                self.objects
                    .get(id)
                    .is_some_and(|object| self.mesh.partition_of(object.direction()) != trixel)
            })
            .map(|(_, id)| id)
            .collect()
    }

    /// The object behind `id`.
    #[must_use]
    pub fn object(&self, id: ObjectId) -> Option<&CatalogObject> {
        self.objects.get(id)
    }

    /// Main-tier objects with their handles.
    pub fn objects(&self) -> impl Iterator<Item = (ObjectId, &CatalogObject)> {
        self.objects.iter()
    }

    /// Partition whose list holds `id`.
    #[must_use]
    pub fn partition_of_object(&self, id: ObjectId) -> Option<Trixel> {
        self.index.locate(id)
    }

    /// Number of main-tier objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the main tier has no objects.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// Whether [`load`](Self::load) has succeeded.
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.loaded
    }

    /// The mesh.
    #[must_use]
    pub fn mesh(&self) -> &M {
        &self.mesh
    }

    /// The trixel index.
    #[must_use]
    pub fn index(&self) -> &TrixelIndex {
        &self.index
    }

    /// The motion buckets.
    #[must_use]
    pub fn motion(&self) -> &MotionTracker {
        &self.motion
    }

    /// Every display and genitive name, in load order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        self.names.names()
    }

    /// Registered deep tiers, in priority order.
    #[must_use]
    pub fn deep_catalogs(&self) -> &[Box<dyn DeepCatalog>] {
        &self.deep
    }

    /// Epoch of the last full rebuild.
    #[must_use]
    pub fn reference_epoch(&self) -> Epoch {
        self.reference_epoch
    }

    /// Epoch of the last [`reindex`](Self::reindex).
    #[must_use]
    pub fn epoch(&self) -> Epoch {
        self.epoch
    }

    /// Current generation.
    #[must_use]
    pub fn generation(&self) -> Generation {
        self.generation
    }

    /// Faintest magnitude loaded so far.
    #[must_use]
    pub fn faint_magnitude(&self) -> Option<f32> {
        self.faint_magnitude
    }

    /// Magnitude limit in effect.
    #[must_use]
    pub fn magnitude_limit(&self) -> f32 {
        self.magnitude_limit
    }

    /// Observer for horizon coordinates.
    #[must_use]
    pub fn observer(&self) -> Observer {
        self.observer
    }
}
