//! In-memory catalog objects and the arena that owns them.

use glam::DVec3;

use crate::epoch::Epoch;
use crate::record::{NameRecord, StarRecord};
use crate::sky_point::{Horizontal, Observer, ProperMotion, SkyPoint};

/// Display name of objects without a name record.
pub const UNNAMED_LABEL: &str = "star";

/// Handle to an object in an [`ObjectArena`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ObjectId(u32);

impl ObjectId {
    /// Position of the object in its arena.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl std::fmt::Display for ObjectId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Frame counter gating the just-in-time horizon update.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Generation(u64);

impl Generation {
    /// The generation after this one.
    #[must_use]
    pub fn next(self) -> Self {
        Self(self.0.wrapping_add(1))
    }
}

/// A star with its catalog data and time-dependent state.
#[derive(Clone, Debug, PartialEq)]
pub struct CatalogObject {
    catalog_position: SkyPoint,
    position: SkyPoint,
    magnitude: f32,
    bv_index: f32,
    parallax_mas: f64,
    spectral_type: [u8; 2],
    proper_motion: ProperMotion,
    catalog_number: u32,
    long_name: Option<String>,
    genitive_name: Option<String>,
    named: bool,
    horizontal: Horizontal,
    updated: Generation,
}

impl CatalogObject {
    /// Build an object from a decoded record and its optional name record.
    /// The current position starts at the catalog (J2000) position.
    #[must_use]
    pub fn from_record(record: &StarRecord, names: Option<&NameRecord>) -> Self {
        let catalog_position = SkyPoint::new(record.ra_deg(), record.dec_deg());
        Self {
            catalog_position,
            position: catalog_position,
            magnitude: record.magnitude(),
            bv_index: record.bv(),
            parallax_mas: record.parallax_mas(),
            spectral_type: record.spectral_type,
            proper_motion: ProperMotion {
                ra_mas_yr: record.pm_ra_mas_yr(),
                dec_mas_yr: record.pm_dec_mas_yr(),
            },
            catalog_number: record.catalog_number,
            long_name: names.and_then(NameRecord::long_name),
            genitive_name: names.and_then(NameRecord::genitive_name),
            named: names.is_some(),
            horizontal: Horizontal::default(),
            updated: Generation::default(),
        }
    }

    /// Position at J2000.
    #[must_use]
    pub fn catalog_position(&self) -> SkyPoint {
        self.catalog_position
    }

    /// Position at the epoch the object was last updated to.
    #[must_use]
    pub fn position(&self) -> SkyPoint {
        self.position
    }

    /// Unit direction of the current position.
    #[must_use]
    pub fn direction(&self) -> DVec3 {
        self.position.to_unit_vector()
    }

    /// Visual magnitude.
    #[must_use]
    pub fn magnitude(&self) -> f32 {
        self.magnitude
    }

    /// B−V colour index.
    #[must_use]
    pub fn bv_index(&self) -> f32 {
        self.bv_index
    }

    /// Parallax in milliarcseconds.
    #[must_use]
    pub fn parallax_mas(&self) -> f64 {
        self.parallax_mas
    }

    /// Spectral type, trailing blanks removed.
    #[must_use]
    pub fn spectral_type(&self) -> String {
        String::from_utf8_lossy(&self.spectral_type)
            .trim_end_matches([' ', '\0'])
            .to_string()
    }

    /// Proper motion.
    #[must_use]
    pub fn proper_motion(&self) -> ProperMotion {
        self.proper_motion
    }

    /// External catalog number, if the record had one.
    #[must_use]
    pub fn catalog_number(&self) -> Option<u32> {
        (self.catalog_number != 0).then_some(self.catalog_number)
    }

    /// Long (proper) name.
    #[must_use]
    pub fn long_name(&self) -> Option<&str> {
        self.long_name.as_deref()
    }

    /// Genitive (Bayer/Flamsteed) name.
    #[must_use]
    pub fn genitive_name(&self) -> Option<&str> {
        self.genitive_name.as_deref()
    }

    /// Long name, else genitive name, else [`UNNAMED_LABEL`].
    #[must_use]
    pub fn display_name(&self) -> &str {
        self.long_name
            .as_deref()
            .or(self.genitive_name.as_deref())
            .unwrap_or(UNNAMED_LABEL)
    }

    /// Whether the object was loaded with a name record. A name record with
    /// both names blank still counts; the object is then listed as
    /// [`UNNAMED_LABEL`].
    #[must_use]
    pub fn has_name(&self) -> bool {
        self.named
    }

    /// Horizon coordinates from the last horizon update.
    #[must_use]
    pub fn horizontal(&self) -> Horizontal {
        self.horizontal
    }

    /// Generation of the last just-in-time update.
    #[must_use]
    pub fn updated_generation(&self) -> Generation {
        self.updated
    }

    /// Position at `epoch`, propagated from J2000.
    #[must_use]
    pub fn position_at(&self, epoch: Epoch) -> SkyPoint {
        self.proper_motion
            .propagate(&self.catalog_position, epoch.years_since(Epoch::J2000))
    }

    /// Move the current position to `epoch`.
    pub fn update_position(&mut self, epoch: Epoch) {
        self.position = self.position_at(epoch);
    }

    /// Recompute horizon coordinates for `observer`.
    pub fn update_horizontal(&mut self, observer: &Observer) {
        self.horizontal = self.position.to_horizontal(observer);
    }

    /// Recompute horizon coordinates unless already done in `generation`.
    /// Returns whether an update happened.
    pub fn jit_update(&mut self, generation: Generation, observer: &Observer) -> bool {
        if self.updated == generation {
            return false;
        }
        self.update_horizontal(observer);
        self.updated = generation;
        true
    }

    /// Angular distance from the current position to `point`, in degrees.
    #[must_use]
    pub fn angular_distance_deg(&self, point: &SkyPoint) -> f64 {
        self.position.angular_separation_deg(point)
    }
}

/// Owner of every object in a tier. Index structures hold [`ObjectId`]s.
#[derive(Clone, Debug, Default)]
pub struct ObjectArena {
    objects: Vec<CatalogObject>,
}

impl ObjectArena {
    /// Empty arena.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Take ownership of `object` and return its handle.
    pub fn push(&mut self, object: CatalogObject) -> ObjectId {
        let id = ObjectId(self.objects.len() as u32);
        self.objects.push(object);
        id
    }

    /// Object behind `id`.
    #[must_use]
    pub fn get(&self, id: ObjectId) -> Option<&CatalogObject> {
        self.objects.get(id.index())
    }

    /// Mutable object behind `id`.
    pub fn get_mut(&mut self, id: ObjectId) -> Option<&mut CatalogObject> {
        self.objects.get_mut(id.index())
    }

    /// Number of objects.
    #[must_use]
    pub fn len(&self) -> usize {
        self.objects.len()
    }

    /// Whether the arena is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.objects.is_empty()
    }

    /// All objects with their handles, in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (ObjectId, &CatalogObject)> {
        self.objects
            .iter()
            .enumerate()
            .map(|(i, object)| (ObjectId(i as u32), object))
    }

    /// Mutable iteration, in insertion order.
    pub fn iter_mut(&mut self) -> impl Iterator<Item = (ObjectId, &mut CatalogObject)> {
        self.objects
            .iter_mut()
            .enumerate()
            .map(|(i, object)| (ObjectId(i as u32), object))
    }
}
