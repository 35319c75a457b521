//! Proper-motion buckets for incremental re-indexing.
//!
//! Objects fast enough to leave their partition between full rebuilds are
//! filed into buckets by motion magnitude. A patch only revisits bucket
//! members; everything slower stays where the last rebuild put it.

use starmesh_mesh::{MeshGeometry, Trixel};

use crate::epoch::Epoch;
use crate::index::TrixelIndex;
use crate::object::{ObjectArena, ObjectId};

/// Interval returned for motions too small to ever drift far enough.
pub const NEVER_CENTURIES: f64 = 1.0e6;

/// Julian centuries an object moving `pm_mas_yr` needs to drift `max_drift_arcmin`.
#[must_use]
pub fn reindex_interval(pm_mas_yr: f64, max_drift_arcmin: f64) -> f64 {
    if pm_mas_yr.abs() < 1e-9 {
        return NEVER_CENTURIES;
    }
    max_drift_arcmin * 60_000.0 / pm_mas_yr.abs() / 100.0
}

/// A bucket member and the partition it is currently filed under.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct MotionEntry {
    /// Partition whose list holds the object.
    pub trixel: Trixel,
    /// The object.
    pub object: ObjectId,
}

/// Objects whose motion meets `threshold`, but no larger bucket's.
#[derive(Clone, Debug)]
pub struct MotionBucket {
    threshold: f64,
    entries: Vec<MotionEntry>,
    indexed_at: Epoch,
}

impl MotionBucket {
    fn new(threshold: f64) -> Self {
        Self {
            threshold,
            entries: Vec::new(),
            indexed_at: Epoch::J2000,
        }
    }

    /// Minimum motion in mas/yr.
    #[must_use]
    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    /// Members in insertion order.
    #[must_use]
    pub fn entries(&self) -> &[MotionEntry] {
        &self.entries
    }

    /// Epoch this bucket was last indexed at.
    #[must_use]
    pub fn indexed_at(&self) -> Epoch {
        self.indexed_at
    }

    /// Append `entry` if `pm_mas_yr` meets the threshold.
    pub fn try_append(&mut self, pm_mas_yr: f64, entry: MotionEntry) -> bool {
        if pm_mas_yr < self.threshold {
            return false;
        }
        self.entries.push(entry);
        true
    }

    /// Move every member to its position at `epoch`, refiling those whose
    /// partition changed. Returns how many moved.
    pub fn reindex<M: MeshGeometry>(
        &mut self,
        epoch: Epoch,
        objects: &mut ObjectArena,
        index: &mut TrixelIndex,
        mesh: &M,
    ) -> usize {
        let mut moved = 0;
        for entry in &mut self.entries {
            let Some(object) = objects.get_mut(entry.object) else {
                continue;
            };
            object.update_position(epoch);
            let trixel = mesh.partition_of(object.direction());
            if trixel != entry.trixel {
                index.remove(entry.trixel, entry.object);
                index.push(trixel, entry.object);
                entry.trixel = trixel;
                moved += 1;
            }
        }
        self.indexed_at = epoch;
        moved
    }
}

/// The set of motion buckets, largest threshold first.
#[derive(Clone, Debug)]
pub struct MotionTracker {
    buckets: Vec<MotionBucket>,
    interval: f64,
}

impl MotionTracker {
    /// Tracker with one bucket per positive threshold (mas/yr).
    #[must_use]
    pub fn new(thresholds_mas_yr: &[f64], max_drift_arcmin: f64) -> Self {
        let mut thresholds: Vec<f64> = thresholds_mas_yr
            .iter()
            .copied()
            .filter(|t| *t > 0.0)
            .collect();
        thresholds.sort_by(|a, b| b.total_cmp(a));
        thresholds.dedup();

        let interval = thresholds
            .last()
            .map_or(NEVER_CENTURIES, |&lowest| {
                reindex_interval(lowest, max_drift_arcmin)
            });

        Self {
            buckets: thresholds.into_iter().map(MotionBucket::new).collect(),
            interval,
        }
    }

    /// File `entry` into the first bucket whose threshold `pm_mas_yr` meets.
    /// Returns the bucket position, or `None` for slow objects.
    pub fn insert(&mut self, pm_mas_yr: f64, entry: MotionEntry) -> Option<usize> {
        self.buckets
            .iter_mut()
            .position(|bucket| bucket.try_append(pm_mas_yr, entry))
    }

    /// Buckets in descending threshold order.
    #[must_use]
    pub fn buckets(&self) -> &[MotionBucket] {
        &self.buckets
    }

    /// Mutable buckets, for patching.
    pub fn buckets_mut(&mut self) -> &mut [MotionBucket] {
        &mut self.buckets
    }

    /// The smallest threshold, if there are any buckets.
    #[must_use]
    pub fn lowest_threshold(&self) -> Option<f64> {
        self.buckets.last().map(MotionBucket::threshold)
    }

    /// Largest epoch delta, in Julian centuries, a patch may cover.
    #[must_use]
    pub fn reindex_interval(&self) -> f64 {
        self.interval
    }

    /// Total members across all buckets.
    #[must_use]
    pub fn len(&self) -> usize {
        self.buckets.iter().map(|b| b.entries.len()).sum()
    }

    /// Whether no object is tracked.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Record that every bucket is current at `epoch`.
    pub fn mark_indexed(&mut self, epoch: Epoch) {
        for bucket in &mut self.buckets {
            bucket.indexed_at = epoch;
        }
    }

    /// Refresh the recorded partition of every member after a rebuild.
    pub fn retarget(&mut self, mut locate: impl FnMut(ObjectId) -> Trixel) {
        for entry in self.buckets.iter_mut().flat_map(|b| b.entries.iter_mut()) {
            entry.trixel = locate(entry.object);
        }
    }

    /// Position of the bucket holding `id`. Linear in the tracked count.
    #[must_use]
    pub fn bucket_of(&self, id: ObjectId) -> Option<usize> {
        self.buckets
            .iter()
            .position(|b| b.entries.iter().any(|e| e.object == id))
    }
}

impl Default for MotionTracker {
    fn default() -> Self {
        Self::new(&[840.0, 304.0], 25.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::CatalogObject;
    use crate::record::StarRecord;
    use starmesh_mesh::HtmMesh;

    fn entry(object: ObjectId) -> MotionEntry {
        MotionEntry {
            trixel: Trixel(0),
            object,
        }
    }

    fn arena_ids(n: usize) -> (ObjectArena, Vec<ObjectId>) {
        let mut arena = ObjectArena::new();
        let ids = (0..n)
            .map(|_| arena.push(CatalogObject::from_record(&StarRecord::default(), None)))
            .collect();
        (arena, ids)
    }

    #[test]
    fn test_interval_formula() {
        // 25' = 1.5e6 mas; at 304 mas/yr that is ~4934 years
        let interval = reindex_interval(304.0, 25.0);
        assert!((interval - 1_500_000.0 / 304.0 / 100.0).abs() < 1e-9);
        assert_eq!(reindex_interval(0.0, 25.0), NEVER_CENTURIES);
    }

    #[test]
    fn test_buckets_sorted_descending() {
        let tracker = MotionTracker::new(&[304.0, 840.0, 0.0, 304.0], 25.0);
        let thresholds: Vec<f64> = tracker.buckets().iter().map(|b| b.threshold()).collect();
        assert_eq!(thresholds, vec![840.0, 304.0]);
        assert_eq!(tracker.lowest_threshold(), Some(304.0));
        assert!((tracker.reindex_interval() - reindex_interval(304.0, 25.0)).abs() < 1e-12);
    }

    #[test]
    fn test_insert_first_matching_bucket() {
        let (_, ids) = arena_ids(4);
        let mut tracker = MotionTracker::default();
        assert_eq!(tracker.insert(1000.0, entry(ids[0])), Some(0));
        assert_eq!(tracker.insert(840.0, entry(ids[1])), Some(0));
        assert_eq!(tracker.insert(500.0, entry(ids[2])), Some(1));
        assert_eq!(tracker.insert(100.0, entry(ids[3])), None);
        assert_eq!(tracker.len(), 3);
        assert_eq!(tracker.bucket_of(ids[2]), Some(1));
        assert_eq!(tracker.bucket_of(ids[3]), None);
    }

    #[test]
    fn test_no_thresholds_never_patches() {
        let tracker = MotionTracker::new(&[], 25.0);
        assert!(tracker.buckets().is_empty());
        assert_eq!(tracker.reindex_interval(), NEVER_CENTURIES);
    }

    #[test]
    fn test_bucket_reindex_moves_entries() {
        let mesh = HtmMesh::new(3);
        let mut arena = ObjectArena::new();
        // 10"/yr northward from just below the equator
        let record = StarRecord::at_position(10.0, -0.01).with_proper_motion(0.0, 10_000.0);
        let id = arena.push(CatalogObject::from_record(&record, None));
        let start = mesh.partition_of(arena.get(id).unwrap().direction());

        let mut index = TrixelIndex::new(mesh.size());
        index.push(start, id);
        let mut tracker = MotionTracker::default();
        tracker.insert(10_000.0, MotionEntry { trixel: start, object: id });

        let epoch = Epoch::from_julian_year(2100.0);
        let moved = tracker.buckets_mut()[0].reindex(epoch, &mut arena, &mut index, &mesh);
        let now = mesh.partition_of(arena.get(id).unwrap().direction());
        assert_ne!(now, start);
        assert_eq!(moved, 1);
        assert_eq!(index.list(now), &[id]);
        assert!(index.list(start).is_empty());
        assert_eq!(tracker.buckets()[0].entries()[0].trixel, now);
        assert_eq!(tracker.buckets()[0].indexed_at(), epoch);
    }

    #[test]
    fn test_retarget_and_mark() {
        let (_, ids) = arena_ids(2);
        let mut tracker = MotionTracker::default();
        tracker.insert(900.0, entry(ids[0]));
        tracker.insert(400.0, entry(ids[1]));
        tracker.retarget(|id| Trixel(id.index() as u32 + 5));
        assert_eq!(tracker.buckets()[0].entries()[0].trixel, Trixel(5));
        assert_eq!(tracker.buckets()[1].entries()[0].trixel, Trixel(6));

        let epoch = Epoch::from_julian_year(2500.0);
        tracker.mark_indexed(epoch);
        assert!(tracker.buckets().iter().all(|b| b.indexed_at() == epoch));
    }
}
