//! Per-partition object lists.

use starmesh_mesh::Trixel;

use crate::object::ObjectId;

/// One ordered list of object handles per mesh partition.
///
/// Lists keep insertion order; removal shifts later entries down.
#[derive(Clone, Debug, Default)]
pub struct TrixelIndex {
    lists: Vec<Vec<ObjectId>>,
}

impl TrixelIndex {
    /// Index with `partitions` empty lists.
    #[must_use]
    pub fn new(partitions: usize) -> Self {
        Self {
            lists: vec![Vec::new(); partitions],
        }
    }

    /// Number of partitions.
    #[must_use]
    pub fn partitions(&self) -> usize {
        self.lists.len()
    }

    /// Objects in `trixel`. Out-of-range trixels have no objects.
    #[must_use]
    pub fn list(&self, trixel: Trixel) -> &[ObjectId] {
        self.lists.get(trixel.index()).map_or(&[], Vec::as_slice)
    }

    /// Append `id` to the list of `trixel`.
    ///
    /// # Panics
    ///
    /// Panics if `trixel` is not a partition of this index.
    pub fn push(&mut self, trixel: Trixel, id: ObjectId) {
        self.lists[trixel.index()].push(id);
    }

    /// Remove `id` from the list of `trixel`, keeping the order of the rest.
    /// Returns whether it was there.
    pub fn remove(&mut self, trixel: Trixel, id: ObjectId) -> bool {
        let Some(list) = self.lists.get_mut(trixel.index()) else {
            return false;
        };
        match list.iter().position(|&entry| entry == id) {
            Some(pos) => {
                list.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Empty every list, keeping the partition count.
    pub fn clear(&mut self) {
        for list in &mut self.lists {
            list.clear();
        }
    }

    /// Total number of entries across all lists.
    #[must_use]
    pub fn len(&self) -> usize {
        self.lists.iter().map(Vec::len).sum()
    }

    /// Whether every list is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.lists.iter().all(Vec::is_empty)
    }

    /// Non-empty and empty lists alike, with their trixels, in ascending order.
    pub fn iter(&self) -> impl Iterator<Item = (Trixel, &[ObjectId])> {
        self.lists
            .iter()
            .enumerate()
            .map(|(i, list)| (Trixel(i as u32), list.as_slice()))
    }

    /// The trixel whose list holds `id`. Linear in the index size.
    #[must_use]
    pub fn locate(&self, id: ObjectId) -> Option<Trixel> {
        self.iter()
            .find(|(_, list)| list.contains(&id))
            .map(|(trixel, _)| trixel)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::{CatalogObject, ObjectArena};
    use crate::record::StarRecord;

    fn ids(n: usize) -> Vec<ObjectId> {
        let mut arena = ObjectArena::new();
        (0..n)
            .map(|_| arena.push(CatalogObject::from_record(&StarRecord::default(), None)))
            .collect()
    }

    #[test]
    fn test_push_keeps_insertion_order() {
        let ids = ids(3);
        let mut index = TrixelIndex::new(4);
        index.push(Trixel(2), ids[2]);
        index.push(Trixel(2), ids[0]);
        index.push(Trixel(1), ids[1]);
        assert_eq!(index.list(Trixel(2)), &[ids[2], ids[0]]);
        assert_eq!(index.len(), 3);
        assert_eq!(index.locate(ids[1]), Some(Trixel(1)));
    }

    #[test]
    fn test_remove_preserves_order() {
        let ids = ids(3);
        let mut index = TrixelIndex::new(1);
        for &id in &ids {
            index.push(Trixel(0), id);
        }
        assert!(index.remove(Trixel(0), ids[1]));
        assert!(!index.remove(Trixel(0), ids[1]));
        assert_eq!(index.list(Trixel(0)), &[ids[0], ids[2]]);
    }

    #[test]
    fn test_out_of_range_is_empty() {
        let ids = ids(1);
        let mut index = TrixelIndex::new(2);
        assert!(index.list(Trixel(7)).is_empty());
        assert!(!index.remove(Trixel(7), ids[0]));
    }

    #[test]
    fn test_clear_keeps_partitions() {
        let ids = ids(2);
        let mut index = TrixelIndex::new(8);
        index.push(Trixel(3), ids[0]);
        index.push(Trixel(5), ids[1]);
        index.clear();
        assert!(index.is_empty());
        assert_eq!(index.partitions(), 8);
        assert_eq!(index.iter().count(), 8);
    }
}
