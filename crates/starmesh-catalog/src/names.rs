//! Name and catalog-number lookup tables.

use rustc_hash::FxHashMap;

use crate::object::{CatalogObject, ObjectId};

/// Hash lookups built while loading.
#[derive(Clone, Debug, Default)]
pub struct NameTables {
    genitive: FxHashMap<String, ObjectId>,
    numbers: FxHashMap<u32, ObjectId>,
    names: Vec<String>,
}

impl NameTables {
    /// Empty tables.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Register every name and number `object` carries.
    ///
    /// Returns the object previously holding the same catalog number, if any.
    /// The later insert wins in both tables.
    pub fn insert(&mut self, id: ObjectId, object: &CatalogObject) -> Option<ObjectId> {
        if let Some(genitive) = object.genitive_name() {
            self.genitive.insert(genitive.to_string(), id);
        }
        if object.has_name() {
            let display = object.display_name();
            self.names.push(display.to_string());
            if let Some(genitive) = object.genitive_name()
                && genitive != display
            {
                self.names.push(genitive.to_string());
            }
        }
        object
            .catalog_number()
            .and_then(|number| self.numbers.insert(number, id))
    }

    /// Object with exactly this genitive name.
    #[must_use]
    pub fn by_genitive(&self, name: &str) -> Option<ObjectId> {
        self.genitive.get(name).copied()
    }

    /// Object with this catalog number.
    #[must_use]
    pub fn by_number(&self, number: u32) -> Option<ObjectId> {
        self.numbers.get(&number).copied()
    }

    /// Every display and genitive name, in load order.
    #[must_use]
    pub fn names(&self) -> &[String] {
        &self.names
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectArena;
    use crate::record::{NameRecord, StarRecord};

    fn object(number: u32, long: &str, genitive: &str) -> CatalogObject {
        let record = StarRecord::default().with_catalog_number(number);
        CatalogObject::from_record(&record, Some(&NameRecord::new(long, genitive)))
    }

    #[test]
    fn test_insert_and_lookup() {
        let mut arena = ObjectArena::new();
        let mut tables = NameTables::new();
        let vega = object(172_167, "Vega", "alp Lyr");
        let id = arena.push(vega.clone());
        assert_eq!(tables.insert(id, &vega), None);

        assert_eq!(tables.by_genitive("alp Lyr"), Some(id));
        assert_eq!(tables.by_genitive("ALP LYR"), None);
        assert_eq!(tables.by_number(172_167), Some(id));
        assert_eq!(tables.names(), &["Vega".to_string(), "alp Lyr".to_string()]);
    }

    #[test]
    fn test_genitive_only_listed_once() {
        let mut tables = NameTables::new();
        let mut arena = ObjectArena::new();
        let star = object(0, "", "bet Cyg");
        let id = arena.push(star.clone());
        tables.insert(id, &star);
        assert_eq!(tables.names(), &["bet Cyg".to_string()]);
        assert_eq!(tables.by_number(0), None);
    }

    #[test]
    fn test_later_insert_wins() {
        let mut arena = ObjectArena::new();
        let mut tables = NameTables::new();
        let first = object(42, "A", "x Y");
        let second = object(42, "B", "x Y");
        let a = arena.push(first.clone());
        let b = arena.push(second.clone());
        tables.insert(a, &first);
        assert_eq!(tables.insert(b, &second), Some(a));
        assert_eq!(tables.by_number(42), Some(b));
        assert_eq!(tables.by_genitive("x Y"), Some(b));
    }

    #[test]
    fn test_unnamed_not_listed() {
        let mut arena = ObjectArena::new();
        let mut tables = NameTables::new();
        let star = CatalogObject::from_record(&StarRecord::default().with_catalog_number(9), None);
        let id = arena.push(star.clone());
        tables.insert(id, &star);
        assert!(tables.names().is_empty());
        assert_eq!(tables.by_number(9), Some(id));
    }
}
