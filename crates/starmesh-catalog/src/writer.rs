//! Encoder for catalog file pairs.
//!
//! Produces files the loader reads back: an object file and, when any record
//! carries names, a name file with the name records in lock-step order.

use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use starmesh_mesh::{MeshGeometry, Trixel};

use crate::header::{CatalogHeader, FORMAT_VERSION};
use crate::record::{ByteOrder, NameRecord, STAR_RECORD_SIZE, StarRecord};
use crate::sky_point::SkyPoint;

/// Accumulates records per partition and writes them as a catalog file pair.
#[derive(Clone, Debug)]
pub struct CatalogWriter {
    mesh_level: u8,
    byte_order: ByteOrder,
    description: String,
    faint_magnitude: Option<f32>,
    partitions: Vec<Vec<(StarRecord, Option<NameRecord>)>>,
}

impl CatalogWriter {
    /// Writer with `partitions` empty partitions for a mesh at `mesh_level`.
    #[must_use]
    pub fn new(partitions: usize, mesh_level: u8) -> Self {
        Self {
            mesh_level,
            byte_order: ByteOrder::native(),
            description: String::from("starmesh catalog"),
            faint_magnitude: None,
            partitions: vec![Vec::new(); partitions],
        }
    }

    /// Writer sized for `mesh`.
    #[must_use]
    pub fn for_mesh<M: MeshGeometry>(mesh: &M) -> Self {
        Self::new(mesh.size(), mesh.level())
    }

    /// Byte order to write in. Defaults to the host order.
    #[must_use]
    pub fn byte_order(mut self, order: ByteOrder) -> Self {
        self.byte_order = order;
        self
    }

    /// Header description text.
    #[must_use]
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Faint magnitude written to the header. Defaults to the faintest record.
    #[must_use]
    pub fn faint_magnitude(mut self, magnitude: f32) -> Self {
        self.faint_magnitude = Some(magnitude);
        self
    }

    /// Append a record to `trixel`. The partition table grows to cover it.
    ///
    /// The named flag is set exactly when `names` is present.
    pub fn push(&mut self, trixel: Trixel, mut record: StarRecord, names: Option<NameRecord>) {
        if trixel.index() >= self.partitions.len() {
            self.partitions.resize(trixel.index() + 1, Vec::new());
        }
        if names.is_some() {
            record.flags |= StarRecord::FLAG_NAMED;
        } else {
            record.flags &= !StarRecord::FLAG_NAMED;
        }
        self.partitions[trixel.index()].push((record, names));
    }

    /// Append a record to the partition `mesh` assigns its position to.
    pub fn push_located<M: MeshGeometry>(
        &mut self,
        mesh: &M,
        record: StarRecord,
        names: Option<NameRecord>,
    ) -> Trixel {
        let point = SkyPoint::new(record.ra_deg(), record.dec_deg());
        let trixel = mesh.partition_of(point.to_unit_vector());
        self.push(trixel, record, names);
        trixel
    }

    /// Number of records pushed.
    #[must_use]
    pub fn len(&self) -> usize {
        self.partitions.iter().map(Vec::len).sum()
    }

    /// Whether no records were pushed.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    fn header(&self, counts: Vec<u32>) -> CatalogHeader {
        let faint = self.faint_magnitude.unwrap_or_else(|| {
            self.partitions
                .iter()
                .flatten()
                .map(|(record, _)| record.magnitude())
                .fold(0.0, f32::max)
        });
        CatalogHeader {
            description: self.description.clone(),
            byte_order: self.byte_order,
            version: FORMAT_VERSION,
            faint_magnitude: faint,
            mesh_level: self.mesh_level,
            record_counts: counts,
        }
    }

    fn object_header(&self) -> CatalogHeader {
        self.header(self.partitions.iter().map(|p| p.len() as u32).collect())
    }

    /// Write the object file.
    pub fn write_objects<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        self.object_header().write(writer)?;
        for (record, _) in self.partitions.iter().flatten() {
            writer.write_all(&record.encode(self.byte_order))?;
        }
        Ok(())
    }

    /// Write the name file: a header counting named records per partition,
    /// then the name records in object order.
    pub fn write_names<W: Write>(&self, writer: &mut W) -> std::io::Result<()> {
        let counts = self
            .partitions
            .iter()
            .map(|p| p.iter().filter(|(_, names)| names.is_some()).count() as u32)
            .collect();
        self.header(counts).write(writer)?;
        for names in self.partitions.iter().flatten().filter_map(|(_, n)| n.as_ref()) {
            writer.write_all(&names.encode())?;
        }
        Ok(())
    }

    /// Write the object file and, if given, the name file.
    pub fn write_files(&self, object_path: &Path, name_path: Option<&Path>) -> std::io::Result<()> {
        let mut objects = BufWriter::new(File::create(object_path)?);
        self.write_objects(&mut objects)?;
        objects.flush()?;

        if let Some(name_path) = name_path {
            let mut names = BufWriter::new(File::create(name_path)?);
            self.write_names(&mut names)?;
            names.flush()?;
        }
        Ok(())
    }

    /// Byte offset of each record with a catalog number, in write order.
    #[must_use]
    pub fn record_offsets(&self) -> Vec<(u32, u64)> {
        let mut offset = self.object_header().data_offset() as u64;
        let mut offsets = Vec::new();
        for (record, _) in self.partitions.iter().flatten() {
            if record.catalog_number != 0 {
                offsets.push((record.catalog_number, offset));
            }
            offset += STAR_RECORD_SIZE as u64;
        }
        offsets
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::NAME_RECORD_SIZE;
    use starmesh_mesh::HtmMesh;

    #[test]
    fn test_push_sets_named_flag() {
        let mut writer = CatalogWriter::new(8, 0);
        writer.push(Trixel(1), StarRecord::default(), Some(NameRecord::new("Vega", "alp Lyr")));
        let mut flagged = StarRecord::default();
        flagged.flags = StarRecord::FLAG_NAMED;
        writer.push(Trixel(1), flagged, None);

        let mut buf = Vec::new();
        writer.write_objects(&mut buf).unwrap();
        let mut reader = buf.as_slice();
        let header = CatalogHeader::read(&mut reader).unwrap();
        assert_eq!(header.record_counts[1], 2);
        let first = StarRecord::decode(&reader[..32], header.byte_order).unwrap();
        let second = StarRecord::decode(&reader[32..64], header.byte_order).unwrap();
        assert!(first.is_named());
        assert!(!second.is_named());
    }

    #[test]
    fn test_partition_table_grows() {
        let mut writer = CatalogWriter::new(3, 0);
        writer.push(Trixel(9), StarRecord::default(), None);
        let mut buf = Vec::new();
        writer.write_objects(&mut buf).unwrap();
        let header = CatalogHeader::read(&mut buf.as_slice()).unwrap();
        assert_eq!(header.record_counts.len(), 10);
    }

    #[test]
    fn test_faint_magnitude_default_and_override() {
        let mut writer = CatalogWriter::new(8, 0);
        writer.push(Trixel(0), StarRecord::default().with_magnitude(3.5), None);
        writer.push(Trixel(0), StarRecord::default().with_magnitude(6.25), None);
        let mut buf = Vec::new();
        writer.write_objects(&mut buf).unwrap();
        let header = CatalogHeader::read(&mut buf.as_slice()).unwrap();
        assert!((header.faint_magnitude - 6.25).abs() < 1e-6);

        let writer = writer.faint_magnitude(9.0);
        let mut buf = Vec::new();
        writer.write_objects(&mut buf).unwrap();
        let header = CatalogHeader::read(&mut buf.as_slice()).unwrap();
        assert!((header.faint_magnitude - 9.0).abs() < 1e-6);
    }

    #[test]
    fn test_name_file_holds_only_named_records() {
        let mut writer = CatalogWriter::new(8, 0);
        writer.push(Trixel(0), StarRecord::default(), Some(NameRecord::new("A", "")));
        writer.push(Trixel(0), StarRecord::default(), None);
        writer.push(Trixel(4), StarRecord::default(), Some(NameRecord::new("B", "")));
        let mut buf = Vec::new();
        writer.write_names(&mut buf).unwrap();
        let mut reader = buf.as_slice();
        let header = CatalogHeader::read(&mut reader).unwrap();
        assert_eq!(header.record_counts[0], 1);
        assert_eq!(header.record_counts[4], 1);
        assert_eq!(reader.len(), 2 * NAME_RECORD_SIZE);
        let second = NameRecord::decode(&reader[NAME_RECORD_SIZE..]).unwrap();
        assert_eq!(second.long_name().as_deref(), Some("B"));
    }

    #[test]
    fn test_push_located_uses_mesh() {
        let mesh = HtmMesh::new(2);
        let mut writer = CatalogWriter::for_mesh(&mesh);
        let record = StarRecord::at_position(45.0, 30.0);
        let trixel = writer.push_located(&mesh, record, None);
        let expected = mesh.partition_of(SkyPoint::new(record.ra_deg(), record.dec_deg()).to_unit_vector());
        assert_eq!(trixel, expected);
        assert_eq!(writer.len(), 1);
    }

    #[test]
    fn test_record_offsets() {
        let mut writer = CatalogWriter::new(2, 0);
        writer.push(Trixel(1), StarRecord::default().with_catalog_number(5), None);
        writer.push(Trixel(0), StarRecord::default(), None);
        writer.push(Trixel(0), StarRecord::default().with_catalog_number(3), None);
        // Partition 0 is written first
        let base = 136 + 2 * 4;
        assert_eq!(writer.record_offsets(), vec![(3, base), (5, base + 64)]);
    }

    #[test]
    fn test_write_files() {
        let dir = tempfile::tempdir().unwrap();
        let objects = dir.path().join("objects.dat");
        let names = dir.path().join("names.dat");
        let mut writer = CatalogWriter::new(8, 0).byte_order(ByteOrder::Big);
        writer.push(Trixel(2), StarRecord::default(), Some(NameRecord::new("C", "")));
        writer.write_files(&objects, Some(names.as_path())).unwrap();
        assert_eq!(std::fs::metadata(&objects).unwrap().len(), 136 + 32 + 32);
        assert_eq!(std::fs::metadata(&names).unwrap().len(), 136 + 32 + 40);
    }
}
