//! Synthetic catalog files for running the demo without real star data.

use std::path::Path;

use rand::{Rng, SeedableRng};
use rand_xoshiro::Xoshiro256StarStar;
use starmesh_catalog::{CatalogWriter, NameRecord, OffsetIndex, StarRecord};
use starmesh_config::Config;
use starmesh_mesh::{HtmMesh, MeshGeometry};
use tracing::info;

/// A few well-known stars so name lookups have something to find.
const NAMED_STARS: [(f64, f64, f32, f64, f64, u32, &str, &str, &str); 6] = [
    (101.287, -16.716, -1.46, -546.0, -1223.0, 48_915, "Sirius", "alp CMa", "A1"),
    (279.234, 38.784, 0.03, 200.9, 286.2, 172_167, "Vega", "alp Lyr", "A0"),
    (88.793, 7.407, 0.42, 27.5, 11.3, 39_801, "Betelgeuse", "alp Ori", "M1"),
    (219.900, -60.835, -0.27, -3679.3, 473.7, 128_620, "Rigil Kentaurus", "alp Cen", "G2"),
    (213.915, 19.182, -0.05, -1093.4, -1999.4, 124_897, "Arcturus", "alp Boo", "K1"),
    (269.452, 4.693, 9.5, -798.6, 10_328.1, 0, "Barnard's Star", "", "M4"),
];

/// Catalog numbers of generated stars start here, clear of the named ones.
const FIRST_SYNTHETIC_NUMBER: u32 = 300_000;

/// Uniformly distributed point on the sphere as (RA, Dec) in degrees.
fn random_position(rng: &mut Xoshiro256StarStar) -> (f64, f64) {
    let ra = rng.gen_range(0.0..360.0);
    let dec = rng.gen_range(-1.0_f64..1.0).asin().to_degrees();
    (ra, dec)
}

fn random_star(rng: &mut Xoshiro256StarStar, number: u32, magnitudes: (f32, f32)) -> StarRecord {
    let (ra, dec) = random_position(rng);
    // Roughly one star in fifty is a fast mover
    let spread = if rng.gen_ratio(1, 50) { 2500.0 } else { 60.0 };
    StarRecord::at_position(ra, dec)
        .with_magnitude(rng.gen_range(magnitudes.0..magnitudes.1))
        .with_proper_motion(rng.gen_range(-spread..spread), rng.gen_range(-spread..spread))
        .with_catalog_number(number)
        .with_spectral_type(["O5", "B3", "A0", "F5", "G2", "K0", "M2"][rng.gen_range(0..7)])
}

/// Write the named tier, every configured deep tier and the offset index
/// into the configured data directory.
pub(crate) fn write_catalogs(config: &Config, stars: usize, seed: u64) -> std::io::Result<()> {
    let data = &config.data;
    std::fs::create_dir_all(&data.data_dir)?;
    let mut rng = Xoshiro256StarStar::seed_from_u64(seed);
    let level = config.mesh.level.min(HtmMesh::MAX_LEVEL);
    let mesh = HtmMesh::new(level);

    let mut named = CatalogWriter::for_mesh(&mesh).description("starmesh demo: named stars");
    for (ra, dec, mag, pm_ra, pm_dec, number, long, genitive, spectral) in NAMED_STARS {
        let record = StarRecord::at_position(ra, dec)
            .with_magnitude(mag)
            .with_proper_motion(pm_ra, pm_dec)
            .with_catalog_number(number)
            .with_spectral_type(spectral);
        named.push_located(&mesh, record, Some(NameRecord::new(long, genitive)));
    }
    let mut number = FIRST_SYNTHETIC_NUMBER;
    for _ in 0..stars {
        number += 1;
        named.push_located(&mesh, random_star(&mut rng, number, (-1.0, 6.5)), None);
    }
    named.write_files(&data.object_path(), Some(data.name_path().as_path()))?;
    info!(
        "Wrote {} named-tier stars to {}",
        named.len(),
        data.object_path().display()
    );

    // Each deep tier is fainter and denser than the one before
    let mut bright = 6.5_f32;
    let mut last_offsets = Vec::new();
    for (tier, deep) in data.deep_catalogs.iter().enumerate() {
        let tier_mesh = HtmMesh::new(deep.mesh_level.unwrap_or(level).min(HtmMesh::MAX_LEVEL));
        let faint = bright + 2.5;
        let mut writer = CatalogWriter::for_mesh(&tier_mesh)
            .description(format!("starmesh demo: {}", deep.file));
        for _ in 0..stars * (tier + 2) {
            number += 1;
            writer.push_located(&tier_mesh, random_star(&mut rng, number, (bright, faint)), None);
        }
        let path = data.deep_catalog_path(deep);
        writer.write_files(&path, None)?;
        info!(
            "Wrote {} stars (magnitude {:.1} to {:.1}, level {}) to {}",
            writer.len(),
            bright,
            faint,
            tier_mesh.level(),
            path.display()
        );
        last_offsets = writer.record_offsets();
        bright = faint;
    }

    if let Some(path) = data.offset_index_path() {
        write_offset_index(&path, &last_offsets)?;
    }
    Ok(())
}

fn write_offset_index(path: &Path, offsets: &[(u32, u64)]) -> std::io::Result<()> {
    OffsetIndex::write(path, offsets)?;
    info!(
        "Wrote offset index for {} records to {}",
        offsets.len(),
        path.display()
    );
    Ok(())
}
