//! Demo binary that builds, loads and queries a star catalog.
//!
//! Configuration is loaded from `config.ron` and can be overridden via CLI flags.
//! Run with `cargo run -p starmesh-demo` to generate a synthetic catalog and query it.
//! Run with `cargo run -p starmesh-demo -- --year 12000 --magnitude-limit 10` to look
//! further ahead and deeper.

mod synthetic;

use std::path::PathBuf;

use clap::Parser;
use starmesh_catalog::{CatalogError, Epoch, Observer, ReindexOutcome, SkyPoint, StarCatalog};
use starmesh_config::{CliArgs, Config};
use tracing::{error, info, warn};

/// Command-line options of the demo.
#[derive(Parser, Debug)]
#[command(name = "starmesh-demo", about = "Build and query a synthetic star catalog")]
struct DemoArgs {
    #[command(flatten)]
    catalog: CliArgs,

    /// Random stars per tier.
    #[arg(long, default_value_t = 5000)]
    stars: usize,

    /// Julian year to advance the catalog to.
    #[arg(long, default_value_t = 2500.0)]
    year: f64,

    /// Seed for the synthetic star field.
    #[arg(long, default_value_t = 42)]
    seed: u64,

    /// Rewrite the catalog files even if they exist.
    #[arg(long)]
    regenerate: bool,
}

fn main() {
    let args = DemoArgs::parse();

    // Resolve config directory
    let config_dir = args
        .catalog
        .config
        .clone()
        .or_else(|| dirs::config_dir().map(|d| d.join("starmesh")))
        .unwrap_or_else(|| PathBuf::from("config"));

    // Load or create config, then apply CLI overrides
    let mut config = Config::load_or_create(&config_dir).unwrap_or_else(|e| {
        eprintln!("Failed to load config: {e}, using defaults");
        Config::default()
    });
    config.apply_cli_overrides(&args.catalog);

    // Initialize logging with config and debug settings
    let log_dir = config_dir.join("logs");
    starmesh_log::init_logging(Some(&log_dir), cfg!(debug_assertions), Some(&config));

    if args.regenerate || !config.data.object_path().exists() {
        if let Err(e) = synthetic::write_catalogs(&config, args.stars, args.seed) {
            error!("Failed to write synthetic catalogs: {e}");
            return;
        }
    }

    let mut catalog = match load_catalog(&config) {
        Ok(catalog) => catalog,
        Err(e) => {
            error!("Failed to load catalog: {e}");
            return;
        }
    };

    demonstrate_lookups(&catalog);
    demonstrate_nearest(&catalog, config.query.nearest_radius_deg);
    demonstrate_time_advance(&mut catalog, Epoch::from_julian_year(args.year));
    demonstrate_region_visit(&mut catalog);
    demonstrate_deep_nearest(&mut catalog, config.query.nearest_radius_deg);
}

fn load_catalog(config: &Config) -> Result<StarCatalog, CatalogError> {
    let mut catalog = StarCatalog::from_config(config);
    catalog.load()?;
    let failures = catalog.load_deep_catalogs();
    if !failures.is_empty() {
        warn!("{} deep catalogs failed to load", failures.len());
    }
    info!(
        "Catalog ready: {} objects, {} names, {} deep tiers, magnitude limit {:.1}",
        catalog.len(),
        catalog.names().len(),
        catalog.deep_catalogs().len(),
        catalog.magnitude_limit()
    );
    Ok(catalog)
}

/// Demonstrates name and catalog-number lookups.
fn demonstrate_lookups(catalog: &StarCatalog) {
    info!("Starting lookup demonstration");

    for genitive in ["alp CMa", "alp Lyr", "alp Cen"] {
        match catalog.find_by_genitive_name(genitive) {
            Some(star) => info!(
                "{genitive}: {} at {} mag {:.2}, class {}",
                star.display_name(),
                star.position(),
                star.magnitude(),
                star.spectral_type()
            ),
            None => warn!("{genitive} not found"),
        }
    }

    if let Some(star) = catalog.find_by_name("barnard's star") {
        let pm = star.proper_motion();
        info!(
            "{} moves {:.0} mas/yr towards position angle {:.1}",
            star.display_name(),
            pm.magnitude(),
            pm.position_angle_deg()
        );
    }

    for number in [48_915, 124_897, 300_002, 1] {
        match catalog.find_by_catalog_number(number) {
            Some(star) => info!("Catalog number {number}: {}", star.display_name()),
            None => info!("Catalog number {number}: no such object"),
        }
    }
}

/// Demonstrates nearest-object search around a few well-known stars.
fn demonstrate_nearest(catalog: &StarCatalog, radius_deg: f64) {
    info!("Starting nearest-object demonstration");

    for (label, point) in [
        ("Orion's shoulder", SkyPoint::from_hours(5.92, 7.4)),
        ("Lyra", SkyPoint::new(279.0, 38.5)),
        ("south celestial pole", SkyPoint::new(0.0, -89.5)),
    ] {
        match catalog.object_nearest(&point, radius_deg) {
            Some(hit) => info!(
                "Nearest to {label} ({point}): {} at {:.3} deg, mag {:.2}",
                hit.object.display_name(),
                hit.distance_deg,
                hit.object.magnitude()
            ),
            None => info!("Nothing within {radius_deg} deg of {label}"),
        }
    }
}

/// Demonstrates advancing simulated time, which patches or rebuilds the index.
fn demonstrate_time_advance(catalog: &mut StarCatalog, target: Epoch) {
    info!(
        "Starting time advance demonstration (re-index interval {:.1} centuries)",
        catalog.motion().reindex_interval()
    );

    let start = catalog.epoch();
    let steps = 10;
    for step in 1..=steps {
        let centuries = start.julian_centuries()
            + (target.julian_centuries() - start.julian_centuries()) * f64::from(step)
                / f64::from(steps);
        let epoch = Epoch::from_julian_centuries(centuries);
        match catalog.reindex(epoch) {
            ReindexOutcome::Rebuilt { objects } => {
                info!("{epoch}: rebuilt index for {objects} objects");
            }
            ReindexOutcome::Patched { examined, moved } => {
                info!("{epoch}: patched {examined} fast movers, {moved} changed partition");
            }
        }
    }

    let misplaced = catalog.misplaced_objects();
    if misplaced.is_empty() {
        info!("Every object is filed under its current partition");
    } else {
        warn!("{} objects are filed under a stale partition", misplaced.len());
    }

    if let Some(star) = catalog.find_by_genitive_name("alp Cen") {
        info!(
            "{} at {}: {} (catalog position {})",
            star.display_name(),
            catalog.epoch(),
            star.position(),
            star.catalog_position()
        );
    }
}

/// Demonstrates a per-frame visit of a sky region with horizon coordinates.
fn demonstrate_region_visit(catalog: &mut StarCatalog) {
    info!("Starting region visit demonstration");

    catalog.set_observer(Observer {
        latitude_deg: 51.4769,
        local_sidereal_time_deg: 90.0,
    });
    let center = SkyPoint::new(90.0, 20.0);
    for _ in 0..2 {
        let generation = catalog.begin_generation();
        let mut above_horizon = 0usize;
        let visited = catalog.visit_region(&center, 15.0, |_, star| {
            if star.horizontal().alt_deg > 0.0 {
                above_horizon += 1;
            }
        });
        info!(
            "Generation {:?}: visited {visited} stars near {center}, {above_horizon} above the horizon",
            generation
        );
    }
}

/// Demonstrates how raising the magnitude limit brings deep tiers into play.
fn demonstrate_deep_nearest(catalog: &mut StarCatalog, radius_deg: f64) {
    info!("Starting deep-tier demonstration");

    let point = SkyPoint::new(45.0, -45.0);
    for limit in [6.0, 9.0, 12.0, 20.0] {
        let effective = catalog.set_magnitude_limit(limit);
        match catalog.object_nearest(&point, radius_deg) {
            Some(hit) => info!(
                "Limit {limit:.1} (effective {effective:.1}): nearest is {} mag {:.2} at {:.3} deg",
                hit.object.display_name(),
                hit.object.magnitude(),
                hit.distance_deg
            ),
            None => info!("Limit {limit:.1} (effective {effective:.1}): nothing within {radius_deg} deg"),
        }
    }
}
