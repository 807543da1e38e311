//! Probe: builds a biome slice over a synthetic world and prints one layer.
//!
//! Run with: `cargo run -p tessera-probe -- --seed 42 --center 0,4,0`

mod error;
mod render;
mod world;

use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;
use tessera_biome::{AsyncSliceBuilder, BiomeRegistry, SectionPos, SliceTask};
use tessera_config::{CliArgs, Config};
use tracing::{error, info, warn};

use crate::error::ProbeError;
use crate::world::BandedWorld;

const BUILD_TIMEOUT: Duration = Duration::from_secs(10);

fn main() -> ExitCode {
    let args = CliArgs::parse();

    let config_dir = match args.config.clone() {
        Some(dir) => Ok(dir),
        None => tessera_config::default_config_dir(),
    };
    let mut config = match config_dir.and_then(|dir| Config::load_or_create(&dir)) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Falling back to default config: {e}");
            Config::default()
        }
    };
    config.apply_cli_overrides(&args);

    tessera_log::init_logging(None, cfg!(debug_assertions), Some(&config));

    match run(&config) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{e}");
            ExitCode::FAILURE
        }
    }
}

fn run(config: &Config) -> Result<(), ProbeError> {
    let registry = BiomeRegistry::with_defaults();
    let world = BandedWorld::new(&registry).ok_or(ProbeError::MissingBiomes)?;

    let workers = &config.workers;
    let started = if workers.threads == 0 {
        AsyncSliceBuilder::with_defaults()
    } else {
        AsyncSliceBuilder::new(workers.threads, workers.max_concurrent, workers.result_capacity)
    };
    let builder = started.map_err(ProbeError::Workers)?;

    let [cx, cy, cz] = config.probe.center;
    let center = SectionPos::new(cx, cy, cz);
    info!(
        "Probing region {:?} (seed={}, 3d={})",
        center, config.sampler.biome_seed, config.sampler.three_d
    );

    builder
        .submit(SliceTask {
            neighborhood: world.neighborhood(center),
            biome_seed: config.sampler.biome_seed,
            is_3d: config.sampler.three_d,
        })?;

    let deadline = Instant::now() + BUILD_TIMEOUT;
    let built = loop {
        if let Some(built) = builder.drain_completed(1).pop() {
            break built;
        }
        if Instant::now() >= deadline {
            return Err(ProbeError::Timeout(BUILD_TIMEOUT));
        }
        std::thread::sleep(Duration::from_millis(1));
    };
    info!("Built slice in {}µs", built.build_time_us);

    let stats = render::center_stats(&built.slice, center);
    if stats.missing > 0 {
        warn!("{} of {} blocks have no biome", stats.missing, stats.queries);
    }

    println!("{}", render::legend(&registry));
    print!(
        "{}",
        render::layer_map(&built.slice, &registry, center, config.probe.layer_y)
    );
    println!(
        "uniform shortcut: {}/{} blocks ({:.1}%)",
        stats.uniform_hits,
        stats.queries,
        stats.uniform_ratio() * 100.0
    );

    Ok(())
}
