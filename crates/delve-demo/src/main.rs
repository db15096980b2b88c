//! Command-line driver: carves a square of chunks around the origin on a worker
//! pool and reports what was removed.

mod pool;

use std::error::Error;
use std::sync::Arc;
use std::time::Instant;

use clap::Parser;
use delve_carve::{CarveStats, Carver, CellBiomeSource};
use delve_config::{CliArgs, Config};
use delve_voxel::VoxelTypeId;

use pool::{CarvePool, CarveTask, CarveWorld, carve_column};

/// Blocks per biome cell in the demo biome layout.
const BIOME_CELL_SIZE: i32 = 256;

fn main() {
    let args = CliArgs::parse();
    if let Err(e) = run(&args) {
        eprintln!("delve: {e}");
        std::process::exit(1);
    }
}

fn run(args: &CliArgs) -> Result<(), Box<dyn Error>> {
    let config_dir = args
        .config_dir()
        .ok_or("could not determine a config directory; pass --config")?;
    let mut config = Config::load_or_create(&config_dir)?;
    config.apply_cli_overrides(args);

    let log_dir = dirs::data_local_dir().map(|dir| dir.join("delve").join("logs"));
    delve_log::init_logging(log_dir.as_deref(), cfg!(debug_assertions), Some(&config));
    tracing::info!(config_dir = %config_dir.display(), seed = config.world.seed, "delve starting");

    let world = Arc::new(build_world(&config)?);
    let threads = match config.world.worker_threads {
        0 => num_cpus::get().max(1),
        n => n as usize,
    };
    let pool = CarvePool::new(Arc::clone(&world), threads, threads * 4)?;
    tracing::info!(workers = pool.worker_count(), "carve pool ready");

    let radius = i32::try_from(config.world.view_radius).unwrap_or(i32::MAX / 2);
    let mut tasks = Vec::new();
    for chunk_x in -radius..=radius {
        for chunk_z in -radius..=radius {
            tasks.push(CarveTask { chunk_x, chunk_z });
        }
    }

    let start = Instant::now();
    let results = pool.run(tasks);
    let elapsed = start.elapsed();
    pool.shutdown();

    let mut total = CarveStats::default();
    let mut air = 0usize;
    let mut busiest = 0u64;
    for chunk in &results {
        total += chunk.stats;
        air += chunk.column.count(VoxelTypeId::AIR);
        busiest = busiest.max(chunk.elapsed_us);
    }

    // Re-carve one chunk on this thread; pool output must not depend on scheduling.
    if let Some(sample) = results.first() {
        let (column, stats) = carve_column(&world, sample.task);
        if column != sample.column || stats != sample.stats {
            return Err(format!("chunk {:?} carved differently off the pool", sample.task).into());
        }
    }

    tracing::info!(
        chunks = results.len(),
        candidates = total.candidates,
        worms = total.worms,
        steps = total.steps,
        voxels = total.voxels,
        slowest_chunk_us = busiest,
        elapsed_ms = elapsed.as_millis() as u64,
        "carving finished"
    );
    println!(
        "carved {} chunks: {} worms, {} voxels removed, {} air voxels total ({:.1?})",
        results.len(),
        total.worms,
        total.voxels,
        air,
        elapsed
    );
    Ok(())
}

fn build_world(config: &Config) -> Result<CarveWorld, Box<dyn Error>> {
    let carvers = config
        .carvers
        .iter()
        .map(|def| {
            Carver::from_definition(def)
                .map(|carver| carver.with_carving_radius(config.world.carving_radius))
        })
        .collect::<Result<Vec<_>, _>>()?;
    for carver in &carvers {
        tracing::debug!(carver = %carver.id(), height = ?carver.height_range(), "carver loaded");
    }

    Ok(CarveWorld {
        seed: config.world.seed,
        carvers: Arc::new(carvers),
        biomes: CellBiomeSource::from_definitions(
            config.world.seed,
            BIOME_CELL_SIZE,
            &config.biomes,
        ),
    })
}
