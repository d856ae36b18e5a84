//! Walks a reference point across a generated world and reports tier traffic.
//!
//! Usage: cargo run --release --bin walk_world -- [OPTIONS]
//!
//! Options:
//!   --config <PATH>   World config JSON (default: built-in defaults)
//!   --hot <R>         Hot window radius in chunks (overrides config)
//!   --cold <R>        Cold window radius in chunks (overrides config)
//!   --seed <SEED>     Terrain seed (overrides config)
//!   --steps <N>       Number of movement steps (default: 400)
//!   --speed <U>       World units moved per step (default: 3.0)
//!
//! The reference point circles the origin, so chunks are promoted, demoted
//! and evicted continuously. Run with RUST_LOG=debug to see every recenter.

use std::path::PathBuf;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Instant;

use glam::Vec3;

use tierstream::streaming::{CHUNK_LOADED, CHUNK_UNLOADED, EventBus, TieredChunkCache};
use tierstream::world::Tile;
use tierstream::{TerrainGenerator, WorldConfig};

fn main() {
    tierstream::core::logging::init();

    if let Err(e) = run() {
        log::error!("walk_world failed: {}", e);
        std::process::exit(1);
    }
}

fn run() -> tierstream::Result<()> {
    let args: Vec<String> = std::env::args().collect();

    let mut config = match parse_str_arg(&args, "--config") {
        Some(path) => WorldConfig::load(&PathBuf::from(path))?,
        None => WorldConfig::default(),
    };
    if let Some(hot) = parse_u32_arg(&args, "--hot") {
        config.cache.hot_radius = hot;
    }
    if let Some(cold) = parse_u32_arg(&args, "--cold") {
        config.cache.cold_radius = cold;
    }
    if let Some(seed) = parse_u32_arg(&args, "--seed") {
        config.terrain.seed = seed;
    }
    let steps = parse_u32_arg(&args, "--steps").unwrap_or(400);
    let speed = parse_f32_arg(&args, "--speed").unwrap_or(3.0);

    println!("=== Tierstream World Walk ===");
    println!("Hot radius:  {}", config.cache.hot_radius);
    println!("Cold radius: {}", config.cache.cold_radius);
    println!("Seed:        {}", config.terrain.seed);
    println!("Steps:       {} x {} units", steps, speed);
    println!();

    let bus = Arc::new(EventBus::new());
    let loaded = Arc::new(AtomicUsize::new(0));
    let unloaded = Arc::new(AtomicUsize::new(0));
    {
        let loaded = loaded.clone();
        bus.register_handler(CHUNK_LOADED, move |_| {
            loaded.fetch_add(1, Ordering::Relaxed);
        });
        let unloaded = unloaded.clone();
        bus.register_handler(CHUNK_UNLOADED, move |_| {
            unloaded.fetch_add(1, Ordering::Relaxed);
        });
    }

    let cache = TieredChunkCache::new(
        config.cache,
        TerrainGenerator::new(config.terrain.clone()),
        bus.clone(),
    )?;

    let start = Instant::now();
    let radius = 200.0_f32;
    let mut recenters = 0;

    for step in 0..steps {
        let angle = step as f32 * speed / radius;
        let pos = Vec3::new(angle.cos() * radius, 0.0, angle.sin() * radius);

        if let Some(plan) = cache.track(pos)? {
            recenters += 1;
            log::info!(
                "step {:>4}: center {:?}, +hot {}, +cold {}, demoted {}, evicted {}",
                step,
                cache.center(),
                plan.full_load.len(),
                plan.partial_load.len(),
                plan.partial_unload.len(),
                plan.full_unload.len(),
            );
        }
    }
    cache.verify_invariants()?;

    let elapsed = start.elapsed().as_secs_f64();
    let stats = cache.stats();
    println!();
    println!("Recenters:  {}", recenters);
    println!("Loaded:     {} events", loaded.load(Ordering::Relaxed));
    println!("Unloaded:   {} events", unloaded.load(Ordering::Relaxed));
    println!("Resident:   {} hot, {} cold", stats.hot, stats.cold);
    println!("Elapsed:    {:.3}s", elapsed);

    let water = cache
        .hot_coords()
        .iter()
        .filter_map(|c| cache.snapshot(*c))
        .map(|chunk| chunk.count(Tile::Water))
        .sum::<usize>();
    println!("Water tiles in hot window: {}", water);

    Ok(())
}

fn parse_str_arg(args: &[String], name: &str) -> Option<String> {
    args.iter()
        .position(|a| a == name)
        .and_then(|i| args.get(i + 1))
        .cloned()
}

fn parse_u32_arg(args: &[String], name: &str) -> Option<u32> {
    parse_str_arg(args, name).and_then(|s| s.parse().ok())
}

fn parse_f32_arg(args: &[String], name: &str) -> Option<f32> {
    parse_str_arg(args, name).and_then(|s| s.parse().ok())
}
