//! REEFSIM - CLI Entry Point
//!
//! Headless reef simulation: scripted tours, terrain previews and benchmarks.

use clap::{Parser, Subcommand};
use glam::Vec3;
use reefsim::stats::StatsHistory;
use reefsim::terrain::{InteractableKind, TerrainGenerator};
use reefsim::{benchmark, Config, PlayerInput, Reef, ReefEvent};
use std::path::{Path, PathBuf};
use std::time::Instant;

const FRAME_DT: f32 = 1.0 / 60.0;

#[derive(Parser)]
#[command(name = "reefsim")]
#[command(version)]
#[command(about = "Underwater voxel reef with boid schools, scanning and props")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Swim a scripted tour through a reef and print what happens
    Run {
        /// Configuration file (YAML)
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,

        /// Frame budget for the whole tour
        #[arg(short, long, default_value = "7200")]
        frames: u64,

        /// Frames spent idling at each stop
        #[arg(short, long, default_value = "120")]
        linger: u64,

        /// Random seed for reproducibility
        #[arg(long)]
        seed: Option<u64>,

        /// Quiet mode (events only, no periodic stats)
        #[arg(short, long)]
        quiet: bool,
    },

    /// Generate terrain and print a summary with an ASCII minimap
    Terrain {
        #[arg(short, long, default_value = "50")]
        width: i32,

        #[arg(short, long, default_value = "50")]
        depth: i32,

        #[arg(long, default_value = "0")]
        seed: u64,

        /// Also write the full layout as YAML
        #[arg(long)]
        dump: Option<PathBuf>,
    },

    /// List the species catalog
    Species {
        /// Configuration file with an optional species override
        #[arg(short, long, default_value = "config.yaml")]
        config: PathBuf,
    },

    /// Run performance benchmark
    Benchmark {
        /// Number of frames
        #[arg(short, long, default_value = "3600")]
        frames: u64,

        #[arg(long, default_value = "12345")]
        seed: u64,
    },

    /// Generate default configuration file
    Init {
        /// Output path
        #[arg(short, long, default_value = "config.yaml")]
        output: PathBuf,
    },
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            frames,
            linger,
            seed,
            quiet,
        } => run_tour(config, frames, linger, seed, quiet),

        Commands::Terrain {
            width,
            depth,
            seed,
            dump,
        } => show_terrain(width, depth, seed, dump),

        Commands::Species { config } => list_species(config),

        Commands::Benchmark { frames, seed } => run_benchmark(frames, seed),

        Commands::Init { output } => generate_config(output),
    }
}

fn init_logging(level: &str) {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level)).init();
}

fn load_config(path: &Path) -> Result<Config, Box<dyn std::error::Error>> {
    if path.exists() {
        println!("Loading config from: {:?}", path);
        Ok(Config::from_file(path)?)
    } else {
        println!("Using default configuration");
        Ok(Config::default())
    }
}

/// One stop on the tour
struct Waypoint {
    label: String,
    position: Vec3,
    interact: bool,
}

fn run_tour(
    config_path: PathBuf,
    frames: u64,
    linger: u64,
    seed: Option<u64>,
    quiet: bool,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut config = load_config(&config_path)?;
    init_logging(&config.logging.log_level);

    if let Some(s) = seed {
        println!("Using seed: {}", s);
        config.world.seed = Some(s);
    }
    let mut reef = Reef::new(config.clone())?;

    // Every group's home, then every prop
    let mut waypoints: Vec<Waypoint> = reef
        .groups()
        .iter()
        .map(|g| Waypoint {
            label: g.species().name.clone(),
            position: g.home(),
            interact: false,
        })
        .collect();
    waypoints.extend(reef.interactables().items().iter().map(|item| Waypoint {
        label: item.id.to_string(),
        position: item.position,
        interact: true,
    }));

    println!("Starting tour");
    println!("  Seed: {}", reef.seed());
    println!("  Grid size: {}x{}", reef.terrain().width, reef.terrain().depth);
    println!("  Groups: {} ({} agents)", reef.groups().len(), reef.species().total_population());
    println!(
        "  Props: {} chests, {} mechanisms",
        reef.interactables().count(InteractableKind::Chest),
        reef.interactables().count(InteractableKind::Mechanism)
    );
    println!("  Stops: {}", waypoints.len());
    println!("  Frames: {}", frames);
    println!();

    let stats_interval = config.logging.stats_interval;
    let mut history = StatsHistory::new(stats_interval);
    let start = Instant::now();
    let mut budget = frames;

    'tour: for stop in &waypoints {
        if !quiet {
            println!("-> {}", stop.label);
        }

        // Swim until close
        while reef.player().position().distance(stop.position) > 1.0 {
            if budget == 0 {
                break 'tour;
            }
            let direction = (stop.position - reef.player().position()).normalize_or_zero();
            let events = reef.step(FRAME_DT, &PlayerInput::swim(direction));
            report(&reef, &events, &mut history, quiet);
            budget -= 1;
        }

        // Hold still so reactive species come closer, then interact
        for i in 0..linger {
            if budget == 0 {
                break 'tour;
            }
            let input = if stop.interact && i == linger / 2 {
                PlayerInput::interact()
            } else {
                PlayerInput::idle()
            };
            let events = reef.step(FRAME_DT, &input);
            report(&reef, &events, &mut history, quiet);
            budget -= 1;
        }
    }

    let elapsed = start.elapsed();
    let stats = reef.stats();

    println!();
    println!("=== Tour Complete ===");
    println!("Time: {:.2}s", elapsed.as_secs_f64());
    println!("Frames: {}", reef.frame());
    println!(
        "Speed: {:.1} frames/s",
        reef.frame() as f64 / elapsed.as_secs_f64().max(f64::EPSILON)
    );
    println!("Discovered: {}", reef.session().discovered().join(", "));
    println!("Activated: {}/{}", stats.activated, stats.interactables);
    let scanning: Vec<String> = reef
        .scanned_groups()
        .into_iter()
        .map(|i| reef.groups()[i].species().id.clone())
        .collect();
    if !scanning.is_empty() {
        println!("Still in scan range: {}", scanning.join(", "));
    }
    print!("{}", stats);

    for group in reef.groups() {
        let worst = history.worst_stray_fraction(&group.species().id);
        if worst > 0.0 {
            println!("  {} worst stray fraction: {:.0}%", group.species().id, worst * 100.0);
        }
    }

    Ok(())
}

fn report(reef: &Reef, events: &[ReefEvent], history: &mut StatsHistory, quiet: bool) {
    for event in events {
        match event {
            ReefEvent::ScanChanged {
                group,
                species: Some(species),
            } => println!("  [scan] {} in range (group {})", species.name, group),
            ReefEvent::ScanChanged { group, species: None } => {
                println!("  [scan] group {} out of range", group)
            }
            ReefEvent::SpeciesDiscovered(species) => println!(
                "  [new]  {} - {} ({})",
                species.name,
                species.scientific_name,
                species.rarity.name()
            ),
            ReefEvent::HoverChanged(Some(item)) => println!("  [near] {}", item.id),
            ReefEvent::HoverChanged(None) => {}
            ReefEvent::Activated(item) => println!("  [open] {}", item.id),
        }
    }

    let stats = reef.stats();
    if !quiet && stats.frame % history.interval == 0 {
        println!("{}", stats.summary());
    }
    history.maybe_record(stats);
}

fn show_terrain(
    width: i32,
    depth: i32,
    seed: u64,
    dump: Option<PathBuf>,
) -> Result<(), Box<dyn std::error::Error>> {
    init_logging("info");

    let layout = TerrainGenerator::default().generate_seeded(width, depth, seed);

    println!("=== Terrain {}x{} (seed {}) ===", width, depth, seed);
    println!("Voxels: {}", layout.voxel_count());
    for (kind, count) in layout.counts() {
        println!("  {:<12} {}", kind.name(), count);
    }
    println!("Interactables: {}", layout.interactables.len());
    println!("Points of interest:");
    for (kind, count) in layout.poi_counts() {
        println!("  {} {:?}: {}", kind.char(), kind, count);
    }
    println!();
    print!("{}", layout.render_minimap());

    if let Some(path) = dump {
        std::fs::write(&path, serde_yaml::to_string(&layout)?)?;
        println!("Layout written to: {:?}", path);
    }

    Ok(())
}

fn list_species(config_path: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    init_logging("info");

    let config = load_config(&config_path)?;
    let registry = config.species_registry()?;

    println!("=== Species ({}) ===", registry.len());
    for s in registry.iter() {
        let mut hooks = Vec::new();
        if s.hooks.player_reactive {
            hooks.push("reactive");
        }
        if s.hooks.phasing {
            hooks.push("phasing");
        }
        println!(
            "{:<18} {:<22} {:<10} {:<8} n={:2} speed={:.1} {}",
            s.name,
            s.scientific_name,
            s.rarity.name(),
            s.behavior.name(),
            s.population,
            s.speed,
            hooks.join(",")
        );
    }
    println!("Total agents: {}", registry.total_population());

    Ok(())
}

fn run_benchmark(frames: u64, seed: u64) -> Result<(), Box<dyn std::error::Error>> {
    init_logging("warn");

    println!("=== REEFSIM Benchmark ===");
    println!("Frames: {}", frames);
    println!("Seed: {}", seed);
    println!();

    let result = benchmark(frames, Config::default(), seed)?;
    println!("{}", result);

    Ok(())
}

fn generate_config(output: PathBuf) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::default();
    config.save(&output)?;
    println!("Configuration saved to: {:?}", output);
    Ok(())
}
