//! # REEFSIM
//!
//! Headless core of an underwater voxel-reef exploration game.
//!
//! ## Features
//!
//! - **Terrain**: terraced voxel floor with ruins, kelp, coral and props
//! - **Flocking**: per-species boid schools with reactive and phasing hooks
//! - **Scanning**: hysteresis-based proximity discovery of species
//! - **Configurable**: YAML configuration files
//! - **Reproducible**: Seeded random number generation
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use reefsim::{Config, PlayerInput, Reef};
//!
//! let mut reef = Reef::new(Config::default()).unwrap();
//!
//! for _ in 0..600 {
//!     for event in reef.step(1.0 / 60.0, &PlayerInput::idle()) {
//!         println!("{:?}", event);
//!     }
//! }
//!
//! println!("{}", reef.stats());
//! ```
//!
//! ## Terrain only
//!
//! ```rust
//! use reefsim::terrain::TerrainGenerator;
//!
//! let layout = TerrainGenerator::default().generate_seeded(20, 20, 7);
//! assert_eq!(layout.width, 20);
//! println!("{}", layout.render_minimap());
//! ```

pub mod config;
pub mod flock;
pub mod interact;
pub mod player;
pub mod scanner;
pub mod species;
pub mod stats;
pub mod terrain;
pub mod world;

// Re-export main types
pub use config::{Config, ConfigError};
pub use flock::{AgentTransform, FlockGroup};
pub use player::{PlayerInput, PlayerSample};
pub use species::{SpeciesDefinition, SpeciesRegistry};
pub use terrain::{TerrainGenerator, TerrainLayout};
pub use world::{Reef, ReefEvent};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Time `frames` reef steps at 60 fps with an idle player
pub fn benchmark(frames: u64, config: Config, seed: u64) -> Result<BenchmarkResult, ConfigError> {
    use std::time::Instant;

    let mut reef = Reef::new_with_seed(config, seed)?;
    let input = PlayerInput::idle();

    let start = Instant::now();
    for _ in 0..frames {
        reef.step(1.0 / 60.0, &input);
    }
    let elapsed = start.elapsed();

    Ok(BenchmarkResult {
        frames,
        groups: reef.groups().len(),
        agents: reef.species().total_population(),
        elapsed_secs: elapsed.as_secs_f64(),
        frames_per_second: frames as f64 / elapsed.as_secs_f64().max(f64::EPSILON),
    })
}

/// Benchmark result
#[derive(Debug, Clone)]
pub struct BenchmarkResult {
    pub frames: u64,
    pub groups: usize,
    pub agents: usize,
    pub elapsed_secs: f64,
    pub frames_per_second: f64,
}

impl std::fmt::Display for BenchmarkResult {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        writeln!(f, "=== Benchmark Results ===")?;
        writeln!(f, "Frames: {}", self.frames)?;
        writeln!(f, "Groups: {} ({} agents)", self.groups, self.agents)?;
        writeln!(f, "Time: {:.3}s", self.elapsed_secs)?;
        writeln!(f, "Speed: {:.1} frames/s", self.frames_per_second)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_benchmark_runs() {
        let mut config = Config::default();
        config.world.width = 10;
        config.world.depth = 10;

        let result = benchmark(10, config, 1).unwrap();
        assert_eq!(result.frames, 10);
        assert_eq!(result.agents, SpeciesRegistry::reef().total_population());
        assert!(result.to_string().contains("Frames: 10"));
    }
}
