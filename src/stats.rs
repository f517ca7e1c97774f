//! Statistics tracking for the reef.

use crate::flock::FlockGroup;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Snapshot of one species group
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct FlockStats {
    pub species_id: String,
    pub population: usize,
    /// Mean agent speed (units/s)
    pub mean_speed: f32,
    /// Farthest agent from the home point
    pub max_home_distance: f32,
    /// Largest distance between any two agents
    pub max_pairwise_distance: f32,
    /// Fraction of agents beyond twice the centering radius
    pub stray_fraction: f32,
}

impl FlockStats {
    pub fn from_group(group: &FlockGroup) -> Self {
        let agents = group.agents();
        let population = agents.len();
        if population == 0 {
            return Self {
                species_id: group.species().id.clone(),
                ..Self::default()
            };
        }

        let mean_speed = agents.iter().map(|a| a.speed()).sum::<f32>() / population as f32;
        let max_home_distance = agents
            .iter()
            .map(|a| a.position.length())
            .fold(0.0f32, f32::max);

        let mut max_pairwise_distance = 0.0f32;
        for (i, a) in agents.iter().enumerate() {
            for b in &agents[i + 1..] {
                max_pairwise_distance = max_pairwise_distance.max(a.position.distance(b.position));
            }
        }

        let stray_limit = 2.0 * group.config().centering_radius;
        let strays = agents
            .iter()
            .filter(|a| a.position.length() > stray_limit)
            .count();

        Self {
            species_id: group.species().id.clone(),
            population,
            mean_speed,
            max_home_distance,
            max_pairwise_distance,
            stray_fraction: strays as f32 / population as f32,
        }
    }
}

impl fmt::Display for FlockStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:<14} n={:2} speed={:.2} home={:.2} spread={:.2} stray={:.0}%",
            self.species_id,
            self.population,
            self.mean_speed,
            self.max_home_distance,
            self.max_pairwise_distance,
            self.stray_fraction * 100.0
        )
    }
}

/// Reef-wide snapshot
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct ReefStats {
    /// Frames stepped so far
    pub frame: u64,
    /// Simulated seconds
    pub elapsed: f32,
    pub agents: usize,
    /// Groups currently being scanned
    pub scanned: usize,
    pub discovered: usize,
    pub activated: usize,
    pub interactables: usize,
    pub groups: Vec<FlockStats>,
}

impl ReefStats {
    /// Format stats as a one-line summary
    pub fn summary(&self) -> String {
        format!(
            "F:{:6} | T:{:7.2}s | Agents:{:4} | Scanning:{:2} | Found:{:2} | Opened:{}/{}",
            self.frame,
            self.elapsed,
            self.agents,
            self.scanned,
            self.discovered,
            self.activated,
            self.interactables
        )
    }
}

impl fmt::Display for ReefStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{}", self.summary())?;
        for group in &self.groups {
            writeln!(f, "  {}", group)?;
        }
        Ok(())
    }
}

/// Periodic snapshots kept by long CLI runs
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct StatsHistory {
    pub snapshots: Vec<ReefStats>,
    /// Recording interval in frames
    pub interval: u64,
}

impl StatsHistory {
    pub fn new(interval: u64) -> Self {
        Self {
            snapshots: Vec::new(),
            interval,
        }
    }

    /// Record a snapshot if the frame lands on the interval
    pub fn maybe_record(&mut self, stats: ReefStats) -> bool {
        if self.interval == 0 || stats.frame % self.interval != 0 {
            return false;
        }
        self.snapshots.push(stats);
        true
    }

    /// Largest stray fraction seen for a species over the run
    pub fn worst_stray_fraction(&self, species_id: &str) -> f32 {
        self.snapshots
            .iter()
            .flat_map(|s| s.groups.iter())
            .filter(|g| g.species_id == species_id)
            .map(|g| g.stray_fraction)
            .fold(0.0, f32::max)
    }

    pub fn latest(&self) -> Option<&ReefStats> {
        self.snapshots.last()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flock::FlockConfig;
    use crate::species::SpeciesRegistry;
    use glam::Vec3;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_flock_stats_bounds() {
        let registry = SpeciesRegistry::reef();
        let species = registry.get("clownfish").unwrap().clone();
        let config = FlockConfig::default();
        let spawn = config.spawn_radius;
        let mut rng = ChaCha8Rng::seed_from_u64(4);
        let group = FlockGroup::new(species, Vec3::new(3.0, 2.0, 1.0), config, &mut rng);

        let stats = FlockStats::from_group(&group);
        assert_eq!(stats.population, 12);
        assert!(stats.max_home_distance <= spawn + 1e-4);
        assert!(stats.max_pairwise_distance <= 2.0 * spawn + 1e-4);
        assert!((stats.mean_speed - 2.4).abs() < 1e-3);
        assert_eq!(stats.stray_fraction, 0.0);
    }

    #[test]
    fn test_history_interval() {
        let mut history = StatsHistory::new(10);
        assert!(!history.maybe_record(ReefStats {
            frame: 5,
            ..ReefStats::default()
        }));
        assert!(history.maybe_record(ReefStats {
            frame: 20,
            groups: vec![FlockStats {
                species_id: "sardine".to_string(),
                stray_fraction: 0.25,
                ..FlockStats::default()
            }],
            ..ReefStats::default()
        }));

        assert_eq!(history.snapshots.len(), 1);
        assert_eq!(history.worst_stray_fraction("sardine"), 0.25);
        assert_eq!(history.worst_stray_fraction("manta_ray"), 0.0);
        assert_eq!(history.latest().map(|s| s.frame), Some(20));
    }

    #[test]
    fn test_summary_format() {
        let stats = ReefStats {
            frame: 42,
            agents: 96,
            ..ReefStats::default()
        };
        let line = stats.summary();
        assert!(line.contains("F:    42"));
        assert!(line.contains("Agents:  96"));
    }
}
