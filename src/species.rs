//! Fish species catalog.
//!
//! Definitions are immutable once loaded. The simulation reads only the
//! population, speed, behavior mode, hooks and scale; the remaining fields
//! feed the HUD and narration layers.

use crate::config::ConfigError;
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;

/// Largest population a single group may carry (O(n²) neighbor scan).
pub const MAX_POPULATION: usize = 40;

/// Rarity tier shown on the discovery card
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Rarity {
    Common,
    Uncommon,
    Rare,
    Legendary,
}

impl Rarity {
    pub fn name(&self) -> &'static str {
        match self {
            Rarity::Common => "Common",
            Rarity::Uncommon => "Uncommon",
            Rarity::Rare => "Rare",
            Rarity::Legendary => "Legendary",
        }
    }
}

/// Base group-movement mode
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorMode {
    /// Tight schools: strong cohesion and separation
    School,
    /// Wide independent orbits around the home point
    Solitary,
    /// Loose drifting clusters
    Wander,
}

impl BehaviorMode {
    pub fn name(&self) -> &'static str {
        match self {
            BehaviorMode::School => "school",
            BehaviorMode::Solitary => "solitary",
            BehaviorMode::Wander => "wander",
        }
    }
}

/// Body silhouette used by the renderer. Not read by the simulation.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BodyShape {
    Fish,
    Slender,
    Disc,
    Ray,
    Turtle,
    Jelly,
    Puffer,
}

/// Per-species hooks layered on top of the base behavior mode.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BehaviorHooks {
    /// Flees a swimming player, approaches a still one
    #[serde(default)]
    pub player_reactive: bool,
    /// Render opacity follows a slow sine wave
    #[serde(default)]
    pub phasing: bool,
}

/// Immutable description of one species
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SpeciesDefinition {
    pub id: String,
    pub name: String,
    pub scientific_name: String,
    pub description: String,
    pub rarity: Rarity,
    /// sRGB body color
    pub color: [u8; 3],
    /// Body scale per axis
    pub scale: Vec3,
    /// Number of individuals in the group
    pub population: usize,
    /// Cruise speed in units/second; also the group's max speed
    pub speed: f32,
    pub behavior: BehaviorMode,
    pub shape: BodyShape,
    #[serde(default)]
    pub hooks: BehaviorHooks,
}

impl SpeciesDefinition {
    /// Lowest speed an agent may drop to
    #[inline]
    pub fn min_speed(&self) -> f32 {
        self.speed * 0.5
    }

    #[inline]
    pub fn max_speed(&self) -> f32 {
        self.speed
    }
}

/// Read-only catalog of species, shared by reference with the groups
#[derive(Clone, Debug)]
pub struct SpeciesRegistry {
    species: Vec<Arc<SpeciesDefinition>>,
}

impl SpeciesRegistry {
    /// Build a registry from explicit definitions, rejecting duplicate ids
    /// and populations the neighbor scan is not sized for.
    pub fn from_definitions(definitions: Vec<SpeciesDefinition>) -> Result<Self, ConfigError> {
        let mut seen = HashSet::new();
        for def in &definitions {
            if !seen.insert(def.id.clone()) {
                return Err(ConfigError::DuplicateSpecies(def.id.clone()));
            }
            if def.population > MAX_POPULATION {
                return Err(ConfigError::Invalid(format!(
                    "species '{}' population {} exceeds {}",
                    def.id, def.population, MAX_POPULATION
                )));
            }
            if !(def.speed.is_finite() && def.speed > 0.0) {
                return Err(ConfigError::Invalid(format!(
                    "species '{}' speed must be positive",
                    def.id
                )));
            }
        }

        Ok(Self {
            species: definitions.into_iter().map(Arc::new).collect(),
        })
    }

    /// The built-in reef catalog
    pub fn reef() -> Self {
        Self {
            species: reef_catalog().into_iter().map(Arc::new).collect(),
        }
    }

    pub fn get(&self, id: &str) -> Option<&Arc<SpeciesDefinition>> {
        self.species.iter().find(|s| s.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Arc<SpeciesDefinition>> {
        self.species.iter()
    }

    pub fn len(&self) -> usize {
        self.species.len()
    }

    pub fn is_empty(&self) -> bool {
        self.species.is_empty()
    }

    /// Total number of agents across all species
    pub fn total_population(&self) -> usize {
        self.species.iter().map(|s| s.population).sum()
    }
}

impl Default for SpeciesRegistry {
    fn default() -> Self {
        Self::reef()
    }
}

#[allow(clippy::too_many_arguments)]
fn species(
    id: &str,
    name: &str,
    scientific_name: &str,
    description: &str,
    rarity: Rarity,
    color: [u8; 3],
    scale: Vec3,
    population: usize,
    speed: f32,
    behavior: BehaviorMode,
    shape: BodyShape,
    hooks: BehaviorHooks,
) -> SpeciesDefinition {
    SpeciesDefinition {
        id: id.to_string(),
        name: name.to_string(),
        scientific_name: scientific_name.to_string(),
        description: description.to_string(),
        rarity,
        color,
        scale,
        population,
        speed,
        behavior,
        shape,
        hooks,
    }
}

/// Species shipped with the reef
pub fn reef_catalog() -> Vec<SpeciesDefinition> {
    let plain = BehaviorHooks::default();

    vec![
        species(
            "clownfish",
            "Clownfish",
            "Amphiprion ocellaris",
            "Lives among anemone tentacles, protected by a layer of mucus.",
            Rarity::Common,
            [255, 127, 39],
            Vec3::new(0.5, 0.4, 0.8),
            12,
            2.4,
            BehaviorMode::School,
            BodyShape::Fish,
            plain,
        ),
        species(
            "blue_tang",
            "Blue Tang",
            "Paracanthurus hepatus",
            "Bright blue surgeonfish with a scalpel-sharp spine at the tail.",
            Rarity::Common,
            [40, 90, 220],
            Vec3::new(0.4, 0.6, 0.9),
            18,
            3.0,
            BehaviorMode::School,
            BodyShape::Disc,
            plain,
        ),
        species(
            "sardine",
            "Sardine",
            "Sardina pilchardus",
            "Moves in dense bait balls that turn as one.",
            Rarity::Common,
            [190, 200, 215],
            Vec3::new(0.2, 0.2, 0.6),
            40,
            3.6,
            BehaviorMode::School,
            BodyShape::Slender,
            plain,
        ),
        species(
            "moorish_idol",
            "Moorish Idol",
            "Zanclus cornutus",
            "Trails a long white dorsal streamer as it grazes the reef.",
            Rarity::Uncommon,
            [245, 230, 120],
            Vec3::new(0.3, 0.8, 0.7),
            8,
            2.0,
            BehaviorMode::Wander,
            BodyShape::Disc,
            plain,
        ),
        species(
            "moon_jelly",
            "Moon Jelly",
            "Aurelia aurita",
            "A translucent bell that drifts with the current and fades in and out of view.",
            Rarity::Uncommon,
            [200, 180, 255],
            Vec3::new(0.8, 0.6, 0.8),
            10,
            0.8,
            BehaviorMode::Wander,
            BodyShape::Jelly,
            BehaviorHooks {
                player_reactive: false,
                phasing: true,
            },
        ),
        species(
            "pufferfish",
            "Guineafowl Puffer",
            "Arothron meleagris",
            "Curious when you hold still, gone in a blink when you swim at it.",
            Rarity::Rare,
            [70, 60, 50],
            Vec3::new(0.7, 0.7, 0.9),
            4,
            1.8,
            BehaviorMode::Wander,
            BodyShape::Puffer,
            BehaviorHooks {
                player_reactive: true,
                phasing: false,
            },
        ),
        species(
            "sea_turtle",
            "Green Sea Turtle",
            "Chelonia mydas",
            "Glides in long, patient loops between feeding grounds.",
            Rarity::Rare,
            [90, 140, 80],
            Vec3::new(1.6, 0.6, 1.8),
            2,
            1.6,
            BehaviorMode::Solitary,
            BodyShape::Turtle,
            plain,
        ),
        species(
            "manta_ray",
            "Manta Ray",
            "Mobula birostris",
            "Wingspan wider than a boat; visits the reef to be cleaned.",
            Rarity::Legendary,
            [35, 40, 55],
            Vec3::new(3.0, 0.4, 2.0),
            2,
            1.4,
            BehaviorMode::Solitary,
            BodyShape::Ray,
            plain,
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_is_valid() {
        let registry = SpeciesRegistry::from_definitions(reef_catalog());
        assert!(registry.is_ok());

        let registry = registry.unwrap();
        assert_eq!(registry.len(), reef_catalog().len());
        assert!(registry.iter().all(|s| s.population >= 2 && s.population <= MAX_POPULATION));
    }

    #[test]
    fn test_catalog_has_one_reactive_and_one_phasing_species() {
        let registry = SpeciesRegistry::reef();
        let reactive = registry.iter().filter(|s| s.hooks.player_reactive).count();
        let phasing = registry.iter().filter(|s| s.hooks.phasing).count();

        assert_eq!(reactive, 1);
        assert_eq!(phasing, 1);
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let mut defs = reef_catalog();
        defs.push(defs[0].clone());

        match SpeciesRegistry::from_definitions(defs) {
            Err(ConfigError::DuplicateSpecies(id)) => assert_eq!(id, "clownfish"),
            other => panic!("expected duplicate error, got {:?}", other.map(|r| r.len())),
        }
    }

    #[test]
    fn test_oversized_population_rejected() {
        let mut defs = reef_catalog();
        defs[0].population = MAX_POPULATION + 1;
        assert!(SpeciesRegistry::from_definitions(defs).is_err());
    }

    #[test]
    fn test_speed_bounds() {
        let registry = SpeciesRegistry::reef();
        let tang = registry.get("blue_tang").unwrap();
        assert_eq!(tang.max_speed(), 3.0);
        assert_eq!(tang.min_speed(), 1.5);
        assert!(registry.get("kraken").is_none());
    }
}
