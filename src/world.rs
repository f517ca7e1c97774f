//! Reef orchestrator - owns the terrain, the flocks and the session, and
//! runs the per-frame update in a fixed order.

use crate::config::{Config, ConfigError, WorldConfig};
use crate::flock::{AgentTransform, FlockGroup};
use crate::interact::{InteractableRegistry, SessionState};
use crate::player::{PlayerInput, PlayerState};
use crate::scanner::{ProximityScanner, ScanTransition};
use crate::species::{SpeciesDefinition, SpeciesRegistry};
use crate::stats::{FlockStats, ReefStats};
use crate::terrain::{InteractableId, InteractableItem, TerrainGenerator, TerrainLayout};
use glam::Vec3;
use rand::prelude::*;
use rand_chacha::ChaCha8Rng;
use std::f32::consts::TAU;
use std::sync::Arc;

/// Notifications raised during a frame, in the order they happened
#[derive(Clone, Debug, PartialEq)]
pub enum ReefEvent {
    /// Scan state of a group flipped. `species` is `None` when scanning ended.
    ScanChanged {
        group: usize,
        species: Option<Arc<SpeciesDefinition>>,
    },
    /// First scan of a species this session
    SpeciesDiscovered(Arc<SpeciesDefinition>),
    /// The closest activatable prop changed
    HoverChanged(Option<InteractableItem>),
    /// A prop was activated by the interact trigger
    Activated(InteractableItem),
}

/// The simulated reef
pub struct Reef {
    // Configuration
    pub config: Config,

    // Static world
    terrain: TerrainLayout,
    species: SpeciesRegistry,
    interactables: InteractableRegistry,

    // Simulation
    groups: Vec<FlockGroup>,
    scanners: Vec<ProximityScanner>,
    player: PlayerState,

    // Session
    session: SessionState,
    hovered: Option<InteractableId>,

    // Timing
    accumulator: f32,
    frame: u64,
    elapsed: f32,
    seed: u64,
}

impl Reef {
    /// Create a reef with a fresh random seed
    pub fn new(config: Config) -> Result<Self, ConfigError> {
        let seed = match config.world.seed {
            Some(seed) => seed,
            None => rand::thread_rng().gen(),
        };
        Self::new_with_seed(config, seed)
    }

    /// Create a reef with a specific seed for reproducibility
    pub fn new_with_seed(config: Config, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let species = config.species_registry()?;
        Ok(Self::with_species(config, species, seed))
    }

    /// Build from an already validated config and catalog
    pub fn with_species(config: Config, species: SpeciesRegistry, seed: u64) -> Self {
        let mut rng = ChaCha8Rng::seed_from_u64(seed);

        let terrain = TerrainGenerator::new(config.terrain.clone()).generate(
            config.world.width,
            config.world.depth,
            &mut rng,
        );

        let homes = home_points(&terrain, species.len(), &config.world);
        let groups: Vec<FlockGroup> = species
            .iter()
            .zip(&homes)
            .map(|(def, home)| FlockGroup::new(def.clone(), *home, config.flock.clone(), &mut rng))
            .collect();
        let scanners = vec![ProximityScanner::new(config.scanner); groups.len()];

        let interactables = InteractableRegistry::new(terrain.interactables.clone(), config.interaction);

        let start_y = terrain.surface_y_at(0.0, 0.0).unwrap_or(0.0) + config.world.swim_height;
        let player = PlayerState::new(Vec3::new(0.0, start_y, 0.0), config.player.clone());

        log::info!(
            "Reef created: seed={}, {}x{} cells, {} voxels, {} groups ({} agents), {} interactables",
            seed,
            terrain.width,
            terrain.depth,
            terrain.voxel_count(),
            groups.len(),
            species.total_population(),
            interactables.len()
        );

        Self {
            config,
            terrain,
            species,
            interactables,
            groups,
            scanners,
            player,
            session: SessionState::new(),
            hovered: None,
            accumulator: 0.0,
            frame: 0,
            elapsed: 0.0,
            seed,
        }
    }

    /// Advance one frame: player motion, then flocks, then scanners, then
    /// interaction. Returns the events raised along the way.
    pub fn step(&mut self, dt: f32, input: &PlayerInput) -> Vec<ReefEvent> {
        let mut events = Vec::new();
        let dt = if dt.is_finite() {
            dt.clamp(0.0, self.config.simulation.max_frame_delta)
        } else {
            0.0
        };

        // Phase 1: player motion
        let bounds = (!self.terrain.is_empty()).then(|| self.terrain.bounds());
        self.player.update(dt, input, bounds);

        // Phase 2: flocks
        self.advance_flocks(dt);

        // Phase 3: scanners
        self.update_scanners(&mut events);

        // Phase 4: interaction, then the hover prompt reflecting it
        if input.interact {
            if let Some(item) = self
                .interactables
                .activate_closest(self.player.position(), &mut self.session)
            {
                events.push(ReefEvent::Activated(item));
            }
        }
        self.update_hover(&mut events);

        self.frame += 1;
        self.elapsed += dt;
        events
    }

    fn advance_flocks(&mut self, dt: f32) {
        let sample = self.player.sample();

        let Some(step) = self.config.simulation.fixed_timestep else {
            for group in &mut self.groups {
                group.advance(dt, &sample);
            }
            return;
        };

        self.accumulator += dt;
        let mut substeps = 0;
        while self.accumulator >= step && substeps < self.config.simulation.max_substeps {
            for group in &mut self.groups {
                group.advance(step, &sample);
            }
            self.accumulator -= step;
            substeps += 1;
        }

        if self.accumulator >= step {
            log::debug!(
                "frame {}: substep cap hit, dropping {:.3}s of simulation",
                self.frame,
                self.accumulator
            );
            self.accumulator %= step;
        }
    }

    fn update_scanners(&mut self, events: &mut Vec<ReefEvent>) {
        let position = self.player.position();

        for (i, (group, scanner)) in self.groups.iter().zip(self.scanners.iter_mut()).enumerate() {
            let distance = group.distance_from_home(position);
            match scanner.update(distance) {
                Some(ScanTransition::Started) => {
                    let species = group.species().clone();
                    log::debug!("Scan started: {} (group {}, {:.1} away)", species.id, i, distance);
                    events.push(ReefEvent::ScanChanged {
                        group: i,
                        species: Some(species.clone()),
                    });
                    if self.session.record_discovery(&species.id) {
                        log::info!("Discovered {} ({})", species.name, species.rarity.name());
                        events.push(ReefEvent::SpeciesDiscovered(species));
                    }
                }
                Some(ScanTransition::Ended) => {
                    log::debug!("Scan ended: {} (group {})", group.species().id, i);
                    events.push(ReefEvent::ScanChanged {
                        group: i,
                        species: None,
                    });
                }
                None => {}
            }
        }
    }

    fn update_hover(&mut self, events: &mut Vec<ReefEvent>) {
        let closest = self
            .interactables
            .closest(self.player.position(), &self.session)
            .cloned();
        let id = closest.as_ref().map(|item| item.id);

        if id != self.hovered {
            self.hovered = id;
            events.push(ReefEvent::HoverChanged(closest));
        }
    }

    /// Per-species transforms for the renderer
    pub fn transforms(&self) -> impl Iterator<Item = (&Arc<SpeciesDefinition>, &[AgentTransform])> {
        self.groups.iter().map(|g| (g.species(), g.transforms()))
    }

    /// Snapshot for logging and the CLI
    pub fn stats(&self) -> ReefStats {
        ReefStats {
            frame: self.frame,
            elapsed: self.elapsed,
            agents: self.groups.iter().map(FlockGroup::len).sum(),
            scanned: self.scanners.iter().filter(|s| s.is_scanned()).count(),
            discovered: self.session.discovered().len(),
            activated: self.session.activated_count(),
            interactables: self.interactables.len(),
            groups: self.groups.iter().map(FlockStats::from_group).collect(),
        }
    }

    /// Place the player directly (tours, tests)
    pub fn teleport_player(&mut self, position: Vec3) {
        self.player.teleport(position);
    }

    /// Groups currently being scanned
    pub fn scanned_groups(&self) -> Vec<usize> {
        self.scanners
            .iter()
            .enumerate()
            .filter(|(_, s)| s.is_scanned())
            .map(|(i, _)| i)
            .collect()
    }

    pub fn terrain(&self) -> &TerrainLayout {
        &self.terrain
    }

    pub fn species(&self) -> &SpeciesRegistry {
        &self.species
    }

    pub fn groups(&self) -> &[FlockGroup] {
        &self.groups
    }

    pub fn interactables(&self) -> &InteractableRegistry {
        &self.interactables
    }

    pub fn session(&self) -> &SessionState {
        &self.session
    }

    pub fn player(&self) -> &PlayerState {
        &self.player
    }

    pub fn hovered(&self) -> Option<InteractableId> {
        self.hovered
    }

    pub fn frame(&self) -> u64 {
        self.frame
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    /// Get seed for reproducibility
    pub fn seed(&self) -> u64 {
        self.seed
    }
}

/// Anchor points for `count` groups, evenly spaced on a ring around the
/// origin and raised `swim_height` above the local floor.
pub fn home_points(terrain: &TerrainLayout, count: usize, world: &WorldConfig) -> Vec<Vec3> {
    let half_extent = (terrain.width.min(terrain.depth) / 2) as f32 * terrain.block_size;
    let radius = half_extent * world.home_ring_fraction;

    (0..count)
        .map(|i| {
            let angle = TAU * i as f32 / count as f32;
            let x = radius * angle.cos();
            let z = radius * angle.sin();
            let floor = terrain.surface_y_at(x, z).unwrap_or(0.0);
            Vec3::new(x, floor + world.swim_height, z)
        })
        .collect()
}
