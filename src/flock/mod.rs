//! Per-species boid groups.
//!
//! Each [`FlockGroup`] owns its agents exclusively; groups never see each
//! other. A tick runs in two phases like the world step: forces are computed
//! from a read-only view of the group, then every agent integrates.

pub mod behavior;
pub mod boid;

pub use behavior::{BehaviorWeights, PlayerReaction};
pub use boid::{AgentTransform, BoidAgent};

use crate::config::ConfigError;
use crate::player::PlayerSample;
use crate::species::SpeciesDefinition;
use behavior::{centering_force, flocking_force, gather_neighbors, react_to_player};
use glam::Vec3;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Flocking parameters shared by every group
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlockConfig {
    /// Neighbors farther than this are ignored
    pub perception_radius: f32,
    /// Cap on each steering rule (units/s²)
    pub max_force: f32,
    /// Agents beyond this distance from home are pulled back
    pub centering_radius: f32,
    /// Pull per unit strayed (units/s² per unit)
    pub centering_strength: f32,
    /// Spawn sphere around the home point
    pub spawn_radius: f32,
    /// Reactive species notice the player inside this radius
    pub detection_radius: f32,
    /// Followers stop approaching inside this distance
    pub comfort_distance: f32,
    pub flee_strength: f32,
    pub follow_strength: f32,
    /// Idle scale pulse (fraction of body scale)
    pub pulse_amplitude: f32,
    /// Scale pulse while following the player
    pub follow_pulse_amplitude: f32,
    /// Pulse rate (radians/s)
    pub pulse_frequency: f32,
    /// Opacity wave rate for phasing species (radians/s)
    pub phasing_frequency: f32,
    pub phasing_min_opacity: f32,
    pub phasing_max_opacity: f32,
}

impl Default for FlockConfig {
    fn default() -> Self {
        Self {
            perception_radius: 2.5,
            max_force: 3.0,
            centering_radius: 5.0,
            centering_strength: 3.0,
            spawn_radius: 3.0,
            detection_radius: 8.0,
            comfort_distance: 2.0,
            flee_strength: 12.0,
            follow_strength: 4.0,
            pulse_amplitude: 0.04,
            follow_pulse_amplitude: 0.15,
            pulse_frequency: 3.0,
            phasing_frequency: 1.2,
            phasing_min_opacity: 0.2,
            phasing_max_opacity: 0.9,
        }
    }
}

impl FlockConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        let non_negative = [
            ("perception_radius", self.perception_radius),
            ("centering_radius", self.centering_radius),
            ("centering_strength", self.centering_strength),
            ("spawn_radius", self.spawn_radius),
            ("detection_radius", self.detection_radius),
            ("comfort_distance", self.comfort_distance),
            ("flee_strength", self.flee_strength),
            ("follow_strength", self.follow_strength),
            ("pulse_amplitude", self.pulse_amplitude),
            ("follow_pulse_amplitude", self.follow_pulse_amplitude),
        ];
        for (name, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(ConfigError::Invalid(format!("flock.{} must be >= 0", name)));
            }
        }
        if !(self.max_force.is_finite() && self.max_force > 0.0) {
            return Err(ConfigError::Invalid("flock.max_force must be > 0".to_string()));
        }
        if !(0.0..=1.0).contains(&self.phasing_min_opacity)
            || !(0.0..=1.0).contains(&self.phasing_max_opacity)
            || self.phasing_min_opacity > self.phasing_max_opacity
        {
            return Err(ConfigError::Invalid(
                "flock phasing opacities must satisfy 0 <= min <= max <= 1".to_string(),
            ));
        }
        Ok(())
    }
}

/// A school (or loose group) of one species anchored at a fixed home point
#[derive(Clone, Debug)]
pub struct FlockGroup {
    species: Arc<SpeciesDefinition>,
    home: Vec3,
    weights: BehaviorWeights,
    agents: Vec<BoidAgent>,
    reactions: Vec<PlayerReaction>,
    transforms: Vec<AgentTransform>,
    /// Seconds simulated so far, drives pulsing and phasing
    elapsed: f32,
    config: FlockConfig,
}

impl FlockGroup {
    /// Spawn `species.population` agents around `home`
    pub fn new<R: Rng + ?Sized>(
        species: Arc<SpeciesDefinition>,
        home: Vec3,
        config: FlockConfig,
        rng: &mut R,
    ) -> Self {
        let agents: Vec<BoidAgent> = (0..species.population)
            .map(|_| BoidAgent::spawn(rng, config.spawn_radius, species.speed))
            .collect();
        let count = agents.len();

        let mut group = Self {
            weights: BehaviorWeights::for_mode(species.behavior),
            species,
            home,
            agents,
            reactions: vec![PlayerReaction::Ignore; count],
            transforms: vec![AgentTransform::default(); count],
            elapsed: 0.0,
            config,
        };
        group.refresh_transforms(Vec3::ZERO);
        group
    }

    /// Advance the group by `dt` seconds and return the refreshed transforms.
    /// Non-positive or non-finite `dt` leaves the group untouched.
    pub fn advance(&mut self, dt: f32, player: &PlayerSample) -> &[AgentTransform] {
        if !(dt.is_finite() && dt > 0.0) || self.agents.is_empty() {
            return &self.transforms;
        }

        let player_local = player.position - self.home;
        let max_speed = self.species.max_speed();
        let min_speed = self.species.min_speed();
        let centering = self.config.centering_strength * self.weights.centering;
        let reactive = self.species.hooks.player_reactive;

        // Phase 1: forces from a read-only view of the group
        let forces: Vec<(Vec3, PlayerReaction)> = (0..self.agents.len())
            .map(|i| {
                let agent = &self.agents[i];
                let sums = gather_neighbors(&self.agents, i, self.config.perception_radius);

                let mut force = flocking_force(agent, &sums, &self.weights, max_speed, self.config.max_force);
                force += centering_force(agent.position, self.config.centering_radius, centering);

                let mut reaction = PlayerReaction::Ignore;
                if reactive {
                    let (push, r) = react_to_player(agent, player_local, player.moving, &self.config);
                    force += push;
                    reaction = r;
                }
                (force, reaction)
            })
            .collect();

        // Phase 2: integrate
        for (i, (force, reaction)) in forces.into_iter().enumerate() {
            let agent = &mut self.agents[i];
            agent.apply_force(force);
            agent.integrate(dt, min_speed, max_speed);
            self.reactions[i] = reaction;
        }

        self.elapsed += dt;
        self.refresh_transforms(player_local);

        log::trace!(
            "flock {}: t={:.2}s, {} agents",
            self.species.id,
            self.elapsed,
            self.agents.len()
        );

        &self.transforms
    }

    fn refresh_transforms(&mut self, player_local: Vec3) {
        let cfg = &self.config;
        let phasing = self.species.hooks.phasing;
        let opacity_mid = (cfg.phasing_max_opacity + cfg.phasing_min_opacity) * 0.5;
        let opacity_half = (cfg.phasing_max_opacity - cfg.phasing_min_opacity) * 0.5;

        for ((agent, reaction), transform) in self
            .agents
            .iter()
            .zip(&self.reactions)
            .zip(self.transforms.iter_mut())
        {
            let following = reaction.is_following();
            let look = if following {
                player_local - agent.position
            } else {
                agent.velocity
            };

            let amplitude = if following {
                cfg.follow_pulse_amplitude
            } else {
                cfg.pulse_amplitude
            };
            let pulse = 1.0 + (self.elapsed * cfg.pulse_frequency + agent.phase).sin() * amplitude;

            let opacity = if phasing {
                opacity_mid + opacity_half * (self.elapsed * cfg.phasing_frequency + agent.phase).sin()
            } else {
                1.0
            };

            *transform = AgentTransform {
                position: self.home + agent.position,
                rotation: boid::facing(look),
                scale: self.species.scale * pulse,
                opacity,
            };
        }
    }

    /// True while the player is within the reactive detection radius of the
    /// home point (not of any single agent).
    pub fn player_in_range(&self, player_world: Vec3) -> bool {
        self.distance_from_home(player_world) <= self.config.detection_radius
    }

    pub fn distance_from_home(&self, point: Vec3) -> f32 {
        (point - self.home).length()
    }

    pub fn species(&self) -> &Arc<SpeciesDefinition> {
        &self.species
    }

    pub fn home(&self) -> Vec3 {
        self.home
    }

    pub fn agents(&self) -> &[BoidAgent] {
        &self.agents
    }

    pub fn transforms(&self) -> &[AgentTransform] {
        &self.transforms
    }

    pub fn reactions(&self) -> &[PlayerReaction] {
        &self.reactions
    }

    pub fn len(&self) -> usize {
        self.agents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.agents.is_empty()
    }

    pub fn elapsed(&self) -> f32 {
        self.elapsed
    }

    pub fn config(&self) -> &FlockConfig {
        &self.config
    }
}
