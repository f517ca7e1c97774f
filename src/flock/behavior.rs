//! Steering rules: neighbor flocking, home centering and player reactions.

use super::boid::BoidAgent;
use super::FlockConfig;
use crate::species::BehaviorMode;
use glam::Vec3;

const EPSILON: f32 = 1.0e-6;

/// Rule weights for one behavior mode
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct BehaviorWeights {
    pub alignment: f32,
    pub cohesion: f32,
    pub separation: f32,
    /// Multiplier on the configured centering strength
    pub centering: f32,
}

impl BehaviorWeights {
    pub const fn for_mode(mode: BehaviorMode) -> Self {
        match mode {
            BehaviorMode::School => Self {
                alignment: 1.0,
                cohesion: 2.0,
                separation: 1.3,
                centering: 0.8,
            },
            BehaviorMode::Solitary => Self {
                alignment: 0.05,
                cohesion: 0.05,
                separation: 3.0,
                centering: 0.4,
            },
            BehaviorMode::Wander => Self {
                alignment: 0.5,
                cohesion: 0.8,
                separation: 1.0,
                centering: 1.0,
            },
        }
    }
}

/// Sums gathered over the neighbors of one agent
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct NeighborSums {
    pub velocity: Vec3,
    pub position: Vec3,
    /// Unit vectors away from each neighbor, divided by distance
    pub away: Vec3,
    pub count: usize,
}

/// Scan every other agent within `radius` of agent `i`. O(n).
pub fn gather_neighbors(agents: &[BoidAgent], i: usize, radius: f32) -> NeighborSums {
    let mut sums = NeighborSums::default();
    let Some(me) = agents.get(i) else {
        return sums;
    };
    let radius_sq = radius * radius;

    for (j, other) in agents.iter().enumerate() {
        if j == i {
            continue;
        }
        let offset = me.position - other.position;
        let dist_sq = offset.length_squared();
        // Coincident agents give no usable direction.
        if dist_sq <= EPSILON || dist_sq > radius_sq {
            continue;
        }

        let dist = dist_sq.sqrt();
        sums.velocity += other.velocity;
        sums.position += other.position;
        sums.away += offset / dist / dist;
        sums.count += 1;
    }

    sums
}

/// Reynolds steering: desired velocity along `direction` at `max_speed`,
/// minus the current velocity, capped at `max_force`.
pub fn steer(direction: Vec3, velocity: Vec3, max_speed: f32, max_force: f32) -> Vec3 {
    match direction.try_normalize() {
        Some(dir) => (dir * max_speed - velocity).clamp_length_max(max_force),
        None => Vec3::ZERO,
    }
}

/// Weighted alignment + cohesion + separation for one agent
pub fn flocking_force(
    agent: &BoidAgent,
    sums: &NeighborSums,
    weights: &BehaviorWeights,
    max_speed: f32,
    max_force: f32,
) -> Vec3 {
    if sums.count == 0 {
        return Vec3::ZERO;
    }

    let center = sums.position / sums.count as f32;
    let alignment = steer(sums.velocity, agent.velocity, max_speed, max_force);
    let cohesion = steer(center - agent.position, agent.velocity, max_speed, max_force);
    let separation = steer(sums.away, agent.velocity, max_speed, max_force);

    alignment * weights.alignment + cohesion * weights.cohesion + separation * weights.separation
}

/// Pull back toward the local origin once outside `radius`, growing with
/// the distance strayed.
pub fn centering_force(position: Vec3, radius: f32, strength: f32) -> Vec3 {
    let dist = position.length();
    if dist <= radius || dist <= EPSILON {
        return Vec3::ZERO;
    }
    -position / dist * (dist - radius) * strength
}

/// How a reactive agent currently relates to the player
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum PlayerReaction {
    /// Player out of range, or species not reactive
    #[default]
    Ignore,
    /// Player swimming nearby: dart away
    Flee,
    /// Player holding still: approach
    Follow,
    /// Close enough to a still player: hover in place, facing them
    Linger,
}

impl PlayerReaction {
    /// Follow-mode reactions face the player and pulse harder
    pub fn is_following(&self) -> bool {
        matches!(self, PlayerReaction::Follow | PlayerReaction::Linger)
    }
}

/// Reaction force for a player-reactive species. `player` is local to the
/// group's home point.
pub fn react_to_player(
    agent: &BoidAgent,
    player: Vec3,
    player_moving: bool,
    config: &FlockConfig,
) -> (Vec3, PlayerReaction) {
    let to_player = player - agent.position;
    let dist = to_player.length();

    if dist > config.detection_radius {
        return (Vec3::ZERO, PlayerReaction::Ignore);
    }

    if player_moving {
        // Directly on top of the player: bolt along the current heading.
        let away = (-to_player)
            .try_normalize()
            .or_else(|| agent.velocity.try_normalize())
            .unwrap_or(Vec3::Z);
        return (away * config.flee_strength, PlayerReaction::Flee);
    }

    if dist > config.comfort_distance {
        let toward = to_player.try_normalize().unwrap_or(Vec3::ZERO);
        (toward * config.follow_strength, PlayerReaction::Follow)
    } else {
        (Vec3::ZERO, PlayerReaction::Linger)
    }
}
