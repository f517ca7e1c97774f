//! Individual boid state and integration.

use glam::{Quat, Vec3};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::f32::consts::TAU;

/// One simulated individual. Positions are local to the group's home point.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoidAgent {
    pub position: Vec3,
    pub velocity: Vec3,
    /// Force accumulator, cleared after every integration
    pub acceleration: Vec3,
    /// Per-agent phase offset for secondary motion (radians)
    pub phase: f32,
}

impl BoidAgent {
    /// Spawn uniformly inside a sphere of `radius` around the home point,
    /// heading in a random direction at `speed`.
    pub fn spawn<R: Rng + ?Sized>(rng: &mut R, radius: f32, speed: f32) -> Self {
        let offset = random_unit_vector(rng) * radius.max(0.0) * rng.gen::<f32>().cbrt();
        Self {
            position: offset,
            velocity: random_unit_vector(rng) * speed,
            acceleration: Vec3::ZERO,
            phase: rng.gen_range(0.0..TAU),
        }
    }

    #[inline]
    pub fn apply_force(&mut self, force: Vec3) {
        self.acceleration += force;
    }

    /// Advance one tick: move with the current velocity, then fold in the
    /// accumulated acceleration and keep speed within `[min_speed, max_speed]`.
    pub fn integrate(&mut self, dt: f32, min_speed: f32, max_speed: f32) {
        self.position += self.velocity * dt;

        let previous = self.velocity;
        self.velocity = clamp_speed(self.velocity + self.acceleration * dt, previous, min_speed, max_speed);

        self.acceleration = Vec3::ZERO;
    }

    #[inline]
    pub fn speed(&self) -> f32 {
        self.velocity.length()
    }
}

/// Render-facing pose of one agent
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct AgentTransform {
    /// World-space position
    pub position: Vec3,
    pub rotation: Quat,
    pub scale: Vec3,
    /// 1.0 is fully opaque
    pub opacity: f32,
}

impl Default for AgentTransform {
    fn default() -> Self {
        Self {
            position: Vec3::ZERO,
            rotation: Quat::IDENTITY,
            scale: Vec3::ONE,
            opacity: 1.0,
        }
    }
}

/// Rotation that turns the model's forward axis (+Z) toward `direction`.
/// Zero-length directions keep the identity rotation.
pub fn facing(direction: Vec3) -> Quat {
    match direction.try_normalize() {
        Some(dir) => Quat::from_rotation_arc(Vec3::Z, dir),
        None => Quat::IDENTITY,
    }
}

/// Length clamp that preserves direction. A vanishing velocity falls back to
/// `fallback`'s heading (or +Z) at the minimum speed so agents never stall.
pub fn clamp_speed(velocity: Vec3, fallback: Vec3, min_speed: f32, max_speed: f32) -> Vec3 {
    let max_speed = max_speed.max(0.0);
    let min_speed = min_speed.clamp(0.0, max_speed);

    match velocity.try_normalize() {
        Some(dir) => dir * velocity.length().clamp(min_speed, max_speed),
        None => fallback.try_normalize().unwrap_or(Vec3::Z) * min_speed,
    }
}

fn random_unit_vector<R: Rng + ?Sized>(rng: &mut R) -> Vec3 {
    let z: f32 = rng.gen_range(-1.0..=1.0);
    let theta: f32 = rng.gen_range(0.0..TAU);
    let r = (1.0 - z * z).max(0.0).sqrt();
    Vec3::new(r * theta.cos(), r * theta.sin(), z)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    #[test]
    fn test_spawn_within_radius_at_speed() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        for _ in 0..200 {
            let agent = BoidAgent::spawn(&mut rng, 3.0, 2.0);
            assert!(agent.position.length() <= 3.0 + 1e-4);
            assert!((agent.speed() - 2.0).abs() < 1e-3);
            assert_eq!(agent.acceleration, Vec3::ZERO);
        }
    }

    #[test]
    fn test_clamp_preserves_direction() {
        let v = clamp_speed(Vec3::new(10.0, 0.0, 10.0), Vec3::Z, 1.0, 2.0);
        assert!((v.length() - 2.0).abs() < 1e-5);
        assert!((v.x - v.z).abs() < 1e-5);

        let slow = clamp_speed(Vec3::new(0.0, 0.1, 0.0), Vec3::Z, 1.0, 2.0);
        assert!((slow.length() - 1.0).abs() < 1e-5);
        assert!(slow.y > 0.0);
    }

    #[test]
    fn test_clamp_zero_velocity_uses_fallback() {
        let v = clamp_speed(Vec3::ZERO, Vec3::X * 5.0, 1.5, 3.0);
        assert_eq!(v, Vec3::X * 1.5);

        let v = clamp_speed(Vec3::ZERO, Vec3::ZERO, 1.5, 3.0);
        assert_eq!(v, Vec3::Z * 1.5);
    }

    #[test]
    fn test_integrate_resets_acceleration() {
        let mut agent = BoidAgent {
            position: Vec3::ZERO,
            velocity: Vec3::X,
            acceleration: Vec3::ZERO,
            phase: 0.0,
        };
        agent.apply_force(Vec3::new(0.0, 60.0, 0.0));
        agent.integrate(1.0 / 60.0, 0.5, 1.0);

        assert_eq!(agent.position, Vec3::X / 60.0);
        assert_eq!(agent.acceleration, Vec3::ZERO);
        assert!((agent.speed() - 1.0).abs() < 1e-5);
        assert!(agent.velocity.y > 0.0);
    }

    #[test]
    fn test_facing_degenerate_direction() {
        assert_eq!(facing(Vec3::ZERO), Quat::IDENTITY);

        let q = facing(Vec3::X);
        let forward = q * Vec3::Z;
        assert!((forward - Vec3::X).length() < 1e-5);
    }
}
