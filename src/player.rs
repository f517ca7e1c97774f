//! Minimal player motion controller.
//!
//! The real controller (keyboard or gesture driven, camera attached) lives
//! outside the core. This one honors the same contract: once per frame it
//! turns a movement intent into a position and a "swimming" flag that the
//! flocks and scanners read afterwards.

use crate::config::ConfigError;
use glam::Vec3;
use serde::{Deserialize, Serialize};

/// Movement intents shorter than this count as holding still
const MOVE_EPSILON: f32 = 1.0e-3;

/// Player motion parameters
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlayerConfig {
    /// Top swim speed (units/s)
    pub swim_speed: f32,
    /// How quickly velocity follows the input (1/s)
    pub response: f32,
    /// Distance the player may drift past the terrain edge
    pub bound_margin: f32,
    pub min_altitude: f32,
    pub max_altitude: f32,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            swim_speed: 6.0,
            response: 4.0,
            bound_margin: 2.0,
            min_altitude: -4.0,
            max_altitude: 30.0,
        }
    }
}

impl PlayerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.swim_speed.is_finite() && self.swim_speed > 0.0) {
            return Err(ConfigError::Invalid("player.swim_speed must be > 0".to_string()));
        }
        if !(self.response.is_finite() && self.response > 0.0) {
            return Err(ConfigError::Invalid("player.response must be > 0".to_string()));
        }
        if self.bound_margin < 0.0 {
            return Err(ConfigError::Invalid("player.bound_margin must be >= 0".to_string()));
        }
        if self.min_altitude > self.max_altitude {
            return Err(ConfigError::Invalid(
                "player.min_altitude cannot exceed max_altitude".to_string(),
            ));
        }
        Ok(())
    }
}

/// Per-frame input from the controller collaborator
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct PlayerInput {
    /// Desired direction, world space. Length above 1 is treated as 1.
    pub movement: Vec3,
    /// Edge-triggered interact request
    pub interact: bool,
}

impl PlayerInput {
    pub fn idle() -> Self {
        Self::default()
    }

    pub fn swim(direction: Vec3) -> Self {
        Self {
            movement: direction,
            interact: false,
        }
    }

    pub fn interact() -> Self {
        Self {
            movement: Vec3::ZERO,
            interact: true,
        }
    }
}

/// What the simulation sees of the player in one frame
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerSample {
    pub position: Vec3,
    /// Actively swimming this frame
    pub moving: bool,
}

#[derive(Debug, Clone)]
pub struct PlayerState {
    position: Vec3,
    velocity: Vec3,
    moving: bool,
    config: PlayerConfig,
}

impl PlayerState {
    pub fn new(position: Vec3, config: PlayerConfig) -> Self {
        Self {
            position,
            velocity: Vec3::ZERO,
            moving: false,
            config,
        }
    }

    /// Apply one frame of input. `bounds` is the horizontal extent of the
    /// terrain (min corner, max corner); the player may drift past it by
    /// the configured margin.
    pub fn update(&mut self, dt: f32, input: &PlayerInput, bounds: Option<(Vec3, Vec3)>) {
        if !(dt.is_finite() && dt > 0.0) {
            return;
        }

        let intent = input.movement.clamp_length_max(1.0);
        self.moving = intent.length_squared() > MOVE_EPSILON * MOVE_EPSILON;

        let target = if self.moving {
            intent * self.config.swim_speed
        } else {
            Vec3::ZERO
        };
        // Exponential approach toward the target velocity
        let blend = 1.0 - (-self.config.response * dt).exp();
        self.velocity += (target - self.velocity) * blend;
        self.position += self.velocity * dt;

        self.apply_bounds(bounds);
    }

    fn apply_bounds(&mut self, bounds: Option<(Vec3, Vec3)>) {
        let margin = self.config.bound_margin;
        if let Some((min, max)) = bounds {
            let clamped_x = self.position.x.clamp(min.x - margin, max.x + margin);
            let clamped_z = self.position.z.clamp(min.z - margin, max.z + margin);
            if clamped_x != self.position.x {
                self.velocity.x = 0.0;
            }
            if clamped_z != self.position.z {
                self.velocity.z = 0.0;
            }
            self.position.x = clamped_x;
            self.position.z = clamped_z;
        }

        let clamped_y = self
            .position
            .y
            .clamp(self.config.min_altitude, self.config.max_altitude);
        if clamped_y != self.position.y {
            self.velocity.y = 0.0;
            self.position.y = clamped_y;
        }
    }

    /// Place the player directly, keeping the current motion flag
    pub fn teleport(&mut self, position: Vec3) {
        self.position = position;
        self.velocity = Vec3::ZERO;
    }

    pub fn sample(&self) -> PlayerSample {
        PlayerSample {
            position: self.position,
            moving: self.moving,
        }
    }

    pub fn position(&self) -> Vec3 {
        self.position
    }

    pub fn velocity(&self) -> Vec3 {
        self.velocity
    }

    pub fn is_moving(&self) -> bool {
        self.moving
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DT: f32 = 1.0 / 60.0;

    #[test]
    fn test_idle_player_is_not_moving() {
        let mut player = PlayerState::new(Vec3::ZERO, PlayerConfig::default());
        player.update(DT, &PlayerInput::idle(), None);

        assert!(!player.is_moving());
        assert_eq!(player.position(), Vec3::ZERO);
    }

    #[test]
    fn test_swimming_accelerates_toward_swim_speed() {
        let config = PlayerConfig::default();
        let mut player = PlayerState::new(Vec3::ZERO, config.clone());

        for _ in 0..300 {
            player.update(DT, &PlayerInput::swim(Vec3::new(5.0, 0.0, 0.0)), None);
        }

        assert!(player.is_moving());
        assert!(player.velocity().x <= config.swim_speed + 1e-4);
        assert!(player.velocity().x > config.swim_speed * 0.95);
        assert!(player.position().x > 0.0);
    }

    #[test]
    fn test_soft_bounds() {
        let mut player = PlayerState::new(Vec3::ZERO, PlayerConfig::default());
        let bounds = (Vec3::new(-5.0, 0.0, -5.0), Vec3::new(5.0, 0.0, 5.0));

        for _ in 0..600 {
            player.update(DT, &PlayerInput::swim(Vec3::X), Some(bounds));
        }

        assert!((player.position().x - 7.0).abs() < 1e-4);
        assert_eq!(player.velocity().x, 0.0);
    }

    #[test]
    fn test_altitude_clamp() {
        let config = PlayerConfig::default();
        let mut player = PlayerState::new(Vec3::new(0.0, config.max_altitude, 0.0), config.clone());
        player.update(1.0, &PlayerInput::swim(Vec3::Y), None);
        assert_eq!(player.position().y, config.max_altitude);
    }

    #[test]
    fn test_non_positive_dt_ignored() {
        let mut player = PlayerState::new(Vec3::ONE, PlayerConfig::default());
        player.update(0.0, &PlayerInput::swim(Vec3::X), None);
        player.update(-1.0, &PlayerInput::swim(Vec3::X), None);
        assert_eq!(player.position(), Vec3::ONE);
        assert!(!player.is_moving());
    }

    #[test]
    fn test_config_validation() {
        assert!(PlayerConfig::default().validate().is_ok());
        let bad = PlayerConfig {
            min_altitude: 10.0,
            max_altitude: 0.0,
            ..PlayerConfig::default()
        };
        assert!(bad.validate().is_err());
    }
}
