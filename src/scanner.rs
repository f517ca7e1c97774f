//! Proximity scanning with hysteresis.

use crate::config::ConfigError;
use serde::{Deserialize, Serialize};

/// Scanner thresholds
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScannerConfig {
    /// Scanning starts below this distance
    pub enter_distance: f32,
    /// Scanning ends above this distance
    pub exit_distance: f32,
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            enter_distance: 10.0,
            exit_distance: 15.0,
        }
    }
}

impl ScannerConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.enter_distance.is_finite() && self.enter_distance >= 0.0) {
            return Err(ConfigError::Invalid("scanner.enter_distance must be >= 0".to_string()));
        }
        if !self.exit_distance.is_finite() || self.exit_distance < self.enter_distance {
            return Err(ConfigError::Invalid(
                "scanner.exit_distance cannot be below enter_distance".to_string(),
            ));
        }
        Ok(())
    }
}

/// Emitted once per state change
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanTransition {
    Started,
    Ended,
}

/// Tracks whether one group is currently being scanned
#[derive(Debug, Clone)]
pub struct ProximityScanner {
    config: ScannerConfig,
    scanned: bool,
}

impl ProximityScanner {
    pub fn new(config: ScannerConfig) -> Self {
        Self {
            config,
            scanned: false,
        }
    }

    /// Feed the current player-to-home distance. Returns a transition only
    /// when the scanned flag flips.
    pub fn update(&mut self, distance: f32) -> Option<ScanTransition> {
        // NaN compares false both ways and leaves the state alone
        if !self.scanned && distance < self.config.enter_distance {
            self.scanned = true;
            Some(ScanTransition::Started)
        } else if self.scanned && distance > self.config.exit_distance {
            self.scanned = false;
            Some(ScanTransition::Ended)
        } else {
            None
        }
    }

    pub fn is_scanned(&self) -> bool {
        self.scanned
    }

    /// Drop back to idle without emitting anything
    pub fn reset(&mut self) {
        self.scanned = false;
    }

    pub fn config(&self) -> &ScannerConfig {
        &self.config
    }
}

impl Default for ProximityScanner {
    fn default() -> Self {
        Self::new(ScannerConfig::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hysteresis_sequence() {
        let mut scanner = ProximityScanner::default();
        let events: Vec<_> = [20.0, 9.0, 11.0, 14.0, 16.0, 9.0]
            .iter()
            .map(|d| scanner.update(*d))
            .collect();

        assert_eq!(
            events,
            vec![
                None,
                Some(ScanTransition::Started),
                None,
                None,
                Some(ScanTransition::Ended),
                Some(ScanTransition::Started),
            ]
        );
        assert!(scanner.is_scanned());
    }

    #[test]
    fn test_no_repeat_while_unchanged() {
        let mut scanner = ProximityScanner::default();
        assert_eq!(scanner.update(5.0), Some(ScanTransition::Started));
        for _ in 0..10 {
            assert_eq!(scanner.update(5.0), None);
        }
        // Boundaries are exclusive
        assert_eq!(scanner.update(15.0), None);
        assert_eq!(scanner.update(15.01), Some(ScanTransition::Ended));
        assert_eq!(scanner.update(10.0), None);
    }

    #[test]
    fn test_nan_distance_keeps_state() {
        let mut scanner = ProximityScanner::default();
        assert_eq!(scanner.update(f32::NAN), None);
        scanner.update(1.0);
        assert_eq!(scanner.update(f32::NAN), None);
        assert!(scanner.is_scanned());
    }

    #[test]
    fn test_reset() {
        let mut scanner = ProximityScanner::default();
        scanner.update(1.0);
        scanner.reset();
        assert!(!scanner.is_scanned());
        assert_eq!(scanner.update(1.0), Some(ScanTransition::Started));
    }

    #[test]
    fn test_config_validation() {
        assert!(ScannerConfig::default().validate().is_ok());
        let inverted = ScannerConfig {
            enter_distance: 15.0,
            exit_distance: 10.0,
        };
        assert!(inverted.validate().is_err());
    }
}
