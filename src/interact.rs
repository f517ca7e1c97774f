//! Interactable props and per-session state.

use crate::config::ConfigError;
use crate::terrain::{InteractableId, InteractableItem, InteractableKind};
use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct InteractionConfig {
    /// Props farther than this from the player are ignored
    pub radius: f32,
}

impl Default for InteractionConfig {
    fn default() -> Self {
        Self { radius: 4.0 }
    }
}

impl InteractionConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.radius.is_finite() && self.radius >= 0.0) {
            return Err(ConfigError::Invalid("interaction.radius must be >= 0".to_string()));
        }
        Ok(())
    }
}

/// Mutable state for one play session. Owned by the orchestrator and lent
/// to the queries that need it; nothing here is ever reset mid-session.
#[derive(Debug, Clone, Default)]
pub struct SessionState {
    activated: HashSet<InteractableId>,
    /// Species ids in the order they were first scanned
    discovered: Vec<String>,
    collected: HashSet<String>,
}

impl SessionState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark an interactable as activated. Returns false if it already was.
    pub fn activate(&mut self, id: InteractableId) -> bool {
        self.activated.insert(id)
    }

    pub fn is_activated(&self, id: &InteractableId) -> bool {
        self.activated.contains(id)
    }

    pub fn activated_count(&self) -> usize {
        self.activated.len()
    }

    /// Record a scanned species. Returns true the first time only.
    pub fn record_discovery(&mut self, species_id: &str) -> bool {
        if self.collected.contains(species_id) {
            return false;
        }
        self.collected.insert(species_id.to_string());
        self.discovered.push(species_id.to_string());
        true
    }

    pub fn has_discovered(&self, species_id: &str) -> bool {
        self.collected.contains(species_id)
    }

    pub fn discovered(&self) -> &[String] {
        &self.discovered
    }
}

/// Static list of props produced by terrain generation
#[derive(Debug, Clone)]
pub struct InteractableRegistry {
    items: Vec<InteractableItem>,
    config: InteractionConfig,
}

impl InteractableRegistry {
    pub fn new(items: Vec<InteractableItem>, config: InteractionConfig) -> Self {
        Self { items, config }
    }

    /// Nearest not-yet-activated item within the interaction radius
    pub fn closest(&self, player: Vec3, session: &SessionState) -> Option<&InteractableItem> {
        let radius_sq = self.config.radius * self.config.radius;

        self.items
            .iter()
            .filter(|item| !session.is_activated(&item.id))
            .map(|item| (item, item.position.distance_squared(player)))
            .filter(|(_, d2)| *d2 <= radius_sq)
            .min_by(|a, b| a.1.total_cmp(&b.1))
            .map(|(item, _)| item)
    }

    /// Activate whatever is closest to the player, if anything. Returns the
    /// item that changed state.
    pub fn activate_closest(&self, player: Vec3, session: &mut SessionState) -> Option<InteractableItem> {
        let item = self.closest(player, session)?.clone();
        if session.activate(item.id) {
            log::info!("Activated {} at {:?}", item.id, item.position);
            Some(item)
        } else {
            None
        }
    }

    pub fn items(&self) -> &[InteractableItem] {
        &self.items
    }

    pub fn count(&self, kind: InteractableKind) -> usize {
        self.items.iter().filter(|item| item.kind == kind).count()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn config(&self) -> &InteractionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(kind: InteractableKind, x: i32, position: Vec3) -> InteractableItem {
        InteractableItem {
            id: InteractableId { kind, x, z: 0 },
            kind,
            position,
            yaw: 0.0,
        }
    }

    fn registry() -> InteractableRegistry {
        InteractableRegistry::new(
            vec![
                item(InteractableKind::Chest, 10, Vec3::new(10.0, 0.0, 0.0)),
                item(InteractableKind::Mechanism, 2, Vec3::new(2.0, 0.0, 0.0)),
                item(InteractableKind::Chest, 3, Vec3::new(0.0, 3.9, 0.0)),
            ],
            InteractionConfig::default(),
        )
    }

    #[test]
    fn test_closest_within_radius() {
        let registry = registry();
        let session = SessionState::new();

        let closest = registry.closest(Vec3::ZERO, &session).unwrap();
        assert_eq!(closest.id.x, 2);

        assert!(registry.closest(Vec3::new(0.0, 0.0, -20.0), &session).is_none());
    }

    #[test]
    fn test_activated_items_are_skipped() {
        let registry = registry();
        let mut session = SessionState::new();

        let first = registry.activate_closest(Vec3::ZERO, &mut session).unwrap();
        assert_eq!(first.id.x, 2);

        let next = registry.closest(Vec3::ZERO, &session).unwrap();
        assert_eq!(next.id.x, 3);

        registry.activate_closest(Vec3::ZERO, &mut session);
        assert!(registry.closest(Vec3::ZERO, &session).is_none());
        assert!(registry.activate_closest(Vec3::ZERO, &mut session).is_none());
        assert_eq!(session.activated_count(), 2);
    }

    #[test]
    fn test_activate_is_idempotent() {
        let mut session = SessionState::new();
        let id = InteractableId {
            kind: InteractableKind::Chest,
            x: 1,
            z: 1,
        };
        assert!(session.activate(id));
        assert!(!session.activate(id));
        assert_eq!(session.activated_count(), 1);
    }

    #[test]
    fn test_count_by_kind() {
        let registry = registry();
        assert_eq!(registry.count(InteractableKind::Chest), 2);
        assert_eq!(registry.count(InteractableKind::Mechanism), 1);
        assert_eq!(registry.len(), 3);
    }

    #[test]
    fn test_empty_registry() {
        let registry = InteractableRegistry::new(Vec::new(), InteractionConfig::default());
        assert!(registry.closest(Vec3::ZERO, &SessionState::new()).is_none());
        assert!(registry.is_empty());
    }

    #[test]
    fn test_discovery_recorded_once() {
        let mut session = SessionState::new();
        assert!(session.record_discovery("clownfish"));
        assert!(!session.record_discovery("clownfish"));
        assert!(session.record_discovery("manta_ray"));
        assert_eq!(session.discovered(), &["clownfish".to_string(), "manta_ray".to_string()]);
        assert!(session.has_discovered("manta_ray"));
    }
}
