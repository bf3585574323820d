//! Health, energy and cooldown bookkeeping for one combatant.

use std::collections::{BTreeMap, HashMap};

use crate::catalog::types::Move;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceLedger {
    health: u32,
    max_health: u32,
    energy: u32,
    max_energy: u32,
    cooldowns: HashMap<String, u32>,
}

impl ResourceLedger {
    /// Full health and energy, nothing on cooldown.
    pub fn new(max_health: u32, max_energy: u32) -> Self {
        ResourceLedger {
            health: max_health,
            max_health,
            energy: max_energy,
            max_energy,
            cooldowns: HashMap::new(),
        }
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.max_health
    }

    pub fn energy(&self) -> u32 {
        self.energy
    }

    pub fn max_energy(&self) -> u32 {
        self.max_energy
    }

    pub fn is_defeated(&self) -> bool {
        self.health == 0
    }

    pub fn health_ratio(&self) -> f32 {
        if self.max_health == 0 {
            0.0
        } else {
            self.health as f32 / self.max_health as f32
        }
    }

    pub fn can_afford(&self, mv: &Move) -> bool {
        self.energy >= mv.energy_cost
    }

    /// Callers check `can_afford` first; the balance never goes below zero.
    pub fn consume_energy(&mut self, mv: &Move) {
        self.energy = self.energy.saturating_sub(mv.energy_cost);
    }

    /// End-of-turn regeneration, clamped to `max`.
    pub fn regenerate(&mut self, amount: u32, max: u32) {
        let cap = max.min(self.max_energy);
        self.energy = self.energy.saturating_add(amount).min(cap);
    }

    pub fn apply_damage(&mut self, amount: u32) {
        self.health = self.health.saturating_sub(amount);
    }

    /// Restore health up to the maximum; returns the amount actually restored.
    pub fn heal(&mut self, amount: u32) -> u32 {
        let before = self.health;
        self.health = self.health.saturating_add(amount).min(self.max_health);
        self.health - before
    }

    pub fn set_cooldown(&mut self, move_id: &str, length: u32) {
        if length == 0 {
            self.cooldowns.remove(move_id);
        } else {
            self.cooldowns.insert(move_id.to_string(), length);
        }
    }

    /// Decrement every cooldown by one and drop the ones that reach zero.
    pub fn tick_cooldowns(&mut self) {
        self.cooldowns.retain(|_, turns| {
            *turns = turns.saturating_sub(1);
            *turns > 0
        });
    }

    pub fn cooldown_of(&self, move_id: &str) -> u32 {
        self.cooldowns.get(move_id).copied().unwrap_or(0)
    }

    pub fn is_on_cooldown(&self, move_id: &str) -> bool {
        self.cooldown_of(move_id) > 0
    }

    pub fn can_use_move(&self, mv: &Move) -> bool {
        self.can_afford(mv) && !self.is_on_cooldown(&mv.id)
    }

    /// Sorted copy of the active cooldowns for snapshots.
    pub fn cooldowns(&self) -> BTreeMap<String, u32> {
        self.cooldowns
            .iter()
            .map(|(id, turns)| (id.clone(), *turns))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::default_catalog;

    fn quick_sort() -> Move {
        default_catalog()
            .get("quick_sort")
            .cloned()
            .expect("quick_sort in default catalog")
    }

    #[test]
    fn damage_floors_at_zero() {
        let mut ledger = ResourceLedger::new(20, 50);
        ledger.apply_damage(25);
        assert_eq!(ledger.health(), 0);
        assert!(ledger.is_defeated());
    }

    #[test]
    fn heal_is_clamped_and_reports_restored_amount() {
        let mut ledger = ResourceLedger::new(100, 50);
        ledger.apply_damage(10);
        assert_eq!(ledger.heal(25), 10);
        assert_eq!(ledger.health(), 100);
    }

    #[test]
    fn regeneration_clamps_to_max() {
        let mut ledger = ResourceLedger::new(100, 50);
        ledger.consume_energy(&quick_sort());
        assert_eq!(ledger.energy(), 25);
        ledger.regenerate(40, 50);
        assert_eq!(ledger.energy(), 50);
    }

    #[test]
    fn cooldown_counts_down_then_clears() {
        let mv = quick_sort();
        let mut ledger = ResourceLedger::new(100, 100);
        ledger.set_cooldown(&mv.id, 3);
        assert!(!ledger.can_use_move(&mv));
        ledger.tick_cooldowns();
        assert_eq!(ledger.cooldown_of(&mv.id), 2);
        ledger.tick_cooldowns();
        ledger.tick_cooldowns();
        assert_eq!(ledger.cooldown_of(&mv.id), 0);
        assert!(ledger.cooldowns().is_empty());
        assert!(ledger.can_use_move(&mv));
    }

    #[test]
    fn unaffordable_move_is_not_usable() {
        let mv = quick_sort();
        let ledger = ResourceLedger::new(100, 10);
        assert!(!ledger.can_afford(&mv));
        assert!(!ledger.can_use_move(&mv));
    }
}
