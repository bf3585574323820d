//! Engine tuning knobs.
//!
//! The host reads them from Rocket's figment under the `duel` key, so they can
//! be set in `Rocket.toml` (`[default.duel]`) or through `ROCKET_DUEL=...`.
//! Every field falls back to its default when absent.

use rocket::figment::Figment;
use rocket::serde::{Deserialize, Serialize};

/// Damage multiplier per landed timing grade. A MISS always deals nothing.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde", default)]
pub struct GradeMultipliers {
    pub perfect: f32,
    pub great: f32,
    pub good: f32,
}

impl Default for GradeMultipliers {
    fn default() -> Self {
        GradeMultipliers {
            perfect: 1.5,
            great: 1.2,
            good: 1.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(crate = "rocket::serde", default)]
pub struct EngineConfig {
    /// Seed for the AI's random source.
    pub seed: u64,
    /// Capacity of the recent-events log.
    pub log_capacity: usize,
    /// Energy restored at the end of each owner turn.
    pub energy_regen: u32,
    pub player_max_health: u32,
    pub player_max_energy: u32,
    /// Length of one oscillation step in seconds.
    pub fixed_step_secs: f32,
    /// Marker speed per step for Easy, Medium, Hard, Expert.
    pub tier_speeds: [f32; 4],
    pub grade_multipliers: GradeMultipliers,
    /// Extra damage fraction per consecutive PERFECT hit.
    pub combo_step: f32,
    /// Combo count beyond which the multiplier stops growing.
    pub combo_cap: u32,
    /// Run the opponent's turn as soon as the player's turn ends.
    pub auto_ai_turn: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        EngineConfig {
            seed: 0x5EED,
            log_capacity: 8,
            energy_regen: 10,
            player_max_health: 100,
            player_max_energy: 100,
            fixed_step_secs: 1.0 / 60.0,
            tier_speeds: [1.0, 1.5, 2.2, 3.0],
            grade_multipliers: GradeMultipliers::default(),
            combo_step: 0.1,
            combo_cap: 5,
            auto_ai_turn: true,
        }
    }
}

impl EngineConfig {
    /// Extract the `duel` section, falling back to defaults when it is missing or malformed.
    pub fn from_figment(figment: &Figment) -> Self {
        match figment.extract_inner::<EngineConfig>("duel") {
            Ok(config) => config,
            Err(e) => {
                if !e.missing() {
                    log::warn!("ignoring malformed duel config: {e}");
                }
                EngineConfig::default()
            }
        }
    }

    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        if self.player_max_health == 0 {
            errors.push("player_max_health must be positive".to_string());
        }
        if self.player_max_energy == 0 {
            errors.push("player_max_energy must be positive".to_string());
        }
        if self.fixed_step_secs <= 0.0 {
            errors.push("fixed_step_secs must be positive".to_string());
        }
        if self.tier_speeds.iter().any(|s| *s <= 0.0) {
            errors.push("tier_speeds must all be positive".to_string());
        }
        if self.tier_speeds.windows(2).any(|w| w[0] > w[1]) {
            errors.push("tier_speeds must not decrease with difficulty".to_string());
        }
        let m = &self.grade_multipliers;
        if !(m.perfect >= m.great && m.great >= m.good && m.good >= 0.0) {
            errors.push("grade_multipliers must satisfy perfect >= great >= good >= 0".to_string());
        }
        if self.combo_step < 0.0 {
            errors.push("combo_step must not be negative".to_string());
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rocket::figment::providers::Serialized;
    use std::collections::BTreeMap;

    #[test]
    fn defaults_are_valid() {
        assert_eq!(EngineConfig::default().validate(), Ok(()));
    }

    #[test]
    fn reads_partial_duel_section() {
        let figment = Figment::new().merge(Serialized::default(
            "duel",
            BTreeMap::from([("seed", 99u64)]),
        ));
        let config = EngineConfig::from_figment(&figment);
        assert_eq!(config.seed, 99);
        assert_eq!(config.log_capacity, EngineConfig::default().log_capacity);
    }

    #[test]
    fn missing_section_falls_back_to_defaults() {
        let config = EngineConfig::from_figment(&Figment::new());
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn rejects_non_monotonic_multipliers() {
        let mut config = EngineConfig::default();
        config.grade_multipliers.good = 2.0;
        assert!(config.validate().is_err());
    }

    #[test]
    fn rejects_zero_maxima() {
        let config = EngineConfig {
            player_max_health: 0,
            player_max_energy: 0,
            ..EngineConfig::default()
        };
        let errors = config.validate().expect_err("both maxima are zero");
        assert!(errors.contains(&"player_max_health must be positive".to_string()));
        assert!(errors.contains(&"player_max_energy must be positive".to_string()));
    }
}
