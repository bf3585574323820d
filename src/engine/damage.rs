//! Damage and combo resolution. Pure: the state machine applies the result.
//!
//! Combo curve: each consecutive PERFECT offensive hit before the current one
//! adds `combo_step` to the multiplier, up to `combo_cap` hits
//! (defaults: +10% per hit, capped at +50%).

use crate::catalog::types::Move;
use crate::config::{EngineConfig, GradeMultipliers};

use super::types::Grade;

/// What a move does once graded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Resolution {
    /// Damage dealt to the other side.
    pub damage: u32,
    /// Health to restore on the caster.
    pub heal: u32,
    /// Caster's combo count after this move.
    pub combo: u32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct DamageTable {
    multipliers: GradeMultipliers,
    combo_step: f32,
    combo_cap: u32,
}

impl DamageTable {
    pub fn new(multipliers: GradeMultipliers, combo_step: f32, combo_cap: u32) -> Self {
        DamageTable {
            multipliers,
            combo_step: combo_step.max(0.0),
            combo_cap,
        }
    }

    pub fn from_config(config: &EngineConfig) -> Self {
        Self::new(config.grade_multipliers, config.combo_step, config.combo_cap)
    }

    pub fn grade_multiplier(&self, grade: Grade) -> f32 {
        match grade {
            Grade::Perfect => self.multipliers.perfect,
            Grade::Great => self.multipliers.great,
            Grade::Good => self.multipliers.good,
            Grade::Miss => 0.0,
        }
    }

    /// Non-decreasing in `combo`, flat past the cap.
    pub fn combo_multiplier(&self, combo: u32) -> f32 {
        1.0 + self.combo_step * combo.min(self.combo_cap) as f32
    }

    /// Resolve `mv` at `grade` for a caster currently on `combo` consecutive PERFECT hits.
    pub fn resolve(&self, mv: &Move, grade: Grade, combo: u32) -> Resolution {
        let base = mv.power as f32 * self.grade_multiplier(grade);
        if mv.is_offensive() {
            let damage = round_amount(base * self.combo_multiplier(combo));
            Resolution {
                damage,
                heal: 0,
                combo: next_combo(grade, combo),
            }
        } else {
            Resolution {
                damage: 0,
                heal: round_amount(base),
                combo,
            }
        }
    }
}

/// Combo after an offensive resolution: extended by PERFECT, reset by anything else.
pub fn next_combo(grade: Grade, combo: u32) -> u32 {
    if grade == Grade::Perfect {
        combo.saturating_add(1)
    } else {
        0
    }
}

fn round_amount(value: f32) -> u32 {
    if value.is_finite() && value > 0.0 {
        value.round() as u32
    } else {
        0
    }
}
