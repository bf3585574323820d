//! Read-only collaborator data: the move catalog and the opponent roster.
//!
//! Both are loaded once before a battle starts and never mutated by the engine.

mod defaults;
mod endpoints;
pub mod types;

pub use defaults::{default_catalog, default_roster};
pub use endpoints::{
    list_moves, list_opponents, okapi_add_operation_for_list_moves_,
    okapi_add_operation_for_list_opponents_,
};

use types::{Move, OpponentProfile, TimingSpec};

/// Canonical collection of move definitions, looked up by id.
#[derive(Debug, Clone, Default)]
pub struct MoveCatalog {
    pub moves: Vec<Move>,
}

impl MoveCatalog {
    pub fn new(moves: Vec<Move>) -> Self {
        MoveCatalog { moves }
    }

    pub fn get(&self, move_id: &str) -> Option<&Move> {
        self.moves.iter().find(|m| m.id == move_id)
    }

    pub fn contains(&self, move_id: &str) -> bool {
        self.get(move_id).is_some()
    }

    /// Check every move's timing specification.
    pub fn validate(&self) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        for (idx, mv) in self.moves.iter().enumerate() {
            if self.moves[..idx].iter().any(|other| other.id == mv.id) {
                errors.push(format!("Move id {} is defined more than once", mv.id));
            }
            if let TimingSpec::Multi { stages } = &mv.timing {
                if stages.is_empty() {
                    errors.push(format!("Move {} has a multi-stage timing with no stages", mv.id));
                }
            }
            for (stage, zones) in mv.timing.stages().iter().enumerate() {
                if let Err(e) = zones.validate() {
                    errors.push(format!("Move {} stage {}: {}", mv.id, stage, e));
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}

/// All AI opponents a battle can be started against.
#[derive(Debug, Clone, Default)]
pub struct OpponentRoster {
    pub opponents: Vec<OpponentProfile>,
}

impl OpponentRoster {
    pub fn new(opponents: Vec<OpponentProfile>) -> Self {
        OpponentRoster { opponents }
    }

    pub fn get(&self, opponent_id: &str) -> Option<&OpponentProfile> {
        self.opponents.iter().find(|o| o.id == opponent_id)
    }

    /// Check profile values and that every referenced move exists in `catalog`.
    pub fn validate(&self, catalog: &MoveCatalog) -> Result<(), Vec<String>> {
        let mut errors = Vec::new();
        for profile in &self.opponents {
            if profile.max_health == 0 {
                errors.push(format!("Opponent {} has zero max health", profile.id));
            }
            if profile.max_energy == 0 {
                errors.push(format!("Opponent {} has zero max energy", profile.id));
            }
            if !(0.0..=1.0).contains(&profile.default_accuracy) {
                errors.push(format!(
                    "Opponent {} default accuracy {} is outside 0..1",
                    profile.id, profile.default_accuracy
                ));
            }
            for (move_id, accuracy) in &profile.timing_accuracy {
                if !(0.0..=1.0).contains(accuracy) {
                    errors.push(format!(
                        "Opponent {} accuracy {} for move {} is outside 0..1",
                        profile.id, accuracy, move_id
                    ));
                }
            }
            for move_id in &profile.move_ids {
                if !catalog.contains(move_id) {
                    errors.push(format!(
                        "Opponent {} references unknown move {}",
                        profile.id, move_id
                    ));
                }
            }
        }
        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }
}
