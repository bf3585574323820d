//! Bounded recent-events log shown by the presentation layer.

use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;
use std::collections::VecDeque;

use super::types::{Grade, Side};

/// Something that happened during a battle.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "kind")]
pub enum BattleEvent {
    BattleStarted {
        opponent_id: String,
    },
    StageGraded {
        move_id: String,
        stage: usize,
        grade: Grade,
    },
    MoveResolved {
        actor: Side,
        move_id: String,
        grade: Grade,
        damage: u32,
        healed: u32,
        combo: u32,
    },
    TurnPassed {
        actor: Side,
    },
    BattleEnded {
        winner: Side,
    },
}

impl BattleEvent {
    pub fn describe(&self) -> String {
        match self {
            BattleEvent::BattleStarted { opponent_id } => {
                format!("Battle against {opponent_id} started")
            }
            BattleEvent::StageGraded {
                move_id,
                stage,
                grade,
            } => format!("{move_id} stage {}: {}", stage + 1, grade.as_str()),
            BattleEvent::MoveResolved {
                actor,
                move_id,
                grade,
                damage,
                healed,
                combo,
            } => {
                let mut line = format!("{} used {move_id} ({})", actor.as_str(), grade.as_str());
                if *damage > 0 {
                    line.push_str(&format!(" for {damage} damage"));
                }
                if *healed > 0 {
                    line.push_str(&format!(", restoring {healed} health"));
                }
                if *combo > 1 {
                    line.push_str(&format!(" [combo x{combo}]"));
                }
                line
            }
            BattleEvent::TurnPassed { actor } => format!("{} passed the turn", actor.as_str()),
            BattleEvent::BattleEnded { winner } => format!("{} won the battle", winner.as_str()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct LogEntry {
    pub seq: u64,
    pub turn: u32,
    pub event: BattleEvent,
    pub text: String,
}

/// Fixed-capacity log; pushing past capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct EventLog {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    next_seq: u64,
}

impl EventLog {
    pub fn with_capacity(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        EventLog {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            next_seq: 0,
        }
    }

    pub fn push(&mut self, turn: u32, event: BattleEvent) {
        self.next_seq += 1;
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        let text = event.describe();
        self.entries.push_back(LogEntry {
            seq: self.next_seq,
            turn,
            event,
            text,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    pub fn last(&self) -> Option<&LogEntry> {
        self.entries.back()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn evicts_oldest_entries_past_capacity() {
        let mut log = EventLog::with_capacity(3);
        for turn in 1..=5 {
            log.push(turn, BattleEvent::TurnPassed { actor: Side::Player });
        }
        assert_eq!(log.len(), 3);
        let turns: Vec<u32> = log.entries().iter().map(|e| e.turn).collect();
        assert_eq!(turns, vec![3, 4, 5]);
        assert_eq!(log.last().map(|e| e.seq), Some(5));
    }

    #[test]
    fn describes_combo_hits() {
        let event = BattleEvent::MoveResolved {
            actor: Side::Player,
            move_id: "quick_sort".to_string(),
            grade: Grade::Perfect,
            damage: 45,
            healed: 0,
            combo: 3,
        };
        assert_eq!(
            event.describe(),
            "player used quick_sort (PERFECT) for 45 damage [combo x3]"
        );
    }
}
