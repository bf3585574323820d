use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;
use std::collections::BTreeMap;
use thiserror::Error;

use super::event_log::LogEntry;

/// Timing quality grade, declared best to worst so the derived ordering
/// makes `Perfect < Great < Good < Miss`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum Grade {
    Perfect,
    Great,
    Good,
    Miss,
}

impl Grade {
    pub fn all() -> [Grade; 4] {
        [Grade::Perfect, Grade::Great, Grade::Good, Grade::Miss]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Grade::Perfect => "PERFECT",
            Grade::Great => "GREAT",
            Grade::Good => "GOOD",
            Grade::Miss => "MISS",
        }
    }
}

/// One of the two combatants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum Side {
    Player,
    Opponent,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Player => Side::Opponent,
            Side::Opponent => Side::Player,
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Side::Player => "player",
            Side::Opponent => "opponent",
        }
    }
}

/// Single authoritative phase tag. `Menu` means no session exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum Phase {
    Menu,
    Battle,
    TimingChallenge,
    Victory,
    Defeat,
}

impl Phase {
    pub fn is_terminal(self) -> bool {
        matches!(self, Phase::Victory | Phase::Defeat)
    }
}

/// Setup failures that must be surfaced explicitly.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum EngineError {
    #[error("unknown opponent: {0}")]
    UnknownOpponent(String),
    #[error("invalid catalog: {}", .0.join("; "))]
    InvalidCatalog(Vec<String>),
    #[error("invalid roster: {}", .0.join("; "))]
    InvalidRoster(Vec<String>),
    #[error("invalid engine config: {}", .0.join("; "))]
    InvalidConfig(Vec<String>),
}

/// Why an intent was ignored. The session is left untouched in every case.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema, Error)]
#[serde(crate = "rocket::serde", tag = "reason", rename_all = "snake_case")]
pub enum Rejection {
    #[error("intent not allowed in phase {actual:?}")]
    WrongPhase { actual: Phase },
    #[error("it is the {turn:?} turn")]
    NotYourTurn { turn: Side },
    #[error("unknown move: {move_id}")]
    UnknownMove { move_id: String },
    #[error("move {move_id} needs {needed} energy, {available} available")]
    InsufficientEnergy {
        move_id: String,
        needed: u32,
        available: u32,
    },
    #[error("move {move_id} is on cooldown for {turns} more turn(s)")]
    OnCooldown { move_id: String, turns: u32 },
}

/// A rejected intent together with the unchanged snapshot.
#[derive(Debug, Clone, PartialEq)]
pub struct Rejected {
    pub reason: Rejection,
    pub snapshot: BattleSnapshot,
}

pub type IntentResult = Result<BattleSnapshot, Rejected>;

/// Resource view of one combatant.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct CombatantSnapshot {
    pub health: u32,
    pub max_health: u32,
    pub energy: u32,
    pub max_energy: u32,
    pub cooldowns: BTreeMap<String, u32>,
    pub combo: u32,
}

/// Live view of the active timing challenge.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ChallengeSnapshot {
    pub move_id: String,
    pub position: f32,
    pub direction: i8,
    pub stage: usize,
    pub stage_count: usize,
    pub stage_grades: Vec<Grade>,
}

/// Final outcome handed to the reporting collaborator.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct BattleResult {
    pub won: bool,
    pub perfect_hits: u32,
    pub max_combo: u32,
    pub opponent_id: String,
    pub turns: u32,
    pub duration_ms: u64,
}

/// Immutable view of the engine handed to the presentation layer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct BattleSnapshot {
    pub phase: Phase,
    pub opponent_id: Option<String>,
    pub turn: Option<Side>,
    pub turn_number: u32,
    pub player: Option<CombatantSnapshot>,
    pub opponent: Option<CombatantSnapshot>,
    pub challenge: Option<ChallengeSnapshot>,
    pub combo: u32,
    pub perfect_hits: u32,
    pub max_combo: u32,
    pub log: Vec<LogEntry>,
    pub result: Option<BattleResult>,
}

impl BattleSnapshot {
    pub fn menu() -> Self {
        BattleSnapshot {
            phase: Phase::Menu,
            opponent_id: None,
            turn: None,
            turn_number: 0,
            player: None,
            opponent: None,
            challenge: None,
            combo: 0,
            perfect_hits: 0,
            max_combo: 0,
            log: Vec::new(),
            result: None,
        }
    }
}
