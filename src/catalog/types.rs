use rocket::serde::{Deserialize, Serialize};
use rocket_okapi::JsonSchema;
use std::collections::HashMap;

pub type MoveId = String;

/// Display category of a move. Offensive moves damage the opponent,
/// defensive moves restore the caster's health.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum MoveCategory {
    Offensive,
    Defensive,
}

/// Timing-difficulty tier. Each tier maps to a fixed oscillation speed.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, JsonSchema,
)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum Difficulty {
    Easy,
    Medium,
    Hard,
    Expert,
}

impl Difficulty {
    /// Position of the tier in the speed table.
    pub fn index(self) -> usize {
        match self {
            Difficulty::Easy => 0,
            Difficulty::Medium => 1,
            Difficulty::Hard => 2,
            Difficulty::Expert => 3,
        }
    }
}

/// Closed interval on the 0..=100 marker track.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct ZoneRange {
    pub start: f32,
    pub end: f32,
}

impl ZoneRange {
    pub const fn new(start: f32, end: f32) -> Self {
        ZoneRange { start, end }
    }

    pub fn contains(&self, position: f32) -> bool {
        position >= self.start && position <= self.end
    }

    pub fn is_within(&self, outer: &ZoneRange) -> bool {
        self.start >= outer.start && self.end <= outer.end
    }

    pub fn is_on_track(&self) -> bool {
        self.start >= 0.0 && self.end <= 100.0 && self.start <= self.end
    }
}

/// Nested quality zones for one oscillation pass, narrowest first.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct TimingZones {
    pub perfect: ZoneRange,
    pub great: ZoneRange,
    pub good: ZoneRange,
}

impl TimingZones {
    /// Zones centred on `center` with the given half-widths.
    pub fn centered(center: f32, perfect: f32, great: f32, good: f32) -> Self {
        TimingZones {
            perfect: ZoneRange::new(center - perfect, center + perfect),
            great: ZoneRange::new(center - great, center + great),
            good: ZoneRange::new(center - good, center + good),
        }
    }

    pub fn validate(&self) -> Result<(), String> {
        for (label, zone) in [
            ("perfect", &self.perfect),
            ("great", &self.great),
            ("good", &self.good),
        ] {
            if !zone.is_on_track() {
                return Err(format!(
                    "{label} zone {:.1}..{:.1} is not inside 0..100",
                    zone.start, zone.end
                ));
            }
        }
        if !self.perfect.is_within(&self.great) {
            return Err("perfect zone is not nested in great zone".to_string());
        }
        if !self.great.is_within(&self.good) {
            return Err("great zone is not nested in good zone".to_string());
        }
        Ok(())
    }
}

/// How a move is graded.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", tag = "mode", rename_all = "snake_case")]
pub enum TimingSpec {
    /// No reaction check; always graded PERFECT.
    Disabled,
    Single { zones: TimingZones },
    Multi { stages: Vec<TimingZones> },
}

impl TimingSpec {
    pub fn is_enabled(&self) -> bool {
        !matches!(self, TimingSpec::Disabled)
    }

    pub fn stages(&self) -> &[TimingZones] {
        match self {
            TimingSpec::Disabled => &[],
            TimingSpec::Single { zones } => std::slice::from_ref(zones),
            TimingSpec::Multi { stages } => stages,
        }
    }
}

/// Immutable move definition supplied by the catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct Move {
    pub id: MoveId,
    pub name: String,
    pub category: MoveCategory,
    pub energy_cost: u32,
    /// Cooldown length in owner turns.
    pub cooldown: u32,
    pub power: u32,
    /// Presentation only.
    #[serde(default)]
    pub color: String,
    pub difficulty: Difficulty,
    pub timing: TimingSpec,
}

impl Move {
    pub fn is_offensive(&self) -> bool {
        self.category == MoveCategory::Offensive
    }
}

/// Move-selection strategy tag of an AI profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde", rename_all = "snake_case")]
pub enum Strategy {
    /// Always prefers offensive moves.
    Aggressive,
    /// Heals whenever below half health.
    Defensive,
    /// Attacks while ahead on health ratio, recovers while behind.
    Balanced,
    /// Like `Balanced`, but picks the strongest preferred move instead of a random one.
    Tactical,
}

/// Immutable AI opponent profile supplied by the roster.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(crate = "rocket::serde")]
pub struct OpponentProfile {
    pub id: String,
    pub name: String,
    pub max_health: u32,
    pub max_energy: u32,
    /// Overrides the engine-wide regeneration amount.
    #[serde(default)]
    pub energy_regen: Option<u32>,
    pub move_ids: Vec<MoveId>,
    pub strategy: Strategy,
    /// Accuracy used for moves without an entry in `timing_accuracy`.
    pub default_accuracy: f32,
    #[serde(default)]
    pub timing_accuracy: HashMap<MoveId, f32>,
}

impl OpponentProfile {
    pub fn accuracy_for(&self, move_id: &str) -> f32 {
        self.timing_accuracy
            .get(move_id)
            .copied()
            .unwrap_or(self.default_accuracy)
            .clamp(0.0, 1.0)
    }
}
