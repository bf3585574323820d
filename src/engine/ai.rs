//! Opponent decision policy: which move to play and how well it is "timed".
//!
//! All randomness comes from the engine's seeded `Lcg64Xsh32`, so a battle
//! replays identically from the same seed and intents.

use std::collections::VecDeque;
use std::fmt;

use rand::{Rng, RngCore, SeedableRng};
use rand_pcg::Lcg64Xsh32;

use crate::catalog::types::{Move, MoveCategory, OpponentProfile, Strategy};
use crate::catalog::MoveCatalog;

use super::ledger::ResourceLedger;
use super::types::Grade;

/// Health ratio under which a defensive opponent reaches for a heal.
pub const DEFENSIVE_HEAL_THRESHOLD: f32 = 0.5;

/// Build the engine RNG from a `u64` seed (two little-endian copies).
pub fn seed_rng(seed: u64) -> Lcg64Xsh32 {
    let mut seed_bytes = [0u8; 16];
    seed_bytes[0..8].copy_from_slice(&seed.to_le_bytes());
    seed_bytes[8..16].copy_from_slice(&seed.to_le_bytes());
    Lcg64Xsh32::from_seed(seed_bytes)
}

/// What the opponent can see when choosing: its own ledger and the player's.
#[derive(Debug, Clone, Copy)]
pub struct BattleView<'a> {
    pub own: &'a ResourceLedger,
    pub foe: &'a ResourceLedger,
}

fn preferred_category(strategy: Strategy, view: &BattleView) -> MoveCategory {
    let own = view.own.health_ratio();
    match strategy {
        Strategy::Aggressive => MoveCategory::Offensive,
        Strategy::Defensive => {
            if own < DEFENSIVE_HEAL_THRESHOLD {
                MoveCategory::Defensive
            } else {
                MoveCategory::Offensive
            }
        }
        Strategy::Balanced | Strategy::Tactical => {
            if own >= view.foe.health_ratio() {
                MoveCategory::Offensive
            } else {
                MoveCategory::Defensive
            }
        }
    }
}

/// Pick a usable move for `profile`, or `None` to pass.
///
/// Moves of the category the strategy favours are tried first; when none of
/// them is usable any usable move will do. Tactical opponents always take
/// the strongest candidate, the rest draw uniformly.
pub fn select_move<'c>(
    profile: &OpponentProfile,
    catalog: &'c MoveCatalog,
    view: BattleView,
    rng: &mut Lcg64Xsh32,
) -> Option<&'c Move> {
    let usable: Vec<&Move> = profile
        .move_ids
        .iter()
        .filter_map(|id| catalog.get(id))
        .filter(|mv| view.own.can_use_move(mv))
        .collect();
    if usable.is_empty() {
        return None;
    }

    let wanted = preferred_category(profile.strategy, &view);
    let preferred: Vec<&Move> = usable
        .iter()
        .copied()
        .filter(|mv| mv.category == wanted)
        .collect();
    let candidates = if preferred.is_empty() {
        usable
    } else {
        preferred
    };

    if profile.strategy == Strategy::Tactical {
        // first of the strongest, keeps ties stable
        let best = candidates.iter().map(|mv| mv.power).max()?;
        return candidates.into_iter().find(|mv| mv.power == best);
    }
    let pick = (rng.next_u64() as usize) % candidates.len();
    candidates.get(pick).copied()
}

/// Source of the opponent's synthesized timing grades.
pub trait TimingOracle: fmt::Debug + Send {
    fn simulate_timing(
        &mut self,
        profile: &OpponentProfile,
        mv: &Move,
        rng: &mut Lcg64Xsh32,
    ) -> Grade;
}

/// Two independent accuracy rolls: both hit is PERFECT, only the first GREAT,
/// only the second GOOD, neither MISS. Higher accuracy shifts every grade up.
#[derive(Debug, Clone, Copy, Default)]
pub struct RandomTimingOracle;

impl TimingOracle for RandomTimingOracle {
    fn simulate_timing(
        &mut self,
        profile: &OpponentProfile,
        mv: &Move,
        rng: &mut Lcg64Xsh32,
    ) -> Grade {
        let accuracy = f64::from(profile.accuracy_for(&mv.id));
        let first = rng.gen::<f64>() < accuracy;
        let second = rng.gen::<f64>() < accuracy;
        match (first, second) {
            (true, true) => Grade::Perfect,
            (true, false) => Grade::Great,
            (false, true) => Grade::Good,
            (false, false) => Grade::Miss,
        }
    }
}

/// Plays back a fixed list of grades, then repeats `fallback` forever.
#[derive(Debug, Clone)]
pub struct ScriptedTimingOracle {
    grades: VecDeque<Grade>,
    fallback: Grade,
}

impl ScriptedTimingOracle {
    pub fn new(grades: impl IntoIterator<Item = Grade>, fallback: Grade) -> Self {
        ScriptedTimingOracle {
            grades: grades.into_iter().collect(),
            fallback,
        }
    }

    pub fn always(grade: Grade) -> Self {
        Self::new([], grade)
    }
}

impl TimingOracle for ScriptedTimingOracle {
    fn simulate_timing(
        &mut self,
        _profile: &OpponentProfile,
        _mv: &Move,
        _rng: &mut Lcg64Xsh32,
    ) -> Grade {
        self.grades.pop_front().unwrap_or(self.fallback)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{default_catalog, default_roster};

    fn profile(id: &str) -> OpponentProfile {
        default_roster().get(id).cloned().expect("profile in roster")
    }

    #[test]
    fn same_seed_same_choices() {
        let catalog = default_catalog();
        let bot = profile("bubble_bot");
        let own = ResourceLedger::new(bot.max_health, bot.max_energy);
        let foe = ResourceLedger::new(100, 100);
        let view = BattleView { own: &own, foe: &foe };

        let mut a = seed_rng(7);
        let mut b = seed_rng(7);
        for _ in 0..20 {
            let left = select_move(&bot, &catalog, view, &mut a).map(|m| m.id.clone());
            let right = select_move(&bot, &catalog, view, &mut b).map(|m| m.id.clone());
            assert_eq!(left, right);
        }
    }

    #[test]
    fn aggressive_prefers_offence_even_when_hurt() {
        let catalog = default_catalog();
        let bot = profile("bubble_bot");
        let mut own = ResourceLedger::new(bot.max_health, bot.max_energy);
        own.apply_damage(bot.max_health - 1);
        let foe = ResourceLedger::new(100, 100);
        let mut rng = seed_rng(1);
        for _ in 0..20 {
            let mv = select_move(&bot, &catalog, BattleView { own: &own, foe: &foe }, &mut rng)
                .expect("bubble_bot always has a usable move");
            assert!(mv.is_offensive());
        }
    }

    #[test]
    fn tactical_takes_strongest_usable_move() {
        let catalog = default_catalog();
        let titan = profile("turing_titan");
        let own = ResourceLedger::new(titan.max_health, titan.max_energy);
        let foe = ResourceLedger::new(100, 100);
        let mut rng = seed_rng(3);
        let mv = select_move(&titan, &catalog, BattleView { own: &own, foe: &foe }, &mut rng)
            .expect("usable move");
        assert_eq!(mv.id, "dijkstra");

        let mut own = own.clone();
        own.set_cooldown("dijkstra", 2);
        let mv = select_move(&titan, &catalog, BattleView { own: &own, foe: &foe }, &mut rng)
            .expect("usable move");
        assert_eq!(mv.id, "quick_sort");
    }

    #[test]
    fn falls_back_to_other_category_then_passes() {
        let catalog = default_catalog();
        let mut bot = profile("bubble_bot");
        bot.strategy = Strategy::Defensive;
        bot.move_ids = vec!["binary_search".to_string()];
        let mut own = ResourceLedger::new(bot.max_health, bot.max_energy);
        own.apply_damage(70);
        let foe = ResourceLedger::new(100, 100);
        let mut rng = seed_rng(5);

        let mv = select_move(&bot, &catalog, BattleView { own: &own, foe: &foe }, &mut rng)
            .expect("offensive fallback");
        assert_eq!(mv.id, "binary_search");

        own.set_cooldown("binary_search", 1);
        assert!(select_move(&bot, &catalog, BattleView { own: &own, foe: &foe }, &mut rng).is_none());
    }

    #[test]
    fn accuracy_extremes_pin_the_grade() {
        let catalog = default_catalog();
        let mv = catalog.get("quick_sort").expect("quick_sort");
        let mut bot = profile("bubble_bot");
        let mut rng = seed_rng(11);
        let mut oracle = RandomTimingOracle;

        bot.default_accuracy = 1.0;
        for _ in 0..50 {
            assert_eq!(oracle.simulate_timing(&bot, mv, &mut rng), Grade::Perfect);
        }
        bot.default_accuracy = 0.0;
        for _ in 0..50 {
            assert_eq!(oracle.simulate_timing(&bot, mv, &mut rng), Grade::Miss);
        }
    }

    #[test]
    fn scripted_oracle_plays_back_then_falls_back() {
        let catalog = default_catalog();
        let mv = catalog.get("quick_sort").expect("quick_sort");
        let bot = profile("bubble_bot");
        let mut rng = seed_rng(0);
        let mut oracle = ScriptedTimingOracle::new([Grade::Great, Grade::Miss], Grade::Good);
        let grades: Vec<Grade> = (0..4)
            .map(|_| oracle.simulate_timing(&bot, mv, &mut rng))
            .collect();
        assert_eq!(grades, vec![Grade::Great, Grade::Miss, Grade::Good, Grade::Good]);
    }
}
