//! The single authoritative record of one battle.

use std::time::Instant;

use crate::catalog::types::OpponentProfile;

use super::event_log::{BattleEvent, EventLog};
use super::ledger::ResourceLedger;
use super::timing::TimingChallenge;
use super::types::{BattleResult, BattleSnapshot, CombatantSnapshot, Phase, Side};

#[derive(Debug, Clone)]
pub struct BattleSession {
    pub(crate) opponent: OpponentProfile,
    pub(crate) player: ResourceLedger,
    pub(crate) foe: ResourceLedger,
    pub(crate) phase: Phase,
    pub(crate) turn: Side,
    pub(crate) turn_number: u32,
    pub(crate) player_combo: u32,
    pub(crate) opponent_combo: u32,
    pub(crate) perfect_hits: u32,
    pub(crate) max_combo: u32,
    pub(crate) challenge: Option<TimingChallenge>,
    pub(crate) log: EventLog,
    pub(crate) started: Instant,
    pub(crate) result: Option<BattleResult>,
}

impl BattleSession {
    pub fn new(
        opponent: OpponentProfile,
        player_max_health: u32,
        player_max_energy: u32,
        log_capacity: usize,
    ) -> Self {
        let foe = ResourceLedger::new(opponent.max_health, opponent.max_energy);
        let mut log = EventLog::with_capacity(log_capacity);
        log.push(
            1,
            BattleEvent::BattleStarted {
                opponent_id: opponent.id.clone(),
            },
        );
        BattleSession {
            opponent,
            player: ResourceLedger::new(player_max_health, player_max_energy),
            foe,
            phase: Phase::Battle,
            turn: Side::Player,
            turn_number: 1,
            player_combo: 0,
            opponent_combo: 0,
            perfect_hits: 0,
            max_combo: 0,
            challenge: None,
            log,
            started: Instant::now(),
            result: None,
        }
    }

    pub fn ledger(&self, side: Side) -> &ResourceLedger {
        match side {
            Side::Player => &self.player,
            Side::Opponent => &self.foe,
        }
    }

    /// Caster's ledger first, target's second.
    pub(crate) fn ledgers_mut(&mut self, actor: Side) -> (&mut ResourceLedger, &mut ResourceLedger) {
        match actor {
            Side::Player => (&mut self.player, &mut self.foe),
            Side::Opponent => (&mut self.foe, &mut self.player),
        }
    }

    pub fn combo(&self, side: Side) -> u32 {
        match side {
            Side::Player => self.player_combo,
            Side::Opponent => self.opponent_combo,
        }
    }

    pub(crate) fn set_combo(&mut self, side: Side, combo: u32) {
        match side {
            Side::Player => {
                self.player_combo = combo;
                self.max_combo = self.max_combo.max(combo);
            }
            Side::Opponent => self.opponent_combo = combo,
        }
    }

    pub(crate) fn record(&mut self, event: BattleEvent) {
        self.log.push(self.turn_number, event);
    }

    /// Winner once either side is at zero health. The opponent is checked
    /// first; only one side can be damaged per resolution.
    pub fn winner(&self) -> Option<Side> {
        if self.foe.is_defeated() {
            Some(Side::Player)
        } else if self.player.is_defeated() {
            Some(Side::Opponent)
        } else {
            None
        }
    }

    /// Move to the terminal phase for `winner` and compute the result.
    pub(crate) fn finish(&mut self, winner: Side) -> BattleResult {
        self.challenge = None;
        self.phase = match winner {
            Side::Player => Phase::Victory,
            Side::Opponent => Phase::Defeat,
        };
        self.record(BattleEvent::BattleEnded { winner });
        let result = BattleResult {
            won: winner == Side::Player,
            perfect_hits: self.perfect_hits,
            max_combo: self.max_combo,
            opponent_id: self.opponent.id.clone(),
            turns: self.turn_number,
            duration_ms: self.started.elapsed().as_millis() as u64,
        };
        self.result = Some(result.clone());
        result
    }

    fn combatant(&self, side: Side) -> CombatantSnapshot {
        let ledger = self.ledger(side);
        CombatantSnapshot {
            health: ledger.health(),
            max_health: ledger.max_health(),
            energy: ledger.energy(),
            max_energy: ledger.max_energy(),
            cooldowns: ledger.cooldowns(),
            combo: self.combo(side),
        }
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        BattleSnapshot {
            phase: self.phase,
            opponent_id: Some(self.opponent.id.clone()),
            turn: if self.phase.is_terminal() {
                None
            } else {
                Some(self.turn)
            },
            turn_number: self.turn_number,
            player: Some(self.combatant(Side::Player)),
            opponent: Some(self.combatant(Side::Opponent)),
            challenge: self.challenge.as_ref().map(TimingChallenge::snapshot),
            combo: self.player_combo,
            perfect_hits: self.perfect_hits,
            max_combo: self.max_combo,
            log: self.log.entries(),
            result: self.result.clone(),
        }
    }
}
