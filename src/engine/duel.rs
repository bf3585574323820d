//! Battle state machine. The only component the host talks to.
//!
//! Every intent is checked against the phase and turn owner before anything is
//! touched; rejected intents hand back the unchanged snapshot. Accepted intents
//! are appended to the action log so a battle can be replayed exactly.

use std::sync::Arc;

use rand_pcg::Lcg64Xsh32;

use crate::catalog::types::Move;
use crate::catalog::{default_catalog, default_roster, MoveCatalog, OpponentRoster};
use crate::config::EngineConfig;

use super::action_log::{ActionEntry, ActionLog, ActionPayload};
use super::ai::{self, BattleView, RandomTimingOracle, TimingOracle};
use super::damage::DamageTable;
use super::event_log::BattleEvent;
use super::session::BattleSession;
use super::timing::{OscillationTimer, StageOutcome, TimingChallenge, TRACK_MAX, TRACK_MIN};
use super::types::{
    BattleResult, BattleSnapshot, EngineError, Grade, IntentResult, Phase, Rejected, Rejection,
    Side,
};

#[derive(Debug)]
pub struct DuelEngine {
    catalog: Arc<MoveCatalog>,
    roster: Arc<OpponentRoster>,
    config: EngineConfig,
    damage: DamageTable,
    rng: Lcg64Xsh32,
    oracle: Box<dyn TimingOracle>,
    timer: OscillationTimer,
    session: Option<BattleSession>,
    action_log: ActionLog,
}

impl DuelEngine {
    /// Validate config, catalog and roster, then start in the menu.
    pub fn new(
        catalog: MoveCatalog,
        roster: OpponentRoster,
        config: EngineConfig,
    ) -> Result<Self, EngineError> {
        config.validate().map_err(EngineError::InvalidConfig)?;
        catalog.validate().map_err(EngineError::InvalidCatalog)?;
        roster
            .validate(&catalog)
            .map_err(EngineError::InvalidRoster)?;
        Ok(DuelEngine {
            catalog: Arc::new(catalog),
            roster: Arc::new(roster),
            damage: DamageTable::from_config(&config),
            rng: ai::seed_rng(config.seed),
            oracle: Box::new(RandomTimingOracle),
            timer: OscillationTimer::new(config.fixed_step_secs),
            session: None,
            action_log: ActionLog::new(),
            config,
        })
    }

    /// Engine over the built-in moves and opponents.
    pub fn with_defaults(config: EngineConfig) -> Result<Self, EngineError> {
        Self::new(default_catalog(), default_roster(), config)
    }

    /// Swap the source of opponent timing grades.
    pub fn with_oracle(mut self, oracle: Box<dyn TimingOracle>) -> Self {
        self.oracle = oracle;
        self
    }

    pub fn catalog(&self) -> &MoveCatalog {
        &self.catalog
    }

    pub fn roster(&self) -> &OpponentRoster {
        &self.roster
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn action_log(&self) -> &ActionLog {
        &self.action_log
    }

    pub fn timer(&self) -> &OscillationTimer {
        &self.timer
    }

    pub fn phase(&self) -> Phase {
        self.session.as_ref().map_or(Phase::Menu, |s| s.phase)
    }

    pub fn snapshot(&self) -> BattleSnapshot {
        match &self.session {
            Some(session) => session.snapshot(),
            None => BattleSnapshot::menu(),
        }
    }

    /// Final result; only present in victory or defeat.
    pub fn result(&self) -> Option<BattleResult> {
        self.session.as_ref().and_then(|s| s.result.clone())
    }

    fn reject(&self, reason: Rejection) -> IntentResult {
        log::debug!("intent rejected: {reason}");
        Err(Rejected {
            reason,
            snapshot: self.snapshot(),
        })
    }

    fn record_action(&self, payload: ActionPayload) -> ActionEntry {
        self.action_log.append(payload)
    }

    /// Start a battle against `opponent_id`. Any session already in place is
    /// discarded first, as with `return_to_menu`.
    pub fn start_battle(&mut self, opponent_id: &str) -> Result<BattleSnapshot, EngineError> {
        if self.roster.get(opponent_id).is_none() {
            return Err(EngineError::UnknownOpponent(opponent_id.to_string()));
        }
        self.record_action(ActionPayload::StartBattle {
            opponent_id: opponent_id.to_string(),
        });
        self.begin_session(opponent_id)?;
        Ok(self.snapshot())
    }

    fn begin_session(&mut self, opponent_id: &str) -> Result<(), EngineError> {
        let profile = self
            .roster
            .get(opponent_id)
            .cloned()
            .ok_or_else(|| EngineError::UnknownOpponent(opponent_id.to_string()))?;
        self.timer.stop();
        log::info!("battle started against {}", profile.id);
        self.session = Some(BattleSession::new(
            profile,
            self.config.player_max_health,
            self.config.player_max_energy,
            self.config.log_capacity,
        ));
        Ok(())
    }

    /// Player picks a move. Timed moves open a challenge; untimed moves
    /// resolve at once as PERFECT.
    pub fn select_player_move(&mut self, move_id: &str) -> IntentResult {
        let session = match &self.session {
            Some(session) => session,
            None => {
                return self.reject(Rejection::WrongPhase {
                    actual: Phase::Menu,
                })
            }
        };
        if session.phase != Phase::Battle {
            return self.reject(Rejection::WrongPhase {
                actual: session.phase,
            });
        }
        if session.turn != Side::Player {
            return self.reject(Rejection::NotYourTurn { turn: session.turn });
        }
        let mv = match self.catalog.get(move_id) {
            Some(mv) => mv.clone(),
            None => {
                return self.reject(Rejection::UnknownMove {
                    move_id: move_id.to_string(),
                })
            }
        };
        if !session.player.can_afford(&mv) {
            return self.reject(Rejection::InsufficientEnergy {
                move_id: mv.id.clone(),
                needed: mv.energy_cost,
                available: session.player.energy(),
            });
        }
        if session.player.is_on_cooldown(&mv.id) {
            return self.reject(Rejection::OnCooldown {
                move_id: mv.id.clone(),
                turns: session.player.cooldown_of(&mv.id),
            });
        }

        self.record_action(ActionPayload::SelectMove {
            move_id: mv.id.clone(),
        });
        let speed = self.config.tier_speeds[mv.difficulty.index()];
        match TimingChallenge::for_move(&mv, speed) {
            Some(challenge) => {
                self.timer.start();
                if let Some(session) = self.session.as_mut() {
                    session.challenge = Some(challenge);
                    session.phase = Phase::TimingChallenge;
                }
                log::debug!("timing challenge for {} at speed {speed}", mv.id);
            }
            None => self.resolve_player_move(&mv, Grade::Perfect),
        }
        Ok(self.snapshot())
    }

    /// Grade the current stage at the live marker position.
    pub fn submit_timing_input(&mut self) -> IntentResult {
        let position = match self.session.as_ref().and_then(|s| s.challenge.as_ref()) {
            Some(challenge) => challenge.position(),
            None => return self.reject(Rejection::WrongPhase { actual: self.phase() }),
        };
        self.submit_timing_input_at(position)
    }

    /// Grade the current stage as if the marker stood at `position`.
    /// Only replay calls this directly, since ticks are not recorded.
    pub(crate) fn submit_timing_input_at(&mut self, position: f32) -> IntentResult {
        let phase = self.phase();
        if phase != Phase::TimingChallenge {
            return self.reject(Rejection::WrongPhase { actual: phase });
        }
        let move_id = match self.session.as_ref().and_then(|s| s.challenge.as_ref()) {
            Some(challenge) => challenge.move_id().to_string(),
            None => return self.reject(Rejection::WrongPhase { actual: phase }),
        };
        let mv = match self.catalog.get(&move_id) {
            Some(mv) => mv.clone(),
            None => return self.reject(Rejection::UnknownMove { move_id }),
        };
        let position = if position.is_finite() {
            position.clamp(TRACK_MIN, TRACK_MAX)
        } else {
            TRACK_MIN
        };

        self.record_action(ActionPayload::SubmitTiming { position });
        let Some(session) = self.session.as_mut() else {
            return Ok(self.snapshot());
        };
        let Some(challenge) = session.challenge.as_mut() else {
            return Ok(self.snapshot());
        };
        let multi_stage = challenge.stage_count() > 1;
        match challenge.submit_at(position) {
            StageOutcome::Advanced { stage, grade } => {
                session.record(BattleEvent::StageGraded {
                    move_id,
                    stage,
                    grade,
                });
            }
            StageOutcome::Completed {
                stage,
                stage_grade,
                grade,
            } => {
                if multi_stage {
                    session.record(BattleEvent::StageGraded {
                        move_id,
                        stage,
                        grade: stage_grade,
                    });
                }
                session.challenge = None;
                session.phase = Phase::Battle;
                self.timer.stop();
                self.resolve_player_move(&mv, grade);
            }
        }
        Ok(self.snapshot())
    }

    /// Advance the oscillation by `dt` seconds. Ignored unless a challenge is live.
    pub fn tick(&mut self, dt: f32) -> BattleSnapshot {
        let steps = self.timer.advance(dt);
        if steps > 0 {
            let challenge = self
                .session
                .as_mut()
                .filter(|s| s.phase == Phase::TimingChallenge)
                .and_then(|s| s.challenge.as_mut());
            match challenge {
                Some(challenge) => challenge.step(steps),
                None => {
                    log::warn!("stopping orphaned oscillation timer");
                    self.timer.stop();
                }
            }
        }
        self.snapshot()
    }

    /// Run the opponent's turn when it is waiting on the host.
    pub fn advance_ai_turn(&mut self) -> IntentResult {
        let (phase, turn) = match &self.session {
            Some(session) => (session.phase, session.turn),
            None => {
                return self.reject(Rejection::WrongPhase {
                    actual: Phase::Menu,
                })
            }
        };
        if phase != Phase::Battle {
            return self.reject(Rejection::WrongPhase { actual: phase });
        }
        if turn != Side::Opponent {
            return self.reject(Rejection::NotYourTurn { turn });
        }
        self.record_action(ActionPayload::AdvanceAi);
        self.run_ai_turn();
        Ok(self.snapshot())
    }

    /// Player gives up the turn: no move is resolved, but energy still
    /// regenerates and cooldowns still tick.
    pub fn pass_turn(&mut self) -> IntentResult {
        let (phase, turn) = match &self.session {
            Some(session) => (session.phase, session.turn),
            None => {
                return self.reject(Rejection::WrongPhase {
                    actual: Phase::Menu,
                })
            }
        };
        if phase != Phase::Battle {
            return self.reject(Rejection::WrongPhase { actual: phase });
        }
        if turn != Side::Player {
            return self.reject(Rejection::NotYourTurn { turn });
        }
        self.record_action(ActionPayload::PassTurn);
        if let Some(session) = self.session.as_mut() {
            session.record(BattleEvent::TurnPassed {
                actor: Side::Player,
            });
        }
        self.end_turn(Side::Player);
        self.after_player_turn();
        Ok(self.snapshot())
    }

    /// Fresh battle against the same opponent after victory or defeat.
    pub fn rematch(&mut self) -> IntentResult {
        let (phase, opponent_id) = match &self.session {
            Some(session) => (session.phase, session.opponent.id.clone()),
            None => {
                return self.reject(Rejection::WrongPhase {
                    actual: Phase::Menu,
                })
            }
        };
        if !phase.is_terminal() {
            return self.reject(Rejection::WrongPhase { actual: phase });
        }
        self.record_action(ActionPayload::Rematch);
        if let Err(e) = self.begin_session(&opponent_id) {
            log::warn!("rematch failed: {e}");
        }
        Ok(self.snapshot())
    }

    /// Discard the session from any phase. Forfeits produce no result.
    pub fn return_to_menu(&mut self) -> BattleSnapshot {
        self.timer.stop();
        if let Some(session) = self.session.take() {
            if !session.phase.is_terminal() {
                log::info!("battle against {} forfeited", session.opponent.id);
            }
        }
        self.record_action(ActionPayload::ReturnToMenu);
        self.snapshot()
    }

    /// Reseed the AI's random source. Not allowed mid-battle.
    pub fn set_seed(&mut self, seed: u64) -> IntentResult {
        let phase = self.phase();
        if !(phase == Phase::Menu || phase.is_terminal()) {
            return self.reject(Rejection::WrongPhase { actual: phase });
        }
        self.record_action(ActionPayload::SetSeed { seed });
        self.rng = ai::seed_rng(seed);
        Ok(self.snapshot())
    }

    fn resolve_player_move(&mut self, mv: &Move, grade: Grade) {
        self.resolve_move(Side::Player, mv, grade);
        self.after_player_turn();
    }

    fn after_player_turn(&mut self) {
        let waiting_on_ai = self
            .session
            .as_ref()
            .is_some_and(|s| s.phase == Phase::Battle && s.turn == Side::Opponent);
        if waiting_on_ai && self.config.auto_ai_turn {
            self.run_ai_turn();
        }
    }

    fn run_ai_turn(&mut self) {
        let catalog = Arc::clone(&self.catalog);
        let Some(session) = self.session.as_ref() else {
            return;
        };
        let view = BattleView {
            own: &session.foe,
            foe: &session.player,
        };
        let choice = ai::select_move(&session.opponent, &catalog, view, &mut self.rng).cloned();
        match choice {
            Some(mv) => {
                let grade = if mv.timing.is_enabled() {
                    self.oracle
                        .simulate_timing(&session.opponent, &mv, &mut self.rng)
                } else {
                    Grade::Perfect
                };
                self.resolve_move(Side::Opponent, &mv, grade);
            }
            None => {
                if let Some(session) = self.session.as_mut() {
                    session.record(BattleEvent::TurnPassed {
                        actor: Side::Opponent,
                    });
                }
                self.end_turn(Side::Opponent);
            }
        }
    }

    /// Shared resolution path for both sides.
    fn resolve_move(&mut self, actor: Side, mv: &Move, grade: Grade) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let resolution = self.damage.resolve(mv, grade, session.combo(actor));
        let (caster, target) = session.ledgers_mut(actor);
        target.apply_damage(resolution.damage);
        let healed = caster.heal(resolution.heal);

        if mv.is_offensive() {
            session.set_combo(actor, resolution.combo);
            if actor == Side::Player && grade == Grade::Perfect {
                session.perfect_hits += 1;
            }
        }
        session.record(BattleEvent::MoveResolved {
            actor,
            move_id: mv.id.clone(),
            grade,
            damage: resolution.damage,
            healed,
            combo: session.combo(actor),
        });
        log::debug!(
            "{} resolved {} as {}: {} damage, {} healed",
            actor.as_str(),
            mv.id,
            grade.as_str(),
            resolution.damage,
            healed
        );

        let (caster, _) = session.ledgers_mut(actor);
        caster.consume_energy(mv);
        caster.set_cooldown(&mv.id, mv.cooldown);
        self.end_turn(actor);
    }

    /// Regenerate and tick the acting side, then either end the battle or hand over.
    fn end_turn(&mut self, actor: Side) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        let regen = match actor {
            Side::Player => self.config.energy_regen,
            Side::Opponent => session
                .opponent
                .energy_regen
                .unwrap_or(self.config.energy_regen),
        };
        let (caster, _) = session.ledgers_mut(actor);
        let max = caster.max_energy();
        caster.regenerate(regen, max);
        caster.tick_cooldowns();

        if let Some(winner) = session.winner() {
            self.timer.stop();
            let result = session.finish(winner);
            log::info!(
                "battle against {} over after {} turns, player won: {}",
                result.opponent_id,
                result.turns,
                result.won
            );
            return;
        }
        session.turn = actor.other();
        session.turn_number += 1;
    }

    /// Rebuild an engine by re-applying `entries` in order. Individual
    /// rejections are skipped; they cannot occur for a log this engine wrote.
    pub fn replay_from_log(
        catalog: MoveCatalog,
        roster: OpponentRoster,
        config: EngineConfig,
        entries: &[ActionEntry],
    ) -> Result<Self, EngineError> {
        let engine = DuelEngine::new(catalog, roster, config)?;
        engine.replay(entries)
    }

    /// Like `replay_from_log` on an engine that already carries a custom oracle.
    pub fn replay(mut self, entries: &[ActionEntry]) -> Result<Self, EngineError> {
        for entry in entries {
            let outcome = match &entry.payload {
                ActionPayload::SetSeed { seed } => self.set_seed(*seed).map(|_| ()),
                ActionPayload::StartBattle { opponent_id } => {
                    self.start_battle(opponent_id)?;
                    Ok(())
                }
                ActionPayload::SelectMove { move_id } => {
                    self.select_player_move(move_id).map(|_| ())
                }
                ActionPayload::SubmitTiming { position } => {
                    self.submit_timing_input_at(*position).map(|_| ())
                }
                ActionPayload::PassTurn => self.pass_turn().map(|_| ()),
                ActionPayload::AdvanceAi => self.advance_ai_turn().map(|_| ()),
                ActionPayload::Rematch => self.rematch().map(|_| ()),
                ActionPayload::ReturnToMenu => {
                    self.return_to_menu();
                    Ok(())
                }
            };
            if let Err(rejected) = outcome {
                log::warn!(
                    "replay skipped {} #{}: {}",
                    entry.action_type,
                    entry.seq,
                    rejected.reason
                );
            }
        }
        Ok(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::ai::ScriptedTimingOracle;

    fn engine() -> DuelEngine {
        DuelEngine::with_defaults(EngineConfig::default())
            .expect("default content is valid")
            .with_oracle(Box::new(ScriptedTimingOracle::always(Grade::Good)))
    }

    #[test]
    fn starts_in_menu() {
        let engine = engine();
        assert_eq!(engine.phase(), Phase::Menu);
        assert_eq!(engine.snapshot(), BattleSnapshot::menu());
        assert!(engine.result().is_none());
    }

    #[test]
    fn unknown_opponent_is_an_error() {
        let mut engine = engine();
        assert_eq!(
            engine.start_battle("nobody"),
            Err(EngineError::UnknownOpponent("nobody".to_string()))
        );
        assert_eq!(engine.phase(), Phase::Menu);
        assert!(engine.action_log().is_empty());
    }

    #[test]
    fn untimed_move_resolves_and_ai_answers() {
        let mut engine = engine();
        engine.start_battle("bubble_bot").expect("known opponent");
        let snap = engine.select_player_move("linear_scan").expect("accepted");
        assert_eq!(snap.phase, Phase::Battle);
        assert_eq!(snap.turn, Some(Side::Player));
        let opponent = snap.opponent.expect("opponent view");
        assert_eq!(opponent.health, 80 - 12); // 8 * 1.5
        assert_eq!(snap.combo, 1);
        assert_eq!(snap.perfect_hits, 1);
        assert_eq!(snap.turn_number, 3);
    }

    #[test]
    fn timed_move_opens_challenge_and_starts_timer() {
        let mut engine = engine();
        engine.start_battle("bubble_bot").expect("known opponent");
        let snap = engine.select_player_move("binary_search").expect("accepted");
        assert_eq!(snap.phase, Phase::TimingChallenge);
        assert!(engine.timer().is_running());
        let challenge = snap.challenge.expect("live challenge");
        assert_eq!(challenge.move_id, "binary_search");
        assert_eq!(challenge.stage_count, 1);

        // 20 steps at Easy speed puts the marker at 20, outside every zone
        engine.tick(20.0 * engine.config().fixed_step_secs + 0.001);
        let snap = engine.submit_timing_input().expect("accepted");
        assert_eq!(snap.phase, Phase::Battle);
        assert!(!engine.timer().is_running());
        let opponent = snap.opponent.expect("opponent view");
        assert_eq!(opponent.health, 80);
        assert_eq!(snap.combo, 0);
    }

    #[test]
    fn out_of_phase_intents_leave_state_untouched() {
        let mut engine = engine();
        let rejected = engine.submit_timing_input().expect_err("nothing to submit");
        assert_eq!(
            rejected.reason,
            Rejection::WrongPhase {
                actual: Phase::Menu
            }
        );

        engine.start_battle("bubble_bot").expect("known opponent");
        let before = engine.snapshot();
        let rejected = engine.advance_ai_turn().expect_err("player's turn");
        assert_eq!(
            rejected.reason,
            Rejection::NotYourTurn { turn: Side::Player }
        );
        assert_eq!(rejected.snapshot, before);
        assert!(engine.rematch().is_err());
        assert!(engine.set_seed(3).is_err());
        assert_eq!(engine.snapshot(), before);
    }

    #[test]
    fn cooldown_blocks_reuse() {
        let mut engine = engine();
        engine.start_battle("bubble_bot").expect("known opponent");
        engine.select_player_move("garbage_collect").expect("accepted");
        engine.submit_timing_input_at(50.0).expect("accepted");
        let rejected = engine
            .select_player_move("garbage_collect")
            .expect_err("still cooling down");
        assert_eq!(
            rejected.reason,
            Rejection::OnCooldown {
                move_id: "garbage_collect".to_string(),
                turns: 2
            }
        );
    }

    #[test]
    fn deferred_ai_waits_for_the_host() {
        let config = EngineConfig {
            auto_ai_turn: false,
            ..EngineConfig::default()
        };
        let mut engine = DuelEngine::with_defaults(config)
            .expect("valid")
            .with_oracle(Box::new(ScriptedTimingOracle::always(Grade::Perfect)));
        engine.start_battle("bubble_bot").expect("known opponent");
        let snap = engine.select_player_move("linear_scan").expect("accepted");
        assert_eq!(snap.turn, Some(Side::Opponent));
        assert!(engine.select_player_move("linear_scan").is_err());

        let snap = engine.advance_ai_turn().expect("opponent's turn");
        assert_eq!(snap.turn, Some(Side::Player));
        assert_eq!(snap.turn_number, 3);
        let last = snap.log.last().expect("opponent move logged");
        assert!(matches!(
            last.event,
            BattleEvent::MoveResolved {
                actor: Side::Opponent,
                ..
            }
        ));
    }

    #[test]
    fn forfeit_stops_timer_and_reports_nothing() {
        let mut engine = engine();
        engine.start_battle("heap_hydra").expect("known opponent");
        engine.select_player_move("merge_sort").expect("accepted");
        assert!(engine.timer().is_running());
        let snap = engine.return_to_menu();
        assert_eq!(snap.phase, Phase::Menu);
        assert!(snap.result.is_none());
        assert!(!engine.timer().is_running());
        assert!(engine.result().is_none());
    }
}
