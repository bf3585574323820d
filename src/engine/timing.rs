//! Timing challenge: an oscillating marker graded against nested zones.
//!
//! The marker sweeps 0..=100 and back at a speed set by the move's difficulty
//! tier. The host drives it through [`OscillationTimer::advance`], which turns
//! wall-clock deltas into a whole number of fixed steps.

use crate::catalog::types::{Move, TimingZones};

use super::types::{ChallengeSnapshot, Grade};

pub const TRACK_MIN: f32 = 0.0;
pub const TRACK_MAX: f32 = 100.0;

/// Upper bound on steps taken for a single tick so a stalled host cannot spin.
pub const MAX_STEPS_PER_TICK: u32 = 600;

/// Grade a marker position, testing the narrowest zone first.
pub fn grade_position(zones: &TimingZones, position: f32) -> Grade {
    if zones.perfect.contains(position) {
        Grade::Perfect
    } else if zones.great.contains(position) {
        Grade::Great
    } else if zones.good.contains(position) {
        Grade::Good
    } else {
        Grade::Miss
    }
}

/// Conservative aggregate of per-stage grades: any MISS fails the sequence,
/// only a clean sweep of PERFECT earns PERFECT.
pub fn aggregate_grades(grades: &[Grade]) -> Grade {
    if grades.iter().any(|g| *g == Grade::Miss) {
        Grade::Miss
    } else if grades.iter().all(|g| *g == Grade::Perfect) {
        Grade::Perfect
    } else if grades.iter().all(|g| matches!(g, Grade::Perfect | Grade::Great)) {
        Grade::Great
    } else {
        Grade::Good
    }
}

/// Linear back-and-forth sweep between the track bounds.
#[derive(Debug, Clone, PartialEq)]
pub struct Oscillator {
    position: f32,
    direction: i8,
    speed: f32,
}

impl Oscillator {
    pub fn new(speed: f32) -> Self {
        Oscillator {
            position: TRACK_MIN,
            direction: 1,
            speed,
        }
    }

    pub fn position(&self) -> f32 {
        self.position
    }

    pub fn direction(&self) -> i8 {
        self.direction
    }

    pub fn step(&mut self) {
        self.position += f32::from(self.direction) * self.speed;
        if self.position >= TRACK_MAX {
            self.position = TRACK_MAX;
            self.direction = -1;
        } else if self.position <= TRACK_MIN {
            self.position = TRACK_MIN;
            self.direction = 1;
        }
    }

    pub fn reset(&mut self) {
        self.position = TRACK_MIN;
        self.direction = 1;
    }
}

/// Result of grading one stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StageOutcome {
    /// More stages remain; the marker was reset for the next one.
    Advanced { stage: usize, grade: Grade },
    /// Final stage graded; `grade` is the aggregate over all stages.
    Completed { stage: usize, stage_grade: Grade, grade: Grade },
}

/// In-progress challenge for one move. Owned by the battle session.
#[derive(Debug, Clone, PartialEq)]
pub struct TimingChallenge {
    move_id: String,
    stages: Vec<TimingZones>,
    stage: usize,
    grades: Vec<Grade>,
    oscillator: Oscillator,
}

impl TimingChallenge {
    /// `None` when the move's timing is disabled.
    pub fn for_move(mv: &Move, speed: f32) -> Option<Self> {
        let stages = mv.timing.stages().to_vec();
        if stages.is_empty() {
            return None;
        }
        Some(TimingChallenge {
            move_id: mv.id.clone(),
            stages,
            stage: 0,
            grades: Vec::new(),
            oscillator: Oscillator::new(speed),
        })
    }

    pub fn move_id(&self) -> &str {
        &self.move_id
    }

    pub fn position(&self) -> f32 {
        self.oscillator.position()
    }

    pub fn stage(&self) -> usize {
        self.stage
    }

    pub fn stage_count(&self) -> usize {
        self.stages.len()
    }

    pub fn grades(&self) -> &[Grade] {
        &self.grades
    }

    pub fn step(&mut self, steps: u32) {
        for _ in 0..steps {
            self.oscillator.step();
        }
    }

    /// Grade the current stage at the live marker position.
    pub fn submit(&mut self) -> StageOutcome {
        let position = self.oscillator.position();
        self.submit_at(position)
    }

    /// Grade the current stage as if the marker were at `position`.
    pub fn submit_at(&mut self, position: f32) -> StageOutcome {
        let stage = self.stage;
        let grade = grade_position(&self.stages[stage], position);
        self.grades.push(grade);
        if stage + 1 < self.stages.len() {
            self.stage += 1;
            self.oscillator.reset();
            StageOutcome::Advanced { stage, grade }
        } else {
            StageOutcome::Completed {
                stage,
                stage_grade: grade,
                grade: aggregate_grades(&self.grades),
            }
        }
    }

    pub fn snapshot(&self) -> ChallengeSnapshot {
        ChallengeSnapshot {
            move_id: self.move_id.clone(),
            position: self.oscillator.position(),
            direction: self.oscillator.direction(),
            stage: self.stage,
            stage_count: self.stages.len(),
            stage_grades: self.grades.clone(),
        }
    }
}

/// Cancellable fixed-step timer driving the oscillation. Ticks that arrive
/// while it is stopped are dropped, which is how stale host ticks die.
#[derive(Debug, Clone, PartialEq)]
pub struct OscillationTimer {
    step_secs: f32,
    accumulator: f32,
    running: bool,
}

impl OscillationTimer {
    pub fn new(step_secs: f32) -> Self {
        OscillationTimer {
            step_secs,
            accumulator: 0.0,
            running: false,
        }
    }

    /// Stop whatever was running and start fresh.
    pub fn start(&mut self) {
        self.stop();
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator = 0.0;
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    /// Accumulate `dt` seconds and return the number of whole steps due.
    /// A stopped timer never yields steps.
    pub fn advance(&mut self, dt: f32) -> u32 {
        if !self.running || dt <= 0.0 || !dt.is_finite() {
            return 0;
        }
        self.accumulator += dt;
        let due = (self.accumulator / self.step_secs).floor();
        self.accumulator -= due * self.step_secs;
        if due >= MAX_STEPS_PER_TICK as f32 {
            self.accumulator = 0.0;
            MAX_STEPS_PER_TICK
        } else {
            due as u32
        }
    }
}
