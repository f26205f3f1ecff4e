//! Pattern lifecycle
//!
//! A pattern is Active from spawn until its progress crosses a boundary:
//! `>= 1` is Escaped, `<= 0` is Stabilized. Both are terminal and the entity
//! is removed in the same step. There is no timeout; a slow pattern nobody
//! holds may rise for a very long time.

use glam::DVec2;
use serde::{Deserialize, Serialize};

use super::factory::{BehaviorKind, PatternTemplate};
use super::rng::RandomSource;
use super::tick::HeldZones;
use crate::consts::{CORE_RADIUS, ESCAPE_RADIUS};
use crate::error::{Error, Result, require_finite, require_positive};
use crate::polar_to_cartesian;
use crate::tuning::SpawnTuning;

/// A short-lived escaping pattern
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Pattern {
    /// Unique per run, increasing
    pub id: u64,
    /// Input zone that pulls this pattern back
    pub color_index: u8,
    /// 0 = safely inside the core, 1 = escaped
    pub progress: f64,
    /// Progress per second, fixed at spawn
    pub speed: f64,
    /// Emission angle (presentation only)
    pub angle: f64,
    /// Presentation hints
    pub behavior: BehaviorKind,
    pub amount: u32,
}

impl Pattern {
    /// World-space position between the core surface and the escape ring
    pub fn position(&self) -> DVec2 {
        let r = CORE_RADIUS + (ESCAPE_RADIUS - CORE_RADIUS) * self.progress.clamp(0.0, 1.0);
        polar_to_cartesian(r, self.angle)
    }
}

/// Terminal outcome
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Resolution {
    Stabilized,
    Escaped,
}

/// A pattern removed this step and why
#[derive(Debug, Clone, PartialEq)]
pub struct Resolved {
    pub pattern: Pattern,
    pub outcome: Resolution,
}

/// How spawn decisions are made
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum SpawnPolicy {
    /// One uniform draw per step against a tension-scaled probability
    #[default]
    PerStepRoll,
    /// Countdown timer; each interval is drawn when the previous one expires
    Interval,
}

impl SpawnPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            SpawnPolicy::PerStepRoll => "roll",
            SpawnPolicy::Interval => "interval",
        }
    }
}

/// Per-step spawn probability: scales linearly with tension, so escapes feed
/// more spawns unless the player stabilizes
pub fn spawn_probability(tuning: &SpawnTuning, tension: f64, difficulty: f64, dt: f64) -> f64 {
    tension.max(tuning.tension_floor) * tuning.rate_constant * dt * tuning.rate_scale * difficulty
}

/// Seconds until the next spawn under [`SpawnPolicy::Interval`].
/// `jitter` is a draw in [0, 1); for a fixed jitter, higher tension always
/// gives a strictly shorter interval.
pub fn spawn_interval_seconds(
    tuning: &SpawnTuning,
    tension: f64,
    difficulty: f64,
    jitter: f64,
) -> f64 {
    let pressure = (1.0 + tuning.interval_tension_gain * tension.clamp(0.0, 1.0)) * difficulty;
    let spread = 1.0 + tuning.interval_jitter * (jitter - 0.5);
    tuning.base_interval / pressure * spread
}

/// [`spawn_interval_seconds`] with its jitter taken from the run's source (one draw)
pub fn draw_spawn_interval(
    tuning: &SpawnTuning,
    tension: f64,
    difficulty: f64,
    source: &mut RandomSource,
) -> f64 {
    spawn_interval_seconds(tuning, tension, difficulty, source.draw())
}

/// The active pattern set
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct PatternField {
    /// Sorted by id (spawn order)
    patterns: Vec<Pattern>,
    next_id: u64,
    /// Interval policy countdown; `None` until the next interval is drawn
    spawn_timer: Option<f64>,
}

impl PatternField {
    pub fn new() -> Self {
        Self {
            patterns: Vec::new(),
            next_id: 1,
            spawn_timer: None,
        }
    }

    pub fn patterns(&self) -> &[Pattern] {
        &self.patterns
    }

    pub fn get(&self, id: u64) -> Option<&Pattern> {
        self.patterns.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.patterns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Allocate a new pattern id
    fn next_pattern_id(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    /// Spawn from a factory template; `speed_factor` converts descriptor speed
    /// into progress per second (tuning scale times difficulty)
    pub fn spawn(&mut self, template: &PatternTemplate, speed_factor: f64) -> &Pattern {
        let id = self.next_pattern_id();
        let descriptor = &template.descriptor;
        self.patterns.push(Pattern {
            id,
            color_index: descriptor.color_index,
            progress: 0.0,
            speed: descriptor.speed * speed_factor,
            angle: template.angle,
            behavior: descriptor.behavior,
            amount: descriptor.amount,
        });
        &self.patterns[self.patterns.len() - 1]
    }

    /// Insert a pattern with explicit parameters (scripted sequences, tests).
    /// Nothing is inserted and no id is used when a parameter is invalid.
    pub fn insert(
        &mut self,
        color_index: u8,
        speed: f64,
        angle: f64,
        progress: f64,
    ) -> Result<u64> {
        require_positive("pattern.speed", speed)?;
        require_finite("pattern.angle", angle)?;
        if !(0.0..=1.0).contains(&progress) {
            return Err(Error::invalid("pattern.progress", progress, "must be within [0, 1]"));
        }

        let id = self.next_pattern_id();
        self.patterns.push(Pattern {
            id,
            color_index,
            progress,
            speed,
            angle,
            behavior: BehaviorKind::Wander,
            amount: 1,
        });
        Ok(id)
    }

    /// Decide whether a pattern spawns this step. Consumes one draw per step
    /// under `PerStepRoll`, one draw per interval under `Interval`.
    pub fn roll_spawn(
        &mut self,
        policy: SpawnPolicy,
        tuning: &SpawnTuning,
        tension: f64,
        difficulty: f64,
        dt: f64,
        source: &mut RandomSource,
    ) -> bool {
        match policy {
            SpawnPolicy::PerStepRoll => {
                source.draw() < spawn_probability(tuning, tension, difficulty, dt)
            }
            SpawnPolicy::Interval => {
                let remaining = match self.spawn_timer {
                    Some(timer) => timer - dt,
                    None => draw_spawn_interval(tuning, tension, difficulty, source),
                };
                if remaining <= 0.0 {
                    self.spawn_timer = None;
                    true
                } else {
                    self.spawn_timer = Some(remaining);
                    false
                }
            }
        }
    }

    /// Move the first `movable` patterns one step and remove the ones that
    /// resolved. Patterns past `movable` were spawned this step and wait.
    ///
    /// Forward motion and pull-back are combined before the boundary checks;
    /// holding cancels any pattern whose speed is at most `pull_back_rate`.
    pub fn advance(
        &mut self,
        held: &HeldZones,
        dt: f64,
        pull_back_rate: f64,
        movable: usize,
    ) -> Vec<Resolved> {
        let mut resolved = Vec::new();
        let mut kept = Vec::with_capacity(self.patterns.len());

        for (index, mut pattern) in self.patterns.drain(..).enumerate() {
            if index >= movable {
                kept.push(pattern);
                continue;
            }

            pattern.progress += pattern.speed * dt;
            if held.is_held(pattern.color_index) {
                pattern.progress = (pattern.progress - pull_back_rate * dt).max(0.0);
            }

            if pattern.progress >= 1.0 {
                pattern.progress = 1.0;
                resolved.push(Resolved {
                    pattern,
                    outcome: Resolution::Escaped,
                });
            } else if pattern.progress <= 0.0 {
                resolved.push(Resolved {
                    pattern,
                    outcome: Resolution::Stabilized,
                });
            } else {
                kept.push(pattern);
            }
        }

        self.patterns = kept;
        resolved
    }

    /// Remove every pattern for teardown, in id order
    pub fn clear(&mut self) -> Vec<Pattern> {
        self.spawn_timer = None;
        std::mem::take(&mut self.patterns)
    }
}
