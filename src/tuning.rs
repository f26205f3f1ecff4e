//! Data-driven game balance
//!
//! Every constant the simulation reads lives here so presets and saved
//! settings can override them. Defaults reproduce the reference behavior.

use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::error::{Error, Result, require_non_negative, require_positive};

/// Tension/coherence economy rates
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyRates {
    /// Tension recovered per second while nothing escapes
    pub tension_decay_per_second: f64,
    /// Coherence lost per second
    pub coherence_decay_per_second: f64,
    /// Tension added per escaped pattern
    pub escape_penalty: f64,
    /// Coherence added per stabilized pattern
    pub stabilize_coherence: f64,
    /// Tension removed per stabilized pattern
    pub stabilize_relief: f64,
}

impl Default for EconomyRates {
    fn default() -> Self {
        Self {
            tension_decay_per_second: TENSION_DECAY_PER_SECOND,
            coherence_decay_per_second: COHERENCE_DECAY_PER_SECOND,
            escape_penalty: ESCAPE_PENALTY,
            stabilize_coherence: STABILIZE_COHERENCE,
            stabilize_relief: STABILIZE_RELIEF,
        }
    }
}

/// Logarithmic level curve
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelCurve {
    /// Seconds scale of the survival threshold
    pub base_seconds: f64,
    /// Multiplier on `ln(level + 1)`
    pub growth: f64,
    /// Fraction of the threshold forgiven at full coherence (0..1)
    pub coherence_discount: f64,
    /// Difficulty gain per `ln(level)`
    pub difficulty_scale: f64,
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self {
            base_seconds: 15.0,
            growth: 1.5,
            coherence_discount: 0.25,
            difficulty_scale: 0.35,
        }
    }
}

/// Spawn cadence
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SpawnTuning {
    /// Per-step roll: `tension * rate_constant * dt * rate_scale * difficulty`
    pub rate_constant: f64,
    pub rate_scale: f64,
    /// Tension used by the spawn roll never drops below this. Zero keeps the
    /// roll linear in tension; presets may raise it so a calm core still
    /// sheds the occasional pattern.
    pub tension_floor: f64,
    /// Interval policy: seconds between spawns at zero tension, level 1
    pub base_interval: f64,
    /// Interval policy: how strongly tension shortens the interval
    pub interval_tension_gain: f64,
    /// Interval policy: jitter width as a fraction of the interval
    pub interval_jitter: f64,
}

impl Default for SpawnTuning {
    fn default() -> Self {
        Self {
            rate_constant: SPAWN_RATE_CONSTANT,
            rate_scale: SPAWN_RATE_SCALE,
            tension_floor: 0.0,
            base_interval: 1.2,
            interval_tension_gain: 3.0,
            interval_jitter: 0.5,
        }
    }
}

/// Pattern motion
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PatternTuning {
    /// Progress removed per second while the matching zone is held
    pub pull_back_rate: f64,
    /// Descriptor speed (0.8..3.0) to progress-per-second factor
    pub speed_scale: f64,
}

impl Default for PatternTuning {
    fn default() -> Self {
        Self {
            pull_back_rate: PULL_BACK_RATE,
            speed_scale: 0.25,
        }
    }
}

/// Complete balance table for one run
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub initial_tension: f64,
    pub economy: EconomyRates,
    pub level: LevelCurve,
    pub spawn: SpawnTuning,
    pub patterns: PatternTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            initial_tension: INITIAL_TENSION,
            economy: EconomyRates::default(),
            level: LevelCurve::default(),
            spawn: SpawnTuning::default(),
            patterns: PatternTuning::default(),
        }
    }
}

impl Tuning {
    /// Check every constant up front; a bad table must never reach a run
    pub fn validate(&self) -> Result<()> {
        if !(0.0..=TENSION_MAX).contains(&self.initial_tension) {
            return Err(Error::invalid(
                "initial_tension",
                self.initial_tension,
                "must lie in [0, 1]",
            ));
        }

        let e = &self.economy;
        require_non_negative("economy.tension_decay_per_second", e.tension_decay_per_second)?;
        require_non_negative("economy.coherence_decay_per_second", e.coherence_decay_per_second)?;
        require_non_negative("economy.escape_penalty", e.escape_penalty)?;
        require_non_negative("economy.stabilize_coherence", e.stabilize_coherence)?;
        require_non_negative("economy.stabilize_relief", e.stabilize_relief)?;

        let l = &self.level;
        require_positive("level.base_seconds", l.base_seconds)?;
        require_positive("level.growth", l.growth)?;
        require_non_negative("level.difficulty_scale", l.difficulty_scale)?;
        if !(0.0..1.0).contains(&l.coherence_discount) {
            return Err(Error::invalid(
                "level.coherence_discount",
                l.coherence_discount,
                "must lie in [0, 1)",
            ));
        }

        let s = &self.spawn;
        require_non_negative("spawn.rate_constant", s.rate_constant)?;
        require_non_negative("spawn.rate_scale", s.rate_scale)?;
        require_non_negative("spawn.tension_floor", s.tension_floor)?;
        require_positive("spawn.base_interval", s.base_interval)?;
        require_non_negative("spawn.interval_tension_gain", s.interval_tension_gain)?;
        if !(0.0..2.0).contains(&s.interval_jitter) {
            return Err(Error::invalid(
                "spawn.interval_jitter",
                s.interval_jitter,
                "must lie in [0, 2)",
            ));
        }

        require_non_negative("patterns.pull_back_rate", self.patterns.pull_back_rate)?;
        require_positive("patterns.speed_scale", self.patterns.speed_scale)?;
        Ok(())
    }
}
