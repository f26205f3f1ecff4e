//! Tension/coherence resource economy
//!
//! Tension is failure pressure in [0, 1]; coherence is accumulated success in
//! [0, 100] with its running peak. Every mutation re-clamps. The economy has
//! no notion of losing: a host decides what tension 1.0 means.

use serde::{Deserialize, Serialize};

use crate::consts::{COHERENCE_MAX, TENSION_MAX};
use crate::tuning::EconomyRates;

/// Scalar run state, mutated only inside fixed steps
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TensionState {
    tension: f64,
    coherence: f64,
    peak_coherence: f64,
    elapsed_seconds: f64,
    level: u32,
    /// Elapsed time at which the current level began
    level_started_at: f64,
    stabilized_count: u32,
    escaped_count: u32,
    rates: EconomyRates,
}

/// Read-only view handed to presentation collaborators each frame
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TensionSnapshot {
    pub tension: f64,
    pub coherence: f64,
    pub peak_coherence: f64,
    pub level: u32,
    pub elapsed_seconds: f64,
}

impl TensionState {
    pub fn new(initial_tension: f64, rates: EconomyRates) -> Self {
        Self {
            tension: initial_tension.clamp(0.0, TENSION_MAX),
            coherence: 0.0,
            peak_coherence: 0.0,
            elapsed_seconds: 0.0,
            level: 1,
            level_started_at: 0.0,
            stabilized_count: 0,
            escaped_count: 0,
            rates,
        }
    }

    /// Back to a fresh run with the same rates
    pub fn reset(&mut self, initial_tension: f64) {
        *self = Self::new(initial_tension, self.rates);
    }

    pub fn tension(&self) -> f64 {
        self.tension
    }

    pub fn coherence(&self) -> f64 {
        self.coherence
    }

    pub fn peak_coherence(&self) -> f64 {
        self.peak_coherence
    }

    pub fn elapsed_seconds(&self) -> f64 {
        self.elapsed_seconds
    }

    pub fn level(&self) -> u32 {
        self.level
    }

    pub fn level_started_at(&self) -> f64 {
        self.level_started_at
    }

    pub fn stabilized_count(&self) -> u32 {
        self.stabilized_count
    }

    pub fn escaped_count(&self) -> u32 {
        self.escaped_count
    }

    pub fn rates(&self) -> &EconomyRates {
        &self.rates
    }

    pub fn snapshot(&self) -> TensionSnapshot {
        TensionSnapshot {
            tension: self.tension,
            coherence: self.coherence,
            peak_coherence: self.peak_coherence,
            level: self.level,
            elapsed_seconds: self.elapsed_seconds,
        }
    }

    /// Spontaneous recovery
    pub fn decay_tension(&mut self, dt: f64) {
        self.set_tension(self.tension - self.rates.tension_decay_per_second * dt);
    }

    /// Coherence erodes slowly; the peak never does
    pub fn decay_coherence(&mut self, dt: f64) {
        self.set_coherence(self.coherence - self.rates.coherence_decay_per_second * dt);
    }

    pub fn add_time(&mut self, dt: f64) {
        self.elapsed_seconds += dt;
    }

    /// Set tension, clamped into [0, 1]. NaN is treated as no change.
    pub fn set_tension(&mut self, value: f64) {
        if !value.is_nan() {
            self.tension = value.clamp(0.0, TENSION_MAX);
        }
    }

    pub fn adjust_tension(&mut self, delta: f64) {
        self.set_tension(self.tension + delta);
    }

    /// An escaped pattern: fixed tension penalty
    pub fn apply_escape(&mut self) {
        self.escaped_count += 1;
        self.adjust_tension(self.rates.escape_penalty);
    }

    /// A stabilized pattern: coherence reward plus smaller tension relief
    pub fn apply_stabilize(&mut self) {
        self.stabilized_count += 1;
        self.set_coherence(self.coherence + self.rates.stabilize_coherence);
        self.adjust_tension(-self.rates.stabilize_relief);
    }

    fn set_coherence(&mut self, value: f64) {
        if !value.is_nan() {
            self.coherence = value.clamp(0.0, COHERENCE_MAX);
            self.peak_coherence = self.peak_coherence.max(self.coherence);
        }
    }

    /// Move to the next level, starting its survival clock now
    pub(crate) fn promote_level(&mut self) -> u32 {
        self.level += 1;
        self.level_started_at = self.elapsed_seconds;
        self.level
    }
}
