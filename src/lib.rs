//! Fracture - deterministic tension simulation core
//!
//! Core modules:
//! - `sim`: Deterministic simulation (random source, content factory, fixed-step
//!   scheduler, tension economy, pattern lifecycle, level progression)
//! - `session`: Host loop wrapper (loss policy, teardown, run records)
//! - `persistence`: JSON load/save with fall-back-to-default recovery
//! - `tuning`: Data-driven game balance

pub mod error;
pub mod highscores;
pub mod persistence;
pub mod session;
pub mod settings;
pub mod sim;
pub mod tuning;

pub use error::{Error, Result};
pub use highscores::{HighScores, RunRecord};
pub use session::{Session, SessionPhase};
pub use settings::{DifficultyPreset, Settings};
pub use tuning::Tuning;

use glam::DVec2;

/// Game configuration constants
pub mod consts {
    /// Fixed simulation rate
    pub const SIM_HZ: u32 = 60;
    /// Fixed simulation timestep in seconds
    pub const SIM_DT: f64 = 1.0 / SIM_HZ as f64;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;

    /// Tension at which the host declares the run lost
    pub const LOSS_TENSION: f64 = 1.0;
    pub const TENSION_MAX: f64 = 1.0;
    pub const COHERENCE_MAX: f64 = 100.0;

    /// Keycap / input zone palette (0xRRGGBB). Pattern color indices map here.
    pub const PALETTE: [u32; 6] = [
        0xff4d6d, // rose
        0xffb703, // amber
        0x06d6a0, // mint
        0x118ab2, // sea
        0x8338ec, // violet
        0xf8f9fa, // bone
    ];
    pub const PALETTE_LEN: usize = PALETTE.len();

    /// Descriptor ranges
    pub const AMOUNT_MIN: u32 = 3;
    pub const AMOUNT_MAX: u32 = 12;
    pub const SPEED_MIN: f64 = 0.8;
    pub const SPEED_MAX: f64 = 3.0;
    pub const INTENSITY_MIN: f64 = 0.6;
    pub const INTENSITY_MAX: f64 = 1.0;

    /// Economy reference values
    pub const ESCAPE_PENALTY: f64 = 0.25;
    pub const STABILIZE_COHERENCE: f64 = 3.0;
    pub const STABILIZE_RELIEF: f64 = 0.08;
    pub const TENSION_DECAY_PER_SECOND: f64 = 0.03;
    pub const COHERENCE_DECAY_PER_SECOND: f64 = 0.5;
    pub const INITIAL_TENSION: f64 = 0.2;

    /// Pattern lifecycle reference values
    pub const PULL_BACK_RATE: f64 = 2.4;
    pub const SPAWN_RATE_CONSTANT: f64 = 1.6;
    pub const SPAWN_RATE_SCALE: f64 = 7.0;

    /// Presentation geometry: patterns travel from the core surface to the escape ring
    pub const CORE_RADIUS: f64 = 1.0;
    pub const ESCAPE_RADIUS: f64 = 3.0;
}

/// Convert polar (r, theta) to cartesian (x, y)
#[inline]
pub fn polar_to_cartesian(r: f64, theta: f64) -> DVec2 {
    DVec2::new(r * theta.cos(), r * theta.sin())
}

/// Linear interpolation
#[inline]
pub(crate) fn lerp(a: f64, b: f64, t: f64) -> f64 {
    a + (b - a) * t
}
