//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (by pattern ID, held zones ordered)
//! - No rendering, audio or platform dependencies

pub mod autoplay;
pub mod events;
pub mod factory;
pub mod level;
pub mod pattern;
pub mod rng;
pub mod scheduler;
pub mod state;
pub mod tension;
pub mod tick;

pub use autoplay::Autoplay;
pub use events::{EventHub, GameEvent, ListenerId};
pub use factory::{
    BehaviorKind, KeycapPortrait, KeycapShape, PatternDescriptor, PatternTemplate,
    SEED_CONTRACT_VERSION, generate_keycap_portrait, generate_pattern_descriptor,
    spawn_pattern_template,
};
pub use level::{advance_level, difficulty_multiplier, level_threshold};
pub use pattern::{
    Pattern, PatternField, Resolution, Resolved, SpawnPolicy, draw_spawn_interval,
    spawn_interval_seconds, spawn_probability,
};
pub use rng::{RandomSource, Seed, SeedSlot};
pub use scheduler::{Accumulator, FixedStepScheduler, StepReport, advance, advance_until};
pub use state::RunContext;
pub use tension::{TensionSnapshot, TensionState};
pub use tick::{HeldZones, tick};
