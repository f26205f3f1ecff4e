//! Procedural content factory
//!
//! Derives pattern descriptors and keycap portraits from a [`RandomSource`].
//!
//! # Seed contract (version [`SEED_CONTRACT_VERSION`])
//!
//! The number and order of draws below is part of the seed contract. Every
//! later draw in a run depends on it, so changing either one changes the
//! content of every existing seed. Bump the version when touching it.
//!
//! | Call | Draws (in order) |
//! |---|---|
//! | [`generate_pattern_descriptor`] | amount, speed, behavior bin (3) |
//! | [`generate_keycap_portrait`] | color, intensity, shape (3) |
//! | [`spawn_pattern_template`] | descriptor (3), angle (1) |
//!
//! Derived fields (`color_index`, `split_chance`, `aggression`) reuse
//! already-drawn values arithmetically and never draw.

use serde::{Deserialize, Serialize};
use std::f64::consts::TAU;

use super::rng::RandomSource;
use crate::consts::*;
use crate::lerp;

/// Revision of the draw-count/order contract documented above
pub const SEED_CONTRACT_VERSION: u32 = 1;

/// Draws consumed by [`generate_pattern_descriptor`]
pub const DESCRIPTOR_DRAWS: u64 = 3;
/// Draws consumed by [`generate_keycap_portrait`]
pub const PORTRAIT_DRAWS: u64 = 3;
/// Draws consumed by [`spawn_pattern_template`]
pub const TEMPLATE_DRAWS: u64 = DESCRIPTOR_DRAWS + 1;

/// Movement personality of a pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum BehaviorKind {
    Zigzag,
    Split,
    Seek,
    Wander,
}

impl BehaviorKind {
    /// Map a draw onto the four half-open bins [0,.25) [.25,.5) [.5,.75) [.75,1)
    pub fn from_draw(d: f64) -> Self {
        if d < 0.25 {
            BehaviorKind::Zigzag
        } else if d < 0.5 {
            BehaviorKind::Split
        } else if d < 0.75 {
            BehaviorKind::Seek
        } else {
            BehaviorKind::Wander
        }
    }

    /// Aggression weight applied to the raw draw average
    fn aggression_weight(self) -> f64 {
        match self {
            BehaviorKind::Zigzag => 0.7,
            BehaviorKind::Split => 0.55,
            BehaviorKind::Seek => 1.0,
            BehaviorKind::Wander => 0.4,
        }
    }
}

/// Immutable content descriptor for one pattern/enemy
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternDescriptor {
    /// Fragment count (3..=12)
    pub amount: u32,
    /// Base speed (0.8..3.0)
    pub speed: f64,
    /// Palette index, also the input zone that can pull this pattern back
    pub color_index: u8,
    pub behavior: BehaviorKind,
    /// Chance a fragment splits; high inside the `Split` bin
    pub split_chance: f64,
    /// How eagerly the pattern heads outward; highest for `Seek`
    pub aggression: f64,
}

/// Keycap visual variants
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum KeycapShape {
    Rounded,
    Square,
    Beveled,
    Circle,
}

impl KeycapShape {
    fn from_draw(d: f64) -> Self {
        if d < 0.25 {
            KeycapShape::Rounded
        } else if d < 0.5 {
            KeycapShape::Square
        } else if d < 0.75 {
            KeycapShape::Beveled
        } else {
            KeycapShape::Circle
        }
    }
}

/// Visual descriptor for an input keycap
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct KeycapPortrait {
    pub color_index: u8,
    /// Glow intensity (0.6..1.0)
    pub intensity: f64,
    pub shape: KeycapShape,
}

/// Everything needed to spawn one pattern
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct PatternTemplate {
    pub descriptor: PatternDescriptor,
    /// Emission angle in radians [0, TAU)
    pub angle: f64,
}

/// Map a draw in [0, 1) onto `0..len` without ever reaching `len`
fn index_from_draw(d: f64, len: usize) -> usize {
    ((d * len as f64) as usize).min(len - 1)
}

/// Derive a pattern descriptor. Consumes exactly [`DESCRIPTOR_DRAWS`] draws.
pub fn generate_pattern_descriptor(source: &mut RandomSource) -> PatternDescriptor {
    let amount_draw = source.draw();
    let speed_draw = source.draw();
    let behavior_draw = source.draw();

    let span = (AMOUNT_MAX - AMOUNT_MIN + 1) as usize;
    let amount = AMOUNT_MIN + index_from_draw(amount_draw, span) as u32;
    let speed = lerp(SPEED_MIN, SPEED_MAX, speed_draw);
    let behavior = BehaviorKind::from_draw(behavior_draw);

    // Derived, no extra draws: color from the high bits of the speed draw,
    // split chance from the position inside the behavior bin.
    let color_index = index_from_draw((speed_draw * 64.0).fract(), PALETTE_LEN) as u8;
    let within_bin = (behavior_draw * 4.0).fract();
    let split_chance = match behavior {
        BehaviorKind::Split => 0.35 + 0.4 * within_bin,
        _ => 0.1 * within_bin,
    };
    let aggression = (amount_draw + speed_draw) * 0.5 * behavior.aggression_weight();

    PatternDescriptor {
        amount,
        speed,
        color_index,
        behavior,
        split_chance,
        aggression,
    }
}

/// Derive a keycap portrait. Consumes exactly [`PORTRAIT_DRAWS`] draws.
pub fn generate_keycap_portrait(source: &mut RandomSource) -> KeycapPortrait {
    let color_draw = source.draw();
    let intensity_draw = source.draw();
    let shape_draw = source.draw();

    KeycapPortrait {
        color_index: index_from_draw(color_draw, PALETTE_LEN) as u8,
        intensity: lerp(INTENSITY_MIN, INTENSITY_MAX, intensity_draw),
        shape: KeycapShape::from_draw(shape_draw),
    }
}

/// Descriptor plus emission angle. Consumes exactly [`TEMPLATE_DRAWS`] draws.
pub fn spawn_pattern_template(source: &mut RandomSource) -> PatternTemplate {
    let descriptor = generate_pattern_descriptor(source);
    let angle = source.draw() * TAU;
    PatternTemplate { descriptor, angle }
}
