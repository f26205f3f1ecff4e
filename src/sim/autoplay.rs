//! Attract/demo mode input
//!
//! Picks which zones to hold from what a player could see: the patterns
//! furthest out get attention first, limited to a couple of hands.

use serde::{Deserialize, Serialize};

use super::pattern::Pattern;
use super::tick::HeldZones;

/// How the demo player behaves
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Autoplay {
    /// Ignore patterns until they have risen this far
    pub reaction_progress: f64,
    /// Zones that can be held at once
    pub hands: usize,
}

impl Default for Autoplay {
    fn default() -> Self {
        Self {
            reaction_progress: 0.35,
            hands: 2,
        }
    }
}

impl Autoplay {
    /// Zones to hold for the next step
    pub fn choose(&self, patterns: &[Pattern]) -> HeldZones {
        let mut urgent: Vec<&Pattern> = patterns
            .iter()
            .filter(|p| p.progress >= self.reaction_progress)
            .collect();
        // Furthest out first, oldest first on ties
        urgent.sort_by(|a, b| {
            b.progress
                .partial_cmp(&a.progress)
                .unwrap_or(std::cmp::Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });

        let mut held = HeldZones::new();
        for pattern in urgent {
            if held.len() >= self.hands {
                break;
            }
            held.press(pattern.color_index);
        }
        held
    }
}
