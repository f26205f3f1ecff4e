//! Game settings and preferences
//!
//! Persisted separately from high scores. A corrupt settings file falls back
//! to defaults; an out-of-range value is reported when a run is built.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{MAX_SUBSTEPS, SIM_HZ};
use crate::error::{Error, Result};
use crate::persistence;
use crate::sim::SpawnPolicy;
use crate::tuning::Tuning;

/// Difficulty preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum DifficultyPreset {
    Relaxed,
    #[default]
    Standard,
    Intense,
}

impl DifficultyPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            DifficultyPreset::Relaxed => "Relaxed",
            DifficultyPreset::Standard => "Standard",
            DifficultyPreset::Intense => "Intense",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "relaxed" | "easy" => Some(DifficultyPreset::Relaxed),
            "standard" | "normal" => Some(DifficultyPreset::Standard),
            "intense" | "hard" => Some(DifficultyPreset::Intense),
            _ => None,
        }
    }

    /// Balance table for this preset
    pub fn tuning(&self) -> Tuning {
        let mut tuning = Tuning::default();
        match self {
            DifficultyPreset::Relaxed => {
                tuning.patterns.pull_back_rate = 3.0;
                tuning.patterns.speed_scale = 0.2;
                tuning.economy.escape_penalty = 0.2;
                tuning.economy.tension_decay_per_second = 0.05;
                tuning.spawn.tension_floor = 0.05;
            }
            DifficultyPreset::Standard => {}
            DifficultyPreset::Intense => {
                tuning.patterns.speed_scale = 0.3;
                tuning.spawn.rate_constant = 2.0;
                tuning.economy.tension_decay_per_second = 0.02;
                tuning.level.difficulty_scale = 0.45;
                tuning.spawn.tension_floor = 0.1;
            }
        }
        tuning
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Difficulty preset
    pub preset: DifficultyPreset,

    // === Scheduler ===
    /// Fixed simulation rate (steps per second)
    pub sim_hz: u32,
    /// Cap on catch-up steps per frame
    pub max_steps_per_frame: u32,

    // === Simulation ===
    pub spawn_policy: SpawnPolicy,
    /// Full balance override; when absent the preset's table is used
    pub tuning: Option<Tuning>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            preset: DifficultyPreset::Standard,
            sim_hz: SIM_HZ,
            max_steps_per_frame: MAX_SUBSTEPS,
            spawn_policy: SpawnPolicy::PerStepRoll,
            tuning: None,
        }
    }
}

impl Settings {
    /// Create settings from a difficulty preset
    pub fn from_preset(preset: DifficultyPreset) -> Self {
        Self {
            preset,
            ..Self::default()
        }
    }

    /// The balance table a run should use
    pub fn effective_tuning(&self) -> Tuning {
        self.tuning.unwrap_or_else(|| self.preset.tuning())
    }

    /// Fixed step length in seconds
    pub fn step_seconds(&self) -> Result<f64> {
        if self.sim_hz == 0 {
            return Err(Error::invalid("sim_hz", self.sim_hz, "must be at least 1"));
        }
        Ok(1.0 / f64::from(self.sim_hz))
    }

    /// Parse stored settings; corrupt data yields defaults
    pub fn from_json(json: &str) -> Self {
        persistence::parse_or_default(json, "settings")
    }

    /// Load from disk; missing or corrupt files yield defaults
    pub fn load(path: &Path) -> Self {
        persistence::load_json(path, "settings")
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        persistence::save_json(path, self)?;
        log::info!("Settings saved");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_preset_names_round_trip() {
        for preset in [
            DifficultyPreset::Relaxed,
            DifficultyPreset::Standard,
            DifficultyPreset::Intense,
        ] {
            assert_eq!(DifficultyPreset::from_str(preset.as_str()), Some(preset));
        }
        assert_eq!(DifficultyPreset::from_str("HARD"), Some(DifficultyPreset::Intense));
        assert_eq!(DifficultyPreset::from_str("nightmare"), None);
    }

    #[test]
    fn test_every_preset_is_valid() {
        for preset in [
            DifficultyPreset::Relaxed,
            DifficultyPreset::Standard,
            DifficultyPreset::Intense,
        ] {
            assert!(preset.tuning().validate().is_ok(), "{}", preset.as_str());
        }
    }

    #[test]
    fn test_standard_is_reference_tuning() {
        assert_eq!(Settings::default().effective_tuning(), Tuning::default());
    }

    #[test]
    fn test_override_wins_over_preset() {
        let mut tuning = Tuning::default();
        tuning.patterns.pull_back_rate = 9.0;
        let settings = Settings {
            preset: DifficultyPreset::Relaxed,
            tuning: Some(tuning),
            ..Settings::default()
        };
        assert_eq!(settings.effective_tuning().patterns.pull_back_rate, 9.0);
    }

    #[test]
    fn test_zero_hz_is_configuration_error() {
        let settings = Settings {
            sim_hz: 0,
            ..Settings::default()
        };
        assert!(matches!(
            settings.step_seconds(),
            Err(Error::InvalidConfiguration { field: "sim_hz", .. })
        ));
    }

    #[test]
    fn test_corrupt_settings_fall_back() {
        let settings = Settings::from_json("{\"sim_hz\": \"fast\"}");
        assert_eq!(settings.sim_hz, SIM_HZ);
        let partial = Settings::from_json(r#"{"preset": "Intense"}"#);
        assert_eq!(partial.preset, DifficultyPreset::Intense);
        assert_eq!(partial.max_steps_per_frame, MAX_SUBSTEPS);
    }
}
