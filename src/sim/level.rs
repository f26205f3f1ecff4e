//! Level progression with logarithmic difficulty
//!
//! Surviving a level takes `base * ln(level + 1) * growth` seconds, shortened
//! by up to `coherence_discount` when coherence is full. Difficulty follows
//! the same log family, so escalation is steep early and flattens later.

use super::tension::TensionState;
use crate::consts::COHERENCE_MAX;
use crate::tuning::LevelCurve;

/// Seconds that must be survived inside `level` before moving on
pub fn level_threshold(curve: &LevelCurve, level: u32, coherence: f64) -> f64 {
    let raw = curve.base_seconds * (f64::from(level) + 1.0).ln() * curve.growth;
    let earned = (coherence / COHERENCE_MAX).clamp(0.0, 1.0);
    raw * (1.0 - curve.coherence_discount * earned)
}

/// Spawn-rate/speed multiplier for `level` (1.0 at level 1)
pub fn difficulty_multiplier(curve: &LevelCurve, level: u32) -> f64 {
    1.0 + curve.difficulty_scale * f64::from(level.max(1)).ln()
}

/// Promote by one level if the current level's threshold has been survived.
/// Returns the new level when a promotion happened.
pub fn advance_level(state: &mut TensionState, curve: &LevelCurve) -> Option<u32> {
    let survived = state.elapsed_seconds() - state.level_started_at();
    let threshold = level_threshold(curve, state.level(), state.coherence());
    if survived >= threshold {
        Some(state.promote_level())
    } else {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tuning::EconomyRates;

    fn state() -> TensionState {
        TensionState::new(0.0, EconomyRates::default())
    }

    #[test]
    fn test_threshold_grows_logarithmically() {
        let curve = LevelCurve::default();
        let t1 = level_threshold(&curve, 1, 0.0);
        let t2 = level_threshold(&curve, 2, 0.0);
        let t10 = level_threshold(&curve, 10, 0.0);
        let t11 = level_threshold(&curve, 11, 0.0);
        assert!(t2 > t1);
        assert!(t11 > t10);
        // Flattens: later increments are smaller
        assert!(t11 - t10 < t2 - t1);
    }

    #[test]
    fn test_coherence_shortens_threshold() {
        let curve = LevelCurve::default();
        let calm = level_threshold(&curve, 3, 0.0);
        let focused = level_threshold(&curve, 3, 100.0);
        assert!((focused - calm * 0.75).abs() < 1e-9);
    }

    #[test]
    fn test_difficulty_starts_at_one_and_flattens() {
        let curve = LevelCurve::default();
        assert_eq!(difficulty_multiplier(&curve, 1), 1.0);
        let d2 = difficulty_multiplier(&curve, 2);
        let d20 = difficulty_multiplier(&curve, 20);
        let d30 = difficulty_multiplier(&curve, 30);
        assert!(d2 > 1.0);
        assert!(d30 - d20 < d2 - 1.0);
        assert!(d30 < 3.0);
    }

    #[test]
    fn test_advance_one_level_at_a_time() {
        let curve = LevelCurve::default();
        let mut state = state();
        let threshold = level_threshold(&curve, 1, 0.0);

        state.add_time(threshold - 0.01);
        assert_eq!(advance_level(&mut state, &curve), None);

        // Far past several thresholds: still only one promotion per call
        state.add_time(1000.0);
        assert_eq!(advance_level(&mut state, &curve), Some(2));
        assert_eq!(state.level(), 2);
        assert_eq!(state.level_started_at(), state.elapsed_seconds());
        assert_eq!(advance_level(&mut state, &curve), None);
    }
}
