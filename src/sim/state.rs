//! Run state
//!
//! Everything a single run owns lives in one explicitly constructed
//! [`RunContext`]. Nothing is global, so several runs can coexist (tests,
//! attract mode beside a live game) and each is dropped deterministically.

use super::events::{EventHub, GameEvent, ListenerId};
use super::factory::{KeycapPortrait, generate_keycap_portrait};
use super::level::difficulty_multiplier;
use super::pattern::{Pattern, PatternField, SpawnPolicy};
use super::rng::{RandomSource, Seed};
use super::tension::{TensionSnapshot, TensionState};
use crate::error::Result;
use crate::highscores::RunRecord;
use crate::tuning::Tuning;

/// Suffix for the cosmetic stream so keycap art never shifts gameplay draws
const KEYCAP_STREAM_SUFFIX: &str = "/keycaps";

/// Complete state of one run
#[derive(Debug)]
pub struct RunContext {
    pub(crate) seed: Seed,
    pub(crate) rng: RandomSource,
    pub(crate) tension: TensionState,
    pub(crate) field: PatternField,
    pub(crate) tuning: Tuning,
    pub(crate) spawn_policy: SpawnPolicy,
    pub(crate) events: EventHub,
    /// Fixed steps taken
    pub(crate) step_count: u64,
}

impl RunContext {
    /// Start a run. The tuning table is validated before anything is built.
    pub fn new(seed: Seed, tuning: Tuning, spawn_policy: SpawnPolicy) -> Result<Self> {
        tuning.validate()?;
        Ok(Self {
            rng: RandomSource::from_seed(&seed),
            tension: TensionState::new(tuning.initial_tension, tuning.economy),
            field: PatternField::new(),
            seed,
            tuning,
            spawn_policy,
            events: EventHub::new(),
            step_count: 0,
        })
    }

    pub fn seed(&self) -> &Seed {
        &self.seed
    }

    pub fn tuning(&self) -> &Tuning {
        &self.tuning
    }

    pub fn spawn_policy(&self) -> SpawnPolicy {
        self.spawn_policy
    }

    pub fn step_count(&self) -> u64 {
        self.step_count
    }

    pub fn tension(&self) -> &TensionState {
        &self.tension
    }

    /// Direct economy access for host-side adjustments
    pub fn economy_mut(&mut self) -> &mut TensionState {
        &mut self.tension
    }

    pub fn snapshot(&self) -> TensionSnapshot {
        self.tension.snapshot()
    }

    /// Current spawn/speed multiplier
    pub fn difficulty(&self) -> f64 {
        difficulty_multiplier(&self.tuning.level, self.tension.level())
    }

    /// Active patterns in id order
    pub fn patterns(&self) -> &[Pattern] {
        self.field.patterns()
    }

    /// Place a pattern directly (scripted sequences, tutorials, tests).
    /// Speed must be finite and positive, angle finite, progress in [0, 1].
    pub fn insert_pattern(
        &mut self,
        color_index: u8,
        speed: f64,
        angle: f64,
        progress: f64,
    ) -> Result<u64> {
        self.field.insert(color_index, speed, angle, progress)
    }

    /// Remove every active pattern so the presentation layer can dispose its
    /// proxies one for one
    pub fn clear_patterns(&mut self) -> Vec<Pattern> {
        self.field.clear()
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> ListenerId {
        self.events.subscribe(listener)
    }

    pub fn unsubscribe(&mut self, id: ListenerId) -> bool {
        self.events.unsubscribe(id)
    }

    pub fn clear_listeners(&mut self) {
        self.events.clear_listeners();
    }

    /// Events emitted since the last drain
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.events.drain()
    }

    /// One portrait per input zone, from a side stream of the run seed
    pub fn keycap_portraits(&self, zones: usize) -> Vec<KeycapPortrait> {
        let mut source = RandomSource::new(&format!("{}{}", self.seed.as_str(), KEYCAP_STREAM_SUFFIX));
        (0..zones).map(|_| generate_keycap_portrait(&mut source)).collect()
    }

    /// Values a collaborator persists when the run ends
    pub fn record(&self) -> RunRecord {
        RunRecord {
            peak_coherence: self.tension.peak_coherence(),
            levels_survived: self.tension.level() - 1,
            seed: self.seed.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    fn run(seed: &str) -> RunContext {
        RunContext::new(Seed::from(seed), Tuning::default(), SpawnPolicy::default()).unwrap()
    }

    #[test]
    fn test_new_run_state() {
        let run = run("fresh");
        assert_eq!(run.tension().tension(), Tuning::default().initial_tension);
        assert_eq!(run.tension().level(), 1);
        assert_eq!(run.step_count(), 0);
        assert!(run.patterns().is_empty());
        assert_eq!(run.difficulty(), 1.0);
    }

    #[test]
    fn test_bad_tuning_rejected() {
        let mut tuning = Tuning::default();
        tuning.level.base_seconds = 0.0;
        let result = RunContext::new(Seed::from("bad"), tuning, SpawnPolicy::default());
        assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_runs_are_independent() {
        let mut a = run("a");
        let b = run("a");
        a.economy_mut().set_tension(0.9);
        a.insert_pattern(0, 1.0, 0.0, 0.5).unwrap();
        assert_eq!(b.tension().tension(), Tuning::default().initial_tension);
        assert!(b.patterns().is_empty());
    }

    #[test]
    fn test_insert_pattern_fails_fast() {
        let mut run = run("scripted");
        let result = run.insert_pattern(2, f64::NAN, 0.0, 0.5);
        assert!(matches!(
            result,
            Err(Error::InvalidConfiguration { field: "pattern.speed", .. })
        ));
        assert!(run.patterns().is_empty());

        let id = run.insert_pattern(2, 0.5, 1.0, 0.5).unwrap();
        let pattern = &run.patterns()[0];
        assert_eq!(pattern.id, id);
        assert!(pattern.position().is_finite());
    }

    #[test]
    fn test_keycap_portraits_stable_per_seed() {
        let a = run("keys").keycap_portraits(6);
        let b = run("keys").keycap_portraits(6);
        assert_eq!(a, b);
        assert_eq!(a.len(), 6);
    }

    #[test]
    fn test_portraits_do_not_touch_run_stream() {
        let run = run("keys");
        run.keycap_portraits(6);
        assert_eq!(run.rng.draws(), 0);
    }

    #[test]
    fn test_record_reports_completed_levels() {
        let mut run = run("record");
        run.economy_mut().apply_stabilize();
        let record = run.record();
        assert_eq!(record.peak_coherence, 3.0);
        assert_eq!(record.levels_survived, 0);
        assert_eq!(record.seed.as_str(), "record");
    }

    #[test]
    fn test_clear_patterns_for_teardown() {
        let mut run = run("teardown");
        run.insert_pattern(0, 1.0, 0.0, 0.2).unwrap();
        run.insert_pattern(1, 1.0, 0.0, 0.2).unwrap();
        let removed = run.clear_patterns();
        assert_eq!(removed.iter().map(|p| p.id).collect::<Vec<_>>(), vec![1, 2]);
        assert!(run.patterns().is_empty());
    }
}
