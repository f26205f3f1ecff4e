//! Host session
//!
//! Owns the scheduler, the live run and the held-zone snapshot. This is where
//! the host loss policy lives: the economy only reports tension, the session
//! decides that reaching [`LOSS_TENSION`] ends the run.

use std::ops::ControlFlow;

use crate::consts::LOSS_TENSION;
use crate::error::Result;
use crate::highscores::RunRecord;
use crate::settings::Settings;
use crate::sim::{
    FixedStepScheduler, GameEvent, HeldZones, ListenerId, Pattern, RunContext, Seed, SeedSlot,
    StepReport, TensionSnapshot, tick,
};

/// Where the session is in its lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// Steps are being taken
    Running,
    /// Tension hit the loss threshold; no more steps
    Lost,
    /// Host stopped the session (unmount, quit)
    Stopped,
}

/// A run plus everything needed to drive it from a render loop
#[derive(Debug)]
pub struct Session {
    settings: Settings,
    scheduler: FixedStepScheduler,
    run: RunContext,
    held: HeldZones,
    seeds: SeedSlot,
    phase: SessionPhase,
}

impl Session {
    /// Build and start a session. Settings are validated eagerly.
    pub fn new(seed: Seed, settings: Settings) -> Result<Self> {
        let mut scheduler =
            FixedStepScheduler::new(settings.step_seconds()?, settings.max_steps_per_frame)?;
        let run = RunContext::new(seed.clone(), settings.effective_tuning(), settings.spawn_policy)?;
        let mut seeds = SeedSlot::new();
        seeds.begin_with(seed);

        scheduler.start();
        log::info!(
            "Run started ({}, {} Hz, {} spawns)",
            settings.preset.as_str(),
            settings.sim_hz,
            settings.spawn_policy.as_str()
        );

        Ok(Self {
            settings,
            scheduler,
            run,
            held: HeldZones::new(),
            seeds,
            phase: SessionPhase::Running,
        })
    }

    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    pub fn run(&self) -> &RunContext {
        &self.run
    }

    pub fn run_mut(&mut self) -> &mut RunContext {
        &mut self.run
    }

    pub fn snapshot(&self) -> TensionSnapshot {
        self.run.snapshot()
    }

    pub fn held(&self) -> &HeldZones {
        &self.held
    }

    /// Input edge: zone pressed
    pub fn press(&mut self, zone: u8) {
        self.held.press(zone);
    }

    /// Input edge: zone released
    pub fn release(&mut self, zone: u8) {
        self.held.release(zone);
    }

    /// Replace the whole held set (autoplay, XR hand tracking)
    pub fn set_held(&mut self, held: HeldZones) {
        self.held = held;
    }

    pub fn subscribe(&mut self, listener: impl FnMut(&GameEvent) + 'static) -> ListenerId {
        self.run.subscribe(listener)
    }

    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        self.run.drain_events()
    }

    /// Render interpolation factor
    pub fn alpha(&self) -> f64 {
        self.scheduler.alpha()
    }

    /// Feed one render frame. The held set is snapshotted once per step.
    pub fn frame(&mut self, delta_seconds: f64) -> Result<StepReport> {
        if self.phase != SessionPhase::Running {
            return Ok(StepReport::default());
        }

        let run = &mut self.run;
        let held = &self.held;
        let report = self.scheduler.advance_until(delta_seconds, |dt| {
            let snapshot = held.clone();
            tick(run, &snapshot, dt);
            if run.tension().tension() >= LOSS_TENSION {
                ControlFlow::Break(())
            } else {
                ControlFlow::Continue(())
            }
        });

        let report = match report {
            Ok(report) => report,
            Err(e) => {
                self.stop();
                return Err(e);
            }
        };

        if report.halted {
            let snapshot = self.run.snapshot();
            log::info!(
                "Run lost at level {} after {:.1}s (peak coherence {:.0})",
                snapshot.level,
                snapshot.elapsed_seconds,
                snapshot.peak_coherence
            );
            self.phase = SessionPhase::Lost;
            self.scheduler.stop();
        }
        Ok(report)
    }

    /// Values to persist for the current run
    pub fn record(&self) -> RunRecord {
        self.run.record()
    }

    /// Stop stepping and hand back every live pattern so the presentation
    /// layer can dispose its proxies. Safe to call any number of times.
    pub fn stop(&mut self) -> Vec<Pattern> {
        self.scheduler.stop();
        self.held.clear();
        self.run.clear_listeners();
        if self.phase == SessionPhase::Running {
            self.phase = SessionPhase::Stopped;
            log::info!("Session stopped after {} steps", self.run.step_count());
        }
        self.seeds.end_run();
        self.run.clear_patterns()
    }

    /// Tear down the current run and start another with `seed`
    pub fn restart(&mut self, seed: Seed) -> Result<Vec<Pattern>> {
        let disposed = self.stop();
        let run = RunContext::new(
            seed.clone(),
            self.settings.effective_tuning(),
            self.settings.spawn_policy,
        )?;
        self.seeds.begin_with(seed);
        self.run = run;
        self.phase = SessionPhase::Running;
        self.scheduler.start();
        Ok(disposed)
    }

    /// Tear down and start over with a freshly generated seed
    pub fn new_run(&mut self) -> Result<Vec<Pattern>> {
        let disposed = self.stop();
        let seed = self.seeds.begin_new_run();
        self.run = RunContext::new(
            seed,
            self.settings.effective_tuning(),
            self.settings.spawn_policy,
        )?;
        self.phase = SessionPhase::Running;
        self.scheduler.start();
        Ok(disposed)
    }

    /// Tear down and replay the last run's seed from the start, if any.
    /// The disposed patterns come back either way; the seed is `None` when
    /// there was nothing to continue and the session stays stopped.
    pub fn continue_last(&mut self) -> Result<(Option<Seed>, Vec<Pattern>)> {
        let disposed = self.stop();
        let Some(seed) = self.seeds.continue_run() else {
            return Ok((None, disposed));
        };
        self.run = RunContext::new(
            seed.clone(),
            self.settings.effective_tuning(),
            self.settings.spawn_policy,
        )?;
        self.phase = SessionPhase::Running;
        self.scheduler.start();
        Ok((Some(seed), disposed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::error::Error;

    fn session(seed: &str) -> Session {
        Session::new(Seed::from(seed), Settings::default()).unwrap()
    }

    #[test]
    fn test_frame_runs_fixed_steps() {
        let mut session = session("frames");
        let report = session.frame(SIM_DT * 3.5).unwrap();
        assert_eq!(report.steps, 3);
        assert_eq!(session.run().step_count(), 3);
    }

    #[test]
    fn test_zero_hz_fails_fast() {
        let settings = Settings {
            sim_hz: 0,
            ..Settings::default()
        };
        let result = Session::new(Seed::from("bad"), settings);
        assert!(matches!(result, Err(Error::InvalidConfiguration { .. })));
    }

    #[test]
    fn test_full_tension_is_a_loss() {
        let mut session = session("loss");
        session.run_mut().economy_mut().set_tension(1.0);
        session.run_mut().insert_pattern(0, 10.0, 0.0, 0.9).unwrap();
        session.frame(SIM_DT * 4.0).unwrap();
        assert_eq!(session.phase(), SessionPhase::Lost);

        // Lost sessions take no more steps
        let steps = session.run().step_count();
        assert_eq!(session.frame(1.0).unwrap().steps, 0);
        assert_eq!(session.run().step_count(), steps);
    }

    #[test]
    fn test_losing_frame_reports_only_executed_steps() {
        let mut session = session("short");
        session.run_mut().economy_mut().set_tension(1.0);
        session.run_mut().insert_pattern(0, 10.0, 0.0, 0.99).unwrap();

        let before = session.run().step_count();
        let report = session.frame(SIM_DT * 6.0).unwrap();
        let executed = session.run().step_count() - before;

        assert_eq!(session.phase(), SessionPhase::Lost);
        assert_eq!(u64::from(report.steps), executed);
        assert_eq!(report.steps, 1);
        assert!(report.halted);
    }

    #[test]
    fn test_stop_is_idempotent_and_disposes_patterns() {
        let mut session = session("stop");
        session.run_mut().insert_pattern(0, 0.1, 0.0, 0.5).unwrap();
        session.run_mut().insert_pattern(1, 0.1, 0.0, 0.5).unwrap();
        session.press(1);

        assert_eq!(session.stop().len(), 2);
        assert_eq!(session.phase(), SessionPhase::Stopped);
        assert!(session.stop().is_empty());
        assert!(session.held().is_empty());
        assert_eq!(session.frame(1.0).unwrap().steps, 0);
    }

    #[test]
    fn test_restart_uses_new_seed() {
        let mut session = session("first");
        session.frame(0.5).unwrap();
        session.restart(Seed::from("second")).unwrap();
        assert_eq!(session.phase(), SessionPhase::Running);
        assert_eq!(session.run().seed().as_str(), "second");
        assert_eq!(session.run().step_count(), 0);
    }

    #[test]
    fn test_new_run_discards_continue() {
        let mut session = session("old");
        session.frame(0.5).unwrap();
        session.new_run().unwrap();
        assert_ne!(session.run().seed().as_str(), "old");
        assert!(!session.seeds.has_continue());
        assert_eq!(session.seeds.current(), Some(session.run().seed()));
    }

    #[test]
    fn test_continue_replays_last_seed() {
        let mut session = session("again");
        session.frame(0.5).unwrap();
        session.run_mut().insert_pattern(3, 0.1, 0.0, 0.5).unwrap();
        let (seed, disposed) = session.continue_last().unwrap();
        assert_eq!(seed.as_ref().map(Seed::as_str), Some("again"));
        assert!(disposed.iter().any(|p| p.color_index == 3));
        assert_eq!(session.run().seed().as_str(), "again");
        assert_eq!(session.run().step_count(), 0);
    }

    #[test]
    fn test_continue_after_restart() {
        let mut session = session("once");
        session.restart(Seed::from("fresh")).unwrap();
        // restart discards the parked seed; continuing parks "fresh" again
        let (seed, _) = session.continue_last().unwrap();
        assert_eq!(seed, Some(Seed::from("fresh")));
        assert_eq!(session.run().seed().as_str(), "fresh");
    }

    #[test]
    fn test_continue_without_seed_still_disposes() {
        let mut session = session("gone");
        session.run_mut().insert_pattern(0, 0.1, 0.0, 0.5).unwrap();
        session.run_mut().insert_pattern(1, 0.1, 0.0, 0.5).unwrap();
        session.seeds = SeedSlot::new();

        let (seed, disposed) = session.continue_last().unwrap();
        assert_eq!(seed, None);
        assert_eq!(disposed.len(), 2);
        assert_eq!(session.phase(), SessionPhase::Stopped);
        assert!(session.run().patterns().is_empty());
    }

    #[test]
    fn test_held_zone_reaches_patterns() {
        let mut tuning = crate::tuning::Tuning::default();
        tuning.spawn.rate_constant = 0.0;
        let settings = Settings {
            tuning: Some(tuning),
            ..Settings::default()
        };
        let mut session = Session::new(Seed::from("held"), settings).unwrap();
        session.run_mut().insert_pattern(5, 0.5, 0.0, 0.5).unwrap();
        session.press(5);
        for _ in 0..10 {
            session.frame(0.1).unwrap();
        }

        let events = session.drain_events();
        assert!(events.contains(&GameEvent::PatternStabilized { color_index: 5 }));
    }
}
