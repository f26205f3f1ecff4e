//! Fixed timestep simulation tick
//!
//! One call advances a run by exactly one step, always in this order:
//! 1. time and level
//! 2. tension/coherence decay
//! 3. spawn roll
//! 4. pattern update and resolution
//!
//! Spawning before the update means a new pattern does not move until the
//! next step. Reordering these changes every seed's outcome.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use super::events::GameEvent;
use super::factory::spawn_pattern_template;
use super::level::{advance_level, difficulty_multiplier};
use super::pattern::Resolution;
use super::state::RunContext;

/// Input zones (palette indices) currently pressed.
///
/// Snapshotted once per step; ordered so iteration is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HeldZones(BTreeSet<u8>);

impl HeldZones {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns true if the zone was not already held
    pub fn press(&mut self, zone: u8) -> bool {
        self.0.insert(zone)
    }

    /// Returns true if the zone was held
    pub fn release(&mut self, zone: u8) -> bool {
        self.0.remove(&zone)
    }

    pub fn is_held(&self, zone: u8) -> bool {
        self.0.contains(&zone)
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn iter(&self) -> impl Iterator<Item = u8> + '_ {
        self.0.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl FromIterator<u8> for HeldZones {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Advance the run by one fixed timestep
pub fn tick(run: &mut RunContext, held: &HeldZones, dt: f64) {
    run.step_count += 1;

    // Time and level
    run.tension.add_time(dt);
    if let Some(level) = advance_level(&mut run.tension, &run.tuning.level) {
        log::info!(
            "Level {} reached at {:.1}s (coherence {:.0})",
            level,
            run.tension.elapsed_seconds(),
            run.tension.coherence()
        );
        run.events.emit(GameEvent::LevelAdvanced { level });
    }

    // Decay
    run.tension.decay_tension(dt);
    run.tension.decay_coherence(dt);

    // Spawn roll
    let difficulty = difficulty_multiplier(&run.tuning.level, run.tension.level());
    let movable = run.field.len();
    let spawn = run.field.roll_spawn(
        run.spawn_policy,
        &run.tuning.spawn,
        run.tension.tension(),
        difficulty,
        dt,
        &mut run.rng,
    );
    if spawn {
        let template = spawn_pattern_template(&mut run.rng);
        let pattern = run
            .field
            .spawn(&template, run.tuning.patterns.speed_scale * difficulty);
        log::debug!(
            "Pattern {} spawned (zone {}, speed {:.2}, {:?})",
            pattern.id,
            pattern.color_index,
            pattern.speed,
            pattern.behavior
        );
        let event = GameEvent::PatternSpawned {
            id: pattern.id,
            color_index: pattern.color_index,
            angle: pattern.angle,
        };
        run.events.emit(event);
    }

    // Pattern update
    let resolved = run
        .field
        .advance(held, dt, run.tuning.patterns.pull_back_rate, movable);
    for r in resolved {
        match r.outcome {
            Resolution::Escaped => {
                run.tension.apply_escape();
                log::debug!(
                    "Pattern {} escaped, tension {:.2}",
                    r.pattern.id,
                    run.tension.tension()
                );
                run.events.emit(GameEvent::PatternEscaped {
                    color_index: r.pattern.color_index,
                    angle: r.pattern.angle,
                });
            }
            Resolution::Stabilized => {
                run.tension.apply_stabilize();
                log::debug!(
                    "Pattern {} stabilized, coherence {:.0}",
                    r.pattern.id,
                    run.tension.coherence()
                );
                run.events.emit(GameEvent::PatternStabilized {
                    color_index: r.pattern.color_index,
                });
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::pattern::SpawnPolicy;
    use crate::sim::rng::Seed;
    use crate::tuning::Tuning;
    use std::cell::RefCell;
    use std::rc::Rc;

    fn quiet_tuning() -> Tuning {
        // No spawns, no decay: only scripted patterns move
        let mut tuning = Tuning::default();
        tuning.spawn.rate_constant = 0.0;
        tuning.economy.tension_decay_per_second = 0.0;
        tuning.economy.coherence_decay_per_second = 0.0;
        tuning
    }

    #[test]
    fn test_escape_emits_one_event_and_penalty() {
        let mut run =
            RunContext::new(Seed::from("escape"), quiet_tuning(), SpawnPolicy::PerStepRoll)
                .unwrap();
        run.economy_mut().set_tension(0.0);
        run.insert_pattern(3, 5.0, 0.75, 0.0).unwrap();

        let held = HeldZones::new();
        for _ in 0..60 {
            tick(&mut run, &held, SIM_DT);
        }

        let escapes: Vec<_> = run
            .drain_events()
            .into_iter()
            .filter(|e| matches!(e, GameEvent::PatternEscaped { .. }))
            .collect();
        assert_eq!(
            escapes,
            vec![GameEvent::PatternEscaped { color_index: 3, angle: 0.75 }]
        );
        assert_eq!(run.tension().tension(), 0.25);
        assert!(run.patterns().is_empty());
    }

    #[test]
    fn test_held_zone_stabilizes_before_escape() {
        let mut run =
            RunContext::new(Seed::from("hold"), quiet_tuning(), SpawnPolicy::PerStepRoll)
                .unwrap();
        run.economy_mut().set_tension(0.5);
        run.insert_pattern(1, 1.0, 0.0, 0.6).unwrap();

        let held = HeldZones::from_iter([1]);
        for _ in 0..120 {
            tick(&mut run, &held, SIM_DT);
        }

        let events = run.drain_events();
        assert_eq!(events, vec![GameEvent::PatternStabilized { color_index: 1 }]);
        assert_eq!(run.tension().coherence(), 3.0);
        assert!((run.tension().tension() - 0.42).abs() < 1e-12);
    }

    #[test]
    fn test_calm_core_spawns_nothing() {
        let mut tuning = Tuning::default();
        tuning.initial_tension = 0.0;
        let mut run =
            RunContext::new(Seed::from("calm"), tuning, SpawnPolicy::PerStepRoll).unwrap();

        for _ in 0..600 {
            tick(&mut run, &HeldZones::new(), SIM_DT);
        }
        assert!(run.patterns().is_empty());
        assert!(run.drain_events().is_empty());
    }

    #[test]
    fn test_listener_sees_spawns() {
        let mut tuning = Tuning::default();
        tuning.initial_tension = 1.0;
        let mut run =
            RunContext::new(Seed::from("listen"), tuning, SpawnPolicy::PerStepRoll).unwrap();

        let spawned = Rc::new(RefCell::new(Vec::new()));
        let sink = spawned.clone();
        run.subscribe(move |e| {
            if let GameEvent::PatternSpawned { id, .. } = e {
                sink.borrow_mut().push(*id);
            }
        });

        for _ in 0..120 {
            tick(&mut run, &HeldZones::new(), SIM_DT);
        }

        let ids = spawned.borrow();
        assert!(!ids.is_empty());
        assert!(ids.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn test_spawned_pattern_does_not_move_on_spawn_step() {
        let mut tuning = Tuning::default();
        tuning.initial_tension = 1.0;
        let mut run =
            RunContext::new(Seed::from("fresh"), tuning, SpawnPolicy::PerStepRoll).unwrap();

        for _ in 0..600 {
            tick(&mut run, &HeldZones::new(), SIM_DT);
            for event in run.drain_events() {
                if let GameEvent::PatternSpawned { id, .. } = event {
                    let pattern = run.patterns().iter().find(|p| p.id == id).unwrap();
                    assert_eq!(pattern.progress, 0.0);
                    return;
                }
            }
        }
        panic!("no spawn in 10 seconds at full tension");
    }

    #[test]
    fn test_level_advances_during_long_calm_run() {
        let mut run =
            RunContext::new(Seed::from("calm"), quiet_tuning(), SpawnPolicy::PerStepRoll)
                .unwrap();
        for _ in 0..(60 * 60) {
            tick(&mut run, &HeldZones::new(), SIM_DT);
        }
        assert!(run.tension().level() > 1);
        assert!(
            run.drain_events()
                .iter()
                .any(|e| matches!(e, GameEvent::LevelAdvanced { level: 2 }))
        );
    }

    #[test]
    fn test_held_zones_set_semantics() {
        let mut held = HeldZones::new();
        assert!(held.press(2));
        assert!(!held.press(2));
        assert!(held.is_held(2));
        assert!(held.release(2));
        assert!(!held.release(2));
        assert!(held.is_empty());
    }
}
