//! Fixed-step scheduler
//!
//! Converts variable render-frame deltas into a whole number of constant
//! simulation steps. Leftover time carries over to the next frame; after a
//! stall (tab backgrounded, debugger pause) the carried debt is capped so the
//! simulation never tries to catch up unboundedly.

use std::ops::ControlFlow;

use crate::error::{Error, Result, require_positive};

/// Time carried between frames
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Accumulator {
    remainder: f64,
}

impl Accumulator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Unsimulated time carried into the next frame
    pub fn remainder(&self) -> f64 {
        self.remainder
    }

    pub fn reset(&mut self) {
        self.remainder = 0.0;
    }
}

/// What a single `advance` call did
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StepReport {
    /// Fixed steps executed this frame
    pub steps: u32,
    /// True when the per-frame cap cut the loop short
    pub capped: bool,
    /// True when the step callback asked to stop early
    pub halted: bool,
}

/// Advance `accumulator` by `delta_seconds`, running `on_step(step_seconds)`
/// once per whole step, at most `max_steps_per_frame` times.
///
/// `step_seconds` must be finite and positive and `max_steps_per_frame` at
/// least one; both are checked before anything is accumulated.
pub fn advance<F: FnMut(f64)>(
    accumulator: &mut Accumulator,
    delta_seconds: f64,
    step_seconds: f64,
    max_steps_per_frame: u32,
    mut on_step: F,
) -> Result<StepReport> {
    advance_until(
        accumulator,
        delta_seconds,
        step_seconds,
        max_steps_per_frame,
        |dt| {
            on_step(dt);
            ControlFlow::Continue(())
        },
    )
}

/// Like [`advance`], but `on_step` may return `Break` after its step to end
/// the frame early. Only steps that actually ran are counted; time for the
/// skipped steps stays in the accumulator.
pub fn advance_until<F: FnMut(f64) -> ControlFlow<()>>(
    accumulator: &mut Accumulator,
    delta_seconds: f64,
    step_seconds: f64,
    max_steps_per_frame: u32,
    mut on_step: F,
) -> Result<StepReport> {
    require_positive("step_seconds", step_seconds)?;
    if max_steps_per_frame == 0 {
        return Err(Error::invalid(
            "max_steps_per_frame",
            max_steps_per_frame,
            "must be at least 1",
        ));
    }

    let delta = if delta_seconds.is_finite() && delta_seconds >= 0.0 {
        delta_seconds
    } else {
        log::warn!("Ignoring bad frame delta: {}", delta_seconds);
        0.0
    };

    accumulator.remainder += delta;

    let mut steps = 0;
    let mut halted = false;
    while accumulator.remainder >= step_seconds && steps < max_steps_per_frame {
        let flow = on_step(step_seconds);
        accumulator.remainder -= step_seconds;
        steps += 1;
        if flow.is_break() {
            halted = true;
            break;
        }
    }

    let capped = !halted && steps == max_steps_per_frame;
    if capped {
        let max_debt = step_seconds * max_steps_per_frame as f64;
        if accumulator.remainder > max_debt {
            log::debug!(
                "Frame cap hit, dropping {:.3}s of catch-up",
                accumulator.remainder - max_debt
            );
            accumulator.remainder = max_debt;
        }
    }

    Ok(StepReport {
        steps,
        capped,
        halted,
    })
}

/// Scheduler with an explicit start/stop lifecycle
///
/// A stopped scheduler runs no steps and carries no time, so a host can stop
/// it from any exit path (including after an error) as often as it likes.
#[derive(Debug, Clone)]
pub struct FixedStepScheduler {
    accumulator: Accumulator,
    step_seconds: f64,
    max_steps_per_frame: u32,
    running: bool,
}

impl FixedStepScheduler {
    /// Build a stopped scheduler. Configuration is validated here as well as
    /// on every `advance`.
    pub fn new(step_seconds: f64, max_steps_per_frame: u32) -> Result<Self> {
        require_positive("step_seconds", step_seconds)?;
        if max_steps_per_frame == 0 {
            return Err(Error::invalid(
                "max_steps_per_frame",
                max_steps_per_frame,
                "must be at least 1",
            ));
        }
        Ok(Self {
            accumulator: Accumulator::new(),
            step_seconds,
            max_steps_per_frame,
            running: false,
        })
    }

    pub fn from_hz(hz: u32, max_steps_per_frame: u32) -> Result<Self> {
        if hz == 0 {
            return Err(Error::invalid("sim_hz", hz, "must be at least 1"));
        }
        Self::new(1.0 / f64::from(hz), max_steps_per_frame)
    }

    pub fn start(&mut self) {
        if !self.running {
            self.accumulator.reset();
            self.running = true;
        }
    }

    /// Stop stepping. Idempotent.
    pub fn stop(&mut self) {
        self.running = false;
        self.accumulator.reset();
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn step_seconds(&self) -> f64 {
        self.step_seconds
    }

    /// Feed one render frame's delta
    pub fn advance<F: FnMut(f64)>(&mut self, delta_seconds: f64, on_step: F) -> Result<StepReport> {
        if !self.running {
            return Ok(StepReport::default());
        }
        advance(
            &mut self.accumulator,
            delta_seconds,
            self.step_seconds,
            self.max_steps_per_frame,
            on_step,
        )
    }

    /// Feed one render frame's delta; `on_step` may end the frame early
    pub fn advance_until<F: FnMut(f64) -> ControlFlow<()>>(
        &mut self,
        delta_seconds: f64,
        on_step: F,
    ) -> Result<StepReport> {
        if !self.running {
            return Ok(StepReport::default());
        }
        advance_until(
            &mut self.accumulator,
            delta_seconds,
            self.step_seconds,
            self.max_steps_per_frame,
            on_step,
        )
    }

    /// Fraction of a step carried over, for render interpolation (0..1)
    pub fn alpha(&self) -> f64 {
        (self.accumulator.remainder() / self.step_seconds).min(1.0)
    }
}
