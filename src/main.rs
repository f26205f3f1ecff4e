//! Fracture entry point
//!
//! Headless driver: plays one run with the autoplay controller on a varied
//! frame clock, then records the result on the local leaderboard.
//!
//! Usage: `fracture [SEED] [--preset relaxed|standard|intense] [--seconds N]`

#[cfg(not(target_arch = "wasm32"))]
mod native {
    use std::cell::Cell;
    use std::path::Path;
    use std::rc::Rc;

    use clap::Parser;
    use fracture::sim::{Autoplay, GameEvent, Seed};
    use fracture::{DifficultyPreset, HighScores, Session, SessionPhase, Settings};

    const SETTINGS_FILE: &str = "fracture_settings.json";
    const HIGHSCORES_FILE: &str = "fracture_highscores.json";
    const KEYCAP_ZONES: usize = 6;

    /// Frame deltas cycled by the driver, roughly 40 to 144 fps
    const FRAME_DELTAS: [f64; 5] = [1.0 / 60.0, 1.0 / 144.0, 1.0 / 40.0, 1.0 / 90.0, 1.0 / 60.0];

    /// Headless autoplay run
    #[derive(Parser, Debug)]
    #[command(name = "fracture")]
    #[command(about = "Play one autoplay run and record it on the local leaderboard")]
    pub struct Args {
        /// Run seed (a fresh one is generated when omitted)
        pub seed: Option<String>,

        /// Difficulty preset, overriding the saved settings
        #[arg(long, value_parser = parse_preset)]
        pub preset: Option<DifficultyPreset>,

        /// Simulated seconds to play before stopping
        #[arg(long, default_value_t = 300.0, value_parser = parse_seconds)]
        pub seconds: f64,
    }

    fn parse_preset(s: &str) -> Result<DifficultyPreset, String> {
        DifficultyPreset::from_str(s)
            .ok_or_else(|| format!("unknown preset `{}` (relaxed, standard, intense)", s))
    }

    fn parse_seconds(s: &str) -> Result<f64, String> {
        match s.parse::<f64>() {
            Ok(seconds) if seconds.is_finite() && seconds > 0.0 => Ok(seconds),
            Ok(_) => Err(format!("`{}` must be a positive number of seconds", s)),
            Err(e) => Err(e.to_string()),
        }
    }

    pub fn run(args: Args) -> fracture::Result<()> {
        let mut settings = Settings::load(Path::new(SETTINGS_FILE));
        if let Some(preset) = args.preset {
            settings.preset = preset;
        }
        let seed = args.seed.map(Seed::new).unwrap_or_else(Seed::generate);
        log::info!("Fracture (native) starting with seed: {}", seed.as_str());

        let mut session = Session::new(seed, settings)?;
        for portrait in session.run().keycap_portraits(KEYCAP_ZONES) {
            log::debug!("Keycap {:?}", portrait);
        }

        let spawned = Rc::new(Cell::new(0u32));
        {
            let spawned = spawned.clone();
            session.subscribe(move |event| {
                if let GameEvent::PatternSpawned { .. } = event {
                    spawned.set(spawned.get() + 1);
                }
            });
        }

        let autoplay = Autoplay::default();
        let mut clock = 0.0;
        let mut frame = 0usize;
        while clock < args.seconds && session.phase() == SessionPhase::Running {
            let held = autoplay.choose(session.run().patterns());
            session.set_held(held);

            let delta = FRAME_DELTAS[frame % FRAME_DELTAS.len()];
            let report = session.frame(delta)?;
            if report.capped {
                log::warn!("Frame {} hit the catch-up cap", frame);
            }

            for event in session.drain_events() {
                if let GameEvent::LevelAdvanced { level } = event {
                    println!("  level {} at {:.1}s", level, session.snapshot().elapsed_seconds);
                }
            }
            clock += delta;
            frame += 1;
        }

        let snapshot = session.snapshot();
        let stabilized = session.run().tension().stabilized_count();
        let escaped = session.run().tension().escaped_count();
        let record = session.record();
        let outcome = match session.phase() {
            SessionPhase::Lost => "lost",
            _ => "survived",
        };
        session.stop();

        println!(
            "Run {} ({}): level {}, peak coherence {:.0}, {} spawned, {} stabilized, {} escaped",
            record.seed.as_str(),
            outcome,
            snapshot.level,
            snapshot.peak_coherence,
            spawned.get(),
            stabilized,
            escaped
        );

        let path = Path::new(HIGHSCORES_FILE);
        let mut scores = HighScores::load(path);
        if let Some(rank) = scores.add_record(record) {
            println!("New high score, rank #{}", rank);
            if let Err(e) = scores.save(path) {
                log::error!("Failed to save high scores: {}", e);
            }
        }
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    let args = native::Args::parse();
    env_logger::init();
    if let Err(e) = native::run(args) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // The library is embedded by a host page; there is no wasm entry point here
}
