//! Bubble Pop headless driver
//!
//! Plays rounds with a seeded auto-aiming bot through the same fixed-timestep
//! loop a windowed host would run, then prints the leaderboard.

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::time::{SystemTime, UNIX_EPOCH};

    use clap::Parser;
    use rand::{Rng, SeedableRng};
    use rand_pcg::Pcg32;

    use bubble_pop::consts::*;
    use bubble_pop::sim::{Round, RoundEvent, RoundState};
    use bubble_pop::{Difficulty, GameConfig, HighScores};

    /// Simulated frame time fed to the accumulator (60 fps host)
    const FRAME_DT: f32 = 1.0 / 60.0;
    /// Frames a single shot may take before the driver gives up on it
    const MAX_FRAMES_PER_SHOT: u32 = 600;

    #[derive(Parser, Debug)]
    #[command(name = "bubble-pop", about = "Play bubble shooter rounds headlessly")]
    struct Args {
        /// Difficulty tier (easy, medium, hard)
        #[arg(short, long, default_value = "easy")]
        difficulty: String,

        /// Round seed (defaults to the current time)
        #[arg(short, long)]
        seed: Option<u64>,

        /// Number of rounds to play
        #[arg(short, long, default_value_t = 3)]
        rounds: u32,

        /// Stop a round after this many shots
        #[arg(long, default_value_t = 200)]
        max_shots: u32,

        /// Load the round config from a JSON file instead of a tier
        #[arg(long)]
        config: Option<std::path::PathBuf>,

        /// Record debug probes and log every contact
        #[arg(long)]
        debug: bool,
    }

    fn now_ms() -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0)
    }

    /// Fixed-timestep host loop state
    struct Driver {
        round: Round,
        accumulator: f32,
        bot: Pcg32,
        debug: bool,
    }

    impl Driver {
        fn new(config: GameConfig, seed: u64, debug: bool) -> Self {
            let mut round = Round::new(config, seed);
            if debug {
                round.toggle_debug();
            }
            Self {
                round,
                accumulator: 0.0,
                bot: Pcg32::seed_from_u64(seed),
                debug,
            }
        }

        /// Run simulation ticks for one host frame
        fn update(&mut self, dt: f32) {
            let dt = dt.min(MAX_TICK_DT);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                self.round.tick(SIM_DT);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }
        }

        /// Aim somewhere in the cone and shoot
        fn take_shot(&mut self) {
            let angle = self
                .bot
                .random_range(MIN_AIM_DEG..=MAX_AIM_DEG)
                .to_radians();
            self.round.set_aim_angle(angle);
            self.round.fire();
        }

        fn play(&mut self, max_shots: u32) -> RoundState {
            while self.round.state() == RoundState::Active && self.round.shots() < max_shots {
                self.take_shot();

                let mut frames = 0;
                while self.round.projectile().is_some() && frames < MAX_FRAMES_PER_SHOT {
                    self.update(FRAME_DT);
                    frames += 1;
                }
                if frames >= MAX_FRAMES_PER_SHOT {
                    log::warn!("Shot {} never landed, abandoning round", self.round.shots());
                    break;
                }

                self.report_events();
            }
            self.round.state()
        }

        fn report_events(&mut self) {
            for event in self.round.drain_events() {
                match event {
                    RoundEvent::ClusterPopped { cells, points, .. } => {
                        log::info!("Popped {} (+{})", cells.len(), points);
                    }
                    RoundEvent::FloatingDropped { cells, points } => {
                        log::info!("Dropped {} (+{})", cells.len(), points);
                    }
                    RoundEvent::ShotWasted { .. } => log::info!("Shot wasted"),
                    other => log::debug!("{:?}", other),
                }
            }
            if self.debug {
                if let Some(probe) = self.round.debug_probe() {
                    log::debug!(
                        "Contact {:?} at {:?} -> {:?}",
                        probe.contact,
                        probe.position,
                        probe.snap
                    );
                }
            }
        }
    }

    fn load_config(args: &Args) -> Result<GameConfig, Box<dyn std::error::Error>> {
        if let Some(path) = &args.config {
            let json = std::fs::read_to_string(path)?;
            return Ok(GameConfig::from_json(&json)?);
        }
        let difficulty = Difficulty::from_str(&args.difficulty)
            .ok_or_else(|| format!("unknown difficulty '{}'", args.difficulty))?;
        Ok(GameConfig::for_difficulty(difficulty))
    }

    pub fn run() -> Result<(), Box<dyn std::error::Error>> {
        env_logger::init();
        let args = Args::parse();
        let config = load_config(&args)?;
        let base_seed = args.seed.unwrap_or_else(now_ms);

        log::info!(
            "Bubble Pop (headless) starting: {} rounds on {}",
            args.rounds,
            config.difficulty.as_str()
        );

        let mut high_scores = HighScores::new();
        for i in 0..args.rounds {
            let seed = base_seed.wrapping_add(i as u64);
            let mut driver = Driver::new(config.clone(), seed, args.debug);
            let outcome = driver.play(args.max_shots);
            let round = &driver.round;

            println!(
                "Round {} (seed {}): {:?} score={} shots={} popped={} dropped={}",
                i + 1,
                round.seed(),
                outcome,
                round.score(),
                round.shots(),
                round.stats().bubbles_popped,
                round.stats().bubbles_dropped
            );

            high_scores.add_score(
                round.score(),
                round.shots(),
                config.difficulty,
                now_ms() as f64,
            );
        }

        println!("\nHigh scores ({}):", config.difficulty.as_str());
        for (rank, entry) in high_scores.board(config.difficulty).enumerate() {
            println!("{:>2}. {:>6}  ({} shots)", rank + 1, entry.score, entry.shots);
        }
        Ok(())
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    if let Err(e) = headless::run() {
        eprintln!("error: {e}");
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // Hosts embed the library directly on the web
}
