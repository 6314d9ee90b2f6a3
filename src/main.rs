#![warn(clippy::all)]

use std::{
    sync::{Arc, Weak},
    time::{Duration, Instant},
};

use anyhow::{Context, Result};
use clap::Parser;
use conway_engine::{
    Config, ControllerConfig, ConwayStep, Grid, LifeEvent, PollLimiter, SimulationController,
};
use tracing::{debug, info, warn};

#[derive(Parser, Debug)]
#[command(
    name = "conway_engine",
    version,
    about = "Run Conway's Game of Life headlessly on a bounded field"
)]
struct Cli {
    /// Field width in cells.
    #[arg(long, default_value_t = Config::DEFAULT_WIDTH)]
    width: usize,
    /// Field height in cells.
    #[arg(long, default_value_t = Config::DEFAULT_HEIGHT)]
    height: usize,
    /// Seed of the initial random fill; a random seed is used when omitted.
    #[arg(long)]
    seed: Option<u64>,
    /// Probability of a cell being alive initially.
    #[arg(long, default_value_t = Config::DEFAULT_FILL_RATE)]
    fill_rate: f64,
    /// Pause between generations in milliseconds.
    #[arg(long, default_value_t = Config::GENERATION_DELAY.as_millis() as u64)]
    delay_ms: u64,
    /// Stop after this many generations.
    #[arg(long, default_value_t = 100)]
    generations: u64,
    /// How often the foreground reads the published generation.
    #[arg(long, default_value_t = Config::MAX_POLL_HZ)]
    poll_hz: f64,
}

fn main() -> Result<()> {
    init_tracing();
    let cli = Cli::parse();

    let grid = Grid::random(cli.width, cli.height, cli.seed, cli.fill_rate)
        .context("failed to build the initial field")?;
    println!("{grid}");

    let config =
        ControllerConfig::default().with_generation_delay(Duration::from_millis(cli.delay_ms));
    let controller = Arc::new(SimulationController::new(ConwayStep, config));
    controller.set_current(Some(grid))?;

    let target = cli.generations;
    let weak: Weak<SimulationController> = Arc::downgrade(&controller);
    controller.subscribe(move |event| match event {
        LifeEvent::Advanced { generation, .. } if *generation >= target => {
            if let Some(controller) = weak.upgrade() {
                let _ = controller.stop();
            }
        }
        LifeEvent::Faulted { message } => warn!(reason = %message, "simulation faulted"),
        _ => {}
    });

    let timer = Instant::now();
    if target > 0 && !controller.start() {
        warn!("nothing to simulate on an empty field");
    }

    let mut limiter = PollLimiter::new(cli.poll_hz);
    while controller.is_running() {
        limiter.wait();
        let snapshot = controller.snapshot();
        let advanced = limiter.record(snapshot.number());
        if let Some(current) = snapshot.current() {
            debug!(
                generation = snapshot.number(),
                advanced,
                population = current.population(),
                generation_rate = limiter.generation_rate(),
                "poll"
            );
        }
    }
    controller.stop().context("simulation ended with an error")?;

    let snapshot = controller.snapshot();
    info!(
        generations = snapshot.number(),
        generation_rate = limiter.generation_rate(),
        elapsed = ?timer.elapsed(),
        "simulation finished"
    );
    if let Some(current) = snapshot.current() {
        println!("{current}");
        println!(
            "generation {}, population {}",
            snapshot.number(),
            current.population()
        );
    }
    Ok(())
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .try_init();
}
