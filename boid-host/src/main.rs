use std::path::PathBuf;

use anyhow::{Context, Result};
use boid_core::{CameraPose, Clock, FixedClock, SystemClock, Vector3D};
use boid_host::settings::parse_point;
use boid_host::{load_settings, run, spawn_stdin_reader, Host, RunOptions, SnapshotWriter};
use boid_shared::SimulationSettings;
use clap::Parser;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

#[derive(Parser, Debug)]
#[command(author, version, about = "Headless boid flocking simulation", long_about = None)]
struct Args {
    /// JSON settings file; defaults are used when omitted
    #[arg(short, long)]
    settings: Option<PathBuf>,

    /// Number of frames to run (0 runs until Ctrl-C or a shutdown message)
    #[arg(short, long, default_value_t = 0)]
    frames: u64,

    /// Target frame rate
    #[arg(long, default_value_t = 60.0)]
    fps: f32,

    /// Advance by exactly 1/fps per frame instead of measured wall time
    #[arg(long)]
    fixed_step: bool,

    /// Seed for reproducible runs
    #[arg(long)]
    seed: Option<u64>,

    /// Write frame snapshots as JSON lines to this file ('-' for stdout)
    #[arg(long)]
    snapshots: Option<String>,

    /// Only write every Nth frame's snapshot
    #[arg(long, default_value_t = 1)]
    snapshot_every: u64,

    /// Camera position as x,y,z; the camera looks at the origin
    #[arg(long, value_parser = parse_point, default_value = "1,1,1")]
    camera: Vector3D,

    /// Enable debug logging
    #[arg(short, long)]
    debug: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    // Logs go to stderr so stdout stays free for snapshots
    if args.debug {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Debug)
            .init();
    } else {
        env_logger::Builder::from_default_env()
            .filter_level(log::LevelFilter::Info)
            .init();
    }

    log::info!("Boid host starting...");

    let settings = match &args.settings {
        Some(path) => load_settings(path)?,
        None => SimulationSettings::default(),
    };
    let rng = match args.seed {
        Some(seed) => {
            log::info!("Seed: {}", seed);
            StdRng::seed_from_u64(seed)
        }
        None => StdRng::from_entropy(),
    };
    let camera = CameraPose {
        position: args.camera,
        ..CameraPose::default()
    };

    let mut host = Host::new(settings, camera, rng);
    let mut clock: Box<dyn Clock> = if args.fixed_step {
        Box::new(FixedClock::from_fps(args.fps))
    } else {
        Box::new(SystemClock::new())
    };
    let mut output = args
        .snapshots
        .as_deref()
        .map(|target| SnapshotWriter::open(target, args.snapshot_every))
        .transpose()?;

    let (tx, mut rx) = mpsc::unbounded_channel();
    spawn_stdin_reader(tx)?;

    let options = RunOptions {
        max_frames: (args.frames > 0).then_some(args.frames),
        fps: args.fps,
    };
    let interrupted = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            log::warn!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    let summary = run(
        &mut host,
        clock.as_mut(),
        &options,
        &mut rx,
        output.as_mut(),
        interrupted,
    )
    .await
    .context("Simulation error")?;

    log::info!("Done: {} frames", summary.frames);
    Ok(())
}
