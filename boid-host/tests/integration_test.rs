use std::future::pending;

use anyhow::Result;
use boid_core::{CameraPose, FixedClock};
use boid_host::{load_settings, read_control_stream, run, Host, RunOptions, SnapshotWriter};
use boid_shared::{ControlMessage, FrameSnapshot, SettingsUpdate, SimulationSettings};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::mpsc;

const FPS: f32 = 1000.0;

fn host(seed: u64) -> Host<StdRng> {
    Host::new(
        SimulationSettings::default(),
        CameraPose::default(),
        StdRng::seed_from_u64(seed),
    )
}

fn options(frames: u64) -> RunOptions {
    RunOptions {
        max_frames: Some(frames),
        fps: FPS,
    }
}

fn parse_snapshots(bytes: Vec<u8>) -> Vec<FrameSnapshot> {
    String::from_utf8(bytes)
        .unwrap()
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect()
}

/// Queue `lines` on a fresh control channel, the way the stdin reader would
fn control(lines: &str) -> mpsc::UnboundedReceiver<ControlMessage> {
    let (tx, rx) = mpsc::unbounded_channel();
    read_control_stream(lines.as_bytes(), &tx).unwrap();
    rx
}

#[tokio::test]
async fn test_runs_requested_frames() -> Result<()> {
    let mut host = host(1);
    let mut clock = FixedClock::from_fps(60.0);
    let mut writer = SnapshotWriter::new(Vec::new(), 1);
    let mut rx = control("");

    let summary = run(
        &mut host,
        &mut clock,
        &options(20),
        &mut rx,
        Some(&mut writer),
        pending::<()>(),
    )
    .await?;

    assert_eq!(summary.frames, 20);
    assert_eq!(summary.snapshots, 20);

    let snapshots = parse_snapshots(writer.into_inner());
    assert_eq!(snapshots.len(), 20);
    for (i, snapshot) in snapshots.iter().enumerate() {
        assert_eq!(snapshot.frame, i as u64 + 1);
        assert_eq!(snapshot.boids.len(), 10);
        assert_eq!(snapshot.obstacles.len(), 3);
        assert!((snapshot.delta_time - 1.0 / 60.0).abs() < 1e-6);
    }
    Ok(())
}

#[tokio::test]
async fn test_snapshot_every_nth_frame() -> Result<()> {
    let mut host = host(2);
    let mut clock = FixedClock::from_fps(60.0);
    let mut writer = SnapshotWriter::new(Vec::new(), 5);
    let mut rx = control("");

    let summary = run(
        &mut host,
        &mut clock,
        &options(12),
        &mut rx,
        Some(&mut writer),
        pending::<()>(),
    )
    .await?;

    assert_eq!(summary.snapshots, 2);
    let frames: Vec<u64> = parse_snapshots(writer.into_inner())
        .iter()
        .map(|s| s.frame)
        .collect();
    assert_eq!(frames, vec![5, 10]);
    Ok(())
}

#[tokio::test]
async fn test_shutdown_message_stops_before_first_frame() -> Result<()> {
    let mut host = host(3);
    let mut clock = FixedClock::from_fps(60.0);
    let mut rx = control("{\"type\":\"shutdown\"}\n");

    let summary = run::<_, _, Vec<u8>, _>(
        &mut host,
        &mut clock,
        &options(100),
        &mut rx,
        None,
        pending::<()>(),
    )
    .await?;

    assert_eq!(summary.frames, 0);
    assert_eq!(host.simulation().frame(), 0);
    Ok(())
}

#[tokio::test]
async fn test_interrupt_stops_loop() -> Result<()> {
    let mut host = host(4);
    let mut clock = FixedClock::from_fps(60.0);
    let mut rx = control("");

    let summary = run::<_, _, Vec<u8>, _>(
        &mut host,
        &mut clock,
        &RunOptions {
            max_frames: None,
            fps: FPS,
        },
        &mut rx,
        None,
        async {},
    )
    .await?;

    assert_eq!(summary.frames, 0);
    Ok(())
}

#[tokio::test]
async fn test_paused_run_keeps_poses() -> Result<()> {
    let mut host = host(5);
    let mut clock = FixedClock::from_fps(60.0);
    let mut writer = SnapshotWriter::new(Vec::new(), 1);
    let mut rx = control("{\"type\":\"pause\"}\n");

    run(
        &mut host,
        &mut clock,
        &options(5),
        &mut rx,
        Some(&mut writer),
        pending::<()>(),
    )
    .await?;

    let snapshots = parse_snapshots(writer.into_inner());
    assert_eq!(snapshots.len(), 5);
    for snapshot in &snapshots {
        assert_eq!(snapshot.delta_time, 0.0);
        assert_eq!(snapshot.boids, snapshots[0].boids);
    }
    assert!(host.status(0).paused);
    Ok(())
}

#[tokio::test]
async fn test_settings_update_resizes_flock() -> Result<()> {
    let mut host = host(6);
    let mut clock = FixedClock::from_fps(60.0);
    let (tx, mut rx) = mpsc::unbounded_channel();

    let mut settings = SimulationSettings::default();
    settings.boid_count = 25;
    settings.obstacles.count = 0;
    tx.send(ControlMessage::Settings(SettingsUpdate { settings }))?;

    run::<_, _, Vec<u8>, _>(&mut host, &mut clock, &options(3), &mut rx, None, pending::<()>())
        .await?;

    assert_eq!(host.simulation().flock().len(), 25);
    assert_eq!(host.simulation().colliders().obstacle_count(), 0);
    assert_eq!(host.config().boid_count, 25);

    // An invalid update is dropped and the flock keeps its size
    let mut invalid = SimulationSettings::default();
    invalid.boid_count = 5;
    invalid.time_scale = -1.0;
    tx.send(ControlMessage::Settings(SettingsUpdate { settings: invalid }))?;

    run::<_, _, Vec<u8>, _>(&mut host, &mut clock, &options(3), &mut rx, None, pending::<()>())
        .await?;
    assert_eq!(host.simulation().flock().len(), 25);
    Ok(())
}

#[tokio::test]
async fn test_predator_pointer_from_control_stream() -> Result<()> {
    let mut host = host(7);
    let mut clock = FixedClock::from_fps(60.0);
    let mut rx = control("{\"type\":\"pointer\",\"position\":{\"x\":0.0,\"y\":0.0}}\n");

    run::<_, _, Vec<u8>, _>(&mut host, &mut clock, &options(2), &mut rx, None, pending::<()>())
        .await?;

    assert!(host.predator().is_engaged());
    assert!(host.status(60).predator_active);
    for boid in host.simulation().flock().iter() {
        assert!((boid.velocity.magnitude() - 1.0).abs() < 1e-4);
    }
    Ok(())
}

#[tokio::test]
async fn test_rejects_non_positive_fps() {
    let mut host = host(8);
    let mut clock = FixedClock::from_fps(60.0);
    let mut rx = control("");

    let result = run::<_, _, Vec<u8>, _>(
        &mut host,
        &mut clock,
        &RunOptions {
            max_frames: Some(1),
            fps: 0.0,
        },
        &mut rx,
        None,
        pending::<()>(),
    )
    .await;

    assert!(result.is_err());
}

#[test]
fn test_same_seed_same_run() {
    let record = |seed: u64| {
        let mut host = host(seed);
        let mut clock = FixedClock::from_fps(60.0);
        let mut writer = SnapshotWriter::new(Vec::new(), 1);
        let mut rx = control("");
        tokio_test::block_on(run(
            &mut host,
            &mut clock,
            &options(10),
            &mut rx,
            Some(&mut writer),
            pending::<()>(),
        ))
        .unwrap();
        writer.into_inner()
    };

    assert_eq!(record(11), record(11));
    assert_ne!(record(11), record(12));
}

#[test]
fn test_load_settings_file() {
    let dir = std::env::temp_dir();
    let path = dir.join(format!("boid-host-settings-{}.json", std::process::id()));
    std::fs::write(&path, "{\"boid_count\": 42, \"removal\": \"oldest\"}").unwrap();

    let settings = load_settings(&path).unwrap();
    assert_eq!(settings.boid_count, 42);
    assert_eq!(settings.time_scale, 1.0);

    std::fs::write(&path, "{\"boid_count\": 100000}").unwrap();
    let err = load_settings(&path).unwrap_err();
    assert!(format!("{:#}", err).contains("Invalid settings"));

    std::fs::remove_file(&path).unwrap();
    assert!(load_settings(&path).is_err());
}
