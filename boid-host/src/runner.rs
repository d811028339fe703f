//! The host frame loop.
//!
//! Control messages are drained between frames, never during one, so every
//! frame sees a single consistent settings snapshot and pointer state.

use std::future::Future;
use std::io::Write;
use std::time::{Duration, Instant};

use anyhow::{ensure, Result};
use boid_core::{
    CameraPose, Clock, FrameStats, PointerInput, PredatorTarget, Simulation, SimulationConfig,
};
use boid_shared::{ControlMessage, FrameSnapshot, SimulationSettings, StatusResponse};
use rand::Rng;
use tokio::sync::mpsc;
use tokio::time::{self, MissedTickBehavior};

use crate::output::SnapshotWriter;
use crate::settings::{boid_pose, checked_config, obstacle_pose, to_config, to_vec3};

/// Simulation state plus everything the control surface can change.
pub struct Host<R> {
    simulation: Simulation<R>,
    settings: SimulationSettings,
    config: SimulationConfig,
    camera: CameraPose,
    pointer: PointerInput,
    shutdown: bool,
}

impl<R: Rng> Host<R> {
    /// `settings` are expected to be validated already.
    pub fn new(settings: SimulationSettings, camera: CameraPose, rng: R) -> Self {
        let config = to_config(&settings);
        let simulation = Simulation::new(&config, rng);
        Self {
            simulation,
            settings,
            config,
            camera,
            pointer: PointerInput::released(),
            shutdown: false,
        }
    }

    pub fn simulation(&self) -> &Simulation<R> {
        &self.simulation
    }

    pub fn settings(&self) -> &SimulationSettings {
        &self.settings
    }

    pub fn config(&self) -> &SimulationConfig {
        &self.config
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown
    }

    pub fn predator(&self) -> PredatorTarget {
        PredatorTarget::from_pointer(&self.camera, &self.pointer)
    }

    /// Apply one control message. Invalid settings are logged and dropped,
    /// keeping the previous snapshot.
    pub fn handle(&mut self, message: ControlMessage) {
        match message {
            ControlMessage::Settings(update) => match checked_config(&update.settings) {
                Ok(config) => {
                    self.config = config;
                    self.settings = update.settings;
                    log::info!("Settings updated: {} boids", self.settings.boid_count);
                }
                Err(e) => {
                    log::warn!("Ignoring settings update: {:#}", e);
                }
            },
            ControlMessage::Pointer(update) => {
                self.pointer = match update.position {
                    Some(position) => PointerInput::engaged(position.x, position.y),
                    None => PointerInput::released(),
                };
                log::debug!("Pointer: {:?}", update.position);
            }
            ControlMessage::ObstacleVisibility { index, visible } => {
                if !self
                    .simulation
                    .colliders_mut()
                    .set_visible(index, visible)
                {
                    log::warn!("No obstacle at index {}", index);
                }
            }
            ControlMessage::BoundsVisibility { visible } => {
                self.simulation.colliders_mut().set_bounds_visible(visible);
            }
            ControlMessage::Pause => self.simulation.set_active(false),
            ControlMessage::Resume => self.simulation.set_active(true),
            ControlMessage::Shutdown => {
                log::info!("Shutdown requested");
                self.shutdown = true;
            }
        }
    }

    /// Advance one frame with `elapsed` seconds of wall time.
    pub fn frame(&mut self, elapsed: f32) -> FrameStats {
        let predator = self.predator();
        self.simulation.step(&self.config, elapsed, &predator)
    }

    pub fn snapshot(&self, stats: &FrameStats) -> FrameSnapshot {
        FrameSnapshot {
            frame: stats.frame,
            delta_time: stats.delta_time,
            bounds: to_vec3(&self.simulation.colliders().bounds().half_extents),
            bounds_visible: self.simulation.colliders().bounds_visible(),
            boids: self.simulation.boid_poses().map(|p| boid_pose(&p)).collect(),
            obstacles: self
                .simulation
                .obstacle_poses()
                .map(|p| obstacle_pose(&p))
                .collect(),
        }
    }

    pub fn status(&self, fps: u32) -> StatusResponse {
        StatusResponse {
            frame: self.simulation.frame(),
            boid_count: self.simulation.flock().len(),
            obstacle_count: self.simulation.colliders().obstacle_count(),
            fps,
            predator_active: self.pointer.engaged,
            paused: !self.simulation.is_active(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RunOptions {
    /// Stop after this many frames; `None` runs until shutdown.
    pub max_frames: Option<u64>,
    /// Target frame rate for pacing.
    pub fps: f32,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            max_frames: None,
            fps: 60.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RunSummary {
    pub frames: u64,
    pub snapshots: u64,
}

/// Drive `host` until `max_frames`, a shutdown message, or `shutdown` resolves.
pub async fn run<R, C, W, S>(
    host: &mut Host<R>,
    clock: &mut C,
    options: &RunOptions,
    control: &mut mpsc::UnboundedReceiver<ControlMessage>,
    mut output: Option<&mut SnapshotWriter<W>>,
    shutdown: S,
) -> Result<RunSummary>
where
    R: Rng,
    C: Clock + ?Sized,
    W: Write,
    S: Future<Output = ()>,
{
    ensure!(
        options.fps.is_finite() && options.fps > 0.0,
        "Frame rate must be positive, got {}",
        options.fps
    );

    let mut interval = time::interval(Duration::from_secs_f64(1.0 / f64::from(options.fps)));
    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);
    tokio::pin!(shutdown);

    let mut summary = RunSummary::default();
    let mut frame_count = 0u32;
    let mut last_fps_time = Instant::now();

    log::info!("Starting frame loop at {} fps", options.fps);

    loop {
        tokio::select! {
            biased;
            _ = &mut shutdown => {
                log::info!("Interrupted, stopping");
                break;
            }
            _ = interval.tick() => {}
        }

        while let Ok(message) = control.try_recv() {
            host.handle(message);
        }
        if host.shutdown_requested() {
            break;
        }

        let stats = host.frame(clock.delta_seconds());
        summary.frames += 1;
        if stats.resize.spawned > 0 || stats.resize.removed > 0 {
            log::debug!(
                "Frame {}: spawned {}, removed {}",
                stats.frame,
                stats.resize.spawned,
                stats.resize.removed
            );
        }

        if let Some(writer) = output.as_deref_mut() {
            if writer.wants(stats.frame) {
                writer.write(&host.snapshot(&stats))?;
                summary.snapshots += 1;
            }
        }

        frame_count += 1;
        if last_fps_time.elapsed().as_secs() >= 1 {
            let fps = f64::from(frame_count) / last_fps_time.elapsed().as_secs_f64();
            frame_count = 0;
            last_fps_time = Instant::now();
            let status = host.status(fps.round() as u32);
            log::info!("Status: {}", serde_json::to_string(&status)?);
        }

        if options.max_frames.is_some_and(|max| summary.frames >= max) {
            break;
        }
    }

    if let Some(writer) = output {
        writer.flush()?;
    }
    log::info!(
        "Stopped after {} frames ({} snapshots)",
        summary.frames,
        summary.snapshots
    );
    Ok(summary)
}

#[cfg(test)]
mod tests {
    use super::*;
    use boid_shared::{PointerUpdate, Position, SettingsUpdate};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn host() -> Host<StdRng> {
        Host::new(
            SimulationSettings::default(),
            CameraPose::default(),
            StdRng::seed_from_u64(7),
        )
    }

    #[test]
    fn test_invalid_settings_keep_previous() {
        let mut host = host();
        let mut settings = SimulationSettings::default();
        settings.separation.range = 0.0;
        settings.boid_count = 50;

        host.handle(ControlMessage::Settings(SettingsUpdate { settings }));

        assert_eq!(host.settings(), &SimulationSettings::default());
        host.frame(1.0 / 60.0);
        assert_eq!(host.simulation().flock().len(), 10);
    }

    #[test]
    fn test_pointer_engages_predator() {
        let mut host = host();
        assert!(!host.predator().is_engaged());

        host.handle(ControlMessage::Pointer(PointerUpdate {
            position: Some(Position::new(0.2, -0.3)),
        }));
        assert!(host.predator().is_engaged());
        assert!(host.status(60).predator_active);

        host.handle(ControlMessage::Pointer(PointerUpdate { position: None }));
        assert!(!host.predator().is_engaged());
    }

    #[test]
    fn test_pause_resume_and_shutdown() {
        let mut host = host();
        host.handle(ControlMessage::Pause);
        assert!(host.status(0).paused);
        assert!(host.frame(0.1).frozen);

        host.handle(ControlMessage::Resume);
        assert!(!host.frame(0.1).frozen);

        assert!(!host.shutdown_requested());
        host.handle(ControlMessage::Shutdown);
        assert!(host.shutdown_requested());
    }

    #[test]
    fn test_obstacle_visibility() {
        let mut host = host();
        host.handle(ControlMessage::ObstacleVisibility {
            index: 1,
            visible: false,
        });
        let stats = host.frame(1.0 / 60.0);
        let snapshot = host.snapshot(&stats);
        assert_eq!(snapshot.obstacles.len(), 3);
        assert!(snapshot.obstacles[0].visible);
        assert!(!snapshot.obstacles[1].visible);

        // Out of range is ignored
        host.handle(ControlMessage::ObstacleVisibility {
            index: 99,
            visible: false,
        });

        host.handle(ControlMessage::BoundsVisibility { visible: false });
        let stats = host.frame(1.0 / 60.0);
        let snapshot = host.snapshot(&stats);
        assert!(!snapshot.bounds_visible);
        assert_eq!(snapshot.bounds, boid_shared::Vec3::splat(3.0));
    }
}
