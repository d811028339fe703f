//! Headless host for the flocking simulation.
//!
//! Paces frames, applies control messages from a newline-delimited JSON
//! stream between frames, and writes frame snapshots for a renderer.

pub mod control;
pub mod output;
pub mod runner;
pub mod settings;

pub use control::{read_control_stream, spawn_stdin_reader};
pub use output::SnapshotWriter;
pub use runner::{run, Host, RunOptions, RunSummary};
pub use settings::{checked_config, load_settings, to_config};
