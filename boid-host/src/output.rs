//! JSON-lines sink for frame snapshots.

use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

use anyhow::{Context, Result};
use boid_shared::FrameSnapshot;

pub struct SnapshotWriter<W: Write> {
    out: W,
    every: u64,
    written: u64,
}

impl SnapshotWriter<Box<dyn Write + Send>> {
    /// Open `target` for writing; `-` means stdout.
    pub fn open(target: &str, every: u64) -> Result<Self> {
        let out: Box<dyn Write + Send> = if target == "-" {
            Box::new(BufWriter::new(io::stdout()))
        } else {
            let path = Path::new(target);
            let file = File::create(path)
                .with_context(|| format!("Failed to create snapshot file {}", path.display()))?;
            Box::new(BufWriter::new(file))
        };
        log::info!("Writing snapshots to {} every {} frame(s)", target, every.max(1));
        Ok(Self::new(out, every))
    }
}

impl<W: Write> SnapshotWriter<W> {
    pub fn new(out: W, every: u64) -> Self {
        Self {
            out,
            every: every.max(1),
            written: 0,
        }
    }

    /// Whether frame number `frame` should be recorded.
    pub fn wants(&self, frame: u64) -> bool {
        frame % self.every == 0
    }

    pub fn write(&mut self, snapshot: &FrameSnapshot) -> Result<()> {
        let line = snapshot
            .to_json_line()
            .context("Failed to encode snapshot")?;
        writeln!(self.out, "{}", line).context("Failed to write snapshot")?;
        self.written += 1;
        Ok(())
    }

    pub fn written(&self) -> u64 {
        self.written
    }

    pub fn flush(&mut self) -> Result<()> {
        self.out.flush().context("Failed to flush snapshots")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
