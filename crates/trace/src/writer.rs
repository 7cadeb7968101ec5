use std::fs::{File, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};

use agentrt_domain::{Error, Result};

use crate::event::{StepRecord, TraceEvent};
use crate::manifest::Manifest;

/// Owns the three trace artifacts for one run: `events.jsonl` and
/// `steps.jsonl` are opened in append mode and grow one line at a time;
/// `manifest.json` is written exactly once, at [`TraceWriter::finalize`].
pub struct TraceWriter {
    dir: PathBuf,
    events_file: File,
    steps_file: File,
    finalized: bool,
}

impl TraceWriter {
    pub fn open(dir: impl AsRef<Path>) -> Result<Self> {
        let dir = dir.as_ref().to_path_buf();
        std::fs::create_dir_all(&dir)?;
        let events_file = OpenOptions::new().create(true).append(true).open(dir.join("events.jsonl"))?;
        let steps_file = OpenOptions::new().create(true).append(true).open(dir.join("steps.jsonl"))?;
        tracing::debug!(dir = %dir.display(), "trace writer opened");
        Ok(Self { dir, events_file, steps_file, finalized: false })
    }

    pub fn append_event(&mut self, event: &TraceEvent) -> Result<()> {
        write_line(&mut self.events_file, event)
    }

    pub fn append_step(&mut self, record: &StepRecord) -> Result<()> {
        write_line(&mut self.steps_file, record)
    }

    /// Writes `manifest.json`. Calling this a second time is a
    /// programmer error — a trace is finalized exactly once.
    pub fn finalize(&mut self, manifest: &Manifest) -> Result<()> {
        if self.finalized {
            return Err(Error::Other("trace already finalized".into()));
        }
        let path = self.dir.join("manifest.json");
        let json = serde_json::to_string_pretty(manifest)?;
        std::fs::write(path, json)?;
        self.finalized = true;
        tracing::info!(run_id = %manifest.run_id, status = ?manifest.status, "trace finalized");
        Ok(())
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

fn write_line<T: serde::Serialize>(file: &mut File, value: &T) -> Result<()> {
    let mut line = serde_json::to_string(value)?;
    line.push('\n');
    file.write_all(line.as_bytes())?;
    Ok(())
}
