use std::path::Path;

use agentrt_domain::{Error, Result};

use crate::event::{StepRecord, TraceEvent};
use crate::manifest::Manifest;

/// Validates an already-written trace directory against the three file
/// shapes. Unknown keys are fine (trace readers ignore them); a missing
/// required field is a schema violation.
pub fn validate_trace_dir(dir: impl AsRef<Path>) -> Result<()> {
    let dir = dir.as_ref();
    validate_events_file(&dir.join("events.jsonl"))?;
    validate_steps_file(&dir.join("steps.jsonl"))?;
    validate_manifest_file(&dir.join("manifest.json"))?;
    Ok(())
}

fn validate_events_file(path: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(path)?;
    for (i, line) in contents.lines().enumerate() {
        serde_json::from_str::<TraceEvent>(line).map_err(|e| Error::Other(format!("events.jsonl line {}: {e}", i + 1)))?;
    }
    Ok(())
}

fn validate_steps_file(path: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(path)?;
    for (i, line) in contents.lines().enumerate() {
        serde_json::from_str::<StepRecord>(line).map_err(|e| Error::Other(format!("steps.jsonl line {}: {e}", i + 1)))?;
    }
    Ok(())
}

fn validate_manifest_file(path: &Path) -> Result<()> {
    let contents = std::fs::read_to_string(path)?;
    serde_json::from_str::<Manifest>(&contents).map_err(|e| Error::Other(format!("manifest.json: {e}")))?;
    Ok(())
}
