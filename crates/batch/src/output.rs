use std::collections::HashSet;
use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use parking_lot::Mutex;

use crate::error::Result;
use crate::row::BatchRow;
use crate::work::WorkItem;

/// Serializes all row appends behind one lock, held only for the
/// duration of a single write-plus-newline, so two completing jobs can
/// never interleave their lines.
pub struct OutputWriter {
    file: Mutex<File>,
}

impl OutputWriter {
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        Ok(Self { file: Mutex::new(file) })
    }

    pub fn append(&self, row: &BatchRow) -> Result<()> {
        let mut line = serde_json::to_string(row)?;
        line.push('\n');
        let mut file = self.file.lock();
        file.write_all(line.as_bytes())?;
        Ok(())
    }
}

/// Reads an existing output file (if any) and returns the `(trial,
/// task_index)` keys already recorded, so a resumed run can skip them.
/// A malformed line is skipped rather than failing the whole resume
/// scan — partial writes from a prior crash should not block restart.
pub fn completed_work_items(path: impl AsRef<Path>) -> HashSet<WorkItem> {
    read_rows(path).into_iter().map(|row| WorkItem { trial: row.trial, task_index: row.idx }).collect()
}

/// Reads every well-formed row already recorded in the output file.
pub fn read_rows(path: impl AsRef<Path>) -> Vec<BatchRow> {
    let Ok(file) = File::open(path) else {
        return Vec::new();
    };
    BufReader::new(file)
        .lines()
        .map_while(|l| l.ok())
        .filter_map(|line| serde_json::from_str::<BatchRow>(&line).ok())
        .collect()
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use super::*;

    fn sample_row(trial: u64, idx: usize) -> BatchRow {
        BatchRow {
            task_id: format!("t{idx}"),
            idx,
            trial,
            benchmark: "bench".into(),
            split: "test".into(),
            reward: 1.0,
            success: true,
            eval_score: 1.0,
            eval_details: serde_json::json!({}),
            stop_reason: "final_answer".into(),
            steps: 1,
            error: None,
            started_at: Utc::now(),
            ended_at: Utc::now(),
            latency_seconds: 0.1,
        }
    }

    #[test]
    fn appended_rows_round_trip_as_completed_items() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("out.jsonl");
        let writer = OutputWriter::open(&path).unwrap();
        writer.append(&sample_row(0, 0)).unwrap();
        writer.append(&sample_row(0, 1)).unwrap();

        let completed = completed_work_items(&path);
        assert_eq!(completed.len(), 2);
        assert!(completed.contains(&WorkItem { trial: 0, task_index: 1 }));
    }

    #[test]
    fn missing_file_yields_an_empty_resume_set() {
        let completed = completed_work_items("/nonexistent/path/out.jsonl");
        assert!(completed.is_empty());
    }
}
