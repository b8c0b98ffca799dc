//! Run persistence: a JSONL transcript of every applied stream record plus a
//! pretty-JSON summary of the final view model, both under the data dir.

use std::path::PathBuf;
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use serde_json::value::RawValue;
use uuid::Uuid;

use crate::error::StreamError;
use crate::model::ViewModel;

#[derive(Serialize)]
struct TranscriptEntry<'a> {
    ts: String,
    run_id: &'a str,
    seq: u64,
    /// The record exactly as received, not re-serialized.
    record: &'a RawValue,
}

#[derive(Serialize)]
struct RunSummary<'a> {
    run_id: &'a str,
    symbol: &'a str,
    saved_at: String,
    model: &'a ViewModel,
}

/// Per-run reporter. Each run gets a fresh id; the transcript appends as
/// events arrive and the summary is written once at the end.
#[derive(Clone)]
pub struct RunReporter {
    dir: PathBuf,
    run_id: String,
    seq: Arc<Mutex<u64>>,
}

impl RunReporter {
    pub fn new(dir: PathBuf) -> Self {
        Self {
            dir,
            run_id: Uuid::new_v4().to_string(),
            seq: Arc::new(Mutex::new(0)),
        }
    }

    pub fn run_id(&self) -> &str {
        &self.run_id
    }

    pub fn transcript_path(&self) -> PathBuf {
        self.dir.join(format!("run_{}.jsonl", self.run_id))
    }

    /// Append one raw stream record to the transcript.
    pub fn append(&self, raw: &str) -> Result<(), StreamError> {
        use std::io::Write;

        let record: &RawValue = serde_json::from_str(raw)?;
        let seq = {
            let mut seq = self.seq.lock().unwrap();
            *seq += 1;
            *seq
        };
        let entry = TranscriptEntry {
            ts: Utc::now().to_rfc3339(),
            run_id: &self.run_id,
            seq,
            record,
        };

        std::fs::create_dir_all(&self.dir)?;
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(self.transcript_path())?;
        let line = serde_json::to_string(&entry)?;
        writeln!(file, "{}", line)?;
        Ok(())
    }

    /// Write the final view model as a pretty-JSON report.
    pub fn save_summary(&self, symbol: &str, model: &ViewModel) -> Result<PathBuf, StreamError> {
        let summary = RunSummary {
            run_id: &self.run_id,
            symbol,
            saved_at: Utc::now().to_rfc3339(),
            model,
        };

        std::fs::create_dir_all(&self.dir)?;
        let path = self.dir.join(format!("report_{}_{}.json", symbol, self.run_id));
        std::fs::write(&path, serde_json::to_vec_pretty(&summary)?)?;
        Ok(path)
    }
}
