//! CSV persistence for dataset samples.
//!
//! - Every write is a full overwrite: header plus all rows
//! - Writes go to a sibling temp file first, then rename over the target

use crate::models::{AssistError, QASample, Result};
use std::fs::{self, File};
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// Column order of every dataset file.
pub const CSV_HEADER: [&str; 4] = ["question", "answer", "quality", "gold_answer"];

/// Write `samples` to `path`, replacing any previous content.
pub fn write_samples(path: &Path, samples: &[QASample]) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .map_err(|e| AssistError::io(format!("creating {}", parent.display()), e))?;
    }

    let temp_path = temp_path_for(path);
    let file = File::create(&temp_path)
        .map_err(|e| AssistError::io(format!("creating {}", temp_path.display()), e))?;

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_writer(BufWriter::new(file));
    writer
        .write_record(CSV_HEADER)
        .map_err(|e| AssistError::csv("writing header", e))?;
    for sample in samples {
        writer
            .serialize(sample)
            .map_err(|e| AssistError::csv("writing sample", e))?;
    }
    writer
        .flush()
        .map_err(|e| AssistError::io(format!("flushing {}", temp_path.display()), e))?;
    drop(writer);

    fs::rename(&temp_path, path)
        .map_err(|e| AssistError::io(format!("renaming onto {}", path.display()), e))?;

    debug!(path = %path.display(), rows = samples.len(), "Samples written");
    Ok(())
}

/// Read every sample back from a dataset file.
pub fn read_samples(path: &Path) -> Result<Vec<QASample>> {
    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| AssistError::csv(format!("opening {}", path.display()), e))?;
    reader
        .deserialize()
        .collect::<std::result::Result<Vec<QASample>, _>>()
        .map_err(|e| AssistError::csv(format!("reading {}", path.display()), e))
}

/// Questions already present in an existing dataset file.
///
/// A missing file yields an empty list. Only the `question` column is
/// required, so files from older runs with extra columns still load.
pub fn load_questions(path: &Path) -> Result<Vec<String>> {
    if !path.exists() {
        return Ok(Vec::new());
    }

    let mut reader = csv::Reader::from_path(path)
        .map_err(|e| AssistError::csv(format!("opening {}", path.display()), e))?;
    let headers = reader
        .headers()
        .map_err(|e| AssistError::csv(format!("reading header of {}", path.display()), e))?;
    let Some(column) = headers.iter().position(|h| h.trim() == "question") else {
        warn!(path = %path.display(), "Dataset file has no 'question' column");
        return Ok(Vec::new());
    };

    let mut questions = Vec::new();
    for record in reader.records() {
        let record = record.map_err(|e| AssistError::csv(format!("reading {}", path.display()), e))?;
        if let Some(q) = record.get(column).map(str::trim).filter(|q| !q.is_empty()) {
            questions.push(q.to_string());
        }
    }

    info!(path = %path.display(), count = questions.len(), "Loaded existing questions");
    Ok(questions)
}

fn temp_path_for(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_else(|| "dataset.csv".into());
    name.push(".tmp");
    path.with_file_name(name)
}

/// Periodic full-snapshot writer owned by the result collector.
#[derive(Debug)]
pub struct CheckpointManager {
    /// Checkpoint file
    path: PathBuf,
    /// Completed samples between writes
    interval: usize,
    /// Writes performed so far
    writes: usize,
}

impl CheckpointManager {
    pub fn new(path: impl Into<PathBuf>, interval: usize) -> Self {
        Self {
            path: path.into(),
            interval: interval.max(1),
            writes: 0,
        }
    }

    /// Whether `completed` samples is a checkpoint boundary.
    pub fn is_due(&self, completed: usize) -> bool {
        completed > 0 && completed % self.interval == 0
    }

    /// Overwrite the checkpoint with the full result list.
    pub fn save(&mut self, samples: &[QASample]) -> Result<()> {
        write_samples(&self.path, samples)?;
        self.writes += 1;
        info!(path = %self.path.display(), samples = samples.len(), "Checkpoint saved");
        Ok(())
    }

    /// Save only when `samples.len()` lands on the interval.
    pub fn maybe_save(&mut self, samples: &[QASample]) -> Result<bool> {
        if !self.is_due(samples.len()) {
            return Ok(false);
        }
        self.save(samples)?;
        Ok(true)
    }

    pub fn writes(&self) -> usize {
        self.writes
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}
