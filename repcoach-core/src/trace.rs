use std::fs::File;
use std::io::{BufRead, BufReader, Write};
use std::path::Path;

use anyhow::{Context, Result};
use log::{debug, info};
use serde::{Deserialize, Serialize};

use crate::annotate::Frame;
use crate::landmarks::LandmarkSet;
use crate::pipeline::LandmarkDetector;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TraceRecord {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
    /// `null` when nobody was detected in that frame.
    pub landmarks: Option<LandmarkSet>,
}

pub fn parse_trace<R: BufRead>(reader: R) -> Result<Vec<TraceRecord>> {
    let mut records = Vec::new();
    for (idx, line) in reader.lines().enumerate() {
        let line = line.with_context(|| format!("failed to read trace line {}", idx + 1))?;
        if line.trim().is_empty() {
            continue;
        }
        let record: TraceRecord = serde_json::from_str(&line)
            .with_context(|| format!("invalid trace record on line {}", idx + 1))?;
        records.push(record);
    }
    Ok(records)
}

pub fn load_trace(path: &Path) -> Result<Vec<TraceRecord>> {
    let file = File::open(path)
        .with_context(|| format!("failed to open trace {}", path.display()))?;
    let records = parse_trace(BufReader::new(file))?;
    info!("Loaded {} trace records from {}", records.len(), path.display());
    Ok(records)
}

pub fn write_trace<W: Write>(mut writer: W, records: &[TraceRecord]) -> Result<()> {
    for record in records {
        serde_json::to_writer(&mut writer, record)?;
        writer.write_all(b"\n")?;
    }
    writer.flush()?;
    Ok(())
}

/// Hands out one recorded frame per `detect` call, ignoring the pixels.
pub struct TraceDetector {
    records: Vec<TraceRecord>,
    cursor: usize,
}

impl TraceDetector {
    pub fn new(records: Vec<TraceRecord>) -> Self {
        Self { records, cursor: 0 }
    }

    pub fn from_path(path: &Path) -> Result<Self> {
        Ok(Self::new(load_trace(path)?))
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn is_finished(&self) -> bool {
        self.cursor >= self.records.len()
    }
}

impl LandmarkDetector for TraceDetector {
    fn detect(&mut self, _frame: &Frame) -> Result<Option<LandmarkSet>> {
        let Some(record) = self.records.get(self.cursor) else {
            return Ok(None);
        };
        self.cursor += 1;
        if self.cursor == self.records.len() {
            debug!("Trace exhausted after {} frames", self.cursor);
        }
        Ok(record.landmarks.clone())
    }
}
