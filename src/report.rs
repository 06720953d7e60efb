use std::io::{BufRead, Write};

use thiserror::Error;

use crate::pipeline::predict::{InputRecord, Prediction, RawScores};

#[derive(Debug, Error)]
pub enum ReportError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("parse error on line {line}: {source}")]
    Parse {
        line: usize,
        source: serde_json::Error,
    },
    #[error("serialize error: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Reads one JSON record per non-empty line.
pub fn read_records(reader: impl BufRead) -> Result<Vec<InputRecord>, ReportError> {
    let mut records = Vec::new();
    for (line_no, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let record = serde_json::from_str(&line).map_err(|source| ReportError::Parse {
            line: line_no + 1,
            source,
        })?;
        records.push(record);
    }
    Ok(records)
}

/// One JSON object per prediction, in input order.
pub fn write_predictions(
    mut writer: impl Write,
    predictions: &[Prediction],
) -> Result<(), ReportError> {
    for prediction in predictions {
        serde_json::to_writer(&mut writer, prediction)?;
        writer.write_all(b"\n")?;
    }
    Ok(())
}

/// Raw-scores mode emits a single JSON object for the whole batch.
pub fn write_raw_scores(mut writer: impl Write, raw: &RawScores) -> Result<(), ReportError> {
    serde_json::to_writer(&mut writer, raw)?;
    writer.write_all(b"\n")?;
    Ok(())
}

#[cfg(test)]
#[path = "../tests/src_inline/report.rs"]
mod tests;
