//! Output sinks for sample rows
//!
//! The sampler hands every formatted row to a [`RowSink`]. A write or flush
//! failure is fatal for the whole process; callers propagate the error
//! rather than retrying a partial row.

use anyhow::{Context, Result};
use std::fs::File;
use std::path::Path;

/// Destination for formatted sample rows.
pub trait RowSink: Send {
    fn write_row(&mut self, row: &[String]) -> Result<()>;
    fn flush(&mut self) -> Result<()>;
}

/// CSV file sink, one `datalogN.csv` per session.
pub struct CsvSink {
    writer: csv::Writer<File>,
}

impl CsvSink {
    /// Create the next `datalogN.csv` in `dir`, N = existing count + 1.
    pub fn create(dir: &Path) -> Result<Self> {
        std::fs::create_dir_all(dir)
            .with_context(|| format!("cannot create data directory {}", dir.display()))?;

        let existing = std::fs::read_dir(dir)
            .with_context(|| format!("cannot scan data directory {}", dir.display()))?
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.path().extension().map(|ext| ext == "csv").unwrap_or(false))
            .count();

        let path = dir.join(format!("datalog{}.csv", existing + 1));
        let writer = csv::Writer::from_path(&path)
            .with_context(|| format!("cannot create datalog {}", path.display()))?;
        tracing::info!(path = %path.display(), "datalog created");
        Ok(Self { writer })
    }
}

impl RowSink for CsvSink {
    fn write_row(&mut self, row: &[String]) -> Result<()> {
        self.writer.write_record(row).context("datalog row write failed")
    }

    fn flush(&mut self) -> Result<()> {
        self.writer.flush().context("datalog flush failed")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn scratch_dir(tag: &str) -> PathBuf {
        let dir = std::env::temp_dir().join(format!("otl-sink-{}-{}", tag, std::process::id()));
        std::fs::remove_dir_all(&dir).ok();
        dir
    }

    #[test]
    fn test_datalog_files_count_upward() {
        let dir = scratch_dir("count");

        {
            let mut sink = CsvSink::create(&dir).unwrap();
            sink.write_row(&["a".to_string(), "b".to_string()]).unwrap();
            sink.flush().unwrap();
        }
        let second = CsvSink::create(&dir).unwrap();
        drop(second);

        assert!(dir.join("datalog1.csv").exists());
        assert!(dir.join("datalog2.csv").exists());

        std::fs::remove_dir_all(&dir).ok();
    }

    #[test]
    fn test_rows_land_in_the_file() {
        let dir = scratch_dir("rows");
        let mut sink = CsvSink::create(&dir).unwrap();
        sink.write_row(&["00.0".to_string(), "3000".to_string()]).unwrap();
        sink.write_row(&["00.1".to_string(), "3050".to_string()]).unwrap();
        sink.flush().unwrap();

        let contents = std::fs::read_to_string(dir.join("datalog1.csv")).unwrap();
        assert_eq!(contents, "00.0,3000\n00.1,3050\n");

        std::fs::remove_dir_all(&dir).ok();
    }
}
