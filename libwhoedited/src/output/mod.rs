//! Writing attribution reports
//!
//! Each processed feature kind produces one report, written to its own file
//! (`nodes.csv`, `ways.csv`, `relations.csv`, or `.jsonl` equivalents). A kind
//! that was not processed produces no file at all, so a missing file means
//! "disabled" and an empty file means "nothing found".
//!
//! Output is all-or-nothing: every report is first staged in a temporary file
//! next to its destination, and the staged files are only renamed into place
//! once all of them were written successfully.

use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use log::{debug, info};
use serde::{Deserialize, Serialize};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::attribution::{AttributionRecord, EngineStats};
use crate::config::ConfigError;
use crate::kind::Kind;

pub mod timestamp;

#[derive(Debug, Error)]
pub enum OutputError {
    #[error("cannot write {path:?}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("write failed: {0}")]
    Write(#[from] std::io::Error),

    #[error("cannot write CSV row: {0}")]
    Csv(#[from] csv::Error),

    #[error("cannot write JSON row: {0}")]
    Json(#[from] serde_json::Error),

    #[error("cannot move staged output into place: {0}")]
    Persist(#[from] tempfile::PersistError),
}

/// Serialization of report rows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Csv,
    Jsonl,
}

impl OutputFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            OutputFormat::Csv => "csv",
            OutputFormat::Jsonl => "jsonl",
        }
    }
}

impl std::str::FromStr for OutputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "csv" => Ok(OutputFormat::Csv),
            "jsonl" | "ndjson" | "json" => Ok(OutputFormat::Jsonl),
            _ => Err(format!("unknown output format {:?}", s)),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct OutputOptions {
    #[serde(default)]
    pub format: OutputFormat,
    /// Write a header row (CSV only).
    #[serde(default)]
    pub header: bool,
}

/// The attribution rows of one feature kind, sorted by feature id and then
/// version. Ties are broken by the remaining columns, so two runs over the
/// same history produce byte-identical output.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Report {
    kind: Kind,
    rows: Vec<AttributionRecord>,
    stats: EngineStats,
}

impl Report {
    pub fn new(kind: Kind, mut rows: Vec<AttributionRecord>, stats: EngineStats) -> Self {
        rows.sort();
        Report { kind, rows, stats }
    }

    pub fn kind(&self) -> Kind {
        self.kind
    }

    pub fn rows(&self) -> &[AttributionRecord] {
        &self.rows
    }

    pub fn stats(&self) -> EngineStats {
        self.stats
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn into_rows(self) -> Vec<AttributionRecord> {
        self.rows
    }

    /// File name of this report inside the output directory.
    pub fn file_name(&self, format: OutputFormat) -> String {
        format!("{}.{}", self.kind.plural(), format.extension())
    }
}

/// Serializes rows to any writer.
pub fn write_rows<W: Write>(
    writer: W,
    rows: &[AttributionRecord],
    options: &OutputOptions,
) -> Result<(), OutputError> {
    match options.format {
        OutputFormat::Csv => {
            let mut w = csv::WriterBuilder::new()
                .has_headers(options.header)
                .from_writer(writer);
            for row in rows {
                w.serialize(row)?;
            }
            w.flush()?;
        }
        OutputFormat::Jsonl => {
            let mut w = BufWriter::new(writer);
            for row in rows {
                serde_json::to_writer(&mut w, row)?;
                w.write_all(b"\n")?;
            }
            w.flush()?;
        }
    }
    Ok(())
}

/// Creates `dir` if needed and checks that files can be created in it.
pub fn prepare_dir(dir: &Path) -> Result<(), ConfigError> {
    let unusable = |source| ConfigError::Destination {
        path: dir.to_path_buf(),
        source,
    };
    std::fs::create_dir_all(dir).map_err(unusable)?;
    NamedTempFile::new_in(dir).map_err(unusable)?;
    Ok(())
}

/// Writes every report into `dir`, creating it if needed. Returns the paths
/// written, in report order. Nothing is left in `dir` if any report fails.
pub fn write_reports(
    dir: &Path,
    reports: &[Report],
    options: &OutputOptions,
) -> Result<Vec<PathBuf>, crate::Error> {
    prepare_dir(dir)?;

    let mut staged = Vec::with_capacity(reports.len());
    for report in reports {
        let path = dir.join(report.file_name(options.format));
        let mut file = NamedTempFile::new_in(dir).map_err(|source| ConfigError::Destination {
            path: dir.to_path_buf(),
            source,
        })?;
        debug!("staging {} rows for {:?} in {:?}", report.len(), path, file.path());
        write_rows(
            BufWriter::new(file.as_file_mut()),
            report.rows(),
            options,
        )?;
        file.as_file()
            .sync_all()
            .map_err(|source| OutputError::Io {
                path: file.path().to_path_buf(),
                source,
            })?;
        staged.push((file, path));
    }

    let mut written = Vec::with_capacity(staged.len());
    for (file, path) in staged {
        file.persist(&path).map_err(OutputError::from)?;
        info!("wrote {:?}", path);
        written.push(path);
    }
    Ok(written)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};

    fn record(id: i64, version: u32, author: &str) -> AttributionRecord {
        AttributionRecord {
            feature_id: id,
            version,
            changeset: 42,
            timestamp: Utc.with_ymd_and_hms(2016, 1, 2, 3, 4, 5).unwrap(),
            author: author.to_string(),
            deleted: version == 3,
        }
    }

    #[test]
    fn test_report_sorts_rows() {
        let rows = vec![record(2, 1, "b"), record(1, 3, "a"), record(1, 2, "c")];
        let report = Report::new(Kind::Way, rows, EngineStats::default());
        let keys: Vec<_> = report.rows().iter().map(|r| (r.feature_id, r.version)).collect();
        assert_eq!(keys, vec![(1, 2), (1, 3), (2, 1)]);
        assert_eq!(report.file_name(OutputFormat::Csv), "ways.csv");
    }

    #[test]
    fn test_csv_rows() {
        let mut out = Vec::new();
        write_rows(&mut out, &[record(1, 3, "bob")], &OutputOptions::default()).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "1,3,42,2016-01-02T03:04:05Z,bob,true\n"
        );
    }

    #[test]
    fn test_csv_header() {
        let mut out = Vec::new();
        let options = OutputOptions {
            format: OutputFormat::Csv,
            header: true,
        };
        write_rows(&mut out, &[record(1, 2, "bob")], &options).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text.lines().next(), Some("id,version,changeset,timestamp,user,deleted"));
    }

    #[test]
    fn test_csv_quotes_awkward_names() {
        let mut out = Vec::new();
        write_rows(&mut out, &[record(1, 2, "Smith, J")], &OutputOptions::default()).unwrap();
        assert!(String::from_utf8(out).unwrap().contains("\"Smith, J\""));
    }

    #[test]
    fn test_jsonl_rows() {
        let mut out = Vec::new();
        let options = OutputOptions {
            format: OutputFormat::Jsonl,
            header: false,
        };
        write_rows(&mut out, &[record(1, 2, "bob"), record(1, 3, "eve")], &options).unwrap();
        let text = String::from_utf8(out).unwrap();
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        let back: AttributionRecord = serde_json::from_str(lines[1]).unwrap();
        assert_eq!(back, record(1, 3, "eve"));
    }

    #[test]
    fn test_output_format_names() {
        assert_eq!("CSV".parse::<OutputFormat>(), Ok(OutputFormat::Csv));
        assert_eq!("ndjson".parse::<OutputFormat>(), Ok(OutputFormat::Jsonl));
        assert!("xlsx".parse::<OutputFormat>().is_err());
    }
}
