//! whoedited traces what happened to a user's OpenStreetMap edits.
//!
//! Given the full history of a dataset and a target user, it finds every
//! feature the target user touched and lists the revisions other users made
//! to that feature afterwards: one report per feature kind (nodes, ways,
//! relations).
//!
//! The pieces, in data flow order:
//!
//! - [`source`]: readers producing revision events per feature kind;
//! - [`filter`]: the tag key allow-list;
//! - [`attribution`]: the per-kind attribution engine;
//! - [`tracker`]: routes events from a source to the engines;
//! - [`output`]: sorted reports and their CSV / JSON Lines files.

pub mod attribution;
pub mod config;
pub mod filter;
pub mod kind;
pub mod output;
pub mod revision;
pub mod source;
pub mod tracker;

pub use attribution::{AttributionEngine, AttributionRecord, EngineStats};
pub use config::{AttributionConfig, ConfigError};
pub use filter::TagFilter;
pub use kind::{FeatureKind, Kind, KindSelection, Node, Relation, Way};
pub use output::{OutputError, OutputFormat, OutputOptions, Report};
pub use revision::{FeatureId, OwnedRevision, Revision};
pub use source::{InputFormat, RevisionSource, RevisionVisitor, SourceError};
pub use tracker::{Reports, Tracker};

use std::path::{Path, PathBuf};

/// Any error that aborts a run. The variant is the error's class: bad
/// configuration, unreadable history, or failure to write the reports.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("source error: {0}")]
    Source(#[from] SourceError),

    #[error("output error: {0}")]
    Output(#[from] OutputError),
}

/// Runs a complete attribution: reads `input`, attributes every revision and
/// writes one report per enabled kind into `out_dir`.
///
/// The configuration and the output directory are checked before the
/// history is opened, and no report is written unless the whole history was
/// read.
pub fn run(
    input: &Path,
    format: Option<InputFormat>,
    config: &AttributionConfig,
    out_dir: &Path,
    options: &OutputOptions,
) -> Result<Vec<PathBuf>, Error> {
    config.validate()?;
    let format = match format {
        Some(format) => format,
        None => InputFormat::from_path(input)?,
    };
    output::prepare_dir(out_dir)?;
    let mut tracker = Tracker::new(config.clone());
    source::open(input, format)?.visit(&mut tracker)?;
    let reports = tracker.finish();
    output::write_reports(out_dir, reports.as_slice(), options)
}
