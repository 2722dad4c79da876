//! Revision sources
//!
//! A source walks a history once, in file order, and hands every revision to
//! a [`RevisionVisitor`], tagged with its feature kind. History files list
//! all nodes, then all ways, then all relations, each sorted by id and then
//! version; the attribution engine relies on that order within a kind.
//!
//! Sources own every failure of reading the history. The first error stops
//! the walk and is returned from [`RevisionSource::visit`].

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use log::debug;
use thiserror::Error;

use crate::config::ConfigError;
use crate::kind::Kind;
use crate::revision::{FeatureId, Revision};

mod jsonl;
mod memory;
#[cfg(feature = "pbf")]
mod pbf;

pub use jsonl::JsonLinesSource;
pub use memory::MemorySource;
#[cfg(feature = "pbf")]
pub use pbf::PbfSource;

#[derive(Debug, Error)]
pub enum SourceError {
    #[error("cannot open history file {path:?}: {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed reading history: {0}")]
    Read(#[from] std::io::Error),

    #[cfg(feature = "pbf")]
    #[error("corrupt PBF history: {0}")]
    Pbf(#[from] osmpbf::Error),

    #[error("{kind} {id} has no {field}; is this a history file with metadata?")]
    MissingMetadata {
        kind: Kind,
        id: FeatureId,
        field: &'static str,
    },

    #[error("{kind} {id} has invalid version {version}")]
    InvalidVersion {
        kind: Kind,
        id: FeatureId,
        version: i64,
    },

    #[error("{kind} {id} has out of range timestamp {millis}ms")]
    InvalidTimestamp {
        kind: Kind,
        id: FeatureId,
        millis: i64,
    },

    #[error("{kind} {id} has a user name that is not valid UTF-8")]
    Encoding { kind: Kind, id: FeatureId },

    #[error("line {line}: {message}")]
    Parse { line: usize, message: String },
}

/// Receives revisions from a source, one call per revision.
pub trait RevisionVisitor {
    fn node(&mut self, revision: &Revision<'_>);
    fn way(&mut self, revision: &Revision<'_>);
    fn relation(&mut self, revision: &Revision<'_>);

    fn revision(&mut self, kind: Kind, revision: &Revision<'_>) {
        match kind {
            Kind::Node => self.node(revision),
            Kind::Way => self.way(revision),
            Kind::Relation => self.relation(revision),
        }
    }
}

/// A history that can be walked once.
pub trait RevisionSource {
    fn visit<V: RevisionVisitor>(self, visitor: &mut V) -> Result<(), SourceError>;
}

/// Format of a history file.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// OSM PBF full history (`.osh.pbf`).
    Pbf,
    /// One JSON revision per line.
    Jsonl,
}

impl InputFormat {
    /// Guesses the format from the file name.
    pub fn from_path(path: &Path) -> Result<Self, ConfigError> {
        let name = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        if name.ends_with(".pbf") {
            Ok(InputFormat::Pbf)
        } else if name.ends_with(".jsonl") || name.ends_with(".ndjson") || name.ends_with(".json")
        {
            Ok(InputFormat::Jsonl)
        } else {
            Err(ConfigError::UnknownInputFormat(path.to_path_buf()))
        }
    }
}

impl std::str::FromStr for InputFormat {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "pbf" | "osh.pbf" => Ok(InputFormat::Pbf),
            "jsonl" | "ndjson" | "json" => Ok(InputFormat::Jsonl),
            _ => Err(format!("unknown input format {:?}", s)),
        }
    }
}

/// A history file opened in one of the supported formats.
pub enum HistoryFile {
    #[cfg(feature = "pbf")]
    Pbf(PbfSource),
    Jsonl(JsonLinesSource<BufReader<File>>),
}

impl RevisionSource for HistoryFile {
    fn visit<V: RevisionVisitor>(self, visitor: &mut V) -> Result<(), SourceError> {
        match self {
            #[cfg(feature = "pbf")]
            HistoryFile::Pbf(source) => source.visit(visitor),
            HistoryFile::Jsonl(source) => source.visit(visitor),
        }
    }
}

/// Opens `path` as a history file of the given format.
pub fn open(path: &Path, format: InputFormat) -> Result<HistoryFile, crate::Error> {
    debug!("opening {:?} as {:?}", path, format);
    match format {
        #[cfg(feature = "pbf")]
        InputFormat::Pbf => Ok(HistoryFile::Pbf(PbfSource::open(path)?)),
        #[cfg(not(feature = "pbf"))]
        InputFormat::Pbf => Err(ConfigError::UnsupportedInputFormat("pbf".to_string()).into()),
        InputFormat::Jsonl => Ok(HistoryFile::Jsonl(JsonLinesSource::open(path)?)),
    }
}
