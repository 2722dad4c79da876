use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use super::{RevisionSource, RevisionVisitor, SourceError};
use crate::kind::Kind;
use crate::output::timestamp;
use crate::revision::{FeatureId, Revision};

/// Reads a history dump with one revision per line:
///
/// ```text
/// {"kind":"way","id":42,"version":3,"changeset":901,"timestamp":"2014-06-01T12:00:00Z","user":"alice","tags":{"highway":"residential"}}
/// ```
///
/// `tags` may be an object or a plain list of keys, and may be left out
/// together with `deleted`. Blank lines are skipped.
pub struct JsonLinesSource<R> {
    reader: R,
}

#[derive(Debug, Deserialize)]
struct JsonRevision {
    kind: Kind,
    id: FeatureId,
    version: u32,
    changeset: i64,
    #[serde(with = "timestamp")]
    timestamp: DateTime<Utc>,
    user: String,
    #[serde(default)]
    deleted: bool,
    #[serde(default)]
    tags: JsonTags,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum JsonTags {
    Map(BTreeMap<String, String>),
    Keys(Vec<String>),
}

impl Default for JsonTags {
    fn default() -> Self {
        JsonTags::Keys(Vec::new())
    }
}

impl JsonTags {
    fn keys(&self) -> Vec<&str> {
        match self {
            JsonTags::Map(map) => map.keys().map(String::as_str).collect(),
            JsonTags::Keys(keys) => keys.iter().map(String::as_str).collect(),
        }
    }
}

impl JsonLinesSource<BufReader<File>> {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(JsonLinesSource::new(BufReader::new(file)))
    }
}

impl<R: BufRead> JsonLinesSource<R> {
    pub fn new(reader: R) -> Self {
        JsonLinesSource { reader }
    }
}

impl<R: BufRead> RevisionSource for JsonLinesSource<R> {
    fn visit<V: RevisionVisitor>(self, visitor: &mut V) -> Result<(), SourceError> {
        for (n, line) in self.reader.lines().enumerate() {
            let line = line?;
            if line.trim().is_empty() {
                continue;
            }
            let r: JsonRevision = serde_json::from_str(&line).map_err(|e| SourceError::Parse {
                line: n + 1,
                message: e.to_string(),
            })?;
            if r.version == 0 {
                return Err(SourceError::InvalidVersion {
                    kind: r.kind,
                    id: r.id,
                    version: 0,
                });
            }
            let revision = Revision {
                feature_id: r.id,
                version: r.version,
                changeset: r.changeset,
                timestamp: r.timestamp,
                author: &r.user,
                deleted: r.deleted,
                tag_keys: r.tags.keys(),
            };
            visitor.revision(r.kind, &revision);
        }
        Ok(())
    }
}
