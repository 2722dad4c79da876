use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Identifier of a feature, stable across its versions. Ids are only unique
/// within one feature kind.
pub type FeatureId = i64;

/// One observed version of one feature.
///
/// Revisions borrow their strings from the reader that produced them, so a
/// history file can be scanned without allocating for every revision that is
/// eventually discarded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Revision<'a> {
    pub feature_id: FeatureId,
    /// Strictly increasing per feature, not necessarily contiguous.
    pub version: u32,
    pub changeset: i64,
    pub timestamp: DateTime<Utc>,
    /// Display name of the editing user.
    pub author: &'a str,
    pub deleted: bool,
    /// Keys of the tags present on this revision.
    pub tag_keys: Vec<&'a str>,
}

/// Owned counterpart of [`Revision`], for sources that hold their history in
/// memory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OwnedRevision {
    pub feature_id: FeatureId,
    pub version: u32,
    pub changeset: i64,
    pub timestamp: DateTime<Utc>,
    pub author: String,
    #[serde(default)]
    pub deleted: bool,
    #[serde(default)]
    pub tag_keys: Vec<String>,
}

impl OwnedRevision {
    pub fn new(
        feature_id: FeatureId,
        version: u32,
        changeset: i64,
        timestamp: DateTime<Utc>,
        author: &str,
    ) -> Self {
        OwnedRevision {
            feature_id,
            version,
            changeset,
            timestamp,
            author: author.to_string(),
            deleted: false,
            tag_keys: Vec::new(),
        }
    }

    pub fn with_tags<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tag_keys.extend(keys.into_iter().map(Into::into));
        self
    }

    pub fn deleted(mut self) -> Self {
        self.deleted = true;
        self
    }

    pub fn as_revision(&self) -> Revision<'_> {
        Revision {
            feature_id: self.feature_id,
            version: self.version,
            changeset: self.changeset,
            timestamp: self.timestamp,
            author: &self.author,
            deleted: self.deleted,
            tag_keys: self.tag_keys.iter().map(String::as_str).collect(),
        }
    }
}

impl<'a> From<&Revision<'a>> for OwnedRevision {
    fn from(r: &Revision<'a>) -> Self {
        OwnedRevision {
            feature_id: r.feature_id,
            version: r.version,
            changeset: r.changeset,
            timestamp: r.timestamp,
            author: r.author.to_string(),
            deleted: r.deleted,
            tag_keys: r.tag_keys.iter().map(|k| k.to_string()).collect(),
        }
    }
}
