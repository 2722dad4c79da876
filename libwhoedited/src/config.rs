use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::filter::TagFilter;
use crate::kind::KindSelection;

/// Errors raised before any history is read.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("no target user given")]
    MissingUser,

    #[error("cannot use output directory {path:?}: {source}")]
    Destination {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot determine the input format of {0:?}, use an explicit format")]
    UnknownInputFormat(PathBuf),

    #[error("input format {0} is not supported by this build")]
    UnsupportedInputFormat(String),

    #[error("invalid configuration file {path:?}: {message}")]
    File { path: PathBuf, message: String },

    #[error("invalid setting: {0}")]
    Invalid(String),
}

/// Configuration of one attribution run, shared by the engines of every
/// feature kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributionConfig {
    /// User whose edits are traced.
    pub target_user: String,
    /// Tag keys a revision must carry (any of them) to be considered. Empty
    /// means no filtering.
    #[serde(default)]
    pub allowed_keys: Vec<String>,
    #[serde(default)]
    pub kinds: KindSelection,
    /// Also report the target user's own revisions.
    #[serde(default)]
    pub include_mine: bool,
    /// Keep only the latest of the target user's own revisions per feature.
    #[serde(default)]
    pub shallow: bool,
}

impl AttributionConfig {
    pub fn new(target_user: impl Into<String>) -> Self {
        AttributionConfig {
            target_user: target_user.into(),
            allowed_keys: Vec::new(),
            kinds: KindSelection::default(),
            include_mine: false,
            shallow: false,
        }
    }

    pub fn with_keys<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.allowed_keys = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn include_mine(mut self, include_mine: bool) -> Self {
        self.include_mine = include_mine;
        self
    }

    pub fn shallow(mut self, shallow: bool) -> Self {
        self.shallow = shallow;
        self
    }

    pub fn with_kinds(mut self, kinds: KindSelection) -> Self {
        self.kinds = kinds;
        self
    }

    pub fn tag_filter(&self) -> TagFilter {
        TagFilter::new(self.allowed_keys.iter().cloned())
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.target_user.trim().is_empty() {
            return Err(ConfigError::MissingUser);
        }
        Ok(())
    }
}

/// Splits a comma-separated key list, ignoring blank entries.
pub fn parse_key_list(list: &str) -> Vec<String> {
    list.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(String::from)
        .collect()
}
