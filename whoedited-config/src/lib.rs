//! Configuration files for whoedited.
//!
//! Settings are read from up to two TOML files, the user's global file
//! (`$XDG_CONFIG_HOME/whoedited/config.toml` or the platform equivalent) and
//! an explicit file given on the command line. Values in later files override
//! earlier ones, and command-line flags override both.
//!
//! ```toml
//! keys = ["highway", "name"]
//! include_mine = true
//! skip_relations = true
//!
//! [output]
//! format = "csv"
//! header = true
//! ```

use std::path::{Path, PathBuf};

use anyhow::Context;
use log::debug;
use serde::{Deserialize, Serialize};

pub const CONFIG_DIR: &str = "whoedited";
pub const CONFIG_FILE: &str = "config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Global {
    /// Tag keys to restrict attribution to.
    pub keys: Option<Vec<String>>,
    pub include_mine: Option<bool>,
    pub shallow: Option<bool>,
    pub skip_nodes: Option<bool>,
    pub skip_ways: Option<bool>,
    pub skip_relations: Option<bool>,
    pub output: Output,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct Output {
    /// `csv` or `jsonl`.
    pub format: Option<String>,
    /// Write a CSV header row.
    pub header: Option<bool>,
}

impl Global {
    /// Location of the global configuration file, if the platform has a
    /// configuration directory.
    pub fn path() -> Option<PathBuf> {
        dirs_next::config_dir().map(|dir| dir.join(CONFIG_DIR).join(CONFIG_FILE))
    }

    /// Loads the global configuration file, or defaults if there is none.
    pub fn load() -> Result<Global, anyhow::Error> {
        match Self::path() {
            Some(path) if path.exists() => Self::from_file(&path),
            _ => Ok(Global::default()),
        }
    }

    pub fn from_file(path: &Path) -> Result<Global, anyhow::Error> {
        debug!("loading configuration from {:?}", path);
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("cannot read {:?}", path))?;
        Self::parse(&contents).with_context(|| format!("cannot parse {:?}", path))
    }

    pub fn parse(contents: &str) -> Result<Global, anyhow::Error> {
        Ok(toml::from_str(contents)?)
    }

    /// Overrides the values of `self` with those set in `other`.
    pub fn merge(self, other: Global) -> Global {
        Global {
            keys: other.keys.or(self.keys),
            include_mine: other.include_mine.or(self.include_mine),
            shallow: other.shallow.or(self.shallow),
            skip_nodes: other.skip_nodes.or(self.skip_nodes),
            skip_ways: other.skip_ways.or(self.skip_ways),
            skip_relations: other.skip_relations.or(self.skip_relations),
            output: Output {
                format: other.output.format.or(self.output.format),
                header: other.output.header.or(self.output.header),
            },
        }
    }
}
