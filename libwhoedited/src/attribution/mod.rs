//! Follow-on edit attribution
//!
//! The attribution engine consumes the revisions of one feature kind in
//! history order and sorts them into three bins:
//!
//! - revisions by the target user mark the feature as touched, and are kept
//!   when `include_mine` is set;
//! - revisions by anybody else of a feature the target user already touched
//!   are kept;
//! - everything else is dropped.
//!
//! The engine holds its state until [`AttributionEngine::finalize`], because a
//! feature's last follow-on edit can be anywhere in the stream. There is no
//! fallible operation here: any revision a source manages to produce is
//! classified by the rules above.
//!
//! # Example
//!
//! ```
//! use chrono::{TimeZone, Utc};
//! use libwhoedited::attribution::AttributionEngine;
//! use libwhoedited::{AttributionConfig, Node, OwnedRevision};
//!
//! let ts = Utc.with_ymd_and_hms(2014, 6, 1, 0, 0, 0).unwrap();
//! let mut engine = AttributionEngine::<Node>::new(&AttributionConfig::new("alice"));
//! engine.observe(&OwnedRevision::new(1, 1, 10, ts, "bob").as_revision());
//! engine.observe(&OwnedRevision::new(1, 2, 11, ts, "alice").as_revision());
//! engine.observe(&OwnedRevision::new(1, 3, 12, ts, "carol").as_revision());
//!
//! let rows = engine.finalize();
//! assert_eq!(rows.len(), 1);
//! assert_eq!(rows[0].author, "carol");
//! ```

use std::collections::HashMap;
use std::marker::PhantomData;

use chrono::{DateTime, Utc};
use log::trace;
use serde::{Deserialize, Serialize};

use crate::config::AttributionConfig;
use crate::kind::{FeatureKind, Kind};
use crate::output::{timestamp, Report};
use crate::revision::{FeatureId, Revision};

mod ownership;
pub use ownership::{FeatureOwnership, MineMarker};

/// A revision that ends up in the report. Field order is the column order of
/// the output, and the derived ordering sorts by feature id, then version.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct AttributionRecord {
    #[serde(rename = "id")]
    pub feature_id: FeatureId,
    pub version: u32,
    pub changeset: i64,
    #[serde(with = "timestamp")]
    pub timestamp: DateTime<Utc>,
    #[serde(rename = "user")]
    pub author: String,
    pub deleted: bool,
}

impl<'a> From<&Revision<'a>> for AttributionRecord {
    fn from(r: &Revision<'a>) -> Self {
        AttributionRecord {
            feature_id: r.feature_id,
            version: r.version,
            changeset: r.changeset,
            timestamp: r.timestamp,
            author: r.author.to_string(),
            deleted: r.deleted,
        }
    }
}

/// Counters kept by an engine, reported once the stream is consumed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStats {
    /// Revisions handed to `observe`.
    pub observed: u64,
    /// Revisions of features the target user had not touched yet.
    pub discarded: u64,
    /// Revisions authored by the target user.
    pub mine: u64,
    /// Distinct records accumulated.
    pub records: u64,
    /// Features touched by the target user.
    pub touched_features: u64,
}

/// Attribution state for one feature kind.
#[derive(Debug)]
pub struct AttributionEngine<K: FeatureKind> {
    target_user: String,
    include_mine: bool,
    shallow: bool,
    features: HashMap<FeatureId, FeatureOwnership>,
    stats: EngineStats,
    kind: PhantomData<K>,
}

impl<K: FeatureKind> AttributionEngine<K> {
    pub fn new(config: &AttributionConfig) -> Self {
        AttributionEngine {
            target_user: config.target_user.clone(),
            include_mine: config.include_mine,
            shallow: config.shallow,
            features: HashMap::new(),
            stats: EngineStats::default(),
            kind: PhantomData,
        }
    }

    pub fn kind(&self) -> Kind {
        K::KIND
    }

    /// Classifies one revision that already passed the tag filter.
    pub fn observe(&mut self, revision: &Revision<'_>) {
        self.stats.observed += 1;

        if revision.author == self.target_user {
            self.stats.mine += 1;
            let marker = MineMarker::from(revision);
            let shallow = self.shallow;
            let state = self
                .features
                .entry(revision.feature_id)
                .and_modify(|state| state.touch_again(marker))
                .or_insert_with(|| {
                    trace!("{} {} touched at v{}", K::KIND, revision.feature_id, revision.version);
                    FeatureOwnership::first_touch(marker, shallow)
                });
            if self.include_mine && state.accumulate(AttributionRecord::from(revision)) {
                self.stats.records += 1;
            }
        } else if let Some(state) = self.features.get_mut(&revision.feature_id) {
            if state.accumulate(AttributionRecord::from(revision)) {
                self.stats.records += 1;
            }
        } else {
            self.stats.discarded += 1;
        }
    }

    /// True once the target user authored a qualifying revision of `id`.
    pub fn is_touched(&self, id: FeatureId) -> bool {
        self.features.contains_key(&id)
    }

    /// The target user's remembered revisions of `id`: all of them in full
    /// mode, the latest one in shallow mode.
    pub fn mine(&self, id: FeatureId) -> &[MineMarker] {
        self.features.get(&id).map(|s| s.mine()).unwrap_or(&[])
    }

    pub fn ownership(&self, id: FeatureId) -> Option<&FeatureOwnership> {
        self.features.get(&id)
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            touched_features: self.features.len() as u64,
            ..self.stats
        }
    }

    /// Flattens the accumulated records into rows, in no particular order.
    pub fn finalize(self) -> Vec<AttributionRecord> {
        let mut rows = Vec::with_capacity(self.stats.records as usize);
        for (_, state) in self.features {
            rows.extend(state.into_records());
        }
        rows
    }

    /// Finalizes into a report sorted by feature id and version.
    pub fn into_report(self) -> Report {
        let stats = self.stats();
        Report::new(K::KIND, self.finalize(), stats)
    }
}
