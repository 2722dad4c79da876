use std::collections::HashSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::AttributionRecord;
use crate::revision::Revision;

/// Position of one of the target user's own revisions in a feature's history.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MineMarker {
    pub version: u32,
    pub changeset: i64,
    pub timestamp: DateTime<Utc>,
}

impl<'a> From<&Revision<'a>> for MineMarker {
    fn from(r: &Revision<'a>) -> Self {
        MineMarker {
            version: r.version,
            changeset: r.changeset,
            timestamp: r.timestamp,
        }
    }
}

/// Bookkeeping of the target user's own revisions of one feature.
#[derive(Debug, Clone, PartialEq, Eq)]
pub(crate) enum MineLedger {
    /// Every revision, in stream order.
    Full(Vec<MineMarker>),
    /// The most recent revision only.
    Shallow(MineMarker),
}

impl MineLedger {
    fn record(&mut self, marker: MineMarker) {
        match self {
            MineLedger::Full(markers) => markers.push(marker),
            MineLedger::Shallow(latest) => *latest = marker,
        }
    }

    fn as_slice(&self) -> &[MineMarker] {
        match self {
            MineLedger::Full(markers) => markers.as_slice(),
            MineLedger::Shallow(latest) => std::slice::from_ref(latest),
        }
    }
}

/// State of one feature the target user has touched.
///
/// An entry only exists once the target user authored a qualifying revision
/// of the feature, so being present in the engine's table is the "touched"
/// flag. Entries are never removed before the engine is finalized.
#[derive(Debug, Clone)]
pub struct FeatureOwnership {
    mine: MineLedger,
    accumulated: HashSet<AttributionRecord>,
}

impl FeatureOwnership {
    pub(crate) fn first_touch(marker: MineMarker, shallow: bool) -> Self {
        let mine = if shallow {
            MineLedger::Shallow(marker)
        } else {
            MineLedger::Full(vec![marker])
        };
        FeatureOwnership {
            mine,
            accumulated: HashSet::new(),
        }
    }

    pub(crate) fn touch_again(&mut self, marker: MineMarker) {
        self.mine.record(marker)
    }

    /// Returns false if an identical record was already accumulated.
    pub(crate) fn accumulate(&mut self, record: AttributionRecord) -> bool {
        self.accumulated.insert(record)
    }

    /// The target user's own revisions that are remembered for this feature.
    pub fn mine(&self) -> &[MineMarker] {
        self.mine.as_slice()
    }

    pub fn accumulated(&self) -> impl Iterator<Item = &AttributionRecord> {
        self.accumulated.iter()
    }

    pub fn len(&self) -> usize {
        self.accumulated.len()
    }

    pub fn is_empty(&self) -> bool {
        self.accumulated.is_empty()
    }

    pub(crate) fn into_records(self) -> impl Iterator<Item = AttributionRecord> {
        self.accumulated.into_iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn marker(version: u32) -> MineMarker {
        MineMarker {
            version,
            changeset: 100 + version as i64,
            timestamp: Utc.timestamp_opt(1_400_000_000 + version as i64, 0).unwrap(),
        }
    }

    #[test]
    fn test_full_ledger_keeps_every_marker() {
        let mut state = FeatureOwnership::first_touch(marker(2), false);
        state.touch_again(marker(5));
        state.touch_again(marker(7));
        assert_eq!(state.mine(), &[marker(2), marker(5), marker(7)]);
    }

    #[test]
    fn test_shallow_ledger_keeps_latest_marker() {
        let mut state = FeatureOwnership::first_touch(marker(2), true);
        state.touch_again(marker(5));
        state.touch_again(marker(7));
        assert_eq!(state.mine(), &[marker(7)]);
    }

    #[test]
    fn test_accumulate_ignores_identical_records() {
        let mut state = FeatureOwnership::first_touch(marker(1), false);
        assert!(state.is_empty());
        let record = AttributionRecord {
            feature_id: 3,
            version: 2,
            changeset: 102,
            timestamp: marker(2).timestamp,
            author: "bob".to_string(),
            deleted: false,
        };
        assert!(state.accumulate(record.clone()));
        assert!(!state.accumulate(record.clone()));
        assert_eq!(state.len(), 1);
        assert_eq!(state.accumulated().collect::<Vec<_>>(), vec![&record]);
    }
}
