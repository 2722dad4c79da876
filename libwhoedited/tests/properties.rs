//! Property tests for the attribution engine, over randomly generated but
//! well-ordered histories.

use chrono::{TimeZone, Utc};
use libwhoedited::attribution::AttributionEngine;
use libwhoedited::{AttributionConfig, AttributionRecord, Node, OwnedRevision, Way};
use quickcheck::{Arbitrary, Gen};
use quickcheck_macros::quickcheck;

const AUTHORS: [&str; 4] = ["target", "bob", "carol", "dave"];
const KEYS: [&str; 3] = ["highway", "name", "building"];

/// A history of a handful of features, sorted by id and then version like a
/// real history file.
#[derive(Debug, Clone)]
struct History(Vec<OwnedRevision>);

impl Arbitrary for History {
    fn arbitrary(g: &mut Gen) -> Self {
        let len = usize::arbitrary(g) % 60;
        let mut draws: Vec<(i64, usize, bool, Vec<&str>)> = (0..len)
            .map(|_| {
                let id = (u8::arbitrary(g) % 8) as i64;
                let author = usize::arbitrary(g) % AUTHORS.len();
                let deleted = u8::arbitrary(g) % 10 == 0;
                let keys = KEYS
                    .iter()
                    .copied()
                    .filter(|_| bool::arbitrary(g))
                    .collect();
                (id, author, deleted, keys)
            })
            .collect();
        draws.sort_by_key(|d| d.0);

        let mut revisions = Vec::with_capacity(draws.len());
        let mut version = 0;
        let mut last_id = None;
        for (n, (id, author, deleted, keys)) in draws.into_iter().enumerate() {
            if last_id != Some(id) {
                version = 0;
                last_id = Some(id);
            }
            version += 1 + (n as u32 % 2);
            let ts = Utc.timestamp_opt(1_200_000_000 + n as i64 * 60, 0).unwrap();
            let mut r = OwnedRevision::new(id, version, 500 + n as i64, ts, AUTHORS[author])
                .with_tags(keys);
            r.deleted = deleted;
            revisions.push(r);
        }
        History(revisions)
    }
}

fn attribute(history: &History, config: &AttributionConfig) -> Vec<AttributionRecord> {
    let mut engine = AttributionEngine::<Node>::new(config);
    for r in &history.0 {
        engine.observe(&r.as_revision());
    }
    let mut rows = engine.finalize();
    rows.sort();
    rows
}

#[quickcheck]
fn shallow_and_full_attribute_the_same_third_party_edits(history: History) -> bool {
    let full = attribute(&history, &AttributionConfig::new("target"));
    let shallow = attribute(&history, &AttributionConfig::new("target").shallow(true));
    full == shallow && full.iter().all(|r| r.author != "target")
}

#[quickcheck]
fn shallow_and_full_agree_with_include_mine(history: History) -> bool {
    let config = AttributionConfig::new("target").include_mine(true);
    attribute(&history, &config) == attribute(&history, &config.clone().shallow(true))
}

#[quickcheck]
fn include_mine_only_adds_target_rows(history: History) -> bool {
    let without = attribute(&history, &AttributionConfig::new("target"));
    let with: Vec<_> = attribute(&history, &AttributionConfig::new("target").include_mine(true))
        .into_iter()
        .filter(|r| r.author != "target")
        .collect();
    without == with
}

#[quickcheck]
fn records_never_precede_the_first_touch(history: History) -> bool {
    let rows = attribute(&history, &AttributionConfig::new("target").include_mine(true));
    rows.iter().all(|row| {
        history
            .0
            .iter()
            .find(|r| r.feature_id == row.feature_id && r.author == "target")
            .map_or(false, |first| first.version <= row.version)
    })
}

#[quickcheck]
fn sorted_output_is_reproducible(history: History) -> bool {
    let config = AttributionConfig::new("target");
    let first = attribute(&history, &config);
    let second = attribute(&history, &config);
    let ordered = first
        .windows(2)
        .all(|w| (w[0].feature_id, w[0].version) <= (w[1].feature_id, w[1].version));
    first == second && ordered
}

#[quickcheck]
fn marking_is_idempotent(history: History) -> bool {
    let mut engine = AttributionEngine::<Way>::new(&AttributionConfig::new("target"));
    let mut touched = std::collections::HashSet::new();
    for r in &history.0 {
        engine.observe(&r.as_revision());
        if r.author == "target" {
            touched.insert(r.feature_id);
        }
        if !touched.iter().all(|id| engine.is_touched(*id)) {
            return false;
        }
    }
    engine.stats().touched_features == touched.len() as u64
}

#[quickcheck]
fn shallow_remembers_one_marker_per_feature(history: History) -> bool {
    let config = AttributionConfig::new("target").shallow(true);
    let mut engine = AttributionEngine::<Node>::new(&config);
    for r in &history.0 {
        engine.observe(&r.as_revision());
    }
    (0..8).all(|id| engine.mine(id).len() == usize::from(engine.is_touched(id)))
}
