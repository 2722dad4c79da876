use log::info;

use crate::attribution::AttributionEngine;
use crate::config::AttributionConfig;
use crate::filter::TagFilter;
use crate::kind::{Kind, Node, Relation, Way};
use crate::output::Report;
use crate::revision::Revision;
use crate::source::RevisionVisitor;

/// Routes revisions from a source through the tag filter to the engine of
/// their feature kind. Kinds that are not selected have no engine, and their
/// revisions are dropped before filtering.
#[derive(Debug)]
pub struct Tracker {
    filter: TagFilter,
    nodes: Option<AttributionEngine<Node>>,
    ways: Option<AttributionEngine<Way>>,
    relations: Option<AttributionEngine<Relation>>,
}

impl Tracker {
    pub fn new(config: AttributionConfig) -> Self {
        let kinds = config.kinds;
        Tracker {
            filter: config.tag_filter(),
            nodes: kinds.nodes.then(|| AttributionEngine::new(&config)),
            ways: kinds.ways.then(|| AttributionEngine::new(&config)),
            relations: kinds.relations.then(|| AttributionEngine::new(&config)),
        }
    }

    pub fn nodes(&self) -> Option<&AttributionEngine<Node>> {
        self.nodes.as_ref()
    }

    pub fn ways(&self) -> Option<&AttributionEngine<Way>> {
        self.ways.as_ref()
    }

    pub fn relations(&self) -> Option<&AttributionEngine<Relation>> {
        self.relations.as_ref()
    }

    /// Flattens every engine into its sorted report.
    pub fn finish(self) -> Reports {
        let reports: Vec<Report> = [
            self.nodes.map(AttributionEngine::into_report),
            self.ways.map(AttributionEngine::into_report),
            self.relations.map(AttributionEngine::into_report),
        ]
        .into_iter()
        .flatten()
        .collect();
        for report in &reports {
            let stats = report.stats();
            info!(
                "{}: {} revisions observed, {} features touched, {} records",
                report.kind(),
                stats.observed,
                stats.touched_features,
                stats.records
            );
        }
        Reports(reports)
    }
}

impl RevisionVisitor for Tracker {
    fn node(&mut self, revision: &Revision<'_>) {
        if let Some(engine) = self.nodes.as_mut() {
            if self.filter.passes(revision) {
                engine.observe(revision)
            }
        }
    }

    fn way(&mut self, revision: &Revision<'_>) {
        if let Some(engine) = self.ways.as_mut() {
            if self.filter.passes(revision) {
                engine.observe(revision)
            }
        }
    }

    fn relation(&mut self, revision: &Revision<'_>) {
        if let Some(engine) = self.relations.as_mut() {
            if self.filter.passes(revision) {
                engine.observe(revision)
            }
        }
    }
}

/// The reports of one run, one per processed kind, in node, way, relation
/// order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reports(Vec<Report>);

impl Reports {
    pub fn get(&self, kind: Kind) -> Option<&Report> {
        self.0.iter().find(|r| r.kind() == kind)
    }

    pub fn as_slice(&self) -> &[Report] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Report> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<Report> {
        self.0
    }
}

impl IntoIterator for Reports {
    type Item = Report;
    type IntoIter = std::vec::IntoIter<Report>;
    fn into_iter(self) -> Self::IntoIter {
        self.0.into_iter()
    }
}
