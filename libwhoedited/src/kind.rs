//! Feature kinds
//!
//! OpenStreetMap has three kinds of features: nodes (points), ways (lines and
//! areas) and relations (groupings of other features). Each kind has its own
//! id space, so the attribution engine is instantiated once per kind. The
//! marker types in this module make that separation visible in the type
//! system: an `AttributionEngine<Node>` cannot be handed the report of an
//! `AttributionEngine<Way>`.

use serde::{Deserialize, Serialize};

/// Runtime tag for a feature kind.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Kind {
    Node,
    Way,
    Relation,
}

impl Kind {
    pub const ALL: [Kind; 3] = [Kind::Node, Kind::Way, Kind::Relation];

    /// Plural name, used as the stem of output files.
    pub fn plural(&self) -> &'static str {
        match self {
            Kind::Node => "nodes",
            Kind::Way => "ways",
            Kind::Relation => "relations",
        }
    }
}

impl std::fmt::Display for Kind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Kind::Node => write!(f, "node"),
            Kind::Way => write!(f, "way"),
            Kind::Relation => write!(f, "relation"),
        }
    }
}

impl std::str::FromStr for Kind {
    type Err = String;
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "node" | "n" => Ok(Kind::Node),
            "way" | "w" => Ok(Kind::Way),
            "relation" | "r" => Ok(Kind::Relation),
            _ => Err(format!("unknown feature kind {:?}", s)),
        }
    }
}

/// Compile-time feature kind, implemented by the marker types below.
pub trait FeatureKind: std::fmt::Debug + Copy + Default + Send + Sync + 'static {
    const KIND: Kind;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Node;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Way;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Relation;

impl FeatureKind for Node {
    const KIND: Kind = Kind::Node;
}

impl FeatureKind for Way {
    const KIND: Kind = Kind::Way;
}

impl FeatureKind for Relation {
    const KIND: Kind = Kind::Relation;
}

/// Which feature kinds are processed. All of them by default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KindSelection {
    pub nodes: bool,
    pub ways: bool,
    pub relations: bool,
}

impl Default for KindSelection {
    fn default() -> Self {
        KindSelection {
            nodes: true,
            ways: true,
            relations: true,
        }
    }
}

impl KindSelection {
    pub fn contains(&self, kind: Kind) -> bool {
        match kind {
            Kind::Node => self.nodes,
            Kind::Way => self.ways,
            Kind::Relation => self.relations,
        }
    }

    pub fn set(&mut self, kind: Kind, enabled: bool) {
        match kind {
            Kind::Node => self.nodes = enabled,
            Kind::Way => self.ways = enabled,
            Kind::Relation => self.relations = enabled,
        }
    }

    /// Enabled kinds, in node, way, relation order.
    pub fn iter(&self) -> impl Iterator<Item = Kind> + '_ {
        Kind::ALL.into_iter().filter(move |k| self.contains(*k))
    }

    pub fn is_empty(&self) -> bool {
        !(self.nodes || self.ways || self.relations)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_kind_roundtrip_names() {
        for kind in Kind::ALL {
            assert_eq!(kind.to_string().parse::<Kind>(), Ok(kind));
        }
        assert_eq!(Kind::Relation.plural(), "relations");
        assert!("polygon".parse::<Kind>().is_err());
    }

    #[test]
    fn test_selection() {
        let mut selection = KindSelection::default();
        assert_eq!(selection.iter().count(), 3);
        selection.set(Kind::Way, false);
        assert!(!selection.contains(Kind::Way));
        assert_eq!(
            selection.iter().collect::<Vec<_>>(),
            vec![Kind::Node, Kind::Relation]
        );
        selection.set(Kind::Node, false);
        selection.set(Kind::Relation, false);
        assert!(selection.is_empty());
    }

    #[test]
    fn test_marker_kinds() {
        assert_eq!(Node::KIND, Kind::Node);
        assert_eq!(Way::KIND, Kind::Way);
        assert_eq!(Relation::KIND, Kind::Relation);
    }
}
