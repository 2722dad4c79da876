use super::{RevisionSource, RevisionVisitor, SourceError};
use crate::kind::Kind;
use crate::revision::OwnedRevision;

/// A history held in memory, replayed in insertion order.
#[derive(Debug, Clone, Default)]
pub struct MemorySource {
    revisions: Vec<(Kind, OwnedRevision)>,
}

impl MemorySource {
    pub fn new() -> Self {
        MemorySource::default()
    }

    pub fn push(&mut self, kind: Kind, revision: OwnedRevision) {
        self.revisions.push((kind, revision))
    }

    pub fn len(&self) -> usize {
        self.revisions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.revisions.is_empty()
    }
}

impl FromIterator<(Kind, OwnedRevision)> for MemorySource {
    fn from_iter<I: IntoIterator<Item = (Kind, OwnedRevision)>>(iter: I) -> Self {
        MemorySource {
            revisions: iter.into_iter().collect(),
        }
    }
}

impl RevisionSource for &MemorySource {
    fn visit<V: RevisionVisitor>(self, visitor: &mut V) -> Result<(), SourceError> {
        for (kind, revision) in &self.revisions {
            visitor.revision(*kind, &revision.as_revision());
        }
        Ok(())
    }
}

impl RevisionSource for MemorySource {
    fn visit<V: RevisionVisitor>(self, visitor: &mut V) -> Result<(), SourceError> {
        (&self).visit(visitor)
    }
}
