use std::collections::HashSet;

use crate::revision::Revision;

/// Tag key allow-list deciding whether a revision takes part in attribution.
///
/// An empty allow-list means no filtering: every revision passes, including
/// revisions without any tags (deletions, untagged nodes).
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagFilter {
    allowed: HashSet<String>,
}

impl TagFilter {
    pub fn new<I, S>(keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TagFilter {
            allowed: keys.into_iter().map(Into::into).collect(),
        }
    }

    /// A filter that lets everything through.
    pub fn allow_all() -> Self {
        TagFilter::default()
    }

    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }

    pub fn passes(&self, revision: &Revision) -> bool {
        passes(&revision.tag_keys, &self.allowed)
    }
}

/// True if `allowed` is empty or shares at least one key with `tag_keys`.
pub fn passes<S: AsRef<str>>(tag_keys: &[S], allowed: &HashSet<String>) -> bool {
    allowed.is_empty() || tag_keys.iter().any(|k| allowed.contains(k.as_ref()))
}
