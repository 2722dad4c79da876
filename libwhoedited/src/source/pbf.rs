use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use chrono::{DateTime, TimeZone, Utc};
use log::debug;
use osmpbf::{DenseNodeInfo, Element, ElementReader, Info};

use super::{RevisionSource, RevisionVisitor, SourceError};
use crate::kind::Kind;
use crate::revision::{FeatureId, Revision};

/// Reads an OSM PBF full-history file.
///
/// Every element needs its metadata (version, changeset, timestamp, user);
/// extracts written without it cannot be attributed and fail with
/// [`SourceError::MissingMetadata`] on the first element.
pub struct PbfSource {
    reader: ElementReader<BufReader<File>>,
}

impl PbfSource {
    pub fn open(path: &Path) -> Result<Self, SourceError> {
        let file = File::open(path).map_err(|source| SourceError::Open {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(PbfSource {
            reader: ElementReader::new(BufReader::new(file)),
        })
    }
}

impl RevisionSource for PbfSource {
    fn visit<V: RevisionVisitor>(self, visitor: &mut V) -> Result<(), SourceError> {
        let mut failure = None;
        let mut elements = 0u64;
        self.reader.for_each(|element| {
            if failure.is_some() {
                return;
            }
            elements += 1;
            if let Err(e) = dispatch(&element, visitor) {
                failure = Some(e);
            }
        })?;
        debug!("read {} elements", elements);
        match failure {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}

fn dispatch<V: RevisionVisitor>(element: &Element<'_>, visitor: &mut V) -> Result<(), SourceError> {
    match element {
        Element::Node(node) => {
            let revision = from_info(Kind::Node, node.id(), &node.info(), keys(node.tags()))?;
            visitor.node(&revision);
        }
        Element::DenseNode(node) => {
            let id = node.id();
            let info = node.info().ok_or(SourceError::MissingMetadata {
                kind: Kind::Node,
                id,
                field: "metadata",
            })?;
            let revision = from_dense_info(id, info, keys(node.tags()))?;
            visitor.node(&revision);
        }
        Element::Way(way) => {
            let revision = from_info(Kind::Way, way.id(), &way.info(), keys(way.tags()))?;
            visitor.way(&revision);
        }
        Element::Relation(relation) => {
            let revision = from_info(
                Kind::Relation,
                relation.id(),
                &relation.info(),
                keys(relation.tags()),
            )?;
            visitor.relation(&revision);
        }
    }
    Ok(())
}

fn keys<'a>(tags: impl Iterator<Item = (&'a str, &'a str)>) -> Vec<&'a str> {
    tags.map(|(k, _)| k).collect()
}

fn from_info<'a>(
    kind: Kind,
    id: FeatureId,
    info: &Info<'a>,
    tag_keys: Vec<&'a str>,
) -> Result<Revision<'a>, SourceError> {
    let missing = |field| SourceError::MissingMetadata { kind, id, field };
    let version = info.version().ok_or_else(|| missing("version"))?;
    let changeset = info.changeset().ok_or_else(|| missing("changeset"))?;
    let millis = info.milli_timestamp().ok_or_else(|| missing("timestamp"))?;
    let author = info
        .user()
        .ok_or_else(|| missing("user"))?
        .map_err(|_| SourceError::Encoding { kind, id })?;
    Ok(Revision {
        feature_id: id,
        version: version_of(kind, id, version)?,
        changeset,
        timestamp: timestamp_of(kind, id, millis)?,
        author,
        deleted: !info.visible(),
        tag_keys,
    })
}

fn from_dense_info<'a>(
    id: FeatureId,
    info: &DenseNodeInfo<'a>,
    tag_keys: Vec<&'a str>,
) -> Result<Revision<'a>, SourceError> {
    let author = info
        .user()
        .map_err(|_| SourceError::Encoding { kind: Kind::Node, id })?;
    Ok(Revision {
        feature_id: id,
        version: version_of(Kind::Node, id, info.version())?,
        changeset: info.changeset(),
        timestamp: timestamp_of(Kind::Node, id, info.milli_timestamp())?,
        author,
        deleted: !info.visible(),
        tag_keys,
    })
}

fn version_of(kind: Kind, id: FeatureId, version: i32) -> Result<u32, SourceError> {
    match u32::try_from(version) {
        Ok(v) if v > 0 => Ok(v),
        _ => Err(SourceError::InvalidVersion {
            kind,
            id,
            version: version.into(),
        }),
    }
}

fn timestamp_of(kind: Kind, id: FeatureId, millis: i64) -> Result<DateTime<Utc>, SourceError> {
    Utc.timestamp_millis_opt(millis)
        .single()
        .ok_or(SourceError::InvalidTimestamp { kind, id, millis })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_of() {
        assert_eq!(version_of(Kind::Way, 1, 3).unwrap(), 3);
        assert!(matches!(
            version_of(Kind::Way, 1, 0),
            Err(SourceError::InvalidVersion { version: 0, .. })
        ));
        assert!(version_of(Kind::Way, 1, -1).is_err());
    }

    #[test]
    fn test_timestamp_of() {
        let ts = timestamp_of(Kind::Node, 1, 1_234_567_890_000).unwrap();
        assert_eq!(ts.timestamp(), 1_234_567_890);
    }
}
