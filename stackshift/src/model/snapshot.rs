//! Block storage snapshots.

use serde::{Deserialize, Serialize};

use super::tags::Tag;

/// A point-in-time copy of a block storage volume.
///
/// A snapshot is either tied to the image whose device mappings reference
/// it, or tracked out-of-band as an "additional disk" snapshot correlated
/// by an automation execution id carried in its tags.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    /// The snapshot identifier.
    #[serde(rename = "SnapshotId")]
    pub snapshot_id: String,
    /// Tags attached to the snapshot.
    #[serde(rename = "Tags", default)]
    pub tags: Vec<Tag>,
}

impl Snapshot {
    /// Creates a snapshot description.
    #[must_use]
    pub fn new(snapshot_id: impl Into<String>) -> Self {
        Self {
            snapshot_id: snapshot_id.into(),
            tags: Vec::new(),
        }
    }

    /// Adds a tag.
    #[must_use]
    pub fn with_tag(mut self, tag: Tag) -> Self {
        self.tags.push(tag);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot_wire_format() {
        let raw = r#"{"SnapshotId": "snap-1", "Tags": [{"Key": "k", "Value": "v"}]}"#;
        let snapshot: Snapshot = serde_json::from_str(raw).unwrap();
        assert_eq!(snapshot.snapshot_id, "snap-1");
        assert_eq!(snapshot.tags.len(), 1);
    }

    #[test]
    fn test_tags_default_to_empty() {
        let snapshot: Snapshot =
            serde_json::from_str(r#"{"SnapshotId": "snap-2"}"#).unwrap();
        assert!(snapshot.tags.is_empty());
    }
}
