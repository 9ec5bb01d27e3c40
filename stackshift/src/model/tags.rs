//! Ownership tags and tag filters.
//!
//! Every resource the retirement sweeper may later delete MUST carry the
//! membership marker and the owning-stack name. Resources without these
//! tags are never considered for deletion.

use serde::{Deserialize, Serialize};

/// Marker tag identifying resources managed by this crate.
pub const MEMBERSHIP_TAG_KEY: &str = "stackshift";
/// Tag naming the stack that owns a resource.
pub const STACK_NAME_TAG_KEY: &str = "stackshift:stack-name";
/// Tag correlating a resource with the automation execution that produced it.
pub const AUTOMATION_ID_TAG_KEY: &str = "stackshift:automation-execution-id";
/// Marker tag identifying out-of-band additional-disk snapshots.
pub const ADDITIONAL_DISK_TAG_KEY: &str = "stackshift:additional-disk";

/// A provider tag pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tag {
    /// The tag key.
    #[serde(rename = "Key")]
    pub key: String,
    /// The tag value.
    #[serde(rename = "Value")]
    pub value: String,
}

impl Tag {
    /// Creates a tag.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }
}

/// A tag equality predicate used when listing resources.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TagFilter {
    /// The tag key to match.
    pub key: String,
    /// The exact value the tag must carry.
    pub value: String,
}

impl TagFilter {
    /// Creates a tag filter.
    #[must_use]
    pub fn new(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            value: value.into(),
        }
    }

    /// Returns true if the given tag set satisfies this filter.
    #[must_use]
    pub fn matches(&self, tags: &[Tag]) -> bool {
        tags.iter()
            .any(|tag| tag.key == self.key && tag.value == self.value)
    }
}

/// The ownership payload stamped on an image and its snapshots.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OwnershipTags {
    /// The owning stack.
    pub stack_name: String,
    /// Correlation id of the automation execution that baked the image.
    pub automation_execution_id: Option<String>,
}

impl OwnershipTags {
    /// Creates an ownership payload for the given stack.
    #[must_use]
    pub fn new(stack_name: impl Into<String>) -> Self {
        Self {
            stack_name: stack_name.into(),
            automation_execution_id: None,
        }
    }

    /// Sets the automation execution correlation id.
    #[must_use]
    pub fn with_automation_execution_id(mut self, id: impl Into<String>) -> Self {
        self.automation_execution_id = Some(id.into());
        self
    }

    /// Renders the payload to provider tags.
    #[must_use]
    pub fn to_tags(&self) -> Vec<Tag> {
        let mut tags = vec![
            Tag::new(MEMBERSHIP_TAG_KEY, "true"),
            Tag::new(STACK_NAME_TAG_KEY, &self.stack_name),
        ];
        if let Some(id) = &self.automation_execution_id {
            tags.push(Tag::new(AUTOMATION_ID_TAG_KEY, id));
        }
        tags
    }

    /// Filters selecting every resource owned by the given stack.
    #[must_use]
    pub fn membership_filters(stack_name: &str) -> Vec<TagFilter> {
        vec![
            TagFilter::new(MEMBERSHIP_TAG_KEY, "true"),
            TagFilter::new(STACK_NAME_TAG_KEY, stack_name),
        ]
    }

    /// Filters selecting the additional-disk snapshot produced by one
    /// specific automation execution.
    #[must_use]
    pub fn additional_disk_filters(
        stack_name: &str,
        automation_execution_id: &str,
    ) -> Vec<TagFilter> {
        vec![
            TagFilter::new(STACK_NAME_TAG_KEY, stack_name),
            TagFilter::new(ADDITIONAL_DISK_TAG_KEY, "true"),
            TagFilter::new(AUTOMATION_ID_TAG_KEY, automation_execution_id),
        ]
    }

    /// Filters selecting every additional-disk snapshot owned by the stack,
    /// regardless of which execution produced it.
    #[must_use]
    pub fn additional_disk_sweep_filters(stack_name: &str) -> Vec<TagFilter> {
        vec![
            TagFilter::new(STACK_NAME_TAG_KEY, stack_name),
            TagFilter::new(ADDITIONAL_DISK_TAG_KEY, "true"),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_to_tags_without_automation_id() {
        let tags = OwnershipTags::new("gamebox").to_tags();
        assert_eq!(
            tags,
            vec![
                Tag::new(MEMBERSHIP_TAG_KEY, "true"),
                Tag::new(STACK_NAME_TAG_KEY, "gamebox"),
            ]
        );
    }

    #[test]
    fn test_to_tags_with_automation_id() {
        let tags = OwnershipTags::new("gamebox")
            .with_automation_execution_id("exec-7")
            .to_tags();
        assert_eq!(tags.len(), 3);
        assert_eq!(tags[2], Tag::new(AUTOMATION_ID_TAG_KEY, "exec-7"));
    }

    #[test]
    fn test_filter_matching() {
        let tags = vec![
            Tag::new(MEMBERSHIP_TAG_KEY, "true"),
            Tag::new(STACK_NAME_TAG_KEY, "gamebox"),
        ];

        for filter in OwnershipTags::membership_filters("gamebox") {
            assert!(filter.matches(&tags));
        }
        assert!(!TagFilter::new(STACK_NAME_TAG_KEY, "other").matches(&tags));
        assert!(!TagFilter::new(ADDITIONAL_DISK_TAG_KEY, "true").matches(&tags));
    }

    #[test]
    fn test_additional_disk_filters_carry_all_three_predicates() {
        let filters = OwnershipTags::additional_disk_filters("gamebox", "exec-7");
        assert_eq!(filters.len(), 3);
        assert!(filters.contains(&TagFilter::new(STACK_NAME_TAG_KEY, "gamebox")));
        assert!(filters.contains(&TagFilter::new(ADDITIONAL_DISK_TAG_KEY, "true")));
        assert!(filters.contains(&TagFilter::new(AUTOMATION_ID_TAG_KEY, "exec-7")));
    }

    #[test]
    fn test_tag_wire_format() {
        let json = serde_json::to_string(&Tag::new("stackshift", "true")).unwrap();
        assert_eq!(json, r#"{"Key":"stackshift","Value":"true"}"#);
    }
}
