//! Image and snapshot query/mutation capability.

use async_trait::async_trait;

use super::ProviderError;
use crate::model::{Image, Snapshot, Tag, TagFilter};

/// Capability trait covering image and snapshot calls.
///
/// Describe calls are read-only; `create_tags` is overwrite-idempotent, so
/// re-running a promotion after a partial tagging failure is safe.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ImageApi: Send + Sync {
    /// Fetches one image description by id, `None` if it does not exist.
    async fn describe_image(
        &self,
        image_id: &str,
    ) -> Result<Option<Image>, ProviderError>;

    /// Lists images whose tags satisfy every filter.
    async fn describe_images_by_tags(
        &self,
        filters: &[TagFilter],
    ) -> Result<Vec<Image>, ProviderError>;

    /// Lists snapshots whose tags satisfy every filter.
    async fn describe_snapshots_by_tags(
        &self,
        filters: &[TagFilter],
    ) -> Result<Vec<Snapshot>, ProviderError>;

    /// Applies the tag set to every listed resource in one batch call.
    async fn create_tags(
        &self,
        resource_ids: &[String],
        tags: &[Tag],
    ) -> Result<(), ProviderError>;

    /// Deregisters an image. The image's snapshots are untouched.
    async fn deregister_image(&self, image_id: &str) -> Result<(), ProviderError>;

    /// Deletes a snapshot.
    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), ProviderError>;
}
