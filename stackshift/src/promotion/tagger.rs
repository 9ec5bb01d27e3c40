//! Ownership tagging of promoted resources.

use tracing::{info, warn};

use crate::cloud::ImageApi;
use crate::errors::PromotionError;
use crate::model::{Image, OwnershipTags, Snapshot};

/// Stamps the ownership tag set on the image and every snapshot its
/// device mappings reference, as a single batch call.
///
/// Returns the tagged resource ids. Tagging is overwrite-idempotent, so
/// re-running a promotion after a partial failure converges on the same
/// tag state.
pub async fn tag_image_resources(
    images: &dyn ImageApi,
    image: &Image,
    ownership: &OwnershipTags,
) -> Result<Vec<String>, PromotionError> {
    let mut resource_ids = Vec::with_capacity(1 + image.block_device_mappings.len());
    resource_ids.push(image.image_id.clone());
    for snapshot_id in image.snapshot_ids() {
        resource_ids.push(snapshot_id.to_string());
    }

    images.create_tags(&resource_ids, &ownership.to_tags()).await?;

    info!(
        image_id = %image.image_id,
        resource_count = resource_ids.len(),
        stack_name = %ownership.stack_name,
        "tagged image and mapped snapshots"
    );
    Ok(resource_ids)
}

/// Locates the additional-disk snapshot produced by the given automation
/// execution.
///
/// The additional-disk flow is optional per deployment configuration, so
/// a missing snapshot is logged and reported as `None`, not an error.
pub async fn find_additional_disk_snapshot(
    images: &dyn ImageApi,
    stack_name: &str,
    automation_execution_id: &str,
) -> Result<Option<Snapshot>, PromotionError> {
    let filters =
        OwnershipTags::additional_disk_filters(stack_name, automation_execution_id);
    let mut snapshots = images.describe_snapshots_by_tags(&filters).await?;

    if snapshots.is_empty() {
        warn!(
            stack_name = %stack_name,
            automation_execution_id = %automation_execution_id,
            "no additional disk snapshot found"
        );
        return Ok(None);
    }
    Ok(Some(snapshots.remove(0)))
}

/// Stamps the ownership tag set on a separately-discovered additional-disk
/// snapshot so the retirement sweeper can account for it later.
pub async fn tag_additional_disk_snapshot(
    images: &dyn ImageApi,
    snapshot: &Snapshot,
    ownership: &OwnershipTags,
) -> Result<(), PromotionError> {
    images
        .create_tags(
            std::slice::from_ref(&snapshot.snapshot_id),
            &ownership.to_tags(),
        )
        .await?;

    info!(
        snapshot_id = %snapshot.snapshot_id,
        stack_name = %ownership.stack_name,
        "tagged additional disk snapshot"
    );
    Ok(())
}
