//! Retirement of superseded images and snapshots.

use tracing::{debug, info};

use crate::cloud::ImageApi;
use crate::errors::PromotionError;
use crate::model::{Image, OwnershipTags};

/// The resources made live by the current promotion.
///
/// Identity exclusion takes precedence over tag inclusion: nothing listed
/// here is ever deregistered or deleted, even if tag matching would
/// otherwise include it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LiveResources {
    /// The newly promoted image.
    pub image_id: String,
    /// Snapshot ids referenced by the promoted image's device mappings.
    pub snapshot_ids: Vec<String>,
    /// The additional-disk snapshot promoted alongside the image, if any.
    pub additional_snapshot_id: Option<String>,
}

impl LiveResources {
    /// Builds the live set from the promoted image description.
    #[must_use]
    pub fn from_image(image: &Image) -> Self {
        Self {
            image_id: image.image_id.clone(),
            snapshot_ids: image
                .snapshot_ids()
                .into_iter()
                .map(str::to_string)
                .collect(),
            additional_snapshot_id: None,
        }
    }

    /// Records the live additional-disk snapshot.
    #[must_use]
    pub fn with_additional_snapshot(mut self, snapshot_id: impl Into<String>) -> Self {
        self.additional_snapshot_id = Some(snapshot_id.into());
        self
    }

    /// Returns true if the snapshot belongs to the live set.
    #[must_use]
    pub fn protects_snapshot(&self, snapshot_id: &str) -> bool {
        self.snapshot_ids.iter().any(|id| id == snapshot_id)
            || self.additional_snapshot_id.as_deref() == Some(snapshot_id)
    }
}

/// What a sweep actually retired.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct SweepReport {
    /// Images deregistered by the sweep.
    pub deregistered_images: Vec<String>,
    /// Snapshots deleted by the sweep.
    pub deleted_snapshots: Vec<String>,
}

impl SweepReport {
    /// Returns true if the sweep had nothing to retire.
    #[must_use]
    pub fn is_noop(&self) -> bool {
        self.deregistered_images.is_empty() && self.deleted_snapshots.is_empty()
    }
}

/// Retires every image and snapshot the promotion superseded.
///
/// Lists the images owned by the stack (membership marker + stack name),
/// excludes the newly promoted one, and for each remaining image
/// deregisters it first and then deletes its mapped snapshots - a snapshot
/// still referenced by a registered image may be protected by the
/// provider. An empty partition is a logged no-op. With additional-disk
/// tracking enabled, superseded additional-disk snapshots are deleted the
/// same way, excluding the one promoted alongside the image. When no
/// replacement additional-disk snapshot was promoted, that sweep is
/// skipped entirely: the previously promoted snapshot is still in service
/// and its id is not known here.
pub async fn retire_superseded(
    images: &dyn ImageApi,
    stack_name: &str,
    live: &LiveResources,
    sweep_additional_disk: bool,
) -> Result<SweepReport, PromotionError> {
    let mut report = SweepReport::default();

    let owned = images
        .describe_images_by_tags(&OwnershipTags::membership_filters(stack_name))
        .await?;
    let superseded: Vec<&Image> = owned
        .iter()
        .filter(|image| image.image_id != live.image_id)
        .collect();

    if superseded.is_empty() {
        info!(stack_name = %stack_name, "no superseded images to retire");
    }

    for image in superseded {
        images.deregister_image(&image.image_id).await?;
        info!(image_id = %image.image_id, "deregistered superseded image");
        report.deregistered_images.push(image.image_id.clone());

        for snapshot_id in image.snapshot_ids() {
            if live.protects_snapshot(snapshot_id) {
                debug!(
                    snapshot_id = %snapshot_id,
                    "snapshot is referenced by the live image, keeping"
                );
                continue;
            }
            images.delete_snapshot(snapshot_id).await?;
            info!(snapshot_id = %snapshot_id, "deleted superseded snapshot");
            report.deleted_snapshots.push(snapshot_id.to_string());
        }
    }

    if sweep_additional_disk {
        if live.additional_snapshot_id.is_none() {
            info!(
                stack_name = %stack_name,
                "no replacement additional disk snapshot, skipping the \
                 additional disk sweep"
            );
            return Ok(report);
        }

        let snapshots = images
            .describe_snapshots_by_tags(
                &OwnershipTags::additional_disk_sweep_filters(stack_name),
            )
            .await?;

        for snapshot in snapshots {
            if live.protects_snapshot(&snapshot.snapshot_id) {
                debug!(
                    snapshot_id = %snapshot.snapshot_id,
                    "additional disk snapshot is live, keeping"
                );
                continue;
            }
            images.delete_snapshot(&snapshot.snapshot_id).await?;
            info!(
                snapshot_id = %snapshot.snapshot_id,
                "deleted superseded additional disk snapshot"
            );
            report.deleted_snapshots.push(snapshot.snapshot_id);
        }
    }

    Ok(report)
}
