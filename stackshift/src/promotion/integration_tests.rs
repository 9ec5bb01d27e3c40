//! End-to-end promotion tests against the in-memory cloud.

use std::sync::Arc;
use std::time::Duration;

use pretty_assertions::assert_eq;

use super::{Promotion, UpdateDriver, ADDITIONAL_DISK_PARAMETER, IMAGE_ID_PARAMETER};
use crate::cancellation::CancellationToken;
use crate::cloud::{ImageApi, StackApi};
use crate::config::PromotionConfig;
use crate::errors::PromotionError;
use crate::events::ImageCreatedEvent;
use crate::model::{
    BlockDeviceMapping, Image, ImageState, OwnershipTags, Snapshot,
    StackDescription, StackParameter, StackStatus, Tag,
    ADDITIONAL_DISK_TAG_KEY, AUTOMATION_ID_TAG_KEY, MEMBERSHIP_TAG_KEY,
    STACK_NAME_TAG_KEY,
};
use crate::testing::{CloudCall, InMemoryCloud};

fn promotion(cloud: &Arc<InMemoryCloud>, config: PromotionConfig) -> Promotion {
    Promotion::new(
        Arc::clone(cloud) as Arc<dyn ImageApi>,
        Arc::clone(cloud) as Arc<dyn StackApi>,
        config,
    )
    .with_driver(UpdateDriver::new(Duration::from_millis(1)))
}

fn seed_baked_image(cloud: &InMemoryCloud) {
    cloud.seed_image(
        Image::new("img-2", ImageState::Available)
            .with_mapping(BlockDeviceMapping::snapshot_backed("/dev/sda1", "snap-2")),
    );
}

fn seed_previous_image(cloud: &InMemoryCloud) {
    cloud.seed_image_with_tags(
        Image::new("img-1", ImageState::Available)
            .with_mapping(BlockDeviceMapping::snapshot_backed("/dev/sda1", "snap-1")),
        OwnershipTags::new("gamebox").to_tags(),
    );
}

fn seed_stack(cloud: &InMemoryCloud, status: StackStatus) {
    cloud.seed_stack(
        StackDescription::new("gamebox", status)
            .with_parameter(StackParameter::with_value(IMAGE_ID_PARAMETER, "img-1"))
            .with_parameter(StackParameter::with_value("Foo", "bar")),
    );
}

fn retirement_calls(cloud: &InMemoryCloud) -> Vec<CloudCall> {
    cloud
        .calls()
        .into_iter()
        .filter(|call| {
            matches!(
                call,
                CloudCall::DeregisterImage { .. } | CloudCall::DeleteSnapshot { .. }
            )
        })
        .collect()
}

#[tokio::test]
async fn test_successful_promotion_end_to_end() {
    let cloud = Arc::new(InMemoryCloud::new());
    seed_baked_image(&cloud);
    seed_previous_image(&cloud);
    seed_stack(&cloud, StackStatus::UpdateComplete);

    let report = promotion(&cloud, PromotionConfig::new("gamebox"))
        .run(&ImageCreatedEvent::new("img-2"), &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(report.image_id, "img-2");
    assert_eq!(report.stack_status, StackStatus::UpdateComplete);
    assert_eq!(report.sweep.deregistered_images, vec!["img-1".to_string()]);
    assert_eq!(report.sweep.deleted_snapshots, vec!["snap-1".to_string()]);

    // The new image and its snapshot were tagged for ownership tracking.
    for resource in ["img-2", "snap-2"] {
        let tags = cloud.applied_tags(resource);
        assert!(tags.contains(&Tag::new(MEMBERSHIP_TAG_KEY, "true")));
        assert!(tags.contains(&Tag::new(STACK_NAME_TAG_KEY, "gamebox")));
    }

    // The merged parameters changed exactly the image id.
    assert_eq!(
        cloud.updated_parameters().unwrap(),
        vec![
            StackParameter::with_value(IMAGE_ID_PARAMETER, "img-2"),
            StackParameter::use_previous("Foo"),
        ]
    );

    // The newly promoted image is never passed to deregistration.
    assert!(!cloud.calls().iter().any(|call| matches!(
        call,
        CloudCall::DeregisterImage { image_id } if image_id == "img-2"
    )));
}

#[tokio::test]
async fn test_unready_image_aborts_before_any_mutation() {
    let cloud = Arc::new(InMemoryCloud::new());
    cloud.seed_image(Image::new("img-2", ImageState::Pending));
    seed_previous_image(&cloud);
    seed_stack(&cloud, StackStatus::UpdateComplete);

    let err = promotion(&cloud, PromotionConfig::new("gamebox"))
        .run(&ImageCreatedEvent::new("img-2"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PromotionError::ImageNotReady(_)));
    assert!(cloud.mutation_calls().is_empty());
}

#[tokio::test]
async fn test_failed_update_preserves_old_resources() {
    let cloud = Arc::new(InMemoryCloud::new());
    seed_baked_image(&cloud);
    seed_previous_image(&cloud);
    seed_stack(&cloud, StackStatus::UpdateComplete);
    // First describe reads the parameters; the poll loop then observes an
    // in-progress update that fails.
    cloud.push_status(StackStatus::UpdateComplete);
    cloud.push_status(StackStatus::UpdateInProgress);
    cloud.push_status(StackStatus::UpdateFailed);

    let err = promotion(&cloud, PromotionConfig::new("gamebox"))
        .run(&ImageCreatedEvent::new("img-2"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PromotionError::StackUpdateFailed(_)));
    assert!(retirement_calls(&cloud).is_empty());
}

#[tokio::test]
async fn test_additional_disk_promotion_end_to_end() {
    let cloud = Arc::new(InMemoryCloud::new());
    seed_baked_image(&cloud);
    seed_previous_image(&cloud);
    cloud.seed_snapshot(
        Snapshot::new("snap-extra-new")
            .with_tag(Tag::new(STACK_NAME_TAG_KEY, "gamebox"))
            .with_tag(Tag::new(ADDITIONAL_DISK_TAG_KEY, "true"))
            .with_tag(Tag::new(AUTOMATION_ID_TAG_KEY, "exec-7")),
    );
    cloud.seed_snapshot(
        Snapshot::new("snap-extra-old")
            .with_tag(Tag::new(STACK_NAME_TAG_KEY, "gamebox"))
            .with_tag(Tag::new(ADDITIONAL_DISK_TAG_KEY, "true"))
            .with_tag(Tag::new(AUTOMATION_ID_TAG_KEY, "exec-6")),
    );
    cloud.seed_stack(
        StackDescription::new("gamebox", StackStatus::UpdateComplete)
            .with_parameter(StackParameter::with_value(IMAGE_ID_PARAMETER, "img-1"))
            .with_parameter(StackParameter::with_value(
                ADDITIONAL_DISK_PARAMETER,
                "snap-extra-old",
            ))
            .with_parameter(StackParameter::with_value("Foo", "bar")),
    );

    let config = PromotionConfig::new("gamebox").with_additional_disk(true);
    let event = ImageCreatedEvent::new("img-2").with_automation_id("exec-7");
    let report = promotion(&cloud, config)
        .run(&event, &CancellationToken::new())
        .await
        .unwrap();

    assert_eq!(
        report.additional_snapshot_id.as_deref(),
        Some("snap-extra-new")
    );
    assert_eq!(
        cloud.updated_parameters().unwrap(),
        vec![
            StackParameter::with_value(IMAGE_ID_PARAMETER, "img-2"),
            StackParameter::with_value(ADDITIONAL_DISK_PARAMETER, "snap-extra-new"),
            StackParameter::use_previous("Foo"),
        ]
    );

    // The old image snapshot and the old additional disk snapshot are
    // gone; both live snapshots survive.
    assert!(report
        .sweep
        .deleted_snapshots
        .contains(&"snap-1".to_string()));
    assert!(report
        .sweep
        .deleted_snapshots
        .contains(&"snap-extra-old".to_string()));
    assert!(!report
        .sweep
        .deleted_snapshots
        .contains(&"snap-extra-new".to_string()));
    assert!(!report.sweep.deleted_snapshots.contains(&"snap-2".to_string()));
}

#[tokio::test]
async fn test_missing_additional_disk_snapshot_falls_back_to_previous_value() {
    let cloud = Arc::new(InMemoryCloud::new());
    seed_baked_image(&cloud);
    // The previously promoted additional disk snapshot stays in service
    // because the parameter falls back to its previous value.
    cloud.seed_snapshot(
        Snapshot::new("snap-extra-old")
            .with_tag(Tag::new(STACK_NAME_TAG_KEY, "gamebox"))
            .with_tag(Tag::new(ADDITIONAL_DISK_TAG_KEY, "true"))
            .with_tag(Tag::new(AUTOMATION_ID_TAG_KEY, "exec-6")),
    );
    cloud.seed_stack(
        StackDescription::new("gamebox", StackStatus::UpdateComplete)
            .with_parameter(StackParameter::with_value(IMAGE_ID_PARAMETER, "img-1"))
            .with_parameter(StackParameter::with_value(
                ADDITIONAL_DISK_PARAMETER,
                "snap-extra-old",
            )),
    );

    let config = PromotionConfig::new("gamebox").with_additional_disk(true);
    let event = ImageCreatedEvent::new("img-2").with_automation_id("exec-7");
    let report = promotion(&cloud, config)
        .run(&event, &CancellationToken::new())
        .await
        .unwrap();

    assert!(report.additional_snapshot_id.is_none());
    assert_eq!(
        cloud.updated_parameters().unwrap(),
        vec![
            StackParameter::with_value(IMAGE_ID_PARAMETER, "img-2"),
            StackParameter::use_previous(ADDITIONAL_DISK_PARAMETER),
        ]
    );
    // The still-live snapshot is not swept.
    assert!(!cloud.calls().iter().any(|call| matches!(
        call,
        CloudCall::DeleteSnapshot { snapshot_id } if snapshot_id == "snap-extra-old"
    )));
}

#[tokio::test]
async fn test_promotion_with_nothing_to_retire_is_a_noop_sweep() {
    let cloud = Arc::new(InMemoryCloud::new());
    seed_baked_image(&cloud);
    seed_stack(&cloud, StackStatus::UpdateComplete);

    let report = promotion(&cloud, PromotionConfig::new("gamebox"))
        .run(&ImageCreatedEvent::new("img-2"), &CancellationToken::new())
        .await
        .unwrap();

    assert!(report.sweep.is_noop());
    assert!(retirement_calls(&cloud).is_empty());
}

#[tokio::test]
async fn test_missing_stack_aborts_before_update() {
    let cloud = Arc::new(InMemoryCloud::new());
    seed_baked_image(&cloud);

    let err = promotion(&cloud, PromotionConfig::new("gamebox"))
        .run(&ImageCreatedEvent::new("img-2"), &CancellationToken::new())
        .await
        .unwrap_err();

    assert!(matches!(err, PromotionError::NotFound { .. }));
    assert!(!cloud
        .calls()
        .iter()
        .any(|call| matches!(call, CloudCall::UpdateStack { .. })));
}
