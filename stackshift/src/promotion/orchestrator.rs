//! End-to-end promotion orchestration.

use chrono::{DateTime, Utc};
use std::sync::Arc;
use tracing::{info, info_span, warn, Instrument};
use uuid::Uuid;

use super::driver::UpdateDriver;
use super::merger::{merge_parameters, ParameterOverrides};
use super::sweeper::{retire_superseded, LiveResources, SweepReport};
use super::{inspector, tagger};
use crate::cancellation::CancellationToken;
use crate::cloud::{ImageApi, StackApi};
use crate::config::PromotionConfig;
use crate::errors::PromotionError;
use crate::events::ImageCreatedEvent;
use crate::model::{OwnershipTags, StackStatus};

/// The record of one completed promotion.
#[derive(Debug, Clone, serde::Serialize)]
pub struct PromotionReport {
    /// Unique identifier of this run.
    pub run_id: Uuid,
    /// The image now live in the stack.
    pub image_id: String,
    /// The additional-disk snapshot promoted alongside, if any.
    pub additional_snapshot_id: Option<String>,
    /// The terminal-success status the stack update reached.
    pub stack_status: StackStatus,
    /// What retirement removed.
    pub sweep: SweepReport,
    /// When the run started.
    pub started_at: DateTime<Utc>,
    /// When the run finished.
    pub finished_at: DateTime<Utc>,
}

/// The promotion orchestrator.
///
/// Holds the injected capability handles and configuration, and sequences
/// inspect, tag, merge, drive and sweep for each image-creation-completed
/// event. The caller observes success (a [`PromotionReport`]) or the first
/// failing step's error; there is no partial-success state, and retirement
/// only runs after the stack update is confirmed complete.
pub struct Promotion {
    images: Arc<dyn ImageApi>,
    stacks: Arc<dyn StackApi>,
    config: PromotionConfig,
    driver: UpdateDriver,
}

impl Promotion {
    /// Creates an orchestrator with the default poll interval.
    #[must_use]
    pub fn new(
        images: Arc<dyn ImageApi>,
        stacks: Arc<dyn StackApi>,
        config: PromotionConfig,
    ) -> Self {
        Self {
            images,
            stacks,
            config,
            driver: UpdateDriver::default(),
        }
    }

    /// Replaces the update driver (mainly to shorten the poll interval).
    #[must_use]
    pub fn with_driver(mut self, driver: UpdateDriver) -> Self {
        self.driver = driver;
        self
    }

    /// Runs the promotion for one image-creation-completed event.
    pub async fn run(
        &self,
        event: &ImageCreatedEvent,
        cancel: &CancellationToken,
    ) -> Result<PromotionReport, PromotionError> {
        let run_id = Uuid::new_v4();
        let span = info_span!(
            "promotion",
            run_id = %run_id,
            image_id = %event.image_id,
            stack_name = %self.config.stack_name,
        );
        self.run_inner(run_id, event, cancel).instrument(span).await
    }

    async fn run_inner(
        &self,
        run_id: Uuid,
        event: &ImageCreatedEvent,
        cancel: &CancellationToken,
    ) -> Result<PromotionReport, PromotionError> {
        let started_at = Utc::now();
        info!("handling image creation completion");

        let image =
            inspector::describe_ready_image(self.images.as_ref(), &event.image_id)
                .await?;

        let additional_snapshot = if self.config.additional_disk {
            match &event.automation_id {
                Some(automation_id) => {
                    tagger::find_additional_disk_snapshot(
                        self.images.as_ref(),
                        &self.config.stack_name,
                        automation_id,
                    )
                    .await?
                }
                None => {
                    warn!(
                        "additional disk support is enabled but the event \
                         carried no automation id"
                    );
                    None
                }
            }
        } else {
            None
        };

        let mut ownership = OwnershipTags::new(&self.config.stack_name);
        if let Some(automation_id) = &event.automation_id {
            ownership = ownership.with_automation_execution_id(automation_id);
        }

        tagger::tag_image_resources(self.images.as_ref(), &image, &ownership)
            .await?;
        if let Some(snapshot) = &additional_snapshot {
            tagger::tag_additional_disk_snapshot(
                self.images.as_ref(),
                snapshot,
                &ownership,
            )
            .await?;
        }

        let description = self
            .stacks
            .describe_stack(&self.config.stack_name)
            .await?
            .ok_or_else(|| {
                PromotionError::stack_not_found(&self.config.stack_name)
            })?;

        let overrides = ParameterOverrides::for_promotion(
            &image.image_id,
            additional_snapshot
                .as_ref()
                .map(|snapshot| snapshot.snapshot_id.as_str()),
        );
        let parameters = merge_parameters(&description.parameters, &overrides);

        let stack_status = self
            .driver
            .drive(
                self.stacks.as_ref(),
                &self.config.stack_name,
                parameters,
                cancel,
            )
            .await?;

        let mut live = LiveResources::from_image(&image);
        if let Some(snapshot) = &additional_snapshot {
            live = live.with_additional_snapshot(&snapshot.snapshot_id);
        }
        let sweep = retire_superseded(
            self.images.as_ref(),
            &self.config.stack_name,
            &live,
            self.config.additional_disk,
        )
        .await?;

        info!(
            deregistered = sweep.deregistered_images.len(),
            deleted = sweep.deleted_snapshots.len(),
            "promotion complete"
        );

        Ok(PromotionReport {
            run_id,
            image_id: image.image_id,
            additional_snapshot_id: live.additional_snapshot_id,
            stack_status,
            sweep,
            started_at,
            finished_at: Utc::now(),
        })
    }
}
