//! An in-memory cloud control plane that records every call.

use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::{HashMap, VecDeque};

use crate::cloud::{
    AutomationApi, FleetApi, ImageApi, ProviderError, StackApi,
    StackUpdateRequest,
};
use crate::model::{
    Image, Snapshot, StackDescription, StackParameter, StackStatus, Tag,
    TagFilter,
};

/// One recorded control-plane call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloudCall {
    /// `describe_image` was called.
    DescribeImage {
        /// The queried image id.
        image_id: String,
    },
    /// `describe_images_by_tags` was called.
    DescribeImagesByTags {
        /// The filters applied.
        filters: Vec<TagFilter>,
    },
    /// `describe_snapshots_by_tags` was called.
    DescribeSnapshotsByTags {
        /// The filters applied.
        filters: Vec<TagFilter>,
    },
    /// `create_tags` was called.
    CreateTags {
        /// The batch of tagged resources.
        resource_ids: Vec<String>,
        /// The applied tag set.
        tags: Vec<Tag>,
    },
    /// `deregister_image` was called.
    DeregisterImage {
        /// The deregistered image.
        image_id: String,
    },
    /// `delete_snapshot` was called.
    DeleteSnapshot {
        /// The deleted snapshot.
        snapshot_id: String,
    },
    /// `describe_stack` was called.
    DescribeStack {
        /// The queried stack.
        stack_name: String,
    },
    /// `update_stack` was called.
    UpdateStack {
        /// The submitted request.
        request: StackUpdateRequest,
    },
    /// `active_instance_ids` was called.
    ActiveInstanceIds {
        /// The queried fleet request.
        spot_fleet_request_id: String,
    },
    /// `start_automation` was called.
    StartAutomation {
        /// The started document.
        document_name: String,
        /// The targeted instance.
        instance_id: String,
    },
}

impl CloudCall {
    /// Returns true for calls that mutate provider state.
    #[must_use]
    pub fn is_mutation(&self) -> bool {
        matches!(
            self,
            Self::CreateTags { .. }
                | Self::DeregisterImage { .. }
                | Self::DeleteSnapshot { .. }
                | Self::UpdateStack { .. }
                | Self::StartAutomation { .. }
        )
    }
}

#[derive(Default)]
struct CloudState {
    images: Vec<Image>,
    image_tags: HashMap<String, Vec<Tag>>,
    snapshots: Vec<Snapshot>,
    stack: Option<StackDescription>,
    status_script: VecDeque<StackStatus>,
    fleets: HashMap<String, Vec<String>>,
    automation_counter: usize,
    calls: Vec<CloudCall>,
}

/// An in-memory implementation of all four capability traits.
///
/// Seed it with images, snapshots, a stack and fleets, script the status
/// sequence the poll loop should observe, then assert on the recorded
/// calls and the resulting state.
#[derive(Default)]
pub struct InMemoryCloud {
    inner: Mutex<CloudState>,
}

impl InMemoryCloud {
    /// Creates an empty cloud.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds an image without tags.
    pub fn seed_image(&self, image: Image) {
        self.inner.lock().images.push(image);
    }

    /// Seeds an image with tags already applied.
    pub fn seed_image_with_tags(&self, image: Image, tags: Vec<Tag>) {
        let mut state = self.inner.lock();
        state.image_tags.insert(image.image_id.clone(), tags);
        state.images.push(image);
    }

    /// Seeds a snapshot (its tags travel on the snapshot itself).
    pub fn seed_snapshot(&self, snapshot: Snapshot) {
        self.inner.lock().snapshots.push(snapshot);
    }

    /// Seeds the stack description returned by `describe_stack`.
    pub fn seed_stack(&self, description: StackDescription) {
        self.inner.lock().stack = Some(description);
    }

    /// Queues a status for the next `describe_stack` call. Once the
    /// script is exhausted, the seeded stack's own status is reported.
    pub fn push_status(&self, status: StackStatus) {
        self.inner.lock().status_script.push_back(status);
    }

    /// Seeds the active instances of a fleet request.
    pub fn seed_fleet(&self, spot_fleet_request_id: &str, instance_ids: Vec<String>) {
        self.inner
            .lock()
            .fleets
            .insert(spot_fleet_request_id.to_string(), instance_ids);
    }

    /// Returns every recorded call in order.
    #[must_use]
    pub fn calls(&self) -> Vec<CloudCall> {
        self.inner.lock().calls.clone()
    }

    /// Returns the recorded mutation calls in order.
    #[must_use]
    pub fn mutation_calls(&self) -> Vec<CloudCall> {
        self.inner
            .lock()
            .calls
            .iter()
            .filter(|call| call.is_mutation())
            .cloned()
            .collect()
    }

    /// Returns the tags currently applied to a resource.
    #[must_use]
    pub fn applied_tags(&self, resource_id: &str) -> Vec<Tag> {
        let state = self.inner.lock();
        if let Some(tags) = state.image_tags.get(resource_id) {
            return tags.clone();
        }
        state
            .snapshots
            .iter()
            .find(|snapshot| snapshot.snapshot_id == resource_id)
            .map(|snapshot| snapshot.tags.clone())
            .unwrap_or_default()
    }

    /// Returns the parameter list of the last submitted stack update.
    #[must_use]
    pub fn updated_parameters(&self) -> Option<Vec<StackParameter>> {
        self.inner
            .lock()
            .calls
            .iter()
            .rev()
            .find_map(|call| match call {
                CloudCall::UpdateStack { request } => {
                    Some(request.parameters.clone())
                }
                _ => None,
            })
    }
}

fn upsert_tags(existing: &mut Vec<Tag>, applied: &[Tag]) {
    for tag in applied {
        match existing.iter_mut().find(|t| t.key == tag.key) {
            Some(slot) => slot.value = tag.value.clone(),
            None => existing.push(tag.clone()),
        }
    }
}

fn matches_all(tags: &[Tag], filters: &[TagFilter]) -> bool {
    filters.iter().all(|filter| filter.matches(tags))
}

#[async_trait]
impl ImageApi for InMemoryCloud {
    async fn describe_image(
        &self,
        image_id: &str,
    ) -> Result<Option<Image>, ProviderError> {
        let mut state = self.inner.lock();
        state.calls.push(CloudCall::DescribeImage {
            image_id: image_id.to_string(),
        });
        Ok(state
            .images
            .iter()
            .find(|image| image.image_id == image_id)
            .cloned())
    }

    async fn describe_images_by_tags(
        &self,
        filters: &[TagFilter],
    ) -> Result<Vec<Image>, ProviderError> {
        let mut state = self.inner.lock();
        state.calls.push(CloudCall::DescribeImagesByTags {
            filters: filters.to_vec(),
        });
        let matching = state
            .images
            .iter()
            .filter(|image| {
                state
                    .image_tags
                    .get(&image.image_id)
                    .is_some_and(|tags| matches_all(tags, filters))
            })
            .cloned()
            .collect();
        Ok(matching)
    }

    async fn describe_snapshots_by_tags(
        &self,
        filters: &[TagFilter],
    ) -> Result<Vec<Snapshot>, ProviderError> {
        let mut state = self.inner.lock();
        state.calls.push(CloudCall::DescribeSnapshotsByTags {
            filters: filters.to_vec(),
        });
        Ok(state
            .snapshots
            .iter()
            .filter(|snapshot| matches_all(&snapshot.tags, filters))
            .cloned()
            .collect())
    }

    async fn create_tags(
        &self,
        resource_ids: &[String],
        tags: &[Tag],
    ) -> Result<(), ProviderError> {
        let mut state = self.inner.lock();
        state.calls.push(CloudCall::CreateTags {
            resource_ids: resource_ids.to_vec(),
            tags: tags.to_vec(),
        });
        for resource_id in resource_ids {
            let entry = state.image_tags.entry(resource_id.clone()).or_default();
            upsert_tags(entry, tags);
        }
        for snapshot in &mut state.snapshots {
            if resource_ids.contains(&snapshot.snapshot_id) {
                upsert_tags(&mut snapshot.tags, tags);
            }
        }
        Ok(())
    }

    async fn deregister_image(&self, image_id: &str) -> Result<(), ProviderError> {
        let mut state = self.inner.lock();
        state.calls.push(CloudCall::DeregisterImage {
            image_id: image_id.to_string(),
        });
        let before = state.images.len();
        state.images.retain(|image| image.image_id != image_id);
        if state.images.len() == before {
            return Err(ProviderError::NotFound(image_id.to_string()));
        }
        Ok(())
    }

    async fn delete_snapshot(&self, snapshot_id: &str) -> Result<(), ProviderError> {
        let mut state = self.inner.lock();
        state.calls.push(CloudCall::DeleteSnapshot {
            snapshot_id: snapshot_id.to_string(),
        });
        // Mapped snapshots are not always seeded as snapshot objects, so
        // deletion is lenient about unknown ids.
        state
            .snapshots
            .retain(|snapshot| snapshot.snapshot_id != snapshot_id);
        Ok(())
    }
}

#[async_trait]
impl StackApi for InMemoryCloud {
    async fn describe_stack(
        &self,
        stack_name: &str,
    ) -> Result<Option<StackDescription>, ProviderError> {
        let mut state = self.inner.lock();
        state.calls.push(CloudCall::DescribeStack {
            stack_name: stack_name.to_string(),
        });
        let scripted = state.status_script.pop_front();
        Ok(state.stack.as_ref().map(|stack| {
            let mut description = stack.clone();
            if let Some(status) = scripted {
                description.stack_status = status;
            }
            description
        }))
    }

    async fn update_stack(
        &self,
        request: &StackUpdateRequest,
    ) -> Result<(), ProviderError> {
        let mut state = self.inner.lock();
        state.calls.push(CloudCall::UpdateStack {
            request: request.clone(),
        });
        Ok(())
    }
}

#[async_trait]
impl FleetApi for InMemoryCloud {
    async fn active_instance_ids(
        &self,
        spot_fleet_request_id: &str,
    ) -> Result<Vec<String>, ProviderError> {
        let mut state = self.inner.lock();
        state.calls.push(CloudCall::ActiveInstanceIds {
            spot_fleet_request_id: spot_fleet_request_id.to_string(),
        });
        Ok(state
            .fleets
            .get(spot_fleet_request_id)
            .cloned()
            .unwrap_or_default())
    }
}

#[async_trait]
impl AutomationApi for InMemoryCloud {
    async fn start_automation(
        &self,
        document_name: &str,
        instance_id: &str,
    ) -> Result<String, ProviderError> {
        let mut state = self.inner.lock();
        state.calls.push(CloudCall::StartAutomation {
            document_name: document_name.to_string(),
            instance_id: instance_id.to_string(),
        });
        state.automation_counter += 1;
        Ok(format!("exec-{}", state.automation_counter))
    }
}
