//! Data model for images, snapshots, ownership tags and stack state.
//!
//! These types mirror the provider wire format closely enough to be fed
//! straight from control-plane responses, while keeping the invariants the
//! workflows rely on (value-XOR-previous parameters, total status
//! classification) enforced in one place.

mod image;
mod snapshot;
mod stack;
mod tags;

pub use image::{BlockDeviceMapping, Image, ImageState};
pub use snapshot::Snapshot;
pub use stack::{StackDescription, StackParameter, StackStatus, StatusClass};
pub use tags::{
    OwnershipTags, Tag, TagFilter, ADDITIONAL_DISK_TAG_KEY,
    AUTOMATION_ID_TAG_KEY, MEMBERSHIP_TAG_KEY, STACK_NAME_TAG_KEY,
};
