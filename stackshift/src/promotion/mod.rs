//! The image-promotion pipeline.
//!
//! This module sequences the promotion steps:
//!
//! 1. [`inspector`] - validate that the baked image is available.
//! 2. [`tagger`] - stamp ownership tags on the image and its snapshots.
//! 3. [`merger`] - merge the new image id into the stack parameters.
//! 4. [`driver`] - submit the update and poll it to a terminal status.
//! 5. [`sweeper`] - retire everything the new image replaces.
//!
//! Each step's output is the next step's input; no step is re-entrant
//! mid-sequence, and the first failure aborts the remainder with old
//! resources preserved.

pub mod driver;
pub mod inspector;
pub mod merger;
pub mod orchestrator;
pub mod sweeper;
pub mod tagger;

#[cfg(test)]
mod integration_tests;

pub use driver::{UpdateDriver, DEFAULT_POLL_INTERVAL};
pub use merger::{
    ParameterOverrides, ADDITIONAL_DISK_PARAMETER, IMAGE_ID_PARAMETER,
};
pub use orchestrator::{Promotion, PromotionReport};
pub use sweeper::{LiveResources, SweepReport};
