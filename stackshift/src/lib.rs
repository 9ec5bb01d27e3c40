//! # Stackshift
//!
//! Stackshift promotes a freshly baked machine image into the active
//! deployment configuration of a running infrastructure stack, then retires
//! everything the image replaces.
//!
//! The promotion workflow guarantees one of two consistent end states:
//!
//! - **Promoted**: the new image is live and superseded images/snapshots
//!   are deregistered and deleted.
//! - **Aborted**: the first failing step stops the run and every previously
//!   provisioned resource is preserved for inspection.
//!
//! All cloud control-plane calls go through the capability traits in
//! [`cloud`], so embedders inject real clients and tests inject fakes.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use stackshift::prelude::*;
//! use std::sync::Arc;
//!
//! let config = PromotionConfig::from_env()?;
//! let promotion = Promotion::new(images, stacks, config);
//!
//! let event = ImageCreatedEvent::from_json(&payload)?;
//! let report = promotion.run(&event, &CancellationToken::new()).await?;
//! ```

#![forbid(unsafe_code)]
#![warn(
    clippy::all,
    clippy::pedantic,
    missing_docs,
    rust_2018_idioms
)]
#![allow(
    clippy::module_name_repetitions,
    clippy::must_use_candidate,
    clippy::missing_errors_doc,
    clippy::missing_panics_doc
)]

pub mod cancellation;
pub mod cloud;
pub mod config;
pub mod errors;
pub mod events;
pub mod model;
pub mod observability;
pub mod promotion;
pub mod savestate;
pub mod testing;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::cancellation::CancellationToken;
    pub use crate::cloud::{
        AutomationApi, FleetApi, ImageApi, ProviderError, StackApi,
        StackUpdateRequest,
    };
    pub use crate::config::PromotionConfig;
    pub use crate::errors::{
        ImageNotReadyError, PromotionError, StackUpdateFailedError,
    };
    pub use crate::events::{ImageCreatedEvent, InstanceStopEvent};
    pub use crate::model::{
        BlockDeviceMapping, Image, ImageState, OwnershipTags, Snapshot,
        StackDescription, StackParameter, StackStatus, StatusClass, Tag,
        TagFilter,
    };
    pub use crate::promotion::{
        LiveResources, ParameterOverrides, Promotion, PromotionReport,
        SweepReport, UpdateDriver,
    };
    pub use crate::savestate::handle_instance_stop;
}
