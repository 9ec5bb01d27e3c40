//! Test doubles for the cloud capability traits.
//!
//! [`InMemoryCloud`] backs the crate's own tests and is exported so
//! embedders can exercise their wiring without a real control plane.

mod fakes;

pub use fakes::{CloudCall, InMemoryCloud};
