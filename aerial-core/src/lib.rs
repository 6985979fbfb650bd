//! Core library for the aerial view service.
//!
//! This crate defines:
//! - Configuration & credentials handling
//! - Abstractions over the imagery and model providers
//! - Shared domain models (requests, responses, health report)
//! - The request pipeline gluing the two provider calls together
//!
//! It is used by `aerial-server`, but can also be reused by other binaries or services.

pub mod config;
pub mod error;
pub mod model;
pub mod pipeline;
pub mod provider;

pub use config::Config;
pub use error::AerialViewError;
pub use model::{AerialViewRequest, AerialViewResponse, HealthReport, SatelliteImage};
pub use provider::{DescriptionGenerator, ImageryProvider};
