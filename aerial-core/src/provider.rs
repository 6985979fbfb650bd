use crate::{
    Config,
    error::AerialViewError,
    model::{AerialViewRequest, SatelliteImage},
    provider::{gemini::GeminiGenerator, mapbox::MapboxImagery},
};
use async_trait::async_trait;
use std::fmt::Debug;

pub mod gemini;
pub mod mapbox;

/// Fetches one satellite tile per request. Implementations make a single
/// attempt; retries are the caller's problem (and out of scope here).
#[async_trait]
pub trait ImageryProvider: Send + Sync + Debug {
    async fn fetch_image(
        &self,
        request: &AerialViewRequest,
    ) -> Result<SatelliteImage, AerialViewError>;
}

/// Turns image bytes plus a prompt into generated text with one blocking
/// multimodal model call.
#[async_trait]
pub trait DescriptionGenerator: Send + Sync + Debug {
    async fn describe(
        &self,
        image: &SatelliteImage,
        prompt: &str,
    ) -> Result<String, AerialViewError>;
}

/// Construct the imagery provider from config.
pub fn imagery_from_config(config: &Config) -> Result<Box<dyn ImageryProvider>, AerialViewError> {
    Ok(Box::new(MapboxImagery::from_config(config)?))
}

/// Construct the description generator from config.
pub fn generator_from_config(
    config: &Config,
) -> Result<Box<dyn DescriptionGenerator>, AerialViewError> {
    Ok(Box::new(GeminiGenerator::from_config(config)?))
}
