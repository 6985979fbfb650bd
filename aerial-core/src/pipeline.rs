//! The per-request pipeline: validate, fetch imagery, generate, format.
//!
//! Strictly sequential; the model call consumes the fetched image, so
//! the two outbound calls are never issued concurrently for one
//! request. No state survives the request.

use crate::{
    error::AerialViewError,
    model::{AerialViewRequest, AerialViewResponse},
    provider::{DescriptionGenerator, ImageryProvider},
};

/// Run one request through the pipeline. Both collaborators come in as
/// trait objects so tests can inject fakes.
pub async fn generate_aerial_view(
    request: &AerialViewRequest,
    imagery: &dyn ImageryProvider,
    generator: &dyn DescriptionGenerator,
) -> Result<AerialViewResponse, AerialViewError> {
    request.validate()?;

    let image = imagery.fetch_image(request).await?;
    let prompt = build_prompt(request);
    let description = generator.describe(&image, &prompt).await?;

    Ok(AerialViewResponse::success(request, description))
}

/// Fold the informational year/altitude fields into the model prompt.
/// They never change which tile is fetched; the imagery provider only
/// serves present-day tiles.
pub fn build_prompt(request: &AerialViewRequest) -> String {
    format!(
        "This satellite image shows the area around latitude {lat}, longitude {lon}, \
         viewed from roughly {altitude} meters altitude as of the year {year}.\n\n\
         User request: {prompt}",
        lat = request.latitude,
        lon = request.longitude,
        altitude = request.altitude,
        year = request.year,
        prompt = request.text_prompt,
    )
}
