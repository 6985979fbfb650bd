use async_trait::async_trait;
use reqwest::Client;
use tracing::debug;

use crate::{
    config::Config,
    error::AerialViewError,
    model::{AerialViewRequest, SatelliteImage},
};

use super::ImageryProvider;

const STYLE_BASE_URL: &str = "https://api.mapbox.com/styles/v1/mapbox/satellite-v9/static";
const DEFAULT_MIME_TYPE: &str = "image/jpeg";

#[derive(Clone)]
pub struct MapboxImagery {
    access_token: String,
    http: Client,
}

// The access token stays out of Debug output and log lines.
impl std::fmt::Debug for MapboxImagery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MapboxImagery").field("access_token", &"<redacted>").finish()
    }
}

impl MapboxImagery {
    pub fn new(access_token: String) -> Self {
        Self { access_token, http: Client::new() }
    }

    pub fn from_config(config: &Config) -> Result<Self, AerialViewError> {
        let token = config.map_token.as_deref().ok_or_else(|| {
            AerialViewError::Config(
                "Mapbox access token not configured (set MAPBOX_ACCESS_TOKEN)".to_string(),
            )
        })?;

        Ok(Self::new(token.to_owned()))
    }

    /// Static image URL without the credential; the token rides as a
    /// query parameter at request time so the URL itself is loggable.
    fn static_map_url(request: &AerialViewRequest) -> String {
        format!(
            "{STYLE_BASE_URL}/{lon},{lat},{zoom}/{width}x{height}",
            lon = request.longitude,
            lat = request.latitude,
            zoom = request.zoom,
            width = request.width,
            height = request.height,
        )
    }
}

#[async_trait]
impl ImageryProvider for MapboxImagery {
    async fn fetch_image(
        &self,
        request: &AerialViewRequest,
    ) -> Result<SatelliteImage, AerialViewError> {
        let url = Self::static_map_url(request);

        debug!(
            latitude = request.latitude,
            longitude = request.longitude,
            zoom = request.zoom,
            "fetching satellite tile"
        );

        let res = self
            .http
            .get(&url)
            .query(&[("access_token", self.access_token.as_str())])
            .send()
            .await
            .map_err(|e| {
                AerialViewError::Imagery(format!("request to imagery provider failed: {e}"))
            })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(classify_failure(status, &body));
        }

        let mime_type = res
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
            .unwrap_or_else(|| DEFAULT_MIME_TYPE.to_string());

        let bytes = res.bytes().await.map_err(|e| {
            AerialViewError::Imagery(format!("failed to read imagery response body: {e}"))
        })?;

        debug!(bytes = bytes.len(), %mime_type, "satellite tile fetched");

        Ok(SatelliteImage { bytes: bytes.to_vec(), mime_type })
    }
}

fn classify_failure(status: reqwest::StatusCode, body: &str) -> AerialViewError {
    let body = truncate_body(body);

    match status.as_u16() {
        401 | 403 => AerialViewError::Imagery(format!(
            "imagery provider rejected the access token (status {status}): {body}"
        )),
        404 | 422 => AerialViewError::Imagery(format!(
            "imagery provider rejected the requested coordinates (status {status}): {body}"
        )),
        _ => AerialViewError::Imagery(format!(
            "imagery provider request failed with status {status}: {body}"
        )),
    }
}

fn truncate_body(body: &str) -> String {
    const MAX: usize = 200;
    if body.len() > MAX {
        let cut = body.char_indices().take_while(|(i, _)| *i <= MAX).last().map_or(0, |(i, _)| i);
        format!("{}...", &body[..cut])
    } else {
        body.to_string()
    }
}
