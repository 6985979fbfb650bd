use serde::{Deserialize, Serialize};

use crate::error::AerialViewError;

/// Static image providers cap the rendered tile size.
pub const MIN_DIMENSION_PX: u32 = 1;
pub const MAX_DIMENSION_PX: u32 = 1280;

/// Valid zoom levels for web-mercator static tiles.
pub const MAX_ZOOM: u32 = 22;

#[derive(Debug, Clone, Deserialize)]
pub struct AerialViewRequest {
    pub latitude: f64,
    pub longitude: f64,
    pub text_prompt: String,

    /// Informational only; present-day imagery is fetched regardless.
    #[serde(default = "default_year")]
    pub year: i32,

    /// Viewing altitude in meters. Informational only.
    #[serde(default = "default_altitude")]
    pub altitude: u32,

    #[serde(default = "default_zoom")]
    pub zoom: u32,

    #[serde(default = "default_dimension")]
    pub width: u32,

    #[serde(default = "default_dimension")]
    pub height: u32,
}

fn default_year() -> i32 {
    2024
}

fn default_altitude() -> u32 {
    1000
}

fn default_zoom() -> u32 {
    15
}

fn default_dimension() -> u32 {
    512
}

impl AerialViewRequest {
    /// Check every field against its bounds and report all violations at
    /// once. Purely local; runs before any network call.
    pub fn validate(&self) -> Result<(), AerialViewError> {
        let mut problems = Vec::new();

        if !(-90.0..=90.0).contains(&self.latitude) {
            problems.push(format!("latitude {} is outside -90..=90", self.latitude));
        }
        if !(-180.0..=180.0).contains(&self.longitude) {
            problems.push(format!("longitude {} is outside -180..=180", self.longitude));
        }
        if self.zoom > MAX_ZOOM {
            problems.push(format!("zoom {} is outside 0..={MAX_ZOOM}", self.zoom));
        }
        if !(MIN_DIMENSION_PX..=MAX_DIMENSION_PX).contains(&self.width) {
            problems.push(format!(
                "width {} is outside {MIN_DIMENSION_PX}..={MAX_DIMENSION_PX}",
                self.width
            ));
        }
        if !(MIN_DIMENSION_PX..=MAX_DIMENSION_PX).contains(&self.height) {
            problems.push(format!(
                "height {} is outside {MIN_DIMENSION_PX}..={MAX_DIMENSION_PX}",
                self.height
            ));
        }

        if problems.is_empty() {
            Ok(())
        } else {
            Err(AerialViewError::Validation(problems))
        }
    }
}

/// Raw tile fetched from the imagery provider; the typed intermediate
/// between the two outbound calls of one request.
#[derive(Debug, Clone)]
pub struct SatelliteImage {
    pub bytes: Vec<u8>,
    pub mime_type: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResponseStatus {
    Success,
    Error,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AerialViewResponse {
    pub latitude: f64,
    pub longitude: f64,
    pub year: i32,
    pub altitude: u32,
    pub description: String,
    pub status: ResponseStatus,
}

impl AerialViewResponse {
    /// Echo the request's passthrough fields next to the generated text.
    /// Only reached when a description exists, so the status is always
    /// `success` here.
    pub fn success(request: &AerialViewRequest, description: String) -> Self {
        Self {
            latitude: request.latitude,
            longitude: request.longitude,
            year: request.year,
            altitude: request.altitude,
            description,
            status: ResponseStatus::Success,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthChecks {
    pub project_configured: bool,
    pub token_configured: bool,
}

/// Configuration readiness report, produced without any network call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthReport {
    pub status: HealthStatus,
    pub checks: HealthChecks,
}

impl HealthReport {
    pub fn is_healthy(&self) -> bool {
        self.status == HealthStatus::Healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn request(latitude: f64, longitude: f64) -> AerialViewRequest {
        AerialViewRequest {
            latitude,
            longitude,
            text_prompt: "Describe this".to_string(),
            year: default_year(),
            altitude: default_altitude(),
            zoom: default_zoom(),
            width: default_dimension(),
            height: default_dimension(),
        }
    }

    #[test]
    fn deserialization_fills_optional_fields_with_defaults() {
        let json = r#"{"latitude": 37.7749, "longitude": -122.4194, "text_prompt": "Describe this"}"#;
        let req: AerialViewRequest = serde_json::from_str(json).expect("minimal payload parses");

        assert_eq!(req.year, 2024);
        assert_eq!(req.altitude, 1000);
        assert_eq!(req.zoom, 15);
        assert_eq!(req.width, 512);
        assert_eq!(req.height, 512);
    }

    #[test]
    fn validate_accepts_geographic_extremes() {
        for (lat, lon) in [(-90.0, -180.0), (90.0, 180.0), (0.0, 0.0), (37.7749, -122.4194)] {
            request(lat, lon).validate().expect("in-range coordinates must pass");
        }
    }

    #[test]
    fn validate_rejects_out_of_range_coordinates() {
        let err = request(95.0, -200.0).validate().unwrap_err();
        let msg = err.to_string();
        assert!(msg.contains("latitude 95"));
        assert!(msg.contains("longitude -200"));

        assert!(request(-90.001, 0.0).validate().is_err());
        assert!(request(0.0, 180.001).validate().is_err());
    }

    #[test]
    fn validate_rejects_nan_coordinates() {
        assert!(request(f64::NAN, 0.0).validate().is_err());
        assert!(request(0.0, f64::NAN).validate().is_err());
    }

    #[test]
    fn validate_enforces_pixel_bounds() {
        let mut req = request(0.0, 0.0);
        req.width = 0;
        req.height = 1281;

        let msg = req.validate().unwrap_err().to_string();
        assert!(msg.contains("width 0"));
        assert!(msg.contains("height 1281"));

        req.width = 1;
        req.height = 1280;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn validate_enforces_zoom_bounds() {
        let mut req = request(0.0, 0.0);
        req.zoom = 23;
        assert!(req.validate().unwrap_err().to_string().contains("zoom 23"));

        req.zoom = 22;
        assert!(req.validate().is_ok());
        req.zoom = 0;
        assert!(req.validate().is_ok());
    }

    #[test]
    fn success_response_echoes_request_fields() {
        let req = request(37.7749, -122.4194);
        let resp =
            AerialViewResponse::success(&req, "A dense urban grid with a visible park.".to_string());

        assert_eq!(resp.latitude, 37.7749);
        assert_eq!(resp.longitude, -122.4194);
        assert_eq!(resp.year, 2024);
        assert_eq!(resp.altitude, 1000);
        assert_eq!(resp.description, "A dense urban grid with a visible park.");

        let json = serde_json::to_value(&resp).expect("response serializes");
        assert_eq!(json["status"], "success");
    }

    #[test]
    fn response_status_serializes_lowercase() {
        assert_eq!(serde_json::to_value(ResponseStatus::Success).unwrap(), "success");
        assert_eq!(serde_json::to_value(ResponseStatus::Error).unwrap(), "error");
    }

    #[test]
    fn health_report_serializes_lowercase() {
        let report = HealthReport {
            status: HealthStatus::Unhealthy,
            checks: HealthChecks { project_configured: true, token_configured: false },
        };
        assert!(!report.is_healthy());

        let json = serde_json::to_value(&report).expect("report serializes");
        assert_eq!(json["status"], "unhealthy");
        assert_eq!(json["checks"]["project_configured"], true);
        assert_eq!(json["checks"]["token_configured"], false);
    }
}
