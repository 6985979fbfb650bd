use async_trait::async_trait;
use base64::Engine;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::{config::Config, error::AerialViewError, model::SatelliteImage};

use super::DescriptionGenerator;

const VERTEX_HOST_SUFFIX: &str = "aiplatform.googleapis.com";
const API_KEY_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

const TEMPERATURE: f32 = 0.2;
const MAX_OUTPUT_TOKENS: u32 = 2048;

#[derive(Clone)]
enum GeminiAuth {
    /// Bearer token read once from the configured credentials file.
    Bearer(String),
    /// API key attached as a query parameter.
    ApiKey(String),
}

#[derive(Clone)]
pub struct GeminiGenerator {
    model: String,
    url: String,
    auth: GeminiAuth,
    http: Client,
}

// Credentials stay out of Debug output.
impl std::fmt::Debug for GeminiGenerator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let auth = match self.auth {
            GeminiAuth::Bearer(_) => "bearer",
            GeminiAuth::ApiKey(_) => "api-key",
        };

        f.debug_struct("GeminiGenerator")
            .field("model", &self.model)
            .field("url", &self.url)
            .field("auth", &auth)
            .finish()
    }
}

impl GeminiGenerator {
    /// Requires a project id plus one credential source: a credentials
    /// file (bearer token against the regional Vertex endpoint) or an
    /// API key (key-in-query against the Generative Language endpoint).
    pub fn from_config(config: &Config) -> Result<Self, AerialViewError> {
        let project_id = config.project_id.as_deref().ok_or_else(|| {
            AerialViewError::Config(
                "cloud project id not configured (set GOOGLE_CLOUD_PROJECT)".to_string(),
            )
        })?;

        let (url, auth) = if let Some(path) = &config.credentials_path {
            let token = std::fs::read_to_string(path).map_err(|e| {
                AerialViewError::Config(format!(
                    "failed to read credentials file {}: {e}",
                    path.display()
                ))
            })?;
            let token = token.trim().to_string();
            if token.is_empty() {
                return Err(AerialViewError::Config(format!(
                    "credentials file {} is empty",
                    path.display()
                )));
            }

            let url = format!(
                "https://{region}-{VERTEX_HOST_SUFFIX}/v1/projects/{project_id}\
                 /locations/{region}/publishers/google/models/{model}:generateContent",
                region = config.region,
                model = config.model,
            );
            (url, GeminiAuth::Bearer(token))
        } else if let Some(key) = &config.api_key {
            let url = format!("{API_KEY_BASE_URL}/models/{model}:generateContent", model = config.model);
            (url, GeminiAuth::ApiKey(key.clone()))
        } else {
            return Err(AerialViewError::Config(
                "no model credentials configured \
                 (set GEMINI_API_KEY or GOOGLE_APPLICATION_CREDENTIALS)"
                    .to_string(),
            ));
        };

        Ok(Self { model: config.model.clone(), url, auth, http: Client::new() })
    }
}

#[derive(Debug, Serialize)]
struct GenerateRequest {
    contents: Vec<Content>,
    generation_config: GenerationConfig,
}

#[derive(Debug, Serialize)]
struct Content {
    parts: Vec<RequestPart>,
}

#[derive(Debug, Serialize)]
struct RequestPart {
    #[serde(skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    inline_data: Option<InlineData>,
}

#[derive(Debug, Serialize)]
struct InlineData {
    mime_type: String,
    data: String,
}

#[derive(Debug, Serialize)]
struct GenerationConfig {
    temperature: f32,
    max_output_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    text: Option<String>,
}

/// Concatenated text of the first candidate, or None when the model
/// produced nothing usable.
fn first_candidate_text(response: &GenerateResponse) -> Option<String> {
    let content = response.candidates.first()?.content.as_ref()?;

    let parts: Vec<&str> = content
        .parts
        .iter()
        .filter_map(|p| p.text.as_deref())
        .filter(|t| !t.trim().is_empty())
        .collect();

    if parts.is_empty() { None } else { Some(parts.join("")) }
}

#[async_trait]
impl DescriptionGenerator for GeminiGenerator {
    async fn describe(
        &self,
        image: &SatelliteImage,
        prompt: &str,
    ) -> Result<String, AerialViewError> {
        let data = base64::engine::general_purpose::STANDARD.encode(&image.bytes);

        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart { text: Some(prompt.to_owned()), inline_data: None },
                    RequestPart {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: image.mime_type.clone(),
                            data,
                        }),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        debug!(model = %self.model, image_bytes = image.bytes.len(), "requesting description from model");

        let mut req = self.http.post(&self.url).json(&body);
        req = match &self.auth {
            GeminiAuth::Bearer(token) => req.bearer_auth(token),
            GeminiAuth::ApiKey(key) => req.query(&[("key", key.as_str())]),
        };

        let res = req.send().await.map_err(|e| {
            AerialViewError::Generation(format!("request to model provider failed: {e}"))
        })?;

        let status = res.status();
        if !status.is_success() {
            let body = res.text().await.unwrap_or_default();
            return Err(AerialViewError::Generation(format!(
                "model request failed with status {status}: {}",
                truncate_body(&body),
            )));
        }

        let parsed: GenerateResponse = res.json().await.map_err(|e| {
            AerialViewError::Generation(format!("failed to parse model response JSON: {e}"))
        })?;

        let text = first_candidate_text(&parsed).ok_or(AerialViewError::EmptyGeneration)?;

        debug!(chars = text.len(), "model produced description");

        Ok(text)
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

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn configured() -> Config {
        Config {
            project_id: Some("demo-project".to_string()),
            api_key: Some("test-key".to_string()),
            ..Config::default()
        }
    }

    #[test]
    fn from_config_requires_project_id() {
        let cfg = Config { api_key: Some("test-key".to_string()), ..Config::default() };
        let err = GeminiGenerator::from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("GOOGLE_CLOUD_PROJECT"));
    }

    #[test]
    fn from_config_requires_some_credential() {
        let cfg = Config { project_id: Some("demo-project".to_string()), ..Config::default() };
        let err = GeminiGenerator::from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("GEMINI_API_KEY"));
    }

    #[test]
    fn api_key_mode_uses_generative_language_endpoint() {
        let generator = GeminiGenerator::from_config(&configured()).expect("builds");

        assert_eq!(
            generator.url,
            "https://generativelanguage.googleapis.com/v1beta/models/gemini-2.0-flash:generateContent"
        );
        assert!(matches!(generator.auth, GeminiAuth::ApiKey(_)));
    }

    #[test]
    fn credentials_file_mode_uses_regional_vertex_endpoint() {
        let path = std::env::temp_dir().join("aerial-core-gemini-creds-test");
        std::fs::write(&path, "ya29.token\n").expect("write temp credentials");

        let cfg = Config {
            project_id: Some("demo-project".to_string()),
            credentials_path: Some(path.clone()),
            ..Config::default()
        };

        let generator = GeminiGenerator::from_config(&cfg).expect("builds");
        std::fs::remove_file(&path).ok();

        assert!(generator.url.starts_with("https://us-central1-aiplatform.googleapis.com/v1/"));
        assert!(generator.url.contains("/projects/demo-project/locations/us-central1/"));
        assert!(generator.url.ends_with("models/gemini-2.0-flash:generateContent"));
        assert!(matches!(generator.auth, GeminiAuth::Bearer(ref t) if t == "ya29.token"));
    }

    #[test]
    fn from_config_rejects_missing_credentials_file() {
        let cfg = Config {
            project_id: Some("demo-project".to_string()),
            credentials_path: Some(PathBuf::from("/nonexistent/creds")),
            ..Config::default()
        };

        let err = GeminiGenerator::from_config(&cfg).unwrap_err();
        assert!(err.to_string().contains("credentials file"));
    }

    #[test]
    fn first_candidate_text_joins_text_parts() {
        let response: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{
                "content": {
                    "parts": [
                        {"text": "A dense urban grid"},
                        {"text": " with a visible park."}
                    ]
                }
            }]
        }))
        .expect("response parses");

        assert_eq!(
            first_candidate_text(&response).as_deref(),
            Some("A dense urban grid with a visible park.")
        );
    }

    #[test]
    fn first_candidate_text_rejects_empty_responses() {
        let empty: GenerateResponse =
            serde_json::from_value(serde_json::json!({"candidates": []})).expect("parses");
        assert!(first_candidate_text(&empty).is_none());

        let blank: GenerateResponse = serde_json::from_value(serde_json::json!({
            "candidates": [{"content": {"parts": [{"text": "   "}]}}]
        }))
        .expect("parses");
        assert!(first_candidate_text(&blank).is_none());

        let no_content: GenerateResponse =
            serde_json::from_value(serde_json::json!({"candidates": [{}]})).expect("parses");
        assert!(first_candidate_text(&no_content).is_none());
    }

    #[test]
    fn request_body_inlines_image_as_base64() {
        let body = GenerateRequest {
            contents: vec![Content {
                parts: vec![
                    RequestPart { text: Some("Describe this".to_string()), inline_data: None },
                    RequestPart {
                        text: None,
                        inline_data: Some(InlineData {
                            mime_type: "image/jpeg".to_string(),
                            data: base64::engine::general_purpose::STANDARD.encode([1u8, 2, 3]),
                        }),
                    },
                ],
            }],
            generation_config: GenerationConfig {
                temperature: TEMPERATURE,
                max_output_tokens: MAX_OUTPUT_TOKENS,
            },
        };

        let json = serde_json::to_value(&body).expect("serializes");
        assert_eq!(json["contents"][0]["parts"][0]["text"], "Describe this");
        assert_eq!(json["contents"][0]["parts"][1]["inline_data"]["mime_type"], "image/jpeg");
        assert_eq!(json["contents"][0]["parts"][1]["inline_data"]["data"], "AQID");
        // text/inline_data are mutually exclusive per part
        assert!(json["contents"][0]["parts"][0].get("inline_data").is_none());
    }
}
