use thiserror::Error;

/// Failure taxonomy for a single aerial view request.
///
/// Nothing here is retried or recovered internally; the HTTP layer maps
/// each variant to a status code and the failure stays isolated to its
/// request.
#[derive(Debug, Error)]
pub enum AerialViewError {
    /// Malformed or out-of-range input, one entry per offending field.
    #[error("validation failed: {}", .0.join("; "))]
    Validation(Vec<String>),

    /// A required configuration value is missing or unreadable.
    #[error("service misconfigured: {0}")]
    Config(String),

    /// The imagery provider call failed.
    #[error("failed to fetch satellite imagery: {0}")]
    Imagery(String),

    /// The model provider call failed.
    #[error("failed to generate aerial view description: {0}")]
    Generation(String),

    /// The model answered, but produced no usable text.
    #[error("failed to generate aerial view description: model returned no text")]
    EmptyGeneration,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_error_enumerates_fields() {
        let err = AerialViewError::Validation(vec![
            "latitude 95 is outside -90..=90".to_string(),
            "zoom 30 is outside 0..=22".to_string(),
        ]);

        let msg = err.to_string();
        assert!(msg.contains("latitude 95"));
        assert!(msg.contains("zoom 30"));
    }

    #[test]
    fn empty_generation_reads_as_generation_failure() {
        let msg = AerialViewError::EmptyGeneration.to_string();
        assert!(msg.contains("generate aerial view"));
        assert!(msg.contains("no text"));
    }
}
