//! Errors that reach the caller. Parsing-tier misses never show up here;
//! they fall through to the next tier or a default value instead.

use thiserror::Error;

/// Everything an analysis request can fail with. `Display` is always a
/// user-facing sentence; raw upstream payloads stay in `detail` for logs.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AnalysisError {
    #[error("Missing configuration: set {missing} before running an analysis.")]
    Configuration { missing: String },

    #[error("Please enter a profession or topic to analyze.")]
    EmptySubject,

    #[error("The trend model returned an empty response. Try again with a different subject.")]
    UpstreamEmpty,

    #[error("The trend model is rate limited right now. Wait a minute and try again.")]
    RateLimited,

    #[error("Access to the trend model was denied. Check that the API key is valid and the API is enabled for it.")]
    AccessDenied,

    #[error("The trend model request failed. Please try again shortly.")]
    Upstream { detail: String },

    #[error("Could not extract structured data from the model response.")]
    ExtractionFailure,
}

impl AnalysisError {
    /// Stable machine-readable kind, used in API bodies and metric labels.
    pub fn kind(&self) -> &'static str {
        match self {
            AnalysisError::Configuration { .. } => "configuration",
            AnalysisError::EmptySubject => "empty_subject",
            AnalysisError::UpstreamEmpty => "upstream_empty",
            AnalysisError::RateLimited => "rate_limited",
            AnalysisError::AccessDenied => "access_denied",
            AnalysisError::Upstream { .. } => "upstream",
            AnalysisError::ExtractionFailure => "extraction_failure",
        }
    }

    /// HTTP status the API layer answers with.
    pub fn status_code(&self) -> u16 {
        match self {
            AnalysisError::Configuration { .. } => 500,
            AnalysisError::EmptySubject => 400,
            AnalysisError::UpstreamEmpty => 502,
            AnalysisError::RateLimited => 429,
            AnalysisError::AccessDenied => 502,
            AnalysisError::Upstream { .. } => 502,
            AnalysisError::ExtractionFailure => 422,
        }
    }

    /// Map a failed upstream call (HTTP status and/or payload) onto the taxonomy.
    /// Status markers win over payload text; unknown failures become `Upstream`.
    pub fn from_upstream_failure(status: Option<u16>, payload: &str) -> Self {
        let upper: String = payload
            .chars()
            .filter(|c| !c.is_whitespace())
            .collect::<String>()
            .to_ascii_uppercase();
        if status == Some(429) || upper.contains("RESOURCE_EXHAUSTED") || upper.contains("\"CODE\":429") {
            return AnalysisError::RateLimited;
        }
        if status == Some(403) || upper.contains("PERMISSION_DENIED") {
            return AnalysisError::AccessDenied;
        }
        let detail = match status {
            Some(code) => format!("status {code}: {}", truncate(payload, 200)),
            None => truncate(payload, 200),
        };
        AnalysisError::Upstream { detail }
    }
}

fn truncate(s: &str, max: usize) -> String {
    s.chars().take(max).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn classifies_rate_limit_markers() {
        assert_eq!(
            AnalysisError::from_upstream_failure(Some(429), ""),
            AnalysisError::RateLimited
        );
        assert_eq!(
            AnalysisError::from_upstream_failure(None, r#"{"error":{"status":"RESOURCE_EXHAUSTED"}}"#),
            AnalysisError::RateLimited
        );
    }

    #[test]
    fn classifies_permission_denied() {
        assert_eq!(
            AnalysisError::from_upstream_failure(Some(403), "nope"),
            AnalysisError::AccessDenied
        );
        assert_eq!(
            AnalysisError::from_upstream_failure(Some(400), "status: PERMISSION_DENIED"),
            AnalysisError::AccessDenied
        );
    }

    #[test]
    fn unknown_failures_hide_raw_payload() {
        let err = AnalysisError::from_upstream_failure(Some(500), "stack trace goes here");
        assert_eq!(err.kind(), "upstream");
        assert!(!err.to_string().contains("stack trace"));
    }

    #[test]
    fn configuration_message_names_the_variable() {
        let err = AnalysisError::Configuration {
            missing: "GEMINI_API_KEY".into(),
        };
        assert!(err.to_string().contains("GEMINI_API_KEY"));
        assert_eq!(err.status_code(), 500);
    }
}
