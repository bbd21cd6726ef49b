//! Trend model adapter: provider abstraction over the generative model call.
//!
//! The core only sees `TrendModel::generate` → raw text plus normalized citations.
//! Failures are mapped onto `AnalysisError` here, at the boundary.

pub mod prompt;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use metrics::counter;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::config::model::ModelConfig;
use crate::error::AnalysisError;
use crate::report::Source;

pub use prompt::build_prompt;

/// Raw model output as handed to the parsing pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ModelResponse {
    pub text: String,
    pub sources: Vec<Source>,
}

#[async_trait]
pub trait TrendModel: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<ModelResponse, AnalysisError>;
    /// Provider name for diagnostics.
    fn provider_name(&self) -> &'static str;
}

/// Convenient alias used by callers.
pub type DynTrendModel = Arc<dyn TrendModel>;

/// Factory: build a model according to config and environment variables.
///
/// * If `AI_TEST_MODE=mock` or `provider = "mock"`, returns the canned mock.
/// * `provider = "gemini"` requires a resolvable API key; otherwise this fails
///   with `AnalysisError::Configuration` before any request is made.
pub fn build_model(config: &ModelConfig) -> Result<DynTrendModel, AnalysisError> {
    let test_mock = std::env::var("AI_TEST_MODE")
        .map(|v| v == "mock")
        .unwrap_or(false);
    if test_mock || config.provider == "mock" {
        return Ok(Arc::new(MockModel::sample()));
    }

    match config.provider.as_str() {
        "gemini" => {
            let key = config.resolve_api_key()?;
            Ok(Arc::new(GeminiProvider::new(config, key)?))
        }
        other => Err(AnalysisError::Configuration {
            missing: format!("a supported model provider (got \"{other}\", expected \"gemini\")"),
        }),
    }
}

// ------------------------------------------------------------
// Gemini provider
// ------------------------------------------------------------

const GEMINI_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini `generateContent` with Google Search grounding.
pub struct GeminiProvider {
    http: reqwest::Client,
    api_key: String,
    model: String,
}

impl GeminiProvider {
    pub fn new(config: &ModelConfig, api_key: String) -> Result<Self, AnalysisError> {
        let http = reqwest::Client::builder()
            .user_agent("market-trend-report/0.1")
            .connect_timeout(Duration::from_secs(5))
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| AnalysisError::Upstream {
                detail: format!("http client: {e}"),
            })?;
        Ok(Self {
            http,
            api_key,
            model: config.model.clone(),
        })
    }
}

#[derive(Serialize)]
struct Part<'a> {
    text: &'a str,
}
#[derive(Serialize)]
struct Content<'a> {
    parts: Vec<Part<'a>>,
}
#[derive(Serialize)]
struct GenerateReq<'a> {
    contents: Vec<Content<'a>>,
    tools: Vec<serde_json::Value>,
}

#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GenerateResp {
    #[serde(default)]
    candidates: Vec<Candidate>,
}
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct Candidate {
    #[serde(default)]
    content: Option<CandidateContent>,
    #[serde(default)]
    grounding_metadata: Option<GroundingMetadata>,
}
#[derive(Deserialize, Default)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<RespPart>,
}
#[derive(Deserialize, Default)]
struct RespPart {
    #[serde(default)]
    text: Option<String>,
}
#[derive(Deserialize, Default)]
#[serde(rename_all = "camelCase")]
struct GroundingMetadata {
    #[serde(default)]
    grounding_chunks: Vec<GroundingChunk>,
}
#[derive(Deserialize, Default)]
struct GroundingChunk {
    #[serde(default)]
    web: Option<WebChunk>,
}
#[derive(Deserialize, Default)]
struct WebChunk {
    #[serde(default)]
    uri: Option<String>,
    #[serde(default)]
    title: Option<String>,
}

/// Pull text and citations out of a `generateContent` body.
fn response_from_body(body: GenerateResp) -> Result<ModelResponse, AnalysisError> {
    let Some(first) = body.candidates.into_iter().next() else {
        return Err(AnalysisError::UpstreamEmpty);
    };
    let text = first
        .content
        .map(|c| {
            c.parts
                .into_iter()
                .filter_map(|p| p.text)
                .collect::<Vec<_>>()
                .join("")
        })
        .unwrap_or_default();
    if text.trim().is_empty() {
        return Err(AnalysisError::UpstreamEmpty);
    }
    let sources = first
        .grounding_metadata
        .map(|g| g.grounding_chunks)
        .unwrap_or_default()
        .into_iter()
        .filter_map(|c| c.web)
        .map(|w| Source::from_parts(w.title.as_deref(), w.uri.as_deref()))
        .collect();
    Ok(ModelResponse { text, sources })
}

fn record_upstream_error(err: &AnalysisError) {
    counter!("upstream_errors_total", "kind" => err.kind()).increment(1);
}

#[async_trait]
impl TrendModel for GeminiProvider {
    async fn generate(&self, prompt: &str) -> Result<ModelResponse, AnalysisError> {
        let req = GenerateReq {
            contents: vec![Content {
                parts: vec![Part { text: prompt }],
            }],
            tools: vec![serde_json::json!({ "google_search": {} })],
        };
        let url = format!("{GEMINI_BASE}/{}:generateContent", self.model);

        let resp = match self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&req)
            .send()
            .await
        {
            Ok(r) => r,
            Err(e) => {
                let detail = if e.is_timeout() {
                    "request timed out".to_string()
                } else {
                    format!("transport: {e}")
                };
                let err = AnalysisError::Upstream { detail };
                warn!(target: "model", provider = "gemini", error = ?err, "model call failed");
                record_upstream_error(&err);
                return Err(err);
            }
        };

        let status = resp.status();
        if !status.is_success() {
            let payload = resp.text().await.unwrap_or_default();
            let err = AnalysisError::from_upstream_failure(Some(status.as_u16()), &payload);
            warn!(target: "model", provider = "gemini", status = status.as_u16(), kind = err.kind(), "model call rejected");
            record_upstream_error(&err);
            return Err(err);
        }

        let body: GenerateResp = resp.json().await.map_err(|e| {
            let err = AnalysisError::Upstream {
                detail: format!("decode: {e}"),
            };
            record_upstream_error(&err);
            err
        })?;
        response_from_body(body).inspect_err(record_upstream_error)
    }

    fn provider_name(&self) -> &'static str {
        "gemini"
    }
}

// ------------------------------------------------------------
// Mock + unconfigured
// ------------------------------------------------------------

const SAMPLE_RESPONSE: &str = "SUMMARY: Interest keeps growing in practical, skills-based topics. \
Searches for hands-on training and tooling are rising while generic terms hold steady.\n\
DATA_TABLE:\n\
Keyword | Monthly Search Volume | Trend | YoY Change %\n\
1. Online courses | 18,000 | Up | 22%\n\
2. Certification | 12,500 | Up | 9%\n\
3. Salary guide | 9,800 | Stable | 1%\n\
4. Starter tools | 7,400 | Up | 14%\n\
5. Industry news | 5,100 | Down | -6%\n\
KEYWORDS_END\n";

/// Deterministic model for tests/local runs.
#[derive(Debug, Clone)]
pub struct MockModel {
    pub fixed: ModelResponse,
}

impl MockModel {
    pub fn new(text: impl Into<String>, sources: Vec<Source>) -> Self {
        Self {
            fixed: ModelResponse {
                text: text.into(),
                sources,
            },
        }
    }

    pub fn sample() -> Self {
        Self::new(
            SAMPLE_RESPONSE,
            vec![Source::from_parts(Some("Sample market survey"), None)],
        )
    }
}

#[async_trait]
impl TrendModel for MockModel {
    async fn generate(&self, _prompt: &str) -> Result<ModelResponse, AnalysisError> {
        if self.fixed.text.trim().is_empty() {
            return Err(AnalysisError::UpstreamEmpty);
        }
        Ok(self.fixed.clone())
    }
    fn provider_name(&self) -> &'static str {
        "mock"
    }
}

/// Stands in when configuration failed at startup: every call reports the
/// missing setting without touching the network.
#[derive(Debug, Clone)]
pub struct UnconfiguredModel {
    pub error: AnalysisError,
}

#[async_trait]
impl TrendModel for UnconfiguredModel {
    async fn generate(&self, _prompt: &str) -> Result<ModelResponse, AnalysisError> {
        Err(self.error.clone())
    }
    fn provider_name(&self) -> &'static str {
        "unconfigured"
    }
}
