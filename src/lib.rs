// src/lib.rs
// Public library surface for the binary and integration tests.

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod extract;
pub mod metrics;
pub mod model;
pub mod report;
pub mod session;

// ---- Re-exports for stable public API ----
pub use crate::api::{create_router, AppState};
pub use crate::config::{ParsePolicy, PolicyMode};
pub use crate::engine::{build_report, run_analysis};
pub use crate::error::AnalysisError;
pub use crate::report::{KeywordRecord, MarketReport, Source, Tier, Trend};

use tracing::{info, warn};

/// Build the app state from config files + env, the way the binary does.
/// A model that cannot be configured does not stop startup: requests then fail
/// with `AnalysisError::Configuration` before any network call.
pub fn app_state_from_env() -> anyhow::Result<AppState> {
    let policy = config::policy::load_policy_default()?;
    let model_cfg = config::ModelConfig::load_from_file(config::model::DEFAULT_MODEL_CONFIG_PATH)?;

    let model: model::DynTrendModel = match model::build_model(&model_cfg) {
        Ok(m) => m,
        Err(error) => {
            warn!(kind = error.kind(), "trend model not configured: {error}");
            std::sync::Arc::new(model::UnconfiguredModel { error })
        }
    };
    info!(
        provider = model.provider_name(),
        mode = ?policy.mode,
        "app state ready"
    );
    Ok(AppState::new(model, policy))
}
