use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::Deserialize;

use crate::calc::Report;
use crate::config::DashboardConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

/// Session state. `report` is only ever replaced whole: set by a successful
/// generate, cleared by `dashboard.clear`.
pub struct AppState {
    pub config: DashboardConfig,
    pub report: Option<Report>,
    pub rng: ChaCha8Rng,
}

impl AppState {
    pub fn new() -> Self {
        Self::with_rng(ChaCha8Rng::from_entropy())
    }

    pub fn with_rng(rng: ChaCha8Rng) -> Self {
        Self {
            config: DashboardConfig::default(),
            report: None,
            rng,
        }
    }
}
