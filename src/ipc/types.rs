use std::collections::HashMap;

use serde::Deserialize;

use crate::calc::BatchOutcome;
use crate::config::BatchConfig;

#[derive(Debug, Deserialize, Clone)]
pub struct Request {
    pub id: String,
    pub method: String,
    #[serde(default)]
    pub params: serde_json::Value,
}

#[derive(Default)]
pub struct AppState {
    /// Applied to every batch; a request's own `config` patches over it.
    pub config: BatchConfig,
    /// Latest outcome per batch id. A recalculation replaces the entry.
    pub runs: HashMap<String, BatchOutcome>,
}
