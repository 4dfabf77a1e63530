use crate::config::BatchConfig;
use crate::ipc::error::{calc_err, err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn config_json(req: &Request, config: &BatchConfig) -> serde_json::Value {
    match serde_json::to_value(config) {
        Ok(v) => ok(&req.id, json!({ "config": v })),
        Err(e) => err(&req.id, "internal", e.to_string()),
    }
}

fn handle_config_update(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(patch) = req.params.get("patch").and_then(|v| v.as_object()) else {
        return err(&req.id, "bad_params", "patch must be an object");
    };
    match state.config.merge_patch(patch) {
        Ok(merged) => {
            tracing::info!(fields = ?patch.keys().collect::<Vec<_>>(), "default config updated");
            state.config = merged;
            config_json(req, &state.config)
        }
        Err(e) => calc_err(&req.id, e),
    }
}

fn handle_config_reset(state: &mut AppState, req: &Request) -> serde_json::Value {
    state.config = BatchConfig::default();
    config_json(req, &state.config)
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "config.defaults" => Some(config_json(req, &BatchConfig::default())),
        "config.get" => Some(config_json(req, &state.config)),
        "config.update" => Some(handle_config_update(state, req)),
        "config.reset" => Some(handle_config_reset(state, req)),
        _ => None,
    }
}
