use crate::calc::{self, BatchMeta, CalcError, StudentInput};
use crate::config::BatchConfig;
use crate::ipc::error::{calc_err, err, ok};
use crate::ipc::types::{AppState, Request};
use serde::de::DeserializeOwned;
use serde_json::json;

fn required_param<T: DeserializeOwned>(req: &Request, key: &str) -> Result<T, CalcError> {
    let Some(raw) = req.params.get(key) else {
        return Err(CalcError::new("bad_params", format!("missing {}", key)));
    };
    serde_json::from_value(raw.clone())
        .map_err(|e| CalcError::new("bad_params", format!("invalid {}: {}", key, e)))
}

fn required_str(req: &Request, key: &str) -> Result<String, CalcError> {
    req.params
        .get(key)
        .and_then(|v| v.as_str())
        .map(|v| v.to_string())
        .ok_or_else(|| CalcError::new("bad_params", format!("missing {}", key)))
}

/// The request's `config` (if any) patched over the sidecar default.
fn effective_config(state: &AppState, req: &Request) -> Result<BatchConfig, CalcError> {
    let config = match req.params.get("config") {
        None => state.config.clone(),
        Some(v) if v.is_null() => state.config.clone(),
        Some(v) => {
            let Some(patch) = v.as_object() else {
                return Err(CalcError::new("bad_params", "config must be an object"));
            };
            state.config.merge_patch(patch)?
        }
    };
    config.into_effective()
}

fn parse_batch_request(
    state: &AppState,
    req: &Request,
) -> Result<(BatchMeta, BatchConfig, Vec<StudentInput>), CalcError> {
    let batch: BatchMeta = required_param(req, "batch")?;
    if batch.id.trim().is_empty() {
        return Err(CalcError::new("bad_params", "batch.id must not be blank"));
    }
    let config = effective_config(state, req)?;
    let students: Vec<StudentInput> = required_param(req, "students")?;
    calc::check_students(&students)?;
    Ok((batch, config, students))
}

fn handle_batch_calculate(state: &mut AppState, req: &Request) -> serde_json::Value {
    let (batch, config, students) = match parse_batch_request(state, req) {
        Ok(v) => v,
        Err(e) => {
            tracing::warn!(code = %e.code, message = %e.message, "batch rejected");
            return calc_err(&req.id, e);
        }
    };

    let batch_id = batch.id.clone();
    let outcome = calc::calculate_batch(batch, &students, &config);
    let result = match serde_json::to_value(&outcome) {
        Ok(v) => v,
        Err(e) => return err(&req.id, "internal", e.to_string()),
    };
    tracing::info!(
        batch = %batch_id,
        students = outcome.total_students,
        "batch calculated"
    );
    state.runs.insert(batch_id, outcome);
    ok(&req.id, result)
}

fn handle_batch_summary(state: &mut AppState, req: &Request) -> serde_json::Value {
    let batch_id = match required_str(req, "batchId") {
        Ok(v) => v,
        Err(e) => return calc_err(&req.id, e),
    };
    let Some(outcome) = state.runs.get(&batch_id) else {
        return calc_err(
            &req.id,
            CalcError::with_details(
                "not_found",
                "batch has not been calculated",
                json!({ "batchId": batch_id }),
            ),
        );
    };
    ok(
        &req.id,
        json!({
            "batch": outcome.batch,
            "summary": outcome.summary,
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "batch.calculate" => Some(handle_batch_calculate(state, req)),
        "batch.summary" => Some(handle_batch_summary(state, req)),
        _ => None,
    }
}
