use crate::grading::{classify_score, GradingScale, ScoreState};
use crate::ipc::error::{err, ok};
use crate::ipc::types::{AppState, Request};
use serde_json::json;

fn handle_classify(state: &mut AppState, req: &Request) -> serde_json::Value {
    let Some(raw) = req.params.get("score") else {
        return err(&req.id, "bad_params", "missing score");
    };
    let scale = match req.params.get("gradingScale") {
        None => state.config.grading_scale.clone().or_canonical(),
        Some(v) => match serde_json::from_value::<GradingScale>(v.clone()) {
            Ok(s) => s.or_canonical(),
            Err(e) => {
                return err(
                    &req.id,
                    "bad_params",
                    format!("invalid gradingScale: {}", e),
                )
            }
        },
    };

    let score = ScoreState::from_json(raw);
    let grade = classify_score(score);
    ok(
        &req.id,
        json!({
            "score": score,
            "grade": grade,
            "points": scale.points(grade),
            "remark": state.config.subject_remarks.remark_for(score),
        }),
    )
}

pub fn try_handle(state: &mut AppState, req: &Request) -> Option<serde_json::Value> {
    match req.method.as_str() {
        "grade.classify" => Some(handle_classify(state, req)),
        _ => None,
    }
}
