use serde::Serialize;
use serde_json::{json, Value};

use crate::calc::CalcError;

/// One response line. Exactly one of `result` and `error` is set.
#[derive(Serialize)]
struct Reply<'a> {
    id: &'a str,
    ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<CalcError>,
}

fn into_line(reply: Reply<'_>) -> Value {
    serde_json::to_value(&reply).unwrap_or_else(|e| {
        json!({
            "id": reply.id,
            "ok": false,
            "error": { "code": "internal", "message": e.to_string() }
        })
    })
}

pub fn ok(id: &str, result: Value) -> Value {
    into_line(Reply {
        id,
        ok: true,
        result: Some(result),
        error: None,
    })
}

pub fn calc_err(id: &str, e: CalcError) -> Value {
    into_line(Reply {
        id,
        ok: false,
        result: None,
        error: Some(e),
    })
}

pub fn err(id: &str, code: &str, message: impl Into<String>) -> Value {
    calc_err(id, CalcError::new(code, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ok_reply_carries_result_only() {
        let v = ok("7", json!({ "n": 1 }));
        assert_eq!(v, json!({ "id": "7", "ok": true, "result": { "n": 1 } }));
    }

    #[test]
    fn error_reply_omits_empty_details() {
        let v = err("7", "bad_params", "missing batchId");
        assert_eq!(
            v,
            json!({
                "id": "7",
                "ok": false,
                "error": { "code": "bad_params", "message": "missing batchId" }
            })
        );
    }

    #[test]
    fn calc_error_details_pass_through() {
        let e = CalcError::with_details("not_found", "no run", json!({ "batchId": "b1" }));
        let v = calc_err("x", e);
        assert_eq!(v["error"]["details"]["batchId"], json!("b1"));
        assert!(v.get("result").is_none());
    }
}
