//! Response envelope helpers. Every success body is
//! `{"success": true, "data": ...}`; errors go through `ApiError`.

use axum::{http::StatusCode, response::Json};
use serde::Serialize;
use serde_json::{json, Value};

pub fn ok<T: Serialize>(data: T) -> Json<Value> {
    Json(json!({ "success": true, "data": data }))
}

pub fn created<T: Serialize>(data: T) -> (StatusCode, Json<Value>) {
    (StatusCode::CREATED, ok(data))
}

pub fn message(text: impl Into<String>) -> Json<Value> {
    ok(json!({ "message": text.into() }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn success_envelope_shape() {
        let Json(body) = ok(json!({"id": 1}));
        assert_eq!(body["success"], true);
        assert_eq!(body["data"]["id"], 1);
    }

    #[test]
    fn created_sets_201() {
        let (status, _) = created(json!({}));
        assert_eq!(status, StatusCode::CREATED);
    }
}
