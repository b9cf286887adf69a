//! Maps HTTP failures onto the closed [`ApiError`] set.
//!
//! Error bodies look like `{"error": "<code>", "message": "...", "payload": {...}}`.
//! The `error` field doubles as the classifier code; reconciliation data sits
//! in `payload`, or in the body itself when there is no `payload`.

use geofinder_core::api::ApiError;
use geofinder_core::duel::DuelSnapshot;
use reqwest::StatusCode;
use serde_json::Value;

pub const CODE_ROUND_OUT_OF_SYNC: &str = "round_out_of_sync";
pub const CODE_MATCH_COMPLETED: &str = "match_completed";
pub const CODE_MISSING_APP_CHECK_TOKEN: &str = "missing_app_check_token";

/// Classifies a non-success response.
pub fn classify_http_error(status: StatusCode, body: &str) -> ApiError {
    let parsed: Option<Value> = serde_json::from_str(body).ok().filter(Value::is_object);

    let code = parsed
        .as_ref()
        .and_then(|v| v.get("error"))
        .and_then(Value::as_str);
    let message = parsed
        .as_ref()
        .and_then(|v| {
            ["errorDescription", "error", "message"]
                .iter()
                .find_map(|key| v.get(*key).and_then(Value::as_str))
        })
        .filter(|m| !m.trim().is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| fallback_message(status, body));

    match code {
        Some(CODE_ROUND_OUT_OF_SYNC) => ApiError::ProtocolDesync(snapshot(parsed.as_ref())),
        Some(CODE_MATCH_COMPLETED) => ApiError::MatchCompleted(snapshot(parsed.as_ref())),
        Some(CODE_MISSING_APP_CHECK_TOKEN) => ApiError::Auth(message),
        _ => match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => ApiError::Auth(message),
            StatusCode::TOO_MANY_REQUESTS
            | StatusCode::INTERNAL_SERVER_ERROR
            | StatusCode::BAD_GATEWAY
            | StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::GATEWAY_TIMEOUT => ApiError::network(message, true),
            _ => ApiError::Unknown {
                status: Some(status.as_u16()),
                message,
            },
        },
    }
}

/// Classifies a transport-level failure (no response).
pub fn classify_transport_error(err: &reqwest::Error) -> ApiError {
    if err.is_decode() {
        return ApiError::invalid_response(err.to_string());
    }
    ApiError::network(
        format!("Request failed: {err}"),
        err.is_connect() || err.is_timeout(),
    )
}

fn snapshot(body: Option<&Value>) -> DuelSnapshot {
    let Some(body) = body else {
        return DuelSnapshot::default();
    };
    let payload = body.get("payload").filter(|p| p.is_object()).unwrap_or(body);
    serde_json::from_value(payload.clone()).unwrap_or_else(|e| {
        tracing::warn!(error = %e, "[Api] Unreadable reconciliation payload");
        DuelSnapshot::default()
    })
}

fn fallback_message(status: StatusCode, body: &str) -> String {
    let body = body.trim();
    if body.is_empty() || body.len() > 200 {
        format!("Request failed with status {}", status.as_u16())
    } else {
        body.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use geofinder_core::duel::DuelStatus;
    use serde_json::json;

    #[test]
    fn test_round_out_of_sync_with_nested_payload() {
        let body = json!({
            "error": "round_out_of_sync",
            "message": "Round mismatch",
            "payload": {
                "expectedRound": {"roundIndex": 2, "imageUrl": "https://img/2"},
                "scores": {"player": 1, "ai": 1},
                "status": "in-progress",
                "history": []
            }
        })
        .to_string();

        let ApiError::ProtocolDesync(snapshot) = classify_http_error(StatusCode::CONFLICT, &body)
        else {
            panic!("expected desync");
        };
        assert_eq!(snapshot.expected_round.unwrap().round_index, 2);
        assert_eq!(snapshot.scores.unwrap().player, 1);
        assert_eq!(snapshot.history, Some(vec![]));
    }

    #[test]
    fn test_match_completed_with_flat_body() {
        let body = json!({
            "error": "match_completed",
            "scores": {"player": 4, "ai": 6},
            "status": "completed"
        })
        .to_string();

        let ApiError::MatchCompleted(snapshot) = classify_http_error(StatusCode::CONFLICT, &body)
        else {
            panic!("expected completed");
        };
        assert_eq!(snapshot.status, Some(DuelStatus::Completed));
        assert_eq!(snapshot.scores.unwrap().ai, 6);
    }

    #[test]
    fn test_auth_classification() {
        let body = json!({"error": "missing_app_check_token"}).to_string();
        assert!(classify_http_error(StatusCode::BAD_REQUEST, &body).is_auth());
        assert!(classify_http_error(StatusCode::UNAUTHORIZED, "").is_auth());
        assert!(classify_http_error(StatusCode::FORBIDDEN, "nope").is_auth());
    }

    #[test]
    fn test_server_errors_are_retryable_network_errors() {
        let err = classify_http_error(StatusCode::SERVICE_UNAVAILABLE, "");
        assert!(matches!(err, ApiError::Network { retryable: true, .. }));
        assert!(classify_http_error(StatusCode::TOO_MANY_REQUESTS, "").is_retryable());
    }

    #[test]
    fn test_other_errors_keep_message() {
        let body = json!({"errorDescription": "Guess too long", "error": "bad_guess"}).to_string();
        let err = classify_http_error(StatusCode::BAD_REQUEST, &body);
        assert!(matches!(
            err,
            ApiError::Unknown { status: Some(400), ref message } if message == "Guess too long"
        ));

        let err = classify_http_error(StatusCode::NOT_FOUND, "");
        assert_eq!(err.to_string(), "Request failed with status 404");
    }
}
