use async_trait::async_trait;
use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use geofinder_core::api::{ApiError, DuelApi, GameApi, ScoreMetadata, ScoreSubmission};
use geofinder_core::auth::{AuthContext, TokenProvider};
use geofinder_core::config::ApiConfig;
use geofinder_core::duel::DuelStatus;
use geofinder_core::round::GameMode;
use geofinder_interaction::{APP_CHECK_HEADER, GeoApiClient, StaticTokenProvider};
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

async fn serve(app: Router) -> String {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    format!("http://{}", addr)
}

fn config(base_url: &str) -> ApiConfig {
    ApiConfig {
        base_url: base_url.to_string(),
        ..ApiConfig::default()
    }
}

fn client_with_token(base_url: &str, token: &str) -> GeoApiClient {
    let auth = AuthContext::new(Arc::new(StaticTokenProvider::new(token)));
    GeoApiClient::new(&config(base_url), Some(Arc::new(auth))).unwrap()
}

fn attested(headers: &HeaderMap) -> Option<String> {
    headers
        .get(APP_CHECK_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}

#[tokio::test]
async fn test_fetch_round_per_mode() {
    let app = Router::new()
        .route(
            "/getImage",
            get(|| async {
                Json(json!({
                    "imageUrl": "https://img/photo.jpg",
                    "coordinates": {"lat": 35.68, "lon": 139.69},
                    "countryName": "Japan"
                }))
            }),
        )
        .route(
            "/getPano",
            get(|| async {
                Json(json!({
                    "imageUrl": "https://img/pano.jpg",
                    "coordinates": {"lat": -22.9, "lon": -43.2},
                    "countryName": "Brazil",
                    "countryCode": "br",
                    "contributor": "ana"
                }))
            }),
        );
    let base = serve(app).await;
    let client = GeoApiClient::new(&config(&base), None).unwrap();

    let photo = client.fetch_round(GameMode::Photo).await.unwrap();
    assert_eq!(photo.display_name(), "Japan");

    let pano = client.fetch_round(GameMode::Panorama).await.unwrap();
    assert_eq!(pano.mode, GameMode::Panorama);
    assert_eq!(pano.answer.unwrap().code.as_deref(), Some("BR"));
    assert_eq!(pano.contributor.as_deref(), Some("ana"));
}

#[tokio::test]
async fn test_fetch_round_rejects_missing_coordinates() {
    let app = Router::new().route(
        "/getImage",
        get(|| async { Json(json!({"imageUrl": "https://img/x.jpg"})) }),
    );
    let base = serve(app).await;
    let client = GeoApiClient::new(&config(&base), None).unwrap();

    let err = client.fetch_round(GameMode::Photo).await.unwrap_err();
    assert!(matches!(err, ApiError::InvalidResponse(_)));
}

#[tokio::test]
async fn test_start_session_sends_attestation_header() {
    let app = Router::new().route(
        "/game/start",
        post(|headers: HeaderMap| async move {
            match attested(&headers).as_deref() {
                Some("tok-1") => (
                    StatusCode::OK,
                    Json(json!({
                        "gameSessionId": "gs-42",
                        "seed": "s",
                        "expiresAt": "2030-01-01T00:00:00Z"
                    })),
                ),
                _ => (
                    StatusCode::UNAUTHORIZED,
                    Json(json!({"error": "missing_app_check_token"})),
                ),
            }
        }),
    );
    let base = serve(app).await;

    let ticket = client_with_token(&base, "tok-1")
        .start_session()
        .await
        .unwrap();
    assert_eq!(ticket.game_session_id, "gs-42");

    let err = client_with_token(&base, "wrong")
        .start_session()
        .await
        .unwrap_err();
    assert!(err.is_auth());
}

#[tokio::test]
async fn test_start_session_without_provider_is_auth_error() {
    // nothing listens here; the call must fail before any request is sent
    let client = GeoApiClient::new(&config("http://127.0.0.1:9"), None).unwrap();
    assert!(client.start_session().await.unwrap_err().is_auth());
}

#[tokio::test]
async fn test_submit_score_body_shape() {
    let captured: Arc<Mutex<Option<Value>>> = Arc::new(Mutex::new(None));
    let app = Router::new()
        .route(
            "/game/submit",
            post(
                |State(captured): State<Arc<Mutex<Option<Value>>>>, Json(body): Json<Value>| async move {
                    *captured.lock().unwrap() = Some(body);
                    StatusCode::OK
                },
            ),
        )
        .with_state(captured.clone());
    let base = serve(app).await;

    let submission = ScoreSubmission {
        game_session_id: "gs-1".into(),
        score: 17,
        metadata: ScoreMetadata {
            correct_answers: 7,
            total_rounds: 10,
            rounds_played: 10,
        },
    };
    client_with_token(&base, "tok")
        .submit_score(&submission)
        .await
        .unwrap();

    let body = captured.lock().unwrap().clone().unwrap();
    assert_eq!(
        body,
        json!({
            "gameSessionId": "gs-1",
            "score": 17,
            "metadata": {"correctAnswers": 7, "totalRounds": 10, "roundsPlayed": 10}
        })
    );
}

#[tokio::test]
async fn test_leaderboard_passes_limit() {
    let app = Router::new().route(
        "/leaderboard/top",
        get(|Query(params): Query<HashMap<String, String>>| async move {
            let limit: usize = params.get("limit").and_then(|l| l.parse().ok()).unwrap_or(0);
            let rows: Vec<Value> = (1..=limit)
                .map(|rank| json!({"rank": rank, "score": 100 - rank, "createdAt": "2024-05-01"}))
                .collect();
            Json(Value::Array(rows))
        }),
    );
    let base = serve(app).await;
    let client = GeoApiClient::new(&config(&base), None).unwrap();

    let entries = client.leaderboard(3).await.unwrap();
    assert_eq!(entries.len(), 3);
    assert_eq!(entries[0].rank, 1);
    assert!(entries[0].game_session_id.is_none());
}

#[tokio::test]
async fn test_duel_guess_round_out_of_sync() {
    let app = Router::new().route(
        "/ai-duel/guess",
        post(|Json(body): Json<Value>| async move {
            assert_eq!(body["matchId"], "m-1");
            assert_eq!(body["roundIndex"], 0);
            (
                StatusCode::CONFLICT,
                Json(json!({
                    "error": "round_out_of_sync",
                    "payload": {
                        "expectedRound": {"roundIndex": 1, "imageUrl": "https://img/r1"},
                        "scores": {"player": 1, "ai": 0},
                        "status": "in-progress"
                    }
                })),
            )
        }),
    );
    let base = serve(app).await;
    let client = GeoApiClient::new(&config(&base), None).unwrap();

    let err = client.submit_guess("m-1", 0, "france").await.unwrap_err();
    let ApiError::ProtocolDesync(snapshot) = err else {
        panic!("expected desync, got {err:?}");
    };
    assert_eq!(snapshot.expected_round.unwrap().round_index, 1);
    assert_eq!(snapshot.status, Some(DuelStatus::InProgress));
}

#[tokio::test]
async fn test_duel_start_unattested_when_token_unavailable() {
    let app = Router::new().route(
        "/ai-duel/start",
        post(|headers: HeaderMap| async move {
            assert!(attested(&headers).is_none());
            Json(json!({
                "matchId": "m-9",
                "round": {"roundIndex": 0, "imageUrl": "https://img/0"},
                "totalRounds": 5
            }))
        }),
    );
    let base = serve(app).await;
    let client = client_with_token(&base, "");

    let start = client.start_match().await.unwrap();
    assert_eq!(start.match_id, "m-9");
    assert_eq!(start.total_rounds, Some(5));
}

struct CountingProvider {
    calls: AtomicUsize,
}

#[async_trait]
impl TokenProvider for CountingProvider {
    async fn fetch_token(&self) -> Result<String, ApiError> {
        let n = self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(format!("tok-{n}"))
    }
}

#[tokio::test]
async fn test_auth_rejection_drops_cached_token() {
    let app = Router::new().route(
        "/game/start",
        post(|| async { (StatusCode::FORBIDDEN, Json(json!({"message": "rejected"}))) }),
    );
    let base = serve(app).await;
    let provider = Arc::new(CountingProvider {
        calls: AtomicUsize::new(0),
    });
    let client = GeoApiClient::new(
        &config(&base),
        Some(Arc::new(AuthContext::new(provider.clone()))),
    )
    .unwrap();

    assert!(client.start_session().await.unwrap_err().is_auth());
    assert!(client.start_session().await.unwrap_err().is_auth());
    assert_eq!(provider.calls.load(Ordering::SeqCst), 2);
}

#[tokio::test]
async fn test_unreachable_server_is_retryable_network_error() {
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let client = GeoApiClient::new(&config(&format!("http://{addr}")), None).unwrap();
    let err = client.fetch_round(GameMode::Photo).await.unwrap_err();
    assert!(matches!(err, ApiError::Network { retryable: true, .. }));
}
