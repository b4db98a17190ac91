//! Route definitions for the CropMagix API

use axum::{
    routing::{delete, get, post},
    Router,
};

use crate::{handlers, AppState};

/// Create API routes
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health_check))
        // Plant and soil analysis
        .route("/analyze-health", post(handlers::analyze_health))
        .route("/analyze-soil", post(handlers::analyze_soil))
        .route(
            "/ar-scan",
            get(handlers::ar_scan_info).post(handlers::ar_scan),
        )
        // Weather and farming advice
        .route("/weather", get(handlers::get_weather))
        .route("/soil-weather", post(handlers::soil_weather))
        // Crop calendar
        .route("/crops", get(handlers::list_crops))
        .route("/crops/recommendations", get(handlers::crop_recommendations))
        .route("/crops/:crop/timeline", get(handlers::crop_timeline))
        // Conversation
        .route("/chat", post(handlers::chat))
        .route(
            "/chat/history",
            get(handlers::chat_history)
                .post(handlers::save_chat_message)
                .delete(handlers::clear_chat_history),
        )
        .route("/speak", post(handlers::speak))
        .route("/transcribe", post(handlers::transcribe))
        .nest("/history", history_routes())
}

/// Scan history routes
fn history_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/",
            get(handlers::list_history)
                .post(handlers::add_history)
                .delete(handlers::clear_history),
        )
        .route("/stats", get(handlers::history_stats))
        .route("/:id", delete(handlers::delete_history_entry))
}

#[cfg(test)]
mod tests {
    use axum::{
        body::{to_bytes, Body},
        http::{Request, StatusCode},
        Router,
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::config::Config;
    use crate::services::{ChatHistoryStore, LocalHistory, ScanHistoryStore};
    use crate::{create_app, AppState};

    fn app() -> Router {
        app_with(Config::for_tests())
    }

    fn app_with(config: Config) -> Router {
        let history = ScanHistoryStore::new(LocalHistory::in_memory(), None);
        let chat_history = ChatHistoryStore::in_memory(config.chat_history.max_messages);
        create_app(AppState::new(config, history, chat_history))
    }

    /// Keys set, but every provider endpoint refuses connections
    fn unreachable_providers() -> Router {
        let mut config = Config::for_tests();
        config.weather.api_key = "weather-key".to_string();
        config.vision.api_key = "vision-key".to_string();
        config.chat.api_key = "chat-key".to_string();
        app_with(config)
    }

    async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    fn json_request(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    fn get(uri: &str) -> Request<Body> {
        Request::builder().uri(uri).body(Body::empty()).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = send(app(), get("/api/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["service"], "CropMagix API");
    }

    #[tokio::test]
    async fn test_weather_requires_coordinates() {
        for uri in [
            "/api/weather",
            "/api/weather?lat=17.4",
            "/api/weather?lat=0&lon=78.5",
            "/api/weather?lat=abc&lng=78.5",
        ] {
            let (status, body) = send(app(), get(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["error"], "Latitude and longitude required");
        }
    }

    #[tokio::test]
    async fn test_analyze_health_requires_image() {
        let request = json_request(
            "POST",
            "/api/analyze-health",
            json!({ "plant_type": "Tomato" }),
        );
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No image provided");

        let request = json_request(
            "POST",
            "/api/analyze-health",
            json!({ "image_base64": "data:image/png;base64," }),
        );
        let (status, _) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_chat_requires_message() {
        let request = json_request("POST", "/api/chat", json!({ "message": "" }));
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No message provided");
    }

    #[tokio::test]
    async fn test_speak_requires_text_then_key() {
        let (status, body) = send(app(), json_request("POST", "/api/speak", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No text provided");

        let request = json_request("POST", "/api/speak", json!({ "text": "hello" }));
        let (status, body) = send(app(), request).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Deepgram API key not configured");
    }

    #[tokio::test]
    async fn test_ar_scan_usage() {
        let (status, body) = send(app(), get("/api/ar-scan")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["endpoint"], "/api/ar-scan");
    }

    #[tokio::test]
    async fn test_history_round_trip() {
        let app = app();

        let request = json_request(
            "POST",
            "/api/history",
            json!({ "plant_name": "Tomato", "health_status": "issues" }),
        );
        let (status, created) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::CREATED);
        let id = created["id"].as_str().unwrap().to_string();

        let (_, listed) = send(app.clone(), get("/api/history?limit=1")).await;
        assert_eq!(listed[0]["id"], id.as_str());

        let (_, stats) = send(app.clone(), get("/api/history/stats")).await;
        assert_eq!(stats["total"], 1);
        assert_eq!(stats["issues"], 1);

        let delete = Request::builder()
            .method("DELETE")
            .uri(format!("/api/history/{}", id))
            .body(Body::empty())
            .unwrap();
        let (status, removed) = send(app.clone(), delete).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(removed["removed"], 1);

        let (_, listed) = send(app, get("/api/history")).await;
        assert_eq!(listed, json!([]));
    }

    #[tokio::test]
    async fn test_provider_failures_use_endpoint_labels() {
        let image = "data:image/jpeg;base64,/9j/4AAQ";
        let cases = [
            (
                json_request("POST", "/api/analyze-health", json!({ "image_base64": image })),
                "Health analysis failed",
            ),
            (
                json_request("POST", "/api/soil-weather", json!({ "image_base64": image })),
                "Analysis failed",
            ),
            (get("/api/weather?lat=17.4&lon=78.5"), "Weather fetch failed"),
            (
                json_request("POST", "/api/chat", json!({ "message": "Hello" })),
                "Chat failed",
            ),
        ];

        for (request, label) in cases {
            let (status, body) = send(unreachable_providers(), request).await;
            assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR, "{}", label);
            assert_eq!(body["error"], label);
            assert!(body["detail"].is_string());
        }
    }

    #[tokio::test]
    async fn test_history_ignores_client_id_and_time() {
        let app = app();

        let (_, first) = send(
            app.clone(),
            json_request("POST", "/api/history", json!({ "plant_name": "Tomato" })),
        )
        .await;
        let first_id = first["id"].as_str().unwrap().to_string();

        let request = json_request(
            "POST",
            "/api/history",
            json!({
                "id": first_id,
                "plant_name": "Overwritten",
                "created_at": "2020-01-01T00:00:00Z"
            }),
        );
        let (status, second) = send(app.clone(), request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_ne!(second["id"], first_id.as_str());

        let (_, listed) = send(app, get("/api/history?limit=1")).await;
        assert_eq!(listed[0]["id"], second["id"]);
        assert_eq!(listed[0]["plant_name"], "Overwritten");
    }

    #[tokio::test]
    async fn test_crop_recommendations_for_month() {
        let (status, body) = send(app(), get("/api/crops/recommendations?month=12")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["month_name"], "December");
        assert_eq!(body["seasons"], json!(["rabi"]));
        let crops: Vec<_> = body["crops"]
            .as_array()
            .unwrap()
            .iter()
            .map(|c| c["key"].as_str().unwrap())
            .collect();
        assert_eq!(crops, vec!["wheat", "banana", "groundnut"]);

        let (status, body) = send(app(), get("/api/crops/recommendations")).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body["crops"].is_array());

        for uri in [
            "/api/crops/recommendations?month=13",
            "/api/crops/recommendations?month=june",
        ] {
            let (status, body) = send(app(), get(uri)).await;
            assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
            assert_eq!(body["error"], "Month must be between 1 and 12");
        }
    }

    #[tokio::test]
    async fn test_crop_database_and_timeline() {
        let (status, body) = send(app(), get("/api/crops")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 8);

        let (status, body) =
            send(app(), get("/api/crops/Tomato/timeline?planted=2024-06-01")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["harvest_date"], "2024-08-20");

        let (status, _) = send(app(), get("/api/crops/quinoa/timeline?planted=2024-06-01")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        let (status, body) = send(app(), get("/api/crops/rice/timeline")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Planting date required");
    }

    #[tokio::test]
    async fn test_chat_history_round_trip() {
        let app = app();

        for (role, content) in [("user", "My leaves are curling"), ("plant", "Check for aphids")] {
            let request = json_request(
                "POST",
                "/api/chat/history",
                json!({ "session_id": "session_1", "role": role, "content": content }),
            );
            let (status, _) = send(app.clone(), request).await;
            assert_eq!(status, StatusCode::CREATED);
        }
        let request = json_request(
            "POST",
            "/api/chat/history",
            json!({ "session_id": "session_2", "content": "Other farm" }),
        );
        send(app.clone(), request).await;

        let (_, transcript) = send(app.clone(), get("/api/chat/history?session_id=session_1")).await;
        let transcript = transcript.as_array().unwrap();
        assert_eq!(transcript.len(), 2);
        assert_eq!(transcript[0]["role"], "user");
        assert_eq!(transcript[1]["role"], "assistant");

        let (_, everything) = send(app.clone(), get("/api/chat/history")).await;
        assert_eq!(everything.as_array().unwrap().len(), 3);

        let clear = Request::builder()
            .method("DELETE")
            .uri("/api/chat/history?session_id=session_1")
            .body(Body::empty())
            .unwrap();
        let (status, removed) = send(app.clone(), clear).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(removed["removed"], 2);

        let request = json_request("POST", "/api/chat/history", json!({ "content": "" }));
        let (status, body) = send(app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No message provided");
    }
}
