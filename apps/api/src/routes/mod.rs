pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::assistant::handlers as assistant;
use crate::history::handlers as history;
use crate::outreach::handlers as outreach;
use crate::profile::handlers as profile;
use crate::settings::handlers as settings;
use crate::state::AppState;
use crate::stats::handlers as stats;

pub fn build_router(state: AppState) -> Router {
    let max_upload_bytes = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Statistics
        .route("/api/stats", get(stats::handle_get_stats))
        .route("/api/stats/reset", post(stats::handle_reset_stats))
        .route("/api/history", get(history::handle_list_history))
        // Profile and résumé
        .route(
            "/api/profile",
            get(profile::handle_get_profile).put(profile::handle_replace_profile),
        )
        .route("/api/profile/resume", post(profile::handle_upload_resume))
        .route(
            "/api/settings",
            get(settings::handle_get_settings).put(settings::handle_update_settings),
        )
        // Outreach
        .route("/api/outreach/draft", post(outreach::handle_draft))
        .route("/api/outreach/send", post(outreach::handle_send))
        // Writing assistant
        .route(
            "/api/assistant/suggest-template",
            post(assistant::handle_suggest_template),
        )
        .route(
            "/api/assistant/improve-template",
            post(assistant::handle_improve_template),
        )
        .route("/api/assistant/help", post(assistant::handle_help))
        .route("/api/assistant/optimize", post(assistant::handle_optimize))
        .layer(DefaultBodyLimit::max(max_upload_bytes))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::{json, Value};
    use tower::ServiceExt;

    use crate::test_support::{
        sample_profile, FakeGenerator, RecordingMailer, TestApp, FAKE_REPLY,
    };

    async fn app() -> TestApp {
        TestApp::new(FakeGenerator::new(), RecordingMailer::new()).await
    }

    async fn call(app: &TestApp, request: Request<Body>) -> (StatusCode, Value) {
        let response = build_router(app.state.clone())
            .oneshot(request)
            .await
            .unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, body)
    }

    fn get_req(uri: &str) -> Request<Body> {
        Request::get(uri).body(Body::empty()).unwrap()
    }

    fn json_req(method: &str, uri: &str, body: Value) -> Request<Body> {
        Request::builder()
            .method(method)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let (status, body) = call(&app().await, get_req("/health")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["service"], "applymail-api");
    }

    #[tokio::test]
    async fn test_empty_stats() {
        let (status, body) = call(&app().await, get_req("/api/stats")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_sent"], 0);
        assert_eq!(body["success_rate"], 100.0);
        assert_eq!(body["top_companies"], json!([]));
        assert_eq!(body["stale"], false);
    }

    #[tokio::test]
    async fn test_send_then_stats_history_and_reset() {
        let app = app().await;
        app.state.profiles.replace(sample_profile()).await.unwrap();

        let (status, body) = call(
            &app,
            json_req(
                "POST",
                "/api/outreach/send",
                json!({"to_email": "jobs@acme.test", "company_name": "Acme", "job_title": ""}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "success");
        assert_eq!(body["persisted"], true);

        let (_, stats) = call(&app, get_req("/api/stats")).await;
        assert_eq!(stats["total_sent"], 1);
        assert_eq!(stats["popular_companies"]["Acme"], 1);
        assert_eq!(stats["top_companies"][0]["company"], "Acme");

        let (_, history) = call(&app, get_req("/api/history")).await;
        assert_eq!(history.as_array().unwrap().len(), 1);
        assert_eq!(history[0]["status"], "success");
        assert!(history[0]["job_title"].is_null());

        let (status, reset) = call(&app, json_req("POST", "/api/stats/reset", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(reset["success"], true);
        assert_eq!(reset["message"], "Statistics reset");

        let (_, stats) = call(&app, get_req("/api/stats")).await;
        assert_eq!(stats["total_sent"], 0);
        assert_eq!(stats["popular_companies"], json!({}));
    }

    #[tokio::test]
    async fn test_history_status_filter() {
        let app = app().await;
        app.state.profiles.replace(sample_profile()).await.unwrap();
        call(
            &app,
            json_req("POST", "/api/outreach/send", json!({"to_email": "jobs@acme.test"})),
        )
        .await;

        let (status, body) = call(&app, get_req("/api/history?status=success")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.as_array().unwrap().len(), 1);

        let (status, body) = call(&app, get_req("/api/history?status=error")).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, json!([]));

        let (status, body) = call(&app, get_req("/api/history?status=bounced")).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(body["error"]["message"].as_str().unwrap().contains("bounced"));
    }

    #[tokio::test]
    async fn test_send_without_profile_is_404() {
        let (status, body) = call(
            &app().await,
            json_req("POST", "/api/outreach/send", json!({"to_email": "jobs@acme.test"})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body["error"]["code"], "NOT_FOUND");
    }

    #[tokio::test]
    async fn test_send_without_recipient_is_400() {
        let app = app().await;
        app.state.profiles.replace(sample_profile()).await.unwrap();
        let (status, body) =
            call(&app, json_req("POST", "/api/outreach/send", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_settings_round_trip_and_validation() {
        let app = app().await;
        let (status, body) = call(
            &app,
            json_req(
                "PUT",
                "/api/settings",
                json!({"email_tone": "formal", "max_email_length": 220}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["email_tone"], "formal");
        assert_eq!(body["auto_attach_cv"], true);

        let (status, _) = call(
            &app,
            json_req("PUT", "/api/settings", json!({"max_email_length": 5})),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (_, body) = call(&app, get_req("/api/settings")).await;
        assert_eq!(body["max_email_length"], 220);
    }

    #[tokio::test]
    async fn test_profile_get_and_put() {
        let app = app().await;
        let (status, _) = call(&app, get_req("/api/profile")).await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (status, body) = call(
            &app,
            json_req(
                "PUT",
                "/api/profile",
                json!({"name": "Grace Hopper", "skills": ["COBOL", " "]}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["skills"], json!(["COBOL"]));

        let (_, body) = call(&app, get_req("/api/profile")).await;
        assert_eq!(body["name"], "Grace Hopper");
    }

    #[tokio::test]
    async fn test_resume_upload_rejects_non_pdf() {
        let boundary = "XBOUNDARY";
        let body = format!(
            "--{boundary}\r\nContent-Disposition: form-data; name=\"resume\"; filename=\"cv.docx\"\r\n\
             Content-Type: application/octet-stream\r\n\r\nhello\r\n--{boundary}--\r\n"
        );
        let request = Request::post("/api/profile/resume")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={boundary}"),
            )
            .body(Body::from(body))
            .unwrap();

        let app = app().await;
        let (status, body) = call(&app, request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
        assert!(app.state.resumes.current().await.is_none());
        assert_eq!(app.state.stats.snapshot().await.ai_usage.cv_analyzed, 0);
    }

    #[tokio::test]
    async fn test_draft_with_manual_template() {
        let app = app().await;
        app.state.profiles.replace(sample_profile()).await.unwrap();
        let (status, body) = call(
            &app,
            json_req(
                "POST",
                "/api/outreach/draft",
                json!({"to_email": "jobs@acme.test", "company_name": "Acme", "use_ai": false}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["subject"], "Application - Ada Lovelace");
        assert_eq!(body["generated_by_ai"], false);
        assert!(body["html_body"].as_str().unwrap().contains("Acme"));
    }

    #[tokio::test]
    async fn test_assistant_endpoints() {
        let app = app().await;

        let (status, body) = call(&app, json_req("POST", "/api/assistant/help", json!({}))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");

        let (status, body) = call(
            &app,
            json_req(
                "POST",
                "/api/assistant/help",
                json!({"question": "Which tone should I use?"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["answer"], FAKE_REPLY);

        let (status, body) = call(
            &app,
            json_req(
                "POST",
                "/api/assistant/improve-template",
                json!({"feedback": "more direct"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["template"], FAKE_REPLY);

        let (status, body) =
            call(&app, json_req("POST", "/api/assistant/optimize", json!({}))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["suggestion"], FAKE_REPLY);

        let (status, _) = call(
            &app,
            json_req("POST", "/api/assistant/suggest-template", json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        app.state.profiles.replace(sample_profile()).await.unwrap();
        let (status, body) = call(
            &app,
            json_req("POST", "/api/assistant/suggest-template", json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["template"], FAKE_REPLY);
    }

    #[tokio::test]
    async fn test_assistant_without_generator_is_503() {
        let app = TestApp::new(FakeGenerator::failing(), RecordingMailer::new()).await;
        let (status, body) =
            call(&app, json_req("POST", "/api/assistant/optimize", json!({}))).await;
        assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
        assert_eq!(body["error"]["code"], "SERVICE_UNAVAILABLE");
    }
}
