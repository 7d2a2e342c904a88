pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::analysis::handlers;
use crate::schedule::handlers as schedule_handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/health", get(health::health_handler))
        // Résumé analysis
        .route(
            "/api/v1/resumes",
            post(handlers::handle_upload).get(handlers::handle_list),
        )
        .route(
            "/api/v1/resumes/:name",
            get(handlers::handle_get).delete(handlers::handle_delete),
        )
        .route("/api/v1/summary", get(handlers::handle_summary))
        // Interview scheduling
        .route(
            "/api/v1/schedule",
            get(schedule_handlers::handle_list_schedule)
                .post(schedule_handlers::handle_add_schedule),
        )
        .layer(DefaultBodyLimit::max(body_limit))
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use std::sync::Arc;
    use std::time::Duration;

    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use async_trait::async_trait;
    use serde_json::Value;
    use tokio::sync::Notify;
    use tower::ServiceExt;

    use crate::analysis::ResultStore;
    use crate::config::Config;
    use crate::llm_client::LlmError;
    use crate::scoring::{KeywordDictionary, ResumeScorer};
    use crate::summary::{NarrativeSummarizer, UnavailableSummarizer, FALLBACK_SUMMARY};

    const BOUNDARY: &str = "screener-test-boundary";

    /// Holds every summary until released, so a batch can be paused mid-analysis.
    #[derive(Default)]
    struct GatedSummarizer {
        started: Notify,
        release: Notify,
    }

    #[async_trait]
    impl NarrativeSummarizer for GatedSummarizer {
        async fn summarize(&self, _text: &str) -> Result<String, LlmError> {
            self.started.notify_one();
            self.release.notified().await;
            Ok("Profile Summary: gated".to_string())
        }
    }

    fn test_app(dir: &Path) -> Router {
        test_app_with(dir, Arc::new(UnavailableSummarizer))
    }

    fn test_app_with(dir: &Path, summarizer: Arc<dyn NarrativeSummarizer>) -> Router {
        let config = Config {
            port: 0,
            rust_log: "info".to_string(),
            store_path: dir.join("store.json"),
            upload_dir: dir.join("uploads"),
            keywords_path: None,
            anthropic_api_key: None,
            max_upload_bytes: 1024 * 1024,
        };
        let state = AppState::new(
            ResultStore::load(&config.store_path),
            ResumeScorer::new(KeywordDictionary::builtin().unwrap()),
            summarizer,
            config,
        );
        build_router(state)
    }

    fn multipart_body(files: &[(&str, &str, &str)]) -> String {
        let mut body = String::new();
        for (name, mime, content) in files {
            body.push_str(&format!(
                "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"files\"; filename=\"{name}\"\r\nContent-Type: {mime}\r\n\r\n{content}\r\n"
            ));
        }
        body.push_str(&format!("--{BOUNDARY}--\r\n"));
        body
    }

    async fn upload(app: &Router, files: &[(&str, &str, &str)]) -> (StatusCode, Value) {
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/resumes")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(files)))
            .unwrap();
        send(app, request).await
    }

    async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Value) {
        let response = app.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, json)
    }

    async fn get_json(app: &Router, uri: &str) -> (StatusCode, Value) {
        let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
        send(app, request).await
    }

    #[tokio::test]
    async fn test_health() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = get_json(&test_app(dir.path()), "/health").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
        assert_eq!(body["records"], 0);
    }

    #[tokio::test]
    async fn test_upload_scores_and_skips() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path());

        let (status, body) = upload(
            &app,
            &[
                (
                    "john.txt",
                    "text/plain",
                    "John Doe\n5 years of experience in Python and SQL, AWS certified.",
                ),
                ("logo.png", "image/png", "not an image"),
            ],
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["analyzed"][0]["name"], "john.txt");
        assert_eq!(body["analyzed"][0]["score"], 60);
        assert_eq!(body["analyzed"][0]["status"], "needs_review");
        assert_eq!(body["analyzed"][0]["narrative_summary"], FALLBACK_SUMMARY);
        assert_eq!(body["skipped"][0]["name"], "logo.png");
        assert_eq!(body["skipped"][0]["reason"], "unsupported_type");

        assert!(dir.path().join("uploads").join("john.txt").exists());
        assert!(dir.path().join("store.json").exists());

        let (_, again) = upload(&app, &[("john.txt", "text/plain", "John\nPython")]).await;
        assert_eq!(again["skipped"][0]["reason"], "duplicate");
        assert_eq!(again["analyzed"].as_array().unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_reads_answer_while_batch_is_summarizing() {
        let dir = tempfile::tempdir().unwrap();
        let summarizer = Arc::new(GatedSummarizer::default());
        let app = test_app_with(dir.path(), summarizer.clone());

        let pending = tokio::spawn({
            let app = app.clone();
            async move { upload(&app, &[("slow.txt", "text/plain", "Sue\nPython")]).await }
        });
        summarizer.started.notified().await;

        let (status, health) =
            tokio::time::timeout(Duration::from_secs(5), get_json(&app, "/health"))
                .await
                .expect("health blocked by running upload");
        assert_eq!(status, StatusCode::OK);
        assert_eq!(health["records"], 0);

        let (status, records) =
            tokio::time::timeout(Duration::from_secs(5), get_json(&app, "/api/v1/resumes"))
                .await
                .expect("listing blocked by running upload");
        assert_eq!(status, StatusCode::OK);
        assert!(records.as_array().unwrap().is_empty());

        summarizer.release.notify_one();
        let (status, body) = pending.await.unwrap();
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["analyzed"][0]["narrative_summary"], "Profile Summary: gated");
    }

    #[tokio::test]
    async fn test_duplicate_upload_keeps_archived_original() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path());
        upload(&app, &[("cv.txt", "text/plain", "Original\nSQL")]).await;

        let (_, body) = upload(&app, &[("cv.txt", "text/plain", "Other\nExcel")]).await;

        assert_eq!(body["skipped"][0]["reason"], "duplicate");
        let archived =
            std::fs::read_to_string(dir.path().join("uploads").join("cv.txt")).unwrap();
        assert_eq!(archived, "Original\nSQL");
    }

    #[tokio::test]
    async fn test_upload_without_files_is_rejected() {
        let dir = tempfile::tempdir().unwrap();
        let (status, body) = upload(&test_app(dir.path()), &[]).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_filter_get_and_delete() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path());
        upload(
            &app,
            &[
                ("ready.txt", "text/plain", "Ana\nPython SQL AWS Excel"),
                ("weak.txt", "text/plain", "Bob\nMarketing"),
            ],
        )
        .await;

        let (_, ready) = get_json(&app, "/api/v1/resumes?status=ready_for_interview").await;
        let ready = ready.as_array().unwrap();
        assert_eq!(ready.len(), 1);
        assert_eq!(ready[0]["name"], "ready.txt");

        let (_, none) = get_json(&app, "/api/v1/resumes?date=1999-01-01").await;
        assert!(none.as_array().unwrap().is_empty());

        let (status, record) = get_json(&app, "/api/v1/resumes/weak.txt").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(record["status"], "not_recommended");

        let delete = Request::builder()
            .method("DELETE")
            .uri("/api/v1/resumes/weak.txt")
            .body(Body::empty())
            .unwrap();
        let (status, body) = send(&app, delete).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["deleted"], 1);

        let delete_again = Request::builder()
            .method("DELETE")
            .uri("/api/v1/resumes/weak.txt")
            .body(Body::empty())
            .unwrap();
        let (_, body) = send(&app, delete_again).await;
        assert_eq!(body["deleted"], 0);

        let (status, _) = get_json(&app, "/api/v1/resumes/weak.txt").await;
        assert_eq!(status, StatusCode::NOT_FOUND);

        let (_, summary) = get_json(&app, "/api/v1/summary").await;
        assert_eq!(summary["total"], 1);
        assert_eq!(summary["ready_for_interview"], 1);
    }

    #[tokio::test]
    async fn test_store_survives_restart() {
        let dir = tempfile::tempdir().unwrap();
        upload(
            &test_app(dir.path()),
            &[("a.txt", "text/plain", "A\nPython")],
        )
        .await;

        let (_, records) = get_json(&test_app(dir.path()), "/api/v1/resumes").await;
        assert_eq!(records.as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_schedule_append_and_list() {
        let dir = tempfile::tempdir().unwrap();
        let app = test_app(dir.path());

        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/schedule")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(
                r#"{"date":"2024-07-01","time":"10:30","note":"Interview with Ana"}"#,
            ))
            .unwrap();
        let (status, body) = send(&app, request).await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body["time"], "10:30");

        let (_, entries) = get_json(&app, "/api/v1/schedule").await;
        assert_eq!(entries.as_array().unwrap().len(), 1);
        assert_eq!(entries[0]["note"], "Interview with Ana");
    }

    #[tokio::test]
    async fn test_schedule_time_with_seconds_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/schedule")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"date":"2024-07-01","time":"10:30:15"}"#))
            .unwrap();
        let (status, body) = send(&test_app(dir.path()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_schedule_invalid_date_is_bad_request() {
        let dir = tempfile::tempdir().unwrap();
        let request = Request::builder()
            .method("POST")
            .uri("/api/v1/schedule")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(r#"{"date":"2024-13-45","time":"10:30"}"#))
            .unwrap();
        let (status, body) = send(&test_app(dir.path()), request).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }
}
