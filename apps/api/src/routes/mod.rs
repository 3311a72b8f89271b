pub mod health;

use axum::{
    extract::DefaultBodyLimit,
    routing::{get, post},
    Router,
};

use crate::critique::handlers;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    let upload_limit = state.config.max_upload_bytes;

    Router::new()
        .route("/", get(health::health_handler))
        .route("/health", get(health::health_handler))
        .route(
            "/analyze",
            post(handlers::handle_analyze).layer(DefaultBodyLimit::max(upload_limit)),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use async_trait::async_trait;
    use axum::{
        body::{to_bytes, Body},
        http::{header, Request, StatusCode},
    };
    use serde_json::Value;
    use tower::ServiceExt;

    use super::*;
    use crate::config::Config;
    use crate::critique::service::CritiqueService;
    use crate::extraction::{ExtractionError, TextRecognizer};
    use crate::llm_client::{CompletionRequest, LlmBackend, LlmError};

    const BOUNDARY: &str = "critic-test-boundary";

    struct FixedReply(&'static str);

    #[async_trait]
    impl LlmBackend for FixedReply {
        fn model(&self) -> &str {
            "fixed-model"
        }

        fn supports_images(&self) -> bool {
            false
        }

        async fn complete(&self, _request: &CompletionRequest<'_>) -> Result<String, LlmError> {
            Ok(self.0.to_string())
        }
    }

    struct FixedOcr(&'static str);

    impl TextRecognizer for FixedOcr {
        fn recognize(&self, _image: &[u8]) -> Result<String, ExtractionError> {
            Ok(self.0.to_string())
        }
    }

    fn app_with(
        reply: &'static str,
        ocr: Option<Arc<dyn TextRecognizer>>,
        env: &[(&str, &str)],
    ) -> Router {
        let config = Config::from_lookup(|key| {
            env.iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.to_string())
        })
        .unwrap();
        let critic = CritiqueService::new(Arc::new(FixedReply(reply)), config.critique.clone());
        build_router(AppState {
            critic: Arc::new(critic),
            ocr,
            config,
        })
    }

    fn app(reply: &'static str) -> Router {
        app_with(reply, None, &[])
    }

    fn multipart_body(parts: &[(&str, Option<&str>, &str)]) -> Vec<u8> {
        let mut body = Vec::new();
        for (name, file_name, data) in parts {
            body.extend_from_slice(format!("--{BOUNDARY}\r\n").as_bytes());
            let disposition = match file_name {
                Some(f) => format!(
                    "Content-Disposition: form-data; name=\"{name}\"; filename=\"{f}\"\r\n"
                ),
                None => format!("Content-Disposition: form-data; name=\"{name}\"\r\n"),
            };
            body.extend_from_slice(disposition.as_bytes());
            body.extend_from_slice(b"\r\n");
            body.extend_from_slice(data.as_bytes());
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        body
    }

    fn analyze_request(parts: &[(&str, Option<&str>, &str)]) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/analyze")
            .header(
                header::CONTENT_TYPE,
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(multipart_body(parts)))
            .unwrap()
    }

    async fn json_body(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app("{}")
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["status"], "running");
        assert_eq!(body["model"], "fixed-model");
    }

    #[tokio::test]
    async fn test_analyze_text_with_job_description() {
        let reply = r#"{"candidate_name": "Jane", "is_match": false, "overall_score": 90}"#;
        let response = app(reply)
            .oneshot(analyze_request(&[
                ("file", Some("cv.txt"), "Jane Doe, Rust engineer"),
                ("job_description", None, "Required: Terraform"),
            ]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["candidate_name"], "Jane");
        assert_eq!(body["overall_score"], 12);
        assert_eq!(body["raw_text"], "Jane Doe, Rust engineer");
        assert_eq!(body["improvements"].as_array().unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_analyze_model_garbage_is_still_ok() {
        let response = app("not json at all")
            .oneshot(analyze_request(&[("file", Some("cv.txt"), "Jane")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["candidate_name"], "Error");
        assert_eq!(body["overall_score"], 0);
    }

    #[tokio::test]
    async fn test_analyze_image_on_text_model() {
        let response = app("{}")
            .oneshot(analyze_request(&[("file", Some("cv.png"), "PNG")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["summary"], "fixed-model cannot read images.");
    }

    #[tokio::test]
    async fn test_analyze_image_with_ocr_gets_normal_critique() {
        let reply = r#"{"candidate_name": "Jane", "overall_score": 64}"#;
        let ocr: Arc<dyn TextRecognizer> = Arc::new(FixedOcr("Jane Doe\nData analyst"));
        let response = app_with(reply, Some(ocr), &[])
            .oneshot(analyze_request(&[("file", Some("cv.png"), "PNG")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = json_body(response).await;
        assert_eq!(body["candidate_name"], "Jane");
        assert_eq!(body["overall_score"], 64);
        assert_eq!(body["raw_text"], "Jane Doe\nData analyst");
    }

    #[tokio::test]
    async fn test_analyze_over_upload_limit_is_413() {
        let resume = "Rust engineer. ".repeat(20);
        let response = app_with("{}", None, &[("MAX_UPLOAD_BYTES", "128")])
            .oneshot(analyze_request(&[("file", Some("cv.txt"), resume.as_str())]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "PAYLOAD_TOO_LARGE");
    }

    #[tokio::test]
    async fn test_analyze_without_file_is_bad_request() {
        let response = app("{}")
            .oneshot(analyze_request(&[("job_description", None, "Rust")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_analyze_unsupported_extension() {
        let response = app("{}")
            .oneshot(analyze_request(&[("file", Some("cv.odt"), "PK")]))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = json_body(response).await;
        assert_eq!(body["error"]["code"], "UNSUPPORTED_FILE");
    }
}
