//! HTTP surface for the redaction handler
//!
//! Accepts serverless invocation envelopes on `POST /invoke` and answers
//! with the invocation result. Pipeline failures are reported in-band,
//! so the status code is 200 whenever the envelope parsed as JSON.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use scrub_core::{InvocationEnvelope, InvocationResult};
use scrub_engine::Pipeline;
use std::sync::Arc;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::info;

pub struct ScrubServer;

impl ScrubServer {
    pub fn router(pipeline: Arc<Pipeline>) -> Router {
        let cors = CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers(Any);

        Router::new()
            .route("/", get(handle_info))
            .route("/invoke", post(handle_invoke))
            .layer(cors)
            .with_state(pipeline)
    }

    pub async fn serve(pipeline: Arc<Pipeline>, host: &str, port: u16) -> anyhow::Result<()> {
        let app = Self::router(pipeline);

        let addr = format!("{}:{}", host, port);
        let listener = TcpListener::bind(&addr).await?;

        info!("scrub server listening on {}", addr);

        axum::serve(listener, app).await?;

        Ok(())
    }
}

/// GET handler for server info/health check
async fn handle_info() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "name": "scrub",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// POST /invoke - run one envelope through the pipeline
async fn handle_invoke(
    State(pipeline): State<Arc<Pipeline>>,
    Json(envelope): Json<InvocationEnvelope>,
) -> Json<InvocationResult> {
    Json(pipeline.handle(&envelope).await)
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::body::{Body, to_bytes};
    use axum::http::{Request, StatusCode};
    use scrub_config::Config;
    use scrub_core::{CardData, Error, Result, RunResponse};
    use scrub_engine::{RunPoller, Sleeper};
    use scrub_services::{
        AuthContext, DeidentifyRequest, DeidentifyResponse, DetectApi, RedactedUpload, VaultApi,
    };
    use std::time::Duration;
    use tower::ServiceExt;

    struct NoSleep;

    #[async_trait]
    impl Sleeper for NoSleep {
        async fn sleep(&self, _duration: Duration) {}
    }

    /// Vault whose records never carry a file.
    struct EmptyVault;

    #[async_trait]
    impl VaultApi for EmptyVault {
        async fn download_url(&self, _auth: &AuthContext, _record_id: &str) -> Result<String> {
            Err(Error::MissingDownloadUrl)
        }

        async fn download_file(&self, _url: &str) -> Result<Vec<u8>> {
            unreachable!()
        }

        async fn upload_file(
            &self,
            _auth: &AuthContext,
            _record_id: &str,
            _file: RedactedUpload,
        ) -> Result<serde_json::Value> {
            unreachable!()
        }

        async fn tokenize(
            &self,
            _auth: &AuthContext,
            _record_id: &str,
            _fields: Option<&CardData>,
        ) -> Result<serde_json::Value> {
            unreachable!()
        }
    }

    struct IdleDetect;

    #[async_trait]
    impl DetectApi for IdleDetect {
        async fn deidentify_file(
            &self,
            _auth: &AuthContext,
            _request: &DeidentifyRequest,
        ) -> Result<DeidentifyResponse> {
            unreachable!()
        }

        async fn run_status(&self, _auth: &AuthContext, _run_id: &str) -> Result<RunResponse> {
            unreachable!()
        }
    }

    fn app() -> Router {
        let pipeline = Pipeline::new(
            Config::default(),
            Arc::new(EmptyVault),
            Arc::new(IdleDetect),
            RunPoller::new(Duration::ZERO, 1, Arc::new(NoSleep)),
        );
        ScrubServer::router(Arc::new(pipeline))
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_info() {
        let response = app()
            .oneshot(Request::get("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(body_json(response).await["name"], "scrub");
    }

    #[tokio::test]
    async fn test_invoke_reports_failure_in_band() {
        let envelope = InvocationEnvelope::new(
            &scrub_core::InvocationRequest {
                skyflow_id: Some("rec-1".to_string()),
                ..Default::default()
            },
            "tok",
        )
        .unwrap();

        let request = Request::post("/invoke")
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&envelope).unwrap()))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let body = body_json(response).await;
        assert_eq!(body["success"], false);
        assert_eq!(body["error"], "No downloadURL");
        assert_eq!(body["steps"]["fileRead"], false);
    }

    #[tokio::test]
    async fn test_invoke_without_body_content() {
        let request = Request::post("/invoke")
            .header("content-type", "application/json")
            .body(Body::from("{}"))
            .unwrap();
        let response = app().oneshot(request).await.unwrap();

        let body = body_json(response).await;
        assert_eq!(body["error"], "BodyContent missing");
    }
}
