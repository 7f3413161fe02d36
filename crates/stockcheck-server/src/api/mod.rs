mod batch;
mod stock;

use std::sync::Arc;

use axum::{
    http::{header, HeaderName, Method, StatusCode},
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Utc};
use serde::Serialize;
use stockcheck_scraper::StockChecker;
use tower::ServiceBuilder;
use tower_http::{cors::CorsLayer, trace::TraceLayer};

use crate::middleware::{request_id, REQUEST_ID_HEADER};

#[derive(Clone)]
pub struct AppState {
    pub checker: Arc<StockChecker>,
}

#[derive(Debug, Serialize)]
pub struct ResponseMeta {
    pub request_id: String,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Serialize)]
pub struct ApiError {
    pub error: ErrorBody,
    pub meta: ResponseMeta,
}

#[derive(Debug, Serialize)]
pub struct ErrorBody {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Serialize, PartialEq, Eq)]
struct HealthData {
    status: &'static str,
    message: &'static str,
}

impl ResponseMeta {
    pub(super) fn new(request_id: String) -> Self {
        Self {
            request_id,
            timestamp: Utc::now(),
        }
    }
}

impl ApiError {
    pub fn new(
        request_id: impl Into<String>,
        code: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            error: ErrorBody {
                code: code.into(),
                message: message.into(),
            },
            meta: ResponseMeta::new(request_id.into()),
        }
    }

    pub(super) fn validation(request_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self::new(request_id, "validation_error", message)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let status = if self.error.code == "validation_error" {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(self)).into_response()
    }
}

fn build_cors() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(tower_http::cors::Any)
        .allow_methods([Method::GET, Method::POST])
        .allow_headers([
            header::CONTENT_TYPE,
            HeaderName::from_static(REQUEST_ID_HEADER),
        ])
        .expose_headers([HeaderName::from_static(REQUEST_ID_HEADER)])
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .route("/", get(health))
        .route("/check_stock", get(stock::check_stock))
        .route("/check_batch", post(batch::check_batch))
        .layer(
            ServiceBuilder::new()
                .layer(build_cors())
                .layer(axum::middleware::from_fn(request_id))
                .layer(TraceLayer::new_for_http()),
        )
        .with_state(state)
}

async fn health() -> Json<HealthData> {
    Json(HealthData {
        status: "ok",
        message: "stock check service is running",
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use stockcheck_core::AvailabilityPolicy;
    use stockcheck_scraper::{FetchConfig, Fetcher, SiteConfig};
    use tower::ServiceExt;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const IN_STOCK_PAGE: &str = r#"<html><script>window.zara.viewData = {"product":{"detail":{"colors":[{"sizes":[{"availability":"in_stock"}]}]}}};</script></html>"#;

    fn app_for(base_url: &str) -> Router {
        let fetcher = Fetcher::new(FetchConfig::direct(5)).expect("fetcher");
        let checker = StockChecker::new(
            fetcher,
            SiteConfig::new(base_url, "tr/tr"),
            AvailabilityPolicy::default(),
        )
        .with_search_fallback(false);
        build_app(AppState {
            checker: Arc::new(checker),
        })
    }

    /// App whose storefront is never reachable; for requests that fail validation.
    fn offline_app() -> Router {
        app_for("http://127.0.0.1:1")
    }

    async fn body_json(response: axum::response::Response) -> serde_json::Value {
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body bytes");
        serde_json::from_slice(&body).expect("json parse")
    }

    async fn get_uri(app: Router, uri: &str) -> axum::response::Response {
        app.oneshot(Request::builder().uri(uri).body(Body::empty()).expect("request"))
            .await
            .expect("response")
    }

    async fn post_json(app: Router, uri: &str, body: &serde_json::Value) -> axum::response::Response {
        app.oneshot(
            Request::builder()
                .method("POST")
                .uri(uri)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("request"),
        )
        .await
        .expect("response")
    }

    async fn mount_product(server: &MockServer, product_id: &str) {
        Mock::given(method("GET"))
            .and(path(format!("/tr/tr/-p{product_id}.html")))
            .respond_with(ResponseTemplate::new(200).set_body_string(IN_STOCK_PAGE))
            .mount(server)
            .await;
    }

    #[test]
    fn api_error_validation_error_maps_to_bad_request() {
        let response = ApiError::validation("req-1", "invalid input").into_response();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[test]
    fn api_error_other_codes_map_to_internal_error() {
        let response = ApiError::new("req-1", "not_found", "gone").into_response();
        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }

    #[tokio::test]
    async fn health_returns_status_ok() {
        let response = get_uri(offline_app(), "/").await;
        assert_eq!(response.status(), StatusCode::OK);
        assert!(response.headers().contains_key(REQUEST_ID_HEADER));
        let json = body_json(response).await;
        assert_eq!(json["status"], "ok");
        assert!(json["message"].as_str().is_some_and(|m| !m.is_empty()));
    }

    #[tokio::test]
    async fn request_id_header_is_propagated() {
        let response = offline_app()
            .oneshot(
                Request::builder()
                    .uri("/")
                    .header(REQUEST_ID_HEADER, "req-from-client")
                    .body(Body::empty())
                    .expect("request"),
            )
            .await
            .expect("response");
        assert_eq!(
            response.headers()[REQUEST_ID_HEADER].to_str().ok(),
            Some("req-from-client")
        );
    }

    #[tokio::test]
    async fn check_stock_rejects_unsupported_brand() {
        let response = get_uri(offline_app(), "/check_stock?brand=mango&code=20230010").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "validation_error");
        assert!(json["meta"]["request_id"].is_string());
    }

    #[tokio::test]
    async fn check_stock_rejects_missing_brand() {
        let response = get_uri(offline_app(), "/check_stock?code=20230010").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn check_stock_requires_sku_or_code() {
        let response = get_uri(offline_app(), "/check_stock?brand=zara").await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let json = body_json(response).await;
        assert_eq!(json["error"]["code"], "validation_error");
    }

    #[tokio::test]
    async fn check_stock_returns_response_for_supported_brand() {
        let server = MockServer::start().await;
        mount_product(&server, "20230010").await;

        let response = get_uri(app_for(&server.uri()), "/check_stock?brand=ZARA&code=20230010").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["ok"], true);
        assert_eq!(json["in_stock"], true);
        assert_eq!(json["verdict"], "IN_STOCK");
        assert_eq!(json["product_id"], "20230010");
    }

    #[tokio::test]
    async fn check_stock_prefers_sku_over_code() {
        let server = MockServer::start().await;
        mount_product(&server, "00526310").await;

        let response = get_uri(
            app_for(&server.uri()),
            "/check_stock?brand=zara&code=99999999&sku=0052%2F6310",
        )
        .await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["product_id"], "00526310");
        assert_eq!(json["searched"], "0052/6310");
    }

    #[tokio::test]
    async fn check_stock_transport_failure_is_still_200() {
        let response = get_uri(offline_app(), "/check_stock?brand=zara&code=20230010").await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["ok"], false);
        assert_eq!(json["verdict"], "UNKNOWN");
        assert_eq!(json["error_kind"], "transport");
        assert!(json["error"].is_string());
    }

    #[tokio::test]
    async fn check_batch_isolates_unsupported_brand() {
        let server = MockServer::start().await;
        mount_product(&server, "20230010").await;

        let body = serde_json::json!({
            "items": [
                {"brand": "zara", "sku": "2023/0010", "meta": {"row": 1}},
                {"brand": "mango", "sku": "12345678"}
            ]
        });
        let response = post_json(app_for(&server.uri()), "/check_batch", &body).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["count"], 2);

        let results = json["results"].as_array().expect("results array");
        assert_eq!(results.len(), 2);
        assert_eq!(results[0]["ok"], true);
        assert_eq!(results[0]["in_stock"], true);
        assert_eq!(results[0]["brand"], "zara");
        assert_eq!(results[0]["sku"], "2023/0010");
        assert_eq!(results[0]["meta"]["row"], 1);

        assert_eq!(results[1]["ok"], false);
        assert_eq!(results[1]["verdict"], "UNKNOWN");
        assert_eq!(results[1]["error_kind"], "validation");
        assert_eq!(results[1]["brand"], "mango");
    }

    #[tokio::test]
    async fn check_batch_item_without_identifier_fails_inline() {
        let body = serde_json::json!({"items": [{"brand": "zara"}]});
        let response = post_json(offline_app(), "/check_batch", &body).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["count"], 1);
        assert_eq!(json["results"][0]["ok"], false);
        assert_eq!(json["results"][0]["error_kind"], "validation");
    }

    #[tokio::test]
    async fn check_batch_empty_items() {
        let body = serde_json::json!({"items": []});
        let response = post_json(offline_app(), "/check_batch", &body).await;
        assert_eq!(response.status(), StatusCode::OK);
        let json = body_json(response).await;
        assert_eq!(json["count"], 0);
        assert_eq!(json["results"].as_array().map(Vec::len), Some(0));
    }
}
