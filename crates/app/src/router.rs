use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::{get, put},
    Router,
};
use metrics_exporter_prometheus::PrometheusHandle;

use ecom_catalog_core::{CategoryService, CategoryStore};

use crate::{categories, telemetry};

#[derive(Clone)]
pub struct AppState {
    metrics: PrometheusHandle,
    categories: Arc<CategoryService>,
}

impl AppState {
    pub fn new(metrics: PrometheusHandle, store: Arc<dyn CategoryStore>) -> Self {
        Self {
            metrics,
            categories: Arc::new(CategoryService::new(store)),
        }
    }

    pub fn metrics(&self) -> &PrometheusHandle {
        &self.metrics
    }

    pub fn categories(&self) -> &CategoryService {
        &self.categories
    }
}

pub fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/healthz", get(healthz))
        .route("/metrics", get(metrics))
        .route(
            "/api/public/categories",
            get(categories::list_categories).post(categories::create_category),
        )
        .route(
            "/api/public/categories/:category_id",
            put(categories::update_category).delete(categories::delete_category),
        )
        .with_state(state)
}

async fn healthz() -> StatusCode {
    StatusCode::OK
}

async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    let body = telemetry::render_metrics(state.metrics());
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        body,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use axum::{body::Body, http::Request};
    use ecom_catalog_core::{
        Category, CategoryId, CategoryPayload, InMemoryCategoryStore, StoreError,
    };
    use ecom_catalog_storage::Database;
    use http_body_util::BodyExt;
    use serde_json::{json, Value};
    use tower::ServiceExt;

    struct FailingStore;

    #[derive(Debug, thiserror::Error)]
    #[error("connection refused")]
    struct Unavailable;

    #[async_trait]
    impl CategoryStore for FailingStore {
        async fn find_all(&self) -> Result<Vec<Category>, StoreError> {
            Err(StoreError::backend(Unavailable))
        }

        async fn find_by_id(&self, _id: CategoryId) -> Result<Option<Category>, StoreError> {
            Err(StoreError::backend(Unavailable))
        }

        async fn save(&self, _payload: CategoryPayload) -> Result<Category, StoreError> {
            Err(StoreError::backend(Unavailable))
        }

        async fn delete(&self, _category: &Category) -> Result<(), StoreError> {
            Err(StoreError::backend(Unavailable))
        }
    }

    fn setup_state() -> AppState {
        let metrics = telemetry::init_metrics().expect("metrics init");
        AppState::new(metrics, Arc::new(InMemoryCategoryStore::new()))
    }

    async fn send(
        app: &Router,
        method: &str,
        uri: &str,
        body: Option<Value>,
    ) -> (StatusCode, Option<String>, String) {
        let builder = Request::builder().method(method).uri(uri);
        let request = match body {
            Some(value) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(value.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = app
            .clone()
            .oneshot(request)
            .await
            .expect("handler should respond");
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let collected = response
            .into_body()
            .collect()
            .await
            .expect("body should read");
        let body = String::from_utf8(collected.to_bytes().to_vec()).expect("utf-8");
        (status, content_type, body)
    }

    #[tokio::test]
    async fn healthz_returns_ok() {
        let app = app_router(setup_state());
        let (status, _, _) = send(&app, "GET", "/healthz", None).await;
        assert_eq!(status, StatusCode::OK);
    }

    #[tokio::test]
    async fn metrics_exports_build_info_and_category_counters() {
        let app = app_router(setup_state());
        send(&app, "GET", "/api/public/categories", None).await;

        let (status, _, body) = send(&app, "GET", "/metrics", None).await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("app_build_info"));
        assert!(body.contains("app_uptime_seconds"));
        assert!(body.contains("category_operations_total"));
    }

    #[tokio::test]
    async fn list_starts_empty() {
        let app = app_router(setup_state());
        let (status, content_type, body) = send(&app, "GET", "/api/public/categories", None).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some("application/json"));
        assert_eq!(body, "[]");
    }

    #[tokio::test]
    async fn create_list_and_delete_round_trip() {
        let app = app_router(setup_state());

        let (status, content_type, body) = send(
            &app,
            "POST",
            "/api/public/categories",
            Some(json!({ "categoryName": "Electronics" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert!(content_type.unwrap_or_default().starts_with("text/plain"));
        assert_eq!(body, categories::CATEGORY_CREATED);

        let (status, _, _) = send(
            &app,
            "POST",
            "/api/public/categories",
            Some(json!({ "categoryName": "Books" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, _, body) = send(&app, "GET", "/api/public/categories", None).await;
        let listed: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(
            listed,
            json!([
                { "categoryId": 1, "categoryName": "Electronics" },
                { "categoryId": 2, "categoryName": "Books" },
            ])
        );

        let (status, _, body) = send(&app, "DELETE", "/api/public/categories/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Category with categoryId: 1 deleted successfully");

        let (status, content_type, body) =
            send(&app, "DELETE", "/api/public/categories/1", None).await;
        assert_eq!(status, StatusCode::NOT_FOUND);
        assert!(content_type.unwrap_or_default().starts_with("text/plain"));
        assert_eq!(body, "Category with categoryId: 1 not found");
    }

    #[tokio::test]
    async fn update_renames_the_path_category() {
        let app = app_router(setup_state());
        for name in ["Electronics", "Books"] {
            send(
                &app,
                "POST",
                "/api/public/categories",
                Some(json!({ "categoryName": name })),
            )
            .await;
        }

        let (status, _, body) = send(
            &app,
            "PUT",
            "/api/public/categories/1",
            Some(json!({ "categoryId": 2, "categoryName": "Gadgets" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Category with id: 1 updated successfully");

        let (_, _, body) = send(&app, "GET", "/api/public/categories", None).await;
        let listed: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(
            listed,
            json!([
                { "categoryId": 1, "categoryName": "Gadgets" },
                { "categoryId": 2, "categoryName": "Books" },
            ])
        );
    }

    #[tokio::test]
    async fn update_of_missing_category_returns_not_found() {
        let app = app_router(setup_state());
        let (status, _, body) = send(
            &app,
            "PUT",
            "/api/public/categories/9",
            Some(json!({ "categoryName": "Nope" })),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body, "Category with categoryId: 9 not found");
    }

    #[tokio::test]
    async fn blank_or_missing_name_is_accepted() {
        let app = app_router(setup_state());
        let (status, _, body) = send(
            &app,
            "POST",
            "/api/public/categories",
            Some(json!({ "categoryName": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);
        assert_eq!(body, categories::CATEGORY_CREATED);

        let (status, _, _) = send(
            &app,
            "POST",
            "/api/public/categories",
            Some(json!({ "categoryId": 5 })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (status, _, body) = send(
            &app,
            "PUT",
            "/api/public/categories/1",
            Some(json!({ "categoryName": "" })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Category with id: 1 updated successfully");

        let (_, _, body) = send(&app, "GET", "/api/public/categories", None).await;
        let listed: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(
            listed,
            json!([
                { "categoryId": 1, "categoryName": "" },
                { "categoryId": 2, "categoryName": "" },
            ])
        );
    }

    #[tokio::test]
    async fn malformed_body_returns_problem_details() {
        let app = app_router(setup_state());
        let request = Request::builder()
            .method("POST")
            .uri("/api/public/categories")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from("{not json"))
            .unwrap();

        let response = app.oneshot(request).await.expect("handler should respond");
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        assert_eq!(
            response.headers().get(header::CONTENT_TYPE).unwrap(),
            "application/problem+json"
        );
        let collected = response.into_body().collect().await.expect("body");
        let problem: Value = serde_json::from_slice(&collected.to_bytes()).expect("json");
        assert_eq!(problem["type"], "invalid_request");
    }

    #[tokio::test]
    async fn non_numeric_id_is_a_bad_request() {
        let app = app_router(setup_state());
        let (status, content_type, _) =
            send(&app, "DELETE", "/api/public/categories/abc", None).await;

        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(content_type.as_deref(), Some("application/problem+json"));
    }

    #[tokio::test]
    async fn store_failures_become_internal_errors() {
        let metrics = telemetry::init_metrics().expect("metrics init");
        let app = app_router(AppState::new(metrics, Arc::new(FailingStore)));

        let (status, content_type, body) = send(&app, "GET", "/api/public/categories", None).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(content_type.as_deref(), Some("application/problem+json"));
        let problem: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(problem["type"], "store_unavailable");
    }

    #[tokio::test]
    async fn sqlite_backed_router_serves_categories() {
        let dir = tempfile::tempdir().expect("tempdir");
        let url = format!("sqlite://{}", dir.path().join("catalog.db").display());
        let database = Database::connect(&url).await.expect("connect");
        database.run_migrations().await.expect("migrations");

        let metrics = telemetry::init_metrics().expect("metrics init");
        let app = app_router(AppState::new(metrics, Arc::new(database.categories())));

        let (status, _, _) = send(
            &app,
            "POST",
            "/api/public/categories",
            Some(json!({ "categoryId": 0, "categoryName": "Garden" })),
        )
        .await;
        assert_eq!(status, StatusCode::CREATED);

        let (_, _, body) = send(&app, "GET", "/api/public/categories", None).await;
        let listed: Value = serde_json::from_str(&body).expect("json");
        assert_eq!(listed, json!([{ "categoryId": 1, "categoryName": "Garden" }]));

        let (status, _, body) = send(&app, "DELETE", "/api/public/categories/1", None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body, "Category with categoryId: 1 deleted successfully");
    }
}
