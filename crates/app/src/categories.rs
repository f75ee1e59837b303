//! HTTP handlers for `/api/public/categories`.
//!
//! Successful mutations and not-found failures answer in plain text; listing
//! answers with a JSON array of categories.

use axum::{
    extract::{
        rejection::{JsonRejection, PathRejection},
        Path, State,
    },
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use metrics::counter;
use thiserror::Error;
use tracing::{error, info};

use ecom_catalog_core::{Category, CategoryError, CategoryId, CategoryPayload};

use crate::problem::ProblemResponse;
use crate::router::AppState;

pub const CATEGORY_CREATED: &str = "Category added successfully!";

/// Failures a category handler can answer with.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error(transparent)]
    Category(#[from] CategoryError),
    #[error("invalid request body: {0}")]
    InvalidBody(#[from] JsonRejection),
    #[error("invalid category id: {0}")]
    InvalidPath(#[from] PathRejection),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match self {
            Self::Category(err @ CategoryError::NotFound(_)) => {
                (StatusCode::NOT_FOUND, err.to_string()).into_response()
            }
            Self::Category(CategoryError::Store(err)) => {
                error!(stage = "api", error = %err, "category store failure");
                ProblemResponse::store_unavailable().into_response()
            }
            Self::InvalidBody(rejection) => {
                ProblemResponse::invalid_request(rejection.body_text()).into_response()
            }
            Self::InvalidPath(rejection) => {
                ProblemResponse::invalid_request(rejection.body_text()).into_response()
            }
        }
    }
}

pub async fn list_categories(
    State(state): State<AppState>,
) -> Result<Json<Vec<Category>>, ApiError> {
    let categories = track("list", state.categories().get_all_categories().await)?;
    Ok(Json(categories))
}

pub async fn create_category(
    State(state): State<AppState>,
    payload: Result<Json<CategoryPayload>, JsonRejection>,
) -> Result<(StatusCode, &'static str), ApiError> {
    let Json(payload) = payload?;

    let created = track("create", state.categories().create_category(payload).await)?;
    info!(stage = "api", category_id = created.category_id, "category created");
    Ok((StatusCode::CREATED, CATEGORY_CREATED))
}

pub async fn update_category(
    State(state): State<AppState>,
    category_id: Result<Path<CategoryId>, PathRejection>,
    payload: Result<Json<CategoryPayload>, JsonRejection>,
) -> Result<String, ApiError> {
    let Path(category_id) = category_id?;
    let Json(payload) = payload?;

    let saved = track(
        "update",
        state
            .categories()
            .update_category(payload, category_id)
            .await,
    )?;
    info!(stage = "api", category_id = saved.category_id, "category updated");
    Ok(format!(
        "Category with id: {} updated successfully",
        saved.category_id
    ))
}

pub async fn delete_category(
    State(state): State<AppState>,
    category_id: Result<Path<CategoryId>, PathRejection>,
) -> Result<String, ApiError> {
    let Path(category_id) = category_id?;

    let message = track(
        "delete",
        state.categories().delete_category(category_id).await,
    )?;
    info!(stage = "api", category_id, "category deleted");
    Ok(message)
}

fn track<T>(op: &'static str, result: Result<T, CategoryError>) -> Result<T, ApiError> {
    let outcome = match &result {
        Ok(_) => "ok",
        Err(CategoryError::NotFound(_)) => "not_found",
        Err(CategoryError::Store(_)) => "error",
    };
    counter!("category_operations_total", "op" => op, "result" => outcome).increment(1);
    result.map_err(ApiError::from)
}
