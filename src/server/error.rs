use std::convert::Infallible;

use log::error;
use serde_json::json;
use thiserror::Error;
use warp::{http::StatusCode, Rejection, Reply};

/// Error taxonomy of the HTTP surface. Page routes handle auth redirects
/// themselves; everything else funnels through [`handle_rejection`].
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Missing required field: {0}")]
    MissingField(&'static str),
    #[error("{0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(&'static str),
    #[error("Authentication required")]
    AuthRequired,
    #[error("storage failure")]
    Storage(anyhow::Error),
    #[error("image processing failure")]
    Processing(anyhow::Error),
}

impl warp::reject::Reject for ApiError {}

pub fn reject(err: ApiError) -> Rejection {
    warp::reject::custom(err)
}

pub async fn handle_rejection(rejection: Rejection) -> Result<impl Reply, Infallible> {
    let (status, message) = if let Some(err) = rejection.find::<ApiError>() {
        match err {
            ApiError::MissingField(_) | ApiError::Validation(_) => {
                (StatusCode::BAD_REQUEST, err.to_string())
            }
            ApiError::NotFound(_) => (StatusCode::NOT_FOUND, err.to_string()),
            ApiError::AuthRequired => (StatusCode::UNAUTHORIZED, err.to_string()),
            ApiError::Storage(source) => {
                error!("storage failure: {source:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Failed to access stored data".to_string(),
                )
            }
            ApiError::Processing(source) => {
                error!("image processing failure: {source:#}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "Could not process image".to_string(),
                )
            }
        }
    } else if rejection.is_not_found() {
        (StatusCode::NOT_FOUND, "Resource not found".to_string())
    } else {
        (StatusCode::BAD_REQUEST, "Invalid request".to_string())
    };

    let reply = warp::reply::json(&json!({ "error": message }));
    Ok(warp::reply::with_status(reply, status))
}
