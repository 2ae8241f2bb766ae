//! Maps core errors to plain-text HTTP responses.

use axum::{
    http::{header, HeaderValue, StatusCode},
    response::{IntoResponse, Response},
};
use paast_core::AppError;

/// Error returned by every handler; the only place statuses are chosen.
#[derive(Debug)]
pub struct HttpError(pub AppError);

impl From<AppError> for HttpError {
    fn from(err: AppError) -> Self {
        Self(err)
    }
}

impl HttpError {
    fn status(&self) -> StatusCode {
        match &self.0 {
            AppError::EmptyPaste | AppError::BadRequest(_) => StatusCode::BAD_REQUEST,
            AppError::PasteTooLarge { .. } => StatusCode::PAYLOAD_TOO_LARGE,
            AppError::NotFound(_) => StatusCode::NOT_FOUND,
            AppError::RateLimited { .. } => StatusCode::TOO_MANY_REQUESTS,
            AppError::Storage(_)
            | AppError::StorageMessage(_)
            | AppError::Codec(_)
            | AppError::LockPoisoned(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> String {
        match &self.0 {
            AppError::EmptyPaste => "error: your paste is empty!\n".to_string(),
            AppError::PasteTooLarge { .. } => "error: request body too large\n".to_string(),
            AppError::NotFound(id) => format!("paste with id \"{}\" was not found\n", id),
            AppError::RateLimited { retry_after_secs } => format!(
                "error: please wait {} seconds before creating new paste\n",
                retry_after_secs
            ),
            AppError::BadRequest(msg) => format!("error: {}\n", msg),
            _ => "error: internal server error\n".to_string(),
        }
    }
}

impl IntoResponse for HttpError {
    fn into_response(self) -> Response {
        let status = self.status();
        if status.is_server_error() {
            tracing::error!("Request failed: {}", self.0);
        }

        let mut response = (status, self.message()).into_response();
        if let AppError::RateLimited { retry_after_secs } = &self.0 {
            response
                .headers_mut()
                .insert(header::RETRY_AFTER, HeaderValue::from(*retry_after_secs));
        }
        response
    }
}
