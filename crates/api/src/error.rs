use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::warn;

use common::Error;

/// Error body shared by every route: `{"success": false, "error": "..."}`.
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub message: String,
}

impl ApiError {
    pub fn new(status: StatusCode, message: impl Into<String>) -> Self {
        Self {
            status,
            message: message.into(),
        }
    }
}

impl From<Error> for ApiError {
    fn from(e: Error) -> Self {
        let status = match &e {
            Error::InvalidDate(_) | Error::InvalidRequest(_) | Error::UnknownLocation(_) => {
                StatusCode::BAD_REQUEST
            }
            Error::NoCurveData(_) | Error::NoData => StatusCode::NOT_FOUND,
            Error::ProviderUnavailable(_) | Error::Http(_) => StatusCode::BAD_GATEWAY,
            Error::Cancelled { .. } => StatusCode::CONFLICT,
            Error::Json(_) | Error::Csv(_) | Error::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };
        Self::new(status, e.to_string())
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        if self.status.is_server_error() {
            warn!(status = %self.status, error = %self.message, "Request failed");
        }
        (
            self.status,
            Json(json!({ "success": false, "error": self.message })),
        )
            .into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn domain_errors_map_to_statuses() {
        let status = |e: Error| ApiError::from(e).status;
        assert_eq!(status(Error::InvalidDate("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(Error::UnknownLocation("x".into())), StatusCode::BAD_REQUEST);
        assert_eq!(status(Error::NoCurveData("x".into())), StatusCode::NOT_FOUND);
        assert_eq!(status(Error::NoData), StatusCode::NOT_FOUND);
        assert_eq!(status(Error::ProviderUnavailable("x".into())), StatusCode::BAD_GATEWAY);
        assert_eq!(
            status(Error::Io(std::io::Error::other("x"))),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
