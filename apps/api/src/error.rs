use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use keyexpiry_core::AppError;
use serde::Serialize;
use tracing::{error, warn};

/// API error payload.
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    message: String,
}

/// HTTP API error wrapper around core application errors.
#[derive(Debug)]
pub struct ApiError(pub AppError);

impl From<AppError> for ApiError {
    fn from(value: AppError) -> Self {
        Self(value)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match self.0 {
            AppError::Validation(_)
            | AppError::UnrecognizedOperation(_)
            | AppError::UnresolvablePath(_)
            | AppError::AppNotFound(_) => StatusCode::BAD_REQUEST,
            AppError::Upstream(_) => StatusCode::BAD_GATEWAY,
            AppError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        let message = self.0.to_string();
        if status.is_server_error() {
            error!(%status, %message, "request failed");
        } else {
            warn!(%status, %message, "request rejected");
        }

        (status, Json(ErrorResponse { message })).into_response()
    }
}

/// Standard API result type.
pub type ApiResult<T> = Result<T, ApiError>;

#[cfg(test)]
mod tests {
    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use keyexpiry_core::AppError;

    use super::ApiError;

    #[test]
    fn lookup_and_classification_errors_are_bad_requests() {
        for error in [
            AppError::UnrecognizedOperation("method Foo not supported".to_owned()),
            AppError::UnresolvablePath("could not find app path".to_owned()),
            AppError::AppNotFound("404".to_owned()),
        ] {
            let response = ApiError(error).into_response();
            assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        }
    }

    #[test]
    fn infrastructure_errors_are_server_errors() {
        let upstream = ApiError(AppError::Upstream("timeout".to_owned())).into_response();
        let internal = ApiError(AppError::Internal("body".to_owned())).into_response();

        assert_eq!(upstream.status(), StatusCode::BAD_GATEWAY);
        assert_eq!(internal.status(), StatusCode::INTERNAL_SERVER_ERROR);
    }
}
