use crate::application::circulation::CirculationError;
use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};

use super::types::ErrorResponse;

/// API層のエラー型
///
/// アプリケーション層のエラーをラップし、HTTPレスポンスへのマッピングを提供する。
#[derive(Debug)]
pub struct ApiError(CirculationError);

impl From<CirculationError> for ApiError {
    fn from(err: CirculationError) -> Self {
        ApiError(err)
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let message = self.0.to_string();
        let (status, error_type) = match &self.0 {
            // 404 Not Found - リクエストされたリソースが存在しない
            CirculationError::BookNotFound(_) => (StatusCode::NOT_FOUND, "BOOK_NOT_FOUND"),

            // 403 Forbidden - 操作主体に権限がない
            CirculationError::Forbidden => (StatusCode::FORBIDDEN, "FORBIDDEN"),

            // 422 Unprocessable Entity - ビジネスルール違反
            CirculationError::MemberNotEligible(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "MEMBER_NOT_ELIGIBLE")
            }
            CirculationError::BookUnavailable(_) => {
                (StatusCode::UNPROCESSABLE_ENTITY, "BOOK_UNAVAILABLE")
            }
            CirculationError::OutOfStock(_) => (StatusCode::UNPROCESSABLE_ENTITY, "OUT_OF_STOCK"),
            CirculationError::NoActiveLoan { .. } => {
                (StatusCode::UNPROCESSABLE_ENTITY, "NO_ACTIVE_LOAN")
            }
            CirculationError::AlreadyReturned => {
                (StatusCode::UNPROCESSABLE_ENTITY, "ALREADY_RETURNED")
            }
            CirculationError::InvalidReturnDate => {
                (StatusCode::UNPROCESSABLE_ENTITY, "INVALID_RETURN_DATE")
            }

            // 500 Internal Server Error - システム障害
            // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
            CirculationError::StorageFailure(e) => {
                tracing::error!("Storage failure: {}", e);
                let body = Json(ErrorResponse::new(
                    "STORAGE_FAILURE",
                    "Failed to access circulation storage",
                ));
                return (StatusCode::INTERNAL_SERVER_ERROR, body).into_response();
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
