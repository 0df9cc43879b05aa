use crate::application::circulation::{
    CirculationError, ServiceDependencies, book_inventory, borrow_book as execute_borrow_book,
    collect_overdue, member_loans, return_book as execute_return_book,
};
use crate::domain::{
    BookId, MemberId,
    commands::{BorrowBook, ReturnBook},
};
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
    response::{IntoResponse, Response},
};
use chrono::NaiveDate;
use std::sync::Arc;

use super::{
    auth::AuthenticatedActor,
    error::ApiError,
    types::{
        BookResponse, BorrowRequest, BorrowedResponse, ErrorResponse, ListLoansQuery,
        LoanResponse, OverdueQuery, ReturnRequest, ReturnedResponse, parse_status_filter,
    },
};

// ============================================================================
// State
// ============================================================================

/// ハンドラー間で共有されるアプリケーション状態
#[derive(Clone)]
pub struct AppState {
    pub service_deps: ServiceDependencies,
}

fn today() -> NaiveDate {
    chrono::Utc::now().date_naive()
}

// ============================================================================
// Command handlers (POST)
// ============================================================================

/// POST /members/:member_id/loans - 書籍を貸し出す
///
/// 強制されるビジネスルール:
/// - 会員本人または司書のみが操作できること
/// - 会員が存在し、有効であること
/// - 書籍が存在し、在庫があること
pub async fn borrow_book(
    State(state): State<Arc<AppState>>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(member_id): Path<MemberId>,
    Json(req): Json<BorrowRequest>,
) -> Result<(StatusCode, Json<BorrowedResponse>), ApiError> {
    let cmd = BorrowBook {
        actor,
        member_id,
        book_id: req.book_id,
        borrowed_on: req.borrowed_on.unwrap_or_else(today),
    };

    let event = execute_borrow_book(&state.service_deps, cmd).await?;

    Ok((StatusCode::CREATED, Json(BorrowedResponse::from(event))))
}

/// POST /members/:member_id/returns - 書籍を返却する
///
/// 強制されるビジネスルール:
/// - 会員がその書籍の未返却の貸出を持っていること
/// - 返却日が貸出日より前でないこと
/// - 延滞中の貸出も返却可能
pub async fn return_book(
    State(state): State<Arc<AppState>>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(member_id): Path<MemberId>,
    Json(req): Json<ReturnRequest>,
) -> Result<(StatusCode, Json<ReturnedResponse>), ApiError> {
    let cmd = ReturnBook {
        actor,
        member_id,
        book_id: req.book_id,
        returned_on: req.returned_on.unwrap_or_else(today),
    };

    let event = execute_return_book(&state.service_deps, cmd).await?;

    Ok((StatusCode::OK, Json(ReturnedResponse::from(event))))
}

// ============================================================================
// Query handlers (GET)
// ============================================================================

/// GET /books/:book_id - 書籍の在庫状態を取得
pub async fn get_book(
    State(state): State<Arc<AppState>>,
    Path(book_id): Path<BookId>,
) -> Result<Json<BookResponse>, QueryError> {
    let book = book_inventory(&state.service_deps, book_id).await?;
    Ok(Json(BookResponse::from(book)))
}

/// GET /members/:member_id/loans - 会員の貸出一覧を取得
///
/// クエリパラメータ:
/// - as_of: ステータス判定の基準日（オプション、既定は当日）
/// - status: ステータスでフィルタリング（active, overdue, returned）（オプション）
pub async fn list_member_loans(
    State(state): State<Arc<AppState>>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Path(member_id): Path<MemberId>,
    Query(query): Query<ListLoansQuery>,
) -> Result<Json<Vec<LoanResponse>>, QueryError> {
    // フィルタは取得前に検証する
    let status = query
        .status
        .as_deref()
        .map(parse_status_filter)
        .transpose()
        .map_err(QueryError::BadRequest)?;

    let as_of = query.as_of.unwrap_or_else(today);
    let loans = member_loans(&state.service_deps, &actor, member_id, as_of).await?;

    let loans = loans
        .into_iter()
        .filter(|loan| status.is_none_or(|status| loan.status == status))
        .map(LoanResponse::from)
        .collect();

    Ok(Json(loans))
}

/// GET /reports/overdue - 延滞書籍レポート（職員のみ）
///
/// 延滞中の貸出1件につき書籍1件を返す。
pub async fn overdue_report(
    State(state): State<Arc<AppState>>,
    AuthenticatedActor(actor): AuthenticatedActor,
    Query(query): Query<OverdueQuery>,
) -> Result<Json<Vec<BookResponse>>, QueryError> {
    if !actor.may_view_overdue_report() {
        return Err(QueryError::Forbidden);
    }

    let as_of = query.as_of.unwrap_or_else(today);
    let books = collect_overdue(&state.service_deps, as_of).await?;

    Ok(Json(books.into_iter().map(BookResponse::from).collect()))
}

// ============================================================================
// Error types
// ============================================================================

/// クエリハンドラー用のエラー型
#[derive(Debug)]
pub enum QueryError {
    NotFound(String),
    BadRequest(String),
    Forbidden,
    InternalError(String),
}

impl From<CirculationError> for QueryError {
    fn from(err: CirculationError) -> Self {
        match err {
            CirculationError::BookNotFound(_) | CirculationError::MemberNotEligible(_) => {
                QueryError::NotFound(err.to_string())
            }
            CirculationError::Forbidden => QueryError::Forbidden,
            CirculationError::StorageFailure(source) => {
                QueryError::InternalError(format!("Storage failure: {}", source))
            }
            other => QueryError::InternalError(other.to_string()),
        }
    }
}

impl IntoResponse for QueryError {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match self {
            QueryError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg),
            QueryError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "BAD_REQUEST", msg),
            QueryError::Forbidden => (
                StatusCode::FORBIDDEN,
                "FORBIDDEN",
                "Not allowed to view this resource".to_string(),
            ),
            QueryError::InternalError(msg) => {
                // 内部エラーの詳細はログに記録し、クライアントには一般的なメッセージのみを返す
                tracing::error!("Internal error in query handler: {}", msg);
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An unexpected error occurred".to_string(),
                )
            }
        };

        let body = Json(ErrorResponse::new(error_type, message));
        (status, body).into_response()
    }
}
