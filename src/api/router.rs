use axum::{
    Router,
    routing::{get, post},
};
use std::sync::Arc;
use tower_http::trace::TraceLayer;

use super::handlers::{
    AppState, borrow_book, get_book, list_member_loans, overdue_report, return_book,
};

/// 貸出管理APIのルーターを作成する
///
/// Command endpoints:
/// - POST /members/:member_id/loans - 書籍を貸し出す
/// - POST /members/:member_id/returns - 書籍を返却する
///
/// Query endpoints:
/// - GET /books/:book_id - 在庫状態
/// - GET /members/:member_id/loans - 会員の貸出一覧
/// - GET /reports/overdue - 延滞書籍レポート
pub fn create_router(state: Arc<AppState>) -> Router {
    Router::new()
        .route("/health", get(health_check))
        .route("/books/:book_id", get(get_book))
        .route(
            "/members/:member_id/loans",
            post(borrow_book).get(list_member_loans),
        )
        .route("/members/:member_id/returns", post(return_book))
        .route("/reports/overdue", get(overdue_report))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

async fn health_check() -> &'static str {
    "OK"
}
