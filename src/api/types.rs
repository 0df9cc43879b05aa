use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::circulation::LoanView;
use crate::domain::{Book, BookBorrowed, BookId, BookReturned, LoanStatus};

/// 貸出リクエスト（POST /members/:member_id/loans）
#[derive(Debug, Deserialize)]
pub struct BorrowRequest {
    pub book_id: BookId,
    /// 省略時は当日
    pub borrowed_on: Option<NaiveDate>,
}

/// 返却リクエスト（POST /members/:member_id/returns）
#[derive(Debug, Deserialize)]
pub struct ReturnRequest {
    pub book_id: BookId,
    /// 省略時は当日
    pub returned_on: Option<NaiveDate>,
}

/// 貸出一覧取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    /// ステータス判定の基準日（省略時は当日）
    pub as_of: Option<NaiveDate>,
    /// ステータスでフィルタリング
    pub status: Option<String>,
}

/// 延滞レポートのクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct OverdueQuery {
    pub as_of: Option<NaiveDate>,
}

/// 貸出成功レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct BorrowedResponse {
    pub loan_id: Uuid,
    pub book_id: i64,
    pub member_id: i64,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
    pub remaining_quantity: u32,
}

impl From<BookBorrowed> for BorrowedResponse {
    fn from(event: BookBorrowed) -> Self {
        Self {
            loan_id: event.loan_id.value(),
            book_id: event.book_id.value(),
            member_id: event.member_id.value(),
            borrowed_on: event.borrowed_on,
            due_on: event.due_on,
            remaining_quantity: event.remaining_quantity,
        }
    }
}

/// 返却成功レスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ReturnedResponse {
    pub loan_id: Uuid,
    pub book_id: i64,
    pub member_id: i64,
    pub returned_on: NaiveDate,
    pub was_overdue: bool,
    pub remaining_quantity: u32,
}

impl From<BookReturned> for ReturnedResponse {
    fn from(event: BookReturned) -> Self {
        Self {
            loan_id: event.loan_id.value(),
            book_id: event.book_id.value(),
            member_id: event.member_id.value(),
            returned_on: event.returned_on,
            was_overdue: event.was_overdue,
            remaining_quantity: event.remaining_quantity,
        }
    }
}

/// 貸出レスポンス（GET /members/:member_id/loans）
#[derive(Debug, Serialize, Deserialize)]
pub struct LoanResponse {
    pub loan_id: Uuid,
    pub book_id: i64,
    pub member_id: i64,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
    pub returned_on: Option<NaiveDate>,
    pub status: String,
}

impl From<LoanView> for LoanResponse {
    fn from(view: LoanView) -> Self {
        Self {
            loan_id: view.loan_id.value(),
            book_id: view.book_id.value(),
            member_id: view.member_id.value(),
            borrowed_on: view.borrowed_on,
            due_on: view.due_on,
            returned_on: view.returned_on,
            status: view.status.as_str().to_string(),
        }
    }
}

/// 書籍レスポンス（在庫状態）
#[derive(Debug, Serialize, Deserialize)]
pub struct BookResponse {
    pub book_id: i64,
    pub title: String,
    pub author: String,
    pub isbn: String,
    pub quantity: u32,
    pub available: bool,
    pub borrow_count: u32,
}

impl From<Book> for BookResponse {
    fn from(book: Book) -> Self {
        Self {
            book_id: book.book_id.value(),
            title: book.title,
            author: book.author,
            isbn: book.isbn,
            quantity: book.quantity,
            available: book.available,
            borrow_count: book.borrow_count,
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            error: error.into(),
            message: message.into(),
        }
    }
}

/// ステータスクエリパラメータのパースとバリデーション
pub fn parse_status_filter(status: &str) -> Result<LoanStatus, String> {
    status.parse::<LoanStatus>()
}
