use crate::domain::{BookId, CloseLoanError, InventoryError, MemberId};
use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum CirculationError {
    /// 書籍が存在しない
    #[error("Book {0} not found")]
    BookNotFound(BookId),

    /// 会員が存在しない、または無効
    #[error("Member {0} is not eligible to borrow")]
    MemberNotEligible(MemberId),

    /// 貸出可能な冊数がない
    #[error("Book {0} is not available for loan")]
    BookUnavailable(BookId),

    /// 在庫の確保に失敗（BookUnavailableの在庫層での防御）
    #[error("Book {0} is out of stock")]
    OutOfStock(BookId),

    /// 返却対象の貸出がない
    #[error("Member {member_id} has no active loan for book {book_id}")]
    NoActiveLoan { member_id: MemberId, book_id: BookId },

    /// 既に返却済み
    #[error("Loan is already returned")]
    AlreadyReturned,

    /// 返却日が貸出日より前
    #[error("Return date precedes the borrow date")]
    InvalidReturnDate,

    /// 操作主体に権限がない
    #[error("Actor is not permitted to perform this operation")]
    Forbidden,

    /// ストアのエラー
    #[error("Storage failure")]
    StorageFailure(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl CirculationError {
    pub(super) fn from_inventory(book_id: BookId, err: InventoryError) -> Self {
        match err {
            InventoryError::OutOfStock => CirculationError::OutOfStock(book_id),
        }
    }
}

impl From<CloseLoanError> for CirculationError {
    fn from(err: CloseLoanError) -> Self {
        match err {
            CloseLoanError::AlreadyReturned => CirculationError::AlreadyReturned,
            CloseLoanError::ReturnPrecedesBorrow => CirculationError::InvalidReturnDate,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, CirculationError>;
