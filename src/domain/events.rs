use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BookId, LoanId, MemberId};

/// イベント：書籍が貸出された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookBorrowed {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
    /// 貸出後の残り冊数
    pub remaining_quantity: u32,
}

/// イベント：書籍が返却された
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BookReturned {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub returned_on: NaiveDate,
    pub was_overdue: bool,
    /// 返却後の残り冊数
    pub remaining_quantity: u32,
}
