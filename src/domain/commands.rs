use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{Actor, BookId, MemberId};

/// コマンド：書籍を貸し出す
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BorrowBook {
    pub actor: Actor,
    pub member_id: MemberId,
    pub book_id: BookId,
    pub borrowed_on: NaiveDate,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnBook {
    pub actor: Actor,
    pub member_id: MemberId,
    pub book_id: BookId,
    pub returned_on: NaiveDate,
}
