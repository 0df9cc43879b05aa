use chrono::{Duration, NaiveDate};
use serde::{Deserialize, Serialize};

use super::{BookId, CloseLoanError, LoanId, MemberId};

/// 貸出期間（日数）
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// 貸出 - 1冊の書籍の1回の貸出
///
/// 会員・書籍・貸出日・返却期限は作成後に変更されない。
/// `returned_on`だけが一度だけ`None`から値に遷移する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Loan {
    pub loan_id: LoanId,

    // 他の集約への参照（IDのみ）
    pub member_id: MemberId,
    pub book_id: BookId,

    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
    /// Noneは貸出中
    pub returned_on: Option<NaiveDate>,
}

/// 貸出ステータス
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanStatus {
    /// 貸出中
    Active,
    /// 延滞中
    Overdue,
    /// 返却済み
    Returned,
}

impl LoanStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanStatus::Active => "active",
            LoanStatus::Overdue => "overdue",
            LoanStatus::Returned => "returned",
        }
    }
}

impl std::str::FromStr for LoanStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(LoanStatus::Active),
            "overdue" => Ok(LoanStatus::Overdue),
            "returned" => Ok(LoanStatus::Returned),
            _ => Err(format!("Invalid loan status: {}", s)),
        }
    }
}

impl Loan {
    /// 新しい貸出を作成する（返却期限 = 貸出日 + 14日）
    pub fn open(member_id: MemberId, book_id: BookId, borrowed_on: NaiveDate) -> Self {
        Self {
            loan_id: LoanId::new(),
            member_id,
            book_id,
            borrowed_on,
            due_on: borrowed_on + Duration::days(LOAN_PERIOD_DAYS),
            returned_on: None,
        }
    }

    pub fn is_open(&self) -> bool {
        self.returned_on.is_none()
    }

    /// 延滞判定：未返却かつ`as_of`が返却期限を過ぎている
    pub fn is_overdue(&self, as_of: NaiveDate) -> bool {
        self.is_open() && as_of > self.due_on
    }

    /// `as_of`時点のステータス
    pub fn status(&self, as_of: NaiveDate) -> LoanStatus {
        if !self.is_open() {
            LoanStatus::Returned
        } else if self.is_overdue(as_of) {
            LoanStatus::Overdue
        } else {
            LoanStatus::Active
        }
    }
}

/// 純粋関数：貸出を終了する
///
/// ビジネスルール：
/// - 既に返却済みの貸出は終了できない
/// - 返却日は貸出日以降
/// - 延滞していても返却は受け付ける
///
/// 副作用なし。返却日を設定した新しいLoanを返す。
pub fn close_loan(loan: &Loan, returned_on: NaiveDate) -> Result<Loan, CloseLoanError> {
    if !loan.is_open() {
        return Err(CloseLoanError::AlreadyReturned);
    }

    if returned_on < loan.borrowed_on {
        return Err(CloseLoanError::ReturnPrecedesBorrow);
    }

    Ok(Loan {
        returned_on: Some(returned_on),
        ..loan.clone()
    })
}
