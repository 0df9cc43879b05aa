use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use super::{BookId, Loan, LoanId, MemberId};

/// 会員 - 自分の貸出の集合を排他的に所有する
///
/// 貸出の追加・終了・削除は貸出管理の操作経由でのみ行う。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Member {
    pub member_id: MemberId,
    pub active: bool,
    /// 挿入順
    #[serde(default)]
    pub loans: Vec<Loan>,
}

impl Member {
    pub fn new(member_id: MemberId) -> Self {
        Self {
            member_id,
            active: true,
            loans: Vec::new(),
        }
    }

    /// 未返却の貸出
    pub fn open_loans(&self) -> impl Iterator<Item = &Loan> {
        self.loans.iter().filter(|l| l.returned_on.is_none())
    }
}

/// 純粋関数：新しい貸出を作成し、会員の貸出集合の末尾に追加する
pub fn open_loan(member: &Member, book_id: BookId, borrowed_on: NaiveDate) -> (Member, Loan) {
    let loan = Loan::open(member.member_id, book_id, borrowed_on);
    (record_loan(member, &loan), loan)
}

/// 純粋関数：作成済みの貸出を会員の貸出集合の末尾に追加する
///
/// 同じ貸出IDが既にあれば会員をそのまま返す。
pub fn record_loan(member: &Member, loan: &Loan) -> Member {
    if member.loans.iter().any(|existing| existing.loan_id == loan.loan_id) {
        return member.clone();
    }

    let mut loans = member.loans.clone();
    loans.push(loan.clone());

    Member {
        loans,
        ..member.clone()
    }
}

/// 純粋関数：書籍に対する会員の未返却の貸出を探す
///
/// 返却済みの貸出は対象外。複数ある場合は最も古い（挿入順で最初の）貸出を返す。
pub fn find_active_loan(member: &Member, book_id: BookId) -> Option<&Loan> {
    member.open_loans().find(|loan| loan.book_id == book_id)
}

/// 純粋関数：終了した貸出で会員の貸出を置き換える（履歴を保持）
///
/// 一致する貸出IDがない場合は会員をそのまま返す。
pub fn record_closed_loan(member: &Member, closed: &Loan) -> Member {
    let loans = member
        .loans
        .iter()
        .map(|loan| {
            if loan.loan_id == closed.loan_id {
                closed.clone()
            } else {
                loan.clone()
            }
        })
        .collect();

    Member {
        loans,
        ..member.clone()
    }
}

/// 純粋関数：会員の貸出集合から貸出を取り除く（履歴を破棄）
pub fn remove_loan(member: &Member, loan_id: LoanId) -> Member {
    let loans = member
        .loans
        .iter()
        .filter(|loan| loan.loan_id != loan_id)
        .cloned()
        .collect();

    Member {
        loans,
        ..member.clone()
    }
}
