use serde::{Deserialize, Serialize};

use super::{MemberId, StaffId};

/// 操作の主体
///
/// 認証時に一度だけ決定され、各操作に明示的に渡される。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "role", content = "id", rename_all = "lowercase")]
pub enum Actor {
    Member(MemberId),
    Librarian(StaffId),
    Admin(StaffId),
}

impl Actor {
    /// 指定された会員の貸出・返却を行えるか
    ///
    /// - 会員は本人分のみ
    /// - 司書は全会員分
    /// - 管理者は貸出業務を行わない
    pub fn may_circulate_for(&self, member_id: MemberId) -> bool {
        match self {
            Actor::Member(own) => *own == member_id,
            Actor::Librarian(_) => true,
            Actor::Admin(_) => false,
        }
    }

    /// 指定された会員の貸出一覧を閲覧できるか
    pub fn may_view_loans_of(&self, member_id: MemberId) -> bool {
        match self {
            Actor::Member(own) => *own == member_id,
            Actor::Librarian(_) | Actor::Admin(_) => true,
        }
    }

    /// 延滞レポートを閲覧できるか（職員のみ）
    pub fn may_view_overdue_report(&self) -> bool {
        matches!(self, Actor::Librarian(_) | Actor::Admin(_))
    }
}
