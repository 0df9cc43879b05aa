use serde::{Deserialize, Serialize};
use uuid::Uuid;

use super::InvalidId;

/// 貸出ID - 1回の貸出を一意に識別する
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct LoanId(Uuid);

impl LoanId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }

    pub fn value(&self) -> Uuid {
        self.0
    }
}

impl Default for LoanId {
    fn default() -> Self {
        Self::new()
    }
}

/// 正の整数IDを持つ値オブジェクトを定義する
///
/// カタログ・会員・職員のIDはいずれも作成時に採番される正の整数。
/// 0以下の値は型として構築できない。
macro_rules! positive_id {
    ($(#[$meta:meta])* $name:ident, $kind:literal) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
        #[serde(try_from = "i64", into = "i64")]
        pub struct $name(i64);

        impl $name {
            pub fn value(&self) -> i64 {
                self.0
            }
        }

        impl TryFrom<i64> for $name {
            type Error = InvalidId;

            fn try_from(value: i64) -> Result<Self, Self::Error> {
                if value <= 0 {
                    return Err(InvalidId { kind: $kind, value });
                }
                Ok(Self(value))
            }
        }

        impl From<$name> for i64 {
            fn from(id: $name) -> Self {
                id.0
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

positive_id!(
    /// 書籍ID - カタログ管理コンテキストが採番する
    BookId,
    "book"
);

positive_id!(
    /// 会員ID - 会員管理コンテキストが採番する
    MemberId,
    "member"
);

positive_id!(
    /// 職員ID - 司書・管理者の識別子
    StaffId,
    "staff"
);
