use serde::{Deserialize, Serialize};

/// 返却時の貸出履歴の扱い
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LoanHistoryPolicy {
    /// 返却日を記録して会員の貸出集合に残す
    #[default]
    Retain,
    /// 会員の貸出集合から削除する
    Discard,
}

impl LoanHistoryPolicy {
    pub fn as_str(&self) -> &'static str {
        match self {
            LoanHistoryPolicy::Retain => "retain",
            LoanHistoryPolicy::Discard => "discard",
        }
    }
}

impl std::str::FromStr for LoanHistoryPolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "retain" => Ok(LoanHistoryPolicy::Retain),
            "discard" => Ok(LoanHistoryPolicy::Discard),
            _ => Err(format!("Invalid loan history policy: {}", s)),
        }
    }
}

/// 貸出管理の設定
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CirculationConfig {
    pub history: LoanHistoryPolicy,
}
