/// IDのエラー（0以下の値）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidId {
    pub kind: &'static str,
    pub value: i64,
}

impl std::fmt::Display for InvalidId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} ID must be a positive integer, got {}",
            self.kind, self.value
        )
    }
}

impl std::error::Error for InvalidId {}

/// 在庫操作のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InventoryError {
    /// 貸出可能な冊数が0
    OutOfStock,
}

/// 貸出終了のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CloseLoanError {
    /// 既に返却済み
    AlreadyReturned,
    /// 返却日が貸出日より前
    ReturnPrecedesBorrow,
}
