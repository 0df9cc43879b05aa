use crate::domain::{Book, BookId, Loan, Member, MemberId};
use async_trait::async_trait;
use futures::stream::BoxStream;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 1回の貸出・返却による変更
///
/// 書籍・会員の全体ではなく差分だけを表す。ストアは在庫数の増減と
/// 貸出1件の追加・終了を同じ単位で適用し、読み込み後に他の操作が
/// 同じ会員・書籍を変更していても上書きしない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CirculationChange {
    /// 在庫を1冊確保し、会員に貸出を追加する
    Borrow { loan: Loan },
    /// 未返却の貸出を終了し、在庫を1冊戻す
    Return {
        /// 返却日を設定済みの貸出
        closed: Loan,
        /// trueなら履歴として残し、falseなら削除する
        keep_history: bool,
    },
}

impl CirculationChange {
    pub fn book_id(&self) -> BookId {
        match self {
            CirculationChange::Borrow { loan } => loan.book_id,
            CirculationChange::Return { closed, .. } => closed.book_id,
        }
    }
}

/// 変更の適用結果
///
/// `Applied`以外は何も保存されていない。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// 適用済み（変更後の書籍）
    Applied(Book),
    /// 貸し出せる冊数が残っていない
    NoCopyLeft,
    /// 書籍が存在しない
    BookMissing,
    /// 会員が存在しない、または無効
    MemberIneligible,
    /// 返却対象の貸出が既に返却・削除されている
    LoanNotOpen,
}

/// 貸出管理ストアポート
///
/// 書籍・会員・貸出の永続化を抽象化する。
/// 行マッピングやSQL、コネクション管理はアダプターの責務。
#[async_trait]
pub trait CirculationStore: Send + Sync {
    /// IDで書籍を取得する
    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>>;

    /// 書籍を保存する（カタログ管理・初期データ投入用）
    async fn save_book(&self, book: &Book) -> Result<()>;

    /// IDで会員を取得する
    ///
    /// 貸出は挿入順で返す。
    async fn get_member(&self, member_id: MemberId) -> Result<Option<Member>>;

    /// 会員を貸出集合ごと保存する（会員管理・初期データ投入用）
    ///
    /// 会員の貸出集合にない貸出はストアからも削除される。
    /// 貸出・返却では使わない。
    async fn save_member(&self, member: &Member) -> Result<()>;

    /// 貸出・返却の変更を原子的に適用する
    ///
    /// 在庫数は読み込み時の値ではなく、適用時点の値に対して増減する。
    /// 前提が崩れていれば`CommitOutcome`の該当ケースを返し、何も保存しない。
    async fn commit(&self, change: CirculationChange) -> Result<CommitOutcome>;

    /// 全会員の未返却の貸出をストリーム配信する
    ///
    /// 呼び出すたびに新しいストリームを返す。延滞検知に使用される。
    fn list_active_loans(&self) -> BoxStream<'_, Result<Loan>>;
}
