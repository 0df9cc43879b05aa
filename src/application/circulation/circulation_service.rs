use crate::domain::{
    self, Actor, Book, BookBorrowed, BookId, BookReturned, Loan, LoanId, LoanStatus, Member,
    MemberId, commands::*,
};
use crate::ports::*;
use chrono::NaiveDate;
use std::sync::Arc;

use super::errors::{CirculationError, Result};
use super::locks::CirculationLocks;
use super::policy::{CirculationConfig, LoanHistoryPolicy};

/// サービスの依存関係
///
/// 関数型DDDの原則に従い、データ構造として定義。
/// 振る舞いは持たず、各操作の関数に依存関係を渡す。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub store: Arc<dyn CirculationStore>,
    pub locks: Arc<CirculationLocks>,
    pub config: CirculationConfig,
}

impl ServiceDependencies {
    pub fn new(store: Arc<dyn CirculationStore>, config: CirculationConfig) -> Self {
        Self {
            store,
            locks: Arc::new(CirculationLocks::new()),
            config,
        }
    }
}

/// 貸出ビュー
///
/// 会員の貸出一覧表示用。ステータスは`as_of`時点で導出する。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanView {
    pub loan_id: LoanId,
    pub book_id: BookId,
    pub member_id: MemberId,
    pub borrowed_on: NaiveDate,
    pub due_on: NaiveDate,
    pub returned_on: Option<NaiveDate>,
    pub status: LoanStatus,
}

fn build_loan_view(loan: &Loan, as_of: NaiveDate) -> LoanView {
    LoanView {
        loan_id: loan.loan_id,
        book_id: loan.book_id,
        member_id: loan.member_id,
        borrowed_on: loan.borrowed_on,
        due_on: loan.due_on,
        returned_on: loan.returned_on,
        status: loan.status(as_of),
    }
}

async fn load_member(store: &Arc<dyn CirculationStore>, member_id: MemberId) -> Result<Member> {
    store
        .get_member(member_id)
        .await
        .map_err(CirculationError::StorageFailure)?
        .ok_or(CirculationError::MemberNotEligible(member_id))
}

async fn load_book(store: &Arc<dyn CirculationStore>, book_id: BookId) -> Result<Book> {
    store
        .get_book(book_id)
        .await
        .map_err(CirculationError::StorageFailure)?
        .ok_or(CirculationError::BookNotFound(book_id))
}

fn ensure_may_circulate(actor: &Actor, member_id: MemberId) -> Result<()> {
    if !actor.may_circulate_for(member_id) {
        tracing::warn!(?actor, %member_id, "circulation request rejected: forbidden");
        return Err(CirculationError::Forbidden);
    }
    Ok(())
}

/// 書籍を貸し出す
///
/// ビジネスルール：
/// - 会員が存在し、有効であること
/// - 書籍が存在すること
/// - 書籍が貸出可能（available かつ quantity > 0）であること
/// - 返却期限は貸出日 + 14日
///
/// # 一貫性保証
///
/// 在庫の確保と貸出の追加は`CirculationStore::commit`で一括して永続化される。
/// どの段階で失敗しても、部分的な変更は観測されない。
/// 同一プロセス内では同じ会員・同じ書籍への操作はロックで直列化される。
/// 複数プロセスの間では、ストアが適用時点の在庫で確保できなければ`BookUnavailable`になる。
///
/// # 戻り値
/// 成功時は貸出イベント（貸出IDと返却期限を含む）
pub async fn borrow_book(deps: &ServiceDependencies, cmd: BorrowBook) -> Result<BookBorrowed> {
    ensure_may_circulate(&cmd.actor, cmd.member_id)?;

    let _guard = deps.locks.acquire(cmd.member_id, cmd.book_id).await;

    // 1. 会員の確認（存在し、かつ有効）
    let member = load_member(&deps.store, cmd.member_id).await?;
    if !member.active {
        tracing::warn!(member_id = %cmd.member_id, "borrow rejected: member is inactive");
        return Err(CirculationError::MemberNotEligible(cmd.member_id));
    }

    // 2. 書籍の確認
    let book = load_book(&deps.store, cmd.book_id).await?;

    // 3. 貸出可能性の確認
    if !book.is_lendable() {
        tracing::warn!(book_id = %book.book_id, quantity = book.quantity, "borrow rejected: book unavailable");
        return Err(CirculationError::BookUnavailable(book.book_id));
    }
    domain::book::reserve_copy(&book)
        .map_err(|e| CirculationError::from_inventory(book.book_id, e))?;

    // 4. 貸出の作成
    let loan = Loan::open(member.member_id, book.book_id, cmd.borrowed_on);

    // 5. 在庫の確保と貸出の追加をまとめて適用
    let outcome = deps
        .store
        .commit(CirculationChange::Borrow { loan: loan.clone() })
        .await
        .map_err(CirculationError::StorageFailure)?;

    let reserved = match outcome {
        CommitOutcome::Applied(book) => book,
        CommitOutcome::NoCopyLeft => {
            tracing::warn!(book_id = %loan.book_id, "borrow rejected: last copy taken concurrently");
            return Err(CirculationError::BookUnavailable(loan.book_id));
        }
        CommitOutcome::BookMissing => return Err(CirculationError::BookNotFound(loan.book_id)),
        CommitOutcome::MemberIneligible | CommitOutcome::LoanNotOpen => {
            return Err(CirculationError::MemberNotEligible(loan.member_id));
        }
    };

    tracing::info!(
        loan_id = %loan.loan_id.value(),
        member_id = %loan.member_id,
        book_id = %loan.book_id,
        due_on = %loan.due_on,
        remaining_quantity = reserved.quantity,
        "book borrowed"
    );

    Ok(BookBorrowed {
        loan_id: loan.loan_id,
        book_id: loan.book_id,
        member_id: loan.member_id,
        borrowed_on: loan.borrowed_on,
        due_on: loan.due_on,
        remaining_quantity: reserved.quantity,
    })
}

/// 書籍を返却する
///
/// ビジネスルール：
/// - 会員がその書籍の未返却の貸出を持っていること（最も古いものを返却）
/// - 延滞していても返却は受け付ける
/// - 無効な会員でも返却はできる
/// - 返却で冊数を1冊戻す
/// - 貸出履歴は設定（`LoanHistoryPolicy`）に従って保持または削除する
///
/// # 一貫性保証
///
/// `borrow_book()`と同様、在庫の返却と貸出の終了はまとめて永続化される。
/// 別プロセスが同じ貸出を先に返却していた場合は`AlreadyReturned`になる。
pub async fn return_book(deps: &ServiceDependencies, cmd: ReturnBook) -> Result<BookReturned> {
    ensure_may_circulate(&cmd.actor, cmd.member_id)?;

    let _guard = deps.locks.acquire(cmd.member_id, cmd.book_id).await;

    // 1. 未返却の貸出を特定
    let member = load_member(&deps.store, cmd.member_id).await?;
    let loan = domain::member::find_active_loan(&member, cmd.book_id).ok_or_else(|| {
        tracing::warn!(member_id = %cmd.member_id, book_id = %cmd.book_id, "return rejected: no active loan");
        CirculationError::NoActiveLoan {
            member_id: cmd.member_id,
            book_id: cmd.book_id,
        }
    })?;

    // 2. 貸出を終了
    let closed = domain::loan::close_loan(loan, cmd.returned_on)?;

    // 3. 書籍の確認
    load_book(&deps.store, cmd.book_id).await?;

    // 4. 在庫の返却と貸出の終了をまとめて適用（履歴の扱いは設定に従う）
    let outcome = deps
        .store
        .commit(CirculationChange::Return {
            closed: closed.clone(),
            keep_history: deps.config.history == LoanHistoryPolicy::Retain,
        })
        .await
        .map_err(CirculationError::StorageFailure)?;

    let released = match outcome {
        CommitOutcome::Applied(book) => book,
        CommitOutcome::LoanNotOpen => {
            tracing::warn!(loan_id = %closed.loan_id.value(), "return rejected: loan closed concurrently");
            return Err(CirculationError::AlreadyReturned);
        }
        CommitOutcome::BookMissing => return Err(CirculationError::BookNotFound(closed.book_id)),
        CommitOutcome::MemberIneligible | CommitOutcome::NoCopyLeft => {
            return Err(CirculationError::MemberNotEligible(closed.member_id));
        }
    };

    let was_overdue = cmd.returned_on > closed.due_on;

    tracing::info!(
        loan_id = %closed.loan_id.value(),
        member_id = %closed.member_id,
        book_id = %closed.book_id,
        returned_on = %cmd.returned_on,
        was_overdue,
        history = deps.config.history.as_str(),
        "book returned"
    );

    Ok(BookReturned {
        loan_id: closed.loan_id,
        book_id: closed.book_id,
        member_id: closed.member_id,
        returned_on: cmd.returned_on,
        was_overdue,
        remaining_quantity: released.quantity,
    })
}

/// 会員の貸出一覧を取得する
///
/// 返却済みの貸出は`LoanHistoryPolicy::Retain`の場合のみ含まれる。
pub async fn member_loans(
    deps: &ServiceDependencies,
    actor: &Actor,
    member_id: MemberId,
    as_of: NaiveDate,
) -> Result<Vec<LoanView>> {
    if !actor.may_view_loans_of(member_id) {
        return Err(CirculationError::Forbidden);
    }

    let member = load_member(&deps.store, member_id).await?;

    Ok(member
        .loans
        .iter()
        .map(|loan| build_loan_view(loan, as_of))
        .collect())
}

/// 書籍の現在の在庫状態を取得する
pub async fn book_inventory(deps: &ServiceDependencies, book_id: BookId) -> Result<Book> {
    load_book(&deps.store, book_id).await
}
