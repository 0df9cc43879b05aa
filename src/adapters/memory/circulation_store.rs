use crate::domain::{self, Book, BookId, Loan, Member, MemberId};
use crate::ports::circulation_store::{
    CirculationChange, CirculationStore as CirculationStoreTrait, CommitOutcome, Result,
};
use async_trait::async_trait;
use futures::stream::{self, BoxStream, StreamExt};
use std::collections::BTreeMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::seed::CatalogSeed;

const POISONED: &str = "in-memory store lock poisoned";

/// CirculationStoreのインメモリ実装
///
/// 単一プロセス内での利用とテストを想定。
/// `commit`は書籍と会員の両方の書き込みロックを保持したまま適用するため原子的。
pub struct CirculationStore {
    books: RwLock<BTreeMap<BookId, Book>>,
    members: RwLock<BTreeMap<MemberId, Member>>,
}

impl CirculationStore {
    pub fn new() -> Self {
        Self {
            books: RwLock::new(BTreeMap::new()),
            members: RwLock::new(BTreeMap::new()),
        }
    }

    /// 初期データを投入したストアを作成
    pub fn with_seed(seed: CatalogSeed) -> Self {
        Self {
            books: RwLock::new(
                seed.books
                    .into_iter()
                    .map(|book| (book.book_id, book))
                    .collect(),
            ),
            members: RwLock::new(
                seed.members
                    .into_iter()
                    .map(|member| (member.member_id, member))
                    .collect(),
            ),
        }
    }

    fn read_books(&self) -> Result<RwLockReadGuard<'_, BTreeMap<BookId, Book>>> {
        Ok(self.books.read().map_err(|_| POISONED)?)
    }

    fn write_books(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<BookId, Book>>> {
        Ok(self.books.write().map_err(|_| POISONED)?)
    }

    fn read_members(&self) -> Result<RwLockReadGuard<'_, BTreeMap<MemberId, Member>>> {
        Ok(self.members.read().map_err(|_| POISONED)?)
    }

    fn write_members(&self) -> Result<RwLockWriteGuard<'_, BTreeMap<MemberId, Member>>> {
        Ok(self.members.write().map_err(|_| POISONED)?)
    }

    /// 未返却の貸出のスナップショット（会員ID順、会員内は挿入順）
    fn active_loans_snapshot(&self) -> Result<Vec<Loan>> {
        let members = self.read_members()?;
        Ok(members
            .values()
            .flat_map(|member| member.open_loans().cloned())
            .collect())
    }
}

impl Default for CirculationStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl CirculationStoreTrait for CirculationStore {
    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>> {
        Ok(self.read_books()?.get(&book_id).cloned())
    }

    async fn save_book(&self, book: &Book) -> Result<()> {
        self.write_books()?.insert(book.book_id, book.clone());
        Ok(())
    }

    async fn get_member(&self, member_id: MemberId) -> Result<Option<Member>> {
        Ok(self.read_members()?.get(&member_id).cloned())
    }

    async fn save_member(&self, member: &Member) -> Result<()> {
        self.write_members()?
            .insert(member.member_id, member.clone());
        Ok(())
    }

    /// 書籍 → 会員の順で書き込みロックを取り、適用時点の状態で前提を確認してから両方を更新する
    async fn commit(&self, change: CirculationChange) -> Result<CommitOutcome> {
        let mut books = self.write_books()?;
        let mut members = self.write_members()?;

        let book_id = change.book_id();
        let Some(book) = books.get(&book_id) else {
            return Ok(CommitOutcome::BookMissing);
        };

        let (book, member) = match &change {
            CirculationChange::Borrow { loan } => {
                let member = match members.get(&loan.member_id) {
                    Some(member) if member.active => member,
                    _ => return Ok(CommitOutcome::MemberIneligible),
                };
                let Ok(reserved) = domain::book::reserve_copy(book) else {
                    return Ok(CommitOutcome::NoCopyLeft);
                };
                (reserved, domain::member::record_loan(member, loan))
            }
            CirculationChange::Return {
                closed,
                keep_history,
            } => {
                let Some(member) = members.get(&closed.member_id) else {
                    return Ok(CommitOutcome::MemberIneligible);
                };
                let still_open = member
                    .open_loans()
                    .any(|loan| loan.loan_id == closed.loan_id);
                if !still_open {
                    return Ok(CommitOutcome::LoanNotOpen);
                }
                let member = if *keep_history {
                    domain::member::record_closed_loan(member, closed)
                } else {
                    domain::member::remove_loan(member, closed.loan_id)
                };
                (domain::book::release_copy(book), member)
            }
        };

        tracing::debug!(
            book_id = %book.book_id,
            member_id = %member.member_id,
            quantity = book.quantity,
            "in-memory commit"
        );

        books.insert(book.book_id, book.clone());
        members.insert(member.member_id, member);
        Ok(CommitOutcome::Applied(book))
    }

    fn list_active_loans(&self) -> BoxStream<'_, Result<Loan>> {
        match self.active_loans_snapshot() {
            Ok(loans) => stream::iter(loans.into_iter().map(Ok)).boxed(),
            Err(e) => stream::once(async move { Err(e) }).boxed(),
        }
    }
}
