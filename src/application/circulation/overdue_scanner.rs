use crate::domain::Book;
use chrono::NaiveDate;
use futures::stream::{BoxStream, StreamExt, TryStreamExt};

use super::circulation_service::ServiceDependencies;
use super::errors::{CirculationError, Result};

/// 延滞書籍を検出する（読み取り専用）
///
/// ビジネスルール：
/// - 未返却かつ返却期限（due_on）が`as_of`より前の貸出を延滞とする
/// - 返却済みの貸出は日付に関係なく対象外
/// - 同じ書籍に延滞中の貸出が複数ある場合、その件数だけ書籍を返す（重複排除しない）
/// - 書籍がカタログから削除されている貸出はスキップする
///
/// 処理フロー：
/// 1. ストアから未返却の貸出をストリームで取得
/// 2. 延滞している貸出だけを残す
/// 3. 各貸出の書籍を取得
///
/// ストリームは遅延評価され、呼び出すたびに最初から走査し直す。
/// 貸出・返却と並行に実行でき、多少古いスナップショットを観測することがある。
pub fn scan_overdue(deps: &ServiceDependencies, as_of: NaiveDate) -> BoxStream<'_, Result<Book>> {
    let store = deps.store.clone();

    deps.store
        .list_active_loans()
        .map_err(CirculationError::StorageFailure)
        .try_filter_map(move |loan| {
            let store = store.clone();
            async move {
                if !loan.is_overdue(as_of) {
                    return Ok(None);
                }

                let book = store
                    .get_book(loan.book_id)
                    .await
                    .map_err(CirculationError::StorageFailure)?;

                if book.is_none() {
                    tracing::debug!(
                        loan_id = %loan.loan_id.value(),
                        book_id = %loan.book_id,
                        "overdue loan references a missing book, skipped"
                    );
                }

                Ok(book)
            }
        })
        .boxed()
}

/// 延滞書籍をすべて収集する
pub async fn collect_overdue(deps: &ServiceDependencies, as_of: NaiveDate) -> Result<Vec<Book>> {
    let books: Vec<Book> = scan_overdue(deps, as_of).try_collect().await?;

    tracing::debug!(%as_of, count = books.len(), "overdue scan finished");

    Ok(books)
}
