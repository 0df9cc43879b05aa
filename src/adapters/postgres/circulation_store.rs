use crate::domain::{Book, BookId, Loan, LoanId, Member, MemberId};
use crate::ports::circulation_store::{
    CirculationChange, CirculationStore as CirculationStoreTrait, CommitOutcome, Result,
};
use async_trait::async_trait;
use futures::stream::{BoxStream, StreamExt};
use sqlx::{PgConnection, PgPool, Row, postgres::PgRow};
use uuid::Uuid;

fn invalid_data(message: String) -> Box<dyn std::error::Error + Send + Sync> {
    Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, message))
}

fn to_count(column: &str, value: i32) -> Result<u32> {
    u32::try_from(value).map_err(|_| invalid_data(format!("{} out of range: {}", column, value)))
}

fn to_column(column: &str, value: u32) -> Result<i32> {
    i32::try_from(value).map_err(|_| invalid_data(format!("{} out of range: {}", column, value)))
}

/// PostgreSQLの行データをBookに変換する
fn map_row_to_book(row: &PgRow) -> Result<Book> {
    Ok(Book {
        book_id: BookId::try_from(row.get::<i64, _>("book_id"))?,
        title: row.get("title"),
        author: row.get("author"),
        isbn: row.get("isbn"),
        quantity: to_count("quantity", row.get("quantity"))?,
        available: row.get("available"),
        borrow_count: to_count("borrow_count", row.get("borrow_count"))?,
    })
}

/// PostgreSQLの行データをLoanに変換する
fn map_row_to_loan(row: &PgRow) -> Result<Loan> {
    Ok(Loan {
        loan_id: LoanId::from_uuid(row.get("loan_id")),
        member_id: MemberId::try_from(row.get::<i64, _>("member_id"))?,
        book_id: BookId::try_from(row.get::<i64, _>("book_id"))?,
        borrowed_on: row.get("borrowed_on"),
        due_on: row.get("due_on"),
        returned_on: row.get("returned_on"),
    })
}

/// 会員と貸出集合を丸ごと書き込む（呼び出し側のトランザクション内で実行）
///
/// 会員の貸出集合にない貸出は削除し、既存の貸出は返却日のみ更新する。
/// 新しい貸出はベクタの順にINSERTされ、loan_seqが挿入順を保持する。
async fn write_member(conn: &mut PgConnection, member: &Member) -> Result<()> {
    sqlx::query(
        r#"
        INSERT INTO members (member_id, active)
        VALUES ($1, $2)
        ON CONFLICT (member_id)
        DO UPDATE SET active = EXCLUDED.active
        "#,
    )
    .bind(member.member_id.value())
    .bind(member.active)
    .execute(&mut *conn)
    .await?;

    let kept: Vec<Uuid> = member.loans.iter().map(|loan| loan.loan_id.value()).collect();
    sqlx::query(
        r#"
        DELETE FROM loans
        WHERE member_id = $1 AND loan_id <> ALL($2)
        "#,
    )
    .bind(member.member_id.value())
    .bind(&kept)
    .execute(&mut *conn)
    .await?;

    for loan in &member.loans {
        sqlx::query(
            r#"
            INSERT INTO loans (loan_id, member_id, book_id, borrowed_on, due_on, returned_on)
            VALUES ($1, $2, $3, $4, $5, $6)
            ON CONFLICT (loan_id)
            DO UPDATE SET returned_on = EXCLUDED.returned_on
            "#,
        )
        .bind(loan.loan_id.value())
        .bind(loan.member_id.value())
        .bind(loan.book_id.value())
        .bind(loan.borrowed_on)
        .bind(loan.due_on)
        .bind(loan.returned_on)
        .execute(&mut *conn)
        .await?;
    }

    Ok(())
}

/// 貸出で書籍を1冊確保する（在庫が残っている場合のみ）
async fn reserve_copy(conn: &mut PgConnection, book_id: BookId) -> Result<Option<Book>> {
    let row = sqlx::query(
        r#"
        UPDATE books
        SET quantity = quantity - 1,
            available = quantity - 1 > 0,
            borrow_count = borrow_count + 1
        WHERE book_id = $1 AND available AND quantity > 0
        RETURNING book_id, title, author, isbn, quantity, available, borrow_count
        "#,
    )
    .bind(book_id.value())
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(map_row_to_book).transpose()
}

/// 返却で書籍を1冊戻す
async fn release_copy(conn: &mut PgConnection, book_id: BookId) -> Result<Option<Book>> {
    let row = sqlx::query(
        r#"
        UPDATE books
        SET quantity = quantity + 1, available = TRUE
        WHERE book_id = $1
        RETURNING book_id, title, author, isbn, quantity, available, borrow_count
        "#,
    )
    .bind(book_id.value())
    .fetch_optional(&mut *conn)
    .await?;

    row.as_ref().map(map_row_to_book).transpose()
}

async fn book_exists(conn: &mut PgConnection, book_id: BookId) -> Result<bool> {
    let row = sqlx::query("SELECT 1 FROM books WHERE book_id = $1")
        .bind(book_id.value())
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.is_some())
}

/// 有効な会員に貸出を1件追加する（会員が無効なら何もしない）
async fn insert_loan(conn: &mut PgConnection, loan: &Loan) -> Result<bool> {
    let inserted = sqlx::query(
        r#"
        INSERT INTO loans (loan_id, member_id, book_id, borrowed_on, due_on, returned_on)
        SELECT $1, $2, $3, $4, $5, NULL
        WHERE EXISTS (SELECT 1 FROM members WHERE member_id = $2 AND active)
        "#,
    )
    .bind(loan.loan_id.value())
    .bind(loan.member_id.value())
    .bind(loan.book_id.value())
    .bind(loan.borrowed_on)
    .bind(loan.due_on)
    .execute(&mut *conn)
    .await?;

    Ok(inserted.rows_affected() == 1)
}

/// 未返却の貸出を終了する（既に返却・削除されていれば何もしない）
async fn close_open_loan(conn: &mut PgConnection, closed: &Loan, keep_history: bool) -> Result<bool> {
    let query = if keep_history {
        sqlx::query(
            r#"
            UPDATE loans
            SET returned_on = $2
            WHERE loan_id = $1 AND returned_on IS NULL
            "#,
        )
        .bind(closed.loan_id.value())
        .bind(closed.returned_on)
    } else {
        sqlx::query(
            r#"
            DELETE FROM loans
            WHERE loan_id = $1 AND returned_on IS NULL
            "#,
        )
        .bind(closed.loan_id.value())
    };

    let result = query.execute(&mut *conn).await?;
    Ok(result.rows_affected() == 1)
}

/// CirculationStoreのPostgreSQL実装
///
/// `commit`は1トランザクション内で在庫数の条件付き増減と貸出1件の追加・終了を行う。
/// 在庫数はSQL上で現在値から増減するため、複数プロセスが同じデータベースを共有しても
/// 在庫数も他の貸出も失われない。
pub struct CirculationStore {
    pool: PgPool,
}

impl CirculationStore {
    /// PostgreSQLコネクションプールから新しいCirculationStoreを作成
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CirculationStoreTrait for CirculationStore {
    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>> {
        let row = sqlx::query(
            r#"
            SELECT book_id, title, author, isbn, quantity, available, borrow_count
            FROM books
            WHERE book_id = $1
            "#,
        )
        .bind(book_id.value())
        .fetch_optional(&self.pool)
        .await?;

        row.as_ref().map(map_row_to_book).transpose()
    }

    async fn save_book(&self, book: &Book) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO books (book_id, title, author, isbn, quantity, available, borrow_count)
            VALUES ($1, $2, $3, $4, $5, $6, $7)
            ON CONFLICT (book_id)
            DO UPDATE SET
                title = EXCLUDED.title,
                author = EXCLUDED.author,
                isbn = EXCLUDED.isbn,
                quantity = EXCLUDED.quantity,
                available = EXCLUDED.available,
                borrow_count = EXCLUDED.borrow_count
            "#,
        )
        .bind(book.book_id.value())
        .bind(&book.title)
        .bind(&book.author)
        .bind(&book.isbn)
        .bind(to_column("quantity", book.quantity)?)
        .bind(book.available)
        .bind(to_column("borrow_count", book.borrow_count)?)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn get_member(&self, member_id: MemberId) -> Result<Option<Member>> {
        let Some(row) = sqlx::query(
            r#"
            SELECT member_id, active
            FROM members
            WHERE member_id = $1
            "#,
        )
        .bind(member_id.value())
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let loan_rows = sqlx::query(
            r#"
            SELECT loan_id, member_id, book_id, borrowed_on, due_on, returned_on
            FROM loans
            WHERE member_id = $1
            ORDER BY loan_seq ASC
            "#,
        )
        .bind(member_id.value())
        .fetch_all(&self.pool)
        .await?;

        let loans = loan_rows
            .iter()
            .map(map_row_to_loan)
            .collect::<Result<Vec<_>>>()?;

        Ok(Some(Member {
            member_id,
            active: row.get("active"),
            loans,
        }))
    }

    async fn save_member(&self, member: &Member) -> Result<()> {
        let mut tx = self.pool.begin().await?;
        write_member(&mut tx, member).await?;
        tx.commit().await?;
        Ok(())
    }

    async fn commit(&self, change: CirculationChange) -> Result<CommitOutcome> {
        let mut tx = self.pool.begin().await?;
        let book_id = change.book_id();

        // 前提が崩れた場合、txはdropでロールバックされる
        let book = match &change {
            CirculationChange::Borrow { loan } => {
                let Some(book) = reserve_copy(&mut tx, book_id).await? else {
                    return Ok(if book_exists(&mut tx, book_id).await? {
                        CommitOutcome::NoCopyLeft
                    } else {
                        CommitOutcome::BookMissing
                    });
                };
                if !insert_loan(&mut tx, loan).await? {
                    return Ok(CommitOutcome::MemberIneligible);
                }
                book
            }
            CirculationChange::Return {
                closed,
                keep_history,
            } => {
                if !close_open_loan(&mut tx, closed, *keep_history).await? {
                    return Ok(CommitOutcome::LoanNotOpen);
                }
                let Some(book) = release_copy(&mut tx, book_id).await? else {
                    return Ok(CommitOutcome::BookMissing);
                };
                book
            }
        };

        tx.commit().await?;

        tracing::debug!(
            book_id = %book.book_id,
            quantity = book.quantity,
            "postgres commit"
        );

        Ok(CommitOutcome::Applied(book))
    }

    fn list_active_loans(&self) -> BoxStream<'_, Result<Loan>> {
        sqlx::query(
            r#"
            SELECT loan_id, member_id, book_id, borrowed_on, due_on, returned_on
            FROM loans
            WHERE returned_on IS NULL
            ORDER BY loan_seq ASC
            "#,
        )
        .fetch(&self.pool)
        .map(|row_result| {
            let row = row_result?;
            map_row_to_loan(&row)
        })
        .boxed()
    }
}
