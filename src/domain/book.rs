use serde::{Deserialize, Serialize};

use super::{BookId, InventoryError};

/// 書籍 - 1タイトル分の在庫状態
///
/// 不変条件：`available == (quantity > 0)`
///
/// 書籍の作成・削除はカタログ管理コンテキストの責務。
/// 貸出管理コンテキストは在庫数（quantity, available, borrow_count）のみを変更する。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Book {
    pub book_id: BookId,
    pub title: String,
    pub author: String,
    /// 形式・一意性は検証しない
    pub isbn: String,
    /// 貸出可能な冊数
    pub quantity: u32,
    pub available: bool,
    /// 累計貸出回数（単調増加）
    pub borrow_count: u32,
}

impl Book {
    /// 新しい書籍を作成する（貸出回数0）
    pub fn new(
        book_id: BookId,
        title: impl Into<String>,
        author: impl Into<String>,
        isbn: impl Into<String>,
        quantity: u32,
    ) -> Self {
        Self {
            book_id,
            title: title.into(),
            author: author.into(),
            isbn: isbn.into(),
            quantity,
            available: quantity > 0,
            borrow_count: 0,
        }
    }

    /// もう1冊貸し出せるか
    pub fn is_lendable(&self) -> bool {
        self.available && self.quantity > 0
    }
}

/// 純粋関数：1冊分の在庫を確保する
///
/// ビジネスルール：
/// - quantityが0なら確保できない
/// - quantityを1減らし、borrow_countを1増やす
/// - availableは減算後のquantityから導出する
///
/// 副作用なし。新しいBookを返す。永続化は呼び出し側の責務。
pub fn reserve_copy(book: &Book) -> Result<Book, InventoryError> {
    let quantity = book
        .quantity
        .checked_sub(1)
        .ok_or(InventoryError::OutOfStock)?;

    Ok(Book {
        quantity,
        available: quantity > 0,
        borrow_count: book.borrow_count.saturating_add(1),
        ..book.clone()
    })
}

/// 純粋関数：1冊分の在庫を戻す
///
/// 返却時にquantityを1増やし、availableをtrueにする。
/// borrow_countは変更しない。
pub fn release_copy(book: &Book) -> Book {
    Book {
        quantity: book.quantity.saturating_add(1),
        available: true,
        ..book.clone()
    }
}
