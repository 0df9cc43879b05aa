use std::collections::HashMap;
use std::hash::Hash;
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{Mutex as AsyncMutex, OwnedMutexGuard};

use crate::domain::{BookId, MemberId};

/// キーごとの非同期ロック
///
/// 同じキーの操作を直列化し、異なるキーの操作は並行に進める。
/// 保持も待機もされていないキーの枠は次のロック取得時に取り除かれるため、
/// 枠の数は同時に使われているキーの数に収まる。
pub struct KeyedLocks<K> {
    slots: Mutex<HashMap<K, Arc<AsyncMutex<()>>>>,
}

impl<K: Eq + Hash + Copy> KeyedLocks<K> {
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
        }
    }

    /// キーのロックを取得する（保持中は同じキーの他の操作が待機する）
    pub async fn lock(&self, key: K) -> OwnedMutexGuard<()> {
        let slot = {
            let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
            // マップだけが参照している枠は誰も保持・待機していない
            slots.retain(|_, slot| Arc::strong_count(slot) > 1);
            slots.entry(key).or_default().clone()
        };
        slot.lock_owned().await
    }
}

impl<K: Eq + Hash + Copy> Default for KeyedLocks<K> {
    fn default() -> Self {
        Self::new()
    }
}

/// 貸出・返却で使うロック群
///
/// 取得順は常に「会員 → 書籍」。順序が固定されているためデッドロックしない。
#[derive(Default)]
pub struct CirculationLocks {
    members: KeyedLocks<MemberId>,
    books: KeyedLocks<BookId>,
}

/// 会員と書籍のロックを保持するガード
pub struct CirculationGuard {
    _member: OwnedMutexGuard<()>,
    _book: OwnedMutexGuard<()>,
}

impl CirculationLocks {
    pub fn new() -> Self {
        Self::default()
    }

    pub async fn acquire(&self, member_id: MemberId, book_id: BookId) -> CirculationGuard {
        let member = self.members.lock(member_id).await;
        let book = self.books.lock(book_id).await;
        CirculationGuard {
            _member: member,
            _book: book,
        }
    }
}

#[cfg(test)]
impl<K> KeyedLocks<K> {
    fn slot_count(&self) -> usize {
        self.slots.lock().unwrap_or_else(PoisonError::into_inner).len()
    }
}
