use crate::domain::{Book, Member};
use serde::Deserialize;
use std::path::Path;

/// インメモリストアの初期データ
///
/// 書籍・会員の登録は本来カタログ管理・会員管理コンテキストの責務。
/// ローカル実行用にJSONファイルから読み込む。
#[derive(Debug, Clone, Default, Deserialize)]
pub struct CatalogSeed {
    #[serde(default)]
    pub books: Vec<Book>,
    #[serde(default)]
    pub members: Vec<Member>,
}

impl CatalogSeed {
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    pub fn load(path: &Path) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let json = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&json)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_seed_from_json() {
        let seed = CatalogSeed::from_json(
            r#"{
                "books": [
                    {"book_id": 1, "title": "Dune", "author": "Frank Herbert",
                     "isbn": "978-0441013593", "quantity": 2, "available": true, "borrow_count": 0}
                ],
                "members": [{"member_id": 3, "active": true}]
            }"#,
        )
        .unwrap();

        assert_eq!(seed.books.len(), 1);
        assert_eq!(seed.books[0].quantity, 2);
        assert_eq!(seed.members[0].member_id.value(), 3);
        assert!(seed.members[0].loans.is_empty());
    }

    #[test]
    fn test_seed_rejects_non_positive_ids() {
        let result = CatalogSeed::from_json(r#"{"members": [{"member_id": 0, "active": true}]}"#);
        assert!(result.is_err());
    }

    #[test]
    fn test_empty_seed() {
        let seed = CatalogSeed::from_json("{}").unwrap();
        assert!(seed.books.is_empty());
        assert!(seed.members.is_empty());
    }
}
