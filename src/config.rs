use crate::application::circulation::{CirculationConfig, LoanHistoryPolicy};
use std::path::PathBuf;
use thiserror::Error;

const DEFAULT_PORT: u16 = 3000;
const DEFAULT_MAX_CONNECTIONS: u32 = 5;

/// 設定値のエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid value for {key}: {message}")]
    InvalidValue { key: &'static str, message: String },
}

/// プロセス全体の設定
///
/// 環境変数から読み込む：
/// - `DATABASE_URL`: 指定時はPostgreSQLストアを使用（未指定ならインメモリ）
/// - `DATABASE_MAX_CONNECTIONS`: コネクションプールの上限（既定 5）
/// - `CIRCULATION_SEED`: インメモリストアの初期データ（JSONファイル）
/// - `PORT`: 待ち受けポート（既定 3000）
/// - `LOAN_HISTORY_POLICY`: `retain` または `discard`（既定 retain）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppConfig {
    pub database_url: Option<String>,
    pub max_connections: u32,
    pub seed_path: Option<PathBuf>,
    pub port: u16,
    pub circulation: CirculationConfig,
}

impl AppConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 任意の取得関数から設定を組み立てる
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let non_empty = |key: &str| lookup(key).filter(|value| !value.trim().is_empty());

        let port = match non_empty("PORT") {
            Some(value) => value.parse().map_err(|e| ConfigError::InvalidValue {
                key: "PORT",
                message: format!("{}", e),
            })?,
            None => DEFAULT_PORT,
        };

        let max_connections = match non_empty("DATABASE_MAX_CONNECTIONS") {
            Some(value) => value.parse().map_err(|e| ConfigError::InvalidValue {
                key: "DATABASE_MAX_CONNECTIONS",
                message: format!("{}", e),
            })?,
            None => DEFAULT_MAX_CONNECTIONS,
        };

        let history = match non_empty("LOAN_HISTORY_POLICY") {
            Some(value) => value
                .parse::<LoanHistoryPolicy>()
                .map_err(|message| ConfigError::InvalidValue {
                    key: "LOAN_HISTORY_POLICY",
                    message,
                })?,
            None => LoanHistoryPolicy::default(),
        };

        Ok(Self {
            database_url: non_empty("DATABASE_URL"),
            max_connections,
            seed_path: non_empty("CIRCULATION_SEED").map(PathBuf::from),
            port,
            circulation: CirculationConfig { history },
        })
    }

    pub fn listen_addr(&self) -> String {
        format!("0.0.0.0:{}", self.port)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn config_from(vars: &[(&str, &str)]) -> Result<AppConfig, ConfigError> {
        let vars: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        AppConfig::from_lookup(|key| vars.get(key).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = config_from(&[]).unwrap();

        assert_eq!(config.database_url, None);
        assert_eq!(config.port, 3000);
        assert_eq!(config.max_connections, 5);
        assert_eq!(config.seed_path, None);
        assert_eq!(config.circulation.history, LoanHistoryPolicy::Retain);
        assert_eq!(config.listen_addr(), "0.0.0.0:3000");
    }

    #[test]
    fn test_reads_all_values() {
        let config = config_from(&[
            ("DATABASE_URL", "postgres://localhost/library"),
            ("DATABASE_MAX_CONNECTIONS", "12"),
            ("CIRCULATION_SEED", "seed.json"),
            ("PORT", "8080"),
            ("LOAN_HISTORY_POLICY", "Discard"),
        ])
        .unwrap();

        assert_eq!(
            config.database_url.as_deref(),
            Some("postgres://localhost/library")
        );
        assert_eq!(config.max_connections, 12);
        assert_eq!(config.seed_path, Some(PathBuf::from("seed.json")));
        assert_eq!(config.port, 8080);
        assert_eq!(config.circulation.history, LoanHistoryPolicy::Discard);
    }

    #[test]
    fn test_blank_values_fall_back_to_defaults() {
        let config = config_from(&[("DATABASE_URL", "  "), ("PORT", "")]).unwrap();
        assert_eq!(config.database_url, None);
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn test_invalid_port() {
        let err = config_from(&[("PORT", "http")]).unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue { key: "PORT", .. }));
    }

    #[test]
    fn test_invalid_history_policy() {
        let err = config_from(&[("LOAN_HISTORY_POLICY", "archive")]).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue {
                key: "LOAN_HISTORY_POLICY",
                ..
            }
        ));
    }
}
