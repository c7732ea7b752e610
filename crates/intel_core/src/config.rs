//! サービス設定
//!
//! 起動時に一度だけ構築し、以降は読み取り専用で各ハンドラへ渡す。

use std::collections::HashMap;
use std::path::Path;

use thiserror::Error;
use tracing::{debug, info};

pub const ENV_API_KEY: &str = "GROQ_API_KEY";
pub const ENV_MODEL: &str = "GROQ_MODEL";
pub const ENV_API_BASE: &str = "GROQ_API_BASE";
pub const ENV_HOST: &str = "HOST";
pub const ENV_PORT: &str = "PORT";
pub const ENV_ALLOWED_ORIGINS: &str = "ALLOWED_ORIGINS";
pub const ENV_TIMEOUT_SECS: &str = "UPSTREAM_TIMEOUT_SECS";

pub const DEFAULT_MODEL: &str = "llama-3.1-8b-instant";
pub const DEFAULT_API_BASE: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8084;
pub const DEFAULT_ORIGIN: &str = "http://localhost:5173";
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

/// 設定読み込み時のエラー
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("GROQ_API_KEY must not be empty")]
    MissingApiKey,
    #[error("invalid value for {key}: {value:?} ({reason})")]
    InvalidValue {
        key: &'static str,
        value: String,
        reason: String,
    },
    #[error("failed to read env file: {0}")]
    EnvFile(#[from] dotenvy::Error),
}

/// アプリケーション設定
#[derive(Debug, Clone, PartialEq)]
pub struct Settings {
    /// 上流APIキー（前後の空白は除去済み）
    pub api_key: String,
    /// モデル名
    pub model: String,
    /// OpenAI互換エンドポイントのベースURL
    pub api_base: String,
    pub host: String,
    pub port: u16,
    /// CORSで許可するオリジン
    pub allowed_origins: Vec<String>,
    /// 上流呼び出し1回あたりのタイムアウト（秒）
    pub request_timeout_secs: u64,
}

impl Settings {
    /// プロセス環境変数から設定を構築する。
    ///
    /// `.env` の読み込みは呼び出し側（`main`）で先に済ませておくこと。
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 指定ファイルの値のみから設定を構築する（プロセス環境は参照しない）
    pub fn from_env_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let mut vars = HashMap::new();
        for item in dotenvy::from_path_iter(path.as_ref())? {
            let (key, value) = item?;
            vars.insert(key, value);
        }
        debug!(target: "config", path = %path.as_ref().display(), keys = vars.len(), "env file loaded");
        Self::from_lookup(|key| vars.get(key).cloned())
    }

    /// キー→値の参照関数から設定を構築する
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_key = lookup(ENV_API_KEY)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .ok_or(ConfigError::MissingApiKey)?;

        let model = non_blank(lookup(ENV_MODEL)).unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let api_base = non_blank(lookup(ENV_API_BASE))
            .map(|v| v.trim_end_matches('/').to_string())
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());
        let host = non_blank(lookup(ENV_HOST)).unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match non_blank(lookup(ENV_PORT)) {
            Some(raw) => raw.parse::<u16>().map_err(|e| ConfigError::InvalidValue {
                key: ENV_PORT,
                value: raw.clone(),
                reason: e.to_string(),
            })?,
            None => DEFAULT_PORT,
        };

        let request_timeout_secs = match non_blank(lookup(ENV_TIMEOUT_SECS)) {
            Some(raw) => match raw.parse::<u64>() {
                Ok(0) | Err(_) => {
                    return Err(ConfigError::InvalidValue {
                        key: ENV_TIMEOUT_SECS,
                        value: raw,
                        reason: "expected a positive number of seconds".to_string(),
                    })
                }
                Ok(secs) => secs,
            },
            None => DEFAULT_TIMEOUT_SECS,
        };

        let allowed_origins = match non_blank(lookup(ENV_ALLOWED_ORIGINS)) {
            Some(raw) => parse_origins(&raw)?,
            None => vec![DEFAULT_ORIGIN.to_string()],
        };

        let settings = Self {
            api_key,
            model,
            api_base,
            host,
            port,
            allowed_origins,
            request_timeout_secs,
        };
        info!(
            target: "config",
            model = %settings.model,
            api_base = %settings.api_base,
            bind = %settings.bind_addr(),
            origins = ?settings.allowed_origins,
            "settings loaded"
        );
        Ok(settings)
    }

    /// `host:port` 形式のバインドアドレス
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

/// 全オリジン許可を表す値。単独で指定した場合のみ有効
pub const ANY_ORIGIN: &str = "*";

/// `["a","b"]` 形式（JSON配列）とカンマ区切りの両方を受け付ける
fn parse_origins(raw: &str) -> Result<Vec<String>, ConfigError> {
    let origins: Vec<String> = if raw.starts_with('[') {
        serde_json::from_str::<Vec<String>>(raw).map_err(|e| ConfigError::InvalidValue {
            key: ENV_ALLOWED_ORIGINS,
            value: raw.to_string(),
            reason: e.to_string(),
        })?
    } else {
        raw.split(',').map(str::to_string).collect()
    };

    let origins: Vec<String> = origins
        .into_iter()
        .map(|o| o.trim().trim_end_matches('/').to_string())
        .filter(|o| !o.is_empty())
        .collect();

    if origins.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: ENV_ALLOWED_ORIGINS,
            value: raw.to_string(),
            reason: "no origins listed".to_string(),
        });
    }
    if origins.len() > 1 && origins.iter().any(|o| o == ANY_ORIGIN) {
        return Err(ConfigError::InvalidValue {
            key: ENV_ALLOWED_ORIGINS,
            value: raw.to_string(),
            reason: "\"*\" cannot be combined with other origins".to_string(),
        });
    }
    Ok(origins)
}
