//! 上流チャット補完APIのクライアント
//!
//! ハンドラは `ChatBackend` トレイト越しに呼び出すので、テストでは偽実装に差し替えられる。

use std::time::Duration;

use async_openai::config::OpenAIConfig;
use async_openai::Client;
use async_trait::async_trait;
use tracing::{debug, info, instrument, warn};

use super::error::UpstreamError;
use super::request::build_chat_request;
use crate::config::Settings;

/// 1回分の補完リクエスト
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub user: String,
    pub max_tokens: u32,
    pub temperature: f32,
}

/// チャット補完バックエンド
#[async_trait]
pub trait ChatBackend: Send + Sync {
    /// 使用するモデル名
    fn model(&self) -> &str;

    /// 補完を1回実行し、先頭choiceのテキストを返す
    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError>;
}

/// OpenAI互換API（既定はGroq）を叩く実装
pub struct OpenAiBackend {
    client: Client<OpenAIConfig>,
    model: String,
}

impl OpenAiBackend {
    /// 設定からクライアントを構築する。
    ///
    /// タイムアウトは `reqwest` 側で掛け、async-openai の自動リトライは無効化する。
    pub fn from_settings(settings: &Settings) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(settings.request_timeout_secs))
            .build()?;

        let config = OpenAIConfig::new()
            .with_api_key(settings.api_key.as_str())
            .with_api_base(settings.api_base.as_str());

        let no_retry = backoff::ExponentialBackoffBuilder::new()
            .with_max_elapsed_time(Some(Duration::ZERO))
            .build();

        let client = Client::with_config(config)
            .with_http_client(http)
            .with_backoff(no_retry);

        info!(
            target: "openai",
            model = %settings.model,
            api_base = %settings.api_base,
            timeout_secs = settings.request_timeout_secs,
            "upstream client ready"
        );
        Ok(Self {
            client,
            model: settings.model.clone(),
        })
    }
}

#[async_trait]
impl ChatBackend for OpenAiBackend {
    fn model(&self) -> &str {
        &self.model
    }

    #[instrument(name = "openai_complete", skip_all, fields(model = %self.model))]
    async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError> {
        let req = build_chat_request(&self.model, request)?;

        let resp = match self.client.chat().create(req).await {
            Ok(resp) => resp,
            Err(e) => {
                let err = UpstreamError::from(e);
                warn!(target: "openai", kind = ?err.kind(), error = %err, "upstream call failed");
                return Err(err);
            }
        };
        debug!(target: "openai", choices = resp.choices.len(), "upstream response received");

        resp.choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content)
            .filter(|text| !text.trim().is_empty())
            .ok_or_else(UpstreamError::empty_response)
    }
}
