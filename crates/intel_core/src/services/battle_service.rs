//! BattleService
//!
//! 戦況分析のビジネスロジック層。HTTP層から独立しており、
//! 上流クライアントは `ChatBackend` として注入される。

use std::sync::Arc;

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::analysis::{build_battle_prompt, normalize_completion, NormalizeError, TACTICAL_SYSTEM_PROMPT};
use crate::analysis::prompt::PROBE_PROMPT;
use crate::models::{BattleAnalyzeRequest, BattleAnalyzeResponse};
use crate::openai::{ChatBackend, CompletionRequest, UpstreamError};

/// 接続確認時の最大トークン数
pub const PROBE_MAX_TOKENS: u32 = 10;
/// 接続確認時の温度
pub const PROBE_TEMPERATURE: f32 = 0.3;

/// 分析の失敗理由
#[derive(Debug, Error)]
pub enum AnalysisError {
    #[error(transparent)]
    Upstream(#[from] UpstreamError),
    #[error(transparent)]
    Normalize(#[from] NormalizeError),
}

/// 戦況分析サービス
#[derive(Clone)]
pub struct BattleService {
    backend: Arc<dyn ChatBackend>,
}

impl BattleService {
    pub fn new(backend: Arc<dyn ChatBackend>) -> Self {
        Self { backend }
    }

    pub fn model(&self) -> &str {
        self.backend.model()
    }

    /// 固定プロンプトで上流への疎通を確認し、返答テキストをそのまま返す
    pub async fn probe(&self) -> Result<String, UpstreamError> {
        let request = CompletionRequest {
            system: None,
            user: PROBE_PROMPT.to_string(),
            max_tokens: PROBE_MAX_TOKENS,
            temperature: PROBE_TEMPERATURE,
        };
        let reply = self.backend.complete(&request).await?;
        info!(target: "analysis", model = %self.model(), "probe succeeded");
        Ok(reply)
    }

    /// 戦況を要約して上流モデルに分析させ、出力を正規化して返す
    pub async fn analyze(
        &self,
        request: &BattleAnalyzeRequest,
    ) -> Result<BattleAnalyzeResponse, AnalysisError> {
        let completion = CompletionRequest {
            system: Some(TACTICAL_SYSTEM_PROMPT.to_string()),
            user: build_battle_prompt(request),
            max_tokens: request.max_tokens,
            temperature: request.temperature,
        };
        info!(
            target: "analysis",
            units = request.battle_data.units.len(),
            actions = request.actions.len(),
            terrain = %request.terrain,
            max_tokens = request.max_tokens,
            "analysis requested"
        );

        let raw = self.backend.complete(&completion).await?;
        debug!(target: "analysis", len = raw.len(), raw = %raw, "raw completion");

        match normalize_completion(&raw, self.model()) {
            Ok(response) => {
                info!(
                    target: "analysis",
                    units = response.units.len(),
                    details = response.details.len(),
                    outcome = ?response.battle_outcome,
                    "analysis normalized"
                );
                Ok(response)
            }
            Err(e) => {
                warn!(target: "analysis", error = %e, "model output could not be normalized");
                Err(e.into())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::openai::UpstreamErrorKind;
    use async_trait::async_trait;
    use serde_json::json;
    use std::sync::Mutex;

    /// 固定の応答を返し、受け取ったリクエストを記録する
    struct ScriptedBackend {
        reply: Result<String, UpstreamError>,
        seen: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedBackend {
        fn new(reply: Result<String, UpstreamError>) -> Arc<Self> {
            Arc::new(Self {
                reply,
                seen: Mutex::new(Vec::new()),
            })
        }
    }

    #[async_trait]
    impl ChatBackend for ScriptedBackend {
        fn model(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String, UpstreamError> {
            self.seen.lock().unwrap().push(request.clone());
            self.reply.clone()
        }
    }

    fn request() -> BattleAnalyzeRequest {
        serde_json::from_value(json!({
            "battle_data": {"units": [{"id": "u1"}, {"id": "u2"}]},
            "actions": [{"unitId": "u1", "description": "advance"}],
            "terrain": "plains",
            "max_tokens": 900,
            "temperature": 0.4
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn analyze_sends_condensed_prompt_and_request_limits() {
        let backend = ScriptedBackend::new(Ok("{\"units\":[]}".to_string()));
        let service = BattleService::new(backend.clone());

        service.analyze(&request()).await.unwrap();

        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen.len(), 1);
        assert_eq!(seen[0].system.as_deref(), Some(TACTICAL_SYSTEM_PROMPT));
        assert_eq!(
            seen[0].user,
            "Battle: 2 units, 1 actions, terrain: plains. Return JSON analysis."
        );
        assert_eq!(seen[0].max_tokens, 900);
        assert!((seen[0].temperature - 0.4).abs() < f32::EPSILON);
    }

    #[tokio::test]
    async fn analyze_normalizes_output() {
        let backend = ScriptedBackend::new(Ok(
            "```json\n{\"units\":[{\"id\":\"u1\",\"status\":\"ROUTED\"}]\n```".to_string(),
        ));
        let service = BattleService::new(backend);

        let resp = service.analyze(&request()).await.unwrap();
        assert_eq!(resp.units[0]["status"], json!("DEFENDING"));
        assert_eq!(resp.battle_outcome.as_deref(), Some("ONGOING"));
        assert_eq!(resp.details[0].description, "AI analysis completed (model: scripted)");
    }

    #[tokio::test]
    async fn analyze_propagates_upstream_error() {
        let backend = ScriptedBackend::new(Err(UpstreamError::from_message("Rate limit reached")));
        let service = BattleService::new(backend);

        let err = service.analyze(&request()).await.unwrap_err();
        match err {
            AnalysisError::Upstream(e) => assert_eq!(e.kind(), UpstreamErrorKind::RateLimited),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn analyze_reports_unparseable_output() {
        let backend = ScriptedBackend::new(Ok("no json here".to_string()));
        let service = BattleService::new(backend);

        let err = service.analyze(&request()).await.unwrap_err();
        assert!(matches!(err, AnalysisError::Normalize(NormalizeError::NoJsonObject)));
    }

    #[tokio::test]
    async fn probe_uses_fixed_prompt() {
        let backend = ScriptedBackend::new(Ok("OK".to_string()));
        let service = BattleService::new(backend.clone());

        assert_eq!(service.probe().await.unwrap(), "OK");
        let seen = backend.seen.lock().unwrap();
        assert_eq!(seen[0].user, PROBE_PROMPT);
        assert_eq!(seen[0].system, None);
        assert_eq!(seen[0].max_tokens, PROBE_MAX_TOKENS);
    }
}
