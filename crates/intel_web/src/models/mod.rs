use axum::{
    extract::{rejection::JsonRejection, FromRequest},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use intel_core::analysis::NormalizeError;
use intel_core::{AnalysisError, UpstreamError, UpstreamErrorKind};

/// 接続確認の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ProbeStatus {
    Success,
    Error,
}

/// GET /api/v1/test のレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ProbeResponse {
    pub status: ProbeStatus,
    pub response: String,
}

/// エラーレスポンス（`{"detail": ...}`）
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub detail: String,
}

/// 上流エラー種別 → HTTPステータス
pub fn status_for(kind: UpstreamErrorKind) -> StatusCode {
    match kind {
        UpstreamErrorKind::Authentication => StatusCode::UNAUTHORIZED,
        UpstreamErrorKind::RateLimited => StatusCode::TOO_MANY_REQUESTS,
        UpstreamErrorKind::Unavailable => StatusCode::SERVICE_UNAVAILABLE,
        UpstreamErrorKind::Other => StatusCode::INTERNAL_SERVER_ERROR,
    }
}

/// クライアントに返す説明文
pub fn detail_for(err: &UpstreamError) -> String {
    match err.kind() {
        UpstreamErrorKind::Authentication => "Invalid upstream API key".to_string(),
        UpstreamErrorKind::RateLimited => "Upstream API rate limit exceeded".to_string(),
        UpstreamErrorKind::Unavailable => "Upstream API temporarily unavailable".to_string(),
        UpstreamErrorKind::Other => format!("Upstream API error: {}", err.message()),
    }
}

/// ハンドラ共通のAPIエラー
#[derive(Debug)]
pub struct ApiError {
    pub status: StatusCode,
    pub detail: String,
}

impl From<UpstreamError> for ApiError {
    fn from(err: UpstreamError) -> Self {
        Self {
            status: status_for(err.kind()),
            detail: detail_for(&err),
        }
    }
}

impl From<NormalizeError> for ApiError {
    fn from(err: NormalizeError) -> Self {
        Self {
            status: StatusCode::INTERNAL_SERVER_ERROR,
            detail: format!("AI returned invalid JSON: {err}"),
        }
    }
}

impl From<AnalysisError> for ApiError {
    fn from(err: AnalysisError) -> Self {
        match err {
            AnalysisError::Upstream(e) => e.into(),
            AnalysisError::Normalize(e) => e.into(),
        }
    }
}

/// JSON本文の取り出しに失敗した場合も `{"detail": ...}` で返す
impl From<JsonRejection> for ApiError {
    fn from(rejection: JsonRejection) -> Self {
        Self {
            status: rejection.status(),
            detail: rejection.body_text(),
        }
    }
}

/// `Json` と同じだが、拒否時は `ApiError` になる抽出器
#[derive(Debug, FromRequest)]
#[from_request(via(Json), rejection(ApiError))]
pub struct ApiJson<T>(pub T);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        tracing::warn!(target: "web", status = %self.status, detail = %self.detail, "request failed");
        (self.status, Json(ErrorResponse { detail: self.detail })).into_response()
    }
}
