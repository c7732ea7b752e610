//! 上流API呼び出しエラーの分類

use async_openai::error::OpenAIError;
use thiserror::Error;

/// 上流エラーの種別。HTTPステータスへの対応付けはWeb層が行う
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpstreamErrorKind {
    /// APIキー不正など
    Authentication,
    /// レート制限・クォータ超過
    RateLimited,
    /// タイムアウト・接続失敗
    Unavailable,
    Other,
}

#[derive(Debug, Clone, Error)]
#[error("{message}")]
pub struct UpstreamError {
    kind: UpstreamErrorKind,
    message: String,
}

impl UpstreamError {
    pub fn new(kind: UpstreamErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    /// メッセージ文字列の部分一致で種別を決める
    pub fn from_message(message: impl Into<String>) -> Self {
        let message = message.into();
        Self {
            kind: classify_message(&message),
            message,
        }
    }

    /// 応答にテキストが含まれていなかった
    pub fn empty_response() -> Self {
        Self::new(
            UpstreamErrorKind::Other,
            "upstream returned no message content",
        )
    }

    pub fn kind(&self) -> UpstreamErrorKind {
        self.kind
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

/// 大文字小文字を無視した部分一致による分類
pub fn classify_message(message: &str) -> UpstreamErrorKind {
    let lower = message.to_lowercase();
    let has = |needles: &[&str]| needles.iter().any(|n| lower.contains(n));

    if has(&["authentication", "api key"]) {
        UpstreamErrorKind::Authentication
    } else if has(&["rate limit", "quota"]) {
        UpstreamErrorKind::RateLimited
    } else if has(&["timeout", "timed out", "connection"]) {
        UpstreamErrorKind::Unavailable
    } else {
        UpstreamErrorKind::Other
    }
}

impl From<OpenAIError> for UpstreamError {
    fn from(err: OpenAIError) -> Self {
        let kind = match &err {
            OpenAIError::Reqwest(e) if e.is_timeout() || e.is_connect() => {
                Some(UpstreamErrorKind::Unavailable)
            }
            OpenAIError::ApiError(api) => match api.code.as_deref() {
                Some("invalid_api_key") => Some(UpstreamErrorKind::Authentication),
                Some("rate_limit_exceeded") | Some("insufficient_quota") => {
                    Some(UpstreamErrorKind::RateLimited)
                }
                _ => None,
            },
            _ => None,
        };

        match kind {
            Some(kind) => Self::new(kind, err.to_string()),
            None => Self::from_message(err.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_openai::error::ApiError;

    #[test]
    fn substrings_map_to_kinds() {
        let cases = [
            ("Invalid API Key", UpstreamErrorKind::Authentication),
            ("Authentication failed for request", UpstreamErrorKind::Authentication),
            ("Rate limit reached for model", UpstreamErrorKind::RateLimited),
            ("You exceeded your current quota", UpstreamErrorKind::RateLimited),
            ("Request timeout", UpstreamErrorKind::Unavailable),
            ("operation timed out", UpstreamErrorKind::Unavailable),
            ("Connection refused", UpstreamErrorKind::Unavailable),
            ("model_not_found", UpstreamErrorKind::Other),
        ];
        for (message, expected) in cases {
            assert_eq!(classify_message(message), expected, "{message}");
        }
    }

    #[test]
    fn authentication_wins_over_later_rules() {
        // 先に評価される規則が優先される
        assert_eq!(
            classify_message("api key rejected after connection reset"),
            UpstreamErrorKind::Authentication
        );
    }

    #[test]
    fn api_error_code_is_used_before_message() {
        let err = OpenAIError::ApiError(ApiError {
            message: "Something went wrong".to_string(),
            r#type: Some("invalid_request_error".to_string()),
            param: None,
            code: Some("invalid_api_key".to_string()),
        });
        let upstream = UpstreamError::from(err);
        assert_eq!(upstream.kind(), UpstreamErrorKind::Authentication);
        assert!(upstream.message().contains("Something went wrong"));
    }

    #[test]
    fn api_error_without_code_falls_back_to_message() {
        let err = OpenAIError::ApiError(ApiError {
            message: "Rate limit reached for llama-3.1-8b-instant".to_string(),
            r#type: None,
            param: None,
            code: None,
        });
        assert_eq!(UpstreamError::from(err).kind(), UpstreamErrorKind::RateLimited);
    }

    #[test]
    fn empty_response_is_other() {
        assert_eq!(UpstreamError::empty_response().kind(), UpstreamErrorKind::Other);
    }
}
