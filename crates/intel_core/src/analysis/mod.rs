//! 戦況分析: プロンプト構築と、モデル出力の修復・正規化

pub mod normalize;
pub mod prompt;
pub mod repair;

use thiserror::Error;

pub use normalize::{normalize_analysis, normalize_completion, parse_completion, repair_completion};
pub use prompt::{build_battle_prompt, TACTICAL_SYSTEM_PROMPT};

/// モデル出力をレスポンスに変換できなかった理由
#[derive(Debug, Error)]
pub enum NormalizeError {
    #[error("no JSON object found in model output")]
    NoJsonObject,
    #[error("{0}")]
    Syntax(#[source] serde_json::Error),
    #[error("field `{0}` has an unexpected type")]
    FieldType(&'static str),
    #[error("response does not match schema: {0}")]
    Schema(#[source] serde_json::Error),
}
