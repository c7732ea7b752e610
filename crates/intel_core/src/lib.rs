//! intel_core
//!
//! 戦況データを上流LLMに渡して戦術分析させ、返ってきた自由形式テキストを
//! 検証済みのJSONレスポンスへ整形するコアクレート。HTTP層からは独立している。

pub mod analysis;
pub mod config;
pub mod models;
pub mod openai;
pub mod services;

// 主要な型を再エクスポート
pub use config::{ConfigError, Settings};
pub use models::{BattleAnalyzeRequest, BattleAnalyzeResponse};
pub use openai::{ChatBackend, CompletionRequest, OpenAiBackend, UpstreamError, UpstreamErrorKind};
pub use services::{AnalysisError, BattleService};
