//! リクエスト/レスポンスのデータモデル
//!
//! どれもリクエスト単位で生成・破棄される一時的な値。

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// 行動の優先度
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Priority {
    High,
    #[default]
    Medium,
    Low,
}

/// 行動の時間枠
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Timeframe {
    Immediate,
    #[default]
    Short,
    Long,
}

/// 部隊に与えた行動指示
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ActionRequest {
    #[serde(rename = "unitId")]
    pub unit_id: String,
    pub description: String,
    #[serde(default)]
    pub priority: Priority,
    #[serde(default)]
    pub timeframe: Timeframe,
}

/// 戦場データ。部隊・障害物の中身は検証せずにそのまま扱う
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct BattleData {
    #[serde(default)]
    pub units: Vec<Value>,
    #[serde(default)]
    pub obstacles: Vec<Value>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

/// `POST /api/v1/analyze` のリクエストボディ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleAnalyzeRequest {
    pub battle_data: BattleData,
    #[serde(default)]
    pub actions: Vec<ActionRequest>,
    #[serde(default = "default_terrain")]
    pub terrain: String,
    #[serde(default = "default_weather")]
    pub weather: String,
    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
    #[serde(default = "default_temperature")]
    pub temperature: f32,
}

fn default_terrain() -> String {
    "urban".to_string()
}

fn default_weather() -> String {
    "clear".to_string()
}

fn default_max_tokens() -> u32 {
    1200
}

fn default_temperature() -> f32 {
    0.7
}

/// 分析の処理ステップ
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetailStep {
    pub step: i64,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TimelineEvent {
    pub time: String,
    pub event: String,
}

/// 指揮官向けの通信（推奨事項）
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunicationRecommendation {
    pub priority: String,
    pub recipient: String,
    pub message: String,
    pub reasoning: String,
}

/// `POST /api/v1/analyze` のレスポンス。
///
/// 上流モデルが返した未知のトップレベルキーは `extra` に入り、検証なしで素通しされる。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BattleAnalyzeResponse {
    #[serde(default)]
    pub battle_outcome: Option<String>,
    #[serde(default)]
    pub units: Vec<Value>,
    #[serde(default)]
    pub obstacles: Vec<Value>,
    #[serde(default)]
    pub details: Vec<DetailStep>,
    #[serde(default)]
    pub timeline: Option<Vec<TimelineEvent>>,
    #[serde(default)]
    pub communications: Option<Vec<CommunicationRecommendation>>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}
