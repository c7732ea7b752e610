//! 上流モデルの生テキストを `BattleAnalyzeResponse` に正規化する

use serde_json::{json, Map, Value};
use tracing::debug;

use super::repair::{clean_completion, close_unbalanced, extract_candidate};
use super::NormalizeError;
use crate::models::BattleAnalyzeResponse;

pub const STATUS_ATTACKING: &str = "ATTACKING";
pub const STATUS_DEFENDING: &str = "DEFENDING";
pub const DEFAULT_OUTCOME: &str = "ONGOING";

/// 生テキストから修復済みのJSON候補文字列を作る
pub fn repair_completion(raw: &str) -> Result<String, NormalizeError> {
    let cleaned = clean_completion(raw);
    let candidate = extract_candidate(&cleaned).ok_or(NormalizeError::NoJsonObject)?;
    let repaired = close_unbalanced(candidate);
    debug!(
        target: "analysis",
        raw_len = raw.len(),
        candidate_len = candidate.len(),
        appended = repaired.len().saturating_sub(candidate.len()),
        "candidate extracted"
    );
    Ok(repaired)
}

/// 修復済み候補をJSONオブジェクトとしてパースする。失敗はそのまま致命的エラー
pub fn parse_completion(raw: &str) -> Result<Map<String, Value>, NormalizeError> {
    let repaired = repair_completion(raw)?;
    serde_json::from_str::<Map<String, Value>>(&repaired).map_err(NormalizeError::Syntax)
}

/// パース済みオブジェクトを正規化してスキーマ検証する。
///
/// - `units[].status` は `ATTACKING` / `DEFENDING` 以外を `DEFENDING` に置き換える
/// - `communications` / `timeline` / `details` が無ければ空配列、`battle_outcome` は `ONGOING`
/// - `details` の先頭に診断用ステップを挿入する
pub fn normalize_analysis(
    mut analysis: Map<String, Value>,
    model: &str,
) -> Result<BattleAnalyzeResponse, NormalizeError> {
    if let Some(Value::Array(units)) = analysis.get_mut("units") {
        for unit in units.iter_mut().filter_map(Value::as_object_mut) {
            let keep = matches!(
                unit.get("status").and_then(Value::as_str),
                Some(STATUS_ATTACKING | STATUS_DEFENDING)
            );
            if !keep {
                unit.insert("status".to_string(), json!(STATUS_DEFENDING));
            }
        }
    }

    analysis
        .entry("communications")
        .or_insert_with(|| json!([]));
    analysis.entry("timeline").or_insert_with(|| json!([]));
    analysis
        .entry("battle_outcome")
        .or_insert_with(|| json!(DEFAULT_OUTCOME));

    let details = analysis
        .entry("details")
        .or_insert_with(|| json!([]))
        .as_array_mut()
        .ok_or(NormalizeError::FieldType("details"))?;
    details.insert(0, diagnostic_step(model));

    serde_json::from_value(Value::Object(analysis)).map_err(NormalizeError::Schema)
}

/// 生テキストから検証済みレスポンスまでを一括で行う
pub fn normalize_completion(
    raw: &str,
    model: &str,
) -> Result<BattleAnalyzeResponse, NormalizeError> {
    let parsed = parse_completion(raw)?;
    normalize_analysis(parsed, model)
}

fn diagnostic_step(model: &str) -> Value {
    json!({
        "step": 0,
        "description": format!("AI analysis completed (model: {model})"),
    })
}
