//! 上流モデルへ送るプロンプト

use crate::models::BattleAnalyzeRequest;

/// 戦術分析用のシステムプロンプト
pub const TACTICAL_SYSTEM_PROMPT: &str = r#"
You are a military tactical AI. Analyze battle with different unit types and their unique capabilities.

UNIT TYPES & CAPABILITIES:
- INFANTRY/MECHANIZED/TANKS: Standard combat units
- RECONNAISSANCE: High mobility, reveals enemy positions
- UAV: Long range surveillance, artillery spotting
- ANTI_TANK: Effective vs armored units
- HOWITZER/MORTAR: Artillery with different ranges
- AIR_DEFENSE: Counters air threats
- COMMUNICATIONS: Coordinates other units
- ENGINEER: Builds/destroys obstacles
- MEDICAL/REPAIR/SUPPLY/LOGISTICS: Support units

ANALYZE UNIT INTERACTIONS:
- Artillery effectiveness based on range and spotting
- Anti-tank vs armored unit matchups
- Support units affecting combat efficiency
- Reconnaissance revealing enemy positions
- Communication coordination bonuses

CONSIDER UNIT CHARACTERISTICS:
- Mobility: affects positioning and retreat
- Firepower: base combat effectiveness
- Defense: survivability in combat
- Range: engagement distance

RETURN EXACTLY THIS FORMAT:
{"battle_outcome":"BLUE_VICTORY","units":[{"id":"unit_id","faction":"BLUE_FORCE","unitType":"TANKS","status":"ATTACKING","morale":70,"personnel":35,"vehicles":10,"firepower":85}],"communications":[{"priority":"HIGH","recipient":"Командир","message":"Тактична рекомендація","reasoning":"Обґрунтування"}]}

CRITICAL RULES:
- ONLY JSON, no text before/after
- Consider unit types in battle calculations
- Account for unit synergies and counters
- Realistic casualties based on unit matchups
- Use Ukrainian for text fields
- Max 80 chars per Ukrainian text field
"#;

/// 接続確認用の固定プロンプト
pub const PROBE_PROMPT: &str = "Test connection. Reply with 'OK'";

/// 戦況を件数と地形だけに要約したユーザープロンプトを作る。
///
/// トークン節約のため `battle_data` の中身そのものは送らない。
pub fn build_battle_prompt(request: &BattleAnalyzeRequest) -> String {
    format!(
        "Battle: {} units, {} actions, terrain: {}. Return JSON analysis.",
        request.battle_data.units.len(),
        request.actions.len(),
        request.terrain
    )
}
