use axum::{extract::State, Json};

use intel_core::{BattleAnalyzeRequest, BattleAnalyzeResponse};

use crate::models::{ApiError, ApiJson};
use crate::AppState;

/// POST /api/v1/analyze - 戦況を上流モデルに分析させる
pub async fn analyze(
    State(state): State<AppState>,
    ApiJson(req): ApiJson<BattleAnalyzeRequest>,
) -> Result<Json<BattleAnalyzeResponse>, ApiError> {
    tracing::info!(
        target: "web::analyze",
        units = req.battle_data.units.len(),
        actions = req.actions.len(),
        "Received analyze request"
    );

    let response = state.service.analyze(&req).await?;

    tracing::info!(target: "web::analyze", "Analyze response successful");
    Ok(Json(response))
}
