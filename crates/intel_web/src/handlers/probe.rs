use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};

use crate::models::{detail_for, status_for, ProbeResponse, ProbeStatus};
use crate::AppState;

/// GET /api/v1/test - 上流モデルへの疎通確認
///
/// 失敗時も本文は `{status, response}` の形のまま、ステータスコードは分析APIと同じ分類で返す。
pub async fn probe(State(state): State<AppState>) -> impl IntoResponse {
    tracing::info!(target: "web::probe", model = %state.service.model(), "Received probe request");

    match state.service.probe().await {
        Ok(reply) => (
            StatusCode::OK,
            Json(ProbeResponse {
                status: ProbeStatus::Success,
                response: reply,
            }),
        )
            .into_response(),
        Err(e) => {
            tracing::error!(target: "web::probe", kind = ?e.kind(), error = %e, "Probe failed");
            (
                status_for(e.kind()),
                Json(ProbeResponse {
                    status: ProbeStatus::Error,
                    response: detail_for(&e),
                }),
            )
                .into_response()
        }
    }
}
