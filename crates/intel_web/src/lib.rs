//! intel_web
//!
//! 戦況分析サービスのHTTP層（axum）。ルーティング・CORS・エラー応答のみを担い、
//! 処理本体は `intel_core::BattleService` に委ねる。

pub mod handlers;
pub mod models;

use axum::{
    http::{HeaderValue, Method},
    routing::{get, post},
    Router,
};
use color_eyre::{
    eyre::{bail, WrapErr},
    Result,
};
use tower_http::{
    cors::{AllowHeaders, AllowOrigin, CorsLayer},
    trace::TraceLayer,
};

use intel_core::config::ANY_ORIGIN;
use intel_core::BattleService;

/// APIのパスプレフィックス
pub const API_PREFIX: &str = "/api/v1";

/// ハンドラ間で共有する状態（起動後は読み取り専用）
#[derive(Clone)]
pub struct AppState {
    pub service: BattleService,
}

impl AppState {
    pub fn new(service: BattleService) -> Self {
        Self { service }
    }
}

/// 許可オリジンの指定を `AllowOrigin` に変換する。
///
/// 資格情報付きCORSでは `*` を返せないため、単独の `*` はリクエストのオリジンをそのまま返す。
fn allow_origin(allowed_origins: &[String]) -> Result<AllowOrigin> {
    if allowed_origins.iter().any(|o| o == ANY_ORIGIN) {
        if allowed_origins.len() > 1 {
            bail!("CORS origin {ANY_ORIGIN:?} cannot be combined with other origins");
        }
        tracing::warn!(target: "web", "CORS allows any origin (mirrored)");
        return Ok(AllowOrigin::mirror_request());
    }

    let origins = allowed_origins
        .iter()
        .map(|o| {
            HeaderValue::from_str(o).wrap_err_with(|| format!("invalid CORS origin: {o:?}"))
        })
        .collect::<Result<Vec<_>>>()?;
    Ok(AllowOrigin::list(origins))
}

/// 設定されたオリジンのみ許可するCORSレイヤー
pub fn cors_layer(allowed_origins: &[String]) -> Result<CorsLayer> {
    Ok(CorsLayer::new()
        .allow_origin(allow_origin(allowed_origins)?)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers(AllowHeaders::mirror_request())
        .allow_credentials(true))
}

/// ルーターを組み立てる
pub fn build_router(state: AppState, allowed_origins: &[String]) -> Result<Router> {
    let api = Router::new()
        .route("/test", get(handlers::probe))
        .route("/analyze", post(handlers::analyze));

    Ok(Router::new()
        .nest(API_PREFIX, api)
        .layer(cors_layer(allowed_origins)?)
        .layer(TraceLayer::new_for_http())
        .with_state(state))
}
