use std::sync::Arc;

use color_eyre::Result;
use tracing_appender::rolling;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use intel_core::{BattleService, OpenAiBackend, Settings};
use intel_web::{build_router, AppState, API_PREFIX};

#[tokio::main]
async fn main() -> Result<()> {
    // エラーハンドリングの初期化
    color_eyre::install()?;

    // .env のロード（既にある環境変数は上書きしない）
    dotenvy::dotenv().ok();

    // ロギング: 標準出力 + 日次ローテーションのファイル
    let file_appender = rolling::daily("logs", "intel_web.log");
    let (non_blocking, _guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info,intel_web=debug"));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_target(true))
        .with(fmt::layer().with_writer(non_blocking).with_ansi(false))
        .init();

    tracing::info!(target: "intel_web", "Starting intelligence service...");

    // APIキーが空ならここで終了する
    let settings = Settings::from_env()?;

    let backend = OpenAiBackend::from_settings(&settings)?;
    let state = AppState::new(BattleService::new(Arc::new(backend)));
    let app = build_router(state, &settings.allowed_origins)?;

    let listener = tokio::net::TcpListener::bind(settings.bind_addr()).await?;
    let addr = listener.local_addr()?;
    tracing::info!(target: "intel_web", "Server running on http://{}{}", addr, API_PREFIX);

    axum::serve(listener, app).await?;

    Ok(())
}
