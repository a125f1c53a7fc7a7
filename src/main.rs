use recipe_catalog::{app, ingest, state::AppState};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = std::env::var("RUST_LOG")
        .unwrap_or_else(|_| "recipe_catalog=debug,axum=info,tower_http=info".to_string());
    let json_logs = std::env::var("LOG_FORMAT")
        .map(|v| v == "json")
        .unwrap_or(false);

    if json_logs {
        tracing_subscriber::fmt()
            .with_env_filter(env_filter)
            .with_target(false)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    // Startup failures are fatal: log and exit non-zero.
    let app_state = match AppState::init().await {
        Ok(s) => s,
        Err(e) => {
            tracing::error!("DB error: {e:#}");
            std::process::exit(1);
        }
    };

    let ingest_cfg = &app_state.config.ingest;
    if let Err(e) = ingest::run(
        &app_state.db,
        &ingest_cfg.dataset_path,
        ingest_cfg.skip_if_populated,
    )
    .await
    {
        tracing::error!("ingest failed: {e:#}");
        std::process::exit(1);
    }

    let listener = app::bind(&app_state).await?;
    app::serve(listener, app_state).await
}
