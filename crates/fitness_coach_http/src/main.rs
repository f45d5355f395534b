use std::sync::Arc;

use fitness_coach::Coach;
use fitness_coach::config::Config;
use fitness_coach::http_client::ReqwestGeminiClient;
use fitness_coach::profile_store::{JsonFileProfileStore, MemoryProfileStore, ProfileRepository};
use fitness_coach_http::middleware::LoggingMiddleware;
use fitness_coach_http::{AppState, ServerConfig, build_router};
use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::signal;
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), anyhow::Error> {
    // `FITNESS_COACH_LOG_LEVEL`, then `RUST_LOG`, then `info`.
    let log_env = std::env::var("FITNESS_COACH_LOG_LEVEL")
        .or_else(|_| std::env::var("RUST_LOG"))
        .unwrap_or_else(|_| "info".to_string());
    let combined_filter = format!("{log_env},hyper=warn,reqwest=warn");
    let env_filter = tracing_subscriber::EnvFilter::try_new(combined_filter)
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info,hyper=warn,reqwest=warn"));
    tracing_subscriber::fmt()
        .compact()
        .with_ansi(false)
        .with_target(false)
        .with_env_filter(env_filter)
        .init();
    info!(%log_env, "fitness-coach: log filter");

    let handle = PrometheusBuilder::new().install_recorder()?;

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            tracing::error!(error = %e, "invalid configuration; aborting startup");
            std::process::exit(1);
        }
    };
    let server = ServerConfig::from_env();

    let client = LoggingMiddleware::new(ReqwestGeminiClient::from_config(&config));
    let coach = Coach::new(Arc::new(client));

    let profiles: Arc<dyn ProfileRepository> = match &server.profile_path {
        Some(path) => {
            info!(path = %path.display(), "using file profile store");
            Arc::new(JsonFileProfileStore::new(path.clone()))
        }
        None => Arc::new(MemoryProfileStore::new()),
    };

    let state = AppState::new(coach, profiles, handle);
    let app = build_router(state, server.max_body_size);

    info!(
        addr = %server.address,
        model = %config.model,
        max_body_bytes = server.max_body_size,
        "starting HTTP server"
    );
    let listener = tokio::net::TcpListener::bind(server.address).await?;

    axum::serve(listener, app.into_make_service())
        .with_graceful_shutdown(async {
            if let Err(e) = signal::ctrl_c().await {
                tracing::error!("failed to install ctrl+c handler: {e}");
                std::future::pending::<()>().await;
            }
        })
        .await?;

    info!("server stopped");
    Ok(())
}
