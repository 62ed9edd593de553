//! docgen REST API server.

use docgen_api::config::ApiConfig;
use docgen_api::server::{self, AppState};
use docgen_llm::OpenAiGenerator;
use docgen_pipeline::{DocumentRegistry, SectionPipeline};
use docgen_scheduler::Scheduler;
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::new(
            std::env::var("RUST_LOG").unwrap_or_else(|_| "info".into()),
        ))
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = ApiConfig::from_env()?;

    let mut registry = DocumentRegistry::builtin()?;
    if let Some(ref path) = config.registry_path {
        let added = registry.extend_from_json_file(path)?;
        tracing::info!(path = %path.display(), added, "loaded document layouts");
    }

    let generator = OpenAiGenerator::from_env()?;
    tracing::info!(model = generator.model(), "generator ready");

    let scheduler = Scheduler::new(config.scheduler.clone());
    let pipeline = SectionPipeline::new(
        Arc::new(registry),
        Arc::new(generator),
        config.pipeline.clone(),
    );
    let app = server::router(Arc::new(AppState {
        scheduler,
        pipeline,
    }));

    tracing::info!("docgen API listening on {}", config.listen);
    axum::serve(
        tokio::net::TcpListener::bind(config.listen).await?,
        app.into_make_service(),
    )
    .await?;
    Ok(())
}
