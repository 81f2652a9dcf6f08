use std::error::Error;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tracing_subscriber::EnvFilter;

use learnable_chatbot::adapters::ai::GeminiProvider;
use learnable_chatbot::adapters::cache::{InMemoryResponseCache, RedisResponseCache};
use learnable_chatbot::adapters::firestore::{FirestoreClient, FirestoreCurriculumStore};
use learnable_chatbot::adapters::http::{build_router, AdminGuard, WebhookAppState};
use learnable_chatbot::adapters::queue::{ChannelGenerationQueue, GenerationWorkerPool};
use learnable_chatbot::application::{CacheTtls, WebhookDispatcher};
use learnable_chatbot::config::{AppConfig, CacheBackend, ServerConfig};
use learnable_chatbot::ports::{AnswerGenerator, ResponseCache};

/// How long in-flight generation jobs get to finish after the server stops.
const WORKER_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    let config = AppConfig::load()?;
    init_tracing(&config.server);
    config.validate()?;

    tracing::info!(
        environment = ?config.server.environment,
        cache_backend = ?config.cache.backend,
        workers = config.generation.workers,
        "Starting LearnAble webhook"
    );

    let cache: Arc<dyn ResponseCache> = match config.cache.backend {
        CacheBackend::Redis => Arc::new(RedisResponseCache::connect(&config.redis).await?),
        CacheBackend::Memory => {
            tracing::warn!("Using in-memory response cache; entries are lost on restart");
            Arc::new(InMemoryResponseCache::new())
        }
    };
    let store = Arc::new(FirestoreCurriculumStore::new(FirestoreClient::from_config(
        &config.firestore,
    )?));
    let generator: Arc<dyn AnswerGenerator> =
        Arc::new(GeminiProvider::from_config(&config.gemini)?);
    if !config.gemini.has_api_key() {
        tracing::warn!("No Gemini API key configured; generated answers will be apologies");
    }

    let (queue, jobs) = ChannelGenerationQueue::bounded(config.generation.queue_capacity);
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    tracing::info!(
        generator = generator.name(),
        model = %config.gemini.model,
        workers = config.generation.workers,
        queue_capacity = config.generation.queue_capacity,
        "Starting generation workers"
    );
    let workers = GenerationWorkerPool::spawn(
        config.generation.workers,
        jobs,
        generator,
        cache.clone(),
        shutdown_rx,
    );

    let dispatcher = WebhookDispatcher::new(
        store,
        cache.clone(),
        Arc::new(queue),
        CacheTtls::from(&config.cache),
    );
    let guard = AdminGuard::new(config.admin.token());
    if !guard.is_enabled() {
        tracing::info!("No admin token configured; cache flush endpoint disabled");
    }
    let app = build_router(
        WebhookAppState::new(Arc::new(dispatcher), cache),
        Arc::new(guard),
        &config.server,
    );

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!(%addr, "Listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!(workers = workers.size(), "Server stopped; draining generation queue");
    // Workers only exit once signalled; a send error means they are already gone.
    let _ = shutdown_tx.send(true);
    if tokio::time::timeout(WORKER_DRAIN_TIMEOUT, workers.join()).await.is_err() {
        tracing::warn!("Generation workers did not drain in time; abandoning queued jobs");
    }

    tracing::info!("Shutdown complete");
    Ok(())
}

/// JSON logs in production, human-readable elsewhere. `RUST_LOG` wins over
/// the configured level.
fn init_tracing(server: &ServerConfig) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(server.log_level.as_str()));

    if server.is_production() {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .json()
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(filter).init();
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
    tracing::info!("Shutdown signal received");
}
