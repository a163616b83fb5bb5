mod backend;
mod candidate;
mod config;
mod dashboard;
mod db;
mod errors;
mod interview;
mod narration;
mod routes;
mod state;
mod store;
mod user;

#[cfg(test)]
mod testing;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::backend::BackendClient;
use crate::config::Config;
use crate::db::create_pool;
use crate::interview::registry::SessionRegistry;
use crate::interview::runner::SessionDeps;
use crate::narration::paced::PacedNarrator;
use crate::narration::voices::VoiceCatalog;
use crate::routes::build_router;
use crate::state::AppState;
use crate::store::postgres::PgInterviewRepository;
use crate::store::resumes::S3ResumeStorage;
use crate::store::snapshots::RedisSnapshotStore;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_CRATE_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting Interview API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    let repository = Arc::new(PgInterviewRepository::new(db));

    // Initialize Redis
    let redis = redis::Client::open(config.redis_url.clone())?;
    let snapshots = Arc::new(RedisSnapshotStore::connect(redis, config.snapshot_ttl_secs).await?);
    info!("Redis connection established");

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    let resumes = Arc::new(S3ResumeStorage::new(
        s3,
        &config.s3_bucket,
        &config.s3_public_url,
    ));
    info!("S3 client initialized");

    // Initialize scoring backend client
    let backend = Arc::new(BackendClient::new(&config.scoring_api_base));
    info!("Scoring backend client initialized ({})", backend.base_url());

    let voices = match config.tts_voices.as_deref() {
        Some(spec) => VoiceCatalog::parse(spec),
        None => VoiceCatalog::builtin(),
    };
    info!("Narration: {} voices at {} wpm", voices.len(), config.narration_wpm);

    let sessions = SessionRegistry::new(SessionDeps {
        backend: backend.clone(),
        narrator: Arc::new(PacedNarrator::new(config.narration_wpm)),
        voices: Arc::new(voices),
        snapshots,
        repository: repository.clone(),
        tick: Duration::from_secs(1),
        submit_delay: Duration::from_millis(config.submit_delay_ms),
        idle_timeout: Duration::from_secs(config.session_idle_secs),
    });

    // Build app state
    let state = AppState {
        repository,
        resumes,
        backend,
        sessions,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive()); // TODO: restrict origins once the browser client has a fixed host

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "interview-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
