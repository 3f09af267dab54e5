use scenereader_backend::infrastructure::config::{Config, LogFormat, TtsProvider};
use scenereader_backend::infrastructure::db::{check_connection, create_pool};
use scenereader_backend::infrastructure::http::start_http_server;
use scenereader_backend::infrastructure::repositories::{
    LineRepository, OpenAiSpeechRepository, PollySpeechRepository, S3StorageRepository,
    ScriptRepository, ShareSessionRepository, SpeechRepository, StorageRepository,
};
use std::sync::Arc;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use scenereader_backend::controllers::reader_audio::ReaderAudioController;
use scenereader_backend::controllers::session::SessionController;
use scenereader_backend::domain::share::ShareService;
use scenereader_backend::domain::synthesis::{JobStore, SynthesisService};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load configuration
    let config = Config::from_env()?;

    // Initialize logging
    init_logging(&config);

    tracing::info!(
        "Starting SceneReader Backend on {}:{}",
        config.host,
        config.port
    );

    // Create database connection pool
    let pool = create_pool(&config.database_url, config.database_max_connections).await?;
    tracing::info!("Database connection pool created");

    // Verify database connection
    check_connection(&pool).await?;
    tracing::info!("Database connection verified");

    // Load AWS configuration (S3 always; Polly when it is the TTS provider)
    tracing::info!(region = %config.aws_region, "Loading AWS configuration");
    let aws_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(aws_config::Region::new(config.aws_region.clone()))
        .load()
        .await;

    let pool = Arc::new(pool);
    let config = Arc::new(config);

    // === DEPENDENCY INJECTION SETUP ===
    // 1. External capabilities: blob storage and speech synthesis
    let s3_client = Arc::new(aws_sdk_s3::Client::new(&aws_config));
    let storage_repo: Arc<dyn StorageRepository> = Arc::new(S3StorageRepository::new(
        s3_client,
        config.aws_region.clone(),
    ));

    let speech_repo: Arc<dyn SpeechRepository> = match config.tts_provider {
        TtsProvider::Polly => {
            tracing::info!("Using AWS Polly for speech synthesis");
            let polly_client = Arc::new(aws_sdk_polly::Client::new(&aws_config));
            Arc::new(PollySpeechRepository::new(
                polly_client,
                config.male_voice_id.clone(),
                config.female_voice_id.clone(),
            ))
        }
        TtsProvider::OpenAi => {
            tracing::info!(model = %config.openai_tts_model, "Using OpenAI for speech synthesis");
            let api_key = config
                .openai_api_key
                .clone()
                .ok_or("OPENAI_API_KEY is required when TTS_PROVIDER=openai")?;
            let openai_config = async_openai::config::OpenAIConfig::new().with_api_key(api_key);
            Arc::new(OpenAiSpeechRepository::new(
                Arc::new(async_openai::Client::with_config(openai_config)),
                config.openai_tts_model.clone(),
            ))
        }
    };

    // 2. Instantiate repositories (inject db pool)
    tracing::info!("Instantiating repositories...");
    let line_repo = Arc::new(LineRepository::new(pool.clone()));
    let script_repo = Arc::new(ScriptRepository::new(pool.clone()));
    let session_repo = Arc::new(ShareSessionRepository::new(pool.clone()));

    // 3. Instantiate services
    tracing::info!("Instantiating services...");
    let job_store = Arc::new(JobStore::new());
    let synthesis_service = Arc::new(SynthesisService::new(
        job_store,
        speech_repo,
        storage_repo.clone(),
        config.lines_bucket.clone(),
        config.synthesis_batch_size,
        config.tts_cache_enabled,
    ));
    let share_service = Arc::new(ShareService::new(
        session_repo,
        script_repo,
        line_repo,
        storage_repo,
        config.recordings_bucket.clone(),
        config.lines_bucket.clone(),
        config.public_base_url.clone(),
    ));

    // 4. Instantiate controllers (inject services)
    tracing::info!("Instantiating controllers...");
    let reader_audio_controller = Arc::new(ReaderAudioController::new(synthesis_service));
    let session_controller = Arc::new(SessionController::new(share_service));

    // Start HTTP server with all routes
    start_http_server(pool, config, reader_audio_controller, session_controller).await?;

    Ok(())
}

fn init_logging(config: &Config) {
    if config.log_format == LogFormat::Json {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "scenereader_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(
                tracing_subscriber::EnvFilter::try_from_default_env()
                    .unwrap_or_else(|_| "scenereader_backend=debug,tower_http=debug".into()),
            )
            .with(tracing_subscriber::fmt::layer().pretty())
            .init();
    }
}
