use serde::Deserialize;
use std::env;

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub database_url: String,
    pub database_max_connections: u32,
    pub host: String,
    pub port: u16,
    pub jwt_secret: String,
    pub jwt_expiration_hours: i64,
    pub aws_region: String,
    pub environment: Environment,
    pub log_format: LogFormat,
    // Base URL used when building share links
    pub public_base_url: String,
    // Speech synthesis provider
    pub tts_provider: TtsProvider,
    pub openai_api_key: Option<String>,
    pub openai_tts_model: String,
    pub male_voice_id: String,
    pub female_voice_id: String,
    // Blob storage buckets
    pub recordings_bucket: String,
    pub lines_bucket: String,
    // Synthesis job engine
    pub synthesis_batch_size: usize,
    pub tts_cache_enabled: bool,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    Development,
    Production,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    Pretty,
    Json,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(rename_all = "lowercase")]
pub enum TtsProvider {
    Polly,
    OpenAi,
}

impl Config {
    pub fn from_env() -> Result<Self, Box<dyn std::error::Error>> {
        dotenvy::dotenv().ok();

        let config = Config {
            database_url: env::var("DATABASE_URL")?,
            database_max_connections: env::var("DATABASE_MAX_CONNECTIONS")
                .unwrap_or_else(|_| "10".to_string())
                .parse()?,
            host: env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string()),
            port: env::var("PORT")
                .unwrap_or_else(|_| "8080".to_string())
                .parse()?,
            jwt_secret: env::var("JWT_SECRET")?,
            jwt_expiration_hours: env::var("JWT_EXPIRATION_HOURS")
                .unwrap_or_else(|_| "1".to_string())
                .parse()?,
            aws_region: env::var("AWS_REGION").unwrap_or_else(|_| "eu-west-1".to_string()),
            environment: match env::var("ENVIRONMENT")
                .unwrap_or_else(|_| "development".to_string())
                .as_str()
            {
                "production" => Environment::Production,
                _ => Environment::Development,
            },
            log_format: match env::var("LOG_FORMAT")
                .unwrap_or_else(|_| "pretty".to_string())
                .as_str()
            {
                "json" => LogFormat::Json,
                _ => LogFormat::Pretty,
            },
            public_base_url: env::var("PUBLIC_BASE_URL")
                .unwrap_or_else(|_| "http://localhost:8080".to_string()),
            tts_provider: match env::var("TTS_PROVIDER")
                .unwrap_or_else(|_| "polly".to_string())
                .to_lowercase()
                .as_str()
            {
                "openai" => TtsProvider::OpenAi,
                _ => TtsProvider::Polly,
            },
            openai_api_key: env::var("OPENAI_API_KEY").ok(),
            openai_tts_model: env::var("OPENAI_TTS_MODEL").unwrap_or_else(|_| "tts-1".to_string()),
            male_voice_id: env::var("TTS_MALE_VOICE_ID").unwrap_or_else(|_| "Matthew".to_string()),
            female_voice_id: env::var("TTS_FEMALE_VOICE_ID")
                .unwrap_or_else(|_| "Joanna".to_string()),
            recordings_bucket: env::var("RECORDINGS_BUCKET")
                .unwrap_or_else(|_| "reader-recordings".to_string()),
            lines_bucket: env::var("LINES_BUCKET").unwrap_or_else(|_| "lines".to_string()),
            synthesis_batch_size: env::var("SYNTHESIS_BATCH_SIZE")
                .unwrap_or_else(|_| "6".to_string())
                .parse()?,
            tts_cache_enabled: env::var("TTS_CACHE_ENABLED")
                .map(|s| s.to_lowercase() == "true")
                .unwrap_or(false),
        };

        Ok(config)
    }

    pub fn is_development(&self) -> bool {
        self.environment == Environment::Development
    }
}
