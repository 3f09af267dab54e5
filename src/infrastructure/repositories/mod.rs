pub mod line_repository;
pub mod openai_speech_repository;
pub mod polly_speech_repository;
pub mod s3_storage_repository;
pub mod script_repository;
pub mod share_session_repository;
pub mod speech_repository;
pub mod storage_repository;

pub use line_repository::LineRepository;
pub use openai_speech_repository::OpenAiSpeechRepository;
pub use polly_speech_repository::PollySpeechRepository;
pub use s3_storage_repository::S3StorageRepository;
pub use script_repository::ScriptRepository;
pub use share_session_repository::ShareSessionRepository;
pub use speech_repository::SpeechRepository;
pub use storage_repository::{parse_object_url, StorageRepository};
