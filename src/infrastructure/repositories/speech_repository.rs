use crate::domain::synthesis::VoicePreference;
use async_trait::async_trait;

/// Repository for speech synthesis operations.
/// Abstracts the underlying TTS provider (AWS Polly, OpenAI, etc.)
///
/// Implementations are responsible for:
/// - Enforcing provider-specific text length limits
/// - Mapping the requested voice preference to a provider voice identity
#[async_trait]
pub trait SpeechRepository: Send + Sync {
    /// Synthesize one dialogue line to speech.
    ///
    /// Returns audio data ready for playback (MP3 format).
    ///
    /// # Arguments
    /// * `text` - The line text to synthesize
    /// * `voice` - The requested voice timbre
    ///
    /// # Errors
    /// Returns error if synthesis fails or provider is unavailable
    async fn synthesize(&self, text: &str, voice: VoicePreference) -> Result<Vec<u8>, String>;
}
