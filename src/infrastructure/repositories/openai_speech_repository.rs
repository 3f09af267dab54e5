use super::speech_repository::SpeechRepository;
use crate::domain::synthesis::VoicePreference;
use async_openai::{
    config::OpenAIConfig,
    types::{CreateSpeechRequest, SpeechModel, Voice},
    Client,
};
use async_trait::async_trait;
use std::sync::Arc;

/// OpenAI has a limit of 4096 characters per request. Dialogue lines are far
/// shorter; anything above the limit is rejected rather than split.
const MAX_TEXT_LEN: usize = 4096;

/// OpenAI TTS implementation of the speech repository
pub struct OpenAiSpeechRepository {
    client: Arc<Client<OpenAIConfig>>,
    model: String,
}

impl OpenAiSpeechRepository {
    pub fn new(client: Arc<Client<OpenAIConfig>>, model: String) -> Self {
        Self { client, model }
    }

    /// Select the OpenAI voice matching the requested timbre
    fn voice_for(voice: VoicePreference) -> Voice {
        match voice {
            VoicePreference::MalePresenting => Voice::Onyx,
            VoicePreference::FemalePresenting => Voice::Nova,
        }
    }
}

#[async_trait]
impl SpeechRepository for OpenAiSpeechRepository {
    async fn synthesize(&self, text: &str, voice: VoicePreference) -> Result<Vec<u8>, String> {
        if text.len() > MAX_TEXT_LEN {
            return Err(format!(
                "Line text exceeds the {} character synthesis limit",
                MAX_TEXT_LEN
            ));
        }

        let start_time = std::time::Instant::now();

        tracing::info!(
            model = %self.model,
            voice = %voice,
            text_length = text.len(),
            "Calling OpenAI TTS API"
        );

        let model = match self.model.as_str() {
            "tts-1" => SpeechModel::Tts1,
            "tts-1-hd" => SpeechModel::Tts1Hd,
            other => SpeechModel::Other(other.to_string()),
        };

        let request = CreateSpeechRequest {
            model,
            input: text.to_string(),
            voice: Self::voice_for(voice),
            response_format: None, // Defaults to MP3
            speed: None,           // Defaults to 1.0
        };

        let response = self.client.audio().speech(request).await.map_err(|e| {
            tracing::error!(
                error = %e,
                model = %self.model,
                voice = %voice,
                text_length = text.len(),
                "OpenAI TTS API call failed"
            );
            format!("OpenAI TTS error: {}", e)
        })?;

        let audio_bytes = response.bytes.to_vec();
        tracing::info!(
            provider = "openai",
            model = %self.model,
            voice = %voice,
            latency_ms = start_time.elapsed().as_millis(),
            text_length = text.len(),
            audio_size_bytes = audio_bytes.len(),
            "Speech synthesis completed"
        );

        Ok(audio_bytes)
    }
}
