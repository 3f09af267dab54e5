use super::speech_repository::SpeechRepository;
use crate::domain::synthesis::VoicePreference;
use async_trait::async_trait;
use aws_sdk_polly::{
    types::{Engine, OutputFormat, VoiceId},
    Client as PollyClient,
};
use std::sync::Arc;

/// AWS Polly has a limit of 3000 characters per request. Dialogue lines are
/// far shorter; anything above the limit is rejected rather than split.
const MAX_TEXT_LEN: usize = 3000;

/// AWS Polly implementation of the speech repository
pub struct PollySpeechRepository {
    polly_client: Arc<PollyClient>,
    male_voice: String,
    female_voice: String,
}

impl PollySpeechRepository {
    pub fn new(polly_client: Arc<PollyClient>, male_voice: String, female_voice: String) -> Self {
        Self {
            polly_client,
            male_voice,
            female_voice,
        }
    }

    fn voice_for(&self, voice: VoicePreference) -> &str {
        match voice {
            VoicePreference::MalePresenting => &self.male_voice,
            VoicePreference::FemalePresenting => &self.female_voice,
        }
    }
}

#[async_trait]
impl SpeechRepository for PollySpeechRepository {
    async fn synthesize(&self, text: &str, voice: VoicePreference) -> Result<Vec<u8>, String> {
        if text.len() > MAX_TEXT_LEN {
            return Err(format!(
                "Line text exceeds the {} character synthesis limit",
                MAX_TEXT_LEN
            ));
        }

        let start_time = std::time::Instant::now();
        let voice_name = self.voice_for(voice).to_string();
        let voice_id = VoiceId::from(voice_name.as_str());
        let engine = Engine::Neural;

        tracing::info!(
            voice = %voice,
            voice_id = ?voice_id,
            engine = ?engine,
            output_format = "Mp3",
            text_length = text.len(),
            "Calling AWS Polly synthesize_speech"
        );

        let voice_id_for_error = voice_id.clone();

        let result = self
            .polly_client
            .synthesize_speech()
            .text(text)
            .voice_id(voice_id)
            .output_format(OutputFormat::Mp3)
            .engine(engine.clone())
            .send()
            .await
            .map_err(|e| {
                tracing::error!(
                    error = ?e,
                    error_display = %e,
                    voice = %voice,
                    voice_id = ?voice_id_for_error,
                    engine = ?engine,
                    text_length = text.len(),
                    "AWS Polly synthesize_speech failed"
                );
                format!("AWS Polly error: {:?}", e)
            })?;

        let audio_stream = result.audio_stream.collect().await.map_err(|e| {
            tracing::error!(error = %e, "Failed to collect audio stream from Polly response");
            format!("Failed to read audio stream: {}", e)
        })?;

        let audio_bytes = audio_stream.into_bytes().to_vec();
        tracing::info!(
            provider = "polly",
            voice = %voice,
            latency_ms = start_time.elapsed().as_millis(),
            text_length = text.len(),
            audio_size_bytes = audio_bytes.len(),
            "Speech synthesis completed"
        );

        Ok(audio_bytes)
    }
}
