use super::error::SynthesisServiceError;
use super::job_store::JobStore;
use super::model::{Job, JobStatus};
use super::{JobStatusResponse, StartSynthesisRequest, SynthesisLine};
use crate::infrastructure::repositories::{SpeechRepository, StorageRepository};
use async_trait::async_trait;
use futures::future::join_all;
use moka::future::Cache;
use std::sync::Arc;
use std::time::Duration;
use uuid::Uuid;

pub struct SynthesisService {
    runner: JobRunner,
}

impl SynthesisService {
    pub fn new(
        job_store: Arc<JobStore>,
        speech_repo: Arc<dyn SpeechRepository>,
        storage_repo: Arc<dyn StorageRepository>,
        lines_bucket: String,
        batch_size: usize,
        cache_enabled: bool,
    ) -> Self {
        // Identical (voice, text) lines show up across retries and across
        // scenes that share stock dialogue; cache the vendor audio if enabled.
        let cache = if cache_enabled {
            Some(
                Cache::builder()
                    .max_capacity(500)
                    .time_to_idle(Duration::from_secs(30 * 60))
                    .build(),
            )
        } else {
            None
        };

        Self {
            runner: JobRunner {
                job_store,
                speech_repo,
                storage_repo,
                lines_bucket,
                batch_size: batch_size.max(1),
                cache,
            },
        }
    }
}

#[async_trait]
pub trait SynthesisServiceApi: Send + Sync {
    /// Validate a synthesis request and start its background job.
    ///
    /// Returns the job id immediately; all synthesis work happens
    /// out-of-band and is observed through `job_status`.
    async fn start_batch(
        &self,
        request: StartSynthesisRequest,
    ) -> Result<String, SynthesisServiceError>;

    /// Read-only projection of a job's current state for polling clients.
    /// Unknown ids report an `error` status instead of failing.
    fn job_status(&self, job_id: &str) -> JobStatusResponse;
}

#[async_trait]
impl SynthesisServiceApi for SynthesisService {
    async fn start_batch(
        &self,
        request: StartSynthesisRequest,
    ) -> Result<String, SynthesisServiceError> {
        validate_request(&request)?;

        let job_id = format!("job_{}", Uuid::new_v4());
        let line_ids = request.lines.iter().map(|l| l.line_id.clone()).collect();
        self.runner.job_store.insert(Job::new(job_id.clone(), line_ids));

        tracing::info!(
            job_id = %job_id,
            scene_id = %request.scene_id,
            scene_title = %request.scene_title,
            total_lines = request.lines.len(),
            "Starting reader audio job"
        );

        // Fire-and-forget: the request returns as soon as the job exists.
        // Jobs die with the process, which is acceptable for this store.
        let runner = self.runner.clone();
        let spawned_job_id = job_id.clone();
        tokio::spawn(async move {
            runner.process_job(spawned_job_id, request).await;
        });

        Ok(job_id)
    }

    fn job_status(&self, job_id: &str) -> JobStatusResponse {
        match self.runner.job_store.get(job_id) {
            Some(job) => JobStatusResponse {
                status: job.status,
                audio: job
                    .lines
                    .iter()
                    .filter_map(|l| l.best_url().map(|url| (l.line_id.clone(), url)))
                    .collect(),
                error: job.error,
            },
            None => JobStatusResponse {
                status: JobStatus::Error,
                audio: vec![],
                error: Some("Job not found.".to_string()),
            },
        }
    }
}

fn validate_request(request: &StartSynthesisRequest) -> Result<(), SynthesisServiceError> {
    if request.scene_id.trim().is_empty() || request.scene_title.trim().is_empty() {
        return Err(SynthesisServiceError::Invalid(
            "sceneTitle and sceneId are required.".to_string(),
        ));
    }

    if request.lines.is_empty() {
        return Err(SynthesisServiceError::Invalid(
            "lines array is required.".to_string(),
        ));
    }

    let mut seen = std::collections::HashSet::new();
    for line in &request.lines {
        if line.line_id.trim().is_empty() {
            return Err(SynthesisServiceError::Invalid(
                "Every line needs a lineId.".to_string(),
            ));
        }
        if !seen.insert(line.line_id.as_str()) {
            return Err(SynthesisServiceError::Invalid(format!(
                "Duplicate lineId {} in request.",
                line.line_id
            )));
        }
        if line.text.trim().is_empty() {
            return Err(SynthesisServiceError::Invalid(format!(
                "Line {} has no text to synthesize.",
                line.line_id
            )));
        }
    }

    Ok(())
}

/// Everything a background job needs, detached from the service so the
/// spawned task owns its own handles.
#[derive(Clone)]
struct JobRunner {
    job_store: Arc<JobStore>,
    speech_repo: Arc<dyn SpeechRepository>,
    storage_repo: Arc<dyn StorageRepository>,
    lines_bucket: String,
    batch_size: usize,
    cache: Option<Cache<String, Vec<u8>>>,
}

impl JobRunner {
    async fn process_job(&self, job_id: String, request: StartSynthesisRequest) {
        self.job_store.with_job(&job_id, |job| {
            job.status = JobStatus::Processing;
        });

        // Lines run in fixed-size concurrent batches: enough overlap to hide
        // vendor latency, bounded so one job cannot flood the provider.
        for chunk in request.lines.chunks(self.batch_size) {
            join_all(
                chunk
                    .iter()
                    .map(|line| self.synthesize_line(&job_id, &request.scene_id, line)),
            )
            .await;

            let errored = self
                .job_store
                .get(&job_id)
                .map(|job| job.status == JobStatus::Error)
                .unwrap_or(true);
            if errored {
                tracing::warn!(
                    job_id = %job_id,
                    "Job errored; not dispatching further batches"
                );
                break;
            }
        }

        self.job_store.with_job(&job_id, |job| {
            if job.status == JobStatus::Error {
                return;
            }
            if job.all_lines_have_audio() {
                // Uploads may already have beaten us here
                job.status = if job.all_lines_durable() {
                    JobStatus::Complete
                } else {
                    JobStatus::Ready
                };
                tracing::info!(
                    job_id = %job.id,
                    status = ?job.status,
                    total_lines = job.lines.len(),
                    "All lines synthesized"
                );
            }
        });
    }

    async fn synthesize_line(&self, job_id: &str, scene_id: &str, line: &SynthesisLine) {
        let cache_key = format!("{}:{}", line.voice, line.text);

        let cached = match &self.cache {
            Some(cache) => cache.get(&cache_key).await,
            None => None,
        };

        let audio = match cached {
            Some(bytes) => {
                tracing::debug!(job_id = %job_id, line_id = %line.line_id, "Synthesis cache hit");
                bytes
            }
            None => {
                let started = std::time::Instant::now();
                match self.speech_repo.synthesize(&line.text, line.voice).await {
                    Ok(bytes) => {
                        tracing::info!(
                            job_id = %job_id,
                            line_id = %line.line_id,
                            voice = %line.voice,
                            elapsed_ms = started.elapsed().as_millis(),
                            audio_size = bytes.len(),
                            "Line synthesized"
                        );
                        if let Some(cache) = &self.cache {
                            cache.insert(cache_key, bytes.clone()).await;
                        }
                        bytes
                    }
                    Err(e) => {
                        tracing::error!(
                            job_id = %job_id,
                            line_id = %line.line_id,
                            voice = %line.voice,
                            elapsed_ms = started.elapsed().as_millis(),
                            error = %e,
                            "Line synthesis failed"
                        );
                        // Terminal for the job, but siblings already in
                        // flight still land their results.
                        self.job_store.with_job(job_id, |job| {
                            job.status = JobStatus::Error;
                            job.error = Some("Failed to generate reader audio.".to_string());
                        });
                        return;
                    }
                }
            }
        };

        // Phase 1: ephemeral audio, playable as soon as the poller sees it
        self.job_store.with_job(job_id, |job| {
            if let Some(slot) = job.line_mut(&line.line_id) {
                slot.temp_audio = Some(audio.clone());
            }
        });

        // Phase 2: persist to durable storage without holding the job up
        self.spawn_upload(job_id.to_string(), scene_id.to_string(), line.line_id.clone(), audio);
    }

    fn spawn_upload(&self, job_id: String, scene_id: String, line_id: String, audio: Vec<u8>) {
        let runner = self.clone();
        tokio::spawn(async move {
            // Deterministic key: retried uploads overwrite, never duplicate
            let key = format!("tts/{}/{}.mp3", scene_id, line_id);
            match runner
                .storage_repo
                .upload(&runner.lines_bucket, &key, audio, "audio/mpeg")
                .await
            {
                Ok(()) => {
                    let url = runner.storage_repo.public_url(&runner.lines_bucket, &key);
                    runner.job_store.with_job(&job_id, |job| {
                        if let Some(slot) = job.line_mut(&line_id) {
                            slot.durable_url = Some(url);
                        }
                        if job.status == JobStatus::Ready && job.all_lines_durable() {
                            job.status = JobStatus::Complete;
                            tracing::info!(job_id = %job.id, "All uploads finished");
                        }
                    });
                }
                Err(e) => {
                    // Ephemeral playback stays valid, so a failed upload is
                    // logged and swallowed instead of failing the job.
                    tracing::warn!(
                        job_id = %job_id,
                        line_id = %line_id,
                        error = %e,
                        "Durable upload failed; keeping ephemeral audio"
                    );
                }
            }
        });
    }
}
