// Integration tests for the reader audio job engine, driven through the
// crate's public API with in-memory capability implementations. No database
// or vendor credentials required.

use async_trait::async_trait;
use scenereader_backend::domain::synthesis::{
    JobStatus, JobStore, LineRole, StartSynthesisRequest, SynthesisLine, SynthesisService,
    SynthesisServiceApi, VoicePreference,
};
use scenereader_backend::infrastructure::repositories::{SpeechRepository, StorageRepository};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

struct EchoSpeechRepository;

#[async_trait]
impl SpeechRepository for EchoSpeechRepository {
    async fn synthesize(&self, text: &str, _voice: VoicePreference) -> Result<Vec<u8>, String> {
        // Small artificial delay so batches genuinely overlap
        tokio::time::sleep(Duration::from_millis(5)).await;
        Ok(format!("audio:{}", text).into_bytes())
    }
}

#[derive(Default)]
struct MemoryStorageRepository {
    objects: Mutex<HashMap<(String, String), Vec<u8>>>,
}

#[async_trait]
impl StorageRepository for MemoryStorageRepository {
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        _content_type: &str,
    ) -> Result<(), String> {
        self.objects
            .lock()
            .unwrap()
            .insert((bucket.to_string(), key.to_string()), bytes);
        Ok(())
    }

    async fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String> {
        self.objects
            .lock()
            .unwrap()
            .get(&(bucket.to_string(), key.to_string()))
            .cloned()
            .ok_or_else(|| "object not found".to_string())
    }

    async fn delete(&self, bucket: &str, key: &str) -> Result<(), String> {
        self.objects
            .lock()
            .unwrap()
            .remove(&(bucket.to_string(), key.to_string()));
        Ok(())
    }

    fn public_url(&self, bucket: &str, key: &str) -> String {
        format!("https://storage.test/{}/{}", bucket, key)
    }
}

fn service() -> (SynthesisService, Arc<JobStore>, Arc<MemoryStorageRepository>) {
    let store = Arc::new(JobStore::new());
    let storage = Arc::new(MemoryStorageRepository::default());
    let service = SynthesisService::new(
        store.clone(),
        Arc::new(EchoSpeechRepository),
        storage.clone(),
        "lines".to_string(),
        6,
        false,
    );
    (service, store, storage)
}

fn request(count: usize) -> StartSynthesisRequest {
    StartSynthesisRequest {
        scene_id: "scene-42".to_string(),
        scene_title: "Balcony Scene".to_string(),
        lines: (0..count)
            .map(|i| SynthesisLine {
                line_id: format!("line-{}", i),
                role: LineRole::Reader,
                text: format!("Line number {}", i),
                voice: if i % 2 == 0 {
                    VoicePreference::FemalePresenting
                } else {
                    VoicePreference::MalePresenting
                },
            })
            .collect(),
    }
}

async fn wait_for_status(
    service: &SynthesisService,
    job_id: &str,
    status: JobStatus,
) -> scenereader_backend::domain::synthesis::JobStatusResponse {
    tokio::time::timeout(Duration::from_secs(10), async {
        loop {
            let response = service.job_status(job_id);
            if response.status == status {
                return response;
            }
            tokio::time::sleep(Duration::from_millis(10)).await;
        }
    })
    .await
    .expect("timed out waiting for job status")
}

#[tokio::test]
async fn job_with_more_lines_than_one_batch_reaches_complete() {
    let (service, _store, storage) = service();

    // 14 lines across 3 batches of 6
    let job_id = service.start_batch(request(14)).await.unwrap();

    let response = wait_for_status(&service, &job_id, JobStatus::Complete).await;

    assert_eq!(response.audio.len(), 14);
    assert!(response.error.is_none());
    for (line_id, url) in &response.audio {
        assert_eq!(
            url,
            &format!("https://storage.test/lines/tts/scene-42/{}.mp3", line_id)
        );
    }
    assert_eq!(storage.objects.lock().unwrap().len(), 14);
}

#[tokio::test]
async fn status_payload_serializes_as_line_url_pairs() {
    let (service, _store, _storage) = service();

    let job_id = service.start_batch(request(1)).await.unwrap();
    let response = wait_for_status(&service, &job_id, JobStatus::Complete).await;

    let json = serde_json::to_value(&response).unwrap();
    assert_eq!(json["status"], "complete");
    assert_eq!(json["audio"][0][0], "line-0");
    assert_eq!(
        json["audio"][0][1],
        "https://storage.test/lines/tts/scene-42/line-0.mp3"
    );
}

#[tokio::test]
async fn unknown_job_polls_as_error_without_failing() {
    let (service, _store, _storage) = service();

    let response = service.job_status("job_does_not_exist");

    assert_eq!(response.status, JobStatus::Error);
    assert!(response.audio.is_empty());
    assert_eq!(response.error.as_deref(), Some("Job not found."));
}

#[tokio::test]
async fn concurrent_jobs_do_not_interfere() {
    let (service, _store, _storage) = service();

    let job_a = service.start_batch(request(3)).await.unwrap();
    let job_b = service.start_batch(request(5)).await.unwrap();
    assert_ne!(job_a, job_b);

    let a = wait_for_status(&service, &job_a, JobStatus::Complete).await;
    let b = wait_for_status(&service, &job_b, JobStatus::Complete).await;

    assert_eq!(a.audio.len(), 3);
    assert_eq!(b.audio.len(), 5);
}
