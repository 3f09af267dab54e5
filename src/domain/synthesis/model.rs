use base64::Engine as _;
use serde::{Deserialize, Serialize};

/// Lifecycle of a synthesis job.
///
/// `pending -> processing -> ready -> complete`, where `ready` means every
/// line has playable (ephemeral) audio and `complete` means every line has
/// also been persisted to durable storage. Any synthesis failure lands the
/// job in terminal `error`, keeping whatever per-line results already exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JobStatus {
    Pending,
    Processing,
    Ready,
    Complete,
    Error,
}

/// Per-line synthesis result.
///
/// Once a line has been attempted, at least one of `temp_audio` /
/// `durable_url` is set; both coexist while the durable upload is in flight.
#[derive(Debug, Clone)]
pub struct JobLineAudio {
    pub line_id: String,
    pub temp_audio: Option<Vec<u8>>,
    pub durable_url: Option<String>,
}

impl JobLineAudio {
    pub fn new(line_id: String) -> Self {
        Self {
            line_id,
            temp_audio: None,
            durable_url: None,
        }
    }

    /// Best available URL: durable if uploaded, else the ephemeral bytes as
    /// an inline data URL the client can play immediately.
    pub fn best_url(&self) -> Option<String> {
        if let Some(url) = &self.durable_url {
            return Some(url.clone());
        }
        self.temp_audio.as_deref().map(to_data_url)
    }
}

/// One asynchronous speech-synthesis batch and its evolving result
#[derive(Debug, Clone)]
pub struct Job {
    pub id: String,
    pub status: JobStatus,
    pub lines: Vec<JobLineAudio>,
    pub error: Option<String>,
}

impl Job {
    /// Create a pending job with one empty slot per requested line
    pub fn new(id: String, line_ids: Vec<String>) -> Self {
        Self {
            id,
            status: JobStatus::Pending,
            lines: line_ids.into_iter().map(JobLineAudio::new).collect(),
            error: None,
        }
    }

    pub fn line_mut(&mut self, line_id: &str) -> Option<&mut JobLineAudio> {
        self.lines.iter_mut().find(|l| l.line_id == line_id)
    }

    pub fn all_lines_have_audio(&self) -> bool {
        self.lines.iter().all(|l| l.temp_audio.is_some())
    }

    pub fn all_lines_durable(&self) -> bool {
        self.lines.iter().all(|l| l.durable_url.is_some())
    }
}

fn to_data_url(bytes: &[u8]) -> String {
    format!(
        "data:audio/mpeg;base64,{}",
        base64::engine::general_purpose::STANDARD.encode(bytes)
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_best_url_prefers_durable() {
        let mut line = JobLineAudio::new("l1".to_string());
        assert_eq!(line.best_url(), None);

        line.temp_audio = Some(vec![1, 2, 3]);
        let ephemeral = line.best_url().unwrap();
        assert!(ephemeral.starts_with("data:audio/mpeg;base64,"));

        line.durable_url = Some("https://cdn.example/l1.mp3".to_string());
        assert_eq!(line.best_url().unwrap(), "https://cdn.example/l1.mp3");
    }

    #[test]
    fn test_data_url_encoding() {
        assert_eq!(to_data_url(b"abc"), "data:audio/mpeg;base64,YWJj");
    }

    #[test]
    fn test_new_job_has_empty_slots() {
        let job = Job::new("job_1".to_string(), vec!["a".to_string(), "b".to_string()]);
        assert_eq!(job.status, JobStatus::Pending);
        assert_eq!(job.lines.len(), 2);
        assert!(!job.all_lines_have_audio());
        assert!(!job.all_lines_durable());
    }

    #[test]
    fn test_status_serializes_lowercase() {
        assert_eq!(
            serde_json::to_string(&JobStatus::Processing).unwrap(),
            r#""processing""#
        );
        assert_eq!(
            serde_json::to_string(&JobStatus::Complete).unwrap(),
            r#""complete""#
        );
    }
}
