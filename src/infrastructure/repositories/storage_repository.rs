use async_trait::async_trait;

/// Repository for blob storage operations.
/// Abstracts the underlying store (S3 in production, in-memory in tests).
///
/// Objects live in named buckets under `/`-separated keys. Uploads to an
/// existing key overwrite it, so retried uploads are safe.
#[async_trait]
pub trait StorageRepository: Send + Sync {
    /// Upload an object, overwriting any existing object at the same key
    async fn upload(
        &self,
        bucket: &str,
        key: &str,
        bytes: Vec<u8>,
        content_type: &str,
    ) -> Result<(), String>;

    /// Download an object's bytes
    async fn download(&self, bucket: &str, key: &str) -> Result<Vec<u8>, String>;

    /// Delete an object
    async fn delete(&self, bucket: &str, key: &str) -> Result<(), String>;

    /// Publicly reachable URL for an object
    fn public_url(&self, bucket: &str, key: &str) -> String;
}

/// Resolve a public object URL back to its `(bucket, key)` location.
///
/// Accepts virtual-hosted-style S3 URLs (`https://<bucket>.s3.<region>.amazonaws.com/<key>`).
/// Returns `None` for anything else, so callers can reject URLs that do not
/// point at storage this service controls.
pub fn parse_object_url(url: &str) -> Option<(String, String)> {
    let pattern = regex::Regex::new(r"^https://(.+?)\.s3\.[a-z0-9-]+\.amazonaws\.com/(.+)$")
        .expect("invalid object URL pattern");
    let captures = pattern.captures(url)?;

    let bucket = captures.get(1)?.as_str().to_string();
    let key = captures
        .get(2)?
        .as_str()
        .split('/')
        .map(|segment| urlencoding::decode(segment).map(|s| s.into_owned()))
        .collect::<Result<Vec<_>, _>>()
        .ok()?
        .join("/");

    if key.is_empty() {
        return None;
    }

    Some((bucket, key))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_parse_object_url_extracts_bucket_and_key() {
        let url = "https://reader-recordings.s3.eu-west-1.amazonaws.com/reader/abc/line-1.wav";
        let (bucket, key) = parse_object_url(url).unwrap();
        assert_eq!(bucket, "reader-recordings");
        assert_eq!(key, "reader/abc/line-1.wav");
    }

    #[test]
    fn test_parse_object_url_decodes_segments() {
        let url = "https://lines.s3.us-east-1.amazonaws.com/owner/my%20scene/l1.wav";
        let (bucket, key) = parse_object_url(url).unwrap();
        assert_eq!(bucket, "lines");
        assert_eq!(key, "owner/my scene/l1.wav");
    }

    #[test]
    fn test_parse_object_url_rejects_foreign_urls() {
        assert_eq!(parse_object_url("https://example.com/audio.wav"), None);
        assert_eq!(parse_object_url("not a url"), None);
        assert_eq!(
            parse_object_url("https://bucket.s3.eu-west-1.amazonaws.com/"),
            None
        );
    }
}
