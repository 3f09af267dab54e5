use super::model::ScriptLine;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::cmp::Ordering;
use std::collections::HashMap;
use uuid::Uuid;

/// A cue line voiced by the scene owner, played back as reference audio
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActorLine {
    pub line_id: Uuid,
    pub index: i32,
    pub text: String,
    pub audio_url: String,
}

/// A line the remote reader is asked to record
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReaderLine {
    pub line_id: Uuid,
    pub index: i32,
    pub text: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub audio_url: Option<String>,
}

/// Ordered, versioned view of a script's lines.
///
/// `fingerprint` digests the full ordered content (stage directions
/// included), so any structural or textual change is detectable at once.
/// `line_markers` carries each line's last-modified marker for the
/// optimistic-concurrency checks at commit time.
#[derive(Debug, Clone)]
pub struct SceneSnapshot {
    pub fingerprint: String,
    pub actor_lines: Vec<ActorLine>,
    pub reader_lines: Vec<ReaderLine>,
    pub line_markers: HashMap<Uuid, DateTime<Utc>>,
}

/// Build the canonical snapshot of a scene from its stored lines.
///
/// This is the single source of truth for scene layout; client-supplied
/// layouts are never trusted for freshness decisions.
pub fn build_snapshot(mut lines: Vec<ScriptLine>) -> SceneSnapshot {
    lines.sort_by(compare_lines);

    let fingerprint = compute_fingerprint(&lines);

    let line_markers = lines
        .iter()
        .filter_map(|line| line.updated_at.map(|at| (line.id, at)))
        .collect();

    let mut actor_lines = Vec::new();
    let mut reader_lines = Vec::new();

    for line in &lines {
        if line.is_stage_direction {
            continue;
        }
        let index = line.order_index.unwrap_or(0);

        if line.is_cue_line {
            actor_lines.push(ActorLine {
                line_id: line.id,
                index,
                text: line.raw_text.clone(),
                audio_url: line.audio_url.clone().unwrap_or_default(),
            });
        } else {
            reader_lines.push(ReaderLine {
                line_id: line.id,
                index,
                text: line.raw_text.clone(),
                audio_url: None,
            });
        }
    }

    SceneSnapshot {
        fingerprint,
        actor_lines,
        reader_lines,
        line_markers,
    }
}

/// `order_index` ascending with NULLs last, ties broken by line id.
/// Together with the id this yields a total order over a script's lines.
fn compare_lines(a: &ScriptLine, b: &ScriptLine) -> Ordering {
    match (a.order_index, b.order_index) {
        (Some(x), Some(y)) => x.cmp(&y).then_with(|| a.id.cmp(&b.id)),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => a.id.cmp(&b.id),
    }
}

/// Digest over the ordered (id, order_index, text) tuples of ALL lines, so
/// insertions, removals, and reorderings change the fingerprint along with
/// text edits.
fn compute_fingerprint(sorted_lines: &[ScriptLine]) -> String {
    let digest_input: Vec<_> = sorted_lines
        .iter()
        .map(|line| {
            serde_json::json!({
                "id": line.id,
                "idx": line.order_index,
                "text": line.raw_text,
            })
        })
        .collect();

    let payload = serde_json::to_vec(&digest_input).expect("fingerprint payload is serializable");

    let mut hasher = Sha256::new();
    hasher.update(&payload);
    hasher
        .finalize()
        .iter()
        .map(|b| format!("{:02x}", b))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn line(n: u128, order_index: Option<i32>, text: &str) -> ScriptLine {
        ScriptLine {
            id: Uuid::from_u128(n),
            script_id: Uuid::from_u128(999),
            raw_text: text.to_string(),
            order_index,
            is_stage_direction: false,
            is_cue_line: false,
            audio_url: None,
            updated_at: Some(
                DateTime::parse_from_rfc3339("2026-01-01T00:00:00Z")
                    .unwrap()
                    .with_timezone(&Utc),
            ),
        }
    }

    fn cue(n: u128, order_index: Option<i32>, text: &str) -> ScriptLine {
        ScriptLine {
            is_cue_line: true,
            audio_url: Some(format!("https://cdn.test/lines/{}.wav", n)),
            ..line(n, order_index, text)
        }
    }

    fn stage_direction(n: u128, order_index: Option<i32>, text: &str) -> ScriptLine {
        ScriptLine {
            is_stage_direction: true,
            ..line(n, order_index, text)
        }
    }

    #[test]
    fn test_lines_sort_by_order_index_with_nulls_last() {
        let snapshot = build_snapshot(vec![
            line(3, None, "no index"),
            line(2, Some(2), "second"),
            line(1, Some(1), "first"),
        ]);

        let ids: Vec<Uuid> = snapshot.reader_lines.iter().map(|l| l.line_id).collect();
        assert_eq!(
            ids,
            vec![Uuid::from_u128(1), Uuid::from_u128(2), Uuid::from_u128(3)]
        );
    }

    #[test]
    fn test_order_ties_break_by_id() {
        let snapshot = build_snapshot(vec![
            line(7, Some(1), "b"),
            line(4, Some(1), "a"),
        ]);

        let ids: Vec<Uuid> = snapshot.reader_lines.iter().map(|l| l.line_id).collect();
        assert_eq!(ids, vec![Uuid::from_u128(4), Uuid::from_u128(7)]);
    }

    #[test]
    fn test_partition_into_actor_and_reader_lines() {
        let snapshot = build_snapshot(vec![
            cue(1, Some(1), "To be or not to be"),
            line(2, Some(2), "That is the question"),
            stage_direction(3, Some(3), "(exit stage left)"),
        ]);

        assert_eq!(snapshot.actor_lines.len(), 1);
        assert_eq!(snapshot.actor_lines[0].line_id, Uuid::from_u128(1));
        assert_eq!(
            snapshot.actor_lines[0].audio_url,
            "https://cdn.test/lines/1.wav"
        );

        assert_eq!(snapshot.reader_lines.len(), 1);
        assert_eq!(snapshot.reader_lines[0].line_id, Uuid::from_u128(2));
        assert_eq!(snapshot.reader_lines[0].audio_url, None);
    }

    #[test]
    fn test_fingerprint_is_deterministic() {
        let a = build_snapshot(vec![line(1, Some(1), "Hi"), line(2, Some(2), "Bye")]);
        // Same content presented in a different storage order
        let b = build_snapshot(vec![line(2, Some(2), "Bye"), line(1, Some(1), "Hi")]);
        assert_eq!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn test_fingerprint_changes_on_text_edit() {
        let a = build_snapshot(vec![line(1, Some(1), "Hi")]);
        let b = build_snapshot(vec![line(1, Some(1), "Hi there")]);
        assert_ne!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn test_fingerprint_changes_on_reorder() {
        let a = build_snapshot(vec![line(1, Some(1), "Hi"), line(2, Some(2), "Bye")]);
        let b = build_snapshot(vec![line(1, Some(2), "Hi"), line(2, Some(1), "Bye")]);
        assert_ne!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn test_fingerprint_sees_stage_direction_changes() {
        let a = build_snapshot(vec![line(1, Some(1), "Hi")]);
        let b = build_snapshot(vec![
            line(1, Some(1), "Hi"),
            stage_direction(2, Some(2), "(a pause)"),
        ]);
        // Stage directions are excluded from the partitions but still
        // fingerprinted, so adding one invalidates old snapshots.
        assert_eq!(b.actor_lines.len() + b.reader_lines.len(), 1);
        assert_ne!(a.fingerprint, b.fingerprint);
    }

    #[test]
    fn test_markers_skip_lines_without_updated_at() {
        let mut untouched = line(2, Some(2), "Bye");
        untouched.updated_at = None;

        let snapshot = build_snapshot(vec![line(1, Some(1), "Hi"), untouched]);

        assert_eq!(snapshot.line_markers.len(), 1);
        assert!(snapshot.line_markers.contains_key(&Uuid::from_u128(1)));
    }
}
