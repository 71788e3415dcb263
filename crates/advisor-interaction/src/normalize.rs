//! Reply normalization.
//!
//! The single place that decides what a [`RawReply`] means. Extraction tries,
//! in order: the direct text field, the first candidate's first content
//! fragment, then the first output item's content. The first non-blank one
//! wins; a reply with none is unusable, never a blank success.

use crate::transport::RawReply;

/// Candidate finish statuses that mean the provider withheld the answer.
const BLOCKING_FINISH_REASONS: &[&str] = &[
    "SAFETY",
    "BLOCKLIST",
    "PROHIBITED_CONTENT",
    "SPII",
    "IMAGE_SAFETY",
];

/// What a raw reply amounts to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Normalized {
    Text(String),
    Blocked { reason: String },
    Unusable,
}

pub fn normalize(reply: &RawReply) -> Normalized {
    if let Some(reason) = block_reason(reply) {
        return Normalized::Blocked { reason };
    }
    match extract_text(reply) {
        Some(text) => Normalized::Text(text),
        None => Normalized::Unusable,
    }
}

/// The block signal carried by `reply`, if any.
///
/// A prompt-level block wins over a candidate finish status.
pub fn block_reason(reply: &RawReply) -> Option<String> {
    if let Some(reason) = reply.block_reason.as_deref().map(str::trim) {
        if !reason.is_empty() {
            return Some(reason.to_string());
        }
    }

    reply
        .candidates
        .first()
        .and_then(|candidate| candidate.finish_reason.as_deref())
        .filter(|reason| BLOCKING_FINISH_REASONS.contains(reason))
        .map(str::to_string)
}

/// Extracts trimmed text in priority order.
pub fn extract_text(reply: &RawReply) -> Option<String> {
    let direct = reply.text.as_deref();
    let candidate = reply
        .candidates
        .first()
        .and_then(|candidate| candidate.fragments.first())
        .map(String::as_str);
    let output = reply
        .output
        .first()
        .and_then(|item| item.content.as_deref());

    [direct, candidate, output]
        .into_iter()
        .flatten()
        .map(str::trim)
        .find(|text| !text.is_empty())
        .map(str::to_string)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transport::{RawCandidate, RawOutputItem};

    fn candidate(finish_reason: Option<&str>, fragments: &[&str]) -> RawCandidate {
        RawCandidate {
            finish_reason: finish_reason.map(str::to_string),
            fragments: fragments.iter().map(|f| f.to_string()).collect(),
        }
    }

    #[test]
    fn test_direct_text_has_priority() {
        let reply = RawReply {
            text: Some("direct".into()),
            candidates: vec![candidate(Some("STOP"), &["candidate"])],
            output: vec![RawOutputItem {
                content: Some("output".into()),
            }],
            block_reason: None,
        };
        assert_eq!(normalize(&reply), Normalized::Text("direct".into()));
    }

    #[test]
    fn test_blank_direct_text_falls_through_to_candidate() {
        let reply = RawReply {
            text: Some("   ".into()),
            candidates: vec![candidate(Some("STOP"), &["  from candidate \n"])],
            ..RawReply::default()
        };
        assert_eq!(extract_text(&reply).as_deref(), Some("from candidate"));
    }

    #[test]
    fn test_output_items_are_last_resort() {
        let reply = RawReply {
            candidates: vec![candidate(Some("STOP"), &[])],
            output: vec![RawOutputItem {
                content: Some("from output".into()),
            }],
            ..RawReply::default()
        };
        assert_eq!(extract_text(&reply).as_deref(), Some("from output"));
    }

    #[test]
    fn test_only_first_fragment_is_considered() {
        let reply = RawReply {
            candidates: vec![candidate(Some("STOP"), &["", "second part"])],
            ..RawReply::default()
        };
        assert_eq!(normalize(&reply), Normalized::Unusable);
    }

    #[test]
    fn test_empty_candidate_list_is_unusable() {
        assert_eq!(normalize(&RawReply::default()), Normalized::Unusable);
    }

    #[test]
    fn test_prompt_block_reason() {
        let reply = RawReply::blocked("SAFETY");
        assert_eq!(
            normalize(&reply),
            Normalized::Blocked {
                reason: "SAFETY".into()
            }
        );
    }

    #[test]
    fn test_candidate_safety_finish_blocks_even_with_text() {
        let reply = RawReply {
            candidates: vec![candidate(Some("SAFETY"), &["partial"])],
            ..RawReply::default()
        };
        assert!(matches!(normalize(&reply), Normalized::Blocked { .. }));
    }

    #[test]
    fn test_max_tokens_finish_is_not_a_block() {
        let reply = RawReply {
            candidates: vec![candidate(Some("MAX_TOKENS"), &["truncated answer"])],
            ..RawReply::default()
        };
        assert_eq!(
            normalize(&reply),
            Normalized::Text("truncated answer".into())
        );
    }
}
