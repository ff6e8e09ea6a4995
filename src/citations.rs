//! Citation extraction from grounding metadata.
//!
//! Retrieval-mode responses carry a loosely structured list of grounding
//! "chunks" whose shape varies by backend version: a chunk may expose a
//! document display name under one of several field names, or only the raw
//! retrieved text. This module distills that into a ranked, de-duplicated,
//! human-readable source list.
//!
//! Priority: document names > `[[wiki-links]]` found in retrieved text >
//! `#tags` (appended as secondary, never a replacement) > quoted text
//! previews > a count-only statement. Extraction never fails; a malformed
//! shape degrades to the count-only statement.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

use crate::error::EngineError;

static WIKI_LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[\[([^\[\]]+)\]\]").unwrap());
static HASHTAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?:^|\s)#([A-Za-z0-9][\w/-]*)").unwrap());

const PREVIEW_LEN: usize = 80;

/// What kind of reference a citation entry is.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CitationKind {
    File,
    Link,
    Tag,
    Preview,
}

/// One extracted citation, ordered by extraction priority and de-duplicated
/// by label within a single query result.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Citation {
    pub kind: CitationKind,
    pub label: String,
}

/// One grounding chunk after defensive normalization.
#[derive(Debug, Clone, Default)]
struct GroundingChunk {
    display_name: Option<String>,
    text: Option<String>,
}

/// Render the grounding metadata as a formatted source list, clearly
/// delimited from the answer text. Never fails.
pub fn extract(grounding: Option<&Value>) -> String {
    let chunks = match grounding.map(parse_grounding) {
        Some(Ok(chunks)) => chunks,
        Some(Err(e)) => {
            tracing::debug!("citation extraction fell back: {}", e);
            return format_count_only(count_any_chunks(grounding));
        }
        None => return format_count_only(0),
    };

    let citations = collect_citations(&chunks);
    if citations.is_empty() {
        return format_count_only(chunks.len());
    }

    format_citations(&citations)
}

/// Parse the raw metadata into normalized chunks.
///
/// Returns [`EngineError::MalformedMetadata`] when the chunk list is absent
/// or not a list; the caller degrades to the count-only fallback.
fn parse_grounding(grounding: &Value) -> Result<Vec<GroundingChunk>, EngineError> {
    let raw_chunks = grounding
        .get("groundingChunks")
        .and_then(|c| c.as_array())
        .ok_or(EngineError::MalformedMetadata)?;

    Ok(raw_chunks.iter().map(parse_chunk).collect())
}

/// Normalize one chunk, probing the known shapes in priority order.
fn parse_chunk(chunk: &Value) -> GroundingChunk {
    let context = chunk
        .get("retrievedContext")
        .or_else(|| chunk.get("retrieved_context"));

    let Some(context) = context else {
        return GroundingChunk::default();
    };

    // Display name has moved between fields across backend versions.
    let display_name = ["title", "displayName", "documentName", "uri"]
        .iter()
        .find_map(|field| context.get(field).and_then(|v| v.as_str()))
        .map(str::to_string)
        .filter(|s| !s.trim().is_empty());

    let text = context
        .get("text")
        .and_then(|t| t.as_str())
        .map(str::to_string)
        .filter(|s| !s.trim().is_empty());

    GroundingChunk { display_name, text }
}

/// Apply the fallback chain over the normalized chunks.
fn collect_citations(chunks: &[GroundingChunk]) -> Vec<Citation> {
    let names = dedup(
        chunks
            .iter()
            .filter_map(|c| c.display_name.clone())
            .collect(),
    );

    let texts: Vec<&str> = chunks.iter().filter_map(|c| c.text.as_deref()).collect();

    let mut citations: Vec<Citation> = Vec::new();

    if !names.is_empty() {
        citations.extend(names.into_iter().map(|label| Citation {
            kind: CitationKind::File,
            label,
        }));
    } else {
        let links = dedup(
            texts
                .iter()
                .flat_map(|t| WIKI_LINK.captures_iter(t))
                .map(|cap| cap[1].trim().to_string())
                .collect(),
        );
        citations.extend(links.into_iter().map(|label| Citation {
            kind: CitationKind::Link,
            label,
        }));
    }

    // Tags supplement names or links; they never stand in for them.
    if !citations.is_empty() {
        let tags = dedup(
            texts
                .iter()
                .flat_map(|t| HASHTAG.captures_iter(t))
                .map(|cap| format!("#{}", &cap[1]))
                .collect(),
        );
        citations.extend(tags.into_iter().map(|label| Citation {
            kind: CitationKind::Tag,
            label,
        }));
    }

    if citations.is_empty() {
        let previews = dedup(texts.iter().map(|t| preview_of(t)).collect());
        citations.extend(previews.into_iter().map(|label| Citation {
            kind: CitationKind::Preview,
            label,
        }));
    }

    citations
}

fn preview_of(text: &str) -> String {
    let flattened = text.split_whitespace().collect::<Vec<_>>().join(" ");
    let truncated: String = flattened.chars().take(PREVIEW_LEN).collect();
    if flattened.chars().count() > PREVIEW_LEN {
        format!("\"{}…\"", truncated)
    } else {
        format!("\"{}\"", truncated)
    }
}

fn dedup(labels: Vec<String>) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    labels
        .into_iter()
        .filter(|l| seen.insert(l.clone()))
        .collect()
}

/// Count chunk entries in an otherwise unusable metadata value.
fn count_any_chunks(grounding: Option<&Value>) -> usize {
    grounding
        .and_then(|g| g.get("groundingChunks"))
        .and_then(|c| c.as_array())
        .map(|a| a.len())
        .unwrap_or(0)
}

fn format_citations(citations: &[Citation]) -> String {
    let mut out = format!("\n\n---\nSources ({}):\n", citations.len());
    for citation in citations {
        let line = match citation.kind {
            CitationKind::Link => format!("- [[{}]]\n", citation.label),
            _ => format!("- {}\n", citation.label),
        };
        out.push_str(&line);
    }
    out
}

fn format_count_only(count: usize) -> String {
    if count == 0 {
        "\n\n---\nGrounded in your vault.\n".to_string()
    } else {
        format!(
            "\n\n---\nGrounded in {} vault source{}.\n",
            count,
            if count == 1 { "" } else { "s" }
        )
    }
}
