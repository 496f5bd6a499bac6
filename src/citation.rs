//! Citation rewriting for summaries and answers returned by Discovery Engine.
//!
//! The service marks supporting documents with bracketed indices such as `[1]`
//! or `[2, 3]`, 1-based into the reference list that accompanies the text.
//! Rendering is best effort: malformed markers and dangling indices never
//! fail, they fall back to the original text.

use std::collections::HashSet;

use crate::convert::{AnswerPayload, Reference};

const GCS_SCHEME: &str = "gs://";
const GCS_BROWSER_PREFIX: &str = "https://storage.cloud.google.com/";

/// Number of references listed by [`RenderMode::TrailingList`] unless configured otherwise.
pub const DEFAULT_LIST_LIMIT: usize = 5;

/// How citation markers are turned into links.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RenderMode {
    /// Each resolved index becomes a markdown link `[k](uri)` in place.
    #[default]
    Inline,
    /// The body is left alone and a `References` section listing the first
    /// `limit` references is appended.
    TrailingList { limit: usize },
    /// Each marker becomes `[` + the resolved links back to back + `]`.
    BareLinks,
}

/// What to do with a well-formed marker none of whose indices resolve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnresolvedMarkers {
    /// Leave the marker as literal text.
    #[default]
    Keep,
    /// Remove the marker from the output.
    Drop,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub mode: RenderMode,
    pub unresolved: UnresolvedMarkers,
}

#[derive(Debug, Clone, Copy)]
enum LinkStyle {
    Markdown,
    Bare,
}

/// Rewrites a `gs://` URI to its Cloud Storage browser URL. Anything else is
/// returned unchanged.
pub fn normalize_uri(uri: &str) -> String {
    match uri.strip_prefix(GCS_SCHEME) {
        Some(rest) => format!("{GCS_BROWSER_PREFIX}{rest}"),
        None => uri.to_string(),
    }
}

/// Renders a payload for display. A payload without a references field is
/// returned as-is.
pub fn render(payload: &AnswerPayload, options: &RenderOptions) -> String {
    match payload.references.as_deref() {
        Some(references) => rewrite_references(&payload.text, references, options),
        None => {
            tracing::debug!("payload has no references, rendering text unchanged");
            payload.text.clone()
        }
    }
}

pub fn rewrite_references(
    text: &str,
    references: &[Reference],
    options: &RenderOptions,
) -> String {
    if references.is_empty() {
        return text.to_string();
    }

    match options.mode {
        RenderMode::Inline => {
            replace_markers(text, references, LinkStyle::Markdown, options.unresolved)
        }
        RenderMode::BareLinks => {
            replace_markers(text, references, LinkStyle::Bare, options.unresolved)
        }
        RenderMode::TrailingList { limit } => append_reference_list(text, references, limit),
    }
}

fn replace_markers(
    text: &str,
    references: &[Reference],
    style: LinkStyle,
    unresolved: UnresolvedMarkers,
) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(open) = rest.find('[') {
        out.push_str(&rest[..open]);
        let after = &rest[open + 1..];

        let Some(close) = after.find(']') else {
            out.push_str(&rest[open..]);
            return out;
        };

        let interior = &after[..close];
        if interior.contains('[') {
            // The group opens at the last `[` before the `]`.
            out.push('[');
            rest = after;
            continue;
        }

        let marker = &rest[open..open + close + 2];
        match parse_marker(interior) {
            Some(indices) => {
                render_marker(&mut out, marker, &indices, references, style, unresolved)
            }
            None => out.push_str(marker),
        }
        rest = &after[close + 1..];
    }

    out.push_str(rest);
    out
}

/// Parses the inside of `[...]` as a comma-separated list of indices. A run
/// of digits too long for `usize` is still an index, just never a valid one.
fn parse_marker(interior: &str) -> Option<Vec<usize>> {
    interior.split(',').map(|entry| parse_index(entry.trim())).collect()
}

fn parse_index(entry: &str) -> Option<usize> {
    entry.parse::<usize>().ok().or_else(|| {
        (!entry.is_empty() && entry.bytes().all(|b| b.is_ascii_digit())).then_some(usize::MAX)
    })
}

fn resolve(references: &[Reference], index: usize) -> Option<&Reference> {
    index.checked_sub(1).and_then(|i| references.get(i))
}

fn render_marker(
    out: &mut String,
    marker: &str,
    indices: &[usize],
    references: &[Reference],
    style: LinkStyle,
    unresolved: UnresolvedMarkers,
) {
    let links: Vec<(usize, String)> = indices
        .iter()
        .filter_map(|&k| resolve(references, k).map(|r| (k, normalize_uri(&r.uri))))
        .filter(|(_, link)| !link.is_empty())
        .collect();

    if links.is_empty() {
        tracing::debug!(marker, "citation marker has no resolvable reference");
        if unresolved == UnresolvedMarkers::Keep {
            out.push_str(marker);
        }
        return;
    }

    match style {
        LinkStyle::Markdown => {
            for (k, link) in &links {
                out.push_str(&format!("[{k}]({link})"));
            }
        }
        LinkStyle::Bare => {
            out.push('[');
            for (_, link) in &links {
                out.push_str(link);
            }
            out.push(']');
        }
    }
}

fn append_reference_list(text: &str, references: &[Reference], limit: usize) -> String {
    let mut seen = HashSet::new();
    let mut lines = Vec::new();

    for (i, reference) in references.iter().take(limit).enumerate() {
        let link = normalize_uri(&reference.uri);
        if link.is_empty() || !seen.insert(link.clone()) {
            continue;
        }
        let label = match reference.title.as_deref().map(str::trim).filter(|t| !t.is_empty()) {
            Some(title) => format!("{} {}", i + 1, title),
            None => (i + 1).to_string(),
        };
        lines.push(format!("[{label}]({link})"));
    }

    if lines.is_empty() {
        return text.to_string();
    }

    format!("{}\n\nReferences\n{}", text, lines.join("\n"))
}
