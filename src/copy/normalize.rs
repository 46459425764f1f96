// src/copy/normalize.rs
//! Turns HTML email bodies and templated subjects into comparable plain
//! text, and carves out the two sentences the classifiers care about: the
//! opening hook and the call-to-action.

use once_cell::sync::OnceCell;
use regex::Regex;

/// Hooks and CTAs are display snippets; anything longer gets an ellipsis.
pub const SNIPPET_MAX_CHARS: usize = 120;

fn re_tags() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"(?is)</?[^>]+>").unwrap())
}

fn re_placeholder_pipe() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    // {default|alternate} keeps the default segment
    RE.get_or_init(|| Regex::new(r"\{([^{}|]*)\|[^{}]*\}").unwrap())
}

fn re_placeholder_plain() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\{([^{}]*)\}").unwrap())
}

fn re_whitespace() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"\s+").unwrap())
}

fn re_sentences() -> &'static Regex {
    static RE: OnceCell<Regex> = OnceCell::new();
    RE.get_or_init(|| Regex::new(r"[^.!?]+[.!?]*").unwrap())
}

/// Strip markup and template placeholders from an HTML body into
/// comparable plain text.
pub fn clean_body_text(html: &str) -> String {
    let mut out = html_escape::decode_html_entities(html).to_string();
    out = re_tags().replace_all(&out, " ").to_string();
    out = re_placeholder_pipe().replace_all(&out, "$1").to_string();
    out = re_placeholder_plain().replace_all(&out, "$1").to_string();
    out = re_whitespace().replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Split cleaned text into trimmed sentences, terminator kept.
pub fn split_sentences(text: &str) -> Vec<String> {
    re_sentences()
        .find_iter(text)
        .map(|m| m.as_str().trim().to_string())
        .filter(|s| !s.is_empty() && s.chars().any(|c| c.is_alphanumeric()))
        .collect()
}

/// First sentence of the cleaned body, capped for display.
pub fn extract_opening_hook(html: &str) -> String {
    let text = clean_body_text(html);
    split_sentences(&text)
        .into_iter()
        .next()
        .map(|s| truncate_snippet(&s))
        .unwrap_or_default()
}

/// The call-to-action sentence: the last question in the body, or the
/// closing sentence when nothing is asked.
pub fn extract_cta(html: &str) -> String {
    let text = clean_body_text(html);
    let sentences = split_sentences(&text);
    let cta = sentences
        .iter()
        .rev()
        .find(|s| s.contains('?'))
        .or_else(|| sentences.last());
    cta.map(|s| truncate_snippet(s)).unwrap_or_default()
}

/// Subject lines arrive with spintax (`{A|B}`) and template braces; keep
/// the default segment and drop the braces.
pub fn clean_subject(subject: &str) -> String {
    let first = subject.split('|').next().unwrap_or_default();
    first.replace(['{', '}'], "").trim().to_string()
}

fn truncate_snippet(s: &str) -> String {
    if s.chars().count() <= SNIPPET_MAX_CHARS {
        return s.to_string();
    }
    let mut out: String = s.chars().take(SNIPPET_MAX_CHARS).collect();
    out.push_str("...");
    out
}
