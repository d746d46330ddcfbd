//! Repairs model output that ignored the "raw HTML only" instruction.

use regex::Regex;
use std::sync::LazyLock;

const REASONING_TAGS: &[&str] = &["think", "thinking", "reasoning"];

/// One pattern per tag, so a block only closes on its own name.
static REASONING_BLOCKS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    REASONING_TAGS
        .iter()
        .map(|tag| {
            Regex::new(&format!(r"(?is)<{tag}\b[^>]*>.*?</{tag}\s*>"))
                .expect("reasoning pattern is valid")
        })
        .collect()
});

static OPENING_FENCE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^```[A-Za-z0-9_-]*[ \t]*\r?\n?").expect("fence pattern is valid"));

/// Drops reasoning blocks, then unwraps a Markdown code fence.
pub fn clean_output(content: &str) -> String {
    let without_reasoning = strip_reasoning(content);
    strip_code_fence(&without_reasoning)
}

pub fn strip_reasoning(content: &str) -> String {
    REASONING_BLOCKS
        .iter()
        .fold(content.to_string(), |text, pattern| {
            pattern.replace_all(&text, "").into_owned()
        })
}

pub fn strip_code_fence(content: &str) -> String {
    let mut text = content.trim();
    if let Some(found) = OPENING_FENCE.find(text) {
        text = text[found.end()..].trim();
    }
    if let Some(stripped) = text.strip_suffix("```") {
        text = stripped.trim();
    }
    text.to_string()
}
