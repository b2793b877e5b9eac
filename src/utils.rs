use crate::consts::placeholders;
use regex::Regex;
use std::sync::OnceLock;

fn list_item_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?i)<li(?:\s[^>]*)?>").expect("list item pattern"))
}

fn tag_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag pattern"))
}

/// Turns Spoonacular's HTML instructions into plain text. List items become
/// `- ` bullet lines, every other tag is dropped.
pub fn clean_instructions(raw: Option<&str>) -> String {
    let raw = match raw {
        Some(r) if !r.is_empty() => r,
        _ => return placeholders::NO_INSTRUCTIONS.to_string(),
    };

    let bulleted = list_item_re().replace_all(raw, "\n- ");
    let stripped = tag_re().replace_all(&bulleted, "");
    let cleaned = stripped.replace("\n\n", "\n");
    let cleaned = cleaned.trim();

    if cleaned.is_empty() {
        placeholders::NO_INSTRUCTIONS.to_string()
    } else {
        cleaned.to_string()
    }
}

/// Uppercases the first character, leaves the rest alone.
pub fn capitalize_first(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

pub fn truncate_text(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars { return s.to_string(); }
    s.chars().take(max_chars).collect::<String>() + "..."
}

pub fn escape_html(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
