pub trait StripCodeBlock {
    fn strip_code_block(&self) -> &str;
}

impl StripCodeBlock for str {
    fn strip_code_block(&self) -> &str {
        let trimmed = self.trim();
        if trimmed.starts_with("```")
            && let Some(pos) = trimmed.find('\n')
        {
            let inner = &trimmed[pos + 1 ..];
            if let Some(inner) = inner.strip_suffix("```") {
                return inner.trim();
            }
        }
        trimmed
    }
}

/// Truncate a string to at most `max_chars` characters, appending a marker
/// when content was cut. Keeps DOM excerpts inside prompt limits.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }
    let cut: String = text.chars().take(max_chars).collect();
    format!("{cut}\n[...truncated]")
}
