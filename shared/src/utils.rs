/// Cut `query` to `max_chars` characters, marking the cut with `...`.
pub fn truncate_query(query: &str, max_chars: usize) -> String {
    match query.char_indices().nth(max_chars) {
        Some((byte_idx, _)) => format!("{}...", &query[..byte_idx]),
        None => query.to_string(),
    }
}

/// Keep the first `max_tokens` whitespace-delimited tokens. Text within the
/// limit comes back unchanged; longer text is cut where the next token starts.
pub fn truncate_tokens(text: &str, max_tokens: usize) -> String {
    let mut seen = 0;
    let mut in_token = false;
    for (idx, c) in text.char_indices() {
        if c.is_whitespace() {
            in_token = false;
            continue;
        }
        if !in_token {
            if seen == max_tokens {
                return text[..idx].trim_end().to_string();
            }
            seen += 1;
            in_token = true;
        }
    }
    text.to_string()
}
