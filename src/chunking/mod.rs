//! Word-aligned text chunking.
//!
//! The sentiment model scores bounded pieces of text, so transcripts are split
//! into chunks of at most `max_chars` characters without ever breaking a word.

/// Default chunk bound in characters.
pub const DEFAULT_MAX_CHARS: usize = 400;

/// Split text into word-aligned chunks.
///
/// Words are accumulated greedily; each word costs its length plus one
/// separator. When the next word would push the running cost past
/// `max_chars`, the current chunk is closed and a new one starts with that
/// word. A single word longer than the bound becomes its own chunk.
pub fn chunk_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for word in text.split_whitespace() {
        let cost = word.chars().count() + 1;

        if !current.is_empty() && current_len + cost > max_chars {
            chunks.push(current.join(" "));
            current.clear();
            current_len = 0;
        }

        current.push(word);
        current_len += cost;
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    chunks
}
