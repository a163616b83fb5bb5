/// Longest chunk handed to the synthesizer for long Hindi text.
pub const MAX_CHUNK_CHARS: usize = 100;

const SENTENCE_TERMINATORS: [char; 4] = ['।', '.', '!', '?'];

/// Splits `text` into sentence-aligned chunks of at most `max_chars`
/// characters. A single sentence longer than the limit is kept whole.
/// Text with no terminator at all comes back as one chunk.
pub fn split_into_chunks(text: &str, max_chars: usize) -> Vec<String> {
    let sentences = sentences(text);
    if sentences.is_empty() {
        return vec![text.to_string()];
    }

    let mut chunks = Vec::new();
    let mut current = String::new();

    for sentence in sentences {
        let candidate_len = current.chars().count() + sentence.chars().count();
        if candidate_len > max_chars && !current.trim().is_empty() {
            chunks.push(current.trim().to_string());
            current = sentence.to_string();
        } else {
            current.push(' ');
            current.push_str(sentence);
        }
    }

    if !current.trim().is_empty() {
        chunks.push(current.trim().to_string());
    }

    if chunks.is_empty() {
        vec![text.to_string()]
    } else {
        chunks
    }
}

/// Runs of non-terminators followed by one or more terminators. Trailing text
/// without a terminator is its own final sentence.
fn sentences(text: &str) -> Vec<&str> {
    let mut out = Vec::new();
    let mut start = 0;
    let mut in_terminators = false;

    for (idx, ch) in text.char_indices() {
        let is_terminator = SENTENCE_TERMINATORS.contains(&ch);
        if in_terminators && !is_terminator {
            out.push(&text[start..idx]);
            start = idx;
        }
        in_terminators = is_terminator;
    }
    out.push(&text[start..]);

    out.into_iter()
        .filter(|s| {
            s.chars()
                .any(|c| !c.is_whitespace() && !SENTENCE_TERMINATORS.contains(&c))
        })
        .collect()
}
