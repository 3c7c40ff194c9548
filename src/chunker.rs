/// Split `text` into chunks of at most `max_words` whitespace-delimited
/// words, each joined by single spaces. The last chunk may be shorter and
/// empty input yields no chunks. A `max_words` of zero is treated as one.
pub fn chunk_text(text: &str, max_words: usize) -> Vec<String> {
    let max_words = max_words.max(1);
    let words: Vec<&str> = text.split_whitespace().collect();

    words
        .chunks(max_words)
        .map(|chunk| chunk.join(" "))
        .collect()
}
