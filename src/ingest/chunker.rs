use tracing::debug;

/// Splits document text into overlapping chunks for embedding.
///
/// Prefers paragraph breaks, then line breaks, then word boundaries when
/// choosing where to cut, falling back to a hard cut only for unbroken
/// runs longer than the chunk size. Sizes are in characters.
pub struct TextChunker {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextChunker {
    /// Overlap is clamped below the chunk size so splitting always makes
    /// forward progress.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Self {
        let chunk_size = chunk_size.max(1);
        Self {
            chunk_size,
            chunk_overlap: chunk_overlap.min(chunk_size - 1),
        }
    }

    pub fn split(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let chars: Vec<char> = text.chars().collect();
        if chars.len() <= self.chunk_size {
            return vec![text.to_string()];
        }

        let mut chunks = Vec::new();
        let mut start = 0;

        while start < chars.len() {
            let window_end = (start + self.chunk_size).min(chars.len());
            let split_at = if window_end < chars.len() {
                find_boundary(&chars, start, window_end).unwrap_or(window_end)
            } else {
                window_end
            };

            let chunk: String = chars[start..split_at].iter().collect();
            let trimmed = chunk.trim();
            if !trimmed.is_empty() {
                chunks.push(trimmed.to_string());
            }

            if split_at >= chars.len() {
                break;
            }

            let step = split_at - start;
            start += step.saturating_sub(self.chunk_overlap).max(1);
        }

        debug!(chunks = chunks.len(), "text split");
        chunks
    }
}

/// Best cut position in `[start, end)`, searching backwards but never
/// before the window midpoint so chunks stay reasonably full.
fn find_boundary(chars: &[char], start: usize, end: usize) -> Option<usize> {
    let min = start + (end - start) / 2;

    for i in (min..end).rev() {
        if chars[i] == '\n' && i > start && chars[i - 1] == '\n' {
            return Some(i);
        }
    }
    for i in (min..end).rev() {
        if chars[i] == '\n' {
            return Some(i);
        }
    }
    for i in (min..end).rev() {
        if chars[i] == ' ' {
            return Some(i);
        }
    }

    None
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunker = TextChunker::new(100, 20);
        let chunks = chunker.split("A short paragraph.");
        assert_eq!(chunks, vec!["A short paragraph.".to_string()]);
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunker = TextChunker::new(100, 20);
        assert!(chunker.split("   \n ").is_empty());
    }

    #[test]
    fn test_chunks_respect_size_limit() {
        let chunker = TextChunker::new(50, 10);
        let text = "word ".repeat(100);
        let chunks = chunker.split(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 50);
        }
    }

    #[test]
    fn test_consecutive_chunks_overlap() {
        let chunker = TextChunker::new(40, 15);
        let text = "alpha beta gamma delta epsilon zeta eta theta iota kappa lambda mu";
        let chunks = chunker.split(&text);

        assert!(chunks.len() > 1);
        // the tail of each chunk reappears at the head of the next
        for pair in chunks.windows(2) {
            let last_word = pair[0].split_whitespace().last().unwrap();
            assert!(
                pair[1].contains(last_word),
                "chunk {:?} should overlap with {:?}",
                pair[1],
                pair[0]
            );
        }
    }

    #[test]
    fn test_prefers_paragraph_boundary() {
        let chunker = TextChunker::new(60, 0);
        let text = format!("{}\n\n{}", "a".repeat(40), "b".repeat(40));
        let chunks = chunker.split(&text);

        assert_eq!(chunks.len(), 2);
        assert!(chunks[0].chars().all(|c| c == 'a'));
        assert!(chunks[1].chars().all(|c| c == 'b'));
    }

    #[test]
    fn test_unbroken_run_is_hard_cut() {
        let chunker = TextChunker::new(30, 0);
        let text = "x".repeat(75);
        let chunks = chunker.split(&text);

        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].len(), 30);
    }
}
