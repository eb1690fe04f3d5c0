//! Phrase segmentation for raw job-posting text.
//!
//! Splits on bullet markers and sentence boundaries, line-aware. No NLP:
//! the extractor's classification is lexical, so the segmenter only has to
//! produce reasonable phrase units, not perfect sentences.

/// A candidate requirement phrase with its position among all phrases.
#[derive(Debug, Clone)]
pub struct Phrase {
    pub text: String,
    pub index: usize,
}

const BULLET_MARKERS: &[char] = &['-', '*', '•', '·'];

/// Minimum phrase length after trimming; shorter fragments are noise.
const MIN_PHRASE_LEN: usize = 3;

/// Segments raw text into candidate requirement phrases.
pub fn segment(raw_text: &str) -> Vec<Phrase> {
    let mut phrases = Vec::new();
    for line in raw_text.lines() {
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }
        // A bulleted line is one phrase regardless of internal punctuation.
        let stripped = trimmed
            .strip_prefix(BULLET_MARKERS)
            .map(str::trim_start)
            .unwrap_or(trimmed);
        let is_bulleted = stripped.len() != trimmed.len();
        if is_bulleted {
            push_phrase(&mut phrases, stripped);
            continue;
        }
        for piece in split_sentences(stripped) {
            push_phrase(&mut phrases, piece);
        }
    }
    phrases
}

fn push_phrase(phrases: &mut Vec<Phrase>, text: &str) {
    let text = text.trim().trim_end_matches(['.', ';', ':']);
    if text.len() >= MIN_PHRASE_LEN {
        phrases.push(Phrase {
            text: text.to_string(),
            index: phrases.len(),
        });
    }
}

/// Splits a line on sentence-ish boundaries: `.`, `;`, `!`, `?` followed by
/// whitespace or end of line. Decimal points ("3.5 years") are not split.
fn split_sentences(line: &str) -> Vec<&str> {
    let mut pieces = Vec::new();
    let bytes = line.as_bytes();
    let mut start = 0;
    let mut i = 0;
    while i < bytes.len() {
        let b = bytes[i];
        if matches!(b, b'.' | b';' | b'!' | b'?') {
            let at_end = i + 1 == bytes.len();
            let before_space = bytes.get(i + 1).is_some_and(|n| n.is_ascii_whitespace());
            let decimal = b == b'.'
                && i > 0
                && bytes[i - 1].is_ascii_digit()
                && bytes.get(i + 1).is_some_and(|n| n.is_ascii_digit());
            if (at_end || before_space) && !decimal {
                pieces.push(&line[start..i]);
                start = i + 1;
            }
        }
        i += 1;
    }
    if start < line.len() {
        pieces.push(&line[start..]);
    }
    pieces
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_input_yields_no_phrases() {
        assert!(segment("").is_empty());
        assert!(segment("\n  \n").is_empty());
    }

    #[test]
    fn test_bulleted_lines_are_single_phrases() {
        let phrases = segment("- 5+ years of Rust. Strong CS fundamentals.\n- Kubernetes");
        assert_eq!(phrases.len(), 2);
        assert_eq!(phrases[0].text, "5+ years of Rust. Strong CS fundamentals");
        assert_eq!(phrases[1].text, "Kubernetes");
    }

    #[test]
    fn test_prose_lines_split_on_sentences() {
        let phrases = segment("We need Rust experience. Kubernetes is a plus; Kafka too.");
        let texts: Vec<&str> = phrases.iter().map(|p| p.text.as_str()).collect();
        assert_eq!(
            texts,
            vec!["We need Rust experience", "Kubernetes is a plus", "Kafka too"]
        );
    }

    #[test]
    fn test_decimal_numbers_not_split() {
        let phrases = segment("At least 3.5 years of Go required");
        assert_eq!(phrases.len(), 1);
        assert!(phrases[0].text.contains("3.5 years"));
    }

    #[test]
    fn test_indices_are_sequential() {
        let phrases = segment("- a requirement\n- another one\n- a third");
        for (i, p) in phrases.iter().enumerate() {
            assert_eq!(p.index, i);
        }
    }

    #[test]
    fn test_tiny_fragments_dropped() {
        let phrases = segment("- ok\n- a real requirement here");
        assert_eq!(phrases.len(), 1);
    }
}
