//! Sentence segmentation and chunk packing.
//!
//! Periods inside abbreviations ("Inc.", "U.S.", "e.g."), decimal numbers,
//! cross-references ("Section 3.2.") and ellipses are protected spans and
//! never end a sentence.

use once_cell::sync::Lazy;
use regex::Regex;

/// Characters per estimated token
pub const CHARS_PER_TOKEN: usize = 4;

static ABBREVIATION: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:Dr|Mrs|Mr|Ms|Prof|Rev|Hon|Sr|Jr|Esq|Ltd|Inc|Corp|Co|LLC|LLP|LP|PLC|SA|GmbH|AG|U\.S|U\.K|E\.U|U\.N|St|Ave|Blvd|Dept|Div|etc|vs|v|i\.e|e\.g|et al|cf|viz|ibid|op cit|approx|est|No|vol|pp|para|sec|art|ch|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sept|Sep|Oct|Nov|Dec)\.",
    )
    .expect("valid abbreviation regex")
});

static DECIMAL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.\d+").expect("valid decimal regex"));

static CROSS_REFERENCE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(?:Section|Article|Clause|Para(?:graph)?)\s+\d+(?:\.\d+)*\.")
        .expect("valid cross-reference regex")
});

static ELLIPSIS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\.\.\.").expect("valid ellipsis regex"));

static BOUNDARY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"[.!?]+\s+").expect("valid sentence boundary regex"));

/// Byte ranges whose punctuation must not end a sentence
fn protected_spans(text: &str) -> Vec<(usize, usize)> {
    let mut spans: Vec<(usize, usize)> = [&ABBREVIATION, &DECIMAL, &CROSS_REFERENCE, &ELLIPSIS]
        .iter()
        .flat_map(|re| re.find_iter(text).map(|m| (m.start(), m.end())))
        .collect();
    spans.sort_unstable();
    spans
}

fn is_protected(spans: &[(usize, usize)], pos: usize) -> bool {
    spans.iter().any(|(start, end)| *start <= pos && pos < *end)
}

fn opens_sentence(c: char) -> bool {
    c.is_uppercase() || matches!(c, '"' | '\'' | '(' | '[')
}

/// Split text into sentences.
///
/// A boundary is a run of `.`, `!` or `?` followed by whitespace and an
/// upper-case letter, quote or opening bracket. Empty input gives no
/// sentences; text with no boundary is one sentence.
pub fn split_sentences(text: &str) -> Vec<String> {
    let text = text.trim();
    if text.is_empty() {
        return Vec::new();
    }

    let spans = protected_spans(text);
    let mut sentences = Vec::new();
    let mut start = 0;

    for boundary in BOUNDARY.find_iter(text) {
        let next = text[boundary.end()..].chars().next();
        if !next.map(opens_sentence).unwrap_or(false) {
            continue;
        }

        // last punctuation byte of the run
        let punct_end = boundary.as_str().trim_end().len() + boundary.start();
        if is_protected(&spans, punct_end - 1) {
            continue;
        }

        let sentence = text[start..punct_end].trim();
        if !sentence.is_empty() {
            sentences.push(sentence.to_string());
        }
        start = boundary.end();
    }

    let rest = text[start..].trim();
    if !rest.is_empty() {
        sentences.push(rest.to_string());
    }

    sentences
}

/// Split an over-long piece at word boundaries into parts of at most
/// `max_chars` characters. A single word longer than the budget is cut.
fn split_long(piece: &str, max_chars: usize) -> Vec<String> {
    let mut parts = Vec::new();
    let mut current = String::new();

    for word in piece.split(' ').filter(|w| !w.is_empty()) {
        let candidate_len = if current.is_empty() {
            word.chars().count()
        } else {
            current.chars().count() + 1 + word.chars().count()
        };

        if candidate_len <= max_chars {
            if !current.is_empty() {
                current.push(' ');
            }
            current.push_str(word);
            continue;
        }

        if !current.is_empty() {
            parts.push(std::mem::take(&mut current));
        }

        if word.chars().count() <= max_chars {
            current.push_str(word);
        } else {
            let chars: Vec<char> = word.chars().collect();
            for slice in chars.chunks(max_chars) {
                parts.push(slice.iter().collect());
            }
        }
    }

    if !current.is_empty() {
        parts.push(current);
    }
    parts
}

/// Greedily pack sentences into chunks of at most `max_tokens` estimated
/// tokens, joining sentences with a single space.
pub fn pack_sentences(sentences: &[String], max_tokens: usize) -> Vec<String> {
    let max_chars = max_tokens.max(1) * CHARS_PER_TOKEN;
    let mut chunks = Vec::new();
    let mut current = String::new();

    let pieces = sentences.iter().flat_map(|sentence| {
        if sentence.chars().count() > max_chars {
            split_long(sentence, max_chars)
        } else {
            vec![sentence.clone()]
        }
    });

    for piece in pieces {
        let joined_len = if current.is_empty() {
            piece.chars().count()
        } else {
            current.chars().count() + 1 + piece.chars().count()
        };

        if joined_len > max_chars && !current.is_empty() {
            chunks.push(std::mem::take(&mut current));
        }

        if !current.is_empty() {
            current.push(' ');
        }
        current.push_str(&piece);
    }

    if !current.is_empty() {
        chunks.push(current);
    }
    chunks
}

/// Estimated token count (4 characters per token, rounded up)
pub fn estimate_tokens(text: &str) -> usize {
    text.chars().count().div_ceil(CHARS_PER_TOKEN)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_basic_split() {
        let sentences = split_sentences("The term is one year. Either party may renew! Is it binding? Yes.");
        assert_eq!(
            sentences,
            vec![
                "The term is one year.",
                "Either party may renew!",
                "Is it binding?",
                "Yes."
            ]
        );
    }

    #[test]
    fn test_abbreviations_do_not_split() {
        let sentences = split_sentences(
            "Acme Inc. Delaware agrees with Dr. Smith under U.S. law. The fee is 2.5 percent.",
        );
        assert_eq!(
            sentences,
            vec![
                "Acme Inc. Delaware agrees with Dr. Smith under U.S. law.",
                "The fee is 2.5 percent."
            ]
        );
    }

    #[test]
    fn test_cross_references_and_ellipses() {
        let sentences =
            split_sentences("As set out in Section 3.2. The Client agrees... Then it ends.");
        assert_eq!(
            sentences,
            vec!["As set out in Section 3.2. The Client agrees... Then it ends."]
        );
    }

    #[test]
    fn test_lowercase_continuation_is_not_a_boundary() {
        let sentences = split_sentences("Payment is due in 30 days. unless agreed otherwise.");
        assert_eq!(sentences.len(), 1);
    }

    #[test]
    fn test_empty_and_unterminated() {
        assert!(split_sentences("   ").is_empty());
        assert_eq!(split_sentences("No terminal punctuation"), vec!["No terminal punctuation"]);
    }

    #[test]
    fn test_pack_respects_budget() {
        let sentences: Vec<String> = (0..10).map(|i| format!("Sentence number {} here.", i)).collect();
        let chunks = pack_sentences(&sentences, 10); // 40 chars
        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 40, "{} too long", chunk);
        }
        assert_eq!(chunks.join(" "), sentences.join(" "));
    }

    #[test]
    fn test_pack_splits_oversized_sentence_at_words() {
        let long = "word ".repeat(30).trim().to_string();
        let chunks = pack_sentences(&[long.clone()], 5); // 20 chars
        for chunk in &chunks {
            assert!(chunk.chars().count() <= 20);
            assert!(!chunk.starts_with(' ') && !chunk.ends_with(' '));
        }
        assert_eq!(chunks.join(" "), long);
    }

    #[test]
    fn test_pack_cuts_single_giant_word() {
        let giant = "x".repeat(50);
        let chunks = pack_sentences(&[giant], 5);
        assert_eq!(chunks.len(), 3);
        assert!(chunks.iter().all(|c| c.chars().count() <= 20));
    }

    #[test]
    fn test_estimate_tokens() {
        assert_eq!(estimate_tokens(""), 0);
        assert_eq!(estimate_tokens("abcd"), 1);
        assert_eq!(estimate_tokens("abcde"), 2);
    }
}
