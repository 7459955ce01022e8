//! Clause segmentation.
//!
//! Splits normalized text into sections by recognising header lines, then
//! packs each section's sentences into chunks under a token budget.
//!
//! Header forms, in priority order:
//! - numbered headings: `1.2 Payment Terms`
//! - simple numbered sections: `3. CONFIDENTIALITY`
//! - named headings: `Article 4: Term`, `Section 2.1 Fees`
//! - bracketed list markers: `(a)`, `(iv)`
//! - preamble markers: `WHEREAS`, `RECITALS`, `WITNESSETH`
//! - definitions headers
//! - exhibits, schedules and annexes
//! - signature and execution blocks
//! - run-in ALL-CAPS headings: `TERMINATION. Either party may ...`
//!
//! The header line stays in the section body, so concatenating all chunks
//! reproduces the input.

use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::domain::{ClauseChunk, SectionType};

use super::sentences::{pack_sentences, split_sentences};

/// Leading lines that may form an implicit preamble
const PREAMBLE_WINDOW: usize = 20;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum HeaderKind {
    Numbered,
    Section,
    Named,
    ListItem,
    Preamble,
    Definitions,
    Exhibit,
    Signature,
    RunIn,
}

struct HeaderPattern {
    kind: HeaderKind,
    regex: Regex,
}

static HEADER_PATTERNS: Lazy<Vec<HeaderPattern>> = Lazy::new(|| {
    let header = |kind, pattern: &str| HeaderPattern {
        kind,
        regex: Regex::new(pattern).expect("valid header regex"),
    };
    vec![
        header(HeaderKind::Numbered, r"^(\d+(?:\.\d+){1,4})\s+(.+)$"),
        header(HeaderKind::Section, r"^(\d+)\.?\s+([A-Z][A-Za-z\s&,'-]+)$"),
        header(
            HeaderKind::Named,
            r"(?i)^(Article|Section|Clause|Para(?:graph)?)\s+(\d+(?:\.\d+)*)\s*[:.]?\s*(.*)$",
        ),
        header(
            HeaderKind::ListItem,
            r"(?i)^[(\[]([a-z]{1,3}|[ivxlcdm]{1,5})[)\]]\s+(.+)$",
        ),
        header(
            HeaderKind::Preamble,
            r"(?i)^(WHEREAS|RECITALS?|WITNESSETH|BACKGROUND|PREAMBLE|NOW,?\s+THEREFORE)(?:[\s:,]|$)",
        ),
        header(HeaderKind::Definitions, r"(?i)^(DEFINITIONS?|DEFINED\s+TERMS?)(?:[\s:.]|$)"),
        header(
            HeaderKind::Exhibit,
            r"(?i)^(EXHIBIT|SCHEDULE|ANNEX|APPENDIX|ATTACHMENT)\s+([A-Z0-9]+)",
        ),
        header(
            HeaderKind::Signature,
            r"(?i)^(SIGNATURES?|IN\s+WITNESS\s+WHEREOF|EXECUTED|SIGNED)\b",
        ),
        header(HeaderKind::RunIn, r"^([A-Z][A-Z&\- ]{2,}[A-Z])\.(?:\s+(.*))?$"),
    ]
});

/// Run-in ALL-CAPS heading that follows a sentence on the same line
static INLINE_HEADING: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([.!?;:])[ \t]+([A-Z][A-Z&\- ]{2,}[A-Z]\.\s)").expect("valid inline heading regex")
});

/// Header found on a line
#[derive(Debug, Clone, PartialEq)]
struct Header {
    title: String,
    section_type: SectionType,
    /// Whether this header becomes the parent of following sub-sections
    is_parent: bool,
}

fn truncate_title(text: &str, max: usize) -> String {
    if text.chars().count() > max {
        let head: String = text.chars().take(max).collect();
        format!("{}...", head)
    } else {
        text.to_string()
    }
}

fn header_from(kind: HeaderKind, caps: &Captures) -> Header {
    let group = |i: usize| caps.get(i).map(|m| m.as_str().trim()).unwrap_or("");

    let standard = |title: String, is_parent: bool| Header {
        title,
        section_type: SectionType::Standard,
        is_parent,
    };
    let special = |title: String, section_type: SectionType| Header {
        title,
        section_type,
        is_parent: false,
    };

    match kind {
        HeaderKind::Numbered => {
            let number = group(1);
            standard(format!("{} {}", number, group(2)), !number.contains('.'))
        }
        HeaderKind::Section => standard(format!("{}. {}", group(1), group(2)), true),
        HeaderKind::Named => {
            let title = if group(3).is_empty() {
                format!("{} {}", group(1), group(2))
            } else {
                format!("{} {}: {}", group(1), group(2), group(3))
            };
            standard(title, false)
        }
        HeaderKind::ListItem => standard(
            format!("({}) {}", group(1), truncate_title(group(2), 30)),
            false,
        ),
        HeaderKind::Preamble => special(group(1).to_string(), SectionType::Preamble),
        HeaderKind::Definitions => special(group(1).to_string(), SectionType::Definitions),
        HeaderKind::Exhibit => special(format!("{} {}", group(1), group(2)), SectionType::Exhibit),
        HeaderKind::Signature => special(group(1).to_string(), SectionType::Signature),
        HeaderKind::RunIn => standard(group(1).to_string(), false),
    }
}

/// Classify a line as a section header, first matching form wins
fn detect_header(line: &str) -> Option<Header> {
    HEADER_PATTERNS.iter().find_map(|pattern| {
        pattern
            .regex
            .captures(line)
            .map(|caps| header_from(pattern.kind, &caps))
    })
}

/// Move run-in headings that follow a sentence onto their own line
fn split_inline_headings(text: &str) -> String {
    INLINE_HEADING.replace_all(text, "$1\n$2").into_owned()
}

/// A section being accumulated
struct OpenSection {
    title: String,
    section_type: SectionType,
    parent: Option<String>,
    lines: Vec<String>,
}

/// Segments normalized text into clause chunks
#[derive(Debug, Clone)]
pub struct Segmenter {
    max_tokens_per_chunk: usize,
}

impl Default for Segmenter {
    fn default() -> Self {
        Self::new(500)
    }
}

impl Segmenter {
    pub fn new(max_tokens_per_chunk: usize) -> Self {
        Self {
            max_tokens_per_chunk: max_tokens_per_chunk.max(1),
        }
    }

    pub fn max_tokens_per_chunk(&self) -> usize {
        self.max_tokens_per_chunk
    }

    /// Split normalized text into ordered, contiguously indexed chunks.
    ///
    /// Empty text yields no chunks.
    pub fn segment(&self, text: &str) -> Vec<ClauseChunk> {
        let prepared = split_inline_headings(text);
        let mut chunks = Vec::new();
        let mut open: Option<OpenSection> = None;
        let mut parent: Option<String> = None;

        for (line_no, raw_line) in prepared.lines().enumerate() {
            let line = raw_line.trim();
            if line.is_empty() {
                continue;
            }

            if let Some(header) = detect_header(line) {
                if let Some(section) = open.take() {
                    self.close(section, &mut chunks);
                }
                if header.is_parent {
                    parent = Some(header.title.clone());
                } else if header.section_type != SectionType::Standard {
                    // special sections sit outside the numbered hierarchy
                    parent = None;
                }
                let section_parent = if header.is_parent { None } else { parent.clone() };
                open = Some(OpenSection {
                    title: header.title,
                    section_type: header.section_type,
                    parent: section_parent,
                    lines: vec![line.to_string()],
                });
                continue;
            }

            match open.as_mut() {
                Some(section) => section.lines.push(line.to_string()),
                None => {
                    let title = if line_no < PREAMBLE_WINDOW {
                        "PREAMBLE"
                    } else {
                        "UNTITLED"
                    };
                    open = Some(OpenSection {
                        title: title.to_string(),
                        section_type: SectionType::Preamble,
                        parent: None,
                        lines: vec![line.to_string()],
                    });
                }
            }
        }

        if let Some(section) = open.take() {
            self.close(section, &mut chunks);
        }

        chunks
    }

    /// Pack a finished section into chunks; empty sections emit nothing
    fn close(&self, section: OpenSection, chunks: &mut Vec<ClauseChunk>) {
        let body = section.lines.join(" ");
        let sentences = split_sentences(&body);
        for text in pack_sentences(&sentences, self.max_tokens_per_chunk) {
            chunks.push(ClauseChunk {
                index: chunks.len(),
                section_title: section.title.clone(),
                section_type: section.section_type,
                parent_section: section.parent.clone(),
                text,
            });
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn titles(chunks: &[ClauseChunk]) -> Vec<&str> {
        chunks.iter().map(|c| c.section_title.as_str()).collect()
    }

    #[test]
    fn test_header_priority() {
        let cases = [
            ("1.2 Payment Terms", "1.2 Payment Terms", SectionType::Standard),
            ("3. CONFIDENTIALITY", "3. CONFIDENTIALITY", SectionType::Standard),
            ("Article 4: Term", "Article 4: Term", SectionType::Standard),
            ("Section 7", "Section 7", SectionType::Standard),
            ("(a) the Client shall", "(a) the Client shall", SectionType::Standard),
            ("WHEREAS, the parties wish", "WHEREAS", SectionType::Preamble),
            ("DEFINITIONS", "DEFINITIONS", SectionType::Definitions),
            ("EXHIBIT A", "EXHIBIT A", SectionType::Exhibit),
            ("IN WITNESS WHEREOF, the parties", "IN WITNESS WHEREOF", SectionType::Signature),
            ("FORCE MAJEURE. Neither party", "FORCE MAJEURE", SectionType::Standard),
        ];

        for (line, title, section_type) in cases {
            let header = detect_header(line).unwrap_or_else(|| panic!("no header in {:?}", line));
            assert_eq!(header.title, title, "line {:?}", line);
            assert_eq!(header.section_type, section_type, "line {:?}", line);
        }
    }

    #[test]
    fn test_plain_sentences_are_not_headers() {
        assert!(detect_header("The Client shall pay all invoices.").is_none());
        assert!(detect_header("Payment is due within 30 days.").is_none());
    }

    #[test]
    fn test_list_title_is_truncated() {
        let header =
            detect_header("(b) the Service Provider shall maintain insurance coverage at all times")
                .unwrap();
        assert_eq!(header.title, "(b) the Service Provider shall mai...");
    }

    #[test]
    fn test_parent_tracking() {
        let text = "1. DEFINITIONS AND TERMS\n\
                    1.1 Services means the work.\n\
                    1.2 Fees means the charges.\n\
                    2. PAYMENT\n\
                    2.1 Invoices are due monthly.";
        let chunks = Segmenter::default().segment(text);

        assert_eq!(
            titles(&chunks),
            vec![
                "1. DEFINITIONS AND TERMS",
                "1.1 Services means the work.",
                "1.2 Fees means the charges.",
                "2. PAYMENT",
                "2.1 Invoices are due monthly."
            ]
        );
        assert_eq!(chunks[0].parent_section, None);
        assert_eq!(chunks[1].parent_section.as_deref(), Some("1. DEFINITIONS AND TERMS"));
        assert_eq!(chunks[4].parent_section.as_deref(), Some("2. PAYMENT"));
    }

    #[test]
    fn test_implicit_preamble() {
        let text = "This Agreement is made today.\nARTICLE 1: Scope\nThe Vendor supplies goods.";
        let chunks = Segmenter::default().segment(text);

        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0].section_title, "PREAMBLE");
        assert_eq!(chunks[0].section_type, SectionType::Preamble);
        assert_eq!(chunks[1].section_title, "ARTICLE 1: Scope");
        assert_eq!(chunks[1].text, "ARTICLE 1: Scope The Vendor supplies goods.");
    }

    #[test]
    fn test_inline_run_in_headings_are_split() {
        let text = "The term is one year. TERMINATION. Either party may terminate.";
        let chunks = Segmenter::default().segment(text);
        assert_eq!(titles(&chunks), vec!["PREAMBLE", "TERMINATION"]);
        assert_eq!(chunks[1].text, "TERMINATION. Either party may terminate.");
    }

    #[test]
    fn test_single_runin_clause() {
        let text = "TERMINATION. Either party may terminate this agreement upon 5 days written notice.";
        let chunks = Segmenter::default().segment(text);
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, text);
        assert_eq!(chunks[0].index, 0);
    }

    #[test]
    fn test_budget_splits_long_sections_and_keeps_indices_contiguous() {
        let body: Vec<String> = (0..40)
            .map(|i| format!("The Supplier shall deliver batch {} on time.", i))
            .collect();
        let text = format!("1. DELIVERY\n{}\n2. PAYMENT\nFees are due.", body.join(" "));
        let segmenter = Segmenter::new(50); // 200 chars

        let chunks = segmenter.segment(&text);
        assert!(chunks.len() > 3);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.index, i);
            assert!(chunk.text.chars().count() <= 200);
            assert!(!chunk.text.is_empty());
        }
        assert_eq!(chunks.last().unwrap().section_title, "2. PAYMENT");
    }

    #[test]
    fn test_empty_text_gives_no_chunks() {
        assert!(Segmenter::default().segment("").is_empty());
        assert!(Segmenter::default().segment("\n\n").is_empty());
    }

    #[test]
    fn test_coverage() {
        let text = "MASTER AGREEMENT\nWHEREAS the parties agree.\n1. SCOPE\nThe Vendor supplies goods. It ships them.\n(a) on time\nEXHIBIT A\nPrice list.";
        let chunks = Segmenter::new(8).segment(text);
        let rebuilt: Vec<&str> = chunks.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(rebuilt.join(" "), text.replace('\n', " "));
    }
}
