//! Text normalization for extracted legal documents.
//!
//! Cleaning is an ordered table of named rewrite rules:
//! - character maps (invisible characters, typography, legal symbols)
//! - Unicode NFKC
//! - regex rewrites (page artifacts, redactions, punctuation spacing)
//! - whitespace layout (one paragraph per line, single spaces)
//!
//! The table is re-applied until the text stops changing, so the output is
//! always a fixed point: normalizing normalized text is a no-op.

use once_cell::sync::Lazy;
use regex::Regex;
use unicode_normalization::UnicodeNormalization;

use super::error::ValidationError;

/// Passes before giving up on reaching a fixed point
const MAX_PASSES: usize = 8;

/// How a rule rewrites text
pub enum Rewrite {
    /// Per-character mapping; `None` keeps the character, `Some("")` drops it
    Chars(fn(char) -> Option<&'static str>),
    /// Regex replacement (`$1`-style references allowed)
    Pattern(Regex, &'static str),
    /// Whole-text transform
    Whole(fn(&str) -> String),
}

/// A single named normalization rule
pub struct Rule {
    pub name: &'static str,
    rewrite: Rewrite,
}

impl Rule {
    fn chars(name: &'static str, map: fn(char) -> Option<&'static str>) -> Self {
        Self {
            name,
            rewrite: Rewrite::Chars(map),
        }
    }

    fn pattern(name: &'static str, pattern: &str, replacement: &'static str) -> Self {
        let regex = Regex::new(pattern).expect("valid normalizer regex");
        Self {
            name,
            rewrite: Rewrite::Pattern(regex, replacement),
        }
    }

    fn whole(name: &'static str, transform: fn(&str) -> String) -> Self {
        Self {
            name,
            rewrite: Rewrite::Whole(transform),
        }
    }

    /// Apply this rule once
    pub fn apply(&self, text: &str) -> String {
        match &self.rewrite {
            Rewrite::Chars(map) => {
                let mut out = String::with_capacity(text.len());
                for c in text.chars() {
                    match map(c) {
                        Some(replacement) => out.push_str(replacement),
                        None => out.push(c),
                    }
                }
                out
            }
            Rewrite::Pattern(regex, replacement) => {
                regex.replace_all(text, *replacement).into_owned()
            }
            Rewrite::Whole(transform) => transform(text),
        }
    }
}

static RULES: Lazy<Vec<Rule>> = Lazy::new(|| {
    vec![
        Rule::pattern("line breaks", r"\r\n?|\x0C|\u{2028}|\u{2029}", "\n"),
        Rule::chars("invisible characters", invisible),
        Rule::chars("typography", typography),
        Rule::chars("legal symbols", legal_symbol),
        Rule::whole("unicode nfkc", |text| text.nfkc().collect()),
        Rule::pattern("pdf debris", r"(?i)\(cid:\d+\)|\[[^\]\n]*(?:PDF|Image)[^\]\n]*\]", ""),
        Rule::pattern("page of pages", r"(?i)\bPage[ \t]+\d+[ \t]*(?:of|/)[ \t]*\d+\b", ""),
        Rule::pattern("bracketed page", r"(?i)\[[ \t]*Page[ \t]+\d+[ \t]*\]", ""),
        Rule::pattern("page marker line", r"(?mi)^[ \t]*Page[ \t]+\d+[ \t]*$", ""),
        Rule::pattern("dashed page number", r"(?m)^[ \t]*[-_][ \t]*\d+[ \t]*[-_][ \t]*$", ""),
        Rule::pattern("horizontal rule", r"(?m)^[ \t]*(?:[-_=]+|\*{3,})[ \t]*$", ""),
        Rule::pattern(
            "watermark line",
            r"(?m)^[ \t]*(?:CONFIDENTIAL|DRAFT|PROPRIETARY(?: AND CONFIDENTIAL)?|END OF DOCUMENT)[ \t]*$",
            "",
        ),
        Rule::pattern(
            "bracketed redaction",
            r"(?i)\[[^\]\n]*(?:REDACT|CONFIDENTIAL)[^\]\n]*\]",
            "[***]",
        ),
        Rule::pattern("asterisk redaction", r"\[?\*{3,}\]?", "[***]"),
        Rule::pattern("runaway dots", r"\.{4,}", "..."),
        Rule::pattern("empty brackets", r"\([ \t]*\)|\[[ \t]*\]|\{[ \t]*\}", ""),
        Rule::pattern("space before punctuation", r"(\w)[ \t]+([.,;:!?])", "$1$2"),
        Rule::pattern("space after separator", r"([,;])([A-Za-z])", "$1 $2"),
        Rule::pattern("repeated spaces", r"[ \t]{2,}", " "),
        Rule::pattern("line edges", r"(?m)^[ \t]+|[ \t]+$", ""),
        Rule::pattern("blank lines", r"\n{2,}", "\n"),
        Rule::pattern("continuation lines", r"\n([a-z])", " $1"),
        Rule::whole("trim", |text| text.trim().to_string()),
    ]
});

fn invisible(c: char) -> Option<&'static str> {
    match c {
        '\u{200C}' | '\u{200D}' | '\u{FEFF}' | '\u{200E}' | '\u{200F}' => Some(""),
        '\u{202A}'..='\u{202E}' | '\u{2060}'..='\u{206F}' => Some(""),
        '\u{00A0}' | '\u{2000}'..='\u{200B}' | '\u{3000}' | '\t' | '\u{0B}' => Some(" "),
        '\n' => None,
        c if c.is_control() => Some(""),
        _ => None,
    }
}

fn typography(c: char) -> Option<&'static str> {
    match c {
        '\u{2010}'..='\u{2015}' | '\u{2212}' => Some("-"),
        '\u{2018}' | '\u{2019}' | '\u{201A}' | '\u{2032}' => Some("'"),
        '\u{201C}' | '\u{201D}' | '\u{201E}' | '\u{00AB}' | '\u{00BB}' => Some("\""),
        '\u{2026}' => Some("..."),
        '\u{00B7}' | '\u{2022}' | '\u{2023}' | '\u{2043}' | '\u{2219}' => Some("-"),
        _ => None,
    }
}

fn legal_symbol(c: char) -> Option<&'static str> {
    match c {
        '§' => Some("Section "),
        '¶' => Some("Para. "),
        '©' => Some("(c)"),
        '®' => Some("(R)"),
        '™' => Some("(TM)"),
        _ => None,
    }
}

/// The rule table, in application order
pub fn rules() -> &'static [Rule] {
    &RULES
}

/// One pass of every rule
fn apply_rules(text: &str) -> String {
    rules()
        .iter()
        .fold(text.to_string(), |acc, rule| rule.apply(&acc))
}

/// Clean `raw` to a fixed point. Never fails; may return an empty string.
pub fn clean(raw: &str) -> String {
    let mut current = apply_rules(raw);
    for _ in 1..MAX_PASSES {
        let next = apply_rules(&current);
        if next == current {
            break;
        }
        current = next;
    }
    current
}

/// Normalize raw extracted text.
///
/// Fails when the input is blank, or when nothing readable survives
/// cleaning. Callers must not run later stages on a failed normalization.
pub fn normalize(raw: &str) -> Result<String, ValidationError> {
    if raw.trim().is_empty() {
        return Err(ValidationError::EmptyText);
    }

    let cleaned = clean(raw);
    if cleaned.is_empty() {
        return Err(ValidationError::NoContent);
    }

    Ok(cleaned)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rule(name: &str) -> &'static Rule {
        rules()
            .iter()
            .find(|r| r.name == name)
            .unwrap_or_else(|| panic!("no rule named {}", name))
    }

    #[test]
    fn test_rule_names_are_unique() {
        let mut names: Vec<_> = rules().iter().map(|r| r.name).collect();
        names.sort_unstable();
        names.dedup();
        assert_eq!(names.len(), rules().len());
    }

    #[test]
    fn test_invisible_characters() {
        let r = rule("invisible characters");
        assert_eq!(r.apply("a\u{200B}b\u{FEFF}c\u{200E}d"), "a bcd");
        assert_eq!(r.apply("x\u{00A0}y\tz"), "x y z");
        assert_eq!(r.apply("keep\nlines"), "keep\nlines");
    }

    #[test]
    fn test_typography() {
        let r = rule("typography");
        assert_eq!(
            r.apply("\u{201C}Client\u{201D} \u{2014} it\u{2019}s \u{2026}"),
            "\"Client\" - it's ..."
        );
        assert_eq!(r.apply("\u{2022} item"), "- item");
    }

    #[test]
    fn test_legal_symbols() {
        let r = rule("legal symbols");
        assert_eq!(r.apply("§4 and ¶2"), "Section 4 and Para. 2");
        assert_eq!(r.apply("Acme© Widget® Brand™"), "Acme(c) Widget(R) Brand(TM)");
    }

    #[test]
    fn test_page_artifacts() {
        assert_eq!(rule("page of pages").apply("end Page 3 of 10 start"), "end  start");
        assert_eq!(rule("page of pages").apply("Page 3/10"), "");
        assert_eq!(rule("bracketed page").apply("text [Page 4] more"), "text  more");
        assert_eq!(rule("page marker line").apply("a\nPage 7\nb"), "a\n\nb");
        assert_eq!(rule("dashed page number").apply("a\n- 12 -\nb"), "a\n\nb");
    }

    #[test]
    fn test_watermark_only_removes_whole_lines() {
        let r = rule("watermark line");
        assert_eq!(r.apply("CONFIDENTIAL\nCONFIDENTIALITY. All info"), "\nCONFIDENTIALITY. All info");
        assert_eq!(r.apply("This is CONFIDENTIAL material"), "This is CONFIDENTIAL material");
    }

    #[test]
    fn test_redactions_collapse_to_one_token() {
        assert_eq!(rule("bracketed redaction").apply("Name: [REDACTED]"), "Name: [***]");
        assert_eq!(rule("bracketed redaction").apply("[name redacted]"), "[***]");
        assert_eq!(rule("asterisk redaction").apply("Fee: ******"), "Fee: [***]");
        assert_eq!(rule("asterisk redaction").apply("[***]"), "[***]");
    }

    #[test]
    fn test_punctuation_spacing() {
        assert_eq!(rule("space before punctuation").apply("word , next ."), "word, next.");
        assert_eq!(rule("space after separator").apply("a,b;c 1,000"), "a, b; c 1,000");
    }

    #[test]
    fn test_continuation_lines_join() {
        let cleaned = clean("The Client shall pay\nall invoices promptly.\nPAYMENT TERMS");
        assert_eq!(cleaned, "The Client shall pay all invoices promptly.\nPAYMENT TERMS");
    }

    #[test]
    fn test_clean_full_document() {
        let raw = "\u{FEFF}MASTER  SERVICES AGREEMENT\r\n\r\n\
                   Page 1 of 3\r\n\
                   §1 \u{201C}Services\u{201D} means the work\u{2026}\r\n\
                   ------\r\n\
                   2. PAYMENT\r\n\
                   Fees of ******* are due .";
        let cleaned = clean(raw);
        assert_eq!(
            cleaned,
            "MASTER SERVICES AGREEMENT\nSection 1 \"Services\" means the work...\n2. PAYMENT\nFees of [***] are due."
        );
    }

    #[test]
    fn test_normalize_is_idempotent_on_sample() {
        let once = normalize("  Hello   world  .\n\n\nSecond\u{00A0}line ").unwrap();
        assert_eq!(once, "Hello world.\nSecond line");
        assert_eq!(normalize(&once).unwrap(), once);
    }

    #[test]
    fn test_normalize_rejects_blank_input() {
        assert_eq!(normalize(""), Err(ValidationError::EmptyText));
        assert_eq!(normalize(" \n\t "), Err(ValidationError::EmptyText));
        assert_eq!(normalize("Page 1 of 2\n-----"), Err(ValidationError::NoContent));
    }
}
