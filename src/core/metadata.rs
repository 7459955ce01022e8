//! Document profiling.
//!
//! Best-effort extraction of title, document type and metadata from
//! normalized text. Every extractor is independent and returns an empty
//! value when nothing is found.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::{Captures, Regex};

use crate::domain::{
    DefinedTerm, DefinitionStyle, DocumentMetadata, DocumentProfile, DocumentStatistics, KeyDates,
    TermInfo,
};

pub const UNTITLED: &str = "Untitled Document";
pub const GENERAL_DOCUMENT: &str = "General Legal Document";

const CHARS_PER_PAGE: usize = 3000;
const MAX_PARTIES: usize = 10;
const TITLE_SCAN_LINES: usize = 10;
const TYPE_SCAN_CHARS: usize = 500;

fn regex(pattern: &str) -> Regex {
    Regex::new(pattern).expect("valid metadata regex")
}

fn regexes(patterns: &[&str]) -> Vec<Regex> {
    patterns.iter().map(|p| regex(p)).collect()
}

// ---------------------------------------------------------------------------
// Title and type
// ---------------------------------------------------------------------------

static TITLE_SKIP: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)^(?:this|the|between|dated|whereas|hereby|witnesseth|recitals|background)")
});
static STRUCTURAL_HEADING: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)^(?:article|section|clause|exhibit|schedule|annex)\s+"));
static TITLE_WORD: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)\b(?:agreement|contract|deed|memorandum|articles|charter|bylaws|terms|policy|lease|license|indenture|amendment|addendum|waiver)\b")
});
static NUMBERED_INSTRUMENT: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)^(?:amendment|addendum|exhibit|schedule)\s+(?:no\.|number|#)?\s*\d+"));

/// Title from the first lines of the document
pub fn extract_title(text: &str) -> String {
    let lines: Vec<&str> = text.lines().map(str::trim).filter(|l| !l.is_empty()).collect();

    for line in lines.iter().take(TITLE_SCAN_LINES) {
        let len = line.chars().count();
        if len > 120 || TITLE_SKIP.is_match(line) {
            continue;
        }
        let all_caps = *line == line.to_uppercase() && line.chars().any(char::is_alphabetic);
        if all_caps && len > 3 && !STRUCTURAL_HEADING.is_match(line) {
            return line.to_string();
        }
        if len < 100 && TITLE_WORD.is_match(line) {
            return line.to_string();
        }
        if NUMBERED_INSTRUMENT.is_match(line) {
            return line.to_string();
        }
    }

    lines
        .iter()
        .find(|l| (11..120).contains(&l.chars().count()))
        .or(lines.first())
        .map(|l| l.to_string())
        .unwrap_or_else(|| UNTITLED.to_string())
}

static DOCUMENT_TYPES: Lazy<Vec<(Regex, &'static str)>> = Lazy::new(|| {
    [
        (r"\b(?:services?|master|purchase|sale|supply|distribution)\s+agreement\b", "Service Agreement"),
        (r"\b(?:employment|offer\s+letter|employment\s+contract)\b", "Employment Agreement"),
        (r"\b(?:non-disclosure|nda|confidentiality)\s+(?:agreement)?\b", "Non-Disclosure Agreement (NDA)"),
        (r"\b(?:lease|rental)\s+agreement\b", "Lease Agreement"),
        (r"\b(?:license|licensing)\s+agreement\b", "License Agreement"),
        (r"\b(?:loan|credit|financing)\s+agreement\b", "Loan Agreement"),
        (r"\b(?:partnership|joint\s+venture)\b", "Partnership Agreement"),
        (r"\b(?:shareholder|stock\s+purchase)\s+agreement\b", "Shareholder Agreement"),
        (r"\b(?:merger|acquisition|purchase)\s+agreement\b", "M&A Agreement"),
        (r"\b(?:terms\s+(?:of|and)\s+(?:service|use)|terms\s+&\s+conditions)\b", "Terms of Service"),
        (r"\b(?:privacy\s+policy|data\s+protection)\b", "Privacy Policy"),
        (r"\b(?:power\s+of\s+attorney|poa)\b", "Power of Attorney"),
        (r"\b(?:will|testament|trust)\b", "Estate Document"),
        (r"\b(?:deed|title|conveyance)\b", "Property Deed"),
        (r"\b(?:promissory\s+note|note\s+agreement)\b", "Promissory Note"),
        (r"\b(?:settlement|release)\s+agreement\b", "Settlement Agreement"),
        (r"\b(?:consulting|contractor|freelance)\s+agreement\b", "Consulting Agreement"),
        (r"\b(?:amendment|modification|addendum)\b", "Amendment"),
        (r"\b(?:articles|certificate)\s+of\s+incorporation\b", "Articles of Incorporation"),
        (r"\b(?:bylaws|by-laws)\b", "Bylaws"),
        (r"\b(?:memorandum\s+of\s+understanding|mou)\b", "Memorandum of Understanding (MOU)"),
        (r"\b(?:letter\s+of\s+intent|loi)\b", "Letter of Intent (LOI)"),
        (r"\b(?:warrant|warrant\s+agreement)\b", "Warrant Agreement"),
        (r"\b(?:indemnity|indemnification)\s+agreement\b", "Indemnity Agreement"),
    ]
    .into_iter()
    .map(|(pattern, name)| (regex(&format!("(?i){}", pattern)), name))
    .collect()
});

fn first_type(haystack: &str) -> Option<&'static str> {
    DOCUMENT_TYPES
        .iter()
        .find(|(pattern, _)| pattern.is_match(haystack))
        .map(|(_, name)| *name)
}

/// Document type from the title, then from the opening of the text
pub fn classify_document_type(text: &str, title: &str) -> String {
    let opening: String = text.chars().take(TYPE_SCAN_CHARS).collect();
    first_type(title)
        .or_else(|| first_type(&opening))
        .unwrap_or(GENERAL_DOCUMENT)
        .to_string()
}

// ---------------------------------------------------------------------------
// Parties
// ---------------------------------------------------------------------------

static BETWEEN: Lazy<Vec<Regex>> = Lazy::new(|| {
    regexes(&[
        r"(?is)\bbetween\s+(.+?)\s+and\s+(.+?)\s+(?:on|dated|effective|as\s+of)\s+[^.]+\.",
        r"(?is)\bbetween\s+(.+?)\s+and\s+(.+?)(?:\.|\s*,\s*(?:dated|effective|executed|entered))",
        r"(?is)\bparties[:\s]+(.+?)\s+and\s+(.+?)(?:\n\n|\.\s+[A-Z]|$)",
    ])
});

static PARTY_TRAILERS: Lazy<Vec<Regex>> = Lazy::new(|| {
    regexes(&[
        r"(?is)(?:\s*,\s*|\s+)(?:dated|on|effective|as\s+of)\s+.*$",
        r"(?is)\s*,\s*(?:located\s+at|with\s+(?:its\s+)?(?:principal\s+)?(?:place\s+of\s+)?business\s+at|having\s+its).*$",
        r"(?is)\s*,?\s*hereinafter\s+referred\s+to\s+as.*$",
    ])
});

static PARTY_ALIAS: Lazy<Regex> =
    Lazy::new(|| regex(r#"^(.+?)\.?\s*\(\s*["']?([^)"']+?)["']?\s*\)$"#));

static LEGAL_ENTITIES: Lazy<Vec<Regex>> = Lazy::new(|| {
    regexes(&[
        r"\b([A-Z][A-Za-z0-9 &.,'-]+?\s+(?:Inc|LLC|Ltd|Corp|L\.L\.C\.|Corporation|Company|Limited|Incorporated|LP|LLP|LLLP|PC|PLLC|PLC))\b",
        r"\b([A-Z][A-Za-z0-9 &.,'-]+?\s+(?:GmbH|AG|SA|SAS|SARL|BV|NV|SpA|Pty|Pte|AB))\b",
        r"\b((?:The\s+)?(?:United\s+States|State|City|County|Commonwealth|Province|Government)\s+of\s+[A-Z][A-Za-z ]+)",
        r"\b((?:Mr|Mrs|Ms|Dr|Prof)\.?\s+[A-Z][a-z]+(?:\s+[A-Z][a-z]+)+)",
    ])
});

fn strip_trailing_punct(name: &str) -> &str {
    name.trim().trim_end_matches([',', ';', ':']).trim()
}

/// Formal name, then alias, from one side of a "between A and B" phrase
fn party_names(side: &str) -> Vec<String> {
    let mut cleaned = side.trim().to_string();
    for trailer in PARTY_TRAILERS.iter() {
        cleaned = trailer.replace(&cleaned, "").trim().to_string();
    }

    let mut names = Vec::new();
    match PARTY_ALIAS.captures(&cleaned) {
        Some(caps) => {
            let formal = strip_trailing_punct(&caps[1]);
            let alias = caps[2].trim();
            if (2..200).contains(&formal.chars().count()) {
                names.push(formal.to_string());
            }
            if (1..50).contains(&alias.chars().count()) {
                names.push(alias.to_string());
            }
        }
        None => {
            let formal = strip_trailing_punct(&cleaned);
            if (2..200).contains(&formal.chars().count()) {
                names.push(formal.to_string());
            }
        }
    }
    names
}

fn push_unique(list: &mut Vec<String>, value: String) {
    if !list.contains(&value) {
        list.push(value);
    }
}

/// Contracting parties, at most ten
pub fn extract_parties(text: &str) -> Vec<String> {
    let mut parties: Vec<String> = Vec::new();

    if let Some(caps) = BETWEEN.iter().find_map(|re| re.captures(text)) {
        for name in party_names(&caps[1]).into_iter().chain(party_names(&caps[2])) {
            push_unique(&mut parties, name);
        }
    }
    if parties.len() >= 2 {
        return parties;
    }

    'patterns: for pattern in LEGAL_ENTITIES.iter() {
        for caps in pattern.captures_iter(text) {
            let name = caps[1].trim().trim_end_matches('.').trim().to_string();
            if (4..200).contains(&name.chars().count()) {
                push_unique(&mut parties, name);
            }
            if parties.len() >= MAX_PARTIES {
                break 'patterns;
            }
        }
    }
    parties
}

// ---------------------------------------------------------------------------
// Dates
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy)]
enum DateFormat {
    DayMonthYear,
    MonthDayYear,
    Iso,
    Numeric,
}

const MONTHS: &str =
    "January|February|March|April|May|June|July|August|September|October|November|December|Jan|Feb|Mar|Apr|Jun|Jul|Aug|Sept?|Oct|Nov|Dec";

static DATE_PATTERNS: Lazy<Vec<(Regex, DateFormat)>> = Lazy::new(|| {
    vec![
        (
            regex(&format!(r"(?i)\b(\d{{1,2}})(?:st|nd|rd|th)?\s+({})\.?\s+(\d{{4}})", MONTHS)),
            DateFormat::DayMonthYear,
        ),
        (
            regex(&format!(r"(?i)\b({})\.?\s+(\d{{1,2}})(?:st|nd|rd|th)?,?\s+(\d{{4}})", MONTHS)),
            DateFormat::MonthDayYear,
        ),
        (regex(r"\b(\d{4})-(\d{2})-(\d{2})\b"), DateFormat::Iso),
        (regex(r"\b(\d{1,2})/(\d{1,2})/(\d{4})\b"), DateFormat::Numeric),
        (regex(r"\b(\d{1,2})\.(\d{1,2})\.(\d{4})\b"), DateFormat::Numeric),
    ]
});

fn month_number(name: &str) -> Option<u32> {
    let month = match name.to_lowercase().get(..3)? {
        "jan" => 1,
        "feb" => 2,
        "mar" => 3,
        "apr" => 4,
        "may" => 5,
        "jun" => 6,
        "jul" => 7,
        "aug" => 8,
        "sep" => 9,
        "oct" => 10,
        "nov" => 11,
        "dec" => 12,
        _ => return None,
    };
    Some(month)
}

fn to_date(caps: &Captures, format: DateFormat) -> Option<NaiveDate> {
    let num = |i: usize| caps.get(i)?.as_str().parse::<u32>().ok();
    let (year, month, day) = match format {
        DateFormat::DayMonthYear => (num(3)?, month_number(&caps[2])?, num(1)?),
        DateFormat::MonthDayYear => (num(3)?, month_number(&caps[1])?, num(2)?),
        DateFormat::Iso => (num(1)?, num(2)?, num(3)?),
        DateFormat::Numeric => {
            let (first, second) = (num(1)?, num(2)?);
            // day first only when the first part cannot be a month
            if first > 12 {
                (num(3)?, second, first)
            } else {
                (num(3)?, first, second)
            }
        }
    };
    NaiveDate::from_ymd_opt(i32::try_from(year).ok()?, month, day)
}

/// First valid date in `context`, trying each format in order
fn first_date(context: &str) -> Option<NaiveDate> {
    DATE_PATTERNS.iter().find_map(|(pattern, format)| {
        pattern
            .captures(context)
            .and_then(|caps| to_date(&caps, *format))
    })
}

static EFFECTIVE_CONTEXT: Lazy<Vec<Regex>> = Lazy::new(|| {
    regexes(&[
        r"(?i)(?:effective|commencing|starting|beginning)\s+(?:date|on|as\s+of)?\s*:?\s*([^.\n]{0,50})",
        r"(?i)(?:dated|executed|entered\s+into)\s+(?:as\s+of|on)?\s*:?\s*([^.\n]{0,50})",
        r"(?i)(?:on\s+this|this)\s+([^.\n]{0,50})",
    ])
});
static EXECUTION_CONTEXT: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)(?:executed|signed|dated)\s+(?:as\s+of|on)?\s*:?\s*([^.\n]{0,50})"));
static EXPIRATION_CONTEXT: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)\b(?:expir(?:e|ing|ation)|terminat(?:e|ing|ion)|end(?:ing)?)\s+(?:date|on)?\s*:?\s*([^.\n]{0,50})")
});

fn date_after(pattern: &Regex, text: &str) -> Option<NaiveDate> {
    first_date(&pattern.captures(text)?[1])
}

/// Every date in the text plus the effective, execution and expiration dates.
///
/// The effective date falls back to the first date found.
pub fn extract_dates(text: &str) -> KeyDates {
    let mut all_dates: Vec<NaiveDate> = Vec::new();
    for (pattern, format) in DATE_PATTERNS.iter() {
        for caps in pattern.captures_iter(text) {
            if let Some(date) = to_date(&caps, *format) {
                if !all_dates.contains(&date) {
                    all_dates.push(date);
                }
            }
        }
    }

    let effective_date = EFFECTIVE_CONTEXT
        .iter()
        .find_map(|pattern| date_after(pattern, text))
        .or_else(|| all_dates.first().copied());

    KeyDates {
        effective_date,
        execution_date: date_after(&EXECUTION_CONTEXT, text),
        expiration_date: date_after(&EXPIRATION_CONTEXT, text),
        all_dates,
    }
}

// ---------------------------------------------------------------------------
// Jurisdiction and governing law
// ---------------------------------------------------------------------------

static JURISDICTION: Lazy<Vec<Regex>> = Lazy::new(|| {
    regexes(&[
        r"(?i)\bgoverned\s+by\s+(?:the\s+)?laws?\s+of\s+([^.,;]+?)(?:\.|,|;|\s+without)",
        r"(?i)\bjurisdiction\s+of\s+(?:the\s+)?(?:courts?\s+(?:of|in|located\s+in)\s+)?([^.,;]+?)[.,;]",
        r"(?i)\bvenue\s+(?:shall\s+be|is|lies)\s+(?:in\s+)?([^.,;]+?)[.,;]",
        r"(?i)\bsubject\s+to\s+(?:the\s+)?laws?\s+of\s+([^.,;]+?)[.,;]",
        r"(?i)\bin\s+accordance\s+with\s+(?:the\s+)?laws?\s+of\s+([^.,;]+?)[.,;]",
        r"(?i)\bconstrued\s+(?:in\s+accordance\s+with|under)\s+(?:the\s+)?laws?\s+of\s+([^.,;]+?)[.,;]",
    ])
});
static ARBITRATION_SEAT: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)\barbitration\s+(?:in|under|pursuant\s+to)?\s*([^.,;]+?)(?:[.,;]|\s+rules)")
});
static GOVERNING_LAW: Lazy<Vec<Regex>> = Lazy::new(|| {
    regexes(&[
        r"(?i)\bgoverned\s+by\s+(?:and\s+construed\s+in\s+accordance\s+with\s+)?(?:the\s+)?laws?\s+of\s+([^.,;]+?)(?:\.|,|;|\s+without)",
        r"(?i)\bthis\s+agreement\s+shall\s+be\s+governed\s+by\s+([^.,;]+?)[.,;]",
    ])
});

/// Governing-law, venue and arbitration seats, deduplicated
pub fn extract_jurisdiction(text: &str) -> Vec<String> {
    let mut found: Vec<String> = Vec::new();
    let mut push = |value: String| {
        if (3..100).contains(&value.chars().count()) && !found.contains(&value) {
            found.push(value);
        }
    };

    for pattern in JURISDICTION.iter() {
        for caps in pattern.captures_iter(text) {
            push(caps[1].trim().to_string());
        }
    }
    for caps in ARBITRATION_SEAT.captures_iter(text) {
        let seat = caps[1].trim();
        if (3..100).contains(&seat.chars().count()) {
            push(format!("Arbitration: {}", seat));
        }
    }
    found
}

pub fn extract_governing_law(text: &str) -> Option<String> {
    GOVERNING_LAW
        .iter()
        .find_map(|pattern| pattern.captures(text))
        .map(|caps| caps[1].trim().to_string())
}

// ---------------------------------------------------------------------------
// Amounts and term
// ---------------------------------------------------------------------------

const NUMBER_WORDS: &str = "one|two|three|four|five|six|seven|eight|nine|ten|eleven|twelve|thirteen|fourteen|fifteen|sixteen|seventeen|eighteen|nineteen|twenty|thirty|forty|fifty|sixty|seventy|eighty|ninety|hundred|thousand|million|billion";

static AMOUNTS: Lazy<Vec<Regex>> = Lazy::new(|| {
    vec![
        regex(r"(?i)(?:\b(?:USD|EUR|GBP|INR|CAD|AUD|JPY|CNY|CHF|SEK|NOK|DKK|NZD|SGD|HKD|kr)|[$€£₹¥₣])\s*\d[\d,]*(?:\.\d{1,2})?(?:\s*(?:million|billion|thousand)\b|[kMB]\b)?"),
        regex(&format!(
            r"(?i)\b(?:{w})(?:\s+(?:and\s+)?(?:{w}))*\s+(?:dollars?|euros?|pounds?|rupees?|yen|yuan)\b",
            w = NUMBER_WORDS
        )),
        regex(r"(?i)(?:\b(?:USD|EUR|GBP|INR)|[$€£₹])\s*\d[\d,]*(?:\.\d{1,2})?\s*(?:-|to)\s*(?:(?:USD|EUR|GBP|INR)|[$€£₹])?\s*\d[\d,]*(?:\.\d{1,2})?"),
        regex(r"(?i)(?:\b(?:USD|EUR|GBP|INR)|[$€£₹])\s*\d[\d,]*(?:\.\d{1,2})?\s*(?:/|per)\s*(?:hour|day|week|month|year|unit|item|piece|share)\b"),
    ]
});

static WHITESPACE: Lazy<Regex> = Lazy::new(|| regex(r"\s+"));

/// Monetary amounts as written, deduplicated
pub fn extract_amounts(text: &str) -> Vec<String> {
    let mut amounts: Vec<String> = Vec::new();
    for pattern in AMOUNTS.iter() {
        for m in pattern.find_iter(text) {
            let amount = WHITESPACE.replace_all(m.as_str().trim(), " ").into_owned();
            if !amounts.contains(&amount) {
                amounts.push(amount);
            }
        }
    }
    amounts
}

static DURATION: Lazy<Vec<Regex>> = Lazy::new(|| {
    regexes(&[
        r"(?i)\bterm\s+of\s+(?:this\s+agreement\s+(?:shall\s+be|is)\s+)?(\d+)\s+(year|month|day)s?",
        r"(?i)\b(?:period|duration)\s+of\s+(\d+)\s+(year|month|day)s?",
        r"(?i)\bfor\s+a\s+(?:period|term)\s+of\s+(\d+)\s+(year|month|day)s?",
        r"(?i)\b(?:shall|will)\s+(?:remain\s+in\s+)?(?:force|effect)\s+for\s+(?:a\s+period\s+of\s+)?(\d+)\s+(year|month|day)s?",
    ])
});
static RENEWAL: Lazy<Regex> = Lazy::new(|| {
    regex(r"(?i)\b((?:auto(?:matically|matic)?|shall|will)\s+(?:be\s+)?renew(?:ed|al|able|s)?(?:\s+(?:automatically|automatic|for|unless))?[^.]{0,100})")
});
static TERMINATION_NOTICE: Lazy<Vec<Regex>> = Lazy::new(|| {
    regexes(&[
        r"(?i)\btermination\s+(?:notice|period)\s+of\s+(\d+)\s+(day|month|year)s?",
        r"(?i)\b(\d+)\s+(day|month|year)s?'?\s+(?:prior\s+)?(?:written\s+)?notice",
    ])
});

/// "2 years", "1 month"
fn period_label(caps: &Captures) -> String {
    let count = &caps[1];
    let unit = caps[2].to_lowercase();
    let plural = count.parse::<u64>().map(|n| n > 1).unwrap_or(false);
    format!("{} {}{}", count, unit, if plural { "s" } else { "" })
}

/// Contract duration, renewal wording and termination notice
pub fn extract_term(text: &str) -> Option<TermInfo> {
    let first_period = |patterns: &[Regex]| {
        patterns
            .iter()
            .find_map(|p| p.captures(text))
            .map(|caps| period_label(&caps))
    };

    let term = TermInfo {
        duration: first_period(DURATION.as_slice()),
        renewal_clause: RENEWAL.captures(text).map(|caps| caps[1].trim().to_string()),
        termination_notice: first_period(TERMINATION_NOTICE.as_slice()),
    };
    (!term.is_empty()).then_some(term)
}

// ---------------------------------------------------------------------------
// Definitions
// ---------------------------------------------------------------------------

static PARENTHETICAL: Lazy<Regex> = Lazy::new(|| {
    regex(r#"["']([A-Z][A-Za-z ]{1,50})["']\s+\((?:the\s+)?["']?([A-Z][A-Za-z ]{1,30})["']?\)"#)
});
static DEFINITIONS_HEADER: Lazy<Regex> =
    Lazy::new(|| regex(r"(?i)\b(?:definitions?|defined\s+terms?)\b[:\n]+"));
static EXPLICIT: Lazy<Regex> = Lazy::new(|| {
    regex(r#"["']?([A-Z][A-Za-z ]{2,40})["']?\s+(?i:means?|shall\s+mean|refers?\s+to|is\s+defined\s+as)\s+([^.\n]{10,200})"#)
});
static REFERENCED: Lazy<Regex> = Lazy::new(|| regex(r#"\(["']([A-Z][A-Za-z ]{1,30})["']\)"#));

/// Lines of a definitions section considered for explicit definitions
const DEFINITION_LINES: usize = 200;

/// Defined terms, first introduction wins
pub fn extract_definitions(text: &str) -> Vec<DefinedTerm> {
    let mut terms: Vec<DefinedTerm> = Vec::new();
    let mut add = |term: &str, definition: Option<String>, style: DefinitionStyle| {
        let term = term.trim();
        if !term.is_empty() && !terms.iter().any(|t| t.term == term) {
            terms.push(DefinedTerm {
                term: term.to_string(),
                definition,
                style,
            });
        }
    };

    for caps in PARENTHETICAL.captures_iter(text) {
        add(
            &caps[2],
            Some(caps[1].trim().to_string()),
            DefinitionStyle::Parenthetical,
        );
    }

    if let Some(header) = DEFINITIONS_HEADER.find(text) {
        let section: String = text[header.end()..]
            .split_inclusive('\n')
            .take(DEFINITION_LINES)
            .collect();
        for caps in EXPLICIT.captures_iter(&section) {
            add(
                &caps[1],
                Some(caps[2].trim().to_string()),
                DefinitionStyle::Explicit,
            );
        }
    }

    for caps in REFERENCED.captures_iter(text) {
        let term = caps[1].trim();
        if (2..30).contains(&term.chars().count()) {
            add(term, None, DefinitionStyle::Referenced);
        }
    }

    terms
}

// ---------------------------------------------------------------------------
// Profile
// ---------------------------------------------------------------------------

/// Title, type and metadata for normalized text split into `clause_count`
/// chunks
pub fn profile_document(text: &str, clause_count: usize) -> DocumentProfile {
    let title = extract_title(text);
    let document_type = classify_document_type(text, &title);
    let definitions = extract_definitions(text);
    let total_characters = text.chars().count();

    let statistics = DocumentStatistics {
        total_characters,
        total_clauses: clause_count,
        estimated_pages: total_characters.div_ceil(CHARS_PER_PAGE),
        defined_terms_count: definitions.len(),
    };

    DocumentProfile {
        title,
        document_type,
        metadata: DocumentMetadata {
            parties: extract_parties(text),
            dates: extract_dates(text),
            jurisdiction: extract_jurisdiction(text),
            amounts: extract_amounts(text),
            term: extract_term(text),
            governing_law: extract_governing_law(text),
            definitions,
            statistics,
        },
    }
}
