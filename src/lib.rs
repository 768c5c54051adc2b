use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;
use tracing::debug;

pub mod band;
pub mod config;
pub mod document;
pub mod error;
pub mod report;
pub mod session;

pub use band::RiskBand;
pub use config::{Config, OutputFormat, SAMPLE_DOCUMENT};
pub use document::Document;
pub use error::{LexplainError, Result};
pub use report::Report;
pub use session::{AnalysisOutcome, AnalysisTicket, Session};

// ---------------------------------------------------------------------------
// Data structures
// ---------------------------------------------------------------------------

/// Outcome of one analysis run. Replaced wholesale on every re-analysis.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AnalysisResult {
    pub summary: String,
    /// 0..=100, fractional once the length adjustment kicks in.
    pub risk_score: f64,
    pub risks: Vec<String>,
    pub advice: Vec<String>,
    pub highlights: Vec<String>,
}

impl AnalysisResult {
    pub fn band(&self) -> RiskBand {
        RiskBand::from_score(self.risk_score)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RiskKeyword {
    pub phrase: &'static str,
    pub weight: u32,
}

const fn kw(phrase: &'static str, weight: u32) -> RiskKeyword {
    RiskKeyword { phrase, weight }
}

/// Contract risk terms and their weights. Order is significant: highlights
/// are reported in table order.
pub static RISK_KEYWORDS: &[RiskKeyword] = &[
    kw("indemnify", 15),
    kw("indemnification", 18),
    kw("liability", 12),
    kw("penalty", 10),
    kw("arbitration", 6),
    kw("termination", 8),
    kw("confidential", 6),
    kw("non-compete", 14),
    kw("breach", 10),
    kw("damages", 10),
    kw("waiver", 6),
    kw("jurisdiction", 6),
    kw("governing law", 8),
    kw("auto-renew", 10),
    kw("late fee", 8),
    kw("exclusive", 8),
];

// ---------------------------------------------------------------------------
// Hyperparameters
// ---------------------------------------------------------------------------

pub(crate) struct Hyperparameters {
    pub(crate) score_max: f64,
    pub(crate) length_adj_start_chars: f64,
    pub(crate) length_adj_span_chars: f64,
    pub(crate) length_adj_max: f64,
    pub(crate) sentence_length_unit: usize,
    pub(crate) sentence_length_bonus_max: u32,
    pub(crate) summary_fraction: f64,
    pub(crate) summary_min_sentences: usize,
    pub(crate) summary_max_sentences: usize,
    pub(crate) summary_fallback_units: usize,
    pub(crate) question_token_limit: usize,
    pub(crate) relevance_score_divisor: f64,
    pub(crate) band_medium_min: f64,
    pub(crate) band_high_min: f64,
}

pub(crate) static HP: Hyperparameters = Hyperparameters {
    score_max: 100.0,
    length_adj_start_chars: 800.0,
    length_adj_span_chars: 2000.0,
    length_adj_max: 20.0,
    sentence_length_unit: 120,
    sentence_length_bonus_max: 10,
    summary_fraction: 0.25,
    summary_min_sentences: 3,
    summary_max_sentences: 6,
    summary_fallback_units: 240,
    question_token_limit: 6,
    relevance_score_divisor: 50.0,
    band_medium_min: 25.0,
    band_high_min: 60.0,
};

// ---------------------------------------------------------------------------
// Messages
// ---------------------------------------------------------------------------

pub const HIGH_RISK_WARNING: &str = "High overall risk. Seek legal review before signing.";
pub const AUTO_RENEW_WARNING: &str = "Auto-renewal present. Calendar cancellation dates.";
pub const INDEMNITY_WARNING: &str = "Indemnification may shift liability to you.";
pub const TERMINATION_WARNING: &str =
    "Termination terms could be strict\u{2014}check notice periods.";
pub const JURISDICTION_WARNING: &str = "Jurisdiction may be unfavorable.";

pub const INDEMNITY_ADVICE: &str =
    "Limit indemnification to direct damages and mutual obligations.";
pub const LIABILITY_ADVICE: &str =
    "Cap liability to fees paid in the last 12 months and exclude indirect damages.";
pub const TERMINATION_ADVICE: &str = "Add convenience termination with 30-day notice if possible.";
pub const CONFIDENTIALITY_ADVICE: &str = "Ensure confidentiality survives for at least 2 years.";
pub const AUTO_RENEW_ADVICE: &str =
    "Replace auto-renewal with explicit renewal or add opt-out reminders.";
pub const JURISDICTION_ADVICE: &str = "Choose a neutral jurisdiction or your home state.";
pub const GENERIC_ADVICE: &str =
    "No obvious red flags detected. Still consider a legal review for important agreements.";

pub const MISSING_INPUT_PROMPT: &str = "Please provide a document and a question.";
pub const NO_PASSAGE_FOUND: &str = "No relevant passage found.";

// ---------------------------------------------------------------------------
// Compiled patterns
// ---------------------------------------------------------------------------

// Browser whitespace: includes U+FEFF, excludes U+0085.
const WHITESPACE_CLASS: &str =
    r"[\t\n\x0B\x0C\r \u{A0}\u{1680}\u{2000}-\u{200A}\u{2028}\u{2029}\u{202F}\u{205F}\u{3000}\u{FEFF}]";

static WHITESPACE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("{WHITESPACE_CLASS}+")).unwrap());

// The terminal punctuation is a single ASCII byte; `split_sentences` keeps it
// with the preceding sentence and drops the whitespace run.
static SENTENCE_BOUNDARY_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(&format!("[.!?]{WHITESPACE_CLASS}+")).unwrap());

static KEYWORD_PATTERNS: Lazy<Vec<Regex>> = Lazy::new(|| {
    RISK_KEYWORDS
        .iter()
        .map(|k| Regex::new(&format!("(?i){}", regex::escape(k.phrase))).unwrap())
        .collect()
});

static AUTO_RENEW_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)auto-?renew").unwrap());

static INDEMNITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)indemnif").unwrap());

static TERMINATION_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)termination").unwrap());

static JURISDICTION_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)jurisdiction|governing law").unwrap());

static LIABILITY_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)liability").unwrap());

static CONFIDENTIAL_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)confidential").unwrap());

// ASCII word characters only, so accented letters split tokens.
static QUESTION_SPLIT_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^A-Za-z0-9_]+").unwrap());

// ---------------------------------------------------------------------------
// Helpers
// ---------------------------------------------------------------------------

pub fn is_text_whitespace(c: char) -> bool {
    matches!(
        c,
        '\t' | '\n' | '\u{0B}' | '\u{0C}' | '\r' | ' ' | '\u{A0}' | '\u{1680}'
            | '\u{2000}'..='\u{200A}'
            | '\u{2028}' | '\u{2029}' | '\u{202F}' | '\u{205F}' | '\u{3000}' | '\u{FEFF}'
    )
}

/// `str::trim` over the same whitespace set as [`normalize`].
pub fn trim_text(text: &str) -> &str {
    text.trim_matches(is_text_whitespace)
}

/// Collapse every whitespace run to a single space and trim the ends.
pub fn normalize(text: &str) -> String {
    trim_text(&WHITESPACE_RE.replace_all(text, " ")).to_string()
}

/// Split normalized text after `.`, `!` or `?` followed by whitespace.
///
/// Always yields at least one element; empty input yields a single empty
/// sentence.
pub fn split_sentences(clean: &str) -> Vec<&str> {
    let mut sentences = Vec::new();
    let mut start = 0;
    for m in SENTENCE_BOUNDARY_RE.find_iter(clean) {
        sentences.push(&clean[start..m.start() + 1]);
        start = m.end();
    }
    sentences.push(&clean[start..]);
    sentences
}

/// Length in UTF-16 code units, the unit all length thresholds are tuned in.
fn text_len(text: &str) -> usize {
    text.encode_utf16().count()
}

/// Longest prefix of whole characters spanning at most `units` UTF-16 units.
fn prefix_units(text: &str, units: usize) -> &str {
    let mut used = 0;
    for (idx, c) in text.char_indices() {
        used += c.len_utf16();
        if used > units {
            return &text[..idx];
        }
    }
    text
}

fn matched_keywords(text: &str) -> impl Iterator<Item = &'static RiskKeyword> + '_ {
    RISK_KEYWORDS
        .iter()
        .zip(KEYWORD_PATTERNS.iter())
        .filter(move |(_, re)| re.is_match(text))
        .map(|(k, _)| k)
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

fn length_adjustment(chars: usize) -> f64 {
    let ratio = (chars as f64 - HP.length_adj_start_chars) / HP.length_adj_span_chars;
    (ratio.max(0.0) * HP.length_adj_max).min(HP.length_adj_max)
}

/// Weighted keyword frequency capped at 100, plus up to 20 points for long
/// documents.
pub fn risk_score(clean: &str) -> f64 {
    let weighted: u64 = RISK_KEYWORDS
        .iter()
        .zip(KEYWORD_PATTERNS.iter())
        .map(|(k, re)| re.find_iter(clean).count() as u64 * u64::from(k.weight))
        .sum();
    let base_risk = (weighted as f64).min(HP.score_max);
    (base_risk + length_adjustment(text_len(clean))).min(HP.score_max)
}

/// Informativeness of a sentence: the weight of every keyword it mentions
/// (once each) plus a length bonus of one point per 120 characters, max 10.
pub fn score_sentence(sentence: &str) -> u32 {
    let keyword_score: u32 = matched_keywords(sentence).map(|k| k.weight).sum();
    let length_bonus = text_len(sentence)
        .div_ceil(HP.sentence_length_unit)
        .min(HP.sentence_length_bonus_max as usize) as u32;
    keyword_score + length_bonus
}

fn summary_length(sentence_count: usize) -> usize {
    let quarter = (sentence_count as f64 * HP.summary_fraction).ceil() as usize;
    quarter.clamp(HP.summary_min_sentences, HP.summary_max_sentences)
}

fn summarize(clean: &str, sentences: &[&str]) -> String {
    let mut ranked: Vec<(&str, u32)> = sentences
        .iter()
        .map(|s| (*s, score_sentence(s)))
        .collect();
    // sort_by is stable: equal scores keep document order
    ranked.sort_by(|a, b| b.1.cmp(&a.1));

    let summary = ranked
        .iter()
        .take(summary_length(sentences.len()))
        .map(|(s, _)| trim_text(s))
        .collect::<Vec<_>>()
        .join(" ");

    if summary.is_empty() {
        prefix_units(clean, HP.summary_fallback_units).to_string()
    } else {
        summary
    }
}

// ---------------------------------------------------------------------------
// Findings
// ---------------------------------------------------------------------------

fn risk_warnings(clean: &str, risk_score: f64) -> Vec<String> {
    let mut risks = Vec::new();
    if risk_score >= HP.band_high_min {
        risks.push(HIGH_RISK_WARNING.to_string());
    }
    if AUTO_RENEW_RE.is_match(clean) {
        risks.push(AUTO_RENEW_WARNING.to_string());
    }
    if INDEMNITY_RE.is_match(clean) {
        risks.push(INDEMNITY_WARNING.to_string());
    }
    if TERMINATION_RE.is_match(clean) {
        risks.push(TERMINATION_WARNING.to_string());
    }
    if JURISDICTION_RE.is_match(clean) {
        risks.push(JURISDICTION_WARNING.to_string());
    }
    risks
}

fn build_advice(clean: &str) -> Vec<String> {
    let checks: [(&Regex, &str); 6] = [
        (&*INDEMNITY_RE, INDEMNITY_ADVICE),
        (&*LIABILITY_RE, LIABILITY_ADVICE),
        (&*TERMINATION_RE, TERMINATION_ADVICE),
        (&*CONFIDENTIAL_RE, CONFIDENTIALITY_ADVICE),
        (&*AUTO_RENEW_RE, AUTO_RENEW_ADVICE),
        (&*JURISDICTION_RE, JURISDICTION_ADVICE),
    ];
    let mut advice: Vec<String> = checks
        .iter()
        .filter(|(re, _)| re.is_match(clean))
        .map(|(_, tip)| tip.to_string())
        .collect();
    if advice.is_empty() {
        advice.push(GENERIC_ADVICE.to_string());
    }
    advice
}

fn highlights(clean: &str) -> Vec<String> {
    matched_keywords(clean)
        .map(|k| k.phrase.to_string())
        .collect()
}

// ---------------------------------------------------------------------------
// Question answering
// ---------------------------------------------------------------------------

/// Lower-cased word tokens of a question, at most the first six.
pub fn question_tokens(question: &str) -> Vec<String> {
    QUESTION_SPLIT_RE
        .split(&question.to_lowercase())
        .filter(|t| !t.is_empty())
        .take(HP.question_token_limit)
        .map(str::to_string)
        .collect()
}

fn relevance(sentence: &str, tokens: &[String]) -> f64 {
    let lower = sentence.to_lowercase();
    let hits = tokens.iter().filter(|t| lower.contains(t.as_str())).count();
    hits as f64 + f64::from(score_sentence(sentence)) / HP.relevance_score_divisor
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

pub fn analyze(text: &str) -> AnalysisResult {
    let clean = normalize(text);
    let sentences = split_sentences(&clean);

    let risk_score = risk_score(&clean);
    let result = AnalysisResult {
        summary: summarize(&clean, &sentences),
        risk_score,
        risks: risk_warnings(&clean, risk_score),
        advice: build_advice(&clean),
        highlights: highlights(&clean),
    };

    debug!(
        units = text_len(&clean),
        sentences = sentences.len(),
        risk_score = result.risk_score,
        risks = result.risks.len(),
        highlights = result.highlights.len(),
        "analyzed document"
    );
    result
}

/// Return the sentence of `text` that best matches `question`.
pub fn answer_query(text: &str, question: &str) -> String {
    let clean = normalize(text);
    if clean.is_empty() || trim_text(question).is_empty() {
        return MISSING_INPUT_PROMPT.to_string();
    }

    let tokens = question_tokens(question);
    let sentences = split_sentences(&clean);
    let mut ranked: Vec<(&str, f64)> = sentences
        .iter()
        .map(|s| (*s, relevance(s, &tokens)))
        .collect();
    ranked.sort_by(|a, b| b.1.total_cmp(&a.1));

    debug!(tokens = ?tokens, candidates = ranked.len(), "ranked sentences for question");

    ranked
        .first()
        .map(|(s, _)| *s)
        .filter(|s| !s.is_empty())
        .or_else(|| sentences.first().copied().filter(|s| !s.is_empty()))
        .map_or_else(|| NO_PASSAGE_FOUND.to_string(), str::to_string)
}
