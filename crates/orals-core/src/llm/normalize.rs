//! Turn whatever the feedback service returned into a reconciled score.
//!
//! Conventions are tried in a fixed order: structured JSON score fields,
//! then a `SCORE_DATA_START`/`SCORE_DATA_END` block, then per-item lines in a
//! "rubric mapping" section, then a raw count of Hit/Partial/Miss words.
//! Nothing here fails: unreadable input becomes a zero score plus a note.

use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use crate::score::{clamp01, ScoreResult, PARTIAL_CREDIT};
use crate::text::cached_regex;

const BLOCK: &str = r"(?s)SCORE_DATA_START(.*?)SCORE_DATA_END";
const MAPPING_HEADER: &str = r"(?i)rubric[\s_-]+mapping";
const HEADING: &str = r"^\s*(?:#{1,6}\s|\*\*[^*]+\*\*\s*:?\s*$|[A-Z][A-Za-z ]{2,40}:\s*$)";
/// "- Label: **Hit**" and friends, verdict at the end of the line
const VERDICT_AT_END: &str = r"(?i)^\s*(?:[-*•+]|\d+[.)])?\s*(.*?)[\s:|–—-]*(?:\*\*|__)?\b(hit|partial|miss)\b(?:\*\*|__)?[\s.!|]*$";
/// "- Label: Miss - not mentioned", verdict right after the separator
const VERDICT_AFTER_LABEL: &str = r"(?i)^\s*(?:[-*•+]|\d+[.)])?\s*(.+?)\s*[:|–—-]+\s*(?:\*\*|__)?(hit|partial|miss)\b(?:\*\*|__)?\s*(?:[:–—(-]|$)";
/// Outside a mapping section only list items or bolded verdicts count
const MARKED_VERDICT: &str = r"(?i)^\s*(?:[-*•+]|\d+[.)])\s|(?:\*\*|__)(?:hit|partial|miss)\b";
const GLOBAL_VERDICT: &str = r"\b(Hit|Partial|Miss)\b";
/// Larger counts are garbage; capping keeps the arithmetic below in range
const MAX_COUNT: f64 = u32::MAX as f64;

pub const SCHEMA_HINT: &str = "Expected either JSON {\"similarity\", \"rubricHit\", \"rubricMiss\", \
\"hits\", \"misses\", \"feedback\"} or a block of lines SCORE_DATA_START / HITS: n / PARTIALS: n / \
MISSES: n / TOTAL: n / SIMILARITY: 0.00-1.00 / SCORE_DATA_END.";

/// Which convention produced the score
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Convention {
    Structured,
    ScoreBlock,
    RubricMapping,
    GlobalCount,
    Unparsed,
}

impl Convention {
    pub fn as_str(&self) -> &'static str {
        match self {
            Convention::Structured => "structured",
            Convention::ScoreBlock => "score_block",
            Convention::RubricMapping => "rubric_mapping",
            Convention::GlobalCount => "global_count",
            Convention::Unparsed => "unparsed",
        }
    }
}

/// A normalized feedback-service reply
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Normalized {
    /// Display text with the machine block removed and any notes appended
    pub feedback: String,
    pub score: ScoreResult,
    pub convention: Convention,
    /// Discrepancies found while reconciling, also appended to `feedback`
    pub notes: Vec<String>,
}

impl Normalized {
    pub fn parsed(&self) -> bool {
        self.convention != Convention::Unparsed
    }
}

/// Counts and optional labels as read from the reply, before reconciliation
#[derive(Debug, Clone, Default, PartialEq)]
struct RawScore {
    hits: usize,
    partials: usize,
    misses: usize,
    similarity: Option<f64>,
    hit_labels: Vec<String>,
    partial_labels: Vec<String>,
    miss_labels: Vec<String>,
}

impl RawScore {
    fn sum(&self) -> usize {
        self.hits
            .saturating_add(self.partials)
            .saturating_add(self.misses)
    }
}

/// Normalize a raw response body (JSON or plain text)
pub fn normalize_response(body: &str, rubric: &[String]) -> Normalized {
    match serde_json::from_str::<Value>(body) {
        Ok(value @ Value::Object(_)) => normalize_value(&value, rubric),
        Ok(Value::String(text)) => normalize_text(&text, rubric),
        _ => normalize_text(body, rubric),
    }
}

/// Normalize an already-decoded JSON reply
pub fn normalize_value(value: &Value, rubric: &[String]) -> Normalized {
    let feedback = value
        .get("feedback")
        .and_then(Value::as_str)
        .unwrap_or_default();

    if let Some(raw) = structured(value) {
        return finish(raw, Convention::Structured, feedback, rubric);
    }
    normalize_text(feedback, rubric)
}

/// Normalize free text carrying one of the embedded conventions
pub fn normalize_text(text: &str, rubric: &[String]) -> Normalized {
    if let Some(mut raw) = score_block(text) {
        if let Some(labels) = rubric_mapping(text) {
            raw.hit_labels = labels.hit_labels;
            raw.partial_labels = labels.partial_labels;
            raw.miss_labels = labels.miss_labels;
        }
        return finish(raw, Convention::ScoreBlock, text, rubric);
    }
    if let Some(raw) = rubric_mapping(text) {
        return finish(raw, Convention::RubricMapping, text, rubric);
    }
    if let Some(raw) = global_count(text) {
        return finish(raw, Convention::GlobalCount, text, rubric);
    }

    debug!(len = text.len(), "llm_response_unparsed");
    let note = format!("Could not read a score from the feedback service. {SCHEMA_HINT}");
    Normalized {
        feedback: with_notes(&strip_block(text), std::slice::from_ref(&note)),
        score: ScoreResult::zero(rubric),
        convention: Convention::Unparsed,
        notes: vec![note],
    }
}

fn number(value: &Value) -> Option<f64> {
    let n = match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().trim_end_matches('%').trim().parse().ok(),
        _ => None,
    }?;
    n.is_finite().then_some(n)
}

fn count(value: Option<&Value>) -> Option<usize> {
    let n = number(value?)?;
    (n >= 0.0).then(|| to_count(n))
}

fn to_count(n: f64) -> usize {
    n.min(MAX_COUNT).round() as usize
}

/// Similarity as a fraction; values above 1 are read as percentages
fn similarity_fraction(raw: f64) -> f64 {
    if raw > 1.0 {
        clamp01(raw / 100.0)
    } else {
        clamp01(raw)
    }
}

fn labels(value: Option<&Value>) -> Vec<String> {
    value
        .and_then(Value::as_array)
        .map(|items| {
            items
                .iter()
                .filter_map(|v| v.as_str().map(str::to_string))
                .collect()
        })
        .unwrap_or_default()
}

fn structured_fields(obj: &Value) -> Option<RawScore> {
    if obj.get("isHeuristic").and_then(Value::as_bool) == Some(true) {
        return None;
    }
    let similarity = similarity_fraction(number(obj.get("similarity")?)?);
    let hits = count(obj.get("rubricHit"))?;
    Some(RawScore {
        hits,
        partials: count(obj.get("rubricPartial")).unwrap_or(0),
        misses: count(obj.get("rubricMiss")).unwrap_or(0),
        similarity: Some(similarity),
        hit_labels: labels(obj.get("hits")),
        partial_labels: labels(obj.get("partials")),
        miss_labels: labels(obj.get("misses")),
    })
}

/// Score fields at the top level, else inside a nested `score` object
fn structured(value: &Value) -> Option<RawScore> {
    structured_fields(value).or_else(|| value.get("score").and_then(structured_fields))
}

fn field(block: &str, name: &str) -> Option<f64> {
    let re = cached_regex(&format!(
        r"(?im)^[\s*_-]*{name}[\s*_]*:[\s*_]*([0-9]+(?:\.[0-9]+)?)\s*(%)?"
    ))?;
    let caps = re.captures(block)?;
    let n: f64 = caps.get(1)?.as_str().parse().ok()?;
    Some(if caps.get(2).is_some() { n / 100.0 } else { n })
}

/// Convention A: `HITS:`, `MISSES:` and `SIMILARITY:` are required
fn score_block(text: &str) -> Option<RawScore> {
    let block = cached_regex(BLOCK)
        .and_then(|re| re.captures(text))
        .and_then(|c| c.get(1))
        .map_or(text, |m| m.as_str());

    let hits = field(block, "HITS")?;
    let misses = field(block, "MISSES")?;
    let similarity = field(block, "SIMILARITY")?;
    let partials = field(block, "PARTIALS").unwrap_or(0.0);
    if let Some(total) = field(block, "TOTAL") {
        debug!(total, "score_block_total");
    }

    Some(RawScore {
        hits: to_count(hits),
        partials: to_count(partials),
        misses: to_count(misses),
        similarity: Some(similarity_fraction(similarity)),
        ..RawScore::default()
    })
}

/// Lines of the "rubric mapping" section, or the marked verdict lines
/// (list items, bolded verdicts) when there is no such header
fn mapping_section(text: &str) -> Vec<&str> {
    let lines: Vec<&str> = text.lines().collect();
    let header = cached_regex(MAPPING_HEADER)
        .and_then(|re| lines.iter().position(|l| re.is_match(l)));
    let Some(start) = header else {
        return match cached_regex(MARKED_VERDICT) {
            Some(re) => lines.into_iter().filter(|l| re.is_match(l)).collect(),
            None => Vec::new(),
        };
    };
    let heading = cached_regex(HEADING);
    let section = &lines[start + 1..];
    let end = section
        .iter()
        .position(|l| heading.as_ref().is_some_and(|re| re.is_match(l)))
        .unwrap_or(section.len());
    section[..end].to_vec()
}

fn clean_label(raw: &str) -> String {
    raw.replace("**", "")
        .replace("__", "")
        .trim_matches(|c: char| c.is_whitespace() || ":|-–—*".contains(c))
        .to_string()
}

/// Convention B: per-item verdict lines, with their labels
fn rubric_mapping(text: &str) -> Option<RawScore> {
    let at_end = cached_regex(VERDICT_AT_END)?;
    let after_label = cached_regex(VERDICT_AFTER_LABEL)?;
    let mut raw = RawScore::default();

    for line in mapping_section(text) {
        let Some(caps) = at_end
            .captures(line)
            .or_else(|| after_label.captures(line))
        else {
            continue;
        };
        let label = caps.get(1).map(|m| clean_label(m.as_str())).unwrap_or_default();
        if label.is_empty() {
            continue;
        }
        match caps.get(2).map(|m| m.as_str().to_ascii_lowercase()).as_deref() {
            Some("hit") => {
                raw.hits += 1;
                raw.hit_labels.push(label);
            }
            Some("partial") => {
                raw.partials += 1;
                raw.partial_labels.push(label);
            }
            Some("miss") => {
                raw.misses += 1;
                raw.miss_labels.push(label);
            }
            _ => {}
        }
    }
    (raw.sum() > 0).then_some(raw)
}

/// Last resort: count capitalized verdict words anywhere
fn global_count(text: &str) -> Option<RawScore> {
    let re = cached_regex(GLOBAL_VERDICT)?;
    let mut raw = RawScore::default();
    for m in re.find_iter(text) {
        match m.as_str() {
            "Hit" => raw.hits += 1,
            "Partial" => raw.partials += 1,
            _ => raw.misses += 1,
        }
    }
    (raw.sum() > 0).then_some(raw)
}

/// Scale counts summing to more than `total` down to exactly `total`,
/// distributing the rounding remainder to the largest fractional parts.
fn scale_counts(counts: [usize; 3], total: usize) -> [usize; 3] {
    let sum: u128 = counts.iter().map(|&c| c as u128).sum();
    if sum == 0 {
        return [0; 3];
    }
    let mut scaled = [0usize; 3];
    let mut remainders = [(0u128, 0usize); 3];
    for (i, &c) in counts.iter().enumerate() {
        let share = c as u128 * total as u128;
        // share / sum never exceeds total
        scaled[i] = (share / sum) as usize;
        remainders[i] = (share % sum, i);
    }
    let mut left = total - scaled.iter().sum::<usize>();
    // Ties go to hits, then partials, then misses
    remainders.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    for (_, i) in remainders {
        if left == 0 {
            break;
        }
        scaled[i] += 1;
        left -= 1;
    }
    scaled
}

fn mentioned(labels: &[&Vec<String>], item: &str) -> bool {
    let item = item.to_lowercase();
    labels.iter().flat_map(|l| l.iter()).any(|l| {
        let l = l.to_lowercase();
        !l.is_empty() && (l.contains(&item) || item.contains(&l))
    })
}

/// Fit reported counts to the rubric length and build the final score
fn reconcile(mut raw: RawScore, rubric: &[String]) -> (ScoreResult, Vec<String>) {
    let total = rubric.len();
    let mut notes = Vec::new();
    let reported = raw.sum();

    if reported > total {
        let [h, p, m] = scale_counts([raw.hits, raw.partials, raw.misses], total);
        notes.push(format!(
            "Feedback reported {reported} rubric outcomes for {total} rubric items; counts were scaled to fit."
        ));
        debug!(reported, total, hits = h, partials = p, misses = m, "score_scaled");
        raw.hits = h;
        raw.partials = p;
        raw.misses = m;
    } else if reported < total {
        let shortfall = total - reported;
        notes.push(format!(
            "Feedback accounted for {reported} of {total} rubric items; {shortfall} unaccounted item(s) counted as missed."
        ));
        raw.misses += shortfall;

        let known = [&raw.hit_labels, &raw.partial_labels, &raw.miss_labels];
        let unaccounted: Vec<String> = rubric
            .iter()
            .filter(|item| !mentioned(&known, item))
            .take(shortfall)
            .cloned()
            .collect();
        raw.miss_labels.extend(unaccounted);
    }

    raw.hit_labels.truncate(raw.hits);
    raw.partial_labels.truncate(raw.partials);
    raw.miss_labels.truncate(raw.misses);

    let similarity = match raw.similarity {
        Some(s) => clamp01(s),
        None if total == 0 => 0.0,
        None => clamp01(
            (raw.hits as f64 + PARTIAL_CREDIT * raw.partials as f64) / total as f64,
        ),
    };

    let score = ScoreResult {
        similarity,
        rubric_hit: raw.hits,
        rubric_miss: raw.misses,
        rubric_partial: raw.partials,
        hits: raw.hit_labels,
        misses: raw.miss_labels,
        partials: raw.partial_labels,
        is_heuristic: false,
        details: None,
        items: Vec::new(),
    };
    (score, notes)
}

fn finish(raw: RawScore, convention: Convention, text: &str, rubric: &[String]) -> Normalized {
    debug!(
        convention = convention.as_str(),
        hits = raw.hits,
        partials = raw.partials,
        misses = raw.misses,
        "llm_response_parsed"
    );
    let (score, notes) = reconcile(raw, rubric);
    Normalized {
        feedback: with_notes(&strip_block(text), &notes),
        score,
        convention,
        notes,
    }
}

/// Remove the machine-readable block from display text
pub fn strip_block(text: &str) -> String {
    match cached_regex(BLOCK) {
        Some(re) => re.replace_all(text, "").trim().to_string(),
        None => text.trim().to_string(),
    }
}

fn with_notes(text: &str, notes: &[String]) -> String {
    let mut out = text.to_string();
    for note in notes {
        if !out.is_empty() {
            out.push_str("\n\n");
        }
        out.push_str("⚠ ");
        out.push_str(note);
    }
    out
}
