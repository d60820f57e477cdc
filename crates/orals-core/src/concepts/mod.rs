//! Clinical concept registry and detection
//!
//! Each concept carries one matching strategy: a single regular expression,
//! a custom detector built on the proximity primitives in [`context`], or a
//! list of synonym phrases. Detection is resolved through [`Concept::detect_with`]
//! so adding a concept without a strategy is a compile error.

pub mod context;
mod detectors;
pub mod phrase;
mod registry;

use serde::{Deserialize, Serialize, Serializer};

use crate::text::cached_regex;
pub use context::{DEFAULT_COOCCURRENCE_WINDOW, DEFAULT_NEGATION_WINDOW};

/// Broad grouping used when listing concepts
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ConceptCategory {
    Finding,
    Action,
    Diagnosis,
}

impl ConceptCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            ConceptCategory::Finding => "finding",
            ConceptCategory::Action => "action",
            ConceptCategory::Diagnosis => "diagnosis",
        }
    }
}

/// Outcome of checking one concept against a block of text
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Detection {
    pub hit: bool,
    /// Substring (or canonical phrase) that produced the hit
    pub quote: Option<String>,
    /// A mention was found but every occurrence sat in a negation scope
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub negated: bool,
}

impl Detection {
    pub fn hit(quote: impl Into<String>) -> Self {
        Detection {
            hit: true,
            quote: Some(quote.into()),
            negated: false,
        }
    }

    pub fn miss() -> Self {
        Detection::default()
    }

    pub fn negated_miss() -> Self {
        Detection {
            negated: true,
            ..Detection::default()
        }
    }
}

/// Window sizes for the proximity primitives
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct DetectorConfig {
    pub negation_window: usize,
    pub cooccurrence_window: usize,
}

impl Default for DetectorConfig {
    fn default() -> Self {
        DetectorConfig {
            negation_window: DEFAULT_NEGATION_WINDOW,
            cooccurrence_window: DEFAULT_COOCCURRENCE_WINDOW,
        }
    }
}

pub type DetectFn = fn(&str, &DetectorConfig) -> Detection;

/// How a concept decides whether it is present
#[derive(Clone, Copy)]
pub enum Strategy {
    /// One case-insensitive regular expression
    Pattern(&'static str),
    /// A custom predicate
    Detect(DetectFn),
    /// Exact word-boundary match of any synonym
    Synonyms,
}

impl std::fmt::Debug for Strategy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Strategy::Pattern(p) => f.debug_tuple("Pattern").field(p).finish(),
            Strategy::Detect(_) => f.write_str("Detect"),
            Strategy::Synonyms => f.write_str("Synonyms"),
        }
    }
}

impl Strategy {
    pub fn kind(&self) -> &'static str {
        match self {
            Strategy::Pattern(_) => "pattern",
            Strategy::Detect(_) => "detect",
            Strategy::Synonyms => "synonyms",
        }
    }
}

/// Every clinical concept the grader knows about
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Concept {
    AppendixDilated,
    Stranding,
    PeriappendicealFluid,
    Appendicolith,
    PerforationAbscess,
    EchogenicPyramids,
    PosteriorAcousticShadowing,
    CorticalSparing,
    TwinkleArtifact,
    StonesNonobstructing,
    Hydronephrosis,
    SurgeryConsult,
    Antibiotics,
    MetabolicWorkup,
    NephrologyReferral,
    Appendicitis,
    MedullaryNephrocalcinosis,
    HepaticAbscess,
    CysticMetastases,
    Nephrolithiasis,
    MedullarySpongeKidney,
    PrimaryHyperparathyroidism,
    DistalRta,
    HypervitaminosisD,
    Sarcoidosis,
}

impl Concept {
    pub const ALL: [Concept; 25] = [
        Concept::AppendixDilated,
        Concept::Stranding,
        Concept::PeriappendicealFluid,
        Concept::Appendicolith,
        Concept::PerforationAbscess,
        Concept::EchogenicPyramids,
        Concept::PosteriorAcousticShadowing,
        Concept::CorticalSparing,
        Concept::TwinkleArtifact,
        Concept::StonesNonobstructing,
        Concept::Hydronephrosis,
        Concept::SurgeryConsult,
        Concept::Antibiotics,
        Concept::MetabolicWorkup,
        Concept::NephrologyReferral,
        Concept::Appendicitis,
        Concept::MedullaryNephrocalcinosis,
        Concept::HepaticAbscess,
        Concept::CysticMetastases,
        Concept::Nephrolithiasis,
        Concept::MedullarySpongeKidney,
        Concept::PrimaryHyperparathyroidism,
        Concept::DistalRta,
        Concept::HypervitaminosisD,
        Concept::Sarcoidosis,
    ];

    /// Stable dotted identifier, e.g. `finding.appendix_dilated`
    pub fn id(&self) -> &'static str {
        registry::entry_for(*self).id
    }

    pub fn from_id(id: &str) -> Option<Concept> {
        let id = id.trim();
        Concept::ALL
            .iter()
            .copied()
            .find(|c| c.id().eq_ignore_ascii_case(id))
    }

    pub fn label(&self) -> &'static str {
        registry::entry_for(*self).label
    }

    pub fn synonyms(&self) -> &'static [&'static str] {
        registry::entry_for(*self).synonyms
    }

    pub fn strategy(&self) -> Strategy {
        registry::entry_for(*self).strategy
    }

    pub fn category(&self) -> ConceptCategory {
        match self {
            Concept::SurgeryConsult
            | Concept::Antibiotics
            | Concept::MetabolicWorkup
            | Concept::NephrologyReferral => ConceptCategory::Action,
            Concept::Appendicitis
            | Concept::MedullaryNephrocalcinosis
            | Concept::HepaticAbscess
            | Concept::CysticMetastases
            | Concept::Nephrolithiasis
            | Concept::MedullarySpongeKidney
            | Concept::PrimaryHyperparathyroidism
            | Concept::DistalRta
            | Concept::HypervitaminosisD
            | Concept::Sarcoidosis => ConceptCategory::Diagnosis,
            _ => ConceptCategory::Finding,
        }
    }

    /// Whether an explicitly negated mention still counts as addressed.
    ///
    /// Only hydronephrosis and non-obstructing stones behave this way: saying
    /// "no hydronephrosis" is the expected statement, not an omission.
    pub fn negation_counts_as_addressed(&self) -> bool {
        matches!(self, Concept::Hydronephrosis | Concept::StonesNonobstructing)
    }

    pub fn detect(&self, text: &str) -> Detection {
        self.detect_with(text, &DetectorConfig::default())
    }

    pub fn detect_with(&self, text: &str, config: &DetectorConfig) -> Detection {
        match self.strategy() {
            Strategy::Detect(detect) => detect(text, config),
            Strategy::Pattern(pattern) => match cached_regex(&format!("(?i){pattern}")) {
                Some(re) => first_affirmed(text, &re, config),
                None => Detection::miss(),
            },
            Strategy::Synonyms => detect_synonyms(text, self.synonyms(), config),
        }
    }
}

impl std::fmt::Display for Concept {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.id())
    }
}

impl Serialize for Concept {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(self.id())
    }
}

/// First occurrence of `re` outside any negation scope
pub(crate) fn first_affirmed(text: &str, re: &regex::Regex, config: &DetectorConfig) -> Detection {
    let mut negated = false;
    for m in re.find_iter(text) {
        if context::is_negated_at(text, m.start(), config.negation_window) {
            negated = true;
            continue;
        }
        return Detection::hit(m.as_str());
    }
    if negated {
        Detection::negated_miss()
    } else {
        Detection::miss()
    }
}

fn detect_synonyms(text: &str, synonyms: &[&str], config: &DetectorConfig) -> Detection {
    let mut negated = false;
    for re in synonyms.iter().filter_map(|s| phrase::phrase_regex(s)) {
        let found = first_affirmed(text, &re, config);
        if found.hit {
            return found;
        }
        negated |= found.negated;
    }
    Detection {
        negated,
        ..Detection::miss()
    }
}

/// One row of a full-text concept scan
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConceptHit {
    pub concept: Concept,
    pub category: ConceptCategory,
    pub label: &'static str,
    #[serde(flatten)]
    pub detection: Detection,
}

/// Run every registered concept against `text`, in registry order
pub fn scan(text: &str, config: &DetectorConfig) -> Vec<ConceptHit> {
    Concept::ALL
        .iter()
        .map(|c| ConceptHit {
            concept: *c,
            category: c.category(),
            label: c.label(),
            detection: c.detect_with(text, config),
        })
        .collect()
}
