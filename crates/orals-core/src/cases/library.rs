use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, warn};
use walkdir::WalkDir;

use super::Case;
use crate::error::{OralsError, Result};
use crate::progress::Attempt;

/// Selection criteria for listing cases
#[derive(Debug, Clone, Default)]
pub struct CaseFilter {
    /// Keep cases in any of these subspecialties (case-insensitive); empty keeps all
    pub subspecialties: Vec<String>,
    /// Free-text substring over title, prompt, expected answer, tags and subspecialty
    pub query: Option<String>,
}

impl CaseFilter {
    pub fn matches(&self, case: &Case) -> bool {
        let sub_ok = self.subspecialties.is_empty()
            || self
                .subspecialties
                .iter()
                .any(|s| s.eq_ignore_ascii_case(&case.subspecialty));
        let query_ok = match self.query.as_deref().map(str::trim) {
            Some(q) if !q.is_empty() => case.haystack().contains(&q.to_lowercase()),
            _ => true,
        };
        sub_ok && query_ok
    }
}

/// Cases loaded from a JSON file or a directory of JSON files
///
/// Loading is explicit: nothing is read until [`CaseLibrary::load`], and the
/// in-memory copy only changes on [`CaseLibrary::refresh`].
#[derive(Debug, Clone, Default)]
pub struct CaseLibrary {
    source: Option<PathBuf>,
    cases: Vec<Case>,
}

impl CaseLibrary {
    /// Library over an in-memory set, sorted by id
    pub fn new(mut cases: Vec<Case>) -> Self {
        cases.sort_by(|a, b| a.id.cmp(&b.id));
        CaseLibrary {
            source: None,
            cases,
        }
    }

    #[tracing::instrument(skip(path), fields(path = %path.as_ref().display()))]
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let cases = read_cases(path)?;
        debug!(count = cases.len(), "loaded cases");
        let mut library = CaseLibrary::new(cases);
        library.source = Some(path.to_path_buf());
        Ok(library)
    }

    /// Re-read the source; on failure the previous cases are kept
    pub fn refresh(&mut self) -> Result<usize> {
        let Some(path) = self.source.clone() else {
            return Ok(self.cases.len());
        };
        let fresh = CaseLibrary::load(&path)?;
        self.cases = fresh.cases;
        Ok(self.cases.len())
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn len(&self) -> usize {
        self.cases.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cases.is_empty()
    }

    pub fn all(&self) -> &[Case] {
        &self.cases
    }

    pub fn find(&self, id: &str) -> Option<&Case> {
        self.cases.iter().find(|c| c.id == id)
    }

    pub fn get(&self, id: &str) -> Result<&Case> {
        self.find(id).ok_or_else(|| OralsError::CaseNotFound {
            id: id.to_string(),
        })
    }

    pub fn filter(&self, filter: &CaseFilter) -> Vec<&Case> {
        self.cases.iter().filter(|c| filter.matches(c)).collect()
    }

    /// Next case to practice: the first never-attempted case, else the one with
    /// the lowest mean similarity (ties go to the earlier id)
    pub fn suggest_next(&self, attempts: &[Attempt], filter: &CaseFilter) -> Option<&Case> {
        let candidates = self.filter(filter);

        let mut sims: HashMap<&str, (f64, usize)> = HashMap::new();
        for a in attempts {
            let entry = sims.entry(a.case_id.as_str()).or_default();
            entry.0 += a.similarity;
            entry.1 += 1;
        }

        if let Some(fresh) = candidates
            .iter()
            .find(|c| !sims.contains_key(c.id.as_str()))
            .copied()
        {
            return Some(fresh);
        }

        let mean = |c: &Case| {
            sims.get(c.id.as_str())
                .map(|(sum, n)| sum / *n as f64)
                .unwrap_or(0.0)
        };
        candidates
            .into_iter()
            .min_by(|a, b| mean(*a).total_cmp(&mean(*b)))
    }
}

fn invalid(path: &Path, reason: impl std::fmt::Display) -> OralsError {
    OralsError::InvalidCaseLibrary {
        path: path.to_path_buf(),
        reason: reason.to_string(),
    }
}

fn read_cases(path: &Path) -> Result<Vec<Case>> {
    let cases = if path.is_dir() {
        read_case_dir(path)
    } else {
        let content = fs::read_to_string(path).map_err(|e| invalid(path, e))?;
        parse_cases(&content).map_err(|e| invalid(path, e))?
    };

    let mut seen = std::collections::HashSet::new();
    if let Some(dup) = cases.iter().find(|c| !seen.insert(c.id.as_str())) {
        return Err(invalid(path, format!("duplicate case id {}", dup.id)));
    }
    Ok(cases)
}

/// A file holds either an array of cases or a single case object
fn parse_cases(content: &str) -> std::result::Result<Vec<Case>, serde_json::Error> {
    let value: serde_json::Value = serde_json::from_str(content)?;
    if value.is_array() {
        serde_json::from_value(value)
    } else {
        Ok(vec![serde_json::from_value(value)?])
    }
}

fn read_case_dir(dir: &Path) -> Vec<Case> {
    let mut cases = Vec::new();
    for entry in WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(|e| e.ok())
    {
        let path = entry.path();
        if !path.extension().is_some_and(|e| e == "json") {
            continue;
        }
        let parsed = fs::read_to_string(path)
            .map_err(|e| e.to_string())
            .and_then(|content| parse_cases(&content).map_err(|e| e.to_string()));
        match parsed {
            Ok(found) => cases.extend(found),
            Err(e) => {
                warn!(path = %path.display(), error = %e, "Failed to parse case file");
            }
        }
    }
    cases
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progress::AttemptType;
    use tempfile::tempdir;

    const CASES: &str = r#"[
      {"id":"gu-001","title":"Flank pain","subspecialty":"Genitourinary Radiology",
       "boardPrompt":"Renal ultrasound.","expectedAnswer":"Medullary nephrocalcinosis",
       "rubric":["echogenic pyramids"],"tags":["kidney"]},
      {"id":"gi-001","title":"RLQ pain","subspecialty":"Gastrointestinal Radiology",
       "boardPrompt":"CT abdomen.","expectedAnswer":"Acute appendicitis",
       "rubric":["acute appendicitis","appendicolith"]},
      {"id":"gi-002","title":"Liver lesion","subspecialty":"Gastrointestinal Radiology"}
    ]"#;

    fn library() -> CaseLibrary {
        let cases: Vec<Case> = serde_json::from_str(CASES).unwrap();
        CaseLibrary::new(cases)
    }

    fn attempt(case_id: &str, similarity: f64) -> Attempt {
        Attempt {
            ts: 0,
            case_id: case_id.to_string(),
            subspecialty: String::new(),
            similarity,
            rubric_hit: 0,
            rubric_total: 0,
            letter: "F".to_string(),
            kind: AttemptType::Oral,
        }
    }

    #[test]
    fn test_sorted_and_lookup() {
        let lib = library();
        let ids: Vec<&str> = lib.all().iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["gi-001", "gi-002", "gu-001"]);
        assert_eq!(lib.get("gu-001").unwrap().title, "Flank pain");
        assert!(matches!(
            lib.get("nope"),
            Err(OralsError::CaseNotFound { .. })
        ));
    }

    #[test]
    fn test_filter_by_sub_and_query() {
        let lib = library();
        let gi = CaseFilter {
            subspecialties: vec!["gastrointestinal radiology".into()],
            query: None,
        };
        assert_eq!(lib.filter(&gi).len(), 2);

        let query = CaseFilter {
            subspecialties: vec![],
            query: Some("KIDNEY".into()),
        };
        let hits = lib.filter(&query);
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].id, "gu-001");

        let expected = CaseFilter {
            subspecialties: vec![],
            query: Some("appendicitis".into()),
        };
        assert_eq!(lib.filter(&expected)[0].id, "gi-001");
    }

    #[test]
    fn test_suggest_next_prefers_unattempted_then_weakest() {
        let lib = library();
        let all = CaseFilter::default();
        assert_eq!(lib.suggest_next(&[], &all).unwrap().id, "gi-001");

        let attempts = vec![attempt("gi-001", 0.9), attempt("gi-002", 0.3)];
        assert_eq!(lib.suggest_next(&attempts, &all).unwrap().id, "gu-001");

        let attempts = vec![
            attempt("gi-001", 0.9),
            attempt("gi-002", 0.3),
            attempt("gi-002", 0.5),
            attempt("gu-001", 0.6),
        ];
        assert_eq!(lib.suggest_next(&attempts, &all).unwrap().id, "gi-002");
    }

    #[test]
    fn test_load_file_and_refresh() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cases.json");
        fs::write(&path, CASES).unwrap();

        let mut lib = CaseLibrary::load(&path).unwrap();
        assert_eq!(lib.len(), 3);

        fs::write(&path, r#"{"id":"solo","title":"Only one"}"#).unwrap();
        assert_eq!(lib.len(), 3);
        assert_eq!(lib.refresh().unwrap(), 1);
        assert_eq!(lib.all()[0].id, "solo");
    }

    #[test]
    fn test_load_directory_skips_bad_files() {
        let dir = tempdir().unwrap();
        fs::create_dir(dir.path().join("gi")).unwrap();
        fs::write(
            dir.path().join("gi").join("a.json"),
            r#"{"id":"gi-001","title":"RLQ pain"}"#,
        )
        .unwrap();
        fs::write(dir.path().join("b.json"), r#"[{"id":"gu-001"}]"#).unwrap();
        fs::write(dir.path().join("broken.json"), "{oops").unwrap();
        fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let lib = CaseLibrary::load(dir.path()).unwrap();
        assert_eq!(lib.len(), 2);
    }

    #[test]
    fn test_invalid_library_errors() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cases.json");
        fs::write(&path, "not json").unwrap();
        assert!(matches!(
            CaseLibrary::load(&path),
            Err(OralsError::InvalidCaseLibrary { .. })
        ));
        assert!(CaseLibrary::load(dir.path().join("missing.json")).is_err());

        let dup = tempdir().unwrap();
        fs::write(dup.path().join("a.json"), r#"{"id":"x"}"#).unwrap();
        fs::write(dup.path().join("b.json"), r#"{"id":"x"}"#).unwrap();
        assert!(CaseLibrary::load(dup.path()).is_err());
    }

    #[test]
    fn test_duplicate_ids_in_one_file_rejected() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("cases.json");
        fs::write(&path, r#"[{"id":"gi-001","title":"First"},{"id":"gi-001","title":"Second"}]"#)
            .unwrap();

        match CaseLibrary::load(&path) {
            Err(OralsError::InvalidCaseLibrary { reason, .. }) => {
                assert!(reason.contains("duplicate case id gi-001"));
            }
            other => panic!("expected duplicate id error, got {:?}", other.map(|l| l.len())),
        }
    }
}
