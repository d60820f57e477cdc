//! Letter grades from similarity and rubric coverage

use serde::{Deserialize, Serialize};

use crate::score::ScoreResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Letter {
    A,
    B,
    C,
    D,
    F,
}

impl Letter {
    pub const ALL: [Letter; 5] = [Letter::A, Letter::B, Letter::C, Letter::D, Letter::F];

    pub fn as_str(&self) -> &'static str {
        match self {
            Letter::A => "A",
            Letter::B => "B",
            Letter::C => "C",
            Letter::D => "D",
            Letter::F => "F",
        }
    }

    pub fn parse(s: &str) -> Option<Letter> {
        match s.trim().to_ascii_uppercase().as_str() {
            "A" => Some(Letter::A),
            "B" => Some(Letter::B),
            "C" => Some(Letter::C),
            "D" => Some(Letter::D),
            "F" => Some(Letter::F),
            _ => None,
        }
    }
}

impl std::fmt::Display for Letter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One grade band: reached when either signal clears its cutoff
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Band {
    pub letter: Letter,
    pub rubric_frac: f64,
    pub similarity: f64,
}

/// Descending bands plus how the similarity cutoff is compared
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ThresholdTable {
    pub bands: Vec<Band>,
    /// Similarity must exceed its cutoff rather than merely reach it
    #[serde(default)]
    pub strict_similarity: bool,
}

impl ThresholdTable {
    /// Classic cutoffs: similarity must strictly exceed its threshold
    pub fn classic() -> Self {
        ThresholdTable {
            bands: vec![
                band(Letter::A, 0.80, 0.75),
                band(Letter::B, 0.66, 0.65),
                band(Letter::C, 0.50, 0.55),
                band(Letter::D, 0.33, 0.45),
            ],
            strict_similarity: true,
        }
    }

    /// Revised cutoffs with the same value for both signals
    pub fn aligned() -> Self {
        ThresholdTable {
            bands: vec![
                band(Letter::A, 0.80, 0.80),
                band(Letter::B, 0.70, 0.70),
                band(Letter::C, 0.60, 0.60),
                band(Letter::D, 0.50, 0.50),
            ],
            strict_similarity: false,
        }
    }

    pub fn preset(name: &str) -> Option<Self> {
        match name.trim().to_ascii_lowercase().as_str() {
            "classic" => Some(Self::classic()),
            "aligned" => Some(Self::aligned()),
            _ => None,
        }
    }

    /// First band (top-down) either signal satisfies, else F
    pub fn letter_for(&self, similarity: f64, rubric_frac: f64) -> Letter {
        let sim_clears = |cutoff: f64| {
            if self.strict_similarity {
                similarity > cutoff
            } else {
                similarity >= cutoff
            }
        };
        self.bands
            .iter()
            .find(|b| rubric_frac >= b.rubric_frac || sim_clears(b.similarity))
            .map(|b| b.letter)
            .unwrap_or(Letter::F)
    }

    pub fn letter(&self, score: &ScoreResult) -> Letter {
        self.letter_for(score.similarity, score.rubric_frac())
    }
}

impl Default for ThresholdTable {
    fn default() -> Self {
        Self::classic()
    }
}

const fn band(letter: Letter, rubric_frac: f64, similarity: f64) -> Band {
    Band {
        letter,
        rubric_frac,
        similarity,
    }
}

/// Letter under the default table
pub fn letter(score: &ScoreResult) -> Letter {
    ThresholdTable::default().letter(score)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_both_presets_give_a_at_080() {
        for table in [ThresholdTable::classic(), ThresholdTable::aligned()] {
            assert_eq!(table.letter_for(0.80, 0.80), Letter::A);
        }
    }

    #[test]
    fn test_classic_similarity_is_strict() {
        let table = ThresholdTable::classic();
        assert_eq!(table.letter_for(0.75, 0.0), Letter::B);
        assert_eq!(table.letter_for(0.7501, 0.0), Letter::A);
        assert_eq!(table.letter_for(0.45, 0.0), Letter::F);
    }

    #[test]
    fn test_better_band_wins() {
        let table = ThresholdTable::classic();
        assert_eq!(table.letter_for(0.1, 0.66), Letter::B);
        assert_eq!(table.letter_for(0.56, 0.0), Letter::C);
        assert_eq!(table.letter_for(0.0, 0.33), Letter::D);
        assert_eq!(table.letter_for(0.0, 0.0), Letter::F);
    }

    #[test]
    fn test_aligned_is_inclusive() {
        let table = ThresholdTable::aligned();
        assert_eq!(table.letter_for(0.70, 0.0), Letter::B);
        assert_eq!(table.letter_for(0.0, 0.66), Letter::C);
        assert_eq!(table.letter_for(0.49, 0.49), Letter::F);
    }

    #[test]
    fn test_letter_uses_rubric_hit_fraction() {
        let mut score = ScoreResult::zero(&[]);
        score.rubric_hit = 7;
        score.rubric_partial = 2;
        score.rubric_miss = 1;
        // 7 / 10 = 0.7; the two partials do not lift it to 0.8
        assert_eq!(letter(&score), Letter::B);

        score.rubric_hit = 8;
        score.rubric_partial = 1;
        assert_eq!(letter(&score), Letter::A);
    }

    #[test]
    fn test_custom_table_from_toml() {
        let table: ThresholdTable = toml::from_str(
            r#"
            bands = [
              { letter = "A", rubric_frac = 0.9, similarity = 0.9 },
              { letter = "C", rubric_frac = 0.5, similarity = 0.5 },
            ]
            "#,
        )
        .unwrap();
        assert!(!table.strict_similarity);
        assert_eq!(table.letter_for(0.6, 0.0), Letter::C);
        assert_eq!(table.letter_for(0.95, 0.0), Letter::A);
    }

    #[test]
    fn test_letter_parse() {
        assert_eq!(Letter::parse(" b "), Some(Letter::B));
        assert_eq!(Letter::parse("E"), None);
    }
}
