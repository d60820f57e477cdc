//! Custom detectors for concepts a single pattern cannot express

use super::context::{co_occurrences, is_negated, is_negated_at};
use super::{first_affirmed, Detection, DetectorConfig};
use crate::text::cached_regex;

/// Affirmed `anchor` mention with `partner` nearby, as a detection
fn affirmed_co_occurrence(
    text: &str,
    anchor: &str,
    partner: &str,
    config: &DetectorConfig,
    quote: &str,
) -> Detection {
    let (Some(anchor), Some(partner)) = (cached_regex(anchor), cached_regex(partner)) else {
        return Detection::miss();
    };
    let mut negated = false;
    for m in co_occurrences(text, &anchor, &partner, config.cooccurrence_window) {
        if is_negated_at(text, m.start(), config.negation_window) {
            negated = true;
            continue;
        }
        return Detection::hit(quote);
    }
    Detection {
        negated,
        ..Detection::miss()
    }
}

fn direct(text: &str, pattern: &str, config: &DetectorConfig) -> Option<Detection> {
    let re = cached_regex(pattern)?;
    let found = first_affirmed(text, &re, config);
    found.hit.then_some(found)
}

/// Named stranding, or bare "stranding" near an appendiceal/RLQ landmark
pub(super) fn stranding(text: &str, config: &DetectorConfig) -> Detection {
    const DIRECT: &str = r"(?i)\b(?:peri[-\s]?appendice(?:al|ar)\s+stranding|(?:fat|inflammatory|rlq)\s+stranding|inflammatory\s+changes?)\b";
    const STRAND: &str = r"(?i)\bstranding\b";
    const LANDMARK: &str = r"(?i)\b(?:append(?:ix|ices|iceal|icear)|rlq|right\s+lower\s+quadrant|cecal|cecum|peri[-\s]?append)";

    if let Some(found) = direct(text, DIRECT, config) {
        return found;
    }
    affirmed_co_occurrence(text, STRAND, LANDMARK, config, "stranding")
}

/// Echogenic pyramids, stated directly or as two nearby halves
pub(super) fn echogenic_pyramids(text: &str, config: &DetectorConfig) -> Detection {
    const DIRECT: &str = r"(?i)\b(?:echogenic|hyperechoic|bright)\s+(?:medullary\s+)?pyramids?\b|\bmedullary\s+echogenicity\b";
    const BRIGHT: &str = r"(?i)\b(?:echogenic|hyperechoic|bright)\b";
    const MEDULLA: &str = r"(?i)\b(?:medullary|pyramids?)\b";

    if let Some(found) = direct(text, DIRECT, config) {
        return found;
    }
    affirmed_co_occurrence(text, BRIGHT, MEDULLA, config, "echogenic … pyramids")
}

/// Cortical sparing, or a medulla-brighter-than-cortex comparison
pub(super) fn cortical_sparing(text: &str, config: &DetectorConfig) -> Detection {
    const DIRECT: &str = r"(?i)\bcortical\s+sparing\b|\bcortex\s+spared\b";
    const MEDULLA: &str = r"(?i)\b(?:medulla(?:ry)?|pyramids?)\b";
    const BRIGHTER_THAN_CORTEX: &str = r"(?i)(?:>|\bgreater\s+than\b).{0,20}\bcortex\b";

    if let Some(found) = direct(text, DIRECT, config) {
        return found;
    }
    affirmed_co_occurrence(text, MEDULLA, BRIGHTER_THAN_CORTEX, config, "medulla > cortex")
}

/// Stones plus any statement that they do not obstruct.
///
/// "No hydronephrosis" is accepted as that statement.
pub(super) fn stones_nonobstructing(text: &str, config: &DetectorConfig) -> Detection {
    const STONE: &str = r"(?i)\b(?:stones?|calculi|calcifications?)\b";
    const NONOBSTRUCTING: &str = r"(?i)\b(?:non-?obstruct(?:ing|ive)|no\s+hydronephrosis)\b";
    const HYDRO: &str = r"(?i)\bhydronephrosis\b";

    let Some(stone) = cached_regex(STONE) else {
        return Detection::miss();
    };
    let found = first_affirmed(text, &stone, config);
    if !found.hit {
        return found;
    }

    let nonobstructing = cached_regex(NONOBSTRUCTING).is_some_and(|re| re.is_match(text))
        || cached_regex(HYDRO).is_some_and(|re| is_negated(text, &re, config.negation_window));
    if nonobstructing {
        found
    } else {
        Detection::miss()
    }
}

/// Any mention of hydronephrosis, negated or not, addresses the concept
pub(super) fn hydronephrosis(text: &str, config: &DetectorConfig) -> Detection {
    const HYDRO: &str = r"(?i)\bhydronephrosis\b";

    let Some(re) = cached_regex(HYDRO) else {
        return Detection::miss();
    };
    if is_negated(text, &re, config.negation_window) {
        return Detection {
            hit: true,
            quote: Some("no hydronephrosis".to_string()),
            negated: true,
        };
    }
    match re.find(text) {
        Some(m) => Detection::hit(m.as_str()),
        None => Detection::miss(),
    }
}
