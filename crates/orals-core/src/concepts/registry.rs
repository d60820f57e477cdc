use super::detectors;
use super::{Concept, Strategy};

#[derive(Clone, Copy)]
pub(super) struct Entry {
    pub id: &'static str,
    pub label: &'static str,
    pub synonyms: &'static [&'static str],
    pub strategy: Strategy,
}

const fn entry(
    id: &'static str,
    label: &'static str,
    synonyms: &'static [&'static str],
    strategy: Strategy,
) -> Entry {
    Entry {
        id,
        label,
        synonyms,
        strategy,
    }
}

pub(super) fn entry_for(concept: Concept) -> Entry {
    use Strategy::*;

    match concept {
        // Abdominal findings
        Concept::AppendixDilated => entry(
            "finding.appendix_dilated",
            "Enlarged/dilated appendix (>6 mm)",
            &[
                ">6 mm",
                "greater than 6 mm",
                "dilated appendix",
                "enlarged appendix",
                "increased caliber",
                "noncompressible appendix",
            ],
            Pattern(
                r"\b(?:enlarged|dilated|noncompressible)\s+append(?:ix|ices)\b|>\s*6\s*mm\b|\bgreater\s+than\s+6\s*mm\b|\bincreased\s+caliber\b",
            ),
        ),
        Concept::Stranding => entry(
            "finding.stranding",
            "Periappendiceal/fat stranding",
            &[
                "periappendiceal stranding",
                "fat stranding",
                "inflammatory stranding",
                "inflammatory changes",
                "RLQ stranding",
            ],
            Detect(detectors::stranding),
        ),
        Concept::PeriappendicealFluid => entry(
            "finding.periappendiceal_fluid",
            "Periappendiceal fluid / free fluid",
            &[
                "periappendiceal fluid",
                "free fluid",
                "fluid surrounding the appendix",
            ],
            Pattern(r"\b(?:periappendiceal\s+fluid|free\s+fluid|fluid)\b"),
        ),
        Concept::Appendicolith => entry(
            "finding.appendicolith",
            "Appendicolith",
            &["appendicolith", "fecalith", "coprolith", "appendiceal stone"],
            Pattern(r"\b(?:appendicolith|fecalith|coprolith|appendiceal\s+stone)\b"),
        ),
        Concept::PerforationAbscess => entry(
            "finding.perforation_abscess",
            "Complications (perforation/abscess/free air)",
            &[
                "perforation",
                "perforated",
                "free air",
                "extraluminal air",
                "abscess",
                "phlegmon",
                "fluid collection",
                "wall discontinuity",
            ],
            Pattern(
                r"\b(?:perforation|perforated|free\s+air|extraluminal\s+air|abscess|phlegmon|fluid\s+collection|wall\s+discontinuity)\b",
            ),
        ),

        // Renal ultrasound findings
        Concept::EchogenicPyramids => entry(
            "finding.echogenic_pyramids",
            "Echogenic medullary pyramids",
            &[
                "echogenic pyramids",
                "echogenic medullary pyramids",
                "bright pyramids",
                "hyperechoic pyramids",
                "medullary echogenicity",
            ],
            Detect(detectors::echogenic_pyramids),
        ),
        Concept::PosteriorAcousticShadowing => entry(
            "finding.posterior_acoustic_shadowing",
            "Posterior acoustic shadowing",
            &[
                "posterior acoustic shadowing",
                "acoustic shadowing",
                "clean shadowing",
                "shadowing artifact",
            ],
            Pattern(r"\b(?:posterior\s+)?acoustic\s+shadow(?:ing)?\b|\bclean\s+shadow(?:ing)?\b"),
        ),
        Concept::CorticalSparing => entry(
            "finding.cortical_sparing",
            "Cortical sparing (medulla > cortex echogenicity)",
            &[
                "cortical sparing",
                "cortex spared",
                "medulla greater than cortex echogenicity",
                "medulla > cortex",
            ],
            Detect(detectors::cortical_sparing),
        ),
        Concept::TwinkleArtifact => entry(
            "finding.twinkle_artifact",
            "Twinkle artifact on color Doppler",
            &["twinkle artifact", "color twinkle"],
            Synonyms,
        ),
        Concept::StonesNonobstructing => entry(
            "finding.stones_nonobstructing",
            "Non-obstructing renal stones",
            &[
                "nonobstructing stone",
                "punctate stones",
                "calcifications within pyramids",
            ],
            Detect(detectors::stones_nonobstructing),
        ),
        Concept::Hydronephrosis => entry(
            "finding.hydronephrosis",
            "Hydronephrosis mentioned",
            &["hydronephrosis"],
            Detect(detectors::hydronephrosis),
        ),

        // Management
        Concept::SurgeryConsult => entry(
            "action.surgery_consult",
            "Recommends surgery / surgical consult / appendectomy",
            &[
                "surgical consult",
                "surgical consultation",
                "surgery",
                "appendectomy",
            ],
            Pattern(r"\b(?:surgical\s+consult(?:ation)?|surgery|appendectomy)\b"),
        ),
        Concept::Antibiotics => entry(
            "action.antibiotics",
            "Mentions antibiotics",
            &["antibiotic", "antibiotics"],
            Synonyms,
        ),
        Concept::MetabolicWorkup => entry(
            "action.metabolic_workup",
            "Recommends metabolic evaluation (PTH/Ca/HCO3/urine studies)",
            &[
                "metabolic workup",
                "metabolic evaluation",
                "metabolic work-up",
                "check PTH",
                "check calcium",
                "serum bicarbonate",
                "urine pH",
                "24 hour urine",
            ],
            Pattern(
                r"\bmetabolic\s+(?:work-?up|evaluation)\b|\bcheck\s+(?:pth|calcium|ca|bicarbonate|urine\s+ph)\b|\b24\s*-?\s*hour\s+urine\b",
            ),
        ),
        Concept::NephrologyReferral => entry(
            "action.nephrology_referral",
            "Nephrology referral",
            &["nephrology referral", "refer to nephrology"],
            Pattern(r"\bnephrology\s+referr(?:al|ed|ing)?\b|\brefer\s+to\s+nephrology\b"),
        ),

        // Diagnoses
        Concept::Appendicitis => entry(
            "dx.appendicitis",
            "Acute appendicitis",
            &["acute appendicitis", "appendicitis"],
            Pattern(r"\bacute\s+appendicitis\b|\bappendicitis\b"),
        ),
        Concept::MedullaryNephrocalcinosis => entry(
            "dx.medullary_nephrocalcinosis",
            "Medullary nephrocalcinosis",
            &["medullary nephrocalcinosis", "nephrocalcinosis"],
            Pattern(r"\bmedullary\s+nephrocalcinosis\b|\bnephrocalcinosis\b"),
        ),
        Concept::HepaticAbscess => entry(
            "dx.hepatic_abscess",
            "Hepatic abscess",
            &["hepatic abscess", "liver abscess", "pyogenic abscess"],
            Pattern(r"\b(?:hepatic|liver|pyogenic)\s+abscess\b"),
        ),
        Concept::CysticMetastases => entry(
            "dx.cystic_metastases",
            "Cystic or necrotic liver metastases",
            &[
                "cystic metastases",
                "necrotic metastases",
                "cystic liver metastases",
                "necrotic liver mets",
            ],
            Pattern(r"\b(?:cystic|necrotic)\s+(?:liver\s+)?(?:metastas[ie]s|mets)\b"),
        ),
        Concept::Nephrolithiasis => entry(
            "dx.nephrolithiasis",
            "Nephrolithiasis (stones)",
            &[
                "renal stone",
                "kidney stone",
                "nephrolithiasis",
                "urolithiasis",
                "calculi",
            ],
            Pattern(r"\b(?:nephro|uro)?lithiasis\b|\b(?:renal|kidney)\s+stones?\b|\bcalcul(?:us|i)\b"),
        ),
        Concept::MedullarySpongeKidney => entry(
            "dx.medullary_sponge_kidney",
            "Medullary sponge kidney",
            &["medullary sponge kidney", "MSK"],
            Pattern(r"\bmedullary\s+sponge\s+kidney\b|\bmsk\b"),
        ),
        Concept::PrimaryHyperparathyroidism => entry(
            "dx.primary_hyperparathyroidism",
            "Primary hyperparathyroidism",
            &["primary hyperparathyroidism", "hyperparathyroidism"],
            Pattern(r"\b(?:primary\s+)?hyperparathyroidism\b|\bpth\b"),
        ),
        Concept::DistalRta => entry(
            "dx.distal_rta_type_1",
            "Distal (type 1) renal tubular acidosis",
            &["distal renal tubular acidosis", "distal RTA", "type 1 RTA"],
            Pattern(r"\b(?:distal\s+)?(?:renal\s+tubular\s+acidosis|rta)\b|\btype\s*1\s*rta\b"),
        ),
        Concept::HypervitaminosisD => entry(
            "dx.hypervitaminosis_d",
            "Hypervitaminosis D",
            &[
                "hypervitaminosis D",
                "vitamin D excess",
                "vitamin D intoxication",
            ],
            Pattern(r"\bhypervitaminosis\s*d\b|\bvitamin\s*d\s*(?:excess|intoxication)\b"),
        ),
        Concept::Sarcoidosis => entry("dx.sarcoidosis", "Sarcoidosis", &["sarcoidosis"], Synonyms),
    }
}
