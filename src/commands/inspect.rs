//! Inspection commands: `classify`, `detect`, `normalize`, `letter`
//!
//! These expose single grading stages so a rubric line, a transcript
//! fragment or a feedback-service reply can be checked in isolation.

use crate::cli::{DetectArgs, LetterArgs, NormalizeArgs, OutputFormat};
use crate::commands::dispatch::CommandContext;
use crate::commands::helpers::{pct, read_input};
use orals_core::bail_unsupported;
use orals_core::concepts::{scan, Concept, ConceptHit};
use orals_core::error::{OralsError, Result};
use orals_core::format::{csv_or_dash, escape_quotes};
use orals_core::grade::ThresholdTable;
use orals_core::llm::normalize_response;
use orals_core::rubric::classify;

pub fn execute_classify(ctx: &CommandContext, item: &str) -> Result<()> {
    let category = classify(item);
    let concepts: Vec<&str> = category
        .map(|c| c.concepts().iter().map(|k| k.id()).collect())
        .unwrap_or_default();

    match ctx.cli.format {
        OutputFormat::Human => match category {
            Some(c) => {
                println!("{}", c);
                for id in &concepts {
                    println!("  {}", id);
                }
            }
            None => println!("none (matched by word overlap)"),
        },
        OutputFormat::Json => {
            let output = serde_json::json!({
                "item": item,
                "category": category,
                "concepts": concepts,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Records => {
            println!(
                "H orals=1 records=1 mode=classify category={} concepts={} item=\"{}\"",
                category.map(|c| c.as_str()).unwrap_or("none"),
                csv_or_dash(&concepts.iter().map(|s| s.to_string()).collect::<Vec<_>>()),
                escape_quotes(item)
            );
        }
    }
    Ok(())
}

pub fn execute_detect(ctx: &CommandContext, args: &DetectArgs) -> Result<()> {
    let config = &ctx.config.grading.detectors;
    let rows: Vec<ConceptHit> = match &args.concept {
        Some(id) => {
            let concept = Concept::from_id(id)
                .ok_or_else(|| OralsError::not_found("concept", id))?;
            vec![ConceptHit {
                concept,
                category: concept.category(),
                label: concept.label(),
                detection: concept.detect_with(&args.text, config),
            }]
        }
        None => scan(&args.text, config),
    };
    // A single requested concept is always shown
    let show_all = args.all || args.concept.is_some();
    let shown: Vec<&ConceptHit> = rows
        .iter()
        .filter(|r| show_all || r.detection.hit)
        .collect();

    match ctx.cli.format {
        OutputFormat::Human => {
            if shown.is_empty() {
                println!("No concepts detected");
            }
            for row in &shown {
                let status = if row.detection.hit {
                    "hit"
                } else if row.detection.negated {
                    "negated"
                } else {
                    "miss"
                };
                match &row.detection.quote {
                    Some(q) => println!("{:<8} {} ({}): \"{}\"", status, row.concept, row.label, q),
                    None => println!("{:<8} {} ({})", status, row.concept, row.label),
                }
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&shown)?),
        OutputFormat::Records => {
            println!(
                "H orals=1 records=1 mode=detect hits={}",
                rows.iter().filter(|r| r.detection.hit).count()
            );
            for row in &shown {
                println!(
                    "D {} {} hit={} negated={} \"{}\"",
                    row.concept,
                    row.category.as_str(),
                    row.detection.hit,
                    row.detection.negated,
                    escape_quotes(row.detection.quote.as_deref().unwrap_or_default())
                );
            }
        }
    }
    Ok(())
}

pub fn execute_normalize(ctx: &CommandContext, args: &NormalizeArgs) -> Result<()> {
    let rubric: Vec<String> = match (&args.case, args.rubric_size) {
        (Some(id), _) => ctx.library()?.get(id)?.rubric.clone(),
        (None, Some(n)) => (1..=n).map(|i| format!("item {}", i)).collect(),
        (None, None) => Vec::new(),
    };
    let body = read_input(&args.response)?;
    let normalized = normalize_response(&body, &rubric);
    let score = &normalized.score;

    match ctx.cli.format {
        OutputFormat::Human => {
            println!("Convention: {}", normalized.convention.as_str());
            println!(
                "Similarity: {}%  Hit: {}  Partial: {}  Miss: {}",
                pct(score.similarity),
                score.rubric_hit,
                score.rubric_partial,
                score.rubric_miss
            );
            println!();
            println!("{}", normalized.feedback);
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&normalized)?),
        OutputFormat::Records => {
            println!(
                "H orals=1 records=1 mode=normalize convention={} similarity={:.2} hit={} partial={} miss={}",
                normalized.convention.as_str(),
                score.similarity,
                score.rubric_hit,
                score.rubric_partial,
                score.rubric_miss
            );
            for note in &normalized.notes {
                println!("W \"{}\"", escape_quotes(note));
            }
        }
    }
    Ok(())
}

pub fn execute_letter(ctx: &CommandContext, args: &LetterArgs) -> Result<()> {
    let table = match &args.preset {
        Some(name) => match ThresholdTable::preset(name) {
            Some(table) => table,
            None => bail_unsupported!("threshold preset", name, "classic, aligned"),
        },
        None => ctx.config.grading.threshold_table()?,
    };
    let letter = table.letter_for(args.similarity, args.rubric_frac);

    match ctx.cli.format {
        OutputFormat::Human => println!("{}", letter),
        OutputFormat::Json => {
            let output = serde_json::json!({
                "letter": letter,
                "similarity": args.similarity,
                "rubricFrac": args.rubric_frac,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Records => println!(
            "H orals=1 records=1 mode=letter letter={} similarity={:.2} rubric_frac={:.2}",
            letter, args.similarity, args.rubric_frac
        ),
    }
    Ok(())
}
