//! `orals cases` commands - browse the case library

use serde::Serialize;

use crate::cli::OutputFormat;
use crate::commands::dispatch::CommandContext;
use orals_core::cases::{Case, CaseFilter, SUBSPECIALTIES};
use orals_core::error::Result;
use orals_core::format::{csv_or_dash, escape_quotes};

/// Listing row; the answer key never appears in a listing
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct CaseRow<'a> {
    id: &'a str,
    title: &'a str,
    subspecialty: &'a str,
    tags: &'a [String],
    rubric_items: usize,
    has_mcqs: bool,
}

impl<'a> From<&'a Case> for CaseRow<'a> {
    fn from(case: &'a Case) -> Self {
        CaseRow {
            id: &case.id,
            title: &case.title,
            subspecialty: &case.subspecialty,
            tags: &case.tags,
            rubric_items: case.rubric.len(),
            has_mcqs: case.has_mcqs(),
        }
    }
}

fn filter(sub: &[String], query: Option<&str>) -> CaseFilter {
    CaseFilter {
        subspecialties: sub.to_vec(),
        query: query.map(str::to_string),
    }
}

pub fn execute_list(ctx: &CommandContext, sub: &[String], query: Option<&str>) -> Result<()> {
    let library = ctx.library()?;
    let cases = library.filter(&filter(sub, query));
    let rows: Vec<CaseRow> = cases.iter().map(|c| CaseRow::from(*c)).collect();

    match ctx.cli.format {
        OutputFormat::Human => {
            if rows.is_empty() {
                if !ctx.cli.quiet {
                    println!("No cases found");
                }
                return Ok(());
            }
            for row in &rows {
                println!("{:<12} [{}] {}", row.id, row.subspecialty, row.title);
            }
        }
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&rows)?),
        OutputFormat::Records => {
            println!(
                "H orals=1 records=1 mode=cases.list count={}",
                rows.len()
            );
            for row in &rows {
                println!(
                    "C {} sub=\"{}\" rubric={} mcq={} tags={} \"{}\"",
                    row.id,
                    escape_quotes(row.subspecialty),
                    row.rubric_items,
                    row.has_mcqs,
                    csv_or_dash(row.tags),
                    escape_quotes(row.title)
                );
            }
        }
    }
    Ok(())
}

pub fn execute_show(ctx: &CommandContext, id: &str, exam: bool) -> Result<()> {
    let library = ctx.library()?;
    let found = library.get(id)?;
    let case = if exam {
        found.redacted()
    } else {
        found.clone()
    };

    match ctx.cli.format {
        OutputFormat::Human => output_case_human(&case),
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&case)?),
        OutputFormat::Records => {
            println!(
                "H orals=1 records=1 mode=cases.show id={} exam={}",
                case.id, exam
            );
            println!(
                "C {} sub=\"{}\" \"{}\"",
                case.id,
                escape_quotes(&case.subspecialty),
                escape_quotes(&case.title)
            );
            if !case.prompt().is_empty() {
                println!("P \"{}\"", escape_quotes(case.prompt()));
            }
            if !case.expected().is_empty() {
                println!("A \"{}\"", escape_quotes(case.expected()));
            }
            for item in &case.rubric {
                println!("R \"{}\"", escape_quotes(item));
            }
        }
    }
    Ok(())
}

fn output_case_human(case: &Case) {
    println!("{} - {}", case.id, case.title);
    println!("Subspecialty: {}", case.subspecialty);
    if !case.tags.is_empty() {
        println!("Tags: {}", case.tags.join(", "));
    }
    if !case.prompt().is_empty() {
        println!();
        println!("{}", case.prompt());
    }
    for image in &case.images {
        println!("Image: {}", image);
    }
    if !case.expected().is_empty() {
        println!();
        println!("Expected answer:");
        println!("  {}", case.expected());
    }
    if !case.rubric.is_empty() {
        println!();
        println!("Rubric:");
        for item in &case.rubric {
            println!("  - {}", item);
        }
    }
    if let Some(set) = case.mcqs.as_ref().filter(|_| case.has_mcqs()) {
        println!();
        println!("Multiple-choice questions: {}", set.questions.len());
    }
}

pub fn execute_next(ctx: &CommandContext, sub: &[String], query: Option<&str>) -> Result<()> {
    let library = ctx.library()?;
    let attempts = ctx.progress_store()?.attempts()?;
    let next = library.suggest_next(&attempts, &filter(sub, query));

    match ctx.cli.format {
        OutputFormat::Human => match next {
            Some(case) => println!("{:<12} [{}] {}", case.id, case.subspecialty, case.title),
            None => {
                if !ctx.cli.quiet {
                    println!("No matching cases");
                }
            }
        },
        OutputFormat::Json => {
            let row = next.map(CaseRow::from);
            println!("{}", serde_json::to_string_pretty(&row)?);
        }
        OutputFormat::Records => {
            println!(
                "H orals=1 records=1 mode=cases.next found={}",
                next.is_some()
            );
            if let Some(case) = next {
                println!(
                    "C {} sub=\"{}\" \"{}\"",
                    case.id,
                    escape_quotes(&case.subspecialty),
                    escape_quotes(&case.title)
                );
            }
        }
    }
    Ok(())
}

pub fn execute_subspecialties(ctx: &CommandContext) -> Result<()> {
    match ctx.cli.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&SUBSPECIALTIES)?),
        OutputFormat::Human | OutputFormat::Records => {
            for sub in SUBSPECIALTIES {
                println!("{}", sub);
            }
        }
    }
    Ok(())
}
