//! `orals mcq` command - grade multiple-choice answers for a case

use crate::cli::{McqArgs, OutputFormat};
use crate::commands::dispatch::CommandContext;
use crate::commands::helpers::pct;
use orals_core::error::{OralsError, Result};
use orals_core::format::escape_quotes;
use orals_core::mcq::{grade_mcq, parse_answers, ChoiceOutcome, McqResult};

pub fn execute(ctx: &CommandContext, args: &McqArgs) -> Result<()> {
    let library = ctx.library()?;
    let case = library.get(&args.case_id)?;
    let set = case
        .mcqs
        .as_ref()
        .filter(|_| case.has_mcqs())
        .ok_or_else(|| OralsError::not_found("multiple-choice questions for case", &case.id))?;

    let answers = parse_answers(&args.answer)?;
    let result = grade_mcq(set, &answers);
    let (letter, attempt) = ctx.config.grader()?.mcq_attempt(case, &result);

    let recorded = !args.no_record;
    if recorded {
        ctx.progress_store()?.record(attempt)?;
    }

    match ctx.cli.format {
        OutputFormat::Human => {
            println!("{} - {}", case.id, case.title);
            for q in &result.questions {
                println!();
                println!("[{}] {} {}", mark(q.correct), q.id, q.stem);
                for c in &q.choices {
                    println!("  {} {}. {}", outcome_marker(c.outcome), c.id, c.text);
                }
                for e in &q.explanations {
                    println!("    {}", e);
                }
            }
            println!();
            println!(
                "Score: {}/{} ({}%)  Grade: {}",
                result.correct,
                result.total,
                pct(result.similarity()),
                letter
            );
        }
        OutputFormat::Json => {
            let output = serde_json::json!({
                "caseId": case.id,
                "letter": letter,
                "similarity": result.similarity(),
                "result": result,
                "recorded": recorded,
            });
            println!("{}", serde_json::to_string_pretty(&output)?);
        }
        OutputFormat::Records => output_records(&case.id, letter.as_str(), &result),
    }
    Ok(())
}

fn mark(correct: bool) -> &'static str {
    if correct {
        "x"
    } else {
        " "
    }
}

fn outcome_marker(outcome: ChoiceOutcome) -> &'static str {
    match outcome {
        ChoiceOutcome::Correct => "+",
        ChoiceOutcome::Wrong => "-",
        ChoiceOutcome::Missed => "!",
        ChoiceOutcome::Neutral => " ",
    }
}

fn output_records(case_id: &str, letter: &str, result: &McqResult) {
    println!(
        "H orals=1 records=1 mode=mcq case={} letter={} correct={} total={}",
        case_id, letter, result.correct, result.total
    );
    for q in &result.questions {
        println!(
            "Q {} {} \"{}\"",
            q.id,
            if q.correct { "correct" } else { "wrong" },
            escape_quotes(&q.stem)
        );
    }
}
