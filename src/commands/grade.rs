//! `orals grade` command - grade a transcript against a case

use tracing::debug;

use crate::cli::{GradeArgs, OutputFormat};
use crate::commands::dispatch::CommandContext;
use crate::commands::helpers::{feedback_client, pct, read_transcript};
use orals_core::cases::Case;
use orals_core::error::Result;
use orals_core::format::escape_quotes;
use orals_core::llm::FeedbackTransport;
use orals_core::session::GradedAttempt;

pub fn execute(ctx: &CommandContext, args: &GradeArgs) -> Result<()> {
    let library = ctx.library()?;
    let case = library.get(&args.case_id)?;
    let transcript = read_transcript(&args.input)?;

    let mut grader = ctx.config.grader()?;
    if let Some(mode) = args.mode {
        grader.mode = mode;
    }

    let client = if grader.mode.uses_llm() {
        feedback_client(&ctx.config)
    } else {
        None
    };
    let transport = client.as_ref().map(|c| c as &dyn FeedbackTransport);

    let graded = grader.grade_case(case, &transcript, transport);

    let recorded = if args.no_record {
        None
    } else {
        let store = ctx.progress_store()?;
        store.record(graded.to_attempt(case))?;
        Some(store.path().display().to_string())
    };
    debug!(elapsed = ?ctx.start.elapsed(), recorded = recorded.is_some(), "grade");

    match ctx.cli.format {
        OutputFormat::Human => output_human(ctx, case, &graded, recorded.as_deref()),
        OutputFormat::Json => {
            let mut json = serde_json::to_value(&graded)?;
            if let Some(obj) = json.as_object_mut() {
                obj.insert("recorded".to_string(), serde_json::json!(recorded));
            }
            println!("{}", serde_json::to_string_pretty(&json)?);
        }
        OutputFormat::Records => output_records(&graded),
    }
    Ok(())
}

fn output_human(ctx: &CommandContext, case: &Case, graded: &GradedAttempt, recorded: Option<&str>) {
    let score = &graded.score;
    println!("{} - {}", case.id, case.title);
    println!(
        "Grade: {}  (similarity {}%, rubric {}/{})",
        graded.letter,
        pct(score.similarity),
        score.rubric_hit,
        score.total()
    );
    println!();
    println!("{}", graded.feedback);

    if let (Some(path), false) = (recorded, ctx.cli.quiet) {
        println!();
        println!("Recorded attempt in {}", path);
    }
}

fn output_records(graded: &GradedAttempt) {
    let score = &graded.score;
    println!(
        "H orals=1 records=1 mode=grade case={} letter={} similarity={:.2} hit={} partial={} miss={} source={}",
        graded.case_id,
        graded.letter,
        score.similarity,
        score.rubric_hit,
        score.rubric_partial,
        score.rubric_miss,
        graded.source.as_str()
    );
    for (verdict, items) in [
        ("hit", &score.hits),
        ("partial", &score.partials),
        ("miss", &score.misses),
    ] {
        for item in items {
            println!("R {} \"{}\"", verdict, escape_quotes(item));
        }
    }
    if let Some(error) = &graded.llm_error {
        println!("E \"{}\"", escape_quotes(error));
    }
}
