//! `orals payload` command - show the feedback-service request for a transcript

use crate::cli::PayloadArgs;
use crate::commands::dispatch::CommandContext;
use crate::commands::helpers::read_transcript;
use orals_core::error::Result;
use orals_core::heuristic::{grade_heuristic_with, HeuristicInput};
use orals_core::llm::build_payload;

/// Always JSON: the output is the exact request body
pub fn execute(ctx: &CommandContext, args: &PayloadArgs) -> Result<()> {
    let library = ctx.library()?;
    let case = library.get(&args.case_id)?;
    let transcript = read_transcript(&args.input)?;

    let grading = &ctx.config.grading;
    let heuristic = grade_heuristic_with(
        &HeuristicInput {
            transcript: &transcript,
            prompt: case.prompt(),
            expected: case.expected(),
            rubric: &case.rubric,
        },
        &grading.blend,
        &grading.detectors,
    );
    let request = build_payload(case, &transcript, &heuristic);
    println!("{}", serde_json::to_string_pretty(&request)?);
    Ok(())
}
