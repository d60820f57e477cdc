//! Argument structures for grading commands

use std::path::PathBuf;

use clap::Args;

use crate::cli::parse::{parse_fraction, parse_mode, parse_range};
use orals_core::progress::TimeRange;
use orals_core::session::FeedbackMode;

/// Where the transcript comes from: inline, a file, or stdin
#[derive(Args, Debug, Clone, Default)]
pub struct TranscriptArgs {
    /// Transcript text
    #[arg(long, short = 't', conflicts_with = "transcript_file")]
    pub transcript: Option<String>,

    /// Read the transcript from a file (`-` for stdin)
    #[arg(long)]
    pub transcript_file: Option<PathBuf>,
}

/// Arguments for the grade command.
#[derive(Args, Debug)]
pub struct GradeArgs {
    /// Case ID
    pub case_id: String,

    #[command(flatten)]
    pub input: TranscriptArgs,

    /// Feedback mode (heuristic, llm, hybrid); overrides the config file
    #[arg(long, value_parser = parse_mode)]
    pub mode: Option<FeedbackMode>,

    /// Do not append the attempt to the progress log
    #[arg(long)]
    pub no_record: bool,
}

/// Arguments for the mcq command.
#[derive(Args, Debug)]
pub struct McqArgs {
    /// Case ID
    pub case_id: String,

    /// Selected answer as QID=CHOICE[,CHOICE] (repeatable)
    #[arg(long, short, action = clap::ArgAction::Append)]
    pub answer: Vec<String>,

    /// Do not append the attempt to the progress log
    #[arg(long)]
    pub no_record: bool,
}

/// Arguments for the detect command.
#[derive(Args, Debug)]
pub struct DetectArgs {
    /// Text to scan
    pub text: String,

    /// Only run this concept (e.g. finding.hydronephrosis)
    #[arg(long, short)]
    pub concept: Option<String>,

    /// Show concepts that were not detected too
    #[arg(long)]
    pub all: bool,
}

/// Arguments for the normalize command.
#[derive(Args, Debug)]
pub struct NormalizeArgs {
    /// Feedback-service response body, JSON or text (`-` for stdin)
    pub response: PathBuf,

    /// Rubric length to reconcile against
    #[arg(long, conflicts_with = "case")]
    pub rubric_size: Option<usize>,

    /// Take the rubric from this case
    #[arg(long)]
    pub case: Option<String>,
}

/// Arguments for the letter command.
#[derive(Args, Debug)]
pub struct LetterArgs {
    /// Similarity, 0.0-1.0
    #[arg(long, value_parser = parse_fraction)]
    pub similarity: f64,

    /// Rubric coverage fraction, 0.0-1.0
    #[arg(long, value_parser = parse_fraction)]
    pub rubric_frac: f64,

    /// Threshold preset (classic, aligned); defaults to the configured table
    #[arg(long)]
    pub preset: Option<String>,
}

/// Arguments for the stats command.
#[derive(Args, Debug)]
pub struct StatsArgs {
    /// Reporting window (today, week, 2weeks, month, all)
    #[arg(long, value_parser = parse_range, default_value = "all")]
    pub range: TimeRange,

    /// Number of lowest-scoring attempts to list
    #[arg(long, default_value_t = 5)]
    pub lowest: usize,
}

/// Arguments for the attempts command.
#[derive(Args, Debug)]
pub struct AttemptsArgs {
    /// Only show attempts for this case
    #[arg(long)]
    pub case: Option<String>,

    /// Show at most this many (most recent)
    #[arg(long)]
    pub limit: Option<usize>,
}

/// Arguments for the payload command.
#[derive(Args, Debug)]
pub struct PayloadArgs {
    /// Case ID
    pub case_id: String,

    #[command(flatten)]
    pub input: TranscriptArgs,
}
