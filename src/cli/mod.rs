//! CLI argument parsing for orals
//!
//! Global flags: --config, --store, --cases, --format, --quiet, --verbose

pub mod args;
pub mod cases;
pub mod config;
pub mod parse;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use args::{
    AttemptsArgs, DetectArgs, GradeArgs, LetterArgs, McqArgs, NormalizeArgs, PayloadArgs,
    StatsArgs, TranscriptArgs,
};
pub use cases::CasesCommands;
pub use config::ConfigCommands;
pub use orals_core::format::OutputFormat;

/// Orals - radiology oral-boards practice grader
#[derive(Parser, Debug)]
#[command(name = "orals")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file (default: $ORALS_CONFIG_DIR/config.toml, else the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Progress log file (overrides [storage] in the config)
    #[arg(long, global = true)]
    pub store: Option<PathBuf>,

    /// Case library: a JSON file or a directory of JSON files
    #[arg(long, global = true, env = "ORALS_CASES")]
    pub cases: Option<PathBuf>,

    /// Output format (human, json, records)
    #[arg(long, global = true, default_value = "human")]
    pub format: OutputFormat,

    /// Suppress non-essential output
    #[arg(long, short, global = true)]
    pub quiet: bool,

    /// Debug-level logging to stderr
    #[arg(long, short, global = true)]
    pub verbose: bool,

    /// Log level or filter directive (overrides --verbose)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    /// Emit logs as JSON
    #[arg(long, global = true)]
    pub log_json: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Grade a transcript for a case
    Grade(GradeArgs),

    /// Grade multiple-choice answers for a case
    Mcq(McqArgs),

    /// Show which rubric category a rubric line maps to
    Classify {
        /// Rubric line
        item: String,
    },

    /// Run concept detectors over a piece of text
    Detect(DetectArgs),

    /// Turn a feedback-service response into a reconciled score
    Normalize(NormalizeArgs),

    /// Letter grade for a similarity and rubric fraction
    Letter(LetterArgs),

    /// Browse the case library
    Cases {
        #[command(subcommand)]
        command: CasesCommands,
    },

    /// Progress statistics
    Stats(StatsArgs),

    /// List recorded attempts
    Attempts(AttemptsArgs),

    /// Delete every recorded attempt
    Reset {
        /// Confirm the deletion
        #[arg(long)]
        yes: bool,
    },

    /// Print the request body that would be sent to the feedback service
    Payload(PayloadArgs),

    /// Inspect or create the config file
    Config {
        #[command(subcommand)]
        command: ConfigCommands,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_grade() {
        let cli = Cli::try_parse_from([
            "orals",
            "--format",
            "json",
            "grade",
            "gi-001",
            "--transcript",
            "acute appendicitis",
            "--mode",
            "hybrid",
        ])
        .unwrap();
        assert_eq!(cli.format, OutputFormat::Json);
        match cli.command {
            Some(Commands::Grade(args)) => {
                assert_eq!(args.case_id, "gi-001");
                assert_eq!(args.input.transcript.as_deref(), Some("acute appendicitis"));
                assert_eq!(
                    args.mode,
                    Some(orals_core::session::FeedbackMode::Hybrid)
                );
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_transcript_sources_conflict() {
        let parsed = Cli::try_parse_from([
            "orals",
            "grade",
            "gi-001",
            "--transcript",
            "x",
            "--transcript-file",
            "t.txt",
        ]);
        assert!(parsed.is_err());
    }
}
