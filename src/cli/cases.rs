//! Case library subcommands

use clap::Subcommand;

/// Case library subcommands
#[derive(Subcommand, Debug)]
pub enum CasesCommands {
    /// List cases
    List {
        /// Filter by subspecialty (repeatable)
        #[arg(long, action = clap::ArgAction::Append)]
        sub: Vec<String>,

        /// Free-text filter over title, prompt, answer, tags and subspecialty
        #[arg(long, short)]
        query: Option<String>,
    },

    /// Show one case
    Show {
        /// Case ID
        id: String,

        /// Hide the expected answer and rubric
        #[arg(long)]
        exam: bool,
    },

    /// Suggest the next case to practice
    Next {
        /// Restrict to a subspecialty (repeatable)
        #[arg(long, action = clap::ArgAction::Append)]
        sub: Vec<String>,

        /// Free-text filter
        #[arg(long, short)]
        query: Option<String>,
    },

    /// List the known subspecialties
    Subspecialties,
}
