//! Command implementations for all orals commands

use crate::cli::{CasesCommands, Commands, ConfigCommands};
use crate::commands::dispatch::command::{Command, CommandContext};
use crate::commands::{cases, config, grade, inspect, mcq, payload, progress};
use orals_core::error::Result;

impl Command for Commands {
    fn execute(&self, ctx: &CommandContext) -> Result<()> {
        match self {
            Commands::Grade(args) => grade::execute(ctx, args),
            Commands::Mcq(args) => mcq::execute(ctx, args),
            Commands::Classify { item } => inspect::execute_classify(ctx, item),
            Commands::Detect(args) => inspect::execute_detect(ctx, args),
            Commands::Normalize(args) => inspect::execute_normalize(ctx, args),
            Commands::Letter(args) => inspect::execute_letter(ctx, args),
            Commands::Cases { command } => execute_cases(ctx, command),
            Commands::Stats(args) => progress::execute_stats(ctx, args),
            Commands::Attempts(args) => progress::execute_attempts(ctx, args),
            Commands::Reset { yes } => progress::execute_reset(ctx, *yes),
            Commands::Payload(args) => payload::execute(ctx, args),
            Commands::Config { command } => execute_config(ctx, command),
        }
    }
}

fn execute_cases(ctx: &CommandContext, command: &CasesCommands) -> Result<()> {
    match command {
        CasesCommands::List { sub, query } => cases::execute_list(ctx, sub, query.as_deref()),
        CasesCommands::Show { id, exam } => cases::execute_show(ctx, id, *exam),
        CasesCommands::Next { sub, query } => cases::execute_next(ctx, sub, query.as_deref()),
        CasesCommands::Subspecialties => cases::execute_subspecialties(ctx),
    }
}

fn execute_config(ctx: &CommandContext, command: &ConfigCommands) -> Result<()> {
    match command {
        ConfigCommands::Show => config::execute_show(ctx),
        ConfigCommands::Init { force } => config::execute_init(ctx, *force),
        ConfigCommands::Path => config::execute_path(ctx),
    }
}
