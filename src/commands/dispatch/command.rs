//! Command trait and context for dispatching commands

use std::path::PathBuf;
use std::time::Instant;

use crate::cli::Cli;
use orals_core::cases::CaseLibrary;
use orals_core::config::GraderConfig;
use orals_core::error::{OralsError, Result};
use orals_core::progress::ProgressStore;

/// Shared context for command execution
pub struct CommandContext<'a> {
    pub cli: &'a Cli,
    pub config: GraderConfig,
    pub start: Instant,
}

impl<'a> CommandContext<'a> {
    pub fn new(cli: &'a Cli, start: Instant) -> Result<Self> {
        let config = GraderConfig::discover(cli.config.as_deref())?;
        Ok(Self { cli, config, start })
    }

    /// Case library from `--cases`, else `[storage] cases`
    pub fn library(&self) -> Result<CaseLibrary> {
        let path = self.cases_path().ok_or_else(|| {
            OralsError::UsageError(
                "no case library: pass --cases, set ORALS_CASES, or set [storage] cases"
                    .to_string(),
            )
        })?;
        CaseLibrary::load(path)
    }

    fn cases_path(&self) -> Option<PathBuf> {
        self.cli
            .cases
            .clone()
            .or_else(|| self.config.storage.cases.clone())
    }

    /// Progress log from `--store`, else the configured location
    pub fn progress_store(&self) -> Result<ProgressStore> {
        let path = match &self.cli.store {
            Some(path) => path.clone(),
            None => self.config.storage.progress_path()?,
        };
        Ok(ProgressStore::new(path))
    }
}

/// Trait for commands that can be executed
pub trait Command {
    fn execute(&self, ctx: &CommandContext) -> Result<()>;
}

/// No-op command (when no subcommand is provided)
pub struct NoCommand;

impl Command for NoCommand {
    fn execute(&self, _ctx: &CommandContext) -> Result<()> {
        println!("orals {}", env!("CARGO_PKG_VERSION"));
        println!();
        println!("Radiology oral-boards practice grader.");
        println!();
        println!("Run `orals --help` for usage information.");
        Ok(())
    }
}
