//! Command dispatch
//!
//! This module registers the lifecycle commands against a resolved
//! environment and runs at most one of them per invocation:
//! - builds the clap grammar with the version banner and the command table
//! - parses the full argument vector
//! - selects exactly one handler, awaits it, and returns its outcome
//!
//! When no command runs (bare invocation, unknown command), the outcome is a
//! usage failure carrying the help text rather than silent success.

use crate::cli::args::{Cli, Command};
use crate::cli::common::CommandContext;
use crate::cli::report::{FailureReport, SuccessReport};
use crate::cli::{init, migrate};
use crate::config::{Environment, GlobalOptions};
use crate::engine::EngineProvider;
use crate::error::CliError;
use crate::output::Message;
use clap::error::ErrorKind as ClapErrorKind;
use clap::{CommandFactory, FromArgMatches};
use std::ffi::OsString;

/// Identifiers of the registered commands
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CommandId {
    Init,
    MigrateMake,
    MigrateLatest,
    MigrateRollback,
    MigrateCurrentVersion,
}

impl CommandId {
    /// Every command, in registration order
    pub const ALL: [CommandId; 5] = [
        CommandId::Init,
        CommandId::MigrateMake,
        CommandId::MigrateLatest,
        CommandId::MigrateRollback,
        CommandId::MigrateCurrentVersion,
    ];

    /// Name the command is invoked by
    pub fn name(&self) -> &'static str {
        match self {
            CommandId::Init => "init",
            CommandId::MigrateMake => "migrate:make",
            CommandId::MigrateLatest => "migrate:latest",
            CommandId::MigrateRollback => "migrate:rollback",
            CommandId::MigrateCurrentVersion => "migrate:currentVersion",
        }
    }

    /// One-line description shown in help
    pub fn about(&self) -> &'static str {
        match self {
            CommandId::Init => "Create a fresh knexfile.",
            CommandId::MigrateMake => "Create a named migration file.",
            CommandId::MigrateLatest => "Run all migrations that have not yet been run.",
            CommandId::MigrateRollback => "Rollback the last set of migrations performed.",
            CommandId::MigrateCurrentVersion => "View the current version for the migration.",
        }
    }

    /// Whether the command scaffolds files from the local module
    pub fn is_scaffolding(&self) -> bool {
        matches!(self, CommandId::Init)
    }
}

/// Arguments of the selected command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct CommandArgs {
    /// Migration name for `migrate:make`
    pub name: Option<String>,
    /// Raw `-x` value, pre-parse first
    pub extension: Option<String>,
}

/// What the parsed command line asks for
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Selection {
    Run(CommandId, CommandArgs),
    Version,
    Help(String),
    Usage(String),
}

/// Registers commands and owns the single path from arguments to outcome
#[derive(Debug)]
pub struct Dispatcher {
    provider: EngineProvider,
    env: Environment,
    options: GlobalOptions,
    /// `-x` from the pre-parse
    extension: Option<String>,
}

impl Dispatcher {
    pub fn new(
        provider: EngineProvider,
        env: Environment,
        options: GlobalOptions,
        extension: Option<String>,
    ) -> Self {
        Self {
            provider,
            env,
            options,
            extension,
        }
    }

    pub fn environment(&self) -> &Environment {
        &self.env
    }

    /// Commands available in this mode
    pub fn registered(&self) -> Vec<CommandId> {
        CommandId::ALL
            .into_iter()
            .filter(|id| !id.is_scaffolding() || self.provider.supports_scaffolding())
            .collect()
    }

    /// Text printed for `--version`
    pub fn version_banner(&self) -> String {
        format!(
            "Knex CLI version: {}\nLocal Knex version: {}",
            env!("CARGO_PKG_VERSION"),
            self.env.module_version().unwrap_or("not installed")
        )
    }

    /// The clap grammar with descriptions attached from the command table
    ///
    /// Unregistered commands stay parseable but hidden; selecting one counts
    /// as no match.
    pub fn command(&self) -> clap::Command {
        let registered = self.registered();
        let mut cmd = Cli::command();
        for id in CommandId::ALL {
            let hidden = !registered.contains(&id);
            cmd = cmd.mut_subcommand(id.name(), |sub| sub.about(id.about()).hide(hidden));
        }
        cmd
    }

    /// Parse arguments (including the program name) into a selection
    pub fn select<I, T>(&self, args: I) -> Selection
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        let mut cmd = self.command();
        let matches = match cmd.try_get_matches_from_mut(args) {
            Ok(matches) => matches,
            Err(e) => {
                return match e.kind() {
                    ClapErrorKind::DisplayHelp => Selection::Help(e.render().to_string()),
                    _ => Selection::Usage(e.render().to_string()),
                };
            }
        };
        let cli = match Cli::from_arg_matches(&matches) {
            Ok(cli) => cli,
            Err(e) => return Selection::Usage(e.render().to_string()),
        };

        if cli.version {
            return Selection::Version;
        }

        let (id, args) = match cli.command {
            None => return Selection::Usage(cmd.render_help().to_string()),
            Some(Command::Init { extension }) => (
                CommandId::Init,
                CommandArgs {
                    name: None,
                    extension: self.extension.clone().or(extension),
                },
            ),
            Some(Command::MigrateMake { name, extension }) => (
                CommandId::MigrateMake,
                CommandArgs {
                    name: Some(name),
                    extension: self.extension.clone().or(extension),
                },
            ),
            Some(Command::MigrateLatest) => (CommandId::MigrateLatest, CommandArgs::default()),
            Some(Command::MigrateRollback) => (CommandId::MigrateRollback, CommandArgs::default()),
            Some(Command::MigrateCurrentVersion) => {
                (CommandId::MigrateCurrentVersion, CommandArgs::default())
            }
        };

        if !self.registered().contains(&id) {
            tracing::debug!(command = id.name(), "command not registered in this mode");
            return Selection::Usage(cmd.render_help().to_string());
        }
        Selection::Run(id, args)
    }

    /// Run the command the arguments select and return its outcome
    pub async fn run<I, T>(&self, args: I) -> Result<SuccessReport, FailureReport>
    where
        I: IntoIterator<Item = T>,
        T: Into<OsString> + Clone,
    {
        match self.select(args) {
            Selection::Run(id, args) => self
                .execute(id, &args)
                .await
                .map(SuccessReport::from)
                .map_err(FailureReport::Error),
            Selection::Version => Ok(SuccessReport::new(self.version_banner())),
            Selection::Help(text) => Ok(SuccessReport::new(text.trim_end().to_string())),
            Selection::Usage(text) => Err(FailureReport::Usage(text)),
        }
    }

    /// Invoke the handler registered for `id`
    pub async fn execute(&self, id: CommandId, args: &CommandArgs) -> Result<Message, CliError> {
        let ctx = CommandContext::new(&self.env, &self.options, &self.provider);
        tracing::debug!(command = id.name(), env = %self.options.env, "dispatching command");

        match id {
            CommandId::Init => init::run_init(&ctx, args.extension.as_deref()).await,
            CommandId::MigrateMake => {
                let name = args.name.as_deref().unwrap_or_default();
                migrate::run_make(&ctx, name, args.extension.as_deref()).await
            }
            CommandId::MigrateLatest => migrate::run_latest(&ctx).await,
            CommandId::MigrateRollback => migrate::run_rollback(&ctx).await,
            CommandId::MigrateCurrentVersion => migrate::run_current_version(&ctx).await,
        }
    }
}
