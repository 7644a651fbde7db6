//! CLI argument parsing using clap
//!
//! Command descriptions are not declared here: the dispatcher attaches them
//! when it registers the commands, together with the version banner.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Color output choice
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum ColorChoice {
    /// Automatically detect if terminal supports color
    #[default]
    Auto,
    /// Always use color
    Always,
    /// Never use color
    Never,
}

impl ColorChoice {
    /// Parses a `--color` value
    pub fn parse(value: &str) -> Option<Self> {
        <Self as ValueEnum>::from_str(value, true).ok()
    }

    /// Resolve to a termcolor choice for a stream
    pub fn for_stream(self, is_terminal: bool) -> termcolor::ColorChoice {
        match self {
            ColorChoice::Always => termcolor::ColorChoice::Always,
            ColorChoice::Never => termcolor::ColorChoice::Never,
            ColorChoice::Auto if is_terminal => termcolor::ColorChoice::Auto,
            ColorChoice::Auto => termcolor::ColorChoice::Never,
        }
    }
}

/// Knex CLI main entry point
#[derive(Parser, Debug)]
#[command(name = "knex")]
#[command(about = "Run knex migrations against the project's local knex install")]
#[command(disable_version_flag = true)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Print the CLI and local knex versions
    #[arg(short = 'V', long)]
    pub version: bool,

    /// Run with debugging
    #[arg(long, global = true)]
    pub debug: bool,

    /// Specify the knexfile path
    #[arg(long, global = true, value_name = "PATH")]
    pub knexfile: Option<PathBuf>,

    /// Specify the working directory
    #[arg(long, global = true, value_name = "PATH")]
    pub cwd: Option<PathBuf>,

    /// Environment, default: NODE_ENV || development
    #[arg(long, global = true, value_name = "NAME")]
    pub env: Option<String>,

    /// Output coloring
    #[arg(long, global = true, default_value = "auto")]
    pub color: ColorChoice,
}

/// Available knex subcommands
#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Init {
        /// Specify the knexfile extension (default js)
        #[arg(short = 'x', value_name = "js|coffee|ts|eg|ls")]
        extension: Option<String>,
    },

    #[command(name = "migrate:make")]
    MigrateMake {
        /// Name of the migration
        name: String,

        /// Specify the stub extension (default: the knexfile's)
        #[arg(short = 'x', value_name = "js|coffee|ts|eg|ls")]
        extension: Option<String>,
    },

    #[command(name = "migrate:latest")]
    MigrateLatest,

    #[command(name = "migrate:rollback")]
    MigrateRollback,

    #[command(name = "migrate:currentVersion")]
    MigrateCurrentVersion,
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_verify_cli() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_no_command() {
        let cli = Cli::parse_from(["knex"]);
        assert_eq!(cli.command, None);
        assert!(!cli.version);
        assert_eq!(cli.color, ColorChoice::Auto);
    }

    #[test]
    fn test_init_default() {
        let cli = Cli::parse_from(["knex", "init"]);
        assert_eq!(cli.command, Some(Command::Init { extension: None }));
    }

    #[test]
    fn test_init_with_extension() {
        let cli = Cli::parse_from(["knex", "init", "-x", "coffee"]);
        assert_eq!(
            cli.command,
            Some(Command::Init {
                extension: Some("coffee".to_string())
            })
        );
    }

    #[test]
    fn test_migrate_make() {
        let cli = Cli::parse_from(["knex", "migrate:make", "create_users", "-x", "ts"]);
        match cli.command {
            Some(Command::MigrateMake { name, extension }) => {
                assert_eq!(name, "create_users");
                assert_eq!(extension, Some("ts".to_string()));
            }
            _ => panic!("Expected MigrateMake command"),
        }
    }

    #[test]
    fn test_migrate_make_requires_name() {
        assert!(Cli::try_parse_from(["knex", "migrate:make"]).is_err());
    }

    #[test]
    fn test_migrate_commands() {
        assert_eq!(
            Cli::parse_from(["knex", "migrate:latest"]).command,
            Some(Command::MigrateLatest)
        );
        assert_eq!(
            Cli::parse_from(["knex", "migrate:rollback"]).command,
            Some(Command::MigrateRollback)
        );
        assert_eq!(
            Cli::parse_from(["knex", "migrate:currentVersion"]).command,
            Some(Command::MigrateCurrentVersion)
        );
    }

    #[test]
    fn test_global_options_after_command() {
        let cli = Cli::parse_from([
            "knex",
            "migrate:latest",
            "--env",
            "production",
            "--knexfile",
            "db/knexfile.js",
            "--debug",
        ]);
        assert_eq!(cli.env, Some("production".to_string()));
        assert_eq!(cli.knexfile, Some(PathBuf::from("db/knexfile.js")));
        assert!(cli.debug);
    }

    #[test]
    fn test_unknown_command_is_error() {
        assert!(Cli::try_parse_from(["knex", "seed:run"]).is_err());
    }

    #[test]
    fn test_color_choice_resolution() {
        assert_eq!(ColorChoice::parse("NEVER"), Some(ColorChoice::Never));
        assert_eq!(ColorChoice::parse("sometimes"), None);
        assert_eq!(
            ColorChoice::Auto.for_stream(false),
            termcolor::ColorChoice::Never
        );
        assert_eq!(
            ColorChoice::Always.for_stream(false),
            termcolor::ColorChoice::Always
        );
    }
}
