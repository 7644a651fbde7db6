//! Global options shared by every command
//!
//! Global options are read once, from the minimal pre-parse of the raw
//! arguments, because the environment must be resolved before the full
//! command grammar can be built.

use crate::cli::args::ColorChoice;
use crate::cli::preparse::PreArgs;
use crate::types::EnvName;
use std::path::PathBuf;

/// Process environment variable supplying the default environment name
pub const ENV_VAR: &str = "NODE_ENV";

/// Options that apply to every command
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct GlobalOptions {
    /// Run with debug logging
    pub debug: bool,

    /// Explicit knexfile path
    pub knexfile: Option<PathBuf>,

    /// Explicit working directory
    pub cwd: Option<PathBuf>,

    /// Environment name: `--env`, else `NODE_ENV`, else `development`
    pub env: EnvName,

    /// Output coloring
    pub color: ColorChoice,
}

impl GlobalOptions {
    /// Build global options from the pre-parse and the process environment
    pub fn from_pre_args(pre: &PreArgs) -> Self {
        Self::from_pre_args_with(pre, |key| std::env::var(key).ok())
    }

    /// Build global options using `lookup` to read environment variables
    pub fn from_pre_args_with<F>(pre: &PreArgs, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let env = pre
            .env
            .clone()
            .filter(|name| !name.trim().is_empty())
            .or_else(|| lookup(ENV_VAR))
            .map(EnvName::new)
            .unwrap_or_default();

        Self {
            debug: pre.debug,
            knexfile: pre.knexfile.clone(),
            cwd: pre.cwd.clone(),
            env,
            color: pre.color.unwrap_or_default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pre(args: &[&str]) -> PreArgs {
        PreArgs::parse(args.iter().copied())
    }

    #[test]
    fn test_defaults() {
        let options = GlobalOptions::from_pre_args_with(&pre(&["migrate:latest"]), |_| None);
        assert!(!options.debug);
        assert_eq!(options.knexfile, None);
        assert_eq!(options.cwd, None);
        assert_eq!(options.env.as_str(), "development");
        assert_eq!(options.color, ColorChoice::Auto);
    }

    #[test]
    fn test_env_flag_wins_over_variable() {
        let options = GlobalOptions::from_pre_args_with(
            &pre(&["--env", "production", "migrate:latest"]),
            |_| Some("staging".to_string()),
        );
        assert_eq!(options.env.as_str(), "production");
    }

    #[test]
    fn test_env_variable_fallback() {
        let options = GlobalOptions::from_pre_args_with(&pre(&["migrate:latest"]), |key| {
            (key == ENV_VAR).then(|| "test".to_string())
        });
        assert_eq!(options.env.as_str(), "test");
    }

    #[test]
    fn test_paths_and_debug() {
        let options = GlobalOptions::from_pre_args_with(
            &pre(&[
                "--debug",
                "--knexfile",
                "db/knexfile.ts",
                "--cwd=/srv/app",
                "migrate:rollback",
            ]),
            |_| None,
        );
        assert!(options.debug);
        assert_eq!(options.knexfile, Some(PathBuf::from("db/knexfile.ts")));
        assert_eq!(options.cwd, Some(PathBuf::from("/srv/app")));
    }
}
