//! Minimal argument pre-parse
//!
//! The environment has to be resolved before the full grammar is built (the
//! version banner needs the local module's version), so the handful of
//! options needed for that are read here first with a forgiving scan:
//! unknown tokens are skipped and nothing is ever rejected. The scan is also
//! the authoritative source of `-x` for `init` and `migrate:make`.

use crate::cli::args::ColorChoice;
use std::ffi::OsStr;
use std::path::PathBuf;

/// Options recovered before full parsing
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct PreArgs {
    pub debug: bool,
    pub knexfile: Option<PathBuf>,
    pub cwd: Option<PathBuf>,
    pub env: Option<String>,
    pub color: Option<ColorChoice>,
    /// Raw `-x` value, not yet validated
    pub extension: Option<String>,
}

impl PreArgs {
    /// Scan arguments (without the program name)
    pub fn parse<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        let tokens: Vec<String> = args
            .into_iter()
            .map(|arg| arg.as_ref().to_string_lossy().into_owned())
            .collect();

        let mut pre = PreArgs::default();
        let mut i = 0;
        while i < tokens.len() {
            let token = tokens[i].as_str();
            i += 1;

            if token == "--" {
                break;
            }

            if let Some(long) = token.strip_prefix("--") {
                let (key, inline) = match long.split_once('=') {
                    Some((key, value)) => (key, Some(value.to_string())),
                    None => (long, None),
                };
                if key == "debug" {
                    pre.debug = inline.is_none_or(|v| v != "false");
                    continue;
                }
                if !matches!(key, "knexfile" | "cwd" | "env" | "color") {
                    continue;
                }
                let value = match inline {
                    Some(value) => Some(value),
                    None => take_value(&tokens, &mut i),
                };
                let Some(value) = value else { continue };
                match key {
                    "knexfile" => pre.knexfile = Some(PathBuf::from(value)),
                    "cwd" => pre.cwd = Some(PathBuf::from(value)),
                    "env" => pre.env = Some(value),
                    _ => pre.color = ColorChoice::parse(&value),
                }
                continue;
            }

            if let Some(rest) = token.strip_prefix("-x") {
                let value = match rest.strip_prefix('=') {
                    Some(value) => Some(value.to_string()),
                    None if !rest.is_empty() => Some(rest.to_string()),
                    None => take_value(&tokens, &mut i),
                };
                if value.is_some() {
                    pre.extension = value;
                }
            }
        }

        pre
    }
}

/// Take the next token as a value unless it looks like an option
fn take_value(tokens: &[String], i: &mut usize) -> Option<String> {
    let next = tokens.get(*i)?;
    if next.starts_with('-') {
        return None;
    }
    *i += 1;
    Some(next.clone())
}
