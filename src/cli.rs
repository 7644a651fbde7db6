//! CLI argument parsing and command dispatch
//!
//! [`launch`] is the whole lifecycle of one invocation: pre-parse, resolve the
//! environment, register and run one command, then report and exit.
//! [`run`] is the same without logging setup or console output, for callers
//! that want the outcome itself.

pub mod args;
pub mod common;
pub mod dispatch;
pub mod init;
pub mod migrate;
pub mod preparse;
pub mod report;

pub use args::{Cli, ColorChoice, Command};
pub use dispatch::{CommandId, Dispatcher};
pub use preparse::PreArgs;
pub use report::{FailureReport, SuccessReport};

use crate::config::{GlobalOptions, Resolver};
use crate::engine::EngineProvider;
use crate::logging;
use std::ffi::OsString;
use std::process::ExitCode;

/// Run one invocation and return its outcome
///
/// `args` includes the program name.
pub async fn run<I, T>(provider: EngineProvider, args: I) -> Result<SuccessReport, FailureReport>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let pre = PreArgs::parse(args.iter().skip(1));
    let options = GlobalOptions::from_pre_args(&pre);
    run_with(provider, args, pre, options).await
}

async fn run_with(
    provider: EngineProvider,
    args: Vec<OsString>,
    pre: PreArgs,
    options: GlobalOptions,
) -> Result<SuccessReport, FailureReport> {
    let env = Resolver::new()
        .resolve(&options)
        .map_err(|e| FailureReport::Error(e.into()))?;
    tracing::debug!(mode = ?provider.mode(), cwd = %env.cwd.display(), "environment resolved");

    let dispatcher = Dispatcher::new(provider, env, options, pre.extension);
    dispatcher.run(args).await
}

/// Run one invocation, write its outcome and return the exit code
pub async fn launch<I, T>(provider: EngineProvider, args: I) -> ExitCode
where
    I: IntoIterator<Item = T>,
    T: Into<OsString>,
{
    let args: Vec<OsString> = args.into_iter().map(Into::into).collect();
    let pre = PreArgs::parse(args.iter().skip(1));
    let options = GlobalOptions::from_pre_args(&pre);
    logging::init(options.debug);

    let (color, debug) = (options.color, options.debug);
    let result = run_with(provider, args, pre, options).await;
    report::finish(result, color, debug)
}

/// Entry point for the `knex` binary and for embedders
///
/// Reads the process arguments. Pass [`EngineProvider::standalone`] to drive
/// the local knex install, or an instance/factory provider to embed.
pub async fn bootstrap(provider: EngineProvider) -> ExitCode {
    launch(provider, std::env::args_os()).await
}
