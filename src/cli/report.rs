//! Exit/report channel
//!
//! The dispatcher never prints or exits. It returns
//! `Result<SuccessReport, FailureReport>` and [`finish`] is the only place
//! that writes the final output and picks the exit code:
//! - success goes to stdout with exit code 0
//! - failure goes to stderr with exit code 1

use crate::cli::args::ColorChoice;
use crate::cli::common::{EXIT_FAILURE, EXIT_SUCCESS};
use crate::error::CliError;
use crate::output::{HumanFormatter, Message, Tone};
use std::error::Error as _;
use std::io::{self, IsTerminal};
use std::process::ExitCode;
use termcolor::{StandardStream, WriteColor};

/// Outcome of an invocation that succeeded
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SuccessReport {
    pub message: Message,
}

impl SuccessReport {
    pub fn new(message: impl Into<Message>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn text(&self) -> String {
        self.message.text()
    }
}

impl From<Message> for SuccessReport {
    fn from(message: Message) -> Self {
        Self { message }
    }
}

/// Outcome of an invocation that failed
#[derive(Debug)]
pub enum FailureReport {
    /// A command ran and failed
    Error(CliError),
    /// No command ran; carries usage help or clap's diagnostic
    Usage(String),
}

impl FailureReport {
    /// The error, if a command failed
    pub fn error(&self) -> Option<&CliError> {
        match self {
            FailureReport::Error(e) => Some(e),
            FailureReport::Usage(_) => None,
        }
    }

    /// Render the report as it will be written to stderr
    pub fn message(&self, debug: bool) -> Message {
        match self {
            FailureReport::Usage(text) => Message::from(text.trim_end()),
            FailureReport::Error(error) => {
                let mut message = Message::toned(
                    Tone::Failure,
                    error.detail().map_or_else(|| error.to_string(), str::to_string),
                );
                if debug {
                    let mut source = error.source();
                    while let Some(cause) = source {
                        message = message.push(Tone::Plain, format!("\nCaused by: {}", cause));
                        source = cause.source();
                    }
                }
                message
            }
        }
    }
}

impl From<CliError> for FailureReport {
    fn from(error: CliError) -> Self {
        FailureReport::Error(error)
    }
}

/// Write a success report
pub fn report_success(out: &mut dyn WriteColor, report: &SuccessReport) -> io::Result<()> {
    HumanFormatter::new().write(out, &report.message)
}

/// Write a failure report
pub fn report_failure(
    out: &mut dyn WriteColor,
    report: &FailureReport,
    debug: bool,
) -> io::Result<()> {
    HumanFormatter::new().write(out, &report.message(debug))
}

/// Exit code for an outcome
pub fn exit_code(result: &Result<SuccessReport, FailureReport>) -> u8 {
    match result {
        Ok(_) => EXIT_SUCCESS,
        Err(_) => EXIT_FAILURE,
    }
}

/// Write the outcome to the console and return the process exit code
pub fn finish(
    result: Result<SuccessReport, FailureReport>,
    color: ColorChoice,
    debug: bool,
) -> ExitCode {
    let code = exit_code(&result);
    let written = match &result {
        Ok(report) => {
            let mut stdout = StandardStream::stdout(color.for_stream(io::stdout().is_terminal()));
            report_success(&mut stdout, report)
        }
        Err(report) => {
            let mut stderr = StandardStream::stderr(color.for_stream(io::stderr().is_terminal()));
            report_failure(&mut stderr, report, debug)
        }
    };
    if let Err(e) = written
        && e.kind() != io::ErrorKind::BrokenPipe
    {
        tracing::warn!(error = %e, "failed to write report");
    }
    ExitCode::from(code)
}
