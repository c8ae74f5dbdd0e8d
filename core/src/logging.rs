//! Logging setup for hosts and the command-line tool
//!
//! The library itself only talks to the `log` facade. Hosts that want the
//! persistent log file call [`init`] once at startup.

use crate::error::Result;
use env_logger::{Builder, Env, Target};
use std::fs::OpenOptions;
use std::path::Path;

/// Builds a logger: Debug when verbose, Info otherwise
///
/// `RUST_LOG` overrides the default level when set. With `log_file` set,
/// records are appended to that file instead of stderr.
pub fn builder(verbose: bool, log_file: Option<&Path>) -> Result<Builder> {
    builder_from_env(Env::default(), verbose, log_file)
}

fn builder_from_env(env: Env<'_>, verbose: bool, log_file: Option<&Path>) -> Result<Builder> {
    let level = if verbose { "debug" } else { "info" };
    let mut builder = Builder::from_env(env.default_filter_or(level));

    if let Some(path) = log_file {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        builder.target(Target::Pipe(Box::new(file)));
        builder.write_style(env_logger::WriteStyle::Never);
    }

    Ok(builder)
}

/// Installs the global logger
///
/// A second call leaves the first logger in place.
///
/// # Errors
///
/// Returns an error if the log file cannot be opened for appending.
pub fn init(verbose: bool, log_file: Option<&Path>) -> Result<()> {
    if builder(verbose, log_file)?.try_init().is_err() {
        log::debug!("Logger already installed, keeping it");
    }
    Ok(())
}
