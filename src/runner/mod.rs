// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Running external programs.
//!
//! Every external tool invocation is an [`ExternalCommand`] handed to a
//! [`ToolRunner`]. The real runner, [`ProcessRunner`], blocks until the child
//! exits. Exit statuses are reported but never acted upon; the pipeline checks
//! for the outputs it expects instead.

mod code_log;

pub use code_log::CodeLog;

use std::{
    fmt::Display,
    path::{Path, PathBuf},
    process::Command,
};

use log::{debug, trace, warn};
use thiserror::Error;

/// A program and its arguments.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExternalCommand {
    pub program: PathBuf,
    pub args: Vec<String>,
}

impl ExternalCommand {
    pub fn new<P: AsRef<Path>>(program: P) -> ExternalCommand {
        ExternalCommand {
            program: program.as_ref().to_path_buf(),
            args: vec![],
        }
    }

    pub fn arg<S: Into<String>>(mut self, arg: S) -> ExternalCommand {
        self.args.push(arg.into());
        self
    }

    pub fn args<I, S>(mut self, args: I) -> ExternalCommand
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// The name of the program without its directories, for log messages.
    pub fn program_name(&self) -> String {
        self.program
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.program.display().to_string())
    }
}

/// Renders as something that can be pasted into a shell.
impl Display for ExternalCommand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", quote(&self.program.display().to_string()))?;
        for arg in &self.args {
            write!(f, " {}", quote(arg))?;
        }
        Ok(())
    }
}

/// Single-quote `s` for a POSIX shell, unless it's made only of characters a
/// shell leaves alone.
pub fn quote(s: &str) -> String {
    let safe = !s.is_empty()
        && s.chars().all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.' | '/' | ',' | ':' | '=' | '+' | '@' | '%')
        });
    if safe {
        s.to_string()
    } else {
        format!("'{}'", s.replace('\'', r"'\''"))
    }
}

/// Something that can run external commands to completion.
pub trait ToolRunner {
    /// Run `cmd`, blocking until it's finished. An error is only returned if
    /// the command couldn't be run at all.
    fn run(&mut self, cmd: &ExternalCommand) -> Result<(), RunnerError>;
}

impl<T: ToolRunner + ?Sized> ToolRunner for &mut T {
    fn run(&mut self, cmd: &ExternalCommand) -> Result<(), RunnerError> {
        (**self).run(cmd)
    }
}

/// Runs commands as child processes. The children inherit stdin, stdout and
/// stderr.
#[derive(Debug, Default)]
pub struct ProcessRunner;

impl ToolRunner for ProcessRunner {
    fn run(&mut self, cmd: &ExternalCommand) -> Result<(), RunnerError> {
        trace!("Spawning {cmd}");
        let status = Command::new(&cmd.program)
            .args(&cmd.args)
            .status()
            .map_err(|err| RunnerError::Spawn {
                program: cmd.program.clone(),
                err,
            })?;
        if status.success() {
            debug!("{} finished successfully", cmd.program_name());
        } else {
            warn!("{} finished with {status}", cmd.program_name());
        }
        Ok(())
    }
}

#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Couldn't run '{program}': {err}")]
    Spawn {
        program: PathBuf,
        err: std::io::Error,
    },

    #[error("Couldn't create the executed-command log '{file}': {err}")]
    CodeLog {
        file: PathBuf,
        err: std::io::Error,
    },
}
