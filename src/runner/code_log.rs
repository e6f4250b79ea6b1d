// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A record of everything that was executed.
//!
//! Each entry is a UTC timestamp comment followed by the command, e.g.
//!
//! ```text
//! #2024-03-01 10:11:12
//! /opt/casa/bin/casa --nogui --nologger --nologfile -c 'listobs(vis="a.ms", listfile="a.ms.listobs.txt")'
//! ```

use std::{
    fs::File,
    io::{BufWriter, Write},
    path::{Path, PathBuf},
};

use log::warn;

use super::RunnerError;

pub struct CodeLog {
    file: Option<(PathBuf, BufWriter<File>)>,
}

impl CodeLog {
    /// Start a new log at `path`, replacing whatever was there.
    pub fn create<P: AsRef<Path>>(path: P) -> Result<CodeLog, RunnerError> {
        let path = path.as_ref();
        let f = File::create(path).map_err(|err| RunnerError::CodeLog {
            file: path.to_path_buf(),
            err,
        })?;
        Ok(CodeLog {
            file: Some((path.to_path_buf(), BufWriter::new(f))),
        })
    }

    /// A log that records nothing.
    pub fn disabled() -> CodeLog {
        CodeLog { file: None }
    }

    pub fn record(&mut self, entry: &str) {
        let (path, writer) = match self.file.as_mut() {
            Some(f) => f,
            None => return,
        };
        let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S");
        let result = writeln!(writer, "#{timestamp}\n{entry}\n").and_then(|()| writer.flush());
        if let Err(e) = result {
            // Don't let a full disk stop the pipeline; just stop recording.
            warn!(
                "Couldn't write to the executed-command log {}: {e}; no more commands will be recorded",
                path.display()
            );
            self.file = None;
        }
    }
}

impl std::fmt::Debug for CodeLog {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.file {
            Some((path, _)) => write!(f, "CodeLog({})", path.display()),
            None => write!(f, "CodeLog(disabled)"),
        }
    }
}
