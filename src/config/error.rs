// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors associated with reading configuration files.

use std::path::PathBuf;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Configuration file '{0}' does not exist")]
    DoesNotExist(PathBuf),

    #[error("Couldn't decode toml structure from '{file}':\n{err}")]
    Toml { file: PathBuf, err: String },

    #[error("Couldn't decode json structure from '{file}':\n{err}")]
    Json { file: PathBuf, err: String },

    #[error("{file}, line {line}: couldn't make sense of '{text}'; expected a [section] header or a 'key = value' pair")]
    IniSyntax {
        file: PathBuf,
        line: usize,
        text: String,
    },

    #[error("{file}, line {line}: 'key = value' pair appears before any [section] header")]
    IniNoSection { file: PathBuf, line: usize },

    #[error("{file}, line {line}: empty key")]
    IniEmptyKey { file: PathBuf, line: usize },

    #[error("{file}: section [{section}] is specified more than once")]
    DuplicateSection { file: PathBuf, section: String },

    #[error("{file}: key '{key}' in section [{section}] is specified more than once")]
    DuplicateKey {
        file: PathBuf,
        section: String,
        key: String,
    },

    #[error("Bad interpolation in [{section}] {key}: {reason}")]
    Interpolation {
        section: String,
        key: String,
        reason: String,
    },

    #[error("Section [{section}] key '{key}' holds an array or table; only strings, numbers and booleans are supported")]
    UnsupportedValue { section: String, key: String },

    #[error("The configuration has no [{0}] section")]
    MissingSection(String),

    #[error("The configuration's [{section}] section has no '{key}' key")]
    MissingKey { section: String, key: String },

    #[error("The configuration's [{section}] '{key}' couldn't be parsed as a non-negative integer: '{value}'")]
    ParseInt {
        section: String,
        key: String,
        value: String,
    },

    #[error("Error when reading '{file}': {err}")]
    IO {
        file: PathBuf,
        err: std::io::Error,
    },
}
