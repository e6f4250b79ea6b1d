// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Error type for all inbeam-related errors. This should be the *only* error
//! enum that is publicly visible from the binary.

use thiserror::Error;

use crate::{
    config::ConfigError, outliers::OutliersError, pipeline::PipelineError, runner::RunnerError,
};

#[derive(Error, Debug)]
pub enum InbeamError {
    /// An error related to the configuration file.
    #[error("{0}\n\nThe configuration file needs [global], [sources], [split_all], [wsclean] and [wsclean_unit] sections; see README.md")]
    Config(String),

    /// An error related to the outliers file.
    #[error("{0}\n\nEach outlier must be on its own line as 'phasecenter=<direction>'")]
    Outliers(String),

    /// An external program couldn't be started.
    #[error("{0}\n\nCheck the 'casa' and 'wsclean' entries of the [global] configuration section")]
    Tool(String),

    /// A pipeline step didn't produce what it should have.
    #[error("{0}\n\nIf you don't know why, try turning up verbosity (--debug or -v) and check the output of CASA and WSClean")]
    Pipeline(String),

    /// A generic error that can't be clarified further, e.g. IO errors.
    #[error("{0}")]
    Generic(String),
}

impl From<ConfigError> for InbeamError {
    fn from(e: ConfigError) -> Self {
        let s = e.to_string();
        match e {
            ConfigError::IO { .. } => Self::Generic(s),
            _ => Self::Config(s),
        }
    }
}

impl From<OutliersError> for InbeamError {
    fn from(e: OutliersError) -> Self {
        let s = e.to_string();
        match e {
            OutliersError::NoPositions(_) => Self::Outliers(s),
            OutliersError::IO { .. } => Self::Generic(s),
        }
    }
}

impl From<RunnerError> for InbeamError {
    fn from(e: RunnerError) -> Self {
        let s = e.to_string();
        match e {
            RunnerError::Spawn { .. } => Self::Tool(s),
            RunnerError::CodeLog { .. } => Self::Generic(s),
        }
    }
}

impl From<PipelineError> for InbeamError {
    fn from(e: PipelineError) -> Self {
        let s = e.to_string();
        match e {
            PipelineError::MissingOutput { .. }
            | PipelineError::BadMsPath(_)
            | PipelineError::NoInput(_) => Self::Pipeline(s),
            PipelineError::Outliers(e) => Self::from(e),
            PipelineError::Runner(e) => Self::from(e),
        }
    }
}

impl From<std::io::Error> for InbeamError {
    fn from(e: std::io::Error) -> Self {
        Self::Generic(e.to_string())
    }
}
