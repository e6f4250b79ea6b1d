// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors from running the pipeline.

use std::path::PathBuf;

use thiserror::Error;

use crate::{outliers::OutliersError, runner::RunnerError};

#[derive(Error, Debug)]
pub enum PipelineError {
    #[error("There was a problem creating {path}: it doesn't exist after {step}")]
    MissingOutput { step: &'static str, path: PathBuf },

    #[error("Can't derive dataset names from '{0}'; expected a path like 'obs.ms'")]
    BadMsPath(PathBuf),

    #[error("Input measurement set '{0}' does not exist")]
    NoInput(PathBuf),

    #[error(transparent)]
    Outliers(#[from] OutliersError),

    #[error(transparent)]
    Runner(#[from] RunnerError),
}
