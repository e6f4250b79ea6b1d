// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

/*!
In-beam self-calibration of radio-interferometric measurement sets.

A multi-source measurement set is split into one dataset per outlier phase
centre with CASA, each dataset is imaged with WSClean, the model is divided
out, and the datasets are put back together and imaged again. All of the heavy
lifting is done by the external tools; this crate builds their commands and
runs them in order, skipping anything whose output already exists.
 */

mod cli;
pub mod casa;
pub mod config;
pub mod constants;
pub mod fs;
pub mod outliers;
pub mod pipeline;
pub mod runner;
pub mod wsclean;

// Re-exports.
pub use cli::{Inbeam, InbeamError};
pub use config::{ConfigError, ConfigFile, PipelineConfig};
pub use pipeline::{Pipeline, PipelineError, PipelineOptions, PipelineSummary};
pub use runner::{CodeLog, ExternalCommand, ProcessRunner, RunnerError, ToolRunner};
