// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The self-calibration pipeline.
//!
//! The steps always run in the same order:
//!
//! 1. split the input measurement set into one dataset per outlier position;
//! 2. image every split dataset;
//! 3. divide freshly imaged datasets by their model and recentre them, then
//!    image everything again at unit weighting;
//! 4. concatenate the split datasets;
//! 5. image the concatenated dataset.
//!
//! Every step looks for its output on disk first, and skips the work if it's
//! there. Nothing checks whether an existing output is any good.

mod concat;
mod error;
mod imaging;
mod split;

pub use error::PipelineError;

use std::{
    ffi::OsString,
    path::{Path, PathBuf},
};

use itertools::Itertools;
use log::{debug, info};

use crate::{
    casa::CasaTask,
    config::PipelineConfig,
    constants::MS_EXTENSION,
    outliers::read_outliers_file,
    runner::{CodeLog, ExternalCommand, ToolRunner},
};

#[derive(Debug, Clone, Copy)]
pub struct PipelineOptions {
    /// Divide freshly imaged datasets by their model, recentre them and image
    /// them again at unit weighting.
    pub model_division: bool,
}

impl Default for PipelineOptions {
    fn default() -> Self {
        Self {
            model_division: true,
        }
    }
}

/// What a pipeline run did.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PipelineSummary {
    pub split_datasets: Vec<PathBuf>,
    pub newly_split: usize,
    pub newly_imaged: Vec<usize>,
    pub newly_imaged_unit: Vec<usize>,
    pub concatvis: PathBuf,
    pub concat_imaged: bool,
    pub commands_run: usize,
}

pub struct Pipeline<R: ToolRunner> {
    config: PipelineConfig,
    runner: R,
    code_log: CodeLog,
    options: PipelineOptions,
    commands_run: usize,
}

impl<R: ToolRunner> Pipeline<R> {
    pub fn new(
        config: PipelineConfig,
        runner: R,
        code_log: CodeLog,
        options: PipelineOptions,
    ) -> Pipeline<R> {
        Pipeline {
            config,
            runner,
            code_log,
            options,
            commands_run: 0,
        }
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn runner(&self) -> &R {
        &self.runner
    }

    /// Run every step for the multi-source measurement set `ms`.
    pub fn run(&mut self, ms: &Path) -> Result<PipelineSummary, PipelineError> {
        let positions = read_outliers_file(&self.config.outliers_file)?;
        self.run_for_positions(ms, &positions)
    }

    /// Run every step for `ms`, with positions that have already been read
    /// from the outliers file.
    pub fn run_for_positions(
        &mut self,
        ms: &Path,
        positions: &[String],
    ) -> Result<PipelineSummary, PipelineError> {
        let (split_datasets, newly_split) = self.split_all_directions(ms, positions)?;
        let (newly_imaged, newly_imaged_unit) = self.first_images(&split_datasets)?;
        let concatvis = self.concatenate_all(ms, &split_datasets)?;
        let concat_imaged = self.image_concatenated(&concatvis)?;

        Ok(PipelineSummary {
            split_datasets,
            newly_split,
            newly_imaged,
            newly_imaged_unit,
            concatvis,
            concat_imaged,
            commands_run: self.commands_run,
        })
    }

    /// Record and run an external command.
    fn dispatch(&mut self, cmd: ExternalCommand) -> Result<(), PipelineError> {
        debug!("{cmd}");
        self.code_log.record(&cmd.to_string());
        self.runner.run(&cmd)?;
        self.commands_run += 1;
        Ok(())
    }

    fn run_casa(&mut self, task: &CasaTask) -> Result<(), PipelineError> {
        info!("Running command: {}", task.name);
        debug!(
            "Parameters passed to {}: {}",
            task.name,
            task.params.iter().map(|(k, v)| format!("{k}={v}")).join(", ")
        );
        let cmd = task.to_command(&self.config.casa);
        self.dispatch(cmd)
    }
}

/// The stem shared by every dataset derived from `ms`, e.g. "obs" for
/// "/data/obs.ms".
pub fn run_name(ms: &Path) -> Result<String, PipelineError> {
    ms.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .ok_or_else(|| PipelineError::BadMsPath(ms.to_path_buf()))
}

/// Where the dataset for each of `num_positions` positions goes.
pub fn split_outputs(
    config: &PipelineConfig,
    ms: &Path,
    num_positions: usize,
) -> Result<Vec<PathBuf>, PipelineError> {
    let run_name = run_name(ms)?;
    Ok((0..num_positions)
        .map(|i| {
            config
                .split_individual_dir
                .join(format!("{run_name}_{i:03}.{MS_EXTENSION}"))
        })
        .collect())
}

/// Where the concatenated dataset goes.
pub fn concat_output(config: &PipelineConfig, ms: &Path) -> Result<PathBuf, PipelineError> {
    let run_name = run_name(ms)?;
    Ok(config
        .split_dir
        .join(format!("{run_name}_concat.{MS_EXTENSION}")))
}

/// The image directory for `ms` and the prefix of the images inside it, e.g.
/// "images/obs_000" and "images/obs_000/obs_000".
pub fn image_paths(img_path: &Path, ms: &Path) -> Result<(PathBuf, PathBuf), PipelineError> {
    let stem = run_name(ms)?;
    let img_dir = img_path.join(&stem);
    let img_name = img_dir.join(&stem);
    Ok((img_dir, img_name))
}

/// "a.ms" + "tmp" = "a.ms.tmp"
pub(crate) fn with_suffix(path: &Path, suffix: &str) -> PathBuf {
    let mut s: OsString = path.as_os_str().to_os_string();
    s.push(".");
    s.push(suffix);
    PathBuf::from(s)
}
