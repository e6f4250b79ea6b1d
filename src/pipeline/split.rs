// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Splitting a multi-source measurement set into one dataset per direction.

use std::path::{Path, PathBuf};

use log::{error, info};

use super::{split_outputs, with_suffix, Pipeline, PipelineError};
use crate::{
    casa::{fixvis, listobs, mstransform},
    constants::{LISTOBS_SUFFIX, TMP_SUFFIX},
    fs::{copy_dir, make_dir, remove_dir, remove_file},
    runner::ToolRunner,
};

impl<R: ToolRunner> Pipeline<R> {
    /// Make a dataset for every position that doesn't have one yet. Returns
    /// the paths of all datasets (in position order) and how many were made.
    pub(super) fn split_all_directions(
        &mut self,
        ms: &Path,
        positions: &[String],
    ) -> Result<(Vec<PathBuf>, usize), PipelineError> {
        info!(
            "Splitting {} into {} directions",
            ms.display(),
            positions.len()
        );
        let outputs = split_outputs(&self.config, ms, positions.len())?;
        make_dir(&self.config.split_individual_dir, &mut self.code_log);

        let mut newly_split = 0;
        for (outputvis, position) in outputs.iter().zip(positions) {
            if outputvis.exists() {
                info!("Already exists: {}", outputvis.display());
                continue;
            }
            if !ms.is_dir() {
                return Err(PipelineError::NoInput(ms.to_path_buf()));
            }
            self.split_individual(ms, outputvis, position)?;
            newly_split += 1;
        }
        Ok((outputs, newly_split))
    }

    /// Copy `vis`, shift the copy's phase centre to `position`, average it
    /// into `outputvis` and write a listing of the result.
    pub(super) fn split_individual(
        &mut self,
        vis: &Path,
        outputvis: &Path,
        position: &str,
    ) -> Result<(), PipelineError> {
        info!("Splitting {} towards {position}", outputvis.display());
        let inter_ms = with_suffix(outputvis, TMP_SUFFIX);
        let listobs_file = with_suffix(outputvis, LISTOBS_SUFFIX);

        // Leftovers from an interrupted run.
        remove_dir(outputvis, &mut self.code_log);
        remove_dir(&inter_ms, &mut self.code_log);
        remove_file(&listobs_file, &mut self.code_log);

        copy_dir(vis, &inter_ms, &mut self.code_log);

        let split = &self.config.split;
        let shift = fixvis(&inter_ms, position);
        let average = mstransform(&inter_ms, outputvis, &split.tavg, split.cavg);
        self.run_casa(&shift)?;
        self.run_casa(&average)?;

        if outputvis.is_dir() {
            remove_dir(&inter_ms, &mut self.code_log);
        } else {
            error!("There was a problem creating {}", outputvis.display());
            return Err(PipelineError::MissingOutput {
                step: "mstransform",
                path: outputvis.to_path_buf(),
            });
        }

        self.run_casa(&listobs(outputvis, &listobs_file))
    }
}
