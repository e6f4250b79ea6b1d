// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

use std::path::{Path, PathBuf};

use log::{error, info};

use super::{concat_output, with_suffix, Pipeline, PipelineError};
use crate::{
    casa::{concat, listobs},
    constants::LISTOBS_SUFFIX,
    fs::make_dir,
    runner::ToolRunner,
};

impl<R: ToolRunner> Pipeline<R> {
    /// Merge the split datasets back into one. Every split dataset must exist.
    pub(super) fn concatenate_all(
        &mut self,
        ms: &Path,
        msfiles: &[PathBuf],
    ) -> Result<PathBuf, PipelineError> {
        info!("Running concatenate");
        let concatvis = concat_output(&self.config, ms)?;
        if concatvis.exists() {
            info!("Already exists: {}", concatvis.display());
            return Ok(concatvis);
        }

        if let Some(missing) = msfiles.iter().find(|m| !m.is_dir()) {
            error!("Can't concatenate; {} is missing", missing.display());
            return Err(PipelineError::MissingOutput {
                step: "splitting",
                path: missing.clone(),
            });
        }

        make_dir(&self.config.split_dir, &mut self.code_log);
        let inputs: Vec<&Path> = msfiles.iter().map(|p| p.as_path()).collect();
        self.run_casa(&concat(&inputs, &concatvis))?;
        self.run_casa(&listobs(
            &concatvis,
            &with_suffix(&concatvis, LISTOBS_SUFFIX),
        ))?;
        Ok(concatvis)
    }
}
