// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Imaging, and the model division that happens between the two imaging
//! passes.

use std::path::{Path, PathBuf};

use itertools::Itertools;
use log::info;

use super::{image_paths, Pipeline, PipelineError};
use crate::{
    casa::casa_script,
    config::{ImagingPass, ImagingSection},
    constants::{ADJUST_PHASE_CENTRE_SCRIPT, DIVIDE_MODEL_SCRIPT, RECENTRE_OFFSET},
    fs::make_dir,
    runner::ToolRunner,
    wsclean::WscleanCommand,
};

impl<R: ToolRunner> Pipeline<R> {
    /// Image the split datasets, then (for freshly imaged datasets) divide by
    /// the model, recentre, and image everything again at unit weighting.
    /// Returns the indices of the datasets imaged in each pass.
    pub(super) fn first_images(
        &mut self,
        msfiles: &[PathBuf],
    ) -> Result<(Vec<usize>, Vec<usize>), PipelineError> {
        let new_images = self.image_all(msfiles, ImagingPass::Initial)?;
        if !self.options.model_division {
            info!("Not dividing by the model; skipping the unit-weighting images");
            return Ok((new_images, vec![]));
        }

        info!("Dividing by the model");
        for (i, msfile) in msfiles.iter().enumerate() {
            if new_images.contains(&i) {
                self.divide_by_model(msfile)?;
                self.adjust_phase_centre(msfile, RECENTRE_OFFSET)?;
            } else {
                info!(
                    "No model division needed for the existing image of {}",
                    msfile.display()
                );
            }
        }

        let new_unit_images = self.image_all(msfiles, ImagingPass::UnitWeighting)?;
        Ok((new_images, new_unit_images))
    }

    /// Image every dataset that doesn't have an image directory yet. Returns
    /// the indices of the datasets that were imaged.
    pub(super) fn image_all(
        &mut self,
        msfiles: &[PathBuf],
        pass: ImagingPass,
    ) -> Result<Vec<usize>, PipelineError> {
        info!("Imaging {} datasets ([{pass}])", msfiles.len());
        let section = self.config.imaging(pass).clone();
        make_dir(&section.img_path, &mut self.code_log);

        let mut new_images = vec![];
        for (i, msfile) in msfiles.iter().enumerate() {
            if self.image(msfile, &section)? {
                new_images.push(i);
            }
        }
        Ok(new_images)
    }

    /// Image the concatenated dataset with the unit-weighting parameters.
    pub(super) fn image_concatenated(&mut self, concatvis: &Path) -> Result<bool, PipelineError> {
        let section = self.config.imaging(ImagingPass::UnitWeighting).clone();
        make_dir(&section.img_path, &mut self.code_log);
        self.image(concatvis, &section)
    }

    /// Returns `false` if the image directory already existed.
    fn image(&mut self, msfile: &Path, section: &ImagingSection) -> Result<bool, PipelineError> {
        let (img_dir, img_name) = image_paths(&section.img_path, msfile)?;
        if img_dir.exists() {
            info!("Already exists: {}", img_dir.display());
            return Ok(false);
        }

        make_dir(&img_dir, &mut self.code_log);
        info!("Now processing {}", msfile.display());
        let cmd = WscleanCommand::new(&self.config.wsclean, &section.params, msfile, &img_name)
            .to_command();
        self.dispatch(cmd)?;
        Ok(true)
    }

    fn divide_by_model(&mut self, msfile: &Path) -> Result<(), PipelineError> {
        info!("Dividing model for {}", msfile.display());
        let script = self.config.scripts_dir.join(DIVIDE_MODEL_SCRIPT);
        let cmd = casa_script(
            &self.config.casa,
            &script,
            ["-msfile".to_string(), msfile.display().to_string()],
        );
        self.dispatch(cmd)
    }

    fn adjust_phase_centre(&mut self, msfile: &Path, offset: [f64; 2]) -> Result<(), PipelineError> {
        info!("Recentering {}", msfile.display());
        let script = self.config.scripts_dir.join(ADJUST_PHASE_CENTRE_SCRIPT);
        let position = offset.iter().map(|p| p.to_string()).join(",");
        let cmd = casa_script(
            &self.config.casa,
            &script,
            [
                "-msfile".to_string(),
                msfile.display().to_string(),
                "-position".to_string(),
                position,
            ],
        );
        self.dispatch(cmd)
    }
}
