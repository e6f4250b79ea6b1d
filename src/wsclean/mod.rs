// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! WSClean command construction.
//!
//! An imaging configuration section maps WSClean flags to values, e.g.
//!
//! ```text
//! [wsclean]
//! img_path = images
//! -size = 1024
//! -weight = briggs
//! -robust = 0.5
//! -casa-mask =
//! ```
//!
//! A few conveniences are applied before the command is built: a single
//! `-size` is used for both width and height, `-robust` is folded into a
//! `briggs` weighting, an empty `-casa-mask` is dropped, and keys that aren't
//! flags are ignored.


use std::path::{Path, PathBuf};

use log::trace;

use crate::{config::Section, runner::ExternalCommand};

#[derive(Debug, Clone)]
pub struct WscleanCommand {
    pub program: PathBuf,
    /// Flags and their (possibly empty) values, in order.
    pub params: Section,
    pub ms: PathBuf,
}

impl WscleanCommand {
    /// Build a command that images `ms` into files prefixed with `img_name`.
    pub fn new(program: &Path, section: &Section, ms: &Path, img_name: &Path) -> WscleanCommand {
        let mut params = section.clone();
        params.insert("-name".to_string(), img_name.display().to_string());
        normalise_params(&mut params);
        trace!("WSClean parameters: {params:?}");

        WscleanCommand {
            program: program.to_path_buf(),
            params,
            ms: ms.to_path_buf(),
        }
    }

    /// Each flag is followed by the whitespace-separated words of its value;
    /// the measurement set comes last.
    pub fn to_command(&self) -> ExternalCommand {
        let mut cmd = ExternalCommand::new(&self.program);
        for (flag, value) in &self.params {
            cmd = cmd.arg(flag.as_str()).args(value.split_whitespace());
        }
        cmd.arg(self.ms.display().to_string())
    }
}

pub(crate) fn normalise_params(params: &mut Section) {
    // "-size 1024" means "-size 1024 1024".
    if let Some(size) = params.get_mut("-size") {
        let mut words = size.split_whitespace();
        if let (Some(single), None) = (words.next(), words.next()) {
            let doubled = format!("{single} {single}");
            *size = doubled;
        }
    }

    // Only briggs weighting takes a robustness.
    if params.get("-weight").map(|w| w.trim()) == Some("briggs") {
        if let Some(robust) = params.shift_remove("-robust") {
            params.insert("-weight".to_string(), format!("briggs {}", robust.trim()));
        }
    }

    if params
        .get("-casa-mask")
        .map(|m| m.trim().is_empty())
        .unwrap_or(false)
    {
        params.shift_remove("-casa-mask");
    }

    params.retain(|k, _| k.starts_with('-'));
}
