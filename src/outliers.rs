// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Outlier phase centres.
//!
//! An outliers file lists one `phasecenter=<direction>` directive per line,
//! e.g. `phasecenter=J2000 12h34m56.7s +12d34m56.7s`. Lines starting with `#`
//! are ignored, as are lines that don't mention `phasecenter` at all.

use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
};

use log::info;
use thiserror::Error;
use vec1::Vec1;

use crate::cli::Warn;

const DIRECTIVE: &str = "phasecenter";

/// Read the phase centres listed in an outliers file, in file order.
pub fn read_outliers_file<P: AsRef<Path>>(file: P) -> Result<Vec1<String>, OutliersError> {
    let file = file.as_ref();
    info!("Reading outliers file: {}", file.display());
    let contents = read_to_string(file).map_err(|err| OutliersError::IO {
        file: file.to_path_buf(),
        err,
    })?;

    let positions = parse_outliers(&contents, file);
    let positions = Vec1::try_from_vec(positions)
        .map_err(|_| OutliersError::NoPositions(file.to_path_buf()))?;

    info!("Positions:");
    for position in &positions {
        info!("  {position}");
    }
    Ok(positions)
}

fn parse_outliers(contents: &str, file: &Path) -> Vec<String> {
    let mut positions = vec![];
    for (i_line, line) in contents.lines().enumerate() {
        if line.starts_with('#') || !line.contains(DIRECTIVE) {
            continue;
        }
        // Everything after the last '='.
        let position = line.rsplit('=').next().unwrap_or_default().trim();
        if position.is_empty() || !line.contains('=') {
            format!(
                "{}, line {}: '{DIRECTIVE}' without a value; ignoring it",
                file.display(),
                i_line + 1
            )
            .warn();
            continue;
        }
        positions.push(position.to_string());
    }
    positions
}

#[derive(Error, Debug)]
pub enum OutliersError {
    #[error("No 'phasecenter=' lines were found in the outliers file '{0}'; there is nothing to split")]
    NoPositions(PathBuf),

    #[error("Couldn't read outliers file '{file}': {err}")]
    IO { file: PathBuf, err: std::io::Error },
}
