// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Best-effort filesystem operations.
//!
//! None of these functions fail. A successful operation is logged at info
//! level and recorded in the [`CodeLog`]; a failed one is logged at debug level
//! and otherwise ignored. Whether the pipeline can carry on is decided later,
//! by checking that the outputs it expects are actually there. The returned
//! `bool` only says whether the operation worked.

use std::{fs, io, path::Path};

use log::{debug, info};
use walkdir::WalkDir;

use crate::runner::{quote, CodeLog};

/// Create a directory (and its parents).
pub fn make_dir(dir: &Path, code_log: &mut CodeLog) -> bool {
    if dir.is_dir() {
        debug!("Not creating directory {}; it already exists", dir.display());
        return false;
    }
    match fs::create_dir_all(dir) {
        Ok(()) => {
            info!("Created directory: {}", dir.display());
            code_log.record(&format!("mkdir -p {}", quote(&dir.display().to_string())));
            true
        }
        Err(e) => {
            debug!("Cannot create directory {}: {e}", dir.display());
            false
        }
    }
}

/// Recursively copy the directory `from` to `to`. `to` must not exist yet.
pub fn copy_dir(from: &Path, to: &Path, code_log: &mut CodeLog) -> bool {
    match copy_tree(from, to) {
        Ok(()) => {
            info!("Copied directory: {} to {}", from.display(), to.display());
            code_log.record(&format!(
                "cp -r {} {}",
                quote(&from.display().to_string()),
                quote(&to.display().to_string())
            ));
            true
        }
        Err(e) => {
            debug!(
                "Cannot copy directory {} to {}: {e}",
                from.display(),
                to.display()
            );
            false
        }
    }
}

fn copy_tree(from: &Path, to: &Path) -> io::Result<()> {
    if !from.is_dir() {
        return Err(io::Error::new(
            io::ErrorKind::NotFound,
            "source is not a directory",
        ));
    }
    if to.exists() {
        return Err(io::Error::new(
            io::ErrorKind::AlreadyExists,
            "destination already exists",
        ));
    }

    for entry in WalkDir::new(from).follow_links(true) {
        let entry = entry?;
        let rel = entry
            .path()
            .strip_prefix(from)
            .map_err(|e| io::Error::new(io::ErrorKind::Other, e))?;
        let target = to.join(rel);
        if entry.file_type().is_dir() {
            fs::create_dir_all(&target)?;
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

/// Recursively delete a directory. Nothing happens if it doesn't exist.
pub fn remove_dir(dir: &Path, code_log: &mut CodeLog) -> bool {
    if !dir.exists() {
        return true;
    }
    match fs::remove_dir_all(dir) {
        Ok(()) => {
            info!("Deleted: {}", dir.display());
            code_log.record(&format!("rm -r {}", quote(&dir.display().to_string())));
            true
        }
        Err(e) => {
            debug!("Could not delete {}: {e}", dir.display());
            false
        }
    }
}

/// Delete a file. Nothing happens if it doesn't exist.
pub fn remove_file(file: &Path, code_log: &mut CodeLog) -> bool {
    if !file.exists() {
        return true;
    }
    match fs::remove_file(file) {
        Ok(()) => {
            info!("Deleted: {}", file.display());
            code_log.record(&format!("rm {}", quote(&file.display().to_string())));
            true
        }
        Err(e) => {
            debug!("Could not delete {}: {e}", file.display());
            false
        }
    }
}
