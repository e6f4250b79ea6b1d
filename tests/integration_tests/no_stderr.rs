// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests to ensure there is no stderr output for successful commands.

use tempfile::TempDir;

use crate::{get_cmd_output, inbeam, Setup, FAKE_CASA};

#[test]
fn test_self_cal_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let setup = Setup::new(tmp_dir.path(), FAKE_CASA, &["J2000 10h00m00s -30d00m00s"]);

    let cmd = inbeam().args(setup.args()).ok();
    assert!(cmd.is_ok(), "inbeam failed on a simple setup: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}

#[test]
fn test_dry_run_no_stderr() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let setup = Setup::new(tmp_dir.path(), FAKE_CASA, &["J2000 10h00m00s -30d00m00s"]);

    let cmd = inbeam().args(setup.args()).arg("--dry-run").ok();
    assert!(cmd.is_ok(), "dry run failed: {}", cmd.err().unwrap());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.is_empty(), "stderr wasn't empty: {stderr}");
}
