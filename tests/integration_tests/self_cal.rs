// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Tests against full runs of the pipeline.

use std::io::Write;

use tempfile::TempDir;

use crate::{get_cmd_output, inbeam, Setup, FAKE_CASA, LAZY_CASA};

const POSITIONS: [&str; 2] = ["J2000 10h00m00s -30d00m00s", "J2000 11h00m00s -31d00m00s"];

#[test]
fn test_full_run() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let setup = Setup::new(tmp_dir.path(), FAKE_CASA, &POSITIONS);

    let cmd = inbeam().args(setup.args()).ok();
    assert!(cmd.is_ok(), "inbeam failed: {}", cmd.err().unwrap());

    let root = &setup.root;
    for i in 0..2 {
        let split = root.join(format!("splits/obs_{i:03}.ms"));
        assert!(split.is_dir(), "{} is missing", split.display());
        assert!(root.join(format!("splits/obs_{i:03}.ms.listobs.txt")).exists());
        // The temporary copy is gone.
        assert!(!root.join(format!("splits/obs_{i:03}.ms.tmp")).exists());
        assert!(root.join(format!("images/obs_{i:03}")).is_dir());
        assert!(root.join(format!("images_unit/obs_{i:03}")).is_dir());
    }
    assert!(root.join("concat/obs_concat.ms").is_dir());
    assert!(root.join("concat/obs_concat.ms.listobs.txt").exists());
    assert!(root.join("images_unit/obs_concat").is_dir());

    let calls = setup.calls();
    // Per position: fixvis, mstransform, listobs, two images, model division
    // and recentring. Then concat, listobs and the final image.
    assert_eq!(calls.len(), 2 * 7 + 3, "{calls:#?}");
    let wsclean: Vec<&String> = calls.iter().filter(|c| c.starts_with("wsclean")).collect();
    assert_eq!(wsclean.len(), 5);
    assert!(wsclean[0].contains("-size 512 512"));
    assert!(wsclean[0].contains("-weight briggs -0.5"));
    assert!(!wsclean[0].contains("-robust"));
    assert!(!wsclean[0].contains("img_path"));
    assert!(wsclean[0].ends_with("obs_000.ms"));
    assert!(wsclean[4].ends_with("obs_concat.ms"));
    assert!(wsclean[4].contains("-weight uniform"));

    // Every command is in the code log.
    let code_log = std::fs::read_to_string(&setup.code_log).unwrap();
    assert!(code_log.contains("mstransform("));
    assert!(code_log.contains("concat("));
    assert!(code_log.contains("divide_model.py"));
    assert!(code_log.contains("adjust_phase_center.py"));
    assert_eq!(code_log.matches("wsclean").count(), 5);
}

#[test]
fn test_rerun_does_nothing() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let setup = Setup::new(tmp_dir.path(), FAKE_CASA, &POSITIONS);

    let cmd = inbeam().args(setup.args()).ok();
    assert!(cmd.is_ok(), "inbeam failed: {}", cmd.err().unwrap());
    std::fs::remove_file(&setup.calls).unwrap();

    let cmd = inbeam().args(setup.args()).ok();
    assert!(cmd.is_ok(), "inbeam failed on rerun: {}", cmd.err().unwrap());
    assert!(setup.calls().is_empty(), "{:#?}", setup.calls());
}

#[test]
fn test_no_model_division() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let setup = Setup::new(tmp_dir.path(), FAKE_CASA, &POSITIONS);

    let cmd = inbeam().args(setup.args()).arg("--no-model-division").ok();
    assert!(cmd.is_ok(), "inbeam failed: {}", cmd.err().unwrap());

    let calls = setup.calls();
    assert!(calls.iter().all(|c| !c.contains("divide_model.py")));
    assert!(calls.iter().all(|c| !c.contains("adjust_phase_center.py")));
    // Only the concatenated dataset gets a unit-weighting image.
    assert!(!setup.root.join("images_unit/obs_000").exists());
    assert!(setup.root.join("images_unit/obs_concat").is_dir());
}

#[test]
fn test_missing_split_is_fatal() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let setup = Setup::new(tmp_dir.path(), LAZY_CASA, &POSITIONS);

    let cmd = inbeam().args(setup.args()).ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("There was a problem creating"), "{stderr}");
    assert!(stderr.contains("obs_000.ms"), "{stderr}");
    // Nothing was imaged.
    assert!(setup.calls().iter().all(|c| !c.starts_with("wsclean")));
}

#[test]
fn test_dry_run_runs_nothing() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let setup = Setup::new(tmp_dir.path(), FAKE_CASA, &POSITIONS);

    let cmd = inbeam().args(setup.args()).arg("--dry-run").ok();
    assert!(cmd.is_ok(), "dry run failed: {}", cmd.err().unwrap());
    let (stdout, _) = get_cmd_output(cmd);
    assert!(stdout.contains("Dry run -- exiting now."), "{stdout}");
    assert!(stdout.contains("obs_001.ms"), "{stdout}");
    assert!(setup.calls().is_empty());
    assert!(!setup.code_log.exists());
    assert!(!setup.root.join("splits").exists());
}

#[test]
fn test_missing_config() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let config = tmp_dir.path().join("nothing.cfg");
    let cmd = inbeam()
        .args(["-m", "obs.ms", "-c", &config.display().to_string()])
        .ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.contains("does not exist"), "{stderr}");
}

#[test]
fn test_no_outliers() {
    let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
    let setup = Setup::new(tmp_dir.path(), FAKE_CASA, &[]);

    let cmd = inbeam().args(setup.args()).ok();
    assert!(cmd.is_err());
    let (_, stderr) = get_cmd_output(cmd);
    assert!(stderr.starts_with("Error:"), "{stderr}");
    assert!(setup.calls().is_empty());
}

#[test]
fn test_skipped_outliers_are_reported() {
    for extra_args in [vec![], vec!["--dry-run"]] {
        let tmp_dir = TempDir::new().expect("couldn't make tmp dir");
        let setup = Setup::new(tmp_dir.path(), FAKE_CASA, &POSITIONS);
        let mut outliers = std::fs::OpenOptions::new()
            .append(true)
            .open(setup.root.join("outliers.txt"))
            .unwrap();
        writeln!(outliers, "phasecenter=").unwrap();
        drop(outliers);

        let cmd = inbeam().args(setup.args()).args(&extra_args).ok();
        assert!(cmd.is_ok(), "inbeam {extra_args:?} failed: {}", cmd.err().unwrap());
        let (stdout, _) = get_cmd_output(cmd);
        assert!(
            stdout.contains("line 4: 'phasecenter' without a value; ignoring it"),
            "{extra_args:?}: {stdout}"
        );
    }
}
