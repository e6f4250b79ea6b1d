// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Integration tests.
//!
//! CASA and WSClean are replaced with small shell scripts that record their
//! arguments and create the outputs the real programs would, so these tests
//! only run on Unix.

#![cfg(unix)]

mod no_stderr;
mod self_cal;

use std::{
    fs::File,
    io::Write,
    os::unix::fs::PermissionsExt,
    path::{Path, PathBuf},
    process::Output,
    str::from_utf8,
};

use assert_cmd::{output::OutputError, Command};
use indoc::{formatdoc, indoc};

fn inbeam() -> Command {
    Command::cargo_bin("inbeam").unwrap()
}

fn get_cmd_output(result: Result<Output, OutputError>) -> (String, String) {
    let output = match result {
        Ok(o) => o,
        Err(o) => o.as_output().unwrap().clone(),
    };
    (
        from_utf8(&output.stdout).unwrap().to_string(),
        from_utf8(&output.stderr).unwrap().to_string(),
    )
}

/// A CASA stand-in that creates whatever `outputvis`, `concatvis` and
/// `listfile` name.
const FAKE_CASA: &str = indoc! {r#"
    #!/bin/sh
    echo "casa $*" >> "$(dirname "$0")/calls.log"
    while [ $# -gt 0 ]; do
        if [ "$1" = "-c" ]; then
            shift
            expr="$1"
            break
        fi
        shift
    done
    for key in outputvis concatvis; do
        out=$(printf '%s' "$expr" | sed -n "s/.*$key=\"\([^\"]*\)\".*/\1/p")
        if [ -n "$out" ]; then
            mkdir -p "$out"
        fi
    done
    listfile=$(printf '%s' "$expr" | sed -n 's/.*listfile="\([^"]*\)".*/\1/p')
    if [ -n "$listfile" ]; then
        echo "listing" > "$listfile"
    fi
    exit 0
"#};

/// A CASA stand-in that never produces anything.
const LAZY_CASA: &str = indoc! {r#"
    #!/bin/sh
    echo "casa $*" >> "$(dirname "$0")/calls.log"
    exit 0
"#};

const FAKE_WSCLEAN: &str = indoc! {r#"
    #!/bin/sh
    echo "wsclean $*" >> "$(dirname "$0")/calls.log"
    exit 0
"#};

fn write_executable(path: &Path, contents: &str) {
    let mut f = File::create(path).unwrap();
    f.write_all(contents.as_bytes()).unwrap();
    drop(f);
    let mut perms = std::fs::metadata(path).unwrap().permissions();
    perms.set_mode(0o755);
    std::fs::set_permissions(path, perms).unwrap();
}

/// Everything a run needs, laid out under one directory.
struct Setup {
    root: PathBuf,
    ms: PathBuf,
    config: PathBuf,
    code_log: PathBuf,
    /// Every call to the fake tools ends up here.
    calls: PathBuf,
}

impl Setup {
    fn new(root: &Path, casa: &str, positions: &[&str]) -> Setup {
        let bin = root.join("bin");
        std::fs::create_dir(&bin).unwrap();
        write_executable(&bin.join("casa"), casa);
        write_executable(&bin.join("wsclean"), FAKE_WSCLEAN);
        let scripts = root.join("scripts");
        std::fs::create_dir(&scripts).unwrap();
        File::create(scripts.join("divide_model.py")).unwrap();
        File::create(scripts.join("adjust_phase_center.py")).unwrap();

        let ms = root.join("obs.ms");
        std::fs::create_dir(&ms).unwrap();
        File::create(ms.join("table.dat")).unwrap();

        let outliers = root.join("outliers.txt");
        let mut f = File::create(&outliers).unwrap();
        writeln!(f, "# outliers").unwrap();
        for p in positions {
            writeln!(f, "phasecenter={p}").unwrap();
        }

        let config = root.join("config.cfg");
        let mut f = File::create(&config).unwrap();
        write!(
            f,
            "{}",
            formatdoc! {"
                [global]
                casa = {bin}/casa
                wsclean = {bin}/wsclean
                scripts_dir = {scripts}
                split_individual_dir = {root}/splits
                split_dir = {root}/concat

                [sources]
                outliers_file = {outliers}

                [split_all]
                cavg = 4
                tavg = 8s

                [wsclean]
                img_path = {root}/images
                -size = 512
                -scale = 1asec
                -weight = briggs
                -robust = -0.5

                [wsclean_unit]
                img_path = {root}/images_unit
                -size = 512
                -weight = uniform
                ",
                bin = bin.display(),
                scripts = scripts.display(),
                root = root.display(),
                outliers = outliers.display(),
            }
        )
        .unwrap();

        Setup {
            root: root.to_path_buf(),
            ms,
            config,
            code_log: root.join("commands.log"),
            calls: bin.join("calls.log"),
        }
    }

    fn args(&self) -> Vec<String> {
        vec![
            "-m".to_string(),
            self.ms.display().to_string(),
            "-c".to_string(),
            self.config.display().to_string(),
            "--code-log".to_string(),
            self.code_log.display().to_string(),
        ]
    }

    fn calls(&self) -> Vec<String> {
        match std::fs::read_to_string(&self.calls) {
            Ok(s) => s.lines().map(|l| l.to_string()).collect(),
            Err(_) => vec![],
        }
    }
}
