// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Command-line interface code.
//!
//! Only 3 things should be public in this module: `Inbeam`, `Inbeam::run`, and
//! `InbeamError`.

mod error;
mod printers;

pub use error::InbeamError;
pub(crate) use printers::{display_warnings, InfoPrinter, Warn};

use std::{
    borrow::Cow,
    path::{Path, PathBuf},
};

use clap::Parser;
use log::{debug, info};

use crate::{
    config::{ConfigFile, ImagingPass, PipelineConfig, CONFIG_FILE_TYPES_COMMA_SEPARATED},
    constants::{
        ADJUST_PHASE_CENTRE_SCRIPT, DEFAULT_CODE_LOG_FILE, DEFAULT_CONFIG_FILE,
        DIVIDE_MODEL_SCRIPT,
    },
    outliers::read_outliers_file,
    pipeline::{concat_output, image_paths, split_outputs, Pipeline, PipelineOptions},
    runner::{CodeLog, ProcessRunner},
};

// Add build-time information from the "built" crate.
include!(concat!(env!("OUT_DIR"), "/built.rs"));

lazy_static::lazy_static! {
    static ref CONFIG_HELP: String =
        format!("Configuration file. The format is picked by extension; supported formats: {}. Default: {DEFAULT_CONFIG_FILE}", *CONFIG_FILE_TYPES_COMMA_SEPARATED);
}

#[derive(Debug, Parser)]
#[clap(
    version,
    author,
    about = "Self-calibrate the in-beam sources of a multi-source measurement set with CASA and WSClean"
)]
#[clap(infer_long_args = true)]
pub struct Inbeam {
    /// Path to the multi-source measurement set.
    #[clap(short, long, parse(from_os_str))]
    msfile: PathBuf,

    #[clap(short, long = "config", help = CONFIG_HELP.as_str(), default_value = DEFAULT_CONFIG_FILE, parse(from_os_str))]
    config_file: PathBuf,

    /// Run in debug mode (the same as -v).
    #[clap(long)]
    debug: bool,

    /// The verbosity of the program. Increase by specifying multiple times
    /// (e.g. -vv). The default is to print only high-level information.
    #[clap(short, long, parse(from_occurrences))]
    verbosity: u8,

    /// Only verify that the configuration and outliers were correctly read,
    /// and print what would be done.
    #[clap(long)]
    dry_run: bool,

    /// Don't divide the freshly imaged datasets by their model, recentre them
    /// or image them at unit weighting.
    #[clap(long)]
    no_model_division: bool,

    /// Every executed command is recorded in this file.
    #[clap(long, default_value = DEFAULT_CODE_LOG_FILE, parse(from_os_str))]
    code_log: PathBuf,
}

impl Inbeam {
    pub fn run(self) -> Result<(), InbeamError> {
        let level = self.verbosity.max(u8::from(self.debug));
        setup_logging(level).expect("Failed to initialise logging.");

        info!("inbeam {}", env!("CARGO_PKG_VERSION"));
        display_build_info();

        self.execute()?;
        info!("inbeam complete.");
        Ok(())
    }

    /// Everything but the logging setup.
    fn execute(self) -> Result<(), InbeamError> {
        let Inbeam {
            msfile,
            config_file,
            debug: _,
            verbosity: _,
            dry_run,
            no_model_division,
            code_log,
        } = self;

        info!("Reading config file: {}", config_file.display());
        let config = PipelineConfig::from_file(&ConfigFile::read(&config_file)?)?;
        debug!("{config:#?}");
        let options = PipelineOptions {
            model_division: !no_model_division,
        };
        print_setup(&msfile, &config, options);
        // Read before the warnings are displayed; skipped outlier lines are
        // reported with them.
        let positions = read_outliers_file(&config.outliers_file)?;
        display_warnings();

        if dry_run {
            print_plan(&msfile, &config, &positions, options)?;
            info!("Dry run -- exiting now.");
            return Ok(());
        }

        let code_log = CodeLog::create(&code_log)?;
        let mut pipeline = Pipeline::new(config, ProcessRunner, code_log, options);
        let summary = pipeline.run_for_positions(&msfile, &positions)?;

        let mut printer = InfoPrinter::new("Summary".into());
        printer.push_block(vec![
            format!(
                "{} datasets, {} newly split",
                summary.split_datasets.len(),
                summary.newly_split
            )
            .into(),
            format!(
                "{} first images, {} unit-weighting images",
                summary.newly_imaged.len(),
                summary.newly_imaged_unit.len()
            )
            .into(),
        ]);
        printer.push_line(
            format!(
                "Concatenated: {}{}",
                summary.concatvis.display(),
                if summary.concat_imaged { " (imaged)" } else { "" }
            )
            .into(),
        );
        printer.push_line(format!("{} external commands run", summary.commands_run).into());
        printer.display();
        Ok(())
    }
}

fn print_setup(msfile: &Path, config: &PipelineConfig, options: PipelineOptions) {
    let mut printer = InfoPrinter::new("Self-calibration setup".into());
    printer.push_line(format!("Input: {}", msfile.display()).into());
    printer.push_block(vec![
        format!("CASA:    {}", config.casa.display()).into(),
        format!("WSClean: {}", config.wsclean.display()).into(),
    ]);
    printer.push_block(vec![
        format!("Split datasets: {}", config.split_individual_dir.display()).into(),
        format!(
            "Averaging: {} channels, {}",
            config.split.cavg, config.split.tavg
        )
        .into(),
        format!("Concatenation:  {}", config.split_dir.display()).into(),
    ]);
    printer.push_block(vec![
        format!(
            "First images: {}",
            config.imaging(ImagingPass::Initial).img_path.display()
        )
        .into(),
        format!(
            "Unit-weighting images: {}",
            config.imaging(ImagingPass::UnitWeighting).img_path.display()
        )
        .into(),
    ]);
    if options.model_division {
        printer.push_line(format!("CASA scripts: {}", config.scripts_dir.display()).into());
        for script in [DIVIDE_MODEL_SCRIPT, ADJUST_PHASE_CENTRE_SCRIPT] {
            let path = config.scripts_dir.join(script);
            if !path.exists() {
                format!("CASA script {} doesn't exist", path.display()).warn();
            }
        }
    } else {
        printer.push_line("Model division: off".into());
    }
    printer.display();
}

/// Describe what a real run would do, given what's already on disk.
fn print_plan(
    msfile: &Path,
    config: &PipelineConfig,
    positions: &[String],
    options: PipelineOptions,
) -> Result<(), InbeamError> {
    let mut printer = InfoPrinter::new("Plan".into());
    let outputs = split_outputs(config, msfile, positions.len())?;
    printer.push_block(
        outputs
            .iter()
            .zip(positions.iter())
            .map(|(out, pos)| format!("{} <- {pos} ({})", out.display(), status(out)).into())
            .collect(),
    );

    let mut passes = vec![ImagingPass::Initial];
    if options.model_division {
        passes.push(ImagingPass::UnitWeighting);
    }
    for pass in passes {
        let img_path = &config.imaging(pass).img_path;
        let mut block: Vec<Cow<'static, str>> = Vec::with_capacity(outputs.len());
        for out in &outputs {
            let (img_dir, _) = image_paths(img_path, out)?;
            block.push(format!("[{pass}] {} ({})", img_dir.display(), status(&img_dir)).into());
        }
        printer.push_block(block);
    }

    let concatvis = concat_output(config, msfile)?;
    let (concat_img_dir, _) =
        image_paths(&config.imaging(ImagingPass::UnitWeighting).img_path, &concatvis)?;
    printer.push_block(vec![
        format!("{} ({})", concatvis.display(), status(&concatvis)).into(),
        format!("{} ({})", concat_img_dir.display(), status(&concat_img_dir)).into(),
    ]);
    printer.display();
    Ok(())
}

fn status(p: &Path) -> &'static str {
    if p.exists() {
        "exists, skipping"
    } else {
        "to do"
    }
}

/// Activate a logger. All log messages are put onto `stdout`. `env_logger`
/// automatically only uses colours and fancy symbols if we're on a tty (e.g. a
/// terminal); piped output will be formatted sensibly. Source code lines are
/// displayed in log messages when verbosity >= 3.
fn setup_logging(verbosity: u8) -> Result<(), log::SetLoggerError> {
    let mut builder = env_logger::Builder::from_default_env();
    builder.target(env_logger::Target::Stdout);
    builder.format_target(false);
    match verbosity {
        0 => builder.filter_level(log::LevelFilter::Info),
        1 => builder.filter_level(log::LevelFilter::Debug),
        2 => builder.filter_level(log::LevelFilter::Trace),
        _ => {
            builder.filter_level(log::LevelFilter::Trace);
            builder.format(|buf, record| {
                use std::io::Write;

                let timestamp = buf.timestamp();
                let level = record.level();
                let target = record.target();
                let line = record.line().unwrap_or(0);
                let message = record.args();

                writeln!(buf, "[{timestamp} {level} {target}:{line}] {message}")
            })
        }
    };
    builder.try_init()
}

/// Write many info-level log lines of how this executable was compiled.
fn display_build_info() {
    let dirty = match GIT_DIRTY {
        Some(true) => " (dirty)",
        _ => "",
    };
    match GIT_COMMIT_HASH_SHORT {
        Some(hash) => {
            info!("Compiled on git commit hash: {hash}{dirty}");
        }
        None => info!("Compiled on git commit hash: <no git info>"),
    }
    if let Some(hr) = GIT_HEAD_REF {
        info!("            git head ref: {}", hr);
    }
    info!("            {}", BUILT_TIME_UTC);
    info!("         with compiler {}", RUSTC_VERSION);
    info!("");
}
