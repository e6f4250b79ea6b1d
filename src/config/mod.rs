// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Pipeline configuration.
//!
//! A configuration file is a set of named sections, each holding ordered
//! `key = value` pairs. The file format is chosen by extension (see
//! [`ConfigFileType`]); whatever the format, values are handled as strings,
//! because most of them end up on an external tool's command line.
//!
//! [`PipelineConfig`] pulls the settings the pipeline needs out of a
//! [`ConfigFile`]. The imaging sections are kept as-is, because their keys are
//! WSClean flags.

mod error;
mod ini;

pub use error::ConfigError;

use std::{
    fs::read_to_string,
    path::{Path, PathBuf},
    str::FromStr,
};

use indexmap::IndexMap;
use itertools::Itertools;
use log::{debug, trace};
use serde::Deserialize;
use strum::IntoEnumIterator;
use strum_macros::{Display, EnumIter, EnumString};

use crate::{cli::Warn, constants::DEFAULT_WSCLEAN};

/// The ordered key/value pairs of one section.
pub type Section = IndexMap<String, String>;

/// All sections of a configuration file, in file order.
pub type Sections = IndexMap<String, Section>;

lazy_static::lazy_static! {
    pub(crate) static ref CONFIG_FILE_TYPES_COMMA_SEPARATED: String = ConfigFileType::iter().join(", ");
}

#[derive(Debug, Display, EnumIter, EnumString, Clone, Copy, PartialEq, Eq)]
pub enum ConfigFileType {
    #[strum(serialize = "ini", to_string = "cfg")]
    Ini,
    #[strum(serialize = "toml")]
    Toml,
    #[strum(serialize = "json")]
    Json,
}

impl ConfigFileType {
    /// Anything that isn't recognisably toml or json is read as INI.
    pub fn from_path(path: &Path) -> ConfigFileType {
        path.extension()
            .and_then(|e| e.to_str())
            .map(|e| e.to_lowercase())
            .and_then(|e| ConfigFileType::from_str(&e).ok())
            .unwrap_or(ConfigFileType::Ini)
    }
}

/// A scalar as it appears in a toml or json configuration.
#[derive(Deserialize)]
#[serde(untagged)]
enum ScalarValue {
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    Other(serde_json::Value),
}

type StructuredSections = IndexMap<String, IndexMap<String, ScalarValue>>;

#[derive(Debug, Clone)]
pub struct ConfigFile {
    pub path: PathBuf,
    pub sections: Sections,
}

impl ConfigFile {
    pub fn read<P: AsRef<Path>>(path: P) -> Result<ConfigFile, ConfigError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(ConfigError::DoesNotExist(path.to_path_buf()));
        }
        let contents = read_to_string(path).map_err(|err| ConfigError::IO {
            file: path.to_path_buf(),
            err,
        })?;

        let file_type = ConfigFileType::from_path(path);
        debug!(
            "Reading {file_type} configuration file {}",
            path.display()
        );
        let sections = match file_type {
            ConfigFileType::Ini => ini::parse_ini(&contents, path)?,
            ConfigFileType::Toml => {
                let structured: StructuredSections =
                    toml::from_str(&contents).map_err(|e| ConfigError::Toml {
                        file: path.to_path_buf(),
                        err: e.to_string(),
                    })?;
                stringify_sections(structured)?
            }
            ConfigFileType::Json => {
                let structured: StructuredSections =
                    serde_json::from_str(&contents).map_err(|e| ConfigError::Json {
                        file: path.to_path_buf(),
                        err: e.to_string(),
                    })?;
                stringify_sections(structured)?
            }
        };
        debug!("Sections: [{}]", sections.keys().join(", "));
        trace!("{sections:#?}");

        Ok(ConfigFile {
            path: path.to_path_buf(),
            sections,
        })
    }

    pub fn section(&self, name: &str) -> Result<&Section, ConfigError> {
        self.sections
            .get(name)
            .ok_or_else(|| ConfigError::MissingSection(name.to_string()))
    }

    pub fn get(&self, section: &str, key: &str) -> Result<&str, ConfigError> {
        self.section(section)?
            .get(key)
            .map(|s| s.as_str())
            .ok_or_else(|| ConfigError::MissingKey {
                section: section.to_string(),
                key: key.to_string(),
            })
    }

    pub fn get_opt(&self, section: &str, key: &str) -> Option<&str> {
        self.sections
            .get(section)
            .and_then(|s| s.get(key))
            .map(|s| s.as_str())
    }
}

fn stringify_sections(structured: StructuredSections) -> Result<Sections, ConfigError> {
    let mut sections = Sections::new();
    for (name, section) in structured {
        let mut out = Section::new();
        for (key, value) in section {
            let s = match value {
                ScalarValue::Bool(b) => b.to_string(),
                ScalarValue::Int(i) => i.to_string(),
                ScalarValue::Float(f) => f.to_string(),
                ScalarValue::Str(s) => s,
                ScalarValue::Other(_) => {
                    return Err(ConfigError::UnsupportedValue { section: name, key })
                }
            };
            out.insert(key, s);
        }
        sections.insert(name, out);
    }
    Ok(sections)
}

/// Which of the two imaging passes a WSClean run belongs to.
#[derive(Debug, Display, Clone, Copy, PartialEq, Eq)]
pub enum ImagingPass {
    /// The first images of the freshly split datasets.
    #[strum(serialize = "wsclean")]
    Initial,

    /// Images made after model division, and the image of the concatenated
    /// dataset.
    #[strum(serialize = "wsclean_unit")]
    UnitWeighting,
}

/// A configuration section of WSClean parameters.
#[derive(Debug, Clone)]
pub struct ImagingSection {
    /// Where the per-dataset image directories go.
    pub img_path: PathBuf,

    /// The section exactly as written. Keys that aren't WSClean flags (like
    /// `img_path`) are dropped when a command is built.
    pub params: Section,
}

#[derive(Debug, Clone)]
pub struct SplitParams {
    /// Number of channels to average together.
    pub cavg: u32,

    /// Time averaging bin, e.g. "8s".
    pub tavg: String,
}

/// Everything the pipeline needs from a configuration file.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    pub casa: PathBuf,
    pub wsclean: PathBuf,
    pub split_individual_dir: PathBuf,
    pub split_dir: PathBuf,
    pub scripts_dir: PathBuf,
    pub outliers_file: PathBuf,
    pub split: SplitParams,
    pub initial_imaging: ImagingSection,
    pub unit_imaging: ImagingSection,
}

impl PipelineConfig {
    pub fn from_file(config: &ConfigFile) -> Result<PipelineConfig, ConfigError> {
        let global = "global";

        let scripts_dir = match config.get_opt(global, "scripts_dir") {
            Some(d) => PathBuf::from(d),
            None => default_scripts_dir(),
        };

        let cavg_str = config.get("split_all", "cavg")?;
        let cavg = cavg_str
            .trim()
            .parse()
            .map_err(|_| ConfigError::ParseInt {
                section: "split_all".to_string(),
                key: "cavg".to_string(),
                value: cavg_str.to_string(),
            })?;

        Ok(PipelineConfig {
            casa: PathBuf::from(config.get(global, "casa")?),
            wsclean: PathBuf::from(config.get_opt(global, "wsclean").unwrap_or(DEFAULT_WSCLEAN)),
            split_individual_dir: PathBuf::from(config.get(global, "split_individual_dir")?),
            split_dir: PathBuf::from(config.get(global, "split_dir")?),
            scripts_dir,
            outliers_file: PathBuf::from(config.get("sources", "outliers_file")?),
            split: SplitParams {
                cavg,
                tavg: config.get("split_all", "tavg")?.to_string(),
            },
            initial_imaging: imaging_section(config, ImagingPass::Initial)?,
            unit_imaging: imaging_section(config, ImagingPass::UnitWeighting)?,
        })
    }

    pub fn imaging(&self, pass: ImagingPass) -> &ImagingSection {
        match pass {
            ImagingPass::Initial => &self.initial_imaging,
            ImagingPass::UnitWeighting => &self.unit_imaging,
        }
    }
}

fn imaging_section(config: &ConfigFile, pass: ImagingPass) -> Result<ImagingSection, ConfigError> {
    let name = pass.to_string();
    let params = config.section(&name)?.clone();
    let img_path = PathBuf::from(config.get(&name, "img_path")?);
    Ok(ImagingSection { img_path, params })
}

/// The helper CASA scripts are expected to sit next to the executable.
fn default_scripts_dir() -> PathBuf {
    match std::env::current_exe() {
        Ok(exe) => exe
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
        Err(e) => {
            format!("Couldn't determine the location of this executable ({e}); looking for CASA helper scripts in the current directory")
                .warn();
            PathBuf::from(".")
        }
    }
}
