// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! CASA task invocations.
//!
//! CASA is driven non-interactively by handing it a single Python call
//! expression with `-c`, e.g.
//! `casa --nogui --nologger --nologfile -c 'listobs(vis="a.ms", listfile="a.txt")'`.
//! [`CasaTask`] holds the task name and its ordered parameters and renders
//! that expression.


use std::{fmt::Display, path::Path};

use indexmap::IndexMap;
use itertools::Itertools;

use crate::{constants::CASA_BATCH_ARGS, runner::ExternalCommand};

/// A CASA task parameter.
#[derive(Debug, Clone, PartialEq)]
pub enum CasaValue {
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    List(Vec<String>),
}

/// Python literal syntax.
impl Display for CasaValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CasaValue::Str(s) => write!(f, "\"{}\"", escape_double_quoted(s)),
            CasaValue::Int(i) => write!(f, "{i}"),
            // Debug formatting keeps the ".0" on whole numbers, like Python.
            CasaValue::Float(x) if x.is_finite() => write!(f, "{x:?}"),
            CasaValue::Float(x) if x.is_nan() => write!(f, "float(\"nan\")"),
            CasaValue::Float(x) if *x > 0.0 => write!(f, "float(\"inf\")"),
            CasaValue::Float(_) => write!(f, "float(\"-inf\")"),
            CasaValue::Bool(true) => write!(f, "True"),
            CasaValue::Bool(false) => write!(f, "False"),
            CasaValue::List(l) => write!(
                f,
                "[{}]",
                l.iter()
                    .map(|s| format!("'{}'", s.replace('\\', r"\\").replace('\'', r"\'")))
                    .join(", ")
            ),
        }
    }
}

fn escape_double_quoted(s: &str) -> String {
    s.replace('\\', r"\\").replace('"', "\\\"")
}

impl From<&str> for CasaValue {
    fn from(s: &str) -> Self {
        CasaValue::Str(s.to_string())
    }
}

impl From<String> for CasaValue {
    fn from(s: String) -> Self {
        CasaValue::Str(s)
    }
}

impl From<&Path> for CasaValue {
    fn from(p: &Path) -> Self {
        CasaValue::Str(p.display().to_string())
    }
}

impl From<i64> for CasaValue {
    fn from(i: i64) -> Self {
        CasaValue::Int(i)
    }
}

impl From<u32> for CasaValue {
    fn from(i: u32) -> Self {
        CasaValue::Int(i64::from(i))
    }
}

impl From<f64> for CasaValue {
    fn from(x: f64) -> Self {
        CasaValue::Float(x)
    }
}

impl From<bool> for CasaValue {
    fn from(b: bool) -> Self {
        CasaValue::Bool(b)
    }
}

impl From<Vec<String>> for CasaValue {
    fn from(l: Vec<String>) -> Self {
        CasaValue::List(l)
    }
}

/// A CASA task and its parameters, in the order they'll be passed.
#[derive(Debug, Clone, PartialEq)]
pub struct CasaTask {
    pub name: &'static str,
    pub params: IndexMap<&'static str, CasaValue>,
}

impl CasaTask {
    pub fn new(name: &'static str) -> CasaTask {
        CasaTask {
            name,
            params: IndexMap::new(),
        }
    }

    pub fn param<V: Into<CasaValue>>(mut self, key: &'static str, value: V) -> CasaTask {
        self.params.insert(key, value.into());
        self
    }

    /// e.g. `listobs(vis="a.ms", listfile="a.ms.listobs.txt")`
    pub fn call_expression(&self) -> String {
        format!(
            "{}({})",
            self.name,
            self.params
                .iter()
                .map(|(k, v)| format!("{k}={v}"))
                .join(", ")
        )
    }

    pub fn to_command(&self, casa: &Path) -> ExternalCommand {
        ExternalCommand::new(casa)
            .args(CASA_BATCH_ARGS)
            .arg("-c")
            .arg(self.call_expression())
    }
}

/// Run a CASA script with its own command-line arguments.
pub fn casa_script<I, S>(casa: &Path, script: &Path, script_args: I) -> ExternalCommand
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    ExternalCommand::new(casa)
        .args(CASA_BATCH_ARGS)
        .arg("-c")
        .arg(script.display().to_string())
        .args(script_args)
}

// The tasks the pipeline uses.

/// Shift the phase centre of `vis` in place.
pub fn fixvis(vis: &Path, phasecenter: &str) -> CasaTask {
    CasaTask::new("fixvis")
        .param("vis", vis)
        .param("field", "")
        .param("outputvis", "")
        .param("phasecenter", phasecenter)
        .param("datacolumn", crate::constants::DATA_COLUMN)
}

/// Average `vis` in time and frequency into `outputvis`.
pub fn mstransform(vis: &Path, outputvis: &Path, timebin: &str, chanbin: u32) -> CasaTask {
    CasaTask::new("mstransform")
        .param("vis", vis)
        .param("outputvis", outputvis)
        .param("field", "")
        .param("datacolumn", crate::constants::DATA_COLUMN)
        .param("keepflags", true)
        .param("timeaverage", true)
        .param("timebin", timebin)
        .param("chanaverage", true)
        .param("chanbin", chanbin)
}

/// Write a summary of `vis` to `listfile`.
pub fn listobs(vis: &Path, listfile: &Path) -> CasaTask {
    CasaTask::new("listobs")
        .param("vis", vis)
        .param("listfile", listfile)
}

/// Merge `vis` into `concatvis`.
pub fn concat(vis: &[&Path], concatvis: &Path) -> CasaTask {
    CasaTask::new("concat")
        .param(
            "vis",
            vis.iter()
                .map(|p| p.display().to_string())
                .collect::<Vec<_>>(),
        )
        .param("concatvis", concatvis)
        .param("respectname", false)
}
