// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! A reader for INI-style configuration files.
//!
//! Only the parts of the format that pipeline configurations actually use are
//! supported: `[section]` headers, `key = value` (or `key: value`) pairs,
//! whole-line `#` and `;` comments, indented continuation lines (which may be
//! separated from their key by blank lines) and `%(key)s` interpolation. Keys
//! are case-insensitive (they are lower-cased); section names are not. Values
//! in the `DEFAULT` section are visible from every other section.

use std::path::Path;

use indexmap::IndexMap;
use log::trace;
use regex::Regex;

use super::{ConfigError, Section, Sections};

/// The section whose values are inherited by every other section.
pub(super) const DEFAULT_SECTION: &str = "DEFAULT";

/// Interpolation references are followed at most this deep.
const MAX_INTERPOLATION_DEPTH: usize = 10;

lazy_static::lazy_static! {
    static ref RE_HEADER: Regex = Regex::new(r"^\[(?P<name>.+)\]$").unwrap();

    // The first '=' or ':' separates the key from the value.
    static ref RE_OPTION: Regex = Regex::new(r"^(?P<key>.*?)\s*[=:]\s*(?P<value>.*)$").unwrap();

    static ref RE_REFERENCE: Regex = Regex::new(r"^%\((?P<name>[^)]*)\)s").unwrap();
}

pub(super) fn parse_ini(contents: &str, file: &Path) -> Result<Sections, ConfigError> {
    let mut defaults = Section::new();
    let mut sections: Sections = IndexMap::new();

    // The section currently being filled, and the key (with its indentation)
    // that continuation lines get appended to.
    let mut current: Option<String> = None;
    let mut last_key: Option<(String, usize)> = None;
    // Blank lines seen since the last value line. They only become part of
    // the value if a continuation line follows.
    let mut pending_blanks = 0;

    for (i_line, raw) in contents.lines().enumerate() {
        let line_num = i_line + 1;
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            if last_key.is_some() {
                pending_blanks += 1;
            }
            continue;
        }
        if trimmed.starts_with('#') || trimmed.starts_with(';') {
            continue;
        }

        let indent = raw.len() - raw.trim_start().len();
        if let (Some(section), Some((key, key_indent))) = (current.as_ref(), last_key.as_ref()) {
            if indent > *key_indent {
                let target = if section == DEFAULT_SECTION {
                    &mut defaults
                } else {
                    sections.entry(section.clone()).or_default()
                };
                if let Some(value) = target.get_mut(key) {
                    if !value.is_empty() {
                        value.push('\n');
                        value.push_str(&"\n".repeat(pending_blanks));
                    }
                    value.push_str(trimmed);
                }
                pending_blanks = 0;
                continue;
            }
        }

        pending_blanks = 0;
        if let Some(caps) = RE_HEADER.captures(trimmed) {
            let name = caps["name"].to_string();
            trace!("{}:{line_num}: section [{name}]", file.display());
            if name != DEFAULT_SECTION {
                if sections.contains_key(&name) {
                    return Err(ConfigError::DuplicateSection {
                        file: file.to_path_buf(),
                        section: name,
                    });
                }
                sections.insert(name.clone(), Section::new());
            }
            current = Some(name);
            last_key = None;
            continue;
        }

        let section = match current.as_ref() {
            Some(s) => s,
            None => {
                return Err(ConfigError::IniNoSection {
                    file: file.to_path_buf(),
                    line: line_num,
                })
            }
        };
        let caps = match RE_OPTION.captures(trimmed) {
            Some(c) => c,
            None => {
                return Err(ConfigError::IniSyntax {
                    file: file.to_path_buf(),
                    line: line_num,
                    text: trimmed.to_string(),
                })
            }
        };
        let key = caps["key"].trim().to_lowercase();
        if key.is_empty() {
            return Err(ConfigError::IniEmptyKey {
                file: file.to_path_buf(),
                line: line_num,
            });
        }
        let value = caps["value"].trim().to_string();

        let target = if section == DEFAULT_SECTION {
            &mut defaults
        } else {
            sections.entry(section.clone()).or_default()
        };
        if target.contains_key(&key) {
            return Err(ConfigError::DuplicateKey {
                file: file.to_path_buf(),
                section: section.clone(),
                key,
            });
        }
        target.insert(key.clone(), value);
        last_key = Some((key, indent));
    }

    // Every section sees the defaults, then all values are interpolated.
    let mut resolved = Sections::new();
    for (name, mut section) in sections {
        for (k, v) in &defaults {
            if !section.contains_key(k) {
                section.insert(k.clone(), v.clone());
            }
        }
        let mut interpolated = Section::new();
        for (key, value) in &section {
            interpolated.insert(key.clone(), interpolate(&name, key, value, &section, 1)?);
        }
        resolved.insert(name, interpolated);
    }
    Ok(resolved)
}

/// Expand `%(name)s` references against `section`. `%%` is a literal `%`.
fn interpolate(
    section_name: &str,
    key: &str,
    value: &str,
    section: &Section,
    depth: usize,
) -> Result<String, ConfigError> {
    let err = |reason: String| ConfigError::Interpolation {
        section: section_name.to_string(),
        key: key.to_string(),
        reason,
    };
    if depth > MAX_INTERPOLATION_DEPTH {
        return Err(err(format!(
            "references nest deeper than {MAX_INTERPOLATION_DEPTH} levels"
        )));
    }

    let mut out = String::with_capacity(value.len());
    let mut rest = value;
    while let Some(pos) = rest.find('%') {
        out.push_str(&rest[..pos]);
        rest = &rest[pos..];
        if let Some(stripped) = rest.strip_prefix("%%") {
            out.push('%');
            rest = stripped;
        } else if let Some(caps) = RE_REFERENCE.captures(rest) {
            let name = caps["name"].to_lowercase();
            let whole = caps.get(0).map(|m| m.end()).unwrap_or(0);
            let referenced = section
                .get(&name)
                .ok_or_else(|| err(format!("'{name}' is not defined in this section")))?;
            out.push_str(&interpolate(
                section_name,
                key,
                referenced,
                section,
                depth + 1,
            )?);
            rest = &rest[whole..];
        } else {
            return Err(err(format!(
                "'%' must be followed by '%' or '(name)s', found '{rest}'"
            )));
        }
    }
    out.push_str(rest);
    Ok(out)
}
