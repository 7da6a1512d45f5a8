use crate::errors::{Error, Result};
use crate::remote::{self, parse_semver};
use regex::Regex;
use std::fs;
use std::path::{Path, PathBuf};

/// Manifest files that declare a required toolchain version, in precedence
/// order within one directory: the workspace file wins over the module file.
const MANIFEST_FILES: [&str; 2] = ["go.work", "go.mod"];

fn version_line_regex() -> Regex {
    // "go X.Y" or "go X.Y.Z" at the start of a line
    Regex::new(r"^go\s+(\d+\.\d+(?:\.\d+)?)").unwrap()
}

/// Detect the required version for a project directory.
///
/// With `inherit` false only `dir` itself is checked; with `inherit` true the
/// same two-file precedence check repeats in each parent directory up to the
/// filesystem root, and the first match at any level wins.
pub fn detect_version(dir: &Path, inherit: bool) -> Result<(String, PathBuf)> {
    let mut dir = dir.canonicalize().map_err(|_| not_found(dir))?;

    loop {
        if let Some(found) = detect_in_dir(&dir) {
            return Ok(found);
        }
        if !inherit {
            return Err(not_found(&dir));
        }
        match dir.parent() {
            Some(parent) => dir = parent.to_path_buf(),
            None => return Err(not_found(&dir)),
        }
    }
}

fn not_found(dir: &Path) -> Error {
    Error::NotFound(format!(
        "no go.mod or go.work found in {}",
        dir.display()
    ))
}

fn detect_in_dir(dir: &Path) -> Option<(String, PathBuf)> {
    for name in MANIFEST_FILES {
        let path = dir.join(name);
        if let Some(version) = parse_manifest(&path) {
            return Some((version, path));
        }
    }
    None
}

/// Scan a manifest line by line, skipping blanks and `//` comments, for the
/// first version directive.
fn parse_manifest(path: &Path) -> Option<String> {
    let content = fs::read_to_string(path).ok()?;
    let re = version_line_regex();

    for line in content.lines() {
        let line = line.trim();
        if line.is_empty() || line.starts_with("//") {
            continue;
        }
        if let Some(captures) = re.captures(line) {
            return Some(captures[1].to_string());
        }
    }
    None
}

/// Complete a two-component version to a concrete patch release.
///
/// Prefers the highest catalog patch sharing the major.minor prefix; appends
/// ".0" when the catalog is unreachable. The only deliberate graceful
/// degradation in the engine.
pub async fn complete_patch(version: &str) -> String {
    if version.split('.').count() >= 3 {
        return version.to_string();
    }

    match remote::list_all().await {
        Ok(all) => highest_patch(&all, version),
        Err(e) => {
            tracing::debug!("Catalog unreachable, guessing patch: {}", e);
            format!("{}.0", version)
        }
    }
}

/// Highest patch in `all` sharing `version`'s major.minor prefix, compared
/// as semantic versions.
pub fn highest_patch(all: &[String], version: &str) -> String {
    let prefix = format!("{}.", version);
    let best = all
        .iter()
        .filter(|v| v.starts_with(&prefix) || v.as_str() == version)
        .max_by(|a, b| match (parse_semver(a), parse_semver(b)) {
            (Some(va), Some(vb)) => va.cmp(&vb),
            (Some(_), None) => std::cmp::Ordering::Greater,
            (None, Some(_)) => std::cmp::Ordering::Less,
            (None, None) => a.cmp(b),
        });

    match best {
        Some(v) => v.clone(),
        None => format!("{}.0", version),
    }
}
