use crate::errors::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::PathBuf;

pub const ROOT_DIR_NAME: &str = ".gvm";
pub const ROOT_ENV: &str = "GVM_ROOT";
pub const CONFIG_FILE_NAME: &str = "config.json";

/// Aliases that are seeded at first save and behave like ordinary entries
/// otherwise: removable, reassignable, and empty until the user sets them.
pub const RESERVED_ALIASES: [&str; 2] = ["stable", "latest"];

/// All on-disk locations used by gvm, rooted at `~/.gvm` (or `$GVM_ROOT`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Paths {
    pub root: PathBuf,
    pub versions: PathBuf,
    pub current: PathBuf,
    pub cache: PathBuf,
    pub config: PathBuf,
}

impl Paths {
    pub fn discover() -> Result<Self> {
        if let Some(root) = std::env::var_os(ROOT_ENV) {
            if !root.is_empty() {
                return Ok(Self::at(PathBuf::from(root)));
            }
        }

        let home = dirs::home_dir().ok_or_else(|| {
            Error::Filesystem(io::Error::new(
                io::ErrorKind::NotFound,
                "could not determine home directory",
            ))
        })?;
        Ok(Self::at(home.join(ROOT_DIR_NAME)))
    }

    pub fn at(root: PathBuf) -> Self {
        Self {
            versions: root.join("versions"),
            current: root.join("current"),
            cache: root.join("cache"),
            config: root.join(CONFIG_FILE_NAME),
            root,
        }
    }

    pub fn ensure_dirs(&self) -> Result<()> {
        for dir in [&self.root, &self.versions, &self.cache] {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    pub fn version_dir(&self, version: &str) -> PathBuf {
        self.versions.join(version)
    }

    /// The extracted toolchain directory inside a version, the symlink target
    /// of the current pointer.
    pub fn toolchain_dir(&self, version: &str) -> PathBuf {
        self.version_dir(version).join("go")
    }

    /// The binary whose existence is the sole test for "is this installed".
    pub fn go_binary(&self, version: &str) -> PathBuf {
        let name = if cfg!(windows) { "go.exe" } else { "go" };
        self.toolchain_dir(version).join("bin").join(name)
    }

    pub fn cache_file(&self, version: &str) -> PathBuf {
        self.cache.join(format!("go{}.tar.gz", version))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Config {
    #[serde(default = "default_auto_install")]
    pub auto_install: bool,
    /// Search parent directories for go.mod/go.work during detection.
    #[serde(default)]
    pub inherit_version: bool,
    #[serde(default)]
    pub default_version: String,
    #[serde(default = "default_aliases")]
    pub aliases: BTreeMap<String, String>,
}

fn default_auto_install() -> bool {
    true
}

fn default_aliases() -> BTreeMap<String, String> {
    RESERVED_ALIASES
        .iter()
        .map(|name| (name.to_string(), String::new()))
        .collect()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            auto_install: default_auto_install(),
            inherit_version: false,
            default_version: String::new(),
            aliases: default_aliases(),
        }
    }
}

impl Config {
    pub fn load(paths: &Paths) -> Result<Self> {
        match fs::read_to_string(&paths.config) {
            Ok(content) => {
                let config: Config = serde_json::from_str(&content).map_err(|e| {
                    Error::Filesystem(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("could not parse {}: {}", paths.config.display(), e),
                    ))
                })?;
                Ok(config)
            }
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Config::default()),
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, paths: &Paths) -> Result<()> {
        fs::create_dir_all(&paths.root)?;
        let content = serde_json::to_string_pretty(self).map_err(|e| {
            Error::Filesystem(io::Error::new(io::ErrorKind::InvalidData, e.to_string()))
        })?;
        fs::write(&paths.config, content)?;
        Ok(())
    }

    pub fn get_alias(&self, name: &str) -> Option<&str> {
        self.aliases.get(name).map(String::as_str)
    }

    pub fn set_alias(&mut self, name: &str, version: &str) {
        self.aliases
            .insert(name.to_string(), normalize_version(version));
    }

    pub fn remove_alias(&mut self, name: &str) -> bool {
        self.aliases.remove(name).is_some()
    }

    /// Resolve a version spec: an alias with a non-empty target wins,
    /// anything else (including an alias with an empty target) falls through
    /// to literal normalization. Callers wanting "latest stable" must ask the
    /// remote catalog explicitly.
    pub fn resolve_version(&self, input: &str) -> String {
        if let Some(target) = self.get_alias(input) {
            if !target.is_empty() {
                return target.to_string();
            }
        }
        normalize_version(input)
    }
}

pub fn is_reserved_alias(name: &str) -> bool {
    RESERVED_ALIASES.contains(&name)
}

/// Strips the `go`/`v` prefixes and surrounding whitespace. Idempotent.
pub fn normalize_version(version: &str) -> String {
    let v = version.trim();
    let v = v.strip_prefix("go").unwrap_or(v);
    let v = v.strip_prefix('v').unwrap_or(v);
    v.trim().to_string()
}

pub fn validate_alias_name(name: &str) -> Result<()> {
    let invalid = |msg: &str| {
        Error::Filesystem(io::Error::new(io::ErrorKind::InvalidInput, msg.to_string()))
    };
    if name.is_empty() {
        return Err(invalid("alias name cannot be empty"));
    }
    if name.contains(|c: char| c.is_whitespace() || c == '/' || c == '\\') {
        return Err(invalid(
            "alias name cannot contain whitespace or path separators",
        ));
    }
    Ok(())
}

/// Find every alias pointing at a version; used by `current` and `list`.
pub fn aliases_for_version<'a>(config: &'a Config, version: &str) -> Vec<&'a str> {
    config
        .aliases
        .iter()
        .filter(|(_, target)| target.as_str() == version)
        .map(|(name, _)| name.as_str())
        .collect()
}
