use crate::config::Paths;
use crate::errors::{Error, Result};
use crate::remote::sort_versions_desc;
use flate2::read::GzDecoder;
use std::fs;
use std::io;
use std::path::{Component, Path, PathBuf};
use tar::EntryType;

/// Installs, activates, and removes toolchain versions on disk. One
/// directory per version; a single `current` symlink selects the active one.
pub struct Installer {
    paths: Paths,
}

impl Installer {
    pub fn new(paths: Paths) -> Self {
        Self { paths }
    }

    /// Extract an archive into the version directory. Always a fresh
    /// install: any pre-existing directory for the version is removed first,
    /// never patched in place.
    pub fn install(&self, archive_path: &Path, version: &str) -> Result<()> {
        let version_dir = self.paths.version_dir(version);

        if version_dir.exists() {
            fs::remove_dir_all(&version_dir)?;
        }
        fs::create_dir_all(&version_dir)?;

        if let Err(e) = extract_tar_gz(archive_path, &version_dir) {
            // Leave no partially-written version behind
            let _ = fs::remove_dir_all(&version_dir);
            return Err(e);
        }

        Ok(())
    }

    /// Remove an installed version. If it is the active one, the current
    /// pointer is deleted first so no dangling link remains. Aliases are
    /// never touched; a dangling alias is surfaced to the user elsewhere.
    pub fn uninstall(&self, version: &str) -> Result<()> {
        let version_dir = self.paths.version_dir(version);
        if !version_dir.exists() {
            return Err(Error::NotInstalled(version.to_string()));
        }

        if self.get_current()? == version {
            remove_if_exists(&self.paths.current)?;
        }

        fs::remove_dir_all(&version_dir)?;
        Ok(())
    }

    /// Atomically flip the current pointer to `version`'s toolchain
    /// directory. The toolchain entrypoint must exist.
    pub fn set_current(&self, version: &str) -> Result<()> {
        if !self.is_installed(version) {
            return Err(Error::NotInstalled(version.to_string()));
        }

        let target = self.paths.toolchain_dir(version);
        remove_if_exists(&self.paths.current)?;
        symlink_dir(&target, &self.paths.current)?;
        Ok(())
    }

    /// The active version, derived from the parent directory name of the
    /// current pointer's target. Empty string when no pointer exists.
    pub fn get_current(&self) -> Result<String> {
        let target = match fs::read_link(&self.paths.current) {
            Ok(target) => target,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(String::new()),
            Err(e) => return Err(e.into()),
        };

        // target looks like <root>/versions/<version>/go
        let version = target
            .parent()
            .and_then(|p| p.file_name())
            .map(|n| n.to_string_lossy().to_string())
            .unwrap_or_default();
        Ok(version)
    }

    /// Version directories whose toolchain entrypoint exists, newest first.
    pub fn list_installed(&self) -> Result<Vec<String>> {
        let entries = match fs::read_dir(&self.paths.versions) {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut versions = Vec::new();
        for entry in entries {
            let entry = entry?;
            if !entry.path().is_dir() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().to_string();
            if self.is_installed(&name) {
                versions.push(name);
            }
        }

        sort_versions_desc(&mut versions);
        Ok(versions)
    }

    /// Presence of the entrypoint binary is the sole correctness test.
    pub fn is_installed(&self, version: &str) -> bool {
        self.paths.go_binary(version).exists()
    }

    pub fn go_binary(&self, version: &str) -> Result<PathBuf> {
        let path = self.paths.go_binary(version);
        if !path.exists() {
            return Err(Error::NotInstalled(version.to_string()));
        }
        Ok(path)
    }
}

fn remove_if_exists(path: &Path) -> Result<()> {
    match fs::remove_file(path) {
        Ok(()) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(e.into()),
    }
}

#[cfg(unix)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::unix::fs::symlink(target, link)
}

#[cfg(windows)]
fn symlink_dir(target: &Path, link: &Path) -> io::Result<()> {
    std::os::windows::fs::symlink_dir(target, link)
}

/// Extract a tar.gz archive, refusing any entry whose resolved destination
/// would land outside `dest`. Handles regular files, directories, and
/// symbolic links; anything else is skipped.
fn extract_tar_gz(archive_path: &Path, dest: &Path) -> Result<()> {
    let file = fs::File::open(archive_path)?;
    let mut archive = tar::Archive::new(GzDecoder::new(file));

    for entry in archive.entries()? {
        let mut entry = entry?;
        let rel_path = entry.path()?.into_owned();
        let target = safe_join(dest, &rel_path)?;

        match entry.header().entry_type() {
            EntryType::Directory => {
                fs::create_dir_all(&target)?;
            }
            EntryType::Regular => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                let mut out = fs::File::create(&target)?;
                io::copy(&mut entry, &mut out)?;

                #[cfg(unix)]
                if let Ok(mode) = entry.header().mode() {
                    use std::os::unix::fs::PermissionsExt;
                    fs::set_permissions(&target, fs::Permissions::from_mode(mode))?;
                }
            }
            EntryType::Symlink => {
                if let Some(parent) = target.parent() {
                    fs::create_dir_all(parent)?;
                }
                let link_name = entry.link_name()?.ok_or_else(|| {
                    Error::Filesystem(io::Error::new(
                        io::ErrorKind::InvalidData,
                        format!("symlink entry without target: {}", rel_path.display()),
                    ))
                })?;
                #[cfg(unix)]
                std::os::unix::fs::symlink(&link_name, &target)?;
                #[cfg(windows)]
                std::os::windows::fs::symlink_file(&link_name, &target)?;
            }
            other => {
                tracing::debug!("Skipping unsupported tar entry type {:?}", other);
            }
        }
    }

    Ok(())
}

/// Join a relative archive path onto the extraction root, rejecting parent
/// segments, absolute paths, and drive prefixes.
fn safe_join(root: &Path, rel: &Path) -> Result<PathBuf> {
    let mut out = root.to_path_buf();
    for component in rel.components() {
        match component {
            Component::Normal(part) => out.push(part),
            Component::CurDir => {}
            _ => {
                return Err(Error::PathSecurity {
                    entry: rel.display().to_string(),
                })
            }
        }
    }
    Ok(out)
}
