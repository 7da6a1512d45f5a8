use crate::config::{normalize_version, Config, Paths};
use crate::detect;
use crate::download::Downloader;
use crate::errors::{Error, Result};
use crate::install::Installer;
use crate::remote;
use std::path::{Path, PathBuf};

/// Orchestrates resolution, download, installation, and activation. The sole
/// entry point used by the command layer.
pub struct Manager {
    installer: Installer,
    downloader: Downloader,
    paths: Paths,
}

impl Manager {
    pub fn new() -> Result<Self> {
        Self::with_paths(Paths::discover()?)
    }

    pub fn with_paths(paths: Paths) -> Result<Self> {
        paths.ensure_dirs()?;
        Ok(Self {
            installer: Installer::new(paths.clone()),
            downloader: Downloader::new(paths.clone()),
            paths,
        })
    }

    pub fn paths(&self) -> &Paths {
        &self.paths
    }

    /// Download, verify, extract, and optionally activate a version.
    /// Idempotent: an already-installed version performs no download or
    /// extraction, at most an activation when `set_default` asks for one.
    pub async fn install(
        &self,
        version: &str,
        set_default: bool,
        show_progress: bool,
    ) -> Result<()> {
        let version = normalize_version(version);

        if self.installer.is_installed(&version) {
            tracing::info!("Go {} is already installed", version);
            if set_default {
                return self.activate(&version);
            }
            return Ok(());
        }

        // Fail fast on a catalog miss rather than attempting a download
        // that will 404
        if !remote::is_available(&version).await? {
            return Err(Error::NotFound(format!(
                "version {} is not available for download",
                version
            )));
        }

        let archive_path = self.downloader.download(&version, show_progress).await?;
        self.installer.install(&archive_path, &version)?;
        tracing::info!("Installed Go {}", version);

        // First-install convenience: with nothing active yet, activate
        if set_default || self.installer.get_current()?.is_empty() {
            return self.activate(&version);
        }
        Ok(())
    }

    pub fn uninstall(&self, version: &str) -> Result<()> {
        let version = normalize_version(version);
        self.installer.uninstall(&version)
    }

    /// Switch to a version, installing it first when the auto-install policy
    /// allows; otherwise an actionable error.
    pub async fn use_version(&self, spec: &str, config: &Config) -> Result<()> {
        self.switch(spec, config, true).await
    }

    /// Same resolution/install/activate logic as `use_version` with all
    /// progress output suppressed; meant to run on every interactive-shell
    /// directory change.
    pub async fn quiet_use(&self, spec: &str, config: &Config) -> Result<()> {
        self.switch(spec, config, false).await
    }

    async fn switch(&self, spec: &str, config: &Config, show_progress: bool) -> Result<()> {
        let version = config.resolve_version(spec);

        if !self.installer.is_installed(&version) {
            if !config.auto_install {
                return Err(Error::NotInstalled(version));
            }
            if show_progress {
                tracing::info!("Go {} not installed, installing", version);
            }
            let archive_path = self.downloader.download(&version, show_progress).await?;
            self.installer.install(&archive_path, &version)?;
        }

        self.activate(&version)
    }

    /// Detect the project's required version, complete its patch component,
    /// and delegate to `use_version`.
    pub async fn use_from_project(&self, dir: &Path, config: &Config) -> Result<(String, PathBuf)> {
        let (detected, source) = detect::detect_version(dir, config.inherit_version)?;
        let version = detect::complete_patch(&detected).await;
        self.use_version(&version, config).await?;
        Ok((version, source))
    }

    pub fn current(&self) -> Result<String> {
        self.installer.get_current()
    }

    pub fn list_installed(&self) -> Result<Vec<String>> {
        self.installer.list_installed()
    }

    pub fn is_installed(&self, version: &str) -> bool {
        self.installer.is_installed(&normalize_version(version))
    }

    pub fn go_binary(&self, version: &str) -> Result<PathBuf> {
        self.installer.go_binary(&normalize_version(version))
    }

    pub fn set_default(&self, version: &str, config: &mut Config) -> Result<()> {
        config.default_version = normalize_version(version);
        config.save(&self.paths)
    }

    fn activate(&self, version: &str) -> Result<()> {
        self.installer.set_current(version)?;
        tracing::info!("Now using Go {}", version);
        Ok(())
    }
}
