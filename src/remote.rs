use crate::config::normalize_version;
use crate::errors::{Error, Result};
use crate::platform::get_system_info;
use serde::{Deserialize, Serialize};
use std::time::Duration;

const CATALOG_URL: &str = "https://go.dev/dl/?mode=json&include=all";
const DOWNLOAD_BASE_URL: &str = "https://go.dev/dl/";

/// Metadata responses are small; keep the timeout short so shell hooks never
/// hang on a dead network.
const CATALOG_TIMEOUT: Duration = Duration::from_secs(30);

/// One publishable Go version as listed by the release catalog.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct RemoteVersion {
    pub version: String,
    pub stable: bool,
    #[serde(default)]
    pub files: Vec<VersionFile>,
}

/// A downloadable file for one (version, os, arch) combination.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct VersionFile {
    pub filename: String,
    pub os: String,
    pub arch: String,
    #[serde(default)]
    pub version: String,
    pub sha256: String,
    #[serde(default)]
    pub size: u64,
    /// "archive", "installer", or "source"
    pub kind: String,
}

pub async fn fetch_catalog() -> Result<Vec<RemoteVersion>> {
    let client = reqwest::Client::builder()
        .timeout(CATALOG_TIMEOUT)
        .build()?;

    tracing::debug!("Fetching release catalog from {}", CATALOG_URL);
    let response = client.get(CATALOG_URL).send().await?.error_for_status()?;
    let catalog: Vec<RemoteVersion> = response.json().await?;
    Ok(catalog)
}

/// Newest stable version string, normalized.
pub async fn latest_stable() -> Result<String> {
    let catalog = fetch_catalog().await?;
    stable_versions(&catalog)
        .into_iter()
        .next()
        .ok_or_else(|| Error::NotFound("no stable version found in catalog".to_string()))
}

pub async fn version_info(version: &str) -> Result<RemoteVersion> {
    let catalog = fetch_catalog().await?;
    find_version(&catalog, version)
        .cloned()
        .ok_or_else(|| Error::NotFound(format!("version {} not found in catalog", version)))
}

/// The download URL and declared SHA-256 for a version's archive on the
/// caller's OS/architecture.
pub async fn download_descriptor(version: &str) -> Result<(String, String)> {
    let info = version_info(version).await?;
    let platform = get_system_info();

    info.files
        .iter()
        .find(|f| f.os == platform.os && f.arch == platform.arch && f.kind == "archive")
        .map(|f| (format!("{}{}", DOWNLOAD_BASE_URL, f.filename), f.sha256.clone()))
        .ok_or_else(|| {
            Error::NotFound(format!(
                "no archive for {} on {}/{}",
                version, platform.os, platform.arch
            ))
        })
}

/// Checks catalog presence; network failures propagate rather than reading
/// as "not available".
pub async fn is_available(version: &str) -> Result<bool> {
    match version_info(version).await {
        Ok(_) => Ok(true),
        Err(Error::NotFound(_)) => Ok(false),
        Err(e) => Err(e),
    }
}

pub async fn list_stable() -> Result<Vec<String>> {
    let catalog = fetch_catalog().await?;
    Ok(stable_versions(&catalog))
}

pub async fn list_all() -> Result<Vec<String>> {
    let catalog = fetch_catalog().await?;
    Ok(all_versions(&catalog))
}

pub fn stable_versions(catalog: &[RemoteVersion]) -> Vec<String> {
    let mut versions: Vec<String> = catalog
        .iter()
        .filter(|v| v.stable)
        .map(|v| normalize_version(&v.version))
        .collect();
    sort_versions_desc(&mut versions);
    versions
}

pub fn all_versions(catalog: &[RemoteVersion]) -> Vec<String> {
    let mut versions: Vec<String> = catalog
        .iter()
        .map(|v| normalize_version(&v.version))
        .collect();
    sort_versions_desc(&mut versions);
    versions
}

pub fn find_version<'a>(catalog: &'a [RemoteVersion], version: &str) -> Option<&'a RemoteVersion> {
    let version = normalize_version(version);
    catalog
        .iter()
        .find(|v| normalize_version(&v.version) == version)
}

/// Newest first by semantic version; entries that fail to parse sort after
/// all parsed versions, lexicographically, rather than poisoning the sort.
pub fn sort_versions_desc(versions: &mut [String]) {
    use std::cmp::Ordering;
    versions.sort_by(|a, b| match (parse_semver(a), parse_semver(b)) {
        (Some(va), Some(vb)) => vb.cmp(&va),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => b.cmp(a),
    });
}

/// Accepts two-component versions like "1.21" by padding the patch.
pub fn parse_semver(version: &str) -> Option<semver::Version> {
    if let Ok(v) = semver::Version::parse(version) {
        return Some(v);
    }
    let dots = version.split('.').count();
    if dots == 2 && !version.contains('-') && !version.contains('+') {
        return semver::Version::parse(&format!("{}.0", version)).ok();
    }
    None
}
