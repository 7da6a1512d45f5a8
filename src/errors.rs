use thiserror::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// Error taxonomy for the version lifecycle engine. Every variant is terminal
/// at the component that raises it and surfaces unchanged to the caller.
#[derive(Debug, Error)]
pub enum Error {
    /// A version is absent from the release catalog, an alias is undefined,
    /// or no project manifest was found.
    #[error("{0}")]
    NotFound(String),

    /// An operation needs the version on local disk and it is not there.
    #[error("version {0} is not installed (run 'gvm install {0}' or enable auto_install)")]
    NotInstalled(String),

    /// Archive checksum mismatch. Never silently accepted.
    #[error("checksum mismatch: expected {expected}, got {actual}")]
    Integrity { expected: String, actual: String },

    /// An archive entry would resolve outside the extraction root.
    #[error("archive entry escapes extraction root: {entry}")]
    PathSecurity { entry: String },

    /// Catalog or download failure. No automatic retry.
    #[error("network request failed: {0}")]
    Network(#[from] reqwest::Error),

    /// Symlink, directory, or file operation failure.
    #[error(transparent)]
    Filesystem(#[from] std::io::Error),
}
