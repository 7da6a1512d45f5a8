use clap::{Parser, Subcommand};

fn get_version() -> &'static str {
    const BASE_VERSION: &str = env!("CARGO_PKG_VERSION");

    // If there's a git tag at HEAD, use just the tag (release build)
    if let Some(tag) = option_env!("GVM_GIT_TAG") {
        return tag;
    }

    // Not on a tag - include commit hash and branch (dev build)
    let commit = option_env!("GVM_GIT_COMMIT").unwrap_or("unknown");
    let branch = option_env!("GVM_GIT_BRANCH").unwrap_or("unknown");

    // Return a static string by leaking the formatted string
    // This is safe because it only happens once at startup
    let version = format!("v{}-{} ({})", BASE_VERSION, commit, branch);
    Box::leak(version.into_boxed_str())
}

#[derive(Parser)]
#[command(name = "gvm")]
#[command(about = "A Go toolchain version manager")]
#[command(version = get_version())]
pub struct Cli {
    /// Increase verbosity (use multiple times for more detail)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Reduce output to errors only
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Install a Go version
    #[command(
        after_help = "Examples:\n  gvm install 1.22.0\n  gvm install 1.22.0 --default\n  gvm install latest"
    )]
    Install {
        /// Version to install (e.g., '1.22.0', 'latest', 'stable')
        version: String,
        /// Set as the active version after installing
        #[arg(short, long)]
        default: bool,
    },

    /// Remove an installed Go version
    Uninstall {
        /// Version to remove (e.g., '1.22.0')
        version: String,
    },

    /// Switch to a Go version
    #[command(
        after_help = "Examples:\n  gvm use 1.22.0\n  gvm use dev\n  gvm use .      (version from go.mod/go.work)"
    )]
    Use {
        /// Version, alias, or '.' to detect from the project manifest
        version: String,
    },

    /// Run a command using a specific Go version without switching globally
    #[command(
        after_help = "Examples:\n  gvm exec 1.21.0 go version\n  gvm exec 1.22.0 go build ./...\n  gvm exec 1.20.0 go test -v"
    )]
    Exec {
        /// Version or alias to run under (must be installed)
        version: String,
        /// Command to run, with its arguments
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// List installed or available Go versions
    List {
        /// List versions available for download instead of installed ones
        #[arg(short, long)]
        remote: bool,
        /// Include unstable versions (RCs, betas) in remote listings
        #[arg(short, long)]
        all: bool,
        /// Limit the number of remote versions shown
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: usize,
    },

    /// Show the currently active Go version
    Current {
        /// Print the path to the active Go binary instead
        #[arg(short, long)]
        path: bool,
    },

    /// Create, list, or remove version aliases
    #[command(
        after_help = "Examples:\n  gvm alias                List all aliases\n  gvm alias dev 1.22.0     Point 'dev' at 1.22.0\n  gvm alias rm dev         Remove 'dev'"
    )]
    Alias {
        /// Alias name, or 'rm' to remove the alias named by VERSION
        name: Option<String>,
        /// Version the alias points to
        version: Option<String>,
    },

    /// Manage gvm's configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Detect and switch to the project's required version (shell hook)
    #[command(hide = true)]
    Auto {
        /// Directory to inspect (defaults to the working directory)
        dir: Option<String>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Get a configuration setting
    Get {
        /// Key to get (if omitted, shows all settings)
        key: Option<String>,
    },
    /// Set a configuration setting
    Set {
        /// Key (auto_install, inherit_version, default_version)
        key: String,
        /// New value
        value: String,
    },
}
