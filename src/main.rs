mod cli;
mod config;
mod detect;
mod download;
mod errors;
mod install;
mod manager;
mod platform;
mod remote;

use anyhow::Result;
use clap::Parser;
use cli::{Cli, Commands, ConfigAction};
use config::{
    aliases_for_version, is_reserved_alias, normalize_version, validate_alias_name, Config,
};
use manager::Manager;
use std::env;
use std::path::PathBuf;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    setup_logging(&cli)?;

    let manager = Manager::new()?;
    let mut config = Config::load(manager.paths())?;

    match cli.command {
        Commands::Install { version, default } => {
            let version = resolve_reserved(&version, &config).await?;
            let version = config.resolve_version(&version);
            let already = manager.is_installed(&version);
            manager.install(&version, default, !cli.quiet).await?;
            if already {
                println!("Go {} is already installed", version);
            } else {
                println!("Installed Go {}", version);
            }
            if manager.current()? == version {
                println!("Now using Go {}", version);
            }
        }

        Commands::Uninstall { version } => {
            let version = normalize_version(&version);
            if manager.current()? == version {
                eprintln!("Removing the active version; switch to another with 'gvm use'");
            }
            manager.uninstall(&version)?;
            println!("Uninstalled Go {}", version);

            let dangling = aliases_for_version(&config, &version);
            if !dangling.is_empty() {
                eprintln!("Note: aliases still point at {}: {}", version, dangling.join(", "));
            }
        }

        Commands::Use { version } => {
            if version == "." {
                let cwd = env::current_dir()?;
                let (used, source) = manager.use_from_project(&cwd, &config).await?;
                println!("Now using Go {} (from {})", used, source.display());
            } else {
                let spec = resolve_reserved(&version, &config).await?;
                manager.use_version(&spec, &config).await?;
                println!("Now using Go {}", config.resolve_version(&spec));
            }
        }

        Commands::Exec { version, command } => {
            let version = config.resolve_version(&version);
            if !manager.is_installed(&version) {
                return Err(errors::Error::NotInstalled(version).into());
            }
            let status = exec_with_version(&manager, &version, &command)?;
            std::process::exit(status.code().unwrap_or(1));
        }

        Commands::List { remote, all, limit } => {
            if remote {
                list_remote_versions(all, limit).await?;
            } else {
                list_installed_versions(&manager, &config)?;
            }
        }

        Commands::Current { path } => {
            let current = manager.current()?;
            if current.is_empty() {
                eprintln!("No Go version is currently active");
                eprintln!("Run 'gvm use <version>' to activate one");
                return Ok(());
            }

            if path {
                println!("{}", manager.go_binary(&current)?.display());
                return Ok(());
            }

            println!("Current: {}", current);
            if !config.default_version.is_empty() && config.default_version != current {
                println!("Default: {}", config.default_version);
            }
            let aliases = aliases_for_version(&config, &current);
            if !aliases.is_empty() {
                println!("Aliases: {}", aliases.join(", "));
            }
        }

        Commands::Alias { name, version } => {
            handle_alias(&manager, &mut config, name, version)?;
        }

        Commands::Config { action } => match action {
            ConfigAction::Get { key } => {
                if let Some(key) = key {
                    match key.as_str() {
                        "auto_install" => println!("{}", config.auto_install),
                        "inherit_version" => println!("{}", config.inherit_version),
                        "default_version" => println!("{}", config.default_version),
                        other => anyhow::bail!(
                            "unknown setting '{}'. Valid settings: auto_install, inherit_version, default_version",
                            other
                        ),
                    }
                } else {
                    println!("auto_install: {}", config.auto_install);
                    println!("inherit_version: {}", config.inherit_version);
                    println!("default_version: {}", config.default_version);
                }
            }
            ConfigAction::Set { key, value } => {
                match key.as_str() {
                    "auto_install" => {
                        config.auto_install = parse_bool(&value)?;
                        config.save(manager.paths())?;
                    }
                    "inherit_version" => {
                        config.inherit_version = parse_bool(&value)?;
                        config.save(manager.paths())?;
                    }
                    "default_version" => manager.set_default(&value, &mut config)?,
                    other => anyhow::bail!(
                        "unknown setting '{}'. Valid settings: auto_install, inherit_version, default_version",
                        other
                    ),
                }
                println!("Set {} = {}", key, value);
            }
        },

        Commands::Auto { dir } => {
            auto_switch(&manager, &config, dir).await;
        }
    }

    Ok(())
}

/// Reserved tokens with no user-assigned target mean "newest stable"; the
/// lookup against the remote catalog happens here, explicitly, never inside
/// alias resolution.
async fn resolve_reserved(spec: &str, config: &Config) -> Result<String> {
    let has_target = config.get_alias(spec).is_some_and(|t| !t.is_empty());
    if is_reserved_alias(spec) && !has_target {
        let latest = remote::latest_stable().await?;
        tracing::info!("Latest stable version: {}", latest);
        return Ok(latest);
    }
    Ok(spec.to_string())
}

/// Run a command with GOROOT and PATH pointing at one installed version,
/// leaving the global pointer alone. The caller propagates the child's exit
/// status.
fn exec_with_version(
    manager: &Manager,
    version: &str,
    command: &[String],
) -> Result<std::process::ExitStatus> {
    let (name, args) = command
        .split_first()
        .ok_or_else(|| anyhow::anyhow!("no command given"))?;

    let goroot = manager.paths().toolchain_dir(version);
    let bin_dir = goroot.join("bin");

    // 'go' always means this version's binary; other commands prefer the
    // version's bin directory when they exist there.
    let program = if name == "go" {
        manager.go_binary(version)?
    } else {
        let candidate = bin_dir.join(name);
        if candidate.is_file() {
            candidate
        } else {
            PathBuf::from(name)
        }
    };

    let path = match env::var_os("PATH") {
        Some(existing) => {
            env::join_paths(std::iter::once(bin_dir.clone()).chain(env::split_paths(&existing)))?
        }
        None => bin_dir.into_os_string(),
    };

    let status = std::process::Command::new(&program)
        .args(args)
        .env("GOROOT", &goroot)
        .env("PATH", path)
        .status()?;
    Ok(status)
}

fn handle_alias(
    manager: &Manager,
    config: &mut Config,
    name: Option<String>,
    version: Option<String>,
) -> Result<()> {
    match (name, version) {
        (None, _) => {
            if config.aliases.is_empty() {
                println!("No aliases defined");
                println!("Create one with: gvm alias <name> <version>");
                return Ok(());
            }
            for (name, target) in &config.aliases {
                let shown = if target.is_empty() { "(not set)" } else { target };
                let marker = if is_reserved_alias(name) { " [builtin]" } else { "" };
                println!("{}{} -> {}", name, marker, shown);
            }
        }
        (Some(name), None) => match config.get_alias(&name) {
            Some("") => println!("Alias '{}' is not set", name),
            Some(target) => println!("{} -> {}", name, target),
            None => anyhow::bail!("alias '{}' not found", name),
        },
        (Some(op), Some(name)) if op == "rm" || op == "remove" => {
            if !config.remove_alias(&name) {
                anyhow::bail!("alias '{}' not found", name);
            }
            config.save(manager.paths())?;
            println!("Removed alias '{}'", name);
        }
        (Some(name), Some(version)) => {
            validate_alias_name(&name)?;
            config.set_alias(&name, &version);
            config.save(manager.paths())?;
            println!("{} -> {}", name, config.get_alias(&name).unwrap_or(""));
        }
    }
    Ok(())
}

fn list_installed_versions(manager: &Manager, config: &Config) -> Result<()> {
    let installed = manager.list_installed()?;
    if installed.is_empty() {
        println!("No Go versions installed");
        println!("Run 'gvm install <version>' to install one");
        return Ok(());
    }

    let current = manager.current()?;
    for version in installed {
        let marker = if version == current { "* " } else { "  " };
        let mut suffix = String::new();
        if version == current {
            suffix.push_str(" (current)");
        }
        if version == config.default_version {
            suffix.push_str(" (default)");
        }
        println!("{}{}{}", marker, version, suffix);
    }
    Ok(())
}

async fn list_remote_versions(all: bool, limit: usize) -> Result<()> {
    let versions = if all {
        remote::list_all().await?
    } else {
        remote::list_stable().await?
    };

    for version in versions.iter().take(limit) {
        println!("{}", version);
    }
    if versions.len() > limit {
        eprintln!("... and {} more (use -n to show more)", versions.len() - limit);
    }
    Ok(())
}

/// Shell-hook entry point. Quiet by design: no manifest is a silent no-op,
/// and failures must never break the user's shell, so they are logged and
/// swallowed. The next directory change retries.
async fn auto_switch(manager: &Manager, config: &Config, dir: Option<String>) {
    let dir = dir
        .map(PathBuf::from)
        .or_else(|| env::current_dir().ok())
        .unwrap_or_default();

    let (detected, source) = match detect::detect_version(&dir, config.inherit_version) {
        Ok(found) => found,
        Err(_) => return,
    };

    let version = detect::complete_patch(&detected).await;
    match manager.current() {
        Ok(current) if current == version => return,
        _ => {}
    }

    match manager.quiet_use(&version, config).await {
        Ok(()) => tracing::debug!(
            "Switched to Go {} (from {})",
            version,
            source.display()
        ),
        Err(e) => tracing::warn!("Could not switch to Go {}: {}", version, e),
    }
}

fn parse_bool(value: &str) -> Result<bool> {
    match value.to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Ok(true),
        "false" | "0" | "no" | "off" => Ok(false),
        other => anyhow::bail!("invalid boolean value '{}'", other),
    }
}

fn setup_logging(cli: &Cli) -> Result<()> {
    use tracing_subscriber::{fmt, EnvFilter};

    let level = if cli.quiet {
        "error"
    } else if cli.verbose == 0 {
        "warn"
    } else if cli.verbose == 1 {
        "info"
    } else {
        "debug"
    };

    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));

    fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .init();

    Ok(())
}
