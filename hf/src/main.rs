//! htmlfy - Liquid to index.html on every save
//!
//! CLI entry point for one-shot renders and watch mode.

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use clap::Parser;
use colored::*;
use eyre::{Context, Result};
use std::io::BufRead;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use htmlfy::cli::{Cli, Command, PaletteCommand};
use htmlfy::config::Config;
use htmlfy::{ConsoleNotifier, HostContext, Notification, Notifier, Pipeline, RenderError, SaveWatcher, Session};

fn parse_level(s: &str) -> Option<tracing::Level> {
    match s.to_uppercase().as_str() {
        "TRACE" => Some(tracing::Level::TRACE),
        "DEBUG" => Some(tracing::Level::DEBUG),
        "INFO" => Some(tracing::Level::INFO),
        "WARN" | "WARNING" => Some(tracing::Level::WARN),
        "ERROR" => Some(tracing::Level::ERROR),
        _ => None,
    }
}

fn setup_logging(cli_log_level: Option<&str>, config_log_level: Option<&str>) -> Result<()> {
    // Priority: CLI --log-level > config file > default (INFO)
    let level = match cli_log_level.or(config_log_level) {
        Some(s) => parse_level(s).unwrap_or_else(|| {
            eprintln!("Warning: Unknown log-level '{}', defaulting to INFO", s);
            tracing::Level::INFO
        }),
        None => tracing::Level::INFO,
    };

    let log_dir = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("htmlfy")
        .join("logs");
    fs::create_dir_all(&log_dir).context("Failed to create log directory")?;
    let log_file = fs::File::create(log_dir.join("htmlfy.log")).context("Failed to create log file")?;

    tracing_subscriber::fmt()
        .with_writer(log_file)
        .with_ansi(false)
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .init();

    info!("Logging initialized (level: {:?})", level);
    Ok(())
}

/// Workspace folders from CLI, else config, else the current directory
///
/// Folders that are not directories are dropped, which can leave none.
fn build_host(cli_workspaces: &[PathBuf], config: &Config) -> Result<HostContext> {
    let folders = if !cli_workspaces.is_empty() {
        cli_workspaces.to_vec()
    } else if let Some(ref workspace) = config.workspace {
        vec![workspace.clone()]
    } else {
        vec![std::env::current_dir().context("Failed to read current directory")?]
    };

    let folders = folders
        .into_iter()
        .filter(|folder| {
            let is_dir = folder.is_dir();
            if !is_dir {
                warn!(folder = %folder.display(), "Workspace folder is not a directory, ignoring");
            }
            is_dir
        })
        .collect();

    debug!(?folders, "build_host: resolved workspace folders");
    Ok(HostContext::new(folders, None))
}

/// Paths given on the command line are relative to the current directory when
/// they exist there, otherwise to the workspace root
fn command_line_path(file: PathBuf) -> Result<PathBuf> {
    if file.is_relative() && file.exists() {
        return Ok(std::env::current_dir()
            .context("Failed to read current directory")?
            .join(file));
    }
    Ok(file)
}

/// Read stdin lines on a plain thread so a pending read never holds up exit
fn spawn_stdin_reader() -> mpsc::UnboundedReceiver<String> {
    let (tx, rx) = mpsc::unbounded_channel();
    std::thread::spawn(move || {
        for line in std::io::stdin().lock().lines() {
            match line {
                Ok(line) => {
                    if tx.send(line).is_err() {
                        break;
                    }
                }
                Err(e) => {
                    warn!(error = %e, "Failed to read stdin, command input disabled");
                    break;
                }
            }
        }
    });
    rx
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load log level from config file early (before full config load)
    let config_log_level = Config::load_log_level(cli.config.as_ref());
    setup_logging(cli.log_level.as_deref(), config_log_level.as_deref()).context("Failed to setup logging")?;

    let config = Config::load(cli.config.as_ref()).context("Failed to load configuration")?;

    debug!(command = ?cli.command, "main: dispatching command");
    match cli.command {
        Command::Render { file } => {
            let host = build_host(&cli.workspaces, &config)?;
            cmd_render(config, host, &cli.vars, command_line_path(file)?).await
        }
        Command::Watch { idle, file } => {
            let host = build_host(&cli.workspaces, &config)?;
            let file = file.map(command_line_path).transpose()?;
            cmd_watch(config, host, &cli.vars, idle, file).await
        }
        Command::Config => cmd_config(&config),
    }
}

async fn cmd_render(config: Config, host: HostContext, vars: &[(String, String)], file: PathBuf) -> Result<()> {
    debug!(?file, "cmd_render: called");
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);
    let mut session = Session::new(Pipeline::with_vars(config, vars), host, notifier);
    session.set_active_document(&file);

    match session.run().await {
        Ok(report) => {
            debug!(?report, "cmd_render: done");
            Ok(())
        }
        Err(e) if e.is_missing_context() => Ok(()),
        Err(_) => std::process::exit(1),
    }
}

async fn cmd_watch(
    config: Config,
    host: HostContext,
    vars: &[(String, String)],
    idle: bool,
    file: Option<PathBuf>,
) -> Result<()> {
    debug!(idle, ?file, "cmd_watch: called");
    let notifier: Arc<dyn Notifier> = Arc::new(ConsoleNotifier);

    let Some(root) = host.workspace_root().map(Path::to_path_buf) else {
        notifier.notify(RenderError::NoWorkspace.notification());
        std::process::exit(1);
    };

    let watcher = SaveWatcher::new(config.watcher.clone(), &root, config.source_extension.clone());
    let mut session = Session::new(Pipeline::with_vars(config.clone(), vars), host, notifier.clone());
    if let Some(file) = file {
        session.set_active_document(file);
    }
    if !idle && config.watcher.start_armed {
        session.activate();
    }

    let mut events = watcher.start()?;
    let mut lines = spawn_stdin_reader();
    let mut stdin_open = true;

    println!(
        "{} {} {}",
        "Watching".cyan(),
        root.display(),
        "(activate, run [FILE], status, quit)".dimmed()
    );

    loop {
        tokio::select! {
            batch = events.next() => {
                let Some(paths) = batch else {
                    warn!("Filesystem watcher closed");
                    break;
                };
                for path in paths {
                    let _ = session.on_save(&path).await;
                }
            }
            line = lines.recv(), if stdin_open => {
                match line {
                    Some(line) if line.trim().is_empty() => {}
                    Some(line) => match line.parse::<PaletteCommand>() {
                        Ok(PaletteCommand::Activate) => session.activate(),
                        Ok(PaletteCommand::Run(file)) => {
                            if let Some(file) = file {
                                session.set_active_document(command_line_path(file)?);
                            }
                            let _ = session.run().await;
                        }
                        Ok(PaletteCommand::Status) => {
                            let document = session
                                .host()
                                .active_document
                                .as_ref()
                                .map(|d| d.display().to_string())
                                .unwrap_or_else(|| "none".to_string());
                            println!("{} {} (document: {})", "Session".cyan(), session.state(), document);
                        }
                        Ok(PaletteCommand::Quit) => break,
                        Err(e) => notifier.notify(Notification::warning(e)),
                    },
                    None => {
                        debug!("cmd_watch: stdin closed, watching continues");
                        stdin_open = false;
                    }
                }
            }
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, stopping watch");
                break;
            }
        }
    }

    info!("Watch ended");
    Ok(())
}

fn cmd_config(config: &Config) -> Result<()> {
    let yaml = serde_yaml::to_string(config).context("Failed to serialize configuration")?;
    print!("{}", yaml);
    Ok(())
}
