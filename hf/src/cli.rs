//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::str::FromStr;
use tracing::debug;

/// htmlfy - Liquid to index.html on every save
#[derive(Parser, Debug)]
#[command(
    name = "hf",
    author,
    version,
    about = "Render Liquid templates to a formatted index.html on every save"
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Workspace folders; the first one is the workspace root
    #[arg(short, long = "workspace", global = true, value_name = "DIR")]
    pub workspaces: Vec<PathBuf>,

    /// Template variable, overrides config globals
    #[arg(long = "var", global = true, value_name = "KEY=VALUE", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Render one template to index.html
    Render {
        /// Template to render, relative to the workspace root or absolute
        file: PathBuf,
    },

    /// Watch the workspace and render on every template save
    Watch {
        /// Start idle; saves are ignored until `activate`
        #[arg(long)]
        idle: bool,

        /// Initial active document for the `run` command
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Print the effective configuration
    Config,
}

/// Parse `KEY=VALUE`
pub fn parse_var(s: &str) -> Result<(String, String), String> {
    debug!(%s, "parse_var: called");
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => Ok((key.trim().to_string(), value.to_string())),
        _ => Err(format!("expected KEY=VALUE, got '{}'", s)),
    }
}

/// Commands typed on stdin while watching
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PaletteCommand {
    /// Arm save-triggered rendering
    Activate,
    /// Render now, optionally switching the active document
    Run(Option<PathBuf>),
    /// Print the session state
    Status,
    /// Stop watching
    Quit,
}

impl FromStr for PaletteCommand {
    type Err = String;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let mut words = line.split_whitespace();
        let command = words.next().unwrap_or_default();
        let argument = words.next().map(PathBuf::from);
        match command {
            "activate" => Ok(Self::Activate),
            "run" => Ok(Self::Run(argument)),
            "status" => Ok(Self::Status),
            "quit" | "exit" => Ok(Self::Quit),
            "" => Err("empty command".to_string()),
            other => Err(format!("unknown command '{}' (activate, run [FILE], status, quit)", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_render() {
        let cli = Cli::parse_from(["hf", "-w", "/proj", "--var", "name=World", "render", "index.liquid"]);
        assert_eq!(cli.workspaces, vec![PathBuf::from("/proj")]);
        assert_eq!(cli.vars, vec![("name".to_string(), "World".to_string())]);
        assert!(matches!(cli.command, Command::Render { ref file } if file == &PathBuf::from("index.liquid")));
    }

    #[test]
    fn test_parse_watch_idle() {
        let cli = Cli::parse_from(["hf", "watch", "--idle"]);
        assert!(matches!(cli.command, Command::Watch { idle: true, file: None }));
    }

    #[test]
    fn test_parse_var() {
        assert_eq!(parse_var("a=b=c"), Ok(("a".to_string(), "b=c".to_string())));
        assert_eq!(parse_var("empty="), Ok(("empty".to_string(), String::new())));
        assert!(parse_var("novalue").is_err());
        assert!(parse_var("=x").is_err());
    }

    #[test]
    fn test_palette_commands() {
        assert_eq!("activate".parse::<PaletteCommand>(), Ok(PaletteCommand::Activate));
        assert_eq!("  run  ".parse::<PaletteCommand>(), Ok(PaletteCommand::Run(None)));
        assert_eq!(
            "run pages/about.liquid".parse::<PaletteCommand>(),
            Ok(PaletteCommand::Run(Some(PathBuf::from("pages/about.liquid"))))
        );
        assert_eq!("status".parse::<PaletteCommand>(), Ok(PaletteCommand::Status));
        assert_eq!("exit".parse::<PaletteCommand>(), Ok(PaletteCommand::Quit));
        assert!("".parse::<PaletteCommand>().is_err());
        assert!("launch".parse::<PaletteCommand>().is_err());
    }
}
