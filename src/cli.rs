use std::env;
use std::path::PathBuf;

use crate::config::ServerConfig;

pub struct CliOptions {
    pub config: Option<PathBuf>,
    pub port: Option<u16>,
    pub dry_run: bool,
}

impl CliOptions {
    /// Applies command-line overrides on top of a loaded config.
    pub fn apply(&self, config: &mut ServerConfig) {
        if let Some(port) = self.port {
            config.port = port;
        }
        if self.dry_run {
            config.dry_run = true;
        }
    }
}

pub fn parse_args() -> Result<CliOptions, String> {
    let args: Vec<String> = env::args().skip(1).collect();
    parse_args_from(&args)
}

fn parse_args_from(args: &[String]) -> Result<CliOptions, String> {
    let mut i = 0usize;
    let mut config = None;
    let mut port = None;
    let mut dry_run = false;

    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
                let path = args.next_or_err(
                    i,
                    "missing value for --config (expected a TOML file path)",
                )?;
                if config.replace(PathBuf::from(path)).is_some() {
                    return Err("--config provided more than once".to_string());
                }
            }
            "--port" => {
                i += 1;
                let value = args.next_or_err(i, "missing value for --port (expected a u16)")?;
                let parsed = value
                    .parse::<u16>()
                    .map_err(|_| format!("--port value \"{value}\" is not a valid u16"))?;
                if port.replace(parsed).is_some() {
                    return Err("--port provided more than once".to_string());
                }
            }
            "--dry-run" => dry_run = true,
            "--help" | "-h" => {
                print_usage();
                std::process::exit(0);
            }
            other => return Err(format!("unknown argument: {other}")),
        }
        i += 1;
    }

    Ok(CliOptions {
        config,
        port,
        dry_run,
    })
}

trait SliceArgExt {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String>;
}

impl SliceArgExt for [String] {
    fn next_or_err(&self, index: usize, err: &str) -> Result<&str, String> {
        self.get(index)
            .map(String::as_str)
            .ok_or_else(|| err.to_string())
    }
}

pub fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  powerswitch [--config <path>] [--port <u16>] [--dry-run]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config <path>   Load server settings from a TOML file");
    eprintln!("  --port <u16>      Override the HTTP port (default: 8080)");
    eprintln!("  --dry-run         Simulate the relays in memory instead of driving GPIO");
    eprintln!("  --help            Show this help message");
}
