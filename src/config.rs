// src/config.rs
use crate::format::Truncation;
use crate::theme::{Theme, ThemePreset};
use anyhow::{Context, Result, bail};
use clap::Parser;
use log::LevelFilter;
use std::path::{Path, PathBuf};
use url::Url;

/// Browse the podcasts and episodes served by a gPodder web endpoint.
#[derive(Parser, Debug)]
#[command(name = "podview", version, about)]
pub struct Cli {
    /// Base URL of the server providing /json/podcasts.json
    #[arg(short, long, default_value = "http://localhost:8086/")]
    pub server: String,

    /// Cut titles and descriptions longer than this many columns
    #[arg(long, value_name = "COLUMNS")]
    pub truncate: Option<usize>,

    /// Built-in theme to start from
    #[arg(long, value_enum, default_value_t = ThemePreset::Desktop)]
    pub theme_preset: ThemePreset,

    /// JSON file overriding theme values
    #[arg(long, value_name = "FILE")]
    pub theme: Option<PathBuf>,

    /// Log file used while the terminal UI is running
    #[arg(long, default_value = "podview.log")]
    pub log_file: PathBuf,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "info", value_parser = parse_level)]
    pub log_level: LevelFilter,

    /// Print the podcast list to stdout instead of starting the UI
    #[arg(long)]
    pub dump: bool,

    /// With --dump, also print the episodes of every podcast
    #[arg(long, requires = "dump")]
    pub episodes: bool,
}

#[derive(Debug, Clone)]
pub struct Settings {
    pub server: Url,
    pub truncation: Truncation,
    pub theme: Theme,
}

impl Settings {
    pub fn from_cli(cli: &Cli) -> Result<Self> {
        let server = parse_server_url(&cli.server)?;

        let truncation = match cli.truncate {
            Some(0) => bail!("--truncate must be greater than zero"),
            Some(columns) => Truncation::Limit(columns),
            None => Truncation::Off,
        };

        let mut theme = Theme::from_preset(cli.theme_preset);
        if let Some(path) = &cli.theme {
            theme = theme
                .with_overrides_from_file(path)
                .with_context(|| format!("loading theme {}", path.display()))?;
        }

        Ok(Self { server, truncation, theme })
    }
}

/// Parses the server URL, making sure relative endpoint paths resolve under it.
pub fn parse_server_url(raw: &str) -> Result<Url> {
    let mut url = Url::parse(raw).with_context(|| format!("invalid server URL '{}'", raw))?;
    if url.scheme() != "http" && url.scheme() != "https" {
        bail!("unsupported server URL scheme '{}', expected http or https", url.scheme());
    }
    if !url.path().ends_with('/') {
        let path = format!("{}/", url.path());
        url.set_path(&path);
    }
    Ok(url)
}

fn parse_level(raw: &str) -> Result<LevelFilter, String> {
    raw.parse().map_err(|_| format!("unknown log level '{}'", raw))
}

/// Routes log records to a file; the terminal belongs to the UI.
pub fn init_file_logging(path: &Path, level: LevelFilter) -> Result<()> {
    fern::Dispatch::new()
        .format(|out, message, record| {
            out.finish(format_args!(
                "{} [{}] {}: {}",
                chrono::Local::now().format("%Y-%m-%d %H:%M:%S%.3f"),
                record.level(),
                record.target(),
                message
            ))
        })
        .level(level)
        .level_for("hyper", LevelFilter::Warn)
        .level_for("reqwest", LevelFilter::Warn)
        .chain(fern::log_file(path).with_context(|| format!("opening log file {}", path.display()))?)
        .apply()
        .context("installing logger")?;
    Ok(())
}

/// Logs to stderr, honouring RUST_LOG on top of `level`.
pub fn init_stderr_logging(level: LevelFilter) {
    env_logger::Builder::new().filter_level(level).parse_default_env().init();
}
