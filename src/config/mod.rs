//! Configuration layer: typed settings with layered precedence (file → env → CLI).

use std::{num::NonZeroUsize, path::PathBuf, str::FromStr};

use clap::{Args, Parser, Subcommand, ValueHint, builder::BoolishValueParser};
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "tilebridge";
const DEFAULT_MAX_RENDER_WORKERS: usize = 4;

/// Command-line arguments for the tilebridge binary.
#[derive(Debug, Parser)]
#[command(name = "tilebridge", version, about = "Asynchronous map-render job dispatch")]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(
        long = "config-file",
        env = "TILEBRIDGE_CONFIG_FILE",
        value_name = "PATH"
    )]
    pub config_file: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render a map definition into a tile file.
    Render(RenderArgs),
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// Path to the map definition (JSON).
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub map: PathBuf,

    /// Path the rendered tile bytes are written to.
    #[arg(long, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub out: PathBuf,

    #[command(flatten)]
    pub overrides: RenderOverrides,
}

#[derive(Debug, Args, Default, Clone)]
pub struct RenderOverrides {
    /// Override the blocking-pool cap for concurrent renders.
    #[arg(long = "render-workers", value_name = "COUNT")]
    pub max_render_workers: Option<usize>,

    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL")]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub dispatch: DispatchSettings,
}

#[derive(Debug, Clone)]
pub struct LoggingSettings {
    pub level: LevelFilter,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Copy)]
pub enum LogFormat {
    Json,
    Compact,
}

#[derive(Debug, Clone)]
pub struct DispatchSettings {
    /// Upper bound on blocking-pool threads, i.e. concurrently executing
    /// renders. Queued jobs past the cap wait for a free worker.
    pub max_render_workers: NonZeroUsize,
}

#[derive(Debug, Error)]
pub enum LoadError {
    #[error("failed to build configuration: {0}")]
    Build(#[from] config::ConfigError),
    #[error("invalid configuration for `{key}`: {reason}")]
    Invalid { key: &'static str, reason: String },
}

impl LoadError {
    fn invalid(key: &'static str, reason: impl Into<String>) -> Self {
        Self::Invalid {
            key,
            reason: reason.into(),
        }
    }
}

/// Load settings using the configured precedence (file → environment → CLI).
pub fn load(cli: &CliArgs) -> Result<Settings, LoadError> {
    let mut builder = Config::builder()
        .add_source(File::with_name(DEFAULT_CONFIG_BASENAME).required(false))
        .add_source(File::with_name(LOCAL_CONFIG_BASENAME).required(false));

    if let Some(path) = cli.config_file.as_ref() {
        builder = builder.add_source(File::from(path.as_path()).required(true));
    }

    builder = builder.add_source(Environment::with_prefix("TILEBRIDGE").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;

    let Command::Render(args) = &cli.command;
    raw.apply_render_overrides(&args.overrides);

    build_settings(raw)
}

/// Resolve configuration using the supplied CLI arguments, returning both
/// for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    dispatch: RawDispatchSettings,
}

impl RawSettings {
    fn apply_render_overrides(&mut self, overrides: &RenderOverrides) {
        if let Some(workers) = overrides.max_render_workers {
            self.dispatch.max_render_workers = Some(workers);
        }
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawDispatchSettings {
    max_render_workers: Option<usize>,
}

fn build_settings(raw: RawSettings) -> Result<Settings, LoadError> {
    Ok(Settings {
        logging: build_logging_settings(raw.logging)?,
        dispatch: build_dispatch_settings(raw.dispatch)?,
    })
}

fn build_logging_settings(logging: RawLoggingSettings) -> Result<LoggingSettings, LoadError> {
    let level = match logging.level {
        Some(level) => LevelFilter::from_str(level.as_str()).map_err(|err| {
            LoadError::invalid("logging.level", format!("failed to parse: {err}"))
        })?,
        None => LevelFilter::INFO,
    };

    let format = if logging.json.unwrap_or(false) {
        LogFormat::Json
    } else {
        LogFormat::Compact
    };

    Ok(LoggingSettings { level, format })
}

fn build_dispatch_settings(dispatch: RawDispatchSettings) -> Result<DispatchSettings, LoadError> {
    let workers = dispatch
        .max_render_workers
        .unwrap_or(DEFAULT_MAX_RENDER_WORKERS);
    let max_render_workers = NonZeroUsize::new(workers).ok_or_else(|| {
        LoadError::invalid("dispatch.max_render_workers", "must be greater than zero")
    })?;

    Ok(DispatchSettings { max_render_workers })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = build_settings(RawSettings::default()).expect("defaults should validate");
        assert_eq!(settings.logging.level, LevelFilter::INFO);
        assert!(matches!(settings.logging.format, LogFormat::Compact));
        assert_eq!(
            settings.dispatch.max_render_workers.get(),
            DEFAULT_MAX_RENDER_WORKERS
        );
    }

    #[test]
    fn cli_overrides_take_highest_precedence() {
        let mut raw = RawSettings::default();
        raw.logging.level = Some("info".to_string());
        raw.dispatch.max_render_workers = Some(2);

        let overrides = RenderOverrides {
            max_render_workers: Some(8),
            log_level: Some("debug".to_string()),
            log_json: Some(true),
        };
        raw.apply_render_overrides(&overrides);

        let settings = build_settings(raw).expect("overridden settings should validate");
        assert_eq!(settings.logging.level, LevelFilter::DEBUG);
        assert!(matches!(settings.logging.format, LogFormat::Json));
        assert_eq!(settings.dispatch.max_render_workers.get(), 8);
    }

    #[test]
    fn zero_workers_is_rejected() {
        let raw = RawSettings {
            dispatch: RawDispatchSettings {
                max_render_workers: Some(0),
            },
            ..Default::default()
        };
        let err = build_settings(raw).expect_err("zero workers should be rejected");
        assert!(matches!(err, LoadError::Invalid { key, .. } if key == "dispatch.max_render_workers"));
    }

    #[test]
    fn bogus_log_level_is_rejected() {
        let raw = RawSettings {
            logging: RawLoggingSettings {
                level: Some("shout".to_string()),
                json: None,
            },
            ..Default::default()
        };
        assert!(build_settings(raw).is_err());
    }
}
