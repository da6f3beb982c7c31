//! Configuration layer: typed settings with layered precedence (file → env → CLI).

mod cli;

use std::{num::NonZeroU32, path::PathBuf, str::FromStr};

use clap::Parser;
use config::{Config, Environment, File};
use serde::Deserialize;
use thiserror::Error;
use tracing::level_filters::LevelFilter;
use url::Url;

pub use cli::{
    CliArgs, Command, ExportArgs, LoggingOverrides, NotionOverrides, OutputFormat, PostArgs,
    RenderArgs,
};

const DEFAULT_CONFIG_BASENAME: &str = "config/default";
const LOCAL_CONFIG_BASENAME: &str = "blockpress";
const DEFAULT_NOTION_API_BASE_URL: &str = "https://api.notion.com";
const DEFAULT_NOTION_VERSION: &str = "2022-06-28";
const DEFAULT_NOTION_PAGE_SIZE: u32 = 100;
const MAX_NOTION_PAGE_SIZE: u32 = 100;
const DEFAULT_OUTPUT_DIR: &str = "dist";

/// Fully-resolved settings after precedence resolution and validation.
#[derive(Debug, Clone)]
pub struct Settings {
    pub logging: LoggingSettings,
    pub notion: NotionSettings,
    pub output: OutputSettings,
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
pub struct NotionSettings {
    /// Always ends with `/` so API paths join beneath it.
    pub api_base_url: Url,
    pub token: Option<String>,
    pub database_id: Option<String>,
    pub version: String,
    pub page_size: NonZeroU32,
}

#[derive(Debug, Clone)]
pub struct OutputSettings {
    pub directory: PathBuf,
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

    builder = builder.add_source(Environment::with_prefix("BLOCKPRESS").separator("__"));

    let mut raw: RawSettings = builder.build()?.try_deserialize()?;
    raw.apply_cli_overrides(cli);

    Settings::from_raw(raw)
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawSettings {
    logging: RawLoggingSettings,
    notion: RawNotionSettings,
    output: RawOutputSettings,
}

impl RawSettings {
    fn apply_cli_overrides(&mut self, cli: &CliArgs) {
        self.apply_logging_overrides(&cli.logging);
        match &cli.command {
            Command::Render(_) => {}
            Command::Post(args) => self.apply_notion_overrides(&args.notion),
            Command::Export(args) => {
                self.apply_notion_overrides(&args.notion);
                if let Some(directory) = args.directory.as_ref() {
                    self.output.directory = Some(directory.clone());
                }
            }
        }
    }

    fn apply_logging_overrides(&mut self, overrides: &LoggingOverrides) {
        if let Some(level) = overrides.log_level.as_ref() {
            self.logging.level = Some(level.clone());
        }
        if let Some(json) = overrides.log_json {
            self.logging.json = Some(json);
        }
    }

    fn apply_notion_overrides(&mut self, overrides: &NotionOverrides) {
        if let Some(token) = overrides.token.as_ref() {
            self.notion.token = Some(token.clone());
        }
        if let Some(database_id) = overrides.database_id.as_ref() {
            self.notion.database_id = Some(database_id.clone());
        }
        if let Some(url) = overrides.api_base_url.as_ref() {
            self.notion.api_base_url = Some(url.clone());
        }
    }
}

impl Settings {
    fn from_raw(raw: RawSettings) -> Result<Self, LoadError> {
        let RawSettings {
            logging,
            notion,
            output,
        } = raw;

        Ok(Self {
            logging: build_logging_settings(logging)?,
            notion: build_notion_settings(notion)?,
            output: build_output_settings(output)?,
        })
    }
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

fn build_notion_settings(notion: RawNotionSettings) -> Result<NotionSettings, LoadError> {
    let base = notion
        .api_base_url
        .unwrap_or_else(|| DEFAULT_NOTION_API_BASE_URL.to_string());
    let api_base_url = parse_base_url(&base)
        .map_err(|reason| LoadError::invalid("notion.api_base_url", reason))?;

    let version = notion
        .version
        .unwrap_or_else(|| DEFAULT_NOTION_VERSION.to_string());
    if version.trim().is_empty() {
        return Err(LoadError::invalid("notion.version", "must not be empty"));
    }

    let page_size_value = notion.page_size.unwrap_or(DEFAULT_NOTION_PAGE_SIZE.into());
    let page_size = non_zero_u32(page_size_value, "notion.page_size")?;
    if page_size.get() > MAX_NOTION_PAGE_SIZE {
        return Err(LoadError::invalid(
            "notion.page_size",
            format!("must not exceed {MAX_NOTION_PAGE_SIZE}"),
        ));
    }

    Ok(NotionSettings {
        api_base_url,
        token: non_blank(notion.token),
        database_id: non_blank(notion.database_id),
        version,
        page_size,
    })
}

fn build_output_settings(output: RawOutputSettings) -> Result<OutputSettings, LoadError> {
    let directory = output
        .directory
        .unwrap_or_else(|| PathBuf::from(DEFAULT_OUTPUT_DIR));
    if directory.as_os_str().is_empty() {
        return Err(LoadError::invalid(
            "output.directory",
            "path must not be empty",
        ));
    }

    Ok(OutputSettings { directory })
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawLoggingSettings {
    level: Option<String>,
    json: Option<bool>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawNotionSettings {
    api_base_url: Option<String>,
    token: Option<String>,
    database_id: Option<String>,
    version: Option<String>,
    page_size: Option<u64>,
}

#[derive(Debug, Clone, Deserialize, Default)]
#[serde(default)]
struct RawOutputSettings {
    directory: Option<PathBuf>,
}

fn parse_base_url(value: &str) -> Result<Url, String> {
    let trimmed = value.trim();
    let normalized = format!("{}/", trimmed.trim_end_matches('/'));
    let url = Url::parse(&normalized).map_err(|err| format!("invalid url `{trimmed}`: {err}"))?;
    if url.cannot_be_a_base() {
        return Err(format!("`{trimmed}` cannot be used as a base url"));
    }
    Ok(url)
}

fn non_blank(value: Option<String>) -> Option<String> {
    value.and_then(|value| {
        let trimmed = value.trim();
        (!trimmed.is_empty()).then(|| trimmed.to_string())
    })
}

fn non_zero_u32(value: u64, key: &'static str) -> Result<NonZeroU32, LoadError> {
    if value == 0 {
        return Err(LoadError::invalid(key, "must be greater than zero"));
    }
    let value_u32: u32 = value
        .try_into()
        .map_err(|_| LoadError::invalid(key, "value exceeds supported range for u32"))?;
    NonZeroU32::new(value_u32).ok_or_else(|| LoadError::invalid(key, "must be greater than zero"))
}

/// Resolve configuration using the process arguments, returning both for downstream use.
pub fn load_with_cli() -> Result<(CliArgs, Settings), LoadError> {
    let args = CliArgs::parse();
    let settings = load(&args)?;
    Ok((args, settings))
}
