use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum, ValueHint, builder::BoolishValueParser};

/// Command-line arguments for the blockpress binary.
#[derive(Debug, Parser)]
#[command(
    name = "blockpress",
    version,
    about = "Render Notion-authored blog posts to HTML"
)]
pub struct CliArgs {
    /// Optional path to a configuration file.
    #[arg(long = "config-file", env = "BLOCKPRESS_CONFIG_FILE", value_name = "PATH")]
    pub config_file: Option<PathBuf>,

    #[command(flatten)]
    pub logging: LoggingOverrides,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand, Clone)]
pub enum Command {
    /// Render a local dump of Notion block objects.
    Render(RenderArgs),
    /// Fetch one published post from Notion and write its page.
    Post(PostArgs),
    /// Write an index and a page for every published post.
    Export(ExportArgs),
}

#[derive(Debug, Args, Default, Clone)]
pub struct LoggingOverrides {
    /// Override the base log level (trace|debug|info|warn|error).
    #[arg(long = "log-level", value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Toggle JSON logging.
    #[arg(
        long = "log-json",
        value_name = "BOOL",
        global = true,
        value_parser = BoolishValueParser::new()
    )]
    pub log_json: Option<bool>,
}

#[derive(Debug, Args, Default, Clone)]
pub struct NotionOverrides {
    /// Override the Notion integration token.
    #[arg(long = "notion-token", env = "NOTION_API_KEY", value_name = "TOKEN")]
    pub token: Option<String>,

    /// Override the Notion database holding the posts.
    #[arg(long = "notion-database-id", env = "NOTION_DATABASE_ID", value_name = "ID")]
    pub database_id: Option<String>,

    /// Override the Notion API base URL.
    #[arg(long = "notion-api-base-url", value_name = "URL")]
    pub api_base_url: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Sanitised HTML fragment.
    #[default]
    Html,
    /// Keyed presentation nodes and content metrics as JSON.
    Json,
}

#[derive(Debug, Args, Clone)]
pub struct RenderArgs {
    /// JSON file holding a block array or a Notion list response.
    #[arg(value_name = "FILE", value_hint = ValueHint::FilePath)]
    pub file: PathBuf,

    /// Write output to a file instead of stdout.
    #[arg(long, short, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,

    /// Output representation.
    #[arg(long, value_enum, default_value_t = OutputFormat::Html)]
    pub format: OutputFormat,
}

#[derive(Debug, Args, Clone)]
pub struct PostArgs {
    #[command(flatten)]
    pub notion: NotionOverrides,

    /// Slug of the post to fetch.
    #[arg(value_name = "SLUG")]
    pub slug: String,

    /// Write the page to a file instead of stdout.
    #[arg(long, short, value_name = "PATH", value_hint = ValueHint::FilePath)]
    pub output: Option<PathBuf>,
}

#[derive(Debug, Args, Clone)]
pub struct ExportArgs {
    #[command(flatten)]
    pub notion: NotionOverrides,

    /// Output directory; defaults to `output.directory`.
    #[arg(value_name = "DIR", value_hint = ValueHint::DirPath)]
    pub directory: Option<PathBuf>,
}
