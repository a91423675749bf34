use std::path::PathBuf;
use std::str::FromStr;

use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use review_core::EditMode;
use review_engine::{Provider, TaskStatus};

use super::persistence::DEFAULT_CONFIG_PATH;
use super::ui::constants::DEFAULT_ROWS;

#[derive(Parser, Debug)]
#[command(name = "review_app", about = "Submit edit tasks and review the results", version)]
pub struct Cli {
    /// API root of the editing service (can also be set via REVIEW_SERVER_URL)
    #[arg(short, long, env = "REVIEW_SERVER_URL")]
    pub server: Option<String>,

    /// Settings file holding provider keys
    #[arg(long, default_value = DEFAULT_CONFIG_PATH)]
    pub config: PathBuf,

    /// Debug logging, mirrored to the terminal
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Edit a section or a text file and review the proposed changes
    Edit(EditArgs),
    /// List the section headings of an article
    Headings { article: String },
    /// Browse past edit tasks
    Tasks(TasksArgs),
    /// Show one past task
    Task { id: String },
    /// Manage provider API keys
    Key {
        #[command(subcommand)]
        action: KeyAction,
    },
}

#[derive(clap::Args, Debug)]
pub struct EditArgs {
    /// brevity or copyedit
    pub mode: EditMode,

    #[arg(long, requires = "section", conflicts_with = "content_file")]
    pub article: Option<String>,

    #[arg(long, requires = "article")]
    pub section: Option<String>,

    /// Edit the contents of this file instead of an article section
    #[arg(long)]
    pub content_file: Option<PathBuf>,

    /// Which edits to keep: all, none, or comma-separated paragraph indices
    #[arg(long, default_value = "none")]
    pub accept: AcceptPolicy,

    /// Write the assembled text into this directory
    #[arg(long)]
    pub output: Option<PathBuf>,

    /// Copy the assembled text to the clipboard (OSC 52)
    #[arg(long)]
    pub copy: bool,

    /// Rows per printed window of the review list
    #[arg(long, default_value_t = DEFAULT_ROWS)]
    pub rows: u32,
}

#[derive(clap::Args, Debug)]
pub struct TasksArgs {
    #[arg(long, default_value_t = 1)]
    pub page: u32,

    #[arg(long, default_value_t = review_engine::DEFAULT_PAGE_SIZE)]
    pub page_size: u32,

    #[arg(long)]
    pub status: Option<TaskStatus>,

    #[arg(long)]
    pub mode: Option<EditMode>,

    /// Earliest creation date, YYYY-MM-DD
    #[arg(long)]
    pub from: Option<NaiveDate>,

    /// Latest creation date, YYYY-MM-DD
    #[arg(long)]
    pub to: Option<NaiveDate>,
}

#[derive(Subcommand, Debug)]
pub enum KeyAction {
    /// Store a key for a provider
    Set { provider: Provider, key: String },
    /// Forget a provider's key
    Clear { provider: Provider },
    /// Always use this provider; "auto" picks the first configured one
    Use { provider: ProviderChoice },
    /// Show configured keys, masked
    Show,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProviderChoice {
    Auto,
    Fixed(Provider),
}

impl FromStr for ProviderChoice {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        if value.trim().eq_ignore_ascii_case("auto") {
            return Ok(ProviderChoice::Auto);
        }
        value.parse().map(ProviderChoice::Fixed)
    }
}

impl ProviderChoice {
    pub fn provider(self) -> Option<Provider> {
        match self {
            ProviderChoice::Auto => None,
            ProviderChoice::Fixed(provider) => Some(provider),
        }
    }
}

/// Decisions applied once a result is loaded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AcceptPolicy {
    All,
    None,
    Indices(Vec<usize>),
}

impl FromStr for AcceptPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "all" => Ok(AcceptPolicy::All),
            "none" | "" => Ok(AcceptPolicy::None),
            list => list
                .split(',')
                .map(str::trim)
                .filter(|part| !part.is_empty())
                .map(|part| {
                    part.parse::<usize>()
                        .map_err(|_| format!("'{part}' is not a paragraph index"))
                })
                .collect::<Result<Vec<_>, _>>()
                .map(AcceptPolicy::Indices),
        }
    }
}
