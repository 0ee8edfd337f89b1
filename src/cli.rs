use clap::{Parser, Subcommand};
use std::path::PathBuf;

use crate::action::Action;
use crate::config::{get_config_dir, get_data_dir};

fn get_current_dir() -> Option<PathBuf> {
    std::env::current_dir().ok()
}

#[derive(Parser, Debug)]
#[command(author, version = version(), about)]
pub struct Cli {
    /// Path to a project directory, or a directory inside one
    #[arg(
        short,
        long,
        value_name = "DIR",
        global = true,
        default_value = get_current_dir().unwrap_or_default().into_os_string()
    )]
    pub project: PathBuf,

    /// Manifest file to edit, instead of searching the project for one
    #[arg(short, long, value_name = "FILE", global = true)]
    pub manifest: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Show every catalog package and whether it is installed
    List,
    /// Install catalog packages by name or identifier
    Install {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },
    /// Uninstall catalog packages by name or identifier
    Uninstall {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },
    /// Install catalog packages that are missing and uninstall the ones that are present
    Toggle {
        #[arg(required = true, value_name = "NAME")]
        names: Vec<String>,
    },
    /// Add a dependency entry
    Add {
        identifier: String,
        /// A version, or the url of a source repository
        version_or_url: String,
    },
    /// Remove a dependency entry
    Remove { identifier: String },
    /// Add a package from a source repository url
    AddSource { url: String },
    /// Remove a package that was added from a source repository url
    RemoveSource { url: String },
    /// Print whether the manifest has a dependency entry
    Contains { identifier: String },
    /// Print the identifier a source repository url is stored under
    DeriveId { url: String },
    /// Open the manifest or a catalog link with the system handler
    Open {
        #[command(subcommand)]
        target: OpenTarget,
    },
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum OpenTarget {
    /// The manifest file
    Manifest,
    /// A link from the catalog
    Link { name: String },
}

impl Command {
    pub fn into_actions(self) -> Vec<Action> {
        match self {
            Command::List => vec![Action::List],
            Command::Install { names } => names.into_iter().map(Action::Install).collect(),
            Command::Uninstall { names } => names.into_iter().map(Action::Uninstall).collect(),
            Command::Toggle { names } => names.into_iter().map(Action::Toggle).collect(),
            Command::Add {
                identifier,
                version_or_url,
            } => vec![Action::Add {
                identifier,
                specifier: version_or_url,
            }],
            Command::Remove { identifier } => vec![Action::Remove(identifier)],
            Command::AddSource { url } => vec![Action::AddSource(url)],
            Command::RemoveSource { url } => vec![Action::RemoveSource(url)],
            Command::Contains { identifier } => vec![Action::Contains(identifier)],
            Command::DeriveId { url } => vec![Action::DeriveIdentifier(url)],
            Command::Open { target } => match target {
                OpenTarget::Manifest => vec![Action::OpenManifest],
                OpenTarget::Link { name } => vec![Action::OpenLink(name)],
            },
        }
    }
}

pub fn version() -> String {
    let describe = option_env!("VERGEN_GIT_DESCRIBE").unwrap_or("unknown");
    let build_date = option_env!("VERGEN_BUILD_DATE").unwrap_or("unknown");

    let config_dir_path = get_config_dir().display().to_string();
    let data_dir_path = get_data_dir().display().to_string();

    format!(
        "\
{}-{describe} ({build_date})

Config directory: {config_dir_path}
Data directory: {data_dir_path}",
        env!("CARGO_PKG_VERSION")
    )
}
