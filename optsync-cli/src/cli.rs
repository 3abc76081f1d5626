//! Command-line definitions.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};
use optsync::store::Scope;

/// Edit stored code editor settings.
#[derive(Parser, Debug)]
#[command(name = "optsync", version, about)]
pub struct Cli {
    /// Store root directory. Supports `${env:VAR}` placeholders.
    #[arg(long, global = true, default_value = ".optsync")]
    pub root: String,

    /// Owner scope of the settings document.
    #[arg(long, global = true, value_enum, default_value_t = ScopeArg::User)]
    pub scope: ScopeArg,

    /// Plugin identifier owning the document.
    #[arg(long, global = true, default_value = "org.zowe.editor")]
    pub plugin: String,

    /// Namespace within the plugin.
    #[arg(long, global = true, default_value = "monaco")]
    pub namespace: String,

    /// Document name.
    #[arg(long, global = true, default_value = "editorconfig.json")]
    pub name: String,

    /// JSON Schema file describing the settings. Defaults to the built-in
    /// editor catalog.
    #[arg(long, global = true)]
    pub schema: Option<PathBuf>,

    /// Print settings as single-line JSON.
    #[arg(long, global = true)]
    pub compact: bool,

    /// Fail instead of replacing a value that blocks a nested path.
    #[arg(long, global = true)]
    pub reject_collisions: bool,

    /// Keep a timestamped backup of the document before replacing it.
    #[arg(long, global = true)]
    pub backup: bool,

    /// Replace a stored document that cannot be read. A backup of it is
    /// kept.
    #[arg(long, global = true)]
    pub force: bool,

    #[command(subcommand)]
    pub command: Command,
}

/// Settings operations.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// Print the stored settings as JSON.
    Show,
    /// List every setting with its current value.
    List,
    /// Print the effective value of one setting.
    Get {
        /// Dotted setting path, e.g. `minimap.enabled`.
        path: String,
    },
    /// Set one setting and save.
    Set {
        /// Dotted setting path.
        path: String,
        /// New value, parsed by the setting's type.
        value: String,
    },
    /// Clear one setting back to its default and save.
    Unset {
        /// Dotted setting path.
        path: String,
    },
    /// Replace all settings with a `.json` or `.toml` file and save.
    Import {
        /// Settings file to import.
        file: PathBuf,
    },
    /// Delete the stored settings and return to defaults.
    Reset,
}

impl Command {
    /// Whether the command commits the edited settings over the stored
    /// document.
    pub fn commits(&self) -> bool {
        matches!(
            self,
            Command::Set { .. } | Command::Unset { .. } | Command::Import { .. }
        )
    }
}

/// Owner scope selector.
#[derive(ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScopeArg {
    /// Per-user settings.
    User,
    /// Per-installation settings.
    Instance,
    /// Site-wide settings.
    Site,
    /// Product defaults.
    Product,
}

impl From<ScopeArg> for Scope {
    fn from(value: ScopeArg) -> Self {
        match value {
            ScopeArg::User => Scope::User,
            ScopeArg::Instance => Scope::Instance,
            ScopeArg::Site => Scope::Site,
            ScopeArg::Product => Scope::Product,
        }
    }
}
