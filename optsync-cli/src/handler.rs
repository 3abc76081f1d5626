//! Command handlers.

use std::path::Path;

use anyhow::{Context, Result};
use colored::Colorize;
use optsync::{
    AttributeDescriptor, CollisionPolicy, DescriptorList, ReconcileError, Reconciler, TextStyle,
    data::catalog,
    session::{LoadOutcome, SettingsSession},
    store::{ConfigStore, StoreKey},
};
use tokio::fs;

use crate::{
    cli::{Cli, Command},
    file_store::FileStore,
    utils::{read_settings_file, replace_env_placeholders},
};

/// Handler for settings commands.
pub struct SettingsHandler;

impl SettingsHandler {
    /// Runs one command against the file store selected by `cli`.
    ///
    /// # Errors
    ///
    /// Returns an error if the schema cannot be loaded, a value is rejected,
    /// or the store cannot be written. A command that would replace a stored
    /// document that could not be read fails unless `--force` is given.
    pub async fn handle(cli: Cli) -> Result<()> {
        let descriptors = load_descriptors(cli.schema.as_deref()).await?;
        let reconciler = Reconciler::builder(descriptors)
            .collision_policy(if cli.reject_collisions {
                CollisionPolicy::Reject
            } else {
                CollisionPolicy::Overwrite
            })
            .text_style(if cli.compact {
                TextStyle::Compact
            } else {
                TextStyle::Pretty
            })
            .build();

        let root = replace_env_placeholders(&cli.root);
        let store = FileStore::new(root).with_backup(cli.backup);
        let key = StoreKey::new(cli.scope.into(), cli.plugin, cli.namespace, cli.name);
        debug!("using store document {}", store.path_for(&key)?.display());

        let mut session = SettingsSession::open_with(store, key, reconciler).await;
        if cli.command.commits()
            && let LoadOutcome::Unusable(reason) = session.load_outcome().clone()
        {
            if !cli.force {
                bail!(
                    "stored settings at {} cannot be read ({reason}); fix the document, \
                     or pass --force to replace it",
                    session.key()
                );
            }
            warn!("replacing unreadable settings at {}, keeping a backup", session.key());
            session.store_mut().set_backup(true);
        }
        Self::run(&mut session, cli.command).await
    }

    /// Runs one command against an open session.
    pub async fn run<S: ConfigStore>(
        session: &mut SettingsSession<S>,
        command: Command,
    ) -> Result<()> {
        match command {
            Command::Show => {
                println!("{}", session.reconciler().serialize());
            }
            Command::List => {
                for d in session.reconciler().descriptors() {
                    println!("{}", describe(d));
                }
            }
            Command::Get { path } => {
                let value = session.reconciler().effective_value(&path)?;
                println!("{value}");
            }
            Command::Set { path, value } => {
                let descriptor = session
                    .reconciler()
                    .descriptors()
                    .get(&path)
                    .ok_or_else(|| ReconcileError::UnknownAttribute(path.clone()))?;
                let value = descriptor.parse_value(&value)?;
                session.update(&path, Some(value))?;
                Self::commit(session).await?;
            }
            Command::Unset { path } => {
                session.update(&path, None)?;
                Self::commit(session).await?;
            }
            Command::Import { file } => {
                let text = read_settings_file(&file).await?;
                session
                    .load_text(&text)
                    .with_context(|| format!("Failed to import {}", file.display()))?;
                Self::commit(session).await?;
            }
            Command::Reset => {
                session.restore_defaults().await?;
                println!("{}", "Restored default settings".green());
            }
        }
        Ok(())
    }

    async fn commit<S: ConfigStore>(session: &mut SettingsSession<S>) -> Result<()> {
        session.commit().await?;
        println!("{}", format!("Settings saved to {}", session.key()).green());
        Ok(())
    }
}

/// Load descriptors from a JSON Schema file, or the built-in catalog.
async fn load_descriptors(schema: Option<&Path>) -> Result<DescriptorList> {
    let Some(path) = schema else {
        return Ok(catalog::editor_defaults());
    };
    let content = fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read schema {}", path.display()))?;
    let schema: serde_json::Value = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse schema {}", path.display()))?;
    let list = DescriptorList::from_schema(&schema)?;
    if list.is_empty() {
        bail!("schema {} defines no settings", path.display());
    }
    Ok(list)
}

/// One listing line: label, path, kind, value.
fn describe(d: &AttributeDescriptor) -> String {
    let kind = match d.kind().allowed_values() {
        Some(values) => values.join("|"),
        None => d.kind().name().to_string(),
    };
    let value = d.current_value().to_string();
    let value = if d.is_set() {
        value.bold()
    } else {
        format!("{value} (default)").dimmed()
    };
    format!(
        "{} {} {} {}",
        format!("{:<24}", d.label()).bold(),
        format!("{:<22}", d.path()).cyan(),
        format!("{kind:<28}").purple(),
        value
    )
}
