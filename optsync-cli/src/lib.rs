//! # optsync-cli
//!
//! Command-line host for [`optsync`] settings.
//!
//! Settings documents are kept in a directory tree, one JSON envelope per
//! scope, plugin, namespace and name. Every command opens a settings
//! session over the document, applies one operation and saves.
//!
//! ## Modules
//!
//! - [`cli`] - Command-line definitions
//! - [`file_store`] - File-backed configuration store
//! - [`handler`] - Command handlers
//! - [`utils`] - Path placeholders and settings file import

/// Command-line definitions.
pub mod cli;

/// File-backed configuration store.
pub mod file_store;

/// Command handlers.
pub mod handler;

/// Common helpers.
pub mod utils;

#[macro_use]
extern crate log;
#[macro_use]
extern crate anyhow;
