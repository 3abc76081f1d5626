//! # optsync
//!
//! Settings reconciliation for code editors.
//!
//! optsync keeps three views of the same editor settings consistent: a
//! fixed catalog of dotted-path attribute descriptors (what the settings
//! form renders), a nested configuration tree (what the editor widget and
//! the configuration store consume), and the tree's JSON text (what the
//! live preview shows and the user may edit directly). An edit to any one
//! of them is propagated to the other two.
//!
//! ## Features
//!
//! - Typed tree of branches and scalar leaves, with an explicit policy for
//!   paths that collide with an existing scalar
//! - "Unset" distinct from "set to default": clearing an attribute removes
//!   its leaf instead of storing the default
//! - Atomic operations: a failed edit or load leaves everything unchanged
//! - Descriptor lists from code or from a JSON Schema document
//! - Async configuration store interface and a settings session that drives
//!   fetch, preview, commit and restore-defaults
//!
//! ## Quick Start
//!
//! ```rust
//! use optsync::{Reconciler, Scalar, data::catalog};
//!
//! let mut settings = Reconciler::new(catalog::editor_defaults());
//! settings.set_value("theme", Some(Scalar::from("vs-dark")))?;
//! settings.set_value("fontSize", None)?;
//!
//! assert_eq!(settings.theme(), Some("vs-dark"));
//! assert!(!settings.serialize().contains("fontSize"));
//! # Ok::<(), optsync::ReconcileError>(())
//! ```
//!
//! ## Modules
//!
//! - [`data`] - Values, trees, descriptors and the built-in catalog
//! - [`reconciler`] - The reconciliation engine
//! - [`store`] - Persisted configuration store interface
//! - [`session`] - Settings panel workflow

/// Configuration data structures.
pub mod data;

/// Error types.
pub mod error;

/// Reconciliation between descriptors, tree and text.
pub mod reconciler;

/// Settings panel workflow over a store and a live preview.
pub mod session;

/// Persisted configuration store interface.
pub mod store;

pub use data::{
    AttrKind, AttributeDescriptor, CollisionPolicy, ConfigNode, ConfigTree, DescriptorList,
    Scalar, TextStyle,
};
pub use error::{ReconcileError, SessionError, StoreError};
pub use reconciler::{Reconciler, ReconcilerBuilder};
pub use serde_json::Value;
