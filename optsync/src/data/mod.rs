//! Configuration data structures.
//!
//! This module provides the data model the reconciler works on:
//!
//! - [`value`] - Scalar leaf values
//! - [`tree`] - Nested configuration tree and its JSON text form
//! - [`descriptor`] - Attribute descriptors and descriptor lists
//! - [`label`] - Display names for paths and enumeration values
//! - [`catalog`] - Built-in editor settings catalog

/// Scalar leaf values.
pub mod value;

/// Nested configuration tree with typed traversal and insertion.
pub mod tree;

/// Attribute descriptors, descriptor lists and JSON Schema parsing.
pub mod descriptor;

/// Display names for attribute paths and values.
pub mod label;

/// Built-in editor settings catalog.
pub mod catalog;

pub use descriptor::{AttrKind, AttributeDescriptor, DescriptorList};
pub use tree::{CollisionPolicy, ConfigNode, ConfigTree, TextStyle};
pub use value::Scalar;
