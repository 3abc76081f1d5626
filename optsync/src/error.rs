//! Error types for reconciliation, persistence and sessions.

/// Errors raised by [`Reconciler`](crate::Reconciler) and descriptor parsing.
///
/// Every reconciler operation that returns one of these leaves the
/// reconciler exactly as it was before the call.
#[derive(Debug, thiserror::Error)]
pub enum ReconcileError {
    /// The path does not name any descriptor in the list.
    #[error("unknown attribute `{0}`")]
    UnknownAttribute(String),

    /// The supplied tree is not a nested mapping of mappings and scalars.
    #[error("invalid config shape at `{path}`: {reason}")]
    InvalidConfigShape { path: String, reason: String },

    /// The text could not be parsed as JSON.
    #[error("malformed config text: {0}")]
    MalformedText(#[from] serde_json::Error),

    /// The value does not satisfy the descriptor's kind.
    #[error("type mismatch at `{path}`: expected {expected}, got {actual}")]
    TypeMismatch {
        path: String,
        expected: String,
        actual: String,
    },

    /// A scalar sits on an intermediate segment, or a branch sits at the
    /// leaf position, and the policy rejects replacing it.
    #[error("path `{path}` collides with a value at `{at}`")]
    PathCollision { path: String, at: String },

    /// The descriptor list itself is malformed.
    #[error("invalid descriptor `{path}`: {reason}")]
    InvalidDescriptor { path: String, reason: String },
}

impl ReconcileError {
    pub(crate) fn shape(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidConfigShape {
            path: path.into(),
            reason: reason.into(),
        }
    }

    pub(crate) fn descriptor(path: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            path: path.into(),
            reason: reason.into(),
        }
    }
}

/// Errors raised by [`ConfigStore`](crate::store::ConfigStore) backends.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("document serialization error: {0}")]
    Serde(#[from] serde_json::Error),

    #[error("store backend error: {0}")]
    Backend(String),
}

/// Errors raised by [`SettingsSession`](crate::session::SettingsSession).
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    #[error(transparent)]
    Reconcile(#[from] ReconcileError),

    #[error(transparent)]
    Store(#[from] StoreError),
}
