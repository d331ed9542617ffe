use chirp_kv::KVError;
use thiserror::Error;

// ── Error codes ─────────────────────────────────────────────────────
//
// Front ends branch on these codes; the message text is for humans and may
// change between releases.

/// Stable error code constants.
pub mod error_code {
    pub const NOT_FOUND: &str = "NOT_FOUND";
    pub const ALREADY_EXISTS: &str = "ALREADY_EXISTS";
    pub const VALIDATION_FAILED: &str = "VALIDATION_FAILED";
    pub const UNAUTHENTICATED: &str = "UNAUTHENTICATED";
    pub const INVALID_CONFIG: &str = "INVALID_CONFIG";
    pub const STORAGE_ERROR: &str = "STORAGE_ERROR";
    pub const INTERNAL: &str = "INTERNAL";
}

// ── ServiceError ────────────────────────────────────────────────────

/// Error returned by every DAO and service call in the feed.
///
/// Display is the bare message; pair it with [`ServiceError::error_code`]
/// when a caller needs to tell failures apart.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// No user or post under the given name or id.
    #[error("{0}")]
    NotFound(String),

    /// Username already registered.
    #[error("{0}")]
    Conflict(String),

    /// Form input rejected before touching the store.
    #[error("{0}")]
    Validation(String),

    /// Sign-in failed.
    #[error("{0}")]
    Unauthorized(String),

    #[error("{0}")]
    Config(String),

    /// The key-value backend failed.
    #[error("{0}")]
    Storage(String),

    /// A stored record is malformed, e.g. a non-numeric id in a feed list.
    #[error("{0}")]
    Internal(String),
}

impl ServiceError {
    pub fn error_code(&self) -> &'static str {
        use error_code::*;
        match self {
            Self::NotFound(_) => NOT_FOUND,
            Self::Conflict(_) => ALREADY_EXISTS,
            Self::Validation(_) => VALIDATION_FAILED,
            Self::Unauthorized(_) => UNAUTHENTICATED,
            Self::Config(_) => INVALID_CONFIG,
            Self::Storage(_) => STORAGE_ERROR,
            Self::Internal(_) => INTERNAL,
        }
    }

    /// Whether the caller caused the failure, as opposed to the store or
    /// the data in it.
    pub fn is_client_error(&self) -> bool {
        matches!(
            self,
            Self::NotFound(_) | Self::Conflict(_) | Self::Validation(_) | Self::Unauthorized(_)
        )
    }
}

impl From<KVError> for ServiceError {
    fn from(e: KVError) -> Self {
        Self::Storage(e.to_string())
    }
}
