//! Error types for the draw subsystem.
//!
//! Every failure a caller can observe from [`DrawManager`] is one of the
//! variants below. They are surfaced distinctly and never swallowed; the core
//! performs no retries of its own.
//!
//! ## Error Cases
//! - `StoreUnavailable`: The draw store failed or did not answer within the
//!   configured timeout. Retryable with backoff.
//! - `DrawNotFound`: No record exists for the draw id. Caller error.
//! - `DrawExhausted`: The draw exists but every entry has been drawn. Terminal.
//! - `CatalogEmpty`: The catalog had nothing to offer.
//! - `CatalogUnavailable`: The catalog collaborator failed.
//!
//! [`DrawManager`]: crate::DrawManager

use crate::DrawId;

pub type Result<T, E = Error> = core::result::Result<T, E>;

/// Unified error type for draw operations.
#[derive(Clone, Debug, PartialEq, Eq, thiserror::Error)]
#[non_exhaustive]
pub enum Error {
    /// I/O failure or timeout talking to the draw store.
    ///
    /// A timeout leaves the outcome unknown: read-only operations are safe to
    /// retry, `create` is not.
    #[error("Draw store unavailable: {reason}")]
    StoreUnavailable { reason: String },

    /// The draw id was never issued, was deleted, or has expired.
    #[error("Draw not found: {id}")]
    DrawNotFound { id: DrawId },

    /// The draw exists but has no entries left.
    #[error("Draw exhausted: {id}")]
    DrawExhausted { id: DrawId },

    /// The catalog holds no candidate entries.
    #[error("Catalog has no entries available")]
    CatalogEmpty,

    /// The catalog collaborator failed to produce candidates.
    #[error("Catalog unavailable: {reason}")]
    CatalogUnavailable { reason: String },
}

impl Error {
    /// Returns `true` when retrying the same call later may succeed.
    pub const fn is_retryable(&self) -> bool {
        matches!(
            self,
            Self::StoreUnavailable { .. } | Self::CatalogUnavailable { .. }
        )
    }

    /// Stable, transport-friendly name of the error kind.
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::StoreUnavailable { .. } => "StoreUnavailable",
            Self::DrawNotFound { .. } => "DrawNotFound",
            Self::DrawExhausted { .. } => "DrawExhausted",
            Self::CatalogEmpty => "CatalogEmpty",
            Self::CatalogUnavailable { .. } => "CatalogUnavailable",
        }
    }
}
