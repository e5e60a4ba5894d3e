//! Content gate error types.
//!
//! Forbidden and not-found are deliberately distinct variants: a caller must
//! be able to report "does not exist" when an identifier cannot be resolved
//! and "access denied" when it can. Collaborator failures get their own
//! variant so a timed-out lookup is never mistaken for either decision.

use folio_core::{BookId, LibraryId, SeriesId};
use std::fmt;

/// Errors from content gate checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateError {
    /// The principal may not access the library holding the content.
    LibraryForbidden {
        /// The library that was denied.
        library_id: LibraryId,
    },
    /// The content failed the principal's restriction rules.
    ContentForbidden {
        /// The series whose metadata failed evaluation.
        series_id: SeriesId,
    },
    /// The book does not resolve to a library or series.
    BookNotFound {
        /// The book that could not be resolved.
        book_id: BookId,
    },
    /// The series has no metadata record.
    SeriesNotFound {
        /// The series that could not be resolved.
        series_id: SeriesId,
    },
    /// A collaborator lookup failed; no authorization decision was made.
    LookupFailed {
        /// Error details.
        details: String,
    },
}

impl fmt::Display for GateError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::LibraryForbidden { library_id } => {
                write!(f, "access denied to library '{}'", library_id)
            }
            Self::ContentForbidden { series_id } => {
                write!(f, "content restriction denies series '{}'", series_id)
            }
            Self::BookNotFound { book_id } => {
                write!(f, "book '{}' not found", book_id)
            }
            Self::SeriesNotFound { series_id } => {
                write!(f, "series '{}' not found", series_id)
            }
            Self::LookupFailed { details } => {
                write!(f, "metadata lookup failed: {}", details)
            }
        }
    }
}

impl std::error::Error for GateError {}

impl GateError {
    /// Returns true for the forbidden variants.
    #[must_use]
    pub fn is_forbidden(&self) -> bool {
        matches!(
            self,
            Self::LibraryForbidden { .. } | Self::ContentForbidden { .. }
        )
    }

    /// Returns true for the not-found variants.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::BookNotFound { .. } | Self::SeriesNotFound { .. })
    }
}
