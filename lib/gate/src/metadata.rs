//! Collaborator traits for metadata and book resolution.
//!
//! The gate consumes two narrow read-only contracts: one that supplies the
//! restriction-relevant metadata of a series, and one that resolves a book
//! to its library and series. Implementations live in the persistence layer;
//! the gate never sees a wire format or a table.

use async_trait::async_trait;
use folio_core::{BookId, LibraryId, SeriesId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

/// The metadata facts a restriction rule is evaluated against.
///
/// Age rating and sharing labels are carried at the series level in this
/// domain.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RestrictionFacts {
    /// The series' age rating, if one was set.
    pub age_rating: Option<u32>,
    /// The series' sharing labels.
    pub sharing_labels: BTreeSet<String>,
}

/// A collaborator lookup failure.
///
/// Distinct from "not found": a lookup that fails (timeout, cancellation,
/// storage error) made no statement about whether the item exists, and must
/// surface as an error rather than an authorization decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LookupError {
    /// Error details.
    pub details: String,
}

impl LookupError {
    /// Creates a new lookup error.
    #[must_use]
    pub fn new(details: impl Into<String>) -> Self {
        Self {
            details: details.into(),
        }
    }
}

impl fmt::Display for LookupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "lookup failed: {}", self.details)
    }
}

impl std::error::Error for LookupError {}

/// Supplies the restriction-relevant metadata of a series.
#[async_trait]
pub trait SeriesMetadataSource: Send + Sync {
    /// Returns the restriction facts for a series, or `None` when the
    /// series has no metadata record.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails.
    async fn restriction_facts(
        &self,
        series_id: SeriesId,
    ) -> Result<Option<RestrictionFacts>, LookupError>;
}

/// Resolves a book to its library and series.
#[async_trait]
pub trait BookIndex: Send + Sync {
    /// Returns the library holding a book, or `None` when the book is
    /// unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails.
    async fn library_id_of(&self, book_id: BookId) -> Result<Option<LibraryId>, LookupError>;

    /// Returns the series a book belongs to, or `None` when the book is
    /// unknown.
    ///
    /// # Errors
    ///
    /// Returns an error if the lookup itself fails.
    async fn series_id_of(&self, book_id: BookId) -> Result<Option<SeriesId>, LookupError>;
}
