//! Library scoping for a principal.
//!
//! A principal either sees every library on the server or an enumerated set.
//! The two states are modeled as a tagged variant rather than an optional
//! collection, so an unrestricted scope cannot be confused with an empty one
//! when scopes are intersected.

use folio_core::LibraryId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// The set of libraries a principal may access.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case", tag = "scope", content = "library_ids")]
pub enum LibraryScope {
    /// The principal may access every library that exists on the server.
    Unrestricted,
    /// The principal may access exactly these libraries. May be empty.
    Restricted(BTreeSet<LibraryId>),
}

impl LibraryScope {
    /// Creates a restricted scope over the given library ids.
    #[must_use]
    pub fn restricted(ids: impl IntoIterator<Item = LibraryId>) -> Self {
        Self::Restricted(ids.into_iter().collect())
    }

    /// Returns true if the scope places no restriction.
    #[must_use]
    pub fn is_unrestricted(&self) -> bool {
        matches!(self, Self::Unrestricted)
    }

    /// Returns true if the scope grants access to the given library.
    #[must_use]
    pub fn includes(&self, id: LibraryId) -> bool {
        match self {
            Self::Unrestricted => true,
            Self::Restricted(ids) => ids.contains(&id),
        }
    }

    /// Narrows this scope to a requested set of libraries.
    ///
    /// With no request, the scope is returned as is: unrestricted stays
    /// unrestricted, restricted yields its own set. With a request, an
    /// unrestricted scope passes the request through unchanged, while a
    /// restricted scope intersects it with its own set (possibly yielding an
    /// empty result when there is no overlap).
    #[must_use]
    pub fn narrow(&self, requested: Option<&BTreeSet<LibraryId>>) -> Self {
        match (self, requested) {
            (Self::Unrestricted, None) => Self::Unrestricted,
            (Self::Unrestricted, Some(ids)) => Self::Restricted(ids.clone()),
            (Self::Restricted(own), None) => Self::Restricted(own.clone()),
            (Self::Restricted(own), Some(ids)) => {
                Self::Restricted(own.intersection(ids).copied().collect())
            }
        }
    }

    /// Intersects two scopes.
    ///
    /// Unrestricted acts as the identity: intersecting with it yields the
    /// other scope. Two restricted scopes intersect their sets.
    #[must_use]
    pub fn intersect(&self, other: &Self) -> Self {
        match (self, other) {
            (Self::Unrestricted, Self::Unrestricted) => Self::Unrestricted,
            (Self::Unrestricted, restricted) => restricted.clone(),
            (restricted, Self::Unrestricted) => restricted.clone(),
            (Self::Restricted(a), Self::Restricted(b)) => {
                Self::Restricted(a.intersection(b).copied().collect())
            }
        }
    }

    /// Returns the enumerated library ids, or `None` when unrestricted.
    #[must_use]
    pub fn library_ids(&self) -> Option<&BTreeSet<LibraryId>> {
        match self {
            Self::Unrestricted => None,
            Self::Restricted(ids) => Some(ids),
        }
    }
}

impl Default for LibraryScope {
    fn default() -> Self {
        Self::Unrestricted
    }
}
