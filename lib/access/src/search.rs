//! Search filtering context derived from a principal.
//!
//! Search and browse queries need the same facts an authorization decision
//! uses (who is asking, which libraries they may see, which restriction
//! rules apply) but packaged as filter inputs rather than evaluated per
//! item. A `SearchContext` captures that snapshot so query builders do not
//! reach into users or permission sets directly.

use crate::permission::PermissionSet;
use crate::principal::User;
use crate::restriction::ContentRestriction;
use crate::scope::LibraryScope;
use folio_core::UserId;

/// Filtering facts for one search, derived from a principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SearchContext {
    user_id: Option<UserId>,
    restrictions: Vec<ContentRestriction>,
    library_scope: LibraryScope,
}

impl SearchContext {
    /// A context with no principal and no filtering.
    ///
    /// Used for internal queries that must see everything.
    #[must_use]
    pub fn empty() -> Self {
        Self {
            user_id: None,
            restrictions: Vec::new(),
            library_scope: LibraryScope::Unrestricted,
        }
    }

    /// Builds the context for an unauthenticated principal.
    ///
    /// Anonymous access carries no identity and no filtering of its own;
    /// endpoints that admit anonymous readers decide separately what they
    /// expose.
    #[must_use]
    pub fn for_anonymous() -> Self {
        Self::empty()
    }

    /// Builds the context for a directly authenticated user.
    #[must_use]
    pub fn for_user(user: &User) -> Self {
        Self::for_permissions(&PermissionSet::from_user(user))
    }

    /// Builds the context from an already-resolved permission set.
    #[must_use]
    pub fn for_permissions(permissions: &PermissionSet) -> Self {
        Self {
            user_id: Some(permissions.user_id()),
            restrictions: permissions.restrictions().to_vec(),
            library_scope: permissions.authorized_library_ids(None),
        }
    }

    /// Returns the principal's user id, if any.
    #[must_use]
    pub fn user_id(&self) -> Option<UserId> {
        self.user_id
    }

    /// Returns the restriction rules to filter by.
    #[must_use]
    pub fn restrictions(&self) -> &[ContentRestriction] {
        &self.restrictions
    }

    /// Returns the library scope to filter by.
    #[must_use]
    pub fn library_scope(&self) -> &LibraryScope {
        &self.library_scope
    }
}
