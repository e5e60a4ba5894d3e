//! Effective permissions of a principal.
//!
//! A `PermissionSet` is the single value the rest of the server consults to
//! authorize a request. It is built fresh for every decision (from a user,
//! from an API key, or as the merge of both) and never mutated or persisted.
//!
//! The merge combines the owner's and the key's permissions so that a key
//! can only narrow what its owner may do: roles are intersected, library
//! scopes are intersected with unrestricted acting as the identity, and the
//! restriction lists are concatenated. Note the two different combinators at
//! work: restrictions across the list are combined with AND (every rule must
//! admit the content), while the allow clauses inside a single rule are
//! combined with OR. Unifying the two would break either the narrowing
//! property of the merge or the allow semantics of a single rule.

use crate::principal::{ApiKey, OwnedApiKey, User};
use crate::restriction::ContentRestriction;
use crate::role::RoleSet;
use crate::scope::LibraryScope;
use folio_core::{LibraryId, UserId};
use std::collections::BTreeSet;

/// The effective rights of a principal for one authorization decision.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PermissionSet {
    user_id: UserId,
    roles: RoleSet,
    library_scope: LibraryScope,
    restrictions: Vec<ContentRestriction>,
}

impl PermissionSet {
    /// Builds the permission set of a user authenticated directly.
    #[must_use]
    pub fn from_user(user: &User) -> Self {
        Self {
            user_id: user.id(),
            roles: user.roles().clone(),
            library_scope: user.library_scope().clone(),
            restrictions: active_restrictions(user.restriction()),
        }
    }

    /// Builds the permission set an API key carries on its own.
    ///
    /// The principal id is the owning user's id, not the key's.
    #[must_use]
    pub fn from_api_key(api_key: &ApiKey) -> Self {
        Self {
            user_id: api_key.user_id(),
            roles: api_key.roles().clone(),
            library_scope: api_key.library_scope().clone(),
            restrictions: active_restrictions(api_key.restriction()),
        }
    }

    /// Builds the effective permission set of a user authenticated through
    /// an API key.
    ///
    /// Takes an [`OwnedApiKey`] so the key-belongs-to-user relationship is
    /// verified before the merge can happen. Roles are intersected, library
    /// scopes are intersected (with each side's admin privilege applied
    /// first), and the restriction lists are concatenated owner-first.
    #[must_use]
    pub fn from_user_and_api_key(owned: &OwnedApiKey<'_>) -> Self {
        let owner = Self::from_user(owned.user());
        let key = Self::from_api_key(owned.api_key());

        let roles = owner.roles.intersection(&key.roles);
        let library_scope = owner
            .authorized_library_ids(None)
            .intersect(&key.authorized_library_ids(None));

        let mut restrictions = owner.restrictions;
        restrictions.extend(key.restrictions);

        Self {
            user_id: owned.user().id(),
            roles,
            library_scope,
            restrictions,
        }
    }

    /// Returns the principal's user id.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the principal's effective roles.
    #[must_use]
    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    /// Returns the restriction rules in evaluation order.
    #[must_use]
    pub fn restrictions(&self) -> &[ContentRestriction] {
        &self.restrictions
    }

    /// Returns true if any restriction rule is present.
    ///
    /// Callers use this to skip metadata lookups entirely when there is
    /// nothing to evaluate.
    #[must_use]
    pub fn has_restrictions(&self) -> bool {
        !self.restrictions.is_empty()
    }

    /// Returns true if the principal holds the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.roles.is_admin()
    }

    /// Returns true if the principal may access every library.
    ///
    /// True when the scope is declared unrestricted or when the principal is
    /// an admin. Derived on every call; permission sets are cheap, transient
    /// values.
    #[must_use]
    pub fn can_access_all_libraries(&self) -> bool {
        self.library_scope.is_unrestricted() || self.is_admin()
    }

    /// Returns true if the principal may access the given library.
    #[must_use]
    pub fn can_access_library(&self, library_id: LibraryId) -> bool {
        self.can_access_all_libraries() || self.library_scope.includes(library_id)
    }

    /// Resolves the libraries the principal may access, optionally narrowed
    /// to a requested set.
    ///
    /// An unrestricted result means the principal may access every library
    /// that exists on the server; a restricted result enumerates exactly the
    /// accessible ones (and may be empty when a requested set has no
    /// overlap).
    #[must_use]
    pub fn authorized_library_ids(&self, requested: Option<&BTreeSet<LibraryId>>) -> LibraryScope {
        let effective = if self.is_admin() {
            &LibraryScope::Unrestricted
        } else {
            &self.library_scope
        };
        effective.narrow(requested)
    }

    /// Evaluates every restriction rule against a piece of content.
    ///
    /// All rules must admit the content; an empty rule list admits
    /// everything.
    #[must_use]
    pub fn is_content_allowed(
        &self,
        age_rating: Option<u32>,
        sharing_labels: &BTreeSet<String>,
    ) -> bool {
        self.restrictions
            .iter()
            .all(|restriction| restriction.is_content_allowed(age_rating, sharing_labels))
    }
}

fn active_restrictions(restriction: &ContentRestriction) -> Vec<ContentRestriction> {
    if restriction.is_active() {
        vec![restriction.clone()]
    } else {
        Vec::new()
    }
}
