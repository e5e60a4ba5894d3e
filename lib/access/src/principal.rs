//! Principal sources: users and API keys.
//!
//! These are read-only snapshots of the entities a permission set is built
//! from. Persistence, password storage, and key-secret generation live
//! elsewhere; this module only carries the fields that matter for
//! authorization decisions.

use crate::restriction::ContentRestriction;
use crate::role::{Role, RoleSet};
use crate::scope::LibraryScope;
use chrono::{DateTime, Utc};
use folio_core::{ApiKeyId, UserId};
use serde::{Deserialize, Serialize};

/// A user of the server.
///
/// New users default to the non-privileged roles, unrestricted library
/// access, and no content restriction. Use the `with_*` methods to narrow.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct User {
    id: UserId,
    email: String,
    roles: RoleSet,
    library_scope: LibraryScope,
    restriction: ContentRestriction,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl User {
    /// Creates a new user with default access.
    #[must_use]
    pub fn new(email: impl Into<String>) -> Self {
        let now = Utc::now();
        Self {
            id: UserId::new(),
            email: email.into(),
            roles: RoleSet::new([Role::FileDownload, Role::PageStreaming]),
            library_scope: LibraryScope::Unrestricted,
            restriction: ContentRestriction::none(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Replaces the user's roles.
    #[must_use]
    pub fn with_roles(mut self, roles: RoleSet) -> Self {
        self.roles = roles;
        self
    }

    /// Replaces the user's library scope.
    #[must_use]
    pub fn with_library_scope(mut self, scope: LibraryScope) -> Self {
        self.library_scope = scope;
        self
    }

    /// Replaces the user's content restriction.
    #[must_use]
    pub fn with_restriction(mut self, restriction: ContentRestriction) -> Self {
        self.restriction = restriction;
        self
    }

    /// Returns the user's ID.
    #[must_use]
    pub fn id(&self) -> UserId {
        self.id
    }

    /// Returns the user's email address.
    #[must_use]
    pub fn email(&self) -> &str {
        &self.email
    }

    /// Returns the user's roles.
    #[must_use]
    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    /// Returns the user's library scope.
    #[must_use]
    pub fn library_scope(&self) -> &LibraryScope {
        &self.library_scope
    }

    /// Returns the user's content restriction.
    #[must_use]
    pub fn restriction(&self) -> &ContentRestriction {
        &self.restriction
    }

    /// Returns when the user was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// Returns when the user was last updated.
    #[must_use]
    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }
}

/// An API key belonging to a user.
///
/// A key defaults to the full access of its owner: all roles, all libraries,
/// no content restriction. Narrowing a key at creation time produces a
/// principal with fewer rights than the owning user, never more; the
/// effective permissions are the intersection of both (see
/// `PermissionSet::from_user_and_api_key`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiKey {
    id: ApiKeyId,
    user_id: UserId,
    comment: String,
    roles: RoleSet,
    library_scope: LibraryScope,
    restriction: ContentRestriction,
    created_at: DateTime<Utc>,
}

impl ApiKey {
    /// Creates a new API key for the given user with full access.
    #[must_use]
    pub fn new(user_id: UserId, comment: impl Into<String>) -> Self {
        Self {
            id: ApiKeyId::new(),
            user_id,
            comment: comment.into(),
            roles: RoleSet::all(),
            library_scope: LibraryScope::Unrestricted,
            restriction: ContentRestriction::none(),
            created_at: Utc::now(),
        }
    }

    /// Replaces the key's roles.
    #[must_use]
    pub fn with_roles(mut self, roles: RoleSet) -> Self {
        self.roles = roles;
        self
    }

    /// Replaces the key's library scope.
    #[must_use]
    pub fn with_library_scope(mut self, scope: LibraryScope) -> Self {
        self.library_scope = scope;
        self
    }

    /// Replaces the key's content restriction.
    #[must_use]
    pub fn with_restriction(mut self, restriction: ContentRestriction) -> Self {
        self.restriction = restriction;
        self
    }

    /// Returns the key's ID.
    #[must_use]
    pub fn id(&self) -> ApiKeyId {
        self.id
    }

    /// Returns the owning user's ID.
    #[must_use]
    pub fn user_id(&self) -> UserId {
        self.user_id
    }

    /// Returns the key's comment.
    #[must_use]
    pub fn comment(&self) -> &str {
        &self.comment
    }

    /// Returns the key's roles.
    #[must_use]
    pub fn roles(&self) -> &RoleSet {
        &self.roles
    }

    /// Returns the key's library scope.
    #[must_use]
    pub fn library_scope(&self) -> &LibraryScope {
        &self.library_scope
    }

    /// Returns the key's content restriction.
    #[must_use]
    pub fn restriction(&self) -> &ContentRestriction {
        &self.restriction
    }

    /// Returns when the key was created.
    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

/// Proof that an API key belongs to a user.
///
/// The permission merge requires the key to belong to the user it is merged
/// with. Rather than trusting callers to have checked the relationship, the
/// merge entry point takes this type, which can only be obtained through
/// [`OwnedApiKey::verify`].
#[derive(Debug, Clone, Copy)]
pub struct OwnedApiKey<'a> {
    user: &'a User,
    api_key: &'a ApiKey,
}

impl<'a> OwnedApiKey<'a> {
    /// Verifies that the key belongs to the user.
    ///
    /// Returns `None` when the key references a different user.
    #[must_use]
    pub fn verify(user: &'a User, api_key: &'a ApiKey) -> Option<Self> {
        if api_key.user_id() == user.id() {
            Some(Self { user, api_key })
        } else {
            None
        }
    }

    /// Returns the owning user.
    #[must_use]
    pub fn user(&self) -> &'a User {
        self.user
    }

    /// Returns the API key.
    #[must_use]
    pub fn api_key(&self) -> &'a ApiKey {
        self.api_key
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_user_has_default_access() {
        let user = User::new("alice@example.org");

        assert_eq!(user.email(), "alice@example.org");
        assert!(user.roles().contains(Role::FileDownload));
        assert!(user.roles().contains(Role::PageStreaming));
        assert!(!user.roles().is_admin());
        assert!(user.library_scope().is_unrestricted());
        assert!(!user.restriction().is_active());
        assert_eq!(user.created_at(), user.updated_at());
    }

    #[test]
    fn user_builder_narrows_access() {
        let lib = folio_core::LibraryId::new();
        let user = User::new("bob@example.org")
            .with_roles(RoleSet::new([Role::PageStreaming]))
            .with_library_scope(LibraryScope::restricted([lib]))
            .with_restriction(ContentRestriction::none().with_labels_allow(["teen"]));

        assert_eq!(user.roles().len(), 1);
        assert!(user.library_scope().includes(lib));
        assert!(user.restriction().is_active());
    }

    #[test]
    fn new_api_key_defaults_to_full_access() {
        let user = User::new("alice@example.org");
        let key = ApiKey::new(user.id(), "reading app");

        assert_eq!(key.user_id(), user.id());
        assert_eq!(key.comment(), "reading app");
        assert_eq!(key.roles(), &RoleSet::all());
        assert!(key.library_scope().is_unrestricted());
        assert!(!key.restriction().is_active());
    }

    #[test]
    fn verify_accepts_owned_key() {
        let user = User::new("alice@example.org");
        let key = ApiKey::new(user.id(), "test");

        let owned = OwnedApiKey::verify(&user, &key);
        assert!(owned.is_some());
        let owned = owned.expect("verified");
        assert_eq!(owned.user().id(), user.id());
        assert_eq!(owned.api_key().id(), key.id());
    }

    #[test]
    fn verify_rejects_foreign_key() {
        let alice = User::new("alice@example.org");
        let bob = User::new("bob@example.org");
        let key = ApiKey::new(bob.id(), "test");

        assert!(OwnedApiKey::verify(&alice, &key).is_none());
    }

    #[test]
    fn user_serialization_roundtrip() {
        let user = User::new("alice@example.org").with_roles(RoleSet::all());
        let json = serde_json::to_string(&user).expect("serialize");
        let parsed: User = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(user, parsed);
    }

    #[test]
    fn api_key_serialization_roundtrip() {
        let key = ApiKey::new(UserId::new(), "sync client");
        let json = serde_json::to_string(&key).expect("serialize");
        let parsed: ApiKey = serde_json::from_str(&json).expect("deserialize");
        assert_eq!(key, parsed);
    }
}
