//! Role types for server access control.
//!
//! Roles gate what an authenticated principal may do on the server. They are
//! a small closed set compared only by membership: feature gates elsewhere
//! check for the specific role they need. The `Admin` role is special in one
//! place only: an admin can always access every library (see the permission
//! module).

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

/// A server role granted to a user or an API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    /// Administrator with full oversight of the server.
    Admin,
    /// May download book files.
    FileDownload,
    /// May stream book pages.
    PageStreaming,
    /// May sync reading progress with Kobo devices.
    KoboSync,
}

impl Role {
    /// Returns true if this role carries admin privileges.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        matches!(self, Self::Admin)
    }
}

/// Set of roles granted to a principal.
///
/// A principal may hold any combination of roles. When a user authenticates
/// through an API key, the effective roles are the intersection of the
/// user's roles and the key's roles.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RoleSet {
    roles: BTreeSet<Role>,
}

impl RoleSet {
    /// Creates an empty role set.
    #[must_use]
    pub fn none() -> Self {
        Self {
            roles: BTreeSet::new(),
        }
    }

    /// Creates a role set holding every role.
    #[must_use]
    pub fn all() -> Self {
        Self::new([
            Role::Admin,
            Role::FileDownload,
            Role::PageStreaming,
            Role::KoboSync,
        ])
    }

    /// Creates a role set from the given roles.
    #[must_use]
    pub fn new(roles: impl IntoIterator<Item = Role>) -> Self {
        Self {
            roles: roles.into_iter().collect(),
        }
    }

    /// Returns true if the set contains the given role.
    #[must_use]
    pub fn contains(&self, role: Role) -> bool {
        self.roles.contains(&role)
    }

    /// Returns true if the set contains the admin role.
    #[must_use]
    pub fn is_admin(&self) -> bool {
        self.contains(Role::Admin)
    }

    /// Returns the roles present in both sets.
    #[must_use]
    pub fn intersection(&self, other: &Self) -> Self {
        Self {
            roles: self.roles.intersection(&other.roles).copied().collect(),
        }
    }

    /// Returns true if the set holds no roles.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.roles.is_empty()
    }

    /// Returns the number of roles in the set.
    #[must_use]
    pub fn len(&self) -> usize {
        self.roles.len()
    }

    /// Iterates over the roles in the set.
    pub fn iter(&self) -> impl Iterator<Item = Role> + '_ {
        self.roles.iter().copied()
    }
}

impl FromIterator<Role> for RoleSet {
    fn from_iter<I: IntoIterator<Item = Role>>(iter: I) -> Self {
        Self::new(iter)
    }
}
