//! Roles, content restrictions, and permission sets for the folio server.
//!
//! This crate provides:
//! - Role-based access control (`Role`, `RoleSet`)
//! - Library scoping (`LibraryScope`)
//! - Content restriction rules and their evaluator (`ContentRestriction`)
//! - Principal sources (`User`, `ApiKey`) and the verified-ownership proof
//!   (`OwnedApiKey`)
//! - Effective permissions (`PermissionSet`) and the user/API-key merge
//! - Search filtering context (`SearchContext`)
//!
//! # Access Control Model
//!
//! Every authorization decision works on a `PermissionSet` constructed fresh
//! from its sources. A user authenticated directly gets the permissions of
//! their account; a user authenticated through an API key gets the
//! intersection of their account's permissions and the key's, so a key can
//! only ever narrow access.
//!
//! # Example
//!
//! ```
//! use folio_access::{
//!     AgeThreshold, AllowExclude, ApiKey, ContentRestriction, LibraryScope, OwnedApiKey,
//!     PermissionSet, Role, RoleSet, User,
//! };
//! use folio_core::LibraryId;
//!
//! let library = LibraryId::new();
//!
//! // A user limited to one library.
//! let user = User::new("alice@example.org")
//!     .with_library_scope(LibraryScope::restricted([library]));
//!
//! // An API key narrowed to streaming, with an age cap.
//! let key = ApiKey::new(user.id(), "kid's tablet")
//!     .with_roles(RoleSet::new([Role::PageStreaming]))
//!     .with_restriction(
//!         ContentRestriction::none()
//!             .with_age_threshold(AgeThreshold::new(10, AllowExclude::AllowOnly)),
//!     );
//!
//! let owned = OwnedApiKey::verify(&user, &key).expect("key belongs to user");
//! let permissions = PermissionSet::from_user_and_api_key(&owned);
//!
//! assert!(permissions.can_access_library(library));
//! assert!(!permissions.can_access_all_libraries());
//! assert!(permissions.is_content_allowed(Some(8), &Default::default()));
//! assert!(!permissions.is_content_allowed(Some(14), &Default::default()));
//! ```

pub mod permission;
pub mod principal;
pub mod restriction;
pub mod role;
pub mod scope;
pub mod search;

// Re-export main types at crate root
pub use permission::PermissionSet;
pub use principal::{ApiKey, OwnedApiKey, User};
pub use restriction::{AgeThreshold, AllowExclude, ContentRestriction};
pub use role::{Role, RoleSet};
pub use scope::LibraryScope;
pub use search::SearchContext;
