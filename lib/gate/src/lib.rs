//! Content access gate for the folio server.
//!
//! This crate sits between the web layer and the permission core: given a
//! principal's resolved [`PermissionSet`](folio_access::PermissionSet) and
//! the identity of a book or series, it authorizes a single content access.
//! Library scope is checked first; series metadata is fetched from the
//! catalog collaborators only when restriction rules are present.
//!
//! Forbidden and not-found outcomes stay distinct all the way to the caller:
//! an identifier that cannot be resolved is reported as not found, while
//! resolvable content the principal may not see is reported as forbidden.

mod error;
mod gate;
mod metadata;

pub use error::GateError;
pub use gate::{BookRef, ContentGate, SeriesRef};
pub use metadata::{BookIndex, LookupError, RestrictionFacts, SeriesMetadataSource};
