//! Error handling foundation for the folio content server.
//!
//! Only the `Result` alias lives here. Domain error enums are defined by the
//! crate that owns them (authorization denials in the gate crate, for
//! example) and travel as the alias's context parameter, picking up
//! layer-appropriate context via rootcause's `.context()` on the way up.

use rootcause::Report;

/// Result alias carrying a `rootcause` report.
///
/// `C` is the domain error of the layer producing the value; the default of
/// `()` fits code that only propagates.
pub type Result<T, C = ()> = std::result::Result<T, Report<C>>;
