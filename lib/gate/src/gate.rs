//! The content gate: one authorization decision per call.
//!
//! Each check takes the principal's already-resolved `PermissionSet` and the
//! identity of the content being accessed, consults the library scope first,
//! and fetches series metadata only when the permission set actually carries
//! restriction rules. The gate performs no mutation; the conditional
//! metadata read is its only side effect.

use crate::error::GateError;
use crate::metadata::{BookIndex, LookupError, SeriesMetadataSource};
use folio_access::PermissionSet;
use folio_core::{BookId, LibraryId, Result, SeriesId};
use std::collections::BTreeSet;
use std::sync::Arc;
use tracing::{debug, instrument};

/// A book's resolved position in the catalog.
///
/// Used when the caller already has the book record at hand and no index
/// lookups are needed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BookRef {
    /// The book's ID.
    pub id: BookId,
    /// The library holding the book.
    pub library_id: LibraryId,
    /// The series the book belongs to.
    pub series_id: SeriesId,
}

/// A series together with its restriction-relevant metadata.
///
/// Used when the caller already has the series record at hand.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SeriesRef {
    /// The series' ID.
    pub id: SeriesId,
    /// The library holding the series.
    pub library_id: LibraryId,
    /// The series' age rating, if one was set.
    pub age_rating: Option<u32>,
    /// The series' sharing labels.
    pub sharing_labels: BTreeSet<String>,
}

/// Authorizes individual content accesses against a permission set.
#[derive(Clone)]
pub struct ContentGate {
    metadata: Arc<dyn SeriesMetadataSource>,
    books: Arc<dyn BookIndex>,
}

impl ContentGate {
    /// Creates a new content gate over the given collaborators.
    #[must_use]
    pub fn new(metadata: Arc<dyn SeriesMetadataSource>, books: Arc<dyn BookIndex>) -> Self {
        Self { metadata, books }
    }

    /// Checks access to a book whose catalog position is already known.
    ///
    /// Denies unless the principal may access the book's library. When the
    /// permission set carries restriction rules, fetches the series'
    /// restriction facts and denies unless every rule admits them; without
    /// rules no metadata is fetched at all.
    ///
    /// # Errors
    ///
    /// Returns `LibraryForbidden`/`ContentForbidden` on denial,
    /// `SeriesNotFound` when the series has no metadata record, and
    /// `LookupFailed` when the metadata source fails.
    #[instrument(skip(self, permissions), fields(user_id = %permissions.user_id(), book_id = %book.id))]
    pub async fn check_book(
        &self,
        permissions: &PermissionSet,
        book: &BookRef,
    ) -> Result<(), GateError> {
        if !permissions.can_access_library(book.library_id) {
            return Err(GateError::LibraryForbidden {
                library_id: book.library_id,
            }
            .into());
        }

        if permissions.has_restrictions() {
            self.check_series_restrictions(permissions, book.series_id)
                .await?;
        }

        debug!("book access allowed");
        Ok(())
    }

    /// Checks access to a book known only by its ID.
    ///
    /// Resolves the book's library through the index unless the principal
    /// may access every library, and its series only when restriction rules
    /// are present. An unresolvable book surfaces as not-found, never as a
    /// generic denial.
    ///
    /// # Errors
    ///
    /// Returns `BookNotFound` when the book does not resolve, plus the same
    /// errors as [`check_book`](Self::check_book).
    #[instrument(skip(self, permissions), fields(user_id = %permissions.user_id(), book_id = %book_id))]
    pub async fn check_book_id(
        &self,
        permissions: &PermissionSet,
        book_id: BookId,
    ) -> Result<(), GateError> {
        if !permissions.can_access_all_libraries() {
            let library_id = self
                .books
                .library_id_of(book_id)
                .await
                .map_err(lookup_failed)?
                .ok_or(GateError::BookNotFound { book_id })?;

            if !permissions.can_access_library(library_id) {
                return Err(GateError::LibraryForbidden { library_id }.into());
            }
        }

        if permissions.has_restrictions() {
            let series_id = self
                .books
                .series_id_of(book_id)
                .await
                .map_err(lookup_failed)?
                .ok_or(GateError::BookNotFound { book_id })?;

            self.check_series_restrictions(permissions, series_id)
                .await?;
        }

        debug!("book access allowed");
        Ok(())
    }

    /// Checks access to a series whose metadata is already in hand.
    ///
    /// Denies unless the principal may access the series' library and every
    /// restriction rule admits the series' metadata. No lookups are
    /// performed.
    ///
    /// # Errors
    ///
    /// Returns `LibraryForbidden` or `ContentForbidden` on denial.
    #[instrument(skip(self, permissions, series), fields(user_id = %permissions.user_id(), series_id = %series.id))]
    pub async fn check_series(
        &self,
        permissions: &PermissionSet,
        series: &SeriesRef,
    ) -> Result<(), GateError> {
        if !permissions.can_access_library(series.library_id) {
            return Err(GateError::LibraryForbidden {
                library_id: series.library_id,
            }
            .into());
        }

        if !permissions.is_content_allowed(series.age_rating, &series.sharing_labels) {
            return Err(GateError::ContentForbidden {
                series_id: series.id,
            }
            .into());
        }

        debug!("series access allowed");
        Ok(())
    }

    async fn check_series_restrictions(
        &self,
        permissions: &PermissionSet,
        series_id: SeriesId,
    ) -> Result<(), GateError> {
        let facts = self
            .metadata
            .restriction_facts(series_id)
            .await
            .map_err(lookup_failed)?
            .ok_or(GateError::SeriesNotFound { series_id })?;

        if !permissions.is_content_allowed(facts.age_rating, &facts.sharing_labels) {
            return Err(GateError::ContentForbidden { series_id }.into());
        }
        Ok(())
    }
}

fn lookup_failed(err: LookupError) -> GateError {
    GateError::LookupFailed {
        details: err.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metadata::RestrictionFacts;
    use folio_access::{
        AgeThreshold, AllowExclude, ContentRestriction, LibraryScope, Role, RoleSet, User,
    };
    use std::collections::HashMap;

    /// In-memory catalog backing both collaborator traits.
    #[derive(Default)]
    struct FakeCatalog {
        books: HashMap<BookId, (LibraryId, SeriesId)>,
        series: HashMap<SeriesId, RestrictionFacts>,
        fail_lookups: bool,
    }

    #[async_trait::async_trait]
    impl SeriesMetadataSource for FakeCatalog {
        async fn restriction_facts(
            &self,
            series_id: SeriesId,
        ) -> std::result::Result<Option<RestrictionFacts>, LookupError> {
            if self.fail_lookups {
                return Err(LookupError::new("metadata store unavailable"));
            }
            Ok(self.series.get(&series_id).cloned())
        }
    }

    #[async_trait::async_trait]
    impl BookIndex for FakeCatalog {
        async fn library_id_of(
            &self,
            book_id: BookId,
        ) -> std::result::Result<Option<LibraryId>, LookupError> {
            if self.fail_lookups {
                return Err(LookupError::new("index unavailable"));
            }
            Ok(self.books.get(&book_id).map(|(library_id, _)| *library_id))
        }

        async fn series_id_of(
            &self,
            book_id: BookId,
        ) -> std::result::Result<Option<SeriesId>, LookupError> {
            if self.fail_lookups {
                return Err(LookupError::new("index unavailable"));
            }
            Ok(self.books.get(&book_id).map(|(_, series_id)| *series_id))
        }
    }

    struct Fixture {
        gate: ContentGate,
        library_id: LibraryId,
        series_id: SeriesId,
        book_id: BookId,
    }

    fn fixture(facts: RestrictionFacts, fail_lookups: bool) -> Fixture {
        let library_id = LibraryId::new();
        let series_id = SeriesId::new();
        let book_id = BookId::new();

        let mut catalog = FakeCatalog {
            fail_lookups,
            ..FakeCatalog::default()
        };
        catalog.books.insert(book_id, (library_id, series_id));
        catalog.series.insert(series_id, facts);

        let catalog = Arc::new(catalog);
        Fixture {
            gate: ContentGate::new(catalog.clone(), catalog),
            library_id,
            series_id,
            book_id,
        }
    }

    fn teen_facts() -> RestrictionFacts {
        RestrictionFacts {
            age_rating: Some(12),
            sharing_labels: ["teen".to_string()].into_iter().collect(),
        }
    }

    fn permissions_for(user: &User) -> PermissionSet {
        PermissionSet::from_user(user)
    }

    fn denial_message(result: Result<(), GateError>) -> String {
        result.expect_err("expected denial").to_string()
    }

    #[tokio::test]
    async fn unrestricted_user_passes_book_check_without_metadata_fetch() {
        let fx = fixture(teen_facts(), true); // lookups would fail if attempted
        let user = User::new("alice@example.org");
        let book = BookRef {
            id: fx.book_id,
            library_id: fx.library_id,
            series_id: fx.series_id,
        };

        let result = fx.gate.check_book(&permissions_for(&user), &book).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn book_in_unshared_library_is_forbidden() {
        let fx = fixture(teen_facts(), false);
        let user = User::new("bob@example.org")
            .with_library_scope(LibraryScope::restricted([LibraryId::new()]));
        let book = BookRef {
            id: fx.book_id,
            library_id: fx.library_id,
            series_id: fx.series_id,
        };

        let msg = denial_message(fx.gate.check_book(&permissions_for(&user), &book).await);

        assert!(msg.contains("access denied to library"));
        assert!(msg.contains(&fx.library_id.to_string()));
    }

    #[tokio::test]
    async fn restricted_content_is_forbidden() {
        let fx = fixture(teen_facts(), false);
        let user = User::new("kid@example.org").with_restriction(
            ContentRestriction::none()
                .with_age_threshold(AgeThreshold::new(10, AllowExclude::AllowOnly)),
        );
        let book = BookRef {
            id: fx.book_id,
            library_id: fx.library_id,
            series_id: fx.series_id,
        };

        let msg = denial_message(fx.gate.check_book(&permissions_for(&user), &book).await);

        assert!(msg.contains("content restriction denies series"));
        assert!(msg.contains(&fx.series_id.to_string()));
    }

    #[tokio::test]
    async fn admitted_content_passes_restriction_check() {
        let fx = fixture(teen_facts(), false);
        let user = User::new("teen@example.org")
            .with_restriction(ContentRestriction::none().with_labels_allow(["teen"]));
        let book = BookRef {
            id: fx.book_id,
            library_id: fx.library_id,
            series_id: fx.series_id,
        };

        let result = fx.gate.check_book(&permissions_for(&user), &book).await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn missing_series_metadata_surfaces_not_found() {
        let fx = fixture(teen_facts(), false);
        let user = User::new("kid@example.org")
            .with_restriction(ContentRestriction::none().with_labels_allow(["teen"]));
        let unknown_series = SeriesId::new();
        let book = BookRef {
            id: fx.book_id,
            library_id: fx.library_id,
            series_id: unknown_series,
        };

        let msg = denial_message(fx.gate.check_book(&permissions_for(&user), &book).await);

        assert!(msg.contains("not found"));
        assert!(msg.contains(&unknown_series.to_string()));
        assert!(!msg.contains("access denied"));
    }

    #[tokio::test]
    async fn unknown_book_id_surfaces_not_found() {
        let fx = fixture(teen_facts(), false);
        let user = User::new("bob@example.org")
            .with_library_scope(LibraryScope::restricted([fx.library_id]));
        let unknown_book = BookId::new();

        let msg = denial_message(
            fx.gate
                .check_book_id(&permissions_for(&user), unknown_book)
                .await,
        );

        assert!(msg.contains("not found"));
        assert!(msg.contains(&unknown_book.to_string()));
    }

    #[tokio::test]
    async fn book_id_check_skips_library_resolution_for_admin() {
        let fx = fixture(teen_facts(), true); // index would fail if consulted
        let user = User::new("admin@example.org").with_roles(RoleSet::new([Role::Admin]));

        let result = fx
            .gate
            .check_book_id(&permissions_for(&user), fx.book_id)
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn book_id_check_enforces_library_scope() {
        let fx = fixture(teen_facts(), false);
        let user = User::new("bob@example.org")
            .with_library_scope(LibraryScope::restricted([LibraryId::new()]));

        let msg = denial_message(
            fx.gate
                .check_book_id(&permissions_for(&user), fx.book_id)
                .await,
        );

        assert!(msg.contains("access denied to library"));
        assert!(msg.contains(&fx.library_id.to_string()));
    }

    #[tokio::test]
    async fn book_id_check_evaluates_restrictions() {
        let fx = fixture(teen_facts(), false);
        let user = User::new("kid@example.org").with_restriction(
            ContentRestriction::none()
                .with_age_threshold(AgeThreshold::new(10, AllowExclude::AllowOnly)),
        );

        let msg = denial_message(
            fx.gate
                .check_book_id(&permissions_for(&user), fx.book_id)
                .await,
        );

        assert!(msg.contains("content restriction denies series"));
        assert!(msg.contains(&fx.series_id.to_string()));
    }

    #[tokio::test]
    async fn lookup_failure_is_an_error_not_a_denial() {
        let fx = fixture(teen_facts(), true);
        let user = User::new("kid@example.org")
            .with_restriction(ContentRestriction::none().with_labels_allow(["teen"]));
        let book = BookRef {
            id: fx.book_id,
            library_id: fx.library_id,
            series_id: fx.series_id,
        };

        let msg = denial_message(fx.gate.check_book(&permissions_for(&user), &book).await);

        assert!(msg.contains("metadata lookup failed"));
        assert!(!msg.contains("access denied"));
        assert!(!msg.contains("not found"));
    }

    #[tokio::test]
    async fn series_check_uses_inline_metadata() {
        let fx = fixture(RestrictionFacts::default(), true); // no lookups expected
        let user = User::new("kid@example.org").with_restriction(
            ContentRestriction::none()
                .with_age_threshold(AgeThreshold::new(10, AllowExclude::AllowOnly)),
        );

        let allowed = SeriesRef {
            id: fx.series_id,
            library_id: fx.library_id,
            age_rating: Some(8),
            sharing_labels: BTreeSet::new(),
        };
        let denied = SeriesRef {
            age_rating: Some(16),
            ..allowed.clone()
        };

        let perms = permissions_for(&user);
        assert!(fx.gate.check_series(&perms, &allowed).await.is_ok());

        let msg = denial_message(fx.gate.check_series(&perms, &denied).await);
        assert!(msg.contains("content restriction denies series"));
        assert!(msg.contains(&fx.series_id.to_string()));
    }

    #[tokio::test]
    async fn series_check_enforces_library_scope() {
        let fx = fixture(RestrictionFacts::default(), false);
        let user = User::new("bob@example.org")
            .with_library_scope(LibraryScope::restricted([LibraryId::new()]));
        let series = SeriesRef {
            id: fx.series_id,
            library_id: fx.library_id,
            age_rating: None,
            sharing_labels: BTreeSet::new(),
        };

        let msg = denial_message(fx.gate.check_series(&permissions_for(&user), &series).await);

        assert!(msg.contains("access denied to library"));
        assert!(msg.contains(&fx.library_id.to_string()));
    }
}
