//! Core domain types and utilities for the folio content server.
//!
//! This crate provides the foundational ID types, error handling, and shared
//! utilities used throughout folio.

pub mod error;
pub mod id;

pub use error::Result;
pub use id::{ApiKeyId, BookId, LibraryId, SeriesId, UserId};
