//! Course syllabus extraction core.
//!
//! This library turns an online course's syllabus into a normalized
//! Module → Lesson → Item tree, extracts the downloadable resource links of
//! every item, and records the catalog in `SQLite` so re-runs converge on the
//! same rows.
//!
//! # Architecture
//!
//! - [`syllabus`] - schema adapters for the three syllabus shapes and the normalizer
//! - [`extract`] - content-type dispatch to per-type link extraction
//! - [`catalog`] - idempotent get-or-create persistence with self-healing schema
//! - [`orchestrator`] - sequential course run returning `(error_occurred, tree)`
//! - [`platform`] - JSON transport seam and URL builders for the platform API
//! - [`db`] - database connection and schema management

// Clippy lints - strict for library code
#![deny(clippy::unwrap_used)]
#![deny(clippy::expect_used)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod catalog;
pub mod config;
pub mod db;
pub mod extract;
pub mod filename;
pub mod orchestrator;
pub mod platform;
pub mod syllabus;
mod user_agent;

// Re-export commonly used types
pub use catalog::{CatalogDbErrorKind, CatalogError, CatalogRepository, CatalogStore, EntityKind};
pub use config::ExtractionPolicy;
pub use db::{Database, DbError};
pub use extract::{ContentType, ExtractError, ExtractOutcome, LinkExtractor, LinkMap};
pub use filename::clean_filename;
pub use orchestrator::{CourseExtractor, CourseTree, RESOURCES_MODULE, RunError};
pub use platform::{Endpoints, HttpTransport, PlatformTransport, TransportError};
pub use syllabus::{CanonicalTree, ItemIndex, SchemaVariant, SyllabusError, adapt, normalize};
