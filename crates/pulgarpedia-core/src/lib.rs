//! # Pulgarpedia Core
//!
//! Runtime-agnostic logic for the Pulgarpedia catalog: data model,
//! integrity validation, accent-insensitive search, category filtering,
//! pagination, and the content store state machine.
//!
//! This crate performs no I/O of its own. The content store talks to the
//! outside world only through the [`store::ContentSource`] trait, which the
//! application crate implements over HTTP.

pub mod error;
pub mod filter;
pub mod models;
pub mod normalize;
pub mod pagination;
pub mod related;
pub mod stats;
pub mod store;
pub mod validate;

pub use error::ContentError;
pub use filter::{FilterEngine, FilteredPlaces, Filters, ALL_CATEGORIES};
pub use models::{Catalog, Category, Place};
pub use pagination::Pagination;
pub use store::{ContentSource, ContentState, ContentStore, LoadStatus};
pub use validate::IntegrityMode;
