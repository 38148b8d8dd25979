#![forbid(unsafe_code)]

//! PQL query construction.
//!
//! Queries are built through the constructors on [`Query`], validated once,
//! and rendered with [`Query::to_pql`]. Transports inspect
//! [`Query::is_write`] to choose request semantics.

/// Query tree and per-kind properties.
pub mod ast;

/// Ordered attribute maps.
pub mod attrs;

/// Several queries rendered into one request.
pub mod batch;

/// Fluent builders for calls with optional arguments.
pub mod builder;

/// Integer coercion for id-like fields.
pub mod coerce;

/// JSON query documents.
pub mod document;

/// PQL text rendering.
pub mod render;

/// Scalar values and timestamps.
pub mod value;

pub use ast::{Query, QueryKind};
pub use attrs::Attrs;
pub use batch::QueryBatch;
pub use builder::TopNBuilder;
pub use coerce::IntoInteger;
pub use document::{parse_documents, DocumentError, QueryDocument};
pub use value::{AttrValue, Timestamp};
