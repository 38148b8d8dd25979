//! Client-side builder for PQL, the query language of the Pilosa bitmap index.
//!
//! The crate only produces query text and a read/write classification; sending
//! the text and decoding responses belongs to the transport.
//!
//! ```
//! use pilosa_pql::Query;
//!
//! let top = Query::top_n("stargazer")
//!     .filter(Query::bitmap(1, "stargazer")?)
//!     .n(5)
//!     .field("language", ["rust", "go"])
//!     .build()?;
//! assert_eq!(
//!     top.to_pql(),
//!     r#"TopN(Bitmap(id=1, frame="stargazer"), frame="stargazer", n=5, field="language", ["rust","go"])"#
//! );
//! assert!(!top.is_write());
//! # Ok::<(), pilosa_pql::PqlError>(())
//! ```

#![warn(missing_docs)]

pub mod error;
pub mod query;

pub use error::{PqlError, Result};
pub use query::{AttrValue, Attrs, Query, QueryBatch, QueryKind, Timestamp};
