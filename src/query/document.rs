//! JSON documents describing query trees.
//!
//! A document is either one query object or an array of them. Each object is
//! tagged by `"type"` with the PQL call name:
//!
//! ```json
//! {"type": "TopN", "frame": "stargazer", "n": 5,
//!  "filter": {"type": "Bitmap", "id": 1, "frame": "stargazer"},
//!  "field": "language", "values": ["rust", "go"]}
//! ```
//!
//! Documents are validated through the same constructors as hand-built
//! queries, so every invariant of [`Query`] holds for parsed trees.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

use crate::error::PqlError;
use crate::query::{
    coerce::IntoInteger, AttrValue, Attrs, Query, QueryBatch, QueryKind, Timestamp,
};

/// Failures while turning a JSON document into queries.
#[derive(Debug, Error)]
pub enum DocumentError {
    /// The text is not a well-formed query document.
    #[error("invalid query document: {0}")]
    Json(#[from] serde_json::Error),
    /// The document describes a query that fails validation.
    #[error(transparent)]
    Query(#[from] PqlError),
}

/// Integer field as it may appear in a document: number or numeric string.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum IntLiteral {
    /// JSON integer.
    Int(i64),
    /// JSON float, truncated toward zero.
    Float(f64),
    /// Numeric string.
    Text(String),
}

impl IntoInteger for IntLiteral {
    fn into_integer(self) -> Result<i64, String> {
        match self {
            IntLiteral::Int(v) => Ok(v),
            IntLiteral::Float(v) => v.into_integer(),
            IntLiteral::Text(v) => v.into_integer(),
        }
    }
}

/// One query object in a document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", deny_unknown_fields)]
pub enum QueryDocument {
    /// `SetBit`.
    SetBit {
        /// Bitmap id.
        id: IntLiteral,
        /// Frame name.
        frame: String,
        /// Profile id.
        #[serde(alias = "profileID")]
        profile_id: IntLiteral,
    },
    /// `ClearBit`.
    ClearBit {
        /// Bitmap id.
        id: IntLiteral,
        /// Frame name.
        frame: String,
        /// Profile id.
        #[serde(alias = "profileID")]
        profile_id: IntLiteral,
    },
    /// `SetBitmapAttrs`.
    SetBitmapAttrs {
        /// Bitmap id.
        id: IntLiteral,
        /// Frame name.
        frame: String,
        /// Attributes, kept in document order.
        #[serde(default)]
        attrs: Attrs,
    },
    /// `SetProfileAttrs`.
    SetProfileAttrs {
        /// Profile id.
        id: IntLiteral,
        /// Attributes, kept in document order.
        #[serde(default)]
        attrs: Attrs,
    },
    /// `Bitmap`.
    Bitmap {
        /// Bitmap id.
        id: IntLiteral,
        /// Frame name.
        frame: String,
    },
    /// `Union`.
    Union {
        /// Child queries.
        #[serde(default)]
        inputs: Vec<QueryDocument>,
    },
    /// `Intersect`.
    Intersect {
        /// Child queries.
        #[serde(default)]
        inputs: Vec<QueryDocument>,
    },
    /// `Difference`.
    Difference {
        /// Child queries.
        #[serde(default)]
        inputs: Vec<QueryDocument>,
    },
    /// `Count`.
    Count {
        /// Child queries.
        #[serde(default)]
        inputs: Vec<QueryDocument>,
    },
    /// `Range`.
    Range {
        /// Bitmap id.
        id: IntLiteral,
        /// Frame name.
        frame: String,
        /// ISO-8601 start.
        start: Timestamp,
        /// ISO-8601 end.
        end: Timestamp,
    },
    /// `TopN`.
    TopN {
        /// Optional comparison filter.
        #[serde(default)]
        filter: Option<Box<QueryDocument>>,
        /// Frame name.
        frame: String,
        /// Result count.
        #[serde(default)]
        n: Option<IntLiteral>,
        /// Filter attribute name.
        #[serde(default)]
        field: Option<String>,
        /// Accepted filter values.
        #[serde(default)]
        values: Vec<AttrValue>,
    },
}

impl QueryDocument {
    /// Validates the document and builds the query tree.
    pub fn into_query(self) -> Result<Query, PqlError> {
        match self {
            QueryDocument::SetBit {
                id,
                frame,
                profile_id,
            } => Query::set_bit(id, frame, profile_id),
            QueryDocument::ClearBit {
                id,
                frame,
                profile_id,
            } => Query::clear_bit(id, frame, profile_id),
            QueryDocument::SetBitmapAttrs { id, frame, attrs } => {
                Query::set_bitmap_attrs(id, frame, attrs)
            }
            QueryDocument::SetProfileAttrs { id, attrs } => Query::set_profile_attrs(id, attrs),
            QueryDocument::Bitmap { id, frame } => Query::bitmap(id, frame),
            QueryDocument::Union { inputs } => composite(QueryKind::Union, inputs),
            QueryDocument::Intersect { inputs } => composite(QueryKind::Intersect, inputs),
            QueryDocument::Difference { inputs } => composite(QueryKind::Difference, inputs),
            QueryDocument::Count { inputs } => composite(QueryKind::Count, inputs),
            QueryDocument::Range {
                id,
                frame,
                start,
                end,
            } => Query::range(id, frame, start, end),
            QueryDocument::TopN {
                filter,
                frame,
                n,
                field,
                values,
            } => {
                let filter = filter.map(|doc| (*doc).into_query()).transpose()?;
                let mut builder = Query::top_n(frame).maybe_filter(filter);
                if let Some(n) = n {
                    builder = builder.n(n);
                }
                match field {
                    Some(field) => builder = builder.field(field, values),
                    None if !values.is_empty() => {
                        return Err(PqlError::MissingFilterField {
                            query: QueryKind::TopN.name(),
                        })
                    }
                    None => {}
                }
                builder.build()
            }
        }
    }
}

impl TryFrom<QueryDocument> for Query {
    type Error = PqlError;

    fn try_from(doc: QueryDocument) -> Result<Self, Self::Error> {
        doc.into_query()
    }
}

fn composite(kind: QueryKind, inputs: Vec<QueryDocument>) -> Result<Query, PqlError> {
    let inputs = inputs
        .into_iter()
        .map(QueryDocument::into_query)
        .collect::<Result<Vec<_>, _>>()?;
    Query::composite(kind, inputs)
}

/// Parses a document holding one query object or an array of them.
pub fn parse_documents(json: &str) -> Result<QueryBatch, DocumentError> {
    let docs = if json.trim_start().starts_with('[') {
        serde_json::from_str::<Vec<QueryDocument>>(json)?
    } else {
        vec![serde_json::from_str::<QueryDocument>(json)?]
    };
    let batch = docs
        .into_iter()
        .map(QueryDocument::into_query)
        .collect::<Result<QueryBatch, _>>()?;
    debug!(
        queries = batch.len(),
        write = batch.is_write(),
        "parsed query document"
    );
    Ok(batch)
}
