//! Fluent construction for calls with optional arguments.

use crate::error::{PqlError, Result};
use crate::query::{
    ast::{coerce, Query, QueryKind, TopN},
    coerce::IntoInteger,
    AttrValue,
};

/// Builder for [`TopN`] queries, started with [`Query::top_n`].
///
/// Coercion failures are remembered and surfaced by [`TopNBuilder::build`], so
/// calls can be chained without intermediate `?`.
#[derive(Debug)]
pub struct TopNBuilder {
    top_n: TopN,
    error: Option<PqlError>,
}

impl TopNBuilder {
    /// Creates a builder ranking every bitmap in `frame`.
    pub fn new<F>(frame: F) -> Self
    where
        F: Into<String>,
    {
        Self {
            top_n: TopN {
                filter: None,
                frame: frame.into(),
                n: None,
                filter_field: None,
                filter_values: Vec::new(),
            },
            error: None,
        }
    }

    /// Restricts ranking to bitmaps compared against `query`.
    pub fn filter(mut self, query: Query) -> Self {
        self.top_n.filter = Some(Box::new(query));
        self
    }

    /// Sets the filter from an optional query; `None` clears it.
    pub fn maybe_filter(mut self, query: Option<Query>) -> Self {
        self.top_n.filter = query.map(Box::new);
        self
    }

    /// Number of results to return.
    pub fn n<N>(mut self, n: N) -> Self
    where
        N: IntoInteger,
    {
        if self.error.is_some() {
            return self;
        }
        match coerce(n, QueryKind::TopN, "n") {
            Ok(n) => self.top_n.n = Some(n),
            Err(err) => self.error = Some(err),
        }
        self
    }

    /// Only consider bitmaps whose `field` attribute is one of `values`.
    pub fn field<F, I, V>(mut self, field: F, values: I) -> Self
    where
        F: Into<String>,
        I: IntoIterator<Item = V>,
        V: Into<AttrValue>,
    {
        self.top_n.filter_field = Some(field.into());
        self.top_n.filter_values = values.into_iter().map(Into::into).collect();
        self
    }

    /// Finishes the query.
    pub fn build(self) -> Result<Query> {
        if let Some(err) = self.error {
            return Err(err);
        }
        Ok(Query::TopN(self.top_n))
    }
}
