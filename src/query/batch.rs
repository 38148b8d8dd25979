//! Several calls sent to the server in one request body.

use tracing::trace;

use crate::query::Query;

/// Ordered group of queries rendered into a single request.
///
/// The batch is a write when any member is a write, so a transport routes the
/// whole request accordingly.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct QueryBatch {
    queries: Vec<Query>,
}

impl QueryBatch {
    /// Creates an empty batch.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a query.
    pub fn push(&mut self, query: Query) -> &mut Self {
        self.queries.push(query);
        self
    }

    /// Builder-style [`QueryBatch::push`].
    pub fn with(mut self, query: Query) -> Self {
        self.queries.push(query);
        self
    }

    /// Number of queries.
    pub fn len(&self) -> usize {
        self.queries.len()
    }

    /// Returns `true` when the batch holds no query.
    pub fn is_empty(&self) -> bool {
        self.queries.is_empty()
    }

    /// Iterates queries in insertion order.
    pub fn iter(&self) -> std::slice::Iter<'_, Query> {
        self.queries.iter()
    }

    /// Whether any query in the batch mutates server state.
    pub fn is_write(&self) -> bool {
        self.queries.iter().any(Query::is_write)
    }

    /// Renders every query, one per line.
    pub fn to_pql(&self) -> String {
        let pql = self
            .queries
            .iter()
            .map(Query::to_pql)
            .collect::<Vec<_>>()
            .join("\n");
        trace!(
            queries = self.queries.len(),
            write = self.is_write(),
            bytes = pql.len(),
            "rendered query batch"
        );
        pql
    }
}

impl FromIterator<Query> for QueryBatch {
    fn from_iter<I: IntoIterator<Item = Query>>(iter: I) -> Self {
        Self {
            queries: iter.into_iter().collect(),
        }
    }
}

impl From<Query> for QueryBatch {
    fn from(query: Query) -> Self {
        Self {
            queries: vec![query],
        }
    }
}

impl IntoIterator for QueryBatch {
    type Item = Query;
    type IntoIter = std::vec::IntoIter<Query>;

    fn into_iter(self) -> Self::IntoIter {
        self.queries.into_iter()
    }
}

impl<'a> IntoIterator for &'a QueryBatch {
    type Item = &'a Query;
    type IntoIter = std::slice::Iter<'a, Query>;

    fn into_iter(self) -> Self::IntoIter {
        self.queries.iter()
    }
}
