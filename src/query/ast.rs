//! Query tree: the closed set of PQL calls this crate can produce.
//!
//! Every node is validated when it is constructed and is immutable afterwards,
//! so rendering (see [`crate::query::render`]) never fails. Composite nodes own
//! their children by value.

use crate::error::{PqlError, Result};

use super::attrs::Attrs;
use super::builder::TopNBuilder;
use super::coerce::IntoInteger;
use super::value::{AttrValue, Timestamp};

/// Discriminant of a [`Query`] carrying the static per-variant properties.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum QueryKind {
    /// `SetBit(id=, frame=, profileID=)`.
    SetBit,
    /// `ClearBit(id=, frame=, profileID=)`.
    ClearBit,
    /// `SetBitmapAttrs(id=, frame=, attrs...)`.
    SetBitmapAttrs,
    /// `SetProfileAttrs(id=, attrs...)`.
    SetProfileAttrs,
    /// `Bitmap(id=, frame=)`.
    Bitmap,
    /// Union of any number of inputs.
    Union,
    /// Intersection of any number of inputs.
    Intersect,
    /// Difference of at most two inputs.
    Difference,
    /// Count of at most one input.
    Count,
    /// Time-bounded bitmap view.
    Range,
    /// Ranked bitmaps within a frame.
    TopN,
}

impl QueryKind {
    /// Every kind, in declaration order.
    pub const ALL: [QueryKind; 11] = [
        QueryKind::SetBit,
        QueryKind::ClearBit,
        QueryKind::SetBitmapAttrs,
        QueryKind::SetProfileAttrs,
        QueryKind::Bitmap,
        QueryKind::Union,
        QueryKind::Intersect,
        QueryKind::Difference,
        QueryKind::Count,
        QueryKind::Range,
        QueryKind::TopN,
    ];

    /// PQL call name.
    pub const fn name(self) -> &'static str {
        match self {
            QueryKind::SetBit => "SetBit",
            QueryKind::ClearBit => "ClearBit",
            QueryKind::SetBitmapAttrs => "SetBitmapAttrs",
            QueryKind::SetProfileAttrs => "SetProfileAttrs",
            QueryKind::Bitmap => "Bitmap",
            QueryKind::Union => "Union",
            QueryKind::Intersect => "Intersect",
            QueryKind::Difference => "Difference",
            QueryKind::Count => "Count",
            QueryKind::Range => "Range",
            QueryKind::TopN => "TopN",
        }
    }

    /// Whether the call mutates server state.
    ///
    /// Nothing in this crate acts on the flag; transports use it to pick the
    /// write or read path.
    pub const fn is_write(self) -> bool {
        matches!(
            self,
            QueryKind::SetBit
                | QueryKind::ClearBit
                | QueryKind::SetBitmapAttrs
                | QueryKind::SetProfileAttrs
        )
    }

    /// Whether the call is built from child queries.
    pub const fn is_composite(self) -> bool {
        matches!(
            self,
            QueryKind::Union | QueryKind::Intersect | QueryKind::Difference | QueryKind::Count
        )
    }

    /// Maximum number of child queries, `None` when unlimited.
    pub const fn input_limit(self) -> Option<usize> {
        match self {
            QueryKind::Difference => Some(2),
            QueryKind::Count => Some(1),
            _ => None,
        }
    }
}

/// A single PQL call.
#[derive(Clone, Debug, PartialEq)]
pub enum Query {
    /// Sets one bit.
    SetBit(BitOp),
    /// Clears one bit.
    ClearBit(BitOp),
    /// Sets attributes on a bitmap.
    SetBitmapAttrs(SetBitmapAttrs),
    /// Sets attributes on a profile.
    SetProfileAttrs(SetProfileAttrs),
    /// References a bitmap.
    Bitmap(Bitmap),
    /// Union of the inputs.
    Union(Composite),
    /// Intersection of the inputs.
    Intersect(Composite),
    /// Difference of the inputs.
    Difference(Composite),
    /// Bit count of the input.
    Count(Composite),
    /// Time-bounded bitmap.
    Range(Range),
    /// Ranked bitmaps.
    TopN(TopN),
}

/// Payload of `SetBit` and `ClearBit`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BitOp {
    /// Bitmap (row) id.
    pub id: i64,
    /// Frame holding the bitmap.
    pub frame: String,
    /// Profile (column) id.
    pub profile_id: i64,
}

/// Payload of `SetBitmapAttrs`. `attrs` is never empty.
#[derive(Clone, Debug, PartialEq)]
pub struct SetBitmapAttrs {
    /// Bitmap id.
    pub id: i64,
    /// Frame holding the bitmap.
    pub frame: String,
    pub(crate) attrs: Attrs,
}

impl SetBitmapAttrs {
    /// Attributes in the order they were supplied.
    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }
}

/// Payload of `SetProfileAttrs`. `attrs` is never empty.
#[derive(Clone, Debug, PartialEq)]
pub struct SetProfileAttrs {
    /// Profile id.
    pub id: i64,
    pub(crate) attrs: Attrs,
}

impl SetProfileAttrs {
    /// Attributes in the order they were supplied.
    pub fn attrs(&self) -> &Attrs {
        &self.attrs
    }
}

/// Payload of `Bitmap`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Bitmap {
    /// Bitmap id.
    pub id: i64,
    /// Frame holding the bitmap.
    pub frame: String,
}

/// Children of a set-algebra call.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Composite {
    pub(crate) inputs: Vec<Query>,
}

impl Composite {
    /// Child queries in the order they were supplied.
    pub fn inputs(&self) -> &[Query] {
        &self.inputs
    }
}

/// Payload of `Range`.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Range {
    /// Bitmap id.
    pub id: i64,
    /// Frame holding the bitmap.
    pub frame: String,
    /// Inclusive start.
    pub start: Timestamp,
    /// Exclusive end.
    pub end: Timestamp,
}

/// Payload of `TopN`.
#[derive(Clone, Debug, PartialEq)]
pub struct TopN {
    /// Comparison filter; `None` considers every bitmap in the frame.
    pub filter: Option<Box<Query>>,
    /// Frame to rank.
    pub frame: String,
    /// Number of results; absent or zero leaves the server default.
    pub n: Option<i64>,
    /// Attribute field used to restrict candidate bitmaps.
    pub filter_field: Option<String>,
    /// Accepted values of `filter_field`.
    pub filter_values: Vec<AttrValue>,
}

pub(crate) fn coerce<T: IntoInteger>(value: T, kind: QueryKind, field: &'static str) -> Result<i64> {
    value
        .into_integer()
        .map_err(|value| PqlError::NotAnInteger {
            query: kind.name(),
            field,
            value,
        })
}

impl Query {
    /// `SetBit(id=, frame=, profileID=)`.
    pub fn set_bit<I, F, P>(id: I, frame: F, profile_id: P) -> Result<Query>
    where
        I: IntoInteger,
        F: Into<String>,
        P: IntoInteger,
    {
        let op = BitOp::new(QueryKind::SetBit, id, frame, profile_id)?;
        Ok(Query::SetBit(op))
    }

    /// `ClearBit(id=, frame=, profileID=)`.
    pub fn clear_bit<I, F, P>(id: I, frame: F, profile_id: P) -> Result<Query>
    where
        I: IntoInteger,
        F: Into<String>,
        P: IntoInteger,
    {
        let op = BitOp::new(QueryKind::ClearBit, id, frame, profile_id)?;
        Ok(Query::ClearBit(op))
    }

    /// `SetBitmapAttrs(id=, frame=, k=v, ...)`; fails when `attrs` is empty.
    pub fn set_bitmap_attrs<I, F, A>(id: I, frame: F, attrs: A) -> Result<Query>
    where
        I: IntoInteger,
        F: Into<String>,
        A: Into<Attrs>,
    {
        let kind = QueryKind::SetBitmapAttrs;
        let id = coerce(id, kind, "id")?;
        let attrs = checked_attrs(kind, attrs.into())?;
        Ok(Query::SetBitmapAttrs(SetBitmapAttrs {
            id,
            frame: frame.into(),
            attrs,
        }))
    }

    /// `SetProfileAttrs(id=, k=v, ...)`; fails when `attrs` is empty.
    pub fn set_profile_attrs<I, A>(id: I, attrs: A) -> Result<Query>
    where
        I: IntoInteger,
        A: Into<Attrs>,
    {
        let kind = QueryKind::SetProfileAttrs;
        let id = coerce(id, kind, "id")?;
        let attrs = checked_attrs(kind, attrs.into())?;
        Ok(Query::SetProfileAttrs(SetProfileAttrs { id, attrs }))
    }

    /// `Bitmap(id=, frame=)`.
    pub fn bitmap<I, F>(id: I, frame: F) -> Result<Query>
    where
        I: IntoInteger,
        F: Into<String>,
    {
        let id = coerce(id, QueryKind::Bitmap, "id")?;
        Ok(Query::Bitmap(Bitmap {
            id,
            frame: frame.into(),
        }))
    }

    /// Union of any number of inputs.
    pub fn union<Q>(inputs: Q) -> Query
    where
        Q: IntoIterator<Item = Query>,
    {
        Query::Union(Composite {
            inputs: inputs.into_iter().collect(),
        })
    }

    /// Intersection of any number of inputs.
    pub fn intersect<Q>(inputs: Q) -> Query
    where
        Q: IntoIterator<Item = Query>,
    {
        Query::Intersect(Composite {
            inputs: inputs.into_iter().collect(),
        })
    }

    /// Difference of up to two inputs.
    pub fn difference<Q>(inputs: Q) -> Result<Query>
    where
        Q: IntoIterator<Item = Query>,
    {
        Query::composite(QueryKind::Difference, inputs)
    }

    /// Count of up to one input.
    pub fn count<Q>(inputs: Q) -> Result<Query>
    where
        Q: IntoIterator<Item = Query>,
    {
        Query::composite(QueryKind::Count, inputs)
    }

    /// Builds any composite kind, enforcing its input limit.
    pub fn composite<Q>(kind: QueryKind, inputs: Q) -> Result<Query>
    where
        Q: IntoIterator<Item = Query>,
    {
        let inputs: Vec<Query> = inputs.into_iter().collect();
        if let Some(limit) = kind.input_limit() {
            if inputs.len() > limit {
                return Err(PqlError::InputLimitExceeded {
                    query: kind.name(),
                    count: inputs.len(),
                    limit,
                });
            }
        }
        let composite = Composite { inputs };
        match kind {
            QueryKind::Union => Ok(Query::Union(composite)),
            QueryKind::Intersect => Ok(Query::Intersect(composite)),
            QueryKind::Difference => Ok(Query::Difference(composite)),
            QueryKind::Count => Ok(Query::Count(composite)),
            other => Err(PqlError::NotComposite {
                query: other.name(),
            }),
        }
    }

    /// `Range(id=, frame=, start=, end=)`.
    pub fn range<I, F, S, E>(id: I, frame: F, start: S, end: E) -> Result<Query>
    where
        I: IntoInteger,
        F: Into<String>,
        S: Into<Timestamp>,
        E: Into<Timestamp>,
    {
        let id = coerce(id, QueryKind::Range, "id")?;
        Ok(Query::Range(Range {
            id,
            frame: frame.into(),
            start: start.into(),
            end: end.into(),
        }))
    }

    /// Starts a `TopN` over `frame`; optional arguments are set on the builder.
    pub fn top_n<F>(frame: F) -> TopNBuilder
    where
        F: Into<String>,
    {
        TopNBuilder::new(frame)
    }

    /// Discriminant of this node.
    pub fn kind(&self) -> QueryKind {
        match self {
            Query::SetBit(_) => QueryKind::SetBit,
            Query::ClearBit(_) => QueryKind::ClearBit,
            Query::SetBitmapAttrs(_) => QueryKind::SetBitmapAttrs,
            Query::SetProfileAttrs(_) => QueryKind::SetProfileAttrs,
            Query::Bitmap(_) => QueryKind::Bitmap,
            Query::Union(_) => QueryKind::Union,
            Query::Intersect(_) => QueryKind::Intersect,
            Query::Difference(_) => QueryKind::Difference,
            Query::Count(_) => QueryKind::Count,
            Query::Range(_) => QueryKind::Range,
            Query::TopN(_) => QueryKind::TopN,
        }
    }

    /// Whether this call mutates server state.
    pub fn is_write(&self) -> bool {
        self.kind().is_write()
    }

    /// Child queries of a composite, empty for every other kind.
    pub fn inputs(&self) -> &[Query] {
        match self {
            Query::Union(c) | Query::Intersect(c) | Query::Difference(c) | Query::Count(c) => {
                c.inputs()
            }
            _ => &[],
        }
    }
}

impl BitOp {
    fn new<I, F, P>(kind: QueryKind, id: I, frame: F, profile_id: P) -> Result<Self>
    where
        I: IntoInteger,
        F: Into<String>,
        P: IntoInteger,
    {
        Ok(Self {
            id: coerce(id, kind, "id")?,
            frame: frame.into(),
            profile_id: coerce(profile_id, kind, "profile_id")?,
        })
    }
}

fn checked_attrs(kind: QueryKind, attrs: Attrs) -> Result<Attrs> {
    if attrs.is_empty() {
        return Err(PqlError::NoAttributes { query: kind.name() });
    }
    if let Some((name, _)) = attrs.iter().find(|(name, _)| !is_identifier(name)) {
        return Err(PqlError::InvalidAttributeName {
            query: kind.name(),
            name: name.to_owned(),
        });
    }
    Ok(attrs)
}

/// Attribute names are written bare before `=`, so they must lex as identifiers.
fn is_identifier(name: &str) -> bool {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) if first.is_ascii_alphabetic() || first == '_' => {}
        _ => return false,
    }
    chars.all(|c| c.is_ascii_alphanumeric() || c == '_')
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn write_classification_covers_every_kind() {
        let writes: Vec<&str> = QueryKind::ALL
            .iter()
            .filter(|k| k.is_write())
            .map(|k| k.name())
            .collect();
        assert_eq!(
            writes,
            ["SetBit", "ClearBit", "SetBitmapAttrs", "SetProfileAttrs"]
        );
    }

    #[test]
    fn only_difference_and_count_are_limited() {
        for kind in QueryKind::ALL {
            let expected = match kind {
                QueryKind::Difference => Some(2),
                QueryKind::Count => Some(1),
                _ => None,
            };
            assert_eq!(kind.input_limit(), expected, "{}", kind.name());
        }
    }

    #[test]
    fn ids_are_coerced() {
        let q = Query::set_bit("10", "f", 3.0f64).expect("coercible");
        assert_eq!(
            q,
            Query::SetBit(BitOp {
                id: 10,
                frame: "f".into(),
                profile_id: 3,
            })
        );
    }

    #[test]
    fn non_integer_ids_name_the_field() {
        let err = Query::clear_bit(1, "f", "x").expect_err("profile id is not an integer");
        assert_eq!(
            err,
            PqlError::NotAnInteger {
                query: "ClearBit",
                field: "profile_id",
                value: "\"x\"".into(),
            }
        );
    }

    #[test]
    fn composite_rejects_leaf_kinds() {
        let err = Query::composite(QueryKind::Bitmap, Vec::<Query>::new()).expect_err("bitmap is a leaf");
        assert_eq!(err, PqlError::NotComposite { query: "Bitmap" });
    }

    #[test]
    fn composite_checks_limit_before_kind() {
        let b = Query::bitmap(1, "f").expect("bitmap");
        let err = Query::composite(QueryKind::Count, vec![b.clone(), b]).expect_err("limit");
        assert_eq!(err.code(), "InputLimitExceeded");
    }

    #[test]
    fn inputs_are_exposed_for_composites_only() {
        let b = Query::bitmap(1, "f").expect("bitmap");
        let u = Query::union([b.clone(), b.clone()]);
        assert_eq!(u.inputs().len(), 2);
        assert!(b.inputs().is_empty());
    }

    #[test]
    fn attribute_names_must_be_identifiers() {
        for bad in ["", "x=1, y", "1st", "has space", "k\"", "caf\u{e9}"] {
            let err = Query::set_profile_attrs(1, Attrs::new().with(bad, 1))
                .expect_err("name is not an identifier");
            assert_eq!(
                err,
                PqlError::InvalidAttributeName {
                    query: "SetProfileAttrs",
                    name: bad.to_owned(),
                }
            );
        }
        for good in ["a", "_private", "snake_case_2", "CamelCase"] {
            Query::set_bitmap_attrs(1, "f", Attrs::new().with(good, true)).expect(good);
        }
    }

    #[test]
    fn first_bad_attribute_name_is_reported() {
        let attrs = Attrs::new().with("ok", 1).with("a-b", 2).with("c d", 3);
        let err = Query::set_bitmap_attrs(1, "f", attrs).expect_err("dash is not allowed");
        assert_eq!(err.code(), "InvalidAttributeName");
        assert_eq!(err.to_string(), "attribute name 'a-b' for SetBitmapAttrs query is not an identifier");
    }

    #[test]
    fn queries_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<Query>();
    }
}
