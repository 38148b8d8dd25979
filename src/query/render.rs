//! PQL text for every query node.
//!
//! Output is a single line. Set-algebra calls share the default
//! `Name(child, child, ...)` form; every other call writes its own arguments.

use std::fmt;

use crate::query::ast::{
    BitOp, Bitmap, Composite, Query, QueryKind, Range, SetBitmapAttrs, SetProfileAttrs, TopN,
};

impl Query {
    /// Renders the query as PQL text.
    pub fn to_pql(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for Query {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = self.kind();
        match self {
            Query::SetBit(op) | Query::ClearBit(op) => op.write_pql(kind, f),
            Query::SetBitmapAttrs(q) => fmt::Display::fmt(q, f),
            Query::SetProfileAttrs(q) => fmt::Display::fmt(q, f),
            Query::Bitmap(q) => fmt::Display::fmt(q, f),
            Query::Union(c) | Query::Intersect(c) | Query::Difference(c) | Query::Count(c) => {
                c.write_pql(kind, f)
            }
            Query::Range(q) => fmt::Display::fmt(q, f),
            Query::TopN(q) => fmt::Display::fmt(q, f),
        }
    }
}

impl Composite {
    /// Default rendering shared by every call built from child queries.
    pub fn write_pql(&self, kind: QueryKind, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}(", kind.name())?;
        for (idx, input) in self.inputs.iter().enumerate() {
            if idx > 0 {
                f.write_str(", ")?;
            }
            fmt::Display::fmt(input, f)?;
        }
        f.write_str(")")
    }
}

impl BitOp {
    /// `SetBit` and `ClearBit` differ only in their call name.
    pub fn write_pql(&self, kind: QueryKind, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}(id={}, frame=\"{}\", profileID={})",
            kind.name(),
            self.id,
            self.frame,
            self.profile_id
        )
    }
}

impl fmt::Display for SetBitmapAttrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "SetBitmapAttrs(id={}, frame=\"{}\", {})",
            self.id, self.frame, self.attrs
        )
    }
}

impl fmt::Display for SetProfileAttrs {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "SetProfileAttrs(id={}, {})", self.id, self.attrs)
    }
}

impl fmt::Display for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Bitmap(id={}, frame=\"{}\")", self.id, self.frame)
    }
}

impl fmt::Display for Range {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Range(id={}, frame=\"{}\", start=\"{}\", end=\"{}\")",
            self.id, self.frame, self.start, self.end
        )
    }
}

impl fmt::Display for TopN {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("TopN(")?;
        if let Some(filter) = &self.filter {
            write!(f, "{filter}, ")?;
        }
        write!(f, "frame=\"{}\"", self.frame)?;
        if let Some(n) = self.n.filter(|n| *n != 0) {
            write!(f, ", n={n}")?;
        }
        // An empty field name means no field filter.
        if let Some(field) = self.filter_field.as_deref().filter(|name| !name.is_empty()) {
            write!(f, ", field=\"{field}\", [")?;
            for (idx, value) in self.filter_values.iter().enumerate() {
                if idx > 0 {
                    f.write_str(",")?;
                }
                write!(f, "{value}")?;
            }
            f.write_str("]")?;
        }
        f.write_str(")")
    }
}

#[cfg(test)]
mod tests {
    use crate::query::{AttrValue, Attrs, Query};

    #[test]
    fn set_and_clear_bit_share_layout() {
        let set = Query::set_bit(10, "stargazer", 513).expect("set");
        let clear = Query::clear_bit(10, "stargazer", 513).expect("clear");
        assert_eq!(set.to_pql(), "SetBit(id=10, frame=\"stargazer\", profileID=513)");
        assert_eq!(clear.to_pql(), "ClearBit(id=10, frame=\"stargazer\", profileID=513)");
    }

    #[test]
    fn profile_attrs_have_no_frame() {
        let q = Query::set_profile_attrs(7, Attrs::new().with("name", "ann").with("age", 31))
            .expect("attrs");
        assert_eq!(q.to_pql(), "SetProfileAttrs(id=7, name=\"ann\", age=31)");
    }

    #[test]
    fn empty_composites_render_bare_parens() {
        assert_eq!(Query::union(Vec::new()).to_pql(), "Union()");
        assert_eq!(Query::count(Vec::new()).expect("count").to_pql(), "Count()");
    }

    #[test]
    fn nested_composites_render_recursively() {
        let b1 = Query::bitmap(1, "f").expect("b1");
        let b2 = Query::bitmap(2, "f").expect("b2");
        let diff = Query::difference([b1.clone(), b2.clone()]).expect("diff");
        let q = Query::count([Query::intersect([Query::union([b1, b2]), diff])]).expect("count");
        assert_eq!(
            q.to_pql(),
            "Count(Intersect(Union(Bitmap(id=1, frame=\"f\"), Bitmap(id=2, frame=\"f\")), \
             Difference(Bitmap(id=1, frame=\"f\"), Bitmap(id=2, frame=\"f\"))))"
        );
    }

    #[test]
    fn top_n_omits_zero_n() {
        let q = Query::top_n("f").n(0).build().expect("top-n");
        assert_eq!(q.to_pql(), "TopN(frame=\"f\")");
    }

    #[test]
    fn top_n_field_with_mixed_values() {
        let q = Query::top_n("f")
            .field(
                "category",
                [AttrValue::from("a"), AttrValue::from(true), AttrValue::from(1.5)],
            )
            .build()
            .expect("top-n");
        assert_eq!(
            q.to_pql(),
            "TopN(frame=\"f\", field=\"category\", [\"a\",true,1.5])"
        );
    }

    #[test]
    fn top_n_field_without_values() {
        let q = Query::top_n("f")
            .field("category", Vec::<i64>::new())
            .build()
            .expect("top-n");
        assert_eq!(q.to_pql(), "TopN(frame=\"f\", field=\"category\", [])");
    }

    #[test]
    fn empty_top_n_field_is_omitted() {
        let q = Query::top_n("f")
            .n(3)
            .field("", [AttrValue::from(1)])
            .build()
            .expect("top-n");
        assert_eq!(q.to_pql(), "TopN(frame=\"f\", n=3)");
    }
}
