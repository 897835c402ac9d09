//! Catalog queries.
//!
//! A [`Query`] is a tree of [`Comparison`]s against named indexes combined
//! with `And`, `Or` and `Not`. Each index decides which comparators it can
//! answer; asking a text index for a range, for example, is an
//! [`crate::CatalogError::UnsupportedQuery`].

use recordstore_codec::Value;
use std::fmt;

/// A comparison operator.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Comparator {
    /// Value equals the operand.
    Eq,
    /// Value differs from the operand.
    NotEq,
    /// Value is greater than the operand.
    Gt,
    /// Value is greater than or equal to the operand.
    Ge,
    /// Value is less than the operand.
    Lt,
    /// Value is less than or equal to the operand.
    Le,
    /// Value lies within an inclusive range.
    InRange,
    /// Value matches any of the operands.
    Any,
    /// Value matches all of the operands.
    All,
    /// Value contains the operand.
    Contains,
}

impl Comparator {
    /// Human-readable label.
    pub fn label(self) -> &'static str {
        match self {
            Self::Eq => "Equal to",
            Self::NotEq => "Not equal to",
            Self::Gt => "Greater than",
            Self::Ge => "Greater than or equal to",
            Self::Lt => "Less than",
            Self::Le => "Less than or equal to",
            Self::InRange => "Within range",
            Self::Any => "Any of",
            Self::All => "All of",
            Self::Contains => "Contains",
        }
    }

    /// Short operator name.
    pub fn name(self) -> &'static str {
        match self {
            Self::Eq => "eq",
            Self::NotEq => "not_eq",
            Self::Gt => "gt",
            Self::Ge => "ge",
            Self::Lt => "lt",
            Self::Le => "le",
            Self::InRange => "in_range",
            Self::Any => "any",
            Self::All => "all",
            Self::Contains => "contains",
        }
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A comparator applied to its operands.
#[derive(Debug, Clone, PartialEq)]
pub enum Comparison {
    /// Equal to.
    Eq(Value),
    /// Not equal to.
    NotEq(Value),
    /// Greater than.
    Gt(Value),
    /// Greater than or equal to.
    Ge(Value),
    /// Less than.
    Lt(Value),
    /// Less than or equal to.
    Le(Value),
    /// Inclusive range.
    InRange(Value, Value),
    /// Any of.
    Any(Vec<Value>),
    /// All of.
    All(Vec<Value>),
    /// Contains.
    Contains(Value),
}

impl Comparison {
    /// Returns the operator.
    pub fn comparator(&self) -> Comparator {
        match self {
            Self::Eq(_) => Comparator::Eq,
            Self::NotEq(_) => Comparator::NotEq,
            Self::Gt(_) => Comparator::Gt,
            Self::Ge(_) => Comparator::Ge,
            Self::Lt(_) => Comparator::Lt,
            Self::Le(_) => Comparator::Le,
            Self::InRange(..) => Comparator::InRange,
            Self::Any(_) => Comparator::Any,
            Self::All(_) => Comparator::All,
            Self::Contains(_) => Comparator::Contains,
        }
    }
}

/// A query tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Query {
    /// A comparison against one index.
    Compare {
        /// Index name.
        index: String,
        /// Comparison to evaluate.
        comparison: Comparison,
    },
    /// Intersection of sub-queries. Empty matches nothing.
    And(Vec<Query>),
    /// Union of sub-queries. Empty matches nothing.
    Or(Vec<Query>),
    /// Every indexed record not matched by the sub-query.
    Not(Box<Query>),
}

macro_rules! comparison_ctor {
    ($(#[$doc:meta] $fn:ident => $variant:ident),* $(,)?) => {
        $(
            #[$doc]
            pub fn $fn(index: impl Into<String>, value: impl Into<Value>) -> Self {
                Self::compare(index, Comparison::$variant(value.into()))
            }
        )*
    };
}

impl Query {
    /// Creates a comparison query.
    pub fn compare(index: impl Into<String>, comparison: Comparison) -> Self {
        Self::Compare {
            index: index.into(),
            comparison,
        }
    }

    comparison_ctor! {
        /// `index == value`.
        eq => Eq,
        /// `index != value`.
        not_eq => NotEq,
        /// `index > value`.
        gt => Gt,
        /// `index >= value`.
        ge => Ge,
        /// `index < value`.
        lt => Lt,
        /// `index <= value`.
        le => Le,
        /// `index` contains `value`.
        contains => Contains,
    }

    /// `min <= index <= max`.
    pub fn in_range(
        index: impl Into<String>,
        min: impl Into<Value>,
        max: impl Into<Value>,
    ) -> Self {
        Self::compare(index, Comparison::InRange(min.into(), max.into()))
    }

    /// `index` matches any of `values`.
    pub fn any<V: Into<Value>>(index: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::compare(
            index,
            Comparison::Any(values.into_iter().map(Into::into).collect()),
        )
    }

    /// `index` matches all of `values`.
    pub fn all<V: Into<Value>>(index: impl Into<String>, values: impl IntoIterator<Item = V>) -> Self {
        Self::compare(
            index,
            Comparison::All(values.into_iter().map(Into::into).collect()),
        )
    }

    /// Intersects with another query, flattening nested `And`s.
    #[must_use]
    pub fn and(self, other: Query) -> Self {
        match self {
            Self::And(mut parts) => {
                parts.push(other);
                Self::And(parts)
            }
            first => Self::And(vec![first, other]),
        }
    }

    /// Unions with another query, flattening nested `Or`s.
    #[must_use]
    pub fn or(self, other: Query) -> Self {
        match self {
            Self::Or(mut parts) => {
                parts.push(other);
                Self::Or(parts)
            }
            first => Self::Or(vec![first, other]),
        }
    }

    /// Negates the query.
    #[must_use]
    #[allow(clippy::should_implement_trait)]
    pub fn not(self) -> Self {
        Self::Not(Box::new(self))
    }
}

/// Sorting and paging for [`crate::RecordCatalog::query`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QueryOptions {
    /// Index whose values order the results. Unsorted results follow
    /// indexing order.
    pub sort_index: Option<String>,
    /// Reverses the result order.
    pub reverse: bool,
    /// Maximum number of UIDs returned. The count is unaffected.
    pub limit: Option<usize>,
}

impl QueryOptions {
    /// Creates default options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sorts by the named index.
    #[must_use]
    pub fn sort_by(mut self, index: impl Into<String>) -> Self {
        self.sort_index = Some(index.into());
        self
    }

    /// Reverses the order.
    #[must_use]
    pub fn reverse(mut self, reverse: bool) -> Self {
        self.reverse = reverse;
        self
    }

    /// Caps the number of returned UIDs.
    #[must_use]
    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn builders_flatten() {
        let q = Query::eq("a", 1).and(Query::eq("b", 2)).and(Query::eq("c", 3));
        match q {
            Query::And(parts) => assert_eq!(parts.len(), 3),
            other => panic!("unexpected {other:?}"),
        }

        let q = Query::gt("a", 1).or(Query::lt("a", -1));
        assert!(matches!(q, Query::Or(ref parts) if parts.len() == 2));
    }

    #[test]
    fn comparison_reports_its_comparator() {
        assert_eq!(Comparison::InRange(1.into(), 2.into()).comparator(), Comparator::InRange);
        assert_eq!(Comparator::NotEq.to_string(), "not_eq");
        assert_eq!(Comparator::Contains.label(), "Contains");
    }

    #[test]
    fn any_collects_values() {
        let q = Query::any("tags", ["a", "b"]);
        assert_eq!(
            q,
            Query::compare(
                "tags",
                Comparison::Any(vec![Value::from("a"), Value::from("b")])
            )
        );
    }
}
