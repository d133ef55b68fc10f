//! Generic traversal over the fields of a [`Record`].
//!
//! Every component that looks inside records (rendering, filtering, search)
//! walks them through [`fields()`] so that the same fields are skipped
//! everywhere: empty values never appear, and an [`Exclude`] decides which
//! names are left out.

use std::sync::Arc;

use rustc_hash::FxHashSet;

use crate::value::{Record, Value};

/// Image declarations.
pub const IMAGES: &str = "images";
/// A precomputed link to the record.
pub const LINK: &str = "link";
/// One or more category paths.
pub const CATEGORY: &str = "category";
/// Parsed event dates.
pub const DATES: &str = "dates";
/// Free-form markup, embedded verbatim after translation.
pub const MARKUP: &str = "html";
/// Event date strings. Not reserved, but rendered with its own heading.
pub const WHEN: &str = "when";

/// Fields with engine-defined handling. Matched ignoring ASCII case.
pub const RESERVED: &[&str] = &[IMAGES, LINK, CATEGORY, DATES, MARKUP];

/// Reserved fields that never hold searchable content.
pub const UNSEARCHABLE: &[&str] = &[IMAGES, LINK];

/// Recursive renderers and matchers stop descending at this depth.
pub const MAX_DEPTH: usize = 64;

/// Returns `true` if `name` is one of `reserved`, ignoring ASCII case.
pub fn is_reserved_in(name: &str, reserved: &[&str]) -> bool {
    reserved.iter().any(|r| name.eq_ignore_ascii_case(r))
}

/// Decides whether a field is left out of a walk.
pub trait Exclude {
    fn excludes(&self, field: &str) -> bool;
}

impl<F: Fn(&str) -> bool> Exclude for F {
    fn excludes(&self, field: &str) -> bool {
        self(field)
    }
}

/// The usual [`Exclude`]: a set of exact field names, a set of reserved names
/// compared ignoring case, and an optional allow-list.
#[derive(Debug, Clone, Default)]
pub struct Exclusions {
    keys: FxHashSet<Arc<str>>,
    reserved: Vec<&'static str>,
    only: FxHashSet<Arc<str>>,
}

impl Exclusions {
    /// Excludes nothing.
    pub fn new() -> Self {
        Exclusions::default()
    }

    /// Excludes every field in [`RESERVED`].
    pub fn reserved() -> Self {
        Exclusions::new().reserve(RESERVED)
    }

    /// Additionally excludes every name in `reserved`, ignoring case.
    pub fn reserve(mut self, reserved: &[&'static str]) -> Self {
        self.reserved.extend_from_slice(reserved);
        self
    }

    /// Stops excluding `name` as a reserved field.
    pub fn unreserve(mut self, name: &str) -> Self {
        self.reserved.retain(|r| !r.eq_ignore_ascii_case(name));
        self
    }

    /// Additionally excludes fields named exactly as any of `keys`.
    pub fn keys<I, K>(mut self, keys: I) -> Self
        where I: IntoIterator<Item = K>, K: Into<Arc<str>>
    {
        self.keys.extend(keys.into_iter().map(Into::into));
        self
    }

    /// Excludes every field _not_ named in `keys`. An empty `keys` allows all.
    pub fn only<I, K>(mut self, keys: I) -> Self
        where I: IntoIterator<Item = K>, K: Into<Arc<str>>
    {
        self.only.extend(keys.into_iter().map(Into::into));
        self
    }
}

impl Exclude for Exclusions {
    fn excludes(&self, field: &str) -> bool {
        is_reserved_in(field, &self.reserved)
            || self.keys.contains(field)
            || (!self.only.is_empty() && !self.only.contains(field))
    }
}

/// A classified, non-empty value.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Field<'a> {
    Scalar(&'a str),
    List(&'a [Value]),
    Record(&'a Record),
}

impl<'a> From<&'a Value> for Field<'a> {
    fn from(value: &'a Value) -> Self {
        match value {
            Value::Scalar(s) => Field::Scalar(s),
            Value::List(v) => Field::List(v),
            Value::Record(r) => Field::Record(r),
        }
    }
}

impl<'a> Field<'a> {
    /// Classifies each element of a list. Elements are not filtered.
    pub fn elements(list: &'a [Value]) -> impl Iterator<Item = Field<'a>> + 'a {
        list.iter().map(Field::from)
    }
}

/// Lazy iterator over the walked fields of a record, in field order.
pub struct Fields<'a, 'e, E: ?Sized> {
    inner: indexmap::map::Iter<'a, Arc<str>, Value>,
    exclude: &'e E,
}

impl<'a, E: Exclude + ?Sized> Iterator for Fields<'a, '_, E> {
    type Item = (&'a str, Field<'a>);

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            let (name, value) = self.inner.next()?;
            if value.is_empty() || self.exclude.excludes(name) {
                continue;
            }

            return Some((&**name, Field::from(value)));
        }
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        (0, self.inner.size_hint().1)
    }
}

/// Walks the non-empty, non-excluded fields of `record`.
///
/// ```rust
/// use trellis::record;
/// use trellis::walk::{fields, Exclusions, Field};
///
/// let record = record! {
///     "name" => "Herb Spiral",
///     "images" => "spiral",
///     "notes" => "",
///     "sun" => "full",
/// };
///
/// let exclusions = Exclusions::reserved().keys(["name"]);
/// let walked: Vec<_> = fields(&record, &exclusions).collect();
/// assert_eq!(walked, [("sun", Field::Scalar("full"))]);
/// ```
pub fn fields<'a, 'e, E>(record: &'a Record, exclude: &'e E) -> Fields<'a, 'e, E>
    where E: Exclude + ?Sized
{
    Fields { inner: record.iter(), exclude }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record, list};

    #[test]
    fn classification_and_order() {
        let record = record! {
            "when" => list!["2030-01-01"],
            "Images" => "a:b",
            "steps" => list![],
            "care" => record! { "water" => "weekly" },
            "Link" => "x",
            "color" => "red",
        };

        let reserved = Exclusions::reserved();
        let walked: Vec<_> = fields(&record, &reserved).collect();
        assert_eq!(walked.len(), 3);
        assert_eq!(walked[0].0, "when");
        assert!(matches!(walked[0].1, Field::List(l) if l.len() == 1));
        assert!(matches!(walked[1], ("care", Field::Record(_))));
        assert_eq!(walked[2], ("color", Field::Scalar("red")));
    }

    #[test]
    fn allow_list_and_closures() {
        let record = record! { "name" => "A", "city" => "B", "html" => "<b>c</b>" };

        let only = Exclusions::new().only(["city"]);
        let names: Vec<_> = fields(&record, &only).map(|(n, _)| n).collect();
        assert_eq!(names, ["city"]);

        let render = Exclusions::reserved().unreserve(MARKUP);
        let names: Vec<_> = fields(&record, &render).map(|(n, _)| n).collect();
        assert_eq!(names, ["name", "city", "html"]);

        let no_a = |name: &str| name.starts_with('n');
        let names: Vec<_> = fields(&record, &no_a).map(|(n, _)| n).collect();
        assert_eq!(names, ["city", "html"]);
    }
}
