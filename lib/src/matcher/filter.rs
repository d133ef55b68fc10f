use std::fmt;
use std::sync::Arc;

use indexmap::IndexMap;
use rustc_hash::FxHashMap;

use crate::value::{Record, Value};

/// Filter selections: field name to required text.
///
/// Values are stored lowercased. An entry with empty text constrains nothing.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FilterState(IndexMap<Arc<str>, String>);

impl FilterState {
    pub fn new() -> Self {
        FilterState::default()
    }

    /// Requires `field` to contain `value`, replacing any earlier value.
    pub fn set<F: Into<Arc<str>>>(&mut self, field: F, value: &str) {
        self.0.insert(field.into(), value.to_lowercase());
    }

    pub fn with<F: Into<Arc<str>>>(mut self, field: F, value: &str) -> Self {
        self.set(field, value);
        self
    }

    pub fn get(&self, field: &str) -> Option<&str> {
        self.0.get(field).map(|v| v.as_str())
    }

    pub fn remove(&mut self, field: &str) -> Option<String> {
        self.0.shift_remove(field)
    }

    /// Sets `field` to `value`, or, if it's already set to `value`, removes
    /// it. Returns `true` if the filter is now set.
    ///
    /// ```rust
    /// use trellis::matcher::FilterState;
    ///
    /// let mut filters = FilterState::new();
    /// assert!(filters.toggle("sun", "Full"));
    /// assert_eq!(filters.get("sun"), Some("full"));
    /// assert!(filters.toggle("sun", "partial"));
    /// assert!(!filters.toggle("sun", "PARTIAL"));
    /// assert!(filters.is_empty());
    /// ```
    pub fn toggle<F: Into<Arc<str>>>(&mut self, field: F, value: &str) -> bool {
        let field = field.into();
        let value = value.to_lowercase();
        if self.0.get(&field) == Some(&value) {
            self.0.shift_remove(&field);
            return false;
        }

        self.0.insert(field, value);
        true
    }

    pub fn clear(&mut self) {
        self.0.clear();
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.0.iter().map(|(k, v)| (&**k, v.as_str()))
    }

    /// `self` with every filter in `other` set over it.
    pub fn merged(&self, other: &FilterState) -> FilterState {
        let mut merged = self.clone();
        for (field, value) in other.iter() {
            merged.set(field, value);
        }

        merged
    }
}

impl<K: Into<Arc<str>>, V: AsRef<str>> FromIterator<(K, V)> for FilterState {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut filters = FilterState::new();
        for (field, value) in iter {
            filters.set(field, value.as_ref());
        }

        filters
    }
}

/// A custom matcher: the record's value for the field, if any, and the
/// filter's lowercased text.
pub type MatchFn = dyn Fn(Option<&Value>, &str) -> bool + Send + Sync;

/// Custom matchers by field name. A registered matcher replaces substring
/// matching for its field.
#[derive(Clone, Default)]
pub struct Matchers(FxHashMap<Arc<str>, Arc<MatchFn>>);

impl Matchers {
    pub fn new() -> Self {
        Matchers::default()
    }

    pub fn register<F, M>(&mut self, field: F, matcher: M) -> &mut Self
        where F: Into<Arc<str>>, M: Fn(Option<&Value>, &str) -> bool + Send + Sync + 'static
    {
        self.0.insert(field.into(), Arc::new(matcher));
        self
    }

    pub fn with<F, M>(mut self, field: F, matcher: M) -> Self
        where F: Into<Arc<str>>, M: Fn(Option<&Value>, &str) -> bool + Send + Sync + 'static
    {
        self.register(field, matcher);
        self
    }

    pub fn get(&self, field: &str) -> Option<&MatchFn> {
        self.0.get(field).map(|m| &**m)
    }
}

impl fmt::Debug for Matchers {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_set().entries(self.0.keys()).finish()
    }
}

/// Returns `true` if `value`, lowercased, contains `needle`. Lists contain
/// `needle` if any of their scalars do.
fn contains(value: &Value, needle: &str) -> bool {
    match value {
        Value::Record(_) => false,
        value => value.scalars().any(|s| s.to_lowercase().contains(needle)),
    }
}

/// Returns `true` if `record` passes every filter in `filters`.
///
/// A field is looked up by its exact name, then by its lowercase name. Unless
/// `matchers` has a matcher for it, the field must be present and contain
/// the filter's text, ignoring case. Filters with empty text always pass.
///
/// ```rust
/// use trellis::record;
/// use trellis::matcher::{matches_filters, FilterState, Matchers};
///
/// let mint = record! { "sun" => "Partial Shade", "water" => "often" };
/// let none = Matchers::new();
///
/// assert!(matches_filters(&mint, &FilterState::new(), &none));
/// assert!(matches_filters(&mint, &FilterState::new().with("Sun", "SHADE"), &none));
/// assert!(!matches_filters(&mint, &FilterState::new().with("soil", "loam"), &none));
/// ```
pub fn matches_filters(record: &Record, filters: &FilterState, matchers: &Matchers) -> bool {
    filters.iter()
        .filter(|(_, needle)| !needle.is_empty())
        .all(|(field, needle)| {
            let value = record.get_either_case(field);
            match matchers.get(field) {
                Some(matcher) => matcher(value, needle),
                None => value.map_or(false, |value| contains(value, needle)),
            }
        })
}
