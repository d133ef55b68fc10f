use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::link::{encode_component, encode_segment, decode_component};

/// The page detail views are served from.
pub const DETAILS_PAGE: &str = "details.html";

/// Stands in for an empty parameter value in a path.
pub const EMPTY_SEGMENT: &str = "_";

/// How a [`Locator`] is turned into an `href`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum LinkStyle {
    /// `details.html?src=gardens&name=herb-spiral`
    #[default]
    Query,
    /// `details/gardens/herb-spiral.html`, for hosts that can't route on
    /// query parameters.
    Path,
}

/// A reference to a page plus ordered query parameters, enough to find a
/// record or category again without carrying it along.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Locator {
    page: Arc<str>,
    params: Vec<(Arc<str>, String)>,
}

impl Locator {
    pub fn new<P: Into<Arc<str>>>(page: P) -> Self {
        Locator { page: page.into(), params: vec![] }
    }

    /// Parses `page?key=value&...`. Anything before `?` is the page; a
    /// missing page is left empty.
    ///
    /// ```rust
    /// use trellis::link::Locator;
    ///
    /// let locator = Locator::parse("gardens.html?src=gardens&cat=herbs&cat=mints");
    /// assert_eq!(locator.page(), "gardens.html");
    /// assert_eq!(locator.get("src"), Some("gardens"));
    /// assert_eq!(locator.get_all("cat").collect::<Vec<_>>(), ["herbs", "mints"]);
    /// ```
    pub fn parse(string: &str) -> Self {
        let (page, query) = match string.split_once('?') {
            Some((page, query)) => (page, query),
            None if string.contains('=') => ("", string),
            None => (string, ""),
        };

        let query = query.split('#').next().unwrap_or("");
        let mut locator = Locator::new(page);
        for pair in query.split('&').filter(|p| !p.is_empty()) {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            locator.params.push((decode_component(key).into(), decode_component(value)));
        }

        locator
    }

    pub fn page(&self) -> &str {
        &self.page
    }

    /// Appends a parameter. Keys may repeat.
    pub fn push<K, V>(&mut self, key: K, value: V) -> &mut Self
        where K: Into<Arc<str>>, V: Into<String>
    {
        self.params.push((key.into(), value.into()));
        self
    }

    pub fn with<K, V>(mut self, key: K, value: V) -> Self
        where K: Into<Arc<str>>, V: Into<String>
    {
        self.push(key, value);
        self
    }

    /// The first value of `key`.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.params.iter()
            .find(|(k, _)| &**k == key)
            .map(|(_, v)| v.as_str())
    }

    /// Every value of `key`, in order.
    pub fn get_all<'a>(&'a self, key: &'a str) -> impl Iterator<Item = &'a str> + 'a {
        self.params.iter()
            .filter(move |(k, _)| &**k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn params(&self) -> impl Iterator<Item = (&str, &str)> {
        self.params.iter().map(|(k, v)| (&**k, v.as_str()))
    }

    pub fn query(&self) -> String {
        let mut query = String::new();
        for (i, (key, value)) in self.params.iter().enumerate() {
            if i != 0 { query.push('&'); }
            query.push_str(&encode_component(key));
            query.push('=');
            query.push_str(&encode_component(value));
        }

        query
    }

    /// The path form of `self`: the page's stem followed by one segment per
    /// parameter value. A `src` parameter naming the page itself is implied
    /// by the stem and omitted. Empty values become [`EMPTY_SEGMENT`].
    ///
    /// ```rust
    /// use trellis::link::Locator;
    ///
    /// let detail = Locator::new("details.html").with("src", "gardens").with("name", "herb-spiral");
    /// assert_eq!(detail.to_path(), "details/gardens/herb-spiral.html");
    ///
    /// let category = Locator::new("gardens.html").with("src", "gardens").with("cat", "herbs");
    /// assert_eq!(category.to_path(), "gardens/herbs.html");
    /// assert_eq!(Locator::new("gardens.html").to_path(), "gardens.html");
    /// ```
    pub fn to_path(&self) -> String {
        let stem = self.page.strip_suffix(".html").unwrap_or(&self.page);
        let segments: Vec<_> = self.params.iter()
            .filter(|(k, v)| !(&**k == "src" && v == stem))
            .map(|(_, v)| match v.is_empty() {
                true => EMPTY_SEGMENT.to_string(),
                false => encode_segment(v),
            })
            .collect();

        if segments.is_empty() {
            return self.page.to_string();
        }

        format!("{stem}/{}.html", segments.join("/"))
    }

    pub fn href(&self, style: LinkStyle) -> String {
        match style {
            LinkStyle::Query => self.to_string(),
            LinkStyle::Path => self.to_path(),
        }
    }
}

impl fmt::Display for Locator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.params.is_empty() {
            true => write!(f, "{}", self.page),
            false => write!(f, "{}?{}", self.page, self.query()),
        }
    }
}
