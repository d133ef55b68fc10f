use regex::{Regex, RegexBuilder};
use tracing::warn;

use crate::error::Result;
use crate::value::Record;
use crate::walk::{fields, is_reserved_in, Exclude, Field, MAX_DEPTH, UNSEARCHABLE};
use crate::link::{detail_reference, title_of, Locator};
use crate::config::DisplayConfig;
use crate::content::Collection;
use crate::matcher::{matches_filters, FilterState, Matchers};

/// Matches text containing a word that starts with a search term, ignoring
/// case.
#[derive(Debug, Clone)]
pub struct SearchPattern(Regex);

impl SearchPattern {
    /// ```rust
    /// use trellis::matcher::SearchPattern;
    ///
    /// let pattern = SearchPattern::new("gar").unwrap();
    /// assert!(pattern.is_match("Rain Garden"));
    /// assert!(!pattern.is_match("cigar"));
    /// assert!(SearchPattern::new("c++").unwrap().is_match("Learning C++"));
    /// ```
    pub fn new(term: &str) -> Result<Self> {
        let regex = RegexBuilder::new(&format!(r"\b{}", regex::escape(term)))
            .case_insensitive(true)
            .build()?;

        Ok(SearchPattern(regex))
    }

    pub fn is_match(&self, text: &str) -> bool {
        self.0.is_match(text)
    }
}

struct SearchFields<'a, K> {
    keys: &'a [K],
}

impl<K: AsRef<str>> Exclude for SearchFields<'_, K> {
    fn excludes(&self, field: &str) -> bool {
        is_reserved_in(field, UNSEARCHABLE)
            || (!self.keys.is_empty() && !self.keys.iter().any(|k| k.as_ref() == field))
    }
}

/// Returns `true` if `pattern` matches any scalar in `record`, at any depth.
///
/// Identity and title fields are searched too; image and link fields are
/// not. A non-empty `keys` limits the search, at every level, to fields with
/// those names.
pub fn matches_search<K: AsRef<str>>(record: &Record, pattern: &SearchPattern, keys: &[K]) -> bool {
    search_record(record, pattern, &SearchFields { keys }, 0)
}

fn search_record<E: Exclude>(record: &Record, pattern: &SearchPattern, exclude: &E, depth: usize) -> bool {
    if depth > MAX_DEPTH {
        warn!(limit = MAX_DEPTH, "record nested too deeply; not searching further");
        return false;
    }

    fields(record, exclude).any(|(_, field)| search_field(field, pattern, exclude, depth))
}

fn search_field<E: Exclude>(field: Field<'_>, pattern: &SearchPattern, exclude: &E, depth: usize) -> bool {
    match field {
        Field::Scalar(text) => pattern.is_match(text),
        Field::List(items) if depth < MAX_DEPTH => Field::elements(items)
            .any(|item| search_field(item, pattern, exclude, depth + 1)),
        Field::List(_) => false,
        Field::Record(nested) => search_record(nested, pattern, exclude, depth + 1),
    }
}

/// A record offered for a search term.
#[derive(Debug, Clone, PartialEq)]
pub struct Suggestion<'a> {
    pub index: usize,
    pub record: &'a Record,
    pub title: String,
    pub locator: Locator,
}

/// Search-as-you-type over one collection.
#[derive(Debug, Clone, Copy)]
pub struct Search<'a> {
    pub collection: &'a Collection,
    pub config: &'a DisplayConfig,
    pub matchers: &'a Matchers,
}

impl<'a> Search<'a> {
    pub fn new(collection: &'a Collection, config: &'a DisplayConfig, matchers: &'a Matchers) -> Self {
        Search { collection, config, matchers }
    }

    /// The records, in collection order, that pass `static_filters` with
    /// `dynamic_filters` set over them and that contain a word starting with
    /// `term` in the fields named by `keys` (all fields if `keys` is empty).
    pub fn suggest<K: AsRef<str>>(
        &self,
        term: &str,
        static_filters: &FilterState,
        dynamic_filters: &FilterState,
        keys: &[K],
    ) -> Result<Vec<Suggestion<'a>>> {
        let pattern = SearchPattern::new(term)?;
        let filters = static_filters.merged(dynamic_filters);
        let source = self.config.source_name(self.collection);

        let suggestions = self.collection.iter()
            .enumerate()
            .filter(|(_, record)| matches_filters(record, &filters, self.matchers))
            .filter(|(_, record)| matches_search(record, &pattern, keys))
            .map(|(index, record)| Suggestion {
                index,
                record,
                title: title_of(record, self.config.title_keys(), &self.config.title_separator),
                locator: detail_reference(record, &self.config.identity_keys, source),
            })
            .collect();

        Ok(suggestions)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record, list};

    fn recipes() -> Vec<Record> {
        vec![
            record! {
                "name" => "Green Soup",
                "ingredients" => list![record! { "item" => "Sorrel" }, list!["nettle", "leek"]],
                "images" => "Soup Bowl",
            },
            record! { "name" => "Pesto", "notes" => "Basil-forward", "link" => "https://example.com/soup" },
            record! { "name" => "Tea", "notes" => "", "steps" => list![] },
        ]
    }

    fn search<'a>(records: &'a [Record], term: &str, keys: &[&str]) -> Vec<&'a str> {
        let pattern = SearchPattern::new(term).unwrap();
        records.iter()
            .filter(|r| matches_search(r, &pattern, keys))
            .map(|r| r.text("name"))
            .collect()
    }

    #[test]
    fn recall_at_depth() {
        let records = recipes();
        assert_eq!(search(&records, "nett", &[]), ["Green Soup"]);
        assert_eq!(search(&records, "SORR", &[]), ["Green Soup"]);
        assert_eq!(search(&records, "forward", &[]), ["Pesto"]);
        assert_eq!(search(&records, "green", &[]), ["Green Soup"]);
        assert!(search(&records, "bowl", &[]).is_empty());
        assert!(search(&records, "example", &[]).is_empty());
        assert!(search(&records, "ettle", &[]).is_empty());
        assert_eq!(search(&records, "", &[]).len(), 3);
    }

    #[test]
    fn key_restriction_applies_at_every_level() {
        let records = recipes();
        let pattern = SearchPattern::new("sorrel").unwrap();
        assert!(matches_search(&records[0], &pattern, &["ingredients", "item"]));
        assert!(!matches_search(&records[0], &pattern, &["ingredients"]));
        assert!(!matches_search(&records[0], &pattern, &["name"]));
    }

    #[test]
    fn suggestions() {
        let collection = Collection::new("recipes", recipes());
        let config = DisplayConfig::new(["name"]);
        let matchers = Matchers::new();
        let search = Search::new(&collection, &config, &matchers);

        let none = FilterState::new();
        let found = search.suggest("s", &none, &none, &[] as &[&str]).unwrap();
        let titles: Vec<_> = found.iter().map(|s| s.title.as_str()).collect();
        assert_eq!(titles, ["Green Soup"]);
        assert_eq!(found[0].locator.to_string(), "details.html?src=recipes&name=green-soup");

        let dynamic = FilterState::new().with("notes", "basil");
        let found = search.suggest("", &none, &dynamic, &[] as &[&str]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].index, 1);
    }
}
