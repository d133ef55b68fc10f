use derive_more::{Debug, Deref};
use serde::{Deserialize, Serialize};

use crate::util::slugify;
use crate::value::Record;
use crate::link::{Locator, DETAILS_PAGE};

/// The slugs of a record's identity-key values, in key order.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Deref, Serialize, Deserialize)]
#[debug("{_0:?}")]
#[serde(transparent)]
pub struct Identity(Vec<String>);

impl Identity {
    pub fn new<I, S>(slugs: I) -> Self
        where I: IntoIterator<Item = S>, S: Into<String>
    {
        Identity(slugs.into_iter().map(Into::into).collect())
    }

    /// The identity requested by `locator`: for every key, the value of the
    /// parameter named by the key's slug. Missing parameters are empty.
    pub fn requested<K: AsRef<str>>(locator: &Locator, keys: &[K]) -> Self {
        keys.iter()
            .map(|key| locator.get(&slugify(key.as_ref())).unwrap_or("").to_string())
            .collect()
    }
}

impl FromIterator<String> for Identity {
    fn from_iter<T: IntoIterator<Item = String>>(iter: T) -> Self {
        Identity(iter.into_iter().collect())
    }
}

/// The text of `key` in `record`, or `""` if it's missing.
fn key_text<'r>(record: &'r Record, key: &str) -> std::borrow::Cow<'r, str> {
    record.get(key).map(|v| v.to_text()).unwrap_or_default()
}

/// The identity of `record`: the slug of the value at each of `keys`.
///
/// ```rust
/// use trellis::record;
/// use trellis::link::identity_of;
///
/// let meeting = record! { "month" => "May", "day" => "4", "year" => "2030" };
/// let id = identity_of(&meeting, &["month", "day", "year"]);
/// assert_eq!(&id[..], ["may", "4", "2030"]);
/// ```
pub fn identity_of<K: AsRef<str>>(record: &Record, keys: &[K]) -> Identity {
    keys.iter()
        .map(|key| slugify(&key_text(record, key.as_ref())))
        .collect()
}

/// The human-readable label of `record`: the raw values at `keys` joined by
/// `separator`. Missing values are empty, and trailing separators are
/// trimmed.
pub fn title_of<K: AsRef<str>>(record: &Record, keys: &[K], separator: &str) -> String {
    let parts: Vec<_> = keys.iter().map(|key| key_text(record, key.as_ref())).collect();
    let mut title = parts.join(separator);
    if !separator.is_empty() {
        let len = title.trim_end_matches(separator).len();
        title.truncate(len);
    }

    title
}

/// A locator for the detail view of `record`: `src` names the content
/// domain, then one parameter per identity key, named and valued by slugs.
pub fn detail_reference<K: AsRef<str>>(record: &Record, keys: &[K], source: &str) -> Locator {
    let mut locator = Locator::new(DETAILS_PAGE);
    locator.push("src", source);
    for (key, slug) in keys.iter().zip(identity_of(record, keys).0) {
        locator.push(slugify(key.as_ref()), slug);
    }

    locator
}

/// A locator for the listing of `category` beneath the already-selected
/// category path `prefix` (given as slugs) in content domain `source`.
pub fn category_reference<S: AsRef<str>>(source: &str, prefix: &[S], category: &str) -> Locator {
    let mut locator = Locator::new(format!("{source}.html"));
    locator.push("src", source);
    for slug in prefix {
        locator.push("cat", slug.as_ref());
    }

    locator.push("cat", slugify(category));
    locator
}

/// Finds the first record in `records` whose identity is `requested`.
pub fn find_by_identity<'a, I, K>(records: I, keys: &[K], requested: &Identity) -> Option<&'a Record>
    where I: IntoIterator<Item = &'a Record>, K: AsRef<str>
{
    records.into_iter().find(|record| identity_of(record, keys) == *requested)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record, list};

    fn meetings() -> Vec<Record> {
        vec![
            record! { "month" => "May", "day" => "4", "year" => "2030", "topic" => "Seeds" },
            record! { "month" => "May", "day" => "18", "year" => "2030", "topic" => "Soil" },
            record! { "month" => "June", "day" => "1", "year" => "2030", "topic" => "Bees" },
        ]
    }

    #[test]
    fn every_record_is_found_by_its_identity() {
        let keys = ["month", "day", "year"];
        let records = meetings();
        for record in &records {
            let id = identity_of(record, &keys);
            let found = find_by_identity(&records, &keys, &id).unwrap();
            assert!(std::ptr::eq(found, record));
        }

        let missing = Identity::new(["may", "5", "2030"]);
        assert!(find_by_identity(&records, &keys, &missing).is_none());
        assert!(find_by_identity(&Vec::<Record>::new(), &keys, &missing).is_none());
    }

    #[test]
    fn first_match_wins() {
        let records = vec![
            record! { "name" => "Plant Sale", "n" => "1" },
            record! { "name" => "plant sale!", "n" => "2" },
        ];

        let found = find_by_identity(&records, &["name"], &Identity::new(["plant-sale"]));
        assert_eq!(found.unwrap().text("n"), "1");
    }

    #[test]
    fn titles_and_missing_values() {
        let record = record! { "first" => "Ada", "last" => "Lovelace", "tags" => list!["a", "b"] };
        assert_eq!(title_of(&record, &["first", "last"], " "), "Ada Lovelace");
        assert_eq!(title_of(&record, &["first", "middle"], ", "), "Ada");
        assert_eq!(title_of(&record, &["first", "middle", "suffix"], ", "), "Ada");
        assert_eq!(title_of(&record, &["middle", "last"], ", "), ", Lovelace");
        assert_eq!(title_of(&record, &["first", "last"], ""), "AdaLovelace");
        assert_eq!(identity_of(&record, &["middle", "tags"]), Identity::new(["", "a-b"]));
    }

    #[test]
    fn references_round_trip_through_locators() {
        let records = meetings();
        let keys = ["month", "day", "year"];
        let locator = detail_reference(&records[1], &keys, "meetings");
        assert_eq!(locator.to_string(), "details.html?src=meetings&month=may&day=18&year=2030");

        let parsed = Locator::parse(&locator.to_string());
        let requested = Identity::requested(&parsed, &keys);
        let found = find_by_identity(&records, &keys, &requested).unwrap();
        assert_eq!(found.text("topic"), "Soil");

        let category = category_reference("gardens", &["herbs"], "Culinary Mints");
        assert_eq!(category.to_string(), "gardens.html?src=gardens&cat=herbs&cat=culinary-mints");
    }
}
