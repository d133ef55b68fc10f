use tracing::debug;

use crate::util::slugify;
use crate::value::{Record, Value};
use crate::walk::CATEGORY;

/// The category paths `record` declares, each split into its segments.
///
/// The category field is a `/`-separated scalar or a list of them. Blank
/// segments are dropped.
///
/// ```rust
/// use trellis::{record, list};
/// use trellis::group::category_paths;
///
/// let mint = record! { "Category" => list!["Herbs/Mints", "Tea / Bases"] };
/// assert_eq!(category_paths(&mint), [vec!["Herbs", "Mints"], vec!["Tea", "Bases"]]);
/// ```
pub fn category_paths(record: &Record) -> Vec<Vec<&str>> {
    let Some((_, value)) = record.get_ignore_case(CATEGORY) else {
        return vec![];
    };

    match value {
        Value::Record(_) => vec![],
        value => value.scalars()
            .map(split_path)
            .filter(|path| !path.is_empty())
            .collect(),
    }
}

fn split_path(path: &str) -> Vec<&str> {
    path.split('/').map(str::trim).filter(|s| !s.is_empty()).collect()
}

fn is_ignored<I: AsRef<str>>(segment: &str, ignored: &[I]) -> bool {
    ignored.iter().any(|i| i.as_ref() == segment || slugify(i.as_ref()) == slugify(segment))
}

/// The distinct first segments of every category path, sorted. Paths that
/// start with an ignored category are left out.
pub fn top_level_categories<I: AsRef<str>>(records: &[Record], ignored: &[I]) -> Vec<String> {
    let mut categories: Vec<String> = records.iter()
        .flat_map(category_paths)
        .map(|path| path[0])
        .filter(|first| !is_ignored(first, ignored))
        .map(|first| first.to_string())
        .collect();

    categories.sort();
    categories.dedup();
    categories
}

/// An item listed under a category group.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CategoryEntry {
    /// A deeper category. `prefix` holds the slugs of the path leading to it.
    Subcategory { name: String, prefix: Vec<String> },
    /// A record whose path ends at the group, by index into the collection.
    Record(usize),
}

/// The records and subcategories one segment below the selected prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup {
    pub name: String,
    pub slug: String,
    /// The first record seen in the group, by index.
    pub representative: usize,
    pub entries: Vec<CategoryEntry>,
}

/// Records grouped by the category segment that follows a selected prefix.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CategoryView {
    /// The slugs of the selected category path.
    pub prefix: Vec<String>,
    pub groups: Vec<CategoryGroup>,
}

impl CategoryView {
    /// Groups `records` beneath `prefix`, a path of category slugs.
    ///
    /// A path under `prefix` that continues past the next segment adds a
    /// subcategory link to the group for that segment, once per distinct
    /// subcategory. A path that ends at or right after `prefix` adds its
    /// record. Paths that contain an ignored category at any depth are
    /// skipped. Groups and entries appear in collection order.
    ///
    /// ```rust
    /// use trellis::record;
    /// use trellis::group::{CategoryView, CategoryEntry};
    ///
    /// let plants = vec![
    ///     record! { "name" => "Mint", "category" => "Herbs/Mints" },
    ///     record! { "name" => "Basil", "category" => "Herbs" },
    ///     record! { "name" => "Kale", "category" => "Greens" },
    /// ];
    ///
    /// let view = CategoryView::build(&plants, &[] as &[&str], &[] as &[&str]);
    /// assert_eq!(view.groups.len(), 2);
    /// assert_eq!(view.groups[0].name, "Herbs");
    /// assert_eq!(view.groups[0].entries, [
    ///     CategoryEntry::Subcategory { name: "Mints".into(), prefix: vec!["herbs".into()] },
    ///     CategoryEntry::Record(1),
    /// ]);
    /// ```
    pub fn build<S, I>(records: &[Record], prefix: &[S], ignored: &[I]) -> Self
        where S: AsRef<str>, I: AsRef<str>
    {
        let prefix: Vec<String> = prefix.iter().map(|s| slugify(s.as_ref())).collect();
        let mut view = CategoryView { prefix, groups: vec![] };
        for (index, record) in records.iter().enumerate() {
            for path in category_paths(record) {
                view.add(index, &path, ignored);
            }
        }

        view
    }

    fn add<I: AsRef<str>>(&mut self, index: usize, path: &[&str], ignored: &[I]) {
        let depth = self.prefix.len();
        let slugs: Vec<String> = path.iter().map(|s| slugify(s)).collect();
        if slugs.len() < depth || slugs[..depth] != self.prefix[..] {
            return;
        }

        if let Some(segment) = path.iter().find(|s| is_ignored(s, ignored)) {
            debug!(record = index, category = *segment, "skipping ignored category path");
            return;
        }

        let current = match path.len() > depth {
            true => depth,
            false => match depth.checked_sub(1) {
                Some(current) => current,
                None => return,
            }
        };

        let group = match self.groups.iter().position(|g| g.slug == slugs[current]) {
            Some(i) => &mut self.groups[i],
            None => {
                self.groups.push(CategoryGroup {
                    name: path[current].to_string(),
                    slug: slugs[current].clone(),
                    representative: index,
                    entries: vec![],
                });

                let last = self.groups.len() - 1;
                &mut self.groups[last]
            }
        };

        let entry = match path.get(depth + 1) {
            Some(next) => {
                let mut prefix = self.prefix.clone();
                prefix.push(slugs[current].clone());
                CategoryEntry::Subcategory { name: next.to_string(), prefix }
            }
            None => CategoryEntry::Record(index),
        };

        let seen = match &entry {
            CategoryEntry::Subcategory { name, .. } => group.entries.iter()
                .any(|e| matches!(e, CategoryEntry::Subcategory { name: n, .. } if n == name)),
            CategoryEntry::Record(i) => group.entries.contains(&CategoryEntry::Record(*i)),
        };

        if !seen {
            group.entries.push(entry);
        }
    }

    /// Every record index listed directly in some group.
    pub fn record_indices(&self) -> impl Iterator<Item = usize> + '_ {
        self.groups.iter()
            .flat_map(|g| g.entries.iter())
            .filter_map(|e| match e {
                CategoryEntry::Record(i) => Some(*i),
                _ => None,
            })
    }
}
