use std::fmt::{self, Write};
use std::path::Path;
use std::sync::Arc;
use std::collections::BTreeMap;

use tracing::{debug, warn};

use crate::error::{Chainable, Result};
use crate::value::{read_value, Record, Value};
use crate::group::category_paths;

/// The records of one content domain, in source order.
#[derive(Debug, Clone, PartialEq)]
pub struct Collection {
    name: Arc<str>,
    records: Arc<[Record]>,
}

impl Collection {
    pub fn new<N: Into<Arc<str>>>(name: N, records: Vec<Record>) -> Self {
        Collection { name: name.into(), records: records.into() }
    }

    /// Builds a collection from a parsed content document.
    ///
    /// The document is either a list of records or a record. Records with a
    /// single field are wrappers and are descended into; any other record is
    /// a collection of one. An empty document is an empty collection.
    ///
    /// ```rust
    /// use trellis::content::Collection;
    /// use trellis::value::Value;
    ///
    /// let doc: Value = serde_json::from_str(r#"{
    ///     "activities": { "activity": [
    ///         { "name": "Seed Swap" },
    ///         { "name": "Plant Sale" }
    ///     ]}
    /// }"#).unwrap();
    ///
    /// let activities = Collection::from_value("activities", doc).unwrap();
    /// assert_eq!(activities.len(), 2);
    /// assert_eq!(activities.records()[1].text("name"), "Plant Sale");
    /// ```
    pub fn from_value<N: Into<Arc<str>>>(name: N, document: Value) -> Result<Self> {
        let name = name.into();
        let mut value = document;
        loop {
            value = match value {
                Value::Record(record) if record.len() == 1 => {
                    let inner = record.values()
                        .find(|inner| !matches!(inner, Value::Scalar(_)))
                        .cloned();

                    match inner {
                        Some(inner) => inner,
                        None => return Ok(Collection::new(name, vec![Arc::unwrap_or_clone(record)])),
                    }
                }
                Value::Record(record) => {
                    return Ok(Collection::new(name, vec![Arc::unwrap_or_clone(record)]));
                }
                Value::List(items) => {
                    let records = items.iter()
                        .enumerate()
                        .filter_map(|(i, item)| match item {
                            Value::Record(record) => Some(Record::clone(record)),
                            _ => {
                                warn!(collection = %name, index = i, kind = item.kind(), "skipping non-record entry");
                                None
                            }
                        })
                        .collect();

                    return Ok(Collection::new(name, records));
                }
                Value::Scalar(s) if s.trim().is_empty() => return Ok(Collection::new(name, vec![])),
                Value::Scalar(_) => return err!("content document holds no records", "collection" => name),
            };
        }
    }

    /// Reads the content file at `path`, named by its file stem.
    pub fn read(path: &Path) -> Result<Self> {
        let name = path.file_stem()
            .map(|stem| stem.to_string_lossy())
            .ok_or_else(|| error!("content path has no file name", "path" => path.display()))?;

        let document = read_value(path)?;
        let collection = Collection::from_value(&*name, document)
            .chain_with(|| error!("failed to load content", "path" => path.display()))?;

        debug!(collection = %collection.name, records = collection.len(), "loaded content");
        Ok(collection)
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn records(&self) -> &[Record] {
        &self.records
    }

    pub fn get(&self, index: usize) -> Option<&Record> {
        self.records.get(index)
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, Record> {
        self.records.iter()
    }
}

impl<'a> IntoIterator for &'a Collection {
    type Item = &'a Record;
    type IntoIter = std::slice::Iter<'a, Record>;

    fn into_iter(self) -> Self::IntoIter {
        self.records.iter()
    }
}

/// Every content domain of a site, in insertion order.
#[derive(Debug, Default, Clone)]
pub struct Site {
    pub collections: Vec<Arc<Collection>>,
}

#[derive(Default)]
struct CategoryTree(BTreeMap<String, CategoryTree>);

impl CategoryTree {
    fn insert(&mut self, path: &[&str]) {
        if let Some((first, rest)) = path.split_first() {
            self.0.entry(first.to_string()).or_default().insert(rest);
        }
    }
}

impl Site {
    pub fn new() -> Site {
        Site::default()
    }

    pub fn insert(&mut self, collection: Collection) -> Arc<Collection> {
        let collection = Arc::new(collection);
        self.collections.push(collection.clone());
        collection
    }

    pub fn get(&self, name: &str) -> Option<&Arc<Collection>> {
        self.collections.iter().find(|c| c.name() == name)
    }

    fn vis_heading<W: Write>(out: &mut W, siblings: &[bool], text: &str) -> fmt::Result {
        for (j, sibling) in siblings.iter().enumerate() {
            match (sibling, j == siblings.len() - 1) {
                (false, false) => out.write_str("    ")?,
                (false, true) => out.write_str("└── ")?,
                (true, false) => out.write_str("│   ")?,
                (true, true) => out.write_str("├── ")?,
            }
        }

        writeln!(out, "{text}")
    }

    fn vis_categories<W: Write>(out: &mut W, siblings: &mut Vec<bool>, tree: &CategoryTree) -> fmt::Result {
        for (k, (name, subtree)) in tree.0.iter().enumerate() {
            siblings.push(k < tree.0.len() - 1);
            Self::vis_heading(out, siblings, &format!("🏷 {name}"))?;
            Self::vis_categories(out, siblings, subtree)?;
            siblings.pop();
        }

        Ok(())
    }

    /// Writes the site's domains and their category trees to `out`.
    pub fn write_tree<W: Write>(&self, out: &mut W) -> fmt::Result {
        Self::vis_heading(out, &[], "🗂 site")?;
        for (i, collection) in self.collections.iter().enumerate() {
            let i_sib = i < self.collections.len() - 1;
            let heading = format!("📦 {} ({} records)", collection.name(), collection.len());
            Self::vis_heading(out, &[i_sib], &heading)?;

            let mut tree = CategoryTree::default();
            for record in collection.iter() {
                for path in category_paths(record) {
                    tree.insert(&path);
                }
            }

            Self::vis_categories(out, &mut vec![i_sib], &tree)?;
        }

        Ok(())
    }

    /// Prints the site's domains and their category trees.
    pub fn visualize(&self) {
        let mut out = String::new();
        if self.write_tree(&mut out).is_ok() {
            print!("{out}");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record, list};

    #[test]
    fn unwrapping() {
        let single = Value::from(record! { "name" => "Mint", "sun" => "full" });
        assert_eq!(Collection::from_value("x", single).unwrap().len(), 1);

        let wrapped_one = Value::from(record! { "garden" => record! { "name" => "Mint" } });
        let garden = Collection::from_value("x", wrapped_one).unwrap();
        assert_eq!(garden.records()[0].text("name"), "Mint");

        let one_field = Value::from(record! { "name" => "Mint" });
        assert_eq!(Collection::from_value("x", one_field).unwrap().records()[0].text("name"), "Mint");

        let mixed = list![record! { "name" => "Mint" }, "stray", record! { "name" => "Sage" }];
        assert_eq!(Collection::from_value("x", mixed).unwrap().len(), 2);

        assert!(Collection::from_value("x", Value::from("")).unwrap().is_empty());
        assert!(Collection::from_value("x", Value::from("nope")).is_err());
    }

    #[test]
    fn read_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("recipes.toml");
        std::fs::write(&path, "[[recipe]]\nname = 'Green Soup'\n\n[[recipe]]\nname = 'Pesto'\n").unwrap();

        let recipes = Collection::read(&path).unwrap();
        assert_eq!(recipes.name(), "recipes");
        assert_eq!(recipes.iter().map(|r| r.text("name")).collect::<Vec<_>>(), ["Green Soup", "Pesto"]);

        std::fs::write(&path, "name = ").unwrap();
        let error = Collection::read(&path).unwrap_err();
        assert!(error.to_string().contains("recipes.toml"));
    }

    #[test]
    fn tree_output() {
        let mut site = Site::new();
        site.insert(Collection::new("gardens", vec![
            record! { "name" => "Mint", "category" => "Herbs/Mints" },
            record! { "name" => "Sage", "category" => list!["Herbs", "Perennials"] },
        ]));
        site.insert(Collection::new("recipes", vec![]));

        let mut out = String::new();
        site.write_tree(&mut out).unwrap();
        assert_eq!(out, "🗂 site\n\
            ├── 📦 gardens (2 records)\n\
            │   ├── 🏷 Herbs\n\
            │   │   └── 🏷 Mints\n\
            │   └── 🏷 Perennials\n\
            └── 📦 recipes (0 records)\n");
        assert!(site.get("recipes").unwrap().is_empty());
    }
}
