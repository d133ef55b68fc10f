//! The set of records a visitor has marked.
//!
//! A selection is stored by record [`Identity`] in a [`SelectionStore`]. The
//! [`FileSelection`] store outlives the process; [`MemorySelection`] does
//! not. [`Selection::open()`] picks one once, at construction, and callers
//! never see which.

use std::fmt::Debug;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use indexmap::IndexSet;
use parking_lot::RwLock;
use tracing::{debug, warn};

use crate::error::{Chainable, Result};
use crate::link::{identity_of, Identity};
use crate::value::Record;

/// Storage for a set of identities.
pub trait SelectionStore: Debug + Send + Sync {
    fn is_empty(&self) -> bool;
    fn contains(&self, id: &Identity) -> bool;
    fn add(&self, id: Identity);
    fn remove(&self, id: &Identity);
    fn clear(&self);
    /// Every stored identity, in the order they were added.
    fn all(&self) -> Vec<Identity>;
}

/// A selection that lasts as long as the process.
#[derive(Debug, Default)]
pub struct MemorySelection(RwLock<IndexSet<Identity>>);

impl MemorySelection {
    pub fn new() -> Self {
        MemorySelection::default()
    }
}

impl SelectionStore for MemorySelection {
    fn is_empty(&self) -> bool {
        self.0.read().is_empty()
    }

    fn contains(&self, id: &Identity) -> bool {
        self.0.read().contains(id)
    }

    fn add(&self, id: Identity) {
        self.0.write().insert(id);
    }

    fn remove(&self, id: &Identity) {
        self.0.write().shift_remove(id);
    }

    fn clear(&self) {
        self.0.write().clear();
    }

    fn all(&self) -> Vec<Identity> {
        self.0.read().iter().cloned().collect()
    }
}

/// A selection kept in a JSON file, rewritten on every change.
#[derive(Debug)]
pub struct FileSelection {
    path: PathBuf,
    set: RwLock<IndexSet<Identity>>,
}

impl FileSelection {
    /// Opens the selection at `path`, creating the file if it doesn't exist.
    /// Fails if the file can't be read, parsed, or written.
    pub fn open<P: Into<PathBuf>>(path: P) -> Result<Self> {
        let path = path.into();
        let set: IndexSet<Identity> = match std::fs::read_to_string(&path) {
            Ok(json) if json.trim().is_empty() => IndexSet::new(),
            Ok(json) => serde_json::from_str::<Vec<Identity>>(&json)
                .chain_with(|| error!("invalid selection file", "path" => path.display()))?
                .into_iter()
                .collect(),
            Err(e) if e.kind() == ErrorKind::NotFound => IndexSet::new(),
            Err(e) => return Err(e).chain_with(|| {
                error!("failed to read selection", "path" => path.display())
            }),
        };

        let selection = FileSelection { path, set: RwLock::new(IndexSet::new()) };
        selection.persist(&set)?;
        *selection.set.write() = set;
        Ok(selection)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self, set: &IndexSet<Identity>) -> Result<()> {
        let ids: Vec<&Identity> = set.iter().collect();
        let json = serde_json::to_string(&ids)?;
        std::fs::write(&self.path, json)
            .chain_with(|| error!("failed to write selection", "path" => self.path.display()))
    }

    fn update<F: FnOnce(&mut IndexSet<Identity>)>(&self, f: F) {
        let mut set = self.set.write();
        f(&mut *set);
        if let Err(error) = self.persist(&*set) {
            warn!(%error, "selection change not saved");
        }
    }
}

impl SelectionStore for FileSelection {
    fn is_empty(&self) -> bool {
        self.set.read().is_empty()
    }

    fn contains(&self, id: &Identity) -> bool {
        self.set.read().contains(id)
    }

    fn add(&self, id: Identity) {
        self.update(|set| { set.insert(id); });
    }

    fn remove(&self, id: &Identity) {
        self.update(|set| { set.shift_remove(id); });
    }

    fn clear(&self) {
        self.update(|set| set.clear());
    }

    fn all(&self) -> Vec<Identity> {
        self.set.read().iter().cloned().collect()
    }
}

/// A selection backed by whichever store was available when it was opened.
#[derive(Debug)]
pub struct Selection(Box<dyn SelectionStore>);

impl Selection {
    /// A selection persisted at `path`, or, if there's no `path` or it can't
    /// be used, one held in memory.
    pub fn open(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Selection::memory();
        };

        match FileSelection::open(path) {
            Ok(store) => Selection(Box::new(store)),
            Err(error) => {
                debug!(%error, "persistent selection unavailable; using memory");
                Selection::memory()
            }
        }
    }

    pub fn memory() -> Self {
        Selection(Box::new(MemorySelection::new()))
    }

    pub fn with_store<S: SelectionStore + 'static>(store: S) -> Self {
        Selection(Box::new(store))
    }

    pub fn store(&self) -> &dyn SelectionStore {
        &*self.0
    }

    pub fn contains_record<K: AsRef<str>>(&self, record: &Record, keys: &[K]) -> bool {
        self.0.contains(&identity_of(record, keys))
    }

    /// Selects `record` if `selected`, else deselects it.
    pub fn set_record<K: AsRef<str>>(&self, record: &Record, keys: &[K], selected: bool) {
        let id = identity_of(record, keys);
        match selected {
            true => self.0.add(id),
            false => self.0.remove(&id),
        }
    }

    /// The selected records among `records`, in collection order.
    pub fn records<'a, K: AsRef<str>>(&self, records: &'a [Record], keys: &[K]) -> Vec<(usize, &'a Record)> {
        if self.0.is_empty() {
            return vec![];
        }

        records.iter()
            .enumerate()
            .filter(|(_, record)| self.contains_record(record, keys))
            .collect()
    }
}

impl std::ops::Deref for Selection {
    type Target = dyn SelectionStore;

    fn deref(&self) -> &Self::Target {
        &*self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record;

    static_assertions::assert_impl_all!(Selection: Send, Sync);

    fn exercise(selection: &Selection) {
        let records = vec![
            record! { "name" => "Mint" },
            record! { "name" => "Sage" },
            record! { "name" => "Thyme" },
        ];

        assert!(selection.is_empty());
        selection.set_record(&records[2], &["name"], true);
        selection.set_record(&records[0], &["name"], true);
        assert!(selection.contains_record(&records[0], &["name"]));
        assert!(!selection.contains_record(&records[1], &["name"]));

        let chosen: Vec<_> = selection.records(&records, &["name"]).into_iter().map(|(i, _)| i).collect();
        assert_eq!(chosen, [0, 2]);
        assert_eq!(selection.all(), [Identity::new(["thyme"]), Identity::new(["mint"])]);

        selection.set_record(&records[2], &["name"], false);
        assert_eq!(selection.all(), [Identity::new(["mint"])]);
        selection.clear();
        assert!(selection.is_empty());
    }

    #[test]
    fn memory_backend() {
        exercise(&Selection::open(None));
    }

    #[test]
    fn file_backend_persists() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selection.json");
        exercise(&Selection::open(Some(&path)));

        let first = Selection::open(Some(&path));
        first.add(Identity::new(["sage"]));
        drop(first);

        let second = FileSelection::open(&path).unwrap();
        assert!(second.contains(&Identity::new(["sage"])));
        assert_eq!(second.path(), path);
    }

    #[test]
    fn unusable_files_fall_back_to_memory() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("selection.json");
        std::fs::write(&path, "{ not a list").unwrap();
        assert!(FileSelection::open(&path).is_err());

        let selection = Selection::open(Some(&path));
        selection.add(Identity::new(["mint"]));
        assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not a list");

        let missing_dir = dir.path().join("missing").join("selection.json");
        exercise(&Selection::open(Some(&missing_dir)));
    }
}
