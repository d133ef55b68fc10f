use std::fs;
use std::sync::Arc;
use std::fmt::Debug;
use std::path::{Path, PathBuf};

use crate::error::{Result, Chainable};

/// Something that can be read as text: an in-memory string or a file.
pub trait Source: Debug {
    fn read(self) -> Result<Arc<str>>;

    fn path(&self) -> Option<&Path> {
        None
    }
}

impl Source for String {
    fn read(self) -> Result<Arc<str>> {
        Ok(self.into())
    }
}

impl Source for &str {
    fn read(self) -> Result<Arc<str>> {
        Ok(self.into())
    }
}

impl Source for Arc<str> {
    fn read(self) -> Result<Arc<str>> {
        Ok(self)
    }
}

impl Source for &Path {
    fn read(self) -> Result<Arc<str>> {
        let string = fs::read_to_string(self).chain(error! {
            "failed to open file for reading",
            "file path" => self.display()
        })?;

        Ok(string.into())
    }

    fn path(&self) -> Option<&Path> {
        Some(self)
    }
}

impl Source for &PathBuf {
    fn read(self) -> Result<Arc<str>> {
        self.as_path().read()
    }

    fn path(&self) -> Option<&Path> {
        Some(self.as_path())
    }
}
