use std::path::{Path, PathBuf};

use rayon::prelude::*;
use tracing::{debug, warn};

use trellis::{error, Collection, Site};
use trellis::error::Result;
use trellis::value::is_data_file;

use crate::{ASSETS_DIR, CONTENT_DIR};
use crate::config::Settings;
use crate::util::dircheck;

#[derive(Debug)]
pub struct Vine {
    pub input: PathBuf,
    pub output: PathBuf,
    pub settings: Settings,
    pub content_root: PathBuf,
    pub asset_root: Option<PathBuf>,
}

/// Every file beneath `root`, in sorted order.
pub fn files(root: &Path) -> Result<Vec<PathBuf>> {
    let mut files = vec![];
    for entry in jwalk::WalkDir::new(root).sort(true) {
        let entry = entry.map_err(|e| error! {
            "failed to walk directory",
            "root" => root.display(),
            "error" => e,
        })?;

        if entry.file_type().is_file() {
            files.push(entry.path());
        }
    }

    Ok(files)
}

impl Vine {
    pub fn new<I, O>(input: I, output: O) -> Result<Self>
        where I: AsRef<Path>, O: AsRef<Path>
    {
        let input = input.as_ref();
        Ok(Vine {
            input: input.to_path_buf(),
            output: output.as_ref().to_path_buf(),
            settings: Settings::discover(input)?,
            content_root: dircheck(input, CONTENT_DIR, true)?
                .ok_or_else(|| error!("missing content directory", "input" => input.display()))?,
            asset_root: dircheck(input, ASSETS_DIR, false)?,
        })
    }

    /// Reads every content file into a collection named by its file stem.
    pub fn discover(&self) -> Result<Site> {
        let paths: Vec<PathBuf> = files(&self.content_root)?
            .into_iter()
            .filter(|path| match is_data_file(path) {
                true => true,
                false => {
                    debug!(path = %path.display(), "ignoring non-content file");
                    false
                }
            })
            .collect();

        let collections = paths.par_iter()
            .map(|path| Collection::read(path))
            .collect::<Result<Vec<_>>>()?;

        let mut site = Site::new();
        for collection in collections {
            if site.get(collection.name()).is_some() {
                warn!(collection = collection.name(), "duplicate content domain; keeping the first");
                continue;
            }

            if !self.settings.domains.contains_key(collection.name()) {
                warn!(collection = collection.name(), "no display configuration; domain won't be rendered");
            }

            site.insert(collection);
        }

        Ok(site)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn discovery() {
        let dir = tempfile::tempdir().unwrap();
        let content = dir.path().join("content");
        std::fs::create_dir_all(content.join("more")).unwrap();
        std::fs::write(content.join("gardens.toml"), r#"
            [[garden]]
            name = "Herb Spiral"
            category = "Herbs"

            [[garden]]
            name = "Rain Garden"
        "#).unwrap();

        std::fs::write(content.join("more/recipes.json"), r#"[{"name": "Pesto"}]"#).unwrap();
        std::fs::write(content.join("notes.md"), "# not content").unwrap();

        let vine = Vine::new(dir.path(), dir.path().join("out")).unwrap();
        assert!(vine.asset_root.is_none());

        let site = vine.discover().unwrap();
        let names: Vec<_> = site.collections.iter().map(|c| c.name()).collect();
        assert_eq!(names, ["gardens", "recipes"]);
        assert_eq!(site.get("gardens").unwrap().len(), 2);

        std::fs::write(content.join("broken.json"), "[{").unwrap();
        assert!(vine.discover().is_err());
    }

    #[test]
    fn content_directory_is_required() {
        let dir = tempfile::tempdir().unwrap();
        assert!(Vine::new(dir.path(), dir.path().join("out")).is_err());
    }
}
