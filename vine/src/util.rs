use std::path::{Path, PathBuf};

use trellis::err;
use trellis::error::Result;

/// Returns the directory `path` beneath `root`, `None` if it doesn't exist
/// and `must_exist` is `false`, and an error otherwise.
#[track_caller]
pub fn dircheck<P: AsRef<Path>>(root: &Path, path: P, must_exist: bool) -> Result<Option<PathBuf>> {
    let path = root.join(path);
    match (path.metadata(), must_exist) {
        (Ok(meta), _) if meta.is_dir() => Ok(Some(path)),
        (Ok(_) | Err(_), false) => Ok(None),
        (Ok(_), true) => err! {
            format!("{} must be a directory", path.display()),
            "path is not a directory" => path.display(),
        },
        (Err(_), true) => err! {
            format!("{} must point to an existing directory", path.display()),
            "path does not exist" => path.display(),
        },
    }
}

/// Creates the parent directories of `path` and writes `contents` to it.
pub fn write_file<C: AsRef<[u8]>>(path: &Path, contents: C) -> Result<()> {
    use trellis::error::Chainable;

    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).chain_with(|| trellis::error! {
            "failed to create output directory",
            "path" => parent.display(),
        })?;
    }

    std::fs::write(path, contents).chain_with(|| trellis::error! {
        "failed to write output file",
        "path" => path.display(),
    })
}
