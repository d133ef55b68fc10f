use std::path::Path;

use serde::de::DeserializeOwned;

use crate::error::{Error, Result, Chainable};
use crate::value::{Source, Value};

/// A structured data format content can be written in.
pub trait Format: Sized {
    /// The format's name, for diagnostics.
    const NAME: &'static str;

    /// File extensions, without the leading `.`, recognized as this format.
    const EXTENSIONS: &'static [&'static str];

    /// The data format's error type.
    type Error: Into<Error>;

    /// Parses `string` as the data format `Self` as a `T` or returns an error
    /// if the `string` is an invalid `T`. Prefer [`Format::read()`], which
    /// attaches the input's path to errors.
    fn from_str<T: DeserializeOwned>(string: &str) -> Result<T, Self::Error>;

    fn read<I: Source, T: DeserializeOwned>(input: I) -> Result<T> {
        let path = input.path().map(|p| p.display().to_string());
        let string = input.read()?;
        Self::from_str(&string).chain_with(|| error! {
            format!("failed to parse {}", Self::NAME),
            "file path" => path.as_deref().unwrap_or("<memory>"),
        })
    }

    fn handles(path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .map_or(false, |ext| Self::EXTENSIONS.iter().any(|e| ext.eq_ignore_ascii_case(e)))
    }
}

macro_rules! impl_format {
    ($name:ident : $func:expr, $E:ty, [$($ext:literal),+]) => (
        #[derive(Debug, Clone, Copy, Default)]
        pub struct $name;

        impl Format for $name {
            const NAME: &'static str = stringify!($name);
            const EXTENSIONS: &'static [&'static str] = &[$($ext),+];

            type Error = $E;

            fn from_str<T: DeserializeOwned>(s: &str) -> Result<T, $E> {
                $func(s)
            }
        }
    );
}

impl_format!(Toml: toml::from_str, toml::de::Error, ["toml"]);
impl_format!(Json: serde_json::from_str, serde_json::Error, ["json"]);

/// Returns `true` if `path` names a file in a format [`read_value()`] knows.
pub fn is_data_file(path: &Path) -> bool {
    Toml::handles(path) || Json::handles(path)
}

/// Reads the file at `path` as a [`Value`], choosing the format by extension.
pub fn read_value(path: &Path) -> Result<Value> {
    if Toml::handles(path) {
        Toml::read(path)
    } else if Json::handles(path) {
        Json::read(path)
    } else {
        err! {
            "unrecognized content file format",
            "file path" => path.display(),
            "known extensions" => "toml, json",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_errors_carry_context() {
        let error = Json::read::<_, Value>("{ not json").unwrap_err();
        assert_eq!(error.message(), "failed to parse Json");
        assert_eq!(error.parameter("file path"), Some("<memory>"));
        assert!(error.cause().is_some());
    }

    #[test]
    fn formats_by_extension() {
        assert!(Toml::handles(Path::new("content/gardens.TOML")));
        assert!(Json::handles(Path::new("recipes.json")));
        assert!(!is_data_file(Path::new("notes.md")));
        assert!(read_value(Path::new("notes.md")).is_err());
    }
}
