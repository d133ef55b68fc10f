use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::content::Collection;
use crate::link::LinkStyle;

/// A page column that views are written into.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Column {
    #[default]
    Main,
    Side,
}

impl Column {
    pub fn class(self) -> &'static str {
        match self {
            Column::Main => "main",
            Column::Side => "side",
        }
    }
}

/// How one content domain is displayed.
///
/// Every option but `identity-keys` has a default:
///
/// ```rust
/// use trellis::config::{Column, DisplayConfig};
///
/// let config: DisplayConfig = toml::from_str(r#"
///     identity-keys = ["month", "day", "year"]
///     title-keys = ["topic"]
///     track-selection = true
/// "#).unwrap();
///
/// assert_eq!(&*config.title_keys()[0], "topic");
/// assert_eq!(config.title_separator, " ");
/// assert_eq!(config.image_column, Column::Side);
/// assert!(config.track_selection && !config.open_in_new_tab);
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct DisplayConfig {
    pub identity_keys: Vec<Arc<str>>,
    #[serde(default)]
    pub title_keys: Option<Vec<Arc<str>>>,
    #[serde(default = "default_separator")]
    pub title_separator: String,
    #[serde(default)]
    pub category_column: Column,
    #[serde(default)]
    pub detail_column: Column,
    #[serde(default = "side")]
    pub image_column: Column,
    #[serde(default = "side")]
    pub event_column: Column,
    #[serde(default)]
    pub ignored_categories: Vec<String>,
    #[serde(default)]
    pub dropdown_categories: bool,
    #[serde(default)]
    pub tabular_detail: bool,
    #[serde(default)]
    pub open_in_new_tab: bool,
    #[serde(default)]
    pub track_selection: bool,
    /// The content domain name; `None` means the content file's stem.
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub link_style: LinkStyle,
    #[serde(default = "default_image_root")]
    pub image_root: String,
}

fn default_separator() -> String { " ".into() }
fn default_image_root() -> String { "images".into() }
fn side() -> Column { Column::Side }

impl DisplayConfig {
    /// A configuration with default options for records identified by `keys`.
    pub fn new<I, K>(keys: I) -> Self
        where I: IntoIterator<Item = K>, K: Into<Arc<str>>
    {
        DisplayConfig {
            identity_keys: keys.into_iter().map(Into::into).collect(),
            title_keys: None,
            title_separator: default_separator(),
            category_column: Column::Main,
            detail_column: Column::Main,
            image_column: Column::Side,
            event_column: Column::Side,
            ignored_categories: vec![],
            dropdown_categories: false,
            tabular_detail: false,
            open_in_new_tab: false,
            track_selection: false,
            source: None,
            link_style: LinkStyle::Query,
            image_root: default_image_root(),
        }
    }

    /// The title keys, defaulting to the identity keys.
    pub fn title_keys(&self) -> &[Arc<str>] {
        self.title_keys.as_deref().unwrap_or(&self.identity_keys)
    }

    /// Identity and title keys: the fields generic views leave out.
    pub fn key_fields(&self) -> impl Iterator<Item = Arc<str>> + '_ {
        self.identity_keys.iter().chain(self.title_keys()).cloned()
    }

    /// The domain name for `collection`: `source` if set, else the
    /// collection's own name.
    pub fn source_name<'a>(&'a self, collection: &'a Collection) -> &'a str {
        self.source.as_deref().unwrap_or(collection.name())
    }

    /// Checks that `self` can address records in `collection`.
    ///
    /// There must be at least one identity key, and, unless `collection` is
    /// empty, every identity key must be carried by some record.
    pub fn validate(&self, collection: &Collection) -> Result<()> {
        if self.identity_keys.is_empty() {
            return err!("no identity keys configured", "collection" => collection.name());
        }

        if collection.is_empty() {
            return Ok(());
        }

        for key in &self.identity_keys {
            if !collection.records().iter().any(|r| r.contains_key(&**key)) {
                return err! {
                    "identity key is not a field of any record",
                    "key" => key,
                    "collection" => collection.name(),
                };
            }
        }

        Ok(())
    }
}
