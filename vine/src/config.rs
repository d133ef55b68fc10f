use std::path::Path;

use rustc_hash::FxHashMap;
use serde::{Deserialize, Serialize};

use trellis::config::DisplayConfig;
use trellis::error::Result;
use trellis::value::{Format, Toml};

/// The contents of a site's `config.toml`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Settings {
    #[serde(default)]
    pub site: SiteSettings,
    /// Display configuration by content domain name.
    #[serde(default)]
    pub domains: FxHashMap<String, DisplayConfig>,
}

#[derive(Debug, Deserialize, Serialize)]
pub struct SiteSettings {
    #[serde(default = "default_title")]
    pub title: String,
    /// The URL the site is served from, used as every page's base.
    #[serde(default = "default_root")]
    pub root: String,
}

fn default_title() -> String { "Site".into() }
fn default_root() -> String { "/".into() }

impl Default for SiteSettings {
    fn default() -> Self {
        SiteSettings { title: default_title(), root: default_root() }
    }
}

impl Settings {
    /// Reads `config.toml` in `input`, or returns the defaults if there's
    /// none.
    pub fn discover(input: &Path) -> Result<Self> {
        let path = input.join(crate::CONFIG_FILE);
        let mut settings: Settings = match path.is_file() {
            true => Toml::read(&path)?,
            false => Settings::default(),
        };

        if !settings.site.root.ends_with('/') {
            settings.site.root.push('/');
        }

        Ok(settings)
    }
}
