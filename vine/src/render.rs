use std::collections::VecDeque;
use std::fmt::Write;
use std::sync::Arc;

use chrono::NaiveDateTime;
use rayon::prelude::*;
use rustc_hash::FxHashSet;
use tracing::{debug, info, warn};

use trellis::{error, ContentDisplay, Page, Site};
use trellis::config::Column;
use trellis::content::Collection;
use trellis::error::{Chainable, Result};
use trellis::group::{top_level_categories, CategoryEntry, CategoryView};
use trellis::link::{category_reference, identity_of, LinkStyle, Locator};
use trellis::matcher::FilterState;
use trellis::render::{escape, to_html};
use trellis::util::slugify;

use crate::discover::{files, Vine};
use crate::util::write_file;

/// Walks an image's `data-fallbacks` until one loads or none are left.
const LOAD_ALTERNATIVE: &str = r#"function loadAlternative(img) {
  var rest = (img.dataset.fallbacks || "").split(" ").filter(Boolean);
  if (!rest.length) {
    img.onerror = null;
    img.style.display = "none";
    return;
  }

  img.dataset.fallbacks = rest.slice(1).join(" ");
  img.src = rest[0];
}"#;

impl Vine {
    /// Writes the listing, category and detail pages of every configured
    /// domain in `site`, then copies the site's assets.
    pub fn render_site(&self, site: &Site, now: NaiveDateTime) -> Result<()> {
        site.collections.par_iter()
            .map(|collection| self.render_domain(collection, now))
            .collect::<Result<()>>()?;

        self.copy_assets()
    }

    fn render_domain(&self, collection: &Arc<Collection>, now: NaiveDateTime) -> Result<()> {
        let Some(config) = self.settings.domains.get(collection.name()) else {
            return Ok(());
        };

        // Static hosts can't route on query parameters.
        let mut config = config.clone();
        config.link_style = LinkStyle::Path;

        let mut display = ContentDisplay::new(collection.clone(), config)
            .chain_with(|| error!("invalid display configuration", "domain" => collection.name()))?;

        let nav = display.top_nav();
        let source = display.source().to_string();

        let mut listing = nav.clone();
        listing.title = Some(display.collection().name().to_string());
        listing.merge(display.category_view(&[] as &[&str]));
        listing.merge(display.links(&FilterState::new()));
        listing.merge(display.upcoming_events(now));
        self.write_page(&Locator::new(format!("{source}.html")), &listing)?;

        let prefixes = category_prefixes(&display);
        prefixes.par_iter().map(|prefix| {
            let category = prefix.last().map(String::as_str).unwrap_or_default();
            let mut page = nav.clone();
            page.title = Some(category.to_string());
            page.merge(display.category_view(prefix));
            self.write_page(&category_reference(&source, &prefix[..prefix.len() - 1], category), &page)
        }).collect::<Result<()>>()?;

        display.collection().records().par_iter().map(|record| {
            let locator = display.detail_locator(record);
            if identity_of(record, &display.config().identity_keys).iter().any(String::is_empty) {
                warn!(domain = %source, path = %locator.to_path(), "record has an empty identity value");
            }

            let mut page = nav.clone();
            page.merge(display.details(&locator));
            page.merge(display.next_event(now));
            self.write_page(&locator, &page)
        }).collect::<Result<()>>()?;

        info!(domain = %source, records = collection.len(), categories = prefixes.len(), "rendered domain");
        Ok(())
    }

    fn write_page(&self, locator: &Locator, page: &Page) -> Result<()> {
        let path = locator.to_path();
        debug!(%path, "writing page");
        write_file(&self.output.join(&path), self.layout(page))
    }

    fn layout(&self, page: &Page) -> String {
        let site = &self.settings.site;
        let heading = page.title.as_deref().unwrap_or(&site.title);
        let mut html = String::new();
        let _ = write!(html, "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n\
            <meta charset=\"utf-8\">\n<base href=\"{}\">\n<title>{} | {}</title>\n\
            <script>{LOAD_ALTERNATIVE}</script>\n</head>\n<body>\n",
            escape(&site.root), escape(heading), escape(&site.title));

        let _ = write!(html, "<div id=\"header\"><h1>{}</h1><nav class=\"topnav\">{}</nav></div>\n",
            escape(heading), to_html(&page.nav));

        for column in [Column::Main, Column::Side] {
            let _ = write!(html, "<div class=\"column {}\">{}</div>\n",
                column.class(), to_html(page.region(column)));
        }

        html.push_str("</body>\n</html>\n");
        html
    }

    fn copy_assets(&self) -> Result<()> {
        let Some(root) = &self.asset_root else {
            return Ok(());
        };

        files(root)?.par_iter().map(|path| {
            let Ok(relative) = path.strip_prefix(root) else {
                return Ok(());
            };

            let contents = std::fs::read(path).chain_with(|| error! {
                "failed to read asset",
                "path" => path.display(),
            })?;

            write_file(&self.output.join(relative), contents)
        }).collect()
    }
}

/// The slug path of every category linked from the root category view, the
/// top-level categories, or the views they lead to, breadth first.
fn category_prefixes(display: &ContentDisplay) -> Vec<Vec<String>> {
    let records = display.collection().records();
    let ignored = &display.config().ignored_categories;
    let mut queue: VecDeque<Vec<String>> = top_level_categories(records, ignored)
        .iter()
        .map(|category| vec![slugify(category)])
        .collect();

    queue.push_front(vec![]);

    let mut seen = FxHashSet::default();
    let mut prefixes = vec![];
    while let Some(prefix) = queue.pop_front() {
        if !seen.insert(prefix.clone()) {
            continue;
        }

        let view = CategoryView::build(records, &prefix, ignored);
        for entry in view.groups.iter().flat_map(|group| &group.entries) {
            if let CategoryEntry::Subcategory { name, prefix } = entry {
                let mut next = prefix.clone();
                next.push(slugify(name));
                queue.push_back(next);
            }
        }

        if !prefix.is_empty() {
            prefixes.push(prefix);
        }
    }

    prefixes
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn site_dir() -> tempfile::TempDir {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path();
        std::fs::create_dir_all(root.join("content")).unwrap();
        std::fs::create_dir_all(root.join("assets/images")).unwrap();
        std::fs::write(root.join("assets/images/default.svg"), "<svg/>").unwrap();
        std::fs::write(root.join("config.toml"), r#"
            [site]
            title = "Community Garden"

            [domains.gardens]
            identity-keys = ["name"]
            ignored-categories = ["Retired"]
        "#).unwrap();

        std::fs::write(root.join("content/gardens.json"), r#"{ "gardens": { "garden": [
            { "name": "Herb Spiral", "category": "Herbs/Culinary", "sun": "Full",
              "when": ["2030-01-01 19:00"] },
            { "name": "Shade Bed", "category": ["Perennials", "Retired/Old"] },
            { "name": "Rain Garden", "category": "Perennials/Wet" },
            { "name": "???", "category": "Herbs" }
        ]}}"#).unwrap();

        std::fs::write(root.join("content/notes.toml"), "[[note]]\ntext = \"unconfigured\"").unwrap();
        dir
    }

    #[test]
    fn renders_every_page() {
        let dir = site_dir();
        let out = dir.path().join("out");
        let vine = Vine::new(dir.path(), &out).unwrap();
        let site = vine.discover().unwrap();
        let now = NaiveDate::from_ymd_opt(2029, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        vine.render_site(&site, now).unwrap();

        let read = |path: &str| std::fs::read_to_string(out.join(path)).unwrap();
        let listing = read("gardens.html");
        assert!(listing.contains("<base href=\"/\">"));
        assert!(listing.contains(r#"<a href="gardens/herbs.html" target="_self">Herbs</a>"#));
        assert!(listing.contains(r#"<a href="details/gardens/shade-bed.html" target="_self">Shade Bed</a>"#));
        assert!(listing.contains("<h4>Tue Jan 01 2030</h4>"));
        assert!(listing.contains("function loadAlternative(img)"));

        assert!(listing.contains(r#"href="gardens/herbs/culinary.html""#));
        assert!(read("gardens/herbs.html").contains("details/gardens/herb-spiral.html"));
        assert!(read("gardens/herbs/culinary.html").contains("details/gardens/herb-spiral.html"));
        assert!(read("gardens/perennials/wet.html").contains("Rain Garden"));
        assert!(!out.join("gardens/retired.html").exists());

        let detail = read("details/gardens/herb-spiral.html");
        assert!(detail.contains("<h1>Herb Spiral</h1>"));
        assert!(detail.contains("<h3>Sun</h3><p>Full</p>"));
        assert!(detail.contains(r#"data-fallbacks="images/herb-spiral.png"#));
        assert!(read("details/gardens/_.html").contains("<h1>???</h1>"));
        assert!(!out.join("details/gardens/.html").exists());

        assert_eq!(read("images/default.svg"), "<svg/>");
        assert!(!out.join("notes.html").exists());
    }

    #[test]
    fn invalid_configuration_fails() {
        let dir = site_dir();
        std::fs::write(dir.path().join("config.toml"), "[domains.gardens]\nidentity-keys = [\"slug\"]").unwrap();

        let vine = Vine::new(dir.path(), dir.path().join("out")).unwrap();
        let site = vine.discover().unwrap();
        let now = NaiveDate::from_ymd_opt(2029, 1, 1).unwrap().and_hms_opt(0, 0, 0).unwrap();
        let error = vine.render_site(&site, now).unwrap_err();
        assert_eq!(error.message(), "invalid display configuration");
    }
}
