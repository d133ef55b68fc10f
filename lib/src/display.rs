//! Views of one content domain, written into the regions of a [`Page`].
//!
//! A [`ContentDisplay`] ties a [`Collection`] to its [`DisplayConfig`] and
//! produces every derived view: details, filtered listings, category views,
//! the top-level category menu, events, and search suggestions. Interactive
//! controls in a view are registered on the page as [`Action`]s keyed by
//! element id; the page's owner hands them back to
//! [`ContentDisplay::dispatch()`] when the control is used.

use std::sync::Arc;

use chrono::NaiveDateTime;
use derive_more::Debug;
use indexmap::IndexMap;
use rustc_hash::FxHashMap;
use tracing::debug;

use crate::error::Result;
use crate::config::{Column, DisplayConfig};
use crate::content::Collection;
use crate::group::{self, top_level_categories, CategoryEntry, CategoryView};
use crate::link::{category_reference, detail_reference, find_by_identity, title_of, Identity, Locator};
use crate::matcher::{matches_filters, FilterState, Matchers, Search, Suggestion};
use crate::render::{render_images, ImageOptions, ImagePolicy, ImageRef, MarkupTranslator, Node, Renderer};
use crate::selection::Selection;
use crate::util::slugify;
use crate::value::Record;

/// Element id of the listing of filtered records.
pub const RESULTS_ID: &str = "filter-results";
/// Element id of the clear-all-filters control.
pub const CLEAR_FILTERS_ID: &str = "clear-filters";
pub const SELECT_ALL_ID: &str = "select-all";
pub const CLEAR_SELECTION_ID: &str = "clear-selection";

/// What a page control does when it's used.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    /// Flip the selection of the record at this collection index.
    ToggleSelection(usize),
    /// Set the filter, or clear it if it's already set to `value`.
    ToggleFilter { field: Arc<str>, value: String },
    ClearFilters,
    SelectAll,
    ClearSelection,
}

/// Rendered output: a title, a navigation bar, one node sequence per column,
/// and the actions of the controls among them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub title: Option<String>,
    pub nav: Vec<Node>,
    regions: IndexMap<Column, Vec<Node>>,
    actions: FxHashMap<String, Action>,
}

impl Page {
    pub fn new() -> Self {
        Page::default()
    }

    /// The nodes written into `column`, in order.
    pub fn region(&self, column: Column) -> &[Node] {
        self.regions.get(&column).map(|nodes| &nodes[..]).unwrap_or(&[])
    }

    pub fn push(&mut self, column: Column, node: Node) {
        self.regions.entry(column).or_default().push(node);
    }

    pub fn extend<I: IntoIterator<Item = Node>>(&mut self, column: Column, nodes: I) {
        self.regions.entry(column).or_default().extend(nodes);
    }

    pub fn regions(&self) -> impl Iterator<Item = (Column, &[Node])> {
        self.regions.iter().map(|(column, nodes)| (*column, &nodes[..]))
    }

    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.nav.is_empty() && self.regions.values().all(|r| r.is_empty())
    }

    /// Binds the control with element id `id` to `action`.
    pub fn register<I: Into<String>>(&mut self, id: I, action: Action) {
        self.actions.insert(id.into(), action);
    }

    /// The action bound to the control with element id `id`.
    pub fn action(&self, id: &str) -> Option<&Action> {
        self.actions.get(id)
    }

    pub fn actions(&self) -> impl Iterator<Item = (&str, &Action)> {
        self.actions.iter().map(|(id, action)| (id.as_str(), action))
    }

    /// Moves everything in `other` into `self`. `other`'s title, if any,
    /// replaces `self`'s.
    pub fn merge(&mut self, other: Page) {
        if other.title.is_some() {
            self.title = other.title;
        }

        self.nav.extend(other.nav);
        for (column, nodes) in other.regions {
            self.extend(column, nodes);
        }

        self.actions.extend(other.actions);
    }
}

/// Receives the records a selection view applies to.
pub type SelectionCallback = dyn Fn(&[&Record]) + Send + Sync;

/// The views of one content domain.
#[derive(Debug)]
pub struct ContentDisplay {
    collection: Arc<Collection>,
    config: DisplayConfig,
    matchers: Matchers,
    renderer: Renderer,
    selection: Selection,
    /// Indices of the records in the most recent listing.
    listed: Vec<usize>,
    #[debug(ignore)]
    on_selection: Option<Box<SelectionCallback>>,
}

impl ContentDisplay {
    /// A display of `collection` under `config`, with an in-memory
    /// selection. Fails if `config` can't address `collection`'s records.
    pub fn new(collection: Arc<Collection>, config: DisplayConfig) -> Result<Self> {
        config.validate(&collection)?;
        let renderer = Renderer::new(config.key_fields());
        Ok(ContentDisplay {
            collection,
            config,
            renderer,
            matchers: Matchers::new(),
            selection: Selection::memory(),
            listed: vec![],
            on_selection: None,
        })
    }

    pub fn with_matchers(mut self, matchers: Matchers) -> Self {
        self.matchers = matchers;
        self
    }

    pub fn with_translator<T: MarkupTranslator + 'static>(mut self, translator: T) -> Self {
        self.renderer = self.renderer.with_translator(translator);
        self
    }

    pub fn with_selection(mut self, selection: Selection) -> Self {
        self.selection = selection;
        self
    }

    /// Calls `callback` whenever the records a selection applies to change:
    /// the selected records, or the listed ones when nothing is selected.
    pub fn on_selection<F>(mut self, callback: F) -> Self
        where F: Fn(&[&Record]) + Send + Sync + 'static
    {
        self.on_selection = Some(Box::new(callback));
        self
    }

    pub fn collection(&self) -> &Collection {
        &self.collection
    }

    pub fn config(&self) -> &DisplayConfig {
        &self.config
    }

    pub fn selection(&self) -> &Selection {
        &self.selection
    }

    /// The content domain name used in locators.
    pub fn source(&self) -> &str {
        self.config.source_name(&self.collection)
    }

    pub fn title(&self, record: &Record) -> String {
        title_of(record, self.config.title_keys(), &self.config.title_separator)
    }

    pub fn detail_locator(&self, record: &Record) -> Locator {
        detail_reference(record, &self.config.identity_keys, self.source())
    }

    fn link(&self, locator: &Locator, text: String) -> Node {
        Node::Link {
            href: locator.href(self.config.link_style),
            text,
            new_tab: self.config.open_in_new_tab,
        }
    }

    /// A link to the detail view of `record`, labeled with its title.
    pub fn detail_link(&self, record: &Record) -> Node {
        self.link(&self.detail_locator(record), self.title(record))
    }

    /// A link to the listing of `category` beneath the slugs in `prefix`.
    pub fn category_link<S: AsRef<str>>(&self, prefix: &[S], category: &str) -> Node {
        let locator = category_reference(self.source(), prefix, category);
        self.link(&locator, category.to_string())
    }

    pub fn images(&self, record: &Record, policy: ImagePolicy, second: u32) -> Vec<ImageRef> {
        let options = ImageOptions {
            root: &self.config.image_root,
            identity_keys: &self.config.identity_keys,
            title_keys: self.config.title_keys(),
            separator: &self.config.title_separator,
        };

        render_images(record, options, policy, second)
    }

    /// The record `locator` requests, if there is one.
    pub fn find(&self, locator: &Locator) -> Option<&Record> {
        let requested = Identity::requested(locator, &self.config.identity_keys);
        find_by_identity(&*self.collection, &self.config.identity_keys, &requested)
    }

    /// The detail view of the record `locator` requests. The page is empty if
    /// no record matches.
    pub fn details(&self, locator: &Locator) -> Page {
        let mut page = Page::new();
        let Some(record) = self.find(locator) else {
            debug!(%locator, "no record matches the requested identity");
            return page;
        };

        page.title = Some(self.title(record));
        match self.config.tabular_detail {
            true => page.push(self.config.detail_column, Node::Table(self.renderer.render_flat(record))),
            false => page.extend(self.config.detail_column, self.renderer.render_record(record, 3)),
        }

        let images = self.images(record, ImagePolicy::All, 0);
        page.extend(self.config.image_column, images.into_iter().map(Node::Image));
        page
    }

    /// Lists the records that pass `filters` as detail links.
    ///
    /// With selection tracking on, each link is labeled by a checkbox that is
    /// checked if the record is selected, and select-all and clear-selection
    /// controls are added. A clear-filters control is added if any filter is
    /// set. The selection callback, if any, receives the selected records or,
    /// if none are, the listed ones.
    pub fn links(&mut self, filters: &FilterState) -> Page {
        let collection = self.collection.clone();
        self.listed = collection.iter()
            .enumerate()
            .filter(|(_, record)| matches_filters(record, filters, &self.matchers))
            .map(|(i, _)| i)
            .collect();

        let mut page = Page::new();
        let mut items = Vec::with_capacity(self.listed.len());
        for &index in &self.listed {
            let record = &collection.records()[index];
            let link = self.detail_link(record);
            if !self.config.track_selection {
                items.push(vec![link]);
                continue;
            }

            let id = format!("select-{index}");
            items.push(vec![Node::Checkbox {
                id: id.clone(),
                name: "vis-select".into(),
                value: self.title(record),
                checked: self.selection.contains_record(record, &self.config.identity_keys),
                label: vec![link],
            }]);

            page.register(id, Action::ToggleSelection(index));
        }

        let mut children = vec![Node::Unordered(items)];
        if self.config.track_selection {
            children.push(self.control(&mut page, SELECT_ALL_ID, "Select all", Action::SelectAll));
            children.push(self.control(&mut page, CLEAR_SELECTION_ID, "Clear selection", Action::ClearSelection));
        }

        if !filters.is_empty() {
            children.push(self.control(&mut page, CLEAR_FILTERS_ID, "Clear filters", Action::ClearFilters));
        }

        page.push(Column::Main, Node::Block {
            class: "results".into(),
            id: Some(RESULTS_ID.into()),
            children,
        });

        match self.config.track_selection && !self.selection.is_empty() {
            true => self.notify_selected(),
            false => self.notify_listed(),
        }

        page
    }

    fn control(&self, page: &mut Page, id: &str, text: &str, action: Action) -> Node {
        page.register(id, action);
        Node::Button { id: Some(id.into()), class: None, text: text.into() }
    }

    /// A dropdown per field in `fields` holding one button per distinct value
    /// the field takes across the collection. Buttons of values set in
    /// `filters` are marked selected. Values whose slugs collide get
    /// numbered ids.
    pub fn filter_menu<F: AsRef<str>>(&self, fields: &[F], filters: &FilterState) -> Page {
        let mut page = Page::new();
        let mut menus = vec![];
        for field in fields {
            let field = field.as_ref();
            let mut values: Vec<String> = self.collection.iter()
                .filter_map(|record| record.get_either_case(field))
                .flat_map(|value| value.scalars())
                .filter(|value| !value.is_empty())
                .map(|value| value.to_lowercase())
                .collect();

            values.sort();
            values.dedup();

            let mut buttons = vec![];
            for value in values {
                let id = unique_id(&page, format!("filter-{}-{}", slugify(field), slugify(&value)));
                let selected = filters.get(field) == Some(value.as_str());
                buttons.push(Node::Button {
                    id: Some(id.clone()),
                    class: selected.then(|| "selected".into()),
                    text: value.clone(),
                });

                page.register(id, Action::ToggleFilter { field: field.into(), value });
            }

            let class = filters.get(field).map(|_| "selected".to_string());
            menus.push(Node::Block {
                class: "button-group dropdown".into(),
                id: None,
                children: vec![
                    Node::Button { id: None, class, text: field.into() },
                    Node::block("dropdown-content", buttons),
                ],
            });
        }

        page.push(Column::Main, Node::Block {
            class: "filter-group".into(),
            id: Some("filter-group".into()),
            children: menus,
        });

        page
    }

    /// Applies `action`, updating `filters` if it changes them, and returns
    /// the listing under the resulting filters.
    pub fn dispatch(&mut self, action: &Action, filters: &mut FilterState) -> Page {
        match action {
            Action::ToggleSelection(index) => self.toggle_selection(*index),
            Action::ToggleFilter { field, value } => {
                filters.toggle(field.clone(), value);
            }
            Action::ClearFilters => filters.clear(),
            Action::SelectAll => self.select_all(),
            Action::ClearSelection => self.clear_selection(),
        }

        self.links(filters)
    }

    /// Flips the selection of the record at `index`.
    pub fn toggle_selection(&self, index: usize) {
        let Some(record) = self.collection.get(index) else {
            debug!(index, "no record to toggle");
            return;
        };

        let keys = &self.config.identity_keys;
        let selected = self.selection.contains_record(record, keys);
        self.selection.set_record(record, keys, !selected);
        match self.selection.is_empty() {
            true => self.notify_listed(),
            false => self.notify_selected(),
        }
    }

    /// Selects every record in the most recent listing.
    pub fn select_all(&self) {
        for record in self.listed_records() {
            self.selection.set_record(record, &self.config.identity_keys, true);
        }

        if !self.selection.is_empty() {
            self.notify_selected();
        }
    }

    pub fn clear_selection(&self) {
        self.selection.clear();
        if !self.listed.is_empty() {
            self.notify_listed();
        }
    }

    /// The records in the most recent listing, in collection order.
    pub fn listed_records(&self) -> impl Iterator<Item = &Record> {
        self.listed.iter().filter_map(|&i| self.collection.get(i))
    }

    /// The selected records, in collection order.
    pub fn selected_records(&self) -> Vec<&Record> {
        self.selection.records(self.collection.records(), &self.config.identity_keys)
            .into_iter()
            .map(|(_, record)| record)
            .collect()
    }

    fn notify_selected(&self) {
        if let Some(callback) = &self.on_selection {
            callback(&self.selected_records());
        }
    }

    fn notify_listed(&self) {
        if let Some(callback) = &self.on_selection {
            let listed: Vec<_> = self.listed_records().collect();
            callback(&listed);
        }
    }

    /// The category view beneath `prefix`, a path of category slugs: one
    /// block per next category, with the first image of its first record and
    /// links to its subcategories and records.
    pub fn category_view<S: AsRef<str>>(&self, prefix: &[S]) -> Page {
        let view = CategoryView::build(self.collection.records(), prefix, &self.config.ignored_categories);
        let mut page = Page::new();
        for group in &view.groups {
            let links: Vec<Node> = group.entries.iter()
                .filter_map(|entry| match entry {
                    CategoryEntry::Subcategory { name, prefix } => Some(self.category_link(prefix, name)),
                    CategoryEntry::Record(i) => self.collection.get(*i).map(|r| self.detail_link(r)),
                })
                .collect();

            let image = self.collection.get(group.representative)
                .and_then(|record| self.images(record, ImagePolicy::First, 0).into_iter().next())
                .map(|image| Node::Image(image.with_class("cat-img")));

            let mut children = vec![];
            if self.config.dropdown_categories {
                children.push(Node::block("button-group dropdown", vec![
                    Node::Button { id: None, class: None, text: group.name.clone() },
                    Node::Block { class: "dropdown-content".into(), id: Some(group.slug.clone()), children: links },
                ]));

                children.extend(image);
            } else {
                children.extend(image);
                let items = links.into_iter().map(|link| vec![link]).collect();
                children.push(Node::block("cat-text", vec![
                    Node::heading(4, &*group.name),
                    Node::Block { class: "cat-links".into(), id: Some(group.slug.clone()), children: vec![Node::Unordered(items)] },
                ]));
            }

            page.push(self.config.category_column, Node::block("cat-div", children));
        }

        page
    }

    /// The category view beneath the `cat` parameters of `locator`.
    pub fn category_view_at(&self, locator: &Locator) -> Page {
        let prefix: Vec<&str> = locator.get_all("cat").collect();
        self.category_view(&prefix)
    }

    /// Links to every top-level category, alphabetically, in the page's
    /// navigation bar.
    pub fn top_nav(&self) -> Page {
        let categories = top_level_categories(self.collection.records(), &self.config.ignored_categories);
        let links = categories.iter()
            .map(|category| self.category_link(&[] as &[&str], category))
            .collect();

        let mut page = Page::new();
        page.nav.push(Node::Block {
            class: "topnav-cats".into(),
            id: Some("topnav-cat-holder".into()),
            children: links,
        });

        page
    }

    /// Every event after `now`, under a heading per day, as `time: link`.
    pub fn upcoming_events(&self, now: NaiveDateTime) -> Page {
        let events = group::upcoming_events(self.collection.records(), now);
        let mut page = Page::new();
        for (day, events) in group::group_by_day(&events) {
            let items = events.iter()
                .map(|event| vec![
                    Node::Text(format!("{}: ", event.time_label())),
                    self.detail_link(event.record),
                ])
                .collect();

            page.push(self.config.event_column, Node::heading(4, group::day_label(day)));
            page.push(self.config.event_column, Node::Unordered(items));
        }

        page
    }

    /// A link to the record with the event closest to, but after, `now`.
    pub fn next_event(&self, now: NaiveDateTime) -> Page {
        let mut page = Page::new();
        if let Some(event) = group::next_event(self.collection.records(), now) {
            page.push(self.config.event_column, self.detail_link(event.record));
        }

        page
    }

    /// Search suggestions for `term`. See [`Search::suggest()`].
    pub fn search<K: AsRef<str>>(
        &self,
        term: &str,
        static_filters: &FilterState,
        dynamic_filters: &FilterState,
        keys: &[K],
    ) -> Result<Vec<Suggestion<'_>>> {
        Search::new(&self.collection, &self.config, &self.matchers)
            .suggest(term, static_filters, dynamic_filters, keys)
    }

    /// The image previewed for a focused suggestion, picked by `second`.
    pub fn preview(&self, suggestion: &Suggestion<'_>, second: u32) -> Option<ImageRef> {
        self.images(suggestion.record, ImagePolicy::Random, second)
            .into_iter()
            .next()
            .map(|image| image.with_class("search-img"))
    }
}

/// `id`, or `id` suffixed with the first number that no action in `page` is
/// registered under yet.
fn unique_id(page: &Page, id: String) -> String {
    if page.action(&id).is_none() {
        return id;
    }

    (2..)
        .map(|n| format!("{id}-{n}"))
        .find(|candidate| page.action(candidate).is_none())
        .unwrap_or(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use chrono::NaiveDate;
    use crate::{record, list};
    use crate::link::LinkStyle;
    use crate::render::to_html;

    fn gardens() -> Arc<Collection> {
        Arc::new(Collection::new("gardens", vec![
            record! {
                "name" => "Herb Spiral",
                "sun" => "Full",
                "category" => "Herbs/Culinary",
                "images" => "Spiral:Spiral Top",
                "when" => list!["2030-01-01 19:00", "2030-01-02 09:00"],
            },
            record! { "name" => "Shade Bed", "sun" => "Shade", "category" => "Perennials", "when" => "2030-01-01 08:30" },
            record! { "name" => "Rain Garden", "sun" => "Partial", "category" => list!["Perennials/Wet", "Retired"] },
        ]))
    }

    fn display(config: DisplayConfig) -> ContentDisplay {
        ContentDisplay::new(gardens(), config).unwrap()
    }

    fn at(y: i32, m: u32, d: u32) -> NaiveDateTime {
        NaiveDate::from_ymd_opt(y, m, d).unwrap().and_hms_opt(0, 0, 0).unwrap()
    }

    static_assertions::assert_impl_all!(ContentDisplay: Send, Sync);

    #[test]
    fn invalid_configurations_fail_at_setup() {
        let error = ContentDisplay::new(gardens(), DisplayConfig::new(["title"])).unwrap_err();
        assert_eq!(error.parameter("key"), Some("title"));
    }

    #[test]
    fn details() {
        let display = display(DisplayConfig::new(["name"]));
        let locator = Locator::parse("details.html?src=gardens&name=herb-spiral");
        let page = display.details(&locator);

        assert_eq!(page.title.as_deref(), Some("Herb Spiral"));
        let main = to_html(page.region(Column::Main));
        assert!(main.starts_with("<h3>Sun</h3><p>Full</p><h3>When</h3><ol>"));
        assert!(!main.contains("Herbs/Culinary"));

        let images = page.region(Column::Side);
        assert_eq!(images.len(), 2);
        assert!(matches!(&images[1], Node::Image(image) if image.src == "images/spiral-top.jpg"));

        let missing = display.details(&Locator::parse("details.html?src=gardens&name=rock-pile"));
        assert!(missing.is_empty());
    }

    #[test]
    fn tabular_details() {
        let mut config = DisplayConfig::new(["name"]);
        config.tabular_detail = true;
        config.detail_column = Column::Side;
        config.image_column = Column::Main;

        let page = display(config).details(&Locator::parse("?name=shade-bed"));
        assert_eq!(page.region(Column::Side)[0], Node::Table(vec![
            ("sun".into(), "Shade".into()),
            ("when".into(), "2030-01-01 08:30".into()),
        ]));

        assert!(matches!(&page.region(Column::Main)[0], Node::Image(i) if i.src == "images/shade-bed.jpg"));
    }

    #[test]
    fn listings_and_selection() {
        let mut config = DisplayConfig::new(["name"]);
        config.track_selection = true;
        config.link_style = LinkStyle::Path;

        let seen = Arc::new(Mutex::new(Vec::<String>::new()));
        let sink = seen.clone();
        let mut display = display(config).on_selection(move |records| {
            *sink.lock() = records.iter().map(|r| r.text("name").to_string()).collect();
        });

        let mut filters = FilterState::new().with("category", "perennials");
        let page = display.links(&filters);
        assert_eq!(*seen.lock(), ["Shade Bed", "Rain Garden"]);
        assert_eq!(page.action("select-1"), Some(&Action::ToggleSelection(1)));
        assert_eq!(page.action(CLEAR_FILTERS_ID), Some(&Action::ClearFilters));
        assert!(page.action("select-0").is_none());

        let html = to_html(page.region(Column::Main));
        assert!(html.contains(r#"href="details/gardens/shade-bed.html""#));
        assert!(!html.contains(" checked"));

        let page = display.dispatch(&Action::ToggleSelection(2), &mut filters);
        assert_eq!(*seen.lock(), ["Rain Garden"]);
        assert!(to_html(page.region(Column::Main)).contains(" checked"));

        display.dispatch(&Action::ClearFilters, &mut filters);
        assert!(filters.is_empty());
        display.dispatch(&Action::SelectAll, &mut filters);
        assert_eq!(display.selected_records().len(), 3);

        display.dispatch(&Action::ClearSelection, &mut filters);
        assert!(display.selection().is_empty());
        assert_eq!(seen.lock().len(), 3);
    }

    #[test]
    fn filter_menus() {
        let mut display = display(DisplayConfig::new(["name"]));
        let mut filters = FilterState::new();
        let menu = display.filter_menu(&["sun"], &filters);
        let action = menu.action("filter-sun-shade").unwrap().clone();
        assert_eq!(menu.actions().count(), 3);

        let page = display.dispatch(&action, &mut filters);
        assert_eq!(filters.get("sun"), Some("shade"));
        assert_eq!(page.region(Column::Main)[0].text(), "Shade BedClear filters");

        let menu = display.filter_menu(&["sun"], &filters);
        assert!(to_html(menu.region(Column::Main)).contains(r#"class="selected">shade<"#));

        display.dispatch(&action, &mut filters);
        assert!(filters.is_empty());
    }

    #[test]
    fn filter_ids_stay_distinct() {
        let beds = Arc::new(Collection::new("beds", vec![
            record! { "name" => "North", "sun" => "Full Sun" },
            record! { "name" => "South", "sun" => "full-sun" },
            record! { "name" => "East", "sun" => "Shade!" },
            record! { "name" => "West", "sun" => "shade" },
        ]));

        let display = ContentDisplay::new(beds, DisplayConfig::new(["name"])).unwrap();
        let menu = display.filter_menu(&["sun"], &FilterState::new());
        assert_eq!(menu.actions().count(), 4);

        let filter = |id: &str| match menu.action(id) {
            Some(Action::ToggleFilter { value, .. }) => value.clone(),
            other => panic!("unexpected action {other:?}"),
        };

        assert_eq!(filter("filter-sun-full-sun"), "full sun");
        assert_eq!(filter("filter-sun-full-sun-2"), "full-sun");
        assert_eq!(filter("filter-sun-shade"), "shade");
        assert_eq!(filter("filter-sun-shade-2"), "shade!");

        let html = to_html(menu.region(Column::Main));
        assert_eq!(html.matches(r#"id="filter-sun-full-sun""#).count(), 1);
    }

    #[test]
    fn category_views() {
        let mut config = DisplayConfig::new(["name"]);
        config.ignored_categories = vec!["Retired".into()];
        let display = display(config.clone());

        let page = display.category_view(&[] as &[&str]);
        let groups = page.region(Column::Main);
        assert_eq!(groups.len(), 2);

        let herbs = to_html(&groups[0..1]);
        assert!(herbs.contains(r#"<img src="images/spiral.jpg""#));
        assert!(herbs.contains("<h4>Herbs</h4>"));
        assert!(herbs.contains(r#"href="gardens.html?src=gardens&amp;cat=herbs&amp;cat=culinary""#));

        let perennials = display.category_view_at(&Locator::parse("gardens.html?cat=perennials"));
        let text: Vec<_> = perennials.region(Column::Main).iter().map(|n| n.text()).collect();
        assert_eq!(text, ["PerennialsShade Bed", "WetRain Garden"]);

        config.dropdown_categories = true;
        let page = ContentDisplay::new(gardens(), config).unwrap().category_view(&[] as &[&str]);
        let html = to_html(page.region(Column::Main));
        assert!(html.starts_with(r#"<div class="cat-div"><div class="button-group dropdown"><button type="button">Herbs</button>"#));
    }

    #[test]
    fn navigation() {
        let mut config = DisplayConfig::new(["name"]);
        config.ignored_categories = vec!["Retired".into()];
        let nav = display(config).top_nav().nav;
        assert_eq!(nav[0].text(), "HerbsPerennials");
    }

    #[test]
    fn events() {
        let display = display(DisplayConfig::new(["name"]));
        let page = display.upcoming_events(at(2029, 12, 31));
        let html = to_html(page.region(Column::Side));
        assert!(html.starts_with("<h4>Tue Jan 01 2030</h4><ul><li>8:30 AM: <a href"));
        assert!(html.contains("<h4>Wed Jan 02 2030</h4>"));

        let next = display.next_event(at(2030, 1, 1) + chrono::Duration::hours(12));
        assert_eq!(next.region(Column::Side)[0].text(), "Herb Spiral");
        assert!(display.next_event(at(2031, 1, 1)).is_empty());
    }

    #[test]
    fn search() {
        let display = display(DisplayConfig::new(["name"]));
        let none = FilterState::new();
        let found = display.search("part", &none, &none, &[] as &[&str]).unwrap();
        assert_eq!(found.len(), 1);
        assert_eq!(found[0].title, "Rain Garden");

        let preview = display.preview(&found[0], 7).unwrap();
        assert_eq!(preview.class.as_deref(), Some("search-img"));

        let spiral = display.search("herb", &none, &none, &["name"]).unwrap();
        assert_eq!(display.preview(&spiral[0], 1).unwrap().title, "Spiral Top");
    }
}
