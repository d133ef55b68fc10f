use serde::{Deserialize, Serialize};

use crate::util::slugify;
use crate::value::{Record, Value};
use crate::walk::IMAGES;
use crate::link::title_of;

/// Extensions tried, in order, for an image id.
const EXTENSIONS: &[&str] = &["jpg", "png", "svg"];

/// The image shown when none of a record's own images load.
const DEFAULT_IMAGE: &str = "default";

/// Which of a record's declared images to produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ImagePolicy {
    All,
    First,
    /// One image, picked by the current second.
    Random,
}

/// An image: a primary source plus alternates to try, in order, when the
/// previous one fails to load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImageRef {
    pub src: String,
    pub title: String,
    pub fallbacks: Vec<String>,
    pub class: Option<String>,
}

impl ImageRef {
    /// An image for `id` under `root`, falling back to other formats of `id`
    /// and then to the default image.
    ///
    /// ```rust
    /// use trellis::render::ImageRef;
    ///
    /// let image = ImageRef::new("images", "herb-spiral", "Herb Spiral");
    /// assert_eq!(image.src, "images/herb-spiral.jpg");
    /// assert_eq!(image.fallbacks, [
    ///     "images/herb-spiral.png", "images/herb-spiral.svg",
    ///     "images/default.jpg", "images/default.png", "images/default.svg",
    /// ]);
    /// ```
    pub fn new(root: &str, id: &str, title: &str) -> Self {
        let path = |stem: &str, ext: &str| match root.is_empty() {
            true => format!("{stem}.{ext}"),
            false => format!("{}/{stem}.{ext}", root.trim_end_matches('/')),
        };

        let defaults = EXTENSIONS.iter().map(|ext| path(DEFAULT_IMAGE, ext));
        let fallbacks = match id.is_empty() {
            true => defaults.skip(1).collect(),
            false => EXTENSIONS[1..].iter().map(|ext| path(id, ext)).chain(defaults).collect(),
        };

        let id = if id.is_empty() { DEFAULT_IMAGE } else { id };

        ImageRef {
            src: path(id, EXTENSIONS[0]),
            title: title.to_string(),
            fallbacks,
            class: None,
        }
    }

    pub fn with_class<S: Into<String>>(mut self, class: S) -> Self {
        self.class = Some(class.into());
        self
    }

    /// Every source this image may display, in the order they're tried.
    pub fn sources(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.src.as_str()).chain(self.fallbacks.iter().map(|s| s.as_str()))
    }
}

/// Options shared by every image rendered for a content domain.
#[derive(Debug, Clone, Copy)]
pub struct ImageOptions<'a, K> {
    pub root: &'a str,
    pub identity_keys: &'a [K],
    pub title_keys: &'a [K],
    pub separator: &'a str,
}

/// The image titles `record` declares: a `:`-separated scalar, a list, or a
/// record whose `image` field is either.
pub fn declared_images(record: &Record) -> Vec<&str> {
    fn titles(value: &Value) -> Vec<&str> {
        match value {
            Value::Scalar(s) => s.split(':').filter(|t| !t.is_empty()).collect(),
            Value::List(_) => value.scalars().filter(|t| !t.is_empty()).collect(),
            Value::Record(r) => r.get("image").map(titles).unwrap_or_default(),
        }
    }

    record.get_ignore_case(IMAGES)
        .map(|(_, value)| titles(value))
        .unwrap_or_default()
}

/// The images for `record`.
///
/// Declared images yield one image per title under `policy`; `second` picks
/// the image for [`ImagePolicy::Random`]. Without declarations, a single image
/// is made from the identity-key values, titled by the title-key values.
pub fn render_images<K: AsRef<str>>(
    record: &Record,
    options: ImageOptions<'_, K>,
    policy: ImagePolicy,
    second: u32,
) -> Vec<ImageRef> {
    let declared = declared_images(record);
    if declared.is_empty() {
        let id = title_of(record, options.identity_keys, " ");
        let title = title_of(record, options.title_keys, options.separator);
        return vec![ImageRef::new(options.root, &slugify(&id), &title)];
    }

    let image = |title: &str| ImageRef::new(options.root, &slugify(title), title);
    match policy {
        ImagePolicy::All => declared.into_iter().map(image).collect(),
        ImagePolicy::First => vec![image(declared[0])],
        ImagePolicy::Random => vec![image(declared[second as usize % declared.len()])],
    }
}
