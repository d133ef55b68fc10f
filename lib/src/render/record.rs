use std::sync::Arc;

use derive_more::Debug;
use tracing::warn;

use crate::value::{Record, Value};
use crate::walk::{fields, Exclusions, Field, MARKUP, MAX_DEPTH, WHEN};
use crate::render::{MarkupTranslator, Node, Xml};

/// Turns a field name into heading text: the first character is uppercased
/// and hyphens become spaces.
///
/// ```rust
/// use trellis::render::render_heading;
///
/// assert_eq!(render_heading("growing-season"), "Growing season");
/// assert_eq!(render_heading("ñu"), "Ñu");
/// assert_eq!(render_heading(""), "");
/// ```
pub fn render_heading(name: &str) -> String {
    let mut chars = name.chars();
    let heading: String = match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    };

    heading.replace('-', " ")
}

/// Renders records into readable [`Node`] trees.
///
/// Identity and title fields are left out at every level, as are the
/// reserved fields, except the raw-markup field, which is handed to a
/// [`MarkupTranslator`] and embedded as markup.
#[derive(Debug, Clone)]
pub struct Renderer {
    exclusions: Exclusions,
    #[debug(ignore)]
    translator: Arc<dyn MarkupTranslator>,
}

impl Renderer {
    /// A renderer that leaves out the fields named by `keys`. Markup is
    /// translated with [`Xml`].
    pub fn new<I, K>(keys: I) -> Self
        where I: IntoIterator<Item = K>, K: Into<Arc<str>>
    {
        Renderer {
            exclusions: Exclusions::reserved().unreserve(MARKUP).keys(keys),
            translator: Arc::new(Xml),
        }
    }

    pub fn with_translator<T: MarkupTranslator + 'static>(mut self, translator: T) -> Self {
        self.translator = Arc::new(translator);
        self
    }

    /// Renders `record`, starting with headings at `level`.
    ///
    /// A scalar becomes a heading and a paragraph. A list becomes an ordered
    /// list without a heading of its own, unless it's the `when` field. A
    /// nested record becomes a heading followed by its own fields one level
    /// deeper.
    ///
    /// ```rust
    /// use trellis::{record, list};
    /// use trellis::render::{Renderer, Node, to_html};
    ///
    /// let garden = record! {
    ///     "name" => "Herb Spiral",
    ///     "soil-type" => "loam",
    ///     "plants" => list!["sage", "thyme"],
    /// };
    ///
    /// let nodes = Renderer::new(["name"]).render_record(&garden, 3);
    /// assert_eq!(to_html(&nodes),
    ///     "<h3>Soil type</h3><p>loam</p><ol><li>sage</li><li>thyme</li></ol>");
    /// ```
    pub fn render_record(&self, record: &Record, level: u8) -> Vec<Node> {
        let mut nodes = vec![];
        self.record_into(&mut nodes, record, level, 0);
        nodes
    }

    /// The walked fields of a flat `record` as `(name, value)` rows. Values
    /// that aren't scalars are flattened to text.
    pub fn render_flat(&self, record: &Record) -> Vec<(String, String)> {
        fields(record, &self.exclusions)
            .filter(|(name, _)| !name.eq_ignore_ascii_case(MARKUP))
            .map(|(name, field)| {
                let text = match field {
                    Field::Scalar(s) => s.to_string(),
                    Field::List(items) => Value::List(Arc::new(items.to_vec())).to_string(),
                    Field::Record(r) => Value::Record(Arc::new(r.clone())).to_string(),
                };

                (name.to_string(), text)
            })
            .collect()
    }

    fn record_into(&self, out: &mut Vec<Node>, record: &Record, level: u8, depth: usize) {
        if depth > MAX_DEPTH {
            warn!(limit = MAX_DEPTH, "record nested too deeply; not rendering further");
            return;
        }

        for (name, field) in fields(record, &self.exclusions) {
            if name.eq_ignore_ascii_case(MARKUP) {
                if let Some(value) = record.get(name) {
                    self.markup_into(out, value);
                }

                continue;
            }

            match field {
                Field::Scalar(text) => {
                    out.push(Node::heading(level, render_heading(name)));
                    out.push(Node::Paragraph(text.to_string()));
                }
                Field::List(items) => {
                    if name.eq_ignore_ascii_case(WHEN) {
                        out.push(Node::heading(level, "When"));
                    }

                    out.push(self.list(items, level, depth + 1));
                }
                Field::Record(nested) => {
                    out.push(Node::heading(level, render_heading(name)));
                    self.record_into(out, nested, level.saturating_add(1), depth + 1);
                }
            }
        }
    }

    fn list(&self, items: &[Value], level: u8, depth: usize) -> Node {
        if depth > MAX_DEPTH {
            warn!(limit = MAX_DEPTH, "list nested too deeply; not rendering further");
            return Node::Ordered(vec![]);
        }

        let items = Field::elements(items).map(|element| {
            let mut item = vec![];
            match element {
                Field::Scalar(text) => item.push(Node::Text(text.to_string())),
                Field::List(nested) => item.push(self.list(nested, level, depth + 1)),
                Field::Record(nested) => self.record_into(&mut item, nested, level, depth + 1),
            }

            item
        });

        Node::Ordered(items.collect())
    }

    fn markup_into(&self, out: &mut Vec<Node>, value: &Value) {
        match self.translator.translate(value) {
            Ok(markup) => out.push(Node::Markup(markup)),
            Err(error) => warn!(%error, "skipping untranslatable markup"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record, list};
    use crate::render::to_html;
    use crate::error::Result;

    #[test]
    fn exclusion_of_identity_and_reserved() {
        let record = record! {
            "name" => "X",
            "color" => "red",
            "images" => record! { "image" => "x" },
            "Link" => "elsewhere.html",
            "category" => "A/B",
            "notes" => "",
            "steps" => list![],
        };

        let nodes = Renderer::new(["name"]).render_record(&record, 3);
        assert_eq!(nodes, [Node::heading(3, "Color"), Node::Paragraph("red".into())]);
    }

    #[test]
    fn nesting_levels_and_lists() {
        let record = record! {
            "care" => record! {
                "water" => "weekly",
                "pests" => list![record! { "pest" => "aphids" }, list!["a", "b"]],
            },
            "when" => list!["2030-01-01"],
        };

        let html = to_html(&Renderer::new(Vec::<Arc<str>>::new()).render_record(&record, 2));
        assert_eq!(html, "<h2>Care</h2><h3>Water</h3><p>weekly</p>\
            <ol><li><h3>Pest</h3><p>aphids</p></li><li><ol><li>a</li><li>b</li></ol></li></ol>\
            <h2>When</h2><ol><li>2030-01-01</li></ol>");
    }

    #[test]
    fn markup_is_translated_or_skipped() {
        let record = record! { "intro" => "hi", "HTML" => record! { "b" => "bold" } };
        let nodes = Renderer::new(["intro"]).render_record(&record, 3);
        assert_eq!(nodes, [Node::Markup("<b>bold</b>".into())]);

        let failing = |_: &Value| -> Result<String> { err!("no") };
        let nodes = Renderer::new(["intro"]).with_translator(failing).render_record(&record, 3);
        assert!(nodes.is_empty());
    }

    #[test]
    fn deep_records_stop() {
        let mut value = Value::from("bottom");
        for _ in 0..(MAX_DEPTH + 10) {
            value = record! { "inner" => value }.into();
        }

        let record = record! { "outer" => value };
        let nodes = Renderer::new(["x"]).render_record(&record, 1);
        let headings = nodes.iter().filter(|n| matches!(n, Node::Heading { .. })).count();
        assert_eq!(headings, MAX_DEPTH + 1);
        assert!(nodes.iter().all(|n| !matches!(n, Node::Paragraph(_))));
    }

    #[test]
    fn flat_rows() {
        let record = record! {
            "name" => "Mint",
            "sun" => "partial",
            "uses" => list!["tea", "jelly"],
            "images" => "mint",
            "html" => "<i>x</i>",
        };

        let rows = Renderer::new(["name"]).render_flat(&record);
        assert_eq!(rows, [
            ("sun".to_string(), "partial".to_string()),
            ("uses".to_string(), "tea, jelly".to_string()),
        ]);
    }

    #[test]
    fn headings() {
        assert_eq!(render_heading("plant"), "Plant");
        assert_eq!(render_heading("a-b-c"), "A b c");
        assert_eq!(render_heading("-x"), " x");
    }
}
