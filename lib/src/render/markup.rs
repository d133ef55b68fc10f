use tracing::warn;

use crate::error::Result;
use crate::value::{Record, Value};
use crate::render::escape_into;
use crate::walk::MAX_DEPTH;

/// Turns the value of a record's raw-markup field back into markup.
pub trait MarkupTranslator: Send + Sync {
    fn translate(&self, value: &Value) -> Result<String>;
}

impl<F> MarkupTranslator for F
    where F: Fn(&Value) -> Result<String> + Send + Sync
{
    fn translate(&self, value: &Value) -> Result<String> {
        self(value)
    }
}

/// Re-serializes a value tree read from XML back into tags.
///
/// Every record field becomes an element named by the field. A list repeats
/// its element once per item. Fields prefixed with `_` become attributes of
/// the enclosing element and `__text` becomes its text content. Fields whose
/// names aren't XML names are skipped.
///
/// ```rust
/// use trellis::{record, list};
/// use trellis::render::{MarkupTranslator, Xml};
///
/// let value = record! {
///     "p" => list![
///         record! { "_class" => "note", "__text" => "Bring gloves." },
///         "Rain or shine.",
///     ],
/// };
///
/// let html = Xml.translate(&value.into()).unwrap();
/// assert_eq!(html, r#"<p class="note">Bring gloves.</p><p>Rain or shine.</p>"#);
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct Xml;

const TEXT_KEY: &str = "__text";
const ATTR_PREFIX: char = '_';

impl Xml {
    fn element(out: &mut String, tag: &str, value: &Value, depth: usize) -> Result<()> {
        if depth > MAX_DEPTH {
            return err!("markup is nested too deeply", "element" => tag, "limit" => MAX_DEPTH);
        }

        match value {
            Value::List(items) => {
                for item in items.iter() {
                    Self::element(out, tag, item, depth + 1)?;
                }
            }
            Value::Scalar(text) => {
                out.push('<');
                out.push_str(tag);
                out.push('>');
                escape_into(out, text, false);
                Self::close(out, tag);
            }
            Value::Record(record) => {
                out.push('<');
                out.push_str(tag);
                for (name, value) in attributes(record) {
                    out.push(' ');
                    out.push_str(name);
                    out.push_str("=\"");
                    escape_into(out, &value.to_text(), true);
                    out.push('"');
                }

                out.push('>');
                Self::children(out, record, depth + 1)?;
                Self::close(out, tag);
            }
        }

        Ok(())
    }

    fn children(out: &mut String, record: &Record, depth: usize) -> Result<()> {
        for (name, value) in record.iter() {
            if &**name == TEXT_KEY {
                escape_into(out, &value.to_text(), false);
            } else if !name.starts_with(ATTR_PREFIX) {
                if !is_xml_name(name) {
                    warn!(element = %name, "skipping markup element with an invalid name");
                    continue;
                }

                Self::element(out, name, value, depth)?;
            }
        }

        Ok(())
    }

    fn close(out: &mut String, tag: &str) {
        out.push_str("</");
        out.push_str(tag);
        out.push('>');
    }
}

fn attributes(record: &Record) -> impl Iterator<Item = (&str, &Value)> {
    record.iter()
        .filter(|(name, _)| &***name != TEXT_KEY)
        .filter_map(|(name, value)| Some((name.strip_prefix(ATTR_PREFIX)?, value)))
        .filter(|(name, _)| match is_xml_name(name) {
            true => true,
            false => {
                warn!(attribute = %name, "skipping markup attribute with an invalid name");
                false
            }
        })
}

/// Whether `name` can name an element or attribute.
fn is_xml_name(name: &str) -> bool {
    let mut chars = name.chars();
    let Some(first) = chars.next() else {
        return false;
    };

    (first.is_alphabetic() || first == '_' || first == ':')
        && chars.all(|c| c.is_alphanumeric() || matches!(c, '_' | ':' | '-' | '.'))
}

impl MarkupTranslator for Xml {
    fn translate(&self, value: &Value) -> Result<String> {
        let mut out = String::new();
        match value {
            Value::Scalar(text) => escape_into(&mut out, text, false),
            Value::List(items) => for item in items.iter() {
                out.push_str(&self.translate(item)?);
            },
            Value::Record(record) => Xml::children(&mut out, record, 0)?,
        }

        Ok(out)
    }
}

/// Renders a scalar as CommonMark. Lists render each scalar as its own
/// document, in order.
#[cfg(feature = "markdown")]
#[derive(Debug, Clone, Copy, Default)]
pub struct Markdown;

#[cfg(feature = "markdown")]
impl MarkupTranslator for Markdown {
    fn translate(&self, value: &Value) -> Result<String> {
        use pulldown_cmark::{html, Options, Parser};

        if let Value::Record(_) = value {
            return err!("markdown markup must be text", "found" => value.kind());
        }

        let options = Options::all().difference(Options::ENABLE_SMART_PUNCTUATION);
        let mut out = String::new();
        for text in value.scalars() {
            html::push_html(&mut out, Parser::new_ext(text, options));
        }

        Ok(out)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{record, list};

    #[test]
    fn xml_nesting_and_escapes() {
        let value = Value::from(record! {
            "div" => record! {
                "_id" => "a&b",
                "h2" => "Tips",
                "ul" => record! { "li" => list!["one", "<two>"] },
            },
        });

        let html = Xml.translate(&value).unwrap();
        assert_eq!(html, "<div id=\"a&amp;b\"><h2>Tips</h2><ul><li>one</li><li>&lt;two&gt;</li></ul></div>");
        assert_eq!(Xml.translate(&"x < y".into()).unwrap(), "x &lt; y");
    }

    #[test]
    fn invalid_names_are_skipped() {
        let value = Value::from(record! {
            "p" => record! {
                "_class" => "tip",
                "_on\"click" => "x",
                "_" => "empty",
                "__text" => "Water early.",
            },
            "bad tag" => "dropped",
            "x>y" => "dropped",
            "1st" => "dropped",
            "em" => "kept",
        });

        let html = Xml.translate(&value).unwrap();
        assert_eq!(html, r#"<p class="tip">Water early.</p><em>kept</em>"#);
        assert!(is_xml_name("svg:rect") && is_xml_name("data-x.y") && is_xml_name("_private"));
        assert!(!is_xml_name("") && !is_xml_name("-x") && !is_xml_name("a b"));
    }

    #[test]
    fn closures_translate() {
        let upper = |value: &Value| -> Result<String> { Ok(value.to_text().to_uppercase()) };
        assert_eq!(upper.translate(&"hi".into()).unwrap(), "HI");
    }

    #[cfg(feature = "markdown")]
    #[test]
    fn markdown() {
        let html = Markdown.translate(&"Some *emphasis*.".into()).unwrap();
        assert_eq!(html.trim(), "<p>Some <em>emphasis</em>.</p>");
        assert!(Markdown.translate(&record! { "a" => "b" }.into()).is_err());
    }
}
