use std::fmt::Write;

use crate::render::ImageRef;

/// A node in a rendered view. Views are trees of nodes that a page shell
/// appends to its regions, or that [`to_html()`] turns into markup.
#[derive(Debug, Clone, PartialEq)]
pub enum Node {
    /// A heading; levels past 6 are written as 6.
    Heading { level: u8, text: String },
    Paragraph(String),
    Text(String),
    /// An ordered list. Each item is a sequence of nodes.
    Ordered(Vec<Vec<Node>>),
    /// An unordered list. Each item is a sequence of nodes.
    Unordered(Vec<Vec<Node>>),
    /// Already-rendered markup, written verbatim.
    Markup(String),
    Image(ImageRef),
    Link { href: String, text: String, new_tab: bool },
    /// Two-column rows of field name and value.
    Table(Vec<(String, String)>),
    Block { class: String, id: Option<String>, children: Vec<Node> },
    Button { id: Option<String>, class: Option<String>, text: String },
    Checkbox { id: String, name: String, value: String, checked: bool, label: Vec<Node> },
}

impl Node {
    pub fn heading<S: Into<String>>(level: u8, text: S) -> Self {
        Node::Heading { level, text: text.into() }
    }

    pub fn block<C: Into<String>>(class: C, children: Vec<Node>) -> Self {
        Node::Block { class: class.into(), id: None, children }
    }

    /// Collects the text of every node in `self`, depth-first.
    pub fn text(&self) -> String {
        let mut text = String::new();
        self.visit(&mut |node| match node {
            Node::Heading { text: t, .. } | Node::Paragraph(t) | Node::Text(t) => text.push_str(t),
            Node::Link { text: t, .. } | Node::Button { text: t, .. } => text.push_str(t),
            _ => {}
        });

        text
    }

    /// Calls `f` on `self` and every descendant, depth-first.
    pub fn visit<F: FnMut(&Node)>(&self, f: &mut F) {
        f(self);
        match self {
            Node::Ordered(items) | Node::Unordered(items) => {
                items.iter().flatten().for_each(|n| n.visit(f))
            }
            Node::Block { children, .. } | Node::Checkbox { label: children, .. } => {
                children.iter().for_each(|n| n.visit(f))
            }
            _ => {}
        }
    }

    pub fn write_html(&self, out: &mut String) {
        match self {
            Node::Heading { level, text } => {
                let level = (*level).clamp(1, 6);
                let _ = write!(out, "<h{level}>");
                escape_into(out, text, false);
                let _ = write!(out, "</h{level}>");
            }
            Node::Paragraph(text) => {
                out.push_str("<p>");
                escape_into(out, text, false);
                out.push_str("</p>");
            }
            Node::Text(text) => escape_into(out, text, false),
            Node::Ordered(items) => write_list(out, "ol", items),
            Node::Unordered(items) => write_list(out, "ul", items),
            Node::Markup(html) => out.push_str(html),
            Node::Image(image) => {
                out.push_str("<img");
                write_attr(out, "src", &image.src);
                write_attr(out, "title", &image.title);
                write_attr(out, "alt", &image.title);
                if let Some(class) = &image.class {
                    write_attr(out, "class", class);
                }

                write_attr(out, "data-fallbacks", &image.fallbacks.join(" "));
                out.push_str(" onerror=\"loadAlternative(this)\">");
            }
            Node::Link { href, text, new_tab } => {
                out.push_str("<a");
                write_attr(out, "href", href);
                write_attr(out, "target", if *new_tab { "_blank" } else { "_self" });
                out.push('>');
                escape_into(out, text, false);
                out.push_str("</a>");
            }
            Node::Table(rows) => {
                out.push_str("<table><tbody>");
                for (name, value) in rows {
                    out.push_str("<tr><td>");
                    escape_into(out, name, false);
                    out.push_str("</td><td>");
                    escape_into(out, value, false);
                    out.push_str("</td></tr>");
                }

                out.push_str("</tbody></table>");
            }
            Node::Block { class, id, children } => {
                out.push_str("<div");
                write_attr(out, "class", class);
                if let Some(id) = id {
                    write_attr(out, "id", id);
                }

                out.push('>');
                children.iter().for_each(|n| n.write_html(out));
                out.push_str("</div>");
            }
            Node::Button { id, class, text } => {
                out.push_str("<button type=\"button\"");
                if let Some(id) = id {
                    write_attr(out, "id", id);
                }

                if let Some(class) = class {
                    write_attr(out, "class", class);
                }

                out.push('>');
                escape_into(out, text, false);
                out.push_str("</button>");
            }
            Node::Checkbox { id, name, value, checked, label } => {
                out.push_str("<input type=\"checkbox\"");
                write_attr(out, "id", id);
                write_attr(out, "name", name);
                write_attr(out, "value", value);
                if *checked {
                    out.push_str(" checked");
                }

                out.push_str("><label");
                write_attr(out, "for", id);
                out.push('>');
                label.iter().for_each(|n| n.write_html(out));
                out.push_str("</label>");
            }
        }
    }
}

fn write_list(out: &mut String, tag: &str, items: &[Vec<Node>]) {
    let _ = write!(out, "<{tag}>");
    for item in items {
        out.push_str("<li>");
        item.iter().for_each(|n| n.write_html(out));
        out.push_str("</li>");
    }

    let _ = write!(out, "</{tag}>");
}

fn write_attr(out: &mut String, name: &str, value: &str) {
    let _ = write!(out, " {name}=\"");
    escape_into(out, value, true);
    out.push('"');
}

/// Appends `text` to `out`, escaping `<`, `>`, `&` and, if `attr`, `"`.
pub fn escape_into(out: &mut String, text: &str, attr: bool) {
    let bytes = text.as_bytes();
    let clean = memchr::memchr3(b'<', b'>', b'&', bytes).is_none()
        && (!attr || memchr::memchr(b'"', bytes).is_none());

    if clean {
        out.push_str(text);
        return;
    }

    for ch in text.chars() {
        match ch {
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '&' => out.push_str("&amp;"),
            '"' if attr => out.push_str("&quot;"),
            ch => out.push(ch),
        }
    }
}

/// Escapes `text` for use as HTML text content.
pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    escape_into(&mut out, text, false);
    out
}

/// Renders `nodes` as HTML.
pub fn to_html(nodes: &[Node]) -> String {
    let mut out = String::new();
    nodes.iter().for_each(|n| n.write_html(&mut out));
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn escaping() {
        assert_eq!(escape("plain"), "plain");
        assert_eq!(escape("Fish & <Chips>"), "Fish &amp; &lt;Chips&gt;");
        assert_eq!(escape("\"quoted\""), "\"quoted\"");

        let mut attr = String::new();
        escape_into(&mut attr, "say \"hi\"", true);
        assert_eq!(attr, "say &quot;hi&quot;");
    }

    #[test]
    fn html_output() {
        let nodes = vec![
            Node::heading(9, "Deep"),
            Node::Ordered(vec![vec![Node::Text("a".into())], vec![Node::Paragraph("b".into())]]),
            Node::Link { href: "details.html?src=x&name=y".into(), text: "Y".into(), new_tab: true },
        ];

        assert_eq!(to_html(&nodes), concat!(
            "<h6>Deep</h6>",
            "<ol><li>a</li><li><p>b</p></li></ol>",
            "<a href=\"details.html?src=x&amp;name=y\" target=\"_blank\">Y</a>",
        ));
    }

    #[test]
    fn text_collects_descendants() {
        let node = Node::block("cat-div", vec![
            Node::Button { id: None, class: None, text: "Herbs".into() },
            Node::Unordered(vec![vec![Node::Text(" / Mint".into())]]),
        ]);

        assert_eq!(node.text(), "Herbs / Mint");
    }
}
