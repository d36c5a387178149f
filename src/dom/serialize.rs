//! Serialize an arena [`Dom`] back to HTML text.
//!
//! Minimal HTML5 serializer: void elements get no closing tag, text and
//! attribute values are escaped, and the contents of `script`/`style` are
//! emitted raw. Output is a full document, not pretty-printed — pandoc is the
//! only consumer.

use super::{Dom, NodeData, NodeId};

/// HTML5 void elements: no children, no closing tag.
const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "link", "meta", "source", "track",
    "wbr",
];

/// Elements whose text children are emitted without entity escaping.
const RAW_TEXT_ELEMENTS: &[&str] = &["script", "style"];

/// Serialize the whole document to an HTML string.
pub fn to_html(dom: &Dom) -> String {
    let mut out = String::new();
    for child in dom.children(dom.document()) {
        write_node(dom, child, &mut out, false);
    }
    out
}

fn write_node(dom: &Dom, id: NodeId, out: &mut String, raw_text: bool) {
    let node = match dom.get(id) {
        Some(n) => n,
        None => return,
    };

    match &node.data {
        NodeData::Document => {
            for child in dom.children(id) {
                write_node(dom, child, out, false);
            }
        }
        NodeData::Doctype { name, .. } => {
            out.push_str("<!DOCTYPE ");
            out.push_str(name);
            out.push('>');
        }
        NodeData::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        NodeData::Text(text) => {
            if raw_text {
                out.push_str(text);
            } else {
                push_escaped_text(out, text);
            }
        }
        NodeData::Element { name, attrs, .. } => {
            let tag = name.local.as_ref();
            out.push('<');
            out.push_str(tag);
            for attr in attrs {
                out.push(' ');
                out.push_str(attr.name.local.as_ref());
                out.push_str("=\"");
                push_escaped_attr(out, &attr.value);
                out.push('"');
            }
            out.push('>');

            if VOID_ELEMENTS.contains(&tag) {
                return;
            }

            let raw = RAW_TEXT_ELEMENTS.contains(&tag);
            for child in dom.children(id) {
                write_node(dom, child, out, raw);
            }

            out.push_str("</");
            out.push_str(tag);
            out.push('>');
        }
    }
}

fn push_escaped_text(out: &mut String, text: &str) {
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            _ => out.push(c),
        }
    }
}

fn push_escaped_attr(out: &mut String, value: &str) {
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            _ => out.push(c),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::super::parse_html;
    use super::*;

    #[test]
    fn roundtrip_preserves_structure() {
        let dom = parse_html(r#"<!DOCTYPE html><html><body><p id="x">hi</p></body></html>"#);
        let html = to_html(&dom);
        assert!(html.starts_with("<!DOCTYPE html>"));
        assert!(html.contains(r#"<p id="x">hi</p>"#));
        assert!(html.contains("</html>"));
    }

    #[test]
    fn void_elements_have_no_closing_tag() {
        let dom = parse_html(r#"<p><img src="a.png"><br></p>"#);
        let html = to_html(&dom);
        assert!(html.contains(r#"<img src="a.png">"#));
        assert!(!html.contains("</img>"));
        assert!(html.contains("<br>"));
        assert!(!html.contains("</br>"));
    }

    #[test]
    fn text_is_escaped() {
        let mut dom = super::super::Dom::new();
        let doc = dom.document();
        dom.append_text(doc, "a < b & c");
        assert_eq!(to_html(&dom), "a &lt; b &amp; c");
    }

    #[test]
    fn attribute_quotes_are_escaped() {
        let dom = parse_html(r#"<a title='say "hi"'>x</a>"#);
        let html = to_html(&dom);
        assert!(html.contains(r#"title="say &quot;hi&quot;""#));
    }

    #[test]
    fn script_content_is_raw() {
        let dom = parse_html("<script>if (a < b) { go(); }</script>");
        let html = to_html(&dom);
        assert!(html.contains("if (a < b) { go(); }"));
    }

    #[test]
    fn comments_survive() {
        let dom = parse_html("<body><!-- note --><p>x</p></body>");
        assert!(to_html(&dom).contains("<!-- note -->"));
    }
}
