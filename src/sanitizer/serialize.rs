//! Tree → text, plus the canonical document-type declaration.

use super::dom::{Document, Element, Node};

pub const DOCTYPE: &str = "<!DOCTYPE html>";

const VOID_ELEMENTS: &[&str] = &[
    "area", "base", "br", "col", "embed", "hr", "img", "input", "keygen", "link", "meta", "param",
    "source", "track", "wbr",
];

/// HTML elements whose text children are emitted verbatim. Same-named
/// SVG/MathML elements are escaped like any other.
const RAW_TEXT_ELEMENTS: &[&str] = &[
    "script", "style", "xmp", "iframe", "noembed", "noframes", "noscript", "plaintext",
];

/// Escapes text content. Only the characters that would change parsing are
/// touched, so parsed text round-trips unchanged.
pub fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

pub fn escape_attr(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '"' => out.push_str("&quot;"),
            '\u{a0}' => out.push_str("&nbsp;"),
            _ => out.push(c),
        }
    }
    out
}

/// Document-type nodes are skipped wherever they sit.
pub fn serialize(document: &Document) -> String {
    let mut out = String::new();
    for node in &document.children {
        write_node(node, false, &mut out);
    }
    out
}

/// Serializes with [`DOCTYPE`] as the one and only declaration.
pub fn serialize_document(document: &Document) -> String {
    format!("{}\n{}", DOCTYPE, serialize(document))
}

fn write_node(node: &Node, raw_text: bool, out: &mut String) {
    match node {
        Node::Element(element) => write_element(element, out),
        Node::Text(text) if raw_text => out.push_str(text),
        Node::Text(text) => out.push_str(&escape_text(text)),
        Node::Comment(text) => {
            out.push_str("<!--");
            out.push_str(text);
            out.push_str("-->");
        }
        Node::Doctype(_) => {}
    }
}

fn write_element(element: &Element, out: &mut String) {
    out.push('<');
    out.push_str(&element.name);
    for attr in &element.attrs {
        out.push(' ');
        out.push_str(&attr.name);
        out.push_str("=\"");
        out.push_str(&escape_attr(&attr.value));
        out.push('"');
    }
    out.push('>');

    let name = element.name.to_ascii_lowercase();
    if element.is_html() && VOID_ELEMENTS.contains(&name.as_str()) {
        return;
    }

    let raw_text = element.is_html() && RAW_TEXT_ELEMENTS.contains(&name.as_str());
    for child in &element.children {
        write_node(child, raw_text, out);
    }

    out.push_str("</");
    out.push_str(&element.name);
    out.push('>');
}
