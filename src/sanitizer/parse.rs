//! Browser-grade parsing via html5ever, converted into the owned tree.

use html5ever::tendril::TendrilSink;
use html5ever::{parse_document, ParseOpts};
use markup5ever_rcdom::{Handle, NodeData, RcDom};

use super::dom::{Attribute, Document, Element, Namespace, Node};
use super::SanitizeError;

/// Parses `html` tolerantly (unclosed tags are closed, missing html/head/body
/// synthesised the way a browser would) and converts it.
///
/// Fails only when nesting exceeds `max_depth`.
pub fn parse_html(html: &str, max_depth: usize) -> Result<Document, SanitizeError> {
    let dom = parse_document(RcDom::default(), ParseOpts::default()).one(html);
    let mut children = Vec::new();
    for child in dom.document.children.borrow().iter() {
        if let Some(node) = convert(child, 1, max_depth)? {
            children.push(node);
        }
    }
    Ok(Document::new(children))
}

fn convert(handle: &Handle, depth: usize, max_depth: usize) -> Result<Option<Node>, SanitizeError> {
    if depth > max_depth {
        return Err(SanitizeError::TooDeep { max_depth });
    }

    let node = match &handle.data {
        NodeData::Doctype { name, .. } => Some(Node::Doctype(name.to_string())),
        NodeData::Text { contents } => Some(Node::Text(contents.borrow().to_string())),
        NodeData::Comment { contents } => Some(Node::Comment(contents.to_string())),
        NodeData::Element {
            name,
            attrs,
            template_contents,
            ..
        } => {
            let mut element = Element::in_namespace(&name.local, namespace_of(&name.ns));
            element.attrs = attrs
                .borrow()
                .iter()
                .map(|attr| Attribute {
                    name: match &attr.name.prefix {
                        Some(prefix) => format!("{}:{}", prefix, attr.name.local),
                        None => attr.name.local.to_string(),
                    },
                    value: attr.value.to_string(),
                })
                .collect();

            // <template> keeps its content in a separate fragment.
            let source = template_contents
                .borrow()
                .clone()
                .unwrap_or_else(|| handle.clone());
            for child in source.children.borrow().iter() {
                if let Some(node) = convert(child, depth + 1, max_depth)? {
                    element.children.push(node);
                }
            }
            Some(Node::Element(element))
        }
        NodeData::Document | NodeData::ProcessingInstruction { .. } => None,
    };
    Ok(node)
}

fn namespace_of(ns: &str) -> Namespace {
    match ns {
        "http://www.w3.org/1999/xhtml" => Namespace::Html,
        "http://www.w3.org/2000/svg" => Namespace::Svg,
        "http://www.w3.org/1998/Math/MathML" => Namespace::MathMl,
        _ => Namespace::Other,
    }
}
