//! Sanitization steps as independent tree transforms, in pipeline order.
//!
//! Steps 2–4 strip content; steps 5–10 establish the document skeleton and
//! assume the earlier ones ran. Every step is idempotent.

use serde::Serialize;

use super::dom::{for_each_element_mut, remove_where, take_where, Document, Element, Node};
use super::policy::{
    charset_element, is_charset_meta, is_viewport_meta, viewport_element, SanitizerPolicy,
};

/// Attributes that may carry a navigable URL, including SVG animation
/// targets that can rewrite one.
const URL_ATTRIBUTES: &[&str] = &[
    "href", "src", "action", "formaction", "xlink:href", "data", "background", "poster",
    "to", "from", "values",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FrameworkAction {
    #[default]
    Kept,
    Relocated,
    Injected,
}

/// Step 2. Drops inline scripts and external scripts off the allow-list.
pub fn strip_untrusted_scripts(doc: &mut Document, policy: &SanitizerPolicy) -> usize {
    let removed = remove_where(&mut doc.children, &|e: &Element| {
        e.is("script") && !policy.is_trusted_script(e)
    });
    // A kept external script carries no inline body.
    for_each_element_mut(&mut doc.children, &mut |e: &mut Element| {
        if e.is("script") {
            e.children.clear();
        }
    });
    removed
}

/// Step 2, continued. Drops nested documents that run script with the page's
/// origin: every `srcdoc` attribute, and `<object>`/`<embed>` elements not
/// loaded from an allow-listed host.
pub fn strip_embedded_documents(doc: &mut Document, policy: &SanitizerPolicy) -> usize {
    let mut removed = remove_where(&mut doc.children, &|e: &Element| {
        (e.is("object") || e.is("embed")) && !policy.is_trusted_embed(e)
    });
    for_each_element_mut(&mut doc.children, &mut |e: &mut Element| {
        removed += e.remove_attrs_where(|a| a.name.eq_ignore_ascii_case("srcdoc"));
    });
    removed
}

/// Step 3. Drops every `on*` attribute.
pub fn strip_event_handlers(doc: &mut Document) -> usize {
    let mut removed = 0;
    for_each_element_mut(&mut doc.children, &mut |e: &mut Element| {
        removed += e.remove_attrs_where(|a| a.name.to_ascii_lowercase().starts_with("on"));
    });
    removed
}

/// Step 3, continued. Drops URL attributes using a script scheme, and
/// refresh directives that mention one.
pub fn strip_script_urls(doc: &mut Document) -> usize {
    let mut removed = remove_where(&mut doc.children, &|e: &Element| {
        e.is("meta")
            && e
                .attr("http-equiv")
                .map_or(false, |v| v.trim().eq_ignore_ascii_case("refresh"))
            && e.attr("content").map_or(false, mentions_script_url)
    });
    for_each_element_mut(&mut doc.children, &mut |e: &mut Element| {
        removed += e.remove_attrs_where(|a| {
            let name = a.name.to_ascii_lowercase();
            URL_ATTRIBUTES.contains(&name.as_str())
                && if name == "values" {
                    // SVG animation lists are `;`-separated.
                    a.value.split(';').any(is_script_url)
                } else {
                    is_script_url(&a.value)
                }
        });
    });
    removed
}

fn compact(value: &str) -> String {
    value
        .chars()
        .filter(|c| !c.is_whitespace() && !c.is_control())
        .collect::<String>()
        .to_lowercase()
}

fn is_script_url(value: &str) -> bool {
    let compact = compact(value);
    compact.starts_with("javascript:") || compact.starts_with("vbscript:")
}

fn mentions_script_url(value: &str) -> bool {
    let compact = compact(value);
    compact.contains("javascript:") || compact.contains("vbscript:")
}

/// Step 4. Drops every `<style>` block.
pub fn strip_style_blocks(doc: &mut Document) -> usize {
    remove_where(&mut doc.children, &|e: &Element| e.is("style"))
}

/// Step 5. Wraps all non-doctype top-level content in `<html>` when missing.
pub fn ensure_root(doc: &mut Document) -> bool {
    if doc.root().is_some() {
        return false;
    }
    let (doctypes, content): (Vec<Node>, Vec<Node>) = std::mem::take(&mut doc.children)
        .into_iter()
        .partition(|n| matches!(n, Node::Doctype(_)));
    let mut root = Element::new("html");
    root.children = content;
    doc.children = doctypes;
    doc.children.push(Node::Element(root));
    true
}

/// Step 6. Puts a single `<head>` first under the root, merging extras.
pub fn ensure_head(doc: &mut Document) -> bool {
    let Some(root) = doc.root_mut() else {
        return false;
    };
    let mut heads = take_where(&mut root.children, &|e: &Element| e.is("head")).into_iter();
    let created = match heads.next() {
        Some(mut head) => {
            for extra in heads {
                head.children.extend(extra.children);
            }
            root.children.insert(0, Node::Element(head));
            false
        }
        None => true,
    };
    root.ensure_child("head", 0, || Element::new("head"));
    created
}

fn head_mut(doc: &mut Document) -> Option<&mut Element> {
    let root = doc.root_mut()?;
    let index = root.child_position(|e| e.is("head"))?;
    root.child_mut(index)
}

/// Step 7. Exactly one framework inclusion, inside `<head>`.
///
/// One already directly in head stays where it is; otherwise the first one
/// found is moved to the end of head, or a new one is appended.
pub fn ensure_framework(doc: &mut Document, policy: &SanitizerPolicy) -> (FrameworkAction, usize) {
    let is_framework = |e: &Element| policy.is_framework(e);

    let Some(head) = head_mut(doc) else {
        return (FrameworkAction::Kept, 0);
    };

    if let Some(position) = head.child_position(is_framework) {
        let keeper = head.children.remove(position);
        let duplicates = remove_where(&mut doc.children, &is_framework);
        if let Some(head) = head_mut(doc) {
            let at = position.min(head.children.len());
            head.children.insert(at, keeper);
        }
        return (FrameworkAction::Kept, duplicates);
    }

    let mut found = take_where(&mut doc.children, &is_framework);
    let (action, keeper) = if found.is_empty() {
        (FrameworkAction::Injected, policy.framework_element())
    } else {
        (FrameworkAction::Relocated, found.remove(0))
    };
    if let Some(head) = head_mut(doc) {
        head.children.push(Node::Element(keeper));
    }
    (action, found.len())
}

/// Detaches all elements matching `pred`, keeps the first (or `make()`), and
/// inserts it into head at `index`. Returns whether one had to be created.
fn place_single_in_head<P, M>(doc: &mut Document, pred: P, make: M, index: usize) -> bool
where
    P: Fn(&Element) -> bool,
    M: FnOnce() -> Element,
{
    let mut found = take_where(&mut doc.children, &pred);
    let created = found.is_empty();
    let keeper = if created { make() } else { found.remove(0) };
    if let Some(head) = head_mut(doc) {
        let at = index.min(head.children.len());
        head.children.insert(at, Node::Element(keeper));
    }
    created
}

/// Step 8. Charset declaration first in head.
pub fn ensure_charset(doc: &mut Document) -> bool {
    place_single_in_head(doc, is_charset_meta, charset_element, 0)
}

/// Step 9. Viewport declaration directly after the charset.
pub fn ensure_viewport(doc: &mut Document) -> bool {
    place_single_in_head(doc, is_viewport_meta, viewport_element, 1)
}

/// Step 10. A `<body>` under the root; when missing, every root child other
/// than head is moved into a new one. Extra bodies are merged into the first.
pub fn ensure_body(doc: &mut Document) -> bool {
    let Some(root) = doc.root_mut() else {
        return false;
    };

    let body_count = root
        .children
        .iter()
        .filter(|n| matches!(n, Node::Element(e) if e.is("body")))
        .count();

    if body_count == 0 {
        let (keep, moved): (Vec<Node>, Vec<Node>) = std::mem::take(&mut root.children)
            .into_iter()
            .partition(|n| match n {
                Node::Element(e) => e.is("head"),
                Node::Doctype(_) => true,
                _ => false,
            });
        root.children = keep;
        let index = root.ensure_child("body", usize::MAX, || Element::new("body"));
        if let Some(body) = root.child_mut(index) {
            body.children = moved;
        }
        return true;
    }

    if body_count > 1 {
        let mut first: Option<usize> = None;
        let mut merged = Vec::new();
        let mut index = 0;
        while index < root.children.len() {
            let is_body = matches!(&root.children[index], Node::Element(e) if e.is("body"));
            if is_body && first.is_some() {
                if let Node::Element(extra) = root.children.remove(index) {
                    merged.extend(extra.children);
                }
                continue;
            }
            if is_body {
                first = Some(index);
            }
            index += 1;
        }
        if let Some(index) = first {
            if let Some(body) = root.child_mut(index) {
                body.children.extend(merged);
            }
        }
    }
    false
}
