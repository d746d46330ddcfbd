//! Owned node/attribute tree the sanitizer rules operate on.
//!
//! Traversal helpers work on child lists (`[Node]` / `Vec<Node>`) so the same
//! operation applies to the document, an element, or any subtree.

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attribute {
    pub name: String,
    pub value: String,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum Namespace {
    #[default]
    Html,
    Svg,
    MathMl,
    Other,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Element {
    /// Lower-case for HTML elements; SVG/MathML keep their adjusted case.
    pub name: String,
    /// Foreign (SVG/MathML) elements never get raw-text serialization.
    pub namespace: Namespace,
    pub attrs: Vec<Attribute>,
    pub children: Vec<Node>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Element(Element),
    Text(String),
    Comment(String),
    /// Document-type marker; only meaningful at document level.
    Doctype(String),
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Document {
    pub children: Vec<Node>,
}

impl Element {
    pub fn new(name: &str) -> Self {
        Self::in_namespace(name, Namespace::Html)
    }

    pub fn in_namespace(name: &str, namespace: Namespace) -> Self {
        Self {
            name: name.to_string(),
            namespace,
            attrs: Vec::new(),
            children: Vec::new(),
        }
    }

    pub fn is_html(&self) -> bool {
        self.namespace == Namespace::Html
    }

    pub fn with_attr(mut self, name: &str, value: &str) -> Self {
        self.set_attr(name, value);
        self
    }

    pub fn with_child(mut self, child: Node) -> Self {
        self.children.push(child);
        self
    }

    pub fn is(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    pub fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|a| a.name.eq_ignore_ascii_case(name))
            .map(|a| a.value.as_str())
    }

    pub fn has_attr(&self, name: &str) -> bool {
        self.attr(name).is_some()
    }

    pub fn set_attr(&mut self, name: &str, value: &str) {
        match self.attrs.iter_mut().find(|a| a.name.eq_ignore_ascii_case(name)) {
            Some(existing) => existing.value = value.to_string(),
            None => self.attrs.push(Attribute {
                name: name.to_string(),
                value: value.to_string(),
            }),
        }
    }

    /// Drops attributes matching `pred`; returns how many went.
    pub fn remove_attrs_where<F>(&mut self, pred: F) -> usize
    where
        F: Fn(&Attribute) -> bool,
    {
        let before = self.attrs.len();
        self.attrs.retain(|a| !pred(a));
        before - self.attrs.len()
    }

    /// First direct child element matching `pred`, with its index.
    pub fn child_position<F>(&self, pred: F) -> Option<usize>
    where
        F: Fn(&Element) -> bool,
    {
        self.children
            .iter()
            .position(|n| matches!(n, Node::Element(e) if pred(e)))
    }

    pub fn child_mut(&mut self, index: usize) -> Option<&mut Element> {
        match self.children.get_mut(index) {
            Some(Node::Element(e)) => Some(e),
            _ => None,
        }
    }

    /// Index of the first direct child named `name`, creating it (via `make`)
    /// at `insert_at` when missing.
    pub fn ensure_child<F>(&mut self, name: &str, insert_at: usize, make: F) -> usize
    where
        F: FnOnce() -> Element,
    {
        if let Some(index) = self.child_position(|e| e.is(name)) {
            return index;
        }
        let index = insert_at.min(self.children.len());
        self.children.insert(index, Node::Element(make()));
        index
    }
}

impl Node {
    pub fn as_element(&self) -> Option<&Element> {
        match self {
            Node::Element(e) => Some(e),
            _ => None,
        }
    }
}

impl Document {
    pub fn new(children: Vec<Node>) -> Self {
        Self { children }
    }

    pub fn find_first<F>(&self, pred: F) -> Option<&Element>
    where
        F: Fn(&Element) -> bool,
    {
        find_first(&self.children, &pred)
    }

    pub fn find_all<F>(&self, pred: F) -> Vec<&Element>
    where
        F: Fn(&Element) -> bool,
    {
        let mut found = Vec::new();
        find_all(&self.children, &pred, &mut found);
        found
    }

    pub fn count<F>(&self, pred: F) -> usize
    where
        F: Fn(&Element) -> bool,
    {
        self.find_all(pred).len()
    }

    /// The document-level root element, if any.
    pub fn root(&self) -> Option<&Element> {
        self.children
            .iter()
            .filter_map(Node::as_element)
            .find(|e| e.is("html"))
    }

    pub fn root_mut(&mut self) -> Option<&mut Element> {
        self.children.iter_mut().find_map(|n| match n {
            Node::Element(e) if e.is("html") => Some(e),
            _ => None,
        })
    }
}

pub fn find_first<'a, F>(nodes: &'a [Node], pred: &F) -> Option<&'a Element>
where
    F: Fn(&Element) -> bool,
{
    for node in nodes {
        if let Node::Element(element) = node {
            if pred(element) {
                return Some(element);
            }
            if let Some(found) = find_first(&element.children, pred) {
                return Some(found);
            }
        }
    }
    None
}

pub fn find_all<'a, F>(nodes: &'a [Node], pred: &F, out: &mut Vec<&'a Element>)
where
    F: Fn(&Element) -> bool,
{
    for node in nodes {
        if let Node::Element(element) = node {
            if pred(element) {
                out.push(element);
            }
            find_all(&element.children, pred, out);
        }
    }
}

/// Removes every subtree whose root matches `pred`; returns the count.
pub fn remove_where<F>(nodes: &mut Vec<Node>, pred: &F) -> usize
where
    F: Fn(&Element) -> bool,
{
    let before = nodes.len();
    nodes.retain(|n| !matches!(n, Node::Element(e) if pred(e)));
    let mut removed = before - nodes.len();
    for node in nodes.iter_mut() {
        if let Node::Element(element) = node {
            removed += remove_where(&mut element.children, pred);
        }
    }
    removed
}

/// Detaches every subtree whose root matches `pred`, in document order.
/// Matched subtrees are not searched further.
pub fn take_where<F>(nodes: &mut Vec<Node>, pred: &F) -> Vec<Element>
where
    F: Fn(&Element) -> bool,
{
    let mut taken = Vec::new();
    take_into(nodes, pred, &mut taken);
    taken
}

fn take_into<F>(nodes: &mut Vec<Node>, pred: &F, taken: &mut Vec<Element>)
where
    F: Fn(&Element) -> bool,
{
    let mut index = 0;
    while index < nodes.len() {
        let matched = matches!(&nodes[index], Node::Element(e) if pred(e));
        if matched {
            if let Node::Element(element) = nodes.remove(index) {
                taken.push(element);
            }
            continue;
        }
        if let Node::Element(element) = &mut nodes[index] {
            take_into(&mut element.children, pred, taken);
        }
        index += 1;
    }
}

/// Applies `f` to every element, parents before children.
pub fn for_each_element_mut<F>(nodes: &mut [Node], f: &mut F)
where
    F: FnMut(&mut Element),
{
    for node in nodes.iter_mut() {
        if let Node::Element(element) = node {
            f(element);
            for_each_element_mut(&mut element.children, f);
        }
    }
}
