//! Thin DOM layer over `html5ever` and `markup5ever_rcdom`.
//!
//! rcdom nodes use interior mutability, so every helper here takes a shared
//! [`Handle`] and mutates through it. Handles are `Rc`-based and never leave
//! the synchronous scan/emit code.

use std::cell::RefCell;
use std::io::BufReader;
use std::rc::Rc;

use html5ever::serialize::SerializeOpts;
use html5ever::tendril::{StrTendril, TendrilSink};
use html5ever::{ParseOpts, serialize};
use markup5ever::{Attribute, LocalName, QualName, expanded_name, local_name, namespace_url, ns};
use markup5ever_rcdom::{Handle, Node, NodeData, RcDom, SerializableHandle};

/// A parsed, mutable HTML document.
pub struct HtmlDocument {
    dom: RcDom,
}

impl HtmlDocument {
    /// Parse a document from UTF-8 bytes. Invalid sequences are replaced.
    pub fn parse(bytes: &[u8]) -> std::io::Result<Self> {
        let mut bytes = BufReader::new(bytes);
        let dom = html5ever::parse_document(RcDom::default(), ParseOpts::default())
            .from_utf8()
            .read_from(&mut bytes)?;
        Ok(Self { dom })
    }

    /// Serialize the document back to bytes.
    pub fn serialize(&self) -> std::io::Result<Vec<u8>> {
        let document: SerializableHandle = self.dom.document.clone().into();
        let mut output = Vec::new();
        serialize(&mut output, &document, SerializeOpts::default())?;
        Ok(output)
    }

    /// All `<script>` elements in document order.
    pub fn scripts(&self) -> Vec<Handle> {
        let mut found = Vec::new();
        collect_elements(&self.dom.document, &is_script, &mut found);
        found
    }

    /// The `<body>` element, if the parser produced one.
    pub fn body(&self) -> Option<Handle> {
        let mut found = Vec::new();
        collect_elements(&self.dom.document, &is_body, &mut found);
        found.into_iter().next()
    }

    /// Append a node as the last child of `<body>`, or of the document when
    /// there is no body.
    pub fn append_to_body(&self, node: Handle) {
        let parent = self.body().unwrap_or_else(|| self.dom.document.clone());
        append_child(&parent, node);
    }
}

fn is_script(name: &QualName) -> bool {
    name.expanded() == expanded_name!(html "script")
}

fn is_body(name: &QualName) -> bool {
    name.expanded() == expanded_name!(html "body")
}

/// Pre-order walk, so matches come out in document order.
fn collect_elements(node: &Handle, matches: &impl Fn(&QualName) -> bool, out: &mut Vec<Handle>) {
    if let NodeData::Element { name, .. } = &node.data {
        if matches(name) {
            out.push(node.clone());
        }
    }

    for child in node.children.borrow().iter() {
        collect_elements(child, matches, out);
    }
}

/// Value of an attribute (no namespace) on an element.
pub fn attr(node: &Handle, name: &str) -> Option<String> {
    match &node.data {
        NodeData::Element { attrs, .. } => attrs
            .borrow()
            .iter()
            .find(|attr| &*attr.name.local == name)
            .map(|attr| attr.value.to_string()),
        _ => None,
    }
}

/// Remove an attribute from an element. No-op on other nodes.
pub fn remove_attr(node: &Handle, name: &str) {
    if let NodeData::Element { attrs, .. } = &node.data {
        attrs.borrow_mut().retain(|attr| &*attr.name.local != name);
    }
}

/// Concatenated text children of an element, verbatim.
pub fn inner_text(node: &Handle) -> String {
    let mut text = String::new();
    for child in node.children.borrow().iter() {
        if let NodeData::Text { contents } = &child.data {
            text.push_str(&contents.borrow());
        }
    }
    text
}

/// Detach a node from its parent.
pub fn detach(node: &Handle) {
    if let Some(parent) = node.parent.take().and_then(|weak| weak.upgrade()) {
        parent
            .children
            .borrow_mut()
            .retain(|child| !Rc::ptr_eq(child, node));
    }
}

/// Append `child` as the last child of `parent`.
pub fn append_child(parent: &Handle, child: Handle) {
    child.parent.set(Some(Rc::downgrade(parent)));
    parent.children.borrow_mut().push(child);
}

/// `<script src="...">` referencing an external file.
pub fn external_script(src: &str) -> Handle {
    let attrs = vec![Attribute {
        name: QualName::new(None, ns!(), LocalName::from("src")),
        value: StrTendril::from_slice(src),
    }];
    new_script(attrs)
}

/// `<script>` carrying `code` as its text.
pub fn inline_script(code: &str) -> Handle {
    let script = new_script(Vec::new());
    let text = Node::new(NodeData::Text {
        contents: RefCell::new(StrTendril::from_slice(code)),
    });
    append_child(&script, text);
    script
}

fn new_script(attrs: Vec<Attribute>) -> Handle {
    Node::new(NodeData::Element {
        name: QualName::new(None, ns!(html), local_name!("script")),
        attrs: RefCell::new(attrs),
        template_contents: RefCell::new(None),
        mathml_annotation_xml_integration_point: false,
    })
}
