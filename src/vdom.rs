//! The virtual DOM: a read-only tree handed to the interpreter by an
//! external parser, which is out of scope for this crate — the interpreter
//! only consumes an already-built vDOM tree. Elements live in a `Slab`,
//! addressed by a small `Copy` id rather than by pointer or `Rc`, which is
//! what lets a frame's `curr` element reference "the element currently
//! executing" without borrowing the tree.

use crate::atom::Atom;
use slab::Slab;

/// Stable address of a vDOM element within one [`Document`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub usize);

/// HVML attribute assignment operators: beyond plain `=`, attributes can
/// accumulate, displace, or arithmetically combine with the named variable
/// they target.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AttrOperator {
    /// `=`
    Assign,
    /// `+=`
    Additive,
    /// `-=`
    Subtractive,
    /// `*=`
    Multiply,
    /// `/=`
    Divide,
    /// `%=`
    Modulo,
    /// `~=` overwrite-displace
    Displace,
    /// `^=` prepend
    Prepend,
    /// `$=` append
    Append,
}

#[derive(Debug, Clone)]
pub struct Attribute {
    pub name: Atom,
    pub operator: AttrOperator,
    /// The unevaluated expression text (expression evaluation happens when
    /// the owning frame's `after_pushed` quad runs, not at parse time).
    pub value: String,
}

/// Inline text/CDATA content of an element, interleaved with child elements
/// in source order via [`Content::Children`] when the element has no direct
/// text.
#[derive(Debug, Clone)]
pub enum Content {
    /// No body: a self-closing or childless element.
    Empty,
    /// Raw text content (plain text or CDATA), not yet expression-evaluated.
    Text(String),
    /// Ordinary element children, in document order.
    Children(Vec<ElementId>),
}

#[derive(Debug, Clone)]
pub struct Element {
    pub id: ElementId,
    pub tag: Atom,
    pub attrs: Vec<Attribute>,
    pub content: Content,
    pub parent: Option<ElementId>,
}

impl Element {
    pub fn attr(&self, name: &str) -> Option<&Attribute> {
        self.attrs.iter().find(|a| &*a.name.as_str() == name)
    }

    pub fn children(&self) -> &[ElementId] {
        match &self.content {
            Content::Children(kids) => kids,
            _ => &[],
        }
    }
}

/// The abstract capability a coroutine needs from its vDOM: read the tree
/// built for it by the (external) parser. Kept as a trait, not a concrete
/// struct field, so test harnesses can substitute a hand-built tree without
/// running a real parser.
pub trait VdomSource {
    fn root(&self) -> ElementId;
    fn element(&self, id: ElementId) -> &Element;
}

/// The default, in-memory [`VdomSource`]: an arena of elements built once by
/// the parser and never mutated afterward.
#[derive(Debug, Default)]
pub struct Document {
    elements: Slab<Element>,
    root: Option<ElementId>,
    pub base_url: Option<String>,
}

impl Document {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, tag: Atom, parent: Option<ElementId>) -> ElementId {
        let id = ElementId(self.elements.vacant_key());
        let element = Element {
            id,
            tag,
            attrs: Vec::new(),
            content: Content::Empty,
            parent,
        };
        let key = self.elements.insert(element);
        debug_assert_eq!(key, id.0);
        if let Some(parent_id) = parent {
            let parent_el = self
                .elements
                .get_mut(parent_id.0)
                .expect("parent exists in same document");
            match &mut parent_el.content {
                Content::Children(kids) => kids.push(id),
                Content::Empty => parent_el.content = Content::Children(vec![id]),
                Content::Text(_) => {
                    // Mixed content collapses to element children; text-only
                    // nodes are represented as a synthetic `Content::Text`
                    // and never reached by this path in a well-formed tree.
                    parent_el.content = Content::Children(vec![id]);
                }
            }
        } else {
            self.root = Some(id);
        }
        id
    }

    pub fn set_attr(&mut self, id: ElementId, attr: Attribute) {
        self.elements.get_mut(id.0).expect("element exists").attrs.push(attr);
    }

    pub fn set_text(&mut self, id: ElementId, text: String) {
        self.elements.get_mut(id.0).expect("element exists").content = Content::Text(text);
    }
}

impl VdomSource for Document {
    fn root(&self) -> ElementId {
        self.root.expect("document has a root element")
    }

    fn element(&self, id: ElementId) -> &Element {
        &self.elements[id.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn build_simple_tree() {
        let mut doc = Document::new();
        let root = doc.insert(Atom::new("hvml"), None);
        let body = doc.insert(Atom::new("body"), Some(root));
        doc.set_text(body, "hi".to_string());

        assert_eq!(doc.root(), root);
        assert_eq!(doc.element(root).children(), &[body]);
        assert!(matches!(doc.element(body).content, Content::Text(ref s) if s == "hi"));
    }

    #[test]
    fn attr_lookup_by_name() {
        let mut doc = Document::new();
        let root = doc.insert(Atom::new("init"), None);
        doc.set_attr(
            root,
            Attribute {
                name: Atom::new("as"),
                operator: AttrOperator::Assign,
                value: "'x'".to_string(),
            },
        );
        assert!(doc.element(root).attr("as").is_some());
        assert!(doc.element(root).attr("missing").is_none());
    }
}
