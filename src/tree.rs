//! Output sink that dissectors populate with structured items.

use std::fmt;

/// Kind of a [`TreeItem`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ItemKind {
    /// Header line for a recognised protocol layer.
    Protocol,
    /// A named field and its rendered value.
    Field,
    /// Free-form text.
    Text,
    /// Placeholder for bytes that could not be decoded.
    Malformed,
}

/// One item produced during dissection.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeItem {
    /// What the item represents.
    pub kind: ItemKind,
    /// Rendered label.
    pub label: String,
    /// Nesting depth of the dissector that produced the item.
    pub depth: usize,
    /// Number of bytes the item covers.
    pub length: usize,
}

/// Depth-annotated list of everything the dissectors of one packet produced.
#[derive(Clone, Debug, Default)]
pub struct ProtoTree {
    items: Vec<TreeItem>,
    depth: usize,
}

impl ProtoTree {
    /// Create an empty tree.
    #[must_use]
    pub fn new() -> Self { Self::default() }

    /// Add a protocol header item.
    pub fn add_protocol(&mut self, label: impl Into<String>, length: usize) {
        self.push(ItemKind::Protocol, label.into(), length);
    }

    /// Add a `name: value` field item.
    pub fn add_field(&mut self, name: &str, value: impl fmt::Display, length: usize) {
        self.push(ItemKind::Field, format!("{name}: {value}"), length);
    }

    /// Add a free-form text item.
    pub fn add_text(&mut self, text: impl Into<String>) { self.push(ItemKind::Text, text.into(), 0); }

    /// Mark `length` bytes as malformed data of `protocol`.
    pub fn add_malformed(&mut self, protocol: Option<&str>, length: usize) {
        let label = match protocol {
            Some(protocol) => format!("[Malformed Packet: {protocol}]"),
            None => "[Malformed Packet]".to_owned(),
        };
        self.push(ItemKind::Malformed, label, length);
    }

    /// Borrow every item in insertion order.
    #[must_use]
    pub fn items(&self) -> &[TreeItem] { &self.items }

    /// Whether any malformed placeholder was added.
    #[must_use]
    pub fn is_malformed(&self) -> bool { self.malformed_count() > 0 }

    /// Number of malformed placeholders.
    #[must_use]
    pub fn malformed_count(&self) -> usize {
        self.items
            .iter()
            .filter(|item| item.kind == ItemKind::Malformed)
            .count()
    }

    /// Number of items.
    #[must_use]
    pub fn len(&self) -> usize { self.items.len() }

    /// Whether the tree holds no items.
    #[must_use]
    pub fn is_empty(&self) -> bool { self.items.is_empty() }

    pub(crate) fn descend(&mut self) { self.depth += 1; }

    pub(crate) fn ascend(&mut self) { self.depth = self.depth.saturating_sub(1); }

    pub(crate) fn reset_depth(&mut self) { self.depth = 0; }

    fn push(&mut self, kind: ItemKind, label: String, length: usize) {
        self.items.push(TreeItem {
            kind,
            label,
            depth: self.depth,
            length,
        });
    }
}
