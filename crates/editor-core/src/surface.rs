use std::borrow::Cow;
use std::ops::Range;

use serde::{Deserialize, Serialize};

use crate::markup::{self, Element, Node, ZERO_WIDTH_SPACE};

pub type Path = Vec<usize>;

pub const DEFAULT_MAX_DEPTH: usize = 256;
pub const SURFACE_CLASS: &str = "play-editor-content";

const MARKER_ATTR: &str = "data-caret-marker";

/// A position inside the surface.
///
/// `path` indexes children starting at the surface root. When it names a text
/// node, `offset` is a byte offset into that text; when it names an element
/// (or is empty, naming the root), `offset` is a child index.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Caret {
    #[serde(default)]
    pub path: Path,
    pub offset: usize,
}

impl Caret {
    pub fn new(path: Path, offset: usize) -> Self {
        Self { path, offset }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Selection {
    pub anchor: Caret,
    pub focus: Caret,
}

impl Selection {
    pub fn new(anchor: Caret, focus: Caret) -> Self {
        Self { anchor, focus }
    }

    pub fn collapsed(caret: Caret) -> Self {
        Self {
            anchor: caret.clone(),
            focus: caret,
        }
    }

    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.focus
    }

    /// Byte range covered inside a single container, if both ends share one.
    pub fn single_container_range(&self) -> Option<(&[usize], Range<usize>)> {
        if self.anchor.path != self.focus.path {
            return None;
        }
        let start = self.anchor.offset.min(self.focus.offset);
        let end = self.anchor.offset.max(self.focus.offset);
        Some((&self.focus.path, start..end))
    }
}

/// The editable region: a markup tree, the live selection, and the serialized
/// form of the tree.
///
/// Markup handed to [`Surface::set_markup`] is kept verbatim until the tree is
/// mutated, so unmodified content always reads back exactly as written.
#[derive(Debug, Clone)]
pub struct Surface {
    root: Element,
    selection: Option<Selection>,
    markup: Option<String>,
    max_depth: usize,
}

impl Surface {
    pub fn new(markup: &str) -> Self {
        Self::with_max_depth(markup, DEFAULT_MAX_DEPTH)
    }

    pub fn with_max_depth(markup: &str, max_depth: usize) -> Self {
        let root = Element::new("div")
            .with_attr("class", SURFACE_CLASS)
            .with_attr("contenteditable", "true");
        let mut surface = Self {
            root,
            selection: None,
            markup: None,
            max_depth: max_depth.max(1),
        };
        surface.set_markup(markup);
        surface
    }

    pub fn markup(&self) -> Cow<'_, str> {
        match &self.markup {
            Some(markup) => Cow::Borrowed(markup),
            None => Cow::Owned(markup::serialize(&self.root.children)),
        }
    }

    /// Replaces the whole tree. Any selection inside the old tree is dropped.
    pub fn set_markup(&mut self, markup: &str) {
        self.root.children = markup::parse_fragment(markup);
        self.markup = Some(markup.to_string());
        self.selection = None;
    }

    pub fn root(&self) -> &Element {
        &self.root
    }

    /// Raw access to the tree. The serialized form is recomputed afterwards.
    pub fn root_mut(&mut self) -> &mut Element {
        self.markup = None;
        &mut self.root
    }

    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    pub fn selection(&self) -> Option<&Selection> {
        self.selection.as_ref()
    }

    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    pub fn collapse_to(&mut self, caret: Caret) {
        self.selection = Some(Selection::collapsed(caret));
    }

    pub fn caret(&self) -> Option<Caret> {
        self.selection.as_ref().map(|sel| sel.focus.clone())
    }

    pub fn node(&self, path: &[usize]) -> Option<&Node> {
        node_at(&self.root.children, path)
    }

    pub fn node_mut(&mut self, path: &[usize]) -> Option<&mut Node> {
        self.markup = None;
        node_at_mut(&mut self.root.children, path)
    }

    pub fn text(&self, path: &[usize]) -> Option<&str> {
        self.node(path).and_then(Node::as_text)
    }

    pub fn children(&self, parent: &[usize]) -> Option<&[Node]> {
        if parent.is_empty() {
            return Some(&self.root.children);
        }
        match self.node(parent)? {
            Node::Element(el) => Some(&el.children),
            _ => None,
        }
    }

    fn children_mut(&mut self, parent: &[usize]) -> Option<&mut Vec<Node>> {
        if parent.is_empty() {
            return Some(&mut self.root.children);
        }
        match node_at_mut(&mut self.root.children, parent)? {
            Node::Element(el) => Some(&mut el.children),
            _ => None,
        }
    }

    /// Whether content at `path` may be edited, honouring the nearest
    /// `contenteditable` attribute on the way down from the root.
    pub fn is_editable(&self, path: &[usize]) -> bool {
        let mut editable = self.root.editable().unwrap_or(true);
        let mut children = self.root.children.as_slice();
        for &ix in path.iter().take(self.max_depth) {
            match children.get(ix) {
                Some(Node::Element(el)) => {
                    if let Some(flag) = el.editable() {
                        editable = flag;
                    }
                    children = &el.children;
                }
                Some(_) => break,
                None => return false,
            }
        }
        editable
    }

    /// Nearest element on `path` (the node itself included) matching
    /// `predicate`, returned as the length of its path prefix. The root is
    /// never considered and the walk stops after `max_depth` levels.
    pub fn closest(&self, path: &[usize], predicate: impl Fn(&Element) -> bool) -> Option<usize> {
        let mut found = None;
        let mut children = self.root.children.as_slice();
        for (depth, &ix) in path.iter().enumerate().take(self.max_depth) {
            let Some(Node::Element(el)) = children.get(ix) else {
                break;
            };
            if predicate(el) {
                found = Some(depth + 1);
            }
            children = &el.children;
        }
        found
    }

    /// Replaces `range` of the children of `parent` with `nodes`.
    pub fn splice(&mut self, parent: &[usize], range: Range<usize>, nodes: Vec<Node>) -> bool {
        let Some(children) = self.children_mut(parent) else {
            return false;
        };
        if range.start > range.end || range.end > children.len() {
            return false;
        }
        children.splice(range, nodes);
        self.markup = None;
        true
    }

    pub fn insert_text(&mut self, caret: &Caret, text: &str) -> Option<Caret> {
        if let Some(Node::Text(existing)) = node_at_mut(&mut self.root.children, &caret.path) {
            let offset = clamp_to_char_boundary(existing, caret.offset);
            existing.insert_str(offset, text);
            self.markup = None;
            return Some(Caret::new(caret.path.clone(), offset + text.len()));
        }
        self.insert_nodes(caret, vec![Node::text(text)])
    }

    /// Inserts `nodes` at `caret`, splitting a text container when needed.
    /// Returns the caret just after the inserted content.
    pub fn insert_nodes(&mut self, caret: &Caret, nodes: Vec<Node>) -> Option<Caret> {
        let in_text = match self.node(&caret.path) {
            Some(Node::Text(_)) => true,
            Some(Node::Element(el)) if !el.is_void() => false,
            None if caret.path.is_empty() => false,
            _ => return None,
        };
        if in_text {
            self.insert_into_text(caret, nodes)
        } else {
            self.insert_into_element(&caret.path, caret.offset, nodes)
        }
    }

    fn insert_into_element(
        &mut self,
        path: &[usize],
        index: usize,
        nodes: Vec<Node>,
    ) -> Option<Caret> {
        let tail_len = nodes.last().and_then(Node::as_text).map(str::len);
        let count = nodes.len();
        let children = self.children_mut(path)?;
        let index = index.min(children.len());
        children.splice(index..index, nodes);
        self.markup = None;

        let mut caret_path = path.to_vec();
        match tail_len {
            Some(len) if count > 0 => {
                caret_path.push(index + count - 1);
                Some(Caret::new(caret_path, len))
            }
            _ => Some(Caret::new(caret_path, index + count)),
        }
    }

    fn insert_into_text(&mut self, caret: &Caret, nodes: Vec<Node>) -> Option<Caret> {
        let (parent, ix) = split_path(&caret.path)?;
        let text = self.text(&caret.path)?;
        let offset = clamp_to_char_boundary(text, caret.offset);
        let left = text[..offset].to_string();
        let right = text[offset..].to_string();

        let mut out: Vec<Node> = Vec::with_capacity(nodes.len() + 2);
        if !left.is_empty() {
            out.push(Node::Text(left));
        }
        for node in nodes {
            push_merged(&mut out, node);
        }
        let (caret_slot, caret_offset) = match out.last() {
            Some(Node::Text(last)) => (out.len() - 1, last.len()),
            _ => (out.len(), 0),
        };
        if !right.is_empty() || !matches!(out.last(), Some(Node::Text(_))) {
            push_merged(&mut out, Node::Text(right));
        }

        let children = self.children_mut(parent)?;
        children.splice(ix..ix + 1, out);
        self.markup = None;

        let mut caret_path = parent.to_vec();
        caret_path.push(ix + caret_slot);
        Some(Caret::new(caret_path, caret_offset))
    }

    /// Removes the selected text when both ends sit in the same text node and
    /// collapses the selection. Returns the resulting caret.
    pub fn delete_selection(&mut self) -> Option<Caret> {
        let selection = self.selection.clone()?;
        if selection.is_collapsed() {
            return Some(selection.focus);
        }
        let Some((path, range)) = selection.single_container_range() else {
            tracing::trace!("selection spans several containers; leaving it in place");
            return Some(selection.focus);
        };
        let path = path.to_vec();
        if !self.is_editable(&path) {
            return Some(selection.focus);
        }
        let Some(Node::Text(text)) = node_at_mut(&mut self.root.children, &path) else {
            return Some(selection.focus);
        };
        let start = clamp_to_char_boundary(text, range.start);
        let end = clamp_to_char_boundary(text, range.end);
        if start < end {
            text.replace_range(start..end, "");
            self.markup = None;
        }
        let caret = Caret::new(path, start);
        self.collapse_to(caret.clone());
        Some(caret)
    }

    /// Caret at the end of the last editable text in the surface.
    pub fn end_caret(&self) -> Caret {
        let mut path = Vec::new();
        let mut children = self.root.children.as_slice();
        loop {
            let Some(last) = children.len().checked_sub(1) else {
                return Caret::new(path, 0);
            };
            match &children[last] {
                Node::Text(text) => {
                    path.push(last);
                    return Caret::new(path, text.len());
                }
                Node::Element(el) if !el.is_void() && el.editable() != Some(false) => {
                    path.push(last);
                    children = &el.children;
                }
                _ => return Caret::new(path, children.len()),
            }
        }
    }

    /// Inserts a zero-width marker at `caret`, hands its path to `measure`, and
    /// restores the affected children, the selection and the serialized form
    /// before returning.
    pub fn probe<R>(
        &mut self,
        caret: &Caret,
        measure: impl FnOnce(&Surface, &[usize]) -> Option<R>,
    ) -> Option<R> {
        let parent: Path = match self.node(&caret.path) {
            Some(Node::Text(_)) => split_path(&caret.path)?.0.to_vec(),
            _ => caret.path.clone(),
        };
        let snapshot = self.children(&parent)?.to_vec();
        let markup = self.markup.clone();
        let selection = self.selection.clone();

        let marker = Element::new("span")
            .with_attr(MARKER_ATTR, "")
            .with_text(ZERO_WIDTH_SPACE.to_string());
        let mut result = None;
        if self.insert_nodes(caret, vec![Node::Element(marker)]).is_some() {
            let marker_ix = self
                .children(&parent)
                .and_then(|children| children.iter().position(is_marker));
            if let Some(ix) = marker_ix {
                let mut marker_path = parent.clone();
                marker_path.push(ix);
                result = measure(self, &marker_path);
            }
        }

        if let Some(children) = self.children_mut(&parent) {
            *children = snapshot;
        }
        self.markup = markup;
        self.selection = selection;
        result
    }
}

fn is_marker(node: &Node) -> bool {
    matches!(node, Node::Element(el) if el.attrs.contains_key(MARKER_ATTR))
}

fn push_merged(out: &mut Vec<Node>, node: Node) {
    if let Node::Text(text) = &node {
        if let Some(Node::Text(prev)) = out.last_mut() {
            prev.push_str(text);
            return;
        }
    }
    out.push(node);
}

pub fn split_path(path: &[usize]) -> Option<(&[usize], usize)> {
    let (last, parent) = path.split_last()?;
    Some((parent, *last))
}

pub fn clamp_to_char_boundary(s: &str, mut ix: usize) -> usize {
    ix = ix.min(s.len());
    while ix > 0 && !s.is_char_boundary(ix) {
        ix -= 1;
    }
    ix
}

fn node_at<'a>(children: &'a [Node], path: &[usize]) -> Option<&'a Node> {
    let (&first, rest) = path.split_first()?;
    let node = children.get(first)?;
    if rest.is_empty() {
        return Some(node);
    }
    match node {
        Node::Element(el) => node_at(&el.children, rest),
        _ => None,
    }
}

fn node_at_mut<'a>(children: &'a mut [Node], path: &[usize]) -> Option<&'a mut Node> {
    let (&first, rest) = path.split_first()?;
    let node = children.get_mut(first)?;
    if rest.is_empty() {
        return Some(node);
    }
    match node {
        Node::Element(el) => node_at_mut(&mut el.children, rest),
        _ => None,
    }
}
