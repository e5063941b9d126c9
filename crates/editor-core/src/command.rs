use serde::{Deserialize, Serialize};

use crate::markup::{self, Element, Node};
use crate::surface::{Caret, Selection, Surface, clamp_to_char_boundary, split_path};

/// Formatting commands understood by the host, named after the document
/// editing command set of the browser.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "command", content = "value", rename_all = "camelCase")]
pub enum Command {
    Bold,
    Italic,
    Underline,
    StrikeThrough,
    CreateLink(String),
    Unlink,
    #[serde(rename = "insertHTML")]
    InsertHtml(String),
    InsertText(String),
    JustifyLeft,
    JustifyCenter,
    JustifyRight,
    JustifyFull,
    InsertOrderedList,
    InsertUnorderedList,
    Indent,
    Outdent,
    ForeColor(String),
    HiliteColor(String),
    FormatBlock(String),
    RemoveFormat,
    InsertHorizontalRule,
    Undo,
    Redo,
}

impl Command {
    pub fn identifier(&self) -> &'static str {
        match self {
            Self::Bold => "bold",
            Self::Italic => "italic",
            Self::Underline => "underline",
            Self::StrikeThrough => "strikeThrough",
            Self::CreateLink(_) => "createLink",
            Self::Unlink => "unlink",
            Self::InsertHtml(_) => "insertHTML",
            Self::InsertText(_) => "insertText",
            Self::JustifyLeft => "justifyLeft",
            Self::JustifyCenter => "justifyCenter",
            Self::JustifyRight => "justifyRight",
            Self::JustifyFull => "justifyFull",
            Self::InsertOrderedList => "insertOrderedList",
            Self::InsertUnorderedList => "insertUnorderedList",
            Self::Indent => "indent",
            Self::Outdent => "outdent",
            Self::ForeColor(_) => "foreColor",
            Self::HiliteColor(_) => "hiliteColor",
            Self::FormatBlock(_) => "formatBlock",
            Self::RemoveFormat => "removeFormat",
            Self::InsertHorizontalRule => "insertHorizontalRule",
            Self::Undo => "undo",
            Self::Redo => "redo",
        }
    }

    pub fn value(&self) -> Option<&str> {
        match self {
            Self::CreateLink(value)
            | Self::InsertHtml(value)
            | Self::InsertText(value)
            | Self::ForeColor(value)
            | Self::HiliteColor(value)
            | Self::FormatBlock(value) => Some(value),
            _ => None,
        }
    }
}

/// Applies commands to the surface at its current selection.
pub trait FormattingEngine {
    fn execute(&mut self, surface: &mut Surface, command: &Command);
}

/// Engine covering text insertion, inline marks confined to a single text
/// node, links, alignment and rules. Everything else is accepted and ignored.
#[derive(Debug, Default, Clone, Copy)]
pub struct BasicEngine;

impl FormattingEngine for BasicEngine {
    fn execute(&mut self, surface: &mut Surface, command: &Command) {
        match command {
            Command::InsertText(text) => {
                let Some(caret) = surface.delete_selection() else {
                    return;
                };
                if !surface.is_editable(&caret.path) {
                    return;
                }
                if let Some(next) = surface.insert_text(&caret, text) {
                    surface.collapse_to(next);
                }
            }
            Command::InsertHtml(html) => insert(surface, markup::parse_fragment(html)),
            Command::InsertHorizontalRule => insert(surface, vec![Element::new("hr").into()]),
            Command::Bold => wrap_inline(surface, Element::new("b")),
            Command::Italic => wrap_inline(surface, Element::new("i")),
            Command::Underline => wrap_inline(surface, Element::new("u")),
            Command::StrikeThrough => wrap_inline(surface, Element::new("strike")),
            Command::CreateLink(url) => {
                wrap_inline(surface, Element::new("a").with_attr("href", url.as_str()))
            }
            Command::Unlink => unlink(surface),
            Command::JustifyLeft => justify(surface, "left"),
            Command::JustifyCenter => justify(surface, "center"),
            Command::JustifyRight => justify(surface, "right"),
            Command::JustifyFull => justify(surface, "justify"),
            other => {
                tracing::debug!(
                    command = other.identifier(),
                    "command not supported by BasicEngine"
                );
            }
        }
    }
}

fn insert(surface: &mut Surface, nodes: Vec<Node>) {
    let Some(caret) = surface.delete_selection() else {
        return;
    };
    if !surface.is_editable(&caret.path) {
        return;
    }
    if let Some(next) = surface.insert_nodes(&caret, nodes) {
        surface.collapse_to(next);
    }
}

fn wrap_inline(surface: &mut Surface, wrapper: Element) {
    let Some(selection) = surface.selection().cloned() else {
        return;
    };
    let Some((path, range)) = selection.single_container_range() else {
        tracing::debug!(tag = %wrapper.tag, "selection spans several nodes; not wrapping");
        return;
    };
    if range.is_empty() || !surface.is_editable(path) {
        return;
    }
    let Some(text) = surface.text(path) else {
        return;
    };
    let start = clamp_to_char_boundary(text, range.start);
    let end = clamp_to_char_boundary(text, range.end);
    if start >= end {
        return;
    }
    let before = text[..start].to_string();
    let inner = text[start..end].to_string();
    let after = text[end..].to_string();
    let Some((parent, ix)) = split_path(path) else {
        return;
    };

    let mut nodes = Vec::with_capacity(3);
    if !before.is_empty() {
        nodes.push(Node::Text(before));
    }
    let wrapped_ix = ix + nodes.len();
    let inner_len = inner.len();
    nodes.push(wrapper.with_text(inner).into());
    if !after.is_empty() {
        nodes.push(Node::Text(after));
    }
    let parent = parent.to_vec();
    if !surface.splice(&parent, ix..ix + 1, nodes) {
        return;
    }

    let mut inner_path = parent;
    inner_path.extend([wrapped_ix, 0]);
    surface.set_selection(Some(Selection::new(
        Caret::new(inner_path.clone(), 0),
        Caret::new(inner_path, inner_len),
    )));
}

fn unlink(surface: &mut Surface) {
    let Some(caret) = surface.caret() else {
        return;
    };
    let Some(depth) = surface.closest(&caret.path, |el| el.tag == "a") else {
        tracing::trace!("no link around the caret");
        return;
    };
    let link_path = caret.path[..depth].to_vec();
    let Some((parent, ix)) = split_path(&link_path) else {
        return;
    };
    let Some(Node::Element(link)) = surface.node(&link_path).cloned() else {
        return;
    };
    let count = link.children.len();
    let parent = parent.to_vec();
    if !surface.splice(&parent, ix..ix + 1, link.children) {
        return;
    }

    let remap = |caret: &Caret| -> Caret {
        if !caret.path.starts_with(&link_path) {
            return caret.clone();
        }
        let mut path = parent.clone();
        match caret.path.get(depth) {
            Some(&child) => {
                path.push(ix + child);
                path.extend_from_slice(&caret.path[depth + 1..]);
                Caret::new(path, caret.offset)
            }
            None => Caret::new(path, ix + caret.offset.min(count)),
        }
    };
    let remapped = surface
        .selection()
        .map(|sel| Selection::new(remap(&sel.anchor), remap(&sel.focus)));
    surface.set_selection(remapped);
}

fn justify(surface: &mut Surface, align: &str) {
    let Some(caret) = surface.caret() else {
        return;
    };
    match surface.closest(&caret.path, Element::is_block) {
        Some(depth) => {
            if let Some(Node::Element(block)) = surface.node_mut(&caret.path[..depth]) {
                block.set_style_property("text-align", align);
            }
        }
        None => surface.root_mut().set_style_property("text-align", align),
    }
}
