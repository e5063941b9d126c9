use play_editor_core::{Caret, Element, NBSP, Node, Surface, clamp_to_char_boundary, split_path};

use crate::candidate::MentionCandidate;
use crate::session::Trigger;

pub const MENTION_CLASS: &str = "play-editor-mention";

pub fn mention_token(candidate: &MentionCandidate, trigger: &str) -> Element {
    Element::new("span")
        .with_attr("class", MENTION_CLASS)
        .with_attr("contenteditable", "false")
        .with_attr("data-user-id", candidate.id.as_str())
        .with_text(format!("{trigger}{}", candidate.display_name))
}

/// Replaces the trigger and query (up to `caret`) with a mention token and a
/// trailing non-breaking space, leaving the caret after the space.
///
/// Returns `None` without touching the surface when the text at
/// `found.offset` no longer starts with the trigger.
pub fn splice_mention(
    surface: &mut Surface,
    found: &Trigger,
    caret: &Caret,
    candidate: &MentionCandidate,
    trigger: &str,
) -> Option<Caret> {
    let text = surface.text(&found.node)?;
    if !text.get(found.offset..)?.starts_with(trigger) {
        return None;
    }
    let end = if caret.path == found.node {
        clamp_to_char_boundary(text, caret.offset.max(found.offset + trigger.len()))
    } else {
        clamp_to_char_boundary(text, found.offset + trigger.len() + found.query.len())
    };
    let before = text[..found.offset].to_string();
    let after = format!("{NBSP}{}", &text[end..]);
    let (parent, ix) = split_path(&found.node)?;
    let parent = parent.to_vec();

    let mut nodes = Vec::with_capacity(3);
    if !before.is_empty() {
        nodes.push(Node::Text(before));
    }
    let token_ix = ix + nodes.len();
    nodes.push(mention_token(candidate, trigger).into());
    nodes.push(Node::Text(after));
    if !surface.splice(&parent, ix..ix + 1, nodes) {
        return None;
    }

    let mut path = parent;
    path.push(token_ix + 1);
    let caret = Caret::new(path, NBSP.len_utf8());
    surface.collapse_to(caret.clone());
    Some(caret)
}
