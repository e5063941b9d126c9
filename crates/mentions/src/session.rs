use play_editor_core::{Caret, Path, Surface, clamp_to_char_boundary};

use crate::candidate::MentionCandidate;
use crate::resolver::Ticket;

/// A trigger found before the caret: the text node holding it, the byte
/// offset of the trigger in that node, and the query typed after it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Trigger {
    pub node: Path,
    pub offset: usize,
    pub query: String,
}

impl Trigger {
    pub fn same_run(&self, other: &Trigger) -> bool {
        self.node == other.node && self.offset == other.offset
    }
}

/// Scans backwards from `caret` inside its text node for `trigger`.
///
/// Nothing is found when the caret is not in editable text or when any
/// whitespace sits between the trigger and the caret.
pub fn detect(surface: &Surface, caret: &Caret, trigger: &str) -> Option<Trigger> {
    if trigger.is_empty() {
        return None;
    }
    let text = surface.text(&caret.path)?;
    if !surface.is_editable(&caret.path) {
        return None;
    }
    let before = &text[..clamp_to_char_boundary(text, caret.offset)];
    let offset = before.rfind(trigger)?;
    let query = &before[offset + trigger.len()..];
    if query.chars().any(char::is_whitespace) {
        return None;
    }
    Some(Trigger {
        node: caret.path.clone(),
        offset,
        query: query.to_string(),
    })
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MentionPhase {
    Idle,
    Triggered,
    Resolving,
    Displaying,
}

#[derive(Debug, Clone)]
pub struct Session {
    pub trigger: Trigger,
    /// Caret as of the last event, used when the candidate is accepted.
    pub caret: Caret,
    pub candidates: Vec<MentionCandidate>,
    pub pending: Option<Ticket>,
}

impl Session {
    pub fn new(trigger: Trigger, caret: Caret) -> Self {
        Self {
            trigger,
            caret,
            candidates: Vec::new(),
            pending: None,
        }
    }

    pub fn phase(&self) -> MentionPhase {
        if self.pending.is_some() {
            MentionPhase::Resolving
        } else if self.candidates.is_empty() {
            MentionPhase::Triggered
        } else {
            MentionPhase::Displaying
        }
    }
}
