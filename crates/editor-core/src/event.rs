use serde::{Deserialize, Serialize};

use crate::toolbar::ButtonId;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum Key {
    Tab,
    Enter,
    Escape,
    ArrowUp,
    ArrowDown,
    ArrowLeft,
    ArrowRight,
    Backspace,
    Char(char),
    Other(String),
}

/// Where a pointer press landed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum PointerTarget {
    Surface,
    /// An item of the floating panel, by index.
    Panel { item: usize },
    Toolbar(ButtonId),
    /// Anywhere else on the page.
    Outside,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum SurfaceEvent {
    Input,
    SelectionChange,
    KeyDown(Key),
    PointerDown(PointerTarget),
    Focus,
    Blur,
    /// The floating panel held by `owner` was taken down by someone else.
    PanelDismissed { owner: String },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum EventResult {
    #[default]
    Ignored,
    Consumed,
}

impl EventResult {
    pub fn is_consumed(self) -> bool {
        matches!(self, Self::Consumed)
    }
}
