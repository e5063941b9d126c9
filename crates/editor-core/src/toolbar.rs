use std::fmt;
use std::rc::Rc;

use serde::{Deserialize, Serialize};

use crate::host::EditorContext;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ButtonId(pub usize);

pub type ButtonHandler = Rc<dyn Fn(&mut EditorContext)>;

#[derive(Clone)]
pub struct ToolbarButton {
    pub id: ButtonId,
    /// Icon markup (usually an inline svg).
    pub icon: String,
    pub tooltip: String,
    pub active: bool,
    pub on_click: ButtonHandler,
}

impl fmt::Debug for ToolbarButton {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ToolbarButton")
            .field("id", &self.id)
            .field("tooltip", &self.tooltip)
            .field("active", &self.active)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub enum ToolbarItem {
    Button(ToolbarButton),
    Divider,
}

#[derive(Debug, Default)]
pub struct Toolbar {
    items: Vec<ToolbarItem>,
    next_id: usize,
}

impl Toolbar {
    pub fn add_button(
        &mut self,
        icon: impl Into<String>,
        tooltip: impl Into<String>,
        on_click: impl Fn(&mut EditorContext) + 'static,
    ) -> ButtonId {
        let id = ButtonId(self.next_id);
        self.next_id += 1;
        self.items.push(ToolbarItem::Button(ToolbarButton {
            id,
            icon: icon.into(),
            tooltip: tooltip.into(),
            active: false,
            on_click: Rc::new(on_click),
        }));
        id
    }

    pub fn add_divider(&mut self) {
        self.items.push(ToolbarItem::Divider);
    }

    pub fn items(&self) -> &[ToolbarItem] {
        &self.items
    }

    pub fn buttons(&self) -> impl Iterator<Item = &ToolbarButton> {
        self.items.iter().filter_map(|item| match item {
            ToolbarItem::Button(button) => Some(button),
            ToolbarItem::Divider => None,
        })
    }

    pub fn button(&self, id: ButtonId) -> Option<&ToolbarButton> {
        self.buttons().find(|button| button.id == id)
    }

    pub fn find_by_tooltip(&self, tooltip: &str) -> Option<ButtonId> {
        self.buttons()
            .find(|button| button.tooltip == tooltip)
            .map(|button| button.id)
    }

    pub fn set_active(&mut self, id: ButtonId, active: bool) -> bool {
        for item in &mut self.items {
            if let ToolbarItem::Button(button) = item {
                if button.id == id {
                    button.active = active;
                    return true;
                }
            }
        }
        false
    }

    pub(crate) fn handler(&self, id: ButtonId) -> Option<ButtonHandler> {
        self.button(id).map(|button| button.on_click.clone())
    }
}
