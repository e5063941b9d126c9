use serde::{Deserialize, Serialize};

use crate::markup::{Node, ZERO_WIDTH_SPACE};
use crate::surface::Surface;

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub left: f32,
    pub top: f32,
    pub width: f32,
    pub height: f32,
}

impl Rect {
    pub fn new(left: f32, top: f32, width: f32, height: f32) -> Self {
        Self {
            left,
            top,
            width,
            height,
        }
    }

    pub fn right(&self) -> f32 {
        self.left + self.width
    }

    pub fn bottom(&self) -> f32 {
        self.top + self.height
    }
}

/// Geometry of rendered content, in viewport coordinates.
pub trait Layout {
    fn surface_rect(&self) -> Rect;
    fn node_rect(&self, surface: &Surface, path: &[usize]) -> Option<Rect>;
    fn scroll_top(&self) -> f32 {
        0.0
    }
}

/// Fixed-pitch layout: every character advances by `char_width`, blocks and
/// `<br>` start new lines of `line_height`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct MonospaceLayout {
    pub origin: Rect,
    pub char_width: f32,
    pub line_height: f32,
    pub scroll_top: f32,
}

impl Default for MonospaceLayout {
    fn default() -> Self {
        Self {
            origin: Rect::new(0.0, 0.0, 640.0, 480.0),
            char_width: 8.0,
            line_height: 20.0,
            scroll_top: 0.0,
        }
    }
}

impl Layout for MonospaceLayout {
    fn surface_rect(&self) -> Rect {
        self.origin
    }

    fn node_rect(&self, surface: &Surface, path: &[usize]) -> Option<Rect> {
        if path.is_empty() {
            return None;
        }
        let mut walk = LineWalk {
            target: path,
            line: 0,
            col: 0,
        };
        let mut cursor = Vec::new();
        let (line, col, chars) = walk.find(&surface.root().children, &mut cursor)?;
        Some(Rect::new(
            self.origin.left + col as f32 * self.char_width,
            self.origin.top + line as f32 * self.line_height - self.scroll_top,
            chars as f32 * self.char_width,
            self.line_height,
        ))
    }

    fn scroll_top(&self) -> f32 {
        self.scroll_top
    }
}

struct LineWalk<'a> {
    target: &'a [usize],
    line: usize,
    col: usize,
}

impl LineWalk<'_> {
    fn break_line(&mut self) {
        self.line += 1;
        self.col = 0;
    }

    fn find(&mut self, nodes: &[Node], cursor: &mut Vec<usize>) -> Option<(usize, usize, usize)> {
        for (ix, node) in nodes.iter().enumerate() {
            cursor.push(ix);
            let is_target = cursor.as_slice() == self.target;
            match node {
                Node::Text(text) => {
                    if is_target {
                        return Some((self.line, self.col, visible_chars(text)));
                    }
                    self.col += visible_chars(text);
                }
                Node::Element(el) if el.tag == "br" => {
                    if is_target {
                        return Some((self.line, self.col, 0));
                    }
                    self.break_line();
                }
                Node::Element(el) => {
                    if el.is_block() && self.col > 0 {
                        self.break_line();
                    }
                    if is_target {
                        return Some((self.line, self.col, visible_chars(&el.text_content())));
                    }
                    if self.target.starts_with(cursor.as_slice()) {
                        return self.find(&el.children, cursor);
                    }
                    self.skip(&el.children);
                    if el.is_block() && self.col > 0 {
                        self.break_line();
                    }
                }
                Node::Comment(_) => {}
            }
            cursor.pop();
        }
        None
    }

    fn skip(&mut self, nodes: &[Node]) {
        for node in nodes {
            match node {
                Node::Text(text) => self.col += visible_chars(text),
                Node::Element(el) if el.tag == "br" => self.break_line(),
                Node::Element(el) => {
                    if el.is_block() && self.col > 0 {
                        self.break_line();
                    }
                    self.skip(&el.children);
                    if el.is_block() && self.col > 0 {
                        self.break_line();
                    }
                }
                Node::Comment(_) => {}
            }
        }
    }
}

fn visible_chars(text: &str) -> usize {
    text.chars().filter(|ch| *ch != ZERO_WIDTH_SPACE).count()
}

/// Caret position relative to the surface's top-left corner, measured at the
/// bottom of the caret line and corrected for scrolling.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CaretCoords {
    pub top: f32,
    pub left: f32,
}

impl CaretCoords {
    pub fn from_rects(marker: Rect, surface: Rect, scroll_top: f32) -> Self {
        Self {
            top: marker.bottom() - surface.top + scroll_top,
            left: marker.left - surface.left,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Avatar {
    Image(String),
    Initials(String),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelItem {
    pub key: String,
    pub label: String,
    pub avatar: Avatar,
}

/// A list of choices floating over the surface, owned by one plugin.
#[derive(Debug, Clone, PartialEq)]
pub struct FloatingPanel {
    pub owner: String,
    pub top: f32,
    pub left: f32,
    items: Vec<PanelItem>,
    active: usize,
}

impl FloatingPanel {
    pub fn new(owner: impl Into<String>, top: f32, left: f32, items: Vec<PanelItem>) -> Self {
        Self {
            owner: owner.into(),
            top,
            left,
            items,
            active: 0,
        }
    }

    pub fn items(&self) -> &[PanelItem] {
        &self.items
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn active_index(&self) -> usize {
        self.active
    }

    pub fn active_item(&self) -> Option<&PanelItem> {
        self.items.get(self.active)
    }

    pub fn set_active(&mut self, index: usize) -> bool {
        if index >= self.items.len() {
            return false;
        }
        self.active = index;
        true
    }

    pub fn select_next(&mut self) {
        if !self.items.is_empty() {
            self.active = (self.active + 1) % self.items.len();
        }
    }

    pub fn select_previous(&mut self) {
        if !self.items.is_empty() {
            self.active = (self.active + self.items.len() - 1) % self.items.len();
        }
    }
}

/// Holds at most one floating panel for the whole editor.
#[derive(Debug, Default)]
pub struct PanelSlot {
    current: Option<FloatingPanel>,
}

impl PanelSlot {
    pub fn current(&self) -> Option<&FloatingPanel> {
        self.current.as_ref()
    }

    pub fn current_mut(&mut self, owner: &str) -> Option<&mut FloatingPanel> {
        self.current.as_mut().filter(|panel| panel.owner == owner)
    }

    pub fn is_open_for(&self, owner: &str) -> bool {
        self.current.as_ref().is_some_and(|panel| panel.owner == owner)
    }

    /// Shows `panel`, returning the owner of a different panel it replaced.
    pub fn acquire(&mut self, panel: FloatingPanel) -> Option<String> {
        let previous = self.current.replace(panel)?;
        let owner = self.current.as_ref().map(|panel| panel.owner.as_str());
        (owner != Some(previous.owner.as_str())).then_some(previous.owner)
    }

    pub fn release(&mut self, owner: &str) -> bool {
        if !self.is_open_for(owner) {
            return false;
        }
        self.current = None;
        true
    }

    pub fn release_any(&mut self) -> Option<String> {
        self.current.take().map(|panel| panel.owner)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn items(n: usize) -> Vec<PanelItem> {
        (0..n)
            .map(|i| PanelItem {
                key: i.to_string(),
                label: format!("item {i}"),
                avatar: Avatar::Initials("IT".into()),
            })
            .collect()
    }

    #[test]
    fn navigation_wraps_both_ways() {
        let mut panel = FloatingPanel::new("test", 0.0, 0.0, items(3));
        panel.select_previous();
        assert_eq!(panel.active_index(), 2);
        panel.select_next();
        assert_eq!(panel.active_index(), 0);
    }

    #[test]
    fn acquiring_reports_displaced_owner_only() {
        let mut slot = PanelSlot::default();
        assert_eq!(slot.acquire(FloatingPanel::new("a", 0.0, 0.0, items(1))), None);
        assert_eq!(slot.acquire(FloatingPanel::new("a", 1.0, 0.0, items(1))), None);
        assert_eq!(
            slot.acquire(FloatingPanel::new("b", 0.0, 0.0, items(1))),
            Some("a".to_string())
        );
        assert!(!slot.release("a"));
        assert!(slot.release("b"));
        assert!(slot.current().is_none());
    }

    #[test]
    fn monospace_layout_breaks_lines_at_blocks() {
        let surface = Surface::new("<p>abc</p><p>hi <b>x</b></p>");
        let layout = MonospaceLayout::default();
        let rect = layout.node_rect(&surface, &[1, 1]).unwrap();
        assert_eq!(rect, Rect::new(24.0, 20.0, 8.0, 20.0));
        let coords = CaretCoords::from_rects(rect, layout.surface_rect(), layout.scroll_top());
        assert_eq!(coords, CaretCoords { top: 40.0, left: 24.0 });
    }
}
