use std::collections::VecDeque;
use std::rc::Rc;
use std::task::{Context, Poll};

use crate::command::{BasicEngine, Command, FormattingEngine};
use crate::config::EditorConfig;
use crate::error::EditorError;
use crate::event::{EventResult, Key, PointerTarget, SurfaceEvent};
use crate::field::{FieldHandle, FieldRef};
use crate::panel::{CaretCoords, FloatingPanel, Layout, MonospaceLayout, PanelSlot};
use crate::plugin::{Plugin, PluginRegistry};
use crate::surface::{Caret, Selection, Surface};
use crate::toolbar::{ButtonId, Toolbar};

pub type ChangeListener = Rc<dyn Fn(&str)>;

/// Everything a plugin may touch: the surface, the toolbar, the backing field
/// and the floating-panel slot.
pub struct EditorContext {
    config: EditorConfig,
    field: FieldHandle,
    surface: Surface,
    toolbar: Toolbar,
    panel: PanelSlot,
    engine: Box<dyn FormattingEngine>,
    layout: Box<dyn Layout>,
    focused: bool,
    queue: VecDeque<SurfaceEvent>,
    listeners: Vec<ChangeListener>,
}

impl EditorContext {
    fn new(
        config: EditorConfig,
        field: FieldHandle,
        engine: Box<dyn FormattingEngine>,
        layout: Box<dyn Layout>,
    ) -> Self {
        let surface = Surface::with_max_depth(&field.value(), config.max_ancestor_depth);
        Self {
            config,
            field,
            surface,
            toolbar: Toolbar::default(),
            panel: PanelSlot::default(),
            engine,
            layout,
            focused: false,
            queue: VecDeque::new(),
            listeners: Vec::new(),
        }
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Focuses the surface, runs `command` at the current selection and
    /// copies the result into the backing field.
    pub fn exec(&mut self, command: Command) {
        self.focused = true;
        if self.surface.selection().is_none() {
            tracing::trace!(command = command.identifier(), "no selection; command skipped");
            return;
        }
        tracing::debug!(command = command.identifier(), value = ?command.value(), "exec");
        self.engine.execute(&mut self.surface, &command);
        self.sync();
    }

    pub fn add_toolbar_button(
        &mut self,
        icon: impl Into<String>,
        tooltip: impl Into<String>,
        on_click: impl Fn(&mut EditorContext) + 'static,
    ) -> ButtonId {
        self.toolbar.add_button(icon, tooltip, on_click)
    }

    pub fn add_toolbar_divider(&mut self) {
        self.toolbar.add_divider();
    }

    pub fn set_button_active(&mut self, id: ButtonId, active: bool) -> bool {
        self.toolbar.set_active(id, active)
    }

    pub fn content(&self) -> String {
        self.surface.markup().into_owned()
    }

    /// Replaces the surface content. Carets into the old content are gone, so
    /// an open panel is dismissed and plugins see the selection change.
    pub fn set_content(&mut self, markup: &str) {
        self.surface.set_markup(markup);
        if let Some(owner) = self.panel.release_any() {
            self.emit(SurfaceEvent::PanelDismissed { owner });
        }
        self.emit(SurfaceEvent::SelectionChange);
        self.sync();
    }

    /// Copies the surface markup into the backing field, then notifies
    /// change listeners.
    pub fn sync(&mut self) {
        let markup = self.surface.markup().into_owned();
        self.field.set_value(markup.as_str());
        for listener in &self.listeners {
            listener(&markup);
        }
    }

    pub fn subscribe_changes(&mut self, listener: impl Fn(&str) + 'static) {
        self.listeners.push(Rc::new(listener));
    }

    pub fn surface(&self) -> &Surface {
        &self.surface
    }

    pub fn surface_mut(&mut self) -> &mut Surface {
        &mut self.surface
    }

    pub fn field(&self) -> &FieldHandle {
        &self.field
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.toolbar
    }

    pub fn caret(&self) -> Option<Caret> {
        self.surface.caret()
    }

    /// Moves the caret without raising a selection event.
    pub fn set_caret(&mut self, caret: Caret) {
        self.surface.collapse_to(caret);
    }

    /// Queues `event` behind the one currently being handled.
    pub fn emit(&mut self, event: SurfaceEvent) {
        self.queue.push_back(event);
    }

    pub fn is_focused(&self) -> bool {
        self.focused
    }

    pub fn focus(&mut self) {
        self.focused = true;
    }

    pub fn panel(&self) -> Option<&FloatingPanel> {
        self.panel.current()
    }

    /// Shows `panel`. A panel held by another owner is replaced and that
    /// owner receives `PanelDismissed`.
    pub fn open_panel(&mut self, panel: FloatingPanel) {
        if let Some(previous) = self.panel.acquire(panel) {
            self.emit(SurfaceEvent::PanelDismissed { owner: previous });
        }
    }

    pub fn panel_mut(&mut self, owner: &str) -> Option<&mut FloatingPanel> {
        self.panel.current_mut(owner)
    }

    pub fn close_panel(&mut self, owner: &str) -> bool {
        self.panel.release(owner)
    }

    pub fn set_layout(&mut self, layout: impl Layout + 'static) {
        self.layout = Box::new(layout);
    }

    /// Position of `caret` relative to the surface, taken from a transient
    /// marker inserted at the caret.
    pub fn measure_caret(&mut self, caret: &Caret) -> Option<CaretCoords> {
        let layout = &self.layout;
        self.surface.probe(caret, |surface, marker| {
            let rect = layout.node_rect(surface, marker)?;
            Some(CaretCoords::from_rects(
                rect,
                layout.surface_rect(),
                layout.scroll_top(),
            ))
        })
    }
}

pub struct EditorBuilder {
    config: EditorConfig,
    engine: Box<dyn FormattingEngine>,
    layout: Box<dyn Layout>,
    plugins: Vec<Box<dyn Plugin>>,
}

impl Default for EditorBuilder {
    fn default() -> Self {
        Self {
            config: EditorConfig::default(),
            engine: Box::new(BasicEngine),
            layout: Box::new(MonospaceLayout::default()),
            plugins: Vec::new(),
        }
    }
}

impl EditorBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    pub fn engine(mut self, engine: impl FormattingEngine + 'static) -> Self {
        self.engine = Box::new(engine);
        self
    }

    pub fn layout(mut self, layout: impl Layout + 'static) -> Self {
        self.layout = Box::new(layout);
        self
    }

    pub fn plugin(mut self, plugin: impl Plugin + 'static) -> Self {
        self.plugins.push(Box::new(plugin));
        self
    }

    pub fn plugins(mut self, plugins: impl IntoIterator<Item = Box<dyn Plugin>>) -> Self {
        self.plugins.extend(plugins);
        self
    }

    /// Attaches to `field`, hides it, and registers the plugins in order.
    /// Any plugin failure aborts construction and leaves the field visible.
    pub fn build<'a>(self, field: impl Into<FieldRef<'a>>) -> Result<EditorHost, EditorError> {
        let field = field.into().resolve()?;
        let config = self.config.with_defaults();
        if config.hide_field {
            field.set_hidden(true);
        }

        let mut cx = EditorContext::new(config, field.clone(), self.engine, self.layout);
        let mut plugins = PluginRegistry::default();
        for plugin in self.plugins {
            if let Err(err) = plugins.register(plugin, &mut cx) {
                field.set_hidden(false);
                return Err(err);
            }
        }
        tracing::debug!(plugins = plugins.len(), "editor host ready");

        let mut host = EditorHost { cx, plugins };
        host.drain();
        Ok(host)
    }
}

/// Binds a backing text field to an editable surface and routes events
/// through the registered plugins.
pub struct EditorHost {
    cx: EditorContext,
    plugins: PluginRegistry,
}

impl EditorHost {
    pub fn new<'a>(
        field: impl Into<FieldRef<'a>>,
        plugins: Vec<Box<dyn Plugin>>,
    ) -> Result<Self, EditorError> {
        EditorBuilder::new().plugins(plugins).build(field)
    }

    pub fn builder() -> EditorBuilder {
        EditorBuilder::new()
    }

    pub fn context(&self) -> &EditorContext {
        &self.cx
    }

    pub fn context_mut(&mut self) -> &mut EditorContext {
        &mut self.cx
    }

    /// Handles `event` and everything it causes to be queued.
    pub fn dispatch(&mut self, event: SurfaceEvent) -> EventResult {
        let result = self.process(event);
        self.drain();
        result
    }

    fn drain(&mut self) {
        while let Some(event) = self.cx.queue.pop_front() {
            self.process(event);
        }
    }

    fn process(&mut self, event: SurfaceEvent) -> EventResult {
        match &event {
            SurfaceEvent::Input => {
                self.cx.sync();
                self.plugins.dispatch(&mut self.cx, &event)
            }
            SurfaceEvent::KeyDown(key) => {
                let result = self.plugins.dispatch(&mut self.cx, &event);
                if result.is_consumed() || *key != Key::Tab {
                    return result;
                }
                let glyph = self.cx.config.tab_glyph.clone();
                self.cx.exec(Command::InsertText(glyph));
                self.cx.emit(SurfaceEvent::Input);
                EventResult::Consumed
            }
            SurfaceEvent::PointerDown(target) => {
                if !matches!(target, PointerTarget::Panel { .. }) {
                    if let Some(owner) = self.cx.panel.release_any() {
                        self.cx.emit(SurfaceEvent::PanelDismissed { owner });
                    }
                }
                if let PointerTarget::Toolbar(id) = target {
                    match self.cx.toolbar.handler(*id) {
                        Some(handler) => handler(&mut self.cx),
                        None => tracing::trace!(?id, "click on unknown toolbar button"),
                    }
                }
                self.plugins.dispatch(&mut self.cx, &event)
            }
            SurfaceEvent::Focus => {
                self.cx.focused = true;
                self.plugins.dispatch(&mut self.cx, &event)
            }
            SurfaceEvent::Blur => {
                self.cx.focused = false;
                self.plugins.dispatch(&mut self.cx, &event)
            }
            SurfaceEvent::SelectionChange | SurfaceEvent::PanelDismissed { .. } => {
                self.plugins.dispatch(&mut self.cx, &event)
            }
        }
    }

    /// Types `text` at the caret, replacing any selection.
    pub fn type_text(&mut self, text: &str) -> EventResult {
        let Some(caret) = self.cx.surface.delete_selection() else {
            tracing::trace!("no caret; typed text dropped");
            return EventResult::Ignored;
        };
        if !self.cx.surface.is_editable(&caret.path) {
            tracing::trace!(?caret, "caret inside non-editable content");
            return EventResult::Ignored;
        }
        let Some(next) = self.cx.surface.insert_text(&caret, text) else {
            return EventResult::Ignored;
        };
        self.cx.surface.collapse_to(next);
        self.cx.focused = true;
        self.dispatch(SurfaceEvent::Input)
    }

    pub fn set_caret(&mut self, caret: Caret) -> EventResult {
        self.cx.surface.collapse_to(caret);
        self.dispatch(SurfaceEvent::SelectionChange)
    }

    pub fn move_caret_to_end(&mut self) -> EventResult {
        let caret = self.cx.surface.end_caret();
        self.set_caret(caret)
    }

    pub fn set_selection(&mut self, selection: Selection) -> EventResult {
        self.cx.surface.set_selection(Some(selection));
        self.dispatch(SurfaceEvent::SelectionChange)
    }

    pub fn press_key(&mut self, key: Key) -> EventResult {
        self.dispatch(SurfaceEvent::KeyDown(key))
    }

    pub fn pointer_down(&mut self, target: PointerTarget) -> EventResult {
        self.dispatch(SurfaceEvent::PointerDown(target))
    }

    pub fn click_toolbar(&mut self, id: ButtonId) -> EventResult {
        self.pointer_down(PointerTarget::Toolbar(id))
    }

    pub fn focus(&mut self) -> EventResult {
        self.dispatch(SurfaceEvent::Focus)
    }

    pub fn blur(&mut self) -> EventResult {
        self.dispatch(SurfaceEvent::Blur)
    }

    /// Polls plugin tasks once, applying whatever has completed.
    pub fn poll_tasks(&mut self, task_cx: &mut Context<'_>) -> Poll<()> {
        let poll = self.plugins.poll(&mut self.cx, task_cx);
        self.drain();
        poll
    }

    /// Resolves once no plugin has outstanding work.
    pub async fn settle(&mut self) {
        std::future::poll_fn(|task_cx| self.poll_tasks(task_cx)).await
    }

    pub fn exec(&mut self, command: Command) {
        self.cx.exec(command);
        self.drain();
    }

    pub fn content(&self) -> String {
        self.cx.content()
    }

    pub fn set_content(&mut self, markup: &str) {
        self.cx.set_content(markup);
        self.drain();
    }

    pub fn subscribe_changes(&mut self, listener: impl Fn(&str) + 'static) {
        self.cx.subscribe_changes(listener);
    }

    pub fn plugin(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins.get(name)
    }

    pub fn plugin_names(&self) -> Vec<&str> {
        self.plugins.names().collect()
    }

    pub fn caret(&self) -> Option<Caret> {
        self.cx.caret()
    }

    pub fn panel(&self) -> Option<&FloatingPanel> {
        self.cx.panel()
    }

    pub fn surface(&self) -> &Surface {
        &self.cx.surface
    }

    pub fn field(&self) -> &FieldHandle {
        &self.cx.field
    }

    pub fn toolbar(&self) -> &Toolbar {
        &self.cx.toolbar
    }

    pub fn is_focused(&self) -> bool {
        self.cx.focused
    }
}
