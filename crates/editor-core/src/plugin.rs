use std::task::{Context, Poll};

use indexmap::IndexMap;

use crate::error::{EditorError, PluginError};
use crate::event::{EventResult, SurfaceEvent};
use crate::host::EditorContext;

/// A named unit of editor behaviour.
///
/// `initialize` runs exactly once, when the plugin is registered. Afterwards
/// the plugin only sees the editor through events and task polling.
pub trait Plugin {
    fn name(&self) -> &str;

    fn initialize(&mut self, cx: &mut EditorContext) -> Result<(), PluginError> {
        let _ = cx;
        Ok(())
    }

    fn handle_event(&mut self, cx: &mut EditorContext, event: &SurfaceEvent) -> EventResult {
        let _ = (cx, event);
        EventResult::Ignored
    }

    /// Drives outstanding asynchronous work.
    fn poll_tasks(&mut self, cx: &mut EditorContext, task_cx: &mut Context<'_>) -> Poll<()> {
        let _ = (cx, task_cx);
        Poll::Ready(())
    }
}

#[derive(Default)]
pub struct PluginRegistry {
    plugins: IndexMap<String, Box<dyn Plugin>>,
}

impl PluginRegistry {
    pub fn register(
        &mut self,
        mut plugin: Box<dyn Plugin>,
        cx: &mut EditorContext,
    ) -> Result<(), EditorError> {
        let name = plugin.name().to_string();
        if self.plugins.contains_key(&name) {
            return Err(EditorError::DuplicatePlugin(name));
        }
        if let Err(source) = plugin.initialize(cx) {
            return Err(EditorError::Plugin { name, source });
        }
        tracing::debug!(plugin = %name, "plugin initialized");
        self.plugins.insert(name, plugin);
        Ok(())
    }

    /// Offers `event` to each plugin in registration order until one consumes it.
    pub fn dispatch(&mut self, cx: &mut EditorContext, event: &SurfaceEvent) -> EventResult {
        for (name, plugin) in &mut self.plugins {
            if plugin.handle_event(cx, event).is_consumed() {
                tracing::trace!(plugin = %name, ?event, "event consumed");
                return EventResult::Consumed;
            }
        }
        EventResult::Ignored
    }

    pub fn poll(&mut self, cx: &mut EditorContext, task_cx: &mut Context<'_>) -> Poll<()> {
        let mut pending = false;
        for plugin in self.plugins.values_mut() {
            if plugin.poll_tasks(cx, task_cx).is_pending() {
                pending = true;
            }
        }
        if pending { Poll::Pending } else { Poll::Ready(()) }
    }

    pub fn get(&self, name: &str) -> Option<&dyn Plugin> {
        self.plugins.get(name).map(|plugin| plugin.as_ref())
    }

    pub fn contains(&self, name: &str) -> bool {
        self.plugins.contains_key(name)
    }

    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.plugins.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.plugins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.plugins.is_empty()
    }
}
