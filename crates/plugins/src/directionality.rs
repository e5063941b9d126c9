use play_editor_core::{EditorContext, Node, Plugin, PluginError, icons};

/// Left-to-right and right-to-left buttons.
///
/// The `dir` attribute lands on the innermost element holding the caret, or
/// on the surface itself when the caret sits directly under it.
#[derive(Debug, Default)]
pub struct DirectionalityPlugin;

fn set_direction(cx: &mut EditorContext, dir: &str) {
    let Some(caret) = cx.caret() else {
        return;
    };
    let depth = cx.surface().closest(&caret.path, |_| true);
    match depth {
        Some(depth) => {
            if let Some(Node::Element(el)) = cx.surface_mut().node_mut(&caret.path[..depth]) {
                el.set_attr("dir", dir);
            }
        }
        None => cx.surface_mut().root_mut().set_attr("dir", dir),
    }
    cx.sync();
}

impl Plugin for DirectionalityPlugin {
    fn name(&self) -> &str {
        "directionality"
    }

    fn initialize(&mut self, cx: &mut EditorContext) -> Result<(), PluginError> {
        cx.add_toolbar_divider();
        cx.add_toolbar_button(icons::ltr(), "Left to Right", |cx| set_direction(cx, "ltr"));
        cx.add_toolbar_button(icons::rtl(), "Right to Left", |cx| set_direction(cx, "rtl"));
        Ok(())
    }
}
