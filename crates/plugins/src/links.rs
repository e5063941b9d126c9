use std::rc::Rc;

use play_editor_core::{Command, EditorContext, Node, Plugin, PluginError, icons};

pub type PromptFn = Rc<dyn Fn() -> Option<String>>;

/// "Insert Link" and "Unlink" buttons. The URL comes from a host-supplied
/// prompt; inserted links open in a new tab.
pub struct LinksPlugin {
    prompt: PromptFn,
}

impl LinksPlugin {
    pub fn new(prompt: impl Fn() -> Option<String> + 'static) -> Self {
        Self {
            prompt: Rc::new(prompt),
        }
    }
}

impl Plugin for LinksPlugin {
    fn name(&self) -> &str {
        "links"
    }

    fn initialize(&mut self, cx: &mut EditorContext) -> Result<(), PluginError> {
        cx.add_toolbar_divider();

        let prompt = self.prompt.clone();
        cx.add_toolbar_button(icons::link(), "Insert Link", move |cx| {
            let Some(url) = prompt().filter(|url| !url.trim().is_empty()) else {
                tracing::trace!("link prompt dismissed");
                return;
            };
            cx.exec(Command::CreateLink(url));
            if missing_target(&cx.surface().root().children) {
                set_blank_targets(&mut cx.surface_mut().root_mut().children);
                cx.sync();
            }
        });

        cx.add_toolbar_button(icons::unlink(), "Unlink", |cx| cx.exec(Command::Unlink));
        Ok(())
    }
}

fn missing_target(nodes: &[Node]) -> bool {
    nodes.iter().any(|node| match node {
        Node::Element(el) => {
            (el.tag == "a" && el.attr("target").is_none()) || missing_target(&el.children)
        }
        _ => false,
    })
}

fn set_blank_targets(nodes: &mut [Node]) {
    for node in nodes {
        if let Node::Element(el) = node {
            if el.tag == "a" && el.attr("target").is_none() {
                el.set_attr("target", "_blank");
            }
            set_blank_targets(&mut el.children);
        }
    }
}
