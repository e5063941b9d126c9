use play_editor_core::{Command, EditorContext, Plugin, PluginError, icons};

/// Bold, italic, underline and strike-through buttons.
#[derive(Debug, Default)]
pub struct FormattingPlugin;

impl Plugin for FormattingPlugin {
    fn name(&self) -> &str {
        "formatting"
    }

    fn initialize(&mut self, cx: &mut EditorContext) -> Result<(), PluginError> {
        let buttons = [
            (icons::bold(), "Bold", Command::Bold),
            (icons::italic(), "Italic", Command::Italic),
            (icons::underline(), "Underline", Command::Underline),
            (icons::strikethrough(), "Strikethrough", Command::StrikeThrough),
        ];
        for (icon, tooltip, command) in buttons {
            cx.add_toolbar_button(icon, tooltip, move |cx| cx.exec(command.clone()));
        }
        Ok(())
    }
}
