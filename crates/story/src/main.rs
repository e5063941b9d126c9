use anyhow::{Context as _, anyhow};
use play_editor_core::{
    Caret, EditorConfig, EditorHost, FieldRef, Key, MonospaceLayout, Page, Selection, TextField,
};
use play_editor_mentions::{Lookup, MentionCandidate, MentionsConfig, MentionsPlugin};
use play_editor_plugins::{DirectionalityPlugin, FormattingPlugin, LinksPlugin};
use tracing_subscriber::EnvFilter;

const MENTIONS_CONFIG: &str = r#"{
    "trigger": "@",
    "maxItems": 5,
    "users": [
        { "id": "u1", "name": "Alice Liddell" },
        { "id": "u2", "name": "Alan Kay", "avatar": "https://example.com/alan.png" },
        { "id": "u3", "name": "Grace Hopper" }
    ]
}"#;

fn load_config() -> anyhow::Result<EditorConfig> {
    let Some(path) = std::env::args().nth(1) else {
        return Ok(EditorConfig::default());
    };
    let src = std::fs::read_to_string(&path)
        .with_context(|| format!("reading editor config {path}"))?;
    EditorConfig::from_json_str(&src).with_context(|| format!("parsing editor config {path}"))
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new("info,play_editor_core=debug,play_editor_mentions=debug")
        }))
        .init();

    let mut page = Page::new();
    let field = page.insert("body", TextField::textarea("<p>Hello </p>"));

    let mentions = MentionsConfig::from_json_str(MENTIONS_CONFIG)?;
    let directory = mentions.users.clone();

    let mut host = EditorHost::builder()
        .config(load_config()?)
        .layout(MonospaceLayout::default())
        .plugin(FormattingPlugin)
        .plugin(LinksPlugin::new(|| Some("https://example.com".to_string())))
        .plugin(DirectionalityPlugin)
        .plugin(MentionsPlugin::new(mentions).with_lookup(move |query| {
            // Stands in for a remote directory: answers arrive on the next poll.
            let needle = query.to_lowercase();
            let found: Vec<MentionCandidate> = directory
                .iter()
                .filter(|user| user.display_name.to_lowercase().contains(&needle))
                .cloned()
                .collect();
            Lookup::deferred(futures::future::ready(Ok(found)))
        }))
        .build(FieldRef::selector(&page, "#body"))?;

    host.subscribe_changes(|markup| tracing::info!(%markup, "content changed"));
    tracing::info!(plugins = ?host.plugin_names(), "editor ready");

    host.set_caret(Caret::new(vec![0, 0], 6));
    host.type_text("@al");
    futures::executor::block_on(host.settle());

    let panel = host
        .panel()
        .ok_or_else(|| anyhow!("mention panel did not open"))?;
    tracing::info!(top = panel.top, left = panel.left, "mention panel");
    for (ix, item) in panel.items().iter().enumerate() {
        tracing::info!(ix, label = %item.label, avatar = ?item.avatar, "candidate");
    }

    host.press_key(Key::ArrowDown);
    host.press_key(Key::Enter);
    host.type_text("look at this");

    let caret = host
        .caret()
        .ok_or_else(|| anyhow!("caret lost after typing"))?;
    host.set_selection(Selection::new(
        Caret::new(caret.path.clone(), caret.offset - "this".len()),
        caret,
    ));
    let bold = host
        .toolbar()
        .find_by_tooltip("Bold")
        .ok_or_else(|| anyhow!("bold button missing"))?;
    host.click_toolbar(bold);

    println!("{}", field.value());
    Ok(())
}
