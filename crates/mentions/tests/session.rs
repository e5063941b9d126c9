use play_editor_core::{
    Avatar, Caret, EditorHost, EventResult, FieldHandle, Key, MonospaceLayout, PointerTarget,
    Selection,
};
use play_editor_mentions::{
    CandidateSource, MENTIONS_PLUGIN, MentionCandidate, MentionsConfig, MentionsPlugin,
};

const TOKEN: &str = r#"<span class="play-editor-mention" contenteditable="false" data-user-id="u1">@Alice</span>"#;

fn users() -> Vec<MentionCandidate> {
    vec![
        MentionCandidate::new("u1", "Alice"),
        MentionCandidate::new("u2", "Alan Turing").with_avatar("https://img/alan.png"),
        MentionCandidate::new("u3", "Malak"),
        MentionCandidate::new("u4", "Bob"),
    ]
}

fn editor(content: &str) -> (EditorHost, FieldHandle) {
    let field = FieldHandle::textarea(content);
    let host = EditorHost::builder()
        .layout(MonospaceLayout::default())
        .plugin(MentionsPlugin::with_users(users()))
        .build(field.clone())
        .unwrap();
    (host, field)
}

fn labels(host: &EditorHost) -> Vec<String> {
    host.panel()
        .map(|panel| panel.items().iter().map(|item| item.label.clone()).collect())
        .unwrap_or_default()
}

#[test]
fn typing_trigger_and_query_opens_filtered_panel() {
    let (mut host, _) = editor("hi ");
    host.move_caret_to_end();
    host.type_text("@al");

    let panel = host.panel().unwrap();
    assert_eq!(panel.owner, MENTIONS_PLUGIN);
    assert_eq!(labels(&host), vec!["Alice", "Alan Turing", "Malak"]);
    assert_eq!(panel.active_index(), 0);
    assert_eq!(panel.items()[0].avatar, Avatar::Initials("A".into()));
    assert_eq!(
        panel.items()[1].avatar,
        Avatar::Image("https://img/alan.png".into())
    );
}

#[test]
fn enter_accepts_active_candidate() {
    let (mut host, field) = editor("hi ");
    host.move_caret_to_end();
    host.type_text("@al");

    assert_eq!(host.press_key(Key::Enter), EventResult::Consumed);
    let expected = format!("hi {TOKEN}&nbsp;");
    assert_eq!(host.content(), expected);
    assert_eq!(field.value(), expected);
    assert_eq!(host.caret(), Some(Caret::new(vec![2], 2)));
    assert!(host.panel().is_none());

    host.type_text("ok");
    assert_eq!(field.value(), format!("hi {TOKEN}&nbsp;ok"));
    assert!(host.panel().is_none());
}

#[test]
fn tab_accepts_instead_of_inserting_glyph() {
    let (mut host, field) = editor("");
    host.move_caret_to_end();
    host.type_text("@ali");

    assert_eq!(host.press_key(Key::Tab), EventResult::Consumed);
    assert_eq!(field.value(), format!("{TOKEN}&nbsp;"));
}

#[test]
fn arrows_wrap_around_the_list() {
    let (mut host, _) = editor("");
    host.move_caret_to_end();
    host.type_text("@al");
    assert_eq!(labels(&host).len(), 3);

    assert_eq!(host.press_key(Key::ArrowUp), EventResult::Consumed);
    assert_eq!(host.panel().unwrap().active_index(), 2);
    host.press_key(Key::ArrowDown);
    assert_eq!(host.panel().unwrap().active_index(), 0);
    host.press_key(Key::ArrowDown);
    host.press_key(Key::Enter);

    assert!(host.content().contains(r#"data-user-id="u2">@Alan Turing</span>"#));
}

#[test]
fn arrows_pass_through_without_panel() {
    let (mut host, _) = editor("plain");
    host.move_caret_to_end();
    assert_eq!(host.press_key(Key::ArrowDown), EventResult::Ignored);
    assert_eq!(host.press_key(Key::Enter), EventResult::Ignored);
}

#[test]
fn clicking_an_item_accepts_it() {
    let (mut host, field) = editor("hi ");
    host.move_caret_to_end();
    host.type_text("@al");

    assert_eq!(
        host.pointer_down(PointerTarget::Panel { item: 2 }),
        EventResult::Consumed
    );
    assert!(field.value().contains(r#"data-user-id="u3">@Malak</span>"#));
    assert!(host.panel().is_none());
}

#[test]
fn escape_cancels_and_leaves_text_untouched() {
    let (mut host, field) = editor("hi ");
    host.move_caret_to_end();
    host.type_text("@al");

    assert_eq!(host.press_key(Key::Escape), EventResult::Consumed);
    assert!(host.panel().is_none());
    assert_eq!(field.value(), "hi @al");
    assert_eq!(host.press_key(Key::ArrowDown), EventResult::Ignored);

    host.set_caret(Caret::new(vec![0], 6));
    assert!(host.panel().is_none());

    host.type_text("i");
    assert_eq!(labels(&host), vec!["Alice"]);
}

#[test]
fn outside_click_and_blur_cancel() {
    let (mut host, field) = editor("");
    host.move_caret_to_end();
    host.type_text("@al");
    host.pointer_down(PointerTarget::Outside);
    assert!(host.panel().is_none());
    assert_eq!(field.value(), "@al");

    host.type_text("i");
    assert!(host.panel().is_some());
    host.blur();
    assert!(host.panel().is_none());
    assert_eq!(field.value(), "@ali");
}

#[test]
fn whitespace_or_caret_leaving_closes_panel() {
    let (mut host, _) = editor("start ");
    host.move_caret_to_end();
    host.type_text("@al");
    host.type_text(" ");
    assert!(host.panel().is_none());

    host.type_text("@b");
    assert_eq!(labels(&host), vec!["Bob"]);
    host.set_caret(Caret::new(vec![0], 2));
    assert!(host.panel().is_none());
}

#[test]
fn empty_results_remove_existing_panel() {
    let (mut host, _) = editor("");
    host.move_caret_to_end();
    host.type_text("@a");
    assert!(host.panel().is_some());

    host.type_text("zz");
    assert!(host.panel().is_none());

    host.set_selection(Selection::new(Caret::new(vec![0], 2), Caret::new(vec![0], 4)));
    host.type_text("");
    assert_eq!(host.content(), "@a");
    assert_eq!(labels(&host), vec!["Alice", "Alan Turing", "Malak"]);
}

#[test]
fn panel_sits_below_the_caret() {
    let (mut host, _) = editor("<p>hi </p>");
    host.set_caret(Caret::new(vec![0, 0], 3));
    host.type_text("@al");

    let panel = host.panel().unwrap();
    assert_eq!((panel.top, panel.left), (24.0, 48.0));
    assert_eq!(host.content(), "<p>hi @al</p>");
}

#[test]
fn panel_position_accounts_for_scroll_and_lines() {
    let (mut host, _) = editor("<p>one</p><p>two @</p>");
    host.context_mut().set_layout(MonospaceLayout {
        scroll_top: 10.0,
        ..MonospaceLayout::default()
    });
    host.set_caret(Caret::new(vec![1, 0], 5));

    let panel = host.panel().unwrap();
    assert_eq!((panel.top, panel.left), (44.0, 40.0));
    assert_eq!(host.content(), "<p>one</p><p>two @</p>");
}

#[test]
fn toolbar_button_inserts_trigger_and_opens_panel() {
    let (mut host, field) = editor("hi ");
    host.move_caret_to_end();
    let button = host.toolbar().find_by_tooltip("Mention (@)").unwrap();

    host.click_toolbar(button);
    assert_eq!(field.value(), "hi @");
    assert_eq!(labels(&host).len(), 4);
}

#[test]
fn list_is_capped_at_max_items() {
    let many = (0..12)
        .map(|i| MentionCandidate::new(format!("u{i}"), format!("User {i}")))
        .collect();
    let mut host = EditorHost::builder()
        .plugin(MentionsPlugin::with_users(many))
        .build(FieldHandle::textarea(""))
        .unwrap();
    host.move_caret_to_end();
    host.type_text("@user");
    assert_eq!(labels(&host).len(), 8);

    let small = MentionsPlugin::new(MentionsConfig {
        max_items: 2,
        ..MentionsConfig::default()
    })
    .with_source(CandidateSource::Static(users()));
    let mut host = EditorHost::builder()
        .plugin(small)
        .build(FieldHandle::textarea(""))
        .unwrap();
    host.move_caret_to_end();
    host.type_text("@");
    assert_eq!(labels(&host), vec!["Alice", "Alan Turing"]);
}

#[test]
fn custom_trigger_is_used_for_detection_and_token() {
    let config = MentionsConfig {
        trigger: "#".into(),
        users: vec![MentionCandidate::new("t1", "Team")],
        ..MentionsConfig::default()
    };
    let field = FieldHandle::textarea("");
    let mut host = EditorHost::builder()
        .plugin(MentionsPlugin::new(config))
        .build(field.clone())
        .unwrap();
    host.move_caret_to_end();
    host.type_text("@te");
    assert!(host.panel().is_none());

    host.type_text(" #te");
    host.press_key(Key::Enter);
    assert_eq!(
        field.value(),
        r#"@te <span class="play-editor-mention" contenteditable="false" data-user-id="t1">#Team</span>&nbsp;"#
    );
}

#[test]
fn accepted_token_cannot_be_typed_into() {
    let (mut host, field) = editor("hi ");
    host.move_caret_to_end();
    host.type_text("@al");
    host.press_key(Key::Enter);
    let accepted = format!("hi {TOKEN}&nbsp;");
    assert_eq!(field.value(), accepted);

    host.set_caret(Caret::new(vec![1, 0], 3));
    host.press_key(Key::Tab);
    assert_eq!(field.value(), accepted);

    let button = host.toolbar().find_by_tooltip("Mention (@)").unwrap();
    host.set_caret(Caret::new(vec![1, 0], 3));
    host.click_toolbar(button);
    assert_eq!(field.value(), accepted);
    assert!(host.panel().is_none());

    host.set_caret(Caret::new(vec![1, 0], 3));
    host.type_text("x");
    assert_eq!(field.value(), accepted);
}
