use play_editor_core::{Caret, Surface};
use play_editor_mentions::{MentionCandidate, Trigger, detect, splice_mention};

#[test]
fn query_runs_from_trigger_to_caret() {
    let surface = Surface::new("<p>ping @al</p>");
    let found = detect(&surface, &Caret::new(vec![0, 0], 8), "@").unwrap();
    assert_eq!(
        found,
        Trigger {
            node: vec![0, 0],
            offset: 5,
            query: "al".into(),
        }
    );
}

#[test]
fn text_after_the_caret_is_ignored() {
    let surface = Surface::new("@alice smith");
    let found = detect(&surface, &Caret::new(vec![0], 3), "@").unwrap();
    assert_eq!(found.query, "al");
}

#[test]
fn whitespace_after_trigger_ends_detection() {
    let surface = Surface::new("@al ice");
    assert_eq!(detect(&surface, &Caret::new(vec![0], 7), "@"), None);

    let surface = Surface::new("@al&nbsp;");
    assert_eq!(detect(&surface, &Caret::new(vec![0], 5), "@"), None);
}

#[test]
fn latest_trigger_before_caret_wins() {
    let surface = Surface::new("@bob and @ca");
    let found = detect(&surface, &Caret::new(vec![0], 12), "@").unwrap();
    assert_eq!(found.offset, 9);
    assert_eq!(found.query, "ca");
}

#[test]
fn empty_query_right_after_trigger() {
    let surface = Surface::new("hi @");
    let found = detect(&surface, &Caret::new(vec![0], 4), "@").unwrap();
    assert_eq!(found.query, "");
}

#[test]
fn multi_character_triggers() {
    let surface = Surface::new("cc ::ro");
    let found = detect(&surface, &Caret::new(vec![0], 7), "::").unwrap();
    assert_eq!((found.offset, found.query.as_str()), (3, "ro"));
    assert_eq!(detect(&surface, &Caret::new(vec![0], 7), ""), None);
}

#[test]
fn text_inside_existing_token_never_triggers() {
    let surface = Surface::new(
        r#"<span class="play-editor-mention" contenteditable="false" data-user-id="u1">@Alice</span>&nbsp;"#,
    );
    assert_eq!(detect(&surface, &Caret::new(vec![0, 0], 6), "@"), None);
}

#[test]
fn caret_outside_text_never_triggers() {
    let surface = Surface::new("<p>@al</p>");
    assert_eq!(detect(&surface, &Caret::new(vec![0], 1), "@"), None);
}

#[test]
fn splice_keeps_text_after_the_query() {
    let mut surface = Surface::new("<p>hey @al, welcome</p>");
    let caret = Caret::new(vec![0, 0], 7);
    let found = detect(&surface, &caret, "@").unwrap();

    let after = splice_mention(
        &mut surface,
        &found,
        &caret,
        &MentionCandidate::new("u1", "Alice"),
        "@",
    )
    .unwrap();

    assert_eq!(
        surface.markup(),
        r#"<p>hey <span class="play-editor-mention" contenteditable="false" data-user-id="u1">@Alice</span>&nbsp;, welcome</p>"#
    );
    assert_eq!(after, Caret::new(vec![0, 2], 2));
    assert_eq!(surface.caret(), Some(after));
}

#[test]
fn splice_refuses_when_trigger_moved() {
    let mut surface = Surface::new("plain text");
    let found = Trigger {
        node: vec![0],
        offset: 2,
        query: "a".into(),
    };
    let caret = Caret::new(vec![0], 4);
    let inserted = splice_mention(
        &mut surface,
        &found,
        &caret,
        &MentionCandidate::new("u1", "Alice"),
        "@",
    );
    assert_eq!(inserted, None);
    assert_eq!(surface.markup(), "plain text");
}
