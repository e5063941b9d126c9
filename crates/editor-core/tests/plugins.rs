use std::cell::{Cell, RefCell};
use std::rc::Rc;

use play_editor_core::{
    EditorContext, EditorError, EditorHost, EventResult, FieldHandle, Plugin, PluginError,
    SurfaceEvent, ToolbarItem,
};

struct Recorder {
    name: &'static str,
    inits: Rc<Cell<usize>>,
    log: Rc<RefCell<Vec<String>>>,
    consume: bool,
    fail: bool,
}

impl Recorder {
    fn new(name: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Self {
        Self {
            name,
            inits: Rc::new(Cell::new(0)),
            log: log.clone(),
            consume: false,
            fail: false,
        }
    }
}

impl Plugin for Recorder {
    fn name(&self) -> &str {
        self.name
    }

    fn initialize(&mut self, cx: &mut EditorContext) -> Result<(), PluginError> {
        self.inits.set(self.inits.get() + 1);
        if self.fail {
            return Err(PluginError::new("boom"));
        }
        let log = self.log.clone();
        let name = self.name;
        cx.add_toolbar_button("", self.name, move |_| log.borrow_mut().push(format!("{name}:click")));
        cx.add_toolbar_divider();
        Ok(())
    }

    fn handle_event(&mut self, _cx: &mut EditorContext, event: &SurfaceEvent) -> EventResult {
        if matches!(event, SurfaceEvent::SelectionChange) {
            self.log.borrow_mut().push(self.name.to_string());
            if self.consume {
                return EventResult::Consumed;
            }
        }
        EventResult::Ignored
    }
}

#[test]
fn plugins_initialize_in_declared_order() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let host = EditorHost::new(
        FieldHandle::textarea(""),
        vec![
            Box::new(Recorder::new("first", &log)),
            Box::new(Recorder::new("second", &log)),
        ],
    )
    .unwrap();

    assert_eq!(host.plugin_names(), vec!["first", "second"]);
    assert!(host.plugin("second").is_some());
    assert!(host.plugin("third").is_none());

    let tooltips: Vec<_> = host.toolbar().buttons().map(|b| b.tooltip.as_str()).collect();
    assert_eq!(tooltips, vec!["first", "second"]);
    assert!(matches!(host.toolbar().items()[1], ToolbarItem::Divider));
}

#[test]
fn duplicate_name_fails_before_second_initialize() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let first = Recorder::new("dup", &log);
    let second = Recorder::new("dup", &log);
    let second_inits = second.inits.clone();

    let result = EditorHost::new(
        FieldHandle::textarea(""),
        vec![Box::new(first), Box::new(second)],
    );
    let Err(EditorError::DuplicatePlugin(name)) = result else {
        panic!("expected duplicate plugin error");
    };
    assert_eq!(name, "dup");
    assert_eq!(second_inits.get(), 0);
}

#[test]
fn failing_initialize_aborts_remaining_registrations() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let field = FieldHandle::textarea("");
    let mut broken = Recorder::new("broken", &log);
    broken.fail = true;
    let after = Recorder::new("after", &log);
    let after_inits = after.inits.clone();

    let result = EditorHost::new(field.clone(), vec![Box::new(broken), Box::new(after)]);
    let Err(EditorError::Plugin { name, source }) = result else {
        panic!("expected plugin error");
    };
    assert_eq!(name, "broken");
    assert_eq!(source.message(), "boom");
    assert_eq!(after_inits.get(), 0);
    assert!(!field.is_hidden());
}

#[test]
fn dispatch_stops_at_first_consumer() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut middle = Recorder::new("middle", &log);
    middle.consume = true;
    let mut host = EditorHost::new(
        FieldHandle::textarea(""),
        vec![
            Box::new(Recorder::new("head", &log)),
            Box::new(middle),
            Box::new(Recorder::new("tail", &log)),
        ],
    )
    .unwrap();

    let result = host.dispatch(SurfaceEvent::SelectionChange);
    assert_eq!(result, EventResult::Consumed);
    assert_eq!(*log.borrow(), vec!["head".to_string(), "middle".to_string()]);
}

#[test]
fn toolbar_clicks_reach_their_handler() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut host = EditorHost::new(
        FieldHandle::textarea(""),
        vec![Box::new(Recorder::new("only", &log))],
    )
    .unwrap();

    let id = host.toolbar().find_by_tooltip("only").unwrap();
    host.click_toolbar(id);
    assert_eq!(*log.borrow(), vec!["only:click".to_string()]);

    assert!(host.context_mut().set_button_active(id, true));
    assert!(host.toolbar().button(id).unwrap().active);
}

#[test]
fn set_content_reports_a_selection_change() {
    let log = Rc::new(RefCell::new(Vec::new()));
    let mut host = EditorHost::new(
        FieldHandle::textarea("<p>old</p>"),
        vec![Box::new(Recorder::new("watcher", &log))],
    )
    .unwrap();

    host.set_content("<p>new</p>");
    assert_eq!(*log.borrow(), vec!["watcher".to_string()]);
    assert_eq!(host.caret(), None);
}
