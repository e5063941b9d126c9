use std::task::{Context, Poll};

use play_editor_core::{
    Avatar, Command, EditorContext, EventResult, FloatingPanel, Key, PanelItem, Plugin,
    PluginError, PointerTarget, SurfaceEvent, icons,
};

use crate::candidate::{CandidateSource, Lookup, MentionCandidate};
use crate::config::MentionsConfig;
use crate::resolver::{Resolution, Resolver};
use crate::session::{MentionPhase, Session, Trigger, detect};
use crate::splice::splice_mention;

pub const MENTIONS_PLUGIN: &str = "mentions";

/// Autocompletes `@name` mentions from a static list or a lookup function.
pub struct MentionsPlugin {
    config: MentionsConfig,
    source: CandidateSource,
    resolver: Resolver,
    session: Option<Session>,
    /// Trigger whose panel was closed with Escape; caret moves inside it do
    /// not reopen the session until new input arrives.
    dismissed: Option<Trigger>,
}

impl Default for MentionsPlugin {
    fn default() -> Self {
        Self::new(MentionsConfig::default())
    }
}

impl MentionsPlugin {
    pub fn new(config: MentionsConfig) -> Self {
        let config = config.with_defaults();
        let source = CandidateSource::Static(config.users.clone());
        Self {
            config,
            source,
            resolver: Resolver::new(),
            session: None,
            dismissed: None,
        }
    }

    pub fn with_users(users: Vec<MentionCandidate>) -> Self {
        Self::new(MentionsConfig {
            users,
            ..MentionsConfig::default()
        })
    }

    pub fn with_source(mut self, source: CandidateSource) -> Self {
        self.source = source;
        self
    }

    pub fn with_lookup(self, lookup: impl Fn(&str) -> Lookup + 'static) -> Self {
        self.with_source(CandidateSource::from_fn(lookup))
    }

    pub fn config(&self) -> &MentionsConfig {
        &self.config
    }

    pub fn phase(&self) -> MentionPhase {
        self.session
            .as_ref()
            .map_or(MentionPhase::Idle, Session::phase)
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    fn owns_panel(cx: &EditorContext) -> bool {
        cx.panel().is_some_and(|panel| panel.owner == MENTIONS_PLUGIN)
    }

    /// Re-runs detection at the current caret.
    fn refresh(&mut self, cx: &mut EditorContext) {
        let Some(caret) = cx.caret() else {
            self.close(cx);
            return;
        };
        let Some(found) = detect(cx.surface(), &caret, &self.config.trigger) else {
            self.close(cx);
            return;
        };
        if self
            .dismissed
            .as_ref()
            .is_some_and(|dismissed| dismissed.same_run(&found))
        {
            return;
        }
        self.dismissed = None;

        if let Some(session) = self.session.as_mut() {
            if session.trigger == found {
                session.caret = caret;
                return;
            }
        }

        let same_run = self
            .session
            .as_ref()
            .is_some_and(|session| session.trigger.same_run(&found));
        let mut session = Session::new(found, caret);
        match self.session.take() {
            Some(previous) if same_run => session.candidates = previous.candidates,
            _ => {
                cx.close_panel(MENTIONS_PLUGIN);
            }
        }

        let lookup = self.source.lookup(&session.trigger.query);
        match self.resolver.issue(lookup) {
            Resolution::Ready(candidates) => {
                self.session = Some(session);
                self.apply(cx, candidates);
            }
            Resolution::Pending(ticket) => {
                tracing::trace!(ticket, query = %session.trigger.query, "waiting for candidates");
                session.pending = Some(ticket);
                self.session = Some(session);
            }
        }
    }

    fn apply(&mut self, cx: &mut EditorContext, mut candidates: Vec<MentionCandidate>) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        session.pending = None;
        candidates.truncate(self.config.max_items);
        if candidates.is_empty() {
            session.candidates.clear();
            cx.close_panel(MENTIONS_PLUGIN);
            tracing::trace!(query = %session.trigger.query, "no candidates");
            return;
        }

        let Some(coords) = cx.measure_caret(&session.caret) else {
            tracing::debug!(caret = ?session.caret, "caret could not be measured");
            session.candidates.clear();
            cx.close_panel(MENTIONS_PLUGIN);
            return;
        };
        let items = candidates.iter().map(panel_item).collect();
        session.candidates = candidates;
        cx.open_panel(FloatingPanel::new(
            MENTIONS_PLUGIN,
            coords.top + self.config.panel_offset,
            coords.left,
            items,
        ));
        tracing::trace!(
            phase = ?session.phase(),
            count = session.candidates.len(),
            "candidates shown"
        );
    }

    fn accept(&mut self, cx: &mut EditorContext, index: usize) {
        let Some(session) = self.session.take() else {
            return;
        };
        self.resolver.invalidate();
        cx.close_panel(MENTIONS_PLUGIN);
        let Some(candidate) = session.candidates.get(index) else {
            return;
        };
        let inserted = splice_mention(
            cx.surface_mut(),
            &session.trigger,
            &session.caret,
            candidate,
            &self.config.trigger,
        );
        match inserted {
            Some(_) => {
                tracing::debug!(id = %candidate.id, "mention inserted");
                cx.sync();
            }
            None => tracing::warn!(id = %candidate.id, "trigger text changed before insertion"),
        }
    }

    fn dismiss(&mut self, cx: &mut EditorContext) {
        self.dismissed = self.session.as_ref().map(|session| session.trigger.clone());
        self.close(cx);
    }

    fn close(&mut self, cx: &mut EditorContext) {
        if self.session.take().is_some() {
            self.resolver.invalidate();
            tracing::trace!("mention session closed");
        }
        cx.close_panel(MENTIONS_PLUGIN);
    }

    fn handle_key(&mut self, cx: &mut EditorContext, key: &Key) -> EventResult {
        if !Self::owns_panel(cx) {
            if *key == Key::Escape && self.session.is_some() {
                self.dismiss(cx);
            }
            return EventResult::Ignored;
        }
        match key {
            Key::ArrowDown => {
                if let Some(panel) = cx.panel_mut(MENTIONS_PLUGIN) {
                    panel.select_next();
                }
            }
            Key::ArrowUp => {
                if let Some(panel) = cx.panel_mut(MENTIONS_PLUGIN) {
                    panel.select_previous();
                }
            }
            Key::Enter | Key::Tab => {
                let index = cx.panel().map_or(0, |panel| panel.active_index());
                self.accept(cx, index);
            }
            Key::Escape => self.dismiss(cx),
            _ => return EventResult::Ignored,
        }
        EventResult::Consumed
    }
}

fn panel_item(candidate: &MentionCandidate) -> PanelItem {
    let avatar = match &candidate.avatar_url {
        Some(url) => Avatar::Image(url.clone()),
        None => Avatar::Initials(candidate.initials()),
    };
    PanelItem {
        key: candidate.id.clone(),
        label: candidate.display_name.clone(),
        avatar,
    }
}

impl Plugin for MentionsPlugin {
    fn name(&self) -> &str {
        MENTIONS_PLUGIN
    }

    fn initialize(&mut self, cx: &mut EditorContext) -> Result<(), PluginError> {
        cx.add_toolbar_divider();
        let trigger = self.config.trigger.clone();
        cx.add_toolbar_button(
            icons::at_sign(),
            format!("Mention ({trigger})"),
            move |cx| {
                cx.focus();
                cx.exec(Command::InsertText(trigger.clone()));
                cx.emit(SurfaceEvent::Input);
            },
        );
        Ok(())
    }

    fn handle_event(&mut self, cx: &mut EditorContext, event: &SurfaceEvent) -> EventResult {
        match event {
            SurfaceEvent::Input => {
                self.dismissed = None;
                self.refresh(cx);
                EventResult::Ignored
            }
            SurfaceEvent::SelectionChange => {
                self.refresh(cx);
                EventResult::Ignored
            }
            SurfaceEvent::KeyDown(key) => self.handle_key(cx, key),
            SurfaceEvent::PointerDown(PointerTarget::Panel { item }) => {
                if !Self::owns_panel(cx) {
                    return EventResult::Ignored;
                }
                self.accept(cx, *item);
                EventResult::Consumed
            }
            SurfaceEvent::PointerDown(_) | SurfaceEvent::Blur => {
                self.close(cx);
                EventResult::Ignored
            }
            SurfaceEvent::PanelDismissed { owner } if owner == MENTIONS_PLUGIN => {
                self.close(cx);
                EventResult::Ignored
            }
            _ => EventResult::Ignored,
        }
    }

    fn poll_tasks(&mut self, cx: &mut EditorContext, task_cx: &mut Context<'_>) -> Poll<()> {
        loop {
            match self.resolver.poll_current(task_cx) {
                Poll::Ready(Some(Ok(candidates))) => self.apply(cx, candidates),
                Poll::Ready(Some(Err(err))) => {
                    tracing::warn!(%err, "mention lookup failed; showing no candidates");
                    self.apply(cx, Vec::new());
                }
                Poll::Ready(None) => return Poll::Ready(()),
                Poll::Pending => return Poll::Pending,
            }
        }
    }
}
