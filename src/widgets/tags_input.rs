//! Tag editor widget.
//!
//! Turns a host text field into a chip editor: typed or pasted values are
//! normalized, validated and appended as tags, the host field mirrors the
//! serialized collection, and a dropdown offers matches from a static list.
//!
//! Ordering per mutation: store change, render hook, host sync, then events.

use std::fmt;
use std::time::Duration;

use crate::config::EnvConfig;
use crate::core::component::{Component, Focusable};
use crate::core::deferred::DeferredQueue;
use crate::core::input_event::InputEvent;
use crate::core::keybindings::{TagsAction, TagsKeybindings};
use crate::core::text::utils::{
    grapheme_segments, is_punctuation_char, is_whitespace_char, truncate_to_width,
};
use crate::core::text::width::visible_width;
use crate::error::TagsInputError;
use crate::host::{ElementKind, HostDocument, HostInput, NullRenderer, RemovalToken, Renderer};
use crate::logging::{EventLogger, LOG_TARGET};
use crate::tags::events::{EventEmitter, SubscriptionId, TagEvent, TagEventKind};
use crate::tags::options::TagsInputOptions;
use crate::tags::store::{AddOutcome, TagStore};
use crate::tags::suggest::{highlight, match_suggestions, SuggestionView};

/// Grace period between blur and hiding the dropdown, so a pointer selection on a
/// suggestion is still delivered first.
pub const BLUR_HIDE_DELAY: Duration = Duration::from_millis(150);
pub const INVALID_FLASH_DURATION: Duration = Duration::from_millis(400);
pub const REMOVE_ANIMATION_DURATION: Duration = Duration::from_millis(160);

const CURSOR_ON: &str = "\x1b[7m";
const CURSOR_OFF: &str = "\x1b[27m";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Deferred {
    HideSuggestions,
    ClearInvalid,
    Detach(RemovalToken),
}

type StyleFn = Box<dyn Fn(&str) -> String>;

pub struct TagsInputTheme {
    pub chip: StyleFn,
    pub remove_mark: StyleFn,
    pub placeholder: StyleFn,
    /// Applied to the chip lines while the rejection flash is active.
    pub invalid: StyleFn,
    pub disabled: StyleFn,
    pub suggestion: StyleFn,
    pub suggestion_active: StyleFn,
    pub highlight: StyleFn,
}

impl TagsInputTheme {
    pub fn plain() -> Self {
        fn identity() -> StyleFn {
            Box::new(|text| text.to_string())
        }
        Self {
            chip: identity(),
            remove_mark: identity(),
            placeholder: identity(),
            invalid: identity(),
            disabled: identity(),
            suggestion: identity(),
            suggestion_active: identity(),
            highlight: identity(),
        }
    }
}

impl Default for TagsInputTheme {
    fn default() -> Self {
        Self::plain()
    }
}

/// Chip editor bound to one host field.
pub struct TagsInput {
    host: Box<dyn HostInput>,
    options: TagsInputOptions,
    keybindings: TagsKeybindings,
    store: TagStore,
    initial_tags: Vec<String>,
    emitter: EventEmitter,
    renderer: Box<dyn Renderer>,
    theme: TagsInputTheme,
    suggestions: SuggestionView,
    timers: DeferredQueue<Deferred>,
    buffer: String,
    cursor: usize,
    placeholder: String,
    focused: bool,
    readonly: bool,
    disabled: bool,
    invalid: bool,
    next_removal: u64,
    destroyed: bool,
}

impl TagsInput {
    pub fn attach(
        host: Box<dyn HostInput>,
        options: TagsInputOptions,
    ) -> Result<Self, TagsInputError> {
        Self::attach_with_renderer(host, options, Box::new(NullRenderer))
    }

    /// Resolves `selector` through `document` and attaches to the field it names.
    pub fn attach_selector(
        document: &mut dyn HostDocument,
        selector: &str,
        options: TagsInputOptions,
    ) -> Result<Self, TagsInputError> {
        let host = document
            .query_selector(selector)
            .ok_or_else(|| TagsInputError::MissingTarget {
                selector: selector.to_string(),
            })?;
        Self::attach(host, options)
    }

    /// Hides the host field, then populates the initial tags through `add`, so they
    /// are validated like typed input. Modes from `options` apply afterwards.
    pub fn attach_with_renderer(
        mut host: Box<dyn HostInput>,
        options: TagsInputOptions,
        renderer: Box<dyn Renderer>,
    ) -> Result<Self, TagsInputError> {
        let kind = host.kind();
        if kind != ElementKind::TextInput {
            return Err(TagsInputError::NotAnInput { found: kind });
        }

        let placeholder = options
            .placeholder
            .clone()
            .or_else(|| host.placeholder())
            .unwrap_or_default();
        host.set_hidden(true);

        let logger = EventLogger::from_config(&EnvConfig::from_env());
        let initial_tags = options.initial_tags.clone();
        let (readonly, disabled) = (options.readonly, options.disabled);

        let mut input = Self {
            host,
            keybindings: TagsKeybindings::new(&options.keybindings),
            options,
            store: TagStore::new(),
            initial_tags,
            emitter: EventEmitter::new(logger),
            renderer,
            theme: TagsInputTheme::plain(),
            suggestions: SuggestionView::default(),
            timers: DeferredQueue::new(),
            buffer: String::new(),
            cursor: 0,
            placeholder,
            focused: false,
            readonly: false,
            disabled: false,
            invalid: false,
            next_removal: 0,
            destroyed: false,
        };
        input.sync_host();

        for tag in input.initial_tags.clone() {
            if !input.add(&tag) {
                log::debug!(target: LOG_TARGET, "initial tag {tag:?} was not added");
            }
        }

        if readonly {
            input.set_readonly(true);
        }
        if disabled {
            input.set_disabled(true);
        }
        Ok(input)
    }

    pub fn with_theme(mut self, theme: TagsInputTheme) -> Self {
        self.theme = theme;
        self
    }

    /// Normalizes, validates and appends a tag.
    ///
    /// Rejections emit `max` (capacity) or `invalid` and start the rejection flash;
    /// values that normalize to nothing are ignored silently.
    pub fn add(&mut self, value: &str) -> bool {
        if self.destroyed || self.readonly || self.disabled {
            return false;
        }

        match self.store.try_add(value, &self.options) {
            AddOutcome::Empty => false,
            AddOutcome::Rejected { value, reason } => {
                log::debug!(target: LOG_TARGET, "rejected {value:?}: {reason}");
                self.flash_invalid();
                self.emit(reason.event_kind(), Some(value));
                false
            }
            AddOutcome::Added(value) => {
                let index = self.store.len() - 1;
                self.renderer.tag_added(index, &value);
                self.sync_host();
                self.emit(TagEventKind::Add, Some(value));
                self.emit(TagEventKind::Change, None);
                true
            }
        }
    }

    /// Removes the first tag exactly equal to `value`.
    pub fn remove(&mut self, value: &str) -> bool {
        match self.store.position(value) {
            Some(index) => self.remove_at(index),
            None => false,
        }
    }

    pub fn remove_at(&mut self, index: usize) -> bool {
        if self.destroyed || self.readonly || self.disabled {
            return false;
        }
        let Some(value) = self.store.remove_at(index) else {
            return false;
        };

        let token = RemovalToken(self.next_removal);
        self.next_removal += 1;
        self.renderer.tag_removing(index, token);
        self.timers
            .schedule(REMOVE_ANIMATION_DURATION, Deferred::Detach(token));

        self.sync_host();
        self.emit(TagEventKind::Remove, Some(value));
        self.emit(TagEventKind::Change, None);
        true
    }

    /// Empties the collection. Emits `clear` and `change` even when already empty.
    pub fn clear(&mut self) {
        if self.destroyed {
            return;
        }
        self.store.clear();
        self.renderer.tags_cleared();
        self.sync_host();
        self.emit(TagEventKind::Clear, None);
        self.emit(TagEventKind::Change, None);
    }

    /// Replaces every tag, running each value through `add`. Per-item events are
    /// suppressed; a single `change` follows the whole batch.
    pub fn fill<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        if self.destroyed {
            return;
        }
        {
            let _silence = self.emitter.silence();
            self.clear();
            for value in values {
                self.add(value.as_ref());
            }
        }
        self.emit(TagEventKind::Change, None);
    }

    pub fn replace<I, S>(&mut self, values: I)
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        self.fill(values);
    }

    /// Restores the tags given at construction (re-validated).
    pub fn reset(&mut self) {
        let initial = self.initial_tags.clone();
        self.fill(initial);
    }

    pub fn tags(&self) -> Vec<String> {
        self.store.to_vec()
    }

    pub fn has(&self, value: &str) -> bool {
        self.store.has(value)
    }

    pub fn count(&self) -> usize {
        self.store.len()
    }

    /// The value mirrored onto the host field.
    pub fn serialized_value(&self) -> String {
        self.store.serialize()
    }

    pub fn buffer(&self) -> &str {
        &self.buffer
    }

    pub fn suggestions(&self) -> &SuggestionView {
        &self.suggestions
    }

    pub fn is_readonly(&self) -> bool {
        self.readonly
    }

    pub fn is_disabled(&self) -> bool {
        self.disabled
    }

    pub fn is_destroyed(&self) -> bool {
        self.destroyed
    }

    /// Whether the rejection flash is currently showing.
    pub fn is_flashing_invalid(&self) -> bool {
        self.invalid
    }

    pub fn focus(&mut self) {
        if self.destroyed {
            return;
        }
        self.focused = true;
        self.renderer.focus_requested();
    }

    /// Loses focus; the dropdown hides once [`BLUR_HIDE_DELAY`] has elapsed.
    pub fn blur(&mut self) {
        if self.destroyed {
            return;
        }
        self.focused = false;
        self.timers
            .schedule(BLUR_HIDE_DELAY, Deferred::HideSuggestions);
    }

    pub fn set_readonly(&mut self, readonly: bool) {
        if self.destroyed {
            return;
        }
        self.readonly = readonly;
        if readonly {
            self.hide_suggestions();
        }
        self.renderer.mode_changed(self.readonly, self.disabled);
    }

    pub fn set_disabled(&mut self, disabled: bool) {
        if self.destroyed {
            return;
        }
        self.disabled = disabled;
        if disabled {
            self.hide_suggestions();
        }
        self.renderer.mode_changed(self.readonly, self.disabled);
    }

    pub fn subscribe<F>(&mut self, kind: TagEventKind, handler: F) -> SubscriptionId
    where
        F: FnMut(&TagEvent) + 'static,
    {
        self.emitter.subscribe(kind, Box::new(handler))
    }

    pub fn unsubscribe(&mut self, kind: TagEventKind, id: SubscriptionId) -> bool {
        self.emitter.unsubscribe(kind, id)
    }

    /// Pointer selection of the suggestion at `index`.
    pub fn select_suggestion(&mut self, index: usize) -> bool {
        let Some(value) = self.suggestions.items().get(index).cloned() else {
            return false;
        };
        let added = self.add(&value);
        self.set_buffer(String::new());
        self.hide_suggestions();
        added
    }

    /// Advances the editor clock and runs deferred work that became due.
    pub fn tick(&mut self, elapsed: Duration) {
        if self.destroyed {
            return;
        }
        for action in self.timers.advance(elapsed) {
            match action {
                Deferred::HideSuggestions => self.hide_suggestions(),
                Deferred::ClearInvalid => {
                    self.invalid = false;
                    self.renderer.invalid_changed(false);
                }
                Deferred::Detach(token) => self.renderer.tag_detached(token),
            }
        }
    }

    /// Restores the host field and drops listeners and pending timers.
    /// Later calls, including this one, are no-ops.
    pub fn destroy(&mut self) {
        if self.destroyed {
            return;
        }
        self.destroyed = true;
        self.host.set_hidden(false);
        self.renderer.teardown();
        self.emitter.clear_listeners();
        self.timers.clear();
        self.suggestions.clear();
        self.focused = false;
    }

    fn emit(&mut self, kind: TagEventKind, value: Option<String>) {
        let event = TagEvent::new(kind, value, self.store.to_vec());
        self.emitter.emit(event);
    }

    fn sync_host(&mut self) {
        let serialized = self.store.serialize();
        self.host.set_value(&serialized);
    }

    fn flash_invalid(&mut self) {
        self.invalid = true;
        self.renderer.invalid_changed(true);
        self.timers
            .schedule(INVALID_FLASH_DURATION, Deferred::ClearInvalid);
    }

    fn refresh_suggestions(&mut self) {
        let items = match_suggestions(
            &self.buffer,
            self.store.as_slice(),
            &self.options.suggestions,
            self.options.suggestions_limit,
            self.options.case_sensitive,
        );
        if items.is_empty() {
            self.hide_suggestions();
            return;
        }
        self.suggestions = SuggestionView::new(items);
        self.renderer.suggestions_shown(&self.suggestions);
    }

    fn hide_suggestions(&mut self) {
        if !self.suggestions.is_visible() {
            return;
        }
        self.suggestions.clear();
        self.renderer.suggestions_hidden();
    }

    fn move_suggestion(&mut self, delta: isize) {
        if !self.suggestions.is_visible() {
            return;
        }
        self.suggestions.move_active(delta);
        self.renderer.suggestions_shown(&self.suggestions);
    }

    /// Separator typed: the raw buffer is committed even if a suggestion is highlighted.
    fn commit_buffer(&mut self) {
        let value = std::mem::take(&mut self.buffer);
        self.cursor = 0;
        self.add(&value);
        self.hide_suggestions();
    }

    /// Commit key: the highlighted suggestion wins over the buffer.
    fn commit(&mut self) {
        let value = match self.suggestions.active_item() {
            Some(item) => item.to_string(),
            None => self.buffer.clone(),
        };
        self.add(&value);
        self.set_buffer(String::new());
        self.hide_suggestions();
    }

    /// Runs after every edit of the buffer: commits separated segments, or refreshes
    /// the dropdown when there are none.
    fn buffer_changed(&mut self) {
        if !self.split_on_separators() {
            self.refresh_suggestions();
        }
    }

    fn split_on_separators(&mut self) -> bool {
        let separators = self.options.separators.clone();
        if !self.buffer.chars().any(|ch| separators.contains(&ch)) {
            return false;
        }

        let buffer = std::mem::take(&mut self.buffer);
        let mut parts: Vec<&str> = buffer.split(|ch: char| separators.contains(&ch)).collect();
        let remainder = parts.pop().unwrap_or_default().to_string();
        for part in parts {
            self.add(part);
        }
        self.set_buffer(remainder);
        self.hide_suggestions();
        true
    }

    fn set_buffer(&mut self, value: String) {
        self.buffer = value;
        self.cursor = self.buffer.len();
    }

    fn single_separator(&self, text: &str) -> bool {
        let mut chars = text.chars();
        match (chars.next(), chars.next()) {
            (Some(ch), None) => self.options.is_separator(ch),
            _ => false,
        }
    }

    fn insert_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        self.buffer.insert_str(self.cursor, text);
        self.cursor += text.len();
    }

    fn grapheme_before_cursor(&self) -> usize {
        grapheme_segments(&self.buffer[..self.cursor])
            .next_back()
            .map_or(0, str::len)
    }

    fn grapheme_after_cursor(&self) -> usize {
        grapheme_segments(&self.buffer[self.cursor..])
            .next()
            .map_or(0, str::len)
    }

    fn delete_backward(&mut self) {
        let len = self.grapheme_before_cursor();
        let start = self.cursor - len;
        self.buffer.replace_range(start..self.cursor, "");
        self.cursor = start;
    }

    fn delete_forward(&mut self) {
        let end = self.cursor + self.grapheme_after_cursor();
        self.buffer.replace_range(self.cursor..end, "");
    }

    /// Word start before the cursor: skips trailing whitespace, then either a run of
    /// punctuation or a run of word characters.
    fn word_start_before_cursor(&self) -> usize {
        let mut graphemes: Vec<&str> = grapheme_segments(&self.buffer[..self.cursor]).collect();
        let mut position = self.cursor;
        let is_space = |segment: &str| segment.chars().any(is_whitespace_char);
        let is_punct = |segment: &str| segment.chars().any(is_punctuation_char);

        while let Some(last) = graphemes.last().copied().filter(|s| is_space(*s)) {
            position -= last.len();
            graphemes.pop();
        }

        let in_punctuation = graphemes.last().is_some_and(|s| is_punct(*s));
        while let Some(last) = graphemes.last().copied() {
            let matches = if in_punctuation {
                is_punct(last)
            } else {
                !is_space(last) && !is_punct(last)
            };
            if !matches {
                break;
            }
            position -= last.len();
            graphemes.pop();
        }
        position
    }

    fn handle_key(&mut self, raw: &str, key_id: &str) {
        if self.single_separator(raw) {
            self.commit_buffer();
            return;
        }

        let Some(action) = self.keybindings.action_for(key_id) else {
            return;
        };
        match action {
            TagsAction::Commit => self.commit(),
            TagsAction::DeleteCharBackward => {
                if self.buffer.is_empty() {
                    if let Some(last) = self.store.last_index() {
                        self.remove_at(last);
                    }
                } else if self.cursor > 0 {
                    self.delete_backward();
                    self.buffer_changed();
                }
            }
            TagsAction::DeleteCharForward => {
                if self.cursor < self.buffer.len() {
                    self.delete_forward();
                    self.buffer_changed();
                }
            }
            TagsAction::DeleteWordBackward => {
                let start = self.word_start_before_cursor();
                if start < self.cursor {
                    self.buffer.replace_range(start..self.cursor, "");
                    self.cursor = start;
                    self.buffer_changed();
                }
            }
            TagsAction::DeleteToLineStart => {
                if self.cursor > 0 {
                    self.buffer.replace_range(..self.cursor, "");
                    self.cursor = 0;
                    self.buffer_changed();
                }
            }
            TagsAction::CursorLeft => self.cursor -= self.grapheme_before_cursor(),
            TagsAction::CursorRight => self.cursor += self.grapheme_after_cursor(),
            TagsAction::CursorLineStart => self.cursor = 0,
            TagsAction::CursorLineEnd => self.cursor = self.buffer.len(),
            TagsAction::SuggestionUp => self.move_suggestion(-1),
            TagsAction::SuggestionDown => self.move_suggestion(1),
            TagsAction::DismissSuggestions => self.hide_suggestions(),
        }
    }

    fn render_chip(&self, tag: &str) -> String {
        let label = if self.readonly {
            format!("[{tag}]")
        } else {
            format!("[{tag} {}]", (self.theme.remove_mark)("×"))
        };
        (self.theme.chip)(&label)
    }

    fn render_buffer(&self) -> String {
        if self.buffer.is_empty() && !self.focused {
            if self.placeholder.is_empty() {
                return String::new();
            }
            return (self.theme.placeholder)(&self.placeholder);
        }
        if !self.focused {
            return self.buffer.clone();
        }

        let before = &self.buffer[..self.cursor];
        let at_len = self.grapheme_after_cursor();
        let (at_cursor, after) = if at_len == 0 {
            (" ", "")
        } else {
            (
                &self.buffer[self.cursor..self.cursor + at_len],
                &self.buffer[self.cursor + at_len..],
            )
        };
        format!("{before}{CURSOR_ON}{at_cursor}{CURSOR_OFF}{after}")
    }

    fn render_suggestion(&self, index: usize, item: &str, width: usize) -> String {
        let body = match highlight(item, &self.buffer) {
            Some(span) => format!(
                "{}{}{}",
                span.before,
                (self.theme.highlight)(span.matched),
                span.after
            ),
            None => item.to_string(),
        };
        let line = if self.suggestions.active() == Some(index) {
            (self.theme.suggestion_active)(&format!("→ {body}"))
        } else {
            (self.theme.suggestion)(&format!("  {body}"))
        };
        truncate_to_width(&line, width, "")
    }
}

/// Packs segments into lines separated by single spaces, truncating any segment
/// that is wider than a whole line.
fn wrap_segments(segments: Vec<String>, width: usize) -> Vec<String> {
    let mut lines = Vec::new();
    let mut current = String::new();
    let mut current_width = 0;

    for segment in segments {
        let segment = truncate_to_width(&segment, width, "…");
        let segment_width = visible_width(&segment);
        if segment_width == 0 {
            continue;
        }
        let gap = usize::from(current_width > 0);
        if current_width > 0 && current_width + gap + segment_width > width {
            lines.push(std::mem::take(&mut current));
            current_width = 0;
        }
        if current_width > 0 {
            current.push(' ');
            current_width += 1;
        }
        current.push_str(&segment);
        current_width += segment_width;
    }

    if !current.is_empty() || lines.is_empty() {
        lines.push(current);
    }
    lines
}

impl Component for TagsInput {
    fn render(&mut self, width: usize) -> Vec<String> {
        if self.destroyed {
            return Vec::new();
        }
        let width = width.max(1);

        let mut segments: Vec<String> = self
            .store
            .as_slice()
            .iter()
            .map(|tag| self.render_chip(tag))
            .collect();
        if !self.readonly {
            segments.push(self.render_buffer());
        }

        let mut lines = wrap_segments(segments, width);
        if self.invalid {
            lines = lines.iter().map(|line| (self.theme.invalid)(line)).collect();
        }
        if self.disabled {
            lines = lines.iter().map(|line| (self.theme.disabled)(line)).collect();
            return lines;
        }

        for (index, item) in self.suggestions.items().iter().enumerate() {
            lines.push(self.render_suggestion(index, item, width));
        }
        lines
    }

    fn handle_event(&mut self, event: &InputEvent) {
        if self.destroyed || self.readonly || self.disabled {
            return;
        }

        match event {
            InputEvent::Text { text, .. } => {
                if self.single_separator(text) {
                    self.commit_buffer();
                    return;
                }
                self.insert_text(text);
                self.buffer_changed();
            }
            InputEvent::Paste { text, .. } => {
                let cleaned = text.replace(['\r', '\n'], "");
                self.insert_text(&cleaned);
                self.buffer_changed();
            }
            InputEvent::Key { raw, key_id } => self.handle_key(raw, key_id),
            InputEvent::UnknownRaw { .. } => {}
        }
    }

    fn as_focusable(&mut self) -> Option<&mut dyn Focusable> {
        Some(self)
    }
}

impl Focusable for TagsInput {
    fn set_focused(&mut self, focused: bool) {
        if focused {
            self.focus();
        } else {
            self.blur();
        }
    }

    fn is_focused(&self) -> bool {
        self.focused
    }
}

impl fmt::Debug for TagsInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TagsInput")
            .field("host", &self.host.name())
            .field("tags", &self.store.as_slice())
            .field("buffer", &self.buffer)
            .field("suggestions", &self.suggestions)
            .field("readonly", &self.readonly)
            .field("disabled", &self.disabled)
            .field("destroyed", &self.destroyed)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::{TagsInput, TagsInputTheme, BLUR_HIDE_DELAY, INVALID_FLASH_DURATION};
    use crate::core::component::{Component, Focusable};
    use crate::core::input_event::{parse_input_events, InputEvent};
    use crate::error::TagsInputError;
    use crate::host::{ElementKind, FormDocument, FormField, RemovalToken, Renderer};
    use crate::tags::events::{TagEvent, TagEventKind};
    use crate::tags::options::TagsInputOptions;
    use crate::tags::suggest::SuggestionView;
    use pretty_assertions::assert_eq;
    use std::cell::RefCell;
    use std::panic::{catch_unwind, AssertUnwindSafe};
    use std::rc::Rc;
    use std::time::Duration;

    type EventLog = Rc<RefCell<Vec<TagEvent>>>;

    fn attach(options: TagsInputOptions) -> (TagsInput, FormField, EventLog) {
        let field = FormField::new("tags");
        let mut input = TagsInput::attach(Box::new(field.clone()), options).expect("attach");
        let log: EventLog = Rc::new(RefCell::new(Vec::new()));
        for kind in TagEventKind::ALL {
            let log = Rc::clone(&log);
            input.subscribe(kind, move |event| log.borrow_mut().push(event.clone()));
        }
        (input, field, log)
    }

    fn kinds(log: &EventLog) -> Vec<TagEventKind> {
        log.borrow().iter().map(|event| event.kind).collect()
    }

    fn send(input: &mut TagsInput, data: &str) {
        for event in parse_input_events(data) {
            input.handle_event(&event);
        }
    }

    fn fruit() -> TagsInputOptions {
        TagsInputOptions::new().with_suggestions(["apple", "banana", "apricot"])
    }

    #[derive(Default)]
    struct RecordingRenderer {
        calls: Rc<RefCell<Vec<String>>>,
    }

    impl Renderer for RecordingRenderer {
        fn tag_added(&mut self, index: usize, value: &str) {
            self.calls.borrow_mut().push(format!("added {index} {value}"));
        }
        fn tag_removing(&mut self, index: usize, token: RemovalToken) {
            self.calls.borrow_mut().push(format!("removing {index} {}", token.0));
        }
        fn tag_detached(&mut self, token: RemovalToken) {
            self.calls.borrow_mut().push(format!("detached {}", token.0));
        }
        fn suggestions_shown(&mut self, view: &SuggestionView) {
            self.calls
                .borrow_mut()
                .push(format!("shown {:?} {:?}", view.items(), view.active()));
        }
        fn suggestions_hidden(&mut self) {
            self.calls.borrow_mut().push("hidden".to_string());
        }
        fn teardown(&mut self) {
            self.calls.borrow_mut().push("teardown".to_string());
        }
    }

    #[test]
    fn rejects_non_input_hosts() {
        let field = FormField::with_kind("notes", ElementKind::TextArea);
        let err = TagsInput::attach(Box::new(field), TagsInputOptions::default()).unwrap_err();
        assert_eq!(err, TagsInputError::NotAnInput { found: ElementKind::TextArea });
    }

    #[test]
    fn selector_must_resolve() {
        let mut document = FormDocument::new();
        document.insert("#tags", FormField::new("tags"));
        assert!(TagsInput::attach_selector(&mut document, "#tags", TagsInputOptions::default()).is_ok());
        let err = TagsInput::attach_selector(&mut document, "#nope", TagsInputOptions::default())
            .unwrap_err();
        assert_eq!(err, TagsInputError::MissingTarget { selector: "#nope".to_string() });
    }

    #[test]
    fn add_preserves_order_and_syncs_host_before_events() {
        let field = FormField::new("tags");
        let mut input =
            TagsInput::attach(Box::new(field.clone()), TagsInputOptions::default()).expect("attach");
        let seen = Rc::new(RefCell::new(Vec::new()));
        let seen_ref = Rc::clone(&seen);
        let observed = field.clone();
        input.subscribe(TagEventKind::Add, move |event| {
            seen_ref.borrow_mut().push((event.value.clone(), observed.value()));
        });

        assert!(input.add("a"));
        assert!(input.add(" b "));
        assert!(input.add("c"));
        assert_eq!(input.tags(), vec!["a", "b", "c"]);
        assert_eq!(field.value(), "a,b,c");
        assert!(field.is_hidden());
        assert_eq!(
            seen.borrow().as_slice(),
            &[
                (Some("a".to_string()), "a".to_string()),
                (Some("b".to_string()), "a,b".to_string()),
                (Some("c".to_string()), "a,b,c".to_string()),
            ]
        );
    }

    #[test]
    fn add_emits_add_then_change() {
        let (mut input, _, log) = attach(TagsInputOptions::default());
        input.add("x");
        assert_eq!(kinds(&log), vec![TagEventKind::Add, TagEventKind::Change]);
        assert_eq!(log.borrow()[0].value.as_deref(), Some("x"));
        assert_eq!(log.borrow()[1].value, None);
        assert_eq!(log.borrow()[1].tags, vec!["x"]);
    }

    #[test]
    fn empty_values_are_ignored_silently() {
        let (mut input, _, log) = attach(TagsInputOptions::default());
        assert!(!input.add("   "));
        assert!(log.borrow().is_empty());
        assert!(!input.is_flashing_invalid());
    }

    #[test]
    fn case_insensitive_duplicates_are_invalid() {
        let mut options = TagsInputOptions::default();
        options.case_sensitive = false;
        let (mut input, _, log) = attach(options);

        assert!(input.add("Foo"));
        log.borrow_mut().clear();
        assert!(!input.add("foo"));
        assert_eq!(input.count(), 1);
        assert_eq!(kinds(&log), vec![TagEventKind::Invalid]);
        assert_eq!(log.borrow()[0].value.as_deref(), Some("foo"));
    }

    #[test]
    fn capacity_emits_max_not_invalid() {
        let mut options = TagsInputOptions::default();
        options.max_tags = Some(2);
        let (mut input, _, log) = attach(options);

        assert!(input.add("a"));
        assert!(input.add("b"));
        log.borrow_mut().clear();
        assert!(!input.add("c"));
        assert_eq!(kinds(&log), vec![TagEventKind::Max]);
        assert_eq!(input.count(), 2);
    }

    #[test]
    fn min_length_is_enforced() {
        let mut options = TagsInputOptions::default();
        options.min_length = 2;
        let (mut input, _, _) = attach(options);
        assert!(!input.add("a"));
        assert!(input.add("ab"));
    }

    #[test]
    fn rejection_flash_clears_after_its_duration() {
        let mut options = TagsInputOptions::default();
        options.min_length = 3;
        let (mut input, _, _) = attach(options);

        input.add("no");
        assert!(input.is_flashing_invalid());
        input.tick(INVALID_FLASH_DURATION - Duration::from_millis(1));
        assert!(input.is_flashing_invalid());
        input.tick(Duration::from_millis(1));
        assert!(!input.is_flashing_invalid());
    }

    #[test]
    fn remove_by_value_and_index() {
        let (mut input, field, log) = attach(TagsInputOptions::default());
        input.fill(["a", "b", "c"]);
        log.borrow_mut().clear();

        assert!(input.remove("b"));
        assert_eq!(input.tags(), vec!["a", "c"]);
        assert_eq!(field.value(), "a,c");
        assert_eq!(kinds(&log), vec![TagEventKind::Remove, TagEventKind::Change]);
        assert_eq!(log.borrow()[0].value.as_deref(), Some("b"));

        assert!(!input.remove_at(5));
        assert!(!input.remove("B"));
        assert_eq!(input.tags(), vec!["a", "c"]);
    }

    #[test]
    fn removal_animation_detaches_later() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let renderer = RecordingRenderer { calls: Rc::clone(&calls) };
        let mut input = TagsInput::attach_with_renderer(
            Box::new(FormField::new("tags")),
            TagsInputOptions::new().with_initial_tags(["a", "b"]),
            Box::new(renderer),
        )
        .expect("attach");

        input.remove_at(0);
        input.tick(Duration::from_millis(100));
        assert_eq!(calls.borrow().last().map(String::as_str), Some("removing 0 0"));
        input.tick(Duration::from_millis(60));
        assert_eq!(
            calls.borrow().as_slice(),
            &["added 0 a", "added 1 b", "removing 0 0", "detached 0"]
        );
    }

    #[test]
    fn clear_always_emits() {
        let (mut input, field, log) = attach(TagsInputOptions::new().with_initial_tags(["a"]));
        input.clear();
        input.clear();
        assert!(input.tags().is_empty());
        assert_eq!(field.value(), "");
        assert_eq!(
            kinds(&log),
            vec![
                TagEventKind::Clear,
                TagEventKind::Change,
                TagEventKind::Clear,
                TagEventKind::Change,
            ]
        );
    }

    #[test]
    fn fill_emits_a_single_change() {
        let (mut input, field, log) = attach(TagsInputOptions::new().with_initial_tags(["z"]));
        input.fill(["x", "y", "x", ""]);
        assert_eq!(input.tags(), vec!["x", "y"]);
        assert_eq!(field.value(), "x,y");
        assert_eq!(kinds(&log), vec![TagEventKind::Change]);
        assert_eq!(log.borrow()[0].tags, vec!["x", "y"]);

        input.replace(["q"]);
        assert_eq!(input.tags(), vec!["q"]);
        assert_eq!(log.borrow().len(), 2);
    }

    #[test]
    fn fill_releases_silence_when_a_validator_panics() {
        let options = TagsInputOptions::new().with_validate(|value: &str| {
            if value == "boom" {
                panic!("validator failure");
            }
            true
        });
        let (mut input, _, log) = attach(options);

        let result = catch_unwind(AssertUnwindSafe(|| input.fill(["a", "boom"])));
        assert!(result.is_err());
        log.borrow_mut().clear();

        input.add("b");
        assert_eq!(kinds(&log), vec![TagEventKind::Add, TagEventKind::Change]);
    }

    #[test]
    fn reset_restores_initial_tags() {
        let (mut input, _, log) = attach(TagsInputOptions::new().with_initial_tags(["a", "b"]));
        input.add("c");
        input.remove("a");
        log.borrow_mut().clear();

        input.reset();
        assert_eq!(input.tags(), vec!["a", "b"]);
        assert_eq!(kinds(&log), vec![TagEventKind::Change]);
    }

    #[test]
    fn invalid_initial_tags_are_dropped() {
        let mut options = TagsInputOptions::new().with_initial_tags(["ok", "x", "ok"]);
        options.min_length = 2;
        let (mut input, _, _) = attach(options);
        assert_eq!(input.tags(), vec!["ok"]);
        input.add("more");
        input.reset();
        assert_eq!(input.tags(), vec!["ok"]);
    }

    #[test]
    fn readonly_and_disabled_block_mutation() {
        let (mut input, _, _) = attach(TagsInputOptions::new().with_initial_tags(["a"]));
        input.set_readonly(true);
        assert!(!input.add("b"));
        assert!(!input.remove_at(0));
        send(&mut input, "c");
        send(&mut input, "\r");
        assert_eq!(input.buffer(), "");
        assert_eq!(input.tags(), vec!["a"]);
        input.set_readonly(false);

        input.set_disabled(true);
        assert!(!input.add("b"));
        assert!(!input.remove("a"));
        input.set_disabled(false);
        assert!(input.add("b"));
    }

    #[test]
    fn modes_from_options_apply_after_initial_tags() {
        let mut options = TagsInputOptions::new().with_initial_tags(["a"]);
        options.readonly = true;
        let (input, field, _) = attach(options);
        assert!(input.is_readonly());
        assert_eq!(input.tags(), vec!["a"]);
        assert_eq!(field.value(), "a");
    }

    #[test]
    fn typed_separator_commits_buffer() {
        let (mut input, _, _) = attach(TagsInputOptions::default());
        send(&mut input, "r");
        send(&mut input, "u");
        send(&mut input, "s");
        send(&mut input, "t");
        assert_eq!(input.buffer(), "rust");
        send(&mut input, ",");
        assert_eq!(input.tags(), vec!["rust"]);
        assert_eq!(input.buffer(), "");
    }

    #[test]
    fn paste_splits_on_every_separator() {
        let options = TagsInputOptions::new().with_separators([',', ';']);
        let (mut input, _, _) = attach(options);
        send(&mut input, "\x1b[200~a, b;c,rest\x1b[201~");
        assert_eq!(input.tags(), vec!["a", "b", "c"]);
        assert_eq!(input.buffer(), "rest");
    }

    #[test]
    fn paste_strips_line_breaks() {
        let (mut input, _, _) = attach(TagsInputOptions::default());
        input.handle_event(&InputEvent::paste("multi\nline"));
        assert_eq!(input.buffer(), "multiline");
    }

    #[test]
    fn enter_commits_and_clears_even_when_rejected() {
        let mut options = TagsInputOptions::default();
        options.min_length = 3;
        let (mut input, _, log) = attach(options);
        send(&mut input, "ab");
        send(&mut input, "\r");
        assert!(input.tags().is_empty());
        assert_eq!(input.buffer(), "");
        assert_eq!(kinds(&log), vec![TagEventKind::Invalid]);
    }

    #[test]
    fn backspace_on_empty_buffer_removes_last_tag() {
        let (mut input, _, _) = attach(TagsInputOptions::new().with_initial_tags(["a", "b"]));
        send(&mut input, "x");
        send(&mut input, "\x7f");
        assert_eq!(input.buffer(), "");
        assert_eq!(input.tags(), vec!["a", "b"]);

        send(&mut input, "\x7f");
        assert_eq!(input.tags(), vec!["a"]);
        send(&mut input, "\x7f");
        send(&mut input, "\x7f");
        assert!(input.tags().is_empty());
    }

    #[test]
    fn suggestions_follow_the_buffer() {
        let (mut input, _, _) = attach(fruit());
        send(&mut input, "ap");
        assert_eq!(input.suggestions().items(), &["apple", "apricot"]);

        input.add("apple");
        send(&mut input, "r");
        assert_eq!(input.suggestions().items(), &["apricot"]);

        send(&mut input, "\x1b");
        assert!(!input.suggestions().is_visible());
        assert_eq!(input.buffer(), "apr");
    }

    #[test]
    fn enter_prefers_highlighted_suggestion() {
        let (mut input, _, _) = attach(fruit());
        send(&mut input, "ap");
        send(&mut input, "\x1b[B");
        send(&mut input, "\x1b[B");
        assert_eq!(input.suggestions().active(), Some(1));
        send(&mut input, "\r");
        assert_eq!(input.tags(), vec!["apricot"]);
        assert_eq!(input.buffer(), "");
        assert!(!input.suggestions().is_visible());
    }

    #[test]
    fn navigation_saturates_in_the_dropdown() {
        let (mut input, _, _) = attach(fruit().with_suggestions(["a1", "a2", "a3"]));
        send(&mut input, "a");
        for _ in 0..5 {
            send(&mut input, "\x1b[B");
        }
        assert_eq!(input.suggestions().active(), Some(2));
        for _ in 0..5 {
            send(&mut input, "\x1b[A");
        }
        assert_eq!(input.suggestions().active(), None);
    }

    #[test]
    fn separated_text_closes_the_dropdown() {
        let (mut input, _, _) = attach(fruit());
        send(&mut input, "ap");
        send(&mut input, "\x1b[B");
        assert!(input.suggestions().is_visible());

        input.handle_event(&InputEvent::text("ple,b"));
        assert_eq!(input.tags(), vec!["apple"]);
        assert_eq!(input.buffer(), "b");
        assert!(!input.suggestions().is_visible());

        send(&mut input, "\x1b[B");
        send(&mut input, "\r");
        assert_eq!(input.tags(), vec!["apple", "b"]);
    }

    #[test]
    fn typed_ahead_chunks_are_not_lost() {
        let (mut input, _, _) = attach(TagsInputOptions::default());
        send(&mut input, "rust\r");
        assert_eq!(input.tags(), vec!["rust"]);

        send(&mut input, "a,b\n");
        assert_eq!(input.tags(), vec!["rust", "a", "b"]);
        assert_eq!(input.buffer(), "");
    }

    #[test]
    fn entering_readonly_or_disabled_hides_dropdown() {
        let (mut input, _, _) = attach(fruit());
        send(&mut input, "ap");
        input.set_readonly(true);
        assert!(!input.suggestions().is_visible());
        assert_eq!(input.render(40), vec![String::new()]);
        input.set_readonly(false);

        send(&mut input, "r");
        assert!(input.suggestions().is_visible());
        input.set_disabled(true);
        assert!(!input.suggestions().is_visible());
    }

    #[test]
    fn separator_commits_raw_buffer_not_suggestion() {
        let (mut input, _, _) = attach(fruit());
        send(&mut input, "ap");
        send(&mut input, "\x1b[B");
        send(&mut input, ",");
        assert_eq!(input.tags(), vec!["ap"]);
    }

    #[test]
    fn pointer_selection_wins_over_pending_blur() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let renderer = RecordingRenderer { calls: Rc::clone(&calls) };
        let mut input = TagsInput::attach_with_renderer(
            Box::new(FormField::new("tags")),
            fruit(),
            Box::new(renderer),
        )
        .expect("attach");

        input.focus();
        send(&mut input, "ban");
        input.blur();
        input.tick(BLUR_HIDE_DELAY / 2);
        assert!(input.select_suggestion(0));
        assert_eq!(input.tags(), vec!["banana"]);

        input.tick(BLUR_HIDE_DELAY);
        assert!(!input.suggestions().is_visible());
        assert_eq!(calls.borrow().iter().filter(|call| *call == "hidden").count(), 1);
    }

    #[test]
    fn blur_hides_dropdown_after_delay() {
        let (mut input, _, _) = attach(fruit());
        input.set_focused(true);
        send(&mut input, "ap");
        input.set_focused(false);
        input.tick(BLUR_HIDE_DELAY - Duration::from_millis(1));
        assert!(input.suggestions().is_visible());
        input.tick(Duration::from_millis(1));
        assert!(!input.suggestions().is_visible());
        assert!(!input.select_suggestion(0));
    }

    #[test]
    fn word_and_line_deletion_refresh_suggestions() {
        let (mut input, _, _) = attach(fruit());
        send(&mut input, "ban");
        assert_eq!(input.suggestions().items(), &["banana"]);
        send(&mut input, "\x17");
        assert_eq!(input.buffer(), "");
        assert!(!input.suggestions().is_visible());

        send(&mut input, "big ban");
        send(&mut input, "\x17");
        assert_eq!(input.buffer(), "big ");
        send(&mut input, "\x15");
        assert_eq!(input.buffer(), "");
    }

    #[test]
    fn cursor_moves_edit_in_place() {
        let (mut input, _, _) = attach(TagsInputOptions::default());
        send(&mut input, "helo");
        send(&mut input, "\x1b[D");
        send(&mut input, "l");
        assert_eq!(input.buffer(), "hello");
        send(&mut input, "\x01");
        send(&mut input, "\x1b[3~");
        assert_eq!(input.buffer(), "ello");
    }

    #[test]
    fn unsubscribed_handlers_stop_receiving() {
        let (mut input, _, _) = attach(TagsInputOptions::default());
        let hits = Rc::new(RefCell::new(0));
        let hits_ref = Rc::clone(&hits);
        let id = input.subscribe(TagEventKind::Change, move |_| *hits_ref.borrow_mut() += 1);
        input.add("a");
        assert!(input.unsubscribe(TagEventKind::Change, id));
        input.add("b");
        assert_eq!(*hits.borrow(), 1);
    }

    #[test]
    fn destroy_restores_host_and_is_idempotent() {
        let calls = Rc::new(RefCell::new(Vec::new()));
        let renderer = RecordingRenderer { calls: Rc::clone(&calls) };
        let field = FormField::new("tags");
        let mut input = TagsInput::attach_with_renderer(
            Box::new(field.clone()),
            TagsInputOptions::new().with_initial_tags(["a"]),
            Box::new(renderer),
        )
        .expect("attach");
        let log: EventLog = Rc::new(RefCell::new(Vec::new()));
        let log_ref = Rc::clone(&log);
        input.subscribe(TagEventKind::Change, move |event| log_ref.borrow_mut().push(event.clone()));
        input.remove_at(0);
        log.borrow_mut().clear();

        input.destroy();
        input.destroy();
        input.tick(Duration::from_secs(1));
        assert!(!field.is_hidden());
        assert!(input.is_destroyed());
        assert!(!input.add("late"));
        input.clear();
        assert!(log.borrow().is_empty());
        assert_eq!(calls.borrow().iter().filter(|call| *call == "teardown").count(), 1);
        assert!(!calls.borrow().iter().any(|call| call.starts_with("detached")));
        assert!(input.render(40).is_empty());
    }

    #[test]
    fn renders_chips_buffer_and_dropdown() {
        let theme = TagsInputTheme {
            highlight: Box::new(|text| format!("<{text}>")),
            ..TagsInputTheme::plain()
        };
        let (input, _, _) = attach(fruit().with_initial_tags(["rust"]));
        let mut input = input.with_theme(theme);
        send(&mut input, "AP");
        send(&mut input, "\x1b[B");

        let lines = input.render(40);
        assert_eq!(
            lines,
            vec![
                "[rust ×] AP".to_string(),
                "→ <ap>ple".to_string(),
                "  <ap>ricot".to_string(),
            ]
        );
    }

    #[test]
    fn render_wraps_and_hides_remove_marks_when_readonly() {
        let (mut input, _, _) = attach(TagsInputOptions::new().with_initial_tags(["alpha", "beta"]));
        assert_eq!(input.render(10), vec!["[alpha ×]", "[beta ×]"]);
        input.set_readonly(true);
        assert_eq!(input.render(80), vec!["[alpha] [beta]"]);
    }

    #[test]
    fn render_shows_cursor_and_placeholder() {
        let field = FormField::new("tags").with_placeholder("Add tags");
        let mut input =
            TagsInput::attach(Box::new(field), TagsInputOptions::default()).expect("attach");
        assert_eq!(input.render(40), vec!["Add tags"]);
        input.focus();
        send(&mut input, "ab");
        assert_eq!(input.render(40), vec!["ab\x1b[7m \x1b[27m"]);
    }
}
