//! Collaborators outside the tag engine: the host form field, the document that
//! resolves selectors, and the renderer that mirrors state on screen.

use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::rc::Rc;

use crate::tags::suggest::SuggestionView;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ElementKind {
    /// Single-line text input; the only kind the editor attaches to.
    TextInput,
    TextArea,
    Other(String),
}

impl fmt::Display for ElementKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ElementKind::TextInput => f.write_str("text input"),
            ElementKind::TextArea => f.write_str("textarea"),
            ElementKind::Other(name) => write!(f, "<{name}>"),
        }
    }
}

/// The form field the editor replaces. It stays mounted (hidden) so form
/// submission still carries the serialized tags under its name.
pub trait HostInput {
    fn kind(&self) -> ElementKind;
    fn name(&self) -> &str;
    fn placeholder(&self) -> Option<String> {
        None
    }
    fn set_value(&mut self, value: &str);
    fn set_hidden(&mut self, hidden: bool);
}

/// Resolves selectors to host fields.
pub trait HostDocument {
    fn query_selector(&mut self, selector: &str) -> Option<Box<dyn HostInput>>;
}

/// Token tying a `tag_removing` call to its later `tag_detached`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RemovalToken(pub u64);

/// Render hooks invoked after each state change, before events are emitted.
///
/// Every hook defaults to a no-op so renderers implement only what they draw.
pub trait Renderer {
    fn tag_added(&mut self, _index: usize, _value: &str) {}
    /// The chip at `index` starts its removal animation.
    fn tag_removing(&mut self, _index: usize, _token: RemovalToken) {}
    /// The animation for `token` finished; the chip can be detached.
    fn tag_detached(&mut self, _token: RemovalToken) {}
    fn tags_cleared(&mut self) {}
    fn suggestions_shown(&mut self, _view: &SuggestionView) {}
    fn suggestions_hidden(&mut self) {}
    fn invalid_changed(&mut self, _active: bool) {}
    fn mode_changed(&mut self, _readonly: bool, _disabled: bool) {}
    fn focus_requested(&mut self) {}
    fn teardown(&mut self) {}
}

#[derive(Debug, Default)]
pub struct NullRenderer;

impl Renderer for NullRenderer {}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FieldState {
    pub value: String,
    pub hidden: bool,
}

/// In-memory text input. Clones share state, so a caller can keep one handle while
/// the editor owns another.
#[derive(Debug, Clone)]
pub struct FormField {
    kind: ElementKind,
    name: String,
    placeholder: Option<String>,
    state: Rc<RefCell<FieldState>>,
}

impl FormField {
    pub fn new(name: impl Into<String>) -> Self {
        Self::with_kind(name, ElementKind::TextInput)
    }

    pub fn with_kind(name: impl Into<String>, kind: ElementKind) -> Self {
        Self {
            kind,
            name: name.into(),
            placeholder: None,
            state: Rc::new(RefCell::new(FieldState::default())),
        }
    }

    pub fn with_placeholder(mut self, placeholder: impl Into<String>) -> Self {
        self.placeholder = Some(placeholder.into());
        self
    }

    pub fn value(&self) -> String {
        self.state.borrow().value.clone()
    }

    pub fn is_hidden(&self) -> bool {
        self.state.borrow().hidden
    }

    /// What a form submission would send for this field.
    pub fn submission(&self) -> (String, String) {
        (self.name.clone(), self.value())
    }
}

impl HostInput for FormField {
    fn kind(&self) -> ElementKind {
        self.kind.clone()
    }

    fn name(&self) -> &str {
        &self.name
    }

    fn placeholder(&self) -> Option<String> {
        self.placeholder.clone()
    }

    fn set_value(&mut self, value: &str) {
        self.state.borrow_mut().value = value.to_string();
    }

    fn set_hidden(&mut self, hidden: bool) {
        self.state.borrow_mut().hidden = hidden;
    }
}

/// Selector → field map; a matched field is handed out as a shared clone.
#[derive(Debug, Default)]
pub struct FormDocument {
    fields: HashMap<String, FormField>,
}

impl FormDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, selector: impl Into<String>, field: FormField) {
        self.fields.insert(selector.into(), field);
    }
}

impl HostDocument for FormDocument {
    fn query_selector(&mut self, selector: &str) -> Option<Box<dyn HostInput>> {
        self.fields
            .get(selector)
            .map(|field| Box::new(field.clone()) as Box<dyn HostInput>)
    }
}
