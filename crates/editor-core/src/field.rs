use std::cell::RefCell;
use std::rc::Rc;

use indexmap::IndexMap;

use crate::error::InitializationError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldKind {
    TextArea,
    /// `<input>` with its `type` attribute.
    Input(String),
    /// Any other element, by tag.
    Other(String),
}

impl FieldKind {
    /// Multi-line text areas and single-line text inputs can back an editor.
    pub fn accepts_text(&self) -> bool {
        match self {
            Self::TextArea => true,
            Self::Input(ty) => ty.is_empty() || ty.eq_ignore_ascii_case("text"),
            Self::Other(_) => false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TextField {
    pub kind: FieldKind,
    pub value: String,
    pub hidden: bool,
}

impl TextField {
    pub fn textarea(value: impl Into<String>) -> Self {
        Self::with_kind(FieldKind::TextArea, value)
    }

    pub fn with_kind(kind: FieldKind, value: impl Into<String>) -> Self {
        Self {
            kind,
            value: value.into(),
            hidden: false,
        }
    }
}

/// Shared handle to a form field. The editor writes through it while the
/// page keeps reading the same value for submission.
#[derive(Debug, Clone)]
pub struct FieldHandle(Rc<RefCell<TextField>>);

impl FieldHandle {
    pub fn new(field: TextField) -> Self {
        Self(Rc::new(RefCell::new(field)))
    }

    pub fn textarea(value: impl Into<String>) -> Self {
        Self::new(TextField::textarea(value))
    }

    pub fn kind(&self) -> FieldKind {
        self.0.borrow().kind.clone()
    }

    pub fn value(&self) -> String {
        self.0.borrow().value.clone()
    }

    pub fn set_value(&self, value: impl Into<String>) {
        self.0.borrow_mut().value = value.into();
    }

    pub fn is_hidden(&self) -> bool {
        self.0.borrow().hidden
    }

    pub fn set_hidden(&self, hidden: bool) {
        self.0.borrow_mut().hidden = hidden;
    }

    pub fn ptr_eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.0, &other.0)
    }
}

/// Fields of a page, addressable by id.
#[derive(Debug, Clone, Default)]
pub struct Page {
    fields: IndexMap<String, FieldHandle>,
}

impl Page {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, id: impl Into<String>, field: TextField) -> FieldHandle {
        let handle = FieldHandle::new(field);
        self.fields.insert(id.into(), handle.clone());
        handle
    }

    pub fn get(&self, id: &str) -> Option<&FieldHandle> {
        self.fields.get(id)
    }

    /// Resolves `#id` (or a bare id) to a field.
    pub fn query(&self, selector: &str) -> Option<FieldHandle> {
        let id = selector.trim();
        let id = id.strip_prefix('#').unwrap_or(id);
        self.fields.get(id).cloned()
    }
}

/// How a caller names the field an editor attaches to.
#[derive(Debug, Clone)]
pub enum FieldRef<'a> {
    Handle(FieldHandle),
    Selector { page: &'a Page, selector: &'a str },
}

impl From<FieldHandle> for FieldRef<'_> {
    fn from(handle: FieldHandle) -> Self {
        Self::Handle(handle)
    }
}

impl<'a> FieldRef<'a> {
    pub fn selector(page: &'a Page, selector: &'a str) -> Self {
        Self::Selector { page, selector }
    }

    pub fn resolve(self) -> Result<FieldHandle, InitializationError> {
        let (handle, name) = match self {
            Self::Handle(handle) => (handle, String::from("<handle>")),
            Self::Selector { page, selector } => {
                let handle = page
                    .query(selector)
                    .ok_or_else(|| InitializationError::NotFound(selector.to_string()))?;
                (handle, selector.to_string())
            }
        };
        if !handle.kind().accepts_text() {
            return Err(InitializationError::NotTextField(name));
        }
        Ok(handle)
    }
}
