use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum InitializationError {
    #[error("no element matches `{0}`")]
    NotFound(String),
    #[error("`{0}` is not a textarea or text input")]
    NotTextField(String),
}

/// Failure reported by a plugin while it sets itself up.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{message}")]
pub struct PluginError {
    message: String,
}

impl PluginError {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Error)]
pub enum EditorError {
    #[error(transparent)]
    Initialization(#[from] InitializationError),
    #[error("a plugin named `{0}` is already registered")]
    DuplicatePlugin(String),
    #[error("plugin `{name}` failed to initialize")]
    Plugin {
        name: String,
        #[source]
        source: PluginError,
    },
    #[error("invalid editor config")]
    Config(#[from] serde_json::Error),
}
