use serde::{Deserialize, Serialize};

use crate::error::EditorError;
use crate::surface::DEFAULT_MAX_DEPTH;

pub const DEFAULT_TAB_GLYPH: &str = "\u{2003}";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct EditorConfig {
    /// Text inserted when Tab reaches the host unhandled.
    pub tab_glyph: String,
    /// Bound on ancestor walks inside the surface.
    pub max_ancestor_depth: usize,
    /// Whether the backing field is hidden once the editor takes over.
    pub hide_field: bool,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            tab_glyph: DEFAULT_TAB_GLYPH.to_string(),
            max_ancestor_depth: DEFAULT_MAX_DEPTH,
            hide_field: true,
        }
    }
}

impl EditorConfig {
    pub fn with_defaults(mut self) -> Self {
        if self.tab_glyph.is_empty() {
            self.tab_glyph = DEFAULT_TAB_GLYPH.to_string();
        }
        if self.max_ancestor_depth == 0 {
            self.max_ancestor_depth = DEFAULT_MAX_DEPTH;
        }
        self
    }

    pub fn from_json_str(src: &str) -> Result<Self, EditorError> {
        let config: Self = serde_json::from_str(src)?;
        Ok(config.with_defaults())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_fall_back_to_defaults() {
        let config = EditorConfig::from_json_str(r#"{ "tabGlyph": "", "maxAncestorDepth": 0 }"#)
            .unwrap();
        assert_eq!(config, EditorConfig::default());
    }

    #[test]
    fn malformed_config_is_reported() {
        let err = EditorConfig::from_json_str("{ nope").unwrap_err();
        assert!(matches!(err, EditorError::Config(_)));
    }
}
