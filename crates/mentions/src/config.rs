use serde::{Deserialize, Serialize};

use crate::candidate::MentionCandidate;

pub const DEFAULT_TRIGGER: &str = "@";
pub const DEFAULT_MAX_ITEMS: usize = 8;
pub const DEFAULT_PANEL_OFFSET: f32 = 4.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct MentionsConfig {
    pub trigger: String,
    pub max_items: usize,
    /// Gap between the caret line and the top of the panel.
    pub panel_offset: f32,
    /// Static candidates, used unless a lookup source is supplied.
    pub users: Vec<MentionCandidate>,
}

impl Default for MentionsConfig {
    fn default() -> Self {
        Self {
            trigger: DEFAULT_TRIGGER.to_string(),
            max_items: DEFAULT_MAX_ITEMS,
            panel_offset: DEFAULT_PANEL_OFFSET,
            users: Vec::new(),
        }
    }
}

impl MentionsConfig {
    pub fn with_defaults(mut self) -> Self {
        if self.trigger.is_empty() {
            self.trigger = DEFAULT_TRIGGER.to_string();
        }
        if self.max_items == 0 {
            self.max_items = DEFAULT_MAX_ITEMS;
        }
        if !self.panel_offset.is_finite() || self.panel_offset < 0.0 {
            self.panel_offset = DEFAULT_PANEL_OFFSET;
        }
        self
    }

    pub fn from_json_str(src: &str) -> serde_json::Result<Self> {
        let config: Self = serde_json::from_str(src)?;
        Ok(config.with_defaults())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn json_config_keeps_users_and_normalizes_zeros() {
        let config = MentionsConfig::from_json_str(
            r##"{ "trigger": "#", "maxItems": 0, "users": [{ "id": "t1", "name": "Team" }] }"##,
        )
        .unwrap();
        assert_eq!(config.trigger, "#");
        assert_eq!(config.max_items, DEFAULT_MAX_ITEMS);
        assert_eq!(config.panel_offset, DEFAULT_PANEL_OFFSET);
        assert_eq!(config.users, vec![MentionCandidate::new("t1", "Team")]);
    }
}
