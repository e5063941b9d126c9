use std::fmt;
use std::future::Future;
use std::rc::Rc;

use futures::FutureExt as _;
use futures::channel::oneshot;
use futures::future::LocalBoxFuture;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MentionCandidate {
    pub id: String,
    #[serde(rename = "name", alias = "displayName")]
    pub display_name: String,
    #[serde(
        default,
        rename = "avatar",
        alias = "avatarUrl",
        skip_serializing_if = "Option::is_none"
    )]
    pub avatar_url: Option<String>,
}

impl MentionCandidate {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
            avatar_url: None,
        }
    }

    pub fn with_avatar(mut self, url: impl Into<String>) -> Self {
        self.avatar_url = Some(url.into());
        self
    }

    /// First letter of every word of the name, upper-cased.
    pub fn initials(&self) -> String {
        self.display_name
            .split_whitespace()
            .filter_map(|word| word.chars().next())
            .flat_map(char::to_uppercase)
            .collect()
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LookupError {
    #[error("candidate lookup failed: {0}")]
    Failed(String),
    #[error("candidate lookup was dropped before completing")]
    Cancelled,
}

impl From<oneshot::Canceled> for LookupError {
    fn from(_: oneshot::Canceled) -> Self {
        Self::Cancelled
    }
}

pub type LookupFuture = LocalBoxFuture<'static, Result<Vec<MentionCandidate>, LookupError>>;

/// Answer of a candidate source: either immediate or deferred.
pub enum Lookup {
    Ready(Vec<MentionCandidate>),
    Deferred(LookupFuture),
}

impl Lookup {
    pub fn deferred(
        future: impl Future<Output = Result<Vec<MentionCandidate>, LookupError>> + 'static,
    ) -> Self {
        Self::Deferred(future.boxed_local())
    }
}

impl From<Vec<MentionCandidate>> for Lookup {
    fn from(candidates: Vec<MentionCandidate>) -> Self {
        Self::Ready(candidates)
    }
}

impl fmt::Debug for Lookup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Ready(candidates) => f.debug_tuple("Ready").field(candidates).finish(),
            Self::Deferred(_) => f.write_str("Deferred(..)"),
        }
    }
}

pub type LookupFn = Rc<dyn Fn(&str) -> Lookup>;

#[derive(Clone)]
pub enum CandidateSource {
    /// A fixed list, filtered by case-insensitive substring of the name.
    Static(Vec<MentionCandidate>),
    Lookup(LookupFn),
}

impl Default for CandidateSource {
    fn default() -> Self {
        Self::Static(Vec::new())
    }
}

impl fmt::Debug for CandidateSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Static(candidates) => f.debug_tuple("Static").field(candidates).finish(),
            Self::Lookup(_) => f.write_str("Lookup(..)"),
        }
    }
}

impl CandidateSource {
    pub fn from_fn(lookup: impl Fn(&str) -> Lookup + 'static) -> Self {
        Self::Lookup(Rc::new(lookup))
    }

    pub fn lookup(&self, query: &str) -> Lookup {
        match self {
            Self::Static(candidates) => {
                let needle = query.to_lowercase();
                Lookup::Ready(
                    candidates
                        .iter()
                        .filter(|candidate| candidate.display_name.to_lowercase().contains(&needle))
                        .cloned()
                        .collect(),
                )
            }
            Self::Lookup(lookup) => lookup(query),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initials_take_every_word() {
        assert_eq!(MentionCandidate::new("1", "ada king lovelace").initials(), "AKL");
        assert_eq!(MentionCandidate::new("2", "  Bo  ").initials(), "B");
        assert_eq!(MentionCandidate::new("3", "").initials(), "");
    }

    #[test]
    fn static_source_filters_case_insensitively() {
        let source = CandidateSource::Static(vec![
            MentionCandidate::new("u1", "Alice"),
            MentionCandidate::new("u2", "Malia"),
            MentionCandidate::new("u3", "Bob"),
        ]);
        let Lookup::Ready(found) = source.lookup("AL") else {
            panic!("static lookups are immediate");
        };
        let ids: Vec<_> = found.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["u1", "u2"]);
    }

    #[test]
    fn candidates_accept_both_name_spellings() {
        let parsed: Vec<MentionCandidate> = serde_json::from_value(serde_json::json!([
            { "id": "u1", "name": "Alice", "avatar": "a.png" },
            { "id": "u2", "displayName": "Bob", "avatarUrl": "b.png" },
        ]))
        .unwrap();
        assert_eq!(parsed[0], MentionCandidate::new("u1", "Alice").with_avatar("a.png"));
        assert_eq!(parsed[1], MentionCandidate::new("u2", "Bob").with_avatar("b.png"));
    }
}
