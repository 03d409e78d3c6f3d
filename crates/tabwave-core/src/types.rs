//! Common types used throughout Tabwave

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique identifier for a tab
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct TabId(pub u64);

impl fmt::Display for TabId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for TabId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

/// What the address bar and tab strip show for a tab.
///
/// `Explicit` is a transient override (e.g. the text typed into the
/// address bar); it is cleared once a real page title arrives or the tab
/// jumps through its history. Persisted as a nullable string.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "Option<String>", into = "Option<String>")]
pub enum Label {
    /// Use the tab's url
    #[default]
    Url,
    /// Show this text instead of the url
    Explicit(String),
}

impl Label {
    pub fn explicit(text: impl Into<String>) -> Self {
        Self::Explicit(text.into())
    }

    pub fn as_override(&self) -> Option<&str> {
        match self {
            Self::Url => None,
            Self::Explicit(text) => Some(text),
        }
    }

    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit(_))
    }
}

impl From<Option<String>> for Label {
    fn from(value: Option<String>) -> Self {
        match value {
            Some(text) => Self::Explicit(text),
            None => Self::Url,
        }
    }
}

impl From<Label> for Option<String> {
    fn from(label: Label) -> Self {
        match label {
            Label::Url => None,
            Label::Explicit(text) => Some(text),
        }
    }
}

/// A browser tab and its navigation stack
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Tab {
    pub id: TabId,
    /// Current address; always equal to `history[idx]`
    pub url: String,
    #[serde(default)]
    pub display: Label,
    /// Last known page title
    pub title: String,
    pub history: Vec<String>,
    pub idx: usize,
}

impl Tab {
    /// A fresh tab whose only history entry is `url`
    pub fn new(id: TabId, url: String, display: Label) -> Self {
        Self {
            id,
            title: url.clone(),
            history: vec![url.clone()],
            url,
            display,
            idx: 0,
        }
    }

    pub fn can_go_back(&self) -> bool {
        self.idx > 0
    }

    pub fn can_go_forward(&self) -> bool {
        self.idx + 1 < self.history.len()
    }

    /// Text for the tab strip: override, then title, then url
    pub fn label(&self) -> &str {
        if let Some(text) = self.display.as_override() {
            return text;
        }
        if self.title.is_empty() {
            &self.url
        } else {
            &self.title
        }
    }

    /// Text for the address bar: override, then url
    pub fn address(&self) -> &str {
        self.display.as_override().unwrap_or(&self.url)
    }
}

/// Global history record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub url: String,
    /// Milliseconds since the Unix epoch
    pub timestamp: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_tab_history() {
        let tab = Tab::new(TabId(1), "https://a.test/".into(), Label::Url);
        assert_eq!(tab.history, vec!["https://a.test/".to_string()]);
        assert_eq!(tab.idx, 0);
        assert!(!tab.can_go_back());
        assert!(!tab.can_go_forward());
    }

    #[test]
    fn test_label_precedence() {
        let mut tab = Tab::new(TabId(1), "https://a.test/".into(), Label::explicit("cats"));
        assert_eq!(tab.label(), "cats");
        assert_eq!(tab.address(), "cats");

        tab.display = Label::Url;
        tab.title = "Cat Facts".into();
        assert_eq!(tab.label(), "Cat Facts");
        assert_eq!(tab.address(), "https://a.test/");

        tab.title.clear();
        assert_eq!(tab.label(), "https://a.test/");
    }

    #[test]
    fn test_label_serializes_as_nullable_string() {
        let tab = Tab::new(TabId(7), "https://a.test/".into(), Label::Url);
        let json = serde_json::to_value(&tab).unwrap();
        assert_eq!(json["display"], serde_json::Value::Null);
        assert_eq!(json["id"], 7);

        let labelled = Tab {
            display: Label::explicit("typed"),
            ..tab
        };
        let json = serde_json::to_value(&labelled).unwrap();
        assert_eq!(json["display"], "typed");

        let back: Tab = serde_json::from_value(json).unwrap();
        assert_eq!(back.display, Label::explicit("typed"));
    }

    #[test]
    fn test_tab_id_parse() {
        assert_eq!(" 42 ".parse::<TabId>().unwrap(), TabId(42));
        assert!("x".parse::<TabId>().is_err());
    }
}
