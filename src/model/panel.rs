//! Display-agnostic panel produced by the renderer.

use serde::{Deserialize, Serialize};

/// A titled group of already formatted display lines.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Section {
    pub title: String,
    pub lines: Vec<String>,
}

impl Section {
    pub fn new(title: impl Into<String>, lines: Vec<String>) -> Self {
        Self {
            title: title.into(),
            lines,
        }
    }

    /// Returns the line starting with `label` followed by `": "`, if any.
    pub fn line(&self, label: &str) -> Option<&str> {
        self.lines.iter().map(String::as_str).find(|line| {
            line.strip_prefix(label)
                .is_some_and(|rest| rest.starts_with(": "))
        })
    }
}

/// Ordered sections ready for any sink.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelModel {
    pub sections: Vec<Section>,
}

impl PanelModel {
    /// Finds a section by title.
    pub fn section(&self, title: &str) -> Option<&Section> {
        self.sections.iter().find(|s| s.title == title)
    }
}
