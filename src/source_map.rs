//! Source map model and the line shift applied after directives are prepended.

use serde::{Deserialize, Serialize};

/// A source map in the standard v3 JSON format.
///
/// Only the fields the compiler emits are modeled; unknown fields are
/// dropped on read. Field names follow the v3 spelling (`sourceRoot`,
/// `sourcesContent`) on the wire.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SourceMap {
    pub version: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub source_root: Option<String>,
    #[serde(default)]
    pub sources: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sources_content: Option<Vec<Option<String>>>,
    #[serde(default)]
    pub names: Vec<String>,
    #[serde(default)]
    pub mappings: String,
}

impl SourceMap {
    /// Merge this map into the coordinate space of output that gained
    /// `prepended_lines` lines before the generated code.
    ///
    /// In the v3 `mappings` string each `;` opens a new generated line, so
    /// prefixing one empty group per prepended line moves every mapped
    /// position down without touching columns, sources or names.
    pub fn shifted_by(mut self, prepended_lines: usize) -> Self {
        if prepended_lines == 0 {
            return self;
        }
        let mut mappings = String::with_capacity(prepended_lines + self.mappings.len());
        for _ in 0..prepended_lines {
            mappings.push(';');
        }
        mappings.push_str(&self.mappings);
        self.mappings = mappings;
        self
    }

    /// Embed the original source so debuggers need no filesystem access.
    ///
    /// Fills `sourcesContent` only when the compiler left it out and the map
    /// has the single source a compile unit produces.
    pub fn with_source_content(mut self, source: &str) -> Self {
        if self.sources_content.is_none() && self.sources.len() == 1 {
            self.sources_content = Some(vec![Some(source.to_string())]);
        }
        self
    }
}
