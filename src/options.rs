//! Per-unit compile options and the bundler context they run under.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde_json::Value;

/// Immutable description of one compile unit.
///
/// Everything the bridge needs to know about a single file: where it lives,
/// what it is called relative to the source root, and which compiler switches
/// apply to it. Constructed once per loader invocation and shared by the
/// resolver, the rewriter and the compiler boundary.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Absolute path of the file being transpiled.
    pub filename: PathBuf,
    /// Path of the file relative to [`source_root`](Self::source_root).
    /// Module names are derived from it so generated output never embeds
    /// build-machine absolute paths.
    pub relative_file_name: String,
    /// Root directory all relative names are expressed against.
    pub source_root: PathBuf,
    /// Register the unit in the runtime module table instead of running it
    /// immediately on load.
    pub requirable: bool,
    /// Identifiers satisfied with an empty placeholder module.
    pub stubs: Vec<String>,
    /// Emit a source map alongside the generated code.
    pub source_map: bool,
    /// Explicit module-table name, overriding the one derived from
    /// `relative_file_name`.
    pub module_name: Option<String>,
    /// Arbitrary compiler flags. Forwarded to the compiler and, except for
    /// per-file keys, propagated into nested loader requests.
    pub flags: BTreeMap<String, Value>,
}

impl CompileOptions {
    /// Options for `filename`, known as `relative_file_name` under
    /// `source_root`, with every switch at its default.
    pub fn new(
        filename: impl Into<PathBuf>,
        relative_file_name: impl Into<String>,
        source_root: impl Into<PathBuf>,
    ) -> Self {
        Self {
            filename: filename.into(),
            relative_file_name: relative_file_name.into(),
            source_root: source_root.into(),
            requirable: false,
            stubs: Vec::new(),
            source_map: false,
            module_name: None,
            flags: BTreeMap::new(),
        }
    }

    /// The name this unit registers under when it is requirable.
    ///
    /// Defaults to `relative_file_name` with a trailing `.rb` removed, so
    /// `app/models/user.rb` registers as `app/models/user`. An explicit
    /// `module_name` wins over the derived name.
    pub fn module_table_name(&self) -> String {
        if let Some(name) = &self.module_name {
            return name.clone();
        }
        self.relative_file_name
            .strip_suffix(".rb")
            .unwrap_or(&self.relative_file_name)
            .to_string()
    }
}

/// Bundling context for one loader invocation.
#[derive(Debug, Clone)]
pub struct LoaderContext {
    /// Loader path the bundler should route nested requests through,
    /// exactly as it must appear in the generated request strings.
    pub loader_path: String,
}

impl LoaderContext {
    pub fn new(loader_path: impl Into<String>) -> Self {
        Self {
            loader_path: loader_path.into(),
        }
    }
}
