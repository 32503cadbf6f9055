//! Error types for the bridge.

use std::path::PathBuf;

use thiserror::Error;

/// Errors that can occur while transpiling a unit or preparing the toolchain.
#[derive(Error, Debug)]
pub enum BridgeError {
    /// A dependency identifier matched no file on any load-path root.
    #[error("Cannot find file - {identifier} in load path {}", join_roots(.search_roots))]
    Resolution {
        identifier: String,
        search_roots: Vec<PathBuf>,
    },

    /// The compiler rejected the source. The message is the compiler's own,
    /// with its phase and backtrace context intact.
    #[error("{0}")]
    Compile(String),

    /// A directory named by a require-tree directive could not be listed.
    #[error("Cannot expand require_tree directory {}: {source}", .dir.display())]
    DirectoryExpansion {
        dir: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The configured compiler artifact does not exist.
    #[error("Compiler artifact not found: {}", .0.display())]
    CompilerUnavailable(PathBuf),

    /// A host toolchain command (opal, bundle, rails) failed.
    #[error("Command failed: {command}: {detail}")]
    Host { command: String, detail: String },

    /// The runner replied with something other than the expected JSON shape.
    #[error("Unexpected compiler reply: {0}")]
    CompilerProtocol(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON serialization/deserialization error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

fn join_roots(roots: &[PathBuf]) -> String {
    roots
        .iter()
        .map(|root| root.display().to_string())
        .collect::<Vec<_>>()
        .join(",")
}

/// Result type alias using [`BridgeError`].
pub type Result<T> = std::result::Result<T, BridgeError>;

impl BridgeError {
    /// Resolution failure for `identifier` after searching `roots` in order.
    pub fn resolution(identifier: impl Into<String>, roots: &[PathBuf]) -> Self {
        Self::Resolution {
            identifier: identifier.into(),
            search_roots: roots.to_vec(),
        }
    }

    /// Failure of a host toolchain command, with the command named so the
    /// caller can tell bundler problems from rails problems.
    pub fn host(command: impl Into<String>, detail: impl Into<String>) -> Self {
        Self::Host {
            command: command.into(),
            detail: detail.into(),
        }
    }

    /// True when this error means the identifier was not found, as opposed to
    /// the search itself failing.
    pub fn is_resolution(&self) -> bool {
        matches!(self, Self::Resolution { .. })
    }
}
