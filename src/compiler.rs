//! The compiler boundary and its Node-backed implementation.
//!
//! The bridge never parses Ruby. It hands one unit at a time to the external
//! compiler and gets back code plus the dependency directives the compiler
//! found. [`Compiler`] is the seam: production uses [`NodeCompiler`], tests
//! substitute their own.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::debug;

use crate::error::{BridgeError, Result};
use crate::options::CompileOptions;
use crate::source_map::SourceMap;

/// One compiled unit as reported by the compiler.
#[derive(Debug, Clone, Default)]
pub struct Compilation {
    /// Generated JavaScript.
    pub code: String,
    /// Dependency identifiers, in declaration order.
    pub requires: Vec<String>,
    /// Directory identifiers from require-tree directives, in declaration
    /// order.
    pub required_trees: Vec<String>,
    /// Source map for `code`, when one was requested.
    pub map: Option<SourceMap>,
}

/// The external compiler, as seen from the bridge.
pub trait Compiler {
    /// Compile one unit. Dependency directives are reported, not resolved;
    /// resolution and rewriting stay on the bridge side of the seam.
    fn compile(&self, source: &str, options: &CompileOptions) -> Result<Compilation>;
}

/// Runner script executed with `node -e`. Kept as a real file so it can be
/// edited and reviewed like any other source.
const RUNNER: &str = include_str!("../runner/compile.js");

/// Request handed to the runner on stdin.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct RunnerRequest<'a> {
    source: &'a str,
    source_map: bool,
    options: BTreeMap<String, Value>,
}

/// Reply printed by the runner on stdout.
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RunnerReply {
    #[serde(default)]
    code: Option<String>,
    #[serde(default)]
    requires: Vec<String>,
    #[serde(default)]
    required_trees: Vec<String>,
    #[serde(default)]
    map: Option<SourceMap>,
    #[serde(default)]
    error: Option<RunnerError>,
}

#[derive(Debug, Deserialize)]
struct RunnerError {
    message: String,
}

/// Runs the compiled compiler artifact under Node.js, one process per unit.
#[derive(Debug, Clone)]
pub struct NodeCompiler {
    artifact: PathBuf,
}

impl NodeCompiler {
    pub fn new(artifact: impl Into<PathBuf>) -> Self {
        Self {
            artifact: artifact.into(),
        }
    }

    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    /// Compiler options for one unit: passthrough flags first, then the
    /// bridge-owned `file` and `requirable` keys, which win on collision.
    fn compiler_options(options: &CompileOptions) -> BTreeMap<String, Value> {
        let mut compiler_options = options.flags.clone();
        compiler_options.insert("requirable".to_string(), Value::Bool(options.requirable));
        compiler_options.insert(
            "file".to_string(),
            Value::String(options.module_table_name()),
        );
        compiler_options
    }
}

impl Compiler for NodeCompiler {
    fn compile(&self, source: &str, options: &CompileOptions) -> Result<Compilation> {
        let request = serde_json::to_vec(&RunnerRequest {
            source,
            source_map: options.source_map,
            options: Self::compiler_options(options),
        })?;

        debug!(
            "compiling {} with artifact {}",
            options.relative_file_name,
            self.artifact.display()
        );

        let mut child = Command::new("node")
            .arg("-e")
            .arg(RUNNER)
            .arg(&self.artifact)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|err| BridgeError::host("node", err.to_string()))?;

        if let Some(mut stdin) = child.stdin.take() {
            stdin.write_all(&request)?;
        }

        let output = child.wait_with_output()?;
        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            if stderr.is_empty() {
                return Err(BridgeError::CompilerProtocol(format!(
                    "runner exited with {}",
                    output.status
                )));
            }
            return Err(BridgeError::CompilerProtocol(stderr));
        }

        let reply: RunnerReply = serde_json::from_slice(&output.stdout).map_err(|err| {
            BridgeError::CompilerProtocol(format!("unparseable runner reply: {err}"))
        })?;
        reply.into_compilation()
    }
}

impl RunnerReply {
    fn into_compilation(self) -> Result<Compilation> {
        if let Some(error) = self.error {
            return Err(BridgeError::Compile(error.message));
        }
        let code = self.code.ok_or_else(|| {
            BridgeError::CompilerProtocol("runner reply carries neither code nor error".to_string())
        })?;
        Ok(Compilation {
            code,
            requires: self.requires,
            required_trees: self.required_trees,
            map: self.map,
        })
    }
}
