//! CLI argument parsing for the bridge binary.

use std::path::PathBuf;

use clap::Parser;
use serde_json::Value;

/// opal-bridge - transpile one Ruby file for a webpack-style bundler
#[derive(Parser, Debug)]
#[command(name = "opal-bridge")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Ruby file to transpile
    pub file: PathBuf,

    /// Root directory relative names are expressed against (default: cwd)
    #[arg(long)]
    pub source_root: Option<PathBuf>,

    /// Loader path embedded in generated nested requests
    #[arg(long, default_value = "opal-bridge")]
    pub loader_path: String,

    /// Register the unit in the module table instead of running it on load
    #[arg(long)]
    pub requirable: bool,

    /// Module-table name override
    #[arg(long)]
    pub module_name: Option<String>,

    /// Declare an identifier as a stub (repeatable)
    #[arg(long = "stub", value_name = "NAME")]
    pub stubs: Vec<String>,

    /// Emit a source map alongside the code
    #[arg(long)]
    pub source_map: bool,

    /// Extra load-path root, searched before discovered ones (repeatable)
    #[arg(long = "load-path", value_name = "DIR")]
    pub load_paths: Vec<PathBuf>,

    /// Use this compiled compiler artifact instead of building one
    #[arg(long, env = "OPAL_COMPILER_PATH")]
    pub compiler: Option<PathBuf>,

    /// Build the compiler from the host toolchain and ask Bundler for paths
    #[arg(long)]
    pub use_bundler: bool,

    /// Compiler flag as key=value, forwarded to the compiler and into
    /// nested requests (repeatable)
    #[arg(long = "flag", value_name = "KEY=VALUE")]
    pub flags: Vec<String>,
}

/// Parse one `--flag` argument. The value is taken as JSON when it parses
/// as JSON, so `--flag arity_check=true` is a boolean, and as a plain
/// string otherwise. A bare key means `true`.
pub fn parse_flag(flag: &str) -> (String, Value) {
    match flag.split_once('=') {
        Some((key, value)) => {
            let parsed = serde_json::from_str(value)
                .unwrap_or_else(|_| Value::String(value.to_string()));
            (key.to_string(), parsed)
        }
        None => (flag.to_string(), Value::Bool(true)),
    }
}
