//! Rewriting dependency references into bundler requests.
//!
//! Every directive the compiler reports becomes exactly one JavaScript line
//! prepended to the generated unit. Classification decides which kind of
//! line; rendering produces the text. The classification is an enum rather
//! than an if-chain so the decision can be asserted on without string
//! matching.

use std::path::PathBuf;

use serde_json::Value;

use crate::error::Result;
use crate::options::{CompileOptions, LoaderContext};
use crate::resolver::{Resolved, Resolver, is_builtin};
use crate::stubs::{match_stub, without_leading_relative};

/// How one dependency reference is rewritten.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RequireRewrite {
    /// Declared inline as an empty module; the filesystem is never consulted.
    Stub { name: String },
    /// Plain require of native JavaScript, loaded by the bundler without
    /// another pass through the bridge.
    NativeImport { absolute: PathBuf },
    /// Loader-mediated request that routes the file back through the bridge
    /// with options rebuilt from the query string.
    LoaderRequest {
        identifier: String,
        absolute: PathBuf,
        requirable: bool,
    },
}

/// Option keys that never flow into nested loader queries. They are either
/// per-file (the target computes its own) or machine-specific, and the
/// bridge-owned `file` and `requirable` are appended fresh.
const RESERVED_QUERY_KEYS: &[&str] = &[
    "sourceRoot",
    "filename",
    "sourceMap",
    "relativeFileName",
    "stubs",
    "file",
    "requirable",
];

/// Classify one dependency reference.
///
/// Stubs are checked before resolution, so a stubbed name never touches the
/// filesystem and never fails resolution. Loader requests carry the
/// canonical identifier, with any leading `./` stripped, so the `file` query
/// value round-trips to the canonical name after percent-decoding. Builtin
/// names stay unregistrable even when a load path provides a real file for
/// them, because the runtime half inside the artifact has already run by the
/// time it would matter.
pub fn classify(
    identifier: &str,
    stubs: &[String],
    resolver: &Resolver,
    options: &CompileOptions,
) -> Result<RequireRewrite> {
    if let Some(name) = match_stub(stubs, identifier) {
        return Ok(RequireRewrite::Stub {
            name: name.to_string(),
        });
    }

    let canonical = without_leading_relative(identifier);
    match resolver.resolve(identifier, &options.source_root)? {
        Resolved::CompilerSupport { absolute } => Ok(RequireRewrite::LoaderRequest {
            identifier: canonical.to_string(),
            absolute,
            requirable: false,
        }),
        Resolved::File { absolute, .. } => {
            if absolute.extension().and_then(|ext| ext.to_str()) == Some("js") {
                Ok(RequireRewrite::NativeImport { absolute })
            } else {
                Ok(RequireRewrite::LoaderRequest {
                    identifier: canonical.to_string(),
                    absolute,
                    requirable: !is_builtin(canonical),
                })
            }
        }
    }
}

/// Render one rewrite as a line of JavaScript.
pub fn render(rewrite: &RequireRewrite, context: &LoaderContext, options: &CompileOptions) -> String {
    match rewrite {
        RequireRewrite::Stub { name } => {
            format!("Opal.modules[\"{name}\"] = function() {{}};")
        }
        RequireRewrite::NativeImport { absolute } => {
            format!("require('{}');", absolute.display())
        }
        RequireRewrite::LoaderRequest {
            identifier,
            absolute,
            requirable,
        } => {
            let query = loader_query(options, identifier, *requirable);
            format!(
                "require('!!{}?{}!{}');",
                context.loader_path,
                query,
                absolute.display()
            )
        }
    }
}

/// Query string for a nested loader request: passthrough flags in sorted key
/// order, then `file` and `requirable` for the target.
fn loader_query(options: &CompileOptions, identifier: &str, requirable: bool) -> String {
    let mut pairs: Vec<String> = Vec::new();
    for (key, value) in &options.flags {
        if RESERVED_QUERY_KEYS.contains(&key.as_str()) {
            continue;
        }
        pairs.push(format!(
            "{}={}",
            urlencoding::encode(key),
            urlencoding::encode(&flag_text(value))
        ));
    }
    pairs.push(format!("file={}", urlencoding::encode(identifier)));
    pairs.push(format!("requirable={requirable}"));
    pairs.join("&")
}

/// Strings go in bare; everything else uses its JSON spelling, so `true`
/// stays `true` and not `"true"` double-quoted.
fn flag_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}
