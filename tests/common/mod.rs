//! Shared helpers for the integration suite.

use std::path::{Path, PathBuf};

use opal_bridge::compiler::{Compilation, Compiler};
use opal_bridge::config::{BridgeConfig, CompilerSource};
use opal_bridge::error::Result;
use opal_bridge::options::{CompileOptions, LoaderContext};
use opal_bridge::source_map::SourceMap;
use opal_bridge::stubs::without_leading_relative;
use opal_bridge::transpile::Bridge;

/// Deterministic stand-in for the external compiler.
///
/// Understands just enough Ruby to drive the bridge: one `require`,
/// `require_relative` or `require_tree` per line, plus constant assignment.
/// Its output copies the real compiler's shape under the same options:
/// directives are reported but never resolved, code wraps in a module
/// function when the unit is requirable, the map appears only on request.
pub struct FixtureCompiler;

impl Compiler for FixtureCompiler {
    fn compile(&self, source: &str, options: &CompileOptions) -> Result<Compilation> {
        let mut requires = Vec::new();
        let mut required_trees = Vec::new();
        let mut body = Vec::new();

        for line in source.lines() {
            let line = line.trim();
            if let Some(name) = directive(line, "require_tree") {
                required_trees.push(without_leading_relative(&name).to_string());
                body.push(format!("self.$require_tree(\"{name}\");"));
            } else if let Some(name) = directive(line, "require_relative") {
                let resolved = relative_join(&options.relative_file_name, &name);
                body.push(format!("self.$require(\"{resolved}\");"));
                requires.push(resolved);
            } else if let Some(name) = directive(line, "require") {
                body.push(format!("self.$require(\"{name}\");"));
                requires.push(name);
            } else if let Some((name, value)) = constant(line) {
                body.push(format!("Opal.cdecl($scope, '{name}', {value});"));
            }
        }

        let inner = body.join("\n");
        let code = if options.requirable {
            format!(
                "Opal.modules[\"{}\"] = function() {{\n{inner}\n}};",
                options.module_table_name()
            )
        } else {
            inner
        };

        let map = options.source_map.then(|| SourceMap {
            version: 3,
            file: Some(options.relative_file_name.clone()),
            source_root: None,
            sources: vec![options.relative_file_name.clone()],
            sources_content: None,
            names: vec![],
            mappings: "AAAA;AACA".to_string(),
        });

        Ok(Compilation {
            code,
            requires,
            required_trees,
            map,
        })
    }
}

/// `require "name"` and friends, single or double quoted.
fn directive(line: &str, keyword: &str) -> Option<String> {
    let rest = line.strip_prefix(keyword)?.trim_start();
    let quote = rest.chars().next()?;
    if quote != '"' && quote != '\'' {
        return None;
    }
    let rest = &rest[1..];
    let end = rest.find(quote)?;
    Some(rest[..end].to_string())
}

/// `NAME = value` constant assignment.
fn constant(line: &str) -> Option<(String, String)> {
    let (name, value) = line.split_once('=')?;
    let name = name.trim();
    let value = value.trim();
    let shaped = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_uppercase() || c.is_ascii_digit() || c == '_');
    if !shaped || value.is_empty() {
        return None;
    }
    Some((name.to_string(), value.to_string()))
}

/// Join a require_relative target onto the directory of the requiring file,
/// the way the real compiler reports it.
fn relative_join(relative_file_name: &str, name: &str) -> String {
    let mut parts: Vec<&str> = relative_file_name.split('/').collect();
    parts.pop();
    for part in name.split('/') {
        match part {
            "." => {}
            ".." => {
                parts.pop();
            }
            other => parts.push(other),
        }
    }
    parts.join("/")
}

pub fn fixtures_dir() -> PathBuf {
    Path::new(env!("CARGO_MANIFEST_DIR")).join("tests/fixtures")
}

pub fn artifact_path() -> PathBuf {
    fixtures_dir().join("opal-compiler.js")
}

/// Fixture roots in order: the fixtures directory itself, then its nested
/// load_path directory.
pub fn test_config() -> BridgeConfig {
    BridgeConfig {
        compiler: CompilerSource::File(artifact_path()),
        load_paths: vec![fixtures_dir(), fixtures_dir().join("load_path")],
        ..BridgeConfig::default()
    }
}

pub fn fixture_bridge() -> Bridge<FixtureCompiler> {
    Bridge::with_compiler(test_config(), artifact_path(), FixtureCompiler).unwrap()
}

/// Options for a unit named `file_name` at the top of the fixtures tree.
pub fn doc_options(file_name: &str) -> CompileOptions {
    CompileOptions::new(fixtures_dir().join(file_name), file_name, fixtures_dir())
}

pub fn loader() -> LoaderContext {
    LoaderContext::new("the_loader_path")
}
