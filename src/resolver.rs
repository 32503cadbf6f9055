//! Dependency identifier resolution against the load path.
//!
//! Identifiers are bare module names (`opal/hello`, `./greeter`), never
//! filesystem paths. Resolution walks an ordered list of load-path roots and
//! tries the Ruby extension before the JavaScript one, so a same-language
//! file shadows a native one of the same name. A handful of builtin names
//! fall back to the compiler artifact itself when no root provides them.

use std::path::{Path, PathBuf};

use tracing::trace;

use crate::error::{BridgeError, Result};
use crate::stubs::without_leading_relative;

/// Result of resolving one dependency identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Resolved {
    /// A file on one of the load-path roots.
    File {
        /// Canonical absolute path, for addressing the file on this machine.
        absolute: PathBuf,
        /// Path relative to the source root, for names that survive into
        /// generated output.
        relative: String,
    },
    /// A builtin satisfied by the active compiler artifact.
    CompilerSupport { absolute: PathBuf },
}

/// Names the compiler artifact itself satisfies when no load path provides
/// them. The runtime halves of these ship inside the artifact.
pub const BUILTIN_IDENTIFIERS: &[&str] = &["opal", "opal/mini", "opal/full"];

/// True when `identifier` names compiler-provided support code.
pub fn is_builtin(identifier: &str) -> bool {
    BUILTIN_IDENTIFIERS.contains(&without_leading_relative(identifier))
}

/// Searches an ordered list of load-path roots for dependency identifiers.
///
/// The root list is fixed at construction; earlier roots shadow later ones.
#[derive(Debug, Clone)]
pub struct Resolver {
    roots: Vec<PathBuf>,
    artifact: PathBuf,
}

impl Resolver {
    /// Resolver over `roots` in order, with `artifact` answering builtins.
    pub fn new(roots: Vec<PathBuf>, artifact: impl Into<PathBuf>) -> Self {
        Self {
            roots,
            artifact: artifact.into(),
        }
    }

    /// The roots this resolver searches, in search order.
    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Resolve `identifier` to a concrete location.
    ///
    /// A leading `./` is equivalent to the bare name. Identifiers with an
    /// explicit `.rb` or `.js` extension are matched verbatim; anything else
    /// tries `.rb` then `.js` under each root in turn. Builtins resolve to
    /// the compiler artifact only after every root has missed.
    pub fn resolve(&self, identifier: &str, source_root: &Path) -> Result<Resolved> {
        let canonical = without_leading_relative(identifier);

        for root in &self.roots {
            for candidate in candidate_names(canonical) {
                let path = root.join(&candidate);
                if path.is_file() {
                    let absolute = path.canonicalize().unwrap_or(path);
                    let relative = relative_to_root(&absolute, source_root);
                    trace!("resolved {identifier} to {}", absolute.display());
                    return Ok(Resolved::File { absolute, relative });
                }
            }
        }

        if is_builtin(canonical) {
            trace!("resolved {identifier} to the compiler artifact");
            return Ok(Resolved::CompilerSupport {
                absolute: self.artifact.clone(),
            });
        }

        Err(BridgeError::resolution(identifier, &self.roots))
    }
}

fn candidate_names(canonical: &str) -> Vec<String> {
    if canonical.ends_with(".rb") || canonical.ends_with(".js") {
        vec![canonical.to_string()]
    } else {
        vec![format!("{canonical}.rb"), format!("{canonical}.js")]
    }
}

/// Express `absolute` relative to `source_root`, with forward slashes
/// whatever the platform. Falls back to the absolute spelling when the two
/// share no prefix.
pub fn relative_to_root(absolute: &Path, source_root: &Path) -> String {
    let source_root = source_root
        .canonicalize()
        .unwrap_or_else(|_| source_root.to_path_buf());
    match pathdiff::diff_paths(absolute, &source_root) {
        Some(relative) => relative.to_string_lossy().replace('\\', "/"),
        None => absolute.to_string_lossy().replace('\\', "/"),
    }
}

#[cfg(test)]
mod tests {
    use std::fs;

    use tempfile::TempDir;

    use super::*;

    fn root_with(files: &[&str]) -> TempDir {
        let dir = tempfile::tempdir().unwrap();
        for file in files {
            let path = dir.path().join(file);
            fs::create_dir_all(path.parent().unwrap()).unwrap();
            fs::write(&path, "").unwrap();
        }
        dir
    }

    fn artifact() -> PathBuf {
        PathBuf::from("/cache/opal-compiler-v1.0.0.js")
    }

    #[test]
    fn test_resolves_bare_name_to_ruby_file() {
        let root = root_with(&["greeter.rb"]);
        let resolver = Resolver::new(vec![root.path().to_path_buf()], artifact());

        let resolved = resolver.resolve("greeter", root.path()).unwrap();
        match resolved {
            Resolved::File { absolute, relative } => {
                assert_eq!(absolute, root.path().join("greeter.rb").canonicalize().unwrap());
                assert_eq!(relative, "greeter.rb");
            }
            other => panic!("expected a file, got {other:?}"),
        }
    }

    #[test]
    fn test_leading_relative_marker_is_equivalent() {
        let root = root_with(&["greeter.rb"]);
        let resolver = Resolver::new(vec![root.path().to_path_buf()], artifact());

        let bare = resolver.resolve("greeter", root.path()).unwrap();
        let marked = resolver.resolve("./greeter", root.path()).unwrap();
        assert_eq!(bare, marked);
    }

    #[test]
    fn test_ruby_shadows_javascript_for_bare_names() {
        let root = root_with(&["both.rb", "both.js"]);
        let resolver = Resolver::new(vec![root.path().to_path_buf()], artifact());

        match resolver.resolve("both", root.path()).unwrap() {
            Resolved::File { absolute, .. } => {
                assert_eq!(absolute.extension().unwrap(), "rb");
            }
            other => panic!("expected a file, got {other:?}"),
        }
    }

    #[test]
    fn test_explicit_extension_matches_verbatim() {
        let root = root_with(&["both.rb", "both.js"]);
        let resolver = Resolver::new(vec![root.path().to_path_buf()], artifact());

        match resolver.resolve("both.js", root.path()).unwrap() {
            Resolved::File { absolute, .. } => {
                assert_eq!(absolute.extension().unwrap(), "js");
            }
            other => panic!("expected a file, got {other:?}"),
        }
    }

    #[test]
    fn test_earlier_roots_shadow_later_ones() {
        let first = root_with(&["shared.rb"]);
        let second = root_with(&["shared.rb"]);
        let resolver = Resolver::new(
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
            artifact(),
        );

        match resolver.resolve("shared", first.path()).unwrap() {
            Resolved::File { absolute, .. } => {
                assert!(absolute.starts_with(first.path().canonicalize().unwrap()));
            }
            other => panic!("expected a file, got {other:?}"),
        }
    }

    #[test]
    fn test_builtin_falls_back_to_compiler_artifact() {
        let root = root_with(&["greeter.rb"]);
        let resolver = Resolver::new(vec![root.path().to_path_buf()], artifact());

        for name in ["opal", "./opal", "opal/mini", "opal/full"] {
            let resolved = resolver.resolve(name, root.path()).unwrap();
            assert_eq!(
                resolved,
                Resolved::CompilerSupport {
                    absolute: artifact()
                }
            );
        }
    }

    #[test]
    fn test_load_path_shadows_builtin() {
        let root = root_with(&["opal.rb"]);
        let resolver = Resolver::new(vec![root.path().to_path_buf()], artifact());

        match resolver.resolve("opal", root.path()).unwrap() {
            Resolved::File { relative, .. } => assert_eq!(relative, "opal.rb"),
            other => panic!("expected a file, got {other:?}"),
        }
    }

    #[test]
    fn test_nested_identifier_resolves_under_root() {
        let root = root_with(&["opal/hello.rb"]);
        let resolver = Resolver::new(vec![root.path().to_path_buf()], artifact());

        match resolver.resolve("opal/hello", root.path()).unwrap() {
            Resolved::File { relative, .. } => assert_eq!(relative, "opal/hello.rb"),
            other => panic!("expected a file, got {other:?}"),
        }
    }

    #[test]
    fn test_miss_reports_identifier_and_roots_in_order() {
        let first = root_with(&[]);
        let second = root_with(&[]);
        let resolver = Resolver::new(
            vec![first.path().to_path_buf(), second.path().to_path_buf()],
            artifact(),
        );

        let err = resolver.resolve("not_found.rb", first.path()).unwrap_err();
        let message = err.to_string();
        let expected = format!(
            "Cannot find file - not_found.rb in load path {},{}",
            first.path().display(),
            second.path().display()
        );
        assert_eq!(message, expected);
    }

    #[test]
    fn test_directory_is_not_a_resolution() {
        let root = root_with(&["views/index.rb"]);
        let resolver = Resolver::new(vec![root.path().to_path_buf()], artifact());

        let err = resolver.resolve("views", root.path()).unwrap_err();
        assert!(err.is_resolution());
    }
}
