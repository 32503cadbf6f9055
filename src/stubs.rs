//! Stub matching for dependencies that are intentionally unavailable.
//!
//! A stub names a module the bundled output must not try to load: server-only
//! gems, native extensions, anything satisfied elsewhere at runtime. A stubbed
//! dependency is declared as an empty module inline and the filesystem is
//! never consulted for it, so stubs also act as an escape hatch for references
//! that would otherwise fail resolution.

/// Strip one leading explicit-relative marker from an identifier.
///
/// `./foo` and `foo` name the same module; only a single marker is removed,
/// so `././foo` stays `./foo`.
pub fn without_leading_relative(identifier: &str) -> &str {
    identifier.strip_prefix("./").unwrap_or(identifier)
}

/// Match `identifier` against the configured stub names.
///
/// Matching compares the canonical form on both sides. Returns the matched
/// stub name so the caller can declare the placeholder under the name the
/// runtime will look up.
pub fn match_stub<'a>(stubs: &'a [String], identifier: &str) -> Option<&'a str> {
    let canonical = without_leading_relative(identifier);
    stubs
        .iter()
        .find(|stub| without_leading_relative(stub) == canonical)
        .map(String::as_str)
}
