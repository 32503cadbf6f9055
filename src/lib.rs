//! # opal-bridge
//!
//! A build-time bridge between the Opal Ruby-to-JavaScript compiler and
//! webpack-style bundlers.
//!
//! The bridge compiles one Ruby unit at a time with the external compiler,
//! then rewrites each dependency directive the compiler reports into a line
//! of JavaScript the bundler understands:
//!
//! - Ruby dependencies become loader-mediated requests, so the bundler
//!   routes them back through the bridge and the dependency graph stays
//!   accurate for watch mode and caching.
//! - JavaScript dependencies become plain `require` calls.
//! - Stubbed dependencies become empty inline module declarations.
//! - Require-tree directives expand to one request per contained file.
//!
//! Rewritten lines are prepended to the generated code behind a one-line
//! bootstrap, and the source map is shifted down by the same number of lines
//! so debuggers keep pointing at the original Ruby.
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use opal_bridge::{Bridge, BridgeConfig, CompileOptions, LoaderContext};
//!
//! fn main() -> opal_bridge::Result<()> {
//!     let bridge = Bridge::new(BridgeConfig::from_env())?;
//!     let options = CompileOptions::new("/app/opal/greeter.rb", "greeter.rb", "/app/opal");
//!     let context = LoaderContext::new("opal-bridge");
//!     let out = bridge.transpile("puts 'hi'", &options, &context)?;
//!     println!("{}", out.code);
//!     Ok(())
//! }
//! ```
//!
//! The compiler itself runs from a compiled artifact under Node. Point the
//! bridge at an existing artifact with [`CompilerSource::File`], or let it
//! build one from the host Ruby toolchain and cache it per compiler version.

pub mod artifact;
pub mod compiler;
pub mod config;
pub mod error;
pub mod host;
pub mod options;
pub mod resolver;
pub mod rewrite;
pub mod source_map;
pub mod stubs;
pub mod transpile;
pub mod tree;

pub use artifact::ArtifactCache;
pub use compiler::{Compilation, Compiler, NodeCompiler};
pub use config::{BridgeConfig, CompilerSource};
pub use error::{BridgeError, Result};
pub use options::{CompileOptions, LoaderContext};
pub use resolver::{Resolved, Resolver};
pub use rewrite::RequireRewrite;
pub use source_map::SourceMap;
pub use transpile::{Bridge, Transpiled};
