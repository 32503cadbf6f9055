//! The transpile orchestrator.
//!
//! Ties the pieces together for one unit: run the external compiler, rewrite
//! every dependency directive it reports, prepend the results to the
//! generated code and shift the source map to match.

use std::path::{Path, PathBuf};

use tracing::{debug, info, instrument};

use crate::artifact::ArtifactCache;
use crate::compiler::{Compiler, NodeCompiler};
use crate::config::BridgeConfig;
use crate::error::Result;
use crate::host;
use crate::options::{CompileOptions, LoaderContext};
use crate::resolver::Resolver;
use crate::rewrite::{classify, render};
use crate::source_map::SourceMap;
use crate::tree;

/// First line of every generated unit. The runtime probes `process` to
/// detect Node, and under a bundler the probe must see an undefined binding
/// rather than the bundler's shim.
const BOOTSTRAP: &str = "process = undefined;";

/// One transpiled unit.
#[derive(Debug, Clone)]
pub struct Transpiled {
    /// Generated JavaScript: the bootstrap line, one line per rewritten
    /// dependency, then the compiler output.
    pub code: String,
    /// Source map matching `code`, when one was requested and the compiler
    /// produced one.
    pub map: Option<SourceMap>,
}

/// Drives compile units end to end.
///
/// Construction is where all ambient state is gathered: the compiler
/// artifact is resolved (and built if missing), host discovery runs at most
/// once, and the load-path roots are fixed. After that every
/// [`transpile`](Self::transpile) call is a pure function of its inputs.
pub struct Bridge<C> {
    compiler: C,
    resolver: Resolver,
    artifact: PathBuf,
    host_stubs: Vec<String>,
}

impl Bridge<NodeCompiler> {
    /// Production bridge: resolve the compiler artifact per `config`,
    /// building and caching one if needed, and run it under Node.
    pub fn new(config: BridgeConfig) -> Result<Self> {
        let artifact = ArtifactCache::new(&config.cache_dir).resolve(&config)?;
        let compiler = NodeCompiler::new(&artifact);
        Self::with_compiler(config, artifact, compiler)
    }
}

impl<C: Compiler> Bridge<C> {
    /// Bridge around an explicit artifact and compiler implementation.
    /// `config` still drives load paths and host discovery.
    pub fn with_compiler(config: BridgeConfig, artifact: PathBuf, compiler: C) -> Result<Self> {
        let artifact = artifact.canonicalize().unwrap_or(artifact);

        let mut roots = config.load_paths.clone();
        let mut host_stubs = Vec::new();
        if config.use_host_paths {
            let report = host::discover(&config)?;
            info!(
                "host discovery added {} load paths and {} stubs",
                report.paths.len(),
                report.stubs.len()
            );
            roots.extend(report.paths);
            host_stubs = report.stubs;
        }

        let resolver = Resolver::new(roots, artifact.clone());
        Ok(Self {
            compiler,
            resolver,
            artifact,
            host_stubs,
        })
    }

    /// The resolver this bridge rewrites against.
    pub fn resolver(&self) -> &Resolver {
        &self.resolver
    }

    /// The active compiler artifact.
    pub fn artifact(&self) -> &Path {
        &self.artifact
    }

    /// Transpile one unit.
    ///
    /// The compiler artifact itself passes through with only the bootstrap
    /// line added: it is already JavaScript, and the compiler's own
    /// dependencies are bundled inside it.
    #[instrument(skip(self, source, options, context), fields(file = %options.relative_file_name))]
    pub fn transpile(
        &self,
        source: &str,
        options: &CompileOptions,
        context: &LoaderContext,
    ) -> Result<Transpiled> {
        let mut lines = vec![BOOTSTRAP.to_string()];

        if self.is_artifact(&options.filename) {
            debug!("compiler artifact passes through untouched");
            return Ok(Transpiled {
                code: assemble(&lines, source),
                map: None,
            });
        }

        let compilation = self.compiler.compile(source, options)?;
        let stubs = self.merged_stubs(options);

        for identifier in &compilation.requires {
            let rewrite = classify(identifier, &stubs, &self.resolver, options)?;
            lines.push(render(&rewrite, context, options));
        }
        for directory in &compilation.required_trees {
            for identifier in tree::expand(directory, &options.filename)? {
                let rewrite = classify(&identifier, &stubs, &self.resolver, options)?;
                lines.push(render(&rewrite, context, options));
            }
        }

        debug!("prepending {} lines", lines.len());
        let map = if options.source_map {
            compilation
                .map
                .map(|map| map.shifted_by(lines.len()).with_source_content(source))
        } else {
            None
        };
        let code = assemble(&lines, &compilation.code);
        Ok(Transpiled { code, map })
    }

    /// Unit stubs plus whatever gem-declared stubs host discovery reported.
    fn merged_stubs(&self, options: &CompileOptions) -> Vec<String> {
        let mut stubs = options.stubs.clone();
        stubs.extend(self.host_stubs.iter().cloned());
        stubs
    }

    fn is_artifact(&self, filename: &Path) -> bool {
        match filename.canonicalize() {
            Ok(canonical) => canonical == self.artifact,
            Err(_) => filename == self.artifact,
        }
    }
}

fn assemble(lines: &[String], code: &str) -> String {
    let prepended: usize = lines.iter().map(|line| line.len() + 1).sum();
    let mut assembled = String::with_capacity(prepended + code.len());
    for line in lines {
        assembled.push_str(line);
        assembled.push('\n');
    }
    assembled.push_str(code);
    assembled
}
