//! Version-keyed cache of compiled compiler artifacts.
//!
//! Running Ruby in the bundler means running the compiler itself as
//! JavaScript. The artifact is the compiler compiled by itself, built once
//! per installed compiler version and reused from disk after that. Explicit
//! artifact paths bypass the cache entirely.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::config::{BridgeConfig, CompilerSource};
use crate::error::{BridgeError, Result};
use crate::host;

/// Entry source compiled into the artifact. Kept as a real file so it can be
/// edited and reviewed like any other source.
const COMPILER_ENTRY: &str = include_str!("../runner/compiler.rb");

/// Stores compiled compiler artifacts, one file per compiler version.
#[derive(Debug, Clone)]
pub struct ArtifactCache {
    cache_dir: PathBuf,
}

impl ArtifactCache {
    pub fn new(cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            cache_dir: cache_dir.into(),
        }
    }

    pub fn cache_dir(&self) -> &Path {
        &self.cache_dir
    }

    /// Resolve the compiler artifact for `config`.
    ///
    /// An explicit artifact path is validated and returned canonicalized, so
    /// later is-this-the-compiler comparisons are not fooled by spelling. The
    /// host toolchain source builds one artifact per installed version and
    /// reuses it until [`invalidate`](Self::invalidate).
    pub fn resolve(&self, config: &BridgeConfig) -> Result<PathBuf> {
        match &config.compiler {
            CompilerSource::File(path) => {
                if !path.is_file() {
                    return Err(BridgeError::CompilerUnavailable(path.clone()));
                }
                Ok(path.canonicalize().unwrap_or_else(|_| path.clone()))
            }
            CompilerSource::HostToolchain => self.ensure_built(config),
        }
    }

    /// Drop every cached artifact. The next resolve rebuilds from the host
    /// toolchain.
    pub fn invalidate(&self) -> Result<()> {
        if self.cache_dir.exists() {
            fs::remove_dir_all(&self.cache_dir)?;
        }
        Ok(())
    }

    fn ensure_built(&self, config: &BridgeConfig) -> Result<PathBuf> {
        let version = host::opal_version(config)?;
        let path = self.versioned_path(&version);
        if path.is_file() {
            debug!("using cached compiler artifact {}", path.display());
            return Ok(path);
        }

        info!("compiler artifact for Opal {version} not cached, building it");
        let mut command =
            host::bundler_command(config, "opal", &["--no-exit", "-c", "-e", COMPILER_ENTRY]);
        let compiled = host::capture_stdout("opal -c", &mut command)?;

        fs::create_dir_all(&self.cache_dir)?;
        fs::write(&path, compiled)?;
        info!("compiler artifact written to {}", path.display());
        Ok(path)
    }

    fn versioned_path(&self, version: &str) -> PathBuf {
        self.cache_dir.join(format!("opal-compiler-v{version}.js"))
    }
}
