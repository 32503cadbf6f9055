//! Bridge configuration.
//!
//! Behavior that used to hide in ambient process state is collected here in
//! one explicit value. Production callers start from [`BridgeConfig::from_env`],
//! tests construct the struct directly.

use std::env;
use std::path::PathBuf;

/// Where the compiled compiler artifact comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CompilerSource {
    /// An already-compiled compiler bundle at this path.
    File(PathBuf),
    /// Build the artifact from the host Ruby toolchain (`opal`), cached per
    /// compiler version.
    HostToolchain,
}

/// Configuration for one bridge instance.
#[derive(Debug, Clone)]
pub struct BridgeConfig {
    /// Compiler artifact source.
    pub compiler: CompilerSource,
    /// Locally configured load-path roots, searched in order before any
    /// host-discovered ones.
    pub load_paths: Vec<PathBuf>,
    /// Ask the host package manager (Bundler) for additional load-path roots
    /// and gem-declared stubs.
    pub use_host_paths: bool,
    /// Run host discovery through `rails runner` in this environment instead
    /// of a plain Ruby process, so engines and the asset pipeline register
    /// their paths too.
    pub rails_env: Option<String>,
    /// Extra requires evaluated by the discovery script before paths are
    /// read, for gems that only register their paths when loaded.
    pub extra_requires: Vec<String>,
    /// The current process is already running under Bundler, so host
    /// commands need no `bundle exec` prefix.
    pub in_bundler: bool,
    /// Directory holding version-keyed compiler artifacts.
    pub cache_dir: PathBuf,
}

impl Default for BridgeConfig {
    fn default() -> Self {
        Self {
            compiler: CompilerSource::HostToolchain,
            load_paths: Vec::new(),
            use_host_paths: false,
            rails_env: None,
            extra_requires: Vec::new(),
            in_bundler: false,
            cache_dir: default_cache_dir(),
        }
    }
}

impl BridgeConfig {
    /// Read configuration from the process environment.
    ///
    /// | Variable             | Effect                                           |
    /// |----------------------|--------------------------------------------------|
    /// | `OPAL_COMPILER_PATH` | use this artifact instead of building one        |
    /// | `OPAL_USE_BUNDLER`   | build from the host toolchain, discover paths    |
    /// | `OPAL_LOAD_PATH`     | extra local roots, platform path-separated       |
    /// | `RAILS_ENV`          | run discovery through `rails runner`             |
    /// | `OPAL_MRI_REQUIRES`  | colon-separated requires for the discovery script|
    /// | `BUNDLE_BIN`         | process already runs under Bundler               |
    ///
    /// `OPAL_USE_BUNDLER` wins over `OPAL_COMPILER_PATH` when both are set.
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Ok(path) = env::var("OPAL_COMPILER_PATH") {
            if !path.is_empty() {
                config.compiler = CompilerSource::File(PathBuf::from(path));
            }
        }

        if env::var("OPAL_USE_BUNDLER").is_ok_and(|value| is_enabled(&value)) {
            config.compiler = CompilerSource::HostToolchain;
            config.use_host_paths = true;
        }

        if let Ok(paths) = env::var("OPAL_LOAD_PATH") {
            config.load_paths = env::split_paths(&paths).collect();
        }

        if let Ok(rails_env) = env::var("RAILS_ENV") {
            if !rails_env.is_empty() {
                config.rails_env = Some(rails_env);
            }
        }

        if let Ok(requires) = env::var("OPAL_MRI_REQUIRES") {
            config.extra_requires = requires
                .split(':')
                .filter(|name| !name.is_empty())
                .map(|name| name.to_string())
                .collect();
        }

        if env::var("BUNDLE_BIN").is_ok_and(|value| !value.is_empty()) {
            config.in_bundler = true;
        }

        config
    }
}

/// Switch-style variables accept `true` or `1`; anything else, including the
/// explicit `false` test environments set, leaves the switch off.
fn is_enabled(value: &str) -> bool {
    matches!(value, "true" | "1")
}

fn default_cache_dir() -> PathBuf {
    dirs::cache_dir()
        .unwrap_or_else(env::temp_dir)
        .join("opal-bridge")
}
