//! opal-bridge - build-time bridge between the Opal compiler and
//! webpack-style bundlers.
//!
//! This is the entry point for the opal-bridge binary. It transpiles one
//! file per invocation and prints a JSON object with the generated code and
//! optional source map, the shape loader shims expect on stdout.

use std::env;
use std::fs;
use std::process::ExitCode;

use clap::Parser;
use owo_colors::OwoColorize;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod cli;

use cli::Cli;
use opal_bridge::resolver::relative_to_root;
use opal_bridge::{Bridge, BridgeConfig, CompileOptions, CompilerSource, LoaderContext, Result};

fn main() -> ExitCode {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    match run(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("{} {err}", "error:".red().bold());
            ExitCode::FAILURE
        }
    }
}

fn run(cli: &Cli) -> Result<()> {
    let config = configure(cli);
    let bridge = Bridge::new(config)?;

    let source = fs::read_to_string(&cli.file)?;
    let filename = cli.file.canonicalize()?;
    let source_root = match &cli.source_root {
        Some(root) => root.clone(),
        None => env::current_dir()?,
    };
    let relative_file_name = relative_to_root(&filename, &source_root);

    let mut options = CompileOptions::new(filename, relative_file_name, source_root);
    options.requirable = cli.requirable;
    options.module_name = cli.module_name.clone();
    options.stubs = cli.stubs.clone();
    options.source_map = cli.source_map;
    for flag in &cli.flags {
        let (key, value) = cli::parse_flag(flag);
        options.flags.insert(key, value);
    }

    let context = LoaderContext::new(&cli.loader_path);
    let out = bridge.transpile(&source, &options, &context)?;

    let reply = serde_json::json!({ "code": out.code, "map": out.map });
    println!("{}", serde_json::to_string(&reply)?);
    Ok(())
}

/// Environment configuration with CLI switches layered on top.
fn configure(cli: &Cli) -> BridgeConfig {
    let mut config = BridgeConfig::from_env();
    if let Some(artifact) = &cli.compiler {
        config.compiler = CompilerSource::File(artifact.clone());
    }
    if cli.use_bundler {
        config.compiler = CompilerSource::HostToolchain;
        config.use_host_paths = true;
    }
    // Command-line roots are searched before environment-configured ones.
    let mut load_paths = cli.load_paths.clone();
    load_paths.extend(config.load_paths);
    config.load_paths = load_paths;
    config
}
