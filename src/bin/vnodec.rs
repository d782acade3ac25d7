//! `vnodec`: compile JSX sources into VNode construction calls.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{bail, Context, Result};
use clap::Parser;
use log::{error, info};
use rayon::prelude::*;
use serde::Serialize;

use vnode_compiler_native::cache::{IncrementalCache, DEFAULT_CACHE_DIR};
use vnode_compiler_native::discovery::{find_sources, output_path, SourceFile};
use vnode_compiler_native::{transform_source, CompileOptions, ImportsOption};

#[derive(Parser)]
#[command(name = "vnodec", about = "Compile JSX into VNode construction calls")]
struct Cli {
    /// Files or directories to compile
    #[arg(required = true)]
    paths: Vec<PathBuf>,
    /// Write outputs under this directory instead of next to the sources
    #[arg(short, long)]
    out_dir: Option<PathBuf>,
    /// JSON file with compile options
    #[arg(short, long)]
    config: Option<PathBuf>,
    /// Callee for element construction
    #[arg(long)]
    pragma: Option<String>,
    /// Read helpers from the global `Inferno` object instead of importing them
    #[arg(long)]
    no_imports: bool,
    /// Module the helpers are imported from
    #[arg(long, conflicts_with = "no_imports")]
    import_source: Option<String>,
    /// Write out every positional argument
    #[arg(long)]
    define_all_arguments: bool,
    /// Cache static subtrees inside functions in module-scope slots
    #[arg(long)]
    optimize_static: bool,
    /// Ignore and do not update the incremental cache
    #[arg(long)]
    no_cache: bool,
    /// Print a JSON report instead of log lines
    #[arg(long)]
    json: bool,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct FileReport {
    input: String,
    output: String,
    cached: bool,
    sites: usize,
    blueprints: usize,
}

fn load_options(cli: &Cli) -> Result<CompileOptions> {
    let mut options = match &cli.config {
        Some(path) => {
            let raw = fs::read_to_string(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            CompileOptions::from_json(&raw)
                .with_context(|| format!("invalid options in {}", path.display()))?
        }
        None => CompileOptions::default(),
    };

    if let Some(pragma) = &cli.pragma {
        options.pragma = Some(pragma.clone());
    }
    if cli.no_imports {
        options.imports = ImportsOption::Enabled(false);
    }
    if let Some(module) = &cli.import_source {
        options.imports = ImportsOption::Module(module.clone());
    }
    options.define_all_arguments |= cli.define_all_arguments;
    options.optimize_static_vnodes |= cli.optimize_static;
    Ok(options)
}

fn compile_file(
    file: &SourceFile,
    out_dir: Option<&Path>,
    options: &CompileOptions,
    cache: Option<&IncrementalCache>,
) -> Result<FileReport> {
    let input = file.path.to_string_lossy().to_string();
    let source =
        fs::read_to_string(&file.path).with_context(|| format!("failed to read {}", input))?;
    let out_path = output_path(file, out_dir);

    let (code, cached, sites, blueprints) = match cache.and_then(|c| c.get(&input, &source, options)) {
        Some(entry) => (entry.code, true, entry.sites, entry.blueprints),
        None => {
            let output = transform_source(&source, &input, options)?;
            if let Some(cache) = cache {
                cache.set(&input, &source, options, &output);
            }
            (output.code, false, output.sites, output.blueprints.len())
        }
    };

    if let Some(parent) = out_path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create {}", parent.display()))?;
        }
    }
    fs::write(&out_path, code).with_context(|| format!("failed to write {}", out_path.display()))?;

    Ok(FileReport {
        input,
        output: out_path.to_string_lossy().to_string(),
        cached,
        sites,
        blueprints,
    })
}

fn main() -> Result<()> {
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let options = load_options(&cli)?;

    let files = find_sources(&cli.paths);
    if files.is_empty() {
        bail!("no .jsx or .tsx files found");
    }

    let cache = if cli.no_cache {
        None
    } else {
        Some(IncrementalCache::new(DEFAULT_CACHE_DIR))
    };

    let results: Vec<(String, Result<FileReport>)> = files
        .par_iter()
        .map(|file| {
            let name = file.path.to_string_lossy().to_string();
            let result = compile_file(file, cli.out_dir.as_deref(), &options, cache.as_ref());
            (name, result)
        })
        .collect();

    let mut reports = Vec::with_capacity(results.len());
    let mut failures = 0;
    for (name, result) in results {
        match result {
            Ok(report) => {
                if !cli.json {
                    info!(
                        "{} -> {}{}",
                        report.input,
                        report.output,
                        if report.cached { " (cached)" } else { "" }
                    );
                }
                reports.push(report);
            }
            Err(e) => {
                error!("{}: {:#}", name, e);
                failures += 1;
            }
        }
    }

    if cli.json {
        println!("{}", serde_json::to_string_pretty(&reports)?);
    }

    if failures > 0 {
        bail!("{} of {} file(s) failed to compile", failures, files.len());
    }
    Ok(())
}
