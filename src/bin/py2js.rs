#![allow(clippy::print_stderr)]

use anyhow::{Context, Result};
use clap::Parser;
use rayon::prelude::*;
use std::fs;
use std::path::{Path, PathBuf};

use py2js_compiler::cache::IncrementalCache;
use py2js_compiler::discovery::{discover_sources, output_path};
use py2js_compiler::{
    compile_with_options, CompileOptions, CompilerError, ContextBinding, ErrorKind,
    TranslationUnit, UnitMode,
};

#[derive(Parser, Debug)]
#[command(name = "py2js")]
#[command(about = "Compile a restricted Python subset to JavaScript", long_about = None)]
struct Args {
    /// Python files or directories (scanned recursively for .py files)
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Context binding: inline JSON object, or a path to a JSON file
    #[arg(long)]
    context: Option<String>,

    /// Write one .js file per input here instead of printing to stdout
    #[arg(long)]
    out_dir: Option<PathBuf>,

    /// Translate only the body of the first function definition
    #[arg(long)]
    body: bool,

    /// Re-parse generated JavaScript and fail if it does not parse
    #[arg(long)]
    verify: bool,

    /// Spaces per indentation level
    #[arg(long, default_value_t = 4)]
    indent: usize,

    /// Directory for the incremental compile cache
    #[arg(long)]
    cache: Option<PathBuf>,

    /// Report diagnostics as JSON lines on stderr
    #[arg(long)]
    json: bool,
}

fn main() -> Result<()> {
    py2js_compiler::tracing_config::init_tracing();
    let args = Args::parse();

    let context_text = match &args.context {
        Some(inline) if inline.trim_start().starts_with('{') => Some(inline.clone()),
        Some(path) => Some(
            fs::read_to_string(path)
                .with_context(|| format!("failed to read context file {}", path))?,
        ),
        None => None,
    };
    let context = context_text
        .as_deref()
        .map(ContextBinding::from_json_str)
        .transpose()
        .map_err(|e| anyhow::anyhow!(e))?;

    let sources = discover_sources(&args.inputs).map_err(|e| anyhow::anyhow!(e))?;
    let cache = match &args.cache {
        Some(dir) => Some(
            IncrementalCache::new(dir)
                .with_context(|| format!("failed to create cache directory {}", dir.display()))?,
        ),
        None => None,
    };
    if let Some(dir) = &args.out_dir {
        fs::create_dir_all(dir)
            .with_context(|| format!("failed to create output directory {}", dir.display()))?;
    }

    let settings = format!(
        "{}|body={}|indent={}|verify={}",
        context_text.as_deref().unwrap_or(""),
        args.body,
        args.indent,
        args.verify
    );

    let results: Vec<(PathBuf, Result<String, CompilerError>)> = sources
        .par_iter()
        .map(|path| {
            let result = compile_file(path, &args, context.as_ref(), cache.as_ref(), &settings);
            (path.clone(), result)
        })
        .collect();

    let mut failures = 0;
    for (path, result) in results {
        match result {
            Ok(output) => match &args.out_dir {
                Some(dir) => {
                    let target = output_path(&path, Some(dir));
                    fs::write(&target, output)
                        .with_context(|| format!("failed to write {}", target.display()))?;
                }
                None => print!("{}", output),
            },
            Err(err) => {
                failures += 1;
                report(&err, args.json);
            }
        }
    }

    if failures > 0 {
        eprintln!("py2js: {} of {} file(s) failed", failures, sources.len());
        std::process::exit(1);
    }
    Ok(())
}

fn compile_file(
    path: &Path,
    args: &Args,
    context: Option<&ContextBinding>,
    cache: Option<&IncrementalCache>,
    settings: &str,
) -> Result<String, CompilerError> {
    let file_name = path.to_string_lossy().to_string();
    let source = fs::read_to_string(path).map_err(|e| {
        CompilerError::new(ErrorKind::Io, &format!("Failed to read file: {}", e), &file_name, 0, 0)
    })?;

    let hash = IncrementalCache::compute_hash(&source, settings);
    if let Some(output) = cache.and_then(|c| c.get(&file_name, &hash)) {
        return Ok(output);
    }

    let unit = TranslationUnit {
        source,
        context: context.cloned(),
        mode: if args.body { UnitMode::Body } else { UnitMode::Module },
    };
    let options = CompileOptions {
        file_name: file_name.clone(),
        indent_width: args.indent,
        verify_output: args.verify,
    };
    let output = compile_with_options(&unit, &options)?;

    if let Some(cache) = cache {
        cache.set(&file_name, &hash, &output);
    }
    Ok(output)
}

fn report(err: &CompilerError, json: bool) {
    if json {
        match serde_json::to_string(err) {
            Ok(line) => eprintln!("{}", line),
            Err(_) => eprintln!("{}", err),
        }
        return;
    }

    eprintln!("{}", err);
    if let Some(construct) = &err.context {
        eprintln!("  construct: {}", construct);
    }
    for hint in &err.hints {
        eprintln!("  hint: {}", hint);
    }
}
