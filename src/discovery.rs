//! Discovery Module for the py2js compiler
//!
//! Expands CLI inputs into the list of Python sources to compile.

use std::path::{Path, PathBuf};
use walkdir::WalkDir;

use crate::validate::{CompilerError, ErrorKind};

/// Expand files and directories into `.py` sources. Directories are scanned
/// recursively and their files sorted so output order does not depend on the
/// filesystem; explicitly named files are kept as given.
pub fn discover_sources(inputs: &[PathBuf]) -> Result<Vec<PathBuf>, CompilerError> {
    let mut sources = Vec::new();

    for input in inputs {
        if input.is_dir() {
            sources.extend(find_py_files(input));
        } else if input.is_file() {
            sources.push(input.clone());
        } else {
            return Err(CompilerError::new(
                ErrorKind::Io,
                "Input does not exist",
                &input.to_string_lossy(),
                0,
                0,
            ));
        }
    }

    Ok(sources)
}

/// Recursively find all .py files in a directory
fn find_py_files(dir: &Path) -> Vec<PathBuf> {
    let mut files: Vec<PathBuf> = WalkDir::new(dir)
        .follow_links(true)
        .into_iter()
        .filter_map(Result::ok)
        .map(|entry| entry.into_path())
        .filter(|path| path.is_file() && path.extension().is_some_and(|ext| ext == "py"))
        .collect();

    files.sort();
    files
}

/// Output path for a source: same stem with a `.js` extension, placed in
/// `out_dir` when given, else next to the source.
pub fn output_path(source: &Path, out_dir: Option<&Path>) -> PathBuf {
    let file_name = source.with_extension("js");
    match (out_dir, file_name.file_name()) {
        (Some(dir), Some(name)) => dir.join(name),
        _ => file_name,
    }
}
