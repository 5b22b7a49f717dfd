//! Finalize Module for the py2js compiler
//!
//! Compile driver. Parses a unit, runs the translator over it, then drains the
//! callables the context binder scheduled, compiling each depth-first so that
//! its text lands ahead of the unit that referenced it.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::codegen::Translator;
use crate::context::{ContextBinder, ContextBinding};
use crate::parse::parse;
use crate::validate::{verify_output, CompilerError};

// ═══════════════════════════════════════════════════════════════════════════════
// INPUT TYPES
// ═══════════════════════════════════════════════════════════════════════════════

/// Which part of the source becomes output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum UnitMode {
    /// Every top-level statement.
    #[default]
    Module,
    /// Only the statements of the first function definition.
    Body,
}

/// Source text plus the optional context it is compiled against.
#[derive(Debug, Clone, Default)]
pub struct TranslationUnit {
    pub source: String,
    pub context: Option<ContextBinding>,
    pub mode: UnitMode,
}

impl TranslationUnit {
    pub fn new(source: impl Into<String>) -> Self {
        Self {
            source: source.into(),
            ..Self::default()
        }
    }

    pub fn with_context(mut self, context: ContextBinding) -> Self {
        self.context = Some(context);
        self
    }

    pub fn body(mut self) -> Self {
        self.mode = UnitMode::Body;
        self
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompileOptions {
    /// Attached to every diagnostic.
    pub file_name: String,
    pub indent_width: usize,
    /// Re-parse the produced JavaScript before returning it.
    pub verify_output: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            file_name: "<source>".to_string(),
            indent_width: 4,
            verify_output: false,
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SESSION
// ═══════════════════════════════════════════════════════════════════════════════

/// What to emit for one parsed source.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Entry<'n> {
    Module,
    Body,
    /// First function definition, emitted under the given name.
    Callable(&'n str),
}

/// Binder state shared by a root unit and every unit extracted from it.
pub(crate) struct Session<'b> {
    binder: ContextBinder<'b>,
    indent_width: usize,
}

impl<'b> Session<'b> {
    pub(crate) fn new(context: Option<&'b ContextBinding>, indent_width: usize) -> Self {
        Self {
            binder: ContextBinder::new(context),
            indent_width,
        }
    }

    pub(crate) fn rebind(&mut self, context: Option<&'b ContextBinding>) {
        self.binder.rebind(context);
    }

    /// Compile one source and everything it scheduled. Returns the extracted
    /// callables' text followed by the unit's own text.
    pub(crate) fn compile_source(&mut self, source: &str, entry: Entry<'_>) -> Result<String, CompilerError> {
        let parsed = parse(source)?;

        let text = {
            let mut translator = Translator::new(&mut self.binder, self.indent_width);
            match entry {
                Entry::Module => translator.translate_module(parsed.root())?,
                Entry::Body => translator.translate_body(parsed.root())?,
                Entry::Callable(name) => translator.translate_callable(parsed.root(), name)?,
            }
            translator.finish()?
        };

        let mut out = String::new();
        for pending in self.binder.take_pending() {
            debug!(callable = %pending.callable.name, name = %pending.name, "extracting context callable");
            self.binder.begin_extraction(pending.identity);
            let extracted = self.compile_source(&pending.callable.source, Entry::Callable(&pending.name));
            self.binder.end_extraction(pending.identity);
            out.push_str(&extracted?);
        }
        out.push_str(&text);
        Ok(out)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// ENTRY POINTS
// ═══════════════════════════════════════════════════════════════════════════════

pub fn compile(unit: &TranslationUnit) -> Result<String, CompilerError> {
    compile_with_options(unit, &CompileOptions::default())
}

/// Compile a unit. On failure nothing is returned but the error: output of a
/// partially translated unit never escapes.
pub fn compile_with_options(
    unit: &TranslationUnit,
    options: &CompileOptions,
) -> Result<String, CompilerError> {
    debug!(file = %options.file_name, mode = ?unit.mode, "compiling unit");

    let entry = match unit.mode {
        UnitMode::Module => Entry::Module,
        UnitMode::Body => Entry::Body,
    };
    let mut session = Session::new(unit.context.as_ref(), options.indent_width);
    let output = session
        .compile_source(&unit.source, entry)
        .map_err(|e| e.in_file(&options.file_name))?;

    if options.verify_output {
        verify_output(&output, &options.file_name)?;
    }

    debug!(file = %options.file_name, bytes = output.len(), "compiled unit");
    Ok(output)
}
