//! # py2js Compiler
//!
//! Translates a restricted subset of Python into JavaScript for a browser host.
//!
//! ## Pipeline
//!
//! 1. **Parse**: `tree-sitter-python` produces a concrete syntax tree; any error
//!    node fails the compile with `P2J-ERR-PARSE`.
//! 2. **Translate**: statements write lines to an indentation-aware buffer,
//!    expressions return text fragments. Constructs without a rule fail with
//!    `P2J-ERR-UNSUPPORTED`; nothing is emitted for a failed unit.
//! 3. **Bind context**: names not bound locally are looked up in the caller's
//!    context first. Literals are inlined, callables are compiled into their own
//!    unit and emitted ahead of the code that references them.
//!
//! ## Identifier Resolution Order
//!
//! 1. Locals of the enclosing frames (parameters, assignments, loop targets)
//! 2. Context binding
//! 3. Reserved-name substitution (`self` → `this`, `None` → `null`, ...)
//! 4. Builtin routing through the `py_builtins` helper namespace
//! 5. Left as written

#[cfg(feature = "napi")]
use napi_derive::napi;

mod codegen;
mod expression;
mod literal;
mod tables;

pub mod bundle;
pub mod cache;
pub mod context;
pub mod discovery;
pub mod emit;
pub mod finalize;
pub mod parse;
pub mod scope;
pub mod tracing_config;
pub mod validate;

#[cfg(test)]
mod cache_tests;
#[cfg(test)]
mod codegen_tests;
#[cfg(test)]
mod context_tests;
#[cfg(test)]
mod emit_tests;
#[cfg(test)]
mod safety_tests;

pub use bundle::{autoexec, Bundle, BundleUnit, HOOK_NAMES};
pub use context::{Callable, ContextBinding, ContextObject, ContextValue};
pub use finalize::{compile, compile_with_options, CompileOptions, TranslationUnit, UnitMode};
pub use validate::*;

/// Compile module source against an optional context.
pub fn transpile(source: &str, context: Option<ContextBinding>) -> Result<String, CompilerError> {
    let mut unit = TranslationUnit::new(source);
    unit.context = context;
    compile(&unit)
}

/// Compile only the body of the first function definition in `source`.
pub fn transpile_body(
    source: &str,
    context: Option<ContextBinding>,
) -> Result<String, CompilerError> {
    let mut unit = TranslationUnit::new(source).body();
    unit.context = context;
    compile(&unit)
}

/// Node entry point. `context_json` uses the JSON context form: plain values
/// are inlined, `{"$source": ..}` objects are callables and `{"$object": ..}`
/// objects are resolved attribute by attribute.
#[cfg(feature = "napi")]
#[napi]
pub fn transpile_native(
    source: String,
    context_json: Option<String>,
    body: Option<bool>,
) -> napi::Result<String> {
    let context = context_json
        .as_deref()
        .map(ContextBinding::from_json_str)
        .transpose()
        .map_err(to_napi_error)?;

    let mut unit = TranslationUnit::new(source);
    unit.context = context;
    if body.unwrap_or(false) {
        unit.mode = UnitMode::Body;
    }
    compile(&unit).map_err(to_napi_error)
}

#[cfg(feature = "napi")]
fn to_napi_error(err: CompilerError) -> napi::Error {
    let payload = serde_json::to_string(&err).unwrap_or_else(|_| err.to_string());
    napi::Error::from_reason(payload)
}
