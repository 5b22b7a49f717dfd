//! Bundle Module for the py2js compiler
//!
//! Compiles a sequence of translatable units into one script. Units share a
//! single extraction memo, so a callable referenced from several units is
//! emitted once, ahead of its first use.

use lazy_static::lazy_static;
use regex::{Captures, Regex};
use tracing::debug;

use crate::context::ContextBinding;
use crate::finalize::{CompileOptions, Entry, Session};
use crate::validate::{verify_output, CompilerError, ErrorKind};

lazy_static! {
    static ref DEF_HEADER_RE: Regex =
        Regex::new(r"(?m)^([ \t]*(?:async[ \t]+)?def[ \t]+)([A-Za-z_][A-Za-z0-9_]*)").unwrap();
    static ref CLASS_HEADER_RE: Regex = Regex::new(
        r"(?m)^([ \t]*class[ \t]+)([A-Za-z_][A-Za-z0-9_]*)[ \t]*(\([^)]*\))?[ \t]*:"
    )
    .unwrap();
}

/// Behavior hooks a component may carry.
pub const HOOK_NAMES: [&str; 5] = ["onclick", "onmouseover", "onsubmit", "onchange", "oninput"];

/// One translatable unit.
#[derive(Debug, Clone, PartialEq)]
pub enum BundleUnit {
    /// A free-standing callable, optionally emitted under another name.
    Function { source: String, name: Option<String> },
    /// A behavior hook of an externally defined component, emitted as
    /// `function {owner}_{hook}(..)`. `hook` must be one of [`HOOK_NAMES`].
    Hook {
        owner: String,
        hook: String,
        source: String,
    },
    /// A class, optionally renamed and re-based, registered as a custom
    /// element when a tag is given.
    Class {
        source: String,
        superclass: Option<String>,
        rename: Option<String>,
        tag: Option<String>,
    },
}

#[derive(Debug, Clone, Default)]
pub struct Bundle {
    units: Vec<(BundleUnit, Option<ContextBinding>)>,
    context: Option<ContextBinding>,
}

impl Bundle {
    pub fn new() -> Self {
        Self::default()
    }

    /// Context used by units that do not carry their own.
    pub fn with_context(mut self, context: ContextBinding) -> Self {
        self.context = Some(context);
        self
    }

    pub fn push(&mut self, unit: BundleUnit) -> &mut Self {
        self.units.push((unit, None));
        self
    }

    pub fn push_with_context(&mut self, unit: BundleUnit, context: ContextBinding) -> &mut Self {
        self.units.push((unit, Some(context)));
        self
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Compile every unit in push order and join the results.
    pub fn compile(&self, options: &CompileOptions) -> Result<String, CompilerError> {
        let mut session = Session::new(self.context.as_ref(), options.indent_width);
        let mut parts = Vec::with_capacity(self.units.len());

        for (index, (unit, context)) in self.units.iter().enumerate() {
            session.rebind(context.as_ref().or(self.context.as_ref()));
            debug!(index, unit = unit.label(), "bundling unit");
            compile_unit(&mut session, unit, &mut parts)
                .map_err(|e| e.in_file(&options.file_name))?;
        }

        let output = parts.join("\n");
        if options.verify_output {
            verify_output(&output, &options.file_name)?;
        }
        Ok(output)
    }
}

impl BundleUnit {
    fn label(&self) -> &str {
        match self {
            BundleUnit::Function { name, .. } => name.as_deref().unwrap_or("function"),
            BundleUnit::Hook { hook, .. } => hook,
            BundleUnit::Class { rename, .. } => rename.as_deref().unwrap_or("class"),
        }
    }
}

fn compile_unit(
    session: &mut Session<'_>,
    unit: &BundleUnit,
    parts: &mut Vec<String>,
) -> Result<(), CompilerError> {
    match unit {
        BundleUnit::Function { source, name: None } => {
            parts.push(session.compile_source(source, Entry::Module)?);
        }
        BundleUnit::Function {
            source,
            name: Some(name),
        } => {
            let source = rename_function(source, name)?;
            parts.push(session.compile_source(&source, Entry::Callable(name))?);
        }
        BundleUnit::Hook {
            owner,
            hook,
            source,
        } => {
            if !HOOK_NAMES.contains(&hook.as_str()) {
                return Err(CompilerError::detached(
                    ErrorKind::UnsupportedConstruct,
                    format!("'{}' is not a component hook", hook),
                )
                .with_hint(format!("Hooks are {}", HOOK_NAMES.join(", "))));
            }
            let name = format!("{}_{}", owner, hook);
            let source = rename_function(source, &name)?;
            parts.push(session.compile_source(&source, Entry::Callable(&name))?);
        }
        BundleUnit::Class {
            source,
            superclass,
            rename,
            tag,
        } => {
            let (source, name) = rewrite_class_header(source, rename.as_deref(), superclass.as_deref())?;
            parts.push(session.compile_source(&source, Entry::Module)?);
            if let Some(tag) = tag {
                parts.push(format!(
                    "window.customElements.define(\"{}\", {});",
                    tag, name
                ));
            }
        }
    }
    Ok(())
}

/// Wrap a compiled function so that it runs where the script is loaded.
/// Empty input stays empty.
pub fn autoexec(js: &str) -> String {
    if js.is_empty() {
        return String::new();
    }
    format!("\n({})();\n", js.strip_suffix('\n').unwrap_or(js))
}

/// Replace the name of the first `def` header.
pub fn rename_function(source: &str, name: &str) -> Result<String, CompilerError> {
    if !DEF_HEADER_RE.is_match(source) {
        return Err(CompilerError::detached(
            ErrorKind::Parse,
            "Function unit contains no def header",
        ));
    }
    let renamed = DEF_HEADER_RE.replacen(source, 1, |caps: &Captures<'_>| format!("{}{}", &caps[1], name));
    Ok(renamed.into_owned())
}

/// Apply rename and superclass substitution to the first `class` header.
/// Returns the rewritten source and the class name it now declares.
pub fn rewrite_class_header(
    source: &str,
    rename: Option<&str>,
    superclass: Option<&str>,
) -> Result<(String, String), CompilerError> {
    let caps = CLASS_HEADER_RE.captures(source).ok_or_else(|| {
        CompilerError::detached(ErrorKind::Parse, "Class unit contains no class header")
    })?;
    let name = rename.unwrap_or(&caps[2]).to_string();

    let rewritten = CLASS_HEADER_RE.replacen(source, 1, |caps: &Captures<'_>| {
        let bases = match superclass {
            Some(base) => format!("({})", base),
            None => caps.get(3).map(|m| m.as_str().to_string()).unwrap_or_default(),
        };
        format!("{}{}{}:", &caps[1], name, bases)
    });
    Ok((rewritten.into_owned(), name))
}
