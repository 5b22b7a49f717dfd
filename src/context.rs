//! Context Binding for the py2js compiler
//!
//! A caller-supplied mapping of names to host-side values consulted before
//! generic identifier translation. Literal values are inlined, callables are
//! scheduled for extraction into their own unit, and objects are resolved
//! further through attribute access.

use lazy_static::lazy_static;
use regex::Regex;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap, HashSet};
use std::sync::Arc;
use tracing::trace;

use crate::validate::{CompilerError, ErrorKind};

lazy_static! {
    static ref DEF_NAME_RE: Regex = Regex::new(r"(?m)^\s*(?:async\s+)?def\s+([A-Za-z_][A-Za-z0-9_]*)").unwrap();
}

// ═══════════════════════════════════════════════════════════════════════════════
// VALUES
// ═══════════════════════════════════════════════════════════════════════════════

/// Source of a host-side function that may be referenced from translated code.
#[derive(Debug, Clone, PartialEq)]
pub struct Callable {
    pub name: String,
    /// Name of the class (or other owner) that declares the callable.
    pub owner: Option<String>,
    pub source: String,
}

impl Callable {
    /// Build from source, taking the name from the first `def`.
    pub fn from_source(source: impl Into<String>) -> Result<Self, CompilerError> {
        let source = source.into();
        let name = DEF_NAME_RE
            .captures(&source)
            .map(|c| c[1].to_string())
            .ok_or_else(|| {
                CompilerError::detached(
                    ErrorKind::ContextResolution,
                    "Callable source contains no function definition",
                )
            })?;
        Ok(Self {
            name,
            owner: None,
            source,
        })
    }

    pub fn owned_by(mut self, owner: impl Into<String>) -> Self {
        self.owner = Some(owner.into());
        self
    }
}

/// A host object whose attributes are resolved at compile time.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ContextObject {
    pub name: String,
    pub attributes: BTreeMap<String, ContextValue>,
}

impl ContextObject {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    pub fn with(mut self, attr: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.attributes.insert(attr.into(), value.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ContextValue {
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    Str(String),
    List(Vec<ContextValue>),
    Map(BTreeMap<String, ContextValue>),
    Callable(Arc<Callable>),
    Object(Arc<ContextObject>),
}

impl From<bool> for ContextValue {
    fn from(v: bool) -> Self {
        ContextValue::Bool(v)
    }
}

impl From<i64> for ContextValue {
    fn from(v: i64) -> Self {
        ContextValue::Int(v)
    }
}

impl From<i32> for ContextValue {
    fn from(v: i32) -> Self {
        ContextValue::Int(v as i64)
    }
}

impl From<f64> for ContextValue {
    fn from(v: f64) -> Self {
        ContextValue::Float(v)
    }
}

impl From<&str> for ContextValue {
    fn from(v: &str) -> Self {
        ContextValue::Str(v.to_string())
    }
}

impl From<String> for ContextValue {
    fn from(v: String) -> Self {
        ContextValue::Str(v)
    }
}

impl From<Callable> for ContextValue {
    fn from(v: Callable) -> Self {
        ContextValue::Callable(Arc::new(v))
    }
}

impl From<ContextObject> for ContextValue {
    fn from(v: ContextObject) -> Self {
        ContextValue::Object(Arc::new(v))
    }
}

impl ContextValue {
    /// Convert a JSON value. Objects carrying `$source` become callables and
    /// objects carrying `$object` become host objects; every other JSON value
    /// is an inlinable literal.
    pub fn from_json(value: Value) -> Result<Self, CompilerError> {
        Ok(match value {
            Value::Null => ContextValue::Null,
            Value::Bool(b) => ContextValue::Bool(b),
            Value::Number(n) => match n.as_i64() {
                Some(i) => ContextValue::Int(i),
                None => ContextValue::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Value::String(s) => ContextValue::Str(s),
            Value::Array(items) => ContextValue::List(
                items
                    .into_iter()
                    .map(ContextValue::from_json)
                    .collect::<Result<_, _>>()?,
            ),
            Value::Object(mut map) => {
                if let Some(source) = map.remove("$source") {
                    let source = source.as_str().map(str::to_string).ok_or_else(|| {
                        CompilerError::detached(ErrorKind::ContextResolution, "$source must be a string")
                    })?;
                    let mut callable = Callable::from_source(source)?;
                    if let Some(Value::String(name)) = map.remove("$name") {
                        callable.name = name;
                    }
                    if let Some(Value::String(owner)) = map.remove("$owner") {
                        callable.owner = Some(owner);
                    }
                    ContextValue::Callable(Arc::new(callable))
                } else if let Some(name) = map.remove("$object") {
                    let name = name.as_str().unwrap_or_default().to_string();
                    let mut object = ContextObject::new(name);
                    for (key, value) in map {
                        object.attributes.insert(key, ContextValue::from_json(value)?);
                    }
                    ContextValue::Object(Arc::new(object))
                } else {
                    let mut entries = BTreeMap::new();
                    for (key, value) in map {
                        entries.insert(key, ContextValue::from_json(value)?);
                    }
                    ContextValue::Map(entries)
                }
            }
        })
    }

    /// JavaScript literal text for inlinable values.
    pub fn to_js_literal(&self) -> Result<Option<String>, CompilerError> {
        let text = match self {
            ContextValue::Null => "null".to_string(),
            ContextValue::Bool(b) => b.to_string(),
            ContextValue::Int(i) => i.to_string(),
            ContextValue::Float(f) => float_literal(*f),
            ContextValue::Str(s) => serde_json::to_string(s)
                .map_err(|e| CompilerError::internal(format!("String encoding failed: {}", e)))?,
            ContextValue::List(items) => {
                let mut parts = Vec::with_capacity(items.len());
                for item in items {
                    match item.to_js_literal()? {
                        Some(text) => parts.push(text),
                        None => return Ok(None),
                    }
                }
                format!("[{}]", parts.join(", "))
            }
            ContextValue::Map(entries) => {
                let mut parts = Vec::with_capacity(entries.len());
                for (key, value) in entries {
                    let key = serde_json::to_string(key).map_err(|e| {
                        CompilerError::internal(format!("String encoding failed: {}", e))
                    })?;
                    match value.to_js_literal()? {
                        Some(text) => parts.push(format!("{}: {}", key, text)),
                        None => return Ok(None),
                    }
                }
                format!("{{{}}}", parts.join(", "))
            }
            ContextValue::Callable(_) | ContextValue::Object(_) => return Ok(None),
        };
        Ok(Some(text))
    }
}

fn float_literal(f: f64) -> String {
    if f.is_nan() {
        "NaN".to_string()
    } else if f.is_infinite() {
        if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string()
    } else {
        serde_json::Number::from_f64(f)
            .map(|n| n.to_string())
            .unwrap_or_else(|| f.to_string())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BINDING
// ═══════════════════════════════════════════════════════════════════════════════

/// Read-only name → value mapping supplied once per compile.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ContextBinding {
    values: BTreeMap<String, ContextValue>,
}

impl ContextBinding {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<ContextValue>) -> Self {
        self.insert(name, value);
        self
    }

    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<ContextValue>) {
        self.values.insert(name.into(), value.into());
    }

    pub fn get(&self, name: &str) -> Option<&ContextValue> {
        self.values.get(name)
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn from_json(value: Value) -> Result<Self, CompilerError> {
        match value {
            Value::Object(map) => {
                let mut binding = ContextBinding::new();
                for (key, value) in map {
                    binding.values.insert(key, ContextValue::from_json(value)?);
                }
                Ok(binding)
            }
            Value::Null => Ok(ContextBinding::new()),
            _ => Err(CompilerError::detached(
                ErrorKind::ContextResolution,
                "Context must be a JSON object",
            )),
        }
    }

    pub fn from_json_str(text: &str) -> Result<Self, CompilerError> {
        let value: Value = serde_json::from_str(text).map_err(|e| {
            CompilerError::detached(ErrorKind::ContextResolution, format!("Invalid context JSON: {}", e))
        })?;
        Self::from_json(value)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// BINDER
// ═══════════════════════════════════════════════════════════════════════════════

/// Outcome of consulting the context for one identifier or attribute chain.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolution {
    /// Inlined literal text.
    Literal(String),
    /// Name under which an extracted callable is emitted.
    CallableRef(String),
    Unresolved,
}

/// A callable waiting to be compiled into its own unit.
#[derive(Debug, Clone)]
pub struct PendingExtraction {
    pub identity: usize,
    pub name: String,
    pub callable: Arc<Callable>,
}

fn identity(callable: &Arc<Callable>) -> usize {
    Arc::as_ptr(callable) as usize
}

/// Resolution state shared by a root unit and the units extracted from it.
#[derive(Debug, Default)]
pub struct ContextBinder<'b> {
    binding: Option<&'b ContextBinding>,
    /// identity → generated name, for every callable seen so far.
    extracted: HashMap<usize, String>,
    names_in_use: HashSet<String>,
    in_progress: HashSet<usize>,
    pending: Vec<PendingExtraction>,
}

impl<'b> ContextBinder<'b> {
    pub fn new(binding: Option<&'b ContextBinding>) -> Self {
        Self {
            binding,
            ..Self::default()
        }
    }

    /// Switch the binding consulted for the next unit. Memoized extractions
    /// are kept, so a callable shared by two bindings is still emitted once.
    pub fn rebind(&mut self, binding: Option<&'b ContextBinding>) {
        self.binding = binding;
    }

    pub fn has_binding(&self) -> bool {
        self.binding.is_some_and(|b| !b.is_empty())
    }

    pub fn lookup(&self, name: &str) -> Option<&'b ContextValue> {
        self.binding.and_then(|b| b.get(name))
    }

    /// Attribute of a resolved value. Only objects carry attributes; a missing
    /// attribute on an object is an error, never a fallback.
    pub fn lookup_attribute(
        &self,
        base: &'b ContextValue,
        attr: &str,
    ) -> Result<Option<&'b ContextValue>, CompilerError> {
        match base {
            ContextValue::Object(object) => match object.attributes.get(attr) {
                Some(value) => Ok(Some(value)),
                None => Err(CompilerError::detached(
                    ErrorKind::ContextResolution,
                    format!("'{}' object has no attribute '{}'", object.name, attr),
                )),
            },
            _ => Ok(None),
        }
    }

    /// Turn a resolved value into emitted text. `access` is the name the value
    /// was reached through and `owner` the object it was read from, if any.
    pub fn render(
        &mut self,
        value: &'b ContextValue,
        access: &str,
        owner: Option<&str>,
    ) -> Result<Resolution, CompilerError> {
        match value {
            ContextValue::Callable(callable) => {
                let name = self.schedule(callable, access, owner)?;
                Ok(Resolution::CallableRef(name))
            }
            ContextValue::Object(_) => Ok(Resolution::Unresolved),
            _ => match value.to_js_literal()? {
                Some(text) => {
                    trace!(access, literal = %text, "inlined context value");
                    Ok(Resolution::Literal(text))
                }
                None => Ok(Resolution::Unresolved),
            },
        }
    }

    fn schedule(
        &mut self,
        callable: &Arc<Callable>,
        access: &str,
        owner: Option<&str>,
    ) -> Result<String, CompilerError> {
        let id = identity(callable);
        if self.in_progress.contains(&id) {
            return Err(CompilerError::detached(
                ErrorKind::CyclicContext,
                format!(
                    "Callable '{}' is referenced while its own extraction is in progress",
                    callable.name
                ),
            ));
        }
        if let Some(name) = self.extracted.get(&id) {
            return Ok(name.clone());
        }

        let base = match callable.owner.as_deref().or(owner) {
            Some(owner) => format!("{}_{}", owner, access),
            None => access.to_string(),
        };
        let mut name = base.clone();
        let mut suffix = 2;
        while self.names_in_use.contains(&name) {
            name = format!("{}_{}", base, suffix);
            suffix += 1;
        }

        trace!(callable = %callable.name, generated = %name, "scheduled callable extraction");
        self.names_in_use.insert(name.clone());
        self.extracted.insert(id, name.clone());
        self.pending.push(PendingExtraction {
            identity: id,
            name: name.clone(),
            callable: Arc::clone(callable),
        });
        Ok(name)
    }

    /// Callables scheduled since the last call, in first-reference order.
    pub fn take_pending(&mut self) -> Vec<PendingExtraction> {
        std::mem::take(&mut self.pending)
    }

    pub fn begin_extraction(&mut self, identity: usize) {
        self.in_progress.insert(identity);
    }

    pub fn end_extraction(&mut self, identity: usize) {
        self.in_progress.remove(&identity);
    }
}
