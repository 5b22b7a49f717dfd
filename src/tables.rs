//! Operator and name tables shared by every compile.

use lazy_static::lazy_static;
use std::collections::{HashMap, HashSet};

/// Namespace object through which builtin names are routed at runtime.
pub const HELPER_NAMESPACE: &str = "py_builtins";

lazy_static! {
    /// Source identifiers that are spelled differently on the host side.
    static ref RESERVED_NAMES: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("self", "this");
        m.insert("True", "true");
        m.insert("False", "false");
        m.insert("None", "null");
        m.insert("int", "_int");
        m.insert("float", "_float");
        m.insert("super", "_super");
        m.insert("print", "console.log");
        // The helper namespace itself must not be reachable from user code.
        m.insert("py_builtins", "___py_hard_to_collide");
        m
    };

    /// Names provided by the runtime helper namespace.
    static ref BUILTIN_NAMES: HashSet<&'static str> = {
        let mut s = HashSet::new();
        s.insert("NotImplementedError");
        s.insert("ZeroDivisionError");
        s.insert("AssertionError");
        s.insert("AttributeError");
        s.insert("RuntimeError");
        s.insert("ImportError");
        s.insert("TypeError");
        s.insert("ValueError");
        s.insert("NameError");
        s.insert("IndexError");
        s.insert("KeyError");
        s.insert("StopIteration");
        s.insert("_int");
        s.insert("_float");
        s.insert("max");
        s.insert("min");
        s.insert("sum");
        s
    };

    static ref BOOLEAN_OPS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("and", "&&");
        m.insert("or", "||");
        m
    };

    static ref UNARY_OPS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("~", "~");
        m.insert("not", "!");
        m.insert("+", "+");
        m.insert("-", "-");
        m
    };

    static ref BINARY_OPS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("+", "+");
        m.insert("-", "-");
        m.insert("*", "*");
        m.insert("/", "/");
        m.insert("%", "%");
        m.insert("<<", "<<");
        m.insert(">>", ">>");
        m.insert("|", "|");
        m.insert("^", "^");
        m.insert("&", "&");
        m
    };

    static ref COMPARISON_OPS: HashMap<&'static str, &'static str> = {
        let mut m = HashMap::new();
        m.insert("==", "==");
        m.insert("!=", "!=");
        m.insert("<>", "!=");
        m.insert("<", "<");
        m.insert("<=", "<=");
        m.insert(">", ">");
        m.insert(">=", ">=");
        m.insert("is", "===");
        m.insert("is not", "!==");
        m
    };
}

/// Host spelling of a reserved source identifier, if it has one.
pub fn reserved_name_substitute(name: &str) -> Option<&'static str> {
    RESERVED_NAMES.get(name).copied()
}

pub fn is_builtin_name(name: &str) -> bool {
    BUILTIN_NAMES.contains(name)
}

pub fn boolean_operator_symbol(op: &str) -> Option<&'static str> {
    BOOLEAN_OPS.get(op).copied()
}

pub fn unary_operator_symbol(op: &str) -> Option<&'static str> {
    UNARY_OPS.get(op).copied()
}

pub fn binary_operator_symbol(op: &str) -> Option<&'static str> {
    BINARY_OPS.get(op).copied()
}

/// Comparison operators, with the two-token forms spelled `"is not"`.
pub fn comparison_operator_symbol(op: &str) -> Option<&'static str> {
    COMPARISON_OPS.get(op).copied()
}

/// Compound assignment symbol for an augmented operator such as `+=`.
pub fn augmented_operator_symbol(op: &str) -> Option<&'static str> {
    op.strip_suffix('=').and_then(binary_operator_symbol)
}

/// Identifier translation once context resolution has missed:
/// reserved substitution first, then builtin routing.
pub fn translate_name(name: &str) -> String {
    let name = reserved_name_substitute(name).unwrap_or(name);
    if is_builtin_name(name) {
        format!("{}.{}", HELPER_NAMESPACE, name)
    } else {
        name.to_string()
    }
}
