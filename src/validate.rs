#[cfg(feature = "napi")]
use napi_derive::napi;
use oxc_allocator::Allocator;
use oxc_parser::Parser;
use oxc_span::SourceType;
use serde::{Deserialize, Serialize};

// ═══════════════════════════════════════════════════════════════════════════════
// ERROR CODES
// ═══════════════════════════════════════════════════════════════════════════════

pub const ERR_PARSE: &str = "P2J-ERR-PARSE";
pub const ERR_UNSUPPORTED: &str = "P2J-ERR-UNSUPPORTED";
pub const ERR_CONTEXT: &str = "P2J-ERR-CONTEXT";
pub const ERR_CONTEXT_CYCLE: &str = "P2J-ERR-CONTEXT-CYCLE";
pub const ERR_INTERNAL: &str = "P2J-ERR-INTERNAL";
pub const ERR_OUTPUT: &str = "P2J-ERR-OUTPUT";
pub const ERR_IO: &str = "P2J-ERR-IO";

/// Failure classes of one compile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ErrorKind {
    Parse,
    UnsupportedConstruct,
    ContextResolution,
    CyclicContext,
    Internal,
    OutputVerification,
    Io,
}

impl ErrorKind {
    pub fn code(self) -> &'static str {
        match self {
            ErrorKind::Parse => ERR_PARSE,
            ErrorKind::UnsupportedConstruct => ERR_UNSUPPORTED,
            ErrorKind::ContextResolution => ERR_CONTEXT,
            ErrorKind::CyclicContext => ERR_CONTEXT_CYCLE,
            ErrorKind::Internal => ERR_INTERNAL,
            ErrorKind::OutputVerification => ERR_OUTPUT,
            ErrorKind::Io => ERR_IO,
        }
    }

    fn error_type(self) -> &'static str {
        match self {
            ErrorKind::Parse => "PARSE_ERROR",
            ErrorKind::UnsupportedConstruct => "UNSUPPORTED_CONSTRUCT",
            ErrorKind::ContextResolution | ErrorKind::CyclicContext => "CONTEXT_RESOLUTION",
            ErrorKind::Internal => "INTERNAL_DEFECT",
            ErrorKind::OutputVerification => "OUTPUT_VERIFICATION",
            ErrorKind::Io => "IO_ERROR",
        }
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// GUARANTEES
// ═══════════════════════════════════════════════════════════════════════════════

fn get_guarantee(code: &str) -> &'static str {
    match code {
        ERR_PARSE => "Only syntactically valid Python source is translated.",
        ERR_UNSUPPORTED => {
            "Constructs without a translation rule fail the compile instead of degrading silently."
        }
        ERR_CONTEXT => "Context attributes are resolved against the bound value or not at all.",
        ERR_CONTEXT_CYCLE => "Every extracted callable is emitted exactly once, ahead of its first use.",
        ERR_INTERNAL => "Every supported operator has exactly one table entry.",
        ERR_OUTPUT => "Emitted JavaScript parses as a module.",
        ERR_IO => "Inputs are read and outputs written atomically per file.",
        _ => "Unknown invariant.",
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// COMPILER ERROR
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug, Clone, Serialize, Deserialize, thiserror::Error)]
#[error("{code}: {message} ({file}:{line}:{column})")]
#[serde(rename_all = "camelCase")]
pub struct CompilerError {
    pub code: String,
    pub kind: ErrorKind,
    pub error_type: String,
    pub message: String,
    pub guarantee: String,
    pub file: String,
    pub line: u32,
    pub column: u32,
    pub context: Option<String>,
    pub hints: Vec<String>,
}

impl CompilerError {
    pub fn new(kind: ErrorKind, message: &str, file: &str, line: u32, column: u32) -> Self {
        Self::with_details(kind, message, file, line, column, None, vec![])
    }

    pub fn with_details(
        kind: ErrorKind,
        message: &str,
        file: &str,
        line: u32,
        column: u32,
        context: Option<String>,
        hints: Vec<String>,
    ) -> Self {
        let code = kind.code();
        CompilerError {
            code: code.to_string(),
            kind,
            error_type: kind.error_type().to_string(),
            message: message.to_string(),
            guarantee: get_guarantee(code).to_string(),
            file: file.to_string(),
            line,
            column,
            context,
            hints,
        }
    }

    /// Construct with no known position; the driver fills in the file name.
    pub fn detached(kind: ErrorKind, message: impl AsRef<str>) -> Self {
        Self::new(kind, message.as_ref(), "", 0, 0)
    }

    pub fn unsupported(construct: &str, location: SourceLocation) -> Self {
        Self::with_details(
            ErrorKind::UnsupportedConstruct,
            &format!("{} is not supported", construct),
            "",
            location.line,
            location.column,
            Some(construct.to_string()),
            vec![],
        )
    }

    pub fn internal(message: impl AsRef<str>) -> Self {
        Self::detached(ErrorKind::Internal, message)
    }

    pub fn with_hint(mut self, hint: impl Into<String>) -> Self {
        self.hints.push(hint.into());
        self
    }

    /// Attach a node position unless the error already carries one.
    pub fn at(mut self, location: SourceLocation) -> Self {
        if self.line == 0 {
            self.line = location.line;
            self.column = location.column;
        }
        self
    }

    /// Attach the unit's file name unless one is already set.
    pub fn in_file(mut self, file: &str) -> Self {
        if self.file.is_empty() {
            self.file = file.to_string();
        }
        self
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// SOURCE LOCATION
// ═══════════════════════════════════════════════════════════════════════════════

/// 1-based line and column of a syntax node.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq, Eq)]
#[cfg_attr(feature = "napi", napi(object))]
#[serde(rename_all = "camelCase")]
pub struct SourceLocation {
    pub line: u32,
    pub column: u32,
}

// ═══════════════════════════════════════════════════════════════════════════════
// OUTPUT VERIFICATION
// ═══════════════════════════════════════════════════════════════════════════════

/// Re-parse generated JavaScript and reject output the host could not load.
pub fn verify_output(js: &str, file: &str) -> Result<(), CompilerError> {
    let allocator = Allocator::default();
    let source_type = SourceType::default().with_module(true);
    let ret = Parser::new(&allocator, js, source_type).parse();

    if ret.errors.is_empty() && !ret.panicked {
        return Ok(());
    }

    let hints = ret
        .errors
        .iter()
        .map(|e| format!("{:?}", e))
        .collect::<Vec<_>>();
    Err(CompilerError::with_details(
        ErrorKind::OutputVerification,
        "Generated JavaScript does not parse",
        file,
        0,
        0,
        None,
        hints,
    ))
}
