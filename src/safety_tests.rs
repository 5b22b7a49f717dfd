//! Failure-mode tests: every rejected unit fails with a coded error and
//! produces no output, and accepted units compile deterministically.

#[cfg(test)]
mod tests {
    use crate::context::{Callable, ContextBinding, ContextObject};
    use crate::validate::{verify_output, CompilerError, ErrorKind};
    use crate::{compile, compile_with_options, transpile, CompileOptions, TranslationUnit};

    fn reject(source: &str) -> CompilerError {
        match transpile(source, None) {
            Ok(out) => panic!("expected failure, got output:\n{}", out),
            Err(err) => err,
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // UNSUPPORTED CONSTRUCTS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_try_is_rejected_with_position() {
        let err = reject("x = 1\ntry:\n    f()\nexcept Exception:\n    pass\n");
        assert_eq!(err.kind, ErrorKind::UnsupportedConstruct);
        assert_eq!(err.code, "P2J-ERR-UNSUPPORTED");
        assert_eq!(err.error_type, "UNSUPPORTED_CONSTRUCT");
        assert_eq!(err.context.as_deref(), Some("exception handling (try)"));
        assert_eq!((err.line, err.column), (2, 1));
    }

    #[test]
    fn test_unsupported_statements() {
        let cases = [
            ("import os\n", "module import"),
            ("from a import b\n", "module import"),
            ("with open(p) as f:\n    pass\n", "context-scoped resource block (with)"),
            ("del x\n", "del statement"),
            ("a = b = 1\n", "chained assignment"),
            ("a, b = 1, 2\n", "destructuring assignment"),
            ("for a, b in pairs:\n    pass\n", "destructuring loop target"),
            ("for x in y:\n    pass\nelse:\n    pass\n", "for-else"),
            ("raise\n", "bare raise"),
            ("raise A() from e\n", "exception chaining (raise .. from)"),
            ("x[1:2] = y\n", "slice assignment"),
            ("m @= n\n", "matrix multiplication (@=)"),
            ("def f(*args):\n    pass\n", "star arguments"),
            ("def f(**kw):\n    pass\n", "keyword arguments"),
            ("@staticmethod\ndef f():\n    pass\n", "staticmethod outside a class"),
            ("def f():\n    yield 1\n", "yield"),
        ];
        for (source, construct) in cases {
            let err = reject(source);
            assert_eq!(err.kind, ErrorKind::UnsupportedConstruct, "{}", source);
            assert_eq!(err.context.as_deref(), Some(construct), "{}", source);
        }
    }

    #[test]
    fn test_failure_deep_in_a_unit_yields_no_output() {
        let source = "def ok():\n    return 1\n\nclass A:\n    def m(self):\n        with x:\n            pass\n";
        let err = reject(source);
        assert_eq!(err.line, 6);
    }

    #[test]
    fn test_failure_inside_extracted_callable_fails_the_root() {
        let bad = Callable::from_source("def bad():\n    import os\n").unwrap();
        let ctx = ContextBinding::new().with("self", ContextObject::new("W").with("bad", bad));
        let unit = TranslationUnit::new("def f(self):\n    self.bad()\n").with_context(ctx).body();
        let err = compile(&unit).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedConstruct);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ERROR TAXONOMY
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_parse_error() {
        let err = reject("def f(:\n");
        assert_eq!(err.kind, ErrorKind::Parse);
        assert_eq!(err.error_type, "PARSE_ERROR");
        assert!(!err.guarantee.is_empty());
    }

    #[test]
    fn test_body_mode_needs_a_function() {
        let err = compile(&TranslationUnit::new("x = 1\n").body()).unwrap_err();
        assert_eq!(err.kind, ErrorKind::Parse);
    }

    #[test]
    fn test_errors_carry_file_name() {
        let options = CompileOptions {
            file_name: "widgets/panel.py".to_string(),
            ..CompileOptions::default()
        };
        let err = compile_with_options(&TranslationUnit::new("import os\n"), &options).unwrap_err();
        assert_eq!(err.file, "widgets/panel.py");
        assert_eq!(
            err.to_string(),
            "P2J-ERR-UNSUPPORTED: module import is not supported (widgets/panel.py:1:1)"
        );
    }

    #[test]
    fn test_error_serializes_camel_case() {
        let err = reject("import os\n");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["errorType"], "UNSUPPORTED_CONSTRUCT");
        assert_eq!(json["kind"], "unsupported-construct");
        assert_eq!(json["line"], 1);
    }

    #[test]
    fn test_codes_are_distinct() {
        let kinds = [
            ErrorKind::Parse,
            ErrorKind::UnsupportedConstruct,
            ErrorKind::ContextResolution,
            ErrorKind::CyclicContext,
            ErrorKind::Internal,
            ErrorKind::OutputVerification,
            ErrorKind::Io,
        ];
        let mut codes: Vec<&str> = kinds.iter().map(|k| k.code()).collect();
        codes.sort();
        codes.dedup();
        assert_eq!(codes.len(), kinds.len());
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // OUTPUT VERIFICATION
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_verified_output_parses() {
        let options = CompileOptions {
            verify_output: true,
            ..CompileOptions::default()
        };
        let source = "class A(B):\n    def __init__(self, x=1):\n        self.x = x\n\nn = [i * 2 for i in range(3)]\n";
        assert!(compile_with_options(&TranslationUnit::new(source), &options).is_ok());
    }

    #[test]
    fn test_top_level_shorthand_fails_verification() {
        let options = CompileOptions {
            verify_output: true,
            ..CompileOptions::default()
        };
        let unit = TranslationUnit::new("def log(self):\n    pass\n");
        let err = compile_with_options(&unit, &options).unwrap_err();
        assert_eq!(err.kind, ErrorKind::OutputVerification);
        assert!(!err.hints.is_empty());
    }

    #[test]
    fn test_verify_output_directly() {
        assert!(verify_output("var x = 1;\n", "a.js").is_ok());
        let err = verify_output("var = ;\n", "a.js").unwrap_err();
        assert_eq!(err.file, "a.js");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // DETERMINISM
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_compile_is_deterministic() {
        let helper = Callable::from_source("def helper(self):\n    return {'a': 1, 'b': 2}\n").unwrap();
        let ctx = ContextBinding::new()
            .with("limit", 3)
            .with("self", ContextObject::new("W").with("helper", helper).with("name", "w"));
        let source = "def f(self):\n    while limit:\n        self.helper()\n    else:\n        return self.name\n";

        let unit = TranslationUnit::new(source).with_context(ctx).body();
        let first = compile(&unit).unwrap();
        for _ in 0..5 {
            assert_eq!(compile(&unit).unwrap(), first);
        }
    }
}
