#[cfg(test)]
mod tests {
    use crate::transpile;
    use crate::validate::ErrorKind;

    fn js(source: &str) -> String {
        transpile(source, None).unwrap()
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // ASSIGNMENT
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_first_assignment_declares() {
        assert_eq!(js("x = 1\nx = 2\n"), "var x = 1;\nx = 2;\n");
    }

    #[test]
    fn test_attribute_and_subscript_targets() {
        assert_eq!(js("a.b = 1\na[0] = 2\n"), "a.b = 1;\na[0] = 2;\n");
    }

    #[test]
    fn test_bare_annotation_declares() {
        assert_eq!(js("x: int\nx = 3\n"), "var x;\nx = 3;\n");
        assert_eq!(js("y: int = 4\n"), "var y = 4;\n");
    }

    #[test]
    fn test_function_locals_do_not_leak() {
        let out = js("x = 1\ndef f():\n    x = 2\n    return x\nx = 3\n");
        assert_eq!(
            out,
            "var x = 1;\nfunction f() {\n    var x = 2;\n    return x;\n}\nx = 3;\n"
        );
    }

    #[test]
    fn test_global_names_are_not_redeclared() {
        let out = js("def f():\n    global count\n    count = 1\n");
        assert_eq!(out, "function f() {\n    count = 1;\n}\n");
    }

    #[test]
    fn test_augmented_assignment() {
        assert_eq!(js("total += 1\n"), "total += 1;\n");
        assert_eq!(js("n **= 2\n"), "n = Math.pow(n, 2);\n");
        assert_eq!(js("n //= 2\n"), "n = Math.floor(n / 2);\n");
        assert_eq!(js("self.count -= 1\n"), "this.count -= 1;\n");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // CONTROL FLOW
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_if_elif_else() {
        let out = js("if a:\n    b = 1\nelif c:\n    b = 2\nelse:\n    b = 3\n");
        assert_eq!(
            out,
            "if (a) {\n    var b = 1;\n} else if (c) {\n    b = 2;\n} else {\n    b = 3;\n}\n"
        );
    }

    #[test]
    fn test_for_loop_declares_target_once() {
        let out = js("for i in items:\n    total += i\nfor i in others:\n    pass\n");
        assert_eq!(
            out,
            "for (var i of items) {\n    total += i;\n}\nfor (i of others) {\n    /* pass */\n}\n"
        );
    }

    #[test]
    fn test_plain_while() {
        let out = js("while n > 0:\n    n -= 1\n    continue\n");
        assert_eq!(out, "while (n > 0) {\n    n -= 1;\n    continue;\n}\n");
    }

    #[test]
    fn test_while_else_uses_sentinel() {
        let out = js("n = 3\nwhile n:\n    n = n - 1\n    if n == 1:\n        break\nelse:\n    done = True\n");
        let expected = "\
var n = 3;
var __orelse0__ = false;
while (true) {
    if (!(n)) {
        __orelse0__ = true;
        break;
    }
    n = (n - 1);
    if (n == 1) {
        break;
    }
}
if (__orelse0__) {
    var done = true;
}
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_nested_while_else_sentinels_are_distinct() {
        let out = js("while a:\n    while b:\n        pass\n    else:\n        pass\nelse:\n    pass\n");
        assert!(out.contains("var __orelse0__ = false;"));
        assert!(out.contains("    var __orelse1__ = false;"));
    }

    #[test]
    fn test_simple_statements() {
        assert_eq!(js("pass\n"), "/* pass */\n");
        assert_eq!(js("assert x\n"), "assert(x);\n");
        assert_eq!(js("assert x, 'broken'\n"), "assert(x, 'broken');\n");
        assert_eq!(js("raise ValueError('bad')\n"), "throw py_builtins.ValueError('bad');\n");
        assert_eq!(js("def f():\n    return\n"), "function f() {\n    return;\n}\n");
    }

    #[test]
    fn test_expression_list_statement() {
        assert_eq!(js("a, b\n"), "[a, b];\n");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // FUNCTIONS
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_free_function_with_defaults() {
        let out = js("def add(a, b=2):\n    c = a + b\n    return c\n");
        let expected = "\
function add(a, b) {
    b = typeof(b) != 'undefined' ? b : 2;
    var c = (a + b);
    return c;
}
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_free_function_with_receiver_is_shorthand() {
        let out = js("def log(self, msg):\n    console.log(msg)\n");
        assert_eq!(out, "log(msg) {\n    console.log(msg);\n}\n");
    }

    #[test]
    fn test_async_function() {
        let out = js("async def load(url):\n    data = await fetch(url)\n    return data\n");
        assert_eq!(
            out,
            "async function load(url) {\n    var data = await fetch(url);\n    return data;\n}\n"
        );
    }

    #[test]
    fn test_typed_parameters_drop_annotations() {
        let out = js("def f(a: int, b: str = 'x'):\n    return a\n");
        assert_eq!(
            out,
            "function f(a, b) {\n    b = typeof(b) != 'undefined' ? b : 'x';\n    return a;\n}\n"
        );
    }

    #[test]
    fn test_custom_indent_width() {
        use crate::{compile_with_options, CompileOptions, TranslationUnit};
        let options = CompileOptions {
            indent_width: 2,
            ..CompileOptions::default()
        };
        let unit = TranslationUnit::new("def f():\n    if a:\n        return 1\n");
        let out = compile_with_options(&unit, &options).unwrap();
        assert_eq!(out, "function f() {\n  if (a) {\n    return 1;\n  }\n}\n");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // CLASSES
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_class_shape() {
        let source = "\
class Counter(Base):
    start = 0

    def __init__(self, step=1):
        self.step = step

    def bump(self):
        self.value += self.step
        return self.value
";
        let expected = "\
class Counter extends Base {
    constructor(...args) {
        super(...args);
        this.__init__(...args);
    }
}
Counter.start = 0;
Counter.prototype.start = Counter.start;
Counter.prototype.__init__ = function(step) {
    step = typeof(step) != 'undefined' ? step : 1;
    this.step = step;
};
Counter.__init__ = function() {
    return Counter.prototype.__init__.apply(arguments[0], Array.prototype.slice.call(arguments, 1));
};
Counter.prototype.bump = function() {
    this.value += this.step;
    return this.value;
};
Counter.bump = function() {
    return Counter.prototype.bump.apply(arguments[0], Array.prototype.slice.call(arguments, 1));
};
";
        assert_eq!(js(source), expected);
    }

    #[test]
    fn test_class_without_init_or_base() {
        let out = js("class Empty(object):\n    pass\n");
        assert_eq!(out, "class Empty {\n}\n/* pass */\n");
    }

    #[test]
    fn test_static_method_alias() {
        let out = js("class Util:\n    @staticmethod\n    def twice(x):\n        return x * 2\n");
        let expected = "\
class Util {
}
Util.prototype.twice = function(x) {
    return (x * 2);
};
Util.twice = Util.prototype.twice;
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_javascript_method_is_registered_natively() {
        let out = js("class Widget(HTMLElement):\n    @JavaScript\n    def connectedCallback(self):\n        self.render()\n");
        let expected = "\
class Widget extends HTMLElement {
    connectedCallback() {
        this.render();
    }
}
";
        assert_eq!(out, expected);
    }

    #[test]
    fn test_receiver_not_named_self_is_aliased() {
        let out = js("class A:\n    def go(me):\n        return me.x\n");
        assert!(out.contains("A.prototype.go = function() {\n    var me = this;\n    return me.x;\n};\n"));
    }

    #[test]
    fn test_method_without_receiver_is_rejected() {
        let err = transpile("class A:\n    def go():\n        pass\n", None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedConstruct);
    }

    #[test]
    fn test_other_decorators_are_rejected() {
        let err = transpile("class A:\n    @property\n    def x(self):\n        return 1\n", None).unwrap_err();
        assert_eq!(err.kind, ErrorKind::UnsupportedConstruct);
        assert!(!err.hints.is_empty());
    }

    #[test]
    fn test_multiple_inheritance_is_rejected() {
        let err = transpile("class A(B, C):\n    pass\n", None).unwrap_err();
        assert_eq!(err.context.as_deref(), Some("multiple inheritance"));
    }
}
