#[cfg(test)]
mod tests {
    use crate::context::{Callable, ContextBinder, ContextBinding, ContextObject, ContextValue, Resolution};
    use crate::validate::ErrorKind;
    use crate::{transpile, transpile_body};

    fn callable(source: &str) -> Callable {
        Callable::from_source(source).unwrap()
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // LITERAL INLINING
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_context_literal_is_inlined() {
        let ctx = ContextBinding::new().with("count", 5);
        assert_eq!(transpile("y = 10 + count\n", Some(ctx)).unwrap(), "var y = (10 + 5);\n");
    }

    #[test]
    fn test_inlined_number_as_member_receiver() {
        let ctx = ContextBinding::new().with("count", 5).with("offset", -2);
        let out = transpile("y = count.real\nz = len(offset)\n", Some(ctx.clone())).unwrap();
        assert_eq!(out, "var y = (5).real;\nvar z = (-2).length;\n");

        let options = crate::CompileOptions {
            verify_output: true,
            ..crate::CompileOptions::default()
        };
        let mut unit = crate::TranslationUnit::new("y = count.real\n");
        unit.context = Some(ctx);
        assert!(crate::compile_with_options(&unit, &options).is_ok());
    }

    #[test]
    fn test_context_values_render_as_literals() {
        let ctx = ContextBinding::new()
            .with("title", "say \"hi\"")
            .with("ratio", 0.5)
            .with("enabled", true)
            .with("items", ContextValue::List(vec![1.into(), "a".into()]))
            .with("nothing", ContextValue::Null);
        let out = transpile("f(title, ratio, enabled, items, nothing)\n", Some(ctx)).unwrap();
        assert_eq!(out, "f(\"say \\\"hi\\\"\", 0.5, true, [1, \"a\"], null);\n");
    }

    #[test]
    fn test_attribute_chain_resolves_through_objects() {
        let inner = ContextObject::new("Config").with("limit", 10);
        let ctx = ContextBinding::new().with(
            "self",
            ContextObject::new("Widget").with("test", "test").with("config", inner),
        );
        let out = transpile_body(
            "def render(self):\n    console.log(self.test)\n    return self.config.limit\n",
            Some(ctx),
        )
        .unwrap();
        assert_eq!(out, "console.log(\"test\");\nreturn 10;\n");
    }

    #[test]
    fn test_missing_attribute_is_an_error() {
        let ctx = ContextBinding::new().with("self", ContextObject::new("Widget"));
        let err = transpile_body("def render(self):\n    return self.missing\n", Some(ctx)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::ContextResolution);
        assert_eq!(err.code, "P2J-ERR-CONTEXT");
        assert!(err.message.contains("'Widget' object has no attribute 'missing'"));
        assert_eq!(err.line, 2);
    }

    #[test]
    fn test_local_shadows_context() {
        let ctx = ContextBinding::new().with("count", 5);
        let out = transpile("def f(count):\n    return count\n", Some(ctx)).unwrap();
        assert_eq!(out, "function f(count) {\n    return count;\n}\n");
    }

    #[test]
    fn test_assignment_target_attribute_is_not_resolved() {
        let ctx = ContextBinding::new().with("self", ContextObject::new("W").with("x", 1));
        let out = transpile_body("def f(self):\n    self.x = 2\n", Some(ctx));
        // An object has no literal form, so the receiver falls back to `this`.
        assert_eq!(out.unwrap(), "this.x = 2;\n");
    }

    #[test]
    fn test_method_receiver_shadows_context() {
        let ctx = ContextBinding::new().with("self", ContextObject::new("W").with("x", 1));
        let out = transpile("class A:\n    def get(self):\n        return self.x\n", Some(ctx)).unwrap();
        assert!(out.contains("    return this.x;\n"));
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // CALLABLE EXTRACTION
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_mixin_method_is_extracted_ahead_of_use() {
        let mixin = ContextObject::new("JSMixin").with("fun", callable("def fun(self):\n    console.log('ok')\n"));
        let ctx = ContextBinding::new().with("self", mixin);
        let out = transpile_body("def render(self):\n    self.fun()\n", Some(ctx)).unwrap();
        assert_eq!(
            out,
            "function JSMixin_fun() {\n    console.log('ok');\n}\nJSMixin_fun();\n"
        );
    }

    #[test]
    fn test_callable_is_extracted_once() {
        let mixin = ContextObject::new("JSMixin").with("fun", callable("def fun(self):\n    return 1\n"));
        let ctx = ContextBinding::new().with("self", mixin);
        let out = transpile_body("def render(self):\n    self.fun()\n    self.fun()\n", Some(ctx)).unwrap();
        assert_eq!(out.matches("function JSMixin_fun()").count(), 1);
        assert!(out.ends_with("JSMixin_fun();\nJSMixin_fun();\n"));
    }

    #[test]
    fn test_extraction_is_depth_first() {
        let ctx = ContextBinding::new()
            .with("a", callable("def a():\n    return b()\n"))
            .with("b", callable("def b():\n    return 1\n"));
        let out = transpile("a()\n", Some(ctx)).unwrap();
        assert_eq!(
            out,
            "function b() {\n    return 1;\n}\nfunction a() {\n    return b();\n}\na();\n"
        );
    }

    #[test]
    fn test_generated_names_do_not_collide() {
        let ctx = ContextBinding::new()
            .with("a", ContextObject::new("W").with("fun", callable("def fun():\n    return 1\n")))
            .with("b", ContextObject::new("W").with("fun", callable("def fun():\n    return 2\n")));
        let out = transpile("a.fun()\nb.fun()\n", Some(ctx)).unwrap();
        assert_eq!(
            out,
            "function W_fun() {\n    return 1;\n}\nfunction W_fun_2() {\n    return 2;\n}\nW_fun();\nW_fun_2();\n"
        );
    }

    #[test]
    fn test_declaring_owner_names_the_extraction() {
        let hook = callable("def click(self):\n    pass\n").owned_by("Base");
        let ctx = ContextBinding::new().with("self", ContextObject::new("Child").with("click", hook));
        let out = transpile_body("def f(self):\n    self.click()\n", Some(ctx)).unwrap();
        assert!(out.starts_with("function Base_click() {\n"));
        assert!(out.ends_with("Base_click();\n"));
    }

    #[test]
    fn test_extracted_callable_sees_the_same_context() {
        let widget = ContextObject::new("W")
            .with("label", "go")
            .with("show", callable("    def show(self):\n        console.log(self.label)\n"));
        let ctx = ContextBinding::new().with("self", widget);
        let out = transpile_body("def f(self):\n    self.show()\n", Some(ctx)).unwrap();
        assert_eq!(out, "function W_show() {\n    console.log(\"go\");\n}\nW_show();\n");
    }

    #[test]
    fn test_self_reference_is_a_cycle() {
        let ctx = ContextBinding::new().with("loop", callable("def loop():\n    return loop()\n"));
        let err = transpile("loop()\n", Some(ctx)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CyclicContext);
        assert_eq!(err.code, "P2J-ERR-CONTEXT-CYCLE");
    }

    #[test]
    fn test_mutual_reference_is_a_cycle() {
        let ctx = ContextBinding::new()
            .with("ping", callable("def ping():\n    return pong()\n"))
            .with("pong", callable("def pong():\n    return ping()\n"));
        let err = transpile("ping()\n", Some(ctx)).unwrap_err();
        assert_eq!(err.kind, ErrorKind::CyclicContext);
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // BINDER AND JSON FORM
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_binder_memoizes_by_identity() {
        let ctx = ContextBinding::new().with("f", callable("def f():\n    pass\n"));
        let mut binder = ContextBinder::new(Some(&ctx));
        let value = binder.lookup("f").unwrap();

        let first = binder.render(value, "f", None).unwrap();
        let second = binder.render(value, "f", None).unwrap();
        assert_eq!(first, Resolution::CallableRef("f".to_string()));
        assert_eq!(first, second);
        assert_eq!(binder.take_pending().len(), 1);
        assert!(binder.take_pending().is_empty());
    }

    #[test]
    fn test_binder_without_binding() {
        let binder = ContextBinder::new(None);
        assert!(!binder.has_binding());
        assert!(binder.lookup("anything").is_none());
    }

    #[test]
    fn test_callable_name_comes_from_def() {
        let c = callable("\n    async def fetch_all(self, url):\n        pass\n");
        assert_eq!(c.name, "fetch_all");
        let err = Callable::from_source("x = 1\n").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ContextResolution);
    }

    #[test]
    fn test_json_context() {
        let ctx = ContextBinding::from_json_str(
            r#"{
                "count": 3,
                "opts": {"a": [1, 2]},
                "self": {"$object": "Panel", "title": "Hi"},
                "helper": {"$source": "def h():\n    return 1\n", "$name": "helper"}
            }"#,
        )
        .unwrap();

        assert_eq!(ctx.get("count"), Some(&ContextValue::Int(3)));
        assert!(matches!(ctx.get("self"), Some(ContextValue::Object(o)) if o.name == "Panel"));
        assert!(matches!(ctx.get("helper"), Some(ContextValue::Callable(c)) if c.name == "helper"));

        let out = transpile("x = opts\ny = helper()\n", Some(ctx)).unwrap();
        assert_eq!(out, "function helper() {\n    return 1;\n}\nvar x = {\"a\": [1, 2]};\nvar y = helper();\n");
    }

    #[test]
    fn test_json_context_must_be_an_object() {
        let err = ContextBinding::from_json_str("[1, 2]").unwrap_err();
        assert_eq!(err.kind, ErrorKind::ContextResolution);
        assert!(ContextBinding::from_json_str("not json").is_err());
    }

    #[test]
    fn test_non_finite_floats() {
        assert_eq!(ContextValue::Float(f64::NAN).to_js_literal().unwrap().as_deref(), Some("NaN"));
        assert_eq!(
            ContextValue::Float(f64::NEG_INFINITY).to_js_literal().unwrap().as_deref(),
            Some("-Infinity")
        );
        assert_eq!(ContextValue::from(callable("def f():\n    pass\n")).to_js_literal().unwrap(), None);
    }
}
