#[cfg(test)]
mod tests {
    use crate::emit::EmitBuffer;
    use crate::scope::{Declaration, ScopeStack};
    use crate::validate::ErrorKind;

    // ═══════════════════════════════════════════════════════════════════════════════
    // EMIT BUFFER
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_lines_carry_indentation_of_their_depth() {
        let mut buffer = EmitBuffer::default();
        buffer.write("if (a) {");
        buffer.indent();
        buffer.write("b();");
        buffer.dedent();
        buffer.write("}");
        assert_eq!(buffer.read(), "if (a) {\n    b();\n}\n");
        assert_eq!(buffer.last_line(), Some("}"));
    }

    #[test]
    fn test_custom_indent_width() {
        let mut buffer = EmitBuffer::new(2);
        buffer.indent();
        buffer.write("x;");
        assert_eq!(buffer.indentation(), "  ");
        assert_eq!(buffer.indent_unit(), "  ");
        buffer.dedent();
        assert_eq!(buffer.finish().unwrap(), "  x;\n");
    }

    #[test]
    fn test_patch_fills_reserved_line_at_its_depth() {
        let mut buffer = EmitBuffer::default();
        buffer.indent();
        let mark = buffer.reserve();
        buffer.write("loop();");
        buffer.dedent();
        buffer.patch(mark, "var s = false;");
        assert_eq!(buffer.finish().unwrap(), "    var s = false;\n    loop();\n");
    }

    #[test]
    fn test_unpatched_reservation_is_internal_error() {
        let mut buffer = EmitBuffer::default();
        let _mark = buffer.reserve();
        buffer.write("x;");
        assert_eq!(buffer.read(), "x;\n");
        let err = buffer.finish().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
    }

    #[test]
    fn test_unbalanced_depth_is_internal_error() {
        let mut buffer = EmitBuffer::default();
        buffer.write("{");
        buffer.indent();
        let err = buffer.finish().unwrap_err();
        assert_eq!(err.kind, ErrorKind::Internal);
        assert!(err.message.contains("depth 1"));
    }

    #[test]
    fn test_empty_buffer_reads_empty() {
        let buffer = EmitBuffer::default();
        assert!(buffer.is_empty());
        assert_eq!(buffer.last_line(), None);
        assert_eq!(buffer.finish().unwrap(), "");
    }

    // ═══════════════════════════════════════════════════════════════════════════════
    // SCOPE STACK
    // ═══════════════════════════════════════════════════════════════════════════════

    #[test]
    fn test_declare_once_per_frame() {
        let mut scopes = ScopeStack::new();
        assert_eq!(scopes.declare_or_reuse("x"), Declaration::Fresh);
        assert_eq!(scopes.declare_or_reuse("x"), Declaration::Reused);
        assert!(scopes.is_declared_here("x"));
    }

    #[test]
    fn test_inner_frame_declares_its_own_local() {
        let mut scopes = ScopeStack::new();
        scopes.declare_or_reuse("x");
        scopes.push_frame();
        assert_eq!(scopes.depth(), 2);
        assert!(scopes.is_bound("x"));
        assert!(!scopes.is_declared_here("x"));
        assert!(scopes.declare_or_reuse("x").is_new());
        scopes.pop_frame();
        assert_eq!(scopes.depth(), 1);
    }

    #[test]
    fn test_registered_names_are_reused() {
        let mut scopes = ScopeStack::new();
        scopes.push_frame();
        scopes.register("counter");
        assert_eq!(scopes.declare_or_reuse("counter"), Declaration::Reused);
        scopes.pop_frame();
        assert!(!scopes.is_bound("counter"));
    }
}
