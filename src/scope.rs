use std::collections::HashSet;

/// Outcome of binding a name in the current frame.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Declaration {
    /// First binding in this frame; emit the declaration form.
    Fresh,
    /// Already bound in this frame; emit a bare assignment.
    Reused,
}

impl Declaration {
    pub fn is_new(self) -> bool {
        self == Declaration::Fresh
    }
}

/// Names bound by one function (or lambda / comprehension) body.
#[derive(Debug, Clone, Default)]
pub struct ScopeFrame {
    names: HashSet<String>,
}

impl ScopeFrame {
    pub fn contains(&self, name: &str) -> bool {
        self.names.contains(name)
    }
}

/// Stack of frames, innermost last. The root frame holds module-level names.
#[derive(Debug, Clone)]
pub struct ScopeStack {
    frames: Vec<ScopeFrame>,
}

impl Default for ScopeStack {
    fn default() -> Self {
        Self::new()
    }
}

impl ScopeStack {
    pub fn new() -> Self {
        Self {
            frames: vec![ScopeFrame::default()],
        }
    }

    pub fn push_frame(&mut self) {
        self.frames.push(ScopeFrame::default());
    }

    pub fn pop_frame(&mut self) {
        debug_assert!(self.frames.len() > 1, "root frame popped");
        if self.frames.len() > 1 {
            self.frames.pop();
        }
    }

    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    fn current(&mut self) -> &mut ScopeFrame {
        // The root frame is never popped.
        let last = self.frames.len() - 1;
        &mut self.frames[last]
    }

    /// Bind `name` in the innermost frame. Outer frames are not consulted:
    /// assignment inside a function always makes a local.
    pub fn declare_or_reuse(&mut self, name: &str) -> Declaration {
        if self.current().names.insert(name.to_string()) {
            Declaration::Fresh
        } else {
            Declaration::Reused
        }
    }

    /// Mark a name as already bound without emitting anything
    /// (`global`, `nonlocal`, parameters, hoisted definitions).
    pub fn register(&mut self, name: &str) {
        self.current().names.insert(name.to_string());
    }

    pub fn is_declared_here(&self, name: &str) -> bool {
        self.frames.last().is_some_and(|f| f.contains(name))
    }

    /// Whether any enclosing frame binds `name`.
    pub fn is_bound(&self, name: &str) -> bool {
        self.frames.iter().rev().any(|f| f.contains(name))
    }
}
