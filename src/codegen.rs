//! Codegen module for the py2js compiler
//!
//! Statement half of the translator core. Statement rules write lines to the
//! unit's [`EmitBuffer`]; expression rules live in `expression.rs` and return
//! text fragments.

use crate::context::ContextBinder;
use crate::emit::EmitBuffer;
use crate::parse::{NodeKind, SyntaxNode};
use crate::scope::ScopeStack;
use crate::tables::{augmented_operator_symbol, reserved_name_substitute};
use crate::validate::{CompilerError, ErrorKind};

// ═══════════════════════════════════════════════════════════════════════════════
// TRANSLATOR
// ═══════════════════════════════════════════════════════════════════════════════

/// Per-unit translation state. The buffer, scopes and temporary counter belong
/// to this unit alone; the binder is shared with every unit of the compile.
pub struct Translator<'b, 'r> {
    pub(crate) buffer: EmitBuffer,
    pub(crate) scopes: ScopeStack,
    pub(crate) binder: &'r mut ContextBinder<'b>,
    temp_counter: usize,
    /// Multi-line dictionaries enclosing the expression being translated.
    pub(crate) dict_nesting: usize,
    /// Set while translating the second pass of a class body.
    class_name: Option<String>,
}

/// Decorators a method may carry.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum MethodDecorator {
    None,
    Static,
    /// Registered natively in the class body, without the forwarding wrapper.
    JavaScript,
}

#[derive(Debug, Clone)]
pub(crate) struct Param {
    pub name: String,
    pub default: Option<String>,
}

/// How the receiver of a function body is treated.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Receiver<'n> {
    Absent,
    /// Dropped from the parameter list and bound locally (`var me = this;`
    /// when it is not spelled `self`).
    Bound(&'n str),
    /// Dropped and left unbound so that it resolves through the context.
    Unbound,
}

impl<'b, 'r> Translator<'b, 'r> {
    pub fn new(binder: &'r mut ContextBinder<'b>, indent_width: usize) -> Self {
        Self {
            buffer: EmitBuffer::new(indent_width),
            scopes: ScopeStack::new(),
            binder,
            temp_counter: 0,
            dict_nesting: 0,
            class_name: None,
        }
    }

    /// Consume the translator, returning the unit text.
    pub fn finish(self) -> Result<String, CompilerError> {
        self.buffer.finish()
    }

    /// Fresh synthesized name, unique within this unit.
    pub(crate) fn temp_name(&mut self, stem: &str) -> String {
        let name = format!("__{}{}__", stem, self.temp_counter);
        self.temp_counter += 1;
        name
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // ENTRY POINTS
    // ═══════════════════════════════════════════════════════════════════════════

    pub fn translate_module(&mut self, root: SyntaxNode<'_>) -> Result<(), CompilerError> {
        for stmt in root.named_children() {
            self.statement(stmt)?;
        }
        Ok(())
    }

    /// Translate only the statements of the first function definition. The
    /// receiver stays unbound; other parameters are plain free names.
    pub fn translate_body(&mut self, root: SyntaxNode<'_>) -> Result<(), CompilerError> {
        let def = first_function(root)?;
        let params = self.parameters(def.field("parameters"))?;
        for (i, param) in params.iter().enumerate() {
            if i == 0 && param.name == "self" {
                continue;
            }
            self.scopes.register(&param.name);
        }
        self.block(required_field(def, "body")?)
    }

    /// Translate the first function definition as `function <name>(..)`,
    /// used for callables extracted from the context.
    pub fn translate_callable(&mut self, root: SyntaxNode<'_>, name: &str) -> Result<(), CompilerError> {
        let def = first_function(root)?;
        let mut params = self.parameters(def.field("parameters"))?;
        let receiver = if params.first().is_some_and(|p| p.name == "self") {
            params.remove(0);
            Receiver::Unbound
        } else {
            Receiver::Absent
        };
        let header = format!(
            "{}function {}({}) {{",
            async_prefix(def),
            name,
            param_list(&params)
        );
        self.function_body(header, &params, receiver, required_field(def, "body")?, "}")
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // STATEMENTS
    // ═══════════════════════════════════════════════════════════════════════════

    pub(crate) fn block(&mut self, block: SyntaxNode<'_>) -> Result<(), CompilerError> {
        for stmt in block.named_children() {
            self.statement(stmt)?;
        }
        Ok(())
    }

    pub(crate) fn statement(&mut self, node: SyntaxNode<'_>) -> Result<(), CompilerError> {
        match node.kind() {
            NodeKind::ExpressionStatement => self.expression_statement(node),
            NodeKind::FunctionDefinition => self.function_definition(node, &[]),
            NodeKind::DecoratedDefinition => self.decorated_definition(node),
            NodeKind::ClassDefinition => self.class_definition(node),
            NodeKind::ReturnStatement => {
                match node.first_named_child() {
                    Some(value) => {
                        let value = self.expression(value)?;
                        self.buffer.write(format!("return {};", value));
                    }
                    None => self.buffer.write("return;"),
                }
                Ok(())
            }
            NodeKind::PassStatement => {
                self.buffer.write("/* pass */");
                Ok(())
            }
            NodeKind::BreakStatement => {
                self.buffer.write("break;");
                Ok(())
            }
            NodeKind::ContinueStatement => {
                self.buffer.write("continue;");
                Ok(())
            }
            NodeKind::GlobalStatement | NodeKind::NonlocalStatement => {
                for name in node.named_children() {
                    self.scopes.register(name.text());
                }
                Ok(())
            }
            NodeKind::AssertStatement => self.assert_statement(node),
            NodeKind::RaiseStatement => self.raise_statement(node),
            NodeKind::IfStatement => self.if_statement(node),
            NodeKind::ForStatement => self.for_statement(node),
            NodeKind::WhileStatement => self.while_statement(node),
            NodeKind::PrintStatement => self.print_statement(node),
            NodeKind::Comment => Ok(()),

            NodeKind::TryStatement
            | NodeKind::WithStatement
            | NodeKind::ImportStatement
            | NodeKind::ImportFromStatement
            | NodeKind::FutureImportStatement
            | NodeKind::ExecStatement
            | NodeKind::DeleteStatement
            | NodeKind::MatchStatement
            | NodeKind::TypeAliasStatement => Err(unsupported(node)),

            NodeKind::Module
            | NodeKind::Block
            | NodeKind::Decorator
            | NodeKind::ElifClause
            | NodeKind::ElseClause
            | NodeKind::Assignment
            | NodeKind::AugmentedAssignment
            | NodeKind::Identifier
            | NodeKind::Attribute
            | NodeKind::Subscript
            | NodeKind::Slice
            | NodeKind::Call
            | NodeKind::ArgumentList
            | NodeKind::KeywordArgument
            | NodeKind::ListSplat
            | NodeKind::DictionarySplat
            | NodeKind::ParenthesizedExpression
            | NodeKind::BinaryOperator
            | NodeKind::UnaryOperator
            | NodeKind::NotOperator
            | NodeKind::BooleanOperator
            | NodeKind::ComparisonOperator
            | NodeKind::ConditionalExpression
            | NodeKind::Lambda
            | NodeKind::LambdaParameters
            | NodeKind::Await
            | NodeKind::Integer
            | NodeKind::Float
            | NodeKind::String
            | NodeKind::ConcatenatedString
            | NodeKind::True
            | NodeKind::False
            | NodeKind::None
            | NodeKind::List
            | NodeKind::Tuple
            | NodeKind::Set
            | NodeKind::Dictionary
            | NodeKind::Pair
            | NodeKind::ExpressionList
            | NodeKind::ListComprehension
            | NodeKind::SetComprehension
            | NodeKind::DictionaryComprehension
            | NodeKind::GeneratorExpression
            | NodeKind::ForInClause
            | NodeKind::IfClause
            | NodeKind::NamedExpression
            | NodeKind::Yield
            | NodeKind::Ellipsis
            | NodeKind::PatternList
            | NodeKind::TuplePattern
            | NodeKind::ListPattern
            | NodeKind::Parameters
            | NodeKind::DefaultParameter
            | NodeKind::TypedParameter
            | NodeKind::TypedDefaultParameter
            | NodeKind::ListSplatPattern
            | NodeKind::DictionarySplatPattern
            | NodeKind::KeywordSeparator
            | NodeKind::PositionalSeparator
            | NodeKind::Type
            | NodeKind::Error
            | NodeKind::Unknown => Err(unsupported(node)),
        }
    }

    fn expression_statement(&mut self, node: SyntaxNode<'_>) -> Result<(), CompilerError> {
        let children = node.named_children();
        match children.as_slice() {
            [single] => match single.kind() {
                NodeKind::Assignment => self.assignment(*single),
                NodeKind::AugmentedAssignment => self.augmented_assignment(*single),
                _ => {
                    let text = self.expression(*single)?;
                    self.buffer.write(format!("{};", text));
                    Ok(())
                }
            },
            // `a, b` on its own line
            items => {
                let text = self.sequence(items)?;
                self.buffer.write(format!("[{}];", text));
                Ok(())
            }
        }
    }

    fn assignment(&mut self, node: SyntaxNode<'_>) -> Result<(), CompilerError> {
        let left = required_field(node, "left")?;
        let right = node.field("right");

        if let Some(right) = right {
            if right.kind() == NodeKind::Assignment {
                return Err(CompilerError::unsupported("chained assignment", node.location()));
            }
        }

        let Some(right) = right else {
            // Bare annotation: `x: int`
            if left.kind() == NodeKind::Identifier
                && self.scopes.declare_or_reuse(left.text()).is_new()
            {
                self.buffer.write(format!("var {};", bound_name(left.text())));
            }
            return Ok(());
        };

        let value = self.expression(right)?;
        match left.kind() {
            NodeKind::Identifier => {
                let name = bound_name(left.text());
                if self.scopes.declare_or_reuse(left.text()).is_new() {
                    self.buffer.write(format!("var {} = {};", name, value));
                } else {
                    self.buffer.write(format!("{} = {};", name, value));
                }
            }
            NodeKind::Attribute | NodeKind::Subscript => {
                let target = self.assignment_target(left)?;
                self.buffer.write(format!("{} = {};", target, value));
            }
            NodeKind::PatternList | NodeKind::TuplePattern | NodeKind::ListPattern => {
                return Err(CompilerError::unsupported(
                    "destructuring assignment",
                    left.location(),
                ));
            }
            _ => return Err(unsupported(left)),
        }
        Ok(())
    }

    /// Attribute and subscript targets. The final attribute of a target is
    /// never resolved through the context.
    fn assignment_target(&mut self, target: SyntaxNode<'_>) -> Result<String, CompilerError> {
        match target.kind() {
            NodeKind::Identifier => Ok(bound_name(target.text())),
            NodeKind::Attribute => {
                let object = self.expression(required_field(target, "object")?)?;
                let attr = required_field(target, "attribute")?.text();
                Ok(format!("{}.{}", object, attr))
            }
            NodeKind::Subscript => {
                if target
                    .fields("subscript")
                    .iter()
                    .any(|s| s.kind() == NodeKind::Slice)
                {
                    return Err(CompilerError::unsupported("slice assignment", target.location()));
                }
                self.expression(target)
            }
            _ => Err(unsupported(target)),
        }
    }

    fn augmented_assignment(&mut self, node: SyntaxNode<'_>) -> Result<(), CompilerError> {
        let left = required_field(node, "left")?;
        let operator = required_field(node, "operator")?.text();
        let right = required_field(node, "right")?;

        let target = self.assignment_target(left)?;
        let value = self.expression(right)?;

        match operator {
            "**=" => self
                .buffer
                .write(format!("{} = Math.pow({}, {});", target, target, value)),
            "//=" => self.buffer.write(format!(
                "{} = Math.floor({} / {});",
                target,
                target,
                crate::expression::wrap_operand(right, value)
            )),
            "@=" => {
                return Err(CompilerError::unsupported(
                    "matrix multiplication (@=)",
                    node.location(),
                ))
            }
            _ => {
                let symbol = augmented_operator_symbol(operator).ok_or_else(|| {
                    CompilerError::internal(format!("No table entry for operator '{}'", operator))
                        .at(node.location())
                })?;
                self.buffer.write(format!("{} {}= {};", target, symbol, value));
            }
        }
        Ok(())
    }

    fn assert_statement(&mut self, node: SyntaxNode<'_>) -> Result<(), CompilerError> {
        let args = node.named_children();
        let mut parts = Vec::with_capacity(args.len());
        for arg in args {
            parts.push(self.expression(arg)?);
        }
        self.buffer.write(format!("assert({});", parts.join(", ")));
        Ok(())
    }

    fn raise_statement(&mut self, node: SyntaxNode<'_>) -> Result<(), CompilerError> {
        if node.field("cause").is_some() {
            return Err(CompilerError::unsupported("exception chaining (raise .. from)", node.location()));
        }
        let Some(exception) = node.first_named_child() else {
            return Err(CompilerError::unsupported("bare raise", node.location()));
        };
        let exception = self.expression(exception)?;
        self.buffer.write(format!("throw {};", exception));
        Ok(())
    }

    fn print_statement(&mut self, node: SyntaxNode<'_>) -> Result<(), CompilerError> {
        let mut parts = Vec::new();
        for child in node.named_children() {
            if child.raw_kind() == "chevron" {
                return Err(CompilerError::unsupported("print redirection (>>)", child.location()));
            }
            parts.push(self.expression(child)?);
        }
        self.buffer.write(format!("console.log({});", parts.join(", ")));
        Ok(())
    }

    fn if_statement(&mut self, node: SyntaxNode<'_>) -> Result<(), CompilerError> {
        let condition = self.expression(required_field(node, "condition")?)?;
        self.buffer.write(format!("if ({}) {{", condition));
        self.indented_block(required_field(node, "consequence")?)?;

        for alternative in node.fields("alternative") {
            match alternative.kind() {
                NodeKind::ElifClause => {
                    let condition = self.expression(required_field(alternative, "condition")?)?;
                    self.buffer.write(format!("}} else if ({}) {{", condition));
                    self.indented_block(required_field(alternative, "consequence")?)?;
                }
                NodeKind::ElseClause => {
                    self.buffer.write("} else {");
                    self.indented_block(required_field(alternative, "body")?)?;
                }
                _ => return Err(unsupported(alternative)),
            }
        }

        self.buffer.write("}");
        Ok(())
    }

    fn for_statement(&mut self, node: SyntaxNode<'_>) -> Result<(), CompilerError> {
        if node.has_token("async") {
            return Err(CompilerError::unsupported("async for", node.location()));
        }
        if node.field("alternative").is_some() {
            return Err(CompilerError::unsupported("for-else", node.location()));
        }

        let target = required_field(node, "left")?;
        if target.kind() != NodeKind::Identifier {
            return Err(CompilerError::unsupported(
                "destructuring loop target",
                target.location(),
            ));
        }

        let iterable = self.expression(required_field(node, "right")?)?;
        let name = bound_name(target.text());
        if self.scopes.declare_or_reuse(target.text()).is_new() {
            self.buffer.write(format!("for (var {} of {}) {{", name, iterable));
        } else {
            self.buffer.write(format!("for ({} of {}) {{", name, iterable));
        }
        self.indented_block(required_field(node, "body")?)?;
        self.buffer.write("}");
        Ok(())
    }

    fn while_statement(&mut self, node: SyntaxNode<'_>) -> Result<(), CompilerError> {
        let condition = self.expression(required_field(node, "condition")?)?;
        let body = required_field(node, "body")?;

        let Some(alternative) = node.field("alternative") else {
            self.buffer.write(format!("while ({}) {{", condition));
            self.indented_block(body)?;
            self.buffer.write("}");
            return Ok(());
        };

        // The sentinel is declared on a reserved line ahead of the loop.
        let sentinel = self.temp_name("orelse");
        let mark = self.buffer.reserve();
        self.buffer.write("while (true) {");
        self.buffer.indent();
        self.buffer.write(format!("if (!({})) {{", condition));
        self.buffer.indent();
        self.buffer.write(format!("{} = true;", sentinel));
        self.buffer.write("break;");
        self.buffer.dedent();
        self.buffer.write("}");
        self.block(body)?;
        self.buffer.dedent();
        self.buffer.write("}");
        self.buffer.patch(mark, format!("var {} = false;", sentinel));

        self.buffer.write(format!("if ({}) {{", sentinel));
        self.indented_block(required_field(alternative, "body")?)?;
        self.buffer.write("}");
        Ok(())
    }

    fn indented_block(&mut self, block: SyntaxNode<'_>) -> Result<(), CompilerError> {
        self.buffer.indent();
        self.block(block)?;
        self.buffer.dedent();
        Ok(())
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // FUNCTIONS
    // ═══════════════════════════════════════════════════════════════════════════

    fn decorated_definition(&mut self, node: SyntaxNode<'_>) -> Result<(), CompilerError> {
        let definition = required_field(node, "definition")?;
        let decorators: Vec<SyntaxNode<'_>> = node
            .named_children()
            .into_iter()
            .filter(|c| c.kind() == NodeKind::Decorator)
            .collect();

        match definition.kind() {
            NodeKind::FunctionDefinition => self.function_definition(definition, &decorators),
            _ => Err(CompilerError::unsupported("class decorator", node.location())),
        }
    }

    fn function_definition(
        &mut self,
        node: SyntaxNode<'_>,
        decorators: &[SyntaxNode<'_>],
    ) -> Result<(), CompilerError> {
        let decorator = method_decorator(decorators)?;
        if let Some(class) = self.class_name.clone() {
            return match decorator {
                // Registered during the first class pass.
                MethodDecorator::JavaScript => Ok(()),
                _ => self.method(&class, node, decorator),
            };
        }
        if decorator == MethodDecorator::Static {
            return Err(CompilerError::unsupported(
                "staticmethod outside a class",
                node.location(),
            ));
        }

        let name = required_field(node, "name")?.text();
        self.scopes.register(name);

        let mut params = self.parameters(node.field("parameters"))?;
        let body = required_field(node, "body")?;
        if params.first().is_some_and(|p| p.name == "self") {
            // Object-literal method shorthand, invoked with an implicit receiver.
            params.remove(0);
            let header = format!("{}{}({}) {{", async_prefix(node), name, param_list(&params));
            self.function_body(header, &params, Receiver::Unbound, body, "}")
        } else {
            let header = format!(
                "{}function {}({}) {{",
                async_prefix(node),
                name,
                param_list(&params)
            );
            self.function_body(header, &params, Receiver::Absent, body, "}")
        }
    }

    /// Method installed on the class prototype (second class pass).
    fn method(
        &mut self,
        class: &str,
        node: SyntaxNode<'_>,
        decorator: MethodDecorator,
    ) -> Result<(), CompilerError> {
        let name = required_field(node, "name")?.text();
        let mut params = self.parameters(node.field("parameters"))?;
        let body = required_field(node, "body")?;

        let receiver_name;
        let receiver = if decorator == MethodDecorator::Static {
            Receiver::Absent
        } else {
            if params.is_empty() {
                return Err(CompilerError::unsupported(
                    "method without a receiver parameter",
                    node.location(),
                ));
            }
            receiver_name = params.remove(0).name;
            Receiver::Bound(&receiver_name)
        };

        let header = format!(
            "{}.prototype.{} = {}function({}) {{",
            class,
            name,
            async_prefix(node),
            param_list(&params)
        );
        self.function_body(header, &params, receiver, body, "};")?;

        if decorator == MethodDecorator::Static {
            self.buffer
                .write(format!("{}.{} = {}.prototype.{};", class, name, class, name));
        } else {
            self.buffer.write(format!("{}.{} = function() {{", class, name));
            self.buffer.indent();
            self.buffer.write(format!(
                "return {}.prototype.{}.apply(arguments[0], Array.prototype.slice.call(arguments, 1));",
                class, name
            ));
            self.buffer.dedent();
            self.buffer.write("};");
        }
        Ok(())
    }

    /// `@JavaScript` method, registered as shorthand inside the class braces.
    fn native_method(&mut self, node: SyntaxNode<'_>) -> Result<(), CompilerError> {
        let name = required_field(node, "name")?.text();
        let mut params = self.parameters(node.field("parameters"))?;
        let body = required_field(node, "body")?;

        let receiver_name;
        let receiver = if params.is_empty() {
            Receiver::Absent
        } else {
            receiver_name = params.remove(0).name;
            Receiver::Bound(&receiver_name)
        };
        let header = format!("{}{}({}) {{", async_prefix(node), name, param_list(&params));
        self.function_body(header, &params, receiver, body, "}")
    }

    fn function_body(
        &mut self,
        header: String,
        params: &[Param],
        receiver: Receiver<'_>,
        body: SyntaxNode<'_>,
        closer: &str,
    ) -> Result<(), CompilerError> {
        let saved_class = self.class_name.take();

        self.buffer.write(header);
        self.buffer.indent();
        self.scopes.push_frame();

        for param in params {
            self.scopes.register(&param.name);
        }
        for param in params {
            if let Some(default) = &param.default {
                self.buffer.write(format!(
                    "{} = typeof({}) != 'undefined' ? {} : {};",
                    param.name, param.name, param.name, default
                ));
            }
        }
        if let Receiver::Bound(name) = receiver {
            self.scopes.register(name);
            if name != "self" {
                self.buffer.write(format!("var {} = this;", name));
            }
        }

        let result = self.block(body);

        self.scopes.pop_frame();
        self.buffer.dedent();
        self.buffer.write(closer);
        self.class_name = saved_class;
        result
    }

    /// Parameter names and translated defaults. Defaults are translated in the
    /// enclosing scope, where Python evaluates them.
    pub(crate) fn parameters(
        &mut self,
        params: Option<SyntaxNode<'_>>,
    ) -> Result<Vec<Param>, CompilerError> {
        let Some(params) = params else {
            return Ok(Vec::new());
        };

        let mut out = Vec::new();
        for param in params.named_children() {
            match param.kind() {
                NodeKind::Identifier => out.push(Param {
                    name: param.text().to_string(),
                    default: None,
                }),
                NodeKind::DefaultParameter | NodeKind::TypedDefaultParameter => {
                    let name = required_field(param, "name")?;
                    if name.kind() != NodeKind::Identifier {
                        return Err(CompilerError::unsupported(
                            "tuple parameter",
                            name.location(),
                        ));
                    }
                    let default = self.expression(required_field(param, "value")?)?;
                    out.push(Param {
                        name: name.text().to_string(),
                        default: Some(default),
                    });
                }
                NodeKind::TypedParameter => {
                    let inner = param
                        .first_named_child()
                        .ok_or_else(|| CompilerError::internal("Typed parameter without a name"))?;
                    if inner.kind() != NodeKind::Identifier {
                        return Err(unsupported(inner));
                    }
                    out.push(Param {
                        name: inner.text().to_string(),
                        default: None,
                    });
                }
                NodeKind::PositionalSeparator => {}
                NodeKind::TuplePattern | NodeKind::ListPattern => {
                    return Err(CompilerError::unsupported("tuple parameter", param.location()));
                }
                _ => return Err(unsupported(param)),
            }
        }
        Ok(out)
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // CLASSES
    // ═══════════════════════════════════════════════════════════════════════════

    fn class_definition(&mut self, node: SyntaxNode<'_>) -> Result<(), CompilerError> {
        let name = required_field(node, "name")?.text().to_string();
        let base = self.class_base(node)?;
        let body = required_field(node, "body")?;
        let members = body.named_children();
        self.scopes.register(&name);

        // Pass 1: constructor and natively registered methods.
        match &base {
            Some(base) => self.buffer.write(format!("class {} extends {} {{", name, base)),
            None => self.buffer.write(format!("class {} {{", name)),
        }
        self.buffer.indent();

        let defines_init = members
            .iter()
            .filter_map(|m| member_function(*m))
            .any(|(def, _)| def.field("name").is_some_and(|n| n.text() == "__init__"));
        if defines_init {
            self.buffer.write("constructor(...args) {");
            self.buffer.indent();
            if base.is_some() {
                self.buffer.write("super(...args);");
            }
            self.buffer.write("this.__init__(...args);");
            self.buffer.dedent();
            self.buffer.write("}");
        }

        for (def, decorators) in members.iter().filter_map(|m| member_function(*m)) {
            if method_decorator(&decorators)? == MethodDecorator::JavaScript {
                self.native_method(def)?;
            }
        }

        self.buffer.dedent();
        self.buffer.write("}");

        // Pass 2: class attributes and prototype methods.
        let saved = self.class_name.replace(name.clone());
        let result = members
            .iter()
            .try_for_each(|member| self.class_member(&name, *member));
        self.class_name = saved;
        result
    }

    fn class_base(&mut self, node: SyntaxNode<'_>) -> Result<Option<String>, CompilerError> {
        let Some(superclasses) = node.field("superclasses") else {
            return Ok(None);
        };
        let bases = superclasses.named_children();
        match bases.as_slice() {
            [] => Ok(None),
            [base] if base.kind() == NodeKind::Identifier => {
                if base.text() == "object" {
                    Ok(None)
                } else {
                    Ok(Some(base.text().to_string()))
                }
            }
            [base] => Err(CompilerError::unsupported(
                "class base other than a bare name",
                base.location(),
            )),
            _ => Err(CompilerError::unsupported(
                "multiple inheritance",
                superclasses.location(),
            )),
        }
    }

    fn class_member(&mut self, class: &str, member: SyntaxNode<'_>) -> Result<(), CompilerError> {
        if member.kind() == NodeKind::ExpressionStatement {
            let children = member.named_children();
            if let [assignment] = children.as_slice() {
                if assignment.kind() == NodeKind::Assignment {
                    return self.class_attribute(class, *assignment);
                }
            }
        }
        self.statement(member)
    }

    fn class_attribute(&mut self, class: &str, node: SyntaxNode<'_>) -> Result<(), CompilerError> {
        let left = required_field(node, "left")?;
        if left.kind() != NodeKind::Identifier {
            return Err(CompilerError::unsupported(
                "class attribute target other than a name",
                left.location(),
            ));
        }
        let Some(right) = node.field("right") else {
            return Ok(());
        };
        if right.kind() == NodeKind::Assignment {
            return Err(CompilerError::unsupported("chained assignment", node.location()));
        }

        let attr = left.text();
        let value = self.expression(right)?;
        self.buffer.write(format!("{}.{} = {};", class, attr, value));
        self.buffer
            .write(format!("{}.prototype.{} = {}.{};", class, attr, class, attr));
        Ok(())
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

pub(crate) fn required_field<'t>(
    node: SyntaxNode<'t>,
    name: &str,
) -> Result<SyntaxNode<'t>, CompilerError> {
    node.field(name).ok_or_else(|| {
        CompilerError::internal(format!("{:?} has no '{}' field", node, name)).at(node.location())
    })
}

/// Error for a node kind or shape with no translation rule.
pub(crate) fn unsupported(node: SyntaxNode<'_>) -> CompilerError {
    let construct = match node.kind().describe() {
        "syntax" => node.raw_kind(),
        described => described,
    };
    CompilerError::unsupported(construct, node.location())
}

/// Spelling of a locally bound name: reserved substitution only, never
/// builtin routing.
pub(crate) fn bound_name(name: &str) -> String {
    reserved_name_substitute(name).unwrap_or(name).to_string()
}

pub(crate) fn param_list(params: &[Param]) -> String {
    params
        .iter()
        .map(|p| p.name.as_str())
        .collect::<Vec<_>>()
        .join(", ")
}

fn async_prefix(def: SyntaxNode<'_>) -> &'static str {
    if def.has_token("async") {
        "async "
    } else {
        ""
    }
}

fn method_decorator(decorators: &[SyntaxNode<'_>]) -> Result<MethodDecorator, CompilerError> {
    match decorators {
        [] => Ok(MethodDecorator::None),
        [decorator] => {
            let name = decorator.first_named_child();
            match name.map(|n| (n.kind(), n.text())) {
                Some((NodeKind::Identifier, "staticmethod")) => Ok(MethodDecorator::Static),
                Some((NodeKind::Identifier, "JavaScript")) => Ok(MethodDecorator::JavaScript),
                _ => Err(CompilerError::unsupported(
                    "decorator",
                    decorator.location(),
                )
                .with_hint("Only @staticmethod and @JavaScript are translated")),
            }
        }
        _ => Err(CompilerError::unsupported(
            "multiple decorators",
            decorators[0].location(),
        )),
    }
}

/// Function definitions directly in a class body, with their decorators.
fn member_function(member: SyntaxNode<'_>) -> Option<(SyntaxNode<'_>, Vec<SyntaxNode<'_>>)> {
    match member.kind() {
        NodeKind::FunctionDefinition => Some((member, Vec::new())),
        NodeKind::DecoratedDefinition => {
            let definition = member.field("definition")?;
            if definition.kind() != NodeKind::FunctionDefinition {
                return None;
            }
            let decorators = member
                .named_children()
                .into_iter()
                .filter(|c| c.kind() == NodeKind::Decorator)
                .collect();
            Some((definition, decorators))
        }
        _ => None,
    }
}

fn first_function(root: SyntaxNode<'_>) -> Result<SyntaxNode<'_>, CompilerError> {
    root.named_children()
        .into_iter()
        .find_map(|stmt| match stmt.kind() {
            NodeKind::FunctionDefinition => Some(stmt),
            NodeKind::DecoratedDefinition => stmt
                .field("definition")
                .filter(|d| d.kind() == NodeKind::FunctionDefinition),
            _ => None,
        })
        .ok_or_else(|| {
            CompilerError::detached(ErrorKind::Parse, "Source contains no function definition")
        })
}
