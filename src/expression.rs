//! Expression half of the translator core.
//!
//! Every rule returns a text fragment. Identifiers and attribute chains go
//! through the context binder before generic translation.

use crate::codegen::{bound_name, required_field, unsupported, Translator};
use crate::context::{ContextValue, Resolution};
use crate::literal::{
    decode_escapes, escape_template, lower_number, lower_string, quote_repr, split_string,
    split_string_range, string_value,
};
use crate::parse::{NodeKind, SyntaxNode};
use crate::tables::{
    binary_operator_symbol, boolean_operator_symbol, comparison_operator_symbol, translate_name,
    unary_operator_symbol, HELPER_NAMESPACE,
};
use crate::validate::CompilerError;

/// A context value reached through an identifier or attribute chain.
struct ContextHit<'b> {
    value: &'b ContextValue,
    access: String,
    owner: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Comprehension {
    List,
    Set,
    Dict,
}

impl<'b, 'r> Translator<'b, 'r> {
    pub(crate) fn expression(&mut self, node: SyntaxNode<'_>) -> Result<String, CompilerError> {
        match node.kind() {
            NodeKind::Identifier => self.identifier(node),
            NodeKind::Attribute => self.attribute(node),
            NodeKind::Subscript => self.subscript(node),
            NodeKind::Call => self.call(node),
            NodeKind::ParenthesizedExpression => {
                let inner = node
                    .first_named_child()
                    .ok_or_else(|| CompilerError::internal("Empty parentheses").at(node.location()))?;
                let text = self.expression(inner)?;
                Ok(wrap_operand(inner, text))
            }
            NodeKind::BinaryOperator => self.binary(node),
            NodeKind::UnaryOperator => {
                let operator = required_field(node, "operator")?.text();
                let symbol = unary_operator_symbol(operator).ok_or_else(|| {
                    CompilerError::internal(format!("No table entry for operator '{}'", operator))
                        .at(node.location())
                })?;
                let argument = self.expression(required_field(node, "argument")?)?;
                Ok(format!("{}({})", symbol, argument))
            }
            NodeKind::NotOperator => {
                let argument = self.expression(required_field(node, "argument")?)?;
                Ok(format!("!({})", argument))
            }
            NodeKind::BooleanOperator => self.boolean(node),
            NodeKind::ComparisonOperator => self.comparison(node),
            NodeKind::ConditionalExpression => {
                let parts = node.named_children();
                let [body, condition, alternative] = parts.as_slice() else {
                    return Err(unsupported(node));
                };
                let condition = self.expression(*condition)?;
                let body = self.expression(*body)?;
                let alternative = self.expression(*alternative)?;
                Ok(format!("({} ? {} : {})", condition, body, alternative))
            }
            NodeKind::Lambda => self.lambda(node),
            NodeKind::Await => {
                let inner = node
                    .first_named_child()
                    .ok_or_else(|| CompilerError::internal("Empty await").at(node.location()))?;
                Ok(format!("await {}", self.expression(inner)?))
            }
            NodeKind::Integer | NodeKind::Float => lower_number(node.text(), node.location()),
            NodeKind::String => self.string(node),
            NodeKind::ConcatenatedString => self.concatenated_string(node),
            NodeKind::True => Ok("true".to_string()),
            NodeKind::False => Ok("false".to_string()),
            NodeKind::None => Ok("null".to_string()),
            NodeKind::List | NodeKind::Tuple | NodeKind::ExpressionList => {
                let items = node.named_children();
                Ok(format!("[{}]", self.sequence(&items)?))
            }
            NodeKind::Set => {
                let items = node.named_children();
                Ok(format!("new Set([{}])", self.sequence(&items)?))
            }
            NodeKind::Dictionary => self.dictionary(node),
            NodeKind::ListComprehension | NodeKind::GeneratorExpression => {
                self.comprehension(node, Comprehension::List)
            }
            NodeKind::SetComprehension => self.comprehension(node, Comprehension::Set),
            NodeKind::DictionaryComprehension => self.comprehension(node, Comprehension::Dict),

            NodeKind::NamedExpression
            | NodeKind::Yield
            | NodeKind::Ellipsis
            | NodeKind::ListSplat
            | NodeKind::DictionarySplat
            | NodeKind::PatternList
            | NodeKind::TuplePattern
            | NodeKind::ListPattern
            | NodeKind::ListSplatPattern
            | NodeKind::DictionarySplatPattern => Err(unsupported(node)),

            NodeKind::Slice => Err(CompilerError::unsupported(
                "slice outside a subscript",
                node.location(),
            )),

            NodeKind::Module
            | NodeKind::Block
            | NodeKind::ExpressionStatement
            | NodeKind::FunctionDefinition
            | NodeKind::DecoratedDefinition
            | NodeKind::Decorator
            | NodeKind::ClassDefinition
            | NodeKind::ReturnStatement
            | NodeKind::PassStatement
            | NodeKind::BreakStatement
            | NodeKind::ContinueStatement
            | NodeKind::GlobalStatement
            | NodeKind::NonlocalStatement
            | NodeKind::AssertStatement
            | NodeKind::RaiseStatement
            | NodeKind::IfStatement
            | NodeKind::ElifClause
            | NodeKind::ElseClause
            | NodeKind::ForStatement
            | NodeKind::WhileStatement
            | NodeKind::PrintStatement
            | NodeKind::TryStatement
            | NodeKind::WithStatement
            | NodeKind::ImportStatement
            | NodeKind::ImportFromStatement
            | NodeKind::FutureImportStatement
            | NodeKind::ExecStatement
            | NodeKind::DeleteStatement
            | NodeKind::MatchStatement
            | NodeKind::TypeAliasStatement
            | NodeKind::Assignment
            | NodeKind::AugmentedAssignment
            | NodeKind::ArgumentList
            | NodeKind::KeywordArgument
            | NodeKind::LambdaParameters
            | NodeKind::Pair
            | NodeKind::ForInClause
            | NodeKind::IfClause
            | NodeKind::Parameters
            | NodeKind::DefaultParameter
            | NodeKind::TypedParameter
            | NodeKind::TypedDefaultParameter
            | NodeKind::KeywordSeparator
            | NodeKind::PositionalSeparator
            | NodeKind::Type
            | NodeKind::Comment
            | NodeKind::Error
            | NodeKind::Unknown => Err(unsupported(node)),
        }
    }

    /// Comma-joined elements of a list, tuple or set, with `*x` spreads.
    pub(crate) fn sequence(&mut self, items: &[SyntaxNode<'_>]) -> Result<String, CompilerError> {
        let mut parts = Vec::with_capacity(items.len());
        for item in items {
            if item.kind() == NodeKind::ListSplat {
                let inner = item
                    .first_named_child()
                    .ok_or_else(|| CompilerError::internal("Empty splat").at(item.location()))?;
                parts.push(format!("...{}", self.expression(inner)?));
            } else {
                parts.push(self.expression(*item)?);
            }
        }
        Ok(parts.join(", "))
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // NAMES AND CONTEXT
    // ═══════════════════════════════════════════════════════════════════════════

    fn identifier(&mut self, node: SyntaxNode<'_>) -> Result<String, CompilerError> {
        let name = node.text();
        if self.scopes.is_bound(name) {
            return Ok(bound_name(name));
        }
        if let Some(text) = self.resolve_context(node)? {
            return Ok(text);
        }
        Ok(translate_name(name))
    }

    fn attribute(&mut self, node: SyntaxNode<'_>) -> Result<String, CompilerError> {
        let object = required_field(node, "object")?;
        let attr = required_field(node, "attribute")?.text();

        if object.kind() == NodeKind::Identifier
            && object.text() == "new"
            && !self.scopes.is_bound("new")
            && self.binder.lookup("new").is_none()
        {
            return Ok(format!("new {}", attr));
        }

        if let Some(text) = self.resolve_context(node)? {
            return Ok(text);
        }

        let base = self.expression(object)?;
        Ok(format!("{}.{}", wrap_receiver(object, base), attr))
    }

    /// Text for a context hit, or `None` when generic translation applies.
    fn resolve_context(&mut self, node: SyntaxNode<'_>) -> Result<Option<String>, CompilerError> {
        let Some(hit) = self.context_value(node)? else {
            return Ok(None);
        };
        let resolution = self
            .binder
            .render(hit.value, &hit.access, hit.owner.as_deref())
            .map_err(|e| e.at(node.location()))?;
        match resolution {
            Resolution::Literal(text) | Resolution::CallableRef(text) => Ok(Some(text)),
            Resolution::Unresolved => Ok(None),
        }
    }

    fn context_value(&self, node: SyntaxNode<'_>) -> Result<Option<ContextHit<'b>>, CompilerError> {
        match node.kind() {
            NodeKind::Identifier => {
                let name = node.text();
                if self.scopes.is_bound(name) {
                    return Ok(None);
                }
                Ok(self.binder.lookup(name).map(|value| ContextHit {
                    value,
                    access: name.to_string(),
                    owner: None,
                }))
            }
            NodeKind::Attribute => {
                let Some(base) = self.context_value(required_field(node, "object")?)? else {
                    return Ok(None);
                };
                let attr = required_field(node, "attribute")?.text();
                let owner = match base.value {
                    ContextValue::Object(object) => Some(object.name.clone()),
                    _ => None,
                };
                let found = self
                    .binder
                    .lookup_attribute(base.value, attr)
                    .map_err(|e| e.at(node.location()))?;
                Ok(found.map(|value| ContextHit {
                    value,
                    access: attr.to_string(),
                    owner,
                }))
            }
            _ => Ok(None),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // SUBSCRIPTS AND CALLS
    // ═══════════════════════════════════════════════════════════════════════════

    fn subscript(&mut self, node: SyntaxNode<'_>) -> Result<String, CompilerError> {
        let value = required_field(node, "value")?;
        let indices = node.fields("subscript");
        let [index] = indices.as_slice() else {
            return Err(CompilerError::unsupported(
                "multi-index subscript",
                node.location(),
            ));
        };

        let base = wrap_receiver(value, self.expression(value)?);
        if index.kind() == NodeKind::Slice {
            return self.slice(base, *index);
        }
        let index = self.expression(*index)?;
        Ok(format!("{}[{}]", base, index))
    }

    fn slice(&mut self, base: String, slice: SyntaxNode<'_>) -> Result<String, CompilerError> {
        // lower : upper : step
        let mut bounds: [Option<SyntaxNode<'_>>; 3] = [None, None, None];
        let mut position = 0;
        for child in slice.children() {
            if !child.is_named() {
                if child.raw_kind() == ":" {
                    position += 1;
                }
                continue;
            }
            if position < 3 {
                bounds[position] = Some(child);
            }
        }

        let mut translated = [None, None, None];
        for (slot, bound) in translated.iter_mut().zip(bounds) {
            if let Some(bound) = bound {
                *slot = Some(self.expression(bound)?);
            }
        }

        let arguments = match translated {
            [None, None, None] => "null".to_string(),
            [Some(lower), None, None] => format!("{}, null", lower),
            [None, Some(upper), None] => upper,
            [Some(lower), Some(upper), None] => format!("{}, {}", lower, upper),
            [lower, upper, Some(step)] => format!(
                "{}, {}, {}",
                lower.unwrap_or_else(|| "null".to_string()),
                upper.unwrap_or_else(|| "null".to_string()),
                step
            ),
        };
        Ok(format!("{}.__getitem__({}.slice({}))", base, HELPER_NAMESPACE, arguments))
    }

    fn call(&mut self, node: SyntaxNode<'_>) -> Result<String, CompilerError> {
        let function = required_field(node, "function")?;
        let arguments = required_field(node, "arguments")?;

        let special = function.kind() == NodeKind::Identifier
            && matches!(function.text(), "len" | "range")
            && !self.scopes.is_bound(function.text())
            && self.binder.lookup(function.text()).is_none();
        let callee = if special {
            None
        } else {
            Some(self.expression(function)?)
        };

        let mut positional = Vec::new();
        let mut keywords = Vec::new();
        if arguments.kind() == NodeKind::GeneratorExpression {
            positional.push(self.expression(arguments)?);
        } else {
            for arg in arguments.named_children() {
                match arg.kind() {
                    NodeKind::KeywordArgument => {
                        let name = required_field(arg, "name")?.text();
                        let value = self.expression(required_field(arg, "value")?)?;
                        keywords.push(format!("{}: {}", name, value));
                    }
                    NodeKind::ListSplat => {
                        return Err(CompilerError::unsupported("star arguments", arg.location()))
                    }
                    NodeKind::DictionarySplat => {
                        return Err(CompilerError::unsupported(
                            "keyword arguments",
                            arg.location(),
                        ))
                    }
                    _ => positional.push(self.expression(arg)?),
                }
            }
        }

        let callee = match callee {
            Some(callee) => callee,
            None => {
                if keywords.is_empty() {
                    if function.text() == "len" && arguments.kind() == NodeKind::ArgumentList {
                        if let (Some(first), Some(text)) =
                            (arguments.first_named_child(), positional.first_mut())
                        {
                            *text = wrap_receiver(first, std::mem::take(text));
                        }
                    }
                    if let Some(text) = special_call(function.text(), &positional) {
                        return Ok(text);
                    }
                }
                translate_name(function.text())
            }
        };

        if keywords.is_empty() {
            Ok(format!("{}({})", callee, positional.join(", ")))
        } else {
            Ok(format!(
                "{}.args([{}], {{{}}})",
                callee,
                positional.join(", "),
                keywords.join(", ")
            ))
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // OPERATORS
    // ═══════════════════════════════════════════════════════════════════════════

    fn binary(&mut self, node: SyntaxNode<'_>) -> Result<String, CompilerError> {
        let left = required_field(node, "left")?;
        let operator = required_field(node, "operator")?.raw_kind();
        let right = required_field(node, "right")?;

        if operator == "@" {
            return Err(CompilerError::unsupported(
                "matrix multiplication (@)",
                node.location(),
            ));
        }

        if operator == "%" && is_plain_string(left) {
            let format = self.expression(left)?;
            let args = self.expression(right)?;
            return Ok(match right.kind() {
                NodeKind::Tuple | NodeKind::List => format!("vsprintf({}, {})", format, args),
                _ => format!("sprintf({}, {})", format, args),
            });
        }

        let l = self.expression(left)?;
        let r = self.expression(right)?;
        match operator {
            "**" => Ok(format!("Math.pow({}, {})", l, r)),
            "//" => Ok(format!(
                "Math.floor({} / {})",
                wrap_operand(left, l),
                wrap_operand(right, r)
            )),
            _ => {
                let symbol = binary_operator_symbol(operator).ok_or_else(|| {
                    CompilerError::internal(format!("No table entry for operator '{}'", operator))
                        .at(node.location())
                })?;
                Ok(format!("({} {} {})", l, symbol, r))
            }
        }
    }

    fn boolean(&mut self, node: SyntaxNode<'_>) -> Result<String, CompilerError> {
        let operator = required_field(node, "operator")?.raw_kind();
        let symbol = boolean_operator_symbol(operator).ok_or_else(|| {
            CompilerError::internal(format!("No table entry for operator '{}'", operator))
                .at(node.location())
        })?;

        let mut operands = Vec::new();
        self.boolean_operands(node, operator, &mut operands)?;
        Ok(format!("({})", operands.join(&format!(" {} ", symbol))))
    }

    /// Flatten same-operator chains: `a and b and c` is one group.
    fn boolean_operands(
        &mut self,
        node: SyntaxNode<'_>,
        operator: &str,
        out: &mut Vec<String>,
    ) -> Result<(), CompilerError> {
        for side in [required_field(node, "left")?, required_field(node, "right")?] {
            let same_operator = side.kind() == NodeKind::BooleanOperator
                && side.field("operator").is_some_and(|o| o.raw_kind() == operator);
            if same_operator {
                self.boolean_operands(side, operator, out)?;
            } else {
                out.push(self.expression(side)?);
            }
        }
        Ok(())
    }

    fn comparison(&mut self, node: SyntaxNode<'_>) -> Result<String, CompilerError> {
        let operands = node.named_children();
        let operators = node.fields("operators");
        let ([left, right], [operator]) = (operands.as_slice(), operators.as_slice()) else {
            return Err(CompilerError::unsupported(
                "chained comparison",
                node.location(),
            ));
        };

        let l = self.expression(*left)?;
        let r = self.expression(*right)?;
        match operator.raw_kind() {
            "in" => Ok(format!("{}.includes({})", wrap_receiver(*right, r), l)),
            "not in" => Ok(format!("!({}.includes({}))", wrap_receiver(*right, r), l)),
            op => {
                let symbol = comparison_operator_symbol(op).ok_or_else(|| {
                    CompilerError::internal(format!("No table entry for operator '{}'", op))
                        .at(node.location())
                })?;
                Ok(format!("{} {} {}", l, symbol, r))
            }
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // FUNCTIONS AS VALUES
    // ═══════════════════════════════════════════════════════════════════════════

    fn lambda(&mut self, node: SyntaxNode<'_>) -> Result<String, CompilerError> {
        let params = self.parameters(node.field("parameters"))?;
        let body = required_field(node, "body")?;

        self.scopes.push_frame();
        for param in &params {
            self.scopes.register(&param.name);
        }
        let body = self.expression(body);
        self.scopes.pop_frame();
        let body = body?;

        let signature = params
            .iter()
            .map(|p| match &p.default {
                Some(default) => format!("{} = {}", p.name, default),
                None => p.name.clone(),
            })
            .collect::<Vec<_>>()
            .join(", ");

        let depth = self.buffer.depth();
        Ok(format!(
            "\n{}({}) => {{return {}}}\n{}",
            self.buffer.indentation_at(depth + 1),
            signature,
            body,
            self.buffer.indentation_at(depth)
        ))
    }

    fn comprehension(
        &mut self,
        node: SyntaxNode<'_>,
        shape: Comprehension,
    ) -> Result<String, CompilerError> {
        self.scopes.push_frame();
        let generator = self.generator_function(node, shape);
        self.scopes.pop_frame();
        let generator = generator?;

        Ok(match shape {
            Comprehension::List => format!("[...{}]", generator),
            Comprehension::Set => format!("new Set([...{}])", generator),
            Comprehension::Dict => format!("Object.fromEntries([...{}])", generator),
        })
    }

    /// `(function* () { for (..) { if (..) { yield v } } }).call(this)`
    fn generator_function(
        &mut self,
        node: SyntaxNode<'_>,
        shape: Comprehension,
    ) -> Result<String, CompilerError> {
        let body = required_field(node, "body")?;
        let mut head = String::new();
        let mut opened = 0;

        for clause in node.named_children().into_iter().skip(1) {
            match clause.kind() {
                NodeKind::ForInClause => {
                    if clause.has_token("async") {
                        return Err(CompilerError::unsupported("async comprehension", clause.location()));
                    }
                    let iterable = self.expression(required_field(clause, "right")?)?;
                    let target = self.comprehension_target(required_field(clause, "left")?)?;
                    head.push_str(&format!("for (const {} of {}) {{ ", target, iterable));
                }
                NodeKind::IfClause => {
                    let condition = clause
                        .first_named_child()
                        .ok_or_else(|| CompilerError::internal("Empty if clause").at(clause.location()))?;
                    head.push_str(&format!("if ({}) {{ ", self.expression(condition)?));
                }
                _ => return Err(unsupported(clause)),
            }
            opened += 1;
        }

        let value = match shape {
            Comprehension::Dict => {
                let key = self.expression(required_field(body, "key")?)?;
                let value = self.expression(required_field(body, "value")?)?;
                format!("[{}, {}]", key, value)
            }
            Comprehension::List | Comprehension::Set => self.expression(body)?,
        };

        Ok(format!(
            "(function* () {{ {}yield {} {}}}).call(this)",
            head,
            value,
            "} ".repeat(opened)
        ))
    }

    fn comprehension_target(&mut self, target: SyntaxNode<'_>) -> Result<String, CompilerError> {
        match target.kind() {
            NodeKind::Identifier => {
                self.scopes.register(target.text());
                Ok(bound_name(target.text()))
            }
            NodeKind::PatternList | NodeKind::TuplePattern | NodeKind::ListPattern => {
                let mut names = Vec::new();
                for element in target.named_children() {
                    if element.kind() != NodeKind::Identifier {
                        return Err(unsupported(element));
                    }
                    self.scopes.register(element.text());
                    names.push(bound_name(element.text()));
                }
                Ok(format!("[{}]", names.join(", ")))
            }
            _ => Err(unsupported(target)),
        }
    }

    // ═══════════════════════════════════════════════════════════════════════════
    // LITERALS
    // ═══════════════════════════════════════════════════════════════════════════

    fn string(&mut self, node: SyntaxNode<'_>) -> Result<String, CompilerError> {
        if is_format_string(node) {
            return Ok(format!("`{}`", self.template_body(node)?));
        }
        lower_string(node.text(), node.location())
    }

    fn concatenated_string(&mut self, node: SyntaxNode<'_>) -> Result<String, CompilerError> {
        let parts = node.named_children();
        if parts.iter().any(|p| is_format_string(*p)) {
            let mut body = String::new();
            for part in parts {
                if is_format_string(part) {
                    body.push_str(&self.template_body(part)?);
                } else {
                    body.push_str(&escape_template(&string_value(part.text(), part.location())?));
                }
            }
            return Ok(format!("`{}`", body));
        }

        let mut value = String::new();
        for part in parts {
            value.push_str(&string_value(part.text(), part.location())?);
        }
        Ok(quote_repr(&value))
    }

    /// Template literal body (without backticks) for one f-string token.
    fn template_body(&mut self, node: SyntaxNode<'_>) -> Result<String, CompilerError> {
        let (prefix, range) = split_string_range(node.text()).ok_or_else(|| {
            CompilerError::internal("Malformed format string").at(node.location())
        })?;
        if prefix.bytes {
            return Err(CompilerError::unsupported("bytes literal", node.location()));
        }
        let start = node.start_byte() + range.start;
        let end = node.start_byte() + range.end;

        let mut out = String::new();
        let mut cursor = start;
        for child in node.named_children() {
            if child.raw_kind() != "interpolation" {
                continue;
            }
            out.push_str(&template_segment(
                node.source_slice(cursor, child.start_byte()),
                prefix.raw,
                node,
            )?);
            out.push_str("${");
            out.push_str(&self.interpolation(child)?);
            out.push('}');
            cursor = child.end_byte();
        }
        out.push_str(&template_segment(
            node.source_slice(cursor, end),
            prefix.raw,
            node,
        )?);
        Ok(out)
    }

    fn interpolation(&mut self, node: SyntaxNode<'_>) -> Result<String, CompilerError> {
        if node.field("type_conversion").is_some() {
            return Err(CompilerError::unsupported("f-string conversion", node.location()));
        }
        if node.field("format_specifier").is_some() {
            return Err(CompilerError::unsupported("f-string format specifier", node.location()));
        }
        if node.has_token("=") {
            return Err(CompilerError::unsupported("self-documenting f-string", node.location()));
        }
        self.expression(required_field(node, "expression")?)
    }

    fn dictionary(&mut self, node: SyntaxNode<'_>) -> Result<String, CompilerError> {
        let children = node.named_children();
        let multi_line = children.len() > 1;
        if multi_line {
            self.dict_nesting += 1;
        }
        let entries = self.dictionary_entries(&children);
        if multi_line {
            self.dict_nesting -= 1;
        }
        let entries = entries?;

        if multi_line {
            let depth = self.buffer.depth() + self.dict_nesting;
            let outer = self.buffer.indentation_at(depth);
            let inner = self.buffer.indentation_at(depth + 1);
            Ok(format!(
                "{{\n{}{}\n{}}}",
                inner,
                entries.join(&format!(",\n{}", inner)),
                outer
            ))
        } else {
            Ok(format!("{{{}}}", entries.join(", ")))
        }
    }

    fn dictionary_entries(
        &mut self,
        children: &[SyntaxNode<'_>],
    ) -> Result<Vec<String>, CompilerError> {
        let mut entries = Vec::with_capacity(children.len());
        for child in children {
            match child.kind() {
                NodeKind::Pair => {
                    let key_node = required_field(*child, "key")?;
                    let key = self.expression(key_node)?;
                    let key = match key_node.kind() {
                        NodeKind::String
                        | NodeKind::ConcatenatedString
                        | NodeKind::Integer
                        | NodeKind::Float
                            if !is_format_string(key_node) =>
                        {
                            key
                        }
                        _ => format!("[{}]", key),
                    };
                    let value = self.expression(required_field(*child, "value")?)?;
                    entries.push(format!("{}: {}", key, value));
                }
                NodeKind::DictionarySplat => {
                    let inner = child
                        .first_named_child()
                        .ok_or_else(|| CompilerError::internal("Empty splat").at(child.location()))?;
                    entries.push(format!("...{}", self.expression(inner)?));
                }
                _ => return Err(unsupported(*child)),
            }
        }
        Ok(entries)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// HELPERS
// ═══════════════════════════════════════════════════════════════════════════════

/// Group operands whose precedence would otherwise leak into the surrounding
/// expression. Binary and boolean forms already carry their own parentheses.
pub(crate) fn wrap_operand(node: SyntaxNode<'_>, text: String) -> String {
    match node.kind() {
        NodeKind::ComparisonOperator
        | NodeKind::NotOperator
        | NodeKind::UnaryOperator
        | NodeKind::Lambda
        | NodeKind::Await => format!("({})", text),
        _ => text,
    }
}

/// Group the object of a member access. Besides the operand cases, a bare
/// numeric literal, possibly inlined from context, cannot take `.member`.
fn wrap_receiver(node: SyntaxNode<'_>, text: String) -> String {
    let text = wrap_operand(node, text);
    if is_numeric_text(&text) {
        format!("({})", text)
    } else {
        text
    }
}

fn is_numeric_text(text: &str) -> bool {
    let (negative, digits) = match text.strip_prefix('-') {
        Some(rest) => (true, rest),
        None => (false, text),
    };
    let literal = digits.chars().all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '+' | '-'));
    literal && (negative || digits.starts_with(|c: char| c.is_ascii_digit() || c == '.'))
}

/// Rewrites for `len` and `range` called with positional arguments only.
fn special_call(name: &str, args: &[String]) -> Option<String> {
    match (name, args) {
        ("len", [value]) => Some(format!("{}.length", value)),
        ("range", [stop]) => Some(format!("[...Array({}).keys()]", stop)),
        ("range", [start, stop]) => Some(format!(
            "Array.from({{length: Math.max(0, {} - {})}}, (_, i) => {} + i)",
            stop, start, start
        )),
        ("range", [start, stop, step]) => Some(format!(
            "Array.from({{length: Math.max(0, Math.ceil(({} - {}) / {}))}}, (_, i) => {} + i * {})",
            stop, start, step, start, step
        )),
        _ => None,
    }
}

fn is_format_string(node: SyntaxNode<'_>) -> bool {
    node.kind() == NodeKind::String
        && split_string(node.text()).is_some_and(|(prefix, _)| prefix.format)
}

/// Left operand of `%` that selects the formatting helper.
fn is_plain_string(node: SyntaxNode<'_>) -> bool {
    match node.kind() {
        NodeKind::String => !is_format_string(node),
        NodeKind::ConcatenatedString => node
            .named_children()
            .into_iter()
            .all(|part| !is_format_string(part)),
        _ => false,
    }
}

fn template_segment(text: &str, raw: bool, node: SyntaxNode<'_>) -> Result<String, CompilerError> {
    let text = text.replace("{{", "{").replace("}}", "}");
    let value = if raw {
        text
    } else {
        decode_escapes(&text, node.location())?
    };
    Ok(escape_template(&value))
}
