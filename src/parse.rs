//! Parse Module for the py2js compiler
//!
//! Adapter over tree-sitter-python. Produces a [`ParsedSource`] whose nodes are
//! exposed through [`SyntaxNode`], with node kinds narrowed to the closed
//! [`NodeKind`] enum the translator dispatches on.

use tree_sitter::{Node, Parser, Tree};

use crate::validate::{CompilerError, ErrorKind, SourceLocation};

// ═══════════════════════════════════════════════════════════════════════════════
// NODE KINDS
// ═══════════════════════════════════════════════════════════════════════════════

/// Every tree-sitter-python node kind the translator knows about. Kinds that
/// have no translation rule are still listed so that rejecting them is an
/// explicit decision rather than a fallthrough.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    Module,
    Block,
    ExpressionStatement,
    FunctionDefinition,
    DecoratedDefinition,
    Decorator,
    ClassDefinition,
    ReturnStatement,
    PassStatement,
    BreakStatement,
    ContinueStatement,
    GlobalStatement,
    NonlocalStatement,
    AssertStatement,
    RaiseStatement,
    IfStatement,
    ElifClause,
    ElseClause,
    ForStatement,
    WhileStatement,
    PrintStatement,
    TryStatement,
    WithStatement,
    ImportStatement,
    ImportFromStatement,
    FutureImportStatement,
    ExecStatement,
    DeleteStatement,
    MatchStatement,
    TypeAliasStatement,

    Assignment,
    AugmentedAssignment,
    Identifier,
    Attribute,
    Subscript,
    Slice,
    Call,
    ArgumentList,
    KeywordArgument,
    ListSplat,
    DictionarySplat,
    ParenthesizedExpression,
    BinaryOperator,
    UnaryOperator,
    NotOperator,
    BooleanOperator,
    ComparisonOperator,
    ConditionalExpression,
    Lambda,
    LambdaParameters,
    Await,
    Integer,
    Float,
    String,
    ConcatenatedString,
    True,
    False,
    None,
    List,
    Tuple,
    Set,
    Dictionary,
    Pair,
    ExpressionList,
    ListComprehension,
    SetComprehension,
    DictionaryComprehension,
    GeneratorExpression,
    ForInClause,
    IfClause,
    NamedExpression,
    Yield,
    Ellipsis,
    PatternList,
    TuplePattern,
    ListPattern,

    Parameters,
    DefaultParameter,
    TypedParameter,
    TypedDefaultParameter,
    ListSplatPattern,
    DictionarySplatPattern,
    KeywordSeparator,
    PositionalSeparator,
    Type,

    Comment,
    Error,
    Unknown,
}

impl NodeKind {
    pub fn from_kind(kind: &str) -> NodeKind {
        match kind {
            "module" => NodeKind::Module,
            "block" => NodeKind::Block,
            "expression_statement" => NodeKind::ExpressionStatement,
            "function_definition" => NodeKind::FunctionDefinition,
            "decorated_definition" => NodeKind::DecoratedDefinition,
            "decorator" => NodeKind::Decorator,
            "class_definition" => NodeKind::ClassDefinition,
            "return_statement" => NodeKind::ReturnStatement,
            "pass_statement" => NodeKind::PassStatement,
            "break_statement" => NodeKind::BreakStatement,
            "continue_statement" => NodeKind::ContinueStatement,
            "global_statement" => NodeKind::GlobalStatement,
            "nonlocal_statement" => NodeKind::NonlocalStatement,
            "assert_statement" => NodeKind::AssertStatement,
            "raise_statement" => NodeKind::RaiseStatement,
            "if_statement" => NodeKind::IfStatement,
            "elif_clause" => NodeKind::ElifClause,
            "else_clause" => NodeKind::ElseClause,
            "for_statement" => NodeKind::ForStatement,
            "while_statement" => NodeKind::WhileStatement,
            "print_statement" => NodeKind::PrintStatement,
            "try_statement" => NodeKind::TryStatement,
            "with_statement" => NodeKind::WithStatement,
            "import_statement" => NodeKind::ImportStatement,
            "import_from_statement" => NodeKind::ImportFromStatement,
            "future_import_statement" => NodeKind::FutureImportStatement,
            "exec_statement" => NodeKind::ExecStatement,
            "delete_statement" => NodeKind::DeleteStatement,
            "match_statement" => NodeKind::MatchStatement,
            "type_alias_statement" => NodeKind::TypeAliasStatement,
            "assignment" => NodeKind::Assignment,
            "augmented_assignment" => NodeKind::AugmentedAssignment,
            "identifier" => NodeKind::Identifier,
            "attribute" => NodeKind::Attribute,
            "subscript" => NodeKind::Subscript,
            "slice" => NodeKind::Slice,
            "call" => NodeKind::Call,
            "argument_list" => NodeKind::ArgumentList,
            "keyword_argument" => NodeKind::KeywordArgument,
            "list_splat" => NodeKind::ListSplat,
            "dictionary_splat" => NodeKind::DictionarySplat,
            "parenthesized_expression" => NodeKind::ParenthesizedExpression,
            "binary_operator" => NodeKind::BinaryOperator,
            "unary_operator" => NodeKind::UnaryOperator,
            "not_operator" => NodeKind::NotOperator,
            "boolean_operator" => NodeKind::BooleanOperator,
            "comparison_operator" => NodeKind::ComparisonOperator,
            "conditional_expression" => NodeKind::ConditionalExpression,
            "lambda" => NodeKind::Lambda,
            "lambda_parameters" => NodeKind::LambdaParameters,
            "await" => NodeKind::Await,
            "integer" => NodeKind::Integer,
            "float" => NodeKind::Float,
            "string" => NodeKind::String,
            "concatenated_string" => NodeKind::ConcatenatedString,
            "true" => NodeKind::True,
            "false" => NodeKind::False,
            "none" => NodeKind::None,
            "list" => NodeKind::List,
            "tuple" => NodeKind::Tuple,
            "set" => NodeKind::Set,
            "dictionary" => NodeKind::Dictionary,
            "pair" => NodeKind::Pair,
            "expression_list" => NodeKind::ExpressionList,
            "list_comprehension" => NodeKind::ListComprehension,
            "set_comprehension" => NodeKind::SetComprehension,
            "dictionary_comprehension" => NodeKind::DictionaryComprehension,
            "generator_expression" => NodeKind::GeneratorExpression,
            "for_in_clause" => NodeKind::ForInClause,
            "if_clause" => NodeKind::IfClause,
            "named_expression" => NodeKind::NamedExpression,
            "yield" => NodeKind::Yield,
            "ellipsis" => NodeKind::Ellipsis,
            "pattern_list" => NodeKind::PatternList,
            "tuple_pattern" => NodeKind::TuplePattern,
            "list_pattern" => NodeKind::ListPattern,
            "parameters" => NodeKind::Parameters,
            "default_parameter" => NodeKind::DefaultParameter,
            "typed_parameter" => NodeKind::TypedParameter,
            "typed_default_parameter" => NodeKind::TypedDefaultParameter,
            "list_splat_pattern" => NodeKind::ListSplatPattern,
            "dictionary_splat_pattern" => NodeKind::DictionarySplatPattern,
            "keyword_separator" => NodeKind::KeywordSeparator,
            "positional_separator" => NodeKind::PositionalSeparator,
            "type" => NodeKind::Type,
            "comment" => NodeKind::Comment,
            "ERROR" => NodeKind::Error,
            _ => NodeKind::Unknown,
        }
    }

    /// Human readable construct name used in diagnostics.
    pub fn describe(self) -> &'static str {
        match self {
            NodeKind::TryStatement => "exception handling (try)",
            NodeKind::WithStatement => "context-scoped resource block (with)",
            NodeKind::ImportStatement | NodeKind::ImportFromStatement => "module import",
            NodeKind::FutureImportStatement => "__future__ import",
            NodeKind::ExecStatement => "exec block",
            NodeKind::DeleteStatement => "del statement",
            NodeKind::MatchStatement => "match statement",
            NodeKind::TypeAliasStatement => "type alias",
            NodeKind::NamedExpression => "assignment expression (:=)",
            NodeKind::Yield => "yield",
            NodeKind::Ellipsis => "ellipsis",
            NodeKind::ListSplatPattern | NodeKind::ListSplat => "star arguments",
            NodeKind::DictionarySplatPattern | NodeKind::DictionarySplat => "keyword arguments",
            NodeKind::KeywordSeparator => "keyword-only parameters",
            NodeKind::PatternList | NodeKind::TuplePattern | NodeKind::ListPattern => {
                "destructuring assignment"
            }
            _ => "syntax",
        }
    }
}

/// Extras the grammar may place anywhere; never part of the translated tree.
fn is_trivia(kind: &str) -> bool {
    kind == "comment" || kind == "line_continuation"
}

// ═══════════════════════════════════════════════════════════════════════════════
// SYNTAX NODE
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Clone, Copy)]
pub struct SyntaxNode<'t> {
    node: Node<'t>,
    source: &'t str,
}

impl<'t> SyntaxNode<'t> {
    fn new(node: Node<'t>, source: &'t str) -> Self {
        Self { node, source }
    }

    pub fn kind(&self) -> NodeKind {
        NodeKind::from_kind(self.node.kind())
    }

    pub fn raw_kind(&self) -> &'static str {
        self.node.kind()
    }

    pub fn text(&self) -> &'t str {
        &self.source[self.node.start_byte()..self.node.end_byte()]
    }

    pub fn start_byte(&self) -> usize {
        self.node.start_byte()
    }

    pub fn end_byte(&self) -> usize {
        self.node.end_byte()
    }

    /// Slice of the whole unit source, for text between child nodes.
    pub fn source_slice(&self, start: usize, end: usize) -> &'t str {
        &self.source[start..end]
    }

    pub fn field(&self, name: &str) -> Option<SyntaxNode<'t>> {
        self.node
            .child_by_field_name(name)
            .map(|n| SyntaxNode::new(n, self.source))
    }

    pub fn fields(&self, name: &str) -> Vec<SyntaxNode<'t>> {
        let mut cursor = self.node.walk();
        let nodes = self
            .node
            .children_by_field_name(name, &mut cursor)
            .filter(|n| !is_trivia(n.kind()))
            .map(|n| SyntaxNode::new(n, self.source))
            .collect();
        nodes
    }

    pub fn named_children(&self) -> Vec<SyntaxNode<'t>> {
        let mut cursor = self.node.walk();
        let nodes = self
            .node
            .named_children(&mut cursor)
            .filter(|n| !is_trivia(n.kind()))
            .map(|n| SyntaxNode::new(n, self.source))
            .collect();
        nodes
    }

    /// All children, anonymous tokens included.
    pub fn children(&self) -> Vec<SyntaxNode<'t>> {
        let mut cursor = self.node.walk();
        let nodes = self
            .node
            .children(&mut cursor)
            .filter(|n| !is_trivia(n.kind()))
            .map(|n| SyntaxNode::new(n, self.source))
            .collect();
        nodes
    }

    pub fn first_named_child(&self) -> Option<SyntaxNode<'t>> {
        self.named_children().into_iter().next()
    }

    /// Whether an anonymous token such as `async` is a direct child.
    pub fn has_token(&self, token: &str) -> bool {
        self.children()
            .iter()
            .any(|c| !c.node.is_named() && c.node.kind() == token)
    }

    pub fn is_named(&self) -> bool {
        self.node.is_named()
    }

    pub fn location(&self) -> SourceLocation {
        let point = self.node.start_position();
        SourceLocation {
            line: point.row as u32 + 1,
            column: point.column as u32 + 1,
        }
    }
}

impl std::fmt::Debug for SyntaxNode<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let loc = self.location();
        write!(f, "{}@{}:{}", self.node.kind(), loc.line, loc.column)
    }
}

// ═══════════════════════════════════════════════════════════════════════════════
// PARSING
// ═══════════════════════════════════════════════════════════════════════════════

#[derive(Debug)]
pub struct ParsedSource {
    tree: Tree,
    text: String,
}

impl ParsedSource {
    pub fn root(&self) -> SyntaxNode<'_> {
        SyntaxNode::new(self.tree.root_node(), &self.text)
    }

    pub fn text(&self) -> &str {
        &self.text
    }
}

/// Parse Python source text. The text is dedented first so that sources cut
/// out of an indented context parse as top-level code.
pub fn parse(source: &str) -> Result<ParsedSource, CompilerError> {
    let text = dedent(source);

    let mut parser = Parser::new();
    parser
        .set_language(&tree_sitter_python::LANGUAGE.into())
        .map_err(|e| CompilerError::internal(format!("Failed to load Python grammar: {}", e)))?;

    let tree = parser
        .parse(&text, None)
        .ok_or_else(|| CompilerError::internal("Parser returned no tree"))?;

    if tree.root_node().has_error() {
        let (message, location) = first_syntax_error(tree.root_node(), &text);
        return Err(CompilerError::new(
            ErrorKind::Parse,
            &message,
            "",
            location.line,
            location.column,
        ));
    }

    Ok(ParsedSource { tree, text })
}

fn first_syntax_error(root: Node<'_>, text: &str) -> (String, SourceLocation) {
    let mut stack = vec![root];
    while let Some(node) = stack.pop() {
        let wrapped = SyntaxNode::new(node, text);
        if node.is_missing() {
            return (format!("missing '{}'", node.kind()), wrapped.location());
        }
        if node.is_error() {
            let snippet: String = wrapped.text().chars().take(40).collect();
            return (
                format!("invalid syntax near '{}'", snippet.trim()),
                wrapped.location(),
            );
        }
        // Reverse so the leftmost child is examined first.
        let mut cursor = node.walk();
        let children: Vec<Node<'_>> = node.children(&mut cursor).collect();
        for child in children.into_iter().rev() {
            if child.has_error() || child.is_missing() {
                stack.push(child);
            }
        }
    }
    (
        "invalid syntax".to_string(),
        SyntaxNode::new(root, text).location(),
    )
}

/// Remove the whitespace prefix shared by every non-blank line.
pub fn dedent(source: &str) -> String {
    let prefix_len = source
        .lines()
        .filter(|line| !line.trim().is_empty())
        .map(|line| line.len() - line.trim_start_matches([' ', '\t']).len())
        .min()
        .unwrap_or(0);

    if prefix_len == 0 {
        return source.to_string();
    }

    let mut out = String::with_capacity(source.len());
    for line in source.split_inclusive('\n') {
        if line.trim().is_empty() {
            out.push_str(line.trim_start_matches([' ', '\t']));
        } else {
            out.push_str(&line[prefix_len.min(line.len())..]);
        }
    }
    out
}
