//! Target-dialect tree.
//!
//! The converter builds `CsNode` trees bottom-up; nothing in them points back
//! into the source arena. A printer (external in production, `CsPrinter` in
//! this crate for debugging and tests) walks the finished tree.
//!
//! # Structure
//!
//! One enum covers expressions, statements and declarations, the same way a
//! lowered IR usually does. Auxiliary structs (`CsArgument`, `CsParam`,
//! `CsMethod`, ...) hold the payload of the larger variants.
//!
//! Builders that combine expressions (`binary`, `cast`, `member`, ...)
//! insert parentheses from operator precedence, so callers never have to
//! reason about grouping.

/// Target-dialect node.
#[derive(Debug, Clone, PartialEq)]
pub enum CsNode {
    // =========================================================================
    // Literals
    // =========================================================================
    /// Numeric literal including any suffix: `42`, `0xFF`, `1.5D`, `10UL`
    NumericLiteral(String),

    /// String literal; `verbatim` selects `@"..."` rendering
    StringLiteral { value: String, verbatim: bool },

    CharLiteral(char),

    BooleanLiteral(bool),

    NullLiteral,

    /// `default` or `default(T)`
    DefaultLiteral(Option<String>),

    // =========================================================================
    // Names
    // =========================================================================
    /// Identifier or (possibly qualified) type name
    Identifier(String),

    This,

    Base,

    // =========================================================================
    // Expressions
    // =========================================================================
    Binary {
        left: Box<Self>,
        operator: &'static str,
        right: Box<Self>,
    },

    PrefixUnary {
        operator: &'static str,
        operand: Box<Self>,
    },

    PostfixUnary {
        operand: Box<Self>,
        operator: &'static str,
    },

    /// `target op value` where op is `=`, `+=`, ...
    Assignment {
        target: Box<Self>,
        operator: &'static str,
        value: Box<Self>,
    },

    Call {
        callee: Box<Self>,
        arguments: Vec<CsArgument>,
    },

    /// `object.name` or `object?.name`
    MemberAccess {
        object: Box<Self>,
        name: String,
        null_conditional: bool,
    },

    /// `object[a, b]`
    ElementAccess {
        object: Box<Self>,
        arguments: Vec<CsArgument>,
    },

    Conditional {
        condition: Box<Self>,
        when_true: Box<Self>,
        when_false: Box<Self>,
    },

    Parenthesized(Box<Self>),

    /// `(T)expression`
    Cast {
        type_name: String,
        expression: Box<Self>,
    },

    /// `expression is T` / `expression as T`
    TypeTest {
        expression: Box<Self>,
        type_name: String,
        kind: TypeTestKind,
    },

    /// `new T(args) { initializer }`; `type_name` is empty for anonymous objects
    ObjectCreation {
        type_name: String,
        arguments: Option<Vec<CsArgument>>,
        initializer: Option<Vec<Self>>,
    },

    /// `new T[n, m]`, `new T[] { ... }`, `new[] { ... }` (empty element type)
    ArrayCreation {
        element_type: String,
        sizes: Vec<Self>,
        rank: u32,
        initializer: Option<Vec<Self>>,
    },

    /// Nested `{ a, b }` inside an initializer
    InitializerList(Vec<Self>),

    Lambda {
        parameters: Vec<CsParam>,
        body: Box<CsBody>,
        is_async: bool,
    },

    TypeOf(String),

    NameOf(Box<Self>),

    Await(Box<Self>),

    InterpolatedString(Vec<CsInterpolation>),

    Query(Vec<CsQueryClause>),

    // =========================================================================
    // Statements
    // =========================================================================
    LocalDeclaration(CsLocalDeclaration),

    LocalFunction(Box<CsMethod>),

    ExpressionStatement(Box<Self>),

    Return(Option<Box<Self>>),

    /// `else_branch` holding a single `If` prints as `else if`
    If {
        condition: Box<Self>,
        then_branch: Vec<Self>,
        else_branch: Option<Vec<Self>>,
    },

    Block(Vec<Self>),

    Switch {
        expression: Box<Self>,
        sections: Vec<CsSwitchSection>,
    },

    For {
        declaration: Option<CsLocalDeclaration>,
        initializers: Vec<Self>,
        condition: Option<Box<Self>>,
        incrementors: Vec<Self>,
        body: Vec<Self>,
    },

    ForEach {
        type_name: String,
        variable: String,
        collection: Box<Self>,
        body: Vec<Self>,
    },

    While {
        condition: Box<Self>,
        body: Vec<Self>,
    },

    DoWhile {
        body: Vec<Self>,
        condition: Box<Self>,
    },

    Break,

    Continue,

    Goto(String),

    Labeled {
        label: String,
        statement: Box<Self>,
    },

    Try {
        body: Vec<Self>,
        catches: Vec<CsCatch>,
        finally: Option<Vec<Self>>,
    },

    Throw(Option<Box<Self>>),

    /// `using (resource) { body }`; resource is a declaration or an expression
    Using {
        resource: Box<Self>,
        body: Vec<Self>,
    },

    Lock {
        expression: Box<Self>,
        body: Vec<Self>,
    },

    YieldReturn(Box<Self>),

    Empty,

    // =========================================================================
    // Declarations
    // =========================================================================
    UsingDirective {
        alias: Option<String>,
        name: String,
    },

    CompilationUnit {
        usings: Vec<Self>,
        members: Vec<Self>,
    },

    Namespace {
        name: String,
        members: Vec<Self>,
    },

    TypeDeclaration(CsTypeDeclaration),

    EnumDeclaration {
        modifiers: Vec<&'static str>,
        name: String,
        base: Option<String>,
        members: Vec<(String, Option<Self>)>,
    },

    DelegateDeclaration {
        modifiers: Vec<&'static str>,
        return_type: String,
        name: String,
        parameters: Vec<CsParam>,
    },

    Method(Box<CsMethod>),

    Constructor {
        modifiers: Vec<&'static str>,
        name: String,
        parameters: Vec<CsParam>,
        initializer: Option<CsConstructorInitializer>,
        body: Vec<Self>,
    },

    Field {
        modifiers: Vec<&'static str>,
        type_name: String,
        declarators: Vec<CsDeclarator>,
    },

    /// Property, or indexer when `parameters` is non-empty
    Property(Box<CsProperty>),

    Event {
        modifiers: Vec<&'static str>,
        type_name: String,
        name: String,
    },

    // =========================================================================
    // Special
    // =========================================================================
    /// Comment: `/* text */` or `// text`
    Comment { text: String, is_block: bool },

    /// Expression or statement followed by a block comment on the same line
    WithTrailingComment { node: Box<Self>, comment: String },

    /// Stand-in for a member that could not be converted
    ErrorPlaceholder {
        kind: String,
        message: String,
        original_text: String,
    },

    /// Raw target text (escape hatch)
    Raw(String),

    /// Sequence of statements/declarations spliced into the parent
    Sequence(Vec<Self>),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TypeTestKind {
    Is,
    As,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefKind {
    None,
    Ref,
    Out,
}

/// Call/indexer argument.
#[derive(Debug, Clone, PartialEq)]
pub struct CsArgument {
    pub name: Option<String>,
    pub ref_kind: RefKind,
    pub expression: CsNode,
}

impl CsArgument {
    pub const fn new(expression: CsNode) -> Self {
        Self {
            name: None,
            ref_kind: RefKind::None,
            expression,
        }
    }

    pub const fn by_ref(expression: CsNode, ref_kind: RefKind) -> Self {
        Self {
            name: None,
            ref_kind,
            expression,
        }
    }

    #[must_use]
    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamModifier {
    None,
    Ref,
    Out,
    Params,
}

/// Method/lambda/delegate parameter. `type_name` is `None` for implicitly
/// typed lambda parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct CsParam {
    pub name: String,
    pub type_name: Option<String>,
    pub modifier: ParamModifier,
    pub default_value: Option<CsNode>,
}

impl CsParam {
    pub fn new(name: impl Into<String>, type_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: Some(type_name.into()),
            modifier: ParamModifier::None,
            default_value: None,
        }
    }

    pub fn untyped(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_name: None,
            modifier: ParamModifier::None,
            default_value: None,
        }
    }
}

/// Body of a method, local function, accessor or lambda.
#[derive(Debug, Clone, PartialEq)]
pub enum CsBody {
    Block(Vec<CsNode>),
    Expression(CsNode),
    /// `;` (abstract and interface members)
    None,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsDeclarator {
    pub name: String,
    pub initializer: Option<CsNode>,
}

impl CsDeclarator {
    pub fn new(name: impl Into<String>, initializer: Option<CsNode>) -> Self {
        Self {
            name: name.into(),
            initializer,
        }
    }
}

/// `[const] [ref] T a = x, b = y`
#[derive(Debug, Clone, PartialEq)]
pub struct CsLocalDeclaration {
    pub type_name: String,
    pub declarators: Vec<CsDeclarator>,
    pub is_const: bool,
    pub is_ref: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsSwitchSection {
    /// `None` is the `default:` label
    pub labels: Vec<Option<CsNode>>,
    pub statements: Vec<CsNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsCatch {
    pub type_name: Option<String>,
    pub name: Option<String>,
    pub filter: Option<CsNode>,
    pub body: Vec<CsNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum CsInterpolation {
    Text(String),
    Expression {
        expression: CsNode,
        alignment: Option<CsNode>,
        format: Option<String>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum CsQueryClause {
    From {
        type_name: Option<String>,
        variable: String,
        collection: CsNode,
    },
    Where(CsNode),
    Let {
        name: String,
        value: CsNode,
    },
    OrderBy(Vec<(CsNode, bool)>),
    Select(CsNode),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CsTypeKind {
    Class,
    Struct,
    Interface,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsTypeDeclaration {
    pub kind: CsTypeKind,
    pub modifiers: Vec<&'static str>,
    pub name: String,
    pub type_params: Vec<String>,
    pub bases: Vec<String>,
    pub members: Vec<CsNode>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsMethod {
    pub modifiers: Vec<&'static str>,
    pub return_type: String,
    pub name: String,
    pub type_params: Vec<String>,
    pub parameters: Vec<CsParam>,
    pub body: CsBody,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConstructorInitializerKind {
    Base,
    This,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsConstructorInitializer {
    pub kind: ConstructorInitializerKind,
    pub arguments: Vec<CsArgument>,
}

/// Accessor; `body: None` is an auto accessor (`get;`).
#[derive(Debug, Clone, PartialEq)]
pub struct CsAccessor {
    pub modifiers: Vec<&'static str>,
    pub body: Option<Vec<CsNode>>,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CsProperty {
    pub modifiers: Vec<&'static str>,
    pub type_name: String,
    pub name: String,
    pub parameters: Vec<CsParam>,
    pub getter: Option<CsAccessor>,
    pub setter: Option<CsAccessor>,
    pub initializer: Option<CsNode>,
}

// =========================================================================
// Precedence
// =========================================================================

/// Operator precedence levels, higher binds tighter.
pub mod precedence {
    pub const LAMBDA: u8 = 1;
    pub const ASSIGNMENT: u8 = 2;
    pub const CONDITIONAL: u8 = 3;
    pub const COALESCE: u8 = 4;
    pub const LOGICAL_OR: u8 = 5;
    pub const LOGICAL_AND: u8 = 6;
    pub const BITWISE_OR: u8 = 7;
    pub const BITWISE_XOR: u8 = 8;
    pub const BITWISE_AND: u8 = 9;
    pub const EQUALITY: u8 = 10;
    pub const RELATIONAL: u8 = 11;
    pub const SHIFT: u8 = 12;
    pub const ADDITIVE: u8 = 13;
    pub const MULTIPLICATIVE: u8 = 14;
    pub const UNARY: u8 = 15;
    pub const PRIMARY: u8 = 16;

    pub fn of_binary(operator: &str) -> u8 {
        match operator {
            "*" | "/" | "%" => MULTIPLICATIVE,
            "+" | "-" => ADDITIVE,
            "<<" | ">>" => SHIFT,
            "<" | ">" | "<=" | ">=" => RELATIONAL,
            "==" | "!=" => EQUALITY,
            "&" => BITWISE_AND,
            "^" => BITWISE_XOR,
            "|" => BITWISE_OR,
            "&&" => LOGICAL_AND,
            "||" => LOGICAL_OR,
            "??" => COALESCE,
            _ => ASSIGNMENT,
        }
    }
}

// =========================================================================
// Builder helpers
// =========================================================================

impl CsNode {
    /// Create an identifier node
    pub fn id(name: impl Into<String>) -> Self {
        Self::Identifier(name.into())
    }

    /// Create a regular (escaped) string literal
    pub fn string(value: impl Into<String>) -> Self {
        Self::StringLiteral {
            value: value.into(),
            verbatim: false,
        }
    }

    /// Create a numeric literal from its text
    pub fn number(text: impl Into<String>) -> Self {
        Self::NumericLiteral(text.into())
    }

    /// Precedence of this node when used as an operand.
    pub fn precedence(&self) -> u8 {
        match self {
            Self::Binary { operator, .. } => precedence::of_binary(operator),
            Self::PrefixUnary { .. } | Self::Cast { .. } | Self::Await(_) => precedence::UNARY,
            Self::TypeTest { .. } => precedence::RELATIONAL,
            Self::Conditional { .. } => precedence::CONDITIONAL,
            Self::Assignment { .. } => precedence::ASSIGNMENT,
            Self::Lambda { .. } | Self::Query(_) => precedence::LAMBDA,
            // A leading minus sign binds like a unary operator.
            Self::NumericLiteral(text) if text.starts_with('-') => precedence::UNARY,
            Self::WithTrailingComment { node, .. } => node.precedence(),
            _ => precedence::PRIMARY,
        }
    }

    /// Wrap in parentheses unless the node binds at least as tightly as `min`.
    #[must_use]
    pub fn paren_if_below(self, min: u8) -> Self {
        if self.precedence() >= min {
            self
        } else {
            Self::Parenthesized(Box::new(self))
        }
    }

    /// Wrap in parentheses
    #[must_use]
    pub fn paren(self) -> Self {
        match self {
            Self::Parenthesized(_) => self,
            other => Self::Parenthesized(Box::new(other)),
        }
    }

    /// Strip any parentheses.
    pub fn unparenthesized(&self) -> &Self {
        match self {
            Self::Parenthesized(inner) => inner.unparenthesized(),
            other => other,
        }
    }

    /// Create a binary expression, parenthesizing operands as needed
    pub fn binary(left: Self, operator: &'static str, right: Self) -> Self {
        let prec = precedence::of_binary(operator);
        Self::Binary {
            left: Box::new(left.paren_if_below(prec)),
            operator,
            right: Box::new(right.paren_if_below(prec + 1)),
        }
    }

    /// Create a prefix unary expression
    pub fn prefix(operator: &'static str, operand: Self) -> Self {
        Self::PrefixUnary {
            operator,
            operand: Box::new(operand.paren_if_below(precedence::UNARY)),
        }
    }

    /// Logical negation, folding `!(a == b)` into `a != b`
    pub fn not(operand: Self) -> Self {
        match operand {
            Self::Binary {
                left,
                operator: "==",
                right,
            } => Self::Binary {
                left,
                operator: "!=",
                right,
            },
            Self::Binary {
                left,
                operator: "!=",
                right,
            } => Self::Binary {
                left,
                operator: "==",
                right,
            },
            Self::PrefixUnary {
                operator: "!",
                operand,
            } => operand.unparenthesized().clone(),
            other => Self::prefix("!", other),
        }
    }

    /// Create an assignment expression
    pub fn assign(target: Self, value: Self) -> Self {
        Self::assign_op(target, "=", value)
    }

    pub fn assign_op(target: Self, operator: &'static str, value: Self) -> Self {
        Self::Assignment {
            target: Box::new(target),
            operator,
            value: Box::new(value.paren_if_below(precedence::ASSIGNMENT)),
        }
    }

    /// Create a cast expression: `(T)expr`
    pub fn cast(type_name: impl Into<String>, expression: Self) -> Self {
        // `(T)-x` parses as a subtraction when T is not a keyword type.
        let signed = match &expression {
            Self::PrefixUnary { operator, .. } => matches!(*operator, "-" | "+"),
            Self::NumericLiteral(text) => text.starts_with('-'),
            _ => false,
        };
        let expression = if signed {
            expression.paren()
        } else {
            expression.paren_if_below(precedence::UNARY)
        };
        Self::Cast {
            type_name: type_name.into(),
            expression: Box::new(expression),
        }
    }

    /// Create a call expression with positional arguments
    pub fn call(callee: Self, args: Vec<Self>) -> Self {
        Self::call_with(callee, args.into_iter().map(CsArgument::new).collect())
    }

    pub fn call_with(callee: Self, arguments: Vec<CsArgument>) -> Self {
        Self::Call {
            callee: Box::new(callee.paren_if_below(precedence::PRIMARY)),
            arguments,
        }
    }

    /// Create a member access: `object.name`
    pub fn member(object: Self, name: impl Into<String>) -> Self {
        Self::MemberAccess {
            object: Box::new(object.paren_if_below(precedence::PRIMARY)),
            name: name.into(),
            null_conditional: false,
        }
    }

    /// Create a null-conditional member access: `object?.name`
    pub fn member_conditional(object: Self, name: impl Into<String>) -> Self {
        Self::MemberAccess {
            object: Box::new(object.paren_if_below(precedence::PRIMARY)),
            name: name.into(),
            null_conditional: true,
        }
    }

    /// Create a call to a static helper: `Type.Method(args)`
    pub fn static_call(type_name: &str, method: &str, args: Vec<Self>) -> Self {
        Self::call(Self::member(Self::id(type_name), method), args)
    }

    /// Create an element access: `object[index, ...]`
    pub fn element(object: Self, indices: Vec<Self>) -> Self {
        Self::ElementAccess {
            object: Box::new(object.paren_if_below(precedence::PRIMARY)),
            arguments: indices.into_iter().map(CsArgument::new).collect(),
        }
    }

    pub fn conditional(condition: Self, when_true: Self, when_false: Self) -> Self {
        Self::Conditional {
            condition: Box::new(condition.paren_if_below(precedence::COALESCE)),
            when_true: Box::new(when_true.paren_if_below(precedence::CONDITIONAL)),
            when_false: Box::new(when_false.paren_if_below(precedence::CONDITIONAL)),
        }
    }

    pub fn type_test(expression: Self, type_name: impl Into<String>, kind: TypeTestKind) -> Self {
        Self::TypeTest {
            expression: Box::new(expression.paren_if_below(precedence::SHIFT)),
            type_name: type_name.into(),
            kind,
        }
    }

    /// `new T(args)`
    pub fn new_object(type_name: impl Into<String>, args: Vec<Self>) -> Self {
        Self::ObjectCreation {
            type_name: type_name.into(),
            arguments: Some(args.into_iter().map(CsArgument::new).collect()),
            initializer: None,
        }
    }

    /// Create an expression statement
    pub fn expr_stmt(expr: Self) -> Self {
        Self::ExpressionStatement(Box::new(expr))
    }

    /// Create a return statement
    pub fn ret(expr: Option<Self>) -> Self {
        Self::Return(expr.map(Box::new))
    }

    /// `T name = init;`
    pub fn local(type_name: impl Into<String>, name: impl Into<String>, init: Option<Self>) -> Self {
        Self::LocalDeclaration(CsLocalDeclaration {
            type_name: type_name.into(),
            declarators: vec![CsDeclarator::new(name, init)],
            is_const: false,
            is_ref: false,
        })
    }

    /// `var name = init;`
    pub fn var(name: impl Into<String>, init: Self) -> Self {
        Self::local("var", name, Some(init))
    }

    /// Create an `if` statement
    pub fn if_stmt(condition: Self, then_branch: Vec<Self>, else_branch: Option<Vec<Self>>) -> Self {
        Self::If {
            condition: Box::new(condition),
            then_branch,
            else_branch,
        }
    }

    /// Create a block comment
    pub fn block_comment(text: impl Into<String>) -> Self {
        Self::Comment {
            text: text.into(),
            is_block: true,
        }
    }

    /// Attach a trailing block comment
    #[must_use]
    pub fn with_comment(self, comment: impl Into<String>) -> Self {
        Self::WithTrailingComment {
            node: Box::new(self),
            comment: comment.into(),
        }
    }

    pub const fn is_literal(&self) -> bool {
        matches!(
            self,
            Self::NumericLiteral(_)
                | Self::StringLiteral { .. }
                | Self::CharLiteral(_)
                | Self::BooleanLiteral(_)
                | Self::NullLiteral
                | Self::DefaultLiteral(_)
        )
    }

    /// Flatten `Sequence` nodes into `out`.
    pub fn flatten_into(self, out: &mut Vec<Self>) {
        match self {
            Self::Sequence(nodes) => {
                for node in nodes {
                    node.flatten_into(out);
                }
            }
            other => out.push(other),
        }
    }
}

#[cfg(test)]
#[path = "../tests/target.rs"]
mod tests;
