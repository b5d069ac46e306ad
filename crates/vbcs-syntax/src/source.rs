//! Source-dialect syntax tree.
//!
//! The front-end parses source text into a `SourceArena`: a flat vector of
//! nodes addressed by `NodeIndex`. Nodes are never mutated after parsing; the
//! converter only reads them and asks the semantic model about them by index.
//!
//! `SourceKind` is a closed tagged union. Every conversion function matches it
//! exhaustively, so a construct added here without a conversion rule is a
//! compile-time omission rather than a silent runtime fallback.

use crate::value::ConstValue;
use bitflags::bitflags;

// =============================================================================
// Node Index
// =============================================================================

/// Index of a node in a `SourceArena`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeIndex(pub u32);

impl NodeIndex {
    /// Sentinel for "no node".
    pub const NONE: Self = Self(u32::MAX);

    #[inline]
    pub const fn is_none(self) -> bool {
        self.0 == u32::MAX
    }

    #[inline]
    pub const fn is_some(self) -> bool {
        !self.is_none()
    }
}

// =============================================================================
// Modifiers
// =============================================================================

bitflags! {
    /// Declaration and parameter modifiers of the source dialect.
    #[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
    pub struct Modifiers: u32 {
        const PUBLIC = 1 << 0;
        const PRIVATE = 1 << 1;
        const FRIEND = 1 << 2;
        const PROTECTED = 1 << 3;
        const SHARED = 1 << 4;
        const OVERRIDABLE = 1 << 5;
        const OVERRIDES = 1 << 6;
        const MUST_OVERRIDE = 1 << 7;
        const MUST_INHERIT = 1 << 8;
        const NOT_INHERITABLE = 1 << 9;
        const NOT_OVERRIDABLE = 1 << 10;
        const SHADOWS = 1 << 11;
        const READ_ONLY = 1 << 12;
        const WRITE_ONLY = 1 << 13;
        const PARTIAL = 1 << 14;
        const CONST = 1 << 15;
        const STATIC = 1 << 16;
        const DIM = 1 << 17;
        const WITH_EVENTS = 1 << 18;
        const OVERLOADS = 1 << 19;
        const DEFAULT = 1 << 20;
        const ASYNC = 1 << 21;
        const ITERATOR = 1 << 22;
        const BY_REF = 1 << 23;
        const BY_VAL = 1 << 24;
        const OPTIONAL = 1 << 25;
        const PARAM_ARRAY = 1 << 26;

        const ACCESSIBILITY = Self::PUBLIC.bits()
            | Self::PRIVATE.bits()
            | Self::FRIEND.bits()
            | Self::PROTECTED.bits();
    }
}

// =============================================================================
// Type Syntax
// =============================================================================

/// A type as written in an `As` clause, `CType`, `GetType`, etc.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TypeRef {
    /// Possibly qualified name: `Integer`, `System.Text.StringBuilder`
    pub name: String,
    /// `(Of T1, T2)`
    pub type_args: Vec<TypeRef>,
    /// One entry per array suffix, holding the rank: `Integer(,)()` -> `[2, 1]`
    pub array_ranks: Vec<u32>,
    /// `Integer?`
    pub nullable: bool,
}

impl TypeRef {
    pub fn named(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            type_args: Vec::new(),
            array_ranks: Vec::new(),
            nullable: false,
        }
    }

    pub fn generic(name: impl Into<String>, args: Vec<TypeRef>) -> Self {
        Self {
            type_args: args,
            ..Self::named(name)
        }
    }

    #[must_use]
    pub fn array(mut self, rank: u32) -> Self {
        self.array_ranks.push(rank);
        self
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }

    /// Element type of an array type reference.
    pub fn element(&self) -> Self {
        let mut element = self.clone();
        element.array_ranks.pop();
        element
    }

    pub fn is_array(&self) -> bool {
        !self.array_ranks.is_empty()
    }
}

// =============================================================================
// Operators
// =============================================================================

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    /// `/`, always floating in the source dialect
    Divide,
    /// `\`, integral division
    IntegerDivide,
    Modulo,
    /// `^`
    Power,
    /// `&`
    Concatenate,
    Equals,
    NotEquals,
    LessThan,
    LessThanOrEqual,
    GreaterThan,
    GreaterThanOrEqual,
    /// `Is` (reference identity)
    Is,
    /// `IsNot`
    IsNot,
    Like,
    And,
    Or,
    Xor,
    AndAlso,
    OrElse,
    LeftShift,
    RightShift,
}

impl BinaryOp {
    pub const fn is_comparison(self) -> bool {
        matches!(
            self,
            Self::Equals
                | Self::NotEquals
                | Self::LessThan
                | Self::LessThanOrEqual
                | Self::GreaterThan
                | Self::GreaterThanOrEqual
        )
    }

    pub const fn is_arithmetic(self) -> bool {
        matches!(
            self,
            Self::Add
                | Self::Subtract
                | Self::Multiply
                | Self::Divide
                | Self::IntegerDivide
                | Self::Modulo
                | Self::Power
                | Self::LeftShift
                | Self::RightShift
        )
    }

    /// Source spelling, used in diagnostics.
    pub const fn text(self) -> &'static str {
        match self {
            Self::Add => "+",
            Self::Subtract => "-",
            Self::Multiply => "*",
            Self::Divide => "/",
            Self::IntegerDivide => "\\",
            Self::Modulo => "Mod",
            Self::Power => "^",
            Self::Concatenate => "&",
            Self::Equals => "=",
            Self::NotEquals => "<>",
            Self::LessThan => "<",
            Self::LessThanOrEqual => "<=",
            Self::GreaterThan => ">",
            Self::GreaterThanOrEqual => ">=",
            Self::Is => "Is",
            Self::IsNot => "IsNot",
            Self::Like => "Like",
            Self::And => "And",
            Self::Or => "Or",
            Self::Xor => "Xor",
            Self::AndAlso => "AndAlso",
            Self::OrElse => "OrElse",
            Self::LeftShift => "<<",
            Self::RightShift => ">>",
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum UnaryOp {
    Plus,
    Minus,
    Not,
}

/// Assignment operators: `=`, `+=`, ...
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum AssignmentOp {
    Assign,
    Add,
    Subtract,
    Multiply,
    Divide,
    IntegerDivide,
    Power,
    Concatenate,
    LeftShift,
    RightShift,
}

impl AssignmentOp {
    /// Binary operator applied by a compound assignment.
    pub const fn binary_op(self) -> Option<BinaryOp> {
        match self {
            Self::Assign => None,
            Self::Add => Some(BinaryOp::Add),
            Self::Subtract => Some(BinaryOp::Subtract),
            Self::Multiply => Some(BinaryOp::Multiply),
            Self::Divide => Some(BinaryOp::Divide),
            Self::IntegerDivide => Some(BinaryOp::IntegerDivide),
            Self::Power => Some(BinaryOp::Power),
            Self::Concatenate => Some(BinaryOp::Concatenate),
            Self::LeftShift => Some(BinaryOp::LeftShift),
            Self::RightShift => Some(BinaryOp::RightShift),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CastKind {
    CType,
    DirectCast,
    TryCast,
}

/// `CBool(x)`, `CInt(x)`, ...
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PredefinedCast {
    CBool,
    CByte,
    CSByte,
    CShort,
    CUShort,
    CInt,
    CUInt,
    CLng,
    CULng,
    CSng,
    CDbl,
    CDec,
    CChar,
    CStr,
    CDate,
    CObj,
}

impl PredefinedCast {
    pub fn from_name(name: &str) -> Option<Self> {
        let cast = match name.to_ascii_lowercase().as_str() {
            "cbool" => Self::CBool,
            "cbyte" => Self::CByte,
            "csbyte" => Self::CSByte,
            "cshort" => Self::CShort,
            "cushort" => Self::CUShort,
            "cint" => Self::CInt,
            "cuint" => Self::CUInt,
            "clng" => Self::CLng,
            "culng" => Self::CULng,
            "csng" => Self::CSng,
            "cdbl" => Self::CDbl,
            "cdec" => Self::CDec,
            "cchar" => Self::CChar,
            "cstr" => Self::CStr,
            "cdate" => Self::CDate,
            "cobj" => Self::CObj,
            _ => return None,
        };
        Some(cast)
    }
}

// =============================================================================
// Auxiliary Node Data
// =============================================================================

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OptionStatement {
    Strict(bool),
    Explicit(bool),
    Infer(bool),
    /// `Option Compare Text` (true) / `Option Compare Binary` (false)
    CompareText(bool),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ImportClause {
    pub alias: Option<String>,
    pub name: String,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TypeBlockKind {
    Class,
    Module,
    Structure,
    Interface,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EnumMemberData {
    pub name: String,
    pub value: Option<NodeIndex>,
}

/// Receiver named in a `Handles` clause.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum EventContainer {
    Me,
    MyBase,
    MyClass,
    /// A `WithEvents` field
    Field(String),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct HandlesItem {
    pub container: EventContainer,
    pub event: String,
}

/// `Get`/`Set` block of a property.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Accessor {
    pub modifiers: Modifiers,
    /// Setter parameter (`Set(value As Integer)`)
    pub parameter: Option<NodeIndex>,
    pub body: Vec<NodeIndex>,
}

/// One `names As Type = initializer` group of a `Dim`/field declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Declarator {
    /// `ModifiedIdentifier` nodes
    pub names: Vec<NodeIndex>,
    pub as_type: Option<TypeRef>,
    /// `As New T(...)`: the object creation node
    pub as_new: Option<NodeIndex>,
    pub initializer: Option<NodeIndex>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ElseIfBlock {
    pub condition: NodeIndex,
    pub statements: Vec<NodeIndex>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CaseClause {
    Else,
    Value(NodeIndex),
    /// `Case 1 To 5`
    Range(NodeIndex, NodeIndex),
    /// `Case Is > 5`
    Relational(BinaryOp, NodeIndex),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CaseBlock {
    pub clauses: Vec<CaseClause>,
    pub statements: Vec<NodeIndex>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LoopConditionKind {
    While,
    Until,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct LoopCondition {
    pub kind: LoopConditionKind,
    /// `Do While x ... Loop` (true) vs `Do ... Loop While x` (false)
    pub at_top: bool,
    pub expression: NodeIndex,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ExitKind {
    Do,
    For,
    While,
    Sub,
    Function,
    Property,
    Select,
    Try,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ContinueKind {
    Do,
    For,
    While,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CatchBlock {
    /// `ModifiedIdentifier` of the exception variable
    pub name: Option<NodeIndex>,
    pub type_ref: Option<TypeRef>,
    pub when: Option<NodeIndex>,
    pub body: Vec<NodeIndex>,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum UsingResources {
    Declarations(Vec<Declarator>),
    Expression(NodeIndex),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ReDimClause {
    pub target: NodeIndex,
    /// Upper bounds, one per rank
    pub bounds: Vec<NodeIndex>,
}

/// Argument of an invocation. `expression` is `None` for omitted arguments
/// (`F(1, , 3)`).
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Argument {
    pub name: Option<String>,
    pub expression: Option<NodeIndex>,
}

impl Argument {
    pub const fn positional(expression: NodeIndex) -> Self {
        Self {
            name: None,
            expression: Some(expression),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum LambdaBody {
    Expression(NodeIndex),
    Statements(Vec<NodeIndex>),
}

/// `.Name = value` inside `With {...}`; `key` marks anonymous-type key fields.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FieldInitializer {
    pub key: bool,
    pub name: String,
    pub value: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ObjectInitializer {
    Members(Vec<FieldInitializer>),
    Collection(Vec<NodeIndex>),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrderingItem {
    pub expression: NodeIndex,
    pub descending: bool,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct SelectItem {
    pub name: Option<String>,
    pub expression: NodeIndex,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum QueryClause {
    From {
        variable: String,
        type_ref: Option<TypeRef>,
        collection: NodeIndex,
    },
    Where(NodeIndex),
    Select(Vec<SelectItem>),
    OrderBy(Vec<OrderingItem>),
    Let {
        name: String,
        value: NodeIndex,
    },
    Distinct,
    Take(NodeIndex),
    Skip(NodeIndex),
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum InterpolatedPart {
    Text(String),
    Expression {
        expression: NodeIndex,
        alignment: Option<NodeIndex>,
        format: Option<String>,
    },
}

// =============================================================================
// Node Kinds
// =============================================================================

/// Closed set of source constructs.
#[derive(Clone, Debug, PartialEq)]
pub enum SourceKind {
    // -------------------------------------------------------------------------
    // Declarations
    // -------------------------------------------------------------------------
    CompilationUnit {
        options: Vec<OptionStatement>,
        imports: Vec<ImportClause>,
        members: Vec<NodeIndex>,
    },
    Namespace {
        name: String,
        members: Vec<NodeIndex>,
    },
    TypeBlock {
        kind: TypeBlockKind,
        name: String,
        modifiers: Modifiers,
        type_params: Vec<String>,
        inherits: Vec<TypeRef>,
        implements: Vec<TypeRef>,
        members: Vec<NodeIndex>,
    },
    EnumBlock {
        name: String,
        modifiers: Modifiers,
        underlying: Option<TypeRef>,
        members: Vec<EnumMemberData>,
    },
    DelegateDecl {
        name: String,
        modifiers: Modifiers,
        is_function: bool,
        params: Vec<NodeIndex>,
        return_type: Option<TypeRef>,
    },
    Method {
        name: String,
        modifiers: Modifiers,
        is_function: bool,
        type_params: Vec<String>,
        params: Vec<NodeIndex>,
        return_type: Option<TypeRef>,
        handles: Vec<HandlesItem>,
        /// `None` for `MustOverride` and interface members
        body: Option<Vec<NodeIndex>>,
    },
    Constructor {
        modifiers: Modifiers,
        params: Vec<NodeIndex>,
        body: Vec<NodeIndex>,
    },
    Property {
        name: String,
        modifiers: Modifiers,
        params: Vec<NodeIndex>,
        type_ref: Option<TypeRef>,
        initializer: Option<NodeIndex>,
        getter: Option<Accessor>,
        setter: Option<Accessor>,
    },
    Event {
        name: String,
        modifiers: Modifiers,
        type_ref: Option<TypeRef>,
        params: Vec<NodeIndex>,
    },
    Field {
        modifiers: Modifiers,
        declarators: Vec<Declarator>,
    },
    Parameter {
        name: String,
        modifiers: Modifiers,
        type_ref: Option<TypeRef>,
        default: Option<NodeIndex>,
    },
    /// Declared name in a `Dim`/field/`For`/`Catch`: `arr(5)`, `x?`
    ModifiedIdentifier {
        name: String,
        /// Upper bounds written on the name: `Dim arr(5, 3)`
        bounds: Vec<NodeIndex>,
        /// Rank of a bound-less array suffix: `Dim arr()` -> 1
        array_rank: u32,
        nullable: bool,
    },

    // -------------------------------------------------------------------------
    // Statements
    // -------------------------------------------------------------------------
    LocalDeclaration {
        modifiers: Modifiers,
        declarators: Vec<Declarator>,
    },
    Assignment {
        op: AssignmentOp,
        target: NodeIndex,
        value: NodeIndex,
    },
    ExpressionStatement {
        expression: NodeIndex,
    },
    If {
        condition: NodeIndex,
        then_block: Vec<NodeIndex>,
        else_ifs: Vec<ElseIfBlock>,
        else_block: Option<Vec<NodeIndex>>,
    },
    SelectCase {
        selector: NodeIndex,
        cases: Vec<CaseBlock>,
    },
    ForNext {
        /// `Identifier` for an existing variable, `ModifiedIdentifier` when
        /// the loop declares it
        control: NodeIndex,
        control_type: Option<TypeRef>,
        from: NodeIndex,
        to: NodeIndex,
        step: Option<NodeIndex>,
        body: Vec<NodeIndex>,
    },
    ForEach {
        control: NodeIndex,
        control_type: Option<TypeRef>,
        collection: NodeIndex,
        body: Vec<NodeIndex>,
    },
    While {
        condition: NodeIndex,
        body: Vec<NodeIndex>,
    },
    DoLoop {
        condition: Option<LoopCondition>,
        body: Vec<NodeIndex>,
    },
    Exit(ExitKind),
    Continue(ContinueKind),
    Return {
        expression: Option<NodeIndex>,
    },
    Try {
        body: Vec<NodeIndex>,
        catches: Vec<CatchBlock>,
        finally: Option<Vec<NodeIndex>>,
    },
    Throw {
        expression: Option<NodeIndex>,
    },
    Using {
        resources: UsingResources,
        body: Vec<NodeIndex>,
    },
    SyncLock {
        expression: NodeIndex,
        body: Vec<NodeIndex>,
    },
    With {
        expression: NodeIndex,
        body: Vec<NodeIndex>,
    },
    Label(String),
    GoTo(String),
    Erase {
        targets: Vec<NodeIndex>,
    },
    ReDim {
        preserve: bool,
        clauses: Vec<ReDimClause>,
    },
    AddHandler {
        event: NodeIndex,
        handler: NodeIndex,
    },
    RemoveHandler {
        event: NodeIndex,
        handler: NodeIndex,
    },
    RaiseEvent {
        name: String,
        arguments: Vec<Argument>,
    },
    Stop,
    End,
    Yield {
        expression: NodeIndex,
    },
    /// `On Error GoTo ...` / `On Error Resume Next`
    OnError {
        text: String,
    },

    // -------------------------------------------------------------------------
    // Expressions
    // -------------------------------------------------------------------------
    Literal {
        value: ConstValue,
        /// Token text as written (`&HFF`, `5UI`, `"a""b"`)
        text: String,
    },
    Identifier {
        name: String,
    },
    Me,
    MyBase,
    MyClass,
    /// `expression.Name`; `expression` is `None` inside a `With` block (`.Name`)
    MemberAccess {
        expression: Option<NodeIndex>,
        name: String,
        type_args: Vec<TypeRef>,
    },
    /// `expression(arguments)`: call, array index or default-property access
    Invocation {
        expression: NodeIndex,
        arguments: Vec<Argument>,
    },
    Binary {
        op: BinaryOp,
        left: NodeIndex,
        right: NodeIndex,
    },
    Unary {
        op: UnaryOp,
        operand: NodeIndex,
    },
    Cast {
        kind: CastKind,
        expression: NodeIndex,
        type_ref: TypeRef,
    },
    PredefinedCast {
        keyword: PredefinedCast,
        expression: NodeIndex,
    },
    TypeOfIs {
        expression: NodeIndex,
        type_ref: TypeRef,
        negated: bool,
    },
    TernaryIf {
        condition: NodeIndex,
        when_true: NodeIndex,
        when_false: NodeIndex,
    },
    CoalesceIf {
        first: NodeIndex,
        second: NodeIndex,
    },
    Lambda {
        is_function: bool,
        is_async: bool,
        params: Vec<NodeIndex>,
        body: LambdaBody,
    },
    ObjectCreation {
        type_ref: TypeRef,
        arguments: Option<Vec<Argument>>,
        initializer: Option<ObjectInitializer>,
    },
    AnonymousObject {
        members: Vec<FieldInitializer>,
    },
    ArrayCreation {
        element_type: TypeRef,
        /// Upper bounds; empty for `New Integer() {...}`
        bounds: Vec<NodeIndex>,
        rank: u32,
        initializer: Option<NodeIndex>,
    },
    /// `{1, 2, 3}`
    CollectionInitializer {
        elements: Vec<NodeIndex>,
    },
    Query {
        clauses: Vec<QueryClause>,
    },
    AddressOf {
        expression: NodeIndex,
    },
    Parenthesized {
        expression: NodeIndex,
    },
    InterpolatedString {
        parts: Vec<InterpolatedPart>,
    },
    GetType {
        type_ref: TypeRef,
    },
    NameOf {
        expression: NodeIndex,
    },
    Await {
        expression: NodeIndex,
    },
}

impl SourceKind {
    /// Short kind name used in diagnostics and placeholders.
    pub const fn name(&self) -> &'static str {
        match self {
            Self::CompilationUnit { .. } => "CompilationUnit",
            Self::Namespace { .. } => "NamespaceBlock",
            Self::TypeBlock { kind, .. } => match kind {
                TypeBlockKind::Class => "ClassBlock",
                TypeBlockKind::Module => "ModuleBlock",
                TypeBlockKind::Structure => "StructureBlock",
                TypeBlockKind::Interface => "InterfaceBlock",
            },
            Self::EnumBlock { .. } => "EnumBlock",
            Self::DelegateDecl { .. } => "DelegateStatement",
            Self::Method { .. } => "MethodBlock",
            Self::Constructor { .. } => "ConstructorBlock",
            Self::Property { .. } => "PropertyBlock",
            Self::Event { .. } => "EventStatement",
            Self::Field { .. } => "FieldDeclaration",
            Self::Parameter { .. } => "Parameter",
            Self::ModifiedIdentifier { .. } => "ModifiedIdentifier",
            Self::LocalDeclaration { .. } => "LocalDeclarationStatement",
            Self::Assignment { .. } => "AssignmentStatement",
            Self::ExpressionStatement { .. } => "ExpressionStatement",
            Self::If { .. } => "IfStatement",
            Self::SelectCase { .. } => "SelectBlock",
            Self::ForNext { .. } => "ForBlock",
            Self::ForEach { .. } => "ForEachBlock",
            Self::While { .. } => "WhileBlock",
            Self::DoLoop { .. } => "DoLoopBlock",
            Self::Exit(_) => "ExitStatement",
            Self::Continue(_) => "ContinueStatement",
            Self::Return { .. } => "ReturnStatement",
            Self::Try { .. } => "TryBlock",
            Self::Throw { .. } => "ThrowStatement",
            Self::Using { .. } => "UsingBlock",
            Self::SyncLock { .. } => "SyncLockBlock",
            Self::With { .. } => "WithBlock",
            Self::Label(_) => "LabelStatement",
            Self::GoTo(_) => "GoToStatement",
            Self::Erase { .. } => "EraseStatement",
            Self::ReDim { .. } => "ReDimStatement",
            Self::AddHandler { .. } => "AddHandlerStatement",
            Self::RemoveHandler { .. } => "RemoveHandlerStatement",
            Self::RaiseEvent { .. } => "RaiseEventStatement",
            Self::Stop => "StopStatement",
            Self::End => "EndStatement",
            Self::Yield { .. } => "YieldStatement",
            Self::OnError { .. } => "OnErrorGoToStatement",
            Self::Literal { .. } => "LiteralExpression",
            Self::Identifier { .. } => "IdentifierName",
            Self::Me => "MeExpression",
            Self::MyBase => "MyBaseExpression",
            Self::MyClass => "MyClassExpression",
            Self::MemberAccess { .. } => "MemberAccessExpression",
            Self::Invocation { .. } => "InvocationExpression",
            Self::Binary { .. } => "BinaryExpression",
            Self::Unary { .. } => "UnaryExpression",
            Self::Cast { .. } => "CTypeExpression",
            Self::PredefinedCast { .. } => "PredefinedCastExpression",
            Self::TypeOfIs { .. } => "TypeOfExpression",
            Self::TernaryIf { .. } => "TernaryConditionalExpression",
            Self::CoalesceIf { .. } => "BinaryConditionalExpression",
            Self::Lambda { .. } => "LambdaExpression",
            Self::ObjectCreation { .. } => "ObjectCreationExpression",
            Self::AnonymousObject { .. } => "AnonymousObjectCreationExpression",
            Self::ArrayCreation { .. } => "ArrayCreationExpression",
            Self::CollectionInitializer { .. } => "CollectionInitializer",
            Self::Query { .. } => "QueryExpression",
            Self::AddressOf { .. } => "AddressOfExpression",
            Self::Parenthesized { .. } => "ParenthesizedExpression",
            Self::InterpolatedString { .. } => "InterpolatedStringExpression",
            Self::GetType { .. } => "GetTypeExpression",
            Self::NameOf { .. } => "NameOfExpression",
            Self::Await { .. } => "AwaitExpression",
        }
    }

    pub const fn is_declaration(&self) -> bool {
        matches!(
            self,
            Self::Namespace { .. }
                | Self::TypeBlock { .. }
                | Self::EnumBlock { .. }
                | Self::DelegateDecl { .. }
                | Self::Method { .. }
                | Self::Constructor { .. }
                | Self::Property { .. }
                | Self::Event { .. }
                | Self::Field { .. }
        )
    }
}

// =============================================================================
// Arena
// =============================================================================

/// A source node with its byte range in the source text.
#[derive(Clone, Debug, PartialEq)]
pub struct SourceNode {
    pub kind: SourceKind,
    pub pos: u32,
    pub end: u32,
}

/// Flat storage of a parsed compilation unit.
#[derive(Clone, Debug, Default)]
pub struct SourceArena {
    nodes: Vec<SourceNode>,
    source_text: String,
}

impl SourceArena {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an arena that remembers the text it was parsed from, so
    /// placeholders can carry the original source of unconvertible members.
    pub fn with_text(text: impl Into<String>) -> Self {
        Self {
            nodes: Vec::new(),
            source_text: text.into(),
        }
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Add a node spanning `pos..end` of the source text.
    pub fn add_spanned(&mut self, kind: SourceKind, pos: u32, end: u32) -> NodeIndex {
        let idx = NodeIndex(self.nodes.len() as u32);
        self.nodes.push(SourceNode { kind, pos, end });
        idx
    }

    /// Add a synthetic node without a source span.
    pub fn add(&mut self, kind: SourceKind) -> NodeIndex {
        self.add_spanned(kind, 0, 0)
    }

    #[inline]
    pub fn get(&self, idx: NodeIndex) -> Option<&SourceNode> {
        if idx.is_none() {
            return None;
        }
        self.nodes.get(idx.0 as usize)
    }

    #[inline]
    pub fn kind(&self, idx: NodeIndex) -> Option<&SourceKind> {
        self.get(idx).map(|node| &node.kind)
    }

    /// Original text of a node, or an empty string for synthetic nodes.
    pub fn text(&self, idx: NodeIndex) -> &str {
        let Some(node) = self.get(idx) else {
            return "";
        };
        let start = node.pos as usize;
        let end = std::cmp::min(node.end as usize, self.source_text.len());
        if start >= end {
            return "";
        }
        self.source_text.get(start..end).unwrap_or("")
    }

    /// Iterate nodes with their indices.
    pub fn iter(&self) -> impl Iterator<Item = (NodeIndex, &SourceNode)> {
        self.nodes
            .iter()
            .enumerate()
            .map(|(i, node)| (NodeIndex(i as u32), node))
    }

    /// Identifier text of an `Identifier` or `ModifiedIdentifier` node.
    pub fn identifier_text(&self, idx: NodeIndex) -> Option<&str> {
        match self.kind(idx)? {
            SourceKind::Identifier { name } | SourceKind::ModifiedIdentifier { name, .. } => {
                Some(name)
            }
            _ => None,
        }
    }

    /// Skip any number of parentheses around an expression.
    pub fn skip_parentheses(&self, mut idx: NodeIndex) -> NodeIndex {
        while let Some(SourceKind::Parenthesized { expression }) = self.kind(idx) {
            idx = *expression;
        }
        idx
    }

    // =========================================================================
    // Builder helpers (used by front-ends and tests)
    // =========================================================================

    pub fn identifier(&mut self, name: impl Into<String>) -> NodeIndex {
        self.add(SourceKind::Identifier { name: name.into() })
    }

    pub fn literal(&mut self, value: ConstValue, text: impl Into<String>) -> NodeIndex {
        self.add(SourceKind::Literal {
            value,
            text: text.into(),
        })
    }

    pub fn int_literal(&mut self, value: i32) -> NodeIndex {
        self.literal(ConstValue::Int32(value), value.to_string())
    }

    pub fn string_literal(&mut self, value: &str) -> NodeIndex {
        let text = format!("\"{}\"", value.replace('"', "\"\""));
        self.literal(ConstValue::String(value.to_string()), text)
    }

    pub fn nothing(&mut self) -> NodeIndex {
        self.literal(ConstValue::Nothing, "Nothing")
    }

    pub fn binary(&mut self, op: BinaryOp, left: NodeIndex, right: NodeIndex) -> NodeIndex {
        self.add(SourceKind::Binary { op, left, right })
    }

    pub fn member(&mut self, expression: NodeIndex, name: impl Into<String>) -> NodeIndex {
        self.add(SourceKind::MemberAccess {
            expression: Some(expression),
            name: name.into(),
            type_args: Vec::new(),
        })
    }

    pub fn invocation(&mut self, expression: NodeIndex, args: Vec<NodeIndex>) -> NodeIndex {
        self.add(SourceKind::Invocation {
            expression,
            arguments: args.into_iter().map(Argument::positional).collect(),
        })
    }

    pub fn modified_identifier(&mut self, name: impl Into<String>) -> NodeIndex {
        self.add(SourceKind::ModifiedIdentifier {
            name: name.into(),
            bounds: Vec::new(),
            array_rank: 0,
            nullable: false,
        })
    }

    pub fn expression_statement(&mut self, expression: NodeIndex) -> NodeIndex {
        self.add(SourceKind::ExpressionStatement { expression })
    }

    pub fn assignment(&mut self, target: NodeIndex, value: NodeIndex) -> NodeIndex {
        self.add(SourceKind::Assignment {
            op: AssignmentOp::Assign,
            target,
            value,
        })
    }

    /// `Dim name As type = initializer`
    pub fn dim(
        &mut self,
        name: NodeIndex,
        as_type: Option<TypeRef>,
        initializer: Option<NodeIndex>,
    ) -> NodeIndex {
        self.add(SourceKind::LocalDeclaration {
            modifiers: Modifiers::DIM,
            declarators: vec![Declarator {
                names: vec![name],
                as_type,
                as_new: None,
                initializer,
            }],
        })
    }
}

#[cfg(test)]
#[path = "../tests/source.rs"]
mod tests;
