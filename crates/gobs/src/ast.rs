//! The abstract syntax tree accepted by the compiler.
//!
//! The parser produces these nodes and the linter validates scoping, arity,
//! and type usage against the symbol table before the compiler ever sees
//! them. The compiler trusts this input: a malformed tree is a programming
//! error, not a user-facing diagnostic.
//!
//! Every node carries the span of the source text it was parsed from; the
//! compiler threads those spans onto each instruction it emits.

use crate::span::Span;

/// An identifier with its source location.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Ident {
    pub name: String,
    pub span: Span,
}

impl Ident {
    pub fn new(name: impl Into<String>, span: Span) -> Self {
        Self {
            name: name.into(),
            span,
        }
    }
}

/// The root of a linted program: its top-level definitions.
#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub definitions: Vec<Def>,
    pub span: Span,
}

/// A top-level definition.
#[derive(Debug, Clone, PartialEq)]
pub enum Def {
    /// The `program { ... }` entry point.
    Program { body: Stmt, span: Span },

    /// An `interactive program { ... }` entry point: event branches keyed
    /// by pattern, including the distinguished timeout pattern.
    InteractiveProgram {
        branches: Vec<SwitchBranch>,
        span: Span,
    },

    /// A user-defined procedure.
    Procedure {
        name: Ident,
        params: Vec<Ident>,
        body: Stmt,
        span: Span,
    },

    /// A user-defined function.
    Function {
        name: Ident,
        params: Vec<Ident>,
        body: Stmt,
        span: Span,
    },

    /// A record or variant type declaration. Carries no code to compile;
    /// the symbol table owns the constructor and field detail.
    Type { name: Ident, span: Span },
}

impl Def {
    pub fn span(&self) -> Span {
        match self {
            Def::Program { span, .. }
            | Def::InteractiveProgram { span, .. }
            | Def::Procedure { span, .. }
            | Def::Function { span, .. }
            | Def::Type { span, .. } => *span,
        }
    }
}

/// A statement.
///
/// Lowering a statement leaves the operand stack depth unchanged, except
/// `Return`, which leaves its result behind for the caller.
#[derive(Debug, Clone, PartialEq)]
pub enum Stmt {
    Block {
        statements: Vec<Stmt>,
        span: Span,
    },
    Return {
        result: Expr,
        span: Span,
    },
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
        span: Span,
    },
    /// `repeat (times) { body }`: bounded iteration, count fixed up front.
    Repeat {
        times: Expr,
        body: Box<Stmt>,
        span: Span,
    },
    /// `foreach index in range { body }`: iteration over a list value.
    Foreach {
        index: Ident,
        range: Expr,
        body: Box<Stmt>,
        span: Span,
    },
    While {
        condition: Expr,
        body: Box<Stmt>,
        span: Span,
    },
    /// `switch (subject) { pattern -> body ... }`: first match wins.
    Switch {
        subject: Expr,
        branches: Vec<SwitchBranch>,
        span: Span,
    },
    AssignVariable {
        variable: Ident,
        value: Expr,
        span: Span,
    },
    /// `(x1, ..., xk) := value`: destructure a tuple into named variables.
    AssignTuple {
        variables: Vec<Ident>,
        value: Expr,
        span: Span,
    },
    ProcedureCall {
        procedure: Ident,
        args: Vec<Expr>,
        span: Span,
    },
}

impl Stmt {
    pub fn span(&self) -> Span {
        match self {
            Stmt::Block { span, .. }
            | Stmt::Return { span, .. }
            | Stmt::If { span, .. }
            | Stmt::Repeat { span, .. }
            | Stmt::Foreach { span, .. }
            | Stmt::While { span, .. }
            | Stmt::Switch { span, .. }
            | Stmt::AssignVariable { span, .. }
            | Stmt::AssignTuple { span, .. }
            | Stmt::ProcedureCall { span, .. } => *span,
        }
    }
}

/// One branch of a `switch` statement or interactive program.
#[derive(Debug, Clone, PartialEq)]
pub struct SwitchBranch {
    pub pattern: Pattern,
    pub body: Stmt,
}

/// A branch pattern.
#[derive(Debug, Clone, PartialEq)]
pub enum Pattern {
    /// `_`: matches anything, binds nothing.
    Wildcard { span: Span },

    /// A constructor pattern, optionally binding the structure's fields to
    /// parameter names. Parameters correspond positionally to the
    /// constructor's declared field order.
    Structure {
        constructor: Ident,
        parameters: Vec<Ident>,
        span: Span,
    },

    /// A tuple pattern binding each component in order.
    Tuple { parameters: Vec<Ident>, span: Span },

    /// The built-in `TIMEOUT` event of interactive programs.
    Timeout { span: Span },
}

impl Pattern {
    pub fn span(&self) -> Span {
        match self {
            Pattern::Wildcard { span }
            | Pattern::Structure { span, .. }
            | Pattern::Tuple { span, .. }
            | Pattern::Timeout { span } => *span,
        }
    }
}

/// An expression. Lowering an expression pushes exactly one value.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Variable {
        name: Ident,
        span: Span,
    },
    /// An integer literal. The digits are carried as text; the compiler
    /// parses them into a big integer when emitting code.
    ConstantNumber {
        value: String,
        span: Span,
    },
    ConstantString {
        value: String,
        span: Span,
    },
    List {
        elements: Vec<Expr>,
        span: Span,
    },
    /// `[first, second .. last]`: an arithmetic progression.
    Range {
        first: Box<Expr>,
        second: Option<Box<Expr>>,
        last: Box<Expr>,
        span: Span,
    },
    Tuple {
        elements: Vec<Expr>,
        span: Span,
    },
    /// `Constructor(field1 <- value1, ...)`: structure construction.
    Structure {
        constructor: Ident,
        fields: Vec<FieldValue>,
        span: Span,
    },
    /// `Constructor(original | field1 <- value1, ...)`: a copy of an
    /// existing structure with some fields replaced.
    StructureUpdate {
        constructor: Ident,
        original: Box<Expr>,
        fields: Vec<FieldValue>,
        span: Span,
    },
    FunctionCall {
        function: Ident,
        args: Vec<Expr>,
        span: Span,
    },
}

impl Expr {
    pub fn span(&self) -> Span {
        match self {
            Expr::Variable { span, .. }
            | Expr::ConstantNumber { span, .. }
            | Expr::ConstantString { span, .. }
            | Expr::List { span, .. }
            | Expr::Range { span, .. }
            | Expr::Tuple { span, .. }
            | Expr::Structure { span, .. }
            | Expr::StructureUpdate { span, .. }
            | Expr::FunctionCall { span, .. } => *span,
        }
    }
}

/// A `field <- value` binding in structure construction.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    pub field: Ident,
    pub value: Expr,
}
