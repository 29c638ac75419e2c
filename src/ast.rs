//! Abstract‑syntax‑tree node definitions for the Fave language.
//!
//! Both node categories are closed sum types so the resolver and evaluator
//! dispatch with exhaustive `match`es.  Trees are produced once by the parser
//! and never mutated afterwards; the only out‑of‑band annotation (lexical
//! depth) lives in the interpreter's side table, keyed by [`NodeId`].

use std::rc::Rc;

use crate::token::Token;

/// Stable identity of a resolvable node, assigned by the parser.
///
/// Ids are unique for the lifetime of a session (the prompt threads its
/// counter across lines), so a depth recorded for a closure body on one line
/// can never be clobbered by a later line's AST.
pub type NodeId = u32;

/// A **literal constant** that appears directly in the source code.
///
/// These variants are the *terminal leaves* of the expression tree and
/// therefore do **not** retain the originating [`Token`]; the parser copies
/// the value at parse‑time.
#[derive(Debug, Clone, PartialEq)]
pub enum LiteralValue {
    /// Numeric literal ‑ stored as IEEE‑754 `f64`.
    /// Integral lexemes such as `"3"` are still parsed as `3.0`.
    Number(f64),

    /// String literal without surrounding quotes.
    Str(String),

    /// The boolean constant `true`.
    True,

    /// The boolean constant `false`.
    False,

    /// The `nil` literal.
    Nil,
}

/// **AST node** representing every kind of *expression* in Fave.
#[derive(Debug, Clone)]
pub enum Expr {
    /// A literal constant: number, string, `true`, `false`, or `nil`.
    Literal(LiteralValue),

    /// Parenthesised sub‑expression: `"(" expression ")"`.
    Grouping(Box<Expr>),

    /// Prefix unary operator expression
    /// *Example:* `!isReady` or `-42`
    Unary {
        /// The operator token (`!` or `-`).
        operator: Token,
        /// Operand to which the operator is applied.
        right: Box<Expr>,
    },

    /// Infix binary operator expression
    /// *Example:* `a + b`, `x <= y`
    Binary {
        left: Box<Expr>,
        /// Operator token such as `+`, `*`, `==`, …
        operator: Token,
        right: Box<Expr>,
    },

    /// Short‑circuiting logical operators `and` / `or`.
    Logical {
        left: Box<Expr>,
        operator: Token, // `AND` or `OR`
        right: Box<Expr>,
    },

    /// Variable access ‑ resolves to the identifier's current value at runtime.
    Variable { name: Token, id: NodeId },

    /// Assignment expression: `identifier "=" expression`
    Assign {
        name: Token,
        value: Box<Expr>,
        id: NodeId,
    },

    /// Function‑ or method‑call expression
    /// *Example:* `clock()` or `add(1, 2)`
    Call {
        /// Expression that evaluates to a callable (variable, property, etc.).
        callee: Box<Expr>,
        /// The closing `)` token ‑ retained for error reporting.
        paren: Token,
        /// Argument list (may be empty).
        arguments: Vec<Expr>,
    },

    /// object.property
    Get { object: Box<Expr>, name: Token },

    /// object.property = value
    Set {
        object: Box<Expr>,
        name: Token,
        value: Box<Expr>,
    },

    /// The `this` keyword inside a method.
    This { keyword: Token, id: NodeId },

    /// `super.method` inside a subclass method.
    Super {
        keyword: Token,
        method: Token,
        id: NodeId,
    },
}

/// **AST node** for *statements* (complete executable constructs).  A program
/// is the sequence of these nodes returned by the parser.
///
/// There is no `For` variant: `for` desugars at parse time into a `Block`
/// wrapping a `While`.
#[derive(Debug, Clone)]
pub enum Stmt {
    /// Stand‑alone expression terminated by a semicolon.
    Expression(Expr),

    /// `print` statement used for output.
    Print(Expr),

    /// Variable declaration: `"var" IDENT ("=" initializer)? ";"`.
    Var {
        name: Token,
        initializer: Option<Expr>,
    },

    /// Braced scope containing zero or more declarations/statements.
    Block(Vec<Stmt>),

    /// `if` / `else` conditional.
    If {
        condition: Expr,
        then_branch: Box<Stmt>,
        else_branch: Option<Box<Stmt>>,
    },

    /// `while` loop.
    While { condition: Expr, body: Box<Stmt> },

    /// Function declaration ‑ becomes a first‑class callable value.
    /// Shared so a closure value can keep the body alive past the run that
    /// parsed it.
    Function(Rc<FunctionDecl>),

    /// `return` statement inside a function body.
    Return {
        /// The `return` keyword token (for diagnostics).
        keyword: Token,

        /// Optional expression to return.  Absent ⇒ `nil` is returned.
        value: Option<Expr>,
    },

    /// Class declaration.
    Class(Rc<ClassDecl>),
}

/// A function or method declaration shared between the AST and any runtime
/// closures created from it.
#[derive(Debug)]
pub struct FunctionDecl {
    pub name: Token,

    /// Parameter name tokens (arity ≤ 255).
    pub params: Vec<Token>,

    /// Body executed when the function is called.
    pub body: Vec<Stmt>,
}

/// A class declaration: name, optional superclass expression, and its
/// methods in declaration order.
#[derive(Debug)]
pub struct ClassDecl {
    pub name: Token,

    /// Superclass reference (`Expr::Variable`) when declared with `<`.
    pub superclass: Option<Expr>,

    pub methods: Vec<Rc<FunctionDecl>>,
}
