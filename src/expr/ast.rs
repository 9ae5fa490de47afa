//! Abstract Syntax Tree types for template expressions

/// Byte range in source text
pub type Span = std::ops::Range<usize>;

/// AST node with source location
#[derive(Debug, Clone, PartialEq)]
pub struct Spanned<T> {
    pub node: T,
    pub span: Span,
}

impl<T> Spanned<T> {
    pub fn new(node: T, span: Span) -> Self {
        Self { node, span }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UnaryOp {
    /// `-x`
    Negate,
    /// `+x`
    Plus,
    /// `!x`
    Not,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Rem,
    Less,
    LessOrEqual,
    Greater,
    GreaterOrEqual,
    /// Loose equality with primitive coercion (`==`)
    Eq,
    NotEq,
    /// Equality without coercion (`===`)
    StrictEq,
    StrictNotEq,
    And,
    Or,
}

impl BinaryOp {
    pub fn symbol(self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Rem => "%",
            BinaryOp::Less => "<",
            BinaryOp::LessOrEqual => "<=",
            BinaryOp::Greater => ">",
            BinaryOp::GreaterOrEqual => ">=",
            BinaryOp::Eq => "==",
            BinaryOp::NotEq => "!=",
            BinaryOp::StrictEq => "===",
            BinaryOp::StrictNotEq => "!==",
            BinaryOp::And => "&&",
            BinaryOp::Or => "||",
        }
    }
}

/// A parsed expression
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Null,
    Bool(bool),
    Number(f64),
    String(String),
    /// Array literal: `[a, b]`
    Array(Vec<Spanned<Expr>>),
    /// Object literal: `{key: value}`
    Object(Vec<(String, Spanned<Expr>)>),
    /// Name resolved against the evaluation scope
    Ident(String),
    /// Property access: `target.name`
    Member {
        target: Box<Spanned<Expr>>,
        name: String,
    },
    /// Computed access: `target[index]`
    Index {
        target: Box<Spanned<Expr>>,
        index: Box<Spanned<Expr>>,
    },
    /// Call of a scope-provided function: `callee(args)`
    Call {
        callee: Box<Spanned<Expr>>,
        args: Vec<Spanned<Expr>>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<Spanned<Expr>>,
    },
    Binary {
        op: BinaryOp,
        lhs: Box<Spanned<Expr>>,
        rhs: Box<Spanned<Expr>>,
    },
    /// `test ? then : otherwise`
    Conditional {
        test: Box<Spanned<Expr>>,
        then: Box<Spanned<Expr>>,
        otherwise: Box<Spanned<Expr>>,
    },
}

impl Expr {
    /// Short human-readable description used in error messages
    pub fn describe(&self) -> String {
        match self {
            Expr::Ident(name) => name.clone(),
            Expr::Member { target, name } => format!("{}.{}", target.node.describe(), name),
            Expr::Index { target, .. } => format!("{}[...]", target.node.describe()),
            Expr::Call { callee, .. } => format!("{}(...)", callee.node.describe()),
            Expr::Null => "null".to_string(),
            Expr::Bool(b) => b.to_string(),
            Expr::Number(n) => n.to_string(),
            Expr::String(s) => format!("'{}'", s),
            Expr::Array(_) => "array literal".to_string(),
            Expr::Object(_) => "object literal".to_string(),
            Expr::Unary { .. } | Expr::Binary { .. } | Expr::Conditional { .. } => {
                "expression".to_string()
            }
        }
    }
}
