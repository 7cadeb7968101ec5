/// The DSL's entire grammar, by construction. There is no `Call`,
/// `Attribute`, or `Lambda` variant — the parser has no production that
/// could ever build one, so rejecting them is a property of the type,
/// not a runtime check.
#[derive(Debug, Clone)]
pub enum Expr {
    BoolOp(BoolOp, Vec<Expr>),
    UnaryNot(Box<Expr>),
    BinOp(BinOp, Box<Expr>, Box<Expr>),
    Compare(CompareOp, Box<Expr>, Box<Expr>),
    Name(String),
    Const(serde_json::Value),
    Subscript(Box<Expr>, Box<Expr>),
}

#[derive(Debug, Clone, Copy)]
pub enum BoolOp {
    And,
    Or,
}

#[derive(Debug, Clone, Copy)]
pub enum BinOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

#[derive(Debug, Clone, Copy)]
pub enum CompareOp {
    Eq,
    NotEq,
    Gt,
    GtE,
    Lt,
    LtE,
    In,
    NotIn,
}
