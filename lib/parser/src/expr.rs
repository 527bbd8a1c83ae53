use std::fmt::{self, Display, Formatter};

use scanner::TokenData;

/// Abstract syntax tree of an arithmetic expression. Every node owns its
/// children, so a tree is always complete once the parser hands it out.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Literal(f64),
    UnaryMinus(Box<Expr>),
    Binary { op: BinaryOp, left: Box<Expr>, right: Box<Expr> },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, strum::Display)]
pub enum BinaryOp {
    #[strum(serialize = "+")]
    Add,
    #[strum(serialize = "-")]
    Sub,
    #[strum(serialize = "*")]
    Mul,
    #[strum(serialize = "/")]
    Div,
}

impl BinaryOp {
    pub fn from_token(data: &TokenData) -> Option<Self> {
        match data {
            TokenData::Plus => Some(Self::Add),
            TokenData::Minus => Some(Self::Sub),
            TokenData::Star => Some(Self::Mul),
            TokenData::Slash => Some(Self::Div),
            _ => None,
        }
    }
}

impl Expr {
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary { op, left: Box::new(left), right: Box::new(right) }
    }

    pub fn negate(operand: Expr) -> Self {
        Expr::UnaryMinus(Box::new(operand))
    }
}

impl Display for Expr {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Literal(value) => write!(f, "{}", value),
            Expr::UnaryMinus(operand) => write!(f, "(- {})", operand),
            Expr::Binary { op, left, right } => write!(f, "({} {} {})", op, left, right),
        }
    }
}
