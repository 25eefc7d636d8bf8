//! Integer constant expressions.
//!
//! Constant values are restricted to integer literals, references to other
//! constants, the unary sign operators and the binary operators
//! `+ - * / MOD` with parentheses.

use core::fmt;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
    Mod,
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let text = match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
            BinaryOp::Mod => "MOD",
        };
        write!(f, "{}", text)
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Expr {
    Integer(i64),
    Symbol(String),
    Negate(Box<Expr>),
    Binary {
        op: BinaryOp,
        left: Box<Expr>,
        right: Box<Expr>,
    },
}

impl Expr {
    pub fn binary(op: BinaryOp, left: Expr, right: Expr) -> Self {
        Expr::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        }
    }

    /// Returns the names of the symbols the expression refers to in
    /// the order they appear, without duplicates.
    pub fn symbols(&self) -> Vec<&str> {
        let mut found = vec![];
        self.collect_symbols(&mut found);
        found
    }

    fn collect_symbols<'a>(&'a self, found: &mut Vec<&'a str>) {
        match self {
            Expr::Integer(_) => {}
            Expr::Symbol(name) => {
                if !found.contains(&name.as_str()) {
                    found.push(name.as_str());
                }
            }
            Expr::Negate(inner) => inner.collect_symbols(found),
            Expr::Binary { left, right, .. } => {
                left.collect_symbols(found);
                right.collect_symbols(found);
            }
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::Integer(value) => write!(f, "{}", value),
            Expr::Symbol(name) => write!(f, "{}", name),
            Expr::Negate(inner) => write!(f, "-{}", inner),
            Expr::Binary { op, left, right } => write!(f, "({} {} {})", left, op, right),
        }
    }
}
