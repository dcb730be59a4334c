use std::fmt;
use std::ops::{Add, Mul, Neg, Sub};

use ndarray::{Array1, Array2};

use crate::array::LpArray;
use crate::config::ModelConfig;
use crate::constraint::{Constraint, Value};
use crate::error::ModelError;
use crate::matrix::LpMatrix;
use crate::sparse::SparseMatrix;
use crate::variable::Variable;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Operator {
    Le,
    Ge,
    Eq,
    Add,
    Sub,
    Mul,
    /// Unary negation
    Neg,
    Sum,
}

impl Operator {
    pub fn as_str(self) -> &'static str {
        match self {
            Operator::Le => "<=",
            Operator::Ge => ">=",
            Operator::Eq => "==",
            Operator::Add => "+",
            Operator::Sub => "-",
            Operator::Mul => "*",
            Operator::Neg => "u-",
            Operator::Sum => "sum",
        }
    }

    pub fn is_comparison(self) -> bool {
        matches!(self, Operator::Le | Operator::Ge | Operator::Eq)
    }

    pub fn is_unary(self) -> bool {
        matches!(self, Operator::Neg | Operator::Sum)
    }
}

impl fmt::Display for Operator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of an expression node
#[derive(Debug, Clone)]
pub enum Operand {
    Scalar(f64),
    Vector(Array1<f64>),
    Matrix(LpMatrix),
    Variable(Variable),
    Expr(Box<Expr>),
}

impl Operand {
    /// Variables and expressions are symbolic, numbers are constant
    pub fn is_symbolic(&self) -> bool {
        matches!(self, Operand::Variable(_) | Operand::Expr(_))
    }

    /// Tokens in operator-last order
    pub fn postfix(&self) -> Vec<Token<'_>> {
        let mut tokens = Vec::new();
        self.push_postfix(&mut tokens);
        tokens
    }

    fn push_postfix<'a>(&'a self, tokens: &mut Vec<Token<'a>>) {
        match self {
            Operand::Expr(expr) => expr.push_postfix(tokens),
            other => tokens.push(Token::Operand(other)),
        }
    }

    pub fn evaluate(&self) -> Result<Constraint, ModelError> {
        self.evaluate_with(&ModelConfig::default())
    }

    /// Replay the postfix tokens against an operand stack, feeding one
    /// constraint accumulator.
    pub fn evaluate_with(&self, config: &ModelConfig) -> Result<Constraint, ModelError> {
        evaluate_tokens(self.postfix(), config)
    }
}

fn missing_operand(op: Operator) -> ModelError {
    ModelError::MalformedExpression(format!("missing operand for '{op}'"))
}

/// A postfix token: an operand leaf or an operator
#[derive(Debug, Clone, Copy)]
pub enum Token<'a> {
    Operand(&'a Operand),
    Operator(Operator),
}

/// An expression node. Built by the arithmetic operators and [`Compare`];
/// nothing is computed until [`Expr::evaluate`].
#[derive(Debug, Clone)]
pub struct Expr {
    op: Operator,
    left: Option<Operand>,
    right: Operand,
}

impl Expr {
    pub fn binary(op: Operator, left: impl Into<Operand>, right: impl Into<Operand>) -> Self {
        Self {
            op,
            left: Some(left.into()),
            right: right.into(),
        }
    }

    pub fn unary(op: Operator, operand: impl Into<Operand>) -> Self {
        Self {
            op,
            left: None,
            right: operand.into(),
        }
    }

    pub fn op(&self) -> Operator {
        self.op
    }

    pub fn left(&self) -> Option<&Operand> {
        self.left.as_ref()
    }

    pub fn right(&self) -> &Operand {
        &self.right
    }

    pub fn postfix(&self) -> Vec<Token<'_>> {
        let mut tokens = Vec::new();
        self.push_postfix(&mut tokens);
        tokens
    }

    fn push_postfix<'a>(&'a self, tokens: &mut Vec<Token<'a>>) {
        if let Some(left) = &self.left {
            left.push_postfix(tokens);
        }
        self.right.push_postfix(tokens);
        tokens.push(Token::Operator(self.op));
    }

    pub fn evaluate(&self) -> Result<Constraint, ModelError> {
        self.evaluate_with(&ModelConfig::default())
    }

    pub fn evaluate_with(&self, config: &ModelConfig) -> Result<Constraint, ModelError> {
        evaluate_tokens(self.postfix(), config)
    }
}

fn evaluate_tokens(tokens: Vec<Token<'_>>, config: &ModelConfig) -> Result<Constraint, ModelError> {
    let mut cons = Constraint::new(config.infinity());
    let mut operands: Vec<Value> = Vec::with_capacity(tokens.len());

    for token in tokens {
        match token {
            Token::Operand(operand) => {
                let value = Value::from_operand(operand)?;
                if let Value::Variable(var) = &value {
                    cons.touch(var);
                }
                operands.push(value);
            }
            Token::Operator(op) => {
                let right = operands.pop().ok_or_else(|| missing_operand(op))?;
                let left = if op.is_unary() {
                    None
                } else {
                    Some(operands.pop().ok_or_else(|| missing_operand(op))?)
                };
                tracing::trace!(op = %op, "perform");
                let partial = cons.perform(op, left, right)?;
                operands.push(partial);
            }
        }
    }

    // A lone variable with no operator means "the sum of its entries"
    match (operands.pop(), operands.is_empty()) {
        (Some(Value::Variable(var)), true) => cons.assign_naked(&var)?,
        (Some(_), true) => {}
        _ => {
            return Err(ModelError::MalformedExpression(
                "operands left over after evaluation".to_string(),
            ));
        }
    }

    cons.finish()?;
    Ok(cons)
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, token) in self.postfix().into_iter().enumerate() {
            if i > 0 {
                f.write_str(" ")?;
            }
            match token {
                Token::Operator(op) => write!(f, "{op}")?,
                Token::Operand(Operand::Scalar(v)) => write!(f, "{v}")?,
                Token::Operand(Operand::Vector(v)) => write!(f, "{v}")?,
                Token::Operand(Operand::Matrix(m)) => {
                    let (r, c) = m.shape();
                    write!(f, "<{r}x{c} matrix>")?
                }
                Token::Operand(Operand::Variable(v)) => write!(f, "{v}")?,
                Token::Operand(Operand::Expr(e)) => write!(f, "({e})")?,
            }
        }
        Ok(())
    }
}

impl From<f64> for Operand {
    fn from(v: f64) -> Self {
        Operand::Scalar(v)
    }
}

impl From<Array1<f64>> for Operand {
    fn from(v: Array1<f64>) -> Self {
        Operand::Vector(v)
    }
}

impl From<Vec<f64>> for Operand {
    fn from(v: Vec<f64>) -> Self {
        Operand::Vector(Array1::from(v))
    }
}

impl From<LpArray> for Operand {
    fn from(v: LpArray) -> Self {
        Operand::Vector(v.into_inner())
    }
}

impl From<&LpArray> for Operand {
    fn from(v: &LpArray) -> Self {
        Operand::Vector(v.as_array().clone())
    }
}

impl From<Array2<f64>> for Operand {
    fn from(m: Array2<f64>) -> Self {
        Operand::Matrix(LpMatrix::Dense(m))
    }
}

impl From<SparseMatrix> for Operand {
    fn from(m: SparseMatrix) -> Self {
        Operand::Matrix(LpMatrix::Sparse(m))
    }
}

impl From<LpMatrix> for Operand {
    fn from(m: LpMatrix) -> Self {
        Operand::Matrix(m)
    }
}

impl From<&LpMatrix> for Operand {
    fn from(m: &LpMatrix) -> Self {
        Operand::Matrix(m.clone())
    }
}

impl From<Variable> for Operand {
    fn from(v: Variable) -> Self {
        Operand::Variable(v)
    }
}

impl From<&Variable> for Operand {
    fn from(v: &Variable) -> Self {
        Operand::Variable(v.clone())
    }
}

impl From<Expr> for Operand {
    fn from(e: Expr) -> Self {
        Operand::Expr(Box::new(e))
    }
}

/// Comparisons that build expression nodes.
///
/// Rust's comparison operators must return `bool`, so constraints are written
/// `x.slice(1..3).geq(1.1).leq(&upper)` or `1.1.leq(&x)`.
pub trait Compare<Rhs> {
    type Output;

    fn leq(self, rhs: Rhs) -> Self::Output;
    fn geq(self, rhs: Rhs) -> Self::Output;
    fn equals(self, rhs: Rhs) -> Self::Output;
}

macro_rules! impl_symbolic_lhs {
    ($($lhs:ty),+) => {$(
        impl<R: Into<Operand>> Add<R> for $lhs {
            type Output = Expr;

            fn add(self, rhs: R) -> Expr {
                Expr::binary(Operator::Add, self, rhs)
            }
        }

        impl<R: Into<Operand>> Sub<R> for $lhs {
            type Output = Expr;

            fn sub(self, rhs: R) -> Expr {
                Expr::binary(Operator::Sub, self, rhs)
            }
        }

        impl<R: Into<Operand>> Mul<R> for $lhs {
            type Output = Expr;

            fn mul(self, rhs: R) -> Expr {
                Expr::binary(Operator::Mul, self, rhs)
            }
        }

        impl Neg for $lhs {
            type Output = Expr;

            fn neg(self) -> Expr {
                Expr::unary(Operator::Neg, self)
            }
        }

        impl<R: Into<Operand>> Compare<R> for $lhs {
            type Output = Expr;

            fn leq(self, rhs: R) -> Expr {
                Expr::binary(Operator::Le, self, rhs)
            }

            fn geq(self, rhs: R) -> Expr {
                Expr::binary(Operator::Ge, self, rhs)
            }

            fn equals(self, rhs: R) -> Expr {
                Expr::binary(Operator::Eq, self, rhs)
            }
        }
    )+};
}

impl_symbolic_lhs!(Expr, Variable, &Variable);

/// Constant on the left of a symbolic operand: the result is always symbolic.
macro_rules! impl_constant_lhs {
    ($lhs:ty => $($rhs:ty),+) => {$(
        impl Add<$rhs> for $lhs {
            type Output = Expr;

            fn add(self, rhs: $rhs) -> Expr {
                Expr::binary(Operator::Add, self, rhs)
            }
        }

        impl Sub<$rhs> for $lhs {
            type Output = Expr;

            fn sub(self, rhs: $rhs) -> Expr {
                Expr::binary(Operator::Sub, self, rhs)
            }
        }

        impl Mul<$rhs> for $lhs {
            type Output = Expr;

            fn mul(self, rhs: $rhs) -> Expr {
                Expr::binary(Operator::Mul, self, rhs)
            }
        }

        impl Compare<$rhs> for $lhs {
            type Output = Expr;

            fn leq(self, rhs: $rhs) -> Expr {
                Expr::binary(Operator::Le, self, rhs)
            }

            fn geq(self, rhs: $rhs) -> Expr {
                Expr::binary(Operator::Ge, self, rhs)
            }

            fn equals(self, rhs: $rhs) -> Expr {
                Expr::binary(Operator::Eq, self, rhs)
            }
        }
    )+};
}

impl_constant_lhs!(f64 => Variable, &Variable, Expr);
impl_constant_lhs!(LpArray => Variable, &Variable, Expr);
impl_constant_lhs!(&LpArray => Variable, &Variable, Expr);

macro_rules! impl_matrix_mul {
    ($lhs:ty => $($rhs:ty),+) => {$(
        impl Mul<$rhs> for $lhs {
            type Output = Expr;

            fn mul(self, rhs: $rhs) -> Expr {
                Expr::binary(Operator::Mul, self, rhs)
            }
        }
    )+};
}

impl_matrix_mul!(LpMatrix => Variable, &Variable);
impl_matrix_mul!(&LpMatrix => Variable, &Variable);
