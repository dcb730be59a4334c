use std::collections::HashMap;

use lpmodel_core::{Expr, LpMatrix, Model, ModelConfig, ModelError, Operand, Operator, Variable};
use ndarray::{Array1, Array2};
use serde::Deserialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DocumentError {
    #[error("failed to read model file: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid model JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("undeclared variable: {0}")]
    UndeclaredVariable(String),

    #[error("matrix rows must all have the same length")]
    RaggedMatrix,

    #[error("constraint {index}: {source}")]
    Constraint {
        index: usize,
        #[source]
        source: ModelError,
    },

    #[error(transparent)]
    Model(#[from] ModelError),
}

/// A model described in JSON
#[derive(Debug, Deserialize)]
pub struct ModelDocument {
    pub variables: Vec<VariableDecl>,
    #[serde(default)]
    pub constraints: Vec<ConstraintDecl>,
    #[serde(default)]
    pub objective: Option<ExprNode>,
}

#[derive(Debug, Deserialize)]
pub struct VariableDecl {
    pub name: String,
    pub dim: usize,
    #[serde(default)]
    pub integer: bool,
    #[serde(default)]
    pub lower: Option<BoundValue>,
    #[serde(default)]
    pub upper: Option<BoundValue>,
}

/// A bound given as one value for every entry, or one per entry
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum BoundValue {
    Scalar(f64),
    Vector(Vec<f64>),
}

impl BoundValue {
    fn to_array(&self, dim: usize) -> Array1<f64> {
        match self {
            BoundValue::Scalar(v) => Array1::from_elem(dim, *v),
            BoundValue::Vector(v) => Array1::from(v.clone()),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct ConstraintDecl {
    #[serde(default)]
    pub name: Option<String>,
    pub expr: ExprNode,
}

#[derive(Debug, Clone, Copy, Deserialize)]
pub enum BinaryOp {
    #[serde(rename = "<=")]
    Le,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "+")]
    Add,
    #[serde(rename = "-")]
    Sub,
    #[serde(rename = "*")]
    Mul,
}

#[derive(Debug, Clone, Copy, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnaryOp {
    Neg,
    Sum,
}

/// JSON expression tree
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum ExprNode {
    Number(f64),
    Var {
        var: String,
        #[serde(default)]
        slice: Option<[usize; 2]>,
        #[serde(default)]
        index: Option<usize>,
    },
    Scalar {
        scalar: f64,
    },
    Vector {
        vector: Vec<f64>,
    },
    Matrix {
        matrix: Vec<Vec<f64>>,
    },
    Unary {
        op: UnaryOp,
        operand: Box<ExprNode>,
    },
    Binary {
        op: BinaryOp,
        left: Box<ExprNode>,
        right: Box<ExprNode>,
    },
}

impl From<BinaryOp> for Operator {
    fn from(op: BinaryOp) -> Self {
        match op {
            BinaryOp::Le => Operator::Le,
            BinaryOp::Ge => Operator::Ge,
            BinaryOp::Eq => Operator::Eq,
            BinaryOp::Add => Operator::Add,
            BinaryOp::Sub => Operator::Sub,
            BinaryOp::Mul => Operator::Mul,
        }
    }
}

impl From<UnaryOp> for Operator {
    fn from(op: UnaryOp) -> Self {
        match op {
            UnaryOp::Neg => Operator::Neg,
            UnaryOp::Sum => Operator::Sum,
        }
    }
}

impl ExprNode {
    pub fn to_operand(&self, vars: &HashMap<String, Variable>) -> Result<Operand, DocumentError> {
        Ok(match self {
            ExprNode::Number(v) | ExprNode::Scalar { scalar: v } => Operand::from(*v),
            ExprNode::Vector { vector } => Operand::from(vector.clone()),
            ExprNode::Matrix { matrix } => Operand::from(dense_matrix(matrix)?),
            ExprNode::Var { var, slice, index } => {
                let base = vars
                    .get(var)
                    .ok_or_else(|| DocumentError::UndeclaredVariable(var.clone()))?;
                let view = match (slice, index) {
                    (Some([start, stop]), _) => base.slice(*start..*stop),
                    (None, Some(i)) => base.at(*i),
                    (None, None) => base.clone(),
                };
                Operand::from(view)
            }
            ExprNode::Unary { op, operand } => {
                Operand::from(Expr::unary((*op).into(), operand.to_operand(vars)?))
            }
            ExprNode::Binary { op, left, right } => Operand::from(Expr::binary(
                (*op).into(),
                left.to_operand(vars)?,
                right.to_operand(vars)?,
            )),
        })
    }
}

fn dense_matrix(rows: &[Vec<f64>]) -> Result<LpMatrix, DocumentError> {
    let ncols = rows.first().map_or(0, Vec::len);
    if rows.iter().any(|r| r.len() != ncols) {
        return Err(DocumentError::RaggedMatrix);
    }
    let flat: Vec<f64> = rows.iter().flatten().copied().collect();
    let dense = Array2::from_shape_vec((rows.len(), ncols), flat)
        .map_err(|_| DocumentError::RaggedMatrix)?;
    Ok(LpMatrix::Dense(dense))
}

impl ModelDocument {
    pub fn from_json(source: &str) -> Result<Self, DocumentError> {
        Ok(serde_json::from_str(source)?)
    }

    /// Create the variables, add every constraint and set the objective
    pub fn build(&self, config: ModelConfig) -> Result<Model, DocumentError> {
        let mut model = Model::with_config(config);
        let mut vars = HashMap::new();

        for decl in &self.variables {
            let var = model.add_variable(&decl.name, decl.dim, decl.integer)?;
            let lower = decl.lower.as_ref().map(|b| b.to_array(decl.dim));
            let upper = decl.upper.as_ref().map(|b| b.to_array(decl.dim));
            if lower.is_some() || upper.is_some() {
                model.set_bounds(&var, lower.as_ref(), upper.as_ref())?;
            }
            vars.insert(decl.name.clone(), var);
        }

        for (index, decl) in self.constraints.iter().enumerate() {
            let expr = decl.expr.to_operand(&vars)?;
            let added = match &decl.name {
                Some(name) => model.add_named_constraint(name, expr),
                None => model.add_constraint(expr),
            };
            added.map_err(|source| DocumentError::Constraint { index, source })?;
        }

        if let Some(objective) = &self.objective {
            model.set_objective(objective.to_operand(&vars)?)?;
        }
        model.make_matrices()?;
        Ok(model)
    }
}
