use thiserror::Error;

use crate::expr::Operator;

/// Broad classes of modeling failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Coefficient or bound shapes disagree with the variable or the constraint
    Dimension,
    /// A comparison does not have exactly one constant side
    Comparison,
    /// Anything else: unsupported operand combinations, unknown blocks, ...
    Model,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Coefficient for {variable} has {found} columns, expected {expected}")]
    CoefficientColumns {
        variable: String,
        expected: usize,
        found: usize,
    },
    #[error("Coefficient for {variable} has {found} rows, expected {expected}")]
    RowCountConflict {
        variable: String,
        expected: usize,
        found: usize,
    },
    #[error("Bound has length {found}, expected {expected}")]
    BoundLength { expected: usize, found: usize },
    #[error("Index {index} is out of range for {variable} of length {dim}")]
    IndexOutOfRange {
        variable: String,
        index: usize,
        dim: usize,
    },
    #[error("Entry ({row}, {col}) lies outside a block of shape {shape:?}")]
    EntryOutOfBounds {
        row: usize,
        col: usize,
        shape: (usize, usize),
    },
    #[error("At least one side of a comparison sign should be symbolic")]
    BothSidesConstant,
    #[error("At least one side of a comparison sign should be constant")]
    BothSidesSymbolic,
    #[error("Unsupported operands for '{op}': {detail}")]
    UnsupportedOperands { op: Operator, detail: String },
    #[error("Expression does not reference any variable")]
    NoVariables,
    #[error("Malformed expression: {0}")]
    MalformedExpression(String),
    #[error("Variable block '{0}' already exists")]
    DuplicateVariable(String),
    #[error("Unknown variable block: {0}")]
    UnknownVariable(String),
    #[error("Cannot stack blocks of shape {left:?} and {right:?}")]
    ShapeMismatch {
        left: (usize, usize),
        right: (usize, usize),
    },
}

impl ModelError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            ModelError::CoefficientColumns { .. }
            | ModelError::RowCountConflict { .. }
            | ModelError::BoundLength { .. }
            | ModelError::IndexOutOfRange { .. }
            | ModelError::EntryOutOfBounds { .. } => ErrorKind::Dimension,
            ModelError::BothSidesConstant | ModelError::BothSidesSymbolic => ErrorKind::Comparison,
            _ => ErrorKind::Model,
        }
    }

    pub(crate) fn unsupported(op: Operator, detail: impl Into<String>) -> Self {
        ModelError::UnsupportedOperands {
            op,
            detail: detail.into(),
        }
    }
}
