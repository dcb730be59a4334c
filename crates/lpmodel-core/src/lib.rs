//! Algebraic modeling layer for linear programs.
//!
//! Block variables and operator-built expressions compile into the flat form
//! a simplex-type solver consumes: a sparse coefficient matrix, row bounds,
//! column bounds and an objective vector.

mod array;
mod config;
mod constraint;
mod error;
mod expr;
mod index;
mod matrix;
mod model;
mod sparse;
mod variable;

pub use array::LpArray;
pub use config::{COIN_INFINITY, ModelConfig};
pub use constraint::{Constraint, Partial, RangeBounds, Term, Value};
pub use error::{ErrorKind, ModelError};
pub use expr::{Compare, Expr, Operand, Operator, Token};
pub use index::IndexFactory;
pub use matrix::LpMatrix;
pub use model::{LpMatrices, Model};
pub use sparse::SparseMatrix;
pub use variable::{BlockId, Variable, VariableBlock, ViewId};
