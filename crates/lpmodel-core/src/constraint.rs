use std::sync::Arc;

use indexmap::IndexMap;
use ndarray::Array1;

use crate::error::ModelError;
use crate::expr::{Operand, Operator};
use crate::matrix::LpMatrix;
use crate::sparse;
use crate::variable::{Variable, ViewId};

/// A variable view together with its coefficient block
#[derive(Debug, Clone)]
pub struct Term {
    pub variable: Variable,
    /// `n_rows x variable.dim()` block
    pub coef: LpMatrix,
}

/// Bounds a range constraint writes onto a variable's own columns
#[derive(Debug, Clone)]
pub struct RangeBounds {
    pub variable: Variable,
    pub lower: Option<Array1<f64>>,
    pub upper: Option<Array1<f64>>,
}

/// Numeric constant carried by an operand or a partial result
#[derive(Debug, Clone, PartialEq)]
enum Constant {
    Scalar(f64),
    Vector(Array1<f64>),
}

impl Constant {
    fn broadcast(&self, len: usize) -> Result<Array1<f64>, ModelError> {
        match self {
            Constant::Scalar(v) => Ok(Array1::from_elem(len, *v)),
            Constant::Vector(v) if v.len() == len => Ok(v.clone()),
            Constant::Vector(v) => Err(ModelError::BoundLength {
                expected: len,
                found: v.len(),
            }),
        }
    }

    fn scaled(&self, by: f64) -> Constant {
        match self {
            Constant::Scalar(v) => Constant::Scalar(v * by),
            Constant::Vector(v) => Constant::Vector(v * by),
        }
    }

    fn plus(&self, other: &Constant) -> Result<Constant, ModelError> {
        Ok(match (self, other) {
            (Constant::Scalar(a), Constant::Scalar(b)) => Constant::Scalar(a + b),
            (Constant::Scalar(a), Constant::Vector(b)) | (Constant::Vector(b), Constant::Scalar(a)) => {
                Constant::Vector(b + *a)
            }
            (Constant::Vector(a), Constant::Vector(b)) => {
                if a.len() != b.len() {
                    return Err(ModelError::BoundLength {
                        expected: a.len(),
                        found: b.len(),
                    });
                }
                Constant::Vector(a + b)
            }
        })
    }

    fn into_value(self) -> Value {
        match self {
            Constant::Scalar(v) => Value::Scalar(v),
            Constant::Vector(v) => Value::Vector(v),
        }
    }
}

/// Placeholder for an already-evaluated sub-expression.
///
/// The coefficients themselves live in the accumulator; a partial only
/// remembers which fragments it produced and its additive constant.
#[derive(Debug, Clone, Default)]
pub struct Partial {
    fragments: Vec<usize>,
    offset: Option<Constant>,
    /// Set while the partial is a bare variable that has only been bounded
    range_var: Option<Variable>,
    /// Whether a comparison has been applied
    bounded: bool,
}

/// Operand on the evaluation stack
#[derive(Debug, Clone)]
pub enum Value {
    Scalar(f64),
    Vector(Array1<f64>),
    Matrix(LpMatrix),
    Variable(Variable),
    Partial(Partial),
}

impl Value {
    pub(crate) fn from_operand(operand: &Operand) -> Result<Self, ModelError> {
        Ok(match operand {
            Operand::Scalar(v) => Value::Scalar(*v),
            Operand::Vector(v) => Value::Vector(v.clone()),
            Operand::Matrix(m) => Value::Matrix(m.clone()),
            Operand::Variable(v) => {
                v.check_index()?;
                Value::Variable(v.clone())
            }
            Operand::Expr(_) => {
                return Err(ModelError::MalformedExpression(
                    "nested expression in postfix stream".to_string(),
                ));
            }
        })
    }

    fn is_symbolic(&self) -> bool {
        matches!(self, Value::Variable(_) | Value::Partial(_))
    }

    fn describe(&self) -> &'static str {
        match self {
            Value::Scalar(_) => "scalar",
            Value::Vector(_) => "vector",
            Value::Matrix(_) => "matrix",
            Value::Variable(_) => "variable",
            Value::Partial(_) => "expression",
        }
    }
}

/// A constraint being accumulated from a postfix token stream, and the
/// resolved constraint once evaluation finishes.
#[derive(Debug, Clone)]
pub struct Constraint {
    /// Block names touched, first-seen order, mapped to the block dimension
    parent_var_dims: IndexMap<Arc<str>, usize>,
    /// Variable views touched, first-seen order
    variables: Vec<Variable>,
    /// Coefficient fragments in order of introduction
    fragments: Vec<Term>,
    /// Fragments merged per view, filled by `finish`
    var_coefs: IndexMap<ViewId, Term>,
    lower: Option<Array1<f64>>,
    upper: Option<Array1<f64>>,
    n_rows: Option<usize>,
    is_range: bool,
    range: Option<RangeBounds>,
    compared: bool,
    infinity: f64,
}

impl Constraint {
    pub(crate) fn new(infinity: f64) -> Self {
        Self {
            parent_var_dims: IndexMap::new(),
            variables: Vec::new(),
            fragments: Vec::new(),
            var_coefs: IndexMap::new(),
            lower: None,
            upper: None,
            n_rows: None,
            is_range: true,
            range: None,
            compared: false,
            infinity,
        }
    }

    /// Block names referenced by this constraint, in first-seen order
    pub fn var_names(&self) -> impl Iterator<Item = &str> + '_ {
        self.parent_var_dims.keys().map(|k| k.as_ref())
    }

    pub fn has_var(&self, name: &str) -> bool {
        self.parent_var_dims.contains_key(name)
    }

    pub fn parent_var_dims(&self) -> &IndexMap<Arc<str>, usize> {
        &self.parent_var_dims
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    /// Coefficients keyed by variable view
    pub fn var_coefs(&self) -> &IndexMap<ViewId, Term> {
        &self.var_coefs
    }

    /// Terms whose view belongs to block `name`, in occurrence order
    pub fn terms_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a Term> + 'a {
        self.var_coefs.values().filter(move |t| t.variable.name() == name)
    }

    pub fn lower(&self) -> Option<&Array1<f64>> {
        self.lower.as_ref()
    }

    pub fn upper(&self) -> Option<&Array1<f64>> {
        self.upper.as_ref()
    }

    pub fn n_rows(&self) -> Option<usize> {
        self.n_rows
    }

    /// True when the constraint only narrows a variable's own bounds
    pub fn is_range(&self) -> bool {
        self.is_range
    }

    pub fn range_bounds(&self) -> Option<&RangeBounds> {
        self.range.as_ref()
    }

    /// Whether any comparison was applied
    pub fn has_comparison(&self) -> bool {
        self.compared
    }

    pub(crate) fn touch(&mut self, var: &Variable) {
        self.parent_var_dims
            .entry(Arc::from(var.name()))
            .or_insert(var.parent_dim());
        if !self.variables.iter().any(|v| v.id() == var.id()) {
            self.variables.push(var.clone());
        }
    }

    /// Apply one operator to already-evaluated operands and return the
    /// placeholder standing for the result.
    pub fn perform(
        &mut self,
        op: Operator,
        left: Option<Value>,
        right: Value,
    ) -> Result<Value, ModelError> {
        if op.is_unary() {
            return match op {
                Operator::Neg => self.negate(right),
                _ => self.sum(right),
            };
        }

        let left = left.ok_or_else(|| {
            ModelError::MalformedExpression(format!("'{op}' expects two operands"))
        })?;
        match op {
            Operator::Mul => self.multiply(left, right),
            Operator::Add | Operator::Sub => self.combine(op, left, right),
            _ => self.compare(op, left, right),
        }
    }

    /// Lone variable with no operator: all-ones coefficient
    pub(crate) fn assign_naked(&mut self, var: &Variable) -> Result<(), ModelError> {
        self.add_fragment(var, LpMatrix::filled_row(1.0, var.dim()), 1)?;
        Ok(())
    }

    /// Merge fragments per view and fill in default row bounds
    pub(crate) fn finish(&mut self) -> Result<(), ModelError> {
        if self.is_range {
            if self.range.is_none() {
                return Err(ModelError::NoVariables);
            }
            return Ok(());
        }

        let n_rows = self.n_rows.ok_or(ModelError::NoVariables)?;
        self.var_coefs.clear();
        for term in &self.fragments {
            match self.var_coefs.get_mut(&term.variable.id()) {
                Some(existing) => {
                    let mut triplets = existing.coef.triplets();
                    triplets.extend(term.coef.triplets());
                    let (rows, cols) = existing.coef.shape();
                    existing.coef = LpMatrix::Sparse(sparse::from_triplets(rows, cols, triplets)?);
                }
                None => {
                    self.var_coefs.insert(term.variable.id(), term.clone());
                }
            }
        }

        if self.lower.is_none() {
            self.lower = Some(Array1::from_elem(n_rows, -self.infinity));
        }
        if self.upper.is_none() {
            self.upper = Some(Array1::from_elem(n_rows, self.infinity));
        }
        Ok(())
    }

    fn fix_rows(&mut self, rows: usize, var: &Variable) -> Result<(), ModelError> {
        match self.n_rows {
            Some(expected) if expected != rows => Err(ModelError::RowCountConflict {
                variable: var.to_string(),
                expected,
                found: rows,
            }),
            _ => {
                self.n_rows = Some(rows);
                Ok(())
            }
        }
    }

    fn add_fragment(&mut self, var: &Variable, coef: LpMatrix, rows: usize) -> Result<usize, ModelError> {
        self.fix_rows(rows, var)?;
        self.is_range = false;
        self.fragments.push(Term {
            variable: var.clone(),
            coef,
        });
        Ok(self.fragments.len() - 1)
    }

    fn scale_partial(&mut self, partial: &mut Partial, by: f64) {
        for &id in &partial.fragments {
            let term = &mut self.fragments[id];
            term.coef = term.coef.scaled(by);
        }
        partial.offset = partial.offset.as_ref().map(|c| c.scaled(by));
    }

    /// Turn an operand of `+`/`-` into a partial. A bare variable gets an
    /// implicit all-ones coefficient on a single row.
    fn into_partial(&mut self, op: Operator, value: Value) -> Result<Partial, ModelError> {
        match value {
            Value::Variable(var) => {
                let id = self.add_fragment(&var, LpMatrix::filled_row(1.0, var.dim()), 1)?;
                Ok(Partial {
                    fragments: vec![id],
                    ..Partial::default()
                })
            }
            Value::Partial(partial) if partial.bounded => Err(ModelError::unsupported(
                op,
                "a comparison cannot be used as an arithmetic operand",
            )),
            Value::Partial(partial) => Ok(partial),
            Value::Scalar(v) => Ok(Partial {
                offset: Some(Constant::Scalar(v)),
                ..Partial::default()
            }),
            Value::Vector(v) => Ok(Partial {
                offset: Some(Constant::Vector(v)),
                ..Partial::default()
            }),
            Value::Matrix(_) => Err(ModelError::unsupported(
                op,
                "a matrix can only multiply a variable",
            )),
        }
    }

    fn multiply(&mut self, left: Value, right: Value) -> Result<Value, ModelError> {
        // Normalize to `coefficient * symbolic`
        let (coef, operand) = if left.is_symbolic() && !right.is_symbolic() {
            (right, left)
        } else {
            (left, right)
        };

        match (coef, operand) {
            (Value::Scalar(a), Value::Variable(var)) => {
                let id = self.add_fragment(&var, LpMatrix::filled_row(a, var.dim()), 1)?;
                Ok(Value::Partial(Partial {
                    fragments: vec![id],
                    ..Partial::default()
                }))
            }
            (Value::Vector(c), Value::Variable(var)) => {
                if c.len() != var.dim() {
                    return Err(ModelError::CoefficientColumns {
                        variable: var.to_string(),
                        expected: var.dim(),
                        found: c.len(),
                    });
                }
                let id = self.add_fragment(&var, LpMatrix::row(c), 1)?;
                Ok(Value::Partial(Partial {
                    fragments: vec![id],
                    ..Partial::default()
                }))
            }
            (Value::Matrix(m), Value::Variable(var)) => {
                let (rows, cols) = m.shape();
                if cols != var.dim() {
                    return Err(ModelError::CoefficientColumns {
                        variable: var.to_string(),
                        expected: var.dim(),
                        found: cols,
                    });
                }
                let id = self.add_fragment(&var, m, rows)?;
                Ok(Value::Partial(Partial {
                    fragments: vec![id],
                    ..Partial::default()
                }))
            }
            (Value::Scalar(a), Value::Partial(mut partial)) if !partial.bounded => {
                self.scale_partial(&mut partial, a);
                Ok(Value::Partial(partial))
            }
            (Value::Scalar(a), Value::Scalar(b)) => Ok(Value::Scalar(a * b)),
            (Value::Scalar(a), Value::Vector(v)) | (Value::Vector(v), Value::Scalar(a)) => {
                Ok(Value::Vector(v * a))
            }
            (Value::Vector(a), Value::Vector(b)) if a.len() == b.len() => Ok(Value::Vector(a * b)),
            (coef, operand) => Err(ModelError::unsupported(
                Operator::Mul,
                format!("{} * {}", coef.describe(), operand.describe()),
            )),
        }
    }

    /// `+` and `-`: signed accumulation, left to right. `-` negates every
    /// fragment its right operand stands for.
    fn combine(&mut self, op: Operator, left: Value, right: Value) -> Result<Value, ModelError> {
        if !left.is_symbolic() && !right.is_symbolic() {
            let sign = if op == Operator::Sub { -1.0 } else { 1.0 };
            let a = self.constant_of(op, left)?;
            let b = self.constant_of(op, right)?.scaled(sign);
            return Ok(a.plus(&b)?.into_value());
        }

        let mut lhs = self.into_partial(op, left)?;
        let mut rhs = self.into_partial(op, right)?;
        if op == Operator::Sub {
            self.scale_partial(&mut rhs, -1.0);
        }

        lhs.fragments.append(&mut rhs.fragments);
        lhs.offset = match (lhs.offset.take(), rhs.offset.take()) {
            (Some(a), Some(b)) => Some(a.plus(&b)?),
            (a, b) => a.or(b),
        };
        self.is_range = false;
        Ok(Value::Partial(lhs))
    }

    fn constant_of(&self, op: Operator, value: Value) -> Result<Constant, ModelError> {
        match value {
            Value::Scalar(v) => Ok(Constant::Scalar(v)),
            Value::Vector(v) => Ok(Constant::Vector(v)),
            other => Err(ModelError::unsupported(op, format!("{} operand", other.describe()))),
        }
    }

    /// Unary minus. On a bare variable this is a single row of negated ones,
    /// the same coefficient `-` gives its right operand.
    fn negate(&mut self, right: Value) -> Result<Value, ModelError> {
        match right {
            Value::Variable(var) => {
                let id = self.add_fragment(&var, LpMatrix::filled_row(-1.0, var.dim()), 1)?;
                Ok(Value::Partial(Partial {
                    fragments: vec![id],
                    ..Partial::default()
                }))
            }
            Value::Partial(mut partial) if !partial.bounded => {
                self.scale_partial(&mut partial, -1.0);
                Ok(Value::Partial(partial))
            }
            Value::Scalar(v) => Ok(Value::Scalar(-v)),
            Value::Vector(v) => Ok(Value::Vector(-v)),
            Value::Matrix(m) => Ok(Value::Matrix(m.scaled(-1.0))),
            Value::Partial(_) => Err(ModelError::unsupported(
                Operator::Neg,
                "a comparison cannot be negated",
            )),
        }
    }

    fn sum(&mut self, right: Value) -> Result<Value, ModelError> {
        match right {
            Value::Variable(var) => {
                let id = self.add_fragment(&var, LpMatrix::filled_row(1.0, var.dim()), 1)?;
                Ok(Value::Partial(Partial {
                    fragments: vec![id],
                    ..Partial::default()
                }))
            }
            other => Err(ModelError::unsupported(
                Operator::Sum,
                format!("cannot sum a {}", other.describe()),
            )),
        }
    }

    /// `<=`, `>=`, `==`: exactly one side is symbolic, the other is the bound.
    fn compare(&mut self, op: Operator, left: Value, right: Value) -> Result<Value, ModelError> {
        let symbolic_on_left = match (left.is_symbolic(), right.is_symbolic()) {
            (true, true) => return Err(ModelError::BothSidesSymbolic),
            (false, false) => return Err(ModelError::BothSidesConstant),
            (on_left, _) => on_left,
        };
        let (symbolic, bound) = if symbolic_on_left {
            (left, right)
        } else {
            (right, left)
        };
        let bound = match bound {
            Value::Scalar(v) => Constant::Scalar(v),
            Value::Vector(v) => Constant::Vector(v),
            other => {
                return Err(ModelError::unsupported(
                    op,
                    format!("a {} cannot be a bound", other.describe()),
                ));
            }
        };

        // "x >= b" and "b <= x" set the lower bound, mirrored for the upper
        let sets_lower = matches!(
            (op, symbolic_on_left),
            (Operator::Ge | Operator::Eq, true) | (Operator::Le | Operator::Eq, false)
        );
        let sets_upper = matches!(
            (op, symbolic_on_left),
            (Operator::Le | Operator::Eq, true) | (Operator::Ge | Operator::Eq, false)
        );
        self.compared = true;

        let range_var = match &symbolic {
            Value::Variable(var) => Some(var.clone()),
            Value::Partial(partial) => partial.range_var.clone(),
            _ => None,
        };
        if let (true, Some(var)) = (self.is_range, range_var) {
            let values = bound.broadcast(var.dim())?;
            let range = self.range.get_or_insert_with(|| RangeBounds {
                variable: var.clone(),
                lower: None,
                upper: None,
            });
            if sets_lower {
                range.lower = Some(values.clone());
            }
            if sets_upper {
                range.upper = Some(values);
            }
            return Ok(Value::Partial(Partial {
                range_var: Some(var),
                bounded: true,
                ..Partial::default()
            }));
        }

        let partial = match symbolic {
            Value::Partial(partial) => partial,
            other => self.into_partial(op, other)?,
        };
        let n_rows = self.n_rows.ok_or(ModelError::NoVariables)?;
        let mut values = bound.broadcast(n_rows)?;
        if let Some(offset) = &partial.offset {
            values = values - offset.broadcast(n_rows)?;
        }

        if sets_lower {
            self.lower = Some(values.clone());
            if self.upper.is_none() {
                self.upper = Some(Array1::from_elem(n_rows, self.infinity));
            }
        }
        if sets_upper {
            self.upper = Some(values);
            if self.lower.is_none() {
                self.lower = Some(Array1::from_elem(n_rows, -self.infinity));
            }
        }

        Ok(Value::Partial(Partial {
            bounded: true,
            ..partial
        }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::LpArray;
    use crate::config::COIN_INFINITY;
    use crate::error::ErrorKind;
    use crate::expr::{Compare, Expr};
    use crate::model::Model;
    use approx::assert_abs_diff_eq;
    use ndarray::{array, Array2};

    fn model_xy() -> (Model, Variable, Variable) {
        let mut model = Model::new();
        let x = model.add_variable("x", 3, false).unwrap();
        let y = model.add_variable("y", 2, false).unwrap();
        (model, x, y)
    }

    fn coef_of(cons: &Constraint, var: &Variable) -> Array2<f64> {
        cons.var_coefs()[&var.id()].coef.to_dense()
    }

    #[test]
    fn test_two_slice_sum() {
        let (_model, x, _y) = model_xy();
        let x0 = x.at(0);
        let x1 = x.at(1);
        let cons = (&x0 + &x1).leq(5.0).evaluate().unwrap();

        assert!(!cons.is_range());
        assert_eq!(cons.n_rows(), Some(1));
        assert_eq!(cons.var_coefs().len(), 2);
        assert_eq!(coef_of(&cons, &x0), array![[1.0]]);
        assert_eq!(coef_of(&cons, &x1), array![[1.0]]);
        assert_eq!(cons.upper(), Some(&array![5.0]));
        assert_eq!(cons.lower(), Some(&array![-COIN_INFINITY]));
        assert_eq!(cons.var_names().collect::<Vec<_>>(), vec!["x"]);
    }

    #[test]
    fn test_matrix_two_sided() {
        let (_model, x, y) = model_xy();
        let b = array![[1.0, 0.0, 0.0], [0.0, 0.0, 1.0]];
        let d = array![[1.0, 2.0], [0.0, 1.0]];
        let upper = LpArray::from(vec![4.2, 3.0]);

        let lhs = Expr::binary(Operator::Mul, b.clone(), &x) + Expr::binary(Operator::Mul, d.clone(), &y);
        let cons = 2.0_f64.leq(lhs).leq(&upper).evaluate().unwrap();

        assert_eq!(cons.n_rows(), Some(2));
        assert_eq!(coef_of(&cons, &x), b);
        assert_eq!(coef_of(&cons, &y), d);
        assert_eq!(cons.lower(), Some(&array![2.0, 2.0]));
        assert_eq!(cons.upper(), Some(&array![4.2, 3.0]));
        assert_eq!(cons.var_names().collect::<Vec<_>>(), vec!["x", "y"]);
    }

    #[test]
    fn test_slice_range_is_not_a_row() {
        let (_model, x, _y) = model_xy();
        let cons = 1.1_f64
            .leq(x.slice(1..3))
            .leq(LpArray::from(vec![2.0, 3.5]))
            .evaluate()
            .unwrap();

        assert!(cons.is_range());
        assert!(cons.var_coefs().is_empty());
        let range = cons.range_bounds().unwrap();
        assert_eq!(range.variable.indices(), 1..3);
        assert_eq!(range.lower, Some(array![1.1, 1.1]));
        assert_eq!(range.upper, Some(array![2.0, 3.5]));
    }

    #[test]
    fn test_equality_sets_both_bounds() {
        let (_model, x, y) = model_xy();
        let cons = (x.at(2) + y.at(1)).equals(2.1).evaluate().unwrap();
        assert_eq!(cons.lower(), Some(&array![2.1]));
        assert_eq!(cons.upper(), Some(&array![2.1]));
    }

    #[test]
    fn test_constant_comparisons_are_rejected() {
        let err = Expr::binary(Operator::Le, 2.0, 3.0).evaluate().unwrap_err();
        assert_eq!(err, ModelError::BothSidesConstant);
        assert_eq!(err.kind(), ErrorKind::Comparison);

        let (_model, x, y) = model_xy();
        let err = x.leq(&y).evaluate().unwrap_err();
        assert_eq!(err, ModelError::BothSidesSymbolic);
    }

    #[test]
    fn test_coefficient_column_mismatch() {
        let (_model, x, _y) = model_xy();
        let a = array![[1.0, 2.0], [3.0, 4.0]];
        let err = Expr::binary(Operator::Mul, a, &x).leq(1.0).evaluate().unwrap_err();
        assert!(matches!(err, ModelError::CoefficientColumns { expected: 3, found: 2, .. }));
        assert_eq!(err.kind(), ErrorKind::Dimension);
    }

    #[test]
    fn test_row_count_conflict() {
        let (_model, x, y) = model_xy();
        let a = array![[1.0, 2.0, 0.0], [3.0, 4.0, 0.0]];
        let err = (Expr::binary(Operator::Mul, a, &x) + 2.0 * &y)
            .leq(1.0)
            .evaluate()
            .unwrap_err();
        assert_eq!(
            err,
            ModelError::RowCountConflict {
                variable: "y".to_string(),
                expected: 2,
                found: 1
            }
        );
    }

    #[test]
    fn test_bound_length_must_match_rows() {
        let (_model, x, _y) = model_xy();
        let err = (2.0 * &x).leq(vec![1.0, 2.0]).evaluate().unwrap_err();
        assert_eq!(err, ModelError::BoundLength { expected: 1, found: 2 });
    }

    #[test]
    fn test_sign_chains() {
        let (_model, x, _y) = model_xy();
        let (a, b, c) = (x.at(0), x.at(1), x.at(2));

        let plus_minus = (&a + &b - &c).leq(1.0).evaluate().unwrap();
        assert_eq!(coef_of(&plus_minus, &a), array![[1.0]]);
        assert_eq!(coef_of(&plus_minus, &b), array![[1.0]]);
        assert_eq!(coef_of(&plus_minus, &c), array![[-1.0]]);

        let minus_plus = (&a - &b + &c).leq(1.0).evaluate().unwrap();
        assert_eq!(coef_of(&minus_plus, &a), array![[1.0]]);
        assert_eq!(coef_of(&minus_plus, &b), array![[-1.0]]);
        assert_eq!(coef_of(&minus_plus, &c), array![[1.0]]);

        let nested = (&a - (&b + 3.0 * &c)).leq(1.0).evaluate().unwrap();
        assert_eq!(coef_of(&nested, &b), array![[-1.0]]);
        assert_eq!(coef_of(&nested, &c), array![[-3.0]]);
    }

    #[test]
    fn test_repeated_view_accumulates() {
        let (_model, x, _y) = model_xy();
        let x0 = x.at(0);
        let cons = (2.0 * &x0 + &x0).leq(1.0).evaluate().unwrap();
        assert_eq!(cons.var_coefs().len(), 1);
        assert_eq!(coef_of(&cons, &x0), array![[3.0]]);
    }

    #[test]
    fn test_constant_offset_moves_to_bound() {
        let (_model, x, _y) = model_xy();
        let cons = (x.at(0) + 5.0).leq(10.0).evaluate().unwrap();
        assert_eq!(cons.upper(), Some(&array![5.0]));

        let flipped = (3.0 - x.at(1)).geq(0.0).evaluate().unwrap();
        assert_eq!(flipped.lower(), Some(&array![-3.0]));
        assert_abs_diff_eq!(
            flipped.var_coefs().values().next().unwrap().coef.to_dense()[[0, 0]],
            -1.0
        );
    }

    #[test]
    fn test_scalar_scales_partial() {
        let (_model, x, y) = model_xy();
        let cons = (2.0 * (x.at(0) - y.at(1))).geq(0.0).evaluate().unwrap();
        let coefs: Vec<f64> = cons
            .var_coefs()
            .values()
            .map(|t| t.coef.to_dense()[[0, 0]])
            .collect();
        assert_eq!(coefs, vec![2.0, -2.0]);
    }

    #[test]
    fn test_unary_negation_is_negated_ones() {
        let (_model, _x, y) = model_xy();
        let cons = (-&y).geq(-1.0).evaluate().unwrap();
        assert!(!cons.is_range());
        assert_eq!(cons.n_rows(), Some(1));
        assert_eq!(coef_of(&cons, &y), array![[-1.0, -1.0]]);
        assert_eq!(cons.lower(), Some(&array![-1.0]));
    }

    #[test]
    fn test_negated_variable_matches_subtraction() {
        let (_model, x, y) = model_xy();
        let negated_first = (-&x + &y).leq(5.0).evaluate().unwrap();
        let subtracted = (&y - &x).leq(5.0).evaluate().unwrap();

        for cons in [&negated_first, &subtracted] {
            assert_eq!(cons.n_rows(), Some(1));
            assert_eq!(coef_of(cons, &x), array![[-1.0, -1.0, -1.0]]);
            assert_eq!(coef_of(cons, &y), array![[1.0, 1.0]]);
            assert_eq!(cons.upper(), Some(&array![5.0]));
        }
    }

    #[test]
    fn test_constant_offset_in_two_sided_chain() {
        let (_model, x, _y) = model_xy();
        let cons = 2.0_f64.leq(x.at(0) + 5.0).leq(10.0).evaluate().unwrap();
        assert!(!cons.is_range());
        assert_eq!(cons.lower(), Some(&array![-3.0]));
        assert_eq!(cons.upper(), Some(&array![5.0]));
    }

    #[test]
    fn test_repeated_view_merges_multi_row_blocks() {
        let (_model, x, _y) = model_xy();
        let a = array![[1.0, 0.0, 2.0], [0.0, 3.0, 0.0]];
        let b = array![[1.0, 1.0, 0.0], [0.0, -3.0, 4.0]];
        let lhs = Expr::binary(Operator::Mul, a.clone(), &x) + Expr::binary(Operator::Mul, b.clone(), &x);
        let cons = lhs.leq(vec![1.0, 2.0]).evaluate().unwrap();

        assert_eq!(cons.n_rows(), Some(2));
        assert_eq!(cons.var_coefs().len(), 1);
        assert!(matches!(cons.var_coefs()[&x.id()].coef, LpMatrix::Sparse(_)));
        assert_eq!(coef_of(&cons, &x), a + b);
        assert_eq!(cons.upper(), Some(&array![1.0, 2.0]));
    }

    #[test]
    fn test_index_past_end_is_rejected() {
        let (_model, x, y) = model_xy();
        let err = x.at(7).leq(5.0).evaluate().unwrap_err();
        assert_eq!(
            err,
            ModelError::IndexOutOfRange {
                variable: "x".to_string(),
                index: 7,
                dim: 3
            }
        );
        assert_eq!(err.kind(), ErrorKind::Dimension);

        let err = (x.at(7) + y.at(0)).leq(1.0).evaluate().unwrap_err();
        assert!(matches!(err, ModelError::IndexOutOfRange { index: 7, .. }));
    }

    #[test]
    fn test_naked_variable_gets_ones() {
        let (_model, x, _y) = model_xy();
        let cons = Operand::from(&x).evaluate().unwrap();
        assert_eq!(coef_of(&cons, &x), array![[1.0, 1.0, 1.0]]);
        assert_eq!(cons.n_rows(), Some(1));
        assert!(!cons.has_comparison());
    }

    #[test]
    fn test_sum_of_variable() {
        let (_model, _x, y) = model_xy();
        let cons = y.sum().leq(4.0).evaluate().unwrap();
        assert_eq!(coef_of(&cons, &y), array![[1.0, 1.0]]);
        assert_eq!(cons.upper(), Some(&array![4.0]));
    }

    #[test]
    fn test_nonlinear_product_is_rejected() {
        let (_model, x, y) = model_xy();
        let err = (&x * &y).leq(1.0).evaluate().unwrap_err();
        assert!(matches!(err, ModelError::UnsupportedOperands { op: Operator::Mul, .. }));
    }

    #[test]
    fn test_evaluation_is_repeatable() {
        let (_model, x, y) = model_xy();
        let c = LpArray::from(vec![1.0, -2.0, 3.0]);
        let expr = (&c * &x + 2.0 * &y).geq(1.0);

        let first = expr.evaluate().unwrap();
        let second = expr.evaluate().unwrap();
        assert_eq!(first.lower(), second.lower());
        assert_eq!(first.upper(), second.upper());
        for (id, term) in first.var_coefs() {
            assert_eq!(term.coef, second.var_coefs()[id].coef);
        }
    }
}
