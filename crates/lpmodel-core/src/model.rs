use std::sync::Arc;

use ndarray::{Array1, s};

use crate::config::ModelConfig;
use crate::constraint::Constraint;
use crate::error::ModelError;
use crate::expr::Operand;
use crate::index::IndexFactory;
use crate::sparse::{self, SparseMatrix};
use crate::variable::{BlockId, Variable, VariableBlock};

/// Everything a simplex-type solver needs, in flat numeric form.
///
/// Matrix columns and `objective` follow `column_blocks` (first-referenced
/// block order); `col_lower`, `col_upper` and `col_is_int` follow variable
/// creation order. Rows follow constraint insertion order.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpMatrices {
    pub matrix: SparseMatrix,
    pub row_lower: Array1<f64>,
    pub row_upper: Array1<f64>,
    pub col_lower: Array1<f64>,
    pub col_upper: Array1<f64>,
    pub col_is_int: Vec<bool>,
    pub objective: Array1<f64>,
    pub column_blocks: Vec<String>,
}

/// A linear program under construction.
///
/// ```
/// use lpmodel_core::{Compare, LpArray, Model};
///
/// let mut model = Model::new();
/// let x = model.add_variable("x", 3, false)?;
/// let y = model.add_variable("y", 2, false)?;
///
/// model.add_constraint((x.at(0) + y.at(1)).geq(1.0))?;
/// model.add_constraint(1.1_f64.leq(x.slice(1..3)).leq(LpArray::from(vec![2.0, 3.5])))?;
/// model.set_objective(&LpArray::from(vec![1.0, 2.0, 3.0]) * &x + 2.0 * &y)?;
///
/// let lp = model.make_matrices()?;
/// assert_eq!(lp.matrix.shape(), (1, 5));
/// assert_eq!(lp.col_lower[1], 1.1);
/// # Ok::<(), lpmodel_core::ModelError>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Model {
    config: ModelConfig,
    blocks: Vec<VariableBlock>,
    /// Whole-block views, in creation order
    variables: Vec<Variable>,
    constraints: Vec<Constraint>,
    constraint_names: Vec<String>,
    objective_terms: Option<Constraint>,
    inds: IndexFactory,
    n_rows: usize,
    matrices: Option<LpMatrices>,
}

impl Model {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: ModelConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn config(&self) -> &ModelConfig {
        &self.config
    }

    /// Create a block of `dim` decision variables, unbounded on both sides
    pub fn add_variable(
        &mut self,
        name: impl Into<String>,
        dim: usize,
        is_int: bool,
    ) -> Result<Variable, ModelError> {
        let name: String = name.into();
        if self.blocks.iter().any(|b| b.name() == name) {
            return Err(ModelError::DuplicateVariable(name));
        }

        let name: Arc<str> = Arc::from(name);
        let block = BlockId::from_index(self.blocks.len());
        self.blocks.push(VariableBlock::new(
            Arc::clone(&name),
            dim,
            is_int,
            self.config.infinity(),
        ));
        let var = Variable::new(block, name, dim, is_int);
        self.variables.push(var.clone());

        tracing::debug!(
            component = "model",
            operation = "add_variable",
            status = "success",
            name = %var,
            dim,
            is_int,
            "Added variable block"
        );
        Ok(var)
    }

    pub fn variables(&self) -> &[Variable] {
        &self.variables
    }

    pub fn blocks(&self) -> &[VariableBlock] {
        &self.blocks
    }

    pub fn block(&self, var: &Variable) -> Result<&VariableBlock, ModelError> {
        var.check_index()?;
        self.blocks
            .get(var.block().index())
            .filter(|b| {
                b.name() == var.name() && b.dim() == var.parent_dim() && var.indices().end <= b.dim()
            })
            .ok_or_else(|| ModelError::UnknownVariable(var.to_string()))
    }

    fn block_mut(&mut self, var: &Variable) -> Result<&mut VariableBlock, ModelError> {
        self.block(var)?;
        Ok(&mut self.blocks[var.block().index()])
    }

    fn block_by_name(&self, name: &str) -> Option<&VariableBlock> {
        self.blocks.iter().find(|b| b.name() == name)
    }

    /// Current lower and upper bounds at the positions `var` covers
    pub fn bounds(&self, var: &Variable) -> Result<(Array1<f64>, Array1<f64>), ModelError> {
        let block = self.block(var)?;
        let range = var.indices();
        Ok((
            block.lower().slice(s![range.clone()]).to_owned(),
            block.upper().slice(s![range]).to_owned(),
        ))
    }

    /// Overwrite bounds at the positions `var` covers
    pub fn set_bounds(
        &mut self,
        var: &Variable,
        lower: Option<&Array1<f64>>,
        upper: Option<&Array1<f64>>,
    ) -> Result<(), ModelError> {
        self.block_mut(var)?.write_bounds(var, lower, upper)?;
        self.refresh()
    }

    pub fn add_constraint(&mut self, expr: impl Into<Operand>) -> Result<(), ModelError> {
        self.insert_constraint(None, expr.into())
    }

    /// Like [`Model::add_constraint`], registering the rows under `name`.
    /// Re-using a name extends its row range.
    pub fn add_named_constraint(
        &mut self,
        name: impl Into<String>,
        expr: impl Into<Operand>,
    ) -> Result<(), ModelError> {
        self.insert_constraint(Some(name.into()), expr.into())
    }

    fn insert_constraint(&mut self, name: Option<String>, expr: Operand) -> Result<(), ModelError> {
        let cons = expr.evaluate_with(&self.config)?;
        self.check_owned(&cons)?;

        if cons.is_range() {
            let range = cons.range_bounds().ok_or(ModelError::NoVariables)?;
            self.block_mut(&range.variable)?.write_bounds(
                &range.variable,
                range.lower.as_ref(),
                range.upper.as_ref(),
            )?;
            tracing::debug!(
                component = "model",
                operation = "add_constraint",
                status = "success",
                kind = "range",
                variable = %range.variable,
                "Narrowed variable bounds"
            );
            return self.refresh();
        }

        let name = name.unwrap_or_else(|| format!("c{}", self.constraints.len()));
        let n_rows = cons.n_rows().unwrap_or(0);
        self.constraints.push(cons);
        self.constraint_names.push(name);

        if let Err(err) = self.make_matrices().map(|_| ()) {
            self.constraints.pop();
            self.constraint_names.pop();
            self.make_index_factory();
            return Err(err);
        }
        tracing::debug!(
            component = "model",
            operation = "add_constraint",
            status = "success",
            kind = "rows",
            rows = n_rows,
            total_rows = self.n_rows,
            "Added constraint"
        );
        Ok(())
    }

    /// Stored row constraints, in insertion order
    pub fn constraints(&self) -> &[Constraint] {
        &self.constraints
    }

    pub fn constraint_names(&self) -> &[String] {
        &self.constraint_names
    }

    /// Compile `expr` into the objective. Comparisons are rejected.
    pub fn set_objective(&mut self, expr: impl Into<Operand>) -> Result<(), ModelError> {
        let cons = expr.into().evaluate_with(&self.config)?;
        if cons.has_comparison() || cons.is_range() {
            return Err(ModelError::MalformedExpression(
                "objective cannot contain a comparison".to_string(),
            ));
        }
        self.check_owned(&cons)?;

        let previous = self.objective_terms.replace(cons);
        if let Err(err) = self.make_matrices().map(|_| ()) {
            self.objective_terms = previous;
            self.make_index_factory();
            return Err(err);
        }
        tracing::debug!(
            component = "model",
            operation = "set_objective",
            status = "success",
            columns = self.inds.n_vars(),
            "Set objective"
        );
        Ok(())
    }

    /// Flat objective aligned to the current column order
    pub fn objective(&self) -> Option<&Array1<f64>> {
        self.objective_terms.as_ref()?;
        self.matrices.as_ref().map(|m| &m.objective)
    }

    /// Rebuild the index factory. Blocks are registered the first time a
    /// constraint references them, in variable creation order within each
    /// constraint; blocks only the objective references come last.
    pub fn make_index_factory(&mut self) {
        let mut inds = IndexFactory::new();
        let mut n_rows = 0;

        for (cons, name) in self.constraints.iter().zip(&self.constraint_names) {
            let rows = cons.n_rows().unwrap_or(0);
            inds.add_const(name, rows);
            n_rows += rows;
            self.register_blocks(&mut inds, cons);
        }
        if let Some(objective) = &self.objective_terms {
            self.register_blocks(&mut inds, objective);
        }

        self.inds = inds;
        self.n_rows = n_rows;
    }

    fn register_blocks(&self, inds: &mut IndexFactory, cons: &Constraint) {
        for var in &self.variables {
            if cons.has_var(var.name()) && !inds.has_var(var.name()) {
                inds.add_var(var.name(), var.parent_dim());
            }
        }
    }

    /// Column block of `name`: one fragment per constraint stacked top to
    /// bottom, zero where the constraint does not mention the block.
    pub fn generate_var_matrix(&self, name: &str) -> Result<SparseMatrix, ModelError> {
        let dim = self
            .block_by_name(name)
            .ok_or_else(|| ModelError::UnknownVariable(name.to_string()))?
            .dim();
        if self.constraints.is_empty() {
            return Ok(sparse::zeros(0, dim));
        }

        let fragments = self
            .constraints
            .iter()
            .map(|cons| {
                let triplets = cons.terms_for(name).flat_map(|term| {
                    let offset = term.variable.offset();
                    term.coef
                        .triplets()
                        .into_iter()
                        .map(move |(row, col, value)| (row, col + offset, value))
                });
                sparse::from_triplets(cons.n_rows().unwrap_or(0), dim, triplets)
            })
            .collect::<Result<Vec<_>, _>>()?;
        sparse::vstack(&fragments)
    }

    /// Objective coefficients of block `name`, zero where unmentioned
    pub fn generate_var_obj_coef(&self, name: &str) -> Result<Array1<f64>, ModelError> {
        let dim = self
            .block_by_name(name)
            .ok_or_else(|| ModelError::UnknownVariable(name.to_string()))?
            .dim();
        let mut coefs = Array1::zeros(dim);
        if let Some(objective) = &self.objective_terms {
            for term in objective.terms_for(name) {
                let range = term.variable.indices();
                let mut target = coefs.slice_mut(s![range]);
                target += &term.coef.column_sums();
            }
        }
        Ok(coefs)
    }

    /// Assemble the solver hand-off and cache it
    pub fn make_matrices(&mut self) -> Result<&LpMatrices, ModelError> {
        self.make_index_factory();

        let column_blocks: Vec<String> = self.inds.var_names().map(str::to_string).collect();
        let columns = column_blocks
            .iter()
            .map(|name| self.generate_var_matrix(name))
            .collect::<Result<Vec<_>, _>>()?;
        let matrix = if columns.is_empty() {
            sparse::zeros(self.n_rows, 0)
        } else {
            sparse::hstack(&columns)?
        };

        let mut row_lower = Vec::with_capacity(self.n_rows);
        let mut row_upper = Vec::with_capacity(self.n_rows);
        for cons in &self.constraints {
            row_lower.extend(cons.lower().into_iter().flatten().copied());
            row_upper.extend(cons.upper().into_iter().flatten().copied());
        }

        let mut col_lower = Vec::new();
        let mut col_upper = Vec::new();
        let mut col_is_int = Vec::new();
        for block in &self.blocks {
            col_lower.extend(block.lower().iter().copied());
            col_upper.extend(block.upper().iter().copied());
            col_is_int.extend(std::iter::repeat_n(block.is_int(), block.dim()));
        }

        let mut objective = Vec::with_capacity(self.inds.n_vars());
        for name in &column_blocks {
            objective.extend(self.generate_var_obj_coef(name)?);
        }

        tracing::debug!(
            component = "model",
            operation = "make_matrices",
            status = "success",
            rows = matrix.rows(),
            columns = matrix.cols(),
            nnz = matrix.nnz(),
            "Assembled matrices"
        );

        let matrices = LpMatrices {
            matrix,
            row_lower: Array1::from(row_lower),
            row_upper: Array1::from(row_upper),
            col_lower: Array1::from(col_lower),
            col_upper: Array1::from(col_upper),
            col_is_int,
            objective: Array1::from(objective),
            column_blocks,
        };
        Ok(self.matrices.insert(matrices))
    }

    /// Hand-off from the last assembly
    pub fn matrices(&self) -> Option<&LpMatrices> {
        self.matrices.as_ref()
    }

    pub fn index_factory(&self) -> &IndexFactory {
        &self.inds
    }

    /// Total rows across stored constraints
    pub fn n_rows(&self) -> usize {
        self.n_rows
    }

    fn check_owned(&self, cons: &Constraint) -> Result<(), ModelError> {
        for var in cons.variables() {
            self.block(var)?;
        }
        Ok(())
    }

    /// Keep a cached hand-off in step with bound changes
    fn refresh(&mut self) -> Result<(), ModelError> {
        if self.matrices.is_some() {
            self.make_matrices()?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::array::LpArray;
    use crate::config::COIN_INFINITY;
    use crate::error::ErrorKind;
    use crate::expr::Compare;
    use crate::matrix::LpMatrix;
    use approx::assert_abs_diff_eq;
    use ndarray::array;

    const INF: f64 = COIN_INFINITY;

    fn model_xy() -> (Model, Variable, Variable) {
        let mut model = Model::new();
        let x = model.add_variable("x", 3, false).unwrap();
        let y = model.add_variable("y", 2, false).unwrap();
        (model, x, y)
    }

    #[test]
    fn test_assembles_full_problem() {
        let (mut model, x, y) = model_xy();
        let a = LpMatrix::from(array![[1.0, 2.0, 3.0], [1.0, 1.0, 1.0]]);
        let b = LpMatrix::from(array![[0.0, 2.0], [1.0, 0.0]]);

        model.add_constraint((&a * &x + &b * &y).leq(vec![4.0, 5.0])).unwrap();
        model.add_constraint((x.at(0) + y.at(1)).geq(1.0)).unwrap();
        model
            .add_constraint(1.1_f64.leq(x.slice(1..3)).leq(LpArray::from(vec![2.0, 3.5])))
            .unwrap();

        assert_eq!(model.constraints().len(), 2, "range constraint must not be stored");
        assert_eq!(model.n_rows(), 3);

        let lp = model.matrices().unwrap();
        assert_eq!(
            lp.matrix.to_dense(),
            array![
                [1.0, 2.0, 3.0, 0.0, 2.0],
                [1.0, 1.0, 1.0, 1.0, 0.0],
                [1.0, 0.0, 0.0, 0.0, 1.0]
            ]
        );
        assert_eq!(lp.row_lower, array![-INF, -INF, 1.0]);
        assert_eq!(lp.row_upper, array![4.0, 5.0, INF]);
        assert_eq!(lp.col_lower, array![-INF, 1.1, 1.1, -INF, -INF]);
        assert_eq!(lp.col_upper, array![INF, 2.0, 3.5, INF, INF]);
        assert_eq!(lp.column_blocks, vec!["x", "y"]);
        assert_eq!(lp.col_is_int, vec![false; 5]);
    }

    #[test]
    fn test_slice_coefficients_land_at_slice_positions() {
        let (mut model, x, _y) = model_xy();
        let c = LpArray::from(vec![2.0, 3.0]);
        model.add_constraint((&c * &x.slice(1..3)).leq(4.0)).unwrap();

        assert_eq!(model.generate_var_matrix("x").unwrap().to_dense(), array![[0.0, 2.0, 3.0]]);
        assert_eq!(model.generate_var_matrix("y").unwrap().to_dense(), array![[0.0, 0.0]]);
        assert_eq!(model.matrices().unwrap().matrix.cols(), 3, "y is never referenced");
    }

    #[test]
    fn test_same_block_twice_in_one_row() {
        let (mut model, x, _y) = model_xy();
        model.add_constraint((x.at(0) + 2.0 * x.slice(1..3)).equals(1.0)).unwrap();
        assert_eq!(model.generate_var_matrix("x").unwrap().to_dense(), array![[1.0, 2.0, 2.0]]);
    }

    #[test]
    fn test_whole_view_and_slice_share_rows() {
        let (mut model, x, y) = model_xy();
        let a = LpMatrix::from(array![[1.0, 2.0, 0.0], [0.0, 1.0, 1.0]]);
        let b = LpMatrix::from(array![[5.0, 0.0], [1.0, -1.0]]);
        model
            .add_constraint((&a * &x + &b * &x.slice(1..3)).leq(vec![1.0, 2.0]))
            .unwrap();
        model.add_constraint((x.at(2) + &y).geq(0.0)).unwrap();

        assert_eq!(model.n_rows(), 3);
        assert_eq!(
            model.generate_var_matrix("x").unwrap().to_dense(),
            array![[1.0, 7.0, 0.0], [0.0, 2.0, 0.0], [0.0, 0.0, 1.0]]
        );
        let lp = model.matrices().unwrap();
        assert_eq!(lp.row_upper, array![1.0, 2.0, INF]);
        assert_eq!(lp.matrix.shape(), (3, 5));
    }

    #[test]
    fn test_sparse_fragment() {
        let (mut model, x, y) = model_xy();
        // A bare variable in a sum is a single row
        let a = LpMatrix::from(sparse::from_triplets(2, 3, vec![(0, 0, 1.0), (1, 2, 4.0)]).unwrap());
        model.add_constraint((a * &x - &y).geq(0.0)).unwrap_err();

        let a = LpMatrix::from(sparse::from_triplets(2, 3, vec![(0, 0, 1.0), (1, 2, 4.0)]).unwrap());
        model
            .add_constraint((a * &x + LpMatrix::diagonal(-1.0, 2) * &y).geq(0.0))
            .unwrap();
        assert_eq!(
            model.matrices().unwrap().matrix.to_dense(),
            array![[1.0, 0.0, 0.0, -1.0, 0.0], [0.0, 0.0, 4.0, 0.0, -1.0]]
        );
    }

    #[test]
    fn test_column_order_follows_first_reference() {
        let mut model = Model::new();
        let x = model.add_variable("x", 2, false).unwrap();
        let y = model.add_variable("y", 1, true).unwrap();
        let z = model.add_variable("z", 1, false).unwrap();

        model.add_constraint((&z + &y).leq(1.0)).unwrap();
        model.add_constraint(x.sum().leq(2.0)).unwrap();

        let lp = model.matrices().unwrap();
        // Creation order wins within a constraint
        assert_eq!(lp.column_blocks, vec!["y", "z", "x"]);
        assert_eq!(model.index_factory().var_index("x"), Some(vec![2, 3]));
        assert_eq!(lp.col_is_int, vec![false, false, true, false]);
    }

    #[test]
    fn test_objective_flattening() {
        let (mut model, x, y) = model_xy();
        let c = LpArray::from(vec![1.0, 2.0, 3.0]);
        model.set_objective(&c * &x + 2.0 * &y).unwrap();
        assert_eq!(model.objective(), Some(&array![1.0, 2.0, 3.0, 2.0, 2.0]));
    }

    #[test]
    fn test_objective_realigns_with_constraints() {
        let (mut model, x, y) = model_xy();
        let c = LpArray::from(vec![1.0, 2.0, 3.0]);
        model.add_constraint((y.at(0) + y.at(1)).geq(0.0)).unwrap();
        model.set_objective(&c * &x + 2.0 * &y).unwrap();

        let lp = model.matrices().unwrap();
        assert_eq!(lp.column_blocks, vec!["y", "x"]);
        assert_eq!(lp.objective, array![2.0, 2.0, 1.0, 2.0, 3.0]);
        assert_eq!(model.generate_var_obj_coef("y").unwrap(), array![2.0, 2.0]);
    }

    #[test]
    fn test_objective_sums_rows() {
        let (mut model, x, _y) = model_xy();
        let a = LpMatrix::from(array![[1.0, 0.0, 2.0], [0.5, 1.0, 0.0]]);
        model.set_objective(&a * &x).unwrap();
        let objective = model.objective().unwrap();
        assert_abs_diff_eq!(objective[0], 1.5);
        assert_abs_diff_eq!(objective[2], 2.0);
    }

    #[test]
    fn test_objective_rejects_comparison() {
        let (mut model, x, _y) = model_xy();
        let err = model.set_objective(x.sum().leq(1.0)).unwrap_err();
        assert!(matches!(err, ModelError::MalformedExpression(_)));
        assert!(model.objective().is_none());
    }

    #[test]
    fn test_slice_range_leaves_other_positions() {
        let mut model = Model::new();
        let x = model.add_variable("x", 5, false).unwrap();
        model.add_constraint(x.slice(1..3).geq(0.0)).unwrap();
        model.add_constraint(x.at(4).leq(7.0)).unwrap();

        let (lower, upper) = model.bounds(&x).unwrap();
        assert_eq!(lower, array![-INF, 0.0, 0.0, -INF, -INF]);
        assert_eq!(upper, array![INF, INF, INF, INF, 7.0]);
        assert_eq!(model.bounds(&x.slice(1..3)).unwrap().0, array![0.0, 0.0]);
    }

    #[test]
    fn test_whole_block_bound_is_range() {
        let (mut model, _x, y) = model_xy();
        model.add_constraint((&y).geq(0.0)).unwrap();
        assert!(model.constraints().is_empty());
        assert_eq!(model.bounds(&y).unwrap().0, array![0.0, 0.0]);
    }

    #[test]
    fn test_failed_add_leaves_model_untouched() {
        let (mut model, x, y) = model_xy();
        model.add_constraint((x.at(0) + y.at(0)).leq(1.0)).unwrap();
        let before = model.matrices().cloned();

        let bad = LpMatrix::from(array![[1.0, 2.0]]);
        let err = model.add_constraint((&bad * &x).leq(1.0)).unwrap_err();
        assert_eq!(err.kind(), ErrorKind::Dimension);

        let err = model
            .add_constraint(x.slice(0..2).leq(vec![1.0, 2.0, 3.0]))
            .unwrap_err();
        assert_eq!(err, ModelError::BoundLength { expected: 2, found: 3 });

        assert_eq!(model.constraints().len(), 1);
        assert_eq!(model.matrices().cloned(), before);
        assert_eq!(model.bounds(&x).unwrap().1, array![INF, INF, INF]);
    }

    #[test]
    fn test_index_past_end_leaves_model_untouched() {
        let (mut model, x, y) = model_xy();
        model.add_constraint((x.at(0) + y.at(0)).leq(1.0)).unwrap();
        let before = model.matrices().cloned();

        let err = model.add_constraint(x.at(7).leq(5.0)).unwrap_err();
        assert!(matches!(err, ModelError::IndexOutOfRange { index: 7, dim: 3, .. }));
        let err = model.add_constraint((x.at(7) + y.at(0)).leq(1.0)).unwrap_err();
        assert!(matches!(err, ModelError::IndexOutOfRange { .. }));
        assert!(model.bounds(&x.at(7)).is_err());
        assert!(model.set_bounds(&x.at(3), Some(&array![0.0]), None).is_err());

        assert_eq!(model.constraints().len(), 1);
        assert_eq!(model.matrices().cloned(), before);
        assert_eq!(model.bounds(&x).unwrap().1, array![INF, INF, INF]);
    }

    #[test]
    fn test_named_constraints_get_row_ranges() {
        let (mut model, x, y) = model_xy();
        let a = LpMatrix::from(array![[1.0, 0.0, 0.0], [0.0, 1.0, 0.0]]);
        model.add_named_constraint("capacity", (&a * &x).leq(3.0)).unwrap();
        model.add_constraint(y.sum().geq(1.0)).unwrap();

        let inds = model.index_factory();
        assert_eq!(inds.const_index("capacity"), Some(vec![0, 1]));
        assert_eq!(inds.const_index("c1"), Some(vec![2]));
        assert_eq!(model.constraint_names(), &["capacity".to_string(), "c1".to_string()]);
    }

    #[test]
    fn test_duplicate_and_foreign_variables() {
        let (mut model, _x, _y) = model_xy();
        let err = model.add_variable("x", 1, false).unwrap_err();
        assert_eq!(err, ModelError::DuplicateVariable("x".to_string()));

        let mut other = Model::new();
        let w = other.add_variable("w", 2, false).unwrap();
        let err = model.add_constraint(w.sum().leq(1.0)).unwrap_err();
        assert_eq!(err, ModelError::UnknownVariable("w".to_string()));
    }

    #[test]
    fn test_set_bounds_through_slice() {
        let (mut model, x, _y) = model_xy();
        model
            .set_bounds(&x.slice(0..2), Some(&array![0.0, 1.0]), None)
            .unwrap();
        assert_eq!(model.bounds(&x).unwrap().0, array![0.0, 1.0, -INF]);
    }

    #[test]
    fn test_rebuild_is_idempotent() {
        let build = || {
            let (mut model, x, y) = model_xy();
            let c = LpArray::from(vec![1.0, -1.0, 0.5]);
            model.add_constraint((&c * &x - 3.0 * &y).geq(2.0)).unwrap();
            model.add_constraint((-&y).leq(4.0)).unwrap();
            model.matrices().cloned().unwrap()
        };
        assert_eq!(build(), build());
    }

    #[test]
    fn test_custom_infinity() {
        let mut model = Model::with_config(ModelConfig::new().with_infinity(1e20));
        let x = model.add_variable("x", 1, false).unwrap();
        model.add_constraint(x.sum().leq(1.0)).unwrap();
        let lp = model.matrices().unwrap();
        assert_eq!(lp.row_lower, array![-1e20]);
        assert_eq!(lp.col_upper, array![1e20]);
    }
}
