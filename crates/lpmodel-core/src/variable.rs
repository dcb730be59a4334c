use std::fmt;
use std::ops::{Bound, Range, RangeBounds};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

use ndarray::{Array1, s};

use crate::error::ModelError;
use crate::expr::{Expr, Operator};

macro_rules! define_id_type {
    ($name:ident, $inner:ty) => {
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
        #[repr(transparent)]
        pub struct $name($inner);

        impl $name {
            pub fn inner(self) -> $inner {
                self.0
            }

            pub fn index(self) -> usize {
                self.0 as usize
            }
        }
    };
}

define_id_type!(ViewId, u64);
define_id_type!(BlockId, u32);

impl BlockId {
    pub(crate) fn from_index(index: usize) -> Self {
        Self(index as u32)
    }
}

static NEXT_VIEW_ID: AtomicU64 = AtomicU64::new(0);

fn next_view_id() -> ViewId {
    ViewId(NEXT_VIEW_ID.fetch_add(1, Ordering::Relaxed))
}

/// A view onto a named block of decision variables.
///
/// Views are cheap handles; the bounds live in the [`VariableBlock`] owned by
/// the model. Cloning a view keeps its identity (same [`ViewId`]), while
/// [`Variable::slice`] and [`Variable::at`] create new views.
#[derive(Debug, Clone)]
pub struct Variable {
    id: ViewId,
    block: BlockId,
    name: Arc<str>,
    /// Absolute position of the first entry inside the block
    offset: usize,
    dim: usize,
    parent_dim: usize,
    is_int: bool,
    sliced: bool,
    /// Set by `at` with an index past the view: `(index, view length)`
    out_of_range: Option<(usize, usize)>,
}

impl Variable {
    pub(crate) fn new(block: BlockId, name: Arc<str>, dim: usize, is_int: bool) -> Self {
        Self {
            id: next_view_id(),
            block,
            name,
            offset: 0,
            dim,
            parent_dim: dim,
            is_int,
            sliced: false,
            out_of_range: None,
        }
    }

    pub fn id(&self) -> ViewId {
        self.id
    }

    pub fn block(&self) -> BlockId {
        self.block
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Number of entries in this view
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of entries in the whole block
    pub fn parent_dim(&self) -> usize {
        self.parent_dim
    }

    pub fn offset(&self) -> usize {
        self.offset
    }

    pub fn is_int(&self) -> bool {
        self.is_int
    }

    /// Whether this view was produced by slicing
    pub fn is_slice(&self) -> bool {
        self.sliced
    }

    /// Absolute positions covered by this view inside its block
    pub fn indices(&self) -> Range<usize> {
        self.offset..self.offset + self.dim
    }

    /// Slice relative to this view. A stop past the end is clamped.
    pub fn slice(&self, range: impl RangeBounds<usize>) -> Variable {
        let stop = match range.end_bound() {
            Bound::Included(&i) => i.saturating_add(1),
            Bound::Excluded(&i) => i,
            Bound::Unbounded => self.dim,
        }
        .min(self.dim);
        let start = match range.start_bound() {
            Bound::Included(&i) => i,
            Bound::Excluded(&i) => i.saturating_add(1),
            Bound::Unbounded => 0,
        }
        .min(stop);

        Variable {
            id: next_view_id(),
            block: self.block,
            name: Arc::clone(&self.name),
            offset: self.offset + start,
            dim: stop - start,
            parent_dim: self.parent_dim,
            is_int: self.is_int,
            sliced: true,
            out_of_range: self.out_of_range,
        }
    }

    /// Single-entry view. An index past the end gives an empty view that is
    /// rejected with [`ModelError::IndexOutOfRange`] wherever it is used.
    pub fn at(&self, index: usize) -> Variable {
        let mut view = self.slice(index..index.saturating_add(1));
        if index >= self.dim && self.out_of_range.is_none() {
            view.out_of_range = Some((index, self.dim));
        }
        view
    }

    /// Fails if this view came from an out-of-range `at`
    pub fn check_index(&self) -> Result<(), ModelError> {
        match self.out_of_range {
            Some((index, dim)) => Err(ModelError::IndexOutOfRange {
                variable: self.name.to_string(),
                index,
                dim,
            }),
            None => Ok(()),
        }
    }

    /// Sum of the entries of this view
    pub fn sum(&self) -> Expr {
        Expr::unary(Operator::Sum, self.clone())
    }
}

impl fmt::Display for Variable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if !self.sliced {
            write!(f, "{}", self.name)
        } else if self.dim == 1 {
            write!(f, "{}[{}]", self.name, self.offset)
        } else {
            write!(f, "{}[{}:{}]", self.name, self.offset, self.offset + self.dim)
        }
    }
}

/// Owner of a block's canonical bounds and integrality
#[derive(Debug, Clone)]
pub struct VariableBlock {
    name: Arc<str>,
    dim: usize,
    is_int: bool,
    lower: Array1<f64>,
    upper: Array1<f64>,
}

impl VariableBlock {
    pub(crate) fn new(name: Arc<str>, dim: usize, is_int: bool, infinity: f64) -> Self {
        Self {
            name,
            dim,
            is_int,
            lower: Array1::from_elem(dim, -infinity),
            upper: Array1::from_elem(dim, infinity),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn dim(&self) -> usize {
        self.dim
    }

    pub fn is_int(&self) -> bool {
        self.is_int
    }

    pub fn lower(&self) -> &Array1<f64> {
        &self.lower
    }

    pub fn upper(&self) -> &Array1<f64> {
        &self.upper
    }

    /// Overwrite bounds at the positions covered by `var`.
    ///
    /// Every bound change, whether through a range constraint or a slice,
    /// goes through here.
    pub(crate) fn write_bounds(
        &mut self,
        var: &Variable,
        lower: Option<&Array1<f64>>,
        upper: Option<&Array1<f64>>,
    ) -> Result<(), ModelError> {
        var.check_index()?;
        if var.name() != self.name() || var.indices().end > self.dim {
            return Err(ModelError::UnknownVariable(var.to_string()));
        }
        let range = var.indices();
        for values in [lower, upper].into_iter().flatten() {
            if values.len() != var.dim() {
                return Err(ModelError::BoundLength {
                    expected: var.dim(),
                    found: values.len(),
                });
            }
        }

        if let Some(values) = lower {
            self.lower.slice_mut(s![range.clone()]).assign(values);
        }
        if let Some(values) = upper {
            self.upper.slice_mut(s![range]).assign(values);
        }
        Ok(())
    }
}
