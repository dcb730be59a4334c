use std::ops::{Add, Deref, Mul, Sub};

use ndarray::{Array1, Zip};

use crate::expr::Compare;

/// A numeric vector that knows how to meet symbolic operands.
///
/// Against another `LpArray` or a scalar it is an ordinary vector: arithmetic
/// is element-wise and [`Compare`] yields a boolean mask. Against a
/// [`Variable`](crate::Variable) or [`Expr`](crate::Expr) every operator
/// builds an expression node instead.
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[derive(Debug, Clone, PartialEq)]
pub struct LpArray(Array1<f64>);

impl LpArray {
    pub fn new(values: Array1<f64>) -> Self {
        Self(values)
    }

    pub fn filled(value: f64, len: usize) -> Self {
        Self(Array1::from_elem(len, value))
    }

    pub fn as_array(&self) -> &Array1<f64> {
        &self.0
    }

    pub fn into_inner(self) -> Array1<f64> {
        self.0
    }
}

impl Deref for LpArray {
    type Target = Array1<f64>;

    fn deref(&self) -> &Array1<f64> {
        &self.0
    }
}

impl From<Vec<f64>> for LpArray {
    fn from(v: Vec<f64>) -> Self {
        Self(Array1::from(v))
    }
}

impl From<&[f64]> for LpArray {
    fn from(v: &[f64]) -> Self {
        Self(Array1::from(v.to_vec()))
    }
}

impl From<Array1<f64>> for LpArray {
    fn from(v: Array1<f64>) -> Self {
        Self(v)
    }
}

macro_rules! impl_numeric_op {
    ($trait:ident, $method:ident, $op:tt) => {
        impl $trait<&LpArray> for &LpArray {
            type Output = LpArray;

            fn $method(self, rhs: &LpArray) -> LpArray {
                LpArray(&self.0 $op &rhs.0)
            }
        }

        impl $trait<LpArray> for LpArray {
            type Output = LpArray;

            fn $method(self, rhs: LpArray) -> LpArray {
                LpArray(self.0 $op rhs.0)
            }
        }

        impl $trait<f64> for &LpArray {
            type Output = LpArray;

            fn $method(self, rhs: f64) -> LpArray {
                LpArray(&self.0 $op rhs)
            }
        }

        impl $trait<f64> for LpArray {
            type Output = LpArray;

            fn $method(self, rhs: f64) -> LpArray {
                LpArray(self.0 $op rhs)
            }
        }
    };
}

impl_numeric_op!(Add, add, +);
impl_numeric_op!(Sub, sub, -);
impl_numeric_op!(Mul, mul, *);

impl Compare<&LpArray> for &LpArray {
    type Output = Array1<bool>;

    fn leq(self, rhs: &LpArray) -> Array1<bool> {
        Zip::from(&self.0).and(&rhs.0).map_collect(|a, b| a <= b)
    }

    fn geq(self, rhs: &LpArray) -> Array1<bool> {
        Zip::from(&self.0).and(&rhs.0).map_collect(|a, b| a >= b)
    }

    fn equals(self, rhs: &LpArray) -> Array1<bool> {
        Zip::from(&self.0).and(&rhs.0).map_collect(|a, b| a == b)
    }
}

impl Compare<f64> for &LpArray {
    type Output = Array1<bool>;

    fn leq(self, rhs: f64) -> Array1<bool> {
        self.0.mapv(|a| a <= rhs)
    }

    fn geq(self, rhs: f64) -> Array1<bool> {
        self.0.mapv(|a| a >= rhs)
    }

    fn equals(self, rhs: f64) -> Array1<bool> {
        self.0.mapv(|a| a == rhs)
    }
}
