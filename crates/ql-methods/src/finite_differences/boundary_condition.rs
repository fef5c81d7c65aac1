//! Boundary conditions at the spatial extremes of the grid.
//!
//! A condition takes part in every sub-step twice: through the operator
//! hooks the evolver calls while building and solving the explicit and
//! implicit parts, and through [`BoundaryCondition::apply`], which the
//! rollback model runs on the evolved values before the step condition.

use std::fmt;

use ql_core::{
    errors::{Error, Result},
    Real, Time,
};
use ql_math::Array;

use super::tridiagonal::TridiagonalOperator;

/// The grid edge a boundary condition acts on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BoundarySide {
    /// The first grid point.
    Lower,
    /// The last grid point.
    Upper,
}

impl BoundarySide {
    /// Index of the edge node in an `n`-point grid.
    pub fn edge(self, n: usize) -> usize {
        match self {
            BoundarySide::Lower => 0,
            BoundarySide::Upper => n - 1,
        }
    }
}

impl fmt::Display for BoundarySide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BoundarySide::Lower => write!(f, "lower"),
            BoundarySide::Upper => write!(f, "upper"),
        }
    }
}

/// A constraint imposed on one edge of the grid.
pub trait BoundaryCondition: fmt::Debug + Send + Sync {
    /// The edge this condition acts on.
    fn side(&self) -> BoundarySide;

    /// Move a time-dependent condition to time `t`.
    fn set_time(&mut self, _t: Time) {}

    /// Value the edge node must take, given the current values at time `t`.
    fn boundary_value(&self, values: &Array, t: Time) -> Real;

    /// Adjust the explicit operator before it is applied.
    fn apply_before_applying(&self, op: &mut TridiagonalOperator);

    /// Adjust the implicit operator and right-hand side before solving.
    fn apply_before_solving(&self, op: &mut TridiagonalOperator, rhs: &mut Array);

    /// Fix up the edge node after an explicit application at time `t`.
    fn apply_after_applying(&self, values: &mut Array, t: Time) {
        self.apply(values, t);
    }

    /// Fix up the edge node after an implicit solve.
    fn apply_after_solving(&self, _values: &mut Array) {}

    /// Overwrite the edge node with [`boundary_value`](Self::boundary_value).
    fn apply(&self, values: &mut Array, t: Time) {
        let n = values.size();
        if n < 2 {
            return;
        }
        let edge = self.side().edge(n);
        values[edge] = self.boundary_value(values, t);
    }
}

/// Fixes the difference between the edge node and its neighbour.
///
/// On the lower side `v[1] − v[0] = value`; on the upper side
/// `v[n−1] − v[n−2] = value`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NeumannBc {
    value: Real,
    side: BoundarySide,
}

impl NeumannBc {
    /// Create a Neumann condition with edge difference `value`.
    pub fn new(value: Real, side: BoundarySide) -> Self {
        Self { value, side }
    }

    /// The imposed edge difference.
    pub fn value(&self) -> Real {
        self.value
    }
}

impl BoundaryCondition for NeumannBc {
    fn side(&self) -> BoundarySide {
        self.side
    }

    fn boundary_value(&self, values: &Array, _t: Time) -> Real {
        let n = values.size();
        match self.side {
            BoundarySide::Lower => values[1] - self.value,
            BoundarySide::Upper => values[n - 2] + self.value,
        }
    }

    fn apply_before_applying(&self, op: &mut TridiagonalOperator) {
        match self.side {
            BoundarySide::Lower => op.set_first_row(-1.0, 1.0),
            BoundarySide::Upper => op.set_last_row(-1.0, 1.0),
        }
    }

    fn apply_before_solving(&self, op: &mut TridiagonalOperator, rhs: &mut Array) {
        let n = rhs.size();
        match self.side {
            BoundarySide::Lower => {
                op.set_first_row(-1.0, 1.0);
                rhs[0] = self.value;
            }
            BoundarySide::Upper => {
                op.set_last_row(-1.0, 1.0);
                rhs[n - 1] = self.value;
            }
        }
    }
}

/// Fixes the value of the edge node.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DirichletBc {
    value: Real,
    side: BoundarySide,
}

impl DirichletBc {
    /// Create a Dirichlet condition pinning the edge node to `value`.
    pub fn new(value: Real, side: BoundarySide) -> Self {
        Self { value, side }
    }
}

impl BoundaryCondition for DirichletBc {
    fn side(&self) -> BoundarySide {
        self.side
    }

    fn boundary_value(&self, _values: &Array, _t: Time) -> Real {
        self.value
    }

    fn apply_before_applying(&self, op: &mut TridiagonalOperator) {
        match self.side {
            BoundarySide::Lower => op.set_first_row(1.0, 0.0),
            BoundarySide::Upper => op.set_last_row(0.0, 1.0),
        }
    }

    fn apply_before_solving(&self, op: &mut TridiagonalOperator, rhs: &mut Array) {
        let n = rhs.size();
        match self.side {
            BoundarySide::Lower => {
                op.set_first_row(1.0, 0.0);
                rhs[0] = self.value;
            }
            BoundarySide::Upper => {
                op.set_last_row(0.0, 1.0);
                rhs[n - 1] = self.value;
            }
        }
    }
}

/// The pair of edge constraints used by every rollback sub-step.
#[derive(Debug)]
pub struct BoundaryConditionSet {
    lower: Box<dyn BoundaryCondition>,
    upper: Box<dyn BoundaryCondition>,
}

impl BoundaryConditionSet {
    /// Pair a lower-edge and an upper-edge condition.
    ///
    /// # Errors
    /// [`Error::UnsupportedConfiguration`] if either condition reports the
    /// wrong side.
    pub fn new(
        lower: Box<dyn BoundaryCondition>,
        upper: Box<dyn BoundaryCondition>,
    ) -> Result<Self> {
        for (bc, expected) in [(&lower, BoundarySide::Lower), (&upper, BoundarySide::Upper)] {
            if bc.side() != expected {
                return Err(Error::UnsupportedConfiguration(format!(
                    "{expected} boundary slot given a condition for the {} side: {bc:?}",
                    bc.side()
                )));
            }
        }
        Ok(Self { lower, upper })
    }

    /// Neumann conditions on both edges.
    pub fn neumann(lower_value: Real, upper_value: Real) -> Self {
        Self {
            lower: Box::new(NeumannBc::new(lower_value, BoundarySide::Lower)),
            upper: Box::new(NeumannBc::new(upper_value, BoundarySide::Upper)),
        }
    }

    /// Dirichlet conditions on both edges.
    pub fn dirichlet(lower_value: Real, upper_value: Real) -> Self {
        Self {
            lower: Box::new(DirichletBc::new(lower_value, BoundarySide::Lower)),
            upper: Box::new(DirichletBc::new(upper_value, BoundarySide::Upper)),
        }
    }

    /// The lower-edge condition.
    pub fn lower(&self) -> &dyn BoundaryCondition {
        self.lower.as_ref()
    }

    /// The upper-edge condition.
    pub fn upper(&self) -> &dyn BoundaryCondition {
        self.upper.as_ref()
    }

    /// Move both conditions to time `t`.
    pub fn set_time(&mut self, t: Time) {
        self.lower.set_time(t);
        self.upper.set_time(t);
    }

    /// Operator hook before an explicit application.
    pub fn apply_before_applying(&self, op: &mut TridiagonalOperator) {
        self.lower.apply_before_applying(op);
        self.upper.apply_before_applying(op);
    }

    /// Value hook after an explicit application.
    pub fn apply_after_applying(&self, values: &mut Array, t: Time) {
        self.lower.apply_after_applying(values, t);
        self.upper.apply_after_applying(values, t);
    }

    /// Operator hook before an implicit solve.
    pub fn apply_before_solving(&self, op: &mut TridiagonalOperator, rhs: &mut Array) {
        self.lower.apply_before_solving(op, rhs);
        self.upper.apply_before_solving(op, rhs);
    }

    /// Value hook after an implicit solve.
    pub fn apply_after_solving(&self, values: &mut Array) {
        self.lower.apply_after_solving(values);
        self.upper.apply_after_solving(values);
    }

    /// Enforce both edges on values that have reached time `t`.
    pub fn apply(&self, values: &mut Array, t: Time) {
        self.lower.apply(values, t);
        self.upper.apply(values, t);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn neumann_keeps_edge_differences() {
        let bcs = BoundaryConditionSet::neumann(-1.0, 2.0);
        let mut v = Array::from_slice(&[0.0, 5.0, 6.0, 0.0]);
        bcs.apply(&mut v, 0.5);
        assert_eq!(v.as_slice(), &[6.0, 5.0, 6.0, 8.0]);
    }

    #[test]
    fn dirichlet_pins_edges() {
        let bcs = BoundaryConditionSet::dirichlet(1.0, 9.0);
        let mut v = Array::from_slice(&[0.0, 5.0, 0.0]);
        bcs.apply(&mut v, 0.0);
        assert_eq!(v.as_slice(), &[1.0, 5.0, 9.0]);
    }

    #[test]
    fn neumann_before_solving_imposes_the_difference() {
        let bcs = BoundaryConditionSet::neumann(0.5, 0.25);
        let mut op = TridiagonalOperator::identity(3);
        let mut rhs = Array::from_slice(&[7.0, 3.0, 7.0]);
        bcs.apply_before_solving(&mut op, &mut rhs);
        let x = op.solve(&rhs).unwrap();
        assert!((x[1] - x[0] - 0.5).abs() < 1e-12);
        assert!((x[2] - x[1] - 0.25).abs() < 1e-12);
        assert!((x[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn wrong_side_is_rejected() {
        let err = BoundaryConditionSet::new(
            Box::new(DirichletBc::new(0.0, BoundarySide::Upper)),
            Box::new(DirichletBc::new(0.0, BoundarySide::Upper)),
        )
        .unwrap_err();
        assert!(matches!(err, Error::UnsupportedConfiguration(_)));

        let ok = BoundaryConditionSet::new(
            Box::new(NeumannBc::new(0.0, BoundarySide::Lower)),
            Box::new(DirichletBc::new(3.0, BoundarySide::Upper)),
        )
        .unwrap();
        assert_eq!(ok.lower().side(), BoundarySide::Lower);
        assert_eq!(ok.upper().boundary_value(&Array::zeros(3), 0.0), 3.0);
    }
}
