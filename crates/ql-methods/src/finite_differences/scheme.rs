//! θ-scheme time stepping for `∂V/∂t + L·V = 0` rolled backward in time.
//!
//! One step from `t` to `t − dt` solves
//!
//! `(I − θ·dt·L) · V(t − dt) = (I + (1 − θ)·dt·L) · V(t)`
//!
//! with θ = 0 (explicit), 1 (implicit) or ½ (Crank-Nicolson).

use ql_core::{errors::Result, Real, Time};
use ql_math::Array;

use super::boundary_condition::BoundaryConditionSet;
use super::tridiagonal::TridiagonalOperator;

/// Finite difference time-stepping scheme.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum FdmScheme {
    /// Explicit: `V^{n} = (I + dt·L) · V^{n+1}`; conditionally stable.
    Explicit,
    /// Fully implicit: `(I − dt·L) · V^{n} = V^{n+1}`; unconditionally stable.
    Implicit,
    /// Crank-Nicolson: θ-average of explicit and implicit, second-order in time.
    #[default]
    CrankNicolson,
}

impl FdmScheme {
    /// Implicitness weight θ.
    pub fn theta(self) -> Real {
        match self {
            FdmScheme::Explicit => 0.0,
            FdmScheme::Implicit => 1.0,
            FdmScheme::CrankNicolson => 0.5,
        }
    }
}

/// Evolver advancing values by one θ-scheme step.
///
/// Boundary conditions are folded into the explicit and implicit parts
/// through their operator hooks.
#[derive(Debug)]
pub struct MixedScheme {
    operator: TridiagonalOperator,
    bcs: BoundaryConditionSet,
    scheme: FdmScheme,
}

impl MixedScheme {
    /// Create an evolver for `operator` with the given edge conditions.
    pub fn new(operator: TridiagonalOperator, bcs: BoundaryConditionSet, scheme: FdmScheme) -> Self {
        Self {
            operator,
            bcs,
            scheme,
        }
    }

    /// The spatial operator.
    pub fn operator(&self) -> &TridiagonalOperator {
        &self.operator
    }

    /// The boundary condition pair.
    pub fn boundary_conditions(&self) -> &BoundaryConditionSet {
        &self.bcs
    }

    /// The time-stepping scheme.
    pub fn scheme(&self) -> FdmScheme {
        self.scheme
    }

    /// Number of grid points the evolver works on.
    pub fn size(&self) -> usize {
        self.operator.size()
    }

    /// Roll `values` back from `t` to `t − dt`.
    pub fn step(&mut self, values: &mut Array, t: Time, dt: Time) -> Result<()> {
        let theta = self.scheme.theta();
        self.bcs.set_time(t);

        if theta < 1.0 {
            if self.operator.is_time_dependent() {
                self.operator.set_time(t);
            }
            let mut explicit = self.operator.identity_plus((1.0 - theta) * dt);
            self.bcs.apply_before_applying(&mut explicit);
            *values = explicit.apply(values)?;
            self.bcs.apply_after_applying(values, t - dt);
        }

        if theta > 0.0 {
            if self.operator.is_time_dependent() {
                self.operator.set_time(t - dt);
            }
            let mut implicit = self.operator.identity_plus(-theta * dt);
            self.bcs.apply_before_solving(&mut implicit, values);
            *values = implicit.solve(values)?;
            self.bcs.apply_after_solving(values);
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    /// `L = −r·I` in the interior: pure discounting.
    fn discounting(n: usize, r: Real) -> TridiagonalOperator {
        let mut op = TridiagonalOperator::new(n);
        for i in 1..n - 1 {
            op.set_mid_row(i, 0.0, -r, 0.0);
        }
        op
    }

    #[test]
    fn schemes_discount_a_constant() {
        let (r, dt) = (0.05, 0.1);
        for (scheme, factor) in [
            (FdmScheme::Explicit, 1.0 - r * dt),
            (FdmScheme::Implicit, 1.0 / (1.0 + r * dt)),
            (
                FdmScheme::CrankNicolson,
                (1.0 - 0.5 * r * dt) / (1.0 + 0.5 * r * dt),
            ),
        ] {
            let mut evolver =
                MixedScheme::new(discounting(5, r), BoundaryConditionSet::neumann(0.0, 0.0), scheme);
            let mut v = Array::from_element(5, 1.0);
            evolver.step(&mut v, 1.0, dt).unwrap();
            for i in 0..5 {
                assert_relative_eq!(v[i], factor, epsilon = 1e-12);
            }
        }
    }

    #[test]
    fn dirichlet_edges_survive_a_step() {
        let mut evolver = MixedScheme::new(
            discounting(4, 0.05),
            BoundaryConditionSet::dirichlet(2.0, 7.0),
            FdmScheme::CrankNicolson,
        );
        let mut v = Array::from_element(4, 1.0);
        evolver.step(&mut v, 1.0, 0.5).unwrap();
        assert_relative_eq!(v[0], 2.0);
        assert_relative_eq!(v[3], 7.0);
    }

    #[test]
    fn crank_nicolson_is_the_default() {
        assert_eq!(FdmScheme::default(), FdmScheme::CrankNicolson);
        assert_eq!(FdmScheme::CrankNicolson.theta(), 0.5);
    }
}
