//! Finite difference Jacobian computation.

use crate::error::SolverResult;
use crate::newton::JacobianScheme;
use nalgebra::{DMatrix, DVector};

/// Jacobian of `f` at `x` by the chosen scheme; `f_x` is `f(x)`.
pub fn jacobian<F>(
    scheme: JacobianScheme,
    x: &DVector<f64>,
    f_x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    match scheme {
        JacobianScheme::Forward => finite_difference_jacobian(x, f_x, f, epsilon),
        JacobianScheme::Central => central_difference_jacobian(x, f, epsilon),
    }
}

/// Forward differences, reusing the residual already known at `x`.
///
/// Column j is `(f(x + dx e_j) - f(x)) / dx` with `dx = epsilon * max(|x_j|, 1)`.
pub fn finite_difference_jacobian<F>(
    x: &DVector<f64>,
    f_x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let n = x.len();
    let mut jac = DMatrix::zeros(f_x.len(), n);

    for j in 0..n {
        let dx = epsilon * x[j].abs().max(1.0);
        let mut x_perturbed = x.clone();
        x_perturbed[j] += dx;

        let df = (f(&x_perturbed)? - f_x) / dx;
        jac.set_column(j, &df);
    }

    Ok(jac)
}

/// Central differences (more accurate but 2x cost).
pub fn central_difference_jacobian<F>(
    x: &DVector<f64>,
    f: F,
    epsilon: f64,
) -> SolverResult<DMatrix<f64>>
where
    F: Fn(&DVector<f64>) -> SolverResult<DVector<f64>>,
{
    let n = x.len();
    let mut jac: Option<DMatrix<f64>> = None;

    for j in 0..n {
        let dx = epsilon * x[j].abs().max(1.0);

        let mut x_plus = x.clone();
        x_plus[j] += dx;
        let f_plus = f(&x_plus)?;

        let mut x_minus = x.clone();
        x_minus[j] -= dx;
        let f_minus = f(&x_minus)?;

        let df = (f_plus - f_minus) / (2.0 * dx);
        jac.get_or_insert_with(|| DMatrix::zeros(df.len(), n))
            .set_column(j, &df);
    }

    Ok(jac.unwrap_or_else(|| DMatrix::zeros(0, 0)))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn quadratic(x: &DVector<f64>) -> SolverResult<DVector<f64>> {
        Ok(DVector::from_vec(vec![x[0] * x[0], x[0] * x[1]]))
    }

    #[test]
    fn jacobian_linear() {
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> { Ok(x * 2.0) };
        let x = DVector::from_element(1, 3.0);
        let f_x = f(&x).unwrap();
        let jac = finite_difference_jacobian(&x, &f_x, f, 1e-7).unwrap();
        assert!((jac[(0, 0)] - 2.0).abs() < 1e-5);
    }

    #[test]
    fn forward_and_central_agree_on_quadratic() {
        let x = DVector::from_vec(vec![3.0, -2.0]);
        let f_x = quadratic(&x).unwrap();
        let fwd = jacobian(JacobianScheme::Forward, &x, &f_x, quadratic, 1e-7).unwrap();
        let ctr = jacobian(JacobianScheme::Central, &x, &f_x, quadratic, 1e-6).unwrap();
        let exact = DMatrix::from_row_slice(2, 2, &[6.0, 0.0, -2.0, 3.0]);
        assert!((fwd - &exact).amax() < 1e-5);
        assert!((ctr - &exact).amax() < 1e-8);
    }

    #[test]
    fn step_scales_with_magnitude() {
        // A large unknown (thrust in N) next to a small one (alpha in rad)
        let f = |x: &DVector<f64>| -> SolverResult<DVector<f64>> {
            Ok(DVector::from_vec(vec![1e-4 * x[0] + x[1], x[1] * x[1]]))
        };
        let x = DVector::from_vec(vec![2.0e4, 0.05]);
        let f_x = f(&x).unwrap();
        let jac = finite_difference_jacobian(&x, &f_x, f, 1e-7).unwrap();
        assert!((jac[(0, 0)] - 1e-4).abs() < 1e-9);
        assert!((jac[(1, 1)] - 0.1).abs() < 1e-6);
    }
}
