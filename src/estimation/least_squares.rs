//! Batch linear least squares
//!
//! Solves min ||H x - y||^2 through the normal equations H^T H x = H^T y
//! with a Cholesky factorization. Small wrappers cover the common cases of
//! fitting a line and estimating a resistance from current/voltage pairs.

use nalgebra::{Cholesky, DMatrix, DVector};

use crate::common::error::{EstimationError, EstimationResult};

/// Solve the normal equations for an overdetermined design matrix.
pub fn fit(h: &DMatrix<f64>, y: &DVector<f64>) -> EstimationResult<DVector<f64>> {
    if h.nrows() != y.len() {
        return Err(EstimationError::InvalidParameter(format!(
            "design matrix has {} rows but {} observations were given",
            h.nrows(),
            y.len()
        )));
    }
    if h.nrows() < h.ncols() {
        return Err(EstimationError::InvalidParameter(format!(
            "underdetermined system: {} observations for {} parameters",
            h.nrows(),
            h.ncols()
        )));
    }
    if !h.iter().all(|v| v.is_finite()) || !y.iter().all(|v| v.is_finite()) {
        return Err(EstimationError::NonFinite("least squares input".to_string()));
    }

    let hth = h.transpose() * h;
    let hty = h.transpose() * y;
    let chol = Cholesky::new(hth).ok_or_else(|| {
        EstimationError::NumericalError("normal equations are rank deficient".to_string())
    })?;
    Ok(chol.solve(&hty))
}

/// Fit y = intercept + slope * x, returning (intercept, slope).
pub fn fit_line(x: &[f64], y: &[f64]) -> EstimationResult<(f64, f64)> {
    if x.len() != y.len() {
        return Err(EstimationError::InvalidParameter(format!(
            "{} abscissae but {} ordinates",
            x.len(),
            y.len()
        )));
    }
    if x.len() < 2 {
        return Err(EstimationError::InvalidParameter(
            "line fit needs at least two points".to_string(),
        ));
    }
    let h = DMatrix::from_fn(x.len(), 2, |i, j| if j == 0 { 1.0 } else { x[i] });
    let solution = fit(&h, &DVector::from_column_slice(y))?;
    Ok((solution[0], solution[1]))
}

/// Estimate a resistance from current/voltage samples with the one
/// parameter model V = R * I.
pub fn fit_resistance(current: &[f64], voltage: &[f64]) -> EstimationResult<f64> {
    if current.len() != voltage.len() {
        return Err(EstimationError::InvalidParameter(format!(
            "{} current samples but {} voltage samples",
            current.len(),
            voltage.len()
        )));
    }
    if current.is_empty() {
        return Err(EstimationError::InvalidParameter(
            "resistance fit needs at least one sample".to_string(),
        ));
    }
    let h = DMatrix::from_fn(current.len(), 1, |i, _| current[i]);
    let solution = fit(&h, &DVector::from_column_slice(voltage))?;
    Ok(solution[0])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_line_exact() {
        let x = [0.2, 0.3, 0.4, 0.5, 0.6];
        let y = [1.1, 1.6, 2.1, 2.6, 3.1];
        let (intercept, slope) = fit_line(&x, &y).unwrap();
        assert!((intercept - 0.1).abs() < 1e-9);
        assert!((slope - 5.0).abs() < 1e-9);
    }

    #[test]
    fn test_fit_line_noisy_resistor_data() {
        let current = [0.2, 0.3, 0.4, 0.5, 0.6];
        let voltage = [1.23, 1.38, 2.06, 2.47, 3.17];
        let (intercept, slope) = fit_line(&current, &voltage).unwrap();
        assert!((intercept - 0.074).abs() < 1e-9);
        assert!((slope - 4.97).abs() < 1e-9);
    }

    #[test]
    fn test_fit_resistance() {
        let current = [0.2, 0.3, 0.4];
        let voltage = [1.0, 1.5, 2.0];
        let r = fit_resistance(&current, &voltage).unwrap();
        assert!((r - 5.0).abs() < 1e-12);

        let current = [0.2, 0.3, 0.4, 0.5, 0.6];
        let voltage = [1.23, 1.38, 2.06, 2.47, 3.17];
        let r = fit_resistance(&current, &voltage).unwrap();
        assert!((r - 4.621 / 0.9).abs() < 1e-9);
    }

    #[test]
    fn test_shape_mismatch_rejected() {
        let h = DMatrix::from_row_slice(2, 1, &[1.0, 2.0]);
        let y = DVector::from_column_slice(&[1.0, 2.0, 3.0]);
        assert!(matches!(fit(&h, &y), Err(EstimationError::InvalidParameter(_))));
        assert!(fit_line(&[1.0, 2.0], &[1.0]).is_err());
    }

    #[test]
    fn test_underdetermined_rejected() {
        let h = DMatrix::from_row_slice(1, 2, &[1.0, 2.0]);
        let y = DVector::from_column_slice(&[1.0]);
        assert!(matches!(fit(&h, &y), Err(EstimationError::InvalidParameter(_))));
    }

    #[test]
    fn test_rank_deficiency_rejected() {
        // Two identical columns make the normal equations singular
        let h = DMatrix::from_row_slice(2, 2, &[3.0, 3.0, 4.0, 4.0]);
        let y = DVector::from_column_slice(&[1.0, 2.0]);
        assert!(matches!(fit(&h, &y), Err(EstimationError::NumericalError(_))));
    }
}
