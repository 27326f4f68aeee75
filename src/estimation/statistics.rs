//! Sample statistics over row-per-sample data matrices

use nalgebra::{DMatrix, DVector};

use crate::common::error::{EstimationError, EstimationResult};

/// Column means of a row-per-sample data matrix.
pub fn column_means(data: &DMatrix<f64>) -> EstimationResult<DVector<f64>> {
    if data.nrows() == 0 {
        return Err(EstimationError::InvalidParameter(
            "empty data matrix".to_string(),
        ));
    }
    let n = data.nrows() as f64;
    Ok(DVector::from_fn(data.ncols(), |j, _| data.column(j).sum() / n))
}

/// Unbiased sample covariance (divide by n - 1) of row-per-sample data.
pub fn sample_covariance(data: &DMatrix<f64>) -> EstimationResult<DMatrix<f64>> {
    if data.nrows() < 2 {
        return Err(EstimationError::InvalidParameter(
            "covariance needs at least two samples".to_string(),
        ));
    }
    let means = column_means(data)?;
    let mut centered = data.clone();
    for j in 0..centered.ncols() {
        for i in 0..centered.nrows() {
            centered[(i, j)] -= means[j];
        }
    }
    Ok(centered.transpose() * &centered / (data.nrows() as f64 - 1.0))
}
