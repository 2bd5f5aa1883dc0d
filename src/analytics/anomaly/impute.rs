//! Mean Imputation
//!
//! 特徴量行列の欠損値を列平均で補完

use crate::error::{Error, Result};
use ndarray::{Array2, ArrayView2, Axis};

/// 列平均による補完
///
/// NaN cells are replaced by the mean of the finite cells in the same
/// column. Columns without a single finite cell are dropped.
pub fn impute_mean(matrix: ArrayView2<f64>) -> Result<Array2<f64>> {
    let rows = matrix.nrows();
    if rows == 0 {
        return Err(Error::insufficient(1, 0));
    }

    let mut kept = Vec::new();
    let mut means = Vec::new();
    for (idx, column) in matrix.axis_iter(Axis(1)).enumerate() {
        let (sum, count) = column
            .iter()
            .filter(|v| v.is_finite())
            .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
        if count > 0 {
            kept.push(idx);
            means.push(sum / count as f64);
        } else {
            tracing::debug!(column = idx, "dropping feature column with no defined values");
        }
    }

    if kept.is_empty() {
        return Err(Error::InvalidInput(
            "feature matrix has no defined values".to_string(),
        ));
    }

    Ok(Array2::from_shape_fn((rows, kept.len()), |(r, c)| {
        let v = matrix[[r, kept[c]]];
        if v.is_finite() {
            v
        } else {
            means[c]
        }
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_nan_replaced_by_column_mean() {
        let m = array![[1.0, f64::NAN], [3.0, 4.0], [f64::NAN, 8.0]];
        let out = impute_mean(m.view()).unwrap();
        assert_eq!(out, array![[1.0, 6.0], [3.0, 4.0], [2.0, 8.0]]);
    }

    #[test]
    fn test_all_nan_column_is_dropped() {
        let m = array![[1.0, f64::NAN], [2.0, f64::NAN]];
        let out = impute_mean(m.view()).unwrap();
        assert_eq!(out.ncols(), 1);
        assert_eq!(out, array![[1.0], [2.0]]);
    }

    #[test]
    fn test_empty_matrix_fails() {
        let m = Array2::<f64>::zeros((0, 3));
        assert!(impute_mean(m.view()).is_err());
    }
}
