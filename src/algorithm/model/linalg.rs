//! Matrix inversion for the logistic regression solver
//!
//! Design matrices here have a handful of columns, so a plain Gauss-Jordan
//! inverse on a dense `Array2` is sufficient.

use ndarray::Array2;

/// Pivots smaller than this are treated as zero
const SINGULAR_EPS: f64 = 1e-12;

/// Invert a square matrix with partial pivoting
///
/// # Arguments
/// * `matrix` - Square matrix to invert
///
/// # Returns
/// The inverse, or `None` if the matrix is not square or is numerically singular
#[must_use]
pub fn invert(matrix: &Array2<f64>) -> Option<Array2<f64>> {
    let n = matrix.nrows();
    if matrix.ncols() != n {
        return None;
    }

    let mut a = matrix.to_owned();
    let mut inv = Array2::<f64>::eye(n);

    for col in 0..n {
        let pivot_row =
            (col..n).max_by(|&x, &y| a[[x, col]].abs().total_cmp(&a[[y, col]].abs()))?;
        if a[[pivot_row, col]].abs() < SINGULAR_EPS {
            return None;
        }
        if pivot_row != col {
            for j in 0..n {
                a.swap([col, j], [pivot_row, j]);
                inv.swap([col, j], [pivot_row, j]);
            }
        }

        let pivot = a[[col, col]];
        a.row_mut(col).mapv_inplace(|v| v / pivot);
        inv.row_mut(col).mapv_inplace(|v| v / pivot);

        let pivot_a = a.row(col).to_owned();
        let pivot_inv = inv.row(col).to_owned();
        for row in 0..n {
            if row == col {
                continue;
            }
            let factor = a[[row, col]];
            if factor == 0.0 {
                continue;
            }
            a.row_mut(row).scaled_add(-factor, &pivot_a);
            inv.row_mut(row).scaled_add(-factor, &pivot_inv);
        }
    }

    Some(inv)
}
