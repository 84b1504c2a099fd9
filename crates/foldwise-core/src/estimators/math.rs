//! Numeric helpers shared by the estimators

use ndarray::{Array1, Array2, ArrayView2, Axis};

/// Index of the largest value; the first index wins ties
pub fn argmax(values: impl IntoIterator<Item = f64>) -> usize {
    let mut best = 0;
    let mut best_value = f64::NEG_INFINITY;
    for (i, v) in values.into_iter().enumerate() {
        if v > best_value {
            best = i;
            best_value = v;
        }
    }
    best
}

/// Sorted distinct class indices of `y`
pub fn distinct_classes(y: &[usize]) -> Vec<usize> {
    let mut classes = y.to_vec();
    classes.sort_unstable();
    classes.dedup();
    classes
}

/// Position of each label within `classes`
pub fn encode_labels(y: &[usize], classes: &[usize]) -> Vec<usize> {
    y.iter()
        .map(|label| classes.binary_search(label).unwrap_or(0))
        .collect()
}

pub fn sigmoid(z: f64) -> f64 {
    if z >= 0.0 {
        1.0 / (1.0 + (-z).exp())
    } else {
        let e = z.exp();
        e / (1.0 + e)
    }
}

/// Row-wise softmax, in place
pub fn softmax_rows(scores: &mut Array2<f64>) {
    for mut row in scores.rows_mut() {
        let max = row.iter().copied().fold(f64::NEG_INFINITY, f64::max);
        row.mapv_inplace(|v| (v - max).exp());
        let sum = row.sum();
        row.mapv_inplace(|v| v / sum);
    }
}

/// Scale every row to sum to one; all-zero rows become uniform
pub fn normalize_rows(values: &mut Array2<f64>) {
    let width = values.ncols() as f64;
    for mut row in values.rows_mut() {
        let sum = row.sum();
        if sum > 0.0 {
            row.mapv_inplace(|v| v / sum);
        } else {
            row.fill(1.0 / width);
        }
    }
}

/// `x · wᵀ + b` for weights of shape (outputs, features)
pub fn linear_scores(x: ArrayView2<'_, f64>, weights: &Array2<f64>, bias: &Array1<f64>) -> Array2<f64> {
    let mut scores = x.dot(&weights.t());
    scores += &bias.view().insert_axis(Axis(0));
    scores
}

/// Solve `a · x = b` by Gaussian elimination with partial pivoting.
///
/// Returns `None` for a singular system.
pub fn solve(mut a: Array2<f64>, mut b: Array1<f64>) -> Option<Array1<f64>> {
    let n = b.len();
    for col in 0..n {
        let pivot = (col..n).max_by(|&i, &j| a[[i, col]].abs().total_cmp(&a[[j, col]].abs()))?;
        if a[[pivot, col]].abs() < 1e-12 {
            return None;
        }
        if pivot != col {
            for k in 0..n {
                a.swap([col, k], [pivot, k]);
            }
            b.swap(col, pivot);
        }
        for row in col + 1..n {
            let factor = a[[row, col]] / a[[col, col]];
            for k in col..n {
                a[[row, k]] -= factor * a[[col, k]];
            }
            b[row] -= factor * b[col];
        }
    }
    let mut x = Array1::<f64>::zeros(n);
    for row in (0..n).rev() {
        let tail: f64 = (row + 1..n).map(|k| a[[row, k]] * x[k]).sum();
        x[row] = (b[row] - tail) / a[[row, row]];
    }
    Some(x)
}
