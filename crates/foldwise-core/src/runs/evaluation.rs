//! Local evaluation measures computed from prediction rows

use super::rows::PredictionRow;
use std::collections::BTreeMap;

pub const PREDICTIVE_ACCURACY: &str = "predictive_accuracy";
pub const MEAN_ABSOLUTE_ERROR: &str = "mean_absolute_error";

/// Fraction of rows whose prediction equals the truth
pub fn predictive_accuracy(rows: &[PredictionRow]) -> f64 {
    if rows.is_empty() {
        return 0.0;
    }
    rows.iter().filter(|r| r.is_correct()).count() as f64 / rows.len() as f64
}

/// Mean absolute difference between the probability vector and the one-hot
/// truth, averaged over rows and classes
pub fn mean_absolute_error(rows: &[PredictionRow], class_labels: &[String]) -> f64 {
    if rows.is_empty() || class_labels.is_empty() {
        return 0.0;
    }
    let total: f64 = rows
        .iter()
        .map(|row| {
            row.probabilities
                .iter()
                .zip(class_labels)
                .map(|(p, label)| {
                    let target = if *label == row.truth { 1.0 } else { 0.0 };
                    (p - target).abs()
                })
                .sum::<f64>()
        })
        .sum();
    total / (rows.len() * class_labels.len()) as f64
}

/// Flat and per-(repeat, fold) evaluations.
///
/// Flat values are computed over all rows; detailed values are indexed
/// metric -> repeat -> fold, with 0 for a fold that has no rows.
pub fn evaluate(
    rows: &[PredictionRow],
    class_labels: &[String],
    repeats: usize,
    folds: usize,
) -> (BTreeMap<String, f64>, BTreeMap<String, Vec<Vec<f64>>>) {
    let mut grouped: Vec<Vec<Vec<PredictionRow>>> = vec![vec![Vec::new(); folds]; repeats];
    for row in rows {
        if let Some(cell) = grouped.get_mut(row.repeat).and_then(|r| r.get_mut(row.fold)) {
            cell.push(row.clone());
        }
    }

    let mut flat = BTreeMap::new();
    flat.insert(PREDICTIVE_ACCURACY.to_string(), predictive_accuracy(rows));
    flat.insert(
        MEAN_ABSOLUTE_ERROR.to_string(),
        mean_absolute_error(rows, class_labels),
    );

    let per_fold = |metric: &dyn Fn(&[PredictionRow]) -> f64| -> Vec<Vec<f64>> {
        grouped
            .iter()
            .map(|repeat| repeat.iter().map(|fold| metric(fold.as_slice())).collect())
            .collect()
    };
    let mut detailed = BTreeMap::new();
    detailed.insert(PREDICTIVE_ACCURACY.to_string(), per_fold(&predictive_accuracy));
    detailed.insert(
        MEAN_ABSOLUTE_ERROR.to_string(),
        per_fold(&|fold: &[PredictionRow]| mean_absolute_error(fold, class_labels)),
    );
    (flat, detailed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn row(
        repeat: usize,
        fold: usize,
        probabilities: Vec<f64>,
        prediction: &str,
        truth: &str,
    ) -> PredictionRow {
        PredictionRow {
            repeat,
            fold,
            row_id: 0,
            probabilities,
            prediction: prediction.into(),
            truth: truth.into(),
        }
    }

    fn labels() -> Vec<String> {
        vec!["x".into(), "y".into()]
    }

    #[test]
    fn test_accuracy_and_mae() {
        let rows = vec![
            row(0, 0, vec![1.0, 0.0], "x", "x"),
            row(0, 0, vec![0.5, 0.5], "x", "y"),
        ];
        assert_eq!(predictive_accuracy(&rows), 0.5);
        assert_eq!(mean_absolute_error(&rows, &labels()), 0.25);
    }

    #[test]
    fn test_evaluate_detailed_shape() {
        let rows = vec![
            row(0, 0, vec![1.0, 0.0], "x", "x"),
            row(0, 1, vec![0.0, 1.0], "y", "x"),
            row(1, 0, vec![0.0, 1.0], "y", "y"),
            row(1, 1, vec![1.0, 0.0], "x", "x"),
        ];
        let (flat, detailed) = evaluate(&rows, &labels(), 2, 2);
        assert_eq!(flat[PREDICTIVE_ACCURACY], 0.75);
        assert_eq!(detailed[PREDICTIVE_ACCURACY], vec![vec![1.0, 0.0], vec![1.0, 1.0]]);
        assert_eq!(detailed[MEAN_ABSOLUTE_ERROR][0][1], 1.0);
    }
}
