//! In-memory dataset: numeric features plus a class index per instance

use crate::arff::{ArffDocument, ArffValue, AttributeKind};
use crate::error::{FoldwiseError, FoldwiseResult};
use ndarray::{Array2, ArrayView2, Axis};
use rand::rngs::SmallRng;
use rand::{Rng, SeedableRng};
use serde::{Deserialize, Serialize};

/// Feature matrix and class targets
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    features: Array2<f64>,
    targets: Vec<usize>,
    feature_names: Vec<String>,
}

impl Dataset {
    pub fn new(
        features: Array2<f64>,
        targets: Vec<usize>,
        feature_names: Vec<String>,
    ) -> FoldwiseResult<Self> {
        if features.nrows() != targets.len() {
            return Err(FoldwiseError::invalid_input(format!(
                "{} feature rows but {} targets",
                features.nrows(),
                targets.len()
            )));
        }
        if feature_names.len() != features.ncols() {
            return Err(FoldwiseError::invalid_input(format!(
                "{} feature names for {} columns",
                feature_names.len(),
                features.ncols()
            )));
        }
        Ok(Self {
            features,
            targets,
            feature_names,
        })
    }

    /// Build from an ARFF document with a nominal target attribute.
    ///
    /// Returns the dataset and the target's nominal values, which become the
    /// class label order. Numeric attributes are used as-is, nominal inputs
    /// are ordinal-encoded, string attributes and `ignore` columns are dropped.
    /// Missing numeric cells are imputed with the column mean.
    pub fn from_arff(
        document: &ArffDocument,
        target: &str,
        ignore: &[String],
    ) -> FoldwiseResult<(Self, Vec<String>)> {
        let target_col = document.attribute_index(target).ok_or_else(|| {
            FoldwiseError::invalid_task(format!("target attribute '{}' not in dataset", target))
        })?;
        let class_labels = document.attributes[target_col]
            .nominal_values()
            .ok_or_else(|| {
                FoldwiseError::invalid_task(format!(
                    "target attribute '{}' is not nominal",
                    target
                ))
            })?
            .to_vec();

        let feature_cols: Vec<usize> = document
            .attributes
            .iter()
            .enumerate()
            .filter(|(i, attribute)| {
                *i != target_col
                    && !ignore.iter().any(|name| name == &attribute.name)
                    && !matches!(attribute.kind, AttributeKind::String)
            })
            .map(|(i, _)| i)
            .collect();

        let n_rows = document.data.len();
        let mut features = Array2::<f64>::from_elem((n_rows, feature_cols.len()), f64::NAN);
        let mut targets = Vec::with_capacity(n_rows);

        for (r, row) in document.data.iter().enumerate() {
            let label = row[target_col].as_str().ok_or_else(|| {
                FoldwiseError::invalid_task(format!("instance {} has no class label", r))
            })?;
            let class = class_labels
                .iter()
                .position(|l| l == label)
                .ok_or_else(|| FoldwiseError::invalid_task(format!("unknown class '{}'", label)))?;
            targets.push(class);

            for (c, &col) in feature_cols.iter().enumerate() {
                let attribute = &document.attributes[col];
                features[[r, c]] = match (&row[col], &attribute.kind) {
                    (ArffValue::Missing, _) => f64::NAN,
                    (ArffValue::Text(value), AttributeKind::Nominal(values)) => values
                        .iter()
                        .position(|v| v == value)
                        .map_or(f64::NAN, |p| p as f64),
                    (value, _) => value.as_f64().unwrap_or(f64::NAN),
                };
            }
        }

        impute_column_means(&mut features);

        let feature_names = feature_cols
            .iter()
            .map(|&col| document.attributes[col].name.clone())
            .collect();
        Ok((Self::new(features, targets, feature_names)?, class_labels))
    }

    /// Gaussian blobs, one per class, for demos and tests.
    ///
    /// Class `k` is centred at `3k` on every feature with unit variance.
    pub fn synthetic_blobs(per_class: usize, n_features: usize, n_classes: usize, seed: u64) -> Self {
        let mut rng = SmallRng::seed_from_u64(seed);
        let n = per_class * n_classes;
        let mut features = Array2::<f64>::zeros((n, n_features));
        let mut targets = Vec::with_capacity(n);
        for i in 0..n {
            let class = i % n_classes;
            for j in 0..n_features {
                // Box-Muller
                let u1: f64 = rng.gen_range(f64::EPSILON..1.0);
                let u2: f64 = rng.gen_range(0.0..1.0);
                let noise = (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos();
                features[[i, j]] = 3.0 * class as f64 + noise;
            }
            targets.push(class);
        }
        let feature_names = (0..n_features).map(|j| format!("f{}", j)).collect();
        Self {
            features,
            targets,
            feature_names,
        }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn n_features(&self) -> usize {
        self.features.ncols()
    }

    pub fn features(&self) -> ArrayView2<'_, f64> {
        self.features.view()
    }

    pub fn targets(&self) -> &[usize] {
        &self.targets
    }

    pub fn feature_names(&self) -> &[String] {
        &self.feature_names
    }

    /// Copy out the rows at `indices`
    pub fn select(&self, indices: &[usize]) -> (Array2<f64>, Vec<usize>) {
        let features = self.features.select(Axis(0), indices);
        let targets = indices.iter().map(|&i| self.targets[i]).collect();
        (features, targets)
    }
}

fn impute_column_means(features: &mut Array2<f64>) {
    for mut column in features.columns_mut() {
        let (sum, count) = column
            .iter()
            .filter(|v| !v.is_nan())
            .fold((0.0, 0usize), |(s, c), v| (s + v, c + 1));
        let mean = if count == 0 { 0.0 } else { sum / count as f64 };
        column.mapv_inplace(|v| if v.is_nan() { mean } else { v });
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::arff;

    #[test]
    fn test_from_arff_encodes_and_imputes() {
        let text = "@relation d\n\
@attribute id STRING\n\
@attribute a NUMERIC\n\
@attribute colour {red,green}\n\
@attribute class {yes,no}\n\
@data\n\
x1,1.0,green,no\n\
x2,?,red,yes\n\
x3,3.0,?,yes\n";
        let doc = arff::parse(text).unwrap();
        let (dataset, labels) = Dataset::from_arff(&doc, "class", &[]).unwrap();

        assert_eq!(labels, vec!["yes", "no"]);
        assert_eq!(dataset.targets(), &[1, 0, 0]);
        assert_eq!(dataset.feature_names(), &["a", "colour"]);
        assert_eq!(dataset.features()[[1, 0]], 2.0);
        assert_eq!(dataset.features()[[0, 1]], 1.0);
        assert_eq!(dataset.features()[[2, 1]], 0.5);
    }

    #[test]
    fn test_from_arff_rejects_numeric_target() {
        let doc = arff::parse("@relation d\n@attribute y NUMERIC\n@data\n1\n").unwrap();
        let err = Dataset::from_arff(&doc, "y", &[]).unwrap_err();
        assert!(matches!(err, FoldwiseError::InvalidTask { .. }));
    }

    #[test]
    fn test_synthetic_blobs_shape() {
        let dataset = Dataset::synthetic_blobs(50, 4, 3, 1);
        assert_eq!(dataset.len(), 150);
        assert_eq!(dataset.n_features(), 4);
        assert_eq!(dataset.targets().iter().filter(|&&t| t == 2).count(), 50);
    }

    #[test]
    fn test_select_rows() {
        let dataset = Dataset::synthetic_blobs(2, 2, 2, 3);
        let (x, y) = dataset.select(&[3, 0]);
        assert_eq!(x.nrows(), 2);
        assert_eq!(y, vec![1, 0]);
        assert_eq!(x.row(1), dataset.features().row(0));
    }
}
