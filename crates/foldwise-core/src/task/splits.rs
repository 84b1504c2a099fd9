//! Train/test partition of a task

use super::folds::stratified_folds;
use crate::arff::ArffDocument;
use crate::error::{FoldwiseError, FoldwiseResult};
use rand::SeedableRng;
use rand::rngs::SmallRng;
use serde::{Deserialize, Serialize};

/// Train and test instance indices for one (repeat, fold) pair
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct Split {
    pub train: Vec<usize>,
    pub test: Vec<usize>,
}

/// All splits of an estimation procedure, indexed by (repeat, fold)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Splits {
    repeats: usize,
    folds: usize,
    splits: Vec<Split>,
}

impl Splits {
    /// Build from a repeat-major vector of `repeats * folds` splits
    pub fn new(repeats: usize, folds: usize, splits: Vec<Split>) -> FoldwiseResult<Self> {
        if repeats == 0 || folds == 0 {
            return Err(FoldwiseError::invalid_task("repeats and folds must be at least 1"));
        }
        if splits.len() != repeats * folds {
            return Err(FoldwiseError::invalid_task(format!(
                "expected {} splits for {} repeats x {} folds, got {}",
                repeats * folds,
                repeats,
                folds,
                splits.len()
            )));
        }
        Ok(Self {
            repeats,
            folds,
            splits,
        })
    }

    /// Repeated stratified k-fold cross-validation over `targets`.
    ///
    /// Each repeat reshuffles with a seed derived from `seed`, so the result is
    /// deterministic.
    pub fn stratified_cv(
        targets: &[usize],
        repeats: usize,
        folds: usize,
        seed: u64,
    ) -> FoldwiseResult<Self> {
        if folds < 2 {
            return Err(FoldwiseError::invalid_task("cross-validation needs at least 2 folds"));
        }
        if targets.len() < folds {
            return Err(FoldwiseError::invalid_task(format!(
                "cannot split {} instances into {} folds",
                targets.len(),
                folds
            )));
        }

        let mut splits = Vec::with_capacity(repeats * folds);
        for repeat in 0..repeats {
            let mut rng = SmallRng::seed_from_u64(seed.wrapping_add(repeat as u64));
            let test_folds = stratified_folds(targets, folds, &mut rng);
            for test in &test_folds {
                let train = (0..targets.len())
                    .filter(|i| test.binary_search(i).is_err())
                    .collect();
                splits.push(Split {
                    train,
                    test: test.clone(),
                });
            }
        }
        Self::new(repeats, folds, splits)
    }

    /// Parse the service's splits file.
    ///
    /// Expected columns: `type` (TRAIN/TEST), `rowid`, `repeat`, `fold`, and
    /// optionally `sample`, of which only sample 0 is kept.
    pub fn from_arff(document: &ArffDocument) -> FoldwiseResult<Self> {
        let column = |name: &str| {
            document.attribute_index_ignore_case(name).ok_or_else(|| {
                FoldwiseError::invalid_task(format!("splits file lacks a '{}' column", name))
            })
        };
        let type_col = column("type")?;
        let row_col = column("rowid")?;
        let repeat_col = column("repeat")?;
        let fold_col = column("fold")?;
        let sample_col = document.attribute_index_ignore_case("sample");

        let index = |value: &crate::arff::ArffValue, what: &str| {
            value
                .as_i64()
                .filter(|v| *v >= 0)
                .map(|v| v as usize)
                .ok_or_else(|| FoldwiseError::invalid_task(format!("invalid {} value {:?}", what, value)))
        };

        let mut entries = Vec::with_capacity(document.data.len());
        let (mut repeats, mut folds) = (0, 0);
        for row in &document.data {
            if let Some(col) = sample_col {
                if index(&row[col], "sample")? != 0 {
                    continue;
                }
            }
            let is_train = match row[type_col].as_str() {
                Some(kind) if kind.eq_ignore_ascii_case("TRAIN") => true,
                Some(kind) if kind.eq_ignore_ascii_case("TEST") => false,
                other => {
                    return Err(FoldwiseError::invalid_task(format!(
                        "unknown split type {:?}",
                        other
                    )));
                }
            };
            let repeat = index(&row[repeat_col], "repeat")?;
            let fold = index(&row[fold_col], "fold")?;
            let row_id = index(&row[row_col], "rowid")?;
            repeats = repeats.max(repeat + 1);
            folds = folds.max(fold + 1);
            entries.push((repeat, fold, is_train, row_id));
        }

        let mut splits = vec![Split::default(); repeats * folds];
        for (repeat, fold, is_train, row_id) in entries {
            let split = &mut splits[repeat * folds + fold];
            if is_train {
                split.train.push(row_id);
            } else {
                split.test.push(row_id);
            }
        }
        for split in &mut splits {
            split.train.sort_unstable();
            split.test.sort_unstable();
        }
        Self::new(repeats, folds, splits)
    }

    pub fn repeats(&self) -> usize {
        self.repeats
    }

    pub fn folds(&self) -> usize {
        self.folds
    }

    /// The split for (repeat, fold), if in range
    pub fn get(&self, repeat: usize, fold: usize) -> Option<&Split> {
        if repeat >= self.repeats || fold >= self.folds {
            return None;
        }
        self.splits.get(repeat * self.folds + fold)
    }

    /// Iterate `(repeat, fold, split)` in canonical order
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, &Split)> + '_ {
        let folds = self.folds;
        self.splits
            .iter()
            .enumerate()
            .map(move |(i, split)| (i / folds, i % folds, split))
    }
}
