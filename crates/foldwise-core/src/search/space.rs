//! Parameter search spaces

use crate::error::{FoldwiseError, FoldwiseResult};
use crate::model::{ParamMap, ParamValue};
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Candidate values per parameter name
pub type ParamGrid = BTreeMap<String, Vec<ParamValue>>;

/// Every combination of `grid`; the last parameter name varies fastest
pub fn expand_grid(grid: &ParamGrid) -> Vec<ParamMap> {
    let mut candidates = vec![ParamMap::new()];
    for (name, values) in grid {
        candidates = candidates
            .into_iter()
            .flat_map(|partial| {
                values.iter().map(move |value| {
                    let mut next = partial.clone();
                    next.insert(name.clone(), value.clone());
                    next
                })
            })
            .collect();
    }
    candidates
}

/// Distribution a randomized search samples one parameter from
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ParamDistribution {
    /// Uniform choice from a list
    Choice { values: Vec<ParamValue> },
    /// Uniform float in `[low, high)`
    Uniform { low: f64, high: f64 },
    /// Float whose logarithm is uniform in `[ln low, ln high)`
    LogUniform { low: f64, high: f64 },
    /// Integer in `[low, high)`
    IntRange { low: i64, high: i64 },
}

impl ParamDistribution {
    pub fn choice(values: impl IntoIterator<Item = ParamValue>) -> Self {
        Self::Choice {
            values: values.into_iter().collect(),
        }
    }

    pub fn validate(&self, name: &str) -> FoldwiseResult<()> {
        let ok = match self {
            Self::Choice { values } => !values.is_empty(),
            Self::Uniform { low, high } => low < high,
            Self::LogUniform { low, high } => *low > 0.0 && low < high,
            Self::IntRange { low, high } => low < high,
        };
        if ok {
            Ok(())
        } else {
            Err(FoldwiseError::invalid_configuration(
                name,
                format!("empty or invalid distribution for '{}': {:?}", name, self),
            ))
        }
    }

    /// Draw one value; call `validate` first
    pub fn sample<R: Rng + ?Sized>(&self, rng: &mut R) -> ParamValue {
        match self {
            Self::Choice { values } => values[rng.gen_range(0..values.len())].clone(),
            Self::Uniform { low, high } => ParamValue::Float(rng.gen_range(*low..*high)),
            Self::LogUniform { low, high } => {
                ParamValue::Float(rng.gen_range(low.ln()..high.ln()).exp())
            }
            Self::IntRange { low, high } => ParamValue::Int(rng.gen_range(*low..*high)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::SmallRng;

    #[test]
    fn test_expand_grid_is_cartesian() {
        let mut grid = ParamGrid::new();
        grid.insert("C".into(), vec![0.01.into(), 0.1.into(), 10.0.into()]);
        grid.insert("max_iter".into(), vec![50i64.into(), 100i64.into(), 200i64.into()]);
        let candidates = expand_grid(&grid);
        assert_eq!(candidates.len(), 9);
        assert_eq!(candidates[0]["C"], ParamValue::Float(0.01));
        assert_eq!(candidates[1]["max_iter"], ParamValue::Int(100));
    }

    #[test]
    fn test_empty_grid_has_single_candidate() {
        assert_eq!(expand_grid(&ParamGrid::new()), vec![ParamMap::new()]);
    }

    #[test]
    fn test_sampling_stays_in_range() {
        let mut rng = SmallRng::seed_from_u64(3);
        let log = ParamDistribution::LogUniform { low: 1e-3, high: 1e2 };
        let ints = ParamDistribution::IntRange { low: 2, high: 5 };
        for _ in 0..100 {
            let v = log.sample(&mut rng).as_f64().unwrap();
            assert!((1e-3..1e2).contains(&v));
            let i = ints.sample(&mut rng).as_i64().unwrap();
            assert!((2..5).contains(&i));
        }
    }

    #[test]
    fn test_invalid_distributions() {
        assert!(ParamDistribution::choice(Vec::new()).validate("x").is_err());
        assert!(ParamDistribution::Uniform { low: 1.0, high: 1.0 }.validate("x").is_err());
        assert!(ParamDistribution::LogUniform { low: 0.0, high: 1.0 }.validate("x").is_err());
    }
}
