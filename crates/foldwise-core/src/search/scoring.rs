//! Scoring functions

/// Fraction of predictions equal to the truth; 0 for empty input
pub fn accuracy(predictions: &[usize], truth: &[usize]) -> f64 {
    if truth.is_empty() {
        return 0.0;
    }
    let correct = predictions
        .iter()
        .zip(truth)
        .filter(|(p, t)| p == t)
        .count();
    correct as f64 / truth.len() as f64
}
