//! Stratified fold assignment

use rand::Rng;
use rand::seq::SliceRandom;

/// Assign `positions` (indices into `targets`) to `n_folds` test folds so that
/// every class is spread as evenly as possible across folds.
///
/// Returns one vector of positions per fold, each sorted ascending.
pub fn stratified_folds<R: Rng + ?Sized>(
    targets: &[usize],
    n_folds: usize,
    rng: &mut R,
) -> Vec<Vec<usize>> {
    let n_folds = n_folds.max(1);
    let mut folds = vec![Vec::new(); n_folds];
    let n_classes = targets.iter().copied().max().map_or(0, |m| m + 1);

    let mut by_class: Vec<Vec<usize>> = vec![Vec::new(); n_classes];
    for (position, &class) in targets.iter().enumerate() {
        by_class[class].push(position);
    }

    // Continue the round-robin across classes so fold sizes stay balanced
    let mut next = 0;
    for mut members in by_class {
        members.shuffle(rng);
        for position in members {
            folds[next % n_folds].push(position);
            next += 1;
        }
    }

    for fold in &mut folds {
        fold.sort_unstable();
    }
    folds
}
