//! Label preparation and stratified train/test splitting

use aprender::model_selection::StratifiedKFold;
use aprender::primitives::Vector;
use std::collections::HashSet;
use tracing::warn;

/// Force the missing class into the leading rows when only one class is
/// present.
///
/// Labels of rows `0..max(1, n / 10)` are overwritten with the missing class
/// so the classifier sees both classes. Returns the injected class, or `None`
/// when both classes were already present (or there are no labels).
pub fn ensure_both_classes(labels: &mut [usize]) -> Option<usize> {
    let first = *labels.first()?;
    if labels.iter().any(|&label| label != first) {
        return None;
    }

    let missing = 1 - first.min(1);
    let forced = (labels.len() / 10).max(1);
    for label in labels.iter_mut().take(forced) {
        *label = missing;
    }

    warn!(
        present_class = first,
        injected_class = missing,
        rows = forced,
        "Only one class present, forcing the missing class into leading rows"
    );
    Some(missing)
}

/// Stratified split of row indices into `(train, test)`.
///
/// The labels are cut into `round(1 / test_size)` seeded stratified folds
/// (at least 2) and the first fold becomes the test set. A class whose rows
/// all land in that fold (a single-row class) is moved back into training.
/// Both index lists are returned sorted.
pub fn stratified_split(labels: &[usize], test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let all_train = || -> (Vec<usize>, Vec<usize>) {
        ((0..labels.len()).collect(), Vec::new())
    };
    if labels.is_empty() || !(test_size > 0.0 && test_size < 1.0) {
        return all_train();
    }

    let n_folds = ((1.0 / test_size).round() as usize).max(2);
    let y: Vec<f32> = labels.iter().map(|&label| label as f32).collect();
    let folds = StratifiedKFold::new(n_folds)
        .with_random_state(seed)
        .split(&Vector::from_slice(&y));
    let Some((mut train, test)) = folds.into_iter().next() else {
        return all_train();
    };

    let trained: HashSet<usize> = train.iter().map(|&i| labels[i]).collect();
    let (mut test, stranded): (Vec<usize>, Vec<usize>) = test
        .into_iter()
        .partition(|&i| trained.contains(&labels[i]));
    train.extend(stranded);

    train.sort_unstable();
    test.sort_unstable();
    (train, test)
}

/// Gather rows by index
pub fn select<T: Clone>(values: &[T], indices: &[usize]) -> Vec<T> {
    indices.iter().map(|&i| values[i].clone()).collect()
}
