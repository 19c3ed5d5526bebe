use std::collections::HashSet;

/// Mean and population standard deviation; `(0.0, 0.0)` for no samples.
pub fn mean_and_stddev(data: &[f64]) -> (f64, f64) {
    if data.is_empty() {
        return (0.0, 0.0);
    }
    let mean = data.iter().sum::<f64>() / data.len() as f64;
    let variance = data.iter().map(|x| (x - mean).powi(2)).sum::<f64>() / data.len() as f64;
    (mean, variance.sqrt())
}

pub fn sorted_unique<T: Ord + Clone>(values: impl IntoIterator<Item = T>) -> Vec<T> {
    let mut values = values.into_iter().collect::<Vec<_>>();
    values.sort();
    values.dedup();
    values
}

/// Keeps the first occurrence of each item, in order.
pub fn unique_in_order<T: Eq + std::hash::Hash + Clone>(
    values: impl IntoIterator<Item = T>,
) -> Vec<T> {
    let mut seen = HashSet::new();
    values
        .into_iter()
        .filter(|x| seen.insert(x.clone()))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stddev_is_population() {
        let (mean, stddev) = mean_and_stddev(&[2.0, 4.0, 4.0, 4.0, 5.0, 5.0, 7.0, 9.0]);
        assert_eq!(mean, 5.0);
        assert_eq!(stddev, 2.0);
        assert_eq!(mean_and_stddev(&[3.5]), (3.5, 0.0));
        assert_eq!(mean_and_stddev(&[]), (0.0, 0.0));
    }

    #[test]
    fn unique_helpers() {
        assert_eq!(sorted_unique(vec![4, 1, 4, 2]), vec![1, 2, 4]);
        assert_eq!(unique_in_order(vec!["b", "a", "b"]), vec!["b", "a"]);
    }
}
