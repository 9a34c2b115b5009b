//! Descriptive statistics over small samples

/// Arithmetic mean, NaN for an empty slice
#[inline]
pub fn mean(slice: &[f64]) -> f64 {
    slice.iter().sum::<f64>() / slice.len() as f64
}

/// Sample variance (n - 1 denominator), NaN for fewer than two values
#[inline]
pub fn variance(slice: &[f64]) -> f64 {
    let n = slice.len();
    if n < 2 {
        return f64::NAN;
    }
    let m = mean(slice);
    slice.iter().fold(0.0, |acc, x| acc + (x - m).powi(2)) / (n - 1) as f64
}

/// Sample standard deviation
#[inline]
pub fn stddev(slice: &[f64]) -> f64 {
    variance(slice).sqrt()
}

/// Ranks starting at 1, ties receive the average of the ranks they span
pub fn rank(slice: &[f64]) -> Vec<f64> {
    let mut order = (0..slice.len()).collect::<Vec<_>>();
    order.sort_by(|&a, &b| slice[a].total_cmp(&slice[b]));

    let mut ranks = vec![0.0; slice.len()];
    let mut i = 0;
    while i < order.len() {
        let mut j = i;
        while j + 1 < order.len() && slice[order[j + 1]] == slice[order[i]] {
            j += 1;
        }
        // positions i..=j share the average of ranks i+1..=j+1
        let avg = (i + j) as f64 / 2.0 + 1.0;
        for &idx in &order[i..=j] {
            ranks[idx] = avg;
        }
        i = j + 1;
    }
    ranks
}

/// Sizes of the groups of tied values
pub fn tie_counts(slice: &[f64]) -> Vec<usize> {
    let mut sorted = slice.to_vec();
    sorted.sort_by(|a, b| a.total_cmp(b));

    let mut counts = Vec::new();
    let mut i = 0;
    while i < sorted.len() {
        let mut j = i + 1;
        while j < sorted.len() && sorted[j] == sorted[i] {
            j += 1;
        }
        counts.push(j - i);
        i = j;
    }
    counts
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn descriptive() {
        assert_eq!(mean(&[1.0, 2.0, 3.0]), 2.0);
        assert_eq!(variance(&[1.0, 2.0, 3.0]), 1.0);
        assert_eq!(stddev(&[2.0, 4.0, 6.0]), 2.0);
        assert!(stddev(&[1.0]).is_nan());
        assert!(mean(&[]).is_nan());
    }

    #[test]
    fn ranks_average_ties() {
        assert_eq!(rank(&[10.0, 30.0, 20.0]), vec![1.0, 3.0, 2.0]);
        assert_eq!(rank(&[5.0, 1.0, 5.0, 5.0]), vec![3.0, 1.0, 3.0, 3.0]);
        assert_eq!(rank(&[2.0, 2.0]), vec![1.5, 1.5]);
    }

    #[test]
    fn ties() {
        assert_eq!(tie_counts(&[3.0, 1.0, 3.0, 2.0, 3.0]), vec![1, 1, 3]);
        assert!(tie_counts(&[]).is_empty());
    }
}
