//! Serial reference scan

/// Inclusive prefix sum: `out[i] = out[i - 1] + input[i]`.
pub fn inclusive_scan(input: &[u64]) -> Vec<u64> {
    input
        .iter()
        .scan(0u64, |acc, &v| {
            *acc += v;
            Some(*acc)
        })
        .collect()
}
