//! Longest increasing subsequence, used to decide which keyed children can
//! stay where they are.

/// Indices of a longest strictly increasing subsequence of `values`.
///
/// Entries equal to `0` mean "no old counterpart" and never take part. The
/// returned indices are in ascending order. Runs in `O(n log n)`.
pub fn longest_increasing_subsequence(values: &[usize]) -> Vec<usize> {
    let mut predecessors: Vec<Option<usize>> = vec![None; values.len()];
    // tails[k] is the index of the smallest value ending an increasing run of length k + 1.
    let mut tails: Vec<usize> = Vec::new();

    for (index, &value) in values.iter().enumerate() {
        if value == 0 {
            continue;
        }
        let position = tails.partition_point(|&tail| values[tail] < value);
        if position > 0 {
            predecessors[index] = Some(tails[position - 1]);
        }
        if position == tails.len() {
            tails.push(index);
        } else {
            tails[position] = index;
        }
    }

    let mut result = Vec::with_capacity(tails.len());
    let mut cursor = tails.last().copied();
    while let Some(index) = cursor {
        result.push(index);
        cursor = predecessors[index];
    }
    result.reverse();
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_strictly_increasing(values: &[usize], indices: &[usize]) -> bool {
        indices.windows(2).all(|w| w[0] < w[1] && values[w[0]] < values[w[1]])
    }

    #[test]
    fn empty_and_all_zero() {
        assert!(longest_increasing_subsequence(&[]).is_empty());
        assert!(longest_increasing_subsequence(&[0, 0, 0]).is_empty());
    }

    #[test]
    fn sorted_input_keeps_everything() {
        assert_eq!(longest_increasing_subsequence(&[1, 2, 3, 4]), vec![0, 1, 2, 3]);
    }

    #[test]
    fn reversed_input_keeps_one() {
        assert_eq!(longest_increasing_subsequence(&[4, 3, 2, 1]).len(), 1);
    }

    #[test]
    fn zeros_are_skipped() {
        let values = [3, 0, 1, 0, 2];
        let lis = longest_increasing_subsequence(&values);
        assert_eq!(lis, vec![2, 4]);
    }

    #[test]
    fn mixed_sequence() {
        let values = [2, 5, 3, 7, 11, 8, 10, 13, 6];
        let lis = longest_increasing_subsequence(&values);
        assert_eq!(lis.len(), 6);
        assert!(is_strictly_increasing(&values, &lis));
    }

    #[test]
    fn equal_values_are_not_increasing() {
        assert_eq!(longest_increasing_subsequence(&[2, 2, 2]).len(), 1);
    }
}
