/// Sum every `resolution` consecutive values, the last chunk may be shorter.
pub fn reduce(scores: &[u64], resolution: usize) -> Vec<u64> {
    assert!(resolution > 0, "Resolution must be a positive integer");
    if resolution == 1 {
        return scores.to_vec();
    }
    scores
        .chunks(resolution)
        .map(|chunk| chunk.iter().sum())
        .collect()
}

/// Reduce the flanking `extension` values on each side of the region while keeping the interior
/// (the feature itself) at single base resolution.
pub fn aggregate_in_extended_region(scores: &[u64], extension: usize, resolution: usize) -> Vec<u64> {
    let prefix = extension.min(scores.len());
    let suffix = extension.min(scores.len() - prefix);
    let (head, rest) = scores.split_at(prefix);
    let (body, tail) = rest.split_at(rest.len() - suffix);

    let mut result = reduce(head, resolution);
    result.extend_from_slice(body);
    result.extend(reduce(tail, resolution));
    result
}

/// Element-wise sum of equally sized vectors.
///
/// # Panics
///
/// Panics if the vectors have different lengths.
pub fn combine<T: AsRef<[u64]>>(vectors: &[T]) -> Vec<u64> {
    let mut iter = vectors.iter().map(AsRef::as_ref);
    let mut result = match iter.next() {
        Some(first) => first.to_vec(),
        None => return Vec::new(),
    };
    for vector in iter {
        assert_eq!(
            result.len(),
            vector.len(),
            "Scores of all bins in a group must have the same length"
        );
        for (acc, value) in result.iter_mut().zip(vector) {
            *acc += value;
        }
    }
    result
}

#[cfg(test)]
mod tests {
    use super::*;

    const SCORES: [u64; 5] = [0, 1, 1, 4, 2];

    #[test]
    fn test_reduce() {
        assert_eq!(reduce(&SCORES, 1), SCORES);
        assert_eq!(reduce(&SCORES, 2), [1, 5, 2]);
        assert_eq!(reduce(&SCORES, 3), [2, 6]);
        assert_eq!(reduce(&SCORES, 4), [6, 2]);
        assert_eq!(reduce(&SCORES, 10), [8]);
        assert!(reduce(&[], 3).is_empty());
    }

    #[test]
    fn test_reduce_preserves_mass_and_length() {
        let scores: Vec<u64> = (0..40).map(|x| (x * 7 + 3) % 5).collect();
        let total: u64 = scores.iter().sum();
        for resolution in 1..=25 {
            let reduced = reduce(&scores, resolution);
            assert_eq!(reduced.iter().sum::<u64>(), total, "{resolution}");

            let half = &scores[..20];
            assert_eq!(
                reduce(half, resolution).len(),
                half.len().div_ceil(resolution),
                "{resolution}"
            );
        }
    }

    #[test]
    fn test_aggregate_in_extended_region() {
        // 10 flanking bases on each side of a 5-base feature
        let scores = [
            0, 1, 2, 3, 3, 4, 4, 4, 4, 5, 9, 2, 0, 2, 7, 5, 4, 4, 4, 4, 3, 3, 2, 1, 0,
        ];
        assert_eq!(aggregate_in_extended_region(&scores, 10, 1), scores);
        assert_eq!(
            aggregate_in_extended_region(&scores, 10, 2),
            [1, 5, 7, 8, 9, 9, 2, 0, 2, 7, 9, 8, 7, 5, 1]
        );
        assert_eq!(
            aggregate_in_extended_region(&scores, 10, 5),
            [9, 21, 9, 2, 0, 2, 7, 21, 9]
        );
        assert_eq!(aggregate_in_extended_region(&scores, 0, 5), scores);
        // Extension longer than the vector itself
        assert_eq!(aggregate_in_extended_region(&[1, 2, 3], 5, 2), [3, 3]);
    }

    #[test]
    fn test_combine() {
        assert_eq!(combine(&[vec![1, 2, 3], vec![0, 5, 1]]), [1, 7, 4]);
        assert_eq!(combine(&[[4, 4]]), [4, 4]);
        assert!(combine::<Vec<u64>>(&[]).is_empty());
    }

    #[test]
    #[should_panic]
    fn test_combine_length_mismatch() {
        combine(&[vec![1, 2, 3], vec![1, 2]]);
    }
}
