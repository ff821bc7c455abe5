//! Cosine similarity over embedding vectors

/// Score assigned when similarity is undefined (empty or zero-norm vector)
pub const SIMILARITY_SENTINEL: f64 = -1.0;

/// Cosine of the angle between `a` and `b`.
///
/// The dot product runs over the common prefix when lengths differ; norms
/// use the full vectors. Returns [`SIMILARITY_SENTINEL`] when either vector
/// is empty, has zero norm, or contains non-finite values. The result is
/// clamped to `[-1, 1]` to absorb rounding.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return SIMILARITY_SENTINEL;
    }

    let dot: f64 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| f64::from(*x) * f64::from(*y))
        .sum();
    let norm_a = norm(a);
    let norm_b = norm(b);

    if norm_a == 0.0 || norm_b == 0.0 {
        return SIMILARITY_SENTINEL;
    }

    let score = dot / (norm_a * norm_b);
    if score.is_finite() {
        score.clamp(-1.0, 1.0)
    } else {
        SIMILARITY_SENTINEL
    }
}

fn norm(v: &[f32]) -> f64 {
    v.iter().map(|x| f64::from(*x) * f64::from(*x)).sum::<f64>().sqrt()
}

#[cfg(test)]
mod tests {
    use super::*;

    const EPS: f64 = 1e-9;

    #[test]
    fn test_self_similarity_is_one() {
        let v = [0.3_f32, -1.2, 4.0, 0.0, 2.5];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < EPS);
    }

    #[test]
    fn test_symmetric() {
        let a = [1.0_f32, 2.0, 3.0];
        let b = [-2.0_f32, 0.5, 7.0];
        assert_eq!(cosine_similarity(&a, &b), cosine_similarity(&b, &a));
    }

    #[test]
    fn test_orthogonal_and_opposite() {
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < EPS);
        assert!((cosine_similarity(&[1.0, 2.0], &[-1.0, -2.0]) + 1.0).abs() < EPS);
    }

    #[test]
    fn test_bounded() {
        let vectors: [&[f32]; 4] = [
            &[1e-20, 1e-20, 1e-20],
            &[3.4e38, 1.0, -3.4e38],
            &[0.1, 0.2, 0.3],
            &[-5.0, 5.0, 0.0001],
        ];
        for a in vectors {
            for b in vectors {
                let s = cosine_similarity(a, b);
                assert!((-1.0..=1.0).contains(&s), "{} out of range", s);
            }
        }
    }

    #[test]
    fn test_empty_or_zero_norm_is_sentinel() {
        assert_eq!(cosine_similarity(&[], &[1.0]), SIMILARITY_SENTINEL);
        assert_eq!(cosine_similarity(&[1.0], &[]), SIMILARITY_SENTINEL);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 1.0]), SIMILARITY_SENTINEL);
    }

    #[test]
    fn test_non_finite_is_sentinel() {
        assert_eq!(
            cosine_similarity(&[f32::NAN, 1.0], &[1.0, 1.0]),
            SIMILARITY_SENTINEL
        );
    }
}
