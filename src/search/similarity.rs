//! Vector similarity strategies.

use tracing::warn;

/// Similarity strategy used to score corpus vectors against the query.
///
/// Dot product matches the scoring the corpus embeddings were produced
/// under; cosine is available for providers whose vectors are not
/// normalized.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Similarity {
    /// Raw dot product (default)
    #[default]
    Dot,
    /// Cosine similarity
    Cosine,
}

impl Similarity {
    /// Score two vectors under this strategy.
    ///
    /// Mismatched lengths score 0.0 with a warning rather than panicking;
    /// a degenerate vector pair should rank last, not kill the search.
    pub fn score(&self, a: &[f32], b: &[f32]) -> f32 {
        if a.len() != b.len() {
            warn!(left = a.len(), right = b.len(), "vector length mismatch");
            return 0.0;
        }

        match self {
            Similarity::Dot => dot(a, b),
            Similarity::Cosine => cosine(a, b),
        }
    }
}

fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

fn cosine(a: &[f32], b: &[f32]) -> f32 {
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();

    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot(a, b) / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dot_product() {
        let a = [1.0, 2.0, 3.0];
        let b = [4.0, 5.0, 6.0];
        assert_eq!(Similarity::Dot.score(&a, &b), 32.0);
    }

    #[test]
    fn test_cosine_identical_vectors() {
        let a = [1.0, 2.0, 3.0];
        let score = Similarity::Cosine.score(&a, &a);
        assert!((score - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_cosine_orthogonal_vectors() {
        let a = [1.0, 0.0];
        let b = [0.0, 1.0];
        assert_eq!(Similarity::Cosine.score(&a, &b), 0.0);
    }

    #[test]
    fn test_zero_vector_scores_zero() {
        let a = [0.0, 0.0];
        let b = [1.0, 2.0];
        assert_eq!(Similarity::Cosine.score(&a, &b), 0.0);
    }

    #[test]
    fn test_length_mismatch_scores_zero() {
        let a = [1.0, 2.0];
        let b = [1.0, 2.0, 3.0];
        assert_eq!(Similarity::Dot.score(&a, &b), 0.0);
    }
}
