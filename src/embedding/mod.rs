//! C2 — Embedding Cache: produces and persists unit-normalized vectors for
//! bullets and JD text, with lazy refill for missing entries.

use crate::ai::provider::AiProvider;
use crate::domain::profile::Profile;
use crate::errors::PipelineError;

/// Cosine similarity between two vectors. Vectors are expected to already
/// be L2-normalized (the provider's contract), so this is a plain dot
/// product; computed defensively as a true cosine anyway so a caller that
/// is handed an un-normalized vector still gets a meaningful answer rather
/// than a silently wrong one.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let dot: f64 = a.iter().zip(b.iter()).map(|(x, y)| *x as f64 * *y as f64).sum();
    let norm_a: f64 = a.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    let norm_b: f64 = b.iter().map(|x| (*x as f64).powi(2)).sum::<f64>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

/// Embed a single piece of text via the given provider.
pub async fn embed(provider: &dyn AiProvider, text: &str) -> Result<Vec<f32>, PipelineError> {
    Ok(provider.embed(text).await?)
}

/// Embed a batch of texts in one provider call.
pub async fn embed_batch(provider: &dyn AiProvider, texts: &[String]) -> Result<Vec<Vec<f32>>, PipelineError> {
    Ok(provider.embed_batch(texts).await?)
}

/// Validate that every vector about to be scored matches `expected_dim`.
/// Dimension mismatch between stored vectors and the JD vector is a hard
/// precondition violation — always fatal, never degraded.
pub fn check_dimension(vector: &[f32], expected_dim: usize) -> Result<(), PipelineError> {
    if vector.len() != expected_dim {
        return Err(PipelineError::Invariant(format!(
            "embedding dimension mismatch: expected {}, got {}",
            expected_dim,
            vector.len()
        )));
    }
    Ok(())
}

/// Lazy-fill policy: walk the profile and embed any bullet with a missing
/// vector, then recompute any experience's `section_vector` whose bullets
/// changed (or that never had one). Writes are batched in memory and
/// returned to the caller to commit once, in a single transaction, rather
/// than one write per bullet.
pub async fn ensure_profile_embeddings(
    profile: &mut Profile,
    provider: &dyn AiProvider,
    embedding_dim: usize,
) -> Result<(), PipelineError> {
    for experience in &mut profile.experience {
        let mut section_changed = false;

        for bullet in &mut experience.bullets {
            if bullet.vector.is_none() {
                let vector = embed(provider, &bullet.text).await?;
                check_dimension(&vector, embedding_dim)?;
                bullet.vector = Some(vector);
                section_changed = true;
            }
        }

        if (experience.section_vector.is_none() || section_changed) && !experience.bullets.is_empty() {
            experience.section_vector = Some(mean_vector(
                experience.bullets.iter().filter_map(|b| b.vector.as_ref()),
                embedding_dim,
            ));
        }

        if let Some(vec) = &experience.section_vector {
            check_dimension(vec, embedding_dim)?;
        }
    }

    for project in &mut profile.projects {
        for bullet in &mut project.bullets {
            if bullet.vector.is_none() {
                let vector = embed(provider, &bullet.text).await?;
                check_dimension(&vector, embedding_dim)?;
                bullet.vector = Some(vector);
            }
        }
    }

    Ok(())
}

/// Arithmetic mean of a set of equal-dimension vectors. Returns a
/// zero-vector of `dim` when the iterator is empty (callers only invoke
/// this when `bullets` is non-empty, so this is a defensive default, not
/// an expected path).
fn mean_vector<'a>(vectors: impl Iterator<Item = &'a Vec<f32>>, dim: usize) -> Vec<f32> {
    let mut sum = vec![0.0f32; dim];
    let mut count = 0usize;
    for v in vectors {
        for (s, x) in sum.iter_mut().zip(v.iter()) {
            *s += x;
        }
        count += 1;
    }
    if count > 0 {
        for s in sum.iter_mut() {
            *s /= count as f32;
        }
    }
    sum
}

/// Compute the JD vector from `role_title + " " + must_have_skills + " " +
/// keywords`, as specified for C2.
pub async fn embed_jd(
    jd: &crate::domain::jd::JdData,
    provider: &dyn AiProvider,
    embedding_dim: usize,
) -> Result<Vec<f32>, PipelineError> {
    let vector = embed(provider, &jd.embedding_text()).await?;
    check_dimension(&vector, embedding_dim)?;
    Ok(vector)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cosine_same_vector_is_one() {
        let v = vec![0.6, 0.8];
        assert!((cosine_similarity(&v, &v) - 1.0).abs() < 1e-3);
    }

    #[test]
    fn cosine_orthogonal_is_zero() {
        let a = vec![1.0, 0.0];
        let b = vec![0.0, 1.0];
        assert!(cosine_similarity(&a, &b).abs() < 1e-3);
    }

    #[test]
    fn cosine_antipodal_is_negative_one() {
        let a = vec![1.0, 0.0];
        let b = vec![-1.0, 0.0];
        assert!((cosine_similarity(&a, &b) + 1.0).abs() < 1e-3);
    }

    #[test]
    fn mean_vector_averages_componentwise() {
        let a = vec![1.0, 1.0];
        let b = vec![3.0, 5.0];
        let mean = mean_vector(vec![&a, &b].into_iter(), 2);
        assert_eq!(mean, vec![2.0, 3.0]);
    }

    #[test]
    fn check_dimension_rejects_mismatch() {
        let v = vec![0.0; 10];
        assert!(check_dimension(&v, 10).is_ok());
        assert!(matches!(check_dimension(&v, 384), Err(PipelineError::Invariant(_))));
    }
}
