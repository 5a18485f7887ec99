use crate::utils::error::{AssistantError, Result};

/// Cosine similarity between two embedding vectors, in `[-1.0, 1.0]`.
/// A zero-magnitude vector scores 0.0 against anything.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> Result<f32> {
    if a.len() != b.len() {
        return Err(AssistantError::Index(format!(
            "Vector dimensions must match: {} != {}",
            a.len(),
            b.len()
        )));
    }

    if a.is_empty() {
        return Err(AssistantError::Index("Vectors cannot be empty".to_string()));
    }

    let (dot, norm_a, norm_b) = a
        .iter()
        .zip(b.iter())
        .fold((0.0f32, 0.0f32, 0.0f32), |(dot, na, nb), (x, y)| {
            (dot + x * y, na + x * x, nb + y * y)
        });

    if norm_a == 0.0 || norm_b == 0.0 {
        return Ok(0.0);
    }

    // Clamp to absorb floating point drift
    Ok((dot / (norm_a.sqrt() * norm_b.sqrt())).clamp(-1.0, 1.0))
}
