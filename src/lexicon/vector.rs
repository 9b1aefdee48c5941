//! Dense vector helpers shared by the embedding store, the emoji index and
//! the morph engine.

/// Compute L2 norm of a vector.
pub fn l2_norm(v: &[f32]) -> f32 {
    v.iter().map(|x| x * x).sum::<f32>().sqrt()
}

/// Dot product of two equal-length vectors.
pub fn dot(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b.iter()).map(|(x, y)| x * y).sum()
}

/// Scale `v` to unit length in place.
///
/// A zero vector is left untouched.
pub fn normalize(v: &mut [f32]) {
    let norm = l2_norm(v);
    if norm > 0.0 {
        v.iter_mut().for_each(|x| *x /= norm);
    }
}

/// `acc += weight * v`
pub fn add_scaled(acc: &mut [f32], v: &[f32], weight: f32) {
    for (a, x) in acc.iter_mut().zip(v.iter()) {
        *a += weight * x;
    }
}

/// Cosine similarity against a target that is already unit length.
///
/// Only the candidate's own norm is divided out. Zero-norm candidates score 0.
pub fn cosine_to_unit(candidate: &[f32], unit_target: &[f32]) -> f32 {
    let norm = l2_norm(candidate);
    if norm < f32::EPSILON {
        return 0.0;
    }
    dot(candidate, unit_target) / norm
}
