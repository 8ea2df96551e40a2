//! Cosine distance between embeddings.

use ndarray::ArrayView1;
use prodmatch_core::{Error, Result};

/// Euclidean norm, accumulated in f64.
pub fn norm(v: &[f32]) -> f64 {
    let v = ArrayView1::from(v).mapv(f64::from);
    v.dot(&v).sqrt()
}

/// `1 - cos(a, b)`, clamped to `[0, 2]`.
///
/// Fails with `DimensionMismatch` if the lengths differ and with
/// `DegenerateVector` if either vector has zero norm.
pub fn cosine_distance(a: &[f32], b: &[f32]) -> Result<f64> {
    if a.len() != b.len() {
        return Err(Error::DimensionMismatch {
            expected: a.len(),
            actual: b.len(),
        });
    }

    let va = ArrayView1::from(a).mapv(f64::from);
    let vb = ArrayView1::from(b).mapv(f64::from);
    let norms = va.dot(&va).sqrt() * vb.dot(&vb).sqrt();
    if norms == 0.0 || !norms.is_finite() {
        return Err(Error::DegenerateVector(format!(
            "cannot compare vectors with norm product {}",
            norms
        )));
    }

    Ok((1.0 - va.dot(&vb) / norms).clamp(0.0, 2.0))
}
